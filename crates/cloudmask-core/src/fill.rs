//! Local-minima filling by grayscale morphological reconstruction.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ndarray::Array2;
use tracing::debug;

use crate::error::{CloudmaskError, Result};

/// Raise every local minimum of `src` to the lowest rim value reachable
/// without crossing a higher cell, with the virtual outer frame held at
/// `boundary`.
///
/// Priority-flood reconstruction by erosion over the 8-neighborhood: cells
/// settle in ascending water-level order starting from the image edge, so
/// each cell ends at `max(src, lowest spill level from outside)` and the
/// result dominates `src` everywhere. `band` labels diagnostics.
pub fn fill_local_minima(band: &str, src: &Array2<i16>, boundary: f32) -> Result<Array2<i16>> {
    let (rows, cols) = src.dim();
    if rows == 0 || cols == 0 {
        return Err(CloudmaskError::EmptyRaster {
            band: band.to_string(),
        });
    }

    // The fill operates on the integer sample lattice; snap the frame level.
    let frame_level = boundary.round() as i16;
    debug!(band, boundary, "filling local minima");

    let mut filled = Array2::<i16>::zeros((rows, cols));
    let mut settled = Array2::from_elem((rows, cols), false);
    let mut queue: BinaryHeap<Reverse<(i16, usize, usize)>> = BinaryHeap::new();

    for row in 0..rows {
        for col in 0..cols {
            if row == 0 || row == rows - 1 || col == 0 || col == cols - 1 {
                queue.push(Reverse((src[[row, col]].max(frame_level), row, col)));
            }
        }
    }

    while let Some(Reverse((level, row, col))) = queue.pop() {
        if settled[[row, col]] {
            continue;
        }
        settled[[row, col]] = true;
        filled[[row, col]] = level;

        for dr in -1..=1_i32 {
            for dc in -1..=1_i32 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let nr = row as i32 + dr;
                let nc = col as i32 + dc;
                if nr < 0 || nr >= rows as i32 || nc < 0 || nc >= cols as i32 {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if !settled[[nr, nc]] {
                    queue.push(Reverse((src[[nr, nc]].max(level), nr, nc)));
                }
            }
        }
    }

    Ok(filled)
}
