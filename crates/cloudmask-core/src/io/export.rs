//! Mask raster export.

use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};

use crate::error::{CloudmaskError, Result};

/// Save a mask plane as an 8-bit grayscale PNG holding the raw mask bytes.
pub fn save_mask_png(mask: &[u8], rows: usize, cols: usize, path: &Path) -> Result<()> {
    if mask.len() != rows * cols {
        return Err(CloudmaskError::MaskLength {
            expected: rows * cols,
            actual: mask.len(),
        });
    }

    let mut img = GrayImage::new(cols as u32, rows as u32);
    for row in 0..rows {
        for col in 0..cols {
            img.put_pixel(col as u32, row as u32, Luma([mask[row * cols + col]]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a mask plane as a raw byte dump, one byte per pixel, row-major.
pub fn save_mask_raw(mask: &[u8], path: &Path) -> Result<()> {
    std::fs::write(path, mask)?;
    Ok(())
}
