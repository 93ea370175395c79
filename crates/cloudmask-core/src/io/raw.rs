//! Headerless raw band files: row-major little-endian `i16` samples.

use std::fs::File;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{CloudmaskError, Result};

const SAMPLE_SIZE: usize = std::mem::size_of::<i16>();

/// Load one band of known dimensions from a raw file.
pub fn read_band_file(path: &Path, rows: usize, cols: usize) -> Result<Array2<i16>> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let expected = rows * cols * SAMPLE_SIZE;
    if mmap.len() < expected {
        return Err(CloudmaskError::RawSize {
            path: path.to_path_buf(),
            expected,
            actual: mmap.len(),
        });
    }

    let mut data = Array2::<i16>::zeros((rows, cols));
    for row in 0..rows {
        for col in 0..cols {
            let offset = (row * cols + col) * SAMPLE_SIZE;
            data[[row, col]] = LittleEndian::read_i16(&mmap[offset..offset + SAMPLE_SIZE]);
        }
    }

    Ok(data)
}

/// Write a band back out in the same raw layout.
pub fn write_band_file(path: &Path, data: &Array2<i16>) -> Result<()> {
    let mut bytes = vec![0u8; data.len() * SAMPLE_SIZE];
    for (i, &value) in data.iter().enumerate() {
        LittleEndian::write_i16(&mut bytes[i * SAMPLE_SIZE..(i + 1) * SAMPLE_SIZE], value);
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
