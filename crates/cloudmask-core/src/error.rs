use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudmaskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid scene dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("{band} band is {rows}x{cols}, scene is {expected_rows}x{expected_cols}")]
    BandShape {
        band: &'static str,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("Row {row} out of range (total: {total})")]
    RowOutOfRange { row: usize, total: usize },

    #[error("Mask buffer holds {actual} pixels, scene has {expected}")]
    MaskLength { expected: usize, actual: usize },

    #[error("Raw band file {path}: expected {expected} bytes, found {actual}")]
    RawSize {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("Empty raster passed to local-minima fill ({band})")]
    EmptyRaster { band: String },
}

pub type Result<T> = std::result::Result<T, CloudmaskError>;
