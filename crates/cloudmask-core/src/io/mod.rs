pub mod export;
pub mod raw;
mod memory;
mod source;

pub use memory::MemoryScene;
pub use source::{BandId, RasterMeta, RowBuffers, RowSource, REFL_BAND_COUNT};
