mod probability;
mod run;
mod shadow;
mod spectral;
mod thermal;

pub use run::{detect, DetectParams, SceneStats};
