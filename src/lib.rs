pub mod error;
pub mod units;
pub mod header;
pub mod slicing;
pub mod wcs;
pub mod ndcube;
pub mod resolver;
pub mod exposure;
pub mod spectrogram;
pub mod instr;
pub mod config;
pub mod logging;

#[cfg(test)]
mod test_utils;

pub use error::CubeError;
pub use spectrogram::{Spectrogram, SpectrogramCube, SpectrogramCubeBuilder};
