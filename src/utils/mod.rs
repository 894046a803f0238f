pub mod coordinate;
pub mod landmark;
pub mod utils;

#[cfg(feature = "opencv")]
pub mod image;
