pub mod detect;
pub mod pocket;
pub mod raster;

pub use detect::{Classification, classify, read_magic};
