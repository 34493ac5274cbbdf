//! Tectonic plate generation library
//!
//! Synthesizes coherent-noise scalar fields (gradient, simplex-style,
//! cellular) and partitions a hexagonal grid into contiguous plate regions
//! via seeded watershed segmentation.

pub mod codec;
pub mod error;
pub mod hexgrid;
pub mod noisegen;
pub mod plates;
pub mod raster;
pub mod validation;
pub mod watershed;
