pub mod cache;
pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod job;
pub mod lod;
pub mod original;
pub mod pyramid;
pub mod raster;
