//! Stage processors: preprocessing, postprocessing, decoding and
//! validation building blocks used by the pipeline.

pub mod decode;
pub mod detection;
pub mod geometry;
pub mod orientation;
pub mod preprocess;
pub mod side_check;
pub mod validation;

pub use decode::CtcLabelDecode;
pub use geometry::BBox;
