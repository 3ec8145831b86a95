// Text handling: normalization, segmentation, and risk-keyword matching.

pub mod keywords;
pub mod normalize;
pub mod segment;
pub mod traits;
