//! Data model shared by all stages of the recommendation pipeline.

pub mod plan;
pub mod recommendation;
pub mod sample;
pub mod workload;
