//! Modeling of end-to-end pod startup latency.

pub mod interface;
pub mod startup_model;
