//! Sources of workload usage timeseries and their preprocessing.

pub mod csv;
pub mod generic;
pub mod interface;
pub mod preprocessing;
