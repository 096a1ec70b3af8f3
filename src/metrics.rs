//! Statistics over samples and output of recommendation results.

pub mod collector;
pub mod percentile;
pub mod printer;
