//! Recommends horizontal and vertical pod autoscaling configurations for Kubernetes workloads by
//! replaying their historical resource usage against candidate scaling plans.

pub mod autoscalers;
pub mod batch;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod model;
pub mod planner;
pub mod recommender;
pub mod startup;
pub mod test_util;
pub mod timeseries;
