use crate::config::RecommenderConfig;
use crate::model::plan::{ScalingMethod, ScalingPlan};
use crate::model::sample::WorkloadTimeseries;

/// One way of deriving a scaling plan from usage history.
///
/// Implementations fill requests, replica bounds and target utilization. Fields that depend on the
/// startup window are set afterwards by the planner for every method alike.
pub trait ScalingPlanner: Send + Sync {
    fn method(&self) -> ScalingMethod;

    /// `timeseries` holds at least two samples.
    fn plan(&self, timeseries: &WorkloadTimeseries, config: &RecommenderConfig) -> ScalingPlan;
}
