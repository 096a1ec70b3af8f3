// Interface for any source of workload usage, e.g. a monitoring backend.

use std::time::Duration;

use crate::error::RecommenderError;
use crate::model::sample::UsageSample;
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};

pub trait TimeseriesStore: Send + Sync {
    // Returns samples of the workload with timestamps inside the window, in any order.
    // Implementations that talk to a remote backend must give up after `timeout` and return
    // `RecommenderError::FetchTimeout`.
    fn fetch(
        &self,
        workload: &WorkloadIdentity,
        window: &AnalysisWindow,
        timeout: Option<Duration>,
    ) -> Result<Vec<UsageSample>, RecommenderError>;

    // Workloads known to the store, used when the caller does not name them.
    fn workloads(&self) -> Vec<WorkloadIdentity>;
}
