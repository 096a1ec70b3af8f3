//! Represents generic format for usage timeseries that is simplified and convenient.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RecommenderError;
use crate::model::sample::UsageSample;
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};
use crate::timeseries::interface::TimeseriesStore;

/// GenericTimeseries keeps usage samples of several workloads in memory.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct GenericTimeseries {
    pub workloads: Vec<WorkloadSeries>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct WorkloadSeries {
    pub workload: WorkloadIdentity,
    pub samples: Vec<UsageSample>,
}

impl GenericTimeseries {
    pub fn from_yaml(document: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(document)
    }

    /// Window covering samples of all workloads, None when there are no samples.
    pub fn time_range(&self) -> Option<AnalysisWindow> {
        let timestamps = self
            .workloads
            .iter()
            .flat_map(|series| series.samples.iter())
            .map(|sample| sample.timestamp);
        let start = timestamps.clone().min()?;
        let end = timestamps.max()?;
        Some(AnalysisWindow::new(start, end))
    }
}

impl TimeseriesStore for GenericTimeseries {
    fn fetch(
        &self,
        workload: &WorkloadIdentity,
        window: &AnalysisWindow,
        _timeout: Option<Duration>,
    ) -> Result<Vec<UsageSample>, RecommenderError> {
        let series = self
            .workloads
            .iter()
            .find(|series| &series.workload == workload)
            .ok_or_else(|| RecommenderError::Fetch {
                workload: workload.clone(),
                window: *window,
                reason: "workload is not present in the timeseries".to_string(),
            })?;

        Ok(series
            .samples
            .iter()
            .filter(|sample| window.contains(&sample.timestamp))
            .cloned()
            .collect())
    }

    fn workloads(&self) -> Vec<WorkloadIdentity> {
        self.workloads
            .iter()
            .map(|series| series.workload.clone())
            .collect()
    }
}
