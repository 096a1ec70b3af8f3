//! Failures of a workload analysis. Every workload-scoped variant carries the workload identity and
//! the analysis window so that the failure is actionable on its own.

use std::time::Duration;

use thiserror::Error;

use crate::model::workload::{AnalysisWindow, WorkloadIdentity};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommenderError {
    /// No pod scheduling history to model startup time. Recoverable with configured defaults.
    #[error("no pod startup history for workload {workload} in {window}")]
    DataUnavailable {
        workload: WorkloadIdentity,
        window: AnalysisWindow,
    },

    #[error(
        "insufficient data for workload {workload} in {window}: \
         need at least {required} samples, got {available}"
    )]
    InsufficientData {
        workload: WorkloadIdentity,
        window: AnalysisWindow,
        required: usize,
        available: usize,
    },

    /// Every candidate plan diverged above the replica ceiling or was rejected before replay.
    #[error("no recommendation for workload {workload} in {window}: {reason}")]
    SimulationDiverged {
        workload: WorkloadIdentity,
        window: AnalysisWindow,
        reason: String,
    },

    #[error("timeseries fetch for workload {workload} in {window} timed out after {timeout:?}")]
    FetchTimeout {
        workload: WorkloadIdentity,
        window: AnalysisWindow,
        timeout: Duration,
    },

    #[error("timeseries fetch for workload {workload} in {window} failed: {reason}")]
    Fetch {
        workload: WorkloadIdentity,
        window: AnalysisWindow,
        reason: String,
    },

    #[error("invalid timeseries for workload {workload} in {window}: {reason}")]
    InvalidTimeseries {
        workload: WorkloadIdentity,
        window: AnalysisWindow,
        reason: String,
    },

    #[error("workload {workload} belongs to excluded namespace {namespace:?}")]
    ExcludedNamespace {
        workload: WorkloadIdentity,
        namespace: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RecommenderError {
    /// Stable short name of the failure kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            RecommenderError::DataUnavailable { .. } => "DataUnavailable",
            RecommenderError::InsufficientData { .. } => "InsufficientData",
            RecommenderError::SimulationDiverged { .. } => "SimulationDiverged",
            RecommenderError::FetchTimeout { .. } => "FetchTimeout",
            RecommenderError::Fetch { .. } => "Fetch",
            RecommenderError::InvalidTimeseries { .. } => "InvalidTimeseries",
            RecommenderError::ExcludedNamespace { .. } => "ExcludedNamespace",
            RecommenderError::InvalidConfig(_) => "InvalidConfig",
        }
    }

    pub fn workload(&self) -> Option<&WorkloadIdentity> {
        match self {
            RecommenderError::DataUnavailable { workload, .. }
            | RecommenderError::InsufficientData { workload, .. }
            | RecommenderError::SimulationDiverged { workload, .. }
            | RecommenderError::FetchTimeout { workload, .. }
            | RecommenderError::Fetch { workload, .. }
            | RecommenderError::InvalidTimeseries { workload, .. }
            | RecommenderError::ExcludedNamespace { workload, .. } => Some(workload),
            RecommenderError::InvalidConfig(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RecommenderError;
    use crate::test_util::helpers::{test_window, test_workload};

    #[test]
    fn test_error_message_carries_workload_and_window() {
        let err = RecommenderError::InsufficientData {
            workload: test_workload(),
            window: test_window(24, 3600),
            required: 4,
            available: 1,
        };

        let message = err.to_string();
        assert!(message.contains("test-project/us-central1/test-cluster/default/frontend"));
        assert!(message.contains("2025-01-01T00:00:00"));
        assert!(message.contains("need at least 4 samples, got 1"));
        assert_eq!("InsufficientData", err.kind());
        assert_eq!(Some(&test_workload()), err.workload());
    }

    #[test]
    fn test_config_error_has_no_workload() {
        let err = RecommenderError::InvalidConfig("cooldown_samples must be at least 1".to_string());
        assert_eq!(None, err.workload());
        assert_eq!("InvalidConfig", err.kind());
    }
}
