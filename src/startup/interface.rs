//! Interface for the source of pod scheduling history and its file-backed implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::workload::{AnalysisWindow, WorkloadIdentity};

/// Scheduling and readiness transitions of one pod of a workload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PodStartupRecord {
    pub pod_name: String,
    #[serde(default)]
    pub has_readiness_probe: bool,
    pub scheduled_at: DateTime<Utc>,
    pub ready_at: DateTime<Utc>,
}

impl PodStartupRecord {
    pub fn scheduled_to_ready_seconds(&self) -> f64 {
        (self.ready_at - self.scheduled_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Any source of pod startup history, e.g. a cluster asset inventory.
pub trait StartupHistory: Send + Sync {
    /// Returns pods of the workload scheduled within the window.
    fn pod_startups(
        &self,
        workload: &WorkloadIdentity,
        window: &AnalysisWindow,
    ) -> Vec<PodStartupRecord>;
}

/// Used when no history source is configured: every workload falls back to default startup time.
pub struct NoStartupHistory;

impl StartupHistory for NoStartupHistory {
    fn pod_startups(&self, _: &WorkloadIdentity, _: &AnalysisWindow) -> Vec<PodStartupRecord> {
        vec![]
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct WorkloadStartups {
    pub workload: WorkloadIdentity,
    pub pods: Vec<PodStartupRecord>,
}

/// YAML document with startup history of several workloads.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct GenericStartupHistory {
    pub workloads: Vec<WorkloadStartups>,
}

impl GenericStartupHistory {
    pub fn from_yaml(document: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(document)
    }
}

impl StartupHistory for GenericStartupHistory {
    fn pod_startups(
        &self,
        workload: &WorkloadIdentity,
        window: &AnalysisWindow,
    ) -> Vec<PodStartupRecord> {
        self.workloads
            .iter()
            .filter(|startups| &startups.workload == workload)
            .flat_map(|startups| startups.pods.iter())
            .filter(|pod| window.contains(&pod.scheduled_at))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::workload::WorkloadIdentity;
    use crate::startup::interface::{GenericStartupHistory, StartupHistory};
    use crate::test_util::helpers::{test_window, test_workload};

    #[test]
    fn test_history_is_filtered_by_workload_and_window() {
        let history = GenericStartupHistory::from_yaml(
            r#"
            workloads:
            - workload:
                project: test-project
                cluster: test-cluster
                location: us-central1
                namespace: default
                controller_name: frontend
              pods:
              - pod_name: frontend-1
                has_readiness_probe: true
                scheduled_at: 2025-01-01T00:10:00Z
                ready_at: 2025-01-01T00:10:42Z
              - pod_name: frontend-2
                scheduled_at: 2024-12-31T23:00:00Z
                ready_at: 2024-12-31T23:00:30Z
            - workload:
                project: test-project
                cluster: test-cluster
                location: us-central1
                namespace: default
                controller_name: backend
              pods:
              - pod_name: backend-1
                scheduled_at: 2025-01-01T00:20:00Z
                ready_at: 2025-01-01T00:21:00Z
            "#,
        )
        .unwrap();

        let pods = history.pod_startups(&test_workload(), &test_window(24, 3600));
        assert_eq!(1, pods.len());
        assert_eq!("frontend-1", pods[0].pod_name);
        assert!(pods[0].has_readiness_probe);
        assert_eq!(42.0, pods[0].scheduled_to_ready_seconds());

        let unknown = WorkloadIdentity::new("p", "c", "l", "n", "unknown");
        assert!(history
            .pod_startups(&unknown, &test_window(24, 3600))
            .is_empty());
    }
}
