//! Identity of an analyzed workload and the period it is analyzed over.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies one logical workload (e.g. a Deployment) across its containers and replicas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct WorkloadIdentity {
    pub project: String,
    pub cluster: String,
    pub location: String,
    pub namespace: String,
    pub controller_name: String,
    #[serde(default = "controller_type_default")]
    pub controller_type: String,
    /// Set when only one container of the workload's pods is analyzed.
    #[serde(default)]
    pub container_name: Option<String>,
}

fn controller_type_default() -> String {
    "Deployment".to_string()
}

impl WorkloadIdentity {
    pub fn new(
        project: &str,
        cluster: &str,
        location: &str,
        namespace: &str,
        controller_name: &str,
    ) -> Self {
        Self {
            project: project.to_string(),
            cluster: cluster.to_string(),
            location: location.to_string(),
            namespace: namespace.to_string(),
            controller_name: controller_name.to_string(),
            controller_type: controller_type_default(),
            container_name: None,
        }
    }

    /// Name unique per workload that is safe to use as a file name.
    pub fn file_stem(&self) -> String {
        let mut parts = vec![
            self.project.as_str(),
            self.location.as_str(),
            self.cluster.as_str(),
            self.namespace.as_str(),
            self.controller_name.as_str(),
        ];
        if let Some(container) = &self.container_name {
            parts.push(container);
        }
        parts
            .join("_")
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect()
    }
}

impl fmt::Display for WorkloadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.project, self.location, self.cluster, self.namespace, self.controller_name
        )?;
        if let Some(container) = &self.container_name {
            write!(f, ":{}", container)?;
        }
        Ok(())
    }
}

/// Closed time range of samples taken into an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalysisWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }
}

impl fmt::Display for AnalysisWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
