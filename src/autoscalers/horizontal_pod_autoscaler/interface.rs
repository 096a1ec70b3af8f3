use serde::{Deserialize, Serialize};

/// State of a replica group observed by the autoscaler at one sample.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReplicaGroupMetrics {
    /// Replicas serving traffic at the sample.
    pub current_replicas: u32,
    /// Mean cpu utilization of the replicas in ratio to the cpu request.
    pub cpu_utilization: f64,
    /// Target cpu utilization in ratio from 0 to 1, relative to the cpu request.
    pub target_cpu_utilization: f64,
    pub min_replicas: u32,
    pub max_replicas: u32,
}

pub trait HorizontalPodAutoscalerAlgorithm: Send + Sync {
    /// Returns desired number of replicas within `[min_replicas, max_replicas]`.
    fn desired_replicas(&self, metrics: &ReplicaGroupMetrics) -> u32;
}
