use log::trace;
use serde::{Deserialize, Serialize};

use crate::autoscalers::horizontal_pod_autoscaler::interface::{
    HorizontalPodAutoscalerAlgorithm, ReplicaGroupMetrics,
};
use crate::metrics::percentile::ceil_tolerant;

/// Default implementation of horizontal pod autoscaler which is used in Kubernetes.
///
/// For each sample desired number of replicas is calculated as follows:
/// desiredReplicas = ceil[currentReplicas * ( currentMetricValue / desiredMetricValue )]
/// and then bounded by min and max replicas of the plan. Only cpu utilization is considered,
/// memory is sized statically by the plan.
pub struct KubeHorizontalPodAutoscaler {
    config: KubeHorizontalPodAutoscalerConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct KubeHorizontalPodAutoscalerConfig {
    /// If the ratio of current metric and desired metric is sufficiently close to 1.0 within the
    /// `target_threshold_tolerance`, then autoscaling actions are skipped
    #[serde(default = "target_threshold_tolerance_default")]
    pub target_threshold_tolerance: f64,
}

impl Default for KubeHorizontalPodAutoscalerConfig {
    fn default() -> Self {
        Self {
            target_threshold_tolerance: target_threshold_tolerance_default(),
        }
    }
}

pub fn target_threshold_tolerance_default() -> f64 {
    0.1
}

impl KubeHorizontalPodAutoscaler {
    pub fn new(config: KubeHorizontalPodAutoscalerConfig) -> Self {
        Self { config }
    }

    /// Returns desired number of replicas calculated by default kubernetes' hpa formula with
    /// respect to tolerance when ratio is close to 1.0.
    pub fn desired_number_of_replicas_by_metric(
        &self,
        current_replicas: u32,
        current_value: f64,
        desired_value: f64,
    ) -> u32 {
        if desired_value <= 0.0 {
            return current_replicas;
        }
        let ratio = current_value / desired_value;
        trace!(
            "current_value / desired_value metric ratio {:?} (tolerance: {:?})",
            ratio,
            self.config.target_threshold_tolerance
        );
        if (ratio - 1.0).abs() <= self.config.target_threshold_tolerance {
            return current_replicas;
        }
        ceil_tolerant(current_replicas as f64 * ratio).max(0.0) as u32
    }
}

impl HorizontalPodAutoscalerAlgorithm for KubeHorizontalPodAutoscaler {
    fn desired_replicas(&self, metrics: &ReplicaGroupMetrics) -> u32 {
        let desired = self.desired_number_of_replicas_by_metric(
            metrics.current_replicas,
            metrics.cpu_utilization,
            metrics.target_cpu_utilization,
        );
        desired.clamp(metrics.min_replicas, metrics.max_replicas.max(metrics.min_replicas))
    }
}
