//! Config fields definitions for the recommender

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::autoscalers::horizontal_pod_autoscaler::kube_horizontal_pod_autoscaler::{
    target_threshold_tolerance_default, KubeHorizontalPodAutoscalerConfig,
};
use crate::error::RecommenderError;
use crate::startup::startup_model::StartupModelConfig;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RecommenderConfig {
    /// Percentile of summed cpu usage the DCR plan provisions for at min replicas.
    #[serde(default = "percentile_threshold_default")]
    pub percentile_threshold: f64,
    /// HPA target of the DMR plan in ratio from 0 to 1.
    #[serde(default = "target_cpu_utilization_default")]
    pub target_cpu_utilization: f64,
    #[serde(default = "memory_headroom_pct_default")]
    pub memory_headroom_pct: f64,
    /// Samples the desired replica count must stay below current before scaling down.
    #[serde(default = "cooldown_samples_default")]
    pub cooldown_samples: usize,
    #[serde(default = "max_replica_ceiling_default")]
    pub max_replica_ceiling: u32,
    #[serde(default = "replica_safety_margin_default")]
    pub replica_safety_margin: f64,
    #[serde(default = "baseline_percentile_default")]
    pub baseline_percentile: f64,
    #[serde(default = "peak_percentile_default")]
    pub peak_percentile: f64,
    /// Minimal history length in startup windows.
    #[serde(default = "min_sample_windows_default")]
    pub min_sample_windows: usize,
    #[serde(default = "min_cpu_request_default")]
    pub min_cpu_request: f64, // in cores
    /// Fixed per-replica cpu request of the DMR plan. Live request is used if not set.
    #[serde(default)]
    pub dmr_cpu_request: Option<f64>,
    #[serde(default = "cost_of_gb_in_cpus_default")]
    pub cost_of_gb_in_cpus: f64,
    #[serde(default = "target_threshold_tolerance_default")]
    pub hpa_tolerance: f64,
    /// Plans are rejected when usage grows faster than this within one startup window.
    #[serde(default = "hpa_scale_limit_default")]
    pub hpa_scale_limit: f64,
    #[serde(default)]
    pub fetch_timeout_s: Option<f64>,
    #[serde(default = "workers_default")]
    pub workers: usize,
    #[serde(default = "excluded_namespaces_default")]
    pub excluded_namespaces: Vec<String>,
    #[serde(default)]
    pub startup: StartupModelConfig,
}

fn percentile_threshold_default() -> f64 {
    95.0
}
fn target_cpu_utilization_default() -> f64 {
    0.70
}
fn memory_headroom_pct_default() -> f64 {
    15.0
}
fn cooldown_samples_default() -> usize {
    5
}
fn max_replica_ceiling_default() -> u32 {
    1000
}
fn replica_safety_margin_default() -> f64 {
    1.1
}
fn baseline_percentile_default() -> f64 {
    10.0
}
fn peak_percentile_default() -> f64 {
    99.0
}
fn min_sample_windows_default() -> usize {
    2
}
fn min_cpu_request_default() -> f64 {
    0.010 // 10 millicores
}
fn cost_of_gb_in_cpus_default() -> f64 {
    7.5
}
fn hpa_scale_limit_default() -> f64 {
    2.3
}
fn workers_default() -> usize {
    4
}
fn excluded_namespaces_default() -> Vec<String> {
    [
        "kube-system",
        "istio-system",
        "gatekeeper-system",
        "gke-system",
        "gmp-system",
        "gke-gmp-system",
        "gke-managed-filestorecsi",
        "gke-mcs",
    ]
    .iter()
    .map(|namespace| namespace.to_string())
    .collect()
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            percentile_threshold: percentile_threshold_default(),
            target_cpu_utilization: target_cpu_utilization_default(),
            memory_headroom_pct: memory_headroom_pct_default(),
            cooldown_samples: cooldown_samples_default(),
            max_replica_ceiling: max_replica_ceiling_default(),
            replica_safety_margin: replica_safety_margin_default(),
            baseline_percentile: baseline_percentile_default(),
            peak_percentile: peak_percentile_default(),
            min_sample_windows: min_sample_windows_default(),
            min_cpu_request: min_cpu_request_default(),
            dmr_cpu_request: None,
            cost_of_gb_in_cpus: cost_of_gb_in_cpus_default(),
            hpa_tolerance: target_threshold_tolerance_default(),
            hpa_scale_limit: hpa_scale_limit_default(),
            fetch_timeout_s: None,
            workers: workers_default(),
            excluded_namespaces: excluded_namespaces_default(),
            startup: StartupModelConfig::default(),
        }
    }
}

impl RecommenderConfig {
    /// Parses and validates a YAML document. An empty document yields defaults.
    pub fn from_yaml(document: &str) -> Result<Self, RecommenderError> {
        let config = if document.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<RecommenderConfig>(document)
                .map_err(|err| RecommenderError::InvalidConfig(err.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RecommenderError> {
        let percentile_ok = |p: f64| (0.0..=100.0).contains(&p);
        let invalid = |message: &str| Err(RecommenderError::InvalidConfig(message.to_string()));

        if !percentile_ok(self.percentile_threshold)
            || !percentile_ok(self.baseline_percentile)
            || !percentile_ok(self.peak_percentile)
        {
            return invalid("percentiles must be within [0, 100]");
        }
        if !(self.target_cpu_utilization > 0.0 && self.target_cpu_utilization <= 1.0) {
            return invalid("target_cpu_utilization must be within (0, 1]");
        }
        if !(self.memory_headroom_pct >= 0.0) {
            return invalid("memory_headroom_pct must not be negative");
        }
        if self.cooldown_samples == 0 {
            return invalid("cooldown_samples must be at least 1");
        }
        if self.max_replica_ceiling == 0 {
            return invalid("max_replica_ceiling must be at least 1");
        }
        if !(self.replica_safety_margin >= 1.0) {
            return invalid("replica_safety_margin must be at least 1.0");
        }
        if self.min_sample_windows == 0 {
            return invalid("min_sample_windows must be at least 1");
        }
        if !(self.min_cpu_request > 0.0) {
            return invalid("min_cpu_request must be positive");
        }
        if matches!(self.dmr_cpu_request, Some(request) if !(request > 0.0)) {
            return invalid("dmr_cpu_request must be positive");
        }
        if !(self.cost_of_gb_in_cpus > 0.0) {
            return invalid("cost_of_gb_in_cpus must be positive");
        }
        if !(self.hpa_tolerance >= 0.0) {
            return invalid("hpa_tolerance must not be negative");
        }
        if !(self.hpa_scale_limit >= 1.0) {
            return invalid("hpa_scale_limit must be at least 1.0");
        }
        if matches!(
            self.fetch_timeout_s,
            Some(timeout) if !(timeout > 0.0) || Duration::try_from_secs_f64(timeout).is_err()
        ) {
            return invalid("fetch_timeout_s must be a positive finite number of seconds");
        }
        if self.workers == 0 {
            return invalid("workers must be at least 1");
        }
        let startup_components = [
            ("node_provision_timeout_s", self.startup.node_provision_timeout_s),
            ("readiness_grace_period_s", self.startup.readiness_grace_period_s),
            ("image_pull_estimate_s", self.startup.image_pull_estimate_s),
            ("hpa_processing_time_s", self.startup.hpa_processing_time_s),
        ];
        for (name, seconds) in startup_components {
            if !(seconds >= 0.0 && seconds.is_finite()) {
                return Err(RecommenderError::InvalidConfig(format!(
                    "startup.{} must be a non-negative number of seconds",
                    name
                )));
            }
        }
        if !(self.startup.max_startup_time_s > 0.0) {
            return invalid("startup.max_startup_time_s must be positive");
        }
        Ok(())
    }

    /// Adds namespaces from a comma separated list, e.g. "monitoring,logging".
    pub fn add_excluded_namespaces(&mut self, namespaces: &str) {
        for namespace in namespaces.split(',').map(str::trim) {
            if !namespace.is_empty() && !self.is_excluded_namespace(namespace) {
                self.excluded_namespaces.push(namespace.to_string());
            }
        }
    }

    pub fn is_excluded_namespace(&self, namespace: &str) -> bool {
        self.excluded_namespaces.iter().any(|excluded| excluded == namespace)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_s
            .and_then(|timeout| Duration::try_from_secs_f64(timeout).ok())
    }

    pub fn horizontal_pod_autoscaler(&self) -> KubeHorizontalPodAutoscalerConfig {
        KubeHorizontalPodAutoscalerConfig {
            target_threshold_tolerance: self.hpa_tolerance,
        }
    }
}
