//! Computes how long it takes for a scale-up decision to turn into a ready replica.
//!
//! Total startup time = container init (scheduled -> ready, observed from pod history)
//!                    + readiness grace period
//!                    + node provisioning delay of cluster autoscaler
//!                    + horizontal pod autoscaler processing delay,
//! clamped to `max_startup_time_s` to bound the simulation lookback.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::RecommenderError;
use crate::metrics::percentile::{ceil_tolerant, percentile};
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};
use crate::startup::interface::StartupHistory;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StartupModelConfig {
    /// Time for cluster autoscaler to provision a node when scale-out does not fit the cluster.
    #[serde(default = "node_provision_timeout_s_default")]
    pub node_provision_timeout_s: f64,
    #[serde(default = "readiness_grace_period_s_default")]
    pub readiness_grace_period_s: f64,
    /// Used as container init time when the workload has no pod history.
    #[serde(default = "image_pull_estimate_s_default")]
    pub image_pull_estimate_s: f64,
    #[serde(default = "hpa_processing_time_s_default")]
    pub hpa_processing_time_s: f64,
    #[serde(default = "max_startup_time_s_default")]
    pub max_startup_time_s: f64,
}

fn node_provision_timeout_s_default() -> f64 {
    75.0
}
fn readiness_grace_period_s_default() -> f64 {
    0.0
}
fn image_pull_estimate_s_default() -> f64 {
    60.0
}
fn hpa_processing_time_s_default() -> f64 {
    45.0
}
fn max_startup_time_s_default() -> f64 {
    600.0
}

impl Default for StartupModelConfig {
    fn default() -> Self {
        Self {
            node_provision_timeout_s: node_provision_timeout_s_default(),
            readiness_grace_period_s: readiness_grace_period_s_default(),
            image_pull_estimate_s: image_pull_estimate_s_default(),
            hpa_processing_time_s: hpa_processing_time_s_default(),
            max_startup_time_s: max_startup_time_s_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum StartupSource {
    /// Container init time comes from pod scheduling history.
    Observed,
    /// No history, container init time is `image_pull_estimate_s`.
    Default,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StartupTime {
    pub container_init_s: f64,
    pub readiness_grace_s: f64,
    pub node_provision_s: f64,
    pub hpa_processing_s: f64,
    /// Sum of the components above, clamped.
    pub total_s: f64,
    pub source: StartupSource,
}

impl StartupTime {
    pub fn new(container_init_s: f64, config: &StartupModelConfig, source: StartupSource) -> Self {
        let sum = container_init_s
            + config.readiness_grace_period_s
            + config.node_provision_timeout_s
            + config.hpa_processing_time_s;
        if sum > config.max_startup_time_s {
            debug!(
                "Startup time {:.1}s clamped to {:.1}s",
                sum, config.max_startup_time_s
            );
        }
        Self {
            container_init_s,
            readiness_grace_s: config.readiness_grace_period_s,
            node_provision_s: config.node_provision_timeout_s,
            hpa_processing_s: config.hpa_processing_time_s,
            total_s: f64::min(sum, config.max_startup_time_s),
            source,
        }
    }

    pub fn from_defaults(config: &StartupModelConfig) -> Self {
        Self::new(config.image_pull_estimate_s, config, StartupSource::Default)
    }

    /// Startup time as a number of samples spaced `interval_seconds` apart, at least one.
    pub fn lag_samples(&self, interval_seconds: f64) -> usize {
        if interval_seconds <= 0.0 {
            return 1;
        }
        usize::max(1, ceil_tolerant(self.total_s / interval_seconds) as usize)
    }
}

/// Returns the largest value after dropping outliers outside [Q1 - 1.5 IQR, Q3 + 1.5 IQR].
pub fn max_without_outliers(values: &[f64]) -> Option<f64> {
    let first_quartile = percentile(values, 25.0)?;
    let third_quartile = percentile(values, 75.0)?;
    let interquartile_range = third_quartile - first_quartile;
    let lower = first_quartile - 1.5 * interquartile_range;
    let upper = third_quartile + 1.5 * interquartile_range;

    debug!(
        "First quartile: {:.1}, third quartile: {:.1}, interquartile range: {:.1}",
        first_quartile, third_quartile, interquartile_range
    );

    values
        .iter()
        .copied()
        .filter(|value| *value >= lower && *value <= upper)
        .reduce(f64::max)
}

/// Computes startup time from pod history of the workload within the window.
/// Returns `DataUnavailable` when the workload has no scheduling events; callers are expected to
/// fall back to `StartupTime::from_defaults`.
pub fn compute_startup_time(
    workload: &WorkloadIdentity,
    window: &AnalysisWindow,
    history: &dyn StartupHistory,
    config: &StartupModelConfig,
) -> Result<StartupTime, RecommenderError> {
    let durations: Vec<f64> = history
        .pod_startups(workload, window)
        .iter()
        .map(|pod| pod.scheduled_to_ready_seconds())
        .filter(|duration| duration.is_finite() && *duration >= 0.0)
        .collect();

    let container_init_s = match max_without_outliers(&durations) {
        Some(value) => value,
        None => {
            return Err(RecommenderError::DataUnavailable {
                workload: workload.clone(),
                window: *window,
            })
        }
    };

    let startup = StartupTime::new(container_init_s, config, StartupSource::Observed);
    info!(
        "Startup time for workload {}: {:.1}s (container init {:.1}s from {} pods)",
        workload,
        startup.total_s,
        container_init_s,
        durations.len()
    );
    Ok(startup)
}

#[cfg(test)]
mod tests {
    use crate::startup::startup_model::{
        max_without_outliers, StartupModelConfig, StartupSource, StartupTime,
    };

    #[test]
    fn test_outliers_are_dropped() {
        let durations = [30.0, 32.0, 35.0, 31.0, 33.0, 900.0];
        assert_eq!(Some(35.0), max_without_outliers(&durations));
        assert_eq!(Some(12.0), max_without_outliers(&[12.0]));
        assert_eq!(None, max_without_outliers(&[]));
    }

    #[test]
    fn test_default_startup_time() {
        let startup = StartupTime::from_defaults(&StartupModelConfig::default());
        // 60 image pull + 0 readiness + 75 node provisioning + 45 hpa
        assert_eq!(180.0, startup.total_s);
        assert_eq!(StartupSource::Default, startup.source);
        assert_eq!(3, startup.lag_samples(60.0));
        assert_eq!(1, startup.lag_samples(3600.0));
        assert_eq!(1, startup.lag_samples(0.0));
    }

    #[test]
    fn test_startup_time_is_clamped() {
        let config = StartupModelConfig::default();
        let startup = StartupTime::new(1200.0, &config, StartupSource::Observed);
        assert_eq!(600.0, startup.total_s);
        assert_eq!(1200.0, startup.container_init_s);
        assert_eq!(10, startup.lag_samples(60.0));
    }
}
