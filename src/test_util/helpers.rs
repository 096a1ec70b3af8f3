use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::config::RecommenderConfig;
use crate::model::sample::{UsageSample, WorkloadTimeseries};
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};
use crate::timeseries::generic::{GenericTimeseries, WorkloadSeries};
use crate::timeseries::preprocessing::prepare_timeseries;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn test_workload() -> WorkloadIdentity {
    WorkloadIdentity::new(
        "test-project",
        "test-cluster",
        "us-central1",
        "default",
        "frontend",
    )
}

/// Window from `base_time` spanning `samples` intervals.
pub fn test_window(samples: usize, interval_seconds: i64) -> AnalysisWindow {
    AnalysisWindow::new(
        base_time(),
        base_time() + Duration::seconds(samples as i64 * interval_seconds),
    )
}

pub fn default_test_config(with_suffix: Option<&str>) -> RecommenderConfig {
    let mut default = r#"
    percentile_threshold: 95
    target_cpu_utilization: 0.7
    cooldown_samples: 5
    "#
    .to_string();

    if let Some(suffix) = with_suffix {
        default.push_str(suffix);
    }

    RecommenderConfig::from_yaml(&default).unwrap()
}

/// Hourly samples from `base_time` with a constant replica count. Cpu usage and memory usage are
/// summed over replicas, requests are per replica. Memory request is twice the usage.
pub fn hourly_samples(
    cpu_usage: &[f64],
    replicas: u32,
    cpu_request_per_replica: f64,
    mem_usage_mi: f64,
) -> Vec<UsageSample> {
    cpu_usage
        .iter()
        .enumerate()
        .map(|(i, usage)| UsageSample {
            timestamp: base_time() + Duration::hours(i as i64),
            replica_count: replicas,
            summed_cpu_request: cpu_request_per_replica * replicas as f64,
            summed_cpu_usage: *usage,
            summed_mem_request_mi: 2.0 * mem_usage_mi,
            summed_mem_usage_mi: mem_usage_mi,
        })
        .collect()
}

/// 24 hourly samples of 0.5 cores with a 4.0 cores spike at samples 20..=22, one replica
/// requesting one core.
pub fn spike_samples() -> Vec<UsageSample> {
    let mut usage = [0.5; 24];
    usage[20..23].fill(4.0);
    hourly_samples(&usage, 1, 1.0, 100.0)
}

pub fn prepared(samples: Vec<UsageSample>) -> WorkloadTimeseries {
    prepare_timeseries(&test_workload(), &test_window(24, 3600), samples).unwrap()
}

pub fn single_workload_store(samples: Vec<UsageSample>) -> GenericTimeseries {
    GenericTimeseries {
        workloads: vec![WorkloadSeries {
            workload: test_workload(),
            samples,
        }],
    }
}
