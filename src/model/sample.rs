//! Usage samples of a workload and the validated timeseries built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One time bucket of workload usage, summed over all replicas running in the bucket.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UsageSample {
    pub timestamp: DateTime<Utc>,
    pub replica_count: u32,
    pub summed_cpu_request: f64, // in cores
    pub summed_cpu_usage: f64,   // in cores
    pub summed_mem_request_mi: f64,
    pub summed_mem_usage_mi: f64,
}

impl UsageSample {
    pub fn per_replica_cpu_request(&self) -> f64 {
        if self.replica_count == 0 {
            return 0.0;
        }
        self.summed_cpu_request / self.replica_count as f64
    }

    pub fn per_replica_cpu_usage(&self) -> f64 {
        if self.replica_count == 0 {
            return 0.0;
        }
        self.summed_cpu_usage / self.replica_count as f64
    }

    pub fn per_replica_mem_usage_mi(&self) -> f64 {
        if self.replica_count == 0 {
            return 0.0;
        }
        self.summed_mem_usage_mi / self.replica_count as f64
    }
}

/// Ordered samples with uniform spacing, restricted to samples with running replicas.
/// Built by `timeseries::preprocessing::prepare_timeseries`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadTimeseries {
    samples: Vec<UsageSample>,
    /// Distance between consecutive buckets. None when fewer than two buckets were fetched.
    interval_seconds: Option<i64>,
}

impl WorkloadTimeseries {
    pub(crate) fn new(samples: Vec<UsageSample>, interval_seconds: Option<i64>) -> Self {
        Self {
            samples,
            interval_seconds,
        }
    }

    pub fn samples(&self) -> &[UsageSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn interval_seconds(&self) -> Option<f64> {
        self.interval_seconds.map(|interval| interval as f64)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|sample| sample.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.last().map(|sample| sample.timestamp)
    }

    pub fn cpu_usage(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.summed_cpu_usage).collect()
    }

    pub fn mem_usage_mi(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.summed_mem_usage_mi).collect()
    }

    pub fn replica_counts(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.replica_count as f64).collect()
    }

    pub fn min_replicas(&self) -> u32 {
        self.samples
            .iter()
            .map(|s| s.replica_count)
            .min()
            .unwrap_or(0)
    }

    pub fn max_replicas(&self) -> u32 {
        self.samples
            .iter()
            .map(|s| s.replica_count)
            .max()
            .unwrap_or(0)
    }

    pub fn peak_mem_usage_mi(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.summed_mem_usage_mi)
            .fold(0.0, f64::max)
    }
}
