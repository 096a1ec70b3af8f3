//! Turns fetched samples into a `WorkloadTimeseries`: ordered, validated, without idle buckets.

use log::debug;

use crate::error::RecommenderError;
use crate::model::sample::{UsageSample, WorkloadTimeseries};
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};

pub fn prepare_timeseries(
    workload: &WorkloadIdentity,
    window: &AnalysisWindow,
    mut samples: Vec<UsageSample>,
) -> Result<WorkloadTimeseries, RecommenderError> {
    let invalid = |reason: String| RecommenderError::InvalidTimeseries {
        workload: workload.clone(),
        window: *window,
        reason,
    };

    // stable, so the order of equal timestamps is the fetch order
    samples.sort_by_key(|sample| sample.timestamp);

    for sample in samples.iter() {
        let values = [
            ("summed_cpu_usage", sample.summed_cpu_usage),
            ("summed_cpu_request", sample.summed_cpu_request),
            ("summed_mem_usage_mi", sample.summed_mem_usage_mi),
            ("summed_mem_request_mi", sample.summed_mem_request_mi),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{} is {} at {}",
                    name,
                    value,
                    sample.timestamp.to_rfc3339()
                )));
            }
        }
    }

    let interval_seconds = sample_interval(&samples).map_err(invalid)?;

    let total = samples.len();
    samples.retain(|sample| sample.replica_count > 0);
    if samples.len() < total {
        debug!(
            "Dropped {} samples without running replicas of workload {}",
            total - samples.len(),
            workload
        );
    }

    Ok(WorkloadTimeseries::new(samples, interval_seconds))
}

/// Returns the spacing of sorted samples in seconds, None for fewer than two samples.
fn sample_interval(samples: &[UsageSample]) -> Result<Option<i64>, String> {
    let mut interval = None;
    for pair in samples.windows(2) {
        let step = (pair[1].timestamp - pair[0].timestamp).num_seconds();
        if step <= 0 {
            return Err(format!(
                "duplicated sample at {}",
                pair[1].timestamp.to_rfc3339()
            ));
        }
        match interval {
            None => interval = Some(step),
            Some(expected) if expected != step => {
                return Err(format!(
                    "non-uniform sample interval: {}s then {}s at {}",
                    expected,
                    step,
                    pair[1].timestamp.to_rfc3339()
                ))
            }
            Some(_) => {}
        }
    }
    Ok(interval)
}
