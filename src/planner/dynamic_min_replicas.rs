use log::debug;

use crate::config::RecommenderConfig;
use crate::metrics::percentile::{ceil_tolerant, percentile, round_up};
use crate::model::plan::{ScalingMethod, ScalingPlan};
use crate::model::sample::WorkloadTimeseries;
use crate::planner::interface::ScalingPlanner;
use crate::planner::memory_request_mi;

/// DMR keeps the per-replica cpu request and derives replica bounds from low and peak usage at the
/// configured HPA target.
pub struct DynamicMinReplicas {}

impl DynamicMinReplicas {
    /// Configured request, else the live per-replica request, else mean per-replica usage.
    fn per_replica_cpu_request(timeseries: &WorkloadTimeseries, config: &RecommenderConfig) -> f64 {
        if let Some(request) = config.dmr_cpu_request {
            return request;
        }
        let live_request = timeseries
            .samples()
            .last()
            .map(|sample| sample.per_replica_cpu_request())
            .unwrap_or(0.0);
        if live_request > 0.0 {
            return live_request;
        }
        let usages: Vec<f64> = timeseries
            .samples()
            .iter()
            .map(|sample| sample.per_replica_cpu_usage())
            .collect();
        if usages.is_empty() {
            return 0.0;
        }
        usages.iter().sum::<f64>() / usages.len() as f64
    }
}

impl ScalingPlanner for DynamicMinReplicas {
    fn method(&self) -> ScalingMethod {
        ScalingMethod::DMR
    }

    fn plan(&self, timeseries: &WorkloadTimeseries, config: &RecommenderConfig) -> ScalingPlan {
        let ceiling = config.max_replica_ceiling;
        let target = config.target_cpu_utilization;

        let cpu_request =
            round_up(Self::per_replica_cpu_request(timeseries, config), 3).max(config.min_cpu_request);
        let replica_capacity = target * cpu_request;

        let usage = timeseries.cpu_usage();
        let baseline_usage = percentile(&usage, config.baseline_percentile).unwrap_or(0.0);
        let peak_usage = percentile(&usage, config.peak_percentile).unwrap_or(0.0);

        let min_replicas = (ceil_tolerant(baseline_usage / replica_capacity) as u32).clamp(1, ceiling);
        let max_replicas =
            (ceil_tolerant(peak_usage / replica_capacity) as u32).clamp(min_replicas, ceiling);

        debug!(
            "DMR: request {:.3} at target {:.2}, p{} usage {:.3}, p{} usage {:.3}",
            cpu_request,
            target,
            config.baseline_percentile,
            baseline_usage,
            config.peak_percentile,
            peak_usage
        );

        ScalingPlan {
            method: ScalingMethod::DMR,
            recommended_cpu_request: cpu_request,
            recommended_cpu_limit: 0.0,
            recommended_mem_request_and_limits_mi: memory_request_mi(
                timeseries,
                min_replicas,
                config,
            ),
            recommended_min_replicas: min_replicas,
            recommended_max_replicas: max_replicas,
            recommended_target_cpu_utilization: target,
            max_usage_slope_up_ratio: 0.0,
            startup_latency_samples: 0,
        }
    }
}
