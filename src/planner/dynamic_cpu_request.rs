use log::debug;

use crate::config::RecommenderConfig;
use crate::metrics::percentile::{ceil_tolerant, percentile, round_up};
use crate::model::plan::{ScalingMethod, ScalingPlan};
use crate::model::sample::WorkloadTimeseries;
use crate::planner::interface::ScalingPlanner;
use crate::planner::memory_request_mi;

/// DCR keeps replica bounds close to what was observed and sizes the per-replica cpu request so
/// that `min_replicas` replicas cover the `percentile_threshold` percentile of summed usage.
/// HPA target is 1.0, the autoscaler only reacts to usage above the request.
pub struct DynamicCpuRequest {}

impl ScalingPlanner for DynamicCpuRequest {
    fn method(&self) -> ScalingMethod {
        ScalingMethod::DCR
    }

    fn plan(&self, timeseries: &WorkloadTimeseries, config: &RecommenderConfig) -> ScalingPlan {
        let ceiling = config.max_replica_ceiling;

        let baseline_replicas =
            percentile(&timeseries.replica_counts(), config.baseline_percentile).unwrap_or(1.0);
        let min_replicas = (baseline_replicas.floor() as u32).clamp(1, ceiling);

        let peak_replicas = timeseries.max_replicas() as f64 * config.replica_safety_margin;
        let max_replicas = (ceil_tolerant(peak_replicas) as u32).clamp(min_replicas, ceiling);

        let usage = percentile(&timeseries.cpu_usage(), config.percentile_threshold).unwrap_or(0.0);
        let cpu_request = round_up(usage / min_replicas as f64, 3).max(config.min_cpu_request);

        debug!(
            "DCR: p{} of cpu usage {:.3} over {} min replicas, request {:.3}",
            config.percentile_threshold, usage, min_replicas, cpu_request
        );

        ScalingPlan {
            method: ScalingMethod::DCR,
            recommended_cpu_request: cpu_request,
            recommended_cpu_limit: 0.0,
            recommended_mem_request_and_limits_mi: memory_request_mi(
                timeseries,
                min_replicas,
                config,
            ),
            recommended_min_replicas: min_replicas,
            recommended_max_replicas: max_replicas,
            recommended_target_cpu_utilization: 1.0,
            max_usage_slope_up_ratio: 0.0,
            startup_latency_samples: 0,
        }
    }
}
