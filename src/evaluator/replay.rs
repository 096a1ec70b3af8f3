//! Sample-by-sample replay of a scaling plan against observed usage.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;

use crate::autoscalers::horizontal_pod_autoscaler::interface::{
    HorizontalPodAutoscalerAlgorithm, ReplicaGroupMetrics,
};
use crate::config::RecommenderConfig;
use crate::evaluator::savings::{fill_trailing_day_mean, saving_in_cpus};
use crate::metrics::collector::RunningStats;
use crate::metrics::percentile::{ceil_tolerant, exceeds};
use crate::model::plan::{ScalingMethod, ScalingPlan};
use crate::model::recommendation::{AnalysisRow, PlanEvaluation};
use crate::model::sample::WorkloadTimeseries;

/// A plan that can not cover usage without going over the replica ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub method: ScalingMethod,
    pub sample_index: usize,
    pub timestamp: DateTime<Utc>,
    pub required_replicas: f64,
    pub ceiling: u32,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} plan needs {} replicas at {} (sample {}), above the ceiling of {}",
            self.method,
            self.required_replicas,
            self.timestamp.to_rfc3339(),
            self.sample_index,
            self.ceiling
        )
    }
}

/// Replays `timeseries` against `plan`.
///
/// The autoscaler target starts at the plan's min replicas and only depends on usage, never on
/// `lag`. Serving replicas are the lowest target of the last `lag` sample intervals, so a new
/// replica serves `lag` intervals after it was decided. The target goes down once the desired
/// count stayed below it for `cooldown_samples` samples, effective from the next sample. Intervals
/// are counted on timestamps, idle samples dropped in preprocessing still pass time.
pub fn replay_plan(
    plan: &ScalingPlan,
    timeseries: &WorkloadTimeseries,
    interval_seconds: f64,
    lag: usize,
    hpa: &dyn HorizontalPodAutoscalerAlgorithm,
    config: &RecommenderConfig,
) -> Result<PlanEvaluation, Divergence> {
    let min_replicas = plan.recommended_min_replicas.max(1);
    let max_replicas = plan.recommended_max_replicas.max(min_replicas);
    let cpu_request = plan.recommended_cpu_request;
    let mem_request = plan.recommended_mem_request_and_limits_mi;
    let lag = lag.max(1) as i64;

    let first_timestamp = timeseries.first_timestamp();
    let position_of = |timestamp: DateTime<Utc>| -> i64 {
        match first_timestamp {
            Some(first) => ((timestamp - first).num_seconds() as f64 / interval_seconds).round() as i64,
            None => 0,
        }
    };

    let mut target = min_replicas;
    // (position the target was decided at, target); the front is the target in effect `lag`
    // intervals ago
    let mut targets: VecDeque<(i64, u32)> = VecDeque::from([(i64::MIN, min_replicas)]);
    let mut below_streak = 0;
    let mut below_window_desired = 0;

    let mut rows = Vec::with_capacity(timeseries.len());
    let mut replica_stats = RunningStats::new();
    let mut saving_stats = RunningStats::new();
    let mut provisioned_cpu_core_seconds = 0.0;
    let mut provisioned_mem_mib_seconds = 0.0;
    let mut baseline_cpu_core_seconds = 0.0;
    let mut baseline_mem_mib_seconds = 0.0;

    for (index, sample) in timeseries.samples().iter().enumerate() {
        let position = position_of(sample.timestamp);
        while targets.len() > 1 && targets[1].0 <= position - lag {
            targets.pop_front();
        }
        let replicas = targets
            .iter()
            .map(|(_, replicas)| *replicas)
            .min()
            .unwrap_or(target);

        let cpu_capacity = replicas as f64 * cpu_request;
        let mem_capacity = replicas as f64 * mem_request;
        let cpu_violation = exceeds(sample.summed_cpu_usage, cpu_capacity);
        let mem_violation = exceeds(sample.summed_mem_usage_mi, mem_capacity);
        if cpu_violation {
            debug!(
                "{} violation at {}: usage {:.3} over capacity {:.3} of {} replicas",
                plan.method,
                sample.timestamp.to_rfc3339(),
                sample.summed_cpu_usage,
                cpu_capacity,
                replicas
            );
        }

        let target_capacity = target as f64 * cpu_request;
        let mut desired = hpa.desired_replicas(&ReplicaGroupMetrics {
            current_replicas: target,
            cpu_utilization: sample.summed_cpu_usage / target_capacity,
            target_cpu_utilization: plan.recommended_target_cpu_utilization,
            min_replicas,
            max_replicas,
        });

        if exceeds(sample.summed_cpu_usage, target_capacity) {
            let required = ceil_tolerant(sample.summed_cpu_usage / cpu_request);
            if required > config.max_replica_ceiling as f64 {
                return Err(Divergence {
                    method: plan.method,
                    sample_index: index,
                    timestamp: sample.timestamp,
                    required_replicas: required,
                    ceiling: config.max_replica_ceiling,
                });
            }
            desired = desired.max((required as u32).min(max_replicas));
        }

        if desired > target {
            target = desired;
            targets.push_back((position, target));
            below_streak = 0;
        } else if desired < target {
            below_window_desired = if below_streak == 0 {
                desired
            } else {
                below_window_desired.max(desired)
            };
            below_streak += 1;
            if below_streak >= config.cooldown_samples {
                target = below_window_desired.max(min_replicas);
                targets.push_back((position, target));
                below_streak = 0;
            }
        } else {
            below_streak = 0;
        }

        let simulated_replicas = replicas;
        let cpu_saving = sample.summed_cpu_request - cpu_capacity;
        let mem_saving_mi = sample.summed_mem_request_mi - mem_capacity;
        let saving = saving_in_cpus(cpu_saving, mem_saving_mi, config.cost_of_gb_in_cpus);

        provisioned_cpu_core_seconds += cpu_capacity * interval_seconds;
        provisioned_mem_mib_seconds += mem_capacity * interval_seconds;
        baseline_cpu_core_seconds += sample.summed_cpu_request * interval_seconds;
        baseline_mem_mib_seconds += sample.summed_mem_request_mi * interval_seconds;
        replica_stats.add(simulated_replicas as f64);
        saving_stats.add(saving);

        rows.push(AnalysisRow {
            timestamp: sample.timestamp,
            method: plan.method,
            observed_replicas: sample.replica_count,
            observed_cpu_request: sample.summed_cpu_request,
            cpu_usage: sample.summed_cpu_usage,
            observed_mem_request_mi: sample.summed_mem_request_mi,
            mem_usage_mi: sample.summed_mem_usage_mi,
            simulated_replicas,
            desired_replicas: desired,
            simulated_cpu_capacity: cpu_capacity,
            simulated_mem_capacity_mi: mem_capacity,
            cpu_saving,
            mem_saving_mi,
            saving_in_cpus: saving,
            saving_in_cpus_1d_mean: 0.0,
            cpu_violation,
            mem_violation,
        });
    }

    fill_trailing_day_mean(&mut rows);

    let count = rows.len().max(1) as f64;
    let mean_of = |value: fn(&AnalysisRow) -> f64| rows.iter().map(value).sum::<f64>() / count;

    Ok(PlanEvaluation {
        plan: plan.clone(),
        violation_count: rows
            .iter()
            .filter(|row| row.cpu_violation || row.mem_violation)
            .count(),
        cpu_violation_count: rows.iter().filter(|row| row.cpu_violation).count(),
        mem_violation_count: rows.iter().filter(|row| row.mem_violation).count(),
        min_replicas_simulated: rows
            .iter()
            .map(|row| row.simulated_replicas)
            .min()
            .unwrap_or(min_replicas),
        max_replicas_simulated: rows
            .iter()
            .map(|row| row.simulated_replicas)
            .max()
            .unwrap_or(min_replicas),
        provisioned_cpu_core_seconds,
        provisioned_mem_mib_seconds,
        baseline_cpu_core_seconds,
        baseline_mem_mib_seconds,
        forecast_cpu_saving: mean_of(|row| row.cpu_saving),
        forecast_mem_saving_mi: mean_of(|row| row.mem_saving_mi),
        avg_saving_in_cpus: mean_of(|row| row.saving_in_cpus),
        replica_stats: replica_stats.summary(),
        saving_stats: saving_stats.summary(),
        rows,
    })
}
