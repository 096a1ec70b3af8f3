//! Usage growth within one startup window: how far usage can climb before new replicas are ready.

use crate::model::plan::ScalingPlan;
use crate::model::sample::WorkloadTimeseries;

/// Maximum over `values[i..i + window]` for every `i`, None where the window runs past the end.
pub fn forward_rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|start| {
            values
                .get(start..start + window)
                .map(|slice| slice.iter().copied().fold(f64::MIN, f64::max))
        })
        .collect()
}

fn growth_ratios(values: &[f64], window: usize) -> Vec<f64> {
    forward_rolling_max(values, window)
        .into_iter()
        .zip(values)
        .map(|(rolling_max, value)| match rolling_max {
            Some(rolling_max) if *value > 0.0 => rolling_max / value,
            _ => 0.0,
        })
        .collect()
}

/// Per sample, the larger of per-replica cpu and memory growth ratios within the window.
pub fn usage_slope_up_ratios(timeseries: &WorkloadTimeseries, window: usize) -> Vec<f64> {
    let cpu: Vec<f64> = timeseries
        .samples()
        .iter()
        .map(|sample| sample.per_replica_cpu_usage())
        .collect();
    let mem: Vec<f64> = timeseries
        .samples()
        .iter()
        .map(|sample| sample.per_replica_mem_usage_mi())
        .collect();

    growth_ratios(&cpu, window)
        .into_iter()
        .zip(growth_ratios(&mem, window))
        .map(|(cpu_ratio, mem_ratio)| f64::max(cpu_ratio, mem_ratio))
        .collect()
}

/// Largest slope-up ratio, rounded to two decimals.
pub fn max_usage_slope_up_ratio(timeseries: &WorkloadTimeseries, window: usize) -> f64 {
    let max_ratio = usage_slope_up_ratios(timeseries, window)
        .into_iter()
        .fold(0.0, f64::max);
    (max_ratio * 100.0).round() / 100.0
}

/// Request plus the per-replica share of the highest per-replica usage seen within one window,
/// rounded up to whole cores.
pub fn recommended_cpu_limit(plan: &ScalingPlan, timeseries: &WorkloadTimeseries, window: usize) -> f64 {
    let cpu: Vec<f64> = timeseries
        .samples()
        .iter()
        .map(|sample| sample.per_replica_cpu_usage())
        .collect();
    let peak = forward_rolling_max(&cpu, window)
        .into_iter()
        .flatten()
        .fold(0.0, f64::max);
    (plan.recommended_cpu_request + peak / plan.recommended_max_replicas.max(1) as f64).ceil()
}

/// Fills the fields of `plan` that depend on the startup window of `lag` samples.
pub fn apply_startup_window(plan: &mut ScalingPlan, timeseries: &WorkloadTimeseries, lag: usize) {
    plan.startup_latency_samples = lag;
    plan.max_usage_slope_up_ratio = max_usage_slope_up_ratio(timeseries, lag);
    plan.recommended_cpu_limit = recommended_cpu_limit(plan, timeseries, lag);
}

#[cfg(test)]
mod tests {
    use crate::planner::slope::{forward_rolling_max, max_usage_slope_up_ratio, usage_slope_up_ratios};
    use crate::test_util::helpers::{hourly_samples, prepared};

    #[test]
    fn test_forward_rolling_max() {
        let values = [1.0, 3.0, 2.0, 0.5];
        assert_eq!(
            vec![Some(3.0), Some(3.0), Some(2.0), None],
            forward_rolling_max(&values, 2)
        );
        assert_eq!(
            vec![Some(1.0), Some(3.0), Some(2.0), Some(0.5)],
            forward_rolling_max(&values, 1)
        );
        assert_eq!(vec![None; 4], forward_rolling_max(&values, 5));
    }

    #[test]
    fn test_slope_ratio_takes_larger_of_cpu_and_memory() {
        let mut samples = hourly_samples(&[50.0, 50.0, 20.0, 20.0], 1, 60.0, 0.0);
        for (sample, mem) in samples.iter_mut().zip([150.0, 300.0, 200.0, 100.0]) {
            sample.summed_mem_usage_mi = mem;
        }
        let timeseries = prepared(samples);

        assert_eq!(vec![2.0, 1.0, 1.0, 0.0], usage_slope_up_ratios(&timeseries, 2));
        assert_eq!(2.0, max_usage_slope_up_ratio(&timeseries, 2));
    }
}
