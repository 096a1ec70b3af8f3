//! Generates one candidate scaling plan per scaling method from a prepared timeseries.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::info;

use crate::config::RecommenderConfig;
use crate::error::RecommenderError;
use crate::metrics::percentile::ceil_tolerant;
use crate::model::plan::{CandidatePlans, ScalingMethod, ScalingPlan};
use crate::model::sample::WorkloadTimeseries;
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};
use crate::planner::dynamic_cpu_request::DynamicCpuRequest;
use crate::planner::dynamic_min_replicas::DynamicMinReplicas;
use crate::planner::interface::ScalingPlanner;
use crate::startup::startup_model::StartupTime;

pub mod dynamic_cpu_request;
pub mod dynamic_min_replicas;
pub mod interface;
pub mod slope;

lazy_static! {
    pub static ref PLANNER_REGISTRY: HashMap<ScalingMethod, Box<dyn ScalingPlanner>> = {
        HashMap::from([
            (
                ScalingMethod::DMR,
                Box::new(DynamicMinReplicas {}) as Box<dyn ScalingPlanner>,
            ),
            (
                ScalingMethod::DCR,
                Box::new(DynamicCpuRequest {}) as Box<dyn ScalingPlanner>,
            ),
        ])
    };
}

/// Per-replica memory request sized for peak summed usage spread over `replicas`, with headroom.
pub fn memory_request_mi(
    timeseries: &WorkloadTimeseries,
    replicas: u32,
    config: &RecommenderConfig,
) -> f64 {
    let per_replica = timeseries.peak_mem_usage_mi() / replicas.max(1) as f64;
    ceil_tolerant(per_replica * (1.0 + config.memory_headroom_pct / 100.0)).max(1.0)
}

/// Smallest number of samples a plan can be derived from with a startup lag of `lag` samples.
pub fn required_samples(lag: usize, config: &RecommenderConfig) -> usize {
    usize::max(2, config.min_sample_windows * lag)
}

pub fn generate_plans(
    timeseries: &WorkloadTimeseries,
    workload: &WorkloadIdentity,
    window: &AnalysisWindow,
    startup: &StartupTime,
    config: &RecommenderConfig,
) -> Result<CandidatePlans, RecommenderError> {
    let insufficient = |required: usize| RecommenderError::InsufficientData {
        workload: workload.clone(),
        window: *window,
        required,
        available: timeseries.len(),
    };

    let interval = timeseries.interval_seconds().ok_or_else(|| insufficient(2))?;
    let lag = startup.lag_samples(interval);
    let required = required_samples(lag, config);
    if timeseries.len() < required {
        return Err(insufficient(required));
    }

    let plan_for = |method: ScalingMethod| -> Result<ScalingPlan, RecommenderError> {
        let planner = PLANNER_REGISTRY.get(&method).ok_or_else(|| {
            RecommenderError::InvalidConfig(format!("no planner registered for {}", method))
        })?;
        let mut plan = planner.plan(timeseries, config);
        slope::apply_startup_window(&mut plan, timeseries, lag);
        info!(
            "{} plan for workload {}: request {:.3}, memory {:.0}Mi, replicas [{}, {}], target {:.2}",
            method,
            workload,
            plan.recommended_cpu_request,
            plan.recommended_mem_request_and_limits_mi,
            plan.recommended_min_replicas,
            plan.recommended_max_replicas,
            plan.recommended_target_cpu_utilization
        );
        Ok(plan)
    };

    Ok(CandidatePlans {
        dmr: plan_for(ScalingMethod::DMR)?,
        dcr: plan_for(ScalingMethod::DCR)?,
    })
}
