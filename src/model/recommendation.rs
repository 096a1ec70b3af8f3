//! Results of plan evaluation handed to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::collector::StatsSummary;
use crate::model::plan::{CandidatePlans, ScalingMethod, ScalingPlan};
use crate::model::workload::WorkloadIdentity;
use crate::startup::startup_model::StartupTime;

/// One row of the per-sample analysis table: the observed sample next to its simulated state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub timestamp: DateTime<Utc>,
    pub method: ScalingMethod,
    pub observed_replicas: u32,
    pub observed_cpu_request: f64,
    pub cpu_usage: f64,
    pub observed_mem_request_mi: f64,
    pub mem_usage_mi: f64,
    pub simulated_replicas: u32,
    pub desired_replicas: u32,
    pub simulated_cpu_capacity: f64,
    pub simulated_mem_capacity_mi: f64,
    pub cpu_saving: f64,
    pub mem_saving_mi: f64,
    /// Cpu saving plus memory saving converted to cpus.
    pub saving_in_cpus: f64,
    /// Mean of `saving_in_cpus` over the trailing day.
    pub saving_in_cpus_1d_mean: f64,
    pub cpu_violation: bool,
    pub mem_violation: bool,
}

/// Outcome of replaying the timeseries against one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEvaluation {
    pub plan: ScalingPlan,
    /// Samples with a cpu or a memory violation.
    pub violation_count: usize,
    pub cpu_violation_count: usize,
    pub mem_violation_count: usize,
    pub min_replicas_simulated: u32,
    pub max_replicas_simulated: u32,
    pub provisioned_cpu_core_seconds: f64,
    pub provisioned_mem_mib_seconds: f64,
    pub baseline_cpu_core_seconds: f64,
    pub baseline_mem_mib_seconds: f64,
    /// Mean over samples.
    pub forecast_cpu_saving: f64,
    /// Mean over samples.
    pub forecast_mem_saving_mi: f64,
    /// Mean over samples, i.e. cpu-days saved per day.
    pub avg_saving_in_cpus: f64,
    pub replica_stats: StatsSummary,
    pub saving_stats: StatsSummary,
    pub rows: Vec<AnalysisRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedPlan {
    pub method: ScalingMethod,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationsSummary {
    pub workload: WorkloadIdentity,
    pub analysis_period_start: DateTime<Utc>,
    pub analysis_period_end: DateTime<Utc>,
    pub chosen_plan: ScalingPlan,
    pub min_replicas_observed: u32,
    pub max_replicas_observed: u32,
    pub avg_cpu_saving_per_day: f64,
    pub violation_count: usize,
    pub forecast_cpu_saving: f64,
    pub forecast_mem_saving_mi: f64,
    pub startup_time: StartupTime,
    pub rejected_plans: Vec<RejectedPlan>,
}

/// What the evaluator returns: evaluations are ranked, the first one is the chosen plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub summary: RecommendationsSummary,
    pub analysis: Vec<AnalysisRow>,
    pub evaluations: Vec<PlanEvaluation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub summary: RecommendationsSummary,
    /// Per-sample analysis of the chosen plan.
    pub analysis: Vec<AnalysisRow>,
    pub plans: CandidatePlans,
    pub evaluations: Vec<PlanEvaluation>,
}
