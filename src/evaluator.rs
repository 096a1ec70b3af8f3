//! Replays candidate plans against the timeseries and ranks them.

use std::cmp::Ordering;

use log::{info, warn};

use crate::autoscalers::horizontal_pod_autoscaler::kube_horizontal_pod_autoscaler::KubeHorizontalPodAutoscaler;
use crate::config::RecommenderConfig;
use crate::error::RecommenderError;
use crate::evaluator::replay::replay_plan;
use crate::model::plan::CandidatePlans;
use crate::model::recommendation::{
    Evaluation, PlanEvaluation, RecommendationsSummary, RejectedPlan,
};
use crate::model::sample::WorkloadTimeseries;
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};
use crate::planner::required_samples;
use crate::startup::startup_model::StartupTime;

pub mod replay;
pub mod savings;

/// Total order of plan evaluations, best first: fewer violations, then larger savings, then
/// method order.
pub fn compare_evaluations(a: &PlanEvaluation, b: &PlanEvaluation) -> Ordering {
    a.violation_count
        .cmp(&b.violation_count)
        .then_with(|| b.avg_saving_in_cpus.total_cmp(&a.avg_saving_in_cpus))
        .then_with(|| a.plan.method.cmp(&b.plan.method))
}

pub fn evaluate(
    timeseries: &WorkloadTimeseries,
    workload: &WorkloadIdentity,
    window: &AnalysisWindow,
    plans: &CandidatePlans,
    startup: &StartupTime,
    config: &RecommenderConfig,
) -> Result<Evaluation, RecommenderError> {
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

    let hpa = KubeHorizontalPodAutoscaler::new(config.horizontal_pod_autoscaler());
    let mut evaluations = vec![];
    let mut rejected_plans = vec![];

    for plan in plans.iter() {
        if plan.max_usage_slope_up_ratio > config.hpa_scale_limit {
            let reason = format!(
                "{} plan usage grows {}x within one startup window, above the scale limit of {}",
                plan.method, plan.max_usage_slope_up_ratio, config.hpa_scale_limit
            );
            warn!("Rejecting plan for workload {}: {}", workload, reason);
            rejected_plans.push(RejectedPlan {
                method: plan.method,
                reason,
            });
            continue;
        }
        match replay_plan(plan, timeseries, interval, lag, &hpa, config) {
            Ok(evaluation) => {
                info!(
                    "{} plan for workload {}: {} violations, average saving {:.3} cpus",
                    plan.method, workload, evaluation.violation_count, evaluation.avg_saving_in_cpus
                );
                evaluations.push(evaluation);
            }
            Err(divergence) => {
                warn!("Rejecting plan for workload {}: {}", workload, divergence);
                rejected_plans.push(RejectedPlan {
                    method: plan.method,
                    reason: divergence.to_string(),
                });
            }
        }
    }

    evaluations.sort_by(compare_evaluations);

    let best = match evaluations.first() {
        Some(best) => best,
        None => {
            let reasons: Vec<&str> = rejected_plans
                .iter()
                .map(|rejected| rejected.reason.as_str())
                .collect();
            return Err(RecommenderError::SimulationDiverged {
                workload: workload.clone(),
                window: *window,
                reason: reasons.join("; "),
            });
        }
    };

    let summary = RecommendationsSummary {
        workload: workload.clone(),
        analysis_period_start: timeseries.first_timestamp().unwrap_or(window.start),
        analysis_period_end: timeseries.last_timestamp().unwrap_or(window.end),
        chosen_plan: best.plan.clone(),
        min_replicas_observed: timeseries.min_replicas(),
        max_replicas_observed: timeseries.max_replicas(),
        avg_cpu_saving_per_day: best.avg_saving_in_cpus,
        violation_count: best.violation_count,
        forecast_cpu_saving: best.forecast_cpu_saving,
        forecast_mem_saving_mi: best.forecast_mem_saving_mi,
        startup_time: startup.clone(),
        rejected_plans,
    };
    let analysis = best.rows.clone();

    Ok(Evaluation {
        summary,
        analysis,
        evaluations,
    })
}
