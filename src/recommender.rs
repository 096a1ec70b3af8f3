//! Single-workload recommendation pipeline: fetch, prepare, model startup, plan, evaluate.

use std::time::Instant;

use log::{info, warn};

use crate::config::RecommenderConfig;
use crate::error::RecommenderError;
use crate::evaluator::evaluate;
use crate::model::recommendation::Recommendation;
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};
use crate::planner::generate_plans;
use crate::startup::interface::StartupHistory;
use crate::startup::startup_model::{compute_startup_time, StartupTime};
use crate::timeseries::interface::TimeseriesStore;
use crate::timeseries::preprocessing::prepare_timeseries;

pub struct Recommender<'a> {
    store: &'a dyn TimeseriesStore,
    history: &'a dyn StartupHistory,
    config: RecommenderConfig,
}

impl<'a> Recommender<'a> {
    pub fn new(
        store: &'a dyn TimeseriesStore,
        history: &'a dyn StartupHistory,
        config: RecommenderConfig,
    ) -> Self {
        Self {
            store,
            history,
            config,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn TimeseriesStore {
        self.store
    }

    pub fn recommend(
        &self,
        workload: &WorkloadIdentity,
        window: &AnalysisWindow,
    ) -> Result<Recommendation, RecommenderError> {
        let start = Instant::now();

        if self.config.is_excluded_namespace(&workload.namespace) {
            return Err(RecommenderError::ExcludedNamespace {
                workload: workload.clone(),
                namespace: workload.namespace.clone(),
            });
        }

        let samples = self
            .store
            .fetch(workload, window, self.config.fetch_timeout())?;
        let timeseries = prepare_timeseries(workload, window, samples)?;

        let startup = match compute_startup_time(workload, window, self.history, &self.config.startup)
        {
            Ok(startup) => startup,
            Err(RecommenderError::DataUnavailable { .. }) => {
                warn!(
                    "No pod startup history for workload {}, using default startup time",
                    workload
                );
                StartupTime::from_defaults(&self.config.startup)
            }
            Err(err) => return Err(err),
        };

        let plans = generate_plans(&timeseries, workload, window, &startup, &self.config)?;
        let evaluation = evaluate(&timeseries, workload, window, &plans, &startup, &self.config)?;

        info!(
            "Recommended {} plan for workload {} in {:?} ({} samples)",
            evaluation.summary.chosen_plan.method,
            workload,
            start.elapsed(),
            timeseries.len()
        );

        Ok(Recommendation {
            summary: evaluation.summary,
            analysis: evaluation.analysis,
            plans,
            evaluations: evaluation.evaluations,
        })
    }
}
