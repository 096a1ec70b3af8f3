//! Running statistics collected while a plan is replayed.

use average::{concatenate, Estimate, Max, Mean, Min, Variance};
use serde::Serialize;

concatenate!(
    Estimator,
    [Min, min],
    [Max, max],
    [Mean, mean],
    [Variance, population_variance]
);

/// Min, max, mean and population variance of values added one at a time.
#[derive(Default)]
pub struct RunningStats {
    estimator: Estimator,
    count: usize,
}

impl RunningStats {
    pub fn new() -> Self {
        Self {
            estimator: Estimator::new(),
            count: 0,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.estimator.add(value);
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// All zeros when nothing was added.
    pub fn summary(&self) -> StatsSummary {
        if self.count == 0 {
            return StatsSummary::default();
        }
        StatsSummary {
            count: self.count,
            min: self.estimator.min(),
            max: self.estimator.max(),
            mean: self.estimator.mean(),
            variance: self.estimator.population_variance(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub variance: f64,
}
