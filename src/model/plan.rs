//! Candidate scaling plans produced by the planner.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scaling methods are ordered: on a full tie during plan selection DMR wins over DCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum ScalingMethod {
    /// Dynamic Min Replicas: keeps the per-replica request, tunes replica bounds.
    DMR,
    /// Dynamic CPU Requests: keeps replicas conservative, tunes the per-replica request.
    DCR,
}

impl ScalingMethod {
    pub const ALL: [ScalingMethod; 2] = [ScalingMethod::DMR, ScalingMethod::DCR];

    pub fn name(&self) -> &'static str {
        match self {
            ScalingMethod::DMR => "DMR",
            ScalingMethod::DCR => "DCR",
        }
    }
}

impl fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScalingPlan {
    pub method: ScalingMethod,
    /// Per-replica cpu request in cores.
    pub recommended_cpu_request: f64,
    /// Per-replica cpu limit in whole cores.
    pub recommended_cpu_limit: f64,
    /// Per-replica memory request, also used as limit.
    pub recommended_mem_request_and_limits_mi: f64,
    pub recommended_min_replicas: u32,
    pub recommended_max_replicas: u32,
    /// HPA target cpu utilization in ratio from 0 to 1, relative to the cpu request.
    pub recommended_target_cpu_utilization: f64,
    /// Largest growth of usage within one startup latency window.
    pub max_usage_slope_up_ratio: f64,
    pub startup_latency_samples: usize,
}

impl ScalingPlan {
    pub fn satisfies_invariants(&self) -> bool {
        self.recommended_min_replicas >= 1
            && self.recommended_min_replicas <= self.recommended_max_replicas
            && self.recommended_cpu_request > 0.0
    }
}

/// One plan per scaling method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePlans {
    pub dmr: ScalingPlan,
    pub dcr: ScalingPlan,
}

impl CandidatePlans {
    pub fn get(&self, method: ScalingMethod) -> &ScalingPlan {
        match method {
            ScalingMethod::DMR => &self.dmr,
            ScalingMethod::DCR => &self.dcr,
        }
    }

    /// Plans in method order.
    pub fn iter(&self) -> impl Iterator<Item = &ScalingPlan> {
        ScalingMethod::ALL
            .into_iter()
            .map(move |method| self.get(method))
    }
}
