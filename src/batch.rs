//! Runs recommendations for many workloads on a bounded pool of worker threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use log::{debug, info};

use crate::error::RecommenderError;
use crate::model::recommendation::Recommendation;
use crate::model::workload::{AnalysisWindow, WorkloadIdentity};
use crate::recommender::Recommender;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadRequest {
    pub workload: WorkloadIdentity,
    pub window: AnalysisWindow,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub workload: WorkloadIdentity,
    pub window: AnalysisWindow,
    pub result: Result<Recommendation, RecommenderError>,
}

impl<'a> Recommender<'a> {
    /// Analyzes every requested workload. Outcomes are in request order, a failure of one workload
    /// is reported in its own outcome.
    pub fn recommend_batch(&self, requests: &[WorkloadRequest]) -> Vec<BatchOutcome> {
        if requests.is_empty() {
            return vec![];
        }
        let start = Instant::now();
        let workers = self.config().workers.max(1).min(requests.len());
        let next_request = AtomicUsize::new(0);
        let (sender, receiver) = mpsc::channel();

        thread::scope(|scope| {
            for worker in 0..workers {
                let sender = sender.clone();
                let next_request = &next_request;
                scope.spawn(move || loop {
                    let index = next_request.fetch_add(1, Ordering::SeqCst);
                    let Some(request) = requests.get(index) else {
                        break;
                    };
                    debug!("Worker {} analyzes workload {}", worker, request.workload);
                    let result = self.recommend(&request.workload, &request.window);
                    if sender.send((index, result)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(sender);

        let mut results: Vec<Option<Result<Recommendation, RecommenderError>>> =
            requests.iter().map(|_| None).collect();
        for (index, result) in receiver {
            results[index] = Some(result);
        }

        let outcomes: Vec<BatchOutcome> = requests
            .iter()
            .zip(results)
            .filter_map(|(request, result)| {
                result.map(|result| BatchOutcome {
                    workload: request.workload.clone(),
                    window: request.window,
                    result,
                })
            })
            .collect();

        info!(
            "Analyzed {} workloads on {} workers in {:?}, {} failed",
            outcomes.len(),
            workers,
            start.elapsed(),
            outcomes.iter().filter(|outcome| outcome.result.is_err()).count()
        );
        outcomes
    }
}
