use std::io::Write;
use std::time::Duration;

use hpa_config_recommender::batch::WorkloadRequest;
use hpa_config_recommender::error::RecommenderError;
use hpa_config_recommender::model::plan::ScalingMethod;
use hpa_config_recommender::model::sample::UsageSample;
use hpa_config_recommender::model::workload::{AnalysisWindow, WorkloadIdentity};
use hpa_config_recommender::recommender::Recommender;
use hpa_config_recommender::startup::interface::{GenericStartupHistory, NoStartupHistory};
use hpa_config_recommender::startup::startup_model::StartupSource;
use hpa_config_recommender::test_util::helpers::{
    default_test_config, hourly_samples, spike_samples, test_window, test_workload,
};
use hpa_config_recommender::timeseries::csv::read_timeseries_from_file;
use hpa_config_recommender::timeseries::generic::{GenericTimeseries, WorkloadSeries};
use hpa_config_recommender::timeseries::interface::TimeseriesStore;

fn get_timeseries() -> GenericTimeseries {
    GenericTimeseries::from_yaml(
        r#"
        workloads:
        - workload:
            project: test-project
            cluster: test-cluster
            location: us-central1
            namespace: default
            controller_name: frontend
          samples:
          - {timestamp: 2025-01-01T00:00:00Z, replica_count: 2, summed_cpu_request: 2.0, summed_cpu_usage: 0.8, summed_mem_request_mi: 1024, summed_mem_usage_mi: 600}
          - {timestamp: 2025-01-01T00:01:00Z, replica_count: 2, summed_cpu_request: 2.0, summed_cpu_usage: 0.9, summed_mem_request_mi: 1024, summed_mem_usage_mi: 610}
          - {timestamp: 2025-01-01T00:02:00Z, replica_count: 2, summed_cpu_request: 2.0, summed_cpu_usage: 1.4, summed_mem_request_mi: 1024, summed_mem_usage_mi: 640}
          - {timestamp: 2025-01-01T00:03:00Z, replica_count: 3, summed_cpu_request: 3.0, summed_cpu_usage: 2.1, summed_mem_request_mi: 1536, summed_mem_usage_mi: 800}
          - {timestamp: 2025-01-01T00:04:00Z, replica_count: 3, summed_cpu_request: 3.0, summed_cpu_usage: 1.9, summed_mem_request_mi: 1536, summed_mem_usage_mi: 790}
          - {timestamp: 2025-01-01T00:05:00Z, replica_count: 0, summed_cpu_request: 0.0, summed_cpu_usage: 0.0, summed_mem_request_mi: 0, summed_mem_usage_mi: 0}
          - {timestamp: 2025-01-01T00:06:00Z, replica_count: 2, summed_cpu_request: 2.0, summed_cpu_usage: 1.0, summed_mem_request_mi: 1024, summed_mem_usage_mi: 620}
          - {timestamp: 2025-01-01T00:07:00Z, replica_count: 2, summed_cpu_request: 2.0, summed_cpu_usage: 0.7, summed_mem_request_mi: 1024, summed_mem_usage_mi: 600}
          - {timestamp: 2025-01-01T00:08:00Z, replica_count: 2, summed_cpu_request: 2.0, summed_cpu_usage: 0.8, summed_mem_request_mi: 1024, summed_mem_usage_mi: 605}
          - {timestamp: 2025-01-01T00:09:00Z, replica_count: 2, summed_cpu_request: 2.0, summed_cpu_usage: 0.9, summed_mem_request_mi: 1024, summed_mem_usage_mi: 615}
        "#,
    )
    .unwrap()
}

fn get_startup_history() -> GenericStartupHistory {
    GenericStartupHistory::from_yaml(
        r#"
        workloads:
        - workload:
            project: test-project
            cluster: test-cluster
            location: us-central1
            namespace: default
            controller_name: frontend
          pods:
          - pod_name: frontend-a
            has_readiness_probe: true
            scheduled_at: 2025-01-01T00:03:00Z
            ready_at: 2025-01-01T00:03:20Z
        "#,
    )
    .unwrap()
}

#[test]
fn test_recommend_with_observed_startup() {
    let timeseries = get_timeseries();
    let history = get_startup_history();
    let recommender = Recommender::new(&timeseries, &history, default_test_config(None));

    let recommendation = recommender
        .recommend(&test_workload(), &test_window(10, 60))
        .unwrap();

    let summary = &recommendation.summary;
    assert_eq!(StartupSource::Observed, summary.startup_time.source);
    // 20s container init + 75s node provisioning + 45s hpa, three minute samples
    assert_eq!(140.0, summary.startup_time.total_s);
    assert_eq!(3, summary.chosen_plan.startup_latency_samples);
    // idle sample is not analyzed
    assert_eq!(9, recommendation.analysis.len());
    assert_eq!(2, summary.min_replicas_observed);
    assert_eq!(3, summary.max_replicas_observed);
    assert!(summary.chosen_plan.satisfies_invariants());
    assert_eq!(
        summary.chosen_plan,
        *recommendation.plans.get(summary.chosen_plan.method)
    );
    assert_eq!(recommendation.evaluations[0].plan, summary.chosen_plan);
}

#[test]
fn test_non_uniform_timeseries_is_rejected() {
    let mut timeseries = get_timeseries();
    timeseries.workloads[0].samples.remove(3);
    let recommender = Recommender::new(&timeseries, &NoStartupHistory, default_test_config(None));

    let err = recommender
        .recommend(&test_workload(), &test_window(10, 60))
        .unwrap_err();
    assert!(matches!(err, RecommenderError::InvalidTimeseries { .. }));
}

#[test]
fn test_short_window_is_insufficient() {
    let timeseries = get_timeseries();
    let recommender = Recommender::new(&timeseries, &NoStartupHistory, default_test_config(None));

    // 180s of default startup is three samples, six are needed
    let err = recommender
        .recommend(&test_workload(), &test_window(4, 60))
        .unwrap_err();
    assert!(matches!(
        err,
        RecommenderError::InsufficientData {
            required: 6,
            available: 5,
            ..
        }
    ));
    assert_eq!(Some(&test_workload()), err.workload());
}

/// Store behind a slow backend: fetches fail when the caller gives less time than `latency`.
struct SlowStore {
    latency: Duration,
    inner: GenericTimeseries,
}

impl TimeseriesStore for SlowStore {
    fn fetch(
        &self,
        workload: &WorkloadIdentity,
        window: &AnalysisWindow,
        timeout: Option<Duration>,
    ) -> Result<Vec<UsageSample>, RecommenderError> {
        match timeout {
            Some(timeout) if timeout < self.latency => Err(RecommenderError::FetchTimeout {
                workload: workload.clone(),
                window: *window,
                timeout,
            }),
            _ => self.inner.fetch(workload, window, timeout),
        }
    }

    fn workloads(&self) -> Vec<WorkloadIdentity> {
        self.inner.workloads()
    }
}

#[test]
fn test_fetch_timeout_is_reported() {
    let store = SlowStore {
        latency: Duration::from_secs(30),
        inner: get_timeseries(),
    };

    let recommender = Recommender::new(
        &store,
        &NoStartupHistory,
        default_test_config(Some("fetch_timeout_s: 5")),
    );
    let err = recommender
        .recommend(&test_workload(), &test_window(10, 60))
        .unwrap_err();
    assert_eq!(
        RecommenderError::FetchTimeout {
            workload: test_workload(),
            window: test_window(10, 60),
            timeout: Duration::from_secs(5),
        },
        err
    );

    let recommender = Recommender::new(
        &store,
        &NoStartupHistory,
        default_test_config(Some("fetch_timeout_s: 60")),
    );
    assert!(recommender
        .recommend(&test_workload(), &test_window(10, 60))
        .is_ok());
}

#[test]
fn test_batch_keeps_request_order_and_isolates_failures() {
    let workload = |namespace: &str, name: &str| {
        WorkloadIdentity::new("test-project", "test-cluster", "us-central1", namespace, name)
    };
    let timeseries = GenericTimeseries {
        workloads: vec![
            WorkloadSeries {
                workload: workload("default", "frontend"),
                samples: spike_samples(),
            },
            WorkloadSeries {
                workload: workload("default", "backend"),
                samples: hourly_samples(&[0.5], 1, 1.0, 100.0),
            },
            WorkloadSeries {
                workload: workload("kube-system", "kube-dns"),
                samples: spike_samples(),
            },
            WorkloadSeries {
                workload: workload("shop", "cart"),
                samples: hourly_samples(&[0.2; 24], 2, 0.5, 300.0),
            },
        ],
    };
    let recommender = Recommender::new(
        &timeseries,
        &NoStartupHistory,
        default_test_config(Some("workers: 3")),
    );

    let mut requests: Vec<WorkloadRequest> = timeseries
        .workloads()
        .into_iter()
        .map(|workload| WorkloadRequest {
            workload,
            window: test_window(24, 3600),
        })
        .collect();
    requests.push(WorkloadRequest {
        workload: workload("default", "missing"),
        window: test_window(24, 3600),
    });

    let outcomes = recommender.recommend_batch(&requests);

    assert_eq!(requests.len(), outcomes.len());
    for (request, outcome) in requests.iter().zip(outcomes.iter()) {
        assert_eq!(request.workload, outcome.workload);
    }

    let kinds: Vec<&str> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(_) => "ok",
            Err(err) => err.kind(),
        })
        .collect();
    assert_eq!(
        vec!["ok", "InsufficientData", "ExcludedNamespace", "ok", "Fetch"],
        kinds
    );

    let frontend = outcomes[0].result.as_ref().unwrap();
    assert_eq!(ScalingMethod::DCR, frontend.summary.chosen_plan.method);
}

#[test]
fn test_recommend_from_csv_file() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(
        file,
        "project,cluster,location,namespace,controller_name,timestamp,replica_count,summed_cpu_request,summed_cpu_usage,summed_mem_request_mi,summed_mem_usage_mi"
    )
    .unwrap();
    for hour in 0..12 {
        writeln!(
            file,
            "test-project,test-cluster,us-central1,default,frontend,2025-01-01T{:02}:00:00Z,2,2.0,{},1024,500",
            hour,
            if hour == 6 { 1.8 } else { 0.6 }
        )
        .unwrap();
    }
    file.flush().unwrap();

    let timeseries = read_timeseries_from_file(file.path()).unwrap();
    let recommender = Recommender::new(&timeseries, &NoStartupHistory, default_test_config(None));
    let recommendation = recommender
        .recommend(&test_workload(), &timeseries.time_range().unwrap())
        .unwrap();

    assert_eq!(12, recommendation.analysis.len());
    // both plans are one sample late for the burst at 06:00
    assert_eq!(1, recommendation.summary.violation_count);
    assert!(recommendation.analysis[6].cpu_violation);
}
