use hpa_config_recommender::error::RecommenderError;
use hpa_config_recommender::startup::interface::{GenericStartupHistory, NoStartupHistory};
use hpa_config_recommender::startup::startup_model::{
    compute_startup_time, StartupModelConfig, StartupSource,
};
use hpa_config_recommender::test_util::helpers::{test_window, test_workload};

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
            scheduled_at: 2025-01-01T01:00:00Z
            ready_at: 2025-01-01T01:00:30Z
          - pod_name: frontend-b
            scheduled_at: 2025-01-01T02:00:00Z
            ready_at: 2025-01-01T02:00:34Z
          - pod_name: frontend-c
            scheduled_at: 2025-01-01T03:00:00Z
            ready_at: 2025-01-01T03:00:32Z
          - pod_name: frontend-d
            scheduled_at: 2025-01-01T04:00:00Z
            ready_at: 2025-01-01T04:00:40Z
          - pod_name: frontend-stuck
            scheduled_at: 2025-01-01T05:00:00Z
            ready_at: 2025-01-01T05:20:00Z
        "#,
    )
    .unwrap()
}

#[test]
fn test_startup_outliers_are_dropped() {
    let startup = compute_startup_time(
        &test_workload(),
        &test_window(24, 3600),
        &get_startup_history(),
        &StartupModelConfig::default(),
    )
    .unwrap();

    // 1200s of the stuck pod is an outlier, 40s is the largest of the rest
    assert_eq!(40.0, startup.container_init_s);
    assert_eq!(40.0 + 75.0 + 45.0, startup.total_s);
    assert_eq!(StartupSource::Observed, startup.source);
    assert_eq!(3, startup.lag_samples(60.0));
}

#[test]
fn test_startup_components_come_from_config() {
    let config: StartupModelConfig = serde_yaml::from_str(
        r#"
        node_provision_timeout_s: 0
        readiness_grace_period_s: 10
        hpa_processing_time_s: 15
        "#,
    )
    .unwrap();

    let startup = compute_startup_time(
        &test_workload(),
        &test_window(24, 3600),
        &get_startup_history(),
        &config,
    )
    .unwrap();
    assert_eq!(65.0, startup.total_s);
    assert_eq!(10.0, startup.readiness_grace_s);
}

#[test]
fn test_no_history_is_data_unavailable() {
    let err = compute_startup_time(
        &test_workload(),
        &test_window(24, 3600),
        &NoStartupHistory,
        &StartupModelConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RecommenderError::DataUnavailable { .. }));

    // history outside of the window does not count either
    let err = compute_startup_time(
        &test_workload(),
        &test_window(1, 60),
        &get_startup_history(),
        &StartupModelConfig::default(),
    )
    .unwrap_err();
    assert_eq!("DataUnavailable", err.kind());
}
