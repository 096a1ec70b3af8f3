use std::io::Write;

use prettytable::{row, Table};
use serde::{Deserialize, Serialize};

use crate::batch::BatchOutcome;
use crate::model::recommendation::{AnalysisRow, RecommendationsSummary};
use crate::model::workload::WorkloadIdentity;

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    JSON,
    PrettyTable,
}

pub fn print_outcomes<W: Write>(
    outcomes: &[BatchOutcome],
    format: OutputFormat,
    output: &mut W,
) -> std::io::Result<()> {
    match format {
        OutputFormat::PrettyTable => print_outcomes_as_pretty_table(outcomes, output),
        OutputFormat::JSON => print_outcomes_as_json(outcomes, output),
    }
}

pub fn print_outcomes_as_pretty_table<W: Write>(
    outcomes: &[BatchOutcome],
    output: &mut W,
) -> std::io::Result<()> {
    let mut recommendations_table = Table::new();
    recommendations_table.add_row(row![
        "Workload",
        "Method",
        "CPU request",
        "CPU limit",
        "Memory Mi",
        "Min replicas",
        "Max replicas",
        "Target CPU",
        "Violations",
        "Avg saving (CPUs)",
        "Status"
    ]);

    let mut rejections_table = Table::new();
    rejections_table.add_row(row!["Workload", "Method", "Reason"]);

    for outcome in outcomes {
        match &outcome.result {
            Ok(recommendation) => {
                let summary = &recommendation.summary;
                let plan = &summary.chosen_plan;
                recommendations_table.add_row(row![
                    outcome.workload,
                    plan.method,
                    format!("{:.3}", plan.recommended_cpu_request),
                    plan.recommended_cpu_limit,
                    plan.recommended_mem_request_and_limits_mi,
                    plan.recommended_min_replicas,
                    plan.recommended_max_replicas,
                    format!("{:.2}", plan.recommended_target_cpu_utilization),
                    summary.violation_count,
                    format!("{:.3}", summary.avg_cpu_saving_per_day),
                    "ok"
                ]);
                for rejected in summary.rejected_plans.iter() {
                    rejections_table.add_row(row![
                        outcome.workload,
                        rejected.method,
                        rejected.reason
                    ]);
                }
            }
            Err(err) => {
                recommendations_table.add_row(row![
                    outcome.workload,
                    "-",
                    "-",
                    "-",
                    "-",
                    "-",
                    "-",
                    "-",
                    "-",
                    "-",
                    err.kind()
                ]);
                rejections_table.add_row(row![outcome.workload, "-", err]);
            }
        }
    }

    recommendations_table.print(output)?;
    if rejections_table.len() > 1 {
        rejections_table.print(output)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct OutcomeJSON<'a> {
    workload: &'a WorkloadIdentity,
    status: &'static str,
    summary: Option<&'a RecommendationsSummary>,
    error: Option<String>,
}

pub fn print_outcomes_as_json<W: Write>(
    outcomes: &[BatchOutcome],
    output: &mut W,
) -> std::io::Result<()> {
    let outcomes: Vec<OutcomeJSON> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(recommendation) => OutcomeJSON {
                workload: &outcome.workload,
                status: "ok",
                summary: Some(&recommendation.summary),
                error: None,
            },
            Err(err) => OutcomeJSON {
                workload: &outcome.workload,
                status: err.kind(),
                summary: None,
                error: Some(err.to_string()),
            },
        })
        .collect();

    serde_json::to_writer_pretty(&mut *output, &outcomes)?;
    writeln!(output)
}

/// Writes the per-sample analysis with a header row.
pub fn write_analysis_csv<W: Write>(rows: &[AnalysisRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::batch::BatchOutcome;
    use crate::config::RecommenderConfig;
    use crate::error::RecommenderError;
    use crate::metrics::printer::{print_outcomes, write_analysis_csv, OutputFormat};
    use crate::recommender::Recommender;
    use crate::startup::interface::NoStartupHistory;
    use crate::test_util::helpers::{
        single_workload_store, spike_samples, test_window, test_workload,
    };

    fn outcomes() -> Vec<BatchOutcome> {
        let store = single_workload_store(spike_samples());
        let recommender = Recommender::new(&store, &NoStartupHistory, RecommenderConfig::default());
        let window = test_window(24, 3600);

        vec![
            BatchOutcome {
                workload: test_workload(),
                window,
                result: recommender.recommend(&test_workload(), &window),
            },
            BatchOutcome {
                workload: test_workload(),
                window,
                result: Err(RecommenderError::InsufficientData {
                    workload: test_workload(),
                    window,
                    required: 2,
                    available: 1,
                }),
            },
        ]
    }

    #[test]
    fn test_print_as_json() {
        let mut output = Vec::new();
        print_outcomes(&outcomes(), OutputFormat::JSON, &mut output).unwrap();

        let printed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!("ok", printed[0]["status"]);
        assert_eq!("DCR", printed[0]["summary"]["chosen_plan"]["method"]);
        assert_eq!("frontend", printed[0]["workload"]["controller_name"]);
        assert_eq!("InsufficientData", printed[1]["status"]);
        assert!(printed[1]["summary"].is_null());
    }

    #[test]
    fn test_print_as_pretty_table() {
        let mut output = Vec::new();
        print_outcomes(&outcomes(), OutputFormat::PrettyTable, &mut output).unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("DCR"));
        assert!(printed.contains("InsufficientData"));
        assert!(printed.contains("need at least 2 samples, got 1"));
    }

    #[test]
    fn test_write_analysis_csv() {
        let outcomes = outcomes();
        let recommendation = outcomes[0].result.as_ref().unwrap();

        let mut output = Vec::new();
        write_analysis_csv(&recommendation.analysis, &mut output).unwrap();

        let printed = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(25, lines.len());
        assert!(lines[0].starts_with("timestamp,method,observed_replicas"));
        assert!(lines[1].contains("DCR"));
    }
}
