//! Reads usage timeseries exported as CSV, one row per sample with the workload identity columns:
//! project,cluster,location,namespace,controller_name,timestamp,replica_count,summed_cpu_request,
//! summed_cpu_usage,summed_mem_request_mi,summed_mem_usage_mi

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::sample::UsageSample;
use crate::model::workload::WorkloadIdentity;
use crate::timeseries::generic::{GenericTimeseries, WorkloadSeries};

#[derive(Debug, Deserialize, PartialEq)]
struct CsvSampleRow {
    project: String,
    cluster: String,
    location: String,
    namespace: String,
    controller_name: String,
    timestamp: DateTime<Utc>,
    replica_count: u32,
    summed_cpu_request: f64,
    summed_cpu_usage: f64,
    summed_mem_request_mi: f64,
    summed_mem_usage_mi: f64,
}

pub fn read_timeseries_from_str(csv_str: &str) -> Result<GenericTimeseries, csv::Error> {
    read_timeseries(csv::Reader::from_reader(csv_str.trim_start().as_bytes()))
}

pub fn read_timeseries_from_file(path: &Path) -> Result<GenericTimeseries, csv::Error> {
    read_timeseries(csv::Reader::from_path(path)?)
}

// Rows of one workload keep their file order, workloads are ordered by identity.
fn read_timeseries<R: std::io::Read>(
    mut csv_reader: csv::Reader<R>,
) -> Result<GenericTimeseries, csv::Error> {
    let mut grouped: BTreeMap<WorkloadIdentity, Vec<UsageSample>> = BTreeMap::new();

    for row in csv_reader.deserialize() {
        let row: CsvSampleRow = row?;
        let workload = WorkloadIdentity::new(
            &row.project,
            &row.cluster,
            &row.location,
            &row.namespace,
            &row.controller_name,
        );
        grouped.entry(workload).or_default().push(UsageSample {
            timestamp: row.timestamp,
            replica_count: row.replica_count,
            summed_cpu_request: row.summed_cpu_request,
            summed_cpu_usage: row.summed_cpu_usage,
            summed_mem_request_mi: row.summed_mem_request_mi,
            summed_mem_usage_mi: row.summed_mem_usage_mi,
        });
    }

    Ok(GenericTimeseries {
        workloads: grouped
            .into_iter()
            .map(|(workload, samples)| WorkloadSeries { workload, samples })
            .collect(),
    })
}
