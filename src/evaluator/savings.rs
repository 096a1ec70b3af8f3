//! Conversion of memory savings into cpus and trailing averages of savings.

use chrono::Duration;

use crate::model::recommendation::AnalysisRow;

const MIB_IN_GIB: f64 = 1024.0;

/// Cpu saving plus memory saving priced in cpus: one GiB costs as much as `cost_of_gb_in_cpus` cpus.
pub fn saving_in_cpus(cpu_saving: f64, mem_saving_mi: f64, cost_of_gb_in_cpus: f64) -> f64 {
    cpu_saving + (mem_saving_mi / MIB_IN_GIB) / cost_of_gb_in_cpus
}

/// Sets `saving_in_cpus_1d_mean` of each row to the mean saving over rows in (t - 1 day, t].
/// Rows are ordered by timestamp.
pub fn fill_trailing_day_mean(rows: &mut [AnalysisRow]) {
    let day = Duration::days(1);
    let mut window_start = 0;
    let mut window_sum = 0.0;

    for index in 0..rows.len() {
        window_sum += rows[index].saving_in_cpus;
        while rows[window_start].timestamp <= rows[index].timestamp - day {
            window_sum -= rows[window_start].saving_in_cpus;
            window_start += 1;
        }
        rows[index].saving_in_cpus_1d_mean = window_sum / (index - window_start + 1) as f64;
    }
}
