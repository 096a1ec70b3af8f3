use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::info;

use hpa_config_recommender::batch::WorkloadRequest;
use hpa_config_recommender::config::RecommenderConfig;
use hpa_config_recommender::metrics::printer::{print_outcomes, write_analysis_csv, OutputFormat};
use hpa_config_recommender::model::workload::AnalysisWindow;
use hpa_config_recommender::recommender::Recommender;
use hpa_config_recommender::startup::interface::{
    GenericStartupHistory, NoStartupHistory, StartupHistory,
};
use hpa_config_recommender::timeseries::csv::read_timeseries_from_file;
use hpa_config_recommender::timeseries::generic::GenericTimeseries;

#[derive(Parser)]
struct Args {
    /// Usage timeseries as YAML, or as CSV when the file has a .csv extension.
    #[clap(short, long)]
    timeseries_file: PathBuf,
    #[clap(short, long)]
    config_file: Option<PathBuf>,
    /// Pod startup history as YAML. Default startup time is used without it.
    #[clap(short, long)]
    startup_file: Option<PathBuf>,
    /// Start of the analysis window, e.g. 2025-01-01T00:00:00Z. Defaults to the first sample.
    #[clap(long)]
    start: Option<DateTime<Utc>>,
    /// End of the analysis window. Defaults to the last sample.
    #[clap(long)]
    end: Option<DateTime<Utc>>,
    #[clap(short, long)]
    workers: Option<usize>,
    #[clap(short, long, value_enum, default_value_t = OutputFormat::JSON)]
    format: OutputFormat,
    /// Summary is printed to stdout if not set.
    #[clap(short, long)]
    output_file: Option<PathBuf>,
    /// Directory for per-sample analysis of every recommended workload.
    #[clap(short, long)]
    analysis_dir: Option<PathBuf>,
}

fn read_timeseries(path: &Path) -> anyhow::Result<GenericTimeseries> {
    if path.extension().is_some_and(|extension| extension == "csv") {
        return read_timeseries_from_file(path)
            .with_context(|| format!("could not read timeseries csv {:?}", path));
    }
    let timeseries_yaml = std::fs::read_to_string(path)
        .with_context(|| format!("could not read timeseries file {:?}", path))?;
    GenericTimeseries::from_yaml(&timeseries_yaml)
        .with_context(|| format!("could not parse timeseries file {:?}", path))
}

fn main() -> anyhow::Result<()> {
    // log level INFO by default
    let mut env_logger_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        env_logger_builder.filter_level(log::LevelFilter::Info);
    }
    env_logger_builder.init();

    let args = Args::parse();

    info!("Path to timeseries file: {:?}", args.timeseries_file);
    let timeseries = read_timeseries(&args.timeseries_file)?;

    let mut config = match &args.config_file {
        Some(config_file) => {
            info!("Path to config file: {:?}", config_file);
            let config_yaml = std::fs::read_to_string(config_file)
                .with_context(|| format!("could not read config file {:?}", config_file))?;
            RecommenderConfig::from_yaml(&config_yaml)?
        }
        None => RecommenderConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
        config.validate()?;
    }

    let history: Box<dyn StartupHistory> = match &args.startup_file {
        Some(startup_file) => {
            info!("Path to startup history file: {:?}", startup_file);
            let startup_yaml = std::fs::read_to_string(startup_file)
                .with_context(|| format!("could not read startup file {:?}", startup_file))?;
            Box::new(
                GenericStartupHistory::from_yaml(&startup_yaml)
                    .with_context(|| format!("could not parse startup file {:?}", startup_file))?,
            )
        }
        None => Box::new(NoStartupHistory),
    };

    let Some(range) = timeseries.time_range() else {
        bail!("timeseries file {:?} has no samples", args.timeseries_file);
    };
    let window = AnalysisWindow::new(
        args.start.unwrap_or(range.start),
        args.end.unwrap_or(range.end),
    );
    if window.start >= window.end {
        bail!("analysis window {} is empty", window);
    }

    let recommender = Recommender::new(&timeseries, history.as_ref(), config);
    let requests: Vec<WorkloadRequest> = recommender
        .store()
        .workloads()
        .into_iter()
        .map(|workload| WorkloadRequest { workload, window })
        .collect();
    info!("Analyzing {} workloads in {}", requests.len(), window);

    let outcomes = recommender.recommend_batch(&requests);

    match &args.output_file {
        Some(output_file) => {
            let mut output = BufWriter::new(
                File::create(output_file)
                    .with_context(|| format!("could not create output file {:?}", output_file))?,
            );
            print_outcomes(&outcomes, args.format, &mut output)?;
            output.flush()?;
        }
        None => print_outcomes(&outcomes, args.format, &mut std::io::stdout().lock())?,
    }

    if let Some(analysis_dir) = &args.analysis_dir {
        std::fs::create_dir_all(analysis_dir)?;
        for outcome in outcomes.iter() {
            let Ok(recommendation) = &outcome.result else {
                continue;
            };
            let path = analysis_dir.join(format!("{}.csv", outcome.workload.file_stem()));
            let file = File::create(&path)
                .with_context(|| format!("could not create analysis file {:?}", path))?;
            write_analysis_csv(&recommendation.analysis, file)?;
            info!("Analysis of workload {} written to {:?}", outcome.workload, path);
        }
    }

    Ok(())
}
