//! Shooting Trends - NYPD shooting incident trend report generator
//!
//! Runs the whole pipeline once: download (or reuse) the dataset CSV,
//! clean, aggregate, model, render charts, write the HTML report.

use anyhow::{Context, Result};
use clap::Parser;
use shooting_trends::charts::ChartPlotter;
use shooting_trends::data::{
    Aggregator, DataCleaner, DataLoader, DatasetFetcher, DEFAULT_DATASET_URL,
};
use shooting_trends::report::{DatasetSummary, ReportCharts, ReportGenerator, SessionInfo};
use shooting_trends::stats::RaceModel;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shooting-trends", version, about = "NYPD shooting incident trend report")]
struct Args {
    /// Dataset URL to download
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    url: String,

    /// Use a local CSV instead of downloading
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory for the report and charts
    #[arg(long, default_value = "report", value_name = "DIR")]
    out: PathBuf,

    /// Open the finished report in the default browser
    #[arg(long)]
    open: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    // Stage 1: obtain the raw CSV.
    let (csv_path, source) = match &args.input {
        Some(path) => (path.clone(), path.display().to_string()),
        None => {
            let dest = args.out.join("dataset.csv");
            info!(url = %args.url, "downloading dataset");
            let fetcher = DatasetFetcher::new()?;
            let bytes = fetcher
                .download(&args.url, &dest)
                .context("dataset download failed")?;
            info!(bytes, "dataset downloaded");
            (dest, args.url.clone())
        }
    };

    // Stage 2: parse.
    let df = DataLoader::load_csv(&csv_path)
        .with_context(|| format!("loading {}", csv_path.display()))?;
    info!(rows = df.height(), "dataset loaded");

    // Stage 3: clean.
    let incidents = DataCleaner::clean(&df).context("cleaning dataset")?;
    info!(rows = incidents.len(), "dataset cleaned");

    // Stage 4: aggregate.
    let daily = Aggregator::daily_counts(&incidents);
    let cumulative = Aggregator::cumulative_counts(&daily);
    info!(
        daily_rows = daily.len(),
        races = Aggregator::races_present(&daily).len(),
        "aggregated daily counts"
    );

    // Stage 5: model.
    let model = RaceModel::fit(&daily);
    let predictions = model.predict(&daily);
    info!(
        n = model.n_observations,
        r_squared = model.r_squared,
        "fitted daily count ~ victim race"
    );

    // Stage 6: charts.
    let top_race = ChartPlotter::top_race(&cumulative);
    ChartPlotter::cumulative_chart(
        &args.out.join("cumulative.png"),
        &cumulative,
        None,
        "Cumulative shooting incidents by victim race",
    )?;
    ChartPlotter::cumulative_chart(
        &args.out.join("cumulative_top.png"),
        &cumulative,
        top_race,
        &match top_race {
            Some(race) => format!("Cumulative shooting incidents, {} victims", race.label()),
            None => "Cumulative shooting incidents, single category".to_string(),
        },
    )?;
    ChartPlotter::regression_chart(&args.out.join("regression.png"), &predictions)?;
    info!("charts rendered");

    // Stage 7: report.
    let summary = DatasetSummary::from_incidents(&incidents);
    let session = SessionInfo::now(source);
    let charts = ReportCharts {
        cumulative: "cumulative.png".to_string(),
        filtered: "cumulative_top.png".to_string(),
        filtered_race: top_race,
        regression: "regression.png".to_string(),
    };
    let report_path =
        ReportGenerator::write_html(&args.out, &session, &summary, &model, &charts)?;
    ReportGenerator::write_summary_json(&args.out, &session, &summary, &model)?;
    info!(path = %report_path.display(), "report written");

    if args.open {
        open::that(&report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
    }

    Ok(())
}
