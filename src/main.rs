//! CLI entry point for the AQI rater.
//!
//! Provides subcommands for serving the HTTP API, answering single AQI and
//! threshold queries, rendering the per-state chart, and exporting a report
//! covering every state.

use anyhow::{Context, Result};
use aqi_rater::analyzers::types::AqiReport;
use aqi_rater::chart::render_bar_chart;
use aqi_rater::config::Config;
use aqi_rater::fetch::{BasicClient, read_source};
use aqi_rater::output::{print_json, write_city_csv, write_json};
use aqi_rater::{Aggregator, MeasurementTable, ScoringTables, server};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aqi_rater")]
#[command(about = "Air Quality Index queries over pollutant measurements", long_about = None)]
struct Cli {
    /// CSV file or URL holding the measurements [env: AQI_DATA_SOURCE]
    #[arg(long, global = true, value_name = "FILE_OR_URL")]
    data: Option<String>,

    /// JSON file overriding breakpoint, AQI-scale or threshold tables [env: AQI_TABLES_PATH]
    #[arg(long, global = true)]
    tables: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Location {
    /// State name, matched exactly
    #[arg(short, long)]
    state: String,

    /// City name, matched ignoring case
    #[arg(short, long)]
    city: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Port to listen on [env: AQI_PORT]
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List the states in the data
    States,
    /// List the cities of a state
    Cities {
        #[arg(short, long)]
        state: String,
    },
    /// Report which pollutants exceed their safety threshold in a city
    Check {
        #[command(flatten)]
        location: Location,
    },
    /// Per-pollutant AQI of a city
    CityAqi {
        #[command(flatten)]
        location: Location,
    },
    /// Composite AQI of a city
    Composite {
        #[command(flatten)]
        location: Location,
    },
    /// Mean composite AQI over the cities of a state
    StateAqi {
        #[arg(short, long)]
        state: String,
    },
    /// Per-pollutant AQI of a city together with its state's AQI
    CityAndState {
        #[command(flatten)]
        location: Location,
    },
    /// Render the composite AQI bar chart of a state as SVG
    Plot {
        #[command(flatten)]
        location: Location,

        /// SVG file to write
        #[arg(short, long, default_value = "chart.svg")]
        output: String,
    },
    /// Write every state's AQI breakdown to a JSON file
    Report {
        /// JSON file to write
        #[arg(short, long, default_value = "aqi_report.json")]
        output: String,

        /// Optional: also write one CSV row per city
        #[arg(long)]
        csv: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(data) = cli.data {
        config.data_source = data;
    }
    if let Some(tables) = cli.tables {
        config.tables_path = Some(tables);
    }

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&config.log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&config.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aqi_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let aggregator = load_aggregator(&config).await?;

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            server::serve(Arc::new(aggregator), port).await?;
        }
        Commands::States => {
            print_json(&aggregator.table().states())?;
        }
        Commands::Cities { state } => {
            print_json(&aggregator.table().cities(&state))?;
        }
        Commands::Check { location } => {
            print_json(&aggregator.check_pollution(&location.state, &location.city)?)?;
        }
        Commands::CityAqi { location } => {
            print_json(&aggregator.city_aqi(&location.state, &location.city)?)?;
        }
        Commands::Composite { location } => {
            print_json(&aggregator.composite_aqi(&location.state, &location.city)?)?;
        }
        Commands::StateAqi { state } => {
            print_json(&aggregator.state_aqi(&state)?)?;
        }
        Commands::CityAndState { location } => {
            print_json(&aggregator.city_and_state_aqi(&location.state, &location.city)?)?;
        }
        Commands::Plot { location, output } => {
            let breakdown = aggregator.state_breakdown(&location.state)?;
            let svg = render_bar_chart(&breakdown, Some(&location.city));
            std::fs::write(&output, svg).with_context(|| format!("failed to write {output}"))?;
            info!(output = %output, state = %location.state, "Chart written");
        }
        Commands::Report { output, csv } => {
            let report = AqiReport {
                generated_at: Utc::now(),
                states: aggregator.all_states()?,
            };
            write_json(&output, &report)?;
            if let Some(csv) = csv {
                write_city_csv(&csv, &report.states)?;
            }
            info!(states = report.states.len(), output = %output, "Report written");
        }
    }

    Ok(())
}

/// Loads the scoring tables first so a bad table fails before any data is fetched.
#[tracing::instrument(skip(config), fields(source = %config.data_source))]
async fn load_aggregator(config: &Config) -> Result<Aggregator> {
    let scoring = match &config.tables_path {
        Some(path) => ScoringTables::load(path)
            .with_context(|| format!("failed to load scoring tables from {path}"))?,
        None => ScoringTables::default(),
    };

    let client = BasicClient::new()?;
    let bytes = read_source(&client, &config.data_source).await?;
    let table = MeasurementTable::from_bytes(&bytes)
        .with_context(|| format!("failed to parse measurements from {}", config.data_source))?;

    Ok(Aggregator::new(Arc::new(table), Arc::new(scoring)))
}
