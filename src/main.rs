mod app;
mod color;
mod data;
mod filter;
mod network;
mod plot;
mod util;

use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use log::info;

use crate::app::{AppConfig, AtlasApp, Dashboard};
use crate::filter::{CategoryFilter, NetworkFilter, SignFilter};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Verbosity {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // lowercase matches the RUST_LOG filter syntax
        let lowercase = format!("{self:?}").to_lowercase();
        write!(f, "{lowercase}")
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Correlation table with KRAB-ZNF, Gene, coef and exp columns.
    #[arg(long, default_value = "data/znfs_genes_correlation_forNetwork.csv")]
    network_csv: PathBuf,

    /// Motif feature table (upper-case columns, leading index column).
    #[arg(long, default_value = "data/df_dashboard.csv")]
    motifs_csv: PathBuf,

    /// Genomic hit table loaded when no file has been dropped on the window.
    #[arg(long, default_value = "my.csv")]
    hits_csv: PathBuf,

    /// Dashboard shown on start.
    #[arg(long, value_enum, default_value_t = Dashboard::default())]
    dashboard: Dashboard,

    #[arg(long, value_enum, default_value_t = Verbosity::default())]
    verbosity: Verbosity,

    /// Write the network chart as JSON to this file and exit.
    #[arg(long, value_name = "FILE")]
    export_network: Option<PathBuf>,

    /// Correlation sign filter.
    #[arg(long, value_enum, default_value_t = SignFilter::default())]
    sign: SignFilter,

    /// Expression category filter.
    #[arg(long, value_enum, default_value_t = CategoryFilter::default())]
    category: CategoryFilter,
}

fn export_network(args: &Args, output: &Path) -> Result<()> {
    let records = data::load_correlations(&args.network_csv)?;
    let filter = NetworkFilter {
        sign: args.sign,
        category: args.category,
    };
    let view = network::run_pipeline(&records, filter);

    let json = serde_json::to_string_pretty(&view.chart).context("failed to encode chart")?;
    fs::write(output, json)
        .with_context(|| format!("failed to write chart to {}", output.display()))?;
    info!(
        "wrote {} nodes and {} edges to {}",
        view.chart.markers.len(),
        view.chart.edges.len(),
        output.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.verbosity.to_string()),
    )
    .init();

    if let Some(output) = &args.export_network {
        return export_network(&args, output);
    }

    let config = AppConfig {
        network_csv: args.network_csv,
        motifs_csv: args.motifs_csv,
        hits_csv: args.hits_csv,
        dashboard: args.dashboard,
        network_filter: NetworkFilter {
            sign: args.sign,
            category: args.category,
        },
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "te-atlas",
        options,
        Box::new(move |cc| Ok(Box::new(AtlasApp::new(cc, config)))),
    )
    .map_err(|error| anyhow!("failed to start the dashboard window: {error}"))
}
