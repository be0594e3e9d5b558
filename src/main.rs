//! rostergrid - Entry Point

use clap::Parser;
use rostergrid::model::{Column, Filters, Pagination, Record, SortSpec, TableRow};
use rostergrid::source::{DataSource, Dataset, SimulatedServer};
use rostergrid::state::{DataMode, TableCallbacks, TableSessionBuilder};
use rostergrid::view::{ColorConfig, ShellOptions};
use rostergrid::view_state::ExportFormat;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Rows generated when no dataset file is given.
const SAMPLE_ROWS: usize = 1000;

/// rostergrid - virtualized data table in the terminal
#[derive(Parser, Debug)]
#[command(name = "rostergrid")]
#[command(version)]
#[command(about = "Browse, filter, edit and export a staff roster in a virtualized terminal table")]
pub struct Args {
    /// Path to a JSON dataset (a generated roster is used if not provided)
    pub file: Option<PathBuf>,

    /// Rows per page (must be positive)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub page_size: Option<u64>,

    /// Serve rows through the simulated remote collaborator
    #[arg(long)]
    pub remote: bool,

    /// Make the collaborator reject every save
    #[arg(long)]
    pub fail_saves: bool,

    /// Make the first N fetches fail
    #[arg(long, default_value = "0")]
    pub fail_fetches: usize,

    /// Collaborator response delay in milliseconds
    #[arg(long, default_value = "250")]
    pub latency_ms: u64,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Logs every table notification.
struct TracingCallbacks;

impl TableCallbacks<Record> for TracingCallbacks {
    fn on_pagination_change(&mut self, pagination: &Pagination) {
        info!(page = pagination.page(), total = pagination.total(), "page changed");
    }

    fn on_sort_change(&mut self, sort: Option<&SortSpec>) {
        info!(sort = ?sort, "sort changed");
    }

    fn on_filter_change(&mut self, filters: &Filters) {
        info!(filters = ?filters, "filters changed");
    }

    fn on_row_click(&mut self, row: &Record) {
        info!(row = %row.id(), "row activated");
    }

    fn on_selection_change(&mut self, rows: &[Record]) {
        info!(selected = rows.len(), "selection changed");
    }

    fn on_retry(&mut self) {
        info!("retry requested");
    }

    fn on_export(&mut self, format: ExportFormat, rows: &[Record], columns: &[&Column]) {
        info!(%format, rows = rows.len(), columns = columns.len(), "export produced");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = rostergrid::config::load_config_with_precedence(args.config.clone())?;
        let merged = rostergrid::config::merge_config(config_file);
        let with_env = rostergrid::config::apply_env_overrides(merged);
        let page_size = args.page_size.and_then(|n| usize::try_from(n).ok());
        rostergrid::config::apply_cli_overrides(with_env, page_size)
    };

    // Log to a file; the terminal belongs to the TUI
    rostergrid::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let dataset = match &args.file {
        Some(path) => Dataset::load(path)?,
        None => Dataset::sample(SAMPLE_ROWS),
    };
    let columns = dataset.columns()?;
    let server = SimulatedServer::new(columns.clone(), dataset.rows)
        .fail_saves(args.fail_saves)
        .fail_next_fetches(args.fail_fetches);

    let mode = if args.remote { DataMode::Remote } else { DataMode::Local };
    let mut builder = TableSessionBuilder::new(columns)
        .features(config.features())
        .mode(mode)
        .callbacks(TracingCallbacks)
        .bulk_action(
            "archive",
            Box::new(|rows: &[Record]| {
                let ids: Vec<String> = rows.iter().map(|row| row.id().to_string()).collect();
                info!(rows = ?ids, "archive requested");
            }),
        );
    if mode == DataMode::Local {
        builder = builder.rows(server.rows().to_vec());
    }
    if let Some(options) = dataset.status_options {
        builder = builder.status_options(options);
    }
    let session = builder.build()?;

    let options = ShellOptions {
        colors: ColorConfig::from_env_and_args(args.no_color),
        latency: Duration::from_millis(args.latency_ms),
        ..ShellOptions::default()
    };
    rostergrid::view::run(session, server, options)?;

    Ok(())
}
