//! # wx-curves
//!
//! Command line front end for `wx-log-data`. Logs come from a JSON store
//! fixture loaded into the in-memory store.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use wx_log_data::{
    full_window, ExportOptions, ExportScope, InMemoryLogStore, IndexWindow, LogDataApi,
    LogDataConfig, LogDataService, LogDataTable, LogHeader, LogReference, Outcome, StreamState,
};

/// wx-curves: read, coalesce, export and stream well-log curve data
#[derive(Parser, Debug)]
#[command(name = "wx-curves")]
#[command(about = "Well-log curve data from a store fixture")]
pub struct Cli {
    /// Store fixture (JSON)
    #[arg(short, long)]
    pub fixture: PathBuf,

    /// Log data configuration (JSON); defaults apply to missing fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rows the store returns per call
    #[arg(long, default_value = "10000")]
    pub max_rows_per_call: usize,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a log header with the index curve first
    Info {
        /// Log as `well/wellbore/log`
        log: String,
    },
    /// Read curves over an index window (the full log by default)
    Read {
        /// Log as `well/wellbore/log`
        log: String,
        /// Curves to read, comma separated
        #[arg(long, value_delimiter = ',')]
        curves: Vec<String>,
        /// Window start
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Window end
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Exclude the start index itself
        #[arg(long)]
        exclusive: bool,
    },
    /// Coalesce selected row positions of the full log into index ranges
    Ranges {
        /// Log as `well/wellbore/log`
        log: String,
        /// Row positions, comma separated
        #[arg(long, value_delimiter = ',')]
        rows: Vec<usize>,
    },
    /// Delete curve values of selected rows
    Delete {
        /// Log as `well/wellbore/log`
        log: String,
        /// Curves whose values are deleted, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        curves: Vec<String>,
        /// Row positions, comma separated
        #[arg(long, value_delimiter = ',')]
        rows: Vec<usize>,
    },
    /// Export curves as delimited text
    Export {
        /// Log as `well/wellbore/log`
        log: String,
        /// Curves to export, comma separated
        #[arg(long, value_delimiter = ',')]
        curves: Vec<String>,
        /// Rows to export
        #[arg(long, value_enum, default_value = "all")]
        scope: ScopeArg,
        /// Row positions for `--scope selected`
        #[arg(long, value_delimiter = ',')]
        rows: Vec<usize>,
        /// Value separator
        #[arg(long, default_value = ",")]
        separator: String,
    },
    /// Stream a growing log until stopped
    Stream {
        /// Log as `well/wellbore/log`
        log: String,
        /// Curves to stream, comma separated
        #[arg(long, value_delimiter = ',')]
        curves: Vec<String>,
        /// Seconds between polls
        #[arg(long)]
        refresh_secs: Option<f64>,
        /// Stop after this many seconds (the auto-stop ceiling still applies)
        #[arg(long)]
        duration_secs: Option<u64>,
    },
}

/// Export scope argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Every row of the log
    All,
    /// Every row of the full-log read
    Interval,
    /// Rows at `--rows`
    Selected,
}

/// Parse `well/wellbore/log`.
pub fn parse_reference(raw: &str) -> anyhow::Result<LogReference> {
    let parts: Vec<&str> = raw.split('/').collect();
    match parts.as_slice() {
        [well, wellbore, log] if !well.is_empty() && !wellbore.is_empty() && !log.is_empty() => {
            Ok(LogReference::new(*well, *wellbore, *log))
        }
        _ => bail!("expected well/wellbore/log, got {raw:?}"),
    }
}

/// Build the service from the CLI's fixture and configuration.
pub fn build_service(cli: &Cli) -> anyhow::Result<LogDataService<InMemoryLogStore>> {
    let fixture = std::fs::read_to_string(&cli.fixture)
        .with_context(|| format!("reading fixture {}", cli.fixture.display()))?;
    let store = InMemoryLogStore::from_json(&fixture)?
        .with_max_rows_per_call(cli.max_rows_per_call)
        .with_id(cli.fixture.display().to_string());

    let config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<LogDataConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => LogDataConfig::default(),
    };
    Ok(LogDataService::new(Arc::new(store), config)?)
}

/// Run a command and return its output.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let service = build_service(&cli)?;
    let cancel = CancellationToken::new();

    match cli.command {
        Command::Info { log } => {
            let header = service.get_log(&parse_reference(&log)?).await?;
            Ok(serde_json::to_string_pretty(&header)?)
        }
        Command::Read {
            log,
            curves,
            start,
            end,
            exclusive,
        } => {
            let header = service.get_log(&parse_reference(&log)?).await?;
            let window = match (start, end) {
                (Some(start), Some(end)) => IndexWindow::parse(&start, &end, header.index_type)?,
                _ => full_window(&header)?,
            };
            let table = completed(
                service
                    .read(&header, &curves, &window, !exclusive, &cancel)
                    .await?,
            )?;
            wx_telemetry::log_object_event!(info, "wx-curves", "Read complete", header.reference, rows = table.len());
            render_table(&service, &header, &table, ",").await
        }
        Command::Ranges { log, rows } => {
            let header = service.get_log(&parse_reference(&log)?).await?;
            let table = read_all(&service, &header, &[], &cancel).await?;
            let ranges = service.coalesce(&header, &table, &rows)?;
            Ok(serde_json::to_string_pretty(&ranges)?)
        }
        Command::Delete { log, curves, rows } => {
            let header = service.get_log(&parse_reference(&log)?).await?;
            let table = read_all(&service, &header, &curves, &cancel).await?;
            let ranges = service
                .delete_selected(&header, &curves, &table, &rows)
                .await?;
            wx_telemetry::log_object_event!(info, "wx-curves", "Delete sent", header.reference, ranges = ranges.len());
            Ok(serde_json::to_string_pretty(&ranges)?)
        }
        Command::Export {
            log,
            curves,
            scope,
            rows,
            separator,
        } => {
            let header = service.get_log(&parse_reference(&log)?).await?;
            let table = read_all(&service, &header, &curves, &cancel).await?;
            let scope = match scope {
                ScopeArg::All => ExportScope::All,
                ScopeArg::Interval => ExportScope::IntervalOfData,
                ScopeArg::Selected => ExportScope::SelectedIndexValues(rows),
            };
            let options = ExportOptions {
                separator,
                ..ExportOptions::default()
            };
            let document = completed(
                service
                    .export(&header, &table, &scope, &options, &cancel)
                    .await?,
            )?;
            Ok(document.render())
        }
        Command::Stream {
            log,
            curves,
            refresh_secs,
            duration_secs,
        } => {
            let header = service.get_log(&parse_reference(&log)?).await?;
            let refresh_delay = refresh_secs
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("invalid --refresh-secs")?;
            let session = service
                .start_streaming(&header, &curves, refresh_delay)
                .await?;

            let state = match duration_secs {
                Some(secs) => {
                    tokio::select! {
                        state = session.wait() => state,
                        _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                            service.stop_streaming();
                            session.wait().await
                        }
                    }
                }
                None => session.wait().await,
            };
            if let StreamState::Failed(reason) = &state {
                bail!("stream failed: {reason}");
            }
            if let Some(message) = session.notification() {
                tracing::info!("{message}");
            }
            let table = session.table();
            wx_telemetry::log_object_event!(info, "wx-curves", "Stream ended", header.reference, rows = table.len(), polls = session.refresh_state().polls);
            render_table(&service, &header, &table, ",").await
        }
    }
}

fn completed<T>(outcome: Outcome<T>) -> anyhow::Result<T> {
    match outcome {
        Outcome::Completed(value) => Ok(value),
        Outcome::Cancelled => bail!("operation cancelled"),
    }
}

async fn read_all(
    service: &LogDataService<InMemoryLogStore>,
    header: &LogHeader,
    curves: &[String],
    cancel: &CancellationToken,
) -> anyhow::Result<LogDataTable> {
    let window = full_window(header)?;
    completed(service.read(header, curves, &window, true, cancel).await?)
}

async fn render_table(
    service: &LogDataService<InMemoryLogStore>,
    header: &LogHeader,
    table: &LogDataTable,
    separator: &str,
) -> anyhow::Result<String> {
    let options = ExportOptions {
        separator: separator.to_string(),
        ..ExportOptions::default()
    };
    let document = completed(
        service
            .export(header, table, &ExportScope::IntervalOfData, &options, &CancellationToken::new())
            .await?,
    )?;
    Ok(document.render())
}
