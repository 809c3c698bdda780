//! planbook CLI - Retirement projection workbooks
//!
//! Reads export and comparison requests as JSON and writes XLSX workbooks
//! under their suggested filenames. Failures are reported on stderr as a JSON
//! payload (`{"error": ..., "kind": "request" | "internal"}`) with exit code 1;
//! no file is written unless the whole workbook rendered.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use planbook_core::request::{
    comparison_filename, export_filename, ComparisonRequest, ExportRequest, RequestError,
};
use planbook_render::ExcelRenderer;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "planbook")]
#[command(author, version, about = "Retirement projection workbook renderer", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one scenario's projection workbook
    Export {
        /// Request file ({projection, scenarioName, assets})
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        options: RenderArgs,
    },

    /// Render a comparison workbook for 2 to 5 scenarios
    Compare {
        /// Request file ({scenarios: [...]}); the first scenario is the baseline
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        options: RenderArgs,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Output file (defaults to the suggested filename in --output-dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for suggested filenames
    #[arg(long, env = "PLANBOOK_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Currency symbol appended to amounts
    #[arg(long)]
    currency: Option<String>,

    /// Start detail column groups expanded
    #[arg(long)]
    expanded: bool,

    /// Omit the Summary sheet
    #[arg(long)]
    no_summary: bool,

    /// Omit the Projection (Base) sheet
    #[arg(long)]
    no_base: bool,

    /// Omit chart sheets
    #[arg(long)]
    no_charts: bool,
}

impl RenderArgs {
    fn renderer(&self) -> ExcelRenderer {
        let mut renderer = ExcelRenderer::new();
        if let Some(currency) = &self.currency {
            renderer = renderer.currency(currency.clone());
        }
        if self.expanded {
            renderer = renderer.expanded_details();
        }
        if self.no_summary {
            renderer = renderer.no_summary();
        }
        if self.no_base {
            renderer = renderer.no_base();
        }
        if self.no_charts {
            renderer = renderer.no_charts();
        }
        renderer
    }

    fn destination(&self, suggested: String) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.output_dir.join(suggested))
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match run(cli.command) {
        Ok(path) => println!("{}", path.display()),
        Err(err) => {
            eprintln!("{}", error_payload(&err));
            std::process::exit(1);
        }
    }
}

fn run(command: Commands) -> Result<PathBuf> {
    let started = Instant::now();
    match command {
        Commands::Export { file, options } => {
            let body = read_request(&file)?;
            let request = ExportRequest::from_json(&body)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let scenario = request.into_scenario();

            let bytes = options
                .renderer()
                .render_to_bytes(&scenario)
                .context("Failed to render projection workbook")?;
            let path = options.destination(export_filename(&scenario.label));
            write_workbook(&path, &bytes)?;

            info!(
                scenario = %scenario.label,
                years = scenario.projection.years.len(),
                bytes = bytes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                path = %path.display(),
                "Exported projection workbook"
            );
            Ok(path)
        }
        Commands::Compare { file, options } => {
            let body = read_request(&file)?;
            let request = ComparisonRequest::from_json(&body)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let scenarios = request.into_scenarios();

            let bytes = options
                .renderer()
                .compare_to_bytes(&scenarios)
                .context("Failed to render comparison workbook")?;
            let path = options.destination(comparison_filename(scenarios.len()));
            write_workbook(&path, &bytes)?;

            info!(
                scenarios = scenarios.len(),
                bytes = bytes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                path = %path.display(),
                "Exported comparison workbook"
            );
            Ok(path)
        }
    }
}

fn read_request(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(RequestError::from)
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Write through a temp file in the destination directory, then rename it
/// into place, so a failed write never leaves a truncated workbook behind
fn write_workbook(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Structured error for stderr; request errors are the caller's fault
fn error_payload(err: &anyhow::Error) -> String {
    let kind = if err.downcast_ref::<RequestError>().is_some() {
        "request"
    } else {
        "internal"
    };
    serde_json::json!({
        "error": format!("{err:#}"),
        "kind": kind,
    })
    .to_string()
}
