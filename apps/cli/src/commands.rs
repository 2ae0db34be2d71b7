//! CLI command definitions and handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadenrich_core::{
    BatchProgress, BatchReport, EnrichProgress, Pipeline, Route, StageId, StageOutcome,
    enrich_batch,
};
use leadenrich_forum::{ForumSearch, RedditClient};
use leadenrich_shared::{
    AppConfig, EnrichError, EnrichmentRecord, init_config, load_config, validate_api_key,
};

use crate::input::parse_records;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// leadenrich: fill in missing person and company fields on contact records.
#[derive(Parser, Debug)]
#[command(name = "leadenrich", version, about, long_about = None)]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Enrich a single record
    Enrich(EnrichArgs),

    /// Enrich every record in a JSON or JSON-lines file
    Batch {
        /// Input file: a JSON array of records, or one record per line
        #[arg(short, long)]
        input: PathBuf,

        /// Write results here as JSON lines (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Records enriched at once (default: from config)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Per-record deadline in seconds, 0 to disable (default: from config)
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// Research discussion threads
    Forum {
        #[command(subcommand)]
        action: ForumAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
pub struct EnrichArgs {
    /// Whole record as a JSON object; field flags override its keys
    #[arg(long)]
    pub json: Option<String>,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Professional-network profile URL
    #[arg(long, alias = "linkedin-url")]
    pub profile_url: Option<String>,

    #[arg(long)]
    pub company_name: Option<String>,

    #[arg(long)]
    pub company_domain: Option<String>,

    #[arg(long)]
    pub company_description: Option<String>,

    /// Print the run report (route and stage outcomes), not just the record
    #[arg(long)]
    pub report: bool,

    /// Deadline in seconds, 0 to disable (default: from config)
    #[arg(long)]
    pub deadline: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum ForumAction {
    /// Refine a product title and search the forum for threads about it
    Search {
        /// Product title, as verbose as you like
        title: String,
    },

    /// Read a thread and its top-level comments
    Thread {
        /// Thread URL
        url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create default configuration file
    Init,

    /// Show current configuration
    Show,
}

// ---------------------------------------------------------------------------
// Tracing initialization
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber based on CLI flags.
///
/// Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing(cli: &Cli) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => {
            let level = match cli.verbose {
                0 => "leadenrich=info",
                1 => "leadenrich=debug",
                _ => "leadenrich=trace",
            };
            EnvFilter::new(level)
        }
    };

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich(args) => cmd_enrich(args).await,
        Command::Batch {
            input,
            output,
            concurrency,
            deadline,
        } => cmd_batch(&input, output.as_deref(), concurrency, deadline).await,
        Command::Forum { action } => match action {
            ForumAction::Search { title } => cmd_forum_search(&title).await,
            ForumAction::Thread { url } => cmd_forum_thread(&url).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Progress reporter using indicatif
// ---------------------------------------------------------------------------

struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl EnrichProgress for CliProgress {
    fn routed(&self, route: Route) {
        self.spinner.set_message(format!("Routed: {route} path"));
    }

    fn stage_started(&self, stage: StageId) {
        self.spinner.set_message(format!("Running {stage}..."));
    }

    fn stage_finished(&self, outcome: &StageOutcome) {
        if outcome.skipped {
            self.spinner
                .set_message(format!("{} skipped, fields already present", outcome.stage));
        } else {
            self.spinner.set_message(format!(
                "{} filled {} field(s) in {:.1}s",
                outcome.stage,
                outcome.filled.len(),
                outcome.elapsed.as_secs_f64()
            ));
        }
    }
}

impl BatchProgress for CliProgress {
    fn record_finished(&self, index: usize, ok: bool, done: usize, total: usize) {
        let status = if ok { "ok" } else { "failed" };
        self.spinner
            .set_message(format!("Enriched [{done}/{total}] record {index} {status}"));
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn pipeline_config(
    mut config: AppConfig,
    deadline: Option<u64>,
    concurrency: Option<usize>,
) -> AppConfig {
    if let Some(secs) = deadline {
        config.pipeline.deadline_secs = secs;
    }
    if let Some(n) = concurrency {
        config.pipeline.concurrency = n;
    }
    config
}

/// Build the input record from `--json` and the field flags.
fn enrich_input(args: &EnrichArgs) -> Result<EnrichmentRecord> {
    let mut value = match &args.json {
        Some(raw) => serde_json::from_str(raw).wrap_err("--json is not valid JSON")?,
        None => serde_json::Value::Object(Default::default()),
    };

    let flags = [
        ("full_name", &args.full_name),
        ("first_name", &args.first_name),
        ("last_name", &args.last_name),
        ("title", &args.title),
        ("email", &args.email),
        ("profile_url", &args.profile_url),
        ("company_name", &args.company_name),
        ("company_domain", &args.company_domain),
        ("company_description", &args.company_description),
    ];
    if let Some(map) = value.as_object_mut() {
        for (key, flag) in flags {
            if let Some(v) = flag {
                map.insert(key.to_string(), serde_json::Value::String(v.clone()));
            }
        }
    }

    Ok(EnrichmentRecord::normalize(&value))
}

async fn cmd_enrich(args: EnrichArgs) -> Result<()> {
    let config = pipeline_config(load_config()?, args.deadline, None);
    validate_api_key(&config)?;

    let record = enrich_input(&args)?;
    let pipeline = Pipeline::from_config(&config)?;
    info!(deadline = ?pipeline.options().deadline, "pipeline ready");

    let progress = CliProgress::new();
    let result = pipeline.run_with_report(record, &progress).await;
    progress.finish();
    let report = result?;

    info!(
        run_id = %report.run_id,
        route = %report.route,
        stages = report.stages.len(),
        "enrichment complete"
    );

    let out = if args.report {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(&report.record)?
    };
    println!("{out}");
    Ok(())
}

/// One output line per input record.
#[derive(Serialize)]
struct BatchLine<'a> {
    index: usize,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a EnrichmentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn batch_lines(report: &BatchReport) -> Result<String> {
    let mut out = String::new();
    for (index, result) in report.results.iter().enumerate() {
        let line = match result {
            Ok(run) => BatchLine {
                index,
                ok: true,
                record: Some(&run.record),
                error: None,
            },
            Err(e) => BatchLine {
                index,
                ok: false,
                record: None,
                error: Some(e.to_string()),
            },
        };
        out.push_str(&serde_json::to_string(&line)?);
        out.push('\n');
    }
    Ok(out)
}

async fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    concurrency: Option<usize>,
    deadline: Option<u64>,
) -> Result<()> {
    let config = pipeline_config(load_config()?, deadline, concurrency);
    validate_api_key(&config)?;

    let text = std::fs::read_to_string(input).map_err(|e| EnrichError::io(input, e))?;
    let records = parse_records(&text)
        .wrap_err_with(|| format!("failed to read records from {}", input.display()))?;
    let pipeline = Arc::new(Pipeline::from_config(&config)?);
    info!(
        records = records.len(),
        concurrency = config.pipeline.concurrency,
        deadline = ?pipeline.options().deadline,
        "starting batch"
    );
    let progress = CliProgress::new();
    let report = enrich_batch(pipeline, records, config.pipeline.concurrency, &progress).await;
    progress.finish();

    let lines = batch_lines(&report)?;
    match output {
        Some(path) => std::fs::write(path, lines).map_err(|e| EnrichError::io(path, e))?,
        None => print!("{lines}"),
    }

    eprintln!(
        "✓ Enriched {}/{} records in {:.1}s ({} failed)",
        report.succeeded(),
        report.results.len(),
        report.elapsed().as_secs_f64(),
        report.failed()
    );
    if let Some(path) = output {
        eprintln!("  Results: {}", path.display());
    }
    Ok(())
}

async fn cmd_forum_search(title: &str) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let search = ForumSearch::from_config(&config)?;
    let result = search.run(title).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_forum_thread(url: &str) -> Result<()> {
    let config = load_config()?;
    let client = RedditClient::from_config(&config.forum)?;
    let thread = client.fetch_thread(url).await?;
    println!("{}", serde_json::to_string_pretty(&thread)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("✓ Config file created at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
