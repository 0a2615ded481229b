//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use dailybrief_core::{Orchestrator, ProgressReporter};
use dailybrief_patch::{PatchMode, patch, validate};
use dailybrief_shared::{
    AgentStatus, BEGIN_MARKER, BriefConfig, END_MARKER, RunReport, config_file_path, init_config,
    load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// dailybrief — generate and publish the daily intelligence brief.
#[derive(Parser)]
#[command(
    name = "dailybrief",
    version,
    about = "Run data agents, assemble the daily brief, and patch it into a host README.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run all agents and generate today's brief.
    Run {
        /// Host document to patch (defaults to config `host_path`).
        #[arg(long)]
        readme: Option<String>,

        /// Output directory for agent artifacts.
        #[arg(long)]
        out: Option<String>,

        /// Archive directory for dated entries.
        #[arg(long)]
        archive: Option<String>,

        /// Maximum agents in flight at once.
        #[arg(long)]
        pool_size: Option<usize>,

        /// Per-request network timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Check a brief document's structure without touching anything.
    Validate {
        /// Path to the candidate brief document.
        file: String,
    },

    /// Patch arbitrary content into a host document's managed region.
    Patch {
        /// Host document to rewrite in place.
        #[arg(long)]
        host: String,

        /// File holding the replacement content.
        #[arg(long)]
        content: String,

        /// The content carries its own marker copies (replaces the host's
        /// markers too, instead of only the interior span).
        #[arg(long)]
        inclusive: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Print the config file path.
    Path,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "dailybrief=info",
        1 => "dailybrief=debug",
        _ => "dailybrief=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            readme,
            out,
            archive,
            pool_size,
            timeout,
        } => {
            cmd_run(
                readme.as_deref(),
                out.as_deref(),
                archive.as_deref(),
                pool_size,
                timeout,
            )
            .await
        }
        Command::Validate { file } => cmd_validate(&file),
        Command::Patch {
            host,
            content,
            inclusive,
        } => cmd_patch(&host, &content, inclusive),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Path => cmd_config_path(),
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    readme: Option<&str>,
    out: Option<&str>,
    archive: Option<&str>,
    pool_size: Option<usize>,
    timeout: Option<u64>,
) -> Result<()> {
    let config = load_config()?;

    let mut brief = BriefConfig::from(&config);
    if let Some(readme) = readme {
        brief.host_path = PathBuf::from(readme);
    }
    if let Some(out) = out {
        brief.output_dir = PathBuf::from(out);
    }
    if let Some(archive) = archive {
        brief.archive_dir = PathBuf::from(archive);
    }
    if let Some(pool_size) = pool_size {
        brief.pool_size = pool_size;
    }
    if let Some(timeout) = timeout {
        brief.timeout_secs = timeout;
    }

    info!(
        host = %brief.host_path.display(),
        out = %brief.output_dir.display(),
        "starting daily brief generation"
    );

    let agents = dailybrief_agents::roster(&config, &brief)?;
    let orchestrator = Orchestrator::new(agents, brief);

    let reporter = CliProgress::new();
    // Per-agent failures are reported, not fatal: the run itself succeeds
    // whenever the orchestration completes.
    let report = orchestrator.run(&reporter).await?;

    println!();
    for agent in &report.agents {
        let mark = if agent.status == AgentStatus::Success {
            "✅"
        } else {
            "❌"
        };
        match &agent.error {
            Some(error) => println!("  {mark} {}: {error}", agent.agent),
            None => println!("  {mark} {}", agent.agent),
        }
    }
    println!();
    println!(
        "  Host updated:    {}",
        if report.host_updated { "✅" } else { "❌" }
    );
    println!(
        "  Archive written: {}",
        if report.archive_written { "✅" } else { "❌" }
    );
    println!("  Run ID:          {}", report.run_id);
    println!("  Time:            {:.1}s", report.elapsed_ms as f64 / 1000.0);
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// validate / patch
// ---------------------------------------------------------------------------

fn cmd_validate(file: &str) -> Result<()> {
    let content =
        std::fs::read_to_string(file).map_err(|e| eyre!("cannot read '{file}': {e}"))?;

    match validate(&content) {
        Ok(()) => {
            println!("✅ {file}: brief structure is valid");
            Ok(())
        }
        Err(failure) => Err(eyre!("{file}: validation failed: {failure}")),
    }
}

fn cmd_patch(host: &str, content: &str, inclusive: bool) -> Result<()> {
    let host_text =
        std::fs::read_to_string(host).map_err(|e| eyre!("cannot read '{host}': {e}"))?;
    let replacement =
        std::fs::read_to_string(content).map_err(|e| eyre!("cannot read '{content}': {e}"))?;

    let mode = if inclusive {
        PatchMode::Inclusive
    } else {
        PatchMode::Interior
    };

    let patched = patch(&host_text, BEGIN_MARKER, END_MARKER, &replacement, mode)?;
    std::fs::write(host, patched).map_err(|e| eyre!("cannot write '{host}': {e}"))?;

    println!("✅ {host} updated");
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_path() -> Result<()> {
    println!("{}", config_file_path()?.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn agent_finished(&self, name: &str, success: bool) {
        let mark = if success { "✅" } else { "❌" };
        self.spinner.println(format!("  {mark} {name}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}
