use std::path::PathBuf;

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};

use triago_core::{OutputFormat, Severity, TriagoConfig};
use triago_engine::hotspots::{detect_hotspots, FeatureHotspot};
use triago_engine::matcher::{match_developers, AssignmentRequest, DeveloperMatch};
use triago_engine::predictor::{predict_resolution_time, Prediction, PredictionRequest};
use triago_store::MemoryStore;

#[derive(Parser)]
#[command(
    name = "triago",
    version,
    about = "Issue-triage analytics from your tracker's history",
    long_about = "Triago turns raw issue history into triage guidance: how long a new issue\n\
                   will take to resolve, which features are bug hotspots, and who should\n\
                   take the next assignment.\n\n\
                   All estimates are recomputed from a JSON snapshot of issue records —\n\
                   deterministic, explainable, and advisory.\n\n\
                   Examples:\n  \
                     triago predict --severity critical --project 1   Estimate resolution time\n  \
                     triago hotspots                                  Rank features by defect risk\n  \
                     triago assign --severity high --project 1        Rank assignment candidates\n  \
                     triago init                                      Create a .triago.toml config"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .triago.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the history snapshot (overrides config)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate resolution time for a new issue
    #[command(long_about = "Estimate resolution time for a new issue.\n\n\
        Finds the most similar resolved issues from the last six months and\n\
        averages their resolution times, weighted by similarity. Falls back to\n\
        a per-severity baseline when history is sparse.\n\n\
        Examples:\n  triago predict --severity critical --project 1\n  \
        triago predict --severity medium --project 1 --assignee 3 --feature 7")]
    Predict {
        /// Severity of the new issue (low, medium, high, critical)
        #[arg(long)]
        severity: Severity,

        /// Project the issue belongs to
        #[arg(long)]
        project: i64,

        /// Intended assignee, if already known
        #[arg(long)]
        assignee: Option<i64>,

        /// Feature the issue is filed against
        #[arg(long)]
        feature: Option<i64>,
    },
    /// Rank features by defect risk
    #[command(long_about = "Rank features by defect risk.\n\n\
        Scores every feature with filed issues on bug density, recurrence,\n\
        severity mix, and open backlog, and classifies its 30-day issue-volume\n\
        trend. Low-risk features without critical bugs are suppressed.\n\n\
        Examples:\n  triago hotspots\n  triago hotspots --limit 5 --format markdown")]
    Hotspots {
        /// Maximum features to show (default: from config)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rank developers for an assignment
    #[command(long_about = "Rank developers for an assignment.\n\n\
        Scores every developer on project membership, relevant experience,\n\
        current workload, fix quality, and resolution speed.\n\n\
        Examples:\n  triago assign --severity high --project 1\n  \
        triago assign --severity low --project 2 --limit 3")]
    Assign {
        /// Severity of the issue to assign (low, medium, high, critical)
        #[arg(long)]
        severity: Severity,

        /// Project the issue belongs to
        #[arg(long)]
        project: i64,

        /// Feature the issue is filed against
        #[arg(long)]
        feature: Option<i64>,

        /// Maximum candidates to show (default: from config)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a default .triago.toml configuration file
    #[command(long_about = "Create a default .triago.toml configuration file.\n\n\
        Generates a commented template with all available options.\n\
        Fails if .triago.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("triago v{version} — issue-triage analytics from your tracker's history\n");

    println!("Quick start:");
    println!("  triago init                                    Create a .triago.toml config file");
    println!("  triago predict --severity high --project 1     Estimate resolution time");
    println!("  triago hotspots                                Rank features by defect risk\n");

    println!("All commands:");
    println!("  predict   Resolution-time estimate for a new issue");
    println!("  hotspots  Feature defect-risk ranking with trends");
    println!("  assign    Developer assignment candidates, best first");
    println!("  init      Create default configuration\n");

    println!("Run 'triago <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "triago=debug" } else { "triago=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<TriagoConfig> {
    match &cli.config {
        Some(path) => TriagoConfig::from_file(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let default_path = std::path::Path::new(".triago.toml");
            if default_path.exists() {
                TriagoConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("reading .triago.toml")
            } else {
                Ok(TriagoConfig::default())
            }
        }
    }
}

fn load_store(cli: &Cli, config: &TriagoConfig) -> Result<MemoryStore> {
    let path = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| config.snapshot.path.clone());
    let store = MemoryStore::from_file(&path)
        .into_diagnostic()
        .wrap_err(format!("loading snapshot {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        issues = store.snapshot().issues.len(),
        "snapshot loaded"
    );
    Ok(store)
}

const CONFIG_TEMPLATE: &str = r#"# Triago configuration.
# All values shown are the defaults.

[snapshot]
# Path to the JSON history snapshot.
path = "snapshot.json"

[report]
# Maximum rows in hotspot and assignment listings.
limit = 20
"#;

fn run_init() -> Result<()> {
    let path = std::path::Path::new(".triago.toml");
    if path.exists() {
        miette::bail!(".triago.toml already exists; refusing to overwrite");
    }
    std::fs::write(path, CONFIG_TEMPLATE)
        .into_diagnostic()
        .wrap_err("writing .triago.toml")?;
    println!("Created .triago.toml");
    Ok(())
}

fn render_prediction(prediction: &Prediction, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(prediction).into_diagnostic()?
            );
        }
        OutputFormat::Text => {
            print!("{prediction}");
        }
        OutputFormat::Markdown => {
            println!("# Resolution Forecast\n");
            println!(
                "**Estimate:** {}h (confidence {:.0}%)\n",
                prediction.value,
                prediction.confidence * 100.0
            );
            for factor in &prediction.factors {
                println!("- {factor}");
            }
        }
    }
    Ok(())
}

fn render_hotspots(hotspots: &[FeatureHotspot], limit: usize, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let top: Vec<_> = hotspots.iter().take(limit).collect();
            println!("{}", serde_json::to_string_pretty(&top).into_diagnostic()?);
        }
        OutputFormat::Text => {
            if hotspots.is_empty() {
                println!("No hotspots detected.");
                return Ok(());
            }
            println!("Bug hotspots (top {limit}):");
            println!("{:-<72}", "");
            for (i, h) in hotspots.iter().take(limit).enumerate() {
                println!(
                    "{:>2}. {:<28} risk={:<3} bugs={:<3} critical={:<2} trend={}",
                    i + 1,
                    h.name,
                    h.risk_score,
                    h.bug_count,
                    h.critical_count,
                    h.trend,
                );
                println!("    {}", h.recommendation);
            }
        }
        OutputFormat::Markdown => {
            println!("# Bug Hotspots\n");
            if hotspots.is_empty() {
                println!("No hotspots detected.");
                return Ok(());
            }
            println!(
                "| Rank | Feature | Risk | Bugs | Critical | Recurring | Trend | Recommendation |"
            );
            println!(
                "|------|---------|------|------|----------|-----------|-------|----------------|"
            );
            for (i, h) in hotspots.iter().take(limit).enumerate() {
                println!(
                    "| {} | {} | {} | {} | {} | {:.0}% | {} | {} |",
                    i + 1,
                    h.name,
                    h.risk_score,
                    h.bug_count,
                    h.critical_count,
                    h.recurring_rate * 100.0,
                    h.trend,
                    h.recommendation,
                );
            }
        }
    }
    Ok(())
}

fn render_matches(matches: &[DeveloperMatch], limit: usize, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let top: Vec<_> = matches.iter().take(limit).collect();
            println!("{}", serde_json::to_string_pretty(&top).into_diagnostic()?);
        }
        OutputFormat::Text => {
            if matches.is_empty() {
                println!("No assignment candidates found.");
                return Ok(());
            }
            println!("Assignment candidates (top {limit}):");
            println!("{:-<72}", "");
            for (i, m) in matches.iter().take(limit).enumerate() {
                let estimate = m
                    .estimated_time
                    .map(|h| format!("  est={h:.0}h"))
                    .unwrap_or_default();
                println!(
                    "{:>2}. {:<24} score={:<3} workload={:<2} availability={}{}",
                    i + 1,
                    m.developer_name,
                    m.score,
                    m.current_workload,
                    m.availability,
                    estimate,
                );
                for reason in &m.reasons {
                    println!("    - {reason}");
                }
            }
        }
        OutputFormat::Markdown => {
            println!("# Assignment Candidates\n");
            if matches.is_empty() {
                println!("No assignment candidates found.");
                return Ok(());
            }
            println!("| Rank | Developer | Score | Workload | Availability | Est. hours |");
            println!("|------|-----------|-------|----------|--------------|------------|");
            for (i, m) in matches.iter().take(limit).enumerate() {
                let estimate = m
                    .estimated_time
                    .map(|h| format!("{h:.0}"))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "| {} | {} | {} | {} | {} | {} |",
                    i + 1,
                    m.developer_name,
                    m.score,
                    m.current_workload,
                    m.availability,
                    estimate,
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    match cli.command {
        None => {
            print_welcome();
            Ok(())
        }
        Some(Command::Predict {
            severity,
            project,
            assignee,
            feature,
        }) => {
            let store = load_store(&cli, &config)?;
            let request = PredictionRequest {
                severity,
                project_id: project,
                assigned_to: assignee,
                feature_id: feature,
            };
            let prediction = predict_resolution_time(&store, &request, Utc::now()).await;
            render_prediction(&prediction, cli.format)
        }
        Some(Command::Hotspots { limit }) => {
            let store = load_store(&cli, &config)?;
            let hotspots = detect_hotspots(&store, Utc::now()).await;
            render_hotspots(&hotspots, limit.unwrap_or(config.report.limit), cli.format)
        }
        Some(Command::Assign {
            severity,
            project,
            feature,
            limit,
        }) => {
            let store = load_store(&cli, &config)?;
            let request = AssignmentRequest {
                severity,
                project_id: project,
                feature_id: feature,
            };
            let matches = match_developers(&store, &request).await;
            render_matches(&matches, limit.unwrap_or(config.report.limit), cli.format)
        }
        Some(Command::Init) => run_init(),
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
