//! Paper Scout - analyze new research papers against a local knowledge base.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paper_scout::config::{ConfigLoader, ResearchConfig};
use paper_scout::display;
use paper_scout::session::{ResearchSession, RunEvent};
use paper_scout::ResearchError;

#[derive(Parser)]
#[command(
    name = "paper-scout",
    about = "Analyze new research papers against a local knowledge base",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more papers against the knowledge base.
    Analyze {
        /// Papers to analyze, in order.
        #[arg(required = true)]
        papers: Vec<PathBuf>,
        /// Knowledge-base folder (overrides config).
        #[arg(long)]
        kb: Option<PathBuf>,
        /// Model name (overrides config).
        #[arg(short, long)]
        model: Option<String>,
        /// Delete uploaded files from the service when done.
        #[arg(long)]
        cleanup: bool,
        /// Print only the model output.
        #[arg(long)]
        raw: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<ResearchConfig, ResearchError> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    Ok(loader.load()?)
}

async fn run_analyze(
    config: &ResearchConfig,
    papers: &[PathBuf],
    raw: bool,
) -> Result<(), ResearchError> {
    let session = ResearchSession::connect(config)?;
    session
        .run(papers, |event| match event {
            RunEvent::Report(result) => display::print_report(result, raw),
            _ if raw => {}
            RunEvent::Loading(folder) => display::print_loading(&folder.display().to_string()),
            RunEvent::Loaded(kb) => display::print_knowledge_base(kb),
            RunEvent::Analyzing { paper, model } => {
                display::print_analyzing(&paper.display().to_string(), model);
            }
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Analyze {
            papers,
            kb,
            model,
            cleanup,
            raw,
        } => {
            let mut config = config;
            if let Some(kb) = kb {
                config.knowledge_base.folder = kb;
            }
            if let Some(model) = model {
                config.ai.model = model;
            }
            config.cleanup_uploads |= cleanup;
            tracing::info!(
                papers = papers.len(),
                model = %config.ai.model,
                folder = %config.knowledge_base.folder.display(),
                "Starting analysis run"
            );
            run_analyze(&config, &papers, raw).await
        }
        Commands::Config => match toml::to_string_pretty(&config) {
            Ok(text) => {
                print!("{text}");
                Ok(())
            }
            Err(e) => {
                display::print_error(&format!("Failed to render config: {e}"));
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
