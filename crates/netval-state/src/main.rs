//! netval-state - normalize one device document into its canonical state
//! tree.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use netval_common::{Mode, StateTree};
use netval_state::config::DEFAULT_CONFIG_PATH;
use netval_state::{DeviceDocument, LoggingConfig, NormalizeConfig, Normalizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

/// Network actual-state normalizer
#[derive(Parser, Debug)]
#[command(name = "netval-state")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Device document (YAML or JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Dialect identifier, overriding the document's
    #[arg(short, long)]
    dialect: Option<String>,

    /// Produce validation-authoring output
    #[arg(long)]
    validation: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr).json())
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn render(tree: &StateTree, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(tree).context("Failed to render YAML"),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(tree).context("Failed to render JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = NormalizeConfig::load_or_default(&args.config)
        .with_context(|| format!("Loading {}", args.config.display()))?;
    init_logging(&config.logging);

    info!("--- Starting netval-state ---");
    let mut document = DeviceDocument::load(&args.input)
        .with_context(|| format!("Reading device document {}", args.input.display()))?;
    if let Some(dialect) = &args.dialect {
        document.override_dialect(dialect)?;
    }
    info!(
        "Loaded {} sub-feature output(s) for dialect '{}'",
        document.sub_feature_count(),
        document.dialect.identifier()
    );

    let mode = if args.validation {
        Mode::Validation
    } else {
        config.mode()
    };
    let normalizer = Normalizer::with_builtin(document.dialect.identifier(), mode)
        .with_error_policy(config.engine.error_policy);
    let tree = normalizer
        .normalize(&document.features)
        .context("Normalization failed")?;

    let rendered = render(&tree, args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Writing {}", path.display()))?;
            info!("Wrote canonical state to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("netval-state: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
