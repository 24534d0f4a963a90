use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use markup_lint::{ComponentRegistry, DocumentContext, Engine, InputKind, Report};

#[derive(Parser)]
#[command(name = "markup-lint")]
#[command(about = "Validate an HTML fragment and extract its content tree")]
#[command(version)]
struct Cli {
    /// Document to check
    file: PathBuf,

    /// Component registry file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input kind; inferred from the file extension when omitted
    #[arg(short, long, value_enum)]
    kind: Option<InputKind>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Always extract the content tree, even when validation fails
    #[arg(long)]
    extract: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let registry = match &cli.config {
        Some(path) => ComponentRegistry::load(path)
            .with_context(|| format!("Invalid component registry {}", path.display()))?,
        None => ComponentRegistry::default(),
    };
    let engine = Engine::new(&registry).context("Failed to resolve components")?;

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let context = DocumentContext::from_bytes(&bytes);
    let kind = cli.kind.unwrap_or_else(|| InputKind::from_path(&cli.file));
    info!("Checking {} as {} input", cli.file.display(), kind);

    let mut report = engine.process(&context, kind);
    if cli.extract && report.tree.is_none() {
        report.tree = Some(engine.extract(&context, kind));
    }

    match cli.format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
    }

    Ok(if report.validation.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_text(report: &Report) {
    let validation = &report.validation;
    if validation.is_valid() {
        println!("✅ Document is valid ({} input)", report.input_kind);
    } else {
        println!(
            "❌ Document is invalid: {} errors ({} input)",
            validation.errors().len(),
            report.input_kind
        );
    }

    for error in validation.errors() {
        println!("  error: {}", error);
    }
    for warning in validation.warnings() {
        println!("  warning: {}", warning);
    }

    if let Some(tree) = &report.tree {
        println!();
        println!("Content tree:");
        for node in tree {
            print!("{}", node);
        }
    }
}
