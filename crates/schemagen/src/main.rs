//! `schemagen` command line: resolve schema files and print the generated types.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use schemagen::{DocumentSource, Evaluator, Generator, GeneratorConfig, Mode, SchemaId, Settings};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Resolve JSON Schema files into generated types.
///
/// Every file is registered before any is processed, so `$ref`s between the
/// given files resolve regardless of their order.
#[derive(Parser, Debug)]
#[command(name = "schemagen", version, about, long_about = None)]
struct Cli {
    /// Schema files, processed in the given order.
    #[arg(required_unless_present = "schema")]
    files: Vec<PathBuf>,

    /// Namespace of the generated types.
    #[arg(long, default_value = "")]
    namespace: String,

    /// Configuration file (defaults to `.schemagen/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Outline)]
    format: Format,

    /// Evaluate a JSON instance against the root type of the last file.
    #[arg(long, value_name = "INSTANCE")]
    check: Option<PathBuf>,

    /// Print the configuration JSON Schema and exit.
    #[arg(long)]
    schema: bool,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Outline,
    Json,
}

impl Format {
    fn emitter_name(self) -> &'static str {
        match self {
            Format::Outline => "outline",
            Format::Json => "json",
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::load_or_default(&std::env::current_dir()?)?,
    };
    Ok(settings)
}

fn print_config_schema() -> Result<()> {
    let response = serde_json::json!({
        "config_path": ".schemagen/config.toml",
        "format": "toml",
        "schema": schemars::schema_for!(Settings)
    });
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.schema {
        print_config_schema()?;
        return Ok(ExitCode::SUCCESS);
    }

    let settings = load_settings(&cli)?;
    let mode = Mode::from_settings(&settings);
    let mut generator = Generator::new(GeneratorConfig::new(settings));

    let mut documents = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let document = read_json(path)?;
        let source = DocumentSource::from_path(path, cli.namespace.clone());
        generator.register_document(&source, document.clone());
        documents.push((path, source, document));
    }

    let mut roots: Vec<SchemaId> = Vec::with_capacity(documents.len());
    for (path, source, document) in documents {
        let root = generator
            .process_document(&source, document)
            .with_context(|| format!("failed to process {}", path.display()))?;
        roots.push(root);
    }

    let emitter = schemagen::get_emitter(cli.format.emitter_name())
        .context("emitter is not available")?;
    let graph = generator.graph();
    let rendered: Vec<String> = graph
        .schemas()
        .map(|(id, _)| emitter.emit(graph, id))
        .collect();
    println!("{}", rendered.join("\n"));

    let Some(instance) = &cli.check else {
        return Ok(ExitCode::SUCCESS);
    };
    let root = roots.last().copied().context("no schema file given")?;
    let evaluation = Evaluator::new(graph, mode).evaluate(root, &read_json(instance)?);
    if evaluation.is_valid() {
        println!("{} is valid", instance.display());
        Ok(ExitCode::SUCCESS)
    } else {
        print!("{}", evaluation.report);
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
