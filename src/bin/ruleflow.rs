use clap::{Parser, Subcommand};
use ruleflow::formatter::{format_program, FormatterConfig};
use ruleflow::{
    compile, config, DryRunDispatch, Error, RuleflowResult, Runtime, RuntimeConfig,
    ServiceRegistry, Value,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a rule file and report errors and warnings
    Check {
        rules: PathBuf,
        /// Known service names; enables unknown-service warnings
        #[arg(long = "service")]
        services: Vec<String>,
    },
    /// Print a rule file in canonical layout
    Fmt {
        rules: PathBuf,
        /// Keep each statement on a single line
        #[arg(long)]
        inline: bool,
    },
    /// Run a rule file with dry-run dispatch and feed it events
    Run {
        rules: PathBuf,
        /// JSON object mapping attribute phrases to values
        #[arg(long)]
        facts: Option<PathBuf>,
        /// JSON runtime configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Event to ingest after the run, as `subject=value`
        #[arg(long = "event", value_parser = parse_event)]
        events: Vec<(String, Value)>,
        #[arg(long = "service")]
        services: Vec<String>,
    },
}

fn parse_event(raw: &str) -> Result<(String, Value), String> {
    let (subject, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected subject=value, got `{}`", raw))?;
    // Unquoted text that is not valid JSON is taken as a string.
    let value = serde_json::from_str::<Value>(value.trim())
        .unwrap_or_else(|_| Value::String(value.trim().to_string()));
    Ok((subject.trim().to_string(), value))
}

fn read(path: &Path) -> RuleflowResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::internal(format!("Failed to read {}: {}", path.display(), e)))
}

fn compile_file(path: &Path, services: &[String]) -> RuleflowResult<ruleflow::BoundProgram> {
    let registry: ServiceRegistry = services.iter().cloned().collect();
    let program = compile(&read(path)?, &registry)?;
    for warning in &program.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(program)
}

async fn run(cli: &Cli) -> RuleflowResult<()> {
    match &cli.command {
        Command::Check { rules, services } => {
            let program = compile_file(rules, services)?;
            println!(
                "{}: {} statements, {} event rules",
                rules.display(),
                program.statements.len(),
                program.dispatcher.len()
            );
        }
        Command::Fmt { rules, inline } => {
            let program = compile_file(rules, &[])?;
            let config = if *inline {
                FormatterConfig::inline()
            } else {
                FormatterConfig::default()
            };
            print!("{}", format_program(&program.source, config)?);
        }
        Command::Run {
            rules,
            facts,
            config: config_path,
            events,
            services,
        } => {
            let runtime_config = match config_path {
                Some(path) => config::from_str(&read(path)?)?,
                None => RuntimeConfig::default(),
            };
            info!("config loaded.");
            debug!("config: {:?}", runtime_config);

            let facts: HashMap<String, Value> = match facts {
                Some(path) => serde_json::from_str(&read(path)?)
                    .map_err(|e| Error::internal(format!("Failed to parse facts: {}", e)))?,
                None => HashMap::new(),
            };

            let program = compile_file(rules, services)?;
            let mut runtime = Runtime::new(program, Arc::new(facts), Arc::new(DryRunDispatch))
                .with_config(runtime_config);

            print_report("run", &runtime.run().await)?;
            for (subject, value) in events {
                let label = format!("event {} = {}", subject, value);
                print_report(&label, &runtime.ingest(subject, value.clone()).await)?;
            }
        }
    }
    Ok(())
}

fn print_report(label: &str, report: &ruleflow::RunReport) -> RuleflowResult<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| Error::internal(format!("Failed to serialize report: {}", e)))?;
    println!("# {}\n{}", label, json);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        if let Error::Compile(compile_error) = &e {
            if let Some((line, column)) = compile_error.position() {
                eprintln!("{}:{}: {}", line, column, compile_error);
                std::process::exit(1);
            }
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
