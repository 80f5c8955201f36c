//! Command Function CLI
//!
//! Load, check and expand command function files.
//!
//! # Usage
//!
//! ```bash
//! # List loaded procedures
//! cmdfn list
//!
//! # Load every function file and report failures
//! cmdfn check
//!
//! # Expand a template with arguments
//! cmdfn expand test:greet --args '{"name": "Ash"}'
//!
//! # Parse one command against the grammar
//! cmdfn parse "scoreboard players set @s kills 5"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use command_functions::{
    ArgumentCompound, CommandSource, CommandValidator, DispatcherValidator, EngineConfig,
    ExpansionContext, LoadReport, ProcedureRegistry,
};

#[derive(Parser)]
#[command(name = "cmdfn")]
#[command(version)]
#[command(about = "Load, check and expand command function files")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./cmdfn.yaml if present)
    #[arg(long, short, global = true, env = "CMDFN_CONFIG")]
    config: Option<PathBuf>,

    /// Functions directory, overriding the config
    #[arg(long, global = true)]
    functions_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// List loaded procedures
    List,

    /// Load every function file and report failures
    Check,

    /// Expand a procedure into concrete commands
    Expand {
        /// Procedure identifier (namespace:path)
        id: String,

        /// Arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,

        /// Source name to run as (default: the configured load source)
        #[arg(long)]
        source: Option<String>,
    },

    /// Parse one command against the grammar
    Parse {
        /// Command text
        command: String,
    },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = EngineConfig::load(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => EngineConfig::from_env()?,
    };
    if let Some(dir) = cli.functions_dir {
        config.functions_dir = dir;
    }

    let validator = config.validator()?;

    match cli.command {
        Commands::Parse { command } => cmd_parse(&config, &validator, &command, cli.format),
        Commands::List => {
            let ctx = ExpansionContext::new(config.load_source.clone(), &validator);
            let (registry, _) = config.load_registry(&ctx)?;
            cmd_list(&registry, cli.format)
        }
        Commands::Check => {
            let ctx = ExpansionContext::new(config.load_source.clone(), &validator);
            let (registry, report) = config.load_registry(&ctx)?;
            cmd_check(&registry, &report, cli.format)
        }
        Commands::Expand { id, args, source } => {
            let load_ctx = ExpansionContext::new(config.load_source.clone(), &validator);
            let (registry, _) = config.load_registry(&load_ctx)?;
            let source = match source {
                Some(name) => CommandSource::new(name, config.load_source.permission_level),
                None => config.load_source.clone(),
            };
            let ctx = ExpansionContext::new(source, &validator);
            cmd_expand(&config, &registry, &ctx, &id, args.as_deref(), cli.format)
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_list(registry: &ProcedureRegistry, format: OutputFormat) -> Result<ExitCode> {
    let ids = registry.ids();

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = ids
                .iter()
                .filter_map(|id| registry.get(id))
                .map(|p| {
                    serde_json::json!({
                        "id": p.id(),
                        "template": p.is_template(),
                        "actions": p.len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Pretty => {
            println!("{} procedure(s)", ids.len());
            for id in ids {
                let Some(procedure) = registry.get(id) else {
                    continue;
                };
                let kind = if procedure.is_template() {
                    "template".yellow()
                } else {
                    "expanded".green()
                };
                println!("  {} [{}] {} action(s)", id.to_string().bold(), kind, procedure.len());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_check(
    registry: &ProcedureRegistry,
    report: &LoadReport,
    format: OutputFormat,
) -> Result<ExitCode> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "loaded": report.loaded,
                "procedures": registry.len(),
                "failures": report.failures.iter().map(|(path, e)| {
                    serde_json::json!({ "path": path, "error": e.to_string() })
                }).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => {
            for (path, e) in &report.failures {
                println!("{} {}: {}", "FAIL".red().bold(), path.display(), e);
            }
            if report.is_clean() {
                println!("{} {} procedure(s) loaded", "OK".green().bold(), report.loaded);
            } else {
                println!(
                    "{} loaded, {} failed",
                    report.loaded,
                    report.failures.len().to_string().red()
                );
            }
        }
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_expand(
    config: &EngineConfig,
    registry: &ProcedureRegistry,
    ctx: &ExpansionContext<'_>,
    id: &str,
    args: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let id = config.parse_identifier(id)?;
    let args = args
        .map(ArgumentCompound::from_json_str)
        .transpose()
        .context("Invalid --args")?;

    let expanded = registry.invoke(&id, args.as_ref(), ctx)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&*expanded)?);
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} as {}",
                "Expanded".green().bold(),
                expanded.id(),
                ctx.source.name
            );
            for command in expanded.commands() {
                println!("  {}", command);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_parse(
    config: &EngineConfig,
    validator: &DispatcherValidator,
    command: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let action = validator.validate(command, &config.load_source)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(action.command())?);
        }
        OutputFormat::Pretty => {
            println!("{} {}", "OK".green().bold(), action.text());
            for node in &action.command().nodes {
                println!("  {} = {:?}", node.name, node.value);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
