use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fpp_cli::{output, translate_inputs, ProjectConfig};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "fpp", version, about = "First-pass C++ to Python transpiler")]
struct Cli {
    /// Enable verbose debug logging (or set FPP_LOG=debug)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate AST dumps into Python files
    Translate {
        /// AST dumps or directories containing them (default: `inputs` from fpp.toml)
        inputs: Vec<String>,
        /// Configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Directory receiving one file per declaration
        #[arg(short, long, value_name = "DIR", conflicts_with = "combined")]
        output: Option<String>,
        /// Write every declaration into this single file instead
        #[arg(long, value_name = "FILE")]
        combined: Option<String>,
    },
    /// Print per-declaration counts without writing anything
    Summary {
        inputs: Vec<String>,
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("FPP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(debug)
                .with_level(true),
        )
        .init();
}

/// Cargo-style right-aligned status line on stderr.
fn status(label: &str, color: Color, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stderr, "{:>12}", label);
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {}", message);
}

fn load_config(path: Option<&Path>) -> Result<ProjectConfig> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ProjectConfig::parse(&content).with_context(|| format!("invalid configuration {}", path.display()))
        }
        None => Ok(ProjectConfig::load_or_default()),
    }
}

fn resolve_inputs(inputs: Vec<String>, config: &ProjectConfig) -> Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs);
    }
    if config.inputs.is_empty() {
        bail!("no inputs given and none configured in fpp.toml");
    }
    Ok(config.inputs.clone())
}

fn run_translate(
    inputs: Vec<String>,
    config: Option<PathBuf>,
    out_dir: Option<String>,
    combined: Option<String>,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let inputs = resolve_inputs(inputs, &config)?;
    let translation = translate_inputs(&inputs, &config.translate)?;
    let modules = &config.translate.external_modules;

    for unit in translation.units.values() {
        println!("{}", output::summary_line(unit));
    }

    let combined = combined.or_else(|| if out_dir.is_none() { config.output.combined.clone() } else { None });
    match combined {
        Some(path) => {
            output::write_combined(&translation, modules, Path::new(&path))?;
            status("Wrote", Color::Green, &format!("{} declarations to {}", translation.units.len(), path));
        }
        None => {
            let dir = out_dir.unwrap_or_else(|| config.output.dir().to_string());
            let written = output::write_units(&translation, modules, Path::new(&dir))?;
            status("Wrote", Color::Green, &format!("{} files to {}", written.len(), dir));
        }
    }

    if !translation.diagnostics.is_empty() {
        status(
            "Note",
            Color::Yellow,
            &format!("{} methods need manual attention", translation.diagnostics.len()),
        );
    }
    Ok(())
}

fn run_summary(inputs: Vec<String>, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let inputs = resolve_inputs(inputs, &config)?;
    let translation = translate_inputs(&inputs, &config.translate)?;
    for unit in translation.units.values() {
        println!("{}", output::summary_line(unit));
    }
    debug!(units = translation.units.len(), "summary printed");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Translate {
            inputs,
            config,
            output,
            combined,
        } => run_translate(inputs, config, output, combined),
        Command::Summary { inputs, config } => run_summary(inputs, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            status("error", Color::Red, &format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
