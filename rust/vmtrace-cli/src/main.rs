//! vmtrace CLI: instrument switch-dispatched JavaScript VMs with guarded diagnostics.

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vmtrace_cli::commands::{self, CliError};
use vmtrace_cli::config::VmtraceConfig;
use vmtrace_compiler::{DiagnosticReads, InstrumentOptions, InstrumentReport};

// ANSI color helpers
fn green(s: &str) -> String {
    format!("\x1b[32m{}\x1b[0m", s)
}
fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}
fn gray(s: &str) -> String {
    format!("\x1b[90m{}\x1b[0m", s)
}
fn status_label(label: &str) -> String {
    format!("\x1b[1;32m{:>12}\x1b[0m", label)
}

#[derive(ClapParser)]
#[command(
    name = "vmtrace",
    version,
    about = "Instrument switch-dispatched JavaScript VMs with guarded diagnostics"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument a JavaScript file and write the result
    Instrument {
        /// Path to the JavaScript file
        #[arg()]
        file: PathBuf,

        /// Output path (default: <stem><suffix>.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the instrumented program to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Name of the bytecode cursor identifier
        #[arg(long)]
        cursor: Option<String>,

        /// How cursor reads appear inside diagnostics
        #[arg(long, value_enum)]
        reads: Option<ReadsArg>,

        /// Path to a vmtrace.toml (default: nearest in current dir or ancestors)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the pipeline without writing and report what would be instrumented
    Check {
        /// Path to the JavaScript file
        #[arg()]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Name of the bytecode cursor identifier
        #[arg(long)]
        cursor: Option<String>,

        /// Path to a vmtrace.toml (default: nearest in current dir or ancestors)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Create a default vmtrace.toml in the current directory
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReadsArg {
    Peek,
    Source,
}

impl From<ReadsArg> for DiagnosticReads {
    fn from(arg: ReadsArg) -> Self {
        match arg {
            ReadsArg::Peek => DiagnosticReads::Peek,
            ReadsArg::Source => DiagnosticReads::Source,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Instrument {
            file,
            output,
            stdout,
            cursor,
            reads,
            config,
        } => cmd_instrument(&file, output, stdout, cursor, reads, config.as_deref()),
        Commands::Check {
            file,
            json,
            cursor,
            config,
        } => cmd_check(&file, json, cursor, config.as_deref()),
        Commands::Init => cmd_init(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", red("error:"), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vmtrace={0},vmtrace_cli={0},vmtrace_compiler={0}",
            level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file values with command-line overrides applied.
fn load_settings(
    config: Option<&Path>,
    cursor: Option<String>,
    reads: Option<ReadsArg>,
) -> Result<VmtraceConfig, CliError> {
    let (path, mut cfg) = VmtraceConfig::resolve(config).map_err(CliError::Config)?;
    if let Some(path) = path {
        tracing::debug!(config = %path.display(), "loaded configuration");
    }
    if let Some(cursor) = cursor {
        cfg.instrument.cursor = cursor;
    }
    if let Some(reads) = reads {
        cfg.instrument.reads = reads.into();
    }
    Ok(cfg)
}

fn cmd_instrument(
    file: &Path,
    output: Option<PathBuf>,
    stdout: bool,
    cursor: Option<String>,
    reads: Option<ReadsArg>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let cfg = load_settings(config, cursor, reads)?;
    let result = commands::instrument_file(file, &cfg.instrument)?;

    if stdout {
        print!("{}", result.code);
        return Ok(());
    }
    let target = output.unwrap_or_else(|| commands::default_output_path(file, &cfg.output.suffix));
    commands::write_output(&target, &result.code)?;
    println!(
        "{} {} {}",
        status_label("Instrumented"),
        bold(&target.display().to_string()),
        gray(&format!(
            "({} of {} arms)",
            result.report.instrumented, result.report.arms
        ))
    );
    Ok(())
}

fn cmd_check(
    file: &Path,
    json: bool,
    cursor: Option<String>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let cfg = load_settings(config, cursor, None)?;
    let result = commands::instrument_file(file, &cfg.instrument)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
    } else {
        print_report(&file.display().to_string(), &cfg.instrument, &result.report);
    }
    Ok(())
}

fn print_report(filename: &str, options: &InstrumentOptions, report: &InstrumentReport) {
    println!("{} {}", green("✓"), bold(filename));
    println!("{} {}", status_label("Cursor"), options.cursor);
    println!("{} {}", status_label("Arms"), report.arms);
    println!("{} {}", status_label("Instrumented"), report.instrumented);
    println!("{} {}", status_label("Skipped"), report.skipped);
    if report.unkeyed > 0 {
        println!("{} {}", status_label("Unkeyed"), report.unkeyed);
    }
    println!(
        "{} {} peeked, {} restored",
        status_label("Reads"),
        report.peeked_reads,
        report.restored_reads
    );
    for (shape, count) in &report.shapes {
        println!("{} {}", gray(&format!("{:>12}", shape.as_ref())), count);
    }
}

fn cmd_init() -> Result<(), CliError> {
    let cwd = std::env::current_dir().map_err(|e| CliError::Config(e.to_string()))?;
    let path = commands::init_config(&cwd)?;
    println!(
        "{} {}",
        status_label("Created"),
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    Ok(())
}
