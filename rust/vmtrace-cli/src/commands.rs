//! File-level operations behind the `vmtrace` subcommands.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use vmtrace_compiler::{instrument_with_options, InstrumentError, InstrumentOptions, Instrumented};

use crate::config::{VmtraceConfig, CONFIG_FILE};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read file '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{0}")]
    Config(String),
    #[error("{path}: {source}")]
    Instrument {
        path: PathBuf,
        source: InstrumentError,
    },
    #[error("{} already exists, not overwriting", .0.display())]
    AlreadyExists(PathBuf),
    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// `<dir>/<stem><suffix>.<ext>`, next to `input`.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(name)
}

pub fn instrument_file(path: &Path, options: &InstrumentOptions) -> Result<Instrumented, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), bytes = source.len(), "instrumenting");
    instrument_with_options(&source, options).map_err(|source| CliError::Instrument {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_output(path: &Path, code: &str) -> Result<(), CliError> {
    std::fs::write(path, code).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(file = %path.display(), "wrote instrumented program");
    Ok(())
}

/// Write the default `vmtrace.toml` into `dir`. An existing file is never overwritten.
pub fn init_config(dir: &Path) -> Result<PathBuf, CliError> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Err(CliError::AlreadyExists(path));
    }
    std::fs::write(&path, VmtraceConfig::default_template()).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
