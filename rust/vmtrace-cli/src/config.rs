//! Configuration file parsing for `vmtrace.toml`.
//!
//! An explicit `--config` path wins. Otherwise the current directory and its ancestors are
//! searched, and built-in defaults apply when no file is found.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vmtrace_compiler::InstrumentOptions;

pub const CONFIG_FILE: &str = "vmtrace.toml";

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct VmtraceConfig {
    #[serde(default)]
    pub instrument: InstrumentOptions,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputSection {
    /// Inserted between the input's stem and extension: `vm.js` -> `vm.instrumented.js`.
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

fn default_suffix() -> String {
    ".instrumented".to_string()
}

impl VmtraceConfig {
    /// Resolve the configuration for this run, returning the file it came from (if any).
    pub fn resolve(explicit: Option<&Path>) -> Result<(Option<PathBuf>, Self), String> {
        if let Some(path) = explicit {
            return Self::load_from(path).map(|cfg| (Some(path.to_path_buf()), cfg));
        }
        let cwd = std::env::current_dir()
            .map_err(|e| format!("cannot determine current directory: {}", e))?;
        match Self::find_from(&cwd) {
            Some(path) => Self::load_from(&path).map(|cfg| (Some(path), cfg)),
            None => Ok((None, Self::default())),
        }
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        let cfg = Self::from_str(&content)
            .map_err(|e| format!("invalid toml in '{}': {}", path.display(), e))?;
        cfg.instrument
            .validate()
            .map_err(|e| format!("'{}': {}", path.display(), e))?;
        Ok(cfg)
    }

    /// Nearest `vmtrace.toml` in `start` or one of its ancestors.
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Parse a TOML string directly.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Generate a default `vmtrace.toml` template.
    pub fn default_template() -> &'static str {
        r#"# vmtrace configuration

[instrument]
# Name of the interpreter's bytecode cursor
cursor = "k"

# Diagnostics run only when <guard_object>.<guard_property> is truthy
guard_object = "window"
guard_property = "debugMode"

# Called as <logger_object>.<logger_method>(label, value, ...)
logger_object = "console"
logger_method = "log"

# Cursor reads inside diagnostics: "peek" logs `k - n` and never moves the cursor,
# "source" logs `++k` exactly as the handler reads it
reads = "peek"

[output]
# vm.js -> vm.instrumented.js
suffix = ".instrumented"
"#
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use vmtrace_compiler::DiagnosticReads;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vmtrace-config-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn empty_string_returns_default() {
        let cfg = VmtraceConfig::from_str("").expect("empty toml is valid");
        assert_eq!(cfg, VmtraceConfig::default());
        assert_eq!(cfg.output.suffix, ".instrumented");
        assert_eq!(cfg.instrument.cursor, "k");
    }

    #[test]
    fn partial_instrument_section_keeps_defaults() {
        let cfg = VmtraceConfig::from_str(
            r#"
[instrument]
cursor = "pc"
reads = "source"
"#,
        )
        .expect("should parse");
        assert_eq!(cfg.instrument.cursor, "pc");
        assert_eq!(cfg.instrument.reads, DiagnosticReads::Source);
        assert_eq!(cfg.instrument.logger_object, "console");
        assert_eq!(cfg.output.suffix, ".instrumented");
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(VmtraceConfig::from_str("[broken").is_err());
        assert!(VmtraceConfig::from_str("[instrument]\nreads = \"sideways\"").is_err());
    }

    #[test]
    fn default_template_round_trips() {
        let cfg = VmtraceConfig::from_str(VmtraceConfig::default_template())
            .expect("default template must be valid toml");
        assert_eq!(cfg, VmtraceConfig::default());
    }

    #[test]
    fn load_from_rejects_invalid_names() {
        let dir = scratch_dir("invalid");
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "[instrument]\ncursor = \"k + 1\"\n").expect("write config");
        let err = VmtraceConfig::load_from(&path).expect_err("should reject cursor");
        assert!(err.contains("cursor"), "{}", err);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn find_from_searches_ancestors() {
        let dir = scratch_dir("ancestors");
        let nested = dir.join("a").join("b");
        std::fs::create_dir_all(&nested).expect("create nested dir");
        std::fs::write(dir.join(CONFIG_FILE), "[output]\nsuffix = \".traced\"\n")
            .expect("write config");

        let found = VmtraceConfig::find_from(&nested).expect("should find config");
        assert_eq!(found, dir.join(CONFIG_FILE));
        let cfg = VmtraceConfig::load_from(&found).expect("should load");
        assert_eq!(cfg.output.suffix, ".traced");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_path_must_exist() {
        let missing = std::env::temp_dir().join("vmtrace-definitely-missing.toml");
        let err = VmtraceConfig::resolve(Some(&missing)).expect_err("missing file");
        assert!(err.starts_with("cannot read"), "{}", err);
    }
}
