//! vmtrace compiler
//!
//! Instruments switch-dispatched JavaScript virtual machines: every opcode handler that
//! computes a value into a member slot gets a guarded `console.log` reporting its operands
//! and result, without changing what the interpreter itself computes.

pub mod compiler;

use compiler::cursor::Cursor;
use compiler::diagnostic::DiagnosticTemplate;
use compiler::shape::ShapeKind;
use compiler::side_table::InstrumentationMap;
use compiler::source::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use swc_core::ecma::ast::Program;
use thiserror::Error;
use tracing::{debug, info};

// ── Instrument options ──────────────────────────────────────────────

/// What cursor reads inside a diagnostic look like once the pipeline finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticReads {
    /// Keep the non-mutating `k - n` peek, so enabling the guard never moves the cursor.
    /// The restore pass only walks the live tree; logged copies wait in the side table and keep it.
    #[default]
    Peek,
    /// Restore `++k` inside diagnostics too, mirroring the handler's source text.
    Source,
}

/// Options controlling the instrumentation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentOptions {
    /// Name of the VM's bytecode cursor. Default: `k`.
    pub cursor: String,
    /// Global object holding the guard flag. Default: `window`.
    pub guard_object: String,
    /// Guard flag read before every log call. Default: `debugMode`.
    pub guard_property: String,
    /// Default: `console`.
    pub logger_object: String,
    /// Default: `log`.
    pub logger_method: String,
    /// Shape of cursor reads inside diagnostics. Default: `peek`.
    pub reads: DiagnosticReads,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self {
            cursor: "k".to_string(),
            guard_object: "window".to_string(),
            guard_property: "debugMode".to_string(),
            logger_object: "console".to_string(),
            logger_method: "log".to_string(),
            reads: DiagnosticReads::default(),
        }
    }
}

impl InstrumentOptions {
    /// Reject names that would print as something other than a plain identifier.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        let fields = [
            ("cursor", &self.cursor),
            ("guard_object", &self.guard_object),
            ("guard_property", &self.guard_property),
            ("logger_object", &self.logger_object),
            ("logger_method", &self.logger_method),
        ];
        for (field, value) in fields {
            if !is_identifier(value) {
                return Err(InstrumentError::InvalidOption {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("parse errors: {}", join_errors(.0))]
    Parse(Vec<ParseError>),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid option `{field}`: {value:?} is not a JavaScript identifier")]
    InvalidOption { field: &'static str, value: String },
    #[error("restored {restored} cursor reads but {peeked} were rewritten")]
    RestoreMismatch { peeked: usize, restored: usize },
    #[error("{0} diagnostic statement(s) were never placed in the tree")]
    UnplacedDiagnostics(usize),
    #[error("emit error: {0}")]
    Emit(#[from] std::io::Error),
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ParseError>> for InstrumentError {
    fn from(errors: Vec<ParseError>) -> Self {
        InstrumentError::Parse(errors)
    }
}

// ── Report ──────────────────────────────────────────────────────────

/// Counters collected across the four passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstrumentReport {
    /// Dispatch-arm statements seen by the synthesizer.
    pub arms: usize,
    /// Arms that received a diagnostic statement.
    pub instrumented: usize,
    /// Arms whose assignment or right-hand side has no recognized shape.
    pub skipped: usize,
    /// Arms without a source position, which cannot be keyed in the side table.
    pub unkeyed: usize,
    pub peeked_reads: usize,
    pub restored_reads: usize,
    pub restored_diagnostic_reads: usize,
    pub shapes: BTreeMap<ShapeKind, usize>,
}

/// Output of a full source-to-source run.
#[derive(Debug, Clone)]
pub struct Instrumented {
    pub code: String,
    pub report: InstrumentReport,
}

// ── Pipeline ────────────────────────────────────────────────────────

/// Instrument `source` with default options.
pub fn instrument(source: &str) -> Result<Instrumented, InstrumentError> {
    instrument_with_options(source, &InstrumentOptions::default())
}

/// Parse, instrument, and print `source`, keeping its comments.
pub fn instrument_with_options(
    source: &str,
    options: &InstrumentOptions,
) -> Result<Instrumented, InstrumentError> {
    options.validate()?;
    let mut parsed = compiler::source::parse(source)?;
    let report = instrument_program(&mut parsed.program, options)?;
    let code = compiler::source::print(&parsed)?;
    Ok(Instrumented { code, report })
}

/// Run the four passes over an already parsed program.
///
/// Passes run strictly in order: peek rewrite, log synthesis, restore, insertion.
/// The side table must be empty when insertion finishes.
pub fn instrument_program(
    program: &mut Program,
    options: &InstrumentOptions,
) -> Result<InstrumentReport, InstrumentError> {
    options.validate()?;
    let cursor = Cursor::new(&options.cursor);
    let template = DiagnosticTemplate::from_options(options);
    let mut table = InstrumentationMap::default();
    let mut report = InstrumentReport::default();

    // 1. Peek rewrite
    report.peeked_reads = compiler::peek::rewrite_reads(program, &cursor);
    debug!(reads = report.peeked_reads, "cursor reads rewritten to peeks");

    // 2. Log synthesis
    let stats = compiler::synth::synthesize(program, &template, &mut table)?;
    report.arms = stats.arms;
    report.instrumented = table.len();
    report.skipped = stats.skipped;
    report.unkeyed = stats.unkeyed;
    report.shapes = stats.shapes;

    // 3. Restore
    report.restored_reads = compiler::restore::restore_reads(program, &cursor);
    if report.restored_reads != report.peeked_reads {
        return Err(InstrumentError::RestoreMismatch {
            peeked: report.peeked_reads,
            restored: report.restored_reads,
        });
    }
    if options.reads == DiagnosticReads::Source {
        report.restored_diagnostic_reads = compiler::restore::restore_pending(&mut table, &cursor);
    }

    // 4. Insertion
    let inserted = compiler::insert::insert_diagnostics(program, &mut table);
    table.finish()?;

    info!(
        arms = report.arms,
        instrumented = inserted,
        skipped = report.skipped,
        "instrumentation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(InstrumentOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_identifier_cursor() {
        let options = InstrumentOptions {
            cursor: "k-1".to_string(),
            ..InstrumentOptions::default()
        };
        match options.validate() {
            Err(InstrumentError::InvalidOption { field, value }) => {
                assert_eq!(field, "cursor");
                assert_eq!(value, "k-1");
            }
            other => panic!("expected InvalidOption, got {:?}", other),
        }
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("_$k0"));
        assert!(is_identifier("débug"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("0k"));
        assert!(!is_identifier("a.b"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: InstrumentOptions =
            serde_json::from_str(r#"{"cursor": "pc", "reads": "source"}"#).expect("should parse");
        assert_eq!(options.cursor, "pc");
        assert_eq!(options.reads, DiagnosticReads::Source);
        assert_eq!(options.guard_object, "window");
        assert_eq!(options.logger_method, "log");
    }

    #[test]
    fn parse_error_display_lists_positions() {
        let err = InstrumentError::Parse(vec![ParseError {
            line: 2,
            column: 7,
            message: "Unexpected token".to_string(),
        }]);
        assert_eq!(err.to_string(), "parse errors: 2:7: Unexpected token");
    }
}
