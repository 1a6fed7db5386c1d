//! Pass 2: build a diagnostic for every dispatch arm whose right-hand side has a
//! recognized shape, and record it in the side table. The tree itself is only read.

use std::collections::BTreeMap;

use swc_core::ecma::ast::{AssignOp, AssignTarget, Expr, ExprStmt, Program, SimpleAssignTarget};
use tracing::{debug, warn};

use super::diagnostic::{ident, DiagnosticTemplate, LogArgs};
use super::locator::{assignment, walk_arms, ArmVisitor};
use super::shape::{classify, Adaptor, RhsShape, ShapeKind};
use super::side_table::InstrumentationMap;
use crate::InstrumentError;

pub const RESULT_LABEL: &str = "返回值===>";
pub const BINARY_LABEL: &str = "运算===>";
pub const UNARY_LABEL: &str = "一元运算===>";
pub const UPDATE_LABEL: &str = "更新运算===>";
pub const ARRAY_LABEL: &str = "数组定义===>";
pub const FUNC_LABEL: &str = "func ===>";
pub const BIND_FUNC_LABEL: &str = "bind func ===>";
pub const THIS_LABEL: &str = "this===>";
pub const ARGS_ARRAY_LABEL: &str = "args_array===>";
pub const METHOD_CALL_LABEL: &str = "Method Call===>";
pub const FUNC_CALL_LABEL: &str = "Func Call===>";
pub const NEW_CALL_LABEL: &str = "new Call===>";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisStats {
    pub arms: usize,
    pub skipped: usize,
    pub unkeyed: usize,
    pub shapes: BTreeMap<ShapeKind, usize>,
}

/// Record a diagnostic for every instrumentable arm in `program`.
pub fn synthesize(
    program: &mut Program,
    template: &DiagnosticTemplate,
    table: &mut InstrumentationMap,
) -> Result<SynthesisStats, InstrumentError> {
    let mut synthesizer = LogSynthesizer {
        template,
        table,
        stats: SynthesisStats::default(),
        error: None,
    };
    walk_arms(program, &mut synthesizer);
    match synthesizer.error {
        Some(err) => Err(err),
        None => Ok(synthesizer.stats),
    }
}

/// Log arguments for `target = rhs`, or `None` if the arm is not instrumented.
///
/// Only plain `=` assignments to a member expression qualify.
pub fn log_arguments(stmt: &ExprStmt) -> Option<(ShapeKind, LogArgs)> {
    let assign = assignment(stmt)?;
    if assign.op != AssignOp::Assign {
        return None;
    }
    let AssignTarget::Simple(SimpleAssignTarget::Member(target)) = &assign.left else {
        return None;
    };
    let target = Expr::Member(target.clone());
    let shape = classify(&assign.right)?;

    let mut args = LogArgs::new();
    match shape {
        RhsShape::Binary(bin) => {
            args.pair(BINARY_LABEL, &Expr::Bin(bin.clone()));
        }
        RhsShape::Unary(unary) => {
            args.pair(UNARY_LABEL, &Expr::Unary(unary.clone()));
        }
        RhsShape::Update(update) => {
            args.pair(UPDATE_LABEL, &Expr::Update(update.clone()));
        }
        RhsShape::Array(array) => {
            args.pair(ARRAY_LABEL, &Expr::Array(array.clone()));
        }
        RhsShape::Adaptor {
            adaptor,
            receiver,
            args: call_args,
        } => {
            let label = match adaptor {
                Adaptor::Bind => BIND_FUNC_LABEL,
                Adaptor::Call | Adaptor::Apply => FUNC_LABEL,
            };
            args.pair(label, receiver);
            args.label(THIS_LABEL);
            match call_args.first() {
                Some(this_arg) => args.argument(this_arg),
                None => args.value(&ident("undefined")),
            };
            match adaptor {
                Adaptor::Apply => {
                    if let Some(array) = call_args.get(1) {
                        args.label(ARGS_ARRAY_LABEL).argument(array);
                    }
                }
                Adaptor::Call | Adaptor::Bind => {
                    for (index, arg) in call_args.iter().enumerate().skip(1) {
                        args.label(&format!("arg{}===>", index)).argument(arg);
                    }
                }
            }
        }
        RhsShape::MethodCall {
            callee,
            args: call_args,
            construct,
        } => {
            let label = if construct {
                NEW_CALL_LABEL
            } else {
                METHOD_CALL_LABEL
            };
            args.pair(label, &Expr::Member(callee.clone()));
            for (index, arg) in call_args.iter().enumerate() {
                args.label(&format!("arg{}===>", index)).argument(arg);
            }
        }
        RhsShape::FunctionCall {
            callee,
            args: call_args,
            construct,
        } => {
            let label = if construct {
                NEW_CALL_LABEL
            } else {
                FUNC_CALL_LABEL
            };
            args.pair(label, callee);
            for (index, arg) in call_args.iter().enumerate() {
                args.label(&format!("arg{}===>", index)).argument(arg);
            }
        }
    }
    args.pair(RESULT_LABEL, &target);
    Some((shape.kind(), args))
}

struct LogSynthesizer<'a> {
    template: &'a DiagnosticTemplate,
    table: &'a mut InstrumentationMap,
    stats: SynthesisStats,
    error: Option<InstrumentError>,
}

impl ArmVisitor for LogSynthesizer<'_> {
    fn visit_arm(&mut self, stmt: &mut ExprStmt) {
        if self.error.is_some() {
            return;
        }
        self.stats.arms += 1;

        let Some((kind, args)) = log_arguments(stmt) else {
            self.stats.skipped += 1;
            debug!(span = ?stmt.span, "dispatch arm has no loggable shape");
            return;
        };
        let diagnostic = match self.template.build(args.into_vec()) {
            Ok(diagnostic) => diagnostic,
            Err(err) => {
                self.error = Some(err);
                return;
            }
        };
        if self.table.record(stmt, diagnostic) {
            *self.stats.shapes.entry(kind).or_default() += 1;
            debug!(shape = %kind, span = ?stmt.span, "dispatch arm instrumented");
        } else {
            self.stats.unkeyed += 1;
            warn!(shape = %kind, "dispatch arm has no source position; not instrumented");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::source::parse;

    fn stats_for(source: &str) -> (SynthesisStats, usize) {
        let mut parsed = parse(source).expect("should parse");
        let mut table = InstrumentationMap::default();
        let stats = synthesize(&mut parsed.program, &DiagnosticTemplate::default(), &mut table)
            .expect("should synthesize");
        (stats, table.len())
    }

    #[test]
    fn counts_instrumented_and_skipped_arms() {
        let (stats, recorded) = stats_for(
            "switch (op) {
                case 0: a.b = c + d; break;
                case 1: a.b = c; break;
                case 2: a = c + d; break;
                case 3: a.b += c; break;
                case 4: a.b = f(c); break;
            }",
        );
        assert_eq!(stats.arms, 5);
        assert_eq!(stats.skipped, 3);
        assert_eq!(recorded, 2);
        assert_eq!(stats.shapes.get(&ShapeKind::Binary), Some(&1));
        assert_eq!(stats.shapes.get(&ShapeKind::FunctionCall), Some(&1));
    }

    #[test]
    fn tree_is_not_mutated() {
        let source = "switch (op) { case 0: a.b = c + d; break; }";
        let mut parsed = parse(source).expect("should parse");
        let before = parsed.program.clone();
        let mut table = InstrumentationMap::default();
        synthesize(&mut parsed.program, &DiagnosticTemplate::default(), &mut table)
            .expect("should synthesize");
        assert_eq!(parsed.program, before);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn apply_argument_count() {
        let mut parsed =
            parse("switch (op) { case 0: r.v = obj.method.apply(ctx, argsArr); }").expect("parse");

        struct Count(Option<(ShapeKind, usize)>);
        impl ArmVisitor for Count {
            fn visit_arm(&mut self, stmt: &mut ExprStmt) {
                self.0 = log_arguments(stmt).map(|(kind, args)| (kind, args.len()));
            }
        }
        let mut count = Count(None);
        walk_arms(&mut parsed.program, &mut count);
        // func, this, args_array, result: four label/value pairs
        assert_eq!(count.0, Some((ShapeKind::AdaptorCall, 8)));
    }
}
