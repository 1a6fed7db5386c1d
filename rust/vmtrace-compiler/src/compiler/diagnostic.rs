//! Construction of guarded diagnostic statements:
//!
//! ```text
//! window.debugMode ? console.log(args...) : void 0;
//! ```

use swc_core::common::{Span, SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    CallExpr, Callee, CondExpr, Expr, ExprOrSpread, ExprStmt, Ident, IdentName, Lit, MemberExpr,
    MemberProp, Number, Stmt, Str, UnaryExpr, UnaryOp,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::{InstrumentError, InstrumentOptions};

/// Names making up the guard and the logger of a diagnostic statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticTemplate {
    pub guard_object: String,
    pub guard_property: String,
    pub logger_object: String,
    pub logger_method: String,
}

impl Default for DiagnosticTemplate {
    fn default() -> Self {
        Self::from_options(&InstrumentOptions::default())
    }
}

impl DiagnosticTemplate {
    pub fn from_options(options: &InstrumentOptions) -> Self {
        Self {
            guard_object: options.guard_object.clone(),
            guard_property: options.guard_property.clone(),
            logger_object: options.logger_object.clone(),
            logger_method: options.logger_method.clone(),
        }
    }

    /// Wrap `args` in a guarded log call.
    ///
    /// An empty argument list is rejected before any node is built.
    pub fn build(&self, args: Vec<ExprOrSpread>) -> Result<Stmt, InstrumentError> {
        if args.is_empty() {
            return Err(InstrumentError::InvalidArgument(
                "diagnostic argument list must not be empty".to_string(),
            ));
        }

        let log_call = Expr::Call(CallExpr {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            callee: Callee::Expr(Box::new(member(&self.logger_object, &self.logger_method))),
            args,
            type_args: None,
        });
        let noop = Expr::Unary(UnaryExpr {
            span: DUMMY_SP,
            op: UnaryOp::Void,
            arg: Box::new(Expr::Lit(Lit::Num(Number {
                span: DUMMY_SP,
                value: 0.0,
                raw: Some("0".into()),
            }))),
        });

        Ok(Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(Expr::Cond(CondExpr {
                span: DUMMY_SP,
                test: Box::new(member(&self.guard_object, &self.guard_property)),
                cons: Box::new(log_call),
                alt: Box::new(noop),
            })),
        }))
    }
}

fn member(object: &str, property: &str) -> Expr {
    Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(ident(object)),
        prop: MemberProp::Ident(IdentName::new(property.into(), DUMMY_SP)),
    })
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident(Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty()))
}

/// A string literal that prints exactly as `text`, quoted.
///
/// The raw form is fixed up front so the printer never re-escapes the label.
pub fn label_literal(text: &str) -> Expr {
    let raw = serde_json::Value::from(text).to_string();
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: text.into(),
        raw: Some(raw.into()),
    }))
}

/// A deep copy of `expr` with every span erased, so it shares neither storage nor
/// position (and therefore no comments or side-table identity) with the live tree.
pub fn detached(expr: &Expr) -> Box<Expr> {
    let mut copy = Box::new(expr.clone());
    copy.visit_mut_with(&mut SpanEraser);
    copy
}

struct SpanEraser;

impl VisitMut for SpanEraser {
    fn visit_mut_span(&mut self, span: &mut Span) {
        *span = DUMMY_SP;
    }
}

/// Ordered `label, value, label, value, ...` arguments of a log call.
#[derive(Debug, Default)]
pub struct LogArgs {
    args: Vec<ExprOrSpread>,
}

impl LogArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&mut self, text: &str) -> &mut Self {
        self.args.push(ExprOrSpread {
            spread: None,
            expr: Box::new(label_literal(text)),
        });
        self
    }

    pub fn value(&mut self, expr: &Expr) -> &mut Self {
        self.args.push(ExprOrSpread {
            spread: None,
            expr: detached(expr),
        });
        self
    }

    /// A call argument, keeping its spread marker.
    pub fn argument(&mut self, arg: &ExprOrSpread) -> &mut Self {
        self.args.push(ExprOrSpread {
            spread: arg.spread.map(|_| DUMMY_SP),
            expr: detached(&arg.expr),
        });
        self
    }

    pub fn pair(&mut self, label: &str, expr: &Expr) -> &mut Self {
        self.label(label).value(expr)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn into_vec(self) -> Vec<ExprOrSpread> {
        self.args
    }
}
