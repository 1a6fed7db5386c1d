//! Pending diagnostics, keyed by the identity of the statement they report on.
//!
//! Parsed statements are identified by their source span: two distinct expression
//! statements never share one, while value-identical handlers at different positions get
//! different keys. Statements without a position cannot be keyed.

use std::collections::HashMap;

use swc_core::common::Span;
use swc_core::ecma::ast::{ExprStmt, Stmt};

use crate::InstrumentError;

/// Identity of an expression statement in the tree being instrumented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtId(Span);

impl StmtId {
    pub fn of(stmt: &ExprStmt) -> Option<Self> {
        if stmt.span.is_dummy() {
            None
        } else {
            Some(StmtId(stmt.span))
        }
    }
}

#[derive(Debug, Default)]
pub struct InstrumentationMap {
    pending: HashMap<StmtId, Stmt>,
}

impl InstrumentationMap {
    /// Record `diagnostic` for `stmt`. Returns `false` when `stmt` has no identity.
    pub fn record(&mut self, stmt: &ExprStmt, diagnostic: Stmt) -> bool {
        match StmtId::of(stmt) {
            Some(id) => {
                self.pending.insert(id, diagnostic);
                true
            }
            None => false,
        }
    }

    /// Remove and return the diagnostic recorded for `stmt`, if any.
    pub fn take(&mut self, stmt: &ExprStmt) -> Option<Stmt> {
        StmtId::of(stmt).and_then(|id| self.pending.remove(&id))
    }

    pub fn pending_mut(&mut self) -> impl Iterator<Item = &mut Stmt> {
        self.pending.values_mut()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Consume the table. Any entry still pending was never placed and is an error.
    pub fn finish(self) -> Result<(), InstrumentError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(InstrumentError::UnplacedDiagnostics(self.pending.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::{BytePos, SyntaxContext, DUMMY_SP};
    use swc_core::ecma::ast::{EmptyStmt, Expr, Ident};

    fn stmt_at(lo: u32, hi: u32) -> ExprStmt {
        ExprStmt {
            span: Span::new(BytePos(lo), BytePos(hi)),
            expr: Box::new(Expr::Ident(Ident::new("a".into(), DUMMY_SP, SyntaxContext::empty()))),
        }
    }

    fn empty() -> Stmt {
        Stmt::Empty(EmptyStmt { span: DUMMY_SP })
    }

    #[test]
    fn value_identical_statements_have_distinct_keys() {
        let mut table = InstrumentationMap::default();
        let first = stmt_at(1, 4);
        let second = stmt_at(10, 13);
        assert!(table.record(&first, empty()));
        assert!(table.record(&second, empty()));
        assert_eq!(table.len(), 2);
        assert!(table.take(&first).is_some());
        assert!(table.take(&first).is_none());
        assert!(table.take(&second).is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn statements_without_position_are_not_keyed() {
        let mut table = InstrumentationMap::default();
        let synthesized = ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(Expr::Ident(Ident::new("a".into(), DUMMY_SP, SyntaxContext::empty()))),
        };
        assert!(!table.record(&synthesized, empty()));
        assert!(table.is_empty());
    }

    #[test]
    fn leftover_entries_fail_finish() {
        let mut table = InstrumentationMap::default();
        table.record(&stmt_at(1, 4), empty());
        match table.finish() {
            Err(InstrumentError::UnplacedDiagnostics(1)) => {}
            other => panic!("expected UnplacedDiagnostics(1), got {:?}", other),
        }
    }

    #[test]
    fn drained_table_finishes() {
        let mut table = InstrumentationMap::default();
        let stmt = stmt_at(1, 4);
        table.record(&stmt, empty());
        table.take(&stmt);
        assert!(table.finish().is_ok());
    }
}
