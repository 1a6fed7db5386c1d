//! Pass 4: place each pending diagnostic immediately after the statement it reports on.
//!
//! Every statement list in the tree is rebuilt once. Children of a statement are handled
//! before its own diagnostic is placed, so arms nested in function bodies are placed too.
//! An inserted diagnostic is never walked, which keeps it from being instrumented itself.

use swc_core::ecma::ast::{ModuleItem, Program, Stmt, SwitchCase};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use tracing::trace;

use super::side_table::InstrumentationMap;

/// Move every diagnostic out of `table` and into `program`. Returns the number placed.
pub fn insert_diagnostics(program: &mut Program, table: &mut InstrumentationMap) -> usize {
    let mut inserter = Inserter { table, inserted: 0 };
    program.visit_mut_with(&mut inserter);
    inserter.inserted
}

struct Inserter<'a> {
    table: &'a mut InstrumentationMap,
    inserted: usize,
}

impl Inserter<'_> {
    fn place(&mut self, stmts: &mut Vec<Stmt>) {
        if self.table.is_empty() {
            return;
        }
        let mut placed = Vec::with_capacity(stmts.len());
        for mut stmt in stmts.drain(..) {
            stmt.visit_mut_with(self);
            let diagnostic = match &stmt {
                Stmt::Expr(expr_stmt) => self.table.take(expr_stmt),
                _ => None,
            };
            placed.push(stmt);
            if let Some(diagnostic) = diagnostic {
                trace!("diagnostic placed");
                self.inserted += 1;
                placed.push(diagnostic);
            }
        }
        *stmts = placed;
    }
}

impl VisitMut for Inserter<'_> {
    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        self.place(stmts);
    }

    fn visit_mut_switch_case(&mut self, case: &mut SwitchCase) {
        if let Some(test) = &mut case.test {
            test.visit_mut_with(self);
        }
        self.place(&mut case.cons);
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        if self.table.is_empty() {
            return;
        }
        let mut placed = Vec::with_capacity(items.len());
        for mut item in items.drain(..) {
            item.visit_mut_with(self);
            let diagnostic = match &item {
                ModuleItem::Stmt(Stmt::Expr(expr_stmt)) => self.table.take(expr_stmt),
                _ => None,
            };
            placed.push(item);
            if let Some(diagnostic) = diagnostic {
                self.inserted += 1;
                placed.push(ModuleItem::Stmt(diagnostic));
            }
        }
        *items = placed;
    }
}
