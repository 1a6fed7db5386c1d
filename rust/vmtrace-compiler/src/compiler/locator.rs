//! Dispatch-arm detection.
//!
//! A VM opcode handler looks like one of:
//!
//! ```text
//! case 12:                      case 12: {
//!     e[I[++k]] = a + b;            e[I[++k]] = a + b;
//!     break;                        break;
//!                               }
//! ```
//!
//! An expression statement is a *dispatch arm* when it sits directly in a case clause or
//! is followed by a `break`, and its expression is an assignment. The test is purely
//! syntactic, so restructured handlers can be missed.

use swc_core::ecma::ast::{AssignExpr, Expr, ExprStmt, ModuleItem, Program, Stmt, SwitchCase};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

/// Where a statement sits relative to its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArmPosition {
    pub in_switch_case: bool,
    pub followed_by_break: bool,
}

pub fn is_dispatch_arm(stmt: &ExprStmt, position: ArmPosition) -> bool {
    (position.in_switch_case || position.followed_by_break) && assignment(stmt).is_some()
}

/// The assignment an expression statement consists of, looking through parentheses.
pub fn assignment(stmt: &ExprStmt) -> Option<&AssignExpr> {
    match peel_parens(&stmt.expr) {
        Expr::Assign(assign) => Some(assign),
        _ => None,
    }
}

pub fn peel_parens(mut expr: &Expr) -> &Expr {
    while let Expr::Paren(paren) = expr {
        expr = &paren.expr;
    }
    expr
}

/// Callback for every dispatch arm found by [`walk_arms`].
pub trait ArmVisitor {
    fn visit_arm(&mut self, stmt: &mut ExprStmt);
}

/// Visit every dispatch arm in `program`, in pre-order.
///
/// The visitor runs on an arm before the walk descends into that arm's children, so
/// arms nested inside function expressions are visited after their enclosing arm.
pub fn walk_arms<V: ArmVisitor>(program: &mut Program, visitor: &mut V) {
    program.visit_mut_with(&mut ArmWalker { visitor });
}

struct ArmWalker<'a, V> {
    visitor: &'a mut V,
}

impl<V: ArmVisitor> ArmWalker<'_, V> {
    fn walk_stmts(&mut self, stmts: &mut [Stmt], in_switch_case: bool) {
        for index in 0..stmts.len() {
            let position = ArmPosition {
                in_switch_case,
                followed_by_break: matches!(stmts.get(index + 1), Some(Stmt::Break(_))),
            };
            if let Stmt::Expr(expr_stmt) = &mut stmts[index] {
                if is_dispatch_arm(expr_stmt, position) {
                    self.visitor.visit_arm(expr_stmt);
                }
            }
            stmts[index].visit_mut_with(self);
        }
    }
}

impl<V: ArmVisitor> VisitMut for ArmWalker<'_, V> {
    fn visit_mut_switch_case(&mut self, case: &mut SwitchCase) {
        if let Some(test) = &mut case.test {
            test.visit_mut_with(self);
        }
        self.walk_stmts(&mut case.cons, true);
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        self.walk_stmts(stmts, false);
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        for index in 0..items.len() {
            let position = ArmPosition {
                in_switch_case: false,
                followed_by_break: matches!(
                    items.get(index + 1),
                    Some(ModuleItem::Stmt(Stmt::Break(_)))
                ),
            };
            if let ModuleItem::Stmt(Stmt::Expr(expr_stmt)) = &mut items[index] {
                if is_dispatch_arm(expr_stmt, position) {
                    self.visitor.visit_arm(expr_stmt);
                }
            }
            items[index].visit_mut_with(self);
        }
    }
}
