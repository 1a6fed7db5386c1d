//! Pass 1: rewrite cursor reads into peeks.
//!
//! Inside one dispatch arm, `e[I[++k]]` reads the operand array at the cursor *after*
//! advancing it. A diagnostic placed after the arm cannot repeat that read without moving
//! the cursor again, so each subscript `++k` is replaced with `k - i`, where `i` counts the
//! cursor increments that follow it in the same statement. The last increment reads the
//! final cursor value and gets `k - 0`.
//!
//! Only subscripts in prefix form are rewritten; postfix increments and increments outside
//! a subscript still count toward the offsets of the reads before them.

use swc_core::ecma::ast::{ExprStmt, MemberExpr, MemberProp, Program, UpdateExpr};
use swc_core::ecma::visit::{Visit, VisitMut, VisitMutWith, VisitWith};
use tracing::trace;

use super::cursor::Cursor;
use super::locator::{walk_arms, ArmVisitor};

/// Rewrite every peekable cursor read in every dispatch arm. Returns the number rewritten.
pub fn rewrite_reads(program: &mut Program, cursor: &Cursor) -> usize {
    let mut rewriter = PeekRewriter {
        cursor,
        rewritten: 0,
    };
    walk_arms(program, &mut rewriter);
    rewriter.rewritten
}

/// Rewrite the cursor reads of a single statement. Returns the number rewritten.
pub fn rewrite_statement(stmt: &mut ExprStmt, cursor: &Cursor) -> usize {
    let mut counter = IncrementCounter { cursor, count: 0 };
    stmt.visit_with(&mut counter);
    if counter.count == 0 {
        return 0;
    }

    let mut assigner = OffsetAssigner {
        cursor,
        remaining: counter.count,
        rewritten: 0,
    };
    stmt.visit_mut_with(&mut assigner);
    trace!(
        increments = counter.count,
        rewritten = assigner.rewritten,
        span = ?stmt.span,
        "peeked cursor reads"
    );
    assigner.rewritten
}

struct PeekRewriter<'a> {
    cursor: &'a Cursor,
    rewritten: usize,
}

impl ArmVisitor for PeekRewriter<'_> {
    fn visit_arm(&mut self, stmt: &mut ExprStmt) {
        self.rewritten += rewrite_statement(stmt, self.cursor);
    }
}

struct IncrementCounter<'a> {
    cursor: &'a Cursor,
    count: usize,
}

impl Visit for IncrementCounter<'_> {
    fn visit_update_expr(&mut self, update: &UpdateExpr) {
        if self.cursor.is_increment(update) {
            self.count += 1;
        }
        update.visit_children_with(self);
    }
}

/// Walks increments in the same order as [`IncrementCounter`], handing out offsets from
/// `count - 1` down to 0.
struct OffsetAssigner<'a> {
    cursor: &'a Cursor,
    remaining: usize,
    rewritten: usize,
}

impl OffsetAssigner<'_> {
    fn next_offset(&mut self) -> usize {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }
}

impl VisitMut for OffsetAssigner<'_> {
    fn visit_mut_member_expr(&mut self, member: &mut MemberExpr) {
        member.obj.visit_mut_with(self);
        if let MemberProp::Computed(computed) = &mut member.prop {
            if self.cursor.is_prefix_increment(&computed.expr) {
                let offset = self.next_offset();
                *computed.expr = self.cursor.peek(offset);
                self.rewritten += 1;
                return;
            }
        }
        member.prop.visit_mut_with(self);
    }

    fn visit_mut_update_expr(&mut self, update: &mut UpdateExpr) {
        if self.cursor.is_increment(update) {
            self.next_offset();
        }
        update.visit_mut_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::source::{parse, print};

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn rewrite(source: &str) -> (String, usize) {
        let mut parsed = parse(source).expect("should parse");
        let count = rewrite_reads(&mut parsed.program, &Cursor::new("k"));
        (squash(&print(&parsed).expect("should print")), count)
    }

    #[test]
    fn single_read_peeks_at_zero() {
        let (out, count) = rewrite("switch (op) { case 1: e[I[++k]] = a + b; break; }");
        assert_eq!(count, 1);
        assert!(out.contains("e[I[k-0]]=a+b;"), "out: {}", out);
    }

    #[test]
    fn offsets_are_assigned_in_reverse() {
        let (out, count) = rewrite("switch (op) { case 1: e[I[++k]] = e[I[++k]] + I[++k]; }");
        assert_eq!(count, 3);
        assert!(out.contains("e[I[k-2]]=e[I[k-1]]+I[k-0];"), "out: {}", out);
    }

    #[test]
    fn non_subscript_increments_shift_offsets() {
        let (out, count) = rewrite("switch (op) { case 1: e[I[++k]] = f(k++); }");
        assert_eq!(count, 1);
        assert!(out.contains("e[I[k-1]]=f(k++);"), "out: {}", out);
    }

    #[test]
    fn postfix_subscripts_are_left_alone() {
        let (out, count) = rewrite("switch (op) { case 1: e[I[k++]] = a; }");
        assert_eq!(count, 0);
        assert!(out.contains("e[I[k++]]=a;"), "out: {}", out);
    }

    #[test]
    fn other_identifiers_are_left_alone() {
        let (out, count) = rewrite("switch (op) { case 1: e[I[++i]] = a; }");
        assert_eq!(count, 0);
        assert!(out.contains("e[I[++i]]=a;"), "out: {}", out);
    }

    #[test]
    fn statements_outside_arms_are_left_alone() {
        let (out, count) = rewrite("e[I[++k]] = a;");
        assert_eq!(count, 0);
        assert!(out.contains("e[I[++k]]=a;"), "out: {}", out);
    }
}
