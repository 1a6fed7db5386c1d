//! Pass 3: turn every peek written by pass 1 back into `++k`.
//!
//! Matching is narrow: a subscript of the form `cursor - <offset>` whose offset
//! literal has no source text. A `k - 1` that was in the input keeps its raw text and is
//! never rewritten.

use swc_core::ecma::ast::{ExprStmt, MemberExpr, MemberProp, Program};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use super::cursor::Cursor;
use super::locator::{walk_arms, ArmVisitor};
use super::side_table::InstrumentationMap;

/// Restore the cursor reads of every dispatch arm. Returns the number restored.
pub fn restore_reads(program: &mut Program, cursor: &Cursor) -> usize {
    let mut pass = ArmRestorer {
        restorer: ReadRestorer {
            cursor,
            restored: 0,
        },
    };
    walk_arms(program, &mut pass);
    pass.restorer.restored
}

/// Restore cursor reads inside diagnostics still waiting in the side table.
pub fn restore_pending(table: &mut InstrumentationMap, cursor: &Cursor) -> usize {
    let mut restorer = ReadRestorer {
        cursor,
        restored: 0,
    };
    for diagnostic in table.pending_mut() {
        diagnostic.visit_mut_with(&mut restorer);
    }
    restorer.restored
}

struct ArmRestorer<'a> {
    restorer: ReadRestorer<'a>,
}

impl ArmVisitor for ArmRestorer<'_> {
    fn visit_arm(&mut self, stmt: &mut ExprStmt) {
        stmt.visit_mut_with(&mut self.restorer);
    }
}

struct ReadRestorer<'a> {
    cursor: &'a Cursor,
    restored: usize,
}

impl VisitMut for ReadRestorer<'_> {
    fn visit_mut_member_expr(&mut self, member: &mut MemberExpr) {
        member.obj.visit_mut_with(self);
        if let MemberProp::Computed(computed) = &mut member.prop {
            if self.cursor.peek_offset(&computed.expr).is_some() {
                *computed.expr = self.cursor.increment();
                self.restored += 1;
                return;
            }
        }
        member.prop.visit_mut_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::peek::rewrite_reads;
    use crate::compiler::source::{parse, print};

    #[test]
    fn restores_what_peek_rewrote() {
        let source = "switch (op) { case 1: e[I[++k]] = e[I[++k]] + I[++k]; break; }";
        let cursor = Cursor::new("k");

        let pristine = print(&parse(source).expect("should parse")).expect("should print");
        let mut parsed = parse(source).expect("should parse");
        assert_eq!(rewrite_reads(&mut parsed.program, &cursor), 3);
        assert_eq!(restore_reads(&mut parsed.program, &cursor), 3);
        assert_eq!(print(&parsed).expect("should print"), pristine);
    }

    #[test]
    fn source_subtractions_are_untouched() {
        let source = "switch (op) { case 1: x.y = arr[k - 1] - k; break; }";
        let cursor = Cursor::new("k");
        let pristine = print(&parse(source).expect("should parse")).expect("should print");
        let mut parsed = parse(source).expect("should parse");
        assert_eq!(restore_reads(&mut parsed.program, &cursor), 0);
        assert_eq!(print(&parsed).expect("should print"), pristine);
    }
}
