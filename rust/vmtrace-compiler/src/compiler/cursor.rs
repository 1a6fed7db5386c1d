//! The VM's bytecode cursor and the two expression forms a read through it can take:
//! the mutating `++k` and the synthesized peek `k - n`.

use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{BinExpr, BinaryOp, Expr, Ident, Lit, Number, UpdateExpr, UpdateOp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    name: String,
}

impl Cursor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn is_ident(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Ident(ident) if &*ident.sym == self.name)
    }

    /// `++k` or `k++`: every form that advances the cursor.
    pub fn is_increment(&self, update: &UpdateExpr) -> bool {
        update.op == UpdateOp::PlusPlus && self.is_ident(&update.arg)
    }

    /// `++k` only. This is the single form a peek can be restored to.
    pub fn is_prefix_increment(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Update(update) if update.prefix && self.is_increment(update))
    }

    /// `k - offset`. The offset literal has no raw text, which is what separates
    /// a synthesized peek from a `k - 1` written in the handler.
    pub fn peek(&self, offset: usize) -> Expr {
        Expr::Bin(BinExpr {
            span: DUMMY_SP,
            op: BinaryOp::Sub,
            left: Box::new(self.ident()),
            right: Box::new(Expr::Lit(Lit::Num(Number {
                span: DUMMY_SP,
                value: offset as f64,
                raw: None,
            }))),
        })
    }

    /// Offset of a synthesized peek, or `None` for anything else.
    pub fn peek_offset(&self, expr: &Expr) -> Option<usize> {
        let Expr::Bin(bin) = expr else {
            return None;
        };
        if bin.op != BinaryOp::Sub || !self.is_ident(&bin.left) {
            return None;
        }
        match &*bin.right {
            Expr::Lit(Lit::Num(num)) if num.raw.is_none() && num.value >= 0.0 => {
                Some(num.value as usize)
            }
            _ => None,
        }
    }

    /// `++k`
    pub fn increment(&self) -> Expr {
        Expr::Update(UpdateExpr {
            span: DUMMY_SP,
            op: UpdateOp::PlusPlus,
            prefix: true,
            arg: Box::new(self.ident()),
        })
    }

    fn ident(&self) -> Expr {
        Expr::Ident(Ident::new(
            self.name.as_str().into(),
            DUMMY_SP,
            SyntaxContext::empty(),
        ))
    }
}
