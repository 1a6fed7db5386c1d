//! Classification of the right-hand side of a dispatch-arm assignment.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use swc_core::ecma::ast::{
    ArrayLit, BinExpr, Callee, Expr, ExprOrSpread, MemberExpr, MemberProp, UnaryExpr, UpdateExpr,
};

use super::locator::peel_parens;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShapeKind {
    Binary,
    Unary,
    Update,
    ArrayLiteral,
    AdaptorCall,
    MethodCall,
    FunctionCall,
}

/// `Function.prototype` methods that re-target `this`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adaptor {
    Call,
    Apply,
    Bind,
}

impl Adaptor {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "call" => Some(Adaptor::Call),
            "apply" => Some(Adaptor::Apply),
            "bind" => Some(Adaptor::Bind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RhsShape<'a> {
    /// Arithmetic, relational, equality, bitwise or logical operation.
    Binary(&'a BinExpr),
    Unary(&'a UnaryExpr),
    Update(&'a UpdateExpr),
    Array(&'a ArrayLit),
    /// `receiver.call(...)`, `receiver.apply(...)`, `receiver.bind(...)`.
    Adaptor {
        adaptor: Adaptor,
        receiver: &'a Expr,
        args: &'a [ExprOrSpread],
    },
    /// A call or `new` whose callee is a member access.
    MethodCall {
        callee: &'a MemberExpr,
        args: &'a [ExprOrSpread],
        construct: bool,
    },
    /// A call or `new` with any other callee.
    FunctionCall {
        callee: &'a Expr,
        args: &'a [ExprOrSpread],
        construct: bool,
    },
}

impl RhsShape<'_> {
    pub fn kind(&self) -> ShapeKind {
        match self {
            RhsShape::Binary(_) => ShapeKind::Binary,
            RhsShape::Unary(_) => ShapeKind::Unary,
            RhsShape::Update(_) => ShapeKind::Update,
            RhsShape::Array(_) => ShapeKind::ArrayLiteral,
            RhsShape::Adaptor { .. } => ShapeKind::AdaptorCall,
            RhsShape::MethodCall { .. } => ShapeKind::MethodCall,
            RhsShape::FunctionCall { .. } => ShapeKind::FunctionCall,
        }
    }
}

/// Classify `rhs` into exactly one shape, or `None` when it has none worth logging.
pub fn classify(rhs: &Expr) -> Option<RhsShape<'_>> {
    match peel_parens(rhs) {
        Expr::Bin(bin) => Some(RhsShape::Binary(bin)),
        Expr::Unary(unary) => Some(RhsShape::Unary(unary)),
        Expr::Update(update) => Some(RhsShape::Update(update)),
        Expr::Array(array) => Some(RhsShape::Array(array)),
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => Some(classify_call(callee, &call.args, false)),
            Callee::Super(_) | Callee::Import(_) => None,
        },
        Expr::New(new) => {
            let args = new.args.as_deref().unwrap_or(&[]);
            Some(classify_call(&new.callee, args, true))
        }
        _ => None,
    }
}

fn classify_call<'a>(callee: &'a Expr, args: &'a [ExprOrSpread], construct: bool) -> RhsShape<'a> {
    let Expr::Member(member) = callee else {
        return RhsShape::FunctionCall {
            callee,
            args,
            construct,
        };
    };
    let adaptor = match &member.prop {
        MemberProp::Ident(name) if !construct => Adaptor::from_name(&name.sym),
        _ => None,
    };
    match adaptor {
        Some(adaptor) => RhsShape::Adaptor {
            adaptor,
            receiver: &member.obj,
            args,
        },
        None => RhsShape::MethodCall {
            callee: member,
            args,
            construct,
        },
    }
}
