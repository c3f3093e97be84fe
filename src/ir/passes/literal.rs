use crate::ir::ast::Expr;

/// How a condition reads when only its literal syntax is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralCondition {
    LiteralTrue,
    LiteralFalse,
    NotLiteral,
}

impl LiteralCondition {
    /// Classify an expression. Only the `TRUE`/`FALSE` literal nodes are
    /// recognised; variables, negations and compound boolean expressions
    /// are `NotLiteral` even when their value is statically known.
    pub fn of(expr: &Expr) -> Self {
        match expr {
            Expr::BooleanLiteral { value: true } => LiteralCondition::LiteralTrue,
            Expr::BooleanLiteral { value: false } => LiteralCondition::LiteralFalse,
            _ => LiteralCondition::NotLiteral,
        }
    }
}
