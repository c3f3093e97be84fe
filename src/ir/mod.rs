pub mod ast;
#[cfg(test)]
pub mod builder;
pub mod evaluator;
pub mod optimizer;
pub mod passes;
mod var_name;

pub use ast::{BinaryOp, Block, Expr, Param, Program, Statement, TerminatorKind, UnaryOp};
pub use evaluator::{EvalError, Evaluation, Value, evaluate};
pub use optimizer::{Optimized, Optimizer};
pub use passes::{
    DeadCodeEliminationPass, LiteralCondition, Pass, PassOutcome, apply_dead_code_elimination,
};
pub use var_name::{InvalidVarNameError, VarName};
