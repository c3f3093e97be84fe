//! Dead code elimination for the AST of an R-like scripting language.
//!
//! The pass removes statements that follow a `return`, `break` or `next` in
//! the same block, collapses `if` statements with a literal `TRUE`/`FALSE`
//! condition into the taken branch, and drops `while (FALSE)` loops. It is a
//! single pure traversal; [`Optimizer`] drives passes to a fixpoint and
//! optimizes batches of independent programs.

pub mod config;
mod environment;
pub mod ir;
pub mod log;

pub use config::{ConfigError, OptimizerConfig};
pub use ir::{
    DeadCodeEliminationPass, Optimized, Optimizer, Pass, PassOutcome, Program,
    apply_dead_code_elimination,
};
