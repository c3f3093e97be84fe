mod dead_code_elimination;
mod literal;

pub use dead_code_elimination::{DeadCodeEliminationPass, apply_dead_code_elimination};
pub use literal::LiteralCondition;

use super::ast::Program;

/// The result of running a pass over a program
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub program: Program,
    /// Whether the pass shrank the program. Drivers iterate to a fixpoint on this.
    pub changed: bool,
}

/// Trait for optimization passes that operate on whole programs
///
/// A pass is a pure function of its input: it holds no state across
/// invocations, so one instance can be shared between threads working on
/// independent programs.
pub trait Pass: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Run the pass on a program, transforming it into a new program
    fn run(&self, program: Program) -> PassOutcome;
}
