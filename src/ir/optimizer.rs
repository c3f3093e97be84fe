use rayon::prelude::*;

use super::ast::Program;
use super::passes::{DeadCodeEliminationPass, Pass};
use crate::config::OptimizerConfig;
use crate::{log_debug, log_info, log_warn};

/// A program after the pipeline has run over it
#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    pub program: Program,
    /// Number of rounds executed, including the final unchanged one
    pub rounds: usize,
    /// Whether any pass changed the program in any round
    pub changed: bool,
}

/// An optimizer that runs optimization passes on programs until none of
/// them reports a change
pub struct Optimizer {
    passes: Vec<Box<dyn Pass>>,
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            passes: Vec::new(),
            config,
        }
    }

    /// Add a pass to the optimizer
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Run all passes on the program, round after round, until a round
    /// leaves it unchanged or `max_rounds` is reached
    pub fn run(&self, program: Program) -> Optimized {
        let mut current = program;
        let mut changed = false;

        for round in 1..=self.config.max_rounds {
            let mut round_changed = false;
            for pass in &self.passes {
                let outcome = pass.run(current);
                if self.config.trace {
                    log_debug!(
                        "optimizer",
                        program = outcome.program.name,
                        round = round,
                        pass = pass.name(),
                        changed = outcome.changed,
                    );
                }
                round_changed |= outcome.changed;
                current = outcome.program;
            }
            changed |= round_changed;

            if !round_changed {
                if self.config.trace {
                    log_info!(
                        "optimizer",
                        program = current.name,
                        rounds = round,
                        nodes = current.node_count(),
                    );
                }
                return Optimized {
                    program: current,
                    rounds: round,
                    changed,
                };
            }
        }

        log_warn!(
            "optimizer",
            program = current.name,
            max_rounds = self.config.max_rounds,
            status = "no fixpoint",
        );
        Optimized {
            program: current,
            rounds: self.config.max_rounds,
            changed,
        }
    }

    /// Optimize independent programs, returning them in input order
    pub fn run_batch(&self, programs: Vec<Program>) -> Vec<Program> {
        if self.config.parallel {
            programs
                .into_par_iter()
                .map(|program| self.run(program).program)
                .collect()
        } else {
            programs
                .into_iter()
                .map(|program| self.run(program).program)
                .collect()
        }
    }

    /// Create the default optimization pipeline
    pub fn default_pipeline(config: OptimizerConfig) -> Self {
        let mut optimizer = Self::new(config);
        optimizer.add_pass(Box::new(DeadCodeEliminationPass));
        optimizer
    }
}
