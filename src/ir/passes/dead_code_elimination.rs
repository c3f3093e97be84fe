use std::iter;

use itertools::Either;

use super::{LiteralCondition, Pass, PassOutcome};
use crate::ir::ast::{Block, Expr, Param, Program, Statement};

/// What a statement becomes once it has been simplified.
#[derive(Debug)]
enum Rewritten {
    /// A statement that stays in its position.
    Single(Statement),
    /// Statements to inline into the enclosing sequence in place of the
    /// original one. May be empty.
    Splice(Block),
}

impl IntoIterator for Rewritten {
    type Item = Statement;
    type IntoIter = Either<iter::Once<Statement>, std::vec::IntoIter<Statement>>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Rewritten::Single(stmt) => Either::Left(iter::once(stmt)),
            Rewritten::Splice(block) => Either::Right(block.statements.into_iter()),
        }
    }
}

/// A pass that eliminates statically dead code:
/// * statements following a `return`, `break` or `next` in the same block
/// * `if` statements with a literal condition, replaced by the taken branch
/// * `while (FALSE)` loops
pub struct DeadCodeEliminationPass;

impl DeadCodeEliminationPass {
    /// Simplify every statement of the block in order, inlining spliced
    /// results, and drop everything after the first terminator.
    fn rewrite_block(block: Block) -> Block {
        let mut statements = Vec::with_capacity(block.statements.len());
        'statements: for stmt in block.statements {
            for rewritten in Self::rewrite_statement(stmt) {
                let terminates = rewritten.is_terminator();
                statements.push(rewritten);
                if terminates {
                    break 'statements;
                }
            }
        }
        Block::new(statements)
    }

    fn rewrite_statement(stmt: Statement) -> Rewritten {
        match stmt {
            Statement::Block(block) => Rewritten::Splice(Self::rewrite_block(block)),

            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                let condition = Self::rewrite_expr(condition);
                // Branches first, so a collapsed branch is already final
                let then_block = Self::rewrite_block(then_block);
                let else_block = else_block.map(Self::rewrite_block);
                match LiteralCondition::of(&condition) {
                    LiteralCondition::LiteralTrue => Rewritten::Splice(then_block),
                    LiteralCondition::LiteralFalse => {
                        Rewritten::Splice(else_block.unwrap_or_default())
                    }
                    LiteralCondition::NotLiteral => Rewritten::Single(Statement::If {
                        condition,
                        then_block,
                        else_block,
                    }),
                }
            }

            Statement::While { condition, body } => {
                let condition = Self::rewrite_expr(condition);
                let body = Self::rewrite_block(body);
                match LiteralCondition::of(&condition) {
                    LiteralCondition::LiteralFalse => Rewritten::Splice(Block::default()),
                    // while (TRUE) only ends through a break in its body
                    LiteralCondition::LiteralTrue | LiteralCondition::NotLiteral => {
                        Rewritten::Single(Statement::While { condition, body })
                    }
                }
            }

            Statement::FunctionDef { name, params, body } => {
                Rewritten::Single(Statement::FunctionDef {
                    name,
                    params: Self::rewrite_params(params),
                    body: Self::rewrite_block(body),
                })
            }

            Statement::Terminator { kind, payload } => Rewritten::Single(Statement::Terminator {
                kind,
                payload: payload.map(Self::rewrite_expr),
            }),

            Statement::For {
                var,
                iterable,
                body,
            } => Rewritten::Single(Statement::For {
                var,
                iterable: Self::rewrite_expr(iterable),
                body: Self::rewrite_block(body),
            }),

            Statement::Repeat { body } => Rewritten::Single(Statement::Repeat {
                body: Self::rewrite_block(body),
            }),

            Statement::Assign { target, value } => Rewritten::Single(Statement::Assign {
                target,
                value: Self::rewrite_expr(value),
            }),

            Statement::Expr(expr) => Rewritten::Single(Statement::Expr(Self::rewrite_expr(expr))),
        }
    }

    fn rewrite_params(params: Vec<Param>) -> Vec<Param> {
        params
            .into_iter()
            .map(|Param { name, default }| Param {
                name,
                default: default.map(Self::rewrite_expr),
            })
            .collect()
    }

    /// Rewrite the bodies of the function literals inside an expression.
    /// Never turns a non-literal expression into a `TRUE`/`FALSE` literal.
    fn rewrite_expr(expr: Expr) -> Expr {
        match expr {
            Expr::Function { params, body } => Expr::Function {
                params: Self::rewrite_params(params),
                body: Self::rewrite_block(body),
            },
            Expr::Call { function, args } => Expr::Call {
                function,
                args: args.into_iter().map(Self::rewrite_expr).collect(),
            },
            Expr::Unary { op, operand } => Expr::Unary {
                op,
                operand: Box::new(Self::rewrite_expr(*operand)),
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op,
                left: Box::new(Self::rewrite_expr(*left)),
                right: Box::new(Self::rewrite_expr(*right)),
            },
            leaf @ (Expr::Var { .. }
            | Expr::BooleanLiteral { .. }
            | Expr::NumberLiteral { .. }
            | Expr::StringLiteral { .. }
            | Expr::Null) => leaf,
        }
    }
}

/// Run dead code elimination over every top-level statement of a program.
///
/// Top-level statements are independent definitions, so spliced results are
/// inlined in place but a top-level terminator does not truncate the
/// statements after it. `changed` reports whether the node count dropped.
pub fn apply_dead_code_elimination(program: Program) -> PassOutcome {
    let before = program.node_count();
    let Program { name, body } = program;
    let body = body
        .into_iter()
        .flat_map(DeadCodeEliminationPass::rewrite_statement)
        .collect();
    let program = Program { name, body };
    let changed = program.node_count() < before;
    PassOutcome { program, changed }
}

impl Pass for DeadCodeEliminationPass {
    fn name(&self) -> &'static str {
        "dead_code_elimination"
    }

    fn run(&self, program: Program) -> PassOutcome {
        apply_dead_code_elimination(program)
    }
}
