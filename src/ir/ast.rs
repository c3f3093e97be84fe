use std::fmt;

use pretty::BoxDoc;

pub use super::var_name::VarName;

// This module contains the types and implementations for the AST the
// optimizer rewrites, together with its printer.
//
// The AST structure is:
// * Program -> Statement -> (Block | Expr)

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Program {
    /// Label for the program (e.g. a file name or snippet index), used in logs
    pub name: String,
    /// Top-level definitions and statements in source order
    pub body: Vec<Statement>,
}

/// An ordered statement sequence, e.g. `{ a; b }`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorKind {
    Return,
    Break,
    Next,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: VarName,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A bare braced block.
    Block(Block),

    /// Execute `then_block` if the condition holds, `else_block` otherwise.
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },

    /// Execute the body while the condition holds.
    While { condition: Expr, body: Block },

    /// Bind a named function, e.g. `f <- function(x) { ... }`.
    FunctionDef {
        name: VarName,
        params: Vec<Param>,
        body: Block,
    },

    /// `return(...)`, `break` or `next`.
    ///
    /// Unconditionally leaves the enclosing function or loop iteration.
    Terminator {
        kind: TerminatorKind,
        payload: Option<Expr>,
    },

    /// Loop over the elements of a vector.
    For {
        var: VarName,
        iterable: Expr,
        body: Block,
    },

    /// Loop until a `break`.
    Repeat { body: Block },

    /// Bind a variable to the value of an expression.
    Assign { target: VarName, value: Expr },

    /// An expression evaluated for its effects, e.g. a call.
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A variable reference, e.g. foo
    Var { value: VarName },

    /// TRUE or FALSE
    BooleanLiteral { value: bool },

    /// A numeric literal, e.g. 2.5
    NumberLiteral { value: f64 },

    /// A string literal, e.g. "foo bar"
    StringLiteral { value: String },

    /// NULL
    Null,

    Unary { op: UnaryOp, operand: Box<Expr> },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// A call of a named function, e.g. print(x)
    Call { function: VarName, args: Vec<Expr> },

    /// An anonymous function, e.g. function(x) { x + 1 }
    Function { params: Vec<Param>, body: Block },
}

impl Program {
    pub fn new(name: impl Into<String>, body: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    /// Number of statement, expression and parameter nodes in the program
    pub fn node_count(&self) -> usize {
        self.body.iter().map(Statement::node_count).sum()
    }

    /// Visit every block in the program, outermost first
    pub fn traverse_blocks<F>(&self, f: &mut F)
    where
        F: FnMut(&Block),
    {
        for stmt in &self.body {
            for block in stmt.child_blocks() {
                block.traverse(f);
            }
        }
    }

    pub fn to_doc(&self) -> BoxDoc<'_> {
        BoxDoc::intersperse(self.body.iter().map(Statement::to_doc), BoxDoc::hardline())
    }
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.statements.iter().map(Statement::node_count).sum()
    }

    /// Visit this block and every block nested inside it
    pub fn traverse<F>(&self, f: &mut F)
    where
        F: FnMut(&Block),
    {
        f(self);
        for stmt in &self.statements {
            for block in stmt.child_blocks() {
                block.traverse(f);
            }
        }
    }

    pub fn to_doc(&self) -> BoxDoc<'_> {
        if self.is_empty() {
            return BoxDoc::text("{}");
        }
        BoxDoc::text("{")
            .append(
                BoxDoc::hardline()
                    .append(BoxDoc::intersperse(
                        self.statements.iter().map(Statement::to_doc),
                        BoxDoc::hardline(),
                    ))
                    .nest(2),
            )
            .append(BoxDoc::hardline())
            .append(BoxDoc::text("}"))
    }
}

impl Param {
    fn node_count(&self) -> usize {
        1 + self.default.as_ref().map_or(0, Expr::node_count)
    }

    fn to_doc(&self) -> BoxDoc<'_> {
        let name = BoxDoc::text(self.name.as_str());
        match &self.default {
            Some(default) => name.append(BoxDoc::text(" = ")).append(default.to_doc()),
            None => name,
        }
    }
}

impl TerminatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminatorKind::Return => "return",
            TerminatorKind::Break => "break",
            TerminatorKind::Next => "next",
        }
    }
}

impl Statement {
    pub fn is_terminator(&self) -> bool {
        matches!(self, Statement::Terminator { .. })
    }

    pub fn node_count(&self) -> usize {
        let children = match self {
            Statement::Block(block) => block.node_count(),
            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                condition.node_count()
                    + then_block.node_count()
                    + else_block.as_ref().map_or(0, Block::node_count)
            }
            Statement::While { condition, body } => condition.node_count() + body.node_count(),
            Statement::FunctionDef { params, body, .. } => {
                params.iter().map(Param::node_count).sum::<usize>() + body.node_count()
            }
            Statement::Terminator { payload, .. } => payload.as_ref().map_or(0, Expr::node_count),
            Statement::For { iterable, body, .. } => iterable.node_count() + body.node_count(),
            Statement::Repeat { body } => body.node_count(),
            Statement::Assign { value, .. } => value.node_count(),
            Statement::Expr(expr) => expr.node_count(),
        };
        1 + children
    }

    /// Blocks owned directly by this statement, including the bodies of
    /// function literals inside its expressions.
    pub fn child_blocks(&self) -> Vec<&Block> {
        let mut blocks = Vec::new();
        match self {
            Statement::Block(block) => blocks.push(block),
            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                condition.collect_blocks(&mut blocks);
                blocks.push(then_block);
                blocks.extend(else_block);
            }
            Statement::While { condition, body } => {
                condition.collect_blocks(&mut blocks);
                blocks.push(body);
            }
            Statement::FunctionDef { params, body, .. } => {
                for default in params.iter().filter_map(|p| p.default.as_ref()) {
                    default.collect_blocks(&mut blocks);
                }
                blocks.push(body);
            }
            Statement::Terminator { payload, .. } => {
                if let Some(payload) = payload {
                    payload.collect_blocks(&mut blocks);
                }
            }
            Statement::For { iterable, body, .. } => {
                iterable.collect_blocks(&mut blocks);
                blocks.push(body);
            }
            Statement::Repeat { body } => blocks.push(body),
            Statement::Assign { value, .. } => value.collect_blocks(&mut blocks),
            Statement::Expr(expr) => expr.collect_blocks(&mut blocks),
        }
        blocks
    }

    pub fn to_doc(&self) -> BoxDoc<'_> {
        match self {
            Statement::Block(block) => block.to_doc(),
            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                let doc = BoxDoc::text("if (")
                    .append(condition.to_doc())
                    .append(BoxDoc::text(") "))
                    .append(then_block.to_doc());
                match else_block {
                    Some(else_block) => doc.append(BoxDoc::text(" else ")).append(else_block.to_doc()),
                    None => doc,
                }
            }
            Statement::While { condition, body } => BoxDoc::text("while (")
                .append(condition.to_doc())
                .append(BoxDoc::text(") "))
                .append(body.to_doc()),
            Statement::FunctionDef { name, params, body } => BoxDoc::text(name.as_str())
                .append(BoxDoc::text(" <- "))
                .append(function_doc(params, body)),
            Statement::Terminator { kind, payload } => match (kind, payload) {
                (TerminatorKind::Return, Some(payload)) => BoxDoc::text("return(")
                    .append(payload.to_doc())
                    .append(BoxDoc::text(")")),
                (TerminatorKind::Return, None) => BoxDoc::text("return()"),
                (kind, _) => BoxDoc::text(kind.as_str()),
            },
            Statement::For {
                var,
                iterable,
                body,
            } => BoxDoc::text("for (")
                .append(BoxDoc::text(var.as_str()))
                .append(BoxDoc::text(" in "))
                .append(iterable.to_doc())
                .append(BoxDoc::text(") "))
                .append(body.to_doc()),
            Statement::Repeat { body } => BoxDoc::text("repeat ").append(body.to_doc()),
            Statement::Assign { target, value } => BoxDoc::text(target.as_str())
                .append(BoxDoc::text(" <- "))
                .append(value.to_doc()),
            Statement::Expr(expr) => expr.to_doc(),
        }
    }
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl Expr {
    pub fn node_count(&self) -> usize {
        let children = match self {
            Expr::Var { .. }
            | Expr::BooleanLiteral { .. }
            | Expr::NumberLiteral { .. }
            | Expr::StringLiteral { .. }
            | Expr::Null => 0,
            Expr::Unary { operand, .. } => operand.node_count(),
            Expr::Binary { left, right, .. } => left.node_count() + right.node_count(),
            Expr::Call { args, .. } => args.iter().map(Expr::node_count).sum(),
            Expr::Function { params, body } => {
                params.iter().map(Param::node_count).sum::<usize>() + body.node_count()
            }
        };
        1 + children
    }

    /// Push the bodies of the function literals inside this expression
    fn collect_blocks<'a>(&'a self, blocks: &mut Vec<&'a Block>) {
        match self {
            Expr::Var { .. }
            | Expr::BooleanLiteral { .. }
            | Expr::NumberLiteral { .. }
            | Expr::StringLiteral { .. }
            | Expr::Null => {}
            Expr::Unary { operand, .. } => operand.collect_blocks(blocks),
            Expr::Binary { left, right, .. } => {
                left.collect_blocks(blocks);
                right.collect_blocks(blocks);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_blocks(blocks);
                }
            }
            Expr::Function { params, body } => {
                for default in params.iter().filter_map(|p| p.default.as_ref()) {
                    default.collect_blocks(blocks);
                }
                blocks.push(body);
            }
        }
    }

    pub fn to_doc(&self) -> BoxDoc<'_> {
        match self {
            Expr::Var { value } => BoxDoc::text(value.as_str()),
            Expr::BooleanLiteral { value: true } => BoxDoc::text("TRUE"),
            Expr::BooleanLiteral { value: false } => BoxDoc::text("FALSE"),
            Expr::NumberLiteral { value } => BoxDoc::text(value.to_string()),
            Expr::StringLiteral { value } => BoxDoc::text(format!("{:?}", value)),
            Expr::Null => BoxDoc::text("NULL"),
            Expr::Unary { op, operand } => BoxDoc::text(op.as_str()).append(operand.operand_doc()),
            Expr::Binary { op, left, right } => left
                .operand_doc()
                .append(BoxDoc::text(format!(" {} ", op.as_str())))
                .append(right.operand_doc()),
            Expr::Call { function, args } => BoxDoc::text(function.as_str())
                .append(BoxDoc::text("("))
                .append(BoxDoc::intersperse(
                    args.iter().map(Expr::to_doc),
                    BoxDoc::text(", "),
                ))
                .append(BoxDoc::text(")")),
            Expr::Function { params, body } => function_doc(params, body),
        }
    }

    // Operators bind tighter than anything printed here, so compound
    // operands are always parenthesised.
    fn operand_doc(&self) -> BoxDoc<'_> {
        match self {
            Expr::Binary { .. } | Expr::Function { .. } => BoxDoc::text("(")
                .append(self.to_doc())
                .append(BoxDoc::text(")")),
            _ => self.to_doc(),
        }
    }
}

fn function_doc<'a>(params: &'a [Param], body: &'a Block) -> BoxDoc<'a> {
    BoxDoc::text("function(")
        .append(BoxDoc::intersperse(
            params.iter().map(Param::to_doc),
            BoxDoc::text(", "),
        ))
        .append(BoxDoc::text(") "))
        .append(body.to_doc())
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_doc().pretty(60))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_doc().pretty(60))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_doc().pretty(60))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            return Ok(());
        }
        writeln!(f, "{}", self.to_doc().pretty(60))
    }
}
