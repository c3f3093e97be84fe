use crate::ir::ast::{
    BinaryOp, Block, Expr, Param, Program, Statement, TerminatorKind, UnaryOp, VarName,
};

fn var_name(name: &str) -> VarName {
    VarName::new(name).unwrap_or_else(|err| panic!("Invalid test variable name '{}': {}", name, err))
}

fn params(names: &[&str]) -> Vec<Param> {
    names
        .iter()
        .map(|name| Param {
            name: var_name(name),
            default: None,
        })
        .collect()
}

pub fn build_program<F>(name: &str, body_fn: F) -> Program
where
    F: FnOnce(&mut IrBuilder),
{
    let mut builder = IrBuilder::new();
    body_fn(&mut builder);
    Program::new(name, builder.statements)
}

pub struct IrBuilder {
    statements: Vec<Statement>,
}

impl IrBuilder {
    fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    fn build_block<F>(&self, body_fn: F) -> Block
    where
        F: FnOnce(&mut Self),
    {
        let mut inner_builder = Self::new();
        body_fn(&mut inner_builder);
        Block::new(inner_builder.statements)
    }

    // Expression builders
    pub fn bool(&self, value: bool) -> Expr {
        Expr::BooleanLiteral { value }
    }

    pub fn num(&self, value: f64) -> Expr {
        Expr::NumberLiteral { value }
    }

    pub fn str(&self, value: &str) -> Expr {
        Expr::StringLiteral {
            value: value.to_string(),
        }
    }

    pub fn null(&self) -> Expr {
        Expr::Null
    }

    pub fn var(&self, name: &str) -> Expr {
        Expr::Var {
            value: var_name(name),
        }
    }

    fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn sub(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::Subtract, left, right)
    }

    pub fn mul(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::Multiply, left, right)
    }

    pub fn eq(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::Equals, left, right)
    }

    pub fn lt(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::LessThan, left, right)
    }

    pub fn gt(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::GreaterThan, left, right)
    }

    pub fn and(&self, left: Expr, right: Expr) -> Expr {
        self.binary(BinaryOp::And, left, right)
    }

    pub fn not(&self, operand: Expr) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn call(&self, function: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            function: var_name(function),
            args,
        }
    }

    pub fn function<F>(&self, param_names: &[&str], body_fn: F) -> Expr
    where
        F: FnOnce(&mut Self),
    {
        Expr::Function {
            params: params(param_names),
            body: self.build_block(body_fn),
        }
    }

    // Statement builders
    pub fn assign(&mut self, target: &str, value: Expr) {
        self.statements.push(Statement::Assign {
            target: var_name(target),
            value,
        });
    }

    pub fn call_stmt(&mut self, function: &str, args: Vec<Expr>) {
        let call = self.call(function, args);
        self.statements.push(Statement::Expr(call));
    }

    pub fn if_stmt<F>(&mut self, cond: Expr, body_fn: F)
    where
        F: FnOnce(&mut Self),
    {
        let then_block = self.build_block(body_fn);
        self.statements.push(Statement::If {
            condition: cond,
            then_block,
            else_block: None,
        });
    }

    pub fn if_else_stmt<F, G>(&mut self, cond: Expr, body_fn: F, else_body_fn: G)
    where
        F: FnOnce(&mut Self),
        G: FnOnce(&mut Self),
    {
        let then_block = self.build_block(body_fn);
        let else_block = self.build_block(else_body_fn);
        self.statements.push(Statement::If {
            condition: cond,
            then_block,
            else_block: Some(else_block),
        });
    }

    pub fn while_loop<F>(&mut self, cond: Expr, body_fn: F)
    where
        F: FnOnce(&mut Self),
    {
        let body = self.build_block(body_fn);
        self.statements.push(Statement::While {
            condition: cond,
            body,
        });
    }

    pub fn for_loop<F>(&mut self, var: &str, iterable: Expr, body_fn: F)
    where
        F: FnOnce(&mut Self),
    {
        let body = self.build_block(body_fn);
        self.statements.push(Statement::For {
            var: var_name(var),
            iterable,
            body,
        });
    }

    pub fn repeat_loop<F>(&mut self, body_fn: F)
    where
        F: FnOnce(&mut Self),
    {
        let body = self.build_block(body_fn);
        self.statements.push(Statement::Repeat { body });
    }

    pub fn block<F>(&mut self, body_fn: F)
    where
        F: FnOnce(&mut Self),
    {
        let block = self.build_block(body_fn);
        self.statements.push(Statement::Block(block));
    }

    pub fn function_def<F>(&mut self, name: &str, param_names: &[&str], body_fn: F)
    where
        F: FnOnce(&mut Self),
    {
        let body = self.build_block(body_fn);
        self.statements.push(Statement::FunctionDef {
            name: var_name(name),
            params: params(param_names),
            body,
        });
    }

    pub fn function_def_with_defaults<F>(
        &mut self,
        name: &str,
        defaults: Vec<(&str, Expr)>,
        body_fn: F,
    ) where
        F: FnOnce(&mut Self),
    {
        let body = self.build_block(body_fn);
        let params = defaults
            .into_iter()
            .map(|(param, default)| Param {
                name: var_name(param),
                default: Some(default),
            })
            .collect();
        self.statements.push(Statement::FunctionDef {
            name: var_name(name),
            params,
            body,
        });
    }

    pub fn return_value(&mut self, value: Expr) {
        self.statements.push(Statement::Terminator {
            kind: TerminatorKind::Return,
            payload: Some(value),
        });
    }

    pub fn return_empty(&mut self) {
        self.statements.push(Statement::Terminator {
            kind: TerminatorKind::Return,
            payload: None,
        });
    }

    pub fn break_loop(&mut self) {
        self.statements.push(Statement::Terminator {
            kind: TerminatorKind::Break,
            payload: None,
        });
    }

    pub fn next_iteration(&mut self) {
        self.statements.push(Statement::Terminator {
            kind: TerminatorKind::Next,
            payload: None,
        });
    }
}
