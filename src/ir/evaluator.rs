use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use thiserror::Error;

use super::ast::{BinaryOp, Block, Expr, Param, Program, Statement, TerminatorKind, UnaryOp};
use crate::environment::Environment;

/// Deepest closure call nesting before evaluation gives up
const MAX_CALL_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub params: Vec<Param>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Vector(Vec<Value>),
    Closure(Rc<Closure>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(true) => write!(f, "TRUE"),
            Value::Bool(false) => write!(f, "FALSE"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Vector(items) => write!(f, "c({})", items.iter().join(", ")),
            Value::Closure(_) => write!(f, "<function>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("object '{name}' not found")]
    UndefinedVariable { name: String },

    #[error("could not find function \"{name}\"")]
    NotAFunction { name: String },

    #[error("function \"{name}\" takes {expected} arguments but got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid operand for '{operator}': {value}")]
    TypeMismatch { operator: &'static str, value: String },

    #[error("argument is not interpretable as logical: {value}")]
    NotALogical { value: String },

    #[error("no loop for break/next, jumping to top level")]
    NoLoopForBreakNext,

    #[error("evaluation fuel exhausted")]
    FuelExhausted,

    #[error("evaluation nested too deeply")]
    CallDepthExceeded,
}

/// Everything observable about one run of a program
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Rendered values passed to `print`, in order
    pub output: Vec<String>,
    /// The `return` payload, `Null` when control falls off the end
    pub result: Result<Value, EvalError>,
}

/// How control leaves a statement
enum Flow {
    Normal,
    Return(Value),
    Break,
    Next,
}

/// Evaluate a program. Each loop iteration and closure call consumes one
/// unit of fuel, so non-terminating programs end with
/// [`EvalError::FuelExhausted`].
pub fn evaluate(program: &Program, fuel: usize) -> Evaluation {
    let mut evaluator = Evaluator {
        env: Environment::new(),
        output: Vec::new(),
        fuel,
    };
    let result = evaluator.eval_program(program);
    Evaluation {
        output: evaluator.output,
        result,
    }
}

struct Evaluator {
    env: Environment<Value>,
    output: Vec<String>,
    fuel: usize,
}

impl Evaluator {
    fn eval_program(&mut self, program: &Program) -> Result<Value, EvalError> {
        match self.eval_statements(&program.body)? {
            Flow::Normal => Ok(Value::Null),
            Flow::Return(value) => Ok(value),
            Flow::Break | Flow::Next => Err(EvalError::NoLoopForBreakNext),
        }
    }

    fn consume_fuel(&mut self) -> Result<(), EvalError> {
        self.fuel = self.fuel.checked_sub(1).ok_or(EvalError::FuelExhausted)?;
        Ok(())
    }

    fn eval_statements(&mut self, statements: &[Statement]) -> Result<Flow, EvalError> {
        for statement in statements {
            match self.eval_statement(statement)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// Run one loop iteration. `None` means keep looping.
    fn eval_iteration(&mut self, body: &Block) -> Result<Option<Flow>, EvalError> {
        self.consume_fuel()?;
        match self.eval_statements(&body.statements)? {
            Flow::Normal | Flow::Next => Ok(None),
            Flow::Break => Ok(Some(Flow::Normal)),
            flow @ Flow::Return(_) => Ok(Some(flow)),
        }
    }

    fn eval_statement(&mut self, statement: &Statement) -> Result<Flow, EvalError> {
        match statement {
            Statement::Block(block) => self.eval_statements(&block.statements),

            Statement::If {
                condition,
                then_block,
                else_block,
            } => {
                if self.eval_condition(condition)? {
                    self.eval_statements(&then_block.statements)
                } else if let Some(else_block) = else_block {
                    self.eval_statements(&else_block.statements)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Statement::While { condition, body } => {
                while self.eval_condition(condition)? {
                    if let Some(flow) = self.eval_iteration(body)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }

            Statement::FunctionDef { name, params, body } => {
                let closure = Closure {
                    params: params.clone(),
                    body: body.clone(),
                };
                self.env
                    .assign(name.to_string(), Value::Closure(Rc::new(closure)));
                Ok(Flow::Normal)
            }

            Statement::Terminator { kind, payload } => match kind {
                TerminatorKind::Return => {
                    let value = match payload {
                        Some(payload) => self.eval_expr(payload)?,
                        None => Value::Null,
                    };
                    Ok(Flow::Return(value))
                }
                TerminatorKind::Break => Ok(Flow::Break),
                TerminatorKind::Next => Ok(Flow::Next),
            },

            Statement::For {
                var,
                iterable,
                body,
            } => {
                let items = match self.eval_expr(iterable)? {
                    Value::Vector(items) => items,
                    Value::Null => Vec::new(),
                    value => vec![value],
                };
                for item in items {
                    self.env.assign(var.to_string(), item);
                    if let Some(flow) = self.eval_iteration(body)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }

            Statement::Repeat { body } => loop {
                if let Some(flow) = self.eval_iteration(body)? {
                    return Ok(flow);
                }
            },

            Statement::Assign { target, value } => {
                let value = self.eval_expr(value)?;
                self.env.assign(target.to_string(), value);
                Ok(Flow::Normal)
            }

            Statement::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn eval_condition(&mut self, condition: &Expr) -> Result<bool, EvalError> {
        let value = self.eval_expr(condition)?;
        truthy(&value)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Var { value } => {
                self.env
                    .lookup(value.as_str())
                    .cloned()
                    .ok_or_else(|| EvalError::UndefinedVariable {
                        name: value.to_string(),
                    })
            }
            Expr::BooleanLiteral { value } => Ok(Value::Bool(*value)),
            Expr::NumberLiteral { value } => Ok(Value::Number(*value)),
            Expr::StringLiteral { value } => Ok(Value::Str(value.clone())),
            Expr::Null => Ok(Value::Null),

            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!truthy(&operand)?)),
                    UnaryOp::Negate => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        value => Err(type_mismatch(op.as_str(), &value)),
                    },
                }
            }

            Expr::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                left,
                right,
            } => {
                let left = truthy(&self.eval_expr(left)?)?;
                let short_circuit = matches!(op, BinaryOp::Or) == left;
                if short_circuit {
                    return Ok(Value::Bool(left));
                }
                Ok(Value::Bool(truthy(&self.eval_expr(right)?)?))
            }

            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                eval_binary(*op, left, right)
            }

            Expr::Call { function, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(function.as_str(), args)
            }

            Expr::Function { params, body } => Ok(Value::Closure(Rc::new(Closure {
                params: params.clone(),
                body: body.clone(),
            }))),
        }
    }

    fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        match name {
            "print" => match <[Value; 1]>::try_from(args) {
                Ok([value]) => {
                    self.output.push(value.to_string());
                    Ok(value)
                }
                Err(args) => Err(EvalError::ArityMismatch {
                    name: name.to_string(),
                    expected: 1,
                    actual: args.len(),
                }),
            },
            "c" => Ok(Value::Vector(args)),
            _ => {
                let closure = match self.env.lookup(name) {
                    Some(Value::Closure(closure)) => closure.clone(),
                    _ => {
                        return Err(EvalError::NotAFunction {
                            name: name.to_string(),
                        });
                    }
                };
                self.call_closure(name, &closure, args)
            }
        }
    }

    fn call_closure(
        &mut self,
        name: &str,
        closure: &Closure,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        if args.len() > closure.params.len() {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: closure.params.len(),
                actual: args.len(),
            });
        }
        if self.env.depth() > MAX_CALL_DEPTH {
            return Err(EvalError::CallDepthExceeded);
        }
        self.consume_fuel()?;

        // Defaults are evaluated in the caller's frame
        let mut bindings = Vec::with_capacity(closure.params.len());
        let mut args = args.into_iter();
        for param in &closure.params {
            let value = match (args.next(), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.eval_expr(default)?,
                (None, None) => {
                    return Err(EvalError::ArityMismatch {
                        name: name.to_string(),
                        expected: closure.params.len(),
                        actual: bindings.len(),
                    });
                }
            };
            bindings.push((param.name.to_string(), value));
        }

        self.env.push_frame();
        for (param, value) in bindings {
            self.env.assign(param, value);
        }
        let flow = self.eval_statements(&closure.body.statements);
        self.env.pop_frame();

        match flow? {
            Flow::Normal => Ok(Value::Null),
            Flow::Return(value) => Ok(value),
            Flow::Break | Flow::Next => Err(EvalError::NoLoopForBreakNext),
        }
    }
}

fn type_mismatch(operator: &'static str, value: &Value) -> EvalError {
    EvalError::TypeMismatch {
        operator,
        value: value.to_string(),
    }
}

fn truthy(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if !n.is_nan() => Ok(*n != 0.0),
        value => Err(EvalError::NotALogical {
            value: value.to_string(),
        }),
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match (op, &left, &right) {
        (BinaryOp::Equals, _, _) => Ok(Value::Bool(left == right)),
        (BinaryOp::NotEquals, _, _) => Ok(Value::Bool(left != right)),
        (_, Value::Number(l), Value::Number(r)) => {
            let (l, r) = (*l, *r);
            Ok(match op {
                BinaryOp::Add => Value::Number(l + r),
                BinaryOp::Subtract => Value::Number(l - r),
                BinaryOp::Multiply => Value::Number(l * r),
                BinaryOp::Divide => Value::Number(l / r),
                BinaryOp::LessThan => Value::Bool(l < r),
                BinaryOp::LessThanOrEqual => Value::Bool(l <= r),
                BinaryOp::GreaterThan => Value::Bool(l > r),
                BinaryOp::GreaterThanOrEqual => Value::Bool(l >= r),
                BinaryOp::Equals | BinaryOp::NotEquals | BinaryOp::And | BinaryOp::Or => {
                    return Err(type_mismatch(op.as_str(), &left));
                }
            })
        }
        (_, Value::Number(_), value) | (_, value, _) => Err(type_mismatch(op.as_str(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::build_program;

    const FUEL: usize = 1_000;

    #[test]
    fn prints_and_returns_from_function() {
        let program = build_program("test", |t| {
            t.function_def("double", &["x"], |t| {
                t.return_value(t.mul(t.var("x"), t.num(2.0)));
            });
            t.assign("y", t.call("double", vec![t.num(21.0)]));
            t.call_stmt("print", vec![t.var("y")]);
            t.return_value(t.var("y"));
        });
        let evaluation = evaluate(&program, FUEL);
        assert_eq!(evaluation.output, vec!["42"]);
        assert_eq!(evaluation.result, Ok(Value::Number(42.0)));
    }

    #[test]
    fn loops_honour_break_and_next() {
        let program = build_program("test", |t| {
            t.assign("i", t.num(0.0));
            t.repeat_loop(|t| {
                t.assign("i", t.add(t.var("i"), t.num(1.0)));
                t.if_stmt(t.eq(t.var("i"), t.num(2.0)), |t| t.next_iteration());
                t.if_stmt(t.gt(t.var("i"), t.num(3.0)), |t| t.break_loop());
                t.call_stmt("print", vec![t.var("i")]);
            });
        });
        let evaluation = evaluate(&program, FUEL);
        assert_eq!(evaluation.output, vec!["1", "3"]);
        assert_eq!(evaluation.result, Ok(Value::Null));
    }

    #[test]
    fn for_loop_iterates_vector_elements() {
        let program = build_program("test", |t| {
            t.for_loop(
                "x",
                t.call("c", vec![t.num(1.0), t.str("a"), t.bool(true)]),
                |t| t.call_stmt("print", vec![t.var("x")]),
            );
        });
        let evaluation = evaluate(&program, FUEL);
        assert_eq!(evaluation.output, vec!["1", "\"a\"", "TRUE"]);
    }

    #[test]
    fn infinite_loop_runs_out_of_fuel() {
        let program = build_program("test", |t| {
            t.while_loop(t.bool(true), |t| t.call_stmt("print", vec![t.num(1.0)]));
        });
        let evaluation = evaluate(&program, 3);
        assert_eq!(evaluation.output.len(), 3);
        assert_eq!(evaluation.result, Err(EvalError::FuelExhausted));
    }

    #[test]
    fn unbounded_recursion_hits_depth_limit() {
        let program = build_program("test", |t| {
            t.function_def("f", &[], |t| t.call_stmt("f", vec![]));
            t.call_stmt("f", vec![]);
        });
        assert_eq!(
            evaluate(&program, FUEL).result,
            Err(EvalError::CallDepthExceeded)
        );
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let program = build_program("test", |t| {
            t.function_def("f", &[], |t| t.break_loop());
            t.call_stmt("f", vec![]);
        });
        assert_eq!(
            evaluate(&program, FUEL).result,
            Err(EvalError::NoLoopForBreakNext)
        );
    }

    #[test]
    fn reports_undefined_names() {
        let program = build_program("test", |t| {
            t.call_stmt("print", vec![t.var("missing")]);
        });
        assert_eq!(
            evaluate(&program, FUEL).result,
            Err(EvalError::UndefinedVariable {
                name: "missing".to_string()
            })
        );

        let program = build_program("test", |t| t.call_stmt("nope", vec![]));
        assert_eq!(
            evaluate(&program, FUEL).result,
            Err(EvalError::NotAFunction {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn function_locals_do_not_leak() {
        let program = build_program("test", |t| {
            t.assign("x", t.num(1.0));
            t.function_def("f", &[], |t| {
                t.assign("x", t.num(2.0));
                t.call_stmt("print", vec![t.var("x")]);
            });
            t.call_stmt("f", vec![]);
            t.call_stmt("print", vec![t.var("x")]);
        });
        assert_eq!(evaluate(&program, FUEL).output, vec!["2", "1"]);
    }

    #[test]
    fn and_short_circuits() {
        let program = build_program("test", |t| {
            t.if_stmt(t.and(t.bool(false), t.var("missing")), |t| {
                t.call_stmt("print", vec![t.num(1.0)]);
            });
            t.return_value(t.not(t.num(0.0)));
        });
        let evaluation = evaluate(&program, FUEL);
        assert!(evaluation.output.is_empty());
        assert_eq!(evaluation.result, Ok(Value::Bool(true)));
    }

    #[test]
    fn non_logical_condition_is_an_error() {
        let program = build_program("test", |t| {
            t.if_stmt(t.str("yes"), |_| {});
        });
        assert_eq!(
            evaluate(&program, FUEL).result,
            Err(EvalError::NotALogical {
                value: "\"yes\"".to_string()
            })
        );
    }
}
