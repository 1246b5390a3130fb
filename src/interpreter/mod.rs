//! Tree-walking evaluator: a single dispatch over `Expr`/`Stmt` that threads
//! an `Env` through every node and returns a `Signal`.

use std::rc::Rc;

use crate::ast::{BinOpKind, Expr, Stmt, Stmts, UnaryOpKind};
use crate::env::Env;
use crate::error::{SpylangError, TraceFrame};
use crate::value::{FunctionValue, Number, Value};

/// The outcome of evaluating one node: an ordinary value, or one of the
/// three unwind signals. Kept as a distinct enum (per the design note) so
/// control flow never piggybacks on `Result`'s error channel.
#[derive(Debug, Clone)]
pub enum Signal {
    Value(Value),
    Return(Value),
    Break,
    Continue,
}

pub type EvalResult = Result<Signal, SpylangError>;

/// Evaluate a full program in `env`, which must already hold the built-ins.
/// A `break`/`continue`/`return` that escapes every enclosing construct is a
/// runtime error (the grammar only ever nests them inside a loop or
/// function body, so this only fires on programs the parser shouldn't have
/// accepted - defensive, per §7's leakage clause).
pub fn eval_program(stmts: &Stmts, env: &Env) -> Result<Value, SpylangError> {
    match eval_stmts(stmts, env)? {
        Signal::Value(v) => Ok(v),
        Signal::Return(_) => Err(SpylangError::runtime(
            stmts_span(stmts),
            "'extract' used outside of a mission",
        )),
        Signal::Break => Err(SpylangError::runtime(
            stmts_span(stmts),
            "'abort' used outside of a loop",
        )),
        Signal::Continue => Err(SpylangError::runtime(
            stmts_span(stmts),
            "'proceed' used outside of a loop",
        )),
    }
}

fn stmts_span(stmts: &Stmts) -> crate::position::Span {
    stmts
        .statements
        .last()
        .map(|s| s.span().clone())
        .or_else(|| stmts.statements.first().map(|s| s.span().clone()))
        .expect("empty program cannot raise a signal")
}

/// Evaluate a block: statements run in order, the last one's value becomes
/// the block's value, and any non-`Value` signal short-circuits the rest.
pub fn eval_stmts(stmts: &Stmts, env: &Env) -> EvalResult {
    let mut last = Signal::Value(Value::Null);
    for stmt in &stmts.statements {
        last = eval_stmt(stmt, env)?;
        if !matches!(last, Signal::Value(_)) {
            return Ok(last);
        }
    }
    Ok(last)
}

fn eval_stmt(stmt: &Stmt, env: &Env) -> EvalResult {
    match stmt {
        Stmt::Return { value, .. } => {
            let result = match value {
                Some(expr) => eval_value(expr, env)?,
                None => Value::Null,
            };
            Ok(Signal::Return(result))
        }
        Stmt::Continue { .. } => Ok(Signal::Continue),
        Stmt::Break { .. } => Ok(Signal::Break),
        Stmt::Expr(expr) => eval_expr(expr, env),
    }
}

/// Evaluate `expr` expecting a plain value; a loop/return signal escaping
/// here (e.g. `abort` inside a `check` used as an operand, outside any
/// loop) is a runtime error rather than undefined behavior.
fn eval_value(expr: &Expr, env: &Env) -> Result<Value, SpylangError> {
    match eval_expr(expr, env)? {
        Signal::Value(v) => Ok(v),
        Signal::Return(_) => Err(SpylangError::runtime(
            expr.span().clone(),
            "'extract' used outside of a mission",
        )),
        Signal::Break => Err(SpylangError::runtime(
            expr.span().clone(),
            "'abort' used outside of a loop",
        )),
        Signal::Continue => Err(SpylangError::runtime(
            expr.span().clone(),
            "'proceed' used outside of a loop",
        )),
    }
}

pub fn eval_expr(expr: &Expr, env: &Env) -> EvalResult {
    match expr {
        Expr::Number { value, .. } => Ok(Signal::Value(Value::Number(match value {
            crate::ast::NumberLit::Int(v) => Number::Int(*v),
            crate::ast::NumberLit::Float(v) => Number::Float(*v),
        }))),

        Expr::Str { value, .. } => Ok(Signal::Value(Value::Str(Rc::from(value.as_str())))),

        Expr::List { elements, .. } => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                match eval_expr(element, env)? {
                    Signal::Value(v) => values.push(v),
                    other => return Ok(other),
                }
            }
            Ok(Signal::Value(Value::list(values)))
        }

        Expr::Range { start, end, span } => {
            let start_value = eval_value(start, env)?;
            let end_value = eval_value(end, env)?;
            let (Value::Number(start_number), Value::Number(end_number)) = (&start_value, &end_value) else {
                return Err(SpylangError::runtime(
                    span.clone(),
                    "range bounds must be numbers",
                ));
            };
            Ok(Signal::Value(Value::Range(
                start_number.as_i64(),
                end_number.as_i64(),
            )))
        }

        Expr::VarAccess { name, span } => match env.get(name) {
            Some(value) => Ok(Signal::Value(value)),
            None => Err(SpylangError::runtime(
                span.clone(),
                format!("'{name}' is not defined"),
            )),
        },

        Expr::VarAssign { name, value, .. } => {
            let value = eval_value(value, env)?;
            env.set(name, value.clone());
            Ok(Signal::Value(value))
        }

        Expr::BinOp { left, op, right, span } => {
            let left_value = eval_value(left, env)?;
            let right_value = eval_value(right, env)?;
            let result = left_value.binary_op(*op, &right_value, span, right.span())?;
            Ok(Signal::Value(result))
        }

        Expr::UnaryOp { op, operand, span } => {
            let value = eval_value(operand, env)?;
            Ok(Signal::Value(value.unary_op(*op, span)?))
        }

        Expr::If { cases, else_body, .. } => {
            for case in cases {
                if eval_value(&case.condition, env)?.is_truthy() {
                    return Ok(discard_block_value(eval_stmts(&case.body, env)?));
                }
            }
            match else_body {
                Some(body) => Ok(discard_block_value(eval_stmts(body, env)?)),
                None => Ok(Signal::Value(Value::Null)),
            }
        }

        Expr::For { var_name, iterable, body, span } => {
            let iterable_value = eval_value(iterable, env)?;
            let items = iterable_elements(&iterable_value, span)?;

            for item in items {
                env.set(var_name, item);
                match eval_stmts(body, env)? {
                    Signal::Value(_) | Signal::Continue => continue,
                    Signal::Break => break,
                    signal @ Signal::Return(_) => return Ok(signal),
                }
            }
            Ok(Signal::Value(Value::Null))
        }

        Expr::While { condition, body, .. } => {
            while eval_value(condition, env)?.is_truthy() {
                match eval_stmts(body, env)? {
                    Signal::Value(_) | Signal::Continue => continue,
                    Signal::Break => break,
                    signal @ Signal::Return(_) => return Ok(signal),
                }
            }
            Ok(Signal::Value(Value::Null))
        }

        Expr::FuncDef { name, arg_names, body, auto_return, .. } => {
            let function = Value::Function(Rc::new(FunctionValue {
                name: name.clone(),
                arg_names: Rc::new(arg_names.clone()),
                body: body.clone(),
                captured_env: env.clone(),
                auto_return: *auto_return,
            }));

            if let Some(name) = name {
                env.set(name, function.clone());
            }

            Ok(Signal::Value(function))
        }

        Expr::Call { callee, args, span } => eval_call(callee, args, span, env),
    }
}

fn discard_block_value(signal: Signal) -> Signal {
    match signal {
        Signal::Value(_) => Signal::Value(Value::Null),
        other => other,
    }
}

fn iterable_elements(value: &Value, span: &crate::position::Span) -> Result<Vec<Value>, SpylangError> {
    match value {
        Value::Range(start, end) => Ok((*start..=*end).map(|n| Value::Number(Number::Int(n))).collect()),
        Value::List(elements) => Ok(elements.borrow().clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(Rc::from(c.to_string()))).collect()),
        other => Err(SpylangError::runtime(
            span.clone(),
            format!("{} is not iterable", other.type_name()),
        )),
    }
}

fn eval_call(callee: &Expr, args: &[Expr], span: &crate::position::Span, env: &Env) -> EvalResult {
    let callee_value = eval_value(callee, env)?;

    let mut arg_values = Vec::with_capacity(args.len());
    for arg in args {
        match eval_expr(arg, env)? {
            Signal::Value(v) => arg_values.push(v),
            other => return Ok(other),
        }
    }

    match callee_value {
        Value::Builtin(builtin) => {
            if arg_values.len() != builtin.arity {
                return Err(SpylangError::runtime(
                    span.clone(),
                    if arg_values.len() > builtin.arity {
                        format!("too many args passed into '{}'", builtin.name)
                    } else {
                        format!("too few args passed into '{}'", builtin.name)
                    },
                ));
            }
            let result = (builtin.handle)(&arg_values, span, env).map_err(|e| {
                e.with_frame(TraceFrame {
                    display_name: format!("<built-in mission {}>", builtin.name),
                    call_site: span.clone(),
                })
            })?;
            Ok(Signal::Value(result))
        }

        Value::Function(function) => {
            if arg_values.len() > function.arg_names.len() {
                return Err(SpylangError::runtime(
                    span.clone(),
                    format!(
                        "too many args passed into '{}'",
                        function.name.as_deref().unwrap_or("<anonymous mission>")
                    ),
                ));
            }
            if arg_values.len() < function.arg_names.len() {
                return Err(SpylangError::runtime(
                    span.clone(),
                    format!(
                        "too few args passed into '{}'",
                        function.name.as_deref().unwrap_or("<anonymous mission>")
                    ),
                ));
            }

            let call_env = Env::child_of(&function.captured_env);
            for (name, value) in function.arg_names.iter().zip(arg_values) {
                call_env.set(name, value);
            }

            let display_name = function
                .name
                .clone()
                .unwrap_or_else(|| "<anonymous mission>".to_owned());

            let body_signal = eval_stmts(&function.body, &call_env).map_err(|e| {
                e.with_frame(TraceFrame {
                    display_name: display_name.clone(),
                    call_site: span.clone(),
                })
            })?;

            let result = match body_signal {
                Signal::Return(v) => v,
                Signal::Value(v) => {
                    if function.auto_return {
                        v
                    } else {
                        Value::Null
                    }
                }
                Signal::Break => {
                    return Err(SpylangError::runtime(
                        span.clone(),
                        format!("'abort' used outside of a loop in '{display_name}'"),
                    ))
                }
                Signal::Continue => {
                    return Err(SpylangError::runtime(
                        span.clone(),
                        format!("'proceed' used outside of a loop in '{display_name}'"),
                    ))
                }
            };

            Ok(Signal::Value(result))
        }

        other => Err(SpylangError::runtime(
            span.clone(),
            format!("{} is not callable", other.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::install_builtins;
    use crate::lexer::Lexer;
    use crate::parser::parse;
    use std::rc::Rc;

    fn run(src: &str) -> Result<Value, SpylangError> {
        let file: Rc<str> = Rc::from("<test>");
        let source: Rc<str> = Rc::from(src);
        let tokens = Lexer::new(file, &source).lex()?;
        let program = parse(tokens)?;
        let env = Env::new_root();
        install_builtins(&env);
        eval_program(&program, &env)
    }

    #[test]
    fn arithmetic_precedence() {
        let result = run("1 + 2 * 3").unwrap();
        assert!(matches!(result, Value::Number(Number::Int(7))));
    }

    #[test]
    fn factorial_via_recursion() {
        let result = run(
            "mission fact(n) {\n  check n <= 1 { extract 1 }\n  extract n * fact(n - 1)\n}\nfact(5)",
        )
        .unwrap();
        assert!(matches!(result, Value::Number(Number::Int(120))));
    }

    // `inc` reads `n` through its captured frame (the read side of closure
    // capture), but `n = n + 1` writes into the fresh per-call frame each
    // invocation gets, never back into `make_counter`'s frame - there is no
    // construct for writing through to an outer scope (§9), so every call
    // observes the same `n = 0` and returns `1`, not a running count.
    #[test]
    fn closure_captures_outer_locals() {
        let result = run(
            "mission make_counter() {\n  assign n = 0\n  mission inc() {\n    n = n + 1\n    extract n\n  }\n  extract inc\n}\nassign counter = make_counter()\ncounter()\ncounter()\ncounter()",
        )
        .unwrap();
        assert!(matches!(result, Value::Number(Number::Int(1))));
    }

    #[test]
    fn function_scope_does_not_leak_to_caller() {
        let result = run("assign x = 1\nmission f() {\n  x = 2\n  extract ghost\n}\nf()\nx").unwrap();
        assert!(matches!(result, Value::Number(Number::Int(1))));
    }

    #[test]
    fn break_only_exits_innermost_loop() {
        let result = run(
            "assign total = 0\neach i in 1..3 {\n  each j in 1..3 {\n    check j == 2 { abort }\n    total = total + 1\n  }\n}\ntotal",
        )
        .unwrap();
        assert!(matches!(result, Value::Number(Number::Int(3))));
    }

    #[test]
    fn continue_skips_rest_of_iteration() {
        let result = run(
            "assign total = 0\neach i in 1..5 {\n  check i == 3 { proceed }\n  total = total + i\n}\ntotal",
        )
        .unwrap();
        assert!(matches!(result, Value::Number(Number::Int(12))));
    }

    #[test]
    fn division_by_zero_reports_divisor_span() {
        let err = run("10 / 0").unwrap_err();
        match err {
            SpylangError::Runtime { detail, span, .. } => {
                assert!(detail.contains("Division by zero"));
                assert_eq!(span.start.column, 6);
            }
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }

    #[test]
    fn range_is_ascending_inclusive() {
        let result = run("assign xs = []\neach i in 1..3 { add_agent(xs, i) }\nlength(xs)").unwrap();
        assert!(matches!(result, Value::Number(Number::Int(3))));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        assert!(run("unknown_name").is_err());
    }

    #[test]
    fn scope_isolation_across_calls() {
        let result = run(
            "mission adder(n) {\n  assign acc = 0\n  acc = acc + n\n  extract acc\n}\nadder(10)\nadder(5)",
        )
        .unwrap();
        assert!(matches!(result, Value::Number(Number::Int(5))));
    }
}
