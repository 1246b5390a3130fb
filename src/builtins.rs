//! Native functions bound into the root environment under espionage-themed
//! names, plus the handful of predefined constants.

use std::io::{self, Write};
use std::rc::Rc;

use crate::env::Env;
use crate::error::SpylangError;
use crate::position::Span;
use crate::value::{BuiltinValue, Number, Value};

/// Bind every built-in and constant described in §4.5 into `env`, which
/// must be the root environment (builtins are only ever installed once,
/// before the program proper runs).
pub fn install_builtins(env: &Env) {
    env.set("ghost", Value::Null);
    env.set("false", Value::Number(Number::Int(0)));
    env.set("true", Value::Number(Number::Int(1)));
    env.set("math_pi", Value::Number(Number::Float(std::f64::consts::PI)));

    bind(env, "transmit", 1, transmit);
    bind(env, "transmit_ret", 1, transmit_ret);
    bind(env, "intel", 0, intel);
    bind(env, "intel_int", 0, intel_int);
    bind(env, "erase", 0, erase);
    bind(env, "is_code", 1, is_code);
    bind(env, "is_msg", 1, is_msg);
    bind(env, "is_list", 1, is_list);
    bind(env, "is_mission", 1, is_mission);
    bind(env, "add_agent", 2, add_agent);
    bind(env, "withdraw", 2, withdraw);
    bind(env, "expand", 2, expand);
    bind(env, "length", 1, length);
    bind(env, "launch", 1, launch);
}

fn bind(
    env: &Env,
    name: &'static str,
    arity: usize,
    handle: fn(&[Value], &Span, &Env) -> Result<Value, SpylangError>,
) {
    env.set(
        name,
        Value::Builtin(Rc::new(BuiltinValue { name, arity, handle })),
    );
}

fn transmit(args: &[Value], _span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    println!("{}", args[0]);
    Ok(Value::Str(Rc::from("")))
}

fn transmit_ret(args: &[Value], _span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    Ok(Value::Str(Rc::from(args[0].to_string())))
}

fn read_line() -> Result<String, io::Error> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

fn intel(_args: &[Value], span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    let line = read_line().map_err(|e| SpylangError::runtime(span.clone(), format!("failed to read stdin: {e}")))?;
    Ok(Value::Str(Rc::from(line)))
}

fn intel_int(_args: &[Value], span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    let line = read_line().map_err(|e| SpylangError::runtime(span.clone(), format!("failed to read stdin: {e}")))?;
    line.trim()
        .parse::<i64>()
        .map(|v| Value::Number(Number::Int(v)))
        .map_err(|_| SpylangError::runtime(span.clone(), "expected an integer"))
}

fn erase(_args: &[Value], _span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    print!("\x1B[2J\x1B[1;1H");
    io::stdout().flush().ok();
    Ok(Value::Null)
}

fn is_code(args: &[Value], _span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    Ok(bool_value(matches!(args[0], Value::Number(_))))
}

fn is_msg(args: &[Value], _span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    Ok(bool_value(matches!(args[0], Value::Str(_))))
}

fn is_list(args: &[Value], _span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    Ok(bool_value(matches!(args[0], Value::List(_))))
}

fn is_mission(args: &[Value], _span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    Ok(bool_value(matches!(
        args[0],
        Value::Function(_) | Value::Builtin(_)
    )))
}

fn bool_value(b: bool) -> Value {
    Value::Number(Number::Int(if b { 1 } else { 0 }))
}

fn add_agent(args: &[Value], span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    let Value::List(list) = &args[0] else {
        return Err(SpylangError::runtime(span.clone(), "first argument must be a list"));
    };
    list.borrow_mut().push(args[1].clone());
    Ok(Value::Null)
}

fn withdraw(args: &[Value], span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    let Value::List(list) = &args[0] else {
        return Err(SpylangError::runtime(span.clone(), "first argument must be a list"));
    };
    let Value::Number(index) = &args[1] else {
        return Err(SpylangError::runtime(span.clone(), "second argument must be a number"));
    };

    let index = index.as_i64();
    let mut elements = list.borrow_mut();
    if index < 0 || index as usize >= elements.len() {
        return Err(SpylangError::runtime(
            span.clone(),
            "element at this index could not be removed from list because index is out of bounds",
        ));
    }
    Ok(elements.remove(index as usize))
}

fn expand(args: &[Value], span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    let Value::List(a) = &args[0] else {
        return Err(SpylangError::runtime(span.clone(), "first argument must be a list"));
    };
    let Value::List(b) = &args[1] else {
        return Err(SpylangError::runtime(span.clone(), "second argument must be a list"));
    };

    let extension = b.borrow().clone();
    a.borrow_mut().extend(extension);
    Ok(Value::Null)
}

fn length(args: &[Value], span: &Span, _env: &Env) -> Result<Value, SpylangError> {
    let Value::List(list) = &args[0] else {
        return Err(SpylangError::runtime(span.clone(), "argument must be a list"));
    };
    Ok(Value::Number(Number::Int(list.borrow().len() as i64)))
}

fn launch(args: &[Value], span: &Span, env: &Env) -> Result<Value, SpylangError> {
    let Value::Str(path) = &args[0] else {
        return Err(SpylangError::runtime(span.clone(), "argument must be a string"));
    };

    let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        SpylangError::runtime(span.clone(), format!("failed to load script \"{path}\"\n{e}"))
    })?;
    let source = raw.replace("\r\n", "\n");

    crate::run_in(path.as_ref(), source, &env.root()).map_err(|e| {
        SpylangError::runtime(
            span.clone(),
            format!("failed to finish executing script \"{path}\"\n{e}"),
        )
    })?;

    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_constants() {
        let env = Env::new_root();
        install_builtins(&env);
        assert!(matches!(env.get("ghost"), Some(Value::Null)));
        assert!(matches!(env.get("true"), Some(Value::Number(Number::Int(1)))));
        assert!(matches!(env.get("false"), Some(Value::Number(Number::Int(0)))));
        assert!(matches!(env.get("math_pi"), Some(Value::Number(Number::Float(_)))));
    }

    #[test]
    fn add_agent_mutates_list_in_place() {
        let env = Env::new_root();
        install_builtins(&env);
        let list = Value::list(vec![Value::Number(Number::Int(1))]);
        let file: Rc<str> = Rc::from("<test>");
        let src: Rc<str> = Rc::from("");
        let span = Span::point(crate::position::Position::start_of(file, src));

        add_agent(&[list.clone(), Value::Number(Number::Int(2))], &span, &env).unwrap();

        let Value::List(cell) = list else { panic!("expected list") };
        assert_eq!(cell.borrow().len(), 2);
    }

    #[test]
    fn withdraw_out_of_bounds_is_an_error() {
        let env = Env::new_root();
        let file: Rc<str> = Rc::from("<test>");
        let src: Rc<str> = Rc::from("");
        let span = Span::point(crate::position::Position::start_of(file, src));
        let list = Value::list(vec![]);

        let err = withdraw(&[list, Value::Number(Number::Int(0))], &span, &env).unwrap_err();
        assert!(matches!(err, SpylangError::Runtime { .. }));
    }
}
