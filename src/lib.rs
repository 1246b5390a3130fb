//! SpyLang: a small, espionage-themed scripting language.
//!
//! The crate is organized leaves-first, mirroring the pipeline a source
//! text travels through: [`lexer`] -> [`parser`] (into [`ast`]) ->
//! [`interpreter`] (over [`value`] and [`env`]), with [`builtins`] plugging
//! native functions into the root environment and [`error`] unifying every
//! stage's failure type.

pub mod ast;
pub mod builtins;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod value;

use std::rc::Rc;

use env::Env;
use error::SpylangError;
use value::Value;

/// Lex, parse, and evaluate `source` as a complete program named `file`,
/// running in a fresh root environment seeded with the built-ins. This is
/// the single entry point the CLI's batch runner and REPL both call.
pub fn run(file: impl Into<Rc<str>>, source: impl Into<Rc<str>>) -> Result<Value, SpylangError> {
    let env = Env::new_root();
    builtins::install_builtins(&env);
    run_in(file, source, &env)
}

/// Same as [`run`], but evaluates in a caller-supplied environment - used
/// by the `launch` built-in to share the invoking program's root scope.
pub fn run_in(file: impl Into<Rc<str>>, source: impl Into<Rc<str>>, env: &Env) -> Result<Value, SpylangError> {
    let file: Rc<str> = file.into();
    let source: Rc<str> = source.into();

    let tokens = lexer::Lexer::new(file, &source).lex()?;
    let program = parser::parse(tokens)?;
    interpreter::eval_program(&program, env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_arithmetic() {
        let result = run("<test>", "assign x = 1 + 2 * 3\ntransmit(x)").unwrap();
        assert!(matches!(result, Value::Str(_)));
    }

    #[test]
    fn end_to_end_list_length() {
        let result = run(
            "<test>",
            "assign xs = [1, 2, 3]\nadd_agent(xs, 4)\nlength(xs)",
        )
        .unwrap();
        assert!(matches!(result, Value::Number(value::Number::Int(4))));
    }
}
