//! The interactive REPL loop: `SpyLang > ` prompt, one line per evaluation,
//! sharing a single root environment across the whole session.

use std::io::{self, Write};

use log::{error, info};
use spylang::env::Env;
use spylang::value::Value;
use spylang::{builtins, run_in};

const PROMPT: &str = "SpyLang > ";

pub fn run_repl() {
    let env = Env::new_root();
    builtins::install_builtins(&env);

    loop {
        print!("{PROMPT}");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        let bytes_read = match io::stdin().read_line(&mut line) {
            Ok(n) => n,
            Err(e) => {
                error!("failed to read from stdin: {e}");
                break;
            }
        };

        // EOF (Ctrl-D) is this synchronous REPL's stand-in for a user
        // abort signal - there is no line left to evaluate.
        if bytes_read == 0 {
            println!("\nMission aborted by user.");
            break;
        }

        let text = line.trim_end_matches(['\n', '\r']);
        if text.trim().is_empty() {
            continue;
        }

        info!("evaluating REPL line: {text}");

        match run_in("<program>", text.to_owned(), &env) {
            Ok(value) => print_result(value),
            Err(err) => println!("{err}"),
        }
    }
}

fn print_result(value: Value) {
    if let Value::List(elements) = &value {
        for element in elements.borrow().iter() {
            println!("{element}");
        }
        return;
    }

    println!("{value}");
}
