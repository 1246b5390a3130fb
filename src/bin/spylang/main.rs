//! # SpyLang
//!
//! This binary is the interpreter for SpyLang. It either runs a single
//! script file in batch mode or, with no arguments, starts an interactive
//! shell.

mod cli;
mod shell;

use std::fs;
use std::process::ExitCode;

use cli::Cli;
use log::{error, info};

fn main() -> ExitCode {
    let args = Cli::init();
    simple_logger::init_with_level(log::Level::from(&args.verbosity)).unwrap();

    let Some(file) = args.file else {
        shell::run_repl();
        return ExitCode::SUCCESS;
    };

    info!("running script {}", file.display());

    let source = match fs::read_to_string(&file) {
        Ok(source) => source.replace("\r\n", "\n"),
        Err(e) => {
            error!("failed to read \"{}\": {e}", file.display());
            return ExitCode::FAILURE;
        }
    };

    let file_name = file.to_string_lossy().into_owned();

    match spylang::run(file_name, source) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}
