//! Everything needed for parsing the CLI arguments for SpyLang.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for SpyLang.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a SpyLang source file to run. Omit to start the interactive
    /// shell instead.
    #[arg(index = 1)]
    pub file: Option<PathBuf>,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of SpyLang.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level where warnings are also logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the interpreter,
    /// e.g. which script is being run.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the interpreter.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, including REPL line-by-line tracing.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
