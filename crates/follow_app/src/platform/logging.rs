//! Diagnostic logging for the exporter binary.
//!
//! File output goes to `./exporter.log` in the current working directory. The
//! terminal logger writes to stderr so it never mixes with the run log on
//! stdout.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, SharedLogger, TermLogger, TerminalMode, WriteLogger};

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to ./exporter.log in current directory.
    File,
    /// Write to the terminal (stderr).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the logger with the specified destination.
pub fn initialize(destination: LogDestination, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![terminal_logger(level)],
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![terminal_logger(level)];
            if let Some(file_logger) = create_file_logger(level) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn terminal_logger(level: LevelFilter) -> Box<TermLogger> {
    TermLogger::new(
        level,
        engine_logging::exporter_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

fn create_file_logger(level: LevelFilter) -> Option<Box<WriteLogger<File>>> {
    let log_path = PathBuf::from("./exporter.log");
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, engine_logging::exporter_config(), file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
