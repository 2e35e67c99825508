#![deny(missing_docs)]
//! Shared logging utilities for the exporter workspace.
//!
//! All crates log through the `engine_*` macros so every record carries the
//! [`TARGET`] target. The application logger keys its filters on it, which
//! keeps HTTP stack chatter (reqwest, hyper, rustls) out of the run log.

/// Log target attached to every record emitted through the `engine_*` macros.
pub const TARGET: &str = "followings";

/// Logs a trace-level message under the exporter target.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the exporter target.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the exporter target.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the exporter target.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the exporter target.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Builds the shared `simplelog` configuration: RFC3339 timestamps and only
/// records under [`TARGET`].
pub fn exporter_config() -> simplelog::Config {
    simplelog::ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(log::LevelFilter::Error)
        .add_filter_allow_str(TARGET)
        .build()
}

/// Initializes a terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have set the global logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        exporter_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
