use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a cookie file.
    CookiesPathChanged(PathBuf),
    /// User picked an output folder.
    OutputDirChanged(PathBuf),
    /// Export another account instead of the logged-in one.
    TargetChanged(Option<String>),
    /// User flipped one of the run options.
    OptionToggled {
        option: crate::RunOption,
        enabled: bool,
    },
    /// User clicked "Validate session".
    ValidateClicked,
    /// User clicked "Run export".
    RunClicked,
    /// Engine finished a session check.
    SessionChecked {
        valid: bool,
        username: Option<String>,
    },
    /// Engine could not perform the session check at all.
    SessionCheckFailed(String),
    /// Human-readable progress line from the engine.
    LogLine(String),
    /// Engine progress counters for the current run.
    RunProgress {
        stage: crate::Stage,
        fetched: usize,
        enriched: usize,
    },
    /// Engine finished the run.
    RunDone(crate::RunOutcome),
    /// Fallback for placeholder wiring.
    NoOp,
}
