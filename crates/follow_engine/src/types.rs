use std::fmt;

use follow_core::{RunReport, Stage};

use crate::client::SessionStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProgress {
    pub stage: Stage,
    pub fetched: usize,
    pub enriched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Human-readable progress line for the run log.
    Log(String),
    Progress(RunProgress),
    SessionChecked(Result<SessionStatus, RunError>),
    RunCompleted(Result<RunReport, RunError>),
}

/// Failure raised by a single API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Failure that aborted a whole run, as surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RunError {
    pub kind: FailureKind,
    pub message: String,
}

impl RunError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ClientError> for RunError {
    fn from(err: ClientError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    InvalidCookies,
    InvalidSession,
    UnresolvedUserId,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Export,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidInput => write!(f, "invalid input"),
            FailureKind::InvalidCookies => write!(f, "invalid cookie file"),
            FailureKind::InvalidSession => write!(f, "invalid or expired session"),
            FailureKind::UnresolvedUserId => write!(f, "could not resolve user id"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Export => write!(f, "export failed"),
        }
    }
}
