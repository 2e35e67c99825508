use std::path::PathBuf;

use crate::RunRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ValidateSession { cookies_path: PathBuf },
    StartRun { request: RunRequest },
}
