use std::path::PathBuf;

use crate::view_model::{AppViewModel, ReportView};
use crate::{DiffResult, FilterOptions};

/// Everything the engine needs to perform one export run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunRequest {
    pub cookies_path: PathBuf,
    pub output_dir: PathBuf,
    /// Account to export; the logged-in account when `None`.
    pub target: Option<String>,
    pub filters: FilterOptions,
    pub fetch_details: bool,
    pub embed_thumbnails: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOption {
    VerifiedOnly,
    PrivateOnly,
    FetchDetails,
    EmbedThumbnails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Validating,
    Running,
    Finished,
    Failed,
}

impl Activity {
    pub fn is_busy(self) -> bool {
        matches!(self, Activity::Validating | Activity::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    CheckingSession,
    ResolvingUser,
    FetchingPages,
    Enriching,
    Exporting,
    Done,
}

/// Files and counts produced by a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub account: String,
    pub fetched: usize,
    pub exported: usize,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
    pub xlsx_path: PathBuf,
    pub rich_spreadsheet: bool,
    pub snapshot_path: Option<PathBuf>,
    /// `None` when no previous snapshot existed.
    pub diff: Option<DiffResult>,
    pub added_path: Option<PathBuf>,
    pub removed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success(RunReport),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    form: RunRequest,
    activity: Activity,
    stage: Stage,
    fetched: usize,
    enriched: usize,
    session_user: Option<String>,
    log: Vec<String>,
    report: Option<RunReport>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            activity: self.activity,
            stage: self.stage,
            fetched: self.fetched,
            enriched: self.enriched,
            session_user: self.session_user.clone(),
            status_line: self.log.last().cloned().unwrap_or_else(|| "Ready.".to_string()),
            log: self.log.clone(),
            report: self.report.as_ref().map(ReportView::from),
            can_start: !self.activity.is_busy(),
            dirty: self.dirty,
        }
    }

    pub fn form(&self) -> &RunRequest {
        &self.form
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn form_mut(&mut self) -> &mut RunRequest {
        self.mark_dirty();
        &mut self.form
    }

    pub(crate) fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        self.mark_dirty();
    }

    pub(crate) fn begin(&mut self, activity: Activity) {
        self.activity = activity;
        self.stage = match activity {
            Activity::Validating => Stage::CheckingSession,
            Activity::Running => Stage::CheckingSession,
            _ => Stage::Idle,
        };
        self.fetched = 0;
        self.enriched = 0;
        if activity == Activity::Running {
            self.report = None;
        }
        self.mark_dirty();
    }

    pub(crate) fn apply_session(&mut self, valid: bool, username: Option<String>) {
        self.activity = Activity::Idle;
        self.stage = Stage::Idle;
        self.session_user = if valid { username } else { None };
        self.mark_dirty();
    }

    pub(crate) fn apply_progress(&mut self, stage: Stage, fetched: usize, enriched: usize) {
        if self.activity != Activity::Running {
            return;
        }
        self.stage = stage;
        self.fetched = fetched;
        self.enriched = enriched;
        self.mark_dirty();
    }

    pub(crate) fn finish(&mut self, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Success(report) => {
                self.activity = Activity::Finished;
                self.stage = Stage::Done;
                self.report = Some(report);
            }
            RunOutcome::Failed(_) => {
                self.activity = Activity::Failed;
            }
        }
        self.mark_dirty();
    }
}
