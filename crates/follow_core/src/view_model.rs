use std::path::PathBuf;

use crate::{Activity, RunReport, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub activity: Activity,
    pub stage: Stage,
    pub fetched: usize,
    pub enriched: usize,
    pub session_user: Option<String>,
    pub status_line: String,
    /// Append-only run log, oldest first.
    pub log: Vec<String>,
    pub report: Option<ReportView>,
    pub can_start: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub account: String,
    pub exported: usize,
    pub files: Vec<(&'static str, PathBuf)>,
    pub added: Option<usize>,
    pub removed: Option<usize>,
    pub rich_spreadsheet: bool,
}

impl From<&RunReport> for ReportView {
    fn from(report: &RunReport) -> Self {
        let mut files = vec![
            ("CSV ", report.csv_path.clone()),
            ("JSON", report.json_path.clone()),
            ("XLSX", report.xlsx_path.clone()),
        ];
        if let Some(path) = &report.added_path {
            files.push(("ADD ", path.clone()));
        }
        if let Some(path) = &report.removed_path {
            files.push(("DEL ", path.clone()));
        }
        Self {
            account: report.account.clone(),
            exported: report.exported,
            files,
            added: report.diff.as_ref().map(|d| d.added.len()),
            removed: report.diff.as_ref().map(|d| d.removed.len()),
            rich_spreadsheet: report.rich_spreadsheet,
        }
    }
}
