use std::path::{Path, PathBuf};

use follow_core::Followee;
use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::spreadsheet::{write_spreadsheet, SpreadsheetKind, Thumbnails};

/// Column order shared by every export format.
pub const COLUMNS: [&str; 10] = [
    "Username",
    "Profile Link",
    "Full Name",
    "Verified",
    "Private",
    "User ID",
    "Profile Pic URL",
    "Followers",
    "Followings",
    "Bio",
];

pub(crate) const PROFILE_LINK_COLUMN: usize = 1;
pub(crate) const PROFILE_PIC_COLUMN: usize = 6;

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Row height, in points, of rows carrying an embedded thumbnail.
    pub thumbnail_size: u32,
    pub max_column_width: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            thumbnail_size: 64,
            max_column_width: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub xlsx: PathBuf,
    pub spreadsheet: SpreadsheetKind,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

/// One exported row. Field order and names match [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Profile Link")]
    pub profile_link: String,
    #[serde(rename = "Full Name")]
    pub full_name: Option<String>,
    #[serde(rename = "Verified")]
    pub verified: Option<&'static str>,
    #[serde(rename = "Private")]
    pub private: Option<&'static str>,
    #[serde(rename = "User ID")]
    pub user_id: Option<String>,
    #[serde(rename = "Profile Pic URL")]
    pub profile_pic_url: Option<String>,
    #[serde(rename = "Followers")]
    pub followers: Option<u64>,
    #[serde(rename = "Followings")]
    pub followings: Option<u64>,
    #[serde(rename = "Bio")]
    pub bio: Option<String>,
}

impl From<&Followee> for ExportRow {
    fn from(f: &Followee) -> Self {
        Self {
            username: f.username.clone(),
            profile_link: f.profile_link(),
            full_name: f.full_name.clone(),
            verified: f.verified.export_label(),
            private: f.private.export_label(),
            user_id: f.user_id.clone(),
            profile_pic_url: f.profile_pic_url.clone(),
            followers: f.followers,
            followings: f.followings,
            bio: f.bio.clone(),
        }
    }
}

/// Typed cell value; numbers stay numeric in the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Number(u64),
}

impl Cell {
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl ExportRow {
    /// Cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [Option<Cell>; 10] {
        let text = |v: &Option<String>| v.clone().map(Cell::Text);
        [
            Some(Cell::Text(self.username.clone())),
            Some(Cell::Text(self.profile_link.clone())),
            text(&self.full_name),
            self.verified.map(|v| Cell::Text(v.to_string())),
            self.private.map(|v| Cell::Text(v.to_string())),
            text(&self.user_id),
            text(&self.profile_pic_url),
            self.followers.map(Cell::Number),
            self.followings.map(Cell::Number),
            text(&self.bio),
        ]
    }
}

pub fn to_rows(followees: &[Followee]) -> Vec<ExportRow> {
    followees.iter().map(ExportRow::from).collect()
}

/// CSV bytes: header row then one row per followee; missing values are empty.
pub fn render_csv(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        let record: Vec<String> = row
            .cells()
            .iter()
            .map(|cell| cell.as_ref().map(Cell::render).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

/// Pretty JSON array of row objects. Non-ASCII text stays literal.
pub fn render_json(rows: &[ExportRow]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Writes `<stem>.csv`, `<stem>.json` and `<stem>.xlsx` into `dir`.
///
/// Files are written in that order; a failure leaves earlier files in place.
pub fn export_all(
    dir: &Path,
    stem: &str,
    rows: &[ExportRow],
    thumbnails: &Thumbnails,
    settings: &ExportSettings,
) -> Result<ExportPaths, ExportError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let csv = writer.write(&format!("{stem}.csv"), render_csv(rows)?)?;
    let json = writer.write(&format!("{stem}.json"), render_json(rows)?)?;
    let xlsx = dir.join(format!("{stem}.xlsx"));
    let spreadsheet = write_spreadsheet(&xlsx, rows, thumbnails, settings)?;
    Ok(ExportPaths {
        csv,
        json,
        xlsx,
        spreadsheet,
    })
}

/// Single-column `Username` CSV used for the added/removed change lists.
pub fn export_username_list(
    dir: &Path,
    filename: &str,
    usernames: &[String],
) -> Result<PathBuf, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Username"])?;
    for name in usernames {
        writer.write_record([name])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    Ok(AtomicFileWriter::new(dir.to_path_buf()).write(filename, bytes)?)
}
