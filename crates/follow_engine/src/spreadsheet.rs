//! Spreadsheet export.
//!
//! The rich writer (hyperlinks, thumbnails, sized columns) only exists with the
//! `rich-xlsx` feature. Whenever it is unavailable or fails, a plain table is
//! written instead, so an `.xlsx` file is always produced.

use std::path::Path;

use engine_logging::{engine_debug, engine_warn};
use rust_xlsxwriter::{ColNum, RowNum, Workbook, XlsxError};

use crate::export::{Cell, ExportError, ExportRow, ExportSettings, COLUMNS};
use crate::fetch::ThumbnailFetcher;

const SHEET_NAME: &str = "Followings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetKind {
    Rich,
    Plain,
}

/// Downloaded profile pictures, indexed like the export rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thumbnails {
    images: Vec<Option<Vec<u8>>>,
}

impl Thumbnails {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_images(images: Vec<Option<Vec<u8>>>) -> Self {
        Self { images }
    }

    pub fn get(&self, row: usize) -> Option<&[u8]> {
        self.images.get(row).and_then(|img| img.as_deref())
    }

    /// Number of rows that have an image.
    pub fn available(&self) -> usize {
        self.images.iter().filter(|img| img.is_some()).count()
    }
}

/// Fetches every row's profile picture in order. A failed download leaves
/// that row without an image.
pub async fn download_thumbnails(fetcher: &dyn ThumbnailFetcher, rows: &[ExportRow]) -> Thumbnails {
    let mut images = Vec::with_capacity(rows.len());
    for row in rows {
        let image = match row.profile_pic_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => match fetcher.fetch(url).await {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    engine_debug!("Thumbnail for @{} unavailable: {}", row.username, err);
                    None
                }
            },
            None => None,
        };
        images.push(image);
    }
    Thumbnails::from_images(images)
}

/// Writes the workbook to `path`, preferring the rich layout.
pub fn write_spreadsheet(
    path: &Path,
    rows: &[ExportRow],
    thumbnails: &Thumbnails,
    settings: &ExportSettings,
) -> Result<SpreadsheetKind, ExportError> {
    #[cfg(feature = "rich-xlsx")]
    {
        match rich::write(path, rows, thumbnails, settings) {
            Ok(()) => return Ok(SpreadsheetKind::Rich),
            Err(err) => {
                engine_warn!("Rich spreadsheet failed ({}); writing a plain table", err);
            }
        }
    }
    #[cfg(not(feature = "rich-xlsx"))]
    {
        let _ = (thumbnails, settings);
        engine_warn!("Rich spreadsheet support not compiled in; writing a plain table");
    }

    write_plain(path, rows)?;
    Ok(SpreadsheetKind::Plain)
}

/// Header plus values, no links, images or sizing.
pub fn write_plain(path: &Path, rows: &[ExportRow]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, header) in COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as ColNum, *header)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let excel_row = (index + 1) as RowNum;
        for (col, cell) in row.cells().iter().enumerate() {
            match cell {
                Some(Cell::Text(text)) => {
                    sheet.write_string(excel_row, col as ColNum, text)?;
                }
                Some(Cell::Number(n)) => {
                    sheet.write_number(excel_row, col as ColNum, *n as f64)?;
                }
                None => {}
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

#[cfg(feature = "rich-xlsx")]
mod rich {
    use std::path::Path;

    use engine_logging::engine_debug;
    use rust_xlsxwriter::{ColNum, Image, RowNum, Url, Workbook, Worksheet, XlsxError};

    use super::{Thumbnails, SHEET_NAME};
    use crate::export::{
        Cell, ExportRow, ExportSettings, COLUMNS, PROFILE_LINK_COLUMN, PROFILE_PIC_COLUMN,
    };

    pub(super) fn write(
        path: &Path,
        rows: &[ExportRow],
        thumbnails: &Thumbnails,
        settings: &ExportSettings,
    ) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        let mut widths: Vec<usize> = COLUMNS
            .iter()
            .map(|h| (h.chars().count() + 2).max(10))
            .collect();
        for (col, header) in COLUMNS.iter().enumerate() {
            sheet.write_string(0, col as ColNum, *header)?;
        }

        for (index, row) in rows.iter().enumerate() {
            let excel_row = (index + 1) as RowNum;
            for (col, cell) in row.cells().iter().enumerate() {
                let Some(cell) = cell else {
                    continue;
                };
                match cell {
                    Cell::Text(text) if col == PROFILE_LINK_COLUMN => {
                        sheet.write_url(excel_row, col as ColNum, Url::new(text.as_str()))?;
                    }
                    Cell::Text(text) => {
                        sheet.write_string(excel_row, col as ColNum, text)?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number(excel_row, col as ColNum, *n as f64)?;
                    }
                }
                let len = cell.render().chars().count() + 2;
                widths[col] = widths[col].max(len).min(settings.max_column_width);
            }
            if let Some(bytes) = thumbnails.get(index) {
                embed_thumbnail(sheet, excel_row, bytes, settings);
            }
        }

        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as ColNum, *width as f64)?;
        }
        workbook.save(path)?;
        Ok(())
    }

    /// Places the picture over the Profile Pic URL cell. Undecodable images
    /// leave the cell as plain text.
    fn embed_thumbnail(sheet: &mut Worksheet, row: RowNum, bytes: &[u8], settings: &ExportSettings) {
        let result = Image::new_from_buffer(bytes).and_then(|image| {
            sheet.set_row_height(row, settings.thumbnail_size)?;
            sheet.insert_image_fit_to_cell(row, PROFILE_PIC_COLUMN as ColNum, &image, true)?;
            Ok(())
        });
        if let Err(err) = result {
            engine_debug!("Thumbnail for sheet row {} not embedded: {}", row, err);
        }
    }
}
