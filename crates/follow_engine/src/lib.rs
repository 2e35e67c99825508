//! Followings exporter engine: cookies, API client, pagination, exports and
//! the background worker.
mod client;
mod collect;
mod cookies;
mod engine;
mod export;
mod fetch;
mod filename;
mod persist;
mod pipeline;
mod snapshot;
mod spreadsheet;
mod types;

pub use client::{
    ClientSettings, FollowingApi, FollowingPage, ReqwestApiClient, SessionStatus, ThrottlePolicy,
};
pub use collect::{
    collect_pages, enrich_all, enrich_one, fetch_following, CollectOptions, EnrichOutcome,
    EnrichSummary,
};
pub use cookies::{Cookie, CookieError, CookieJar, CookieKey};
pub use engine::EngineHandle;
pub use export::{
    export_all, export_username_list, render_csv, render_json, to_rows, Cell, ExportError,
    ExportPaths, ExportRow, ExportSettings, COLUMNS,
};
pub use fetch::{
    ChannelProgressSink, FetchSettings, ProgressSink, ReqwestThumbnailFetcher, ThumbnailFetcher,
};
pub use filename::{export_stem, safe_filename};
pub use persist::{check_output_dir, ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{check_session, run_export, run_with, validate_inputs, RunConfig, TimestampFn};
pub use snapshot::{SnapshotError, SnapshotStore};
pub use spreadsheet::{
    download_thumbnails, write_plain, write_spreadsheet, SpreadsheetKind, Thumbnails,
};
pub use types::{ClientError, EngineEvent, FailureKind, RunError, RunProgress};
