use std::path::Path;
use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use follow_core::{
    compute_diff, private_only, verified_only, RunReport, RunRequest, Snapshot, Stage,
};

use crate::client::{ClientSettings, FollowingApi, ReqwestApiClient, SessionStatus};
use crate::collect::{fetch_following, CollectOptions};
use crate::cookies::CookieJar;
use crate::export::{export_all, export_username_list, to_rows, ExportError, ExportSettings};
use crate::fetch::{FetchSettings, ProgressSink, ReqwestThumbnailFetcher, ThumbnailFetcher};
use crate::filename::export_stem;
use crate::persist::check_output_dir;
use crate::snapshot::SnapshotStore;
use crate::spreadsheet::{download_thumbnails, SpreadsheetKind, Thumbnails};
use crate::{EngineEvent, FailureKind, RunError, RunProgress};

/// Produces the `YYYYMMDD_HHMMSS` stamp used in output file names.
pub type TimestampFn = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct RunConfig {
    pub client: ClientSettings,
    pub thumbnails: FetchSettings,
    pub export: ExportSettings,
    pub timestamp: TimestampFn,
}

impl RunConfig {
    pub fn new(timestamp: TimestampFn) -> Self {
        Self {
            client: ClientSettings::default(),
            thumbnails: FetchSettings::default(),
            export: ExportSettings::default(),
            timestamp,
        }
    }
}

/// Loads the cookies and asks the API whether they still form a session.
pub async fn check_session(
    cookies_path: &Path,
    settings: &ClientSettings,
) -> Result<SessionStatus, RunError> {
    if !cookies_path.is_file() {
        return Err(missing_cookie_file(cookies_path));
    }
    let jar = load_cookies(cookies_path)?;
    let api = ReqwestApiClient::new(settings, jar)?;
    Ok(api.validate_session().await)
}

/// Runs one complete export against the live API.
pub async fn run_export(
    request: &RunRequest,
    config: &RunConfig,
    sink: &dyn ProgressSink,
) -> Result<RunReport, RunError> {
    validate_inputs(request)?;
    sink.log("[•] Initializing session…".to_string());
    let jar = load_cookies(&request.cookies_path)?;
    let api = ReqwestApiClient::new(&config.client, jar)?;
    let thumbnails = ReqwestThumbnailFetcher::new(config.thumbnails.clone())?;
    run_with(&api, &thumbnails, request, config, sink).await
}

/// The export sequence over any API implementation. Inputs are assumed
/// validated. Every error aborts the remaining steps; files already written
/// stay on disk.
pub async fn run_with(
    api: &dyn FollowingApi,
    thumbnail_fetcher: &dyn ThumbnailFetcher,
    request: &RunRequest,
    config: &RunConfig,
    sink: &dyn ProgressSink,
) -> Result<RunReport, RunError> {
    progress(sink, Stage::CheckingSession, 0, 0);
    sink.log("[•] Validating session and fetching username…".to_string());
    let session = api.validate_session().await;
    if !session.valid {
        return Err(RunError::new(
            FailureKind::InvalidSession,
            "session invalid or expired; export the cookies from the browser again",
        ));
    }
    let Some(me) = session.username else {
        return Err(RunError::new(
            FailureKind::InvalidSession,
            "could not read the username from the session",
        ));
    };
    sink.log(format!("[+] Logged in as: @{me}"));
    let account = request.target.clone().unwrap_or(me);

    progress(sink, Stage::ResolvingUser, 0, 0);
    sink.log(format!("[•] Resolving user id for @{account}…"));
    let user_id = api.resolve_user_id(&account).await?;
    sink.log(format!("[+] User ID: {user_id}"));

    progress(sink, Stage::FetchingPages, 0, 0);
    sink.log("[•] Fetching followings (paging handled)…".to_string());
    let options = CollectOptions {
        fetch_details: request.fetch_details,
        throttle: config.client.throttle.clone(),
        detail_retries: config.client.detail_retries,
    };
    let mut followees = fetch_following(api, &user_id, &options, sink).await?;
    let fetched = followees.len();
    sink.log(format!("[+] Total followings: {fetched}"));

    if request.filters.verified_only {
        followees = verified_only(followees);
        sink.log(format!("[•] Verified-only filter applied → {}", followees.len()));
    }
    if request.filters.private_only {
        followees = private_only(followees);
        sink.log(format!("[•] Private-only filter applied → {}", followees.len()));
    }

    let store = SnapshotStore::for_account(&request.output_dir, &account);
    let previous = store.load();
    let current = Snapshot::from_followees(&followees);
    let diff = compute_diff(previous.as_ref(), &current);
    if let Some(diff) = &diff {
        sink.log(format!(
            "[•] Change tracking: +{} added, -{} removed",
            diff.added.len(),
            diff.removed.len()
        ));
    }

    progress(sink, Stage::Exporting, fetched, 0);
    let rows = to_rows(&followees);
    let thumbnails = if request.embed_thumbnails {
        sink.log("[•] Downloading profile thumbnails…".to_string());
        let thumbnails = download_thumbnails(thumbnail_fetcher, &rows).await;
        sink.log(format!(
            "[+] Thumbnails downloaded: {}/{}",
            thumbnails.available(),
            rows.len()
        ));
        thumbnails
    } else {
        Thumbnails::none()
    };

    sink.log("[•] Exporting CSV/JSON/Excel…".to_string());
    let timestamp = (config.timestamp)();
    let stem = export_stem(&format!("followings_{account}"), &timestamp);
    let paths = export_all(
        &request.output_dir,
        &stem,
        &rows,
        &thumbnails,
        &config.export,
    )
    .map_err(export_failure)?;
    if paths.spreadsheet == SpreadsheetKind::Plain {
        sink.log("[!] Rich spreadsheet unavailable; wrote a plain workbook.".to_string());
    }

    let snapshot_path = match store.save(&current) {
        Ok(path) => Some(path),
        Err(err) => {
            engine_warn!("Snapshot not saved to {:?}: {}", store.path(), err);
            sink.log(format!("[!] Could not save snapshot: {err}"));
            None
        }
    };

    let mut added_path = None;
    let mut removed_path = None;
    if let Some(diff) = &diff {
        if !diff.added.is_empty() {
            let name = format!("added_{timestamp}.csv");
            added_path = Some(
                export_username_list(&request.output_dir, &name, &diff.added)
                    .map_err(export_failure)?,
            );
        }
        if !diff.removed.is_empty() {
            let name = format!("removed_{timestamp}.csv");
            removed_path = Some(
                export_username_list(&request.output_dir, &name, &diff.removed)
                    .map_err(export_failure)?,
            );
        }
    }

    sink.log("[✓] Done. Files:".to_string());
    sink.log(format!("    CSV : {}", paths.csv.display()));
    sink.log(format!("    JSON: {}", paths.json.display()));
    sink.log(format!("    XLSX: {}", paths.xlsx.display()));
    if added_path.is_some() || removed_path.is_some() {
        sink.log("    (Change tracking CSVs were saved in the output folder.)".to_string());
    }
    progress(sink, Stage::Done, fetched, 0);
    engine_info!(
        "Run for @{} finished: {} fetched, {} exported",
        account,
        fetched,
        rows.len()
    );

    Ok(RunReport {
        account,
        fetched,
        exported: rows.len(),
        csv_path: paths.csv,
        json_path: paths.json,
        xlsx_path: paths.xlsx,
        rich_spreadsheet: paths.spreadsheet == SpreadsheetKind::Rich,
        snapshot_path,
        diff,
        added_path,
        removed_path,
    })
}

/// Rejects missing paths before any network activity.
pub fn validate_inputs(request: &RunRequest) -> Result<(), RunError> {
    if !request.cookies_path.is_file() {
        return Err(missing_cookie_file(&request.cookies_path));
    }
    check_output_dir(&request.output_dir).map_err(|err| {
        RunError::new(
            FailureKind::InvalidInput,
            format!(
                "output folder {} is not usable: {err}",
                request.output_dir.display()
            ),
        )
    })
}

fn missing_cookie_file(path: &Path) -> RunError {
    RunError::new(
        FailureKind::InvalidInput,
        format!("cookie file not found: {}", path.display()),
    )
}

fn load_cookies(path: &Path) -> Result<CookieJar, RunError> {
    CookieJar::load(path).map_err(|err| RunError::new(FailureKind::InvalidCookies, err.to_string()))
}

fn export_failure(err: ExportError) -> RunError {
    RunError::new(FailureKind::Export, err.to_string())
}

fn progress(sink: &dyn ProgressSink, stage: Stage, fetched: usize, enriched: usize) {
    sink.emit(EngineEvent::Progress(RunProgress {
        stage,
        fetched,
        enriched,
    }));
}
