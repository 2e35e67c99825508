mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{followee, FakeApi, FakeThumbnails, TestSink};
use follow_core::{DiffResult, FilterOptions, RunRequest, Stage};
use follow_engine::{
    check_session, run_export, run_with, validate_inputs, EngineEvent, EngineHandle,
    FailureKind, RunConfig, RunProgress, SessionStatus, ThrottlePolicy,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(timestamp: &'static str) -> RunConfig {
    let mut config = RunConfig::new(Arc::new(move || timestamp.to_string()));
    config.client.throttle = ThrottlePolicy::none();
    config
}

fn request(output_dir: &Path) -> RunRequest {
    RunRequest {
        cookies_path: output_dir.join("cookies.txt"),
        output_dir: output_dir.to_path_buf(),
        ..RunRequest::default()
    }
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn account_with(names: &[&str]) -> FakeApi {
    let page = names
        .iter()
        .enumerate()
        .map(|(i, name)| followee(name, Some(&(i + 10).to_string()), false, false))
        .collect();
    FakeApi::logged_in("me")
        .with_user("me", "1")
        .with_pages(vec![page])
}

#[tokio::test]
async fn second_run_reports_added_and_removed() {
    let temp = TempDir::new().unwrap();
    let request = request(temp.path());
    let thumbs = FakeThumbnails::default();

    let sink = TestSink::new();
    let first = run_with(
        &account_with(&["a", "b", "c"]),
        &thumbs,
        &request,
        &config("20250101_090000"),
        &sink,
    )
    .await
    .unwrap();

    assert_eq!(first.account, "me");
    assert_eq!(first.fetched, 3);
    assert_eq!(first.exported, 3);
    assert_eq!(first.diff, None);
    assert_eq!(first.added_path, None);
    assert_eq!(first.removed_path, None);
    assert_eq!(
        first.csv_path,
        temp.path().join("followings_me_20250101_090000.csv")
    );
    assert!(first.json_path.is_file());
    assert!(first.xlsx_path.is_file());
    assert_eq!(first.rich_spreadsheet, cfg!(feature = "rich-xlsx"));
    let plain_notice = "[!] Rich spreadsheet unavailable; wrote a plain workbook.".to_string();
    assert_eq!(
        sink.log_lines().contains(&plain_notice),
        !cfg!(feature = "rich-xlsx")
    );
    let snapshot = first.snapshot_path.clone().unwrap();
    assert_eq!(snapshot, temp.path().join("_last_followings_me.json"));
    let stored: Vec<String> = serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(stored, vec!["a", "b", "c"]);

    let second = run_with(
        &account_with(&["b", "c", "d"]),
        &thumbs,
        &request,
        &config("20250102_090000"),
        &TestSink::new(),
    )
    .await
    .unwrap();

    assert_eq!(
        second.diff,
        Some(DiffResult {
            added: vec!["d".to_string()],
            removed: vec!["a".to_string()],
        })
    );
    let added = second.added_path.clone().unwrap();
    let removed = second.removed_path.clone().unwrap();
    assert_eq!(added, temp.path().join("added_20250102_090000.csv"));
    assert_eq!(removed, temp.path().join("removed_20250102_090000.csv"));
    assert_eq!(lines(&added), vec!["Username", "d"]);
    assert_eq!(lines(&removed), vec!["Username", "a"]);
    // The first run's exports are left alone.
    assert!(first.csv_path.is_file());
}

#[tokio::test]
async fn unchanged_run_writes_no_change_lists() {
    let temp = TempDir::new().unwrap();
    let request = request(temp.path());
    let thumbs = FakeThumbnails::default();
    for timestamp in ["20250101_090000", "20250101_100000"] {
        let report = run_with(
            &account_with(&["a", "b"]),
            &thumbs,
            &request,
            &config(timestamp),
            &TestSink::new(),
        )
        .await
        .unwrap();
        assert_eq!(report.added_path, None);
        assert_eq!(report.removed_path, None);
    }
    let change_lists = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            name.starts_with("added_") || name.starts_with("removed_")
        })
        .count();
    assert_eq!(change_lists, 0);
}

#[tokio::test]
async fn filters_shape_exports_and_snapshot() {
    let temp = TempDir::new().unwrap();
    let mut request = request(temp.path());
    request.filters = FilterOptions {
        verified_only: true,
        private_only: false,
    };
    let api = FakeApi::logged_in("me").with_user("me", "1").with_pages(vec![vec![
        followee("star", Some("2"), true, false),
        followee("plain", Some("3"), false, false),
        followee("hidden_star", Some("4"), true, true),
    ]]);
    let sink = TestSink::new();

    let report = run_with(
        &api,
        &FakeThumbnails::default(),
        &request,
        &config("20250101_090000"),
        &sink,
    )
    .await
    .unwrap();

    assert_eq!(report.fetched, 3);
    assert_eq!(report.exported, 2);
    let stored: Vec<String> = serde_json::from_str(
        &fs::read_to_string(report.snapshot_path.unwrap()).unwrap(),
    )
    .unwrap();
    assert_eq!(stored, vec!["hidden_star", "star"]);
    assert!(sink
        .log_lines()
        .iter()
        .any(|line| line == "[•] Verified-only filter applied → 2"));
}

#[tokio::test]
async fn target_account_is_exported_instead_of_session_user() {
    let temp = TempDir::new().unwrap();
    let mut request = request(temp.path());
    request.target = Some("other".to_string());
    let api = FakeApi::logged_in("me")
        .with_user("other", "77")
        .with_pages(vec![vec![followee("x", Some("5"), false, false)]]);

    let report = run_with(
        &api,
        &FakeThumbnails::default(),
        &request,
        &config("20250101_090000"),
        &TestSink::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.account, "other");
    assert_eq!(
        report.csv_path,
        temp.path().join("followings_other_20250101_090000.csv")
    );
    assert_eq!(
        report.snapshot_path,
        Some(temp.path().join("_last_followings_other.json"))
    );
}

#[tokio::test]
async fn invalid_session_stops_before_any_file_is_written() {
    let temp = TempDir::new().unwrap();
    let api = FakeApi::default().with_user("me", "1");

    let err = run_with(
        &api,
        &FakeThumbnails::default(),
        &request(temp.path()),
        &config("20250101_090000"),
        &TestSink::new(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidSession);
    assert!(api.page_calls().is_empty());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn session_without_username_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut api = FakeApi::default();
    api.session = SessionStatus {
        valid: true,
        username: None,
    };

    let err = run_with(
        &api,
        &FakeThumbnails::default(),
        &request(temp.path()),
        &config("20250101_090000"),
        &TestSink::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidSession);
}

#[tokio::test]
async fn unresolved_user_id_aborts_the_run() {
    let temp = TempDir::new().unwrap();
    let api = FakeApi::logged_in("me");

    let err = run_with(
        &api,
        &FakeThumbnails::default(),
        &request(temp.path()),
        &config("20250101_090000"),
        &TestSink::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::UnresolvedUserId);
}

#[tokio::test]
async fn thumbnails_are_downloaded_only_when_requested() {
    let temp = TempDir::new().unwrap();
    let mut with_pic = followee("a", Some("2"), false, false);
    with_pic.profile_pic_url = Some("https://cdn.example/a.jpg".to_string());
    let mut broken = followee("b", Some("3"), false, false);
    broken.profile_pic_url = Some("https://cdn.example/broken.jpg".to_string());
    let no_pic = followee("c", Some("4"), false, false);
    let api = FakeApi::logged_in("me")
        .with_user("me", "1")
        .with_pages(vec![vec![with_pic, broken, no_pic]]);
    let thumbs = FakeThumbnails {
        bytes: b"not really a png".to_vec(),
        ..FakeThumbnails::default()
    };

    let mut request = request(temp.path());
    run_with(&api, &thumbs, &request, &config("20250101_090000"), &TestSink::new())
        .await
        .unwrap();
    assert!(thumbs.requested.lock().unwrap().is_empty());

    request.embed_thumbnails = true;
    let sink = TestSink::new();
    let report = run_with(&api, &thumbs, &request, &config("20250101_100000"), &sink)
        .await
        .unwrap();
    assert_eq!(thumbs.requested.lock().unwrap().len(), 2);
    assert!(report.xlsx_path.is_file());
    assert!(sink
        .log_lines()
        .iter()
        .any(|line| line == "[+] Thumbnails downloaded: 1/3"));
}

#[tokio::test]
async fn progress_walks_through_the_stages() {
    let temp = TempDir::new().unwrap();
    let sink = TestSink::new();
    run_with(
        &account_with(&["a"]),
        &FakeThumbnails::default(),
        &request(temp.path()),
        &config("20250101_090000"),
        &sink,
    )
    .await
    .unwrap();

    let mut stages: Vec<Stage> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(RunProgress { stage, .. }) => Some(stage),
            _ => None,
        })
        .collect();
    stages.dedup();
    assert_eq!(
        stages,
        vec![
            Stage::CheckingSession,
            Stage::ResolvingUser,
            Stage::FetchingPages,
            Stage::Exporting,
            Stage::Done
        ]
    );
}

#[test]
fn missing_inputs_are_rejected_before_network() {
    let temp = TempDir::new().unwrap();
    let request = request(temp.path());
    let err = validate_inputs(&request).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);

    fs::write(&request.cookies_path, "x").unwrap();
    let missing_out = RunRequest {
        output_dir: temp.path().join("not-there"),
        ..request.clone()
    };
    let err = validate_inputs(&missing_out).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);
    assert!(!missing_out.output_dir.exists());

    assert!(validate_inputs(&request).is_ok());
}

const COOKIES: &str = "127.0.0.1\tFALSE\t/\tFALSE\t0\tsessionid\tabc\n";

async fn mount_account(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/current_user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"username": "me"}})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/web_profile_info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"user": {"id": "1"}}})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/friendships/1/following/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"username": "zoë", "full_name": "Zoë", "is_verified": true, "is_private": false, "pk": 2},
                {"username": "max", "is_private": true, "pk": 3}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn live_client_run_exports_everything() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let temp = TempDir::new().unwrap();
    let request = request(temp.path());
    fs::write(&request.cookies_path, COOKIES).unwrap();
    let mut config = config("20250101_090000");
    config.client.base_url = server.uri();

    let sink = TestSink::new();
    let report = run_export(&request, &config, &sink).await.unwrap();

    assert_eq!(report.account, "me");
    assert_eq!(report.exported, 2);
    let csv = fs::read_to_string(&report.csv_path).unwrap();
    assert!(csv.contains("zoë,https://instagram.com/zoë,Zoë,YES,NO,2"));
    let logs = sink.log_lines();
    assert_eq!(logs.first().map(String::as_str), Some("[•] Initializing session…"));
    assert!(logs.iter().any(|line| line == "[+] Logged in as: @me"));
    assert!(logs.iter().any(|line| line == "[✓] Done. Files:"));
}

#[tokio::test]
async fn session_check_reports_username() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let temp = TempDir::new().unwrap();
    let cookies = temp.path().join("cookies.txt");
    fs::write(&cookies, COOKIES).unwrap();
    let mut config = config("20250101_090000");
    config.client.base_url = server.uri();

    let status = check_session(&cookies, &config.client).await.unwrap();
    assert_eq!(status.username.as_deref(), Some("me"));

    let err = check_session(&temp.path().join("missing.txt"), &config.client)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);
}

#[test]
fn worker_reports_failed_run() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(config("20250101_090000")).unwrap();
    engine.run(request(temp.path()));

    let deadline = Instant::now() + Duration::from_secs(5);
    let result = loop {
        if let Some(EngineEvent::RunCompleted(result)) = engine.try_recv() {
            break result;
        }
        assert!(Instant::now() < deadline, "worker did not finish");
        std::thread::sleep(Duration::from_millis(10));
    };
    assert_eq!(result.unwrap_err().kind, FailureKind::InvalidInput);
}
