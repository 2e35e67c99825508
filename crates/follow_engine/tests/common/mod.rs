#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use follow_core::{Flag, Followee, ProfileDetails};
use follow_engine::{
    ClientError, EngineEvent, FailureKind, FollowingApi, FollowingPage, ProgressSink,
    SessionStatus, ThumbnailFetcher,
};

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Log(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn followee(username: &str, user_id: Option<&str>, verified: bool, private: bool) -> Followee {
    let mut f = Followee::new(username);
    f.full_name = Some(username.to_uppercase());
    f.verified = Some(verified).into();
    f.private = Some(private).into();
    f.user_id = user_id.map(str::to_string);
    f
}

pub fn plain(username: &str) -> Followee {
    let mut f = Followee::new(username);
    f.verified = Flag::No;
    f.private = Flag::No;
    f
}

/// In-memory API: pages keyed by the cursor that requests them.
#[derive(Default)]
pub struct FakeApi {
    pub session: SessionStatus,
    pub user_ids: HashMap<String, String>,
    pub pages: HashMap<Option<String>, Result<FollowingPage, ClientError>>,
    pub details: HashMap<String, Result<ProfileDetails, ClientError>>,
    pub page_calls: Mutex<Vec<Option<String>>>,
    pub detail_calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn logged_in(username: &str) -> Self {
        Self {
            session: SessionStatus {
                valid: true,
                username: Some(username.to_string()),
            },
            ..Self::default()
        }
    }

    pub fn with_user(mut self, username: &str, user_id: &str) -> Self {
        self.user_ids
            .insert(username.to_string(), user_id.to_string());
        self
    }

    /// Chains `pages` so that page N links to page N+1 through `cursor-N`.
    pub fn with_pages(mut self, pages: Vec<Vec<Followee>>) -> Self {
        let count = pages.len();
        for (index, followees) in pages.into_iter().enumerate() {
            let requested_by = (index > 0).then(|| format!("cursor-{index}"));
            let next_cursor = (index + 1 < count).then(|| format!("cursor-{}", index + 1));
            self.pages.insert(
                requested_by,
                Ok(FollowingPage {
                    followees,
                    next_cursor,
                }),
            );
        }
        self
    }

    pub fn with_details(mut self, user_id: &str, details: Result<ProfileDetails, ClientError>) -> Self {
        self.details.insert(user_id.to_string(), details);
        self
    }

    pub fn page_calls(&self) -> Vec<Option<String>> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

pub fn client_error(kind: FailureKind, message: &str) -> ClientError {
    ClientError {
        kind,
        message: message.to_string(),
    }
}

#[async_trait::async_trait]
impl FollowingApi for FakeApi {
    async fn validate_session(&self) -> SessionStatus {
        self.session.clone()
    }

    async fn resolve_user_id(&self, username: &str) -> Result<String, ClientError> {
        self.user_ids
            .get(username)
            .cloned()
            .ok_or_else(|| client_error(FailureKind::UnresolvedUserId, "unknown user"))
    }

    async fn fetch_page(
        &self,
        _user_id: &str,
        cursor: Option<&str>,
    ) -> Result<FollowingPage, ClientError> {
        let key = cursor.map(str::to_string);
        self.page_calls.lock().unwrap().push(key.clone());
        self.pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(client_error(FailureKind::HttpStatus(404), "no such page")))
    }

    async fn fetch_details(&self, user_id: &str) -> Result<ProfileDetails, ClientError> {
        self.detail_calls.lock().unwrap().push(user_id.to_string());
        self.details
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Err(client_error(FailureKind::HttpStatus(500), "no details")))
    }
}

/// Serves the same bytes for every URL and records what was asked for.
#[derive(Default)]
pub struct FakeThumbnails {
    pub bytes: Vec<u8>,
    pub requested: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ThumbnailFetcher for FakeThumbnails {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        self.requested.lock().unwrap().push(url.to_string());
        if url.contains("broken") {
            return Err(client_error(FailureKind::HttpStatus(404), "missing"));
        }
        Ok(self.bytes.clone())
    }
}
