use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use follow_core::{Followee, ProfileDetails};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::cookies::CookieJar;
use crate::{ClientError, FailureKind};

/// Delays inserted between sequential requests. The API's rate tolerance is
/// unknown, so requests are never issued concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub page_delay: Duration,
    pub detail_delay: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(250),
            detail_delay: Duration::from_millis(400),
        }
    }
}

impl ThrottlePolicy {
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            detail_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub user_agent: String,
    pub app_id: String,
    pub throttle: ThrottlePolicy,
    /// Extra attempts for a failed per-user detail lookup.
    pub detail_retries: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "https://i.instagram.com".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            page_size: 200,
            user_agent: "Instagram 219.0.0.12.117 Android".to_string(),
            app_id: "936619743392459".to_string(),
            throttle: ThrottlePolicy::default(),
            detail_retries: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub valid: bool,
    pub username: Option<String>,
}

/// One page of the following list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowingPage {
    pub followees: Vec<Followee>,
    /// Opaque `next_max_id`; `None` on the last page.
    pub next_cursor: Option<String>,
}

#[async_trait::async_trait]
pub trait FollowingApi: Send + Sync {
    /// Checks the cookies against the current-user endpoint. Never fails;
    /// any problem reports an invalid session.
    async fn validate_session(&self) -> SessionStatus;

    async fn resolve_user_id(&self, username: &str) -> Result<String, ClientError>;

    async fn fetch_page(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<FollowingPage, ClientError>;

    async fn fetch_details(&self, user_id: &str) -> Result<ProfileDetails, ClientError>;
}

/// [`FollowingApi`] over the private mobile endpoints.
#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
    jar: CookieJar,
}

impl ReqwestApiClient {
    pub fn new(settings: &ClientSettings, jar: CookieJar) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&settings.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(
            HeaderName::from_static("x-ig-app-id"),
            header_value(&settings.app_id)?,
        );

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: settings.page_size,
            jar,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .map_err(|err| ClientError::new(FailureKind::InvalidInput, err.to_string()))
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, Vec<u8>), ClientError> {
        engine_debug!("GET {}", url.path());
        let mut request = self.client.get(url.clone());
        if let Some(cookie) = self.jar.header_for(&url) {
            request = request.header(COOKIE, cookie);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait::async_trait]
impl FollowingApi for ReqwestApiClient {
    async fn validate_session(&self) -> SessionStatus {
        let url = match self.endpoint("api/v1/accounts/current_user/") {
            Ok(url) => url,
            Err(err) => {
                engine_warn!("Session check skipped: {}", err);
                return SessionStatus::default();
            }
        };
        match self.get(url).await {
            Ok((status, body)) if status == StatusCode::OK => SessionStatus {
                valid: true,
                username: serde_json::from_slice::<CurrentUserResponse>(&body)
                    .ok()
                    .and_then(|r| r.user)
                    .and_then(|u| u.username),
            },
            Ok((status, _)) => {
                engine_debug!("current_user returned {}", status);
                SessionStatus::default()
            }
            Err(err) => {
                engine_warn!("Session check failed: {}", err);
                SessionStatus::default()
            }
        }
    }

    async fn resolve_user_id(&self, username: &str) -> Result<String, ClientError> {
        let mut url = self.endpoint("api/v1/users/web_profile_info/")?;
        url.query_pairs_mut().append_pair("username", username);
        let (status, body) = self.get(url).await?;
        if status != StatusCode::OK {
            return Err(ClientError::new(
                FailureKind::InvalidSession,
                format!(
                    "cookies look invalid or expired (profile lookup returned HTTP {})",
                    status.as_u16()
                ),
            ));
        }
        serde_json::from_slice::<ProfileInfoResponse>(&body)
            .ok()
            .and_then(|r| r.data)
            .and_then(|d| d.user)
            .and_then(|u| u.id.as_ref().and_then(id_string))
            .ok_or_else(|| {
                ClientError::new(
                    FailureKind::UnresolvedUserId,
                    format!(
                        "could not resolve a user id for @{username}; the account may be private or renamed"
                    ),
                )
            })
    }

    async fn fetch_page(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<FollowingPage, ClientError> {
        let mut url = self.endpoint(&format!("api/v1/friendships/{user_id}/following/"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("count", &self.page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("max_id", cursor);
            }
        }
        let (status, body) = self.get(url).await?;
        if status != StatusCode::OK {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("followings fetch failed: HTTP {}", status.as_u16()),
            ));
        }
        let page: FollowingResponse = serde_json::from_slice(&body).map_err(|err| {
            ClientError::new(
                FailureKind::Decode,
                format!("followings page is not valid JSON: {err}"),
            )
        })?;
        Ok(page.into_page())
    }

    async fn fetch_details(&self, user_id: &str) -> Result<ProfileDetails, ClientError> {
        let url = self.endpoint(&format!("api/v1/users/{user_id}/info/"))?;
        let (status, body) = self.get(url).await?;
        if status != StatusCode::OK {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("user info returned HTTP {}", status.as_u16()),
            ));
        }
        let info: UserInfoResponse = serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string()))?;
        let user = info.user.unwrap_or_default();
        Ok(ProfileDetails {
            followers: user.follower_count,
            followings: user.following_count,
            bio: user.biography,
            hd_profile_pic_url: user.hd_profile_pic_url_info.and_then(|p| p.url),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value)
        .map_err(|err| ClientError::new(FailureKind::InvalidInput, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::Decode, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}

/// Ids arrive as JSON strings or numbers; both become text.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A falsy `next_max_id` (missing, `null`, `""`, `0`, `false`) ends paging.
fn cursor_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    user: Option<CurrentUser>,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoResponse {
    data: Option<ProfileInfoData>,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoData {
    user: Option<ProfileInfoUser>,
}

#[derive(Debug, Deserialize)]
struct ProfileInfoUser {
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FollowingResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
    next_max_id: Option<Value>,
}

impl FollowingResponse {
    fn into_page(self) -> FollowingPage {
        let mut followees = Vec::with_capacity(self.users.len());
        for record in self.users {
            match record.into_followee() {
                Some(followee) => followees.push(followee),
                None => engine_warn!("Dropping following entry without a username"),
            }
        }
        FollowingPage {
            followees,
            next_cursor: self.next_max_id.as_ref().and_then(cursor_string),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    username: Option<String>,
    full_name: Option<String>,
    is_verified: Option<bool>,
    is_private: Option<bool>,
    pk: Option<Value>,
    profile_pic_url: Option<String>,
    profile_pic_url_hd: Option<String>,
}

impl UserRecord {
    fn into_followee(self) -> Option<Followee> {
        let username = self.username.filter(|u| !u.is_empty())?;
        let mut followee = Followee::new(username);
        followee.full_name = self.full_name;
        followee.verified = self.is_verified.into();
        followee.private = self.is_private.into();
        followee.user_id = self.pk.as_ref().and_then(id_string);
        followee.profile_pic_url = self
            .profile_pic_url
            .filter(|u| !u.is_empty())
            .or(self.profile_pic_url_hd.filter(|u| !u.is_empty()));
        Some(followee)
    }
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user: Option<UserInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct UserInfo {
    follower_count: Option<u64>,
    following_count: Option<u64>,
    biography: Option<String>,
    hd_profile_pic_url_info: Option<HdPicture>,
}

#[derive(Debug, Deserialize)]
struct HdPicture {
    url: Option<String>,
}
