use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use engine_logging::engine_debug;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("cannot read cookie file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cookie file {0} contains no cookies")]
    Empty(String),
}

/// One line of a Netscape `cookies.txt` export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub expires: Option<i64>,
    pub name: String,
    pub value: String,
}

impl Cookie {
    fn matches(&self, url: &Url, now: i64) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if self.secure && url.scheme() != "https" {
            return false;
        }
        if self.expires.is_some_and(|expires| expires <= now) {
            return false;
        }
        let host = host.to_ascii_lowercase();
        let domain = self.domain.trim_start_matches('.').to_ascii_lowercase();
        let host_ok = host == domain
            || (self.include_subdomains && host.ends_with(&format!(".{domain}")));
        host_ok && path_matches(&self.path, url.path())
    }
}

/// A cookie path covers the request path when it is equal to it or is a
/// prefix ending at a `/` boundary.
fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => rest.is_empty() || cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CookieKey {
    pub name: String,
    pub domain: String,
    pub path: String,
}

/// Credential set parsed from a browser cookie export. Keyed by
/// name + domain + path; a later line with the same key replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: BTreeMap<CookieKey, Cookie>,
}

impl CookieJar {
    /// Reads and parses a cookie file. An unreadable file or one without a
    /// single usable line is an error.
    pub fn load(path: &Path) -> Result<Self, CookieError> {
        let content = fs::read_to_string(path).map_err(|source| CookieError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let jar = Self::parse_netscape(&content);
        if jar.is_empty() {
            return Err(CookieError::Empty(path.display().to_string()));
        }
        engine_debug!("Loaded {} cookies from {:?}", jar.len(), path);
        Ok(jar)
    }

    /// Parses Netscape cookie file content. Blank and `#` lines are ignored;
    /// fields are tab separated, with a whitespace fallback for exporters that
    /// use spaces. The last seven fields of a line are used.
    pub fn parse_netscape(content: &str) -> Self {
        let mut jar = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 7 {
                parts = line.split_whitespace().collect();
            }
            if parts.len() < 7 {
                engine_debug!("Skipping cookie line with {} fields", parts.len());
                continue;
            }
            let fields = &parts[parts.len() - 7..];
            jar.insert(Cookie {
                domain: fields[0].to_string(),
                include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
                path: fields[2].to_string(),
                secure: fields[3].eq_ignore_ascii_case("TRUE"),
                expires: fields[4].parse::<i64>().ok().filter(|e| *e > 0),
                name: fields[5].to_string(),
                value: fields[6].to_string(),
            });
        }
        jar
    }

    pub fn insert(&mut self, cookie: Cookie) {
        let key = CookieKey {
            name: cookie.name.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
        };
        self.cookies.insert(key, cookie);
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn get(&self, name: &str, domain: &str, path: &str) -> Option<&Cookie> {
        self.cookies.get(&CookieKey {
            name: name.to_string(),
            domain: domain.to_string(),
            path: path.to_string(),
        })
    }

    /// `Cookie` header value for a request to `url`, or `None` when no cookie
    /// applies. Expired cookies are left out.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        self.header_at(url, unix_now())
    }

    fn header_at(&self, url: &Url, now: i64) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .values()
            .filter(|c| c.matches(url, now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}
