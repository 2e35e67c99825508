use std::fs;

use follow_engine::{CookieError, CookieJar};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;

const BROWSER_EXPORT: &str = "# Netscape HTTP Cookie File\n\
# https://curl.se/docs/http-cookies.html\n\
\n\
.instagram.com\tTRUE\t/\tTRUE\t4102444800\tsessionid\t123%3Aabc\n\
.instagram.com\tTRUE\t/\tTRUE\t4102444800\tcsrftoken\tXYZ\n\
#HttpOnly_.instagram.com\tTRUE\t/\tTRUE\t0\thidden\tno\n\
garbage line\n\
.instagram.com\tTRUE\t/\tTRUE\t946684800\tstale\tgone\n\
.instagram.com\tTRUE\t/\tTRUE\t4102444800\tsessionid\t456%3Adef\n";

#[test]
fn loads_browser_export_and_last_duplicate_wins() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cookies.txt");
    fs::write(&path, BROWSER_EXPORT).unwrap();

    let jar = CookieJar::load(&path).unwrap();
    assert_eq!(jar.len(), 3);
    let session = jar.get("sessionid", ".instagram.com", "/").unwrap();
    assert_eq!(session.value, "456%3Adef");
    assert!(session.secure);
    assert_eq!(session.expires, Some(4102444800));
    assert!(jar.get("hidden", ".instagram.com", "/").is_none());
    // Kept in the jar, but never sent once expired.
    assert!(jar.get("stale", ".instagram.com", "/").is_some());

    let url = Url::parse("https://i.instagram.com/api/v1/accounts/current_user/").unwrap();
    assert_eq!(
        jar.header_for(&url).as_deref(),
        Some("csrftoken=XYZ; sessionid=456%3Adef")
    );
}

#[test]
fn space_separated_lines_are_accepted() {
    let jar = CookieJar::parse_netscape(".instagram.com TRUE / TRUE 0 ds_user_id 42\n");
    let cookie = jar.get("ds_user_id", ".instagram.com", "/").unwrap();
    assert_eq!(cookie.value, "42");
    assert_eq!(cookie.expires, None);
}

#[test]
fn file_without_cookies_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cookies.txt");
    fs::write(&path, "# Netscape HTTP Cookie File\n\n").unwrap();

    let err = CookieJar::load(&path).unwrap_err();
    assert!(matches!(err, CookieError::Empty(_)));
}

#[test]
fn unreadable_file_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let err = CookieJar::load(&temp.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, CookieError::Io { .. }));
}
