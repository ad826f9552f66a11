//! Storage-state persistence and freshness checks

use mediumscrape::session::SessionState;
use mediumscrape::ScrapeError;
use tempfile::TempDir;

mod common;

use common::{auth_cookie, live_session};

const LOGIN_BLOB: &str = r#"{
  "cookies": [
    {"name": "sid", "value": "1:abc", "domain": ".medium.com", "path": "/",
     "expires": -1, "httpOnly": true, "secure": true, "sameSite": "Lax"},
    {"name": "_ga", "value": "GA1.2", "domain": ".medium.com", "expires": 4102444800}
  ],
  "origins": [
    {"origin": "https://medium.com", "localStorage": [{"name": "theme", "value": "dark"}]}
  ]
}"#;

#[test]
fn test_login_blob_loads_and_session_cookie_counts_as_fresh() {
    let state = SessionState::from_json(LOGIN_BLOB, "blob.json").unwrap();
    assert_eq!(state.cookies().len(), 2);
    assert!(state.cookies()[0].http_only);
    assert_eq!(state.cookies()[1].path, "/");
    state.ensure_fresh().unwrap();
}

#[test]
fn test_save_then_load_keeps_cookies_and_origins() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("session.json");

    let state = SessionState::from_json(LOGIN_BLOB, "blob.json").unwrap();
    state.save(&path).unwrap();

    let reloaded = SessionState::load(&path).unwrap();
    assert_eq!(reloaded.cookies(), state.cookies());
    assert_eq!(reloaded.source(), path.display().to_string());

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"localStorage\""));
    assert!(raw.contains("\"httpOnly\""));
}

#[test]
fn test_missing_file_is_session_missing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.json");

    let err = SessionState::load(&path).unwrap_err();
    match err {
        ScrapeError::SessionMissing { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string());
        }
        other => panic!("expected SessionMissing, got {other:?}"),
    }
}

#[test]
fn test_corrupt_file_is_session_missing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(matches!(
        SessionState::load(&path),
        Err(ScrapeError::SessionMissing { .. })
    ));
}

#[test]
fn test_freshness_requires_a_live_auth_cookie() {
    live_session().ensure_fresh().unwrap();

    let expired = SessionState::new("old.json", vec![auth_cookie(1_000_000.0)]);
    assert!(matches!(
        expired.ensure_fresh(),
        Err(ScrapeError::SessionExpired { .. })
    ));

    let mut tracking_only = auth_cookie(4_102_444_800.0);
    tracking_only.name = "_ga".to_string();
    let anonymous = SessionState::new("anon.json", vec![tracking_only]);
    assert!(matches!(
        anonymous.ensure_fresh(),
        Err(ScrapeError::SessionExpired { .. })
    ));
}
