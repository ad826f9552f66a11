//! Page loading and classification against a scripted driver

use mediumscrape::navigator::{self, PageStatus};
use mediumscrape::session::{BrowsingContext, SessionState};
use mediumscrape::ScrapeError;

mod common;

use common::{FakeDriver, FakePage, STORY_URL, auth_cookie, live_session, story_html, test_config};

#[tokio::test]
async fn test_http_error_skips_readiness_and_snapshot() {
    let driver = FakeDriver::new().page(STORY_URL, FakePage::status(410));
    let context = BrowsingContext::new(driver, live_session());

    let result = navigator::load(&context, STORY_URL, &test_config()).await.unwrap();
    assert_eq!(result.status(), PageStatus::HttpError(410));
    assert!(result.document().is_none());
    assert_eq!(context.driver().html_reads(), 0);
    assert!(context.driver().locates().is_empty());

    let err = result.into_document().err().unwrap();
    assert_eq!(
        err,
        ScrapeError::HttpError {
            url: STORY_URL.to_string(),
            status: 410
        }
    );
}

#[tokio::test]
async fn test_sign_in_redirect_is_reported() {
    let signin = "https://medium.com/m/signin?redirect=https%3A%2F%2Fmedium.com%2Fme";
    let driver = FakeDriver::new().page(
        STORY_URL,
        FakePage::ok("<html><body><h1>Sign in</h1></body></html>").redirected_to(signin),
    );
    let context = BrowsingContext::new(driver, live_session());

    let result = navigator::load(&context, STORY_URL, &test_config()).await.unwrap();
    assert_eq!(result.status(), PageStatus::Redirected);
    assert_eq!(result.final_url(), signin);
    assert!(matches!(
        result.into_document(),
        Err(ScrapeError::SignInRedirect { .. })
    ));
}

#[tokio::test]
async fn test_client_side_redirect_after_load_is_caught() {
    let driver = FakeDriver::new().page(
        STORY_URL,
        FakePage::ok(story_html("Ownership", "")).settles_at("https://medium.com/m/signin"),
    );
    let context = BrowsingContext::new(driver, live_session());

    let result = navigator::load(&context, STORY_URL, &test_config()).await.unwrap();
    assert_eq!(result.status(), PageStatus::Redirected);
    assert_eq!(context.driver().html_reads(), 0);
}

#[tokio::test]
async fn test_quoted_404_inside_article_stays_valid() {
    let html = story_html(
        "Debugging HTTP",
        "<blockquote>404: page not found is what the server said.</blockquote>",
    );
    let driver = FakeDriver::new().page(STORY_URL, FakePage::ok(html));
    let context = BrowsingContext::new(driver, live_session());

    let result = navigator::load(&context, STORY_URL, &test_config()).await.unwrap();
    assert_eq!(result.status(), PageStatus::Valid);
    let document = result.into_document().unwrap();
    assert_eq!(document.final_url(), STORY_URL);
    assert!(document.html().contains("page not found"));
}

#[tokio::test]
async fn test_rendered_error_page_is_not_found() {
    let html = "<html><head><title>Medium</title></head><body><div>PAGE NOT FOUND</div>\
                <p>Out of nothing, something.</p></body></html>";
    let driver = FakeDriver::new().page(STORY_URL, FakePage::ok(html));
    let context = BrowsingContext::new(driver, live_session());

    let result = navigator::load(&context, STORY_URL, &test_config()).await.unwrap();
    assert_eq!(result.status(), PageStatus::NotFound);
    assert!(matches!(
        result.into_document(),
        Err(ScrapeError::PageNotFound { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_readiness_timeout_still_classifies() {
    let driver = FakeDriver::new().page(STORY_URL, FakePage::ok(story_html("Slow", "")).never_ready());
    let context = BrowsingContext::new(driver, live_session());

    let result = navigator::load(&context, STORY_URL, &test_config()).await.unwrap();
    assert_eq!(result.status(), PageStatus::Valid);
    assert!(context.driver().locates().len() > 1);
}

#[tokio::test]
async fn test_missing_session_fails_before_navigation() {
    let driver = FakeDriver::new().page(STORY_URL, FakePage::ok(story_html("Ownership", "")));
    let context = BrowsingContext::new(driver, SessionState::new("missing.json", vec![]));

    let err = navigator::load(&context, STORY_URL, &test_config()).await.err().unwrap();
    assert!(matches!(err, ScrapeError::SessionMissing { .. }));
    assert!(context.driver().navigations().is_empty());
}

#[tokio::test]
async fn test_expired_session_is_rejected_by_establish() {
    let driver = FakeDriver::new();
    let session = SessionState::new("old.json", vec![auth_cookie(1_000_000.0)]);

    let err = BrowsingContext::establish(driver, session).await.err().unwrap();
    assert!(matches!(err, ScrapeError::SessionExpired { .. }));
}

#[tokio::test]
async fn test_establish_installs_session_cookies() {
    let context = BrowsingContext::establish(FakeDriver::new(), live_session())
        .await
        .unwrap();

    let cookies = context.driver().installed_cookies();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "sid");
    assert_eq!(cookies[0].domain, ".medium.com");
    assert_eq!(cookies[0].expires, Some(4_102_444_800.0));
}
