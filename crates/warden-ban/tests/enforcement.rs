//! Page guarding and block-screen behaviour

use warden_ban::{Verdict, BLOCK_SCREEN_ID};
use warden_core::DocumentSurface;
use warden_testkit::{init_test_logging, BanHarness};

#[tokio::test]
async fn clean_visitor_keeps_the_page() {
    init_test_logging();
    let harness = BanHarness::new();
    assert_eq!(harness.service.check_ban().await, None);
    assert!(!harness.service.enforce_ban().await);
    assert!(harness.surface.untouched());
    assert_eq!(
        harness.surface.body().as_deref(),
        Some("<main>protected content</main>")
    );
}

#[tokio::test]
async fn enforcing_twice_leaves_one_block_screen() {
    init_test_logging();
    let harness = BanHarness::builder().signed_in("zed").build();
    harness.service.ban_user("zed", "<b>spam</b>").await.unwrap();

    assert!(harness.service.enforce_ban().await);
    let first = harness.surface.body().unwrap();
    assert!(harness.service.enforce_ban().await);
    let second = harness.surface.body().unwrap();

    assert_eq!(first, second);
    assert_eq!(second.matches(BLOCK_SCREEN_ID).count(), 1);
    assert!(second.contains("BANNED: &lt;b&gt;spam&lt;/b&gt;"));
    assert!(!second.contains("protected content"));
    assert_eq!(harness.surface.replacements(), 1);
}

#[tokio::test]
async fn guard_page_reports_the_verdict() {
    let harness = BanHarness::builder().signed_in("yan").build();
    assert_eq!(harness.service.guard_page().await, Verdict::Allowed);

    harness.service.ban_user("yan", "flooding").await.unwrap();
    let verdict = harness.service.guard_page().await;
    assert!(verdict.is_banned());
    assert!(harness.surface.body().unwrap().contains("flooding"));
}

#[tokio::test]
async fn ban_user_never_enforces() {
    let harness = BanHarness::builder().signed_in("moderator").build();
    harness.register("target").await;
    harness.service.ban_user("target", "spam").await.unwrap();
    assert!(harness.surface.untouched());
    assert!(harness.local_payloads().await.iter().all(Option::is_none));
}
