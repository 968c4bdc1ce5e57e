//! Signup/login admission and moderator investigation

use warden_ban::{Admission, EvidenceSource};
use warden_core::IndexKey;
use warden_testkit::{phone_signals, BanHarness};

#[tokio::test]
async fn banned_account_cannot_log_in_elsewhere() {
    let harness = BanHarness::new();
    harness.register("kim").await;
    harness.service.ban_user("kim", "impersonation").await.unwrap();

    let phone = BanHarness::builder()
        .store(harness.store.clone())
        .signals(phone_signals())
        .origin("198.51.100.31")
        .build();
    let admission = phone.service.gate().admit_login("kim").await.unwrap();
    assert_eq!(
        admission,
        Admission::Denied {
            reason: "impersonation".into(),
            source: EvidenceSource::Profile,
        }
    );
    for payload in phone.local_payloads().await {
        assert!(payload.unwrap().contains("impersonation"));
    }
}

#[tokio::test]
async fn signup_from_banned_device_is_denied() {
    let harness = BanHarness::new();
    harness.register("lee").await;
    harness.service.ban_user("lee", "spam").await.unwrap();

    let visit = harness.fresh_visit();
    let admission = visit.service.gate().admit_signup("lee_again").await.unwrap();
    assert_eq!(
        admission,
        Admission::Denied {
            reason: "spam".into(),
            source: EvidenceSource::Index(IndexKey::Origin),
        }
    );
    assert!(visit.service.index().profile("lee_again").await.unwrap().is_none());
}

#[tokio::test]
async fn admitted_accounts_are_linked_by_signals() {
    let harness = BanHarness::new();
    assert!(harness.service.gate().admit_signup("max").await.unwrap().is_allowed());
    assert!(harness.service.gate().admit_signup("max_alt").await.unwrap().is_allowed());

    let index = harness.service.index();
    assert_eq!(
        index.accounts_for_fingerprint(&harness.fingerprint()).await.unwrap(),
        vec!["max".to_string(), "max_alt".to_string()]
    );
    assert_eq!(
        index.accounts_for_origin("203.0.113.50").await.unwrap(),
        vec!["max".to_string(), "max_alt".to_string()]
    );
}
