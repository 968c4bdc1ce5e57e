//! End-to-end ban reconciliation over the test harness

use assert_matches::assert_matches;
use std::sync::Arc;
use warden_ban::{BanService, CheckPhase, EvidenceSource, Fault, Verdict};
use warden_core::{
    decode_flag, encode_flag, ChannelKind, EnvironmentProbe, IndexKey, LocalBanFlag,
    PhysicalClock, RemoteDatabase, StorageChannel,
};
use warden_testkit::{
    init_test_logging, phone_signals, BanHarness, FaultyChannel, FixedEnvironment, MemoryChannel,
    MemoryDatabase, RecordingSurface, SimulatedClock, StaticOrigin, StaticSession,
};

#[tokio::test]
async fn every_channel_round_trips_independently() {
    init_test_logging();
    for kind in ChannelKind::PRECEDENCE {
        let harness = BanHarness::new();
        let channel = &harness.channels[kind.rank()];
        let flag = LocalBanFlag::new("spam", harness.clock.now());

        channel.write(&encode_flag(&flag)).await.unwrap();
        let raw = channel.read().await.unwrap().unwrap();
        let back = decode_flag(&raw, "Access Denied", harness.clock.now())
            .unwrap()
            .unwrap();
        assert_eq!(back, flag);

        for other in harness.channels.iter().filter(|c| c.kind() != kind) {
            assert_eq!(other.peek().await, None);
        }
    }
}

#[tokio::test]
async fn one_cached_flag_bans_without_network() {
    init_test_logging();
    for kind in ChannelKind::PRECEDENCE {
        let harness = BanHarness::builder().signed_in("mallory").build();
        for (i, channel) in harness.channels.iter().enumerate() {
            if i != kind.rank() {
                channel.set_available(false);
            }
        }
        harness.channels[kind.rank()]
            .seed(r#"{"banned":true,"reason":"cached","timestamp":"2024-01-01T00:00:00.000Z"}"#)
            .await;

        let report = harness.service.check().await;
        assert_eq!(report.source, Some(EvidenceSource::Local(kind)));
        assert_matches!(report.verdict, Verdict::Banned(ref r) if r.reason == "cached");
        assert_eq!(harness.database.total_calls(), 0);
        assert_eq!(harness.origin.calls(), 0);
    }
}

#[tokio::test]
async fn fingerprint_heals_after_wipe_and_sign_out() {
    init_test_logging();
    let harness = BanHarness::builder().signed_in("alice").build();
    harness.register("alice").await;
    harness.service.ban_user("alice", "spam").await.unwrap();

    harness.wipe_local().await;
    harness.session.sign_out();
    let visit = BanHarness::builder()
        .store(harness.store.clone())
        .signals(harness.environment.signals())
        .origin("198.51.100.200")
        .build();

    let report = visit.service.check().await;
    assert_eq!(report.source, Some(EvidenceSource::Index(IndexKey::Fingerprint)));
    let record = report.verdict.into_record().unwrap();
    assert_eq!(record.reason, "spam");
    assert_eq!(record.username.as_deref(), Some("alice"));

    for payload in visit.local_payloads().await {
        assert!(payload.unwrap().contains("spam"));
    }

    visit.database.reset();
    assert!(visit.service.check_ban().await.is_some());
    assert_eq!(visit.database.total_calls(), 0);
}

#[tokio::test]
async fn evasion_under_new_username_is_caught() {
    init_test_logging();
    let harness = BanHarness::new();
    harness.register("bob").await;
    harness.service.ban_user("bob", "ban evasion").await.unwrap();

    let visit = harness.fresh_visit();
    visit.session.sign_in("bob2");
    let record = visit.service.check_ban().await.unwrap();
    assert_eq!(record.reason, "ban evasion");
    for payload in visit.local_payloads().await {
        assert!(payload.unwrap().contains("ban evasion"));
    }
}

#[tokio::test]
async fn profile_flag_alone_bans_the_signed_in_account() {
    init_test_logging();
    let harness = BanHarness::builder().signed_in("alice").build();
    harness
        .store
        .set(
            "users/alice",
            &serde_json::json!({ "banned": true, "banReason": "legacy" }),
        )
        .await
        .unwrap();

    let report = harness.service.check().await;
    assert_eq!(report.source, Some(EvidenceSource::Profile));
    assert_eq!(report.verdict.into_record().unwrap().reason, "legacy");
    for payload in harness.local_payloads().await {
        assert!(payload.unwrap().contains("legacy"));
    }

    harness.session.sign_out();
    harness.database.reset();
    assert_eq!(harness.service.check_ban().await.unwrap().reason, "legacy");
    assert_eq!(harness.database.total_calls(), 0);
}

#[tokio::test]
async fn investigation_lists_accounts_by_their_real_names() {
    let harness = BanHarness::new();
    harness.register("j.doe").await;
    harness.register("kay").await;

    assert_eq!(
        harness.service.index().accounts_for_origin("203.0.113.50").await.unwrap(),
        vec!["j.doe".to_string(), "kay".to_string()]
    );
    assert_eq!(
        harness
            .service
            .index()
            .accounts_for_fingerprint(&harness.fingerprint())
            .await
            .unwrap(),
        vec!["j.doe".to_string(), "kay".to_string()]
    );
}

#[tokio::test]
async fn different_device_same_origin_is_caught_by_origin() {
    let harness = BanHarness::new();
    harness.register("carol").await;
    harness.service.ban_user("carol", "raid").await.unwrap();

    let phone = harness.other_device(phone_signals());
    let report = phone.service.check().await;
    assert_eq!(report.source, Some(EvidenceSource::Index(IndexKey::Origin)));
    assert_eq!(report.verdict.into_record().unwrap().reason, "raid");
}

#[tokio::test]
async fn unrelated_visitor_is_allowed() {
    let harness = BanHarness::new();
    harness.register("dave").await;
    harness.service.ban_user("dave", "spam").await.unwrap();

    let stranger = BanHarness::builder()
        .store(harness.store.clone())
        .signals(phone_signals())
        .origin("192.0.2.77")
        .build();
    assert_eq!(stranger.service.check_ban().await, None);
    assert!(stranger.local_payloads().await.iter().all(Option::is_none));
}

#[tokio::test]
async fn unreachable_database_fails_open() {
    init_test_logging();
    let harness = BanHarness::builder()
        .signed_in("alice")
        .unreachable_database()
        .build();

    let report = harness.service.check().await;
    assert_eq!(report.verdict, Verdict::Allowed);
    assert_eq!(report.resolved_after, CheckPhase::ServerChecked);
    let lookups = report
        .faults
        .iter()
        .filter(|f| matches!(f, Fault::LookupFailed { .. }))
        .count();
    assert_eq!(lookups, 3);
    assert_eq!(harness.service.check_ban().await, None);
}

#[tokio::test]
async fn broken_channels_do_not_block_healing() {
    let store = MemoryDatabase::new();
    let seed = BanHarness::builder().store(store.clone()).build();
    seed.register("erin").await;
    seed.service.ban_user("erin", "doxxing").await.unwrap();

    let healthy = MemoryChannel::new(ChannelKind::LocalStorage);
    let faulty = FaultyChannel::unavailable(ChannelKind::ResponseCache);
    let garbage = FaultyChannel::garbage(ChannelKind::Cookie, "%%%");
    let service = BanService::builder()
        .channels(vec![
            Arc::new(healthy.clone()) as Arc<dyn StorageChannel>,
            Arc::new(faulty.clone()) as Arc<dyn StorageChannel>,
            Arc::new(garbage) as Arc<dyn StorageChannel>,
        ])
        .database(Arc::new(store))
        .origin(Arc::new(StaticOrigin::new("192.0.2.1")))
        .environment(Arc::new(FixedEnvironment::new(seed.environment.signals())))
        .session(Arc::new(StaticSession::anonymous()))
        .surface(Arc::new(RecordingSurface::new()))
        .clock(Arc::new(SimulatedClock::default()))
        .build()
        .unwrap();

    let report = service.check().await;
    assert_eq!(report.verdict.into_record().unwrap().reason, "doxxing");
    assert!(report
        .faults
        .iter()
        .any(|f| matches!(f, Fault::MalformedCachedPayload { channel: ChannelKind::Cookie, .. })));
    assert!(report
        .faults
        .iter()
        .any(|f| matches!(f, Fault::ChannelUnavailable { channel: ChannelKind::ResponseCache, .. })));
    assert!(healthy.peek().await.unwrap().contains("doxxing"));
    assert_eq!(faulty.attempts(), 2);
}
