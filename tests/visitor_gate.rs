mod support;

use std::time::Duration as StdDuration;

use brandpage::application::qr_codes::QrCodeCommand;
use brandpage::application::session_watch::SessionWatcher;
use brandpage::application::visits::GateInputs;
use brandpage::domain::types::{QrTargetKind, VisitSource};
use brandpage::domain::visit::{CachedSession, GateState, VisitOrigin};
use time::{Duration, OffsetDateTime};
use tokio::time::timeout;
use uuid::Uuid;

use support::{InMemoryRepos, router_state, seed_brand, seed_page};

fn signed_in(token: &str, user_id: Uuid, now: OffsetDateTime) -> GateInputs {
    GateInputs {
        cached: Some(CachedSession {
            token: token.to_string(),
            user_id,
            expires_at: now + Duration::hours(1),
        }),
        skip_until: None,
        origin: VisitOrigin::direct(),
    }
}

fn anonymous(skip_until: Option<OffsetDateTime>) -> GateInputs {
    GateInputs {
        cached: None,
        skip_until,
        origin: VisitOrigin::direct(),
    }
}

#[tokio::test]
async fn repeated_signed_in_loads_share_one_visit_row() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;

    let visitor = repos.sign_in("visitor-token").await;
    let now = OffsetDateTime::now_utc();
    let inputs = signed_in("visitor-token", visitor.user_id, now);

    for _ in 0..2 {
        let gate = state.http.tracker.on_page_load(page.id, &inputs, now).await;
        assert_eq!(
            gate,
            GateState::Authenticated {
                user_id: visitor.user_id
            }
        );
    }

    let views = repos.views().await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].visit_count, 2);
    assert_eq!(views[0].user_id, visitor.user_id);
    assert_eq!(views[0].source, VisitSource::Direct);
}

#[tokio::test]
async fn anonymous_visitor_is_prompted_until_skipping() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;
    let tracker = &state.http.tracker;
    let now = OffsetDateTime::now_utc();

    let prompted = tracker.on_page_load(page.id, &anonymous(None), now).await;
    assert_eq!(prompted, GateState::PromptShown);

    let until = now + Duration::seconds(120);
    let skipped = tracker
        .on_page_load(page.id, &anonymous(Some(until)), now)
        .await;
    assert_eq!(skipped, GateState::Skipped { until });

    let later = until + Duration::seconds(1);
    let expired = tracker
        .on_page_load(page.id, &anonymous(Some(until)), later)
        .await;
    assert_eq!(expired, GateState::PromptShown);

    assert!(repos.views().await.is_empty());
}

#[tokio::test]
async fn revoked_cached_session_falls_back_to_prompt() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;

    let visitor = repos.sign_in("visitor-token").await;
    repos.expire_session("visitor-token").await;
    let now = OffsetDateTime::now_utc();

    let gate = state
        .http
        .tracker
        .on_page_load(page.id, &signed_in("visitor-token", visitor.user_id, now), now)
        .await;
    assert_eq!(gate, GateState::PromptShown);
    assert!(repos.views().await.is_empty());
}

#[tokio::test]
async fn forged_session_cookie_records_nothing() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;

    let now = OffsetDateTime::now_utc();
    let forged = GateInputs {
        cached: Some(CachedSession {
            token: "forged".into(),
            user_id: owner.user_id,
            expires_at: now + Duration::days(365),
        }),
        skip_until: None,
        origin: VisitOrigin::direct(),
    };

    for _ in 0..3 {
        let gate = state.http.tracker.on_page_load(page.id, &forged, now).await;
        assert_eq!(gate, GateState::PromptShown);
    }
    assert!(repos.views().await.is_empty());
}

#[tokio::test]
async fn visits_are_counted_for_the_session_owner_not_the_cookie_user() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;

    let visitor = repos.sign_in("visitor-token").await;
    let now = OffsetDateTime::now_utc();
    let gate = state
        .http
        .tracker
        .on_page_load(page.id, &signed_in("visitor-token", owner.user_id, now), now)
        .await;
    assert_eq!(
        gate,
        GateState::Authenticated {
            user_id: visitor.user_id
        }
    );

    let views = repos.views().await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].user_id, visitor.user_id);
}

#[tokio::test]
async fn qr_visits_bump_the_code_view_count() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;
    let code = state
        .api
        .qr_codes
        .create(
            &owner,
            brand.id,
            QrCodeCommand {
                name: "Poster".into(),
                target_kind: QrTargetKind::LandingPage,
                landing_page_id: Some(page.id),
                external_url: None,
                foreground_color: None,
                background_color: None,
                size: None,
            },
        )
        .await
        .expect("qr code created");

    let visitor = repos.sign_in("visitor-token").await;
    let now = OffsetDateTime::now_utc();
    let qr_id = code.id.to_string();
    let mut inputs = signed_in("visitor-token", visitor.user_id, now);
    inputs.origin = VisitOrigin::from_query(Some("qr"), Some(&qr_id));

    state.http.tracker.on_page_load(page.id, &inputs, now).await;

    let views = repos.views().await;
    assert_eq!(views[0].source, VisitSource::QrScan);
    assert_eq!(views[0].qr_code_id, Some(code.id));

    let stored = state
        .api
        .qr_codes
        .get(&owner, code.id)
        .await
        .expect("qr code loads");
    assert_eq!(stored.view_count, 1);
}

#[tokio::test]
async fn qr_origin_for_another_page_counts_as_direct() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let spring = seed_page(&state, &owner, brand.id, "spring", true).await;
    let autumn = seed_page(&state, &owner, brand.id, "autumn", true).await;
    let autumn_code = state
        .api
        .qr_codes
        .create(
            &owner,
            brand.id,
            QrCodeCommand {
                name: "Autumn poster".into(),
                target_kind: QrTargetKind::LandingPage,
                landing_page_id: Some(autumn.id),
                external_url: None,
                foreground_color: None,
                background_color: None,
                size: None,
            },
        )
        .await
        .expect("qr code created");

    let visitor = repos.sign_in("visitor-token").await;
    let now = OffsetDateTime::now_utc();
    let foreign = autumn_code.id.to_string();
    let unknown = Uuid::new_v4().to_string();

    for qr in [&foreign, &unknown] {
        let mut inputs = signed_in("visitor-token", visitor.user_id, now);
        inputs.origin = VisitOrigin::from_query(Some("qr"), Some(qr));
        state.http.tracker.on_page_load(spring.id, &inputs, now).await;
    }

    let views = repos.views().await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].visit_count, 2);
    assert_eq!(views[0].source, VisitSource::Direct);
    assert_eq!(views[0].qr_code_id, None);

    let stored = state
        .api
        .qr_codes
        .get(&owner, autumn_code.id)
        .await
        .expect("qr code loads");
    assert_eq!(stored.view_count, 0);
}

#[tokio::test]
async fn watcher_reports_sign_out_without_waiting_for_poll() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;

    let visitor = repos.sign_in("visitor-token").await;
    let now = OffsetDateTime::now_utc();
    let tracker = state.http.tracker.clone();
    let mut watcher = SessionWatcher::spawn(
        tracker.clone(),
        page.id,
        signed_in("visitor-token", visitor.user_id, now),
        StdDuration::from_secs(3600),
    );

    let first = timeout(StdDuration::from_secs(5), watcher.next_state())
        .await
        .expect("optimistic state arrives");
    assert_eq!(
        first,
        Some(GateState::Authenticated {
            user_id: visitor.user_id
        })
    );

    tracker
        .sessions()
        .sign_out("visitor-token")
        .await
        .expect("sign out succeeds");

    let next = timeout(StdDuration::from_secs(5), watcher.next_state())
        .await
        .expect("sign out is reported");
    assert_eq!(next, Some(GateState::PromptShown));
}

#[tokio::test]
async fn watcher_ignores_other_visitors_signing_out() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "spring", true).await;

    let visitor = repos.sign_in("visitor-token").await;
    repos.sign_in("someone-else").await;
    let now = OffsetDateTime::now_utc();
    let tracker = state.http.tracker.clone();
    let mut watcher = SessionWatcher::spawn(
        tracker.clone(),
        page.id,
        signed_in("visitor-token", visitor.user_id, now),
        StdDuration::from_secs(3600),
    );

    watcher.next_state().await;
    tracker
        .sessions()
        .sign_out("someone-else")
        .await
        .expect("sign out succeeds");

    let next = timeout(StdDuration::from_millis(200), watcher.next_state()).await;
    assert!(next.is_err(), "unrelated sign-out must not change the gate");
}
