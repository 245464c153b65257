//! End-to-end access gate flows against a scripted identity provider

mod common;

use std::time::Duration;

use warden_auth_core::{
    AllowList, AuthError, CallbackParams, CookieJar, GateDecision, MemoryCookieJar,
    SESSION_COOKIE,
};

use common::{test_gate, MockIdentityProvider};

fn sign_in_state(decision: GateDecision) -> String {
    match decision {
        GateDecision::Redirect(url) => {
            assert!(url.starts_with(common::mock_provider::AUTHORIZE_URL));
            MockIdentityProvider::state_from_url(&url)
        }
        other => panic!("expected provider redirect, got {other:?}"),
    }
}

fn callback(code: &str, state: &str) -> CallbackParams {
    CallbackParams {
        code: Some(code.to_string()),
        state: Some(state.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_sign_in_then_browse_then_sign_out() {
    let (gate, _clock, provider) = test_gate(&["h8liu"]);
    provider.grant("code-1", "h8liu");

    let mut browser = MemoryCookieJar::new();
    assert_eq!(gate.authorize(&mut browser), GateDecision::Anonymous);

    let state = sign_in_state(gate.sign_in());
    let decision = gate
        .callback(&callback("code-1", &state), &mut browser)
        .await
        .unwrap();
    assert_eq!(decision, GateDecision::Redirect("/".to_string()));

    for _ in 0..3 {
        assert_eq!(
            gate.authorize(&mut browser),
            GateDecision::Authorized {
                user: "h8liu".to_string()
            }
        );
    }

    assert_eq!(
        gate.sign_out(&mut browser),
        GateDecision::Redirect("/".to_string())
    );
    assert_eq!(gate.authorize(&mut browser), GateDecision::Anonymous);
}

#[tokio::test]
async fn test_cookie_expiry_matches_session_ttl() {
    let (gate, clock, provider) = test_gate(&["h8liu"]);
    provider.grant("code-1", "h8liu");
    let mut browser = MemoryCookieJar::new();

    let state = sign_in_state(gate.sign_in());
    gate.callback(&callback("code-1", &state), &mut browser)
        .await
        .unwrap();

    use warden_auth_core::Clock;
    let expected = clock.now() + chrono::Duration::from_std(gate.sessions().ttl()).unwrap();
    assert_eq!(browser.expires(SESSION_COOKIE), Some(expected));
}

#[tokio::test]
async fn test_session_expires_after_ttl() {
    let (gate, clock, provider) = test_gate(&["h8liu"]);
    provider.grant("code-1", "h8liu");
    let mut browser = MemoryCookieJar::new();

    let state = sign_in_state(gate.sign_in());
    gate.callback(&callback("code-1", &state), &mut browser)
        .await
        .unwrap();

    clock.advance(gate.sessions().ttl() - Duration::from_secs(1));
    assert!(matches!(
        gate.authorize(&mut browser),
        GateDecision::Authorized { .. }
    ));

    clock.advance(Duration::from_secs(2));
    assert_eq!(gate.authorize(&mut browser), GateDecision::Anonymous);
    assert!(browser.read(SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn test_unlisted_user_gets_no_session() {
    let (gate, _clock, provider) = test_gate(&["h8liu"]);
    provider.grant("code-2", "mallory");
    let mut browser = MemoryCookieJar::new();

    let state = sign_in_state(gate.sign_in());
    let err = gate
        .callback(&callback("code-2", &state), &mut browser)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::NotAuthorized(ref user) if user == "mallory"));
    assert_eq!(err.status_code(), 403);
    assert!(browser.read(SESSION_COOKIE).is_none());
    assert_eq!(gate.authorize(&mut browser), GateDecision::Anonymous);
}

#[tokio::test]
async fn test_forged_state_never_reaches_provider() {
    let (gate, _clock, provider) = test_gate(&["h8liu"]);
    provider.grant("code-1", "h8liu");
    let mut browser = MemoryCookieJar::new();

    let err = gate
        .callback(&callback("code-1", "AAAAAAAAAAAA"), &mut browser)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidState));
    assert_eq!(provider.exchange_count(), 0);
    assert!(browser.read(SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn test_stale_state_rejected() {
    let (gate, clock, provider) = test_gate(&["h8liu"]);
    provider.grant("code-1", "h8liu");
    let state = sign_in_state(gate.sign_in());

    clock.advance(gate.states().ttl());
    let mut browser = MemoryCookieJar::new();
    let err = gate
        .callback(&callback("code-1", &state), &mut browser)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidState));
}

#[tokio::test]
async fn test_state_may_be_replayed_within_ttl() {
    let (gate, _clock, provider) = test_gate(&["h8liu"]);
    provider.grant("code-1", "h8liu");
    provider.grant("code-2", "h8liu");
    let state = sign_in_state(gate.sign_in());

    let mut first = MemoryCookieJar::new();
    let mut second = MemoryCookieJar::new();
    assert!(gate.callback(&callback("code-1", &state), &mut first).await.is_ok());
    assert!(gate.callback(&callback("code-2", &state), &mut second).await.is_ok());
}

#[tokio::test]
async fn test_provider_failure_is_generic_error() {
    let (gate, _clock, provider) = test_gate(&["h8liu"]);
    let state = sign_in_state(gate.sign_in());
    let mut browser = MemoryCookieJar::new();

    let err = gate
        .callback(&callback("unknown-code", &state), &mut browser)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::IdentityExchange(_)));
    assert_eq!(provider.exchange_count(), 1);
    assert!(browser.read(SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn test_revocation_applies_on_next_request() {
    let (gate, _clock, provider) = test_gate(&["h8liu", "alice"]);
    provider.grant("code-a", "alice");
    let mut browser = MemoryCookieJar::new();

    let state = sign_in_state(gate.sign_in());
    gate.callback(&callback("code-a", &state), &mut browser)
        .await
        .unwrap();
    assert!(matches!(
        gate.authorize(&mut browser),
        GateDecision::Authorized { .. }
    ));

    // Same keys, alice removed from the list
    let reloaded = gate.with_allow_list(AllowList::new(["h8liu"]));
    let token = browser.read(SESSION_COOKIE).unwrap();
    assert!(reloaded.sessions().check(&token).is_some());
    assert_eq!(
        reloaded.authorize(&mut browser),
        GateDecision::Rejected {
            user: "alice".to_string()
        }
    );
    assert!(browser.read(SESSION_COOKIE).is_none());
}

#[test]
fn test_concurrent_checks_share_one_gate() {
    let (gate, _clock, _provider) = test_gate(&["h8liu"]);
    let (token, _) = gate.sessions().issue("h8liu");

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let gate = &gate;
            let token = token.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    let mut jar = MemoryCookieJar::with_cookie(SESSION_COOKIE, &token);
                    assert!(matches!(
                        gate.authorize(&mut jar),
                        GateDecision::Authorized { .. }
                    ));
                }
            });
        }
    });
}
