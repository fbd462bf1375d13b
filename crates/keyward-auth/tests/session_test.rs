//! Integration tests for session validation and revocation.

mod helpers;

use chrono::Duration;
use uuid::Uuid;

use keyward_auth::AuthError;

#[tokio::test]
async fn test_session_valid_until_expiry() {
    let app = helpers::TestApp::new();
    let user = app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;

    let principal = app.service.validate_session(&token).await.unwrap();
    assert_eq!(principal.user_id, user.id);

    app.clock.advance(Duration::hours(10) - Duration::seconds(1));
    assert!(app.service.validate_session(&token).await.is_ok());

    app.clock.advance(Duration::seconds(1));
    let err = app.service.validate_session(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::Expired));
    assert_eq!(err.redirect_path(&app.config.session), Some("/Identity/Signin"));
}

#[tokio::test]
async fn test_every_single_bit_flip_is_rejected() {
    let app = helpers::TestApp::new();
    app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;

    for index in 0..token.len() {
        for bit in 0..7 {
            let mut bytes = token.clone().into_bytes();
            bytes[index] ^= 1 << bit;
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };

            let err = app.service.validate_session(&tampered).await.unwrap_err();
            assert!(
                matches!(err, AuthError::TamperedToken),
                "byte {index} bit {bit} gave {err:?}"
            );
        }
    }
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let app = helpers::TestApp::new();
    app.create_test_user("alice", "p@ss").await;

    let mut other_config = helpers::test_config();
    other_config.session.secret = "some-other-deployment-secret-abcdef0123".into();
    let other = helpers::TestApp::with_config(other_config);
    other.create_test_user("alice", "p@ss").await;
    let foreign = other.sign_in("alice", "p@ss").await;

    assert!(matches!(
        app.service.validate_session(&foreign).await,
        Err(AuthError::TamperedToken)
    ));
}

#[tokio::test]
async fn test_logout_revokes_only_that_session() {
    let app = helpers::TestApp::new();
    app.create_test_user("alice", "p@ss").await;
    let first = app.sign_in("alice", "p@ss").await;
    let second = app.sign_in("alice", "p@ss").await;

    let clear = app.service.logout(&first).await.unwrap();
    assert!(clear.contains("Max-Age=0"));

    assert!(matches!(
        app.service.validate_session(&first).await,
        Err(AuthError::Revoked)
    ));
    assert!(app.service.validate_session(&second).await.is_ok());
}

#[tokio::test]
async fn test_password_change_revokes_all_sessions() {
    let app = helpers::TestApp::new();
    app.create_test_user("alice", "p@ss").await;
    let first = app.sign_in("alice", "p@ss").await;
    let second = app.sign_in("alice", "p@ss").await;

    app.clock.advance(Duration::seconds(5));
    app.service
        .change_password(&first, "p@ss", "n3w-secret")
        .await
        .unwrap();

    for token in [&first, &second] {
        assert!(matches!(
            app.service.validate_session(token).await,
            Err(AuthError::Revoked)
        ));
    }

    app.clock.advance(Duration::seconds(1));
    assert!(matches!(
        app.service.authenticate("alice", "p@ss").await,
        Err(AuthError::InvalidCredentials)
    ));
    let fresh = app.sign_in("alice", "n3w-secret").await;
    assert!(app.service.validate_session(&fresh).await.is_ok());

    app.flush_email().await;
    let sent = app.outbox.sent().await;
    assert!(sent.iter().any(|m| m.subject == "Your password was changed"));
}

/// A small principal cache that sees far more users than it can hold.
fn churning_cache_app() -> helpers::TestApp {
    let mut config = helpers::test_config();
    config.cache.memory.max_capacity = 32;
    helpers::TestApp::with_config(config)
}

async fn churn_principal_cache(app: &helpers::TestApp) {
    for _ in 0..200 {
        app.service
            .principals()
            .resolve(Uuid::new_v4())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_logout_survives_principal_cache_churn() {
    let app = churning_cache_app();
    app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;

    app.service.logout(&token).await.unwrap();
    churn_principal_cache(&app).await;

    assert!(matches!(
        app.service.validate_session(&token).await,
        Err(AuthError::Revoked)
    ));
    assert_eq!(app.revocations.len(), 1);
}

#[tokio::test]
async fn test_password_change_survives_principal_cache_churn() {
    let app = churning_cache_app();
    app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;

    app.clock.advance(Duration::seconds(1));
    app.service
        .change_password(&token, "p@ss", "n3w-secret")
        .await
        .unwrap();
    churn_principal_cache(&app).await;

    app.clock.advance(Duration::hours(10) - Duration::seconds(2));
    assert!(matches!(
        app.service.validate_session(&token).await,
        Err(AuthError::Revoked)
    ));
}

#[tokio::test]
async fn test_expired_revocations_are_purged() {
    let app = helpers::TestApp::new();
    app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;
    app.service.logout(&token).await.unwrap();

    assert_eq!(app.service.purge_expired_revocations().await.unwrap(), 0);

    app.clock.advance(Duration::hours(10));
    assert_eq!(app.service.purge_expired_revocations().await.unwrap(), 1);
    assert!(app.revocations.is_empty());
}

#[tokio::test]
async fn test_password_change_requires_current_password() {
    let app = helpers::TestApp::new();
    app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;

    let err = app
        .service
        .change_password(&token, "guess", "n3w-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let same = app
        .service
        .change_password(&token, "p@ss", "p@ss")
        .await
        .unwrap_err();
    assert!(matches!(same, AuthError::WeakPassword(_)));

    assert!(app.service.validate_session(&token).await.is_ok());
}

#[tokio::test]
async fn test_lockout_does_not_end_existing_sessions() {
    let app = helpers::TestApp::new();
    app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;

    for _ in 0..3 {
        let _ = app.service.authenticate("alice", "wrong").await;
    }

    assert!(app.service.validate_session(&token).await.is_ok());
}

#[tokio::test]
async fn test_without_denylist_logout_is_cookie_only() {
    let mut config = helpers::test_config();
    config.session.denylist_enabled = false;
    let app = helpers::TestApp::with_config(config);
    app.create_test_user("alice", "p@ss").await;
    let token = app.sign_in("alice", "p@ss").await;

    app.service.logout(&token).await.unwrap();
    assert!(app.service.validate_session(&token).await.is_ok());
}
