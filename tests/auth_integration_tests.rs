use axum::{
    extract::FromRequestParts,
    http::{Request, header},
};
use consultancy_portal::{
    AppConfig, AppState, MockFragmentFetcher, PageRouter,
    auth::{AuthProvider, Claims, Session, decode_token},
    config::Env,
    fetcher::FetcherState,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};

// --- Token Helpers ---

fn now() -> usize {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn token(secret: &str, role: &str, exp: usize) -> String {
    let claims = Claims {
        sub: "42".to_string(),
        role: role.to_string(),
        exp,
        iat: now(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn state(env: Env) -> AppState {
    let config = AppConfig {
        env,
        ..AppConfig::default()
    };
    let router = PageRouter::new(config, Arc::new(MockFragmentFetcher::new()) as FetcherState);
    AppState::new(router)
}

async fn session_for(state: &AppState, request: Request<()>) -> Session {
    let (mut parts, _) = request.into_parts();
    Session::from_request_parts(&mut parts, state).await.unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_bearer_token_resolves_user_and_role() {
    let state = state(Env::Production);
    let jwt = token(&state.config.jwt_secret, "editor", now() + 3600);
    let request = Request::builder()
        .header(header::AUTHORIZATION, format!("Bearer {jwt}"))
        .body(())
        .unwrap();

    let session = session_for(&state, request).await;

    let user = session.user.clone().unwrap();
    assert_eq!(user.id, "42");
    assert_eq!(user.roles, vec!["EDITOR".to_string()]);
    assert!(session.is_authenticated());
    assert!(session.has_any_role(&["ADMIN".to_string(), "EDITOR".to_string()]));
}

#[tokio::test]
async fn test_cookie_token_is_accepted() {
    let state = state(Env::Production);
    let jwt = token(&state.config.jwt_secret, "ADMIN", now() + 3600);
    let request = Request::builder()
        .header(header::COOKIE, format!("lang=en; access_token={jwt}"))
        .body(())
        .unwrap();

    let session = session_for(&state, request).await;
    assert!(session.has_any_role(&["ADMIN".to_string()]));
}

#[tokio::test]
async fn test_expired_token_is_anonymous() {
    let state = state(Env::Production);
    let jwt = token(&state.config.jwt_secret, "ADMIN", now() - 3600);
    let request = Request::builder()
        .header(header::AUTHORIZATION, format!("Bearer {jwt}"))
        .body(())
        .unwrap();

    assert!(!session_for(&state, request).await.is_authenticated());
}

#[tokio::test]
async fn test_wrong_signature_is_anonymous() {
    let state = state(Env::Production);
    let jwt = token("some-other-secret", "ADMIN", now() + 3600);

    assert!(decode_token(&jwt, &state.config.jwt_secret).is_err());

    let request = Request::builder()
        .header(header::AUTHORIZATION, format!("Bearer {jwt}"))
        .body(())
        .unwrap();
    assert!(!session_for(&state, request).await.is_authenticated());
}

#[tokio::test]
async fn test_role_header_bypass_only_in_local() {
    let request = || {
        Request::builder()
            .header("x-user-role", "admin")
            .body(())
            .unwrap()
    };

    let local = session_for(&state(Env::Local), request()).await;
    assert!(local.has_any_role(&["ADMIN".to_string()]));

    let production = session_for(&state(Env::Production), request()).await;
    assert!(!production.is_authenticated());
}

#[tokio::test]
async fn test_missing_credentials_is_anonymous() {
    let request = Request::builder().body(()).unwrap();
    let session = session_for(&state(Env::Local), request).await;
    assert!(session.user.is_none());
}
