use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, Env};

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_EDITOR: &str = "EDITOR";
pub const ROLE_VIEWER: &str = "VIEWER";
pub const ROLE_USER: &str = "USER";

/// Cookie carrying the session token for plain page loads.
pub const SESSION_COOKIE: &str = "access_token";

/// AuthProvider
///
/// The Auth collaborator consulted by the page router during the guard step.
/// The router never owns session state; it only asks these two questions.
pub trait AuthProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn has_any_role(&self, roles: &[String]) -> bool;
}

pub type AuthState = Arc<dyn AuthProvider>;

/// Claims
///
/// Payload of the HS256 session token issued by the consultancy API.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as issued by the API.
    pub sub: String,
    /// One of ADMIN, EDITOR, VIEWER, USER.
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity behind a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub roles: Vec<String>,
}

/// Session
///
/// Either anonymous or carrying an `AuthUser`. Page rendering must work for
/// anonymous visitors, so the extractor below never rejects a request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn with_roles(id: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            user: Some(AuthUser {
                id: id.into(),
                roles: roles.iter().map(|role| role.to_string()).collect(),
            }),
        }
    }

    /// from_headers
    ///
    /// Resolves the session in this order:
    /// 1. Local bypass: `x-user-role` header (Env::Local only).
    /// 2. `Authorization: Bearer <jwt>`.
    /// 3. The `access_token` cookie.
    ///
    /// Any decoding failure (expired, bad signature, malformed) yields an anonymous session.
    pub fn from_headers(headers: &HeaderMap, config: &AppConfig) -> Self {
        if config.env == Env::Local {
            if let Some(role) = headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
                let role = role.trim().to_ascii_uppercase();
                if !role.is_empty() {
                    return Self {
                        user: Some(AuthUser {
                            id: "local-dev".to_string(),
                            roles: vec![role],
                        }),
                    };
                }
            }
        }

        let Some(token) = bearer_token(headers).or_else(|| cookie_token(headers)) else {
            return Self::anonymous();
        };

        match decode_token(token, &config.jwt_secret) {
            Ok(claims) => Self {
                user: Some(AuthUser {
                    id: claims.sub,
                    roles: vec![claims.role.to_ascii_uppercase()],
                }),
            },
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                Self::anonymous()
            }
        }
    }
}

impl AuthProvider for Session {
    fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn has_any_role(&self, roles: &[String]) -> bool {
        match &self.user {
            Some(user) => roles
                .iter()
                .any(|wanted| user.roles.iter().any(|held| held.eq_ignore_ascii_case(wanted))),
            None => false,
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        Ok(Session::from_headers(&parts.headers, &config))
    }
}

/// Validates signature and expiry of a session token.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|token| !token.is_empty())
}
