//! Admin sign-in.
//!
//! The catalog never looks inside a token: it only needs *some* bearer token
//! to attach to mutating requests. A [`Session`] comes from one of two places:
//!
//! - a token issued elsewhere, passed through `GALLERY_ACCESS_TOKEN`
//!   ([`Session::from_token`]), or
//! - a password sign-in against a GoTrue-compatible auth service
//!   ([`sign_in_with_password`]): `POST {url}/token?grant_type=password`
//!   with the project's public key in the `apikey` header.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AuthConfig;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("auth request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("sign-in rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("password sign-in is not configured: {0}")]
    NotConfigured(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated admin: the bearer token plus who it belongs to.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: UserIdentity,
}

// Keep the token out of logs and panic messages.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

impl Session {
    /// Wrap a pre-issued token. The identity is unknown.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            user: UserIdentity {
                id: "unknown".to_string(),
                email: None,
            },
        }
    }
}

/// Error bodies differ between GoTrue versions.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self, raw: String) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .unwrap_or(raw)
    }
}

fn token_url(base: &str) -> String {
    format!("{}/token?grant_type=password", base.trim_end_matches('/'))
}

/// Exchange an e-mail and password for a session.
pub async fn sign_in_with_password(
    client: &reqwest::Client,
    config: &AuthConfig,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    if config.url.trim().is_empty() {
        return Err(AuthError::NotConfigured("auth.url is empty"));
    }
    if config.anon_key.trim().is_empty() {
        return Err(AuthError::NotConfigured("auth.anon_key is empty"));
    }

    let url = token_url(&config.url);
    debug!(%url, email, "signing in");
    let response = client
        .post(&url)
        .header("apikey", &config.anon_key)
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let raw = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<AuthErrorBody>(&raw)
            .unwrap_or_default()
            .into_message(raw);
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let session: Session = response.json().await?;
    info!(user = %session.user.id, "signed in");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_tolerates_trailing_slash() {
        assert_eq!(
            token_url("https://p.supabase.co/auth/v1/"),
            "https://p.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn session_decodes_gotrue_response() {
        let json = r#"{
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": "u-1", "email": "admin@example.com", "role": "authenticated"}
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.user.email.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::from_token("secret-token");
        assert!(!format!("{session:?}").contains("secret-token"));
    }

    #[test]
    fn error_body_prefers_description() {
        let body: AuthErrorBody = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message("raw".into()), "Invalid login credentials");
        assert_eq!(AuthErrorBody::default().into_message("raw".into()), "raw");
    }

    #[tokio::test]
    async fn unconfigured_sign_in_fails_locally() {
        let client = reqwest::Client::new();
        let err = sign_in_with_password(&client, &AuthConfig::default(), "a@b.c", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured(_)));
    }
}
