use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;

use super::storage::StorageError;
use crate::entities::{Id, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl OAuthProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Apple => "apple",
        }
    }
}

/// The identity as known by the auth service.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id           : Id,
    pub email        : String,
    pub display_name : Option<String>,
    pub avatar_url   : Option<String>,
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token  : String,
    pub refresh_token : Option<String>,
    pub expires_at    : Option<Timestamp>,
    pub user          : AuthUser,
}

impl AuthSession {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Session changes pushed by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    TokenRefreshed(AuthSession),
    UserUpdated(AuthUser),
    SignedOut,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("The user already exists")]
    UserExists,
    #[error("Email not confirmed")]
    EmailNotConfirmed,
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Auth service error: {0}")]
    Service(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Restore a previously established session, refreshing it if expired.
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession>;

    /// Returns no session if the email address has to be confirmed first.
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<AuthSession>>;

    async fn sign_out(&self) -> Result<()>;

    /// Where to send the user for a third-party sign-in.
    fn authorize_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> Result<Url>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
