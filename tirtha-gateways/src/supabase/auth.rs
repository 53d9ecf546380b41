use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use url::Url;

use tirtha_core::{
    entities::{Id, Timestamp},
    gateways::{
        auth::{
            AuthError, AuthEvent, AuthGateway, AuthSession, AuthUser, Credentials, OAuthProvider,
            Result,
        },
        storage::keys,
    },
};

use super::{is_success, read_response, ApiError, SupabaseClient};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserMetadata {
    full_name: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl From<UserResponse> for AuthUser {
    fn from(from: UserResponse) -> Self {
        let UserResponse {
            id,
            email,
            user_metadata,
        } = from;
        let UserMetadata {
            full_name,
            name,
            avatar_url,
            picture,
        } = user_metadata;
        Self {
            id: id.into(),
            email: email.unwrap_or_default(),
            display_name: full_name.or(name),
            avatar_url: avatar_url.or(picture),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self, now: Timestamp) -> AuthSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now.unix_timestamp() + secs))
            .and_then(Timestamp::from_unix_timestamp);
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Sign-up returns a session if no confirmation is required.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

/// The persisted form of a session.
#[rustfmt::skip]
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    access_token  : String,
    refresh_token : Option<String>,
    expires_at    : Option<i64>,
    user_id       : String,
    email         : String,
    display_name  : Option<String>,
    avatar_url    : Option<String>,
}

impl From<&AuthSession> for StoredSession {
    fn from(from: &AuthSession) -> Self {
        Self {
            access_token: from.access_token.clone(),
            refresh_token: from.refresh_token.clone(),
            expires_at: from.expires_at.map(|at| at.unix_timestamp()),
            user_id: from.user.id.to_string(),
            email: from.user.email.clone(),
            display_name: from.user.display_name.clone(),
            avatar_url: from.user.avatar_url.clone(),
        }
    }
}

impl From<StoredSession> for AuthSession {
    fn from(from: StoredSession) -> Self {
        Self {
            access_token: from.access_token,
            refresh_token: from.refresh_token,
            expires_at: from.expires_at.and_then(Timestamp::from_unix_timestamp),
            user: AuthUser {
                id: Id::from(from.user_id),
                email: from.email,
                display_name: from.display_name,
                avatar_url: from.avatar_url,
            },
        }
    }
}

/// Map an error response of GoTrue.
pub(crate) fn auth_error(status: u16, body: &str) -> AuthError {
    let error = ApiError::parse(body);
    let code = error.code().unwrap_or_default();
    let message = error.message();
    let lowercase = message.to_lowercase();
    if code == "invalid_credentials"
        || code == "invalid_grant"
        || error.error.as_deref() == Some("invalid_grant")
        || lowercase.contains("invalid login credentials")
    {
        return AuthError::InvalidCredentials;
    }
    if code == "user_already_exists" || lowercase.contains("already registered") {
        return AuthError::UserExists;
    }
    if code == "email_not_confirmed" || lowercase.contains("email not confirmed") {
        return AuthError::EmailNotConfirmed;
    }
    if status == 401 {
        return AuthError::NotAuthenticated;
    }
    if message.is_empty() {
        AuthError::Service(format!("HTTP status {status}"))
    } else {
        AuthError::Service(message)
    }
}

/// The URL that starts a third-party sign-in.
pub(crate) fn authorize_url(
    auth_url: &Url,
    provider: OAuthProvider,
    redirect_to: Option<&str>,
) -> Result<Url> {
    let mut url = auth_url
        .join("authorize")
        .map_err(|err| AuthError::Other(err.into()))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("provider", provider.as_str());
        if let Some(redirect_to) = redirect_to {
            query.append_pair("redirect_to", redirect_to);
        }
    }
    Ok(url)
}

impl SupabaseClient {
    async fn post_auth<T>(&self, path: &str, body: serde_json::Value) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self
            .auth_url
            .join(path)
            .map_err(|err| AuthError::Other(err.into()))?;
        let response = self
            .add_auth_headers(self.http.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;
        let (status, body) = read_response(response)
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;
        if !is_success(status) {
            return Err(auth_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|err| AuthError::Other(err.into()))
    }

    /// Fetch the user of the current session.
    pub async fn fetch_user(&self) -> Result<AuthUser> {
        if self.session.read().is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        let url = self
            .auth_url
            .join("user")
            .map_err(|err| AuthError::Other(err.into()))?;
        let response = self
            .add_auth_headers(self.http.get(url))
            .send()
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;
        let (status, body) = read_response(response)
            .await
            .map_err(|err| AuthError::Service(err.to_string()))?;
        if !is_success(status) {
            return Err(auth_error(status, &body));
        }
        let user: UserResponse =
            serde_json::from_str(&body).map_err(|err| AuthError::Other(err.into()))?;
        Ok(user.into())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        let response: TokenResponse = self
            .post_auth(
                "token?grant_type=refresh_token",
                json!({ "refresh_token": refresh_token }),
            )
            .await?;
        let session = response.into_session(Timestamp::now());
        self.store_session(&session)?;
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    fn store_session(&self, session: &AuthSession) -> Result<()> {
        *self.session.write() = Some(session.clone());
        let stored = serde_json::to_string(&StoredSession::from(session))
            .map_err(|err| AuthError::Other(err.into()))?;
        self.storage.set(keys::AUTH_SESSION, &stored)?;
        Ok(())
    }

    fn forget_session(&self) {
        *self.session.write() = None;
        if let Err(err) = self.storage.remove(keys::AUTH_SESSION) {
            log::warn!("Unable to remove the persisted session: {err}");
        }
    }

    fn load_stored_session(&self) -> Option<AuthSession> {
        let stored = match self.storage.get(keys::AUTH_SESSION) {
            Ok(stored) => stored?,
            Err(err) => {
                log::warn!("Unable to read the persisted session: {err}");
                return None;
            }
        };
        match serde_json::from_str::<StoredSession>(&stored) {
            Ok(stored) => Some(stored.into()),
            Err(err) => {
                log::warn!("Discarding malformed persisted session: {err}");
                None
            }
        }
    }
}

#[async_trait]
impl AuthGateway for SupabaseClient {
    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let session = self.session.read().clone();
        let Some(session) = session.or_else(|| self.load_stored_session()) else {
            return Ok(None);
        };
        if session.is_expired(Timestamp::now()) {
            // Refreshing is authorized by the anon key only
            *self.session.write() = None;
            let Some(refresh_token) = session.refresh_token.as_deref() else {
                self.forget_session();
                return Ok(None);
            };
            return match self.refresh(refresh_token).await {
                Ok(session) => Ok(Some(session)),
                Err(AuthError::InvalidCredentials | AuthError::NotAuthenticated) => {
                    log::info!("The persisted session has been revoked");
                    self.forget_session();
                    Ok(None)
                }
                Err(err) => Err(err),
            };
        }
        *self.session.write() = Some(session.clone());
        match self.fetch_user().await {
            Ok(user) => {
                let session = AuthSession { user, ..session };
                self.store_session(&session)?;
                Ok(Some(session))
            }
            Err(AuthError::NotAuthenticated) => {
                self.forget_session();
                Ok(None)
            }
            Err(err) => {
                log::warn!("Unable to verify the persisted session: {err}");
                Ok(Some(session))
            }
        }
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession> {
        let response: TokenResponse = self
            .post_auth(
                "token?grant_type=password",
                json!({ "email": credentials.email, "password": credentials.password }),
            )
            .await?;
        let session = response.into_session(Timestamp::now());
        self.store_session(&session)?;
        log::info!("Signed in as {}", session.user.email);
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<AuthSession>> {
        let response: SignUpResponse = self
            .post_auth(
                "signup",
                json!({ "email": credentials.email, "password": credentials.password }),
            )
            .await?;
        match response {
            SignUpResponse::Session(response) => {
                let session = response.into_session(Timestamp::now());
                self.store_session(&session)?;
                self.emit(AuthEvent::SignedIn(session.clone()));
                Ok(Some(session))
            }
            SignUpResponse::User(user) => {
                log::info!("Confirmation required for user {}", user.id);
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        if self.session.read().is_some() {
            let url = self
                .auth_url
                .join("logout")
                .map_err(|err| AuthError::Other(err.into()))?;
            let response = self
                .add_auth_headers(self.http.post(url))
                .send()
                .await
                .map_err(|err| AuthError::Service(err.to_string()))?;
            let (status, body) = read_response(response)
                .await
                .map_err(|err| AuthError::Service(err.to_string()))?;
            // An expired token has been signed out already
            if !is_success(status) && status != 401 {
                return Err(auth_error(status, &body));
            }
        }
        self.forget_session();
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn authorize_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> Result<Url> {
        authorize_url(&self.auth_url, provider, redirect_to)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        storage::MemoryStorage,
        supabase::{SupabaseClient, SupabaseConfig},
    };
    use tirtha_core::gateways::storage::KeyValueStorage;

    fn client(storage: Arc<MemoryStorage>) -> SupabaseClient {
        let config = SupabaseConfig {
            url: Url::parse("https://project.supabase.co").unwrap(),
            anon_key: "anon".into(),
        };
        SupabaseClient::try_new(config, storage).unwrap()
    }

    #[test]
    fn build_authorize_urls() {
        let auth_url = Url::parse("https://project.supabase.co/auth/v1/").unwrap();
        let url = authorize_url(&auth_url, OAuthProvider::Google, None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/auth/v1/authorize?provider=google"
        );
        let url = authorize_url(&auth_url, OAuthProvider::Apple, Some("tirtha://auth")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/auth/v1/authorize?provider=apple&redirect_to=tirtha%3A%2F%2Fauth"
        );
    }

    #[test]
    fn derive_endpoints_from_project_url() {
        let client = client(Arc::new(MemoryStorage::new()));
        let url = client.authorize_url(OAuthProvider::Google, None).unwrap();
        assert!(url.as_str().starts_with("https://project.supabase.co/auth/v1/authorize"));
        assert_eq!(client.rest_url.as_str(), "https://project.supabase.co/rest/v1/");
    }

    #[test]
    fn map_auth_errors() {
        let invalid = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert!(matches!(auth_error(400, invalid), AuthError::InvalidCredentials));
        let exists = r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#;
        assert!(matches!(auth_error(422, exists), AuthError::UserExists));
        let unconfirmed = r#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#;
        assert!(matches!(auth_error(400, unconfirmed), AuthError::EmailNotConfirmed));
        assert!(matches!(auth_error(401, ""), AuthError::NotAuthenticated));
        match auth_error(500, r#"{"msg":"Database error"}"#) {
            AuthError::Service(message) => assert_eq!(message, "Database error"),
            err => panic!("unexpected {err}"),
        }
    }

    #[test]
    fn parse_sign_up_responses() {
        let session = r#"{
            "access_token": "jwt",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": "u1", "email": "a@b.c", "user_metadata": { "full_name": "Asha" } }
        }"#;
        let SignUpResponse::Session(response) = serde_json::from_str::<SignUpResponse>(session).unwrap() else {
            panic!("expected a session");
        };
        let now = Timestamp::from_unix_timestamp(1_700_000_000).unwrap();
        let session = response.into_session(now);
        assert_eq!(session.user.display_name.as_deref(), Some("Asha"));
        assert_eq!(
            session.expires_at.map(|at| at.unix_timestamp()),
            Some(1_700_003_600)
        );

        let user = r#"{ "id": "u2", "email": "x@y.z", "confirmation_sent_at": "2024-01-01T00:00:00Z" }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(user).unwrap(),
            SignUpResponse::User(_)
        ));
    }

    #[tokio::test]
    async fn restore_nothing_without_persisted_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::AUTH_SESSION, "not json").unwrap();
        let client = client(storage.clone());
        assert!(client.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn forget_expired_session_without_refresh_token() {
        let storage = Arc::new(MemoryStorage::new());
        let session = AuthSession {
            access_token: "jwt".into(),
            refresh_token: None,
            expires_at: Timestamp::from_unix_timestamp(0),
            user: AuthUser {
                id: "u1".into(),
                email: "a@b.c".into(),
                display_name: None,
                avatar_url: None,
            },
        };
        let stored = serde_json::to_string(&StoredSession::from(&session)).unwrap();
        storage.set(keys::AUTH_SESSION, &stored).unwrap();
        let client = client(storage.clone());
        assert!(client.current_session().await.unwrap().is_none());
        assert!(storage.get(keys::AUTH_SESSION).unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_out_without_session_emits_event() {
        let client = client(Arc::new(MemoryStorage::new()));
        let mut events = client.subscribe();
        client.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedOut);
    }
}
