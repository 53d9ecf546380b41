//! Client of a hosted Supabase project.
//!
//! Tables are accessed through the PostgREST interface and
//! the users through the GoTrue interface of the project.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use tokio::sync::broadcast;
use url::Url;

use tirtha_core::gateways::{
    auth::{AuthEvent, AuthSession},
    storage::KeyValueStorage,
};

mod auth;
mod rest;

pub use self::rest::query_string;

const REST_PATH: &str = "rest/v1/";
const AUTH_PATH: &str = "auth/v1/";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: String,
}

pub struct SupabaseClient {
    http: reqwest::Client,
    rest_url: Url,
    auth_url: Url,
    anon_key: String,
    storage: Arc<dyn KeyValueStorage>,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("signed_in", &self.session.read().is_some())
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    pub fn try_new(
        config: SupabaseConfig,
        storage: Arc<dyn KeyValueStorage>,
    ) -> anyhow::Result<Self> {
        let SupabaseConfig { mut url, anon_key } = config;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let rest_url = url.join(REST_PATH)?;
        let auth_url = url.join(AUTH_PATH)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("tirtha/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (events, _) = broadcast::channel(16);
        Ok(Self {
            http,
            rest_url,
            auth_url,
            anon_key,
            storage,
            session: RwLock::new(None),
            events,
        })
    }

    fn bearer(&self) -> String {
        let session = self.session.read();
        let token = session
            .as_ref()
            .map_or(self.anon_key.as_str(), |s| s.access_token.as_str());
        format!("Bearer {token}")
    }

    fn add_auth_headers(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .header("Authorization", self.bearer())
    }

    fn emit(&self, event: AuthEvent) {
        // Nobody might be listening
        let _ = self.events.send(event);
    }
}

/// The error body of both PostgREST and GoTrue.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiError {
    code: Option<serde_json::Value>,
    error_code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ApiError {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| Self {
            message: (!body.trim().is_empty()).then(|| body.trim().to_owned()),
            ..Default::default()
        })
    }

    fn code(&self) -> Option<String> {
        self.error_code.clone().or_else(|| match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => None,
        })
    }

    fn message(&self) -> String {
        [&self.message, &self.msg, &self.error_description, &self.error]
            .into_iter()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_default()
    }
}

/// Split a response into its status and its body.
async fn read_response(response: Response) -> reqwest::Result<(u16, String)> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok((status, body))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
