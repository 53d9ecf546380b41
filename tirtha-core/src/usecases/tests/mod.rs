//! In-memory ports for testing.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use url::Url;

use crate::{
    diagnostics::RecordingSink,
    entities::*,
    gateways::{
        auth::{self, AuthError, AuthEvent, AuthGateway, AuthSession, AuthUser, Credentials, OAuthProvider},
        storage::{KeyValueStorage, StorageError},
    },
    repositories::{self, Backend, Error, Filter, Select},
};
use tirtha_boundary::tables;

#[derive(Debug, Default)]
pub struct MockBackend {
    tables: Mutex<HashMap<&'static str, Vec<Value>>>,
    failing: Mutex<HashSet<&'static str>>,
    selects: Mutex<Vec<&'static str>>,
    latency: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, table: &'static str, rows: Vec<Value>) -> Self {
        self.tables.lock().entry(table).or_default().extend(rows);
        self
    }

    /// Delay every insert and delete.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn fail(&self, table: &'static str) {
        self.failing.lock().insert(table);
    }

    pub fn recover(&self, table: &'static str) {
        self.failing.lock().remove(table);
    }

    pub fn rows(&self, table: &'static str) -> Vec<Value> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    pub fn select_count(&self, table: &'static str) -> usize {
        self.selects.lock().iter().filter(|t| **t == table).count()
    }

    fn check(&self, table: &'static str) -> repositories::Result<()> {
        if self.failing.lock().contains(table) {
            return Err(Error::Backend {
                code: "500".into(),
                message: format!("{table} is unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn select(&self, query: &Select) -> repositories::Result<Vec<Value>> {
        self.selects.lock().push(query.table);
        self.check(query.table)?;
        let store = self.tables.lock();
        Ok(query.apply(store.get(query.table).into_iter().flatten()))
    }

    async fn insert(&self, table: &'static str, row: Value) -> repositories::Result<()> {
        self.wait().await;
        self.check(table)?;
        let mut store = self.tables.lock();
        let rows = store.entry(table).or_default();
        if table == tables::USER_FAVORITES {
            let key = |r: &Value| {
                [tables::USER_ID, tables::ITEM_ID, tables::ITEM_TYPE].map(|c| r.get(c).cloned())
            };
            if rows.iter().any(|r| key(r) == key(&row)) {
                return Err(Error::AlreadyExists);
            }
        }
        rows.push(row);
        Ok(())
    }

    async fn delete(&self, table: &'static str, filters: &[Filter]) -> repositories::Result<usize> {
        self.wait().await;
        self.check(table)?;
        let mut store = self.tables.lock();
        let Some(rows) = store.get_mut(table) else {
            return Ok(0);
        };
        let len = rows.len();
        rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        Ok(len - rows.len())
    }
}

#[derive(Debug, Default)]
pub struct MockStorage {
    values: Mutex<HashMap<String, String>>,
    read_only: bool,
}

impl MockStorage {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }
}

impl KeyValueStorage for MockStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Other(anyhow::anyhow!("read only")));
        }
        self.values.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockAuth {
    accounts: Mutex<HashMap<String, (String, AuthUser)>>,
    session: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
    pub fail_sign_out: Mutex<bool>,
}

impl Default for MockAuth {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Default::default(),
            session: Default::default(),
            events,
            fail_sign_out: Mutex::new(false),
        }
    }
}

impl MockAuth {
    pub fn with_account(self, id: &str, email: &str, password: &str) -> Self {
        let user = AuthUser {
            id: id.into(),
            email: email.into(),
            display_name: None,
            avatar_url: None,
        };
        self.accounts
            .lock()
            .insert(email.into(), (password.into(), user));
        self
    }

    pub fn with_session(self, email: &str) -> Self {
        let session = self
            .accounts
            .lock()
            .get(email)
            .map(|(_, user)| session_of(user.clone()));
        *self.session.lock() = session;
        self
    }

    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

pub fn session_of(user: AuthUser) -> AuthSession {
    AuthSession {
        access_token: format!("token-{}", user.id),
        refresh_token: None,
        expires_at: None,
        user,
    }
}

#[async_trait]
impl AuthGateway for MockAuth {
    async fn current_session(&self) -> auth::Result<Option<AuthSession>> {
        Ok(self.session.lock().clone())
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> auth::Result<AuthSession> {
        let accounts = self.accounts.lock();
        let (password, user) = accounts
            .get(&credentials.email)
            .ok_or(AuthError::InvalidCredentials)?;
        if *password != credentials.password {
            return Err(AuthError::InvalidCredentials);
        }
        let session = session_of(user.clone());
        *self.session.lock() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> auth::Result<Option<AuthSession>> {
        let mut accounts = self.accounts.lock();
        if accounts.contains_key(&credentials.email) {
            return Err(AuthError::UserExists);
        }
        let user = AuthUser {
            id: Id::new(),
            email: credentials.email.clone(),
            display_name: None,
            avatar_url: None,
        };
        accounts.insert(
            credentials.email.clone(),
            (credentials.password.clone(), user),
        );
        // Accounts have to be confirmed by email
        Ok(None)
    }

    async fn sign_out(&self) -> auth::Result<()> {
        if *self.fail_sign_out.lock() {
            return Err(AuthError::Service("offline".into()));
        }
        *self.session.lock() = None;
        Ok(())
    }

    fn authorize_url(&self, provider: OAuthProvider, _: Option<&str>) -> auth::Result<Url> {
        Url::parse(&format!("https://auth.example.org/authorize?provider={}", provider.as_str()))
            .map_err(|err| AuthError::Other(err.into()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

pub fn sink() -> RecordingSink {
    RecordingSink::default()
}
