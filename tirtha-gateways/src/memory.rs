//! In-memory backend and auth service for offline use and testing.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context as _};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::broadcast;
use url::Url;

use tirtha_boundary::{tables, ItemType};
use tirtha_core::{
    entities::Id,
    gateways::auth::{
        self, AuthError, AuthEvent, AuthGateway, AuthSession, AuthUser, Credentials, OAuthProvider,
    },
    repositories::{self, value_to_key, Backend, Error, Filter, Select},
};

// Columns of unique constraints per table
const UNIQUE_KEYS: &[(&str, &[&str])] = &[
    (tables::USER_FAVORITES, &[tables::USER_ID, tables::ITEM_ID, tables::ITEM_TYPE]),
    (tables::CITIES, &[tables::ID]),
    (tables::SPOTS, &[tables::ID]),
    (tables::ROUTES, &[tables::ID]),
    (tables::EVENTS, &[tables::ID]),
    (tables::PROFILES, &[tables::ID]),
];

// Key values compare by their text, item types by their stored name.
fn key_value(column: &str, value: &Value) -> Option<String> {
    if column == tables::ITEM_TYPE {
        if let Ok(item_type) = serde_json::from_value::<ItemType>(value.clone()) {
            return Some(item_type.as_str().to_owned());
        }
    }
    value_to_key(value)
}

fn unique_key(table: &str, row: &Value) -> Option<Vec<Option<String>>> {
    UNIQUE_KEYS
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, columns)| {
            columns
                .iter()
                .map(|c| row.get(*c).and_then(|v| key_value(c, v)))
                .collect()
        })
}

/// Tables held in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the tables from a JSON object that maps table names to rows.
    pub fn from_json(fixture: Value) -> anyhow::Result<Self> {
        let Value::Object(fixture) = fixture else {
            bail!("A fixture must be an object of tables");
        };
        let mut tables = HashMap::new();
        for (name, rows) in fixture {
            let Value::Array(rows) = rows else {
                bail!("The table '{name}' is not an array of rows");
            };
            tables.insert(name, rows);
        }
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    pub fn load_fixture<P: AsRef<Path>>(file: P) -> anyhow::Result<Self> {
        let file = file.as_ref();
        let json = fs::read_to_string(file)
            .with_context(|| format!("Unable to read fixture {}", file.display()))?;
        let fixture = serde_json::from_str(&json)
            .with_context(|| format!("Malformed fixture {}", file.display()))?;
        let backend = Self::from_json(fixture)?;
        log::info!(
            "Loaded {} tables from {}",
            backend.tables.read().len(),
            file.display()
        );
        Ok(backend)
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables
            .write()
            .entry(table.to_owned())
            .or_default()
            .extend(rows);
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &Select) -> repositories::Result<Vec<Value>> {
        let tables = self.tables.read();
        Ok(query.apply(tables.get(query.table).into_iter().flatten()))
    }

    async fn insert(&self, table: &'static str, row: Value) -> repositories::Result<()> {
        if !row.is_object() {
            return Err(Error::Backend {
                code: "22P02".into(),
                message: format!("Invalid row for {table}"),
            });
        }
        let mut tables = self.tables.write();
        let rows = tables.entry(table.to_owned()).or_default();
        if let Some(key) = unique_key(table, &row) {
            if rows.iter().any(|r| unique_key(table, r).as_ref() == Some(&key)) {
                return Err(Error::AlreadyExists);
            }
        }
        rows.push(row);
        Ok(())
    }

    async fn delete(&self, table: &'static str, filters: &[Filter]) -> repositories::Result<usize> {
        if filters.is_empty() {
            return Err(anyhow::anyhow!("Refusing to delete all rows of {table}").into());
        }
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let count = rows.len();
        rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        Ok(count - rows.len())
    }
}

/// Password accounts held in memory.
///
/// Sign-ups are confirmed immediately.
#[derive(Debug)]
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, (String, AuthUser)>>,
    session: Mutex<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            events,
        }
    }
}

fn new_session(user: AuthUser) -> AuthSession {
    AuthSession {
        access_token: Id::new().to_string(),
        refresh_token: None,
        expires_at: None,
        user,
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, id: &str, email: &str, password: &str) -> Self {
        let user = AuthUser {
            id: id.into(),
            email: email.to_owned(),
            display_name: None,
            avatar_url: None,
        };
        self.accounts
            .lock()
            .insert(email.to_lowercase(), (password.to_owned(), user));
        self
    }

    fn start_session(&self, user: AuthUser) -> AuthSession {
        let session = new_session(user);
        *self.session.lock() = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
        session
    }
}

#[async_trait]
impl AuthGateway for MemoryAuth {
    async fn current_session(&self) -> auth::Result<Option<AuthSession>> {
        Ok(self.session.lock().clone())
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> auth::Result<AuthSession> {
        let user = {
            let accounts = self.accounts.lock();
            match accounts.get(&credentials.email.to_lowercase()) {
                Some((password, user)) if *password == credentials.password => user.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        Ok(self.start_session(user))
    }

    async fn sign_up(&self, credentials: &Credentials) -> auth::Result<Option<AuthSession>> {
        let email = credentials.email.trim().to_lowercase();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Service("Email and password are required".into()));
        }
        let user = {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(&email) {
                return Err(AuthError::UserExists);
            }
            let user = AuthUser {
                id: Id::new(),
                email: email.clone(),
                display_name: None,
                avatar_url: None,
            };
            accounts.insert(email, (credentials.password.clone(), user.clone()));
            user
        };
        Ok(Some(self.start_session(user)))
    }

    async fn sign_out(&self) -> auth::Result<()> {
        *self.session.lock() = None;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    fn authorize_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> auth::Result<Url> {
        let mut url =
            Url::parse("memory://auth/authorize").map_err(|err| AuthError::Other(err.into()))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str());
        if let Some(redirect_to) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect_to);
        }
        Ok(url)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
