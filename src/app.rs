use std::sync::Arc;

use anyhow::Context as _;
use tirtha_core::{
    catalog::Catalog,
    diagnostics::RecordingSink,
    gateways::{
        auth::AuthGateway,
        storage::{keys, KeyValueStorage, StorageError},
    },
    i18n::Translator,
    repositories::Backend,
    session::SessionStore,
};
use tirtha_gateways::{
    memory::{MemoryAuth, MemoryBackend},
    storage::JsonFileStorage,
    supabase::{SupabaseClient, SupabaseConfig},
};

use crate::config::{self, Config};

/// The application-scoped stores shared by all views.
pub struct App {
    pub storage: Arc<dyn KeyValueStorage>,
    pub translator: Translator,
    pub catalog: Catalog,
    pub session: SessionStore,
    pub diagnostics: Arc<RecordingSink>,
    pub map: config::Map,
}

impl App {
    pub fn try_new(cfg: &Config) -> anyhow::Result<Self> {
        let storage_file = &cfg.client.storage_file;
        if let Some(dir) = storage_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Unable to create {}", dir.display()))?;
        }
        let storage: Arc<dyn KeyValueStorage> = Arc::new(
            JsonFileStorage::try_new(storage_file)
                .with_context(|| format!("Unable to open {}", storage_file.display()))?,
        );
        let (backend, auth): (Arc<dyn Backend>, Arc<dyn AuthGateway>) = match &cfg.backend {
            config::Backend::Supabase { url, anon_key } => {
                let config = SupabaseConfig {
                    url: url.clone(),
                    anon_key: anon_key.clone(),
                };
                let client = Arc::new(SupabaseClient::try_new(config, Arc::clone(&storage))?);
                (client.clone() as Arc<dyn Backend>, client as Arc<dyn AuthGateway>)
            }
            config::Backend::Memory { fixture } => {
                let backend = match fixture {
                    Some(file) if file.exists() => MemoryBackend::load_fixture(file)?,
                    Some(file) => {
                        log::warn!("Fixture {} not found, starting empty", file.display());
                        MemoryBackend::new()
                    }
                    None => MemoryBackend::new(),
                };
                (
                    Arc::new(backend) as Arc<dyn Backend>,
                    Arc::new(MemoryAuth::new()) as Arc<dyn AuthGateway>,
                )
            }
        };
        Ok(Self::with_ports(cfg, storage, backend, auth))
    }

    pub fn with_ports(
        cfg: &Config,
        storage: Arc<dyn KeyValueStorage>,
        backend: Arc<dyn Backend>,
        auth: Arc<dyn AuthGateway>,
    ) -> Self {
        let diagnostics = Arc::new(RecordingSink::new(cfg.diagnostics.capacity));
        let translator = Translator::new(Arc::clone(&storage))
            .with_default_language(cfg.client.default_language);
        let catalog = Catalog::new(Arc::clone(&backend), diagnostics.clone(), cfg.cache.ttl);
        let session = SessionStore::new(auth, backend, diagnostics.clone());
        Self {
            storage,
            translator,
            catalog,
            session,
            diagnostics,
            map: cfg.map.clone(),
        }
    }

    /// Hydrate the persisted settings and restore the session.
    pub async fn start(&self) {
        let language = self.translator.hydrate();
        log::debug!("Active language: {language}");
        let (names, ()) = tokio::join!(self.catalog.languages(), self.session.init());
        self.translator.set_language_names(names.to_vec());
    }

    pub fn map_token(&self) -> Option<String> {
        match self.storage.get(keys::MAP_TOKEN) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(err) => {
                log::warn!("Unable to read the map token: {err}");
                None
            }
        }
    }

    pub fn set_map_token(&self, token: &str) -> Result<(), StorageError> {
        let token = token.trim();
        if token.is_empty() {
            self.storage.remove(keys::MAP_TOKEN)
        } else {
            self.storage.set(keys::MAP_TOKEN, token)
        }
    }
}
