use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context as _, Result};
use tirtha_core::entities::Language;
use url::Url;

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "tirtha.toml";

const ENV_NAME_SUPABASE_URL: &str = "SUPABASE_URL";
const ENV_NAME_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const ENV_NAME_LANGUAGE: &str = "TIRTHA_LANGUAGE";

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub client: Client,
    pub cache: Cache,
    pub map: Map,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Supabase { url: Url, anon_key: String },
    /// Tables held in memory, optionally loaded from a JSON file.
    Memory { fixture: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct Client {
    pub storage_file: PathBuf,
    pub default_language: Language,
}

#[derive(Debug, Clone)]
pub struct Cache {
    /// Keep results until they are invalidated if `None`
    pub ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Map {
    pub zoom: f64,
    pub detail_zoom: f64,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub capacity: usize,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::debug!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });
        let raw_config: raw::Config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)
                .with_context(|| format!("Invalid configuration file {}", file_path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("{} not found => load default configuration.", file_path.display());
                raw::Config::default()
            }
            Err(err) => return Err(err.into()),
        };
        let raw_config = raw_config.or(raw::Config::embedded()?);
        let overrides = EnvOverrides {
            supabase_url: env::var(ENV_NAME_SUPABASE_URL).ok(),
            supabase_anon_key: env::var(ENV_NAME_SUPABASE_ANON_KEY).ok(),
            language: env::var(ENV_NAME_LANGUAGE).ok(),
        };
        Self::try_from(overrides.apply(raw_config))
    }
}

/// Settings taken from the environment.
#[derive(Debug, Default)]
struct EnvOverrides {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    language: Option<String>,
}

impl EnvOverrides {
    fn apply(self, mut cfg: raw::Config) -> raw::Config {
        let Self {
            supabase_url,
            supabase_anon_key,
            language,
        } = self;
        if supabase_url.is_some() || supabase_anon_key.is_some() {
            let backend = cfg.backend.get_or_insert_with(Default::default);
            backend.kind = Some(raw::BackendKind::Supabase);
            if supabase_url.is_some() {
                backend.url = supabase_url;
            }
            if supabase_anon_key.is_some() {
                backend.anon_key = supabase_anon_key;
            }
        }
        if language.is_some() {
            cfg.client.get_or_insert_with(Default::default).default_language = language;
        }
        cfg
    }
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            backend,
            client,
            cache,
            map,
            diagnostics,
        } = from;

        let raw::Backend {
            kind,
            url,
            anon_key,
            fixture,
        } = backend.unwrap_or_default();
        let backend = match kind.unwrap_or(raw::BackendKind::Memory) {
            raw::BackendKind::Supabase => {
                let url = url.ok_or_else(|| anyhow!("Missing URL of the Supabase project"))?;
                let url = Url::parse(&url)
                    .with_context(|| format!("Invalid URL of the Supabase project: {url}"))?;
                let anon_key =
                    anon_key.ok_or_else(|| anyhow!("Missing anon key of the Supabase project"))?;
                log::debug!("Use Supabase backend at {url}");
                Backend::Supabase { url, anon_key }
            }
            raw::BackendKind::Memory => {
                log::debug!("Use in-memory backend");
                Backend::Memory { fixture }
            }
        };

        let raw::Client {
            storage_file,
            default_language,
        } = client.unwrap_or_default();
        let storage_file =
            storage_file.ok_or_else(|| anyhow!("Missing client storage file"))?;
        let default_language = default_language
            .as_deref()
            .map(Language::parse_code)
            .transpose()?
            .unwrap_or_default();
        let client = Client {
            storage_file,
            default_language,
        };

        let raw::Cache { ttl } = cache.unwrap_or_default();
        let cache = Cache { ttl };

        let raw::Map { zoom, detail_zoom } = map.unwrap_or_default();
        let map = Map {
            zoom: zoom.ok_or_else(|| anyhow!("Missing map zoom"))?,
            detail_zoom: detail_zoom.ok_or_else(|| anyhow!("Missing map detail zoom"))?,
        };

        let raw::Diagnostics { capacity } = diagnostics.unwrap_or_default();
        let diagnostics = Diagnostics {
            capacity: capacity.unwrap_or(tirtha_core::diagnostics::RecordingSink::DEFAULT_CAPACITY),
        };

        Ok(Self {
            backend,
            client,
            cache,
            map,
            diagnostics,
        })
    }
}
