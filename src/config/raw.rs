use std::{path::PathBuf, time::Duration};

use duration_str::deserialize_option_duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = include_str!("tirtha.default.toml");

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub backend: Option<Backend>,
    pub client: Option<Client>,
    pub cache: Option<Cache>,
    pub map: Option<Map>,
    pub diagnostics: Option<Diagnostics>,
}

impl Config {
    pub fn embedded() -> Result<Self, toml::de::Error> {
        toml::from_str(DEFAULT_CONFIG_FILE)
    }

    /// Complete missing settings from `defaults`.
    pub fn or(self, defaults: Self) -> Self {
        Self {
            backend: merge(self.backend, defaults.backend, Backend::or),
            client: merge(self.client, defaults.client, Client::or),
            cache: merge(self.cache, defaults.cache, Cache::or),
            map: merge(self.map, defaults.map, Map::or),
            diagnostics: merge(self.diagnostics, defaults.diagnostics, Diagnostics::or),
        }
    }
}

fn merge<T>(value: Option<T>, default: Option<T>, or: fn(T, T) -> T) -> Option<T> {
    match (value, default) {
        (Some(value), Some(default)) => Some(or(value, default)),
        (value, default) => value.or(default),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Supabase,
    Memory,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Backend {
    pub kind: Option<BackendKind>,
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub fixture: Option<PathBuf>,
}

impl Backend {
    fn or(self, defaults: Self) -> Self {
        Self {
            kind: self.kind.or(defaults.kind),
            url: self.url.or(defaults.url),
            anon_key: self.anon_key.or(defaults.anon_key),
            fixture: self.fixture.or(defaults.fixture),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Client {
    pub storage_file: Option<PathBuf>,
    pub default_language: Option<String>,
}

impl Client {
    fn or(self, defaults: Self) -> Self {
        Self {
            storage_file: self.storage_file.or(defaults.storage_file),
            default_language: self.default_language.or(defaults.default_language),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cache {
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub ttl: Option<Duration>,
}

impl Cache {
    fn or(self, defaults: Self) -> Self {
        Self {
            ttl: self.ttl.or(defaults.ttl),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Map {
    pub zoom: Option<f64>,
    pub detail_zoom: Option<f64>,
}

impl Map {
    fn or(self, defaults: Self) -> Self {
        Self {
            zoom: self.zoom.or(defaults.zoom),
            detail_zoom: self.detail_zoom.or(defaults.detail_zoom),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Diagnostics {
    pub capacity: Option<usize>,
}

impl Diagnostics {
    fn or(self, defaults: Self) -> Self {
        Self {
            capacity: self.capacity.or(defaults.capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_embedded_defaults() {
        let cfg = Config::embedded().unwrap();
        let backend = cfg.backend.unwrap();
        assert_eq!(backend.kind, Some(BackendKind::Memory));
        assert!(backend.url.is_none());
        assert_eq!(cfg.cache.unwrap().ttl, Some(Duration::from_secs(300)));
    }

    #[test]
    fn complete_partial_files() {
        let file: Config = toml::from_str(
            r#"
            [backend]
            kind = "supabase"
            url = "https://example.supabase.co"

            [cache]
            ttl = "30s"
            "#,
        )
        .unwrap();
        let cfg = file.or(Config::embedded().unwrap());
        let backend = cfg.backend.unwrap();
        assert_eq!(backend.kind, Some(BackendKind::Supabase));
        assert_eq!(backend.fixture, Some(PathBuf::from("demos/fixture.json")));
        assert_eq!(cfg.cache.unwrap().ttl, Some(Duration::from_secs(30)));
        assert_eq!(cfg.client.unwrap().default_language.as_deref(), Some("en"));
    }
}
