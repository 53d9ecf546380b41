//! Translation of user interface strings.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    entities::{Language, LocalizedText},
    gateways::storage::{keys, KeyValueStorage, StorageError},
    usecases::{fallback_language_names, LanguageName},
};

mod dictionary;

pub use self::dictionary::KEYS;

/// Look up a key in the built-in dictionary of a language.
pub fn lookup(lang: Language, key: &str) -> Option<&'static str> {
    dictionary::DICTIONARIES
        .get(&lang)
        .and_then(|dict| dict.get(key))
        .copied()
}

#[derive(Debug)]
struct State {
    language: Language,
    names: Vec<LanguageName>,
}

/// Application-scoped store of the active language.
pub struct Translator {
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<State>,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl Translator {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(State {
                language: Language::default(),
                names: fallback_language_names(),
            }),
        }
    }

    /// The language used until another one is persisted.
    pub fn with_default_language(mut self, language: Language) -> Self {
        self.state.get_mut().language = language;
        self
    }

    /// Restore the persisted language.
    ///
    /// Invalid or unreadable values are ignored.
    pub fn hydrate(&self) -> Language {
        match self.storage.get(keys::LANGUAGE) {
            Ok(Some(code)) => match Language::parse_code(&code) {
                Ok(language) => {
                    log::debug!("Restored language {language}");
                    self.state.write().language = language;
                }
                Err(err) => log::warn!("Ignoring persisted language: {err}"),
            },
            Ok(None) => {}
            Err(err) => log::warn!("Unable to read the persisted language: {err}"),
        }
        self.language()
    }

    pub fn language(&self) -> Language {
        self.state.read().language
    }

    /// Activate and persist a language.
    ///
    /// The language stays active even if it could not be persisted.
    pub fn set_language(&self, language: Language) -> Result<(), StorageError> {
        self.state.write().language = language;
        self.storage.set(keys::LANGUAGE, language.code())
    }

    /// The string of `key` in the active language or the key itself.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        lookup(self.language(), key).unwrap_or(key)
    }

    pub fn localize<'a>(&self, text: &'a LocalizedText) -> &'a str {
        text.get(self.language())
    }

    pub fn set_language_names(&self, names: Vec<LanguageName>) {
        self.state.write().names = names;
    }

    pub fn language_names(&self) -> Vec<LanguageName> {
        self.state.read().names.clone()
    }

    pub fn language_name(&self, language: Language) -> String {
        self.state
            .read()
            .names
            .iter()
            .find(|n| n.language == language)
            .map_or_else(|| language.native_name().to_owned(), |n| n.name.clone())
    }
}
