use crate::language::Language;

/// A text available in every supported language.
///
/// The constructors guarantee that no language is missing:
/// gaps are always filled with a fallback before a value
/// of this type can be created.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    en : String,
    ru : String,
    hi : String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ru: impl Into<String>, hi: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ru: ru.into(),
            hi: hi.into(),
        }
    }

    /// Take the text for each language from `lookup` and
    /// fill the remaining ones from `fallback`.
    pub fn fill_from<F>(mut lookup: F, fallback: &LocalizedText) -> Self
    where
        F: FnMut(Language) -> Option<String>,
    {
        let mut pick = |lang| {
            lookup(lang)
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| fallback.get(lang).to_owned())
        };
        Self {
            en: pick(Language::En),
            ru: pick(Language::Ru),
            hi: pick(Language::Hi),
        }
    }

    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Ru => &self.ru,
            Language::Hi => &self.hi,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
        Language::ALL.into_iter().map(|lang| (lang, self.get(lang)))
    }

    /// Case-insensitive substring match in any language.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.iter()
            .any(|(_, text)| text.to_lowercase().contains(&needle))
    }
}
