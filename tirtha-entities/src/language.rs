use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// The fixed set of supported display languages.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    Ru,
    Hi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Ru, Language::Hi];

    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Human readable name written in the language itself.
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ru => "Русский",
            Self::Hi => "हिन्दी",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported language '{0}'")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    pub fn parse_code(code: &str) -> Result<Self, UnsupportedLanguage> {
        code.trim()
            .parse()
            .map_err(|_| UnsupportedLanguage(code.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_codes() {
        assert_eq!(Language::parse_code("en").unwrap(), Language::En);
        assert_eq!(Language::parse_code("RU").unwrap(), Language::Ru);
        assert_eq!(Language::parse_code(" hi ").unwrap(), Language::Hi);
        assert!(Language::parse_code("de").is_err());
        assert!(Language::parse_code("").is_err());
    }

    #[test]
    fn format_language_codes() {
        assert_eq!(Language::Hi.code(), "hi");
        assert_eq!(Language::Ru.to_string(), "ru");
    }
}
