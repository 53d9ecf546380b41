use std::fmt;

use tirtha_core::{
    gateways::{auth::AuthError, storage::StorageError},
    i18n::Translator,
    session::{FavoriteOutcome, SessionError, SignUpOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A transient message shown after a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    /// Dictionary key of the message
    pub key: &'static str,
    /// Untranslated detail, e.g. the message of a backend error
    pub detail: Option<String>,
}

impl Notice {
    pub const fn info(key: &'static str) -> Self {
        Self {
            level: Level::Info,
            key,
            detail: None,
        }
    }

    pub const fn success(key: &'static str) -> Self {
        Self {
            level: Level::Success,
            key,
            detail: None,
        }
    }

    pub const fn error(key: &'static str) -> Self {
        Self {
            level: Level::Error,
            key,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn favorite(result: &Result<FavoriteOutcome, SessionError>) -> Self {
        match result {
            Ok(FavoriteOutcome::Added) => Self::success("favorites.added"),
            Ok(FavoriteOutcome::AlreadyFavorite) => Self::info("favorites.already"),
            Ok(FavoriteOutcome::Removed) => Self::success("favorites.removed"),
            Ok(FavoriteOutcome::NotFavorite) => Self::info("favorites.not_favorite"),
            Err(SessionError::NotAuthenticated) => Self::info("favorites.sign_in_required"),
            Err(err) => Self::error("favorites.error").with_detail(err.to_string()),
        }
    }

    pub fn sign_in(result: &Result<(), SessionError>) -> Self {
        match result {
            Ok(()) => Self::success("auth.signed_in"),
            Err(err) => Self::auth_error(err),
        }
    }

    pub fn sign_up(result: &Result<SignUpOutcome, SessionError>) -> Self {
        match result {
            Ok(SignUpOutcome::SignedIn) => Self::success("auth.signed_in"),
            Ok(SignUpOutcome::ConfirmationRequired) => Self::info("auth.confirmation_sent"),
            Err(err) => Self::auth_error(err),
        }
    }

    pub fn sign_out(result: &Result<(), SessionError>) -> Self {
        match result {
            Ok(()) => Self::success("auth.signed_out"),
            Err(err) => Self::auth_error(err),
        }
    }

    pub fn map_token(result: &Result<(), StorageError>) -> Self {
        match result {
            Ok(()) => Self::success("map.token_saved"),
            Err(err) => Self::error("settings.error").with_detail(err.to_string()),
        }
    }

    fn auth_error(err: &SessionError) -> Self {
        match err {
            SessionError::Auth(AuthError::InvalidCredentials) => {
                Self::error("auth.invalid_credentials")
            }
            SessionError::Auth(AuthError::UserExists) => Self::error("auth.user_exists"),
            SessionError::Auth(AuthError::EmailNotConfirmed) => {
                Self::error("auth.email_not_confirmed")
            }
            err => Self::error("auth.error").with_detail(err.to_string()),
        }
    }

    /// The message in the active language.
    pub fn text(&self, tr: &Translator) -> String {
        let message = tr.t(self.key);
        match &self.detail {
            Some(detail) => format!("{message} ({detail})"),
            None => message.to_owned(),
        }
    }

    pub fn display<'a>(&'a self, tr: &'a Translator) -> impl fmt::Display + 'a {
        DisplayNotice { notice: self, tr }
    }
}

struct DisplayNotice<'a> {
    notice: &'a Notice,
    tr: &'a Translator,
}

impl fmt::Display for DisplayNotice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = match self.notice.level {
            Level::Info => "ℹ",
            Level::Success => "✓",
            Level::Error => "✗",
        };
        write!(f, "{marker} {}", self.notice.text(self.tr))
    }
}
