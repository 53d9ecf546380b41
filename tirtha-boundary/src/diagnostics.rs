use std::fmt;

use thiserror::Error;

/// The kind of record a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    City,
    Spot,
    Route,
    Event,
    Profile,
    Favorite,
    Relation,
    Language,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::City => "city",
            Self::Spot => "spot",
            Self::Route => "route",
            Self::Event => "event",
            Self::Profile => "profile",
            Self::Favorite => "favorite",
            Self::Relation => "relation",
            Self::Language => "language",
        };
        f.write_str(s)
    }
}

/// What was wrong with a field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Issue {
    #[error("missing")]
    Missing,
    #[error("unparseable: {0}")]
    Unparseable(String),
    #[error("missing translations for {}", .0.join(","))]
    MissingTranslations(Vec<&'static str>),
    #[error("dropped {0} non-text media entries")]
    DroppedMediaEntries(usize),
    #[error("no resolvable coordinates")]
    UnresolvedCoordinates,
    #[error("unknown type code '{0}'")]
    UnknownTypeCode(String),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("invalid number")]
    InvalidNumber,
    #[error("malformed row: {0}")]
    MalformedRow(String),
}

/// A structured report about degraded upstream data.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub record: RecordKind,
    pub id: Option<String>,
    pub field: &'static str,
    pub issue: Issue,
}

impl Diagnostic {
    /// Whether the issue made a value fall back to a default entirely.
    pub fn is_fallback(&self) -> bool {
        !matches!(self.issue, Issue::MissingTranslations(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} {id}: {}: {}", self.record, self.field, self.issue),
            None => write!(f, "{}: {}: {}", self.record, self.field, self.issue),
        }
    }
}

/// The result of normalizing a raw row.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed<T> {
    pub entity: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Transformed<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Transformed<U> {
        Transformed {
            entity: f(self.entity),
            diagnostics: self.diagnostics,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
