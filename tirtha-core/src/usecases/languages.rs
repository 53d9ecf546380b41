use super::prelude::*;
use tirtha_boundary::{Diagnostic, Issue, LanguageRow, RecordKind};

/// Human readable name of a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageName {
    pub language: Language,
    pub name: String,
}

/// The built-in names used if the backend has none.
pub fn fallback_language_names() -> Vec<LanguageName> {
    Language::ALL
        .into_iter()
        .map(|language| LanguageName {
            language,
            name: language.native_name().to_owned(),
        })
        .collect()
}

/// Names of all supported languages.
///
/// Rows of unsupported languages are ignored and languages
/// without a row get their built-in name.
pub async fn fetch_languages(db: &dyn Backend, sink: &dyn DiagnosticsSink) -> Vec<LanguageName> {
    let rows = select_rows(db, &Select::table(tables::LANGUAGES)).await;
    let mut names = fallback_language_names();
    for value in rows {
        let Some(row) = decode::<LanguageRow>(sink, RecordKind::Language, value) else {
            continue;
        };
        let Ok(language) = Language::parse_code(&row.code) else {
            sink.report(Diagnostic {
                record: RecordKind::Language,
                id: Some(row.code.clone()),
                field: "code",
                issue: Issue::Unparseable(row.code),
            });
            continue;
        };
        let name = row
            .native_name
            .or(row.name)
            .filter(|name| !name.trim().is_empty());
        if let (Some(name), Some(entry)) = (name, names.iter_mut().find(|n| n.language == language))
        {
            entry.name = name;
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::tests::*;
    use serde_json::json;

    #[tokio::test]
    async fn fall_back_to_built_in_names() {
        let db = MockBackend::new();
        db.fail(tables::LANGUAGES);
        assert_eq!(fetch_languages(&db, &sink()).await, fallback_language_names());
    }

    #[tokio::test]
    async fn merge_backend_names() {
        let db = MockBackend::new().with(
            tables::LANGUAGES,
            vec![
                json!({ "code": "ru", "name": "Russian", "native_name": "Русский язык" }),
                json!({ "code": "de", "name": "German" }),
                json!({ "code": "hi", "name": "" }),
            ],
        );
        let sink = sink();
        let names = fetch_languages(&db, &sink).await;
        assert_eq!(names.len(), 3);
        assert_eq!(names[0].name, "English");
        assert_eq!(names[1].name, "Русский язык");
        assert_eq!(names[2].name, "हिन्दी");
        assert_eq!(sink.len(), 1);
    }
}
