// Low-level access to the hosted backend.
// The backend is a relational store that is addressed by table
// name and returns loosely typed JSON rows. Rows are decoded and
// normalized by the use cases, never by the backend adapters.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error("The object already exists")]
    AlreadyExists,
    #[error("This is not allowed without auth")]
    Unauthorized,
    #[error("Backend error {code}: {message}")]
    Backend { code: String, message: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(&'static str, String),
    In(&'static str, Vec<String>),
}

impl Filter {
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Eq(column, _) | Self::In(column, _) => *column,
        }
    }

    /// Evaluate the filter against a JSON row.
    ///
    /// Values are compared by their textual representation,
    /// i.e. the number `5` equals the text `"5"`.
    pub fn matches(&self, row: &Value) -> bool {
        let Some(value) = row.get(self.column()).and_then(value_to_key) else {
            return false;
        };
        match self {
            Self::Eq(_, expected) => value == *expected,
            Self::In(_, candidates) => candidates.iter().any(|c| *c == value),
        }
    }
}

/// Textual representation of a scalar JSON value.
pub fn value_to_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

/// A read query against a single table.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table   : &'static str,
    /// All columns if empty
    pub columns : Vec<&'static str>,
    pub filters : Vec<Filter>,
    pub order   : Option<Order>,
    pub limit   : Option<usize>,
}

impl Select {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            columns: vec![],
            filters: vec![],
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn any_of<I, S>(mut self, column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .push(Filter::In(column, values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn order_by(mut self, column: &'static str, ascending: bool) -> Self {
        self.order = Some(Order { column, ascending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether the query can never match any row,
    /// e.g. an `IN` filter with an empty list.
    pub fn is_void(&self) -> bool {
        self.filters
            .iter()
            .any(|f| matches!(f, Filter::In(_, values) if values.is_empty()))
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Run the query on in-memory rows.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
        let mut selected: Vec<_> = rows.into_iter().filter(|row| self.matches(row)).collect();
        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let ord = compare_values(a.get(order.column), b.get(order.column));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        selected
            .into_iter()
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|row| self.project(row))
            .collect()
    }

    fn project(&self, row: &Value) -> Value {
        match row {
            Value::Object(object) if !self.columns.is_empty() => Value::Object(
                object
                    .iter()
                    .filter(|(key, _)| self.columns.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            _ => row.clone(),
        }
    }
}

// Missing values are sorted last
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => value_to_key(a).cmp(&value_to_key(b)),
        },
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, query: &Select) -> Result<Vec<Value>>;

    /// Zero-or-one fetch.
    async fn maybe_single(&self, query: &Select) -> Result<Option<Value>> {
        let query = query.clone().limit(1);
        Ok(self.select(&query).await?.into_iter().next())
    }

    /// Insert a single row.
    ///
    /// Violations of unique constraints are reported as [`Error::AlreadyExists`].
    async fn insert(&self, table: &'static str, row: Value) -> Result<()>;

    /// Delete all matching rows and return how many were deleted.
    async fn delete(&self, table: &'static str, filters: &[Filter]) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_compare_textual_representation() {
        let row = json!({ "id": 5, "city_id": "c1" });
        assert!(Filter::Eq("id", "5".into()).matches(&row));
        assert!(Filter::In("city_id", vec!["c0".into(), "c1".into()]).matches(&row));
        assert!(!Filter::Eq("missing", "5".into()).matches(&row));
        assert!(!Filter::In("id", vec![]).matches(&row));
    }

    #[test]
    fn apply_order_limit_and_projection() {
        let rows = vec![
            json!({ "id": "a", "position": 2, "x": 1 }),
            json!({ "id": "b", "position": null }),
            json!({ "id": "c", "position": 1 }),
        ];
        let query = Select::table("t")
            .columns(&["id"])
            .order_by("position", true)
            .limit(2);
        assert_eq!(query.apply(&rows), vec![json!({ "id": "c" }), json!({ "id": "a" })]);
    }

    #[test]
    fn empty_in_list_is_void() {
        assert!(Select::table("t").any_of("id", Vec::<String>::new()).is_void());
        assert!(!Select::table("t").eq("id", "1").is_void());
    }
}
