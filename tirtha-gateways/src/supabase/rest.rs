use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::RequestBuilder;
use serde_json::Value;

use tirtha_core::repositories::{Backend, Error, Filter, Result, Select};

use super::{is_success, read_response, ApiError, SupabaseClient};

const NO_ROWS: &str = "PGRST116";
const UNIQUE_VIOLATION: &str = "23505";

// PostgREST expects quoted values in lists if
// they contain reserved characters.
fn list_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn filter_param(filter: &Filter) -> (&'static str, String) {
    match filter {
        Filter::Eq(column, value) => (*column, format!("eq.{value}")),
        Filter::In(column, values) => {
            let values = values.iter().map(|v| list_value(v)).collect::<Vec<_>>();
            (*column, format!("in.({})", values.join(",")))
        }
    }
}

fn encode_params(params: Vec<(&str, String)>) -> String {
    params
        .into_iter()
        .map(|(key, value)| [key, &utf8_percent_encode(&value, NON_ALPHANUMERIC).to_string()].join("="))
        .collect::<Vec<_>>()
        .join("&")
}

/// The PostgREST query string of a select.
pub fn query_string(query: &Select) -> String {
    let mut params = vec![];
    let columns = if query.columns.is_empty() {
        "*".to_owned()
    } else {
        query.columns.join(",")
    };
    params.push(("select", columns));
    params.extend(query.filters.iter().map(filter_param));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order", format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    encode_params(params)
}

fn filter_string(filters: &[Filter]) -> String {
    encode_params(filters.iter().map(filter_param).collect())
}

/// Map an error response of PostgREST.
pub(crate) fn rest_error(status: u16, body: &str) -> Error {
    let error = ApiError::parse(body);
    let code = error.code();
    match (status, code.as_deref()) {
        (_, Some(NO_ROWS)) => Error::NotFound,
        (_, Some(UNIQUE_VIOLATION)) => Error::AlreadyExists,
        (401 | 403, _) => Error::Unauthorized,
        (_, code) => Error::Backend {
            code: code.map_or_else(|| status.to_string(), ToOwned::to_owned),
            message: error.message(),
        },
    }
}

impl SupabaseClient {
    fn table_url(&self, table: &str, query: &str) -> Result<url::Url> {
        let mut url = self.rest_url.join(table).map_err(anyhow::Error::from)?;
        url.set_query((!query.is_empty()).then_some(query));
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder) -> Result<String> {
        let response = self
            .add_auth_headers(req)
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        let (status, body) = read_response(response)
            .await
            .map_err(anyhow::Error::from)?;
        if is_success(status) {
            Ok(body)
        } else {
            Err(rest_error(status, &body))
        }
    }
}

fn parse_json(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body).map_err(anyhow::Error::from)?)
}

fn into_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => vec![],
        row => vec![row],
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn select(&self, query: &Select) -> Result<Vec<Value>> {
        let url = self.table_url(query.table, &query_string(query))?;
        log::debug!("Selecting {url}");
        let body = self.send(self.http.get(url)).await?;
        Ok(into_rows(parse_json(&body)?))
    }

    async fn maybe_single(&self, query: &Select) -> Result<Option<Value>> {
        let query = query.clone().limit(1);
        let url = self.table_url(query.table, &query_string(&query))?;
        let req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.pgrst.object+json");
        match self.send(req).await {
            Ok(body) => Ok(Some(parse_json(&body)?).filter(|row| !row.is_null())),
            Err(Error::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn insert(&self, table: &'static str, row: Value) -> Result<()> {
        let url = self.table_url(table, "")?;
        let req = self
            .http
            .post(url)
            .header("Prefer", "return=minimal")
            .json(&row);
        self.send(req).await?;
        Ok(())
    }

    async fn delete(&self, table: &'static str, filters: &[Filter]) -> Result<usize> {
        if filters.is_empty() {
            return Err(anyhow::anyhow!("Refusing to delete all rows of {table}").into());
        }
        let url = self.table_url(table, &filter_string(filters))?;
        let req = self
            .http
            .delete(url)
            .header("Prefer", "return=representation");
        let body = self.send(req).await?;
        Ok(into_rows(parse_json(&body)?).len())
    }
}
