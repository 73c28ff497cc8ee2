//! PostgREST-style HTTP data store

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::{DataStore, Query};
use crate::http::HttpClient;
use crate::{ClientError, ClientResult};

/// Data store over the backend's REST API (`/rest/v1/<table>`)
#[derive(Debug, Clone)]
pub struct RestStore {
    http: HttpClient,
    rest_url: String,
}

impl RestStore {
    pub fn new(http: HttpClient) -> Self {
        let rest_url = http.config().rest_url();
        Self { http, rest_url }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }
}

/// Total from a `Content-Range: 0-24/3573` (or `*/0`) header
fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> ClientResult<Vec<Value>> {
        let request = self
            .http
            .request(Method::GET, &self.table_url(table))
            .query(&[("select", "*")])
            .query(&query.to_params());
        self.http.send_json(request).await
    }

    async fn select_one(&self, table: &str, query: &Query) -> ClientResult<Option<Value>> {
        let query = query.clone().limit(2);
        let mut rows = self.select(table, &query).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => Err(ClientError::InvalidResponse(format!(
                "expected at most one row from {table}"
            ))),
        }
    }

    async fn insert(&self, table: &str, row: Value) -> ClientResult<Value> {
        let request = self
            .http
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let mut rows: Vec<Value> = self.http.send_json(request).await?;
        rows.pop()
            .ok_or_else(|| ClientError::InvalidResponse(format!("insert into {table} returned no row")))
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> ClientResult<Vec<Value>> {
        if query.filters.is_empty() {
            return Err(ClientError::Validation(format!(
                "refusing to update every row of {table}"
            )));
        }
        let request = self
            .http
            .request(Method::PATCH, &self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&query.to_params())
            .json(&patch);
        self.http.send_json(request).await
    }

    async fn delete(&self, table: &str, query: &Query) -> ClientResult<u64> {
        if query.filters.is_empty() {
            return Err(ClientError::Validation(format!(
                "refusing to delete every row of {table}"
            )));
        }
        let request = self
            .http
            .request(Method::DELETE, &self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&query.to_params());
        let rows: Vec<Value> = self.http.send_json(request).await?;
        Ok(rows.len() as u64)
    }

    async fn count(&self, table: &str, query: &Query) -> ClientResult<u64> {
        let request = self
            .http
            .request(Method::HEAD, &self.table_url(table))
            .header("Prefer", "count=exact")
            .query(&[("select", "*")])
            .query(&query.to_params());
        let response = self.http.send(request).await?;
        response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| ClientError::InvalidResponse("missing Content-Range total".into()))
    }

    async fn rpc(&self, function: &str, args: Value) -> ClientResult<Value> {
        let url = format!("{}/rpc/{}", self.rest_url, function);
        let request = self.http.request(Method::POST, &url).json(&args);
        self.http.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
    }
}
