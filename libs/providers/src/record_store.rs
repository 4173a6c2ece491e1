use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use crate::error::{message_from_body, ProviderError};

const PROVIDER: &str = "record store";

/// Equality filter over table columns.
///
/// The record store only needs exact matches (voucher lookup by code), so
/// the filter is a flat list of `column = value` pairs.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push((column.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, String)] {
        &self.clauses
    }
}

/// Generic row access against the hosted database.
///
/// Only the contract the core needs: exact-match selects (voucher lookup)
/// and inserts (newsletter subscription). There is no update; redemption
/// accounting is owned elsewhere.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(
        &self,
        table: &str,
        filter: &Filter,
    ) -> Result<Vec<serde_json::Value>, ProviderError>;

    async fn insert(
        &self,
        table: &str,
        rows: Vec<serde_json::Value>,
    ) -> Result<(), ProviderError>;
}

/// Record store client speaking a PostgREST-style REST dialect:
/// `GET /rest/v1/{table}?{col}=eq.{value}` and `POST /rest/v1/{table}`.
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl HttpRecordStore {
    pub fn new(client: reqwest::Client, base_url: Url, api_key: SecretString) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn table_url(&self, table: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::decode(PROVIDER, "base URL cannot be a base"))?
            .extend(&["rest", "v1", table]);
        Ok(url)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    #[instrument(skip_all, fields(table = %table))]
    async fn select(
        &self,
        table: &str,
        filter: &Filter,
    ) -> Result<Vec<serde_json::Value>, ProviderError> {
        let mut url = self.table_url(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            for (column, value) in filter.clauses() {
                query.append_pair(column, &format!("eq.{value}"));
            }
        }

        let response = self
            .client
            .get(url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;
        if !status.is_success() {
            return Err(ProviderError::http(
                PROVIDER,
                status.as_u16(),
                message_from_body(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))
    }

    #[instrument(skip_all, fields(table = %table, rows = rows.len()))]
    async fn insert(
        &self,
        table: &str,
        rows: Vec<serde_json::Value>,
    ) -> Result<(), ProviderError> {
        let url = self.table_url(table)?;

        let response = self
            .client
            .post(url)
            .header("apikey", self.api_key.expose_secret())
            .header("Prefer", "return=minimal")
            .bearer_auth(self.api_key.expose_secret())
            .json(&rows)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ProviderError::transport(PROVIDER, e))?;
            return Err(ProviderError::http(
                PROVIDER,
                status.as_u16(),
                message_from_body(&body),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_collects_clauses_in_order() {
        let filter = Filter::new().eq("code", "SAVE20").eq("is_active", "true");
        assert_eq!(
            filter.clauses(),
            &[
                ("code".to_owned(), "SAVE20".to_owned()),
                ("is_active".to_owned(), "true".to_owned()),
            ]
        );
    }
}
