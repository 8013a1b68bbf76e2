//! Reqwest-backed data store adapter.
//!
//! Speaks the hosted store's REST dialect: every node is addressable as
//! `GET|PUT|POST|DELETE {base}/{path}.json`, with `orderBy`/`equalTo` query
//! parameters for server-side child filters. Filter values are JSON-encoded
//! before being placed in the query string.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use super::dto::PushResponseDto;
use crate::domain::ports::{DataStore, DataStoreError};

/// How much of an error body is kept in the mapped message.
const ERROR_BODY_SNIPPET_LEN: usize = 200;

/// Data store adapter performing HTTP requests against one base URL.
pub struct RestDataStore {
    client: Client,
    base: Url,
}

impl RestDataStore {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: ensure_trailing_slash(base),
        })
    }

    fn node_url(&self, path: &str) -> Result<Url, DataStoreError> {
        node_url(&self.base, path)
    }

    async fn decode_read(response: reqwest::Response) -> Result<Option<Value>, DataStoreError> {
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let value: Value = serde_json::from_slice(body.as_ref())
            .map_err(|err| DataStoreError::decode(err.to_string()))?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), DataStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, DataStoreError> {
        let url = self.node_url(path)?;
        let response = self.client.get(url).send().await.map_err(map_transport_error)?;
        Self::decode_read(response).await
    }

    async fn read_matching(
        &self,
        path: &str,
        child_field: &str,
        value: &str,
    ) -> Result<Option<Value>, DataStoreError> {
        let mut url = self.node_url(path)?;
        append_filter(&mut url, child_field, value);
        let response = self.client.get(url).send().await.map_err(map_transport_error)?;
        Self::decode_read(response).await
    }

    async fn push(&self, path: &str, record: Value) -> Result<String, DataStoreError> {
        let url = self.node_url(path)?;
        let response = self
            .client
            .post(url)
            .json(&record)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let dto: PushResponseDto = serde_json::from_slice(body.as_ref())
            .map_err(|err| DataStoreError::decode(err.to_string()))?;
        Ok(dto.name)
    }

    async fn write(&self, path: &str, record: Value) -> Result<(), DataStoreError> {
        let url = self.node_url(path)?;
        let response = self
            .client
            .put(url)
            .json(&record)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::expect_success(response).await
    }

    async fn remove(&self, path: &str) -> Result<(), DataStoreError> {
        let url = self.node_url(path)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::expect_success(response).await
    }
}

fn ensure_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn node_url(base: &Url, path: &str) -> Result<Url, DataStoreError> {
    base.join(&format!("{path}.json"))
        .map_err(|err| DataStoreError::transport(format!("invalid store path {path:?}: {err}")))
}

/// Append an `orderBy`/`equalTo` child filter; values are JSON-encoded as
/// the store's query grammar requires.
fn append_filter(url: &mut Url, child_field: &str, value: &str) {
    url.query_pairs_mut()
        .append_pair("orderBy", &format!("\"{child_field}\""))
        .append_pair("equalTo", &format!("\"{value}\""));
}

fn map_transport_error(err: reqwest::Error) -> DataStoreError {
    DataStoreError::transport(err.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DataStoreError {
    let text = String::from_utf8_lossy(body);
    let snippet: String = text.trim().chars().take(ERROR_BODY_SNIPPET_LEN).collect();
    DataStoreError::status(status.as_u16(), snippet)
}
