//! Remote timer boundary and its REST backend implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::json;
use tracing::debug;

use crate::{error::RemoteError, state::TimerRecord};

/// Read/write access to the backend timer resource.
///
/// Implementations do not retry; any failure surfaces as an error and never
/// as a record with defaulted fields.
#[async_trait]
pub trait RemoteTimerClient: Send + Sync {
    /// Look up the record for a logical valve name
    async fn fetch(&self, name: &str) -> Result<TimerRecord, RemoteError>;

    /// Set a record's end time, returning the record as stored by the server
    async fn set_end(&self, id: &str, end_epoch: i64) -> Result<TimerRecord, RemoteError>;
}

/// Client for the document-store REST backend
#[derive(Debug, Clone)]
pub struct RestDbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestDbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().use_rustls_tls().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .header("x-apikey", &self.api_key)
    }

    async fn read_body(response: Response) -> Result<String, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Transport(format!("backend returned {}: {}", status, body)));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RemoteTimerClient for RestDbClient {
    async fn fetch(&self, name: &str) -> Result<TimerRecord, RemoteError> {
        let query = json!({ "name": name }).to_string();
        debug!("Fetching timer record for {}", name);

        let response = self
            .with_headers(self.client.get(&self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;
        let body = Self::read_body(response).await?;

        first_record(&body)
    }

    async fn set_end(&self, id: &str, end_epoch: i64) -> Result<TimerRecord, RemoteError> {
        let url = format!("{}/{}", self.base_url, id);
        debug!("Setting end of {} to {}", id, end_epoch);

        let response = self
            .with_headers(self.client.patch(&url))
            .body(json!({ "end": end_epoch }).to_string())
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        debug!("Backend response: {}", body);

        Ok(serde_json::from_str(&body)?)
    }
}

/// Decode a name-filtered query result, which is a JSON array
fn first_record(body: &str) -> Result<TimerRecord, RemoteError> {
    let mut records: Vec<TimerRecord> = serde_json::from_str(body)?;
    if records.is_empty() {
        return Err(RemoteError::NotFound);
    }
    Ok(records.swap_remove(0))
}
