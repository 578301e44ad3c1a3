//! Async HTTP client wrapping the radar JSON API.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Connection settings for the radar API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

#[derive(Debug, Error)]
pub enum ClientError {
  /// The server could not be reached or asked us to come back later.
  #[error("server unavailable: {0}")]
  Transient(String),

  #[error("request rejected ({status}): {body}")]
  Rejected { status: StatusCode, body: String },

  #[error("unexpected response: {0}")]
  Decode(String),
}

impl ClientError {
  pub fn is_transient(&self) -> bool { matches!(self, Self::Transient(_)) }
}

/// Statuses worth retrying: the request may succeed unchanged later.
pub fn is_transient_status(status: StatusCode) -> bool {
  matches!(
    status,
    StatusCode::REQUEST_TIMEOUT
      | StatusCode::TOO_MANY_REQUESTS
      | StatusCode::BAD_GATEWAY
      | StatusCode::SERVICE_UNAVAILABLE
      | StatusCode::GATEWAY_TIMEOUT
  )
}

/// Async HTTP client for the radar JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn execute(&self, req: reqwest::RequestBuilder) -> Result<String, ClientError> {
    let resp = req
      .send()
      .await
      .map_err(|e| ClientError::Transient(e.to_string()))?;

    let status = resp.status();
    let body = resp
      .text()
      .await
      .map_err(|e| ClientError::Transient(e.to_string()))?;

    if status.is_success() {
      return Ok(body);
    }
    tracing::debug!(%status, %body, "request failed");
    if is_transient_status(status) {
      Err(ClientError::Transient(format!("{status}: {body}")))
    } else {
      Err(ClientError::Rejected { status, body })
    }
  }

  /// `GET /api{path}` returning the raw JSON body, for callers that cache it.
  pub async fn get_raw(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<String, ClientError> {
    self.execute(self.client.get(self.url(path)).query(query)).await
  }

  /// Send `body` (if any) with `method` and decode the JSON response.
  pub async fn send<B, T>(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
    body: Option<&B>,
  ) -> Result<T, ClientError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let mut req = self.client.request(method, self.url(path)).query(query);
    if let Some(body) = body {
      req = req.json(body);
    }
    let raw = self.execute(req).await?;
    decode(&raw)
  }
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, ClientError> {
  serde_json::from_str(raw).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn busy_statuses_are_transient() {
    assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
    assert!(is_transient_status(StatusCode::REQUEST_TIMEOUT));
    assert!(!is_transient_status(StatusCode::UNPROCESSABLE_ENTITY));
    assert!(!is_transient_status(StatusCode::CONFLICT));
  }

  #[test]
  fn url_joins_base_and_path() {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://localhost:8080/".into(),
      timeout:  Duration::from_secs(1),
    })
    .unwrap();
    assert_eq!(client.url("/bands"), "http://localhost:8080/api/bands");
  }

  #[test]
  fn decode_reports_bad_json() {
    assert!(matches!(decode::<Vec<u8>>("{"), Err(ClientError::Decode(_))));
  }
}
