//! HTTP transport used by the Dolibarr client

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::dolibarr::error::ErpError;

/// Raw response: status code and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange; non-2xx statuses are responses, not errors
pub trait Transport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, ErpError>;

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<HttpResponse, ErpError>;
}

/// Blocking `reqwest` transport
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ErpError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("dolisales/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ErpError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<HttpResponse, ErpError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .map_err(|e| ErpError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ErpError::Network(e.to_string()))?;
        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse { status, body })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, ErpError> {
        debug!(%url, "GET");
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send(request)
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<HttpResponse, ErpError> {
        debug!(%url, "POST");
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send(request)
    }
}
