// Async HTTP engine for csrfprobe
// Uses reqwest and tokio; every phase talks to the target through `Requester`

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::RequestConfig;
use crate::errors::{AuditError, AuditResult};
use crate::models::HttpReply;

/// Sends one request and returns its status and body.
///
/// GET requests carry `params` in the query string, anything else sends them
/// as a urlencoded form. Transport failures are fatal to the caller.
#[async_trait]
pub trait Requester: Send + Sync {
    async fn request(
        &self,
        url: &str,
        params: &HashMap<String, String>,
        config: &RequestConfig,
        is_get: bool,
    ) -> AuditResult<HttpReply>;
}

pub struct HttpEngine {
    pub client: Client,
}

impl HttpEngine {
    pub fn new() -> AuditResult<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Requester for HttpEngine {
    async fn request(
        &self,
        url: &str,
        params: &HashMap<String, String>,
        config: &RequestConfig,
        is_get: bool,
    ) -> AuditResult<HttpReply> {
        if !config.delay.is_zero() {
            tokio::time::sleep(config.delay).await;
        }

        let mut req = if is_get {
            self.client.get(url).query(params)
        } else {
            self.client.post(url).form(params)
        };
        for (name, value) in &config.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        req = req.timeout(config.timeout);

        debug!(url, is_get, params = params.len(), "sending request");
        let resp = req.send().await.map_err(|e| AuditError::transport(url, e))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| AuditError::transport(url, e))?;
        debug!(url, status, length = body.len(), "response received");

        Ok(HttpReply { status, body })
    }
}
