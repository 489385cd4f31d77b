//! Production transport backed by `reqwest` on a tokio runtime.
//!
//! Each `get` spawns one task onto the configured runtime. The task parks
//! until the handle is resumed, performs the GET, reads the whole body and
//! calls the response handler from the runtime's worker thread. No retries.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client as ReqwestClient;
use tokio::runtime::Handle;
use tracing::debug;

use crate::error::{ClientError, TransportError};
use crate::http::{HttpRequest, HttpResponse, RequestHandle, ResponseHandler, Transport};

/// Settings for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    timeout: Duration,
    user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("dog-api-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    /// Total time allowed for one request, body included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build a transport that runs its requests on `runtime`.
    pub fn build(self, runtime: Handle) -> Result<ReqwestTransport, ClientError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()
            .map_err(TransportError::from)?;
        Ok(ReqwestTransport { client, runtime })
    }
}

/// [`Transport`] that performs real HTTP requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    runtime: Handle,
}

impl ReqwestTransport {
    /// Transport with default settings on `runtime`.
    pub fn new(runtime: Handle) -> Result<Self, ClientError> {
        TransportConfig::default().build(runtime)
    }

    pub fn config() -> TransportConfig {
        TransportConfig::default()
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, request: HttpRequest, on_response: ResponseHandler) -> RequestHandle {
        let handle = RequestHandle::new(request.url.clone());
        let task_handle = handle.clone();
        let client = self.client.clone();
        self.runtime.spawn(async move {
            task_handle.started().await;
            let (payload, response, error) = execute(&client, &request).await;
            task_handle.mark_completed();
            on_response(payload, response, error);
        });
        handle
    }
}

async fn execute(
    client: &ReqwestClient,
    request: &HttpRequest,
) -> (Option<Bytes>, Option<HttpResponse>, Option<TransportError>) {
    let mut builder = client.get(request.url.clone());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    debug!(url = %request.url, "sending HTTP request");
    let response = match builder.send().await {
        Ok(response) => response,
        Err(err) => {
            debug!(url = %request.url, error = %err, "HTTP request failed");
            return (None, None, Some(err.into()));
        }
    };

    let metadata = HttpResponse {
        status: response.status().as_u16(),
        headers: response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect(),
    };
    debug!(url = %request.url, status = metadata.status, "received HTTP response");

    match response.bytes().await {
        Ok(body) => (Some(body), Some(metadata), None),
        Err(err) => {
            debug!(url = %request.url, error = %err, "failed to read response body");
            (None, Some(metadata), Some(err.into()))
        }
    }
}
