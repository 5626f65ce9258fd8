use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::protocol::{
    ActionResult, ActionizerRequest, ActionizerResponse, DeviceBatch, WireProtocol,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::ActionSender;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid actionizer endpoint '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        source: url::ParseError,
    },
    #[error("actionizer request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the actionizer endpoint.
///
/// Holds no per-request state: every call is one independent POST carrying
/// its full action list.
#[derive(Debug, Clone)]
pub struct ActionizerClient {
    http: Client,
    endpoint: Url,
    protocol: WireProtocol,
}

impl ActionizerClient {
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint).map_err(|source| ClientError::InvalidEndpoint {
            url: endpoint.to_string(),
            source,
        })?;

        Ok(Self {
            http: Client::new(),
            endpoint,
            protocol: WireProtocol::default(),
        })
    }

    pub fn with_protocol(mut self, protocol: WireProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn protocol(&self) -> WireProtocol {
        self.protocol
    }

    /// Sends one device or a list of devices in a single request.
    ///
    /// An empty list resolves to an empty result list without touching the
    /// network. Statuses other than 200/202 become `{ errorCode }` and the
    /// body is left unread. Transport and decode failures are returned as
    /// errors.
    pub async fn send(
        &self,
        devices: impl Into<DeviceBatch>,
    ) -> Result<ActionizerResponse, ClientError> {
        let devices = devices.into().into_inner();
        if devices.is_empty() {
            return Ok(ActionizerResponse::empty());
        }

        let body = ActionizerRequest::encode(self.protocol, devices);
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !is_success_status(status) {
            warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "actionizer rejected request"
            );
            return Ok(ActionizerResponse::error(status.as_u16()));
        }

        let results: Vec<ActionResult> = response.json().await?;
        debug!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            results = results.len(),
            "actionizer accepted request"
        );
        Ok(ActionizerResponse::Success(results))
    }
}

pub fn is_success_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::ACCEPTED
}

#[async_trait]
impl ActionSender for ActionizerClient {
    async fn send_actions(&self, devices: DeviceBatch) -> Result<ActionizerResponse, ClientError> {
        self.send(devices).await
    }
}

#[cfg(test)]
#[path = "tests/actionizer_tests.rs"]
mod tests;
