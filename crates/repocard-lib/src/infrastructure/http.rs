use std::time::Duration;
use thiserror::Error;

use crate::domain::{HttpRequest, HttpResponse, Transport, TransportError};

const USER_AGENT: &str = "repocard-cli";

/// Timeout applied to the whole request when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when setting up the HTTP transport
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to create HTTP client")]
    ClientInit(#[source] reqwest::Error),
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ClientInit`] if the TLS backend cannot be initialized, or the
    /// resolver cannot load the system configuration.
    ///
    /// # Panics
    ///
    /// This method panics if called from within an async runtime. See docs on
    /// `reqwest::blocking` for details.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(HttpError::ClientInit)?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    #[must_use]
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .post(request.url.clone())
            .body(request.body.clone());

        for header in &request.headers {
            builder = builder.header(header.key(), header.value());
        }

        let response = builder
            .send()
            .map_err(|e| TransportError::Send(Box::new(e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportError::Body(Box::new(e)))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
