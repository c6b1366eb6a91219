use log::{debug, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error carried by [`TransportError`].
pub type BoxError = Box<dyn StdError + Send + Sync>;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A header attached to an outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    key: String,
    value: String,
}

impl RequestHeader {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn content_type(value: impl Into<String>) -> Self {
        Self::new(CONTENT_TYPE, value)
    }

    #[must_use]
    pub fn json_content_type() -> Self {
        Self::content_type(JSON_CONTENT_TYPE)
    }

    /// Bearer token header. An empty token gives an empty value, which
    /// [`dispatch`] rejects before sending.
    #[must_use]
    pub fn authorization(token: &str) -> Self {
        if token.is_empty() {
            return Self::new(AUTHORIZATION, "");
        }
        Self::new(AUTHORIZATION, format!("bearer {token}"))
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Who is to blame for a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorOrigin {
    /// The request could not be built, or the response could not be understood.
    Caller,
    /// Github answered with an error status.
    Github,
    /// The request never got an answer.
    Unknown,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Caller => "caller",
            Self::Github => "github",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classified failure of a single GraphQL call
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{origin} error: {message}")]
pub struct ErrorData {
    #[serde(rename = "source")]
    pub origin: ErrorOrigin,
    pub message: String,
    #[serde(rename = "documentation_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ErrorData {
    pub const INVALID_QUERY_DATA: &'static str = "invalid query data";
    pub const INVALID_ENDPOINT: &'static str = "couldn't parse endpoint";
    pub const INVALID_RESPONSE: &'static str = "couldn't parse response";
    pub const EMPTY_KEY: &'static str = "empty key";
    pub const EMPTY_VALUE: &'static str = "empty value";

    #[must_use]
    pub fn caller(message: impl Into<String>) -> Self {
        Self {
            origin: ErrorOrigin::Caller,
            message: message.into(),
            url: None,
        }
    }

    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            origin: ErrorOrigin::Unknown,
            message: message.into(),
            url: None,
        }
    }
}

/// Error body Github sends along with non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct GithubErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    documentation_url: Option<String>,
}

impl From<GithubErrorBody> for ErrorData {
    fn from(body: GithubErrorBody) -> Self {
        Self {
            origin: ErrorOrigin::Github,
            message: body.message.unwrap_or_default(),
            url: body.documentation_url,
        }
    }
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

/// A fully built POST request, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<RequestHeader>,
    pub body: Vec<u8>,
}

/// Status and full body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Errors that can occur while exchanging a request with the server
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Send(BoxError),

    #[error("failed to read response body: {0}")]
    Body(BoxError),
}

/// Sends a single request and reads the whole response.
pub trait Transport {
    /// Send `request` as an HTTP POST.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] if no response was received.
    /// Returns [`TransportError::Body`] if the response body could not be read.
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).post(request)
    }
}

/// Send `query` to `endpoint` and decode the JSON answer into `T`.
///
/// Exactly one request is made. Statuses in `200..400` are decoded into `T`,
/// anything else is decoded as a Github error body.
///
/// # Errors
///
/// Returns an [`ErrorData`] with [`ErrorOrigin::Caller`] if the request cannot be built,
/// a header has an empty key or value, or the response cannot be decoded.
/// Returns an [`ErrorData`] with [`ErrorOrigin::Unknown`] if the transport fails.
/// Returns an [`ErrorData`] with [`ErrorOrigin::Github`] if Github answers with an error status.
pub fn dispatch<T, C>(
    endpoint: &str,
    query: &str,
    headers: &[RequestHeader],
    transport: &C,
) -> Result<T, ErrorData>
where
    T: DeserializeOwned,
    C: Transport + ?Sized,
{
    let body = serde_json::to_vec(&QueryBody { query })
        .map_err(|_| ErrorData::caller(ErrorData::INVALID_QUERY_DATA))?;

    let url = Url::parse(endpoint).map_err(|e| {
        debug!("Invalid endpoint {endpoint}: {e}");
        ErrorData::caller(ErrorData::INVALID_ENDPOINT)
    })?;

    for header in headers {
        if header.key.is_empty() {
            return Err(ErrorData::caller(ErrorData::EMPTY_KEY));
        }
        if header.value.is_empty() {
            return Err(ErrorData::caller(ErrorData::EMPTY_VALUE));
        }
    }

    let request = HttpRequest {
        url,
        headers: headers.to_vec(),
        body,
    };

    debug!("POST {}", request.url);
    let response = transport.post(&request).map_err(|e| match e {
        TransportError::Send(source) => ErrorData::unknown(source.to_string()),
        TransportError::Body(source) => {
            debug!("Failed to read response body: {source}");
            ErrorData::caller(ErrorData::INVALID_RESPONSE)
        }
    })?;
    debug!(
        "Received status {} with {} bytes",
        response.status,
        response.body.len()
    );

    if (200..400).contains(&response.status) {
        return serde_json::from_slice(&response.body).map_err(|e| {
            debug!("Failed to decode response: {e}");
            ErrorData::caller(ErrorData::INVALID_RESPONSE)
        });
    }

    let remote: GithubErrorBody = serde_json::from_slice(&response.body).map_err(|e| {
        debug!("Failed to decode error response: {e}");
        ErrorData::caller(ErrorData::INVALID_RESPONSE)
    })?;

    if remote.message.as_deref().is_none_or(str::is_empty) {
        warn!(
            "{} answered with status {} but no message",
            request.url, response.status
        );
    }

    Err(remote.into())
}

/// Standard GraphQL answer: `data` plus any `errors` reported alongside it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}
