use std::fmt;

use miette::Diagnostic;
use oauth2::{HttpClientError, basic::BasicErrorResponse};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing_error::SpanTrace;
use url::Url;

use crate::transport::HttpResponse;

/// Token exchange failure as reported by the `oauth2` crate.
pub type OAuth2Error = oauth2::RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>;

#[derive(Debug, Default, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorMessage,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    message: String,
}

/// A non-2xx response from the Wave API.
///
/// The body is decoded as `{"error": {"message": "..."}}` when possible. Any
/// other body (empty, HTML, differently shaped JSON) leaves `message` empty;
/// the raw response is always kept so the body can still be inspected.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub message: String,
    pub response: HttpResponse,
    span_trace: SpanTrace,
}

impl ErrorResponse {
    #[must_use]
    pub fn from_response(response: HttpResponse) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(response.body())
            .map(|body| body.error.message)
            .unwrap_or_default();

        Self {
            method: response.method().clone(),
            url: response.url().clone(),
            status: response.status(),
            message,
            response,
            span_trace: SpanTrace::capture(),
        }
    }

    /// The span trace captured when the error was created.
    #[must_use]
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.method,
            self.url,
            self.status.as_u16(),
            self.message
        )
    }
}

/// Errors that can occur when interacting with the Wave API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {0}")]
    #[diagnostic(
        code(wave_rs::request_error),
        help("Check your network connection and Wave API availability")
    )]
    Request(#[source] reqwest::Error),

    #[error("invalid endpoint path {path:?}: {reason}")]
    #[diagnostic(
        code(wave_rs::invalid_endpoint),
        help("Identifiers are placed in the URL path as-is; make sure they contain no raw `%` or control characters")
    )]
    InvalidEndpoint { path: String, reason: String },

    #[error("invalid header value: {0}")]
    #[diagnostic(
        code(wave_rs::invalid_header),
        help("User agents and access tokens must be visible ASCII")
    )]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("error encoding request body: {0}")]
    #[diagnostic(
        code(wave_rs::serialization_error),
        help("The request body could not be encoded as JSON")
    )]
    Serialization(#[source] serde_json::Error),

    #[error("{0}")]
    #[diagnostic(
        code(wave_rs::api_error),
        help("The Wave API rejected the request; see the message and response body")
    )]
    Api(Box<ErrorResponse>),

    #[error("error decoding response: {0}")]
    #[diagnostic(
        code(wave_rs::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    DeserializationError(#[source] serde_json::Error, Option<String>),

    #[error("pagination cursor {cursor:?} is not a valid URL")]
    #[diagnostic(
        code(wave_rs::invalid_cursor),
        help("The `next`/`previous` fields of a list response could not be parsed")
    )]
    InvalidCursor {
        cursor: String,
        #[source]
        source: url::ParseError,
    },

    /// An error returned during `OAuth2` operations
    #[error("oauth2 error: {0}")]
    #[diagnostic(
        code(wave_rs::oauth2_error),
        help("Verify your OAuth2 configuration and credentials")
    )]
    OAuth2(#[source] OAuth2Error),

    #[error("token cache error: {0}")]
    #[diagnostic(
        code(wave_rs::token_cache),
        help("Check that the token cache file is readable, writable and valid JSON")
    )]
    TokenCache(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_endpoint(path: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidEndpoint {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The decoded API error, if this is a non-2xx response.
    #[must_use]
    pub fn api_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Api(response) => Some(response),
            _ => None,
        }
    }

    /// The URL the failing request was sent to, when known.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Api(response) => Some(&response.url),
            Self::Request(e) => e.url(),
            _ => None,
        }
    }

    /// The HTTP status of the failing response, when one was received.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Api(response) => Some(response.status),
            Self::Request(e) => e.status(),
            _ => None,
        }
    }

    /// The raw body of the failing response, when one was received.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api(response) => response.response.text(),
            Self::DeserializationError(_, body) => body.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        self.api_response().map(ErrorResponse::span_trace)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<OAuth2Error> for Error {
    fn from(e: OAuth2Error) -> Self {
        Self::OAuth2(e)
    }
}

impl From<ErrorResponse> for Error {
    fn from(response: ErrorResponse) -> Self {
        Self::Api(Box::new(response))
    }
}

/// Type alias for results from this crate.
pub type Result<O> = std::result::Result<O, Error>;
