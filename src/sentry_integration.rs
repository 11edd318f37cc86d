//! Sentry integration for wave-rs errors.
//!
//! Only available with the `sentry` feature:
//!
//! ```toml
//! [dependencies]
//! wave-rs = { version = "0.1", features = ["sentry"] }
//! ```
//!
//! Span traces are only populated when `tracing_error::ErrorLayer` is
//! installed:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .with(sentry::integrations::tracing::layer())
//!     .init();
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::Error;

const MAX_BODY_CHARS: usize = 500;

/// Records a wave-rs error as a Sentry breadcrumb.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let mut data = BTreeMap::new();
        let (category, message) = match error {
            Error::Request(source) => ("http.request", format!("HTTP request error: {source}")),

            Error::InvalidEndpoint { path, reason } => {
                data.insert("path".to_string(), Value::from(path.clone()));
                ("wave.request", format!("Invalid endpoint: {reason}"))
            }

            Error::InvalidHeader(_) => ("wave.request", "Invalid header value".to_string()),

            Error::Serialization(source) => ("wave.request", format!("Failed to encode request body: {source}")),

            Error::Api(response) => {
                data.insert("method".to_string(), Value::from(response.method.to_string()));
                data.insert("url".to_string(), Value::from(response.url.to_string()));
                data.insert("status_code".to_string(), Value::from(response.status.as_u16()));
                if !response.message.is_empty() {
                    data.insert("message".to_string(), Value::from(response.message.clone()));
                }
                ("wave.api", format!("Wave API error: {}", response.status))
            }

            Error::DeserializationError(source, _) => {
                ("http.response", format!("Failed to decode response: {source}"))
            }

            Error::InvalidCursor { cursor, .. } => {
                data.insert("cursor".to_string(), Value::from(cursor.clone()));
                ("http.response", "Invalid pagination cursor".to_string())
            }

            Error::OAuth2(_) => ("auth", "OAuth2 error".to_string()),

            Error::TokenCache(source) => ("auth", format!("Token cache error: {source}")),
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Collects the context of a wave-rs error for use as Sentry extras.
///
/// ```ignore
/// use sentry::configure_scope;
/// use wave_rs::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = client.businesses().list(None).await {
///     configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
#[must_use]
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(span_trace) = error.span_trace() {
        context.insert("wave.span_trace".to_string(), Value::from(format!("{span_trace}")));
    }

    if let Some(url) = error.url() {
        context.insert("wave.url".to_string(), Value::from(url.to_string()));
    }

    if let Some(status) = error.status_code() {
        context.insert("wave.status_code".to_string(), Value::from(status.as_u16()));
    }

    if let Some(body) = error.response_body() {
        let mut truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
        if truncated.len() < body.len() {
            truncated.push_str("...");
        }
        context.insert("wave.response_body".to_string(), Value::from(truncated));
    }

    if let Some(response) = error.api_response()
        && !response.message.is_empty()
    {
        context.insert("wave.message".to_string(), Value::from(response.message.clone()));
    }

    context
}
