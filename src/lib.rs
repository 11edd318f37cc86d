//! # wave-rs
//!
//! A Rust client library for the Wave accounting API.
//!
//! The library does not acquire tokens on its own. Hand [`Client`] a transport
//! that already authenticates its requests, for example the bearer client
//! returned by [`oauth::authorized_http_client`]:
//!
//! ```ignore
//! let client = wave_rs::Client::with_access_token("... your access token ...")?;
//! let (businesses, _) = client.businesses().list(None).await?;
//! ```
//!
//! ## Creating and updating resources
//!
//! Every record field is an `Option`, so a field that was never set stays
//! distinguishable from one explicitly set to its zero value. Fields left as
//! `None` are not sent at all, which keeps `PATCH` updates from clobbering
//! server-side values:
//!
//! ```ignore
//! use wave_rs::{optional, Product};
//!
//! let product = Product {
//!     name: optional::string("Widgets"),
//!     price: optional::float(42.34),
//!     is_sold: optional::boolean(true),
//!     ..Default::default()
//! };
//! client.products().create(business_id, &product).await?;
//! ```
//!
//! ## Error context
//!
//! API errors capture a span trace at the point they are created. Install
//! `tracing_error::ErrorLayer` to have it populated:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .init();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod oauth;
pub mod options;
pub mod pagination;
pub mod scope;
pub mod transport;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::{Client, Response};
pub use endpoints::WaveEndpoint;
pub use entities::*;
pub use error::{Error, ErrorResponse, Result};
pub use oauth::KeyPair;
pub use options::{ListOptions, ProductGetOptions, ProductListOptions};
pub use pagination::Pagination;
pub use scope::Scope;
pub use transport::{CachedTransport, HttpResponse, Transport};
pub use utils::optional;

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;
