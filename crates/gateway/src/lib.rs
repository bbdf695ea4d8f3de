//! # Kenkō Gateway Crate
//!
//! HTTP client for the clinic backend. Every request carries the current
//! session's bearer token, responses are unwrapped from the backend's
//! `{"data": ...}` envelope and failures are mapped onto [`ApiError`].
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use kenko_auth::SessionStore;
//! use kenko_config::ApiConfig;
//! use kenko_gateway::{ApiClient, TracingNotifier};
//! use kenko_routing::HistoryNavigator;
//!
//! # async fn run() -> Result<(), kenko_gateway::ApiError> {
//! let client = ApiClient::new(
//!     &ApiConfig::default(),
//!     SessionStore::in_memory(),
//!     Arc::new(HistoryNavigator::new()),
//!     Arc::new(TracingNotifier),
//! )?;
//! let patients = client.patients().list().await?;
//! # let _ = patients;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod envelope;
pub mod error;
pub mod notify;
pub mod validation;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use notify::{Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use validation::{Validate, ValidationError};
