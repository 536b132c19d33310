//! Core library for blogdesk.
//!
//! Holds the client side of the blog management API: the HTTP client, the
//! session store that owns login state, and configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionError, SessionScope, SessionSnapshot, SessionStore};
pub use config::Config;
