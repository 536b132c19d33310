//! REST API client module for the blog backend.
//!
//! This module provides the `ApiClient` for logging in and for issuing
//! requests against the `/api/v1` endpoints.
//!
//! The API uses JWT bearer token authentication obtained from
//! `POST /api/v1/auth/login`.

pub mod client;
pub mod error;

pub use client::{is_usable_token, ApiClient, LoginResponse};
pub use error::ApiError;
