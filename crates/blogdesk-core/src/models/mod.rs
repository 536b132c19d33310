//! Data models for blog entities returned by the API.

pub mod category;

pub use category::Category;
