//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `SessionStore`: Login/logout state machine publishing `SessionSnapshot`s
//! - `SessionScope`: Explicit owner of the process-wide store
//! - `TokenStorage`: Durable token persistence (file, OS keyring, memory)
//!
//! A persisted token is trusted on startup without asking the server.

pub mod error;
pub mod scope;
pub mod session;
pub mod storage;

pub use error::{SessionError, StorageError};
pub use scope::SessionScope;
pub use session::{AuthUser, SessionSnapshot, SessionStore};
pub use storage::{FileTokenStorage, KeyringTokenStorage, MemoryTokenStorage, TokenStorage, TOKEN_KEY};
