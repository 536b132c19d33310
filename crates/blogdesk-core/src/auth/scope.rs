use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::api::ApiClient;

use super::{SessionError, SessionSnapshot, SessionStore, TokenStorage};

/// Owner of the single `SessionStore` of a running process.
///
/// Created once in `main` and passed by reference to whatever needs the
/// session. Asking for the store before `enter` or after `teardown` is a
/// programming error and yields `SessionError::ContextMisuse`.
#[derive(Default)]
pub struct SessionScope {
    store: RwLock<Option<Arc<SessionStore>>>,
}

impl SessionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the store, restore the persisted session and make it the
    /// active one. Replaces any store from a previous `enter`.
    pub async fn enter(&self, api: ApiClient, storage: Arc<dyn TokenStorage>) -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::initialize(api, storage).await);
        *self.store.write().unwrap_or_else(PoisonError::into_inner) = Some(store.clone());
        debug!("Session scope entered");
        store
    }

    /// Leave the scope. Persisted state is kept so the next process can
    /// restore it; outstanding handles keep working until dropped.
    pub fn teardown(&self) {
        let previous = self.store.write().unwrap_or_else(PoisonError::into_inner).take();
        if previous.is_some() {
            debug!("Session scope torn down");
        }
    }

    pub fn is_active(&self) -> bool {
        self.store.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Handle to the active store
    pub fn store(&self) -> Result<Arc<SessionStore>, SessionError> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SessionError::ContextMisuse)
    }

    /// Snapshot of the active session
    pub fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        Ok(self.store()?.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStorage;

    fn api() -> ApiClient {
        ApiClient::new("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_store_outside_scope_is_misuse() {
        let scope = SessionScope::new();
        assert!(!scope.is_active());
        assert!(matches!(scope.store(), Err(SessionError::ContextMisuse)));
        assert!(matches!(scope.snapshot(), Err(SessionError::ContextMisuse)));
    }

    #[tokio::test]
    async fn test_enter_and_teardown() {
        let scope = SessionScope::new();
        let storage = Arc::new(MemoryTokenStorage::with_token("abc123"));
        let store = scope.enter(api(), storage.clone()).await;

        assert!(scope.is_active());
        assert!(Arc::ptr_eq(&store, &scope.store().unwrap()));
        assert_eq!(scope.snapshot().unwrap().token(), Some("abc123"));

        scope.teardown();
        assert!(matches!(scope.store(), Err(SessionError::ContextMisuse)));
        // Teardown is not logout
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc123"));
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_reenter_replaces_store() {
        let scope = SessionScope::new();
        let first = scope.enter(api(), Arc::new(MemoryTokenStorage::new())).await;
        let second = scope.enter(api(), Arc::new(MemoryTokenStorage::with_token("t"))).await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(scope.snapshot().unwrap().is_authenticated());
    }
}
