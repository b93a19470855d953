use std::sync::Arc;
use std::time::Duration;

use crate::auth::IdentityProvider;
use crate::documents::storage::DocumentStorage;
use crate::llm_client::TextGenerator;
use crate::store::CvStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external collaborator sits behind a trait object so tests can swap in
/// in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CvStore>,
    pub llm: Arc<dyn TextGenerator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn DocumentStorage>,
    /// Upper bound on one upstream generation call.
    pub llm_timeout: Duration,
}

#[cfg(test)]
impl AppState {
    /// State over in-memory fakes. No token resolves unless `identity` is replaced.
    pub fn for_tests(
        store: Arc<crate::store::memory::MemoryCvStore>,
        llm: Arc<crate::llm_client::fake::FakeGenerator>,
    ) -> Self {
        AppState {
            store,
            llm,
            identity: Arc::new(crate::auth::fake::StaticIdentityProvider::default()),
            storage: Arc::new(crate::documents::storage::fake::MemoryDocumentStorage::default()),
            llm_timeout: Duration::from_secs(30),
        }
    }
}
