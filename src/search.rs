//! Image search
//!
//! Runs free-text searches with the stored session token. A token the service
//! rejects is cleared from the session before the error reaches the caller.

use crate::api::SearchApi;
use crate::error::{ErrorKind, Result};
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Search over labeled images
pub struct ImageSearch {
    api: Arc<dyn SearchApi>,
    session: Arc<dyn SessionStore>,
}

impl ImageSearch {
    /// Create a search sharing `session`
    pub fn new(api: Arc<dyn SearchApi>, session: Arc<dyn SessionStore>) -> Self {
        Self { api, session }
    }

    /// Search for `query` and return matching image URLs
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        let token = self.session.get_token();
        match self.api.search(query, token.as_deref()).await {
            Ok(urls) => {
                debug!("Search for '{}' returned {} images", query, urls.len());
                Ok(urls)
            }
            Err(e) if e.kind() == ErrorKind::Auth => {
                warn!("Search rejected the session token: {}", e);
                if let Err(clear_err) = self.session.clear_token() {
                    error!("Failed to clear session: {}", clear_err);
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SnapLabelError;
    use crate::session::MemorySessionStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Answers every search with one scripted result
    struct FakeSearchApi {
        result: Mutex<Option<Result<Vec<String>>>>,
        tokens_seen: Mutex<Vec<Option<String>>>,
    }

    impl FakeSearchApi {
        fn answering(result: Result<Vec<String>>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
                tokens_seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchApi for FakeSearchApi {
        async fn search(&self, _query: &str, auth_token: Option<&str>) -> Result<Vec<String>> {
            self.tokens_seen.lock().push(auth_token.map(str::to_string));
            self.result
                .lock()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[tokio::test]
    async fn test_search_sends_stored_token() {
        let api = FakeSearchApi::answering(Ok(vec!["https://img.example/1.png".to_string()]));
        let session = Arc::new(MemorySessionStore::with_token("token-1"));
        let search = ImageSearch::new(api.clone(), session.clone());

        let urls = search.search("cat").await.unwrap();

        assert_eq!(urls, vec!["https://img.example/1.png"]);
        assert_eq!(*api.tokens_seen.lock(), vec![Some("token-1".to_string())]);
        assert_eq!(session.get_token().as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_unauthorized_search_clears_session() {
        let api = FakeSearchApi::answering(Err(SnapLabelError::Unauthorized(
            "token expired".to_string(),
        )));
        let session = Arc::new(MemorySessionStore::with_token("stale"));
        let search = ImageSearch::new(api, session.clone());

        let err = search.search("cat").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(session.get_token(), None);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_session() {
        let api = FakeSearchApi::answering(Err(SnapLabelError::UnexpectedStatus {
            status: 503,
            body: String::new(),
        }));
        let session = Arc::new(MemorySessionStore::with_token("token-1"));
        let search = ImageSearch::new(api, session.clone());

        let err = search.search("cat").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(session.get_token().as_deref(), Some("token-1"));
    }
}
