use crate::api::models::SearchResult;
use crate::core::payload::QueryPayload;
use crate::error::ApiError;
use async_trait::async_trait;

/// The remote query endpoint, seen from the core.
///
/// One call per submission. Implementations do not retry, cache or
/// deduplicate; ordering of concurrent calls is handled by the session.
#[async_trait]
pub trait SearchGateway {
    async fn search(&self, payload: &QueryPayload) -> Result<SearchResult, ApiError>;
}

#[async_trait]
impl<T> SearchGateway for &T
where
    T: SearchGateway + Sync + ?Sized,
{
    async fn search(&self, payload: &QueryPayload) -> Result<SearchResult, ApiError> {
        (**self).search(payload).await
    }
}
