use crate::model::{Name, Response};
use hostwalk_proto::packet::QueryType;
use moka::future::Cache;

#[async_trait::async_trait]
pub trait CacheService: Send + Sync {
    async fn fetch(&self, name: &Name, qtype: QueryType) -> Option<Response>;
    async fn store(&self, name: &Name, qtype: QueryType, response: Response);
}

/// Process-wide response cache keyed by canonical name and query type.
///
/// Entries never expire and the cache never evicts: record TTLs are
/// deliberately ignored, so whatever was learned once stays authoritative
/// for the lifetime of the process. Writes replace entries wholesale.
pub struct MemoryCacheService {
    inner: Cache<(Name, QueryType), Response>,
}

impl Default for MemoryCacheService {
    fn default() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }
}

#[async_trait::async_trait]
impl CacheService for MemoryCacheService {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, name: &Name, qtype: QueryType) -> Option<Response> {
        let found = self.inner.get(&(name.clone(), qtype));
        if found.is_some() {
            tracing::debug!("found in cache");
        }
        found
    }

    #[tracing::instrument(skip(self, response))]
    async fn store(&self, name: &Name, qtype: QueryType, response: Response) {
        self.inner.insert((name.clone(), qtype), response).await;
    }
}
