//! The paginator: decode, query, extract.

use std::future::Future;

use tracing::debug;

use chatbox_types::error::{PaginationError, RepositoryError};
use chatbox_types::pagination::{Cursor, Item, Page};

use super::cursor::{PaginationParams, decode_cursor};
use super::feed::FeedSpec;
use super::page::extract_page;
use super::query::RangeQuery;

/// A store-backed ordered collection the paginator can query.
///
/// Implementations must apply the query's range, order, and limit inside the
/// store (never fetching more than `limit` rows) and must already be scoped to
/// what the caller is allowed to see.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait OrderedCollectionProvider: Send + Sync {
    type Item: Send;

    fn fetch(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<Item<Self::Item>>, RepositoryError>> + Send;
}

/// Stateless keyset paginator for one feed.
///
/// Holds only the immutable [`FeedSpec`]; safe to share across requests.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    feed: FeedSpec,
}

impl Paginator {
    pub fn new(feed: FeedSpec) -> Self {
        Self { feed }
    }

    pub fn feed(&self) -> &FeedSpec {
        &self.feed
    }

    /// Validate `params` and fetch the requested page.
    ///
    /// Invalid parameters are rejected before the provider is touched. Store
    /// errors are returned as-is, without retry.
    pub async fn paginate<P: OrderedCollectionProvider>(
        &self,
        provider: &P,
        params: &PaginationParams,
    ) -> Result<Page<P::Item>, PaginationError> {
        let cursor = decode_cursor(params, &self.feed)?;
        Ok(self.fetch_page(provider, &cursor).await?)
    }

    /// Fetch the page for an already decoded cursor.
    pub async fn fetch_page<P: OrderedCollectionProvider>(
        &self,
        provider: &P,
        cursor: &Cursor,
    ) -> Result<Page<P::Item>, RepositoryError> {
        let query = RangeQuery::build(cursor);
        let items = provider.fetch(&query).await?;

        debug!(
            feed = self.feed.name,
            limit = cursor.limit,
            reverse = cursor.direction.is_reverse(),
            has_cursor = cursor.key.is_some(),
            count = items.len(),
            "Fetched page"
        );

        Ok(extract_page(items, cursor.direction))
    }
}
