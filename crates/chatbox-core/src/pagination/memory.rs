//! In-memory ordered collection for exercising the paginator in tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use chatbox_types::error::RepositoryError;
use chatbox_types::pagination::{Item, OrderingKey};

use super::paginator::OrderedCollectionProvider;
use super::query::RangeQuery;

pub(crate) struct VecCollection<T> {
    items: Vec<Item<T>>,
    fail: bool,
    fetches: AtomicUsize,
}

impl<T: Clone + PartialEq> VecCollection<T> {
    pub(crate) fn new(items: Vec<Item<T>>) -> Self {
        Self {
            items,
            fail: false,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A collection whose every fetch fails with a connection error.
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn key_of(&self, payload: T) -> OrderingKey {
        self.items
            .iter()
            .find(|item| item.payload == payload)
            .map(|item| item.key)
            .unwrap()
    }
}

impl<T: Clone + Send + Sync> OrderedCollectionProvider for VecCollection<T> {
    type Item = T;

    async fn fetch(&self, query: &RangeQuery) -> Result<Vec<Item<T>>, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RepositoryError::Connection);
        }

        let mut rows: Vec<Item<T>> = self
            .items
            .iter()
            .filter(|item| query.matches(&item.key))
            .cloned()
            .collect();
        rows.sort_by(|a, b| query.compare(&a.key, &b.key));
        rows.truncate(query.limit as usize);
        Ok(rows)
    }
}
