//! Keyset pagination value types.
//!
//! Feeds are ordered by a composite key `(timestamp, id)`. A [`Cursor`] names a
//! position in that order plus a walking direction, and a [`Page`] carries the
//! fetched payloads together with the keys of its two edge items.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Composite ordering key of a feed item.
///
/// Ordered by `timestamp` first and `id` second. `Uuid` compares by bytes,
/// which matches the lexicographic order of its canonical lowercase text form,
/// so SQL text comparison and in-memory comparison agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderingKey {
    pub timestamp: DateTime<Utc>,
    pub id: Uuid,
}

impl OrderingKey {
    /// Build a key, truncating the timestamp to microsecond precision.
    pub fn new(timestamp: DateTime<Utc>, id: Uuid) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(6),
            id,
        }
    }
}

/// Walking direction of a paginated request.
///
/// `Older` is the default (`reverse=false`): newest items first, moving
/// towards older ones. `Newer` (`reverse=true`) lists oldest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Older,
    Newer,
}

impl Direction {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Direction::Newer
        } else {
            Direction::Older
        }
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Direction::Newer)
    }
}

/// A decoded, validated pagination request.
///
/// `key` is `None` for the first page of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub key: Option<OrderingKey>,
    pub direction: Direction,
    pub limit: u32,
}

/// A payload paired with its extracted ordering key, as returned by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<T> {
    pub key: OrderingKey,
    pub payload: T,
}

impl<T> Item<T> {
    pub fn new(key: OrderingKey, payload: T) -> Self {
        Self { key, payload }
    }
}

/// One page of a feed.
///
/// An empty page has no edge keys; that is the only end-of-feed signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub older: Option<OrderingKey>,
    pub newer: Option<OrderingKey>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            older: None,
            newer: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform the payloads, keeping the edge keys.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            older: self.older,
            newer: self.newer,
        }
    }
}
