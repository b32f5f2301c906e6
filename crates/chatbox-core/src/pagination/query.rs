//! Range query construction from a cursor.
//!
//! For a cursor at key `(t, i)` walking with comparison `op` (`<` for older,
//! `>` for newer) the eligible rows are the disjoint union of
//!
//! - `timestamp = t AND id op i` (same-timestamp peers, tie-broken by id)
//! - `timestamp op t`
//!
//! so `offset_datetime` is inclusive of its peers while `offset_id` is
//! exclusive: the cursor row itself never matches.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chatbox_types::pagination::{Cursor, OrderingKey};

use crate::repository::SortOrder;

/// Strict comparison applied by both branches of a [`KeyRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Greater,
}

impl Comparison {
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::Greater => ">",
        }
    }

    /// Whether `ordering` (of row value against bound) satisfies this comparison.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Less => ordering == Ordering::Less,
            Comparison::Greater => ordering == Ordering::Greater,
        }
    }
}

/// One of the two mutually exclusive filters of a [`KeyRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// `timestamp = timestamp AND id <comparison> id`
    SameTimestamp {
        timestamp: DateTime<Utc>,
        id: Uuid,
        comparison: Comparison,
    },
    /// `timestamp <comparison> timestamp`
    OtherTimestamp {
        timestamp: DateTime<Utc>,
        comparison: Comparison,
    },
}

impl Branch {
    pub fn matches(&self, key: &OrderingKey) -> bool {
        match *self {
            Branch::SameTimestamp {
                timestamp,
                id,
                comparison,
            } => key.timestamp == timestamp && comparison.holds(key.id.cmp(&id)),
            Branch::OtherTimestamp {
                timestamp,
                comparison,
            } => comparison.holds(key.timestamp.cmp(&timestamp)),
        }
    }
}

/// Keys strictly before (`Less`) or after (`Greater`) a cursor key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange {
    pub bound: OrderingKey,
    pub comparison: Comparison,
}

impl KeyRange {
    /// The two branches whose union is this range. They never overlap, so a
    /// store may combine them with `UNION ALL`.
    pub fn branches(&self) -> [Branch; 2] {
        [
            Branch::SameTimestamp {
                timestamp: self.bound.timestamp,
                id: self.bound.id,
                comparison: self.comparison,
            },
            Branch::OtherTimestamp {
                timestamp: self.bound.timestamp,
                comparison: self.comparison,
            },
        ]
    }

    pub fn matches(&self, key: &OrderingKey) -> bool {
        self.branches().iter().any(|branch| branch.matches(key))
    }
}

/// A bounded, ordered query over a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeQuery {
    /// `None` on the first page: the whole feed is eligible.
    pub range: Option<KeyRange>,
    pub order: SortOrder,
    pub limit: u32,
}

impl RangeQuery {
    pub fn build(cursor: &Cursor) -> Self {
        let reverse = cursor.direction.is_reverse();
        let comparison = if reverse {
            Comparison::Greater
        } else {
            Comparison::Less
        };
        let order = if reverse { SortOrder::Asc } else { SortOrder::Desc };

        Self {
            range: cursor.key.map(|bound| KeyRange { bound, comparison }),
            order,
            limit: cursor.limit,
        }
    }

    pub fn matches(&self, key: &OrderingKey) -> bool {
        self.range.as_ref().is_none_or(|range| range.matches(key))
    }

    /// Order two keys the way the store must return them.
    pub fn compare(&self, a: &OrderingKey, b: &OrderingKey) -> Ordering {
        match self.order {
            SortOrder::Asc => a.cmp(b),
            SortOrder::Desc => b.cmp(a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbox_types::pagination::Direction;
    use chrono::TimeZone;

    fn key(secs: i64, id: u128) -> OrderingKey {
        OrderingKey::new(Utc.timestamp_opt(secs, 0).unwrap(), Uuid::from_u128(id))
    }

    fn cursor(at: Option<OrderingKey>, direction: Direction) -> Cursor {
        Cursor {
            key: at,
            direction,
            limit: 10,
        }
    }

    #[test]
    fn test_first_page_has_no_range() {
        let q = RangeQuery::build(&cursor(None, Direction::Older));
        assert!(q.range.is_none());
        assert_eq!(q.order, SortOrder::Desc);
        assert!(q.matches(&key(0, 0)));
    }

    #[test]
    fn test_direction_picks_operator_and_order() {
        let older = RangeQuery::build(&cursor(Some(key(10, 5)), Direction::Older));
        assert_eq!(older.range.unwrap().comparison, Comparison::Less);
        assert_eq!(older.order, SortOrder::Desc);

        let newer = RangeQuery::build(&cursor(Some(key(10, 5)), Direction::Newer));
        assert_eq!(newer.range.unwrap().comparison, Comparison::Greater);
        assert_eq!(newer.order, SortOrder::Asc);
    }

    #[test]
    fn test_older_range_is_inclusive_of_peers_exclusive_of_cursor() {
        let q = RangeQuery::build(&cursor(Some(key(10, 5)), Direction::Older));
        assert!(q.matches(&key(10, 4)), "same timestamp, lower id");
        assert!(q.matches(&key(9, 99)), "earlier timestamp");
        assert!(!q.matches(&key(10, 5)), "cursor row itself");
        assert!(!q.matches(&key(10, 6)), "same timestamp, higher id");
        assert!(!q.matches(&key(11, 0)), "later timestamp");
    }

    #[test]
    fn test_newer_range_mirrors_older() {
        let q = RangeQuery::build(&cursor(Some(key(10, 5)), Direction::Newer));
        assert!(q.matches(&key(10, 6)));
        assert!(q.matches(&key(11, 0)));
        assert!(!q.matches(&key(10, 5)));
        assert!(!q.matches(&key(10, 4)));
        assert!(!q.matches(&key(9, 99)));
    }

    #[test]
    fn test_branches_are_disjoint() {
        let range = KeyRange {
            bound: key(10, 5),
            comparison: Comparison::Less,
        };
        let [same, other] = range.branches();
        for k in [key(10, 1), key(10, 4), key(9, 7), key(1, 5)] {
            assert!(
                !(same.matches(&k) && other.matches(&k)),
                "{k:?} matched both branches"
            );
        }
    }

    #[test]
    fn test_compare_follows_sort_order() {
        let asc = RangeQuery::build(&cursor(None, Direction::Newer));
        let desc = RangeQuery::build(&cursor(None, Direction::Older));
        assert_eq!(asc.compare(&key(1, 0), &key(2, 0)), Ordering::Less);
        assert_eq!(desc.compare(&key(1, 0), &key(2, 0)), Ordering::Greater);
        assert_eq!(desc.compare(&key(1, 1), &key(1, 2)), Ordering::Greater);
    }
}
