//! SQL rendering of keyset range queries.
//!
//! A feed is any `SELECT` whose rows carry the feed's timestamp and id
//! columns. The rendered query wraps that base once per range branch:
//!
//! ```text
//! SELECT * FROM (
//!     SELECT * FROM (SELECT * FROM (<base>) AS feed
//!                    WHERE feed.ts = ? AND feed.id < ?
//!                    ORDER BY feed.ts DESC, feed.id DESC LIMIT ?)
//!     UNION ALL
//!     SELECT * FROM (SELECT * FROM (<base>) AS feed
//!                    WHERE feed.ts < ?
//!                    ORDER BY feed.ts DESC, feed.id DESC LIMIT ?)
//! ) AS page
//! ORDER BY page.ts DESC, page.id DESC LIMIT ?
//! ```
//!
//! The branches are disjoint, so `UNION ALL` never duplicates a row, and each
//! branch is limited on its own so the store never reads more than it returns.

use sqlx::{QueryBuilder, Sqlite};

use chatbox_core::pagination::{Branch, FeedSpec, RangeQuery};

use super::format_datetime;

/// Append the full range query for `feed` to `qb`.
///
/// `push_base` appends the feed's base `SELECT` (with its own binds); it is
/// called once per branch.
pub fn push_range_query<'args>(
    qb: &mut QueryBuilder<'args, Sqlite>,
    feed: &FeedSpec,
    query: &RangeQuery,
    push_base: &dyn Fn(&mut QueryBuilder<'args, Sqlite>),
) {
    let order = order_by(feed, query, "page");

    qb.push("SELECT * FROM (");
    match &query.range {
        None => push_branch(qb, feed, query, None, push_base),
        Some(range) => {
            for (i, branch) in range.branches().iter().enumerate() {
                if i > 0 {
                    qb.push(" UNION ALL ");
                }
                push_branch(qb, feed, query, Some(branch), push_base);
            }
        }
    }
    qb.push(") AS page ORDER BY ");
    qb.push(order);
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(query.limit));
}

fn push_branch<'args>(
    qb: &mut QueryBuilder<'args, Sqlite>,
    feed: &FeedSpec,
    query: &RangeQuery,
    branch: Option<&Branch>,
    push_base: &dyn Fn(&mut QueryBuilder<'args, Sqlite>),
) {
    let (ts, id) = (feed.timestamp_field, feed.id_field);

    qb.push("SELECT * FROM (SELECT * FROM (");
    push_base(qb);
    qb.push(") AS feed");

    match branch {
        None => {}
        Some(Branch::SameTimestamp {
            timestamp,
            id: bound_id,
            comparison,
        }) => {
            qb.push(format!(" WHERE feed.{ts} = "));
            qb.push_bind(format_datetime(timestamp));
            qb.push(format!(" AND feed.{id} {} ", comparison.as_sql()));
            qb.push_bind(bound_id.to_string());
        }
        Some(Branch::OtherTimestamp {
            timestamp,
            comparison,
        }) => {
            qb.push(format!(" WHERE feed.{ts} {} ", comparison.as_sql()));
            qb.push_bind(format_datetime(timestamp));
        }
    }

    qb.push(" ORDER BY ");
    qb.push(order_by(feed, query, "feed"));
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(query.limit));
    qb.push(")");
}

fn order_by(feed: &FeedSpec, query: &RangeQuery, alias: &str) -> String {
    let order = query.order.as_sql();
    format!(
        "{alias}.{ts} {order}, {alias}.{id} {order}",
        ts = feed.timestamp_field,
        id = feed.id_field,
    )
}
