//! Bidirectional keyset pagination.
//!
//! Pipeline per request:
//!
//! ```text
//! PaginationParams --decode_cursor--> Cursor --RangeQuery::build--> RangeQuery
//!     --OrderedCollectionProvider::fetch--> Vec<Item<T>> --extract_page--> Page<T>
//!     --build_links--> PageLinks
//! ```
//!
//! Every stage is a pure function of its inputs; the only I/O is the provider
//! fetch. Nothing is cached between requests.

pub mod cursor;
pub mod feed;
pub mod links;
pub mod page;
pub mod paginator;
pub mod query;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod memory;

pub use cursor::{PaginationParams, decode_cursor, parse_flag};
pub use feed::FeedSpec;
pub use links::{PageLinks, build_links};
pub use page::extract_page;
pub use paginator::{OrderedCollectionProvider, Paginator};
pub use query::{Branch, Comparison, KeyRange, RangeQuery};
