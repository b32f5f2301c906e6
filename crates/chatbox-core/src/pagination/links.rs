//! Older/newer navigation links derived from page edges.
//!
//! Links are emitted for every non-empty page, whether or not more data lies
//! beyond the edge. A client reaches the end of a feed when following a link
//! returns an empty page; no existence check is made up front.

use serde::Serialize;
use url::Url;

use chatbox_types::pagination::{OrderingKey, Page};

use super::timestamp::format_unix_seconds;

/// Query parameters owned by the pagination layer. Everything else in the
/// request URL is carried over to the links unchanged.
const CURSOR_PARAMS: [&str; 4] = ["reverse", "offset_datetime", "offset_id", "offset_message_id"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub older: Option<String>,
    pub newer: Option<String>,
}

/// Build both navigation links for `page`, relative to the absolute URL of the
/// request that produced it.
pub fn build_links<T>(request_url: &Url, page: &Page<T>) -> PageLinks {
    PageLinks {
        older: page.older.map(|key| link_to(request_url, &key, false)),
        newer: page.newer.map(|key| link_to(request_url, &key, true)),
    }
}

fn link_to(request_url: &Url, key: &OrderingKey, reverse: bool) -> String {
    let kept: Vec<(String, String)> = request_url
        .query_pairs()
        .filter(|(name, _)| !CURSOR_PARAMS.contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut url = request_url.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear().extend_pairs(kept);
        // `reverse` is left out for older links: it defaults to false.
        if reverse {
            query.append_pair("reverse", "true");
        }
        query
            .append_pair("offset_datetime", &format_unix_seconds(&key.timestamp))
            .append_pair("offset_id", &key.id.to_string());
    }
    url.into()
}
