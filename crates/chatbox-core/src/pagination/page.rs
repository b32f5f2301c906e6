//! Page edge extraction.

use chatbox_types::pagination::{Direction, Item, Page};

/// Turn store results (already sorted and limited) into a [`Page`].
///
/// Results keep the store's order. With `Newer` (ascending) the first item is
/// the older edge and the last the newer one; with `Older` (descending) it is
/// the other way round. An empty result yields a page with no edges.
pub fn extract_page<T>(items: Vec<Item<T>>, direction: Direction) -> Page<T> {
    let (Some(first), Some(last)) = (items.first(), items.last()) else {
        return Page::empty();
    };
    let (first, last) = (first.key, last.key);

    let (older, newer) = match direction {
        Direction::Newer => (first, last),
        Direction::Older => (last, first),
    };

    Page {
        items: items.into_iter().map(|item| item.payload).collect(),
        older: Some(older),
        newer: Some(newer),
    }
}
