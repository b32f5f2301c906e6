//! Decoding of pagination query parameters into a [`Cursor`].

use serde::Deserialize;
use uuid::Uuid;

use chatbox_types::error::ValidationError;
use chatbox_types::pagination::{Cursor, Direction, OrderingKey};

use super::feed::FeedSpec;
use super::timestamp::parse_unix_seconds;

/// Raw pagination query parameters, exactly as the client sent them.
///
/// Values are kept as strings so every malformed input surfaces as a
/// [`ValidationError`] from [`decode_cursor`] rather than as an opaque
/// deserialization failure. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub reverse: Option<String>,
    pub offset_datetime: Option<String>,
    #[serde(alias = "offset_message_id")]
    pub offset_id: Option<String>,
    pub limit: Option<String>,
}

/// Validate `params` against `feed` and build the cursor.
///
/// - `offset_datetime` and `offset_id` must be given together or not at all.
/// - `limit` must lie in `[1, feed.max_limit]`; it is never clamped.
/// - `reverse` defaults to `false`.
pub fn decode_cursor(params: &PaginationParams, feed: &FeedSpec) -> Result<Cursor, ValidationError> {
    let reverse = match present(&params.reverse) {
        Some(raw) => parse_flag("reverse", raw)?,
        None => false,
    };

    let key = match (present(&params.offset_datetime), present(&params.offset_id)) {
        (None, None) => None,
        (Some(raw_ts), Some(raw_id)) => {
            let timestamp = parse_unix_seconds(raw_ts)
                .ok_or_else(|| ValidationError::MalformedTimestamp(raw_ts.to_string()))?;
            let id = Uuid::parse_str(raw_id)
                .map_err(|_| ValidationError::MalformedId(raw_id.to_string()))?;
            Some(OrderingKey::new(timestamp, id))
        }
        _ => return Err(ValidationError::IncompleteCursor),
    };

    let limit = match present(&params.limit) {
        Some(raw) => parse_limit(raw, feed.max_limit)?,
        None => feed.default_limit,
    };

    Ok(Cursor {
        key,
        direction: Direction::from_reverse(reverse),
        limit,
    })
}

/// Parse a boolean query flag (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}

fn parse_limit(raw: &str, max: u32) -> Result<u32, ValidationError> {
    let limit: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidLimit(raw.to_string()))?;
    if limit < 1 || limit > i64::from(max) {
        return Err(ValidationError::LimitOutOfRange { limit, max });
    }
    // In range of u32 after the bounds check above.
    Ok(limit as u32)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
