//! Page query-string parsing.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;

/// Flat string-keyed mapping parsed from a query string.
pub type QueryParams = BTreeMap<String, String>;

/// Parses a URL query string into a flat mapping.
///
/// Pairs are split on `&`, then on the first `=`. Keys and values are
/// percent-decoded (`+` is kept as is). A leading `?` is ignored, empty segments are
/// skipped and a pair without `=` maps to the empty string. Repeated keys are applied
/// left to right, so the last occurrence wins. Array or object valued parameters are
/// not supported.
///
/// # Example
///
/// ```rust
/// use jsonform_core::query::parse_query;
///
/// let params = parse_query("?title=Create%20user&a=1&a=2");
/// assert_eq!(params["title"], "Create user");
/// assert_eq!(params["a"], "2");
/// ```
#[must_use]
pub fn parse_query(query: &str) -> QueryParams {
    let query = query.strip_prefix('?').unwrap_or(query);

    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .fold(QueryParams::new(), |mut params, segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            params.insert(decode(key), decode(value));
            params
        })
}

/// Extracts the query part of a URL (without the `?`), or `""` if it has none.
///
/// A `#fragment` after the query is dropped.
#[must_use]
pub fn query_of(url: &str) -> &str {
    let Some((_, rest)) = url.split_once('?') else {
        return "";
    };
    rest.split_once('#').map_or(rest, |(query, _)| query)
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
