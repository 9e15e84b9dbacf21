//! Query descriptors, query text validation, and canonical search URLs.

use serde::Serialize;
use url::form_urlencoded;

use crate::error::QueryError;
use crate::location::SEARCH_PATH;
use crate::options::{OptionKey, SearchOptions};

/// Maximum query length accepted by the query input, in characters.
pub const MAX_QUERY_LENGTH: usize = 100;

/// URL parameter carrying the query text.
pub const QUERY_PARAM: &str = "q";
/// URL parameter carrying the result page number.
pub const PAGE_PARAM: &str = "p";

/// The canonical unit addressed by a search URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDescriptor {
    pub text: String,
    pub page: u32,
    pub options: SearchOptions,
}

/// Check query text is non-empty and at most [`MAX_QUERY_LENGTH`] characters.
///
/// Length counts Unicode scalar values, so a kana or kanji character counts
/// as one.
pub fn validate_query_text(text: &str) -> Result<(), QueryError> {
    let len = text.chars().count();
    if len == 0 {
        return Err(QueryError::Empty);
    }
    if len > MAX_QUERY_LENGTH {
        return Err(QueryError::TooLong { len, max: MAX_QUERY_LENGTH });
    }
    Ok(())
}

/// Build the canonical search URL for a query descriptor.
///
/// Parameters are always emitted in the same order (`q`, `p`, then every
/// option key in [`OptionKey::ALL`] order) so identical descriptors give
/// identical URLs.
pub fn build_search_url(descriptor: &QueryDescriptor) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair(QUERY_PARAM, &descriptor.text);
    params.append_pair(PAGE_PARAM, &descriptor.page.to_string());
    for key in OptionKey::ALL {
        params.append_pair(key.url_param(), descriptor.options.get(key).as_str());
    }
    format!("{SEARCH_PATH}?{}", params.finish())
}
