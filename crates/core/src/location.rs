//! Navigational locations and option extraction from them.

use std::fmt;

use url::{form_urlencoded, Url};

use crate::error::LocationError;
use crate::options::{fill_defaults, OptionKey, OptionValue, SparseSearchOptions};
use crate::query::{validate_query_text, QueryDescriptor, PAGE_PARAM, QUERY_PARAM};

/// Path of the start page.
pub const ROOT_PATH: &str = "/";
/// Path of the search results page.
pub const SEARCH_PATH: &str = "/search";

/// A location within the app: path plus raw query string (no leading `?`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: String,
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Location {
    pub fn root() -> Self {
        Self {
            path: ROOT_PATH.to_string(),
            query: String::new(),
        }
    }

    /// Parse an absolute URL or an app-relative one such as `/search?q=猫`.
    /// Fragments are dropped; an empty path becomes `/`.
    pub fn parse(raw: &str) -> Self {
        if let Ok(url) = Url::parse(raw) {
            return Self {
                path: url.path().to_string(),
                query: url.query().unwrap_or("").to_string(),
            };
        }

        let without_fragment = raw.split('#').next().unwrap_or("");
        let (path, query) = match without_fragment.split_once('?') {
            Some((p, q)) => (p, q),
            None => (without_fragment, ""),
        };
        Self {
            path: if path.is_empty() { ROOT_PATH.to_string() } else { path.to_string() },
            query: query.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }

    /// First value of a query parameter, decoded.
    pub fn param(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Read whatever search options the location states explicitly.
///
/// Missing, empty, or unrecognised values are left unset.
pub fn extract_options_from_location(location: &Location) -> SparseSearchOptions {
    let mut sparse = SparseSearchOptions::default();
    for key in OptionKey::ALL {
        if let Some(value) = location
            .param(key.url_param())
            .and_then(|raw| OptionValue::parse(key, &raw))
        {
            sparse.set(value);
        }
    }
    sparse
}

/// Recover the query descriptor a search location addresses.
///
/// Query text must pass the same checks as a form submission, so every
/// descriptor returned here builds a URL the form itself could have pushed.
pub fn query_descriptor_from_location(location: &Location) -> Result<QueryDescriptor, LocationError> {
    let text = location.param(QUERY_PARAM).ok_or(LocationError::MissingQuery)?;
    validate_query_text(&text)?;
    let page = match location.param(PAGE_PARAM) {
        None => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(p) if p >= 1 => p,
            _ => return Err(LocationError::InvalidPage(raw)),
        },
    };
    Ok(QueryDescriptor {
        text,
        page,
        options: fill_defaults(&extract_options_from_location(location)),
    })
}
