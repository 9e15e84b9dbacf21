//! Myaku search form core — the client-side logic deciding which search
//! options govern a search request.
//!
//! Options come from three competing sources: the current location, the
//! user's remembered preferences (loaded asynchronously, possibly never), and
//! live edits. This crate reconciles them, validates and submits queries as
//! canonical URLs, and drives the options panel's collapse animation.
//!
//! # Modules
//!
//! - [`options`] — Option keys, typed values, hardcoded defaults
//! - [`location`] — Locations and option extraction from them
//! - [`resolver`] — Option resolution and default-used bookkeeping
//! - [`preferences`] — Preference stores and background load/save
//! - [`query`] — Query validation and canonical search URLs
//! - [`ui`] — Error flag and options panel state machine
//! - [`navigation`] — History subscriptions and push navigation
//! - [`form`] — The mounted search form tying everything together
//! - [`config`] — `myaku.toml` loading
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod form;
pub mod location;
pub mod navigation;
pub mod options;
pub mod preferences;
pub mod query;
pub mod resolver;
pub mod ui;

pub use error::{LocationError, QueryError, StorageError};
pub use form::{QueryOwner, SearchForm, SharedQuery};
pub use location::Location;
pub use navigation::{History, MemoryHistory, Subscription};
pub use options::{OptionKey, OptionValue, SearchOptions, SparseSearchOptions};
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use query::{build_search_url, QueryDescriptor, MAX_QUERY_LENGTH};
