//! Resolution of the authoritative option set from location, defaults,
//! user edits, and remembered preferences.

use tracing::debug;

use crate::location::{extract_options_from_location, Location};
use crate::options::{fill_defaults, DefaultUsedSet, OptionValue, SearchOptions, SparseSearchOptions};

/// Resolved options plus the bookkeeping of which keys still hold a
/// hardcoded default.
///
/// A key leaves the default-used set the moment it is changed through
/// [`OptionsResolver::apply_change`] and never comes back for the lifetime
/// of the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsResolver {
    options: SearchOptions,
    default_used: DefaultUsedSet,
}

impl OptionsResolver {
    /// Resolve the options stated by a location, filling the rest with defaults.
    pub fn from_location(location: &Location) -> Self {
        Self::from_sparse(&extract_options_from_location(location))
    }

    pub fn from_sparse(sparse: &SparseSearchOptions) -> Self {
        Self {
            options: fill_defaults(sparse),
            default_used: sparse.unset_keys(),
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn default_used(&self) -> &DefaultUsedSet {
        &self.default_used
    }

    /// Apply a user edit. Returns `false` when the value is already current,
    /// in which case nothing changes and nothing should be persisted.
    pub fn apply_change(&mut self, value: OptionValue) -> bool {
        let key = value.key();
        if self.options.get(key) == value {
            return false;
        }
        self.default_used.remove(&key);
        self.options.set(value);
        debug!(key = %key, value = %value, "Search option changed");
        true
    }

    /// Apply remembered preferences. Only keys still showing a default are
    /// overwritten; anything the location stated or the user already edited
    /// is left alone, however late the load arrives. Returns the values
    /// actually applied.
    pub fn apply_loaded(&mut self, loaded: &SparseSearchOptions) -> Vec<OptionValue> {
        let pending: Vec<_> = self.default_used.iter().copied().collect();
        let mut applied = Vec::new();
        for key in pending {
            if let Some(value) = loaded.get(key) {
                self.options.set(value);
                self.default_used.remove(&key);
                applied.push(value);
            }
        }
        if !applied.is_empty() {
            debug!(applied = ?applied, "Applied remembered search options");
        }
        applied
    }
}
