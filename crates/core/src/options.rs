//! Search option keys, their typed values, and the hardcoded defaults.
//!
//! [`SearchOptions`] is always complete; [`SparseSearchOptions`] is what the
//! location and the preference store hand back, where `None` means "no
//! explicit value supplied".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

// ---------------------------------------------------------------------------
// Option keys
// ---------------------------------------------------------------------------

/// One configurable dimension of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionKey {
    /// Romaji to kana conversion applied to the query text.
    KanaConvertType,
    /// How the query must match article text.
    MatchType,
}

impl OptionKey {
    /// Every key, in canonical (URL parameter) order.
    pub const ALL: [OptionKey; 2] = [OptionKey::KanaConvertType, OptionKey::MatchType];

    /// Name of the URL query parameter carrying this option.
    pub fn url_param(self) -> &'static str {
        match self {
            OptionKey::KanaConvertType => "conv",
            OptionKey::MatchType => "match",
        }
    }

    /// Name used in the persisted preferences JSON.
    pub fn wire_name(self) -> &'static str {
        match self {
            OptionKey::KanaConvertType => "kanaConvertType",
            OptionKey::MatchType => "matchType",
        }
    }

    /// Look up a key by wire name, URL parameter, or snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        OptionKey::ALL.into_iter().find(|k| {
            name == k.wire_name()
                || name == k.url_param()
                || name == k.snake_name()
        })
    }

    fn snake_name(self) -> &'static str {
        match self {
            OptionKey::KanaConvertType => "kana_convert_type",
            OptionKey::MatchType => "match_type",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Option value types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KanaConvertType {
    #[serde(rename = "hira")]
    Hiragana,
    #[serde(rename = "kata")]
    Katakana,
    #[serde(rename = "none")]
    NoConversion,
}

impl KanaConvertType {
    pub fn as_str(self) -> &'static str {
        match self {
            KanaConvertType::Hiragana => "hira",
            KanaConvertType::Katakana => "kata",
            KanaConvertType::NoConversion => "none",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "hira" => Some(KanaConvertType::Hiragana),
            "kata" => Some(KanaConvertType::Katakana),
            "none" => Some(KanaConvertType::NoConversion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "starts")]
    StartsWith,
    #[serde(rename = "ends")]
    EndsWith,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::StartsWith => "starts",
            MatchType::EndsWith => "ends",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "exact" => Some(MatchType::Exact),
            "starts" => Some(MatchType::StartsWith),
            "ends" => Some(MatchType::EndsWith),
            _ => None,
        }
    }
}

/// A concrete value for one option key. The key is implied by the variant,
/// so a value can never be stored under the wrong key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionValue {
    KanaConvertType(KanaConvertType),
    MatchType(MatchType),
}

impl OptionValue {
    pub fn key(self) -> OptionKey {
        match self {
            OptionValue::KanaConvertType(_) => OptionKey::KanaConvertType,
            OptionValue::MatchType(_) => OptionKey::MatchType,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionValue::KanaConvertType(v) => v.as_str(),
            OptionValue::MatchType(v) => v.as_str(),
        }
    }

    /// Parse a raw string value for `key`. Unknown values yield `None`.
    pub fn parse(key: OptionKey, raw: &str) -> Option<Self> {
        match key {
            OptionKey::KanaConvertType => KanaConvertType::parse(raw).map(OptionValue::KanaConvertType),
            OptionKey::MatchType => MatchType::parse(raw).map(OptionValue::MatchType),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const DEFAULT_KANA_CONVERT_TYPE: KanaConvertType = KanaConvertType::Hiragana;
const DEFAULT_MATCH_TYPE: MatchType = MatchType::Exact;

/// Hardcoded default for each option key.
pub fn default_value(key: OptionKey) -> OptionValue {
    match key {
        OptionKey::KanaConvertType => OptionValue::KanaConvertType(DEFAULT_KANA_CONVERT_TYPE),
        OptionKey::MatchType => OptionValue::MatchType(DEFAULT_MATCH_TYPE),
    }
}

// ---------------------------------------------------------------------------
// Option sets
// ---------------------------------------------------------------------------

/// A complete set of search options: every key always has a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub kana_convert_type: KanaConvertType,
    pub match_type: MatchType,
}

impl Default for SearchOptions {
    fn default() -> Self {
        fill_defaults(&SparseSearchOptions::default())
    }
}

impl SearchOptions {
    pub fn get(&self, key: OptionKey) -> OptionValue {
        match key {
            OptionKey::KanaConvertType => OptionValue::KanaConvertType(self.kana_convert_type),
            OptionKey::MatchType => OptionValue::MatchType(self.match_type),
        }
    }

    pub fn set(&mut self, value: OptionValue) {
        match value {
            OptionValue::KanaConvertType(v) => self.kana_convert_type = v,
            OptionValue::MatchType(v) => self.match_type = v,
        }
    }
}

/// Options where any key may be unset. Serializes to the preferences wire
/// format, e.g. `{"kanaConvertType":"kata","matchType":null}`.
///
/// Deserialization is per key: an unrecognised stored value reads as unset
/// instead of failing the whole object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SparseSearchOptions {
    #[serde(deserialize_with = "lenient_value")]
    pub kana_convert_type: Option<KanaConvertType>,
    #[serde(deserialize_with = "lenient_value")]
    pub match_type: Option<MatchType>,
}

fn lenient_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            warn!(value = %raw, "Ignoring unrecognised stored search option");
            Ok(None)
        }
    }
}

impl SparseSearchOptions {
    pub fn get(&self, key: OptionKey) -> Option<OptionValue> {
        match key {
            OptionKey::KanaConvertType => self.kana_convert_type.map(OptionValue::KanaConvertType),
            OptionKey::MatchType => self.match_type.map(OptionValue::MatchType),
        }
    }

    pub fn set(&mut self, value: OptionValue) {
        match value {
            OptionValue::KanaConvertType(v) => self.kana_convert_type = Some(v),
            OptionValue::MatchType(v) => self.match_type = Some(v),
        }
    }

    /// Keys with no explicit value.
    pub fn unset_keys(&self) -> DefaultUsedSet {
        OptionKey::ALL.into_iter().filter(|k| self.get(*k).is_none()).collect()
    }
}

/// Keys whose current value came from [`default_value`] rather than an
/// explicit or remembered choice.
pub type DefaultUsedSet = BTreeSet<OptionKey>;

/// Complete a sparse option set with the hardcoded defaults.
pub fn fill_defaults(sparse: &SparseSearchOptions) -> SearchOptions {
    SearchOptions {
        kana_convert_type: sparse.kana_convert_type.unwrap_or(DEFAULT_KANA_CONVERT_TYPE),
        match_type: sparse.match_type.unwrap_or(DEFAULT_MATCH_TYPE),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
