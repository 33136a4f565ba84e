//! Normalized, display-ready record projections.
//!
//! DESIGN
//! ======
//! Each dashboard widget polls a different endpoint, but every widget holds a
//! flat list of rows keyed by `id`. The `Record` trait is that contract. The
//! backend mixes numeric and string IDs, so IDs are normalized to strings on
//! the way in.

use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} record: {reason}")]
pub struct RecordError {
    pub kind: &'static str,
    pub reason: String,
}

/// A row owned by a view state store. Replaced wholesale on every successful fetch.
pub trait Record: DeserializeOwned + Serialize + Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Short name used in logs and CLI output.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Project one raw API item into this record shape.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the item is not an object or lacks a required field.
    fn from_value(value: &Value) -> Result<Self, RecordError> {
        Self::deserialize(value).map_err(|e| RecordError { kind: Self::KIND, reason: e.to_string() })
    }
}

/// Accepts `1` or `"1"`.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

// =============================================================================
// LEADERBOARD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, alias = "userName")]
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(alias = "totalPoints")]
    pub points: i64,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub rank: Option<u32>,
}

impl Record for LeaderboardEntry {
    const KIND: &'static str = "leaderboard";

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// CONTENT SYNC LOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(alias = "system")]
    pub source: String,
    pub status: String,
    #[serde(default, alias = "itemsSynced")]
    pub items: u64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Record for SyncLogEntry {
    const KIND: &'static str = "sync";

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// ACTIVITY FEED
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(alias = "userName")]
    pub user: String,
    pub action: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Record for ActivityItem {
    const KIND: &'static str = "activity";

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// RAW
// =============================================================================

/// Untyped row for endpoints without a dedicated projection. Everything but
/// `id` is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record for RawRecord {
    const KIND: &'static str = "raw";

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// KIND SELECTION
// =============================================================================

/// Record projection chosen at runtime, e.g. from a CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Leaderboard,
    Sync,
    Activity,
    Raw,
}

impl RecordKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leaderboard => LeaderboardEntry::KIND,
            Self::Sync => SyncLogEntry::KIND,
            Self::Activity => ActivityItem::KIND,
            Self::Raw => RawRecord::KIND,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leaderboard" => Ok(Self::Leaderboard),
            "sync" => Ok(Self::Sync),
            "activity" => Ok(Self::Activity),
            "raw" => Ok(Self::Raw),
            _ => Err(ConfigError::UnknownRecordKind(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
