//! Equality filters forwarded to read endpoints as query parameters.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
    All,
}

impl TimeRange {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::All => "all",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "all" => Ok(Self::All),
            other => Err(ConfigError::UnknownTimeRange(other.to_owned())),
        }
    }
}

/// Filters closed over by a poll session. Fixed for the session's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub time_range: Option<TimeRange>,
    pub department: Option<String>,
    pub category: Option<String>,
}

impl Filters {
    /// Query pairs in a stable order; unset and blank filters are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(range) = self.time_range {
            pairs.push(("timeRange", range.as_str().to_owned()));
        }
        if let Some(department) = non_blank(self.department.as_deref()) {
            pairs.push(("department", department.to_owned()));
        }
        if let Some(category) = non_blank(self.category.as_deref()) {
            pairs.push(("category", category.to_owned()));
        }
        pairs
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
