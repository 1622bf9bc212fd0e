//! Tracking status values and the status lookup used by every component.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Completion status of a single trackable item.
///
/// Serialized as `pending`, `in_progress` or `complete`.
///
/// # Cycling
///
/// ```text
/// Pending ──> InProgress ──> Complete
///    ▲                          │
///    └──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    /// Not started
    #[default]
    Pending,
    /// Started but not finished
    InProgress,
    /// Done
    Complete,
}

impl TrackingStatus {
    /// All statuses in cycle order.
    pub const ALL: [TrackingStatus; 3] = [Self::Pending, Self::InProgress, Self::Complete];

    /// Next status in the cycle, wrapping from `Complete` back to `Pending`.
    ///
    /// # Example
    ///
    /// ```
    /// use trackmark::TrackingStatus;
    ///
    /// assert_eq!(TrackingStatus::Pending.next(), TrackingStatus::InProgress);
    /// assert_eq!(TrackingStatus::Complete.next(), TrackingStatus::Pending);
    /// ```
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Complete,
            Self::Complete => Self::Pending,
        }
    }

    /// Wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }

    /// Check if this status is `Complete`.
    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tracking status '{0}' (expected pending, in_progress or complete)")]
pub struct ParseStatusError(pub String);

impl FromStr for TrackingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Mapping from item id to its current status.
///
/// Absent ids are `Pending`; always read through [`status_of`].
pub type StatusMap = HashMap<String, TrackingStatus>;

/// Status of `item_id`, defaulting to `Pending` when untracked.
#[must_use]
pub fn status_of(statuses: &StatusMap, item_id: &str) -> TrackingStatus {
    statuses.get(item_id).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        let mut status = TrackingStatus::Pending;
        for _ in 0..3 {
            status = status.next();
        }
        assert_eq!(status, TrackingStatus::Pending);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&TrackingStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: TrackingStatus = serde_json::from_str("\"complete\"").unwrap();
        assert_eq!(parsed, TrackingStatus::Complete);
    }

    #[test]
    fn test_serde_rejects_unknown() {
        assert!(serde_json::from_str::<TrackingStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_from_str_accepts_dash_form() {
        assert_eq!(
            "in-progress".parse::<TrackingStatus>().unwrap(),
            TrackingStatus::InProgress
        );
        assert_eq!(
            " Complete ".parse::<TrackingStatus>().unwrap(),
            TrackingStatus::Complete
        );
        assert!("finished".parse::<TrackingStatus>().is_err());
    }

    #[test]
    fn test_display_matches_wire_name() {
        for status in TrackingStatus::ALL {
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[test]
    fn test_status_of_defaults_to_pending() {
        let mut statuses = StatusMap::new();
        statuses.insert("a".to_string(), TrackingStatus::Complete);
        assert_eq!(status_of(&statuses, "a"), TrackingStatus::Complete);
        assert_eq!(status_of(&statuses, "missing"), TrackingStatus::Pending);
    }
}
