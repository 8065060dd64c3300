use std::fmt;

use crate::model::WorkItemId;

/// Machine-readable error codes for callers that need to flag a bad snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidConfig,
    SnapshotParseError,
    UnknownWorkItem,
    MissingTimes,
    UnknownType,
    InvalidTimeline,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidConfig => "E1002",
            Self::SnapshotParseError => "E2001",
            Self::UnknownWorkItem => "E2002",
            Self::MissingTimes => "E2003",
            Self::UnknownType => "E2004",
            Self::InvalidTimeline => "E2005",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Engine config parse error",
            Self::InvalidConfig => "Engine config is invalid",
            Self::SnapshotParseError => "Overview snapshot parse error",
            Self::UnknownWorkItem => "Relation references an unknown work item",
            Self::MissingTimes => "Work item has no state history",
            Self::UnknownType => "Work item references an unknown type",
            Self::InvalidTimeline => "Work item ends before it starts",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the engine config file and retry."),
            Self::InvalidConfig => {
                Some("Use a window of 1 to 3650 days and strictly ascending size thresholds.")
            }
            Self::SnapshotParseError => Some("Re-run the scraper to produce a fresh snapshot."),
            Self::UnknownWorkItem | Self::MissingTimes | Self::UnknownType => {
                Some("The snapshot is incomplete; discard it and wait for the next refresh.")
            }
            Self::InvalidTimeline => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Upstream contract violations and configuration errors.
///
/// Data-quality conditions the engine can recover from (missing timestamps,
/// orphan groups, relation cycles, stale toggle paths) never show up here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("relation of {referenced_by} references unknown work item {id}")]
    UnknownWorkItem {
        id: WorkItemId,
        referenced_by: WorkItemId,
    },

    #[error("work item {id} has no entry in times")]
    MissingTimes { id: WorkItemId },

    #[error("work item {id} references unknown type '{type_id}'")]
    UnknownType { id: WorkItemId, type_id: String },

    #[error("work item {id} ends before it starts")]
    InvalidTimeline { id: WorkItemId },

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse overview snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// The stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownWorkItem { .. } => ErrorCode::UnknownWorkItem,
            Self::MissingTimes { .. } => ErrorCode::MissingTimes,
            Self::UnknownType { .. } => ErrorCode::UnknownType,
            Self::InvalidTimeline { .. } => ErrorCode::InvalidTimeline,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::Json(_) => ErrorCode::SnapshotParseError,
        }
    }
}
