//! Activity entries - the atoms of the streak timeline.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use crate::catalog::DomainId;
use crate::id::EntryId;
use crate::EpochMillis;

/// Free-form metadata attached to an entry.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Category of a tracked user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// A point was checked
    PointChecked,
    /// A point was unchecked
    PointUnchecked,
    /// A domain's points were cleared
    DomainReset,
    /// A quiz attempt was recorded
    Quiz,
    /// A note was written or edited
    Note,
    /// A resource was advanced
    Resource,
    /// A project was advanced
    Project,
    /// A shared snapshot was imported
    Import,
    /// Anything this build does not recognise
    #[serde(other)]
    Other,
}

impl ActivityType {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::PointChecked => "point_checked",
            ActivityType::PointUnchecked => "point_unchecked",
            ActivityType::DomainReset => "domain_reset",
            ActivityType::Quiz => "quiz",
            ActivityType::Note => "note",
            ActivityType::Resource => "resource",
            ActivityType::Project => "project",
            ActivityType::Import => "import",
            ActivityType::Other => "other",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "point_checked" => Ok(ActivityType::PointChecked),
            "point_unchecked" => Ok(ActivityType::PointUnchecked),
            "domain_reset" => Ok(ActivityType::DomainReset),
            "quiz" => Ok(ActivityType::Quiz),
            "note" => Ok(ActivityType::Note),
            "resource" => Ok(ActivityType::Resource),
            "project" => Ok(ActivityType::Project),
            "import" => Ok(ActivityType::Import),
            "other" => Ok(ActivityType::Other),
            _ => Err(format!("unknown activity type: {s}")),
        }
    }
}

/// One recorded user action. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    /// Unique identifier
    pub id: EntryId,

    /// When it happened (epoch milliseconds)
    pub timestamp: EpochMillis,

    /// Local calendar day of `timestamp`, `YYYY-MM-DD`
    pub date: String,

    /// What kind of action
    #[serde(rename = "type")]
    pub kind: ActivityType,

    /// Domains the action touched
    #[serde(default)]
    pub domain_ids: BTreeSet<DomainId>,

    /// Human readable description
    #[serde(default)]
    pub message: String,

    /// Optional extra data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ActivityLogEntry {
    /// Whether this entry touched `domain_id`.
    pub fn touches(&self, domain_id: DomainId) -> bool {
        self.domain_ids.contains(&domain_id)
    }
}
