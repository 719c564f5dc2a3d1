//! Derived progress records.

use std::collections::{BTreeMap, BTreeSet};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use crate::catalog::DomainId;
use crate::key::{CompletionKey, COMPLETION_MARKER};
use crate::EpochMillis;

/// Completion of one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainProgress {
    /// Domain identifier
    pub domain_id: DomainId,

    /// Checked points
    pub checked: usize,

    /// Points in the catalog
    pub total: usize,

    /// Percentage complete (0-100)
    pub completion: f64,
}

impl DomainProgress {
    /// Build a record, deriving `completion` from the counts.
    pub fn new(domain_id: DomainId, checked: usize, total: usize) -> Self {
        let completion = if total > 0 {
            checked as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            domain_id,
            checked,
            total,
            completion,
        }
    }

    /// Record for a domain the catalog does not know.
    pub fn empty(domain_id: DomainId) -> Self {
        Self::new(domain_id, 0, 0)
    }
}

/// The set of checked completion keys at one point in time.
///
/// On the wire this is an object mapping each key to `"true"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSnapshot {
    keys: BTreeSet<String>,
}

impl CompletionSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as checked.
    pub fn insert(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    /// Whether the key is checked.
    pub fn contains(&self, key: &CompletionKey) -> bool {
        self.keys.contains(&key.to_string())
    }

    /// Whether the raw key string is checked.
    pub fn contains_str(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of checked keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is checked.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate the checked keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl FromIterator<String> for CompletionSnapshot {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl Serialize for CompletionSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for key in &self.keys {
            map.serialize_entry(key, COMPLETION_MARKER)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CompletionSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = CompletionSnapshot;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a map of completion keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut snapshot = CompletionSnapshot::new();
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            // Only canonical keys with a truthy marker count as checked.
            let truthy = match &value {
                serde_json::Value::String(s) => s == COMPLETION_MARKER,
                serde_json::Value::Bool(b) => *b,
                _ => false,
            };
            if truthy && CompletionKey::matches(&key) {
                snapshot.insert(key);
            }
        }
        Ok(snapshot)
    }
}

/// Cross-domain summary. Recomputed on every query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMasteryData {
    /// Per-domain completion in catalog order
    pub completion_by_domain: Vec<DomainProgress>,
    /// Sum of catalog totals
    pub total_subjects: usize,
    /// Sum of checked points
    pub checked_subjects: usize,
    /// Unweighted mean of per-domain completion
    pub avg_completion: f64,
    /// Heuristic hours estimate, one decimal place
    pub total_hours_logged: f64,
    /// Recorded quiz attempts
    pub quiz_count: usize,
    /// Notes written
    pub note_count: usize,
    /// Resources tracked
    pub resource_count: usize,
    /// Projects tracked
    pub project_count: usize,
    /// Consecutive active days ending today
    pub current_streak: u32,
    /// Timestamp of the newest activity entry
    pub last_activity_at: Option<EpochMillis>,
    /// Activity entries per domain
    pub domain_activity_score: BTreeMap<DomainId, u32>,
}
