//! Append-only activity log.
//!
//! The whole log lives as one JSON array under a single key. It is bounded:
//! once it holds more than the cap, the oldest entries are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use chrono::NaiveDate;
use tracing::debug;
use codex_core::{ActivityLogEntry, ActivityType, DomainId, EntryId, EpochMillis, Metadata};
use codex_storage::{read_json_or_default, write_json, KeyStore};
use crate::clock::{self, Clock};
use crate::keys::ACTIVITY_LOG_KEY;

/// Number of entries kept by default (two years of daily activity).
pub const DEFAULT_ACTIVITY_LOG_CAP: usize = 730;

/// Bounded, append-only log of user actions.
///
/// Assumes a single writer per store. Two processes appending to the same
/// backing file race and the later write wins.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn KeyStore>,
    clock: Arc<dyn Clock>,
    cap: usize,
}

impl ActivityLog {
    /// Create a log with the default cap.
    pub fn new(store: Arc<dyn KeyStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            cap: DEFAULT_ACTIVITY_LOG_CAP,
        }
    }

    /// Override the number of retained entries.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap.max(1);
        self
    }

    /// Maximum number of retained entries.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Record an action and notify listeners.
    pub fn append(
        &self,
        kind: ActivityType,
        domain_ids: impl IntoIterator<Item = DomainId>,
        message: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> ActivityLogEntry {
        let mut entries = self.read_all();

        // Keep timestamps non-decreasing even if the wall clock steps back.
        let now = self.clock.now_millis();
        let timestamp = entries.last().map_or(now, |last| now.max(last.timestamp));
        let date = clock::day_of(timestamp)
            .map(clock::format_day)
            .unwrap_or_else(|| clock::format_day(self.clock.today()));

        let entry = ActivityLogEntry {
            id: EntryId::new(),
            timestamp,
            date,
            kind,
            domain_ids: domain_ids.into_iter().collect(),
            message: message.into(),
            metadata,
        };
        entries.push(entry.clone());

        if entries.len() > self.cap {
            let overflow = entries.len() - self.cap;
            entries.drain(..overflow);
        }

        write_json(self.store.as_ref(), ACTIVITY_LOG_KEY, &entries);
        debug!(kind = %entry.kind, date = %entry.date, len = entries.len(), "activity appended");
        self.store.notify_changed();
        entry
    }

    /// Every retained entry, oldest first. A corrupt log reads as empty.
    pub fn read_all(&self) -> Vec<ActivityLogEntry> {
        read_json_or_default(self.store.as_ref(), ACTIVITY_LOG_KEY)
    }

    /// The newest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ActivityLogEntry> {
        self.read_all().into_iter().rev().take(limit).collect()
    }

    /// Entries recorded on `day`, oldest first.
    pub fn entries_on(&self, day: NaiveDate) -> Vec<ActivityLogEntry> {
        let date = clock::format_day(day);
        self.read_all()
            .into_iter()
            .filter(|e| e.date == date)
            .collect()
    }

    /// Distinct calendar days with at least one entry.
    pub fn active_days(&self) -> BTreeSet<NaiveDate> {
        self.read_all()
            .iter()
            .filter_map(|e| clock::parse_day(&e.date))
            .collect()
    }

    /// Timestamp of the newest entry.
    pub fn last_activity_at(&self) -> Option<EpochMillis> {
        self.read_all().last().map(|e| e.timestamp)
    }

    /// Number of entries touching each domain.
    pub fn domain_counts(&self) -> BTreeMap<DomainId, u32> {
        let mut counts = BTreeMap::new();
        for entry in self.read_all() {
            for id in entry.domain_ids {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use codex_storage::MemoryStore;
    use crate::clock::FixedClock;

    fn setup() -> (Arc<MemoryStore>, Arc<FixedClock>, ActivityLog) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(
            FixedClock::at_noon(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()).unwrap(),
        );
        let log = ActivityLog::new(store.clone(), clock.clone());
        (store, clock, log)
    }

    #[test]
    fn test_append_stamps_entry() {
        let (_, clock, log) = setup();
        let entry = log.append(ActivityType::Note, [3], "wrote a note", None);

        assert_eq!(entry.timestamp, clock.now_millis());
        assert_eq!(entry.date, "2024-05-20");
        assert!(entry.touches(3));
        assert_eq!(log.read_all(), vec![entry]);
    }

    #[test]
    fn test_cap_drops_oldest_first() {
        let (_, clock, log) = setup();
        let mut appended = Vec::new();
        for i in 0..731 {
            appended.push(log.append(ActivityType::Quiz, [], format!("entry {i}"), None));
            clock.advance(Duration::minutes(1));
        }

        let kept = log.read_all();
        assert_eq!(kept.len(), 730);
        assert_eq!(kept, appended[1..].to_vec());
        assert_eq!(kept[0].message, "entry 1");
        assert_eq!(kept[729].message, "entry 730");
    }

    #[test]
    fn test_custom_cap() {
        let (_, _, log) = setup();
        let log = log.with_cap(3);
        for i in 0..5 {
            log.append(ActivityType::Other, [], i.to_string(), None);
        }
        let messages: Vec<String> = log.read_all().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let (_, clock, log) = setup();
        let first = log.append(ActivityType::Note, [], "a", None);
        clock.advance(Duration::hours(-2));
        let second = log.append(ActivityType::Note, [], "b", None);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_append_notifies() {
        let (store, _, log) = setup();
        log.append(ActivityType::Note, [], "a", None);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_corrupt_log_reads_empty_and_recovers() {
        let (store, _, log) = setup();
        store.set(ACTIVITY_LOG_KEY, "{broken");
        assert!(log.read_all().is_empty());

        log.append(ActivityType::Note, [], "fresh", None);
        assert_eq!(log.read_all().len(), 1);
    }

    #[test]
    fn test_queries() {
        let (_, clock, log) = setup();
        log.append(ActivityType::PointChecked, [1], "a", None);
        log.append(ActivityType::PointChecked, [1, 2], "b", None);
        clock.advance(Duration::days(1));
        let last = log.append(ActivityType::Project, [2], "c", None);

        let recent: Vec<String> = log.recent(2).into_iter().map(|e| e.message).collect();
        assert_eq!(recent, vec!["c", "b"]);

        let day_one = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assert_eq!(log.entries_on(day_one).len(), 2);
        assert_eq!(log.active_days().len(), 2);
        assert_eq!(log.last_activity_at(), Some(last.timestamp));

        let counts = log.domain_counts();
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&2));
    }
}
