//! Cross-domain mastery summary.

use std::collections::BTreeMap;
use std::sync::Arc;
use serde::de::DeserializeOwned;
use tracing::debug;
use codex_core::{
    AggregatedMasteryData, CompletionSnapshot, NoteRecord, ProjectRecord, QuizResult,
    ResourceRecord,
};
use codex_storage::{read_json_or_default, KeyStore};
use crate::activity::ActivityLog;
use crate::estimator::{HoursEstimate, HoursEstimator};
use crate::keys::{NOTES_KEY, PROJECTS_KEY, QUIZ_RESULTS_KEY, RESOURCES_KEY};
use crate::streak::StreakCalculator;
use crate::tracker::ProgressTracker;

/// Composes completion, activity and auxiliary stores into one view.
#[derive(Clone)]
pub struct MasteryAggregator {
    store: Arc<dyn KeyStore>,
    tracker: ProgressTracker,
    log: ActivityLog,
    streaks: StreakCalculator,
    estimator: HoursEstimator,
}

/// Auxiliary lists, each empty if its stored JSON is missing, corrupt or
/// not an array. An item that is not an object still counts, with every
/// field absent.
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryRecords {
    /// Quiz attempts
    pub quizzes: Vec<QuizResult>,
    /// Notes
    pub notes: Vec<NoteRecord>,
    /// Resources
    pub resources: Vec<ResourceRecord>,
    /// Projects
    pub projects: Vec<ProjectRecord>,
}

impl AuxiliaryRecords {
    /// Read all four lists from the store.
    pub fn load(store: &dyn KeyStore) -> Self {
        Self {
            quizzes: read_records(store, QUIZ_RESULTS_KEY),
            notes: read_records(store, NOTES_KEY),
            resources: read_records(store, RESOURCES_KEY),
            projects: read_records(store, PROJECTS_KEY),
        }
    }
}

fn read_records<T: DeserializeOwned + Default>(store: &dyn KeyStore, key: &str) -> Vec<T> {
    let items: Vec<serde_json::Value> = read_json_or_default(store, key);
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect()
}

impl MasteryAggregator {
    /// Create an aggregator.
    pub fn new(
        store: Arc<dyn KeyStore>,
        tracker: ProgressTracker,
        log: ActivityLog,
        streaks: StreakCalculator,
    ) -> Self {
        Self {
            store,
            tracker,
            log,
            streaks,
            estimator: HoursEstimator,
        }
    }

    /// Hours estimate from the auxiliary stores alone.
    pub fn hours(&self) -> HoursEstimate {
        let aux = AuxiliaryRecords::load(self.store.as_ref());
        self.estimator
            .estimate(&aux.quizzes, &aux.notes, &aux.resources, &aux.projects)
    }

    /// Full summary. Completion comes from `snapshot` when given; activity,
    /// streak and hours always come from the local store.
    pub fn get_mastery_data(&self, snapshot: Option<&CompletionSnapshot>) -> AggregatedMasteryData {
        let completion_by_domain = self.tracker.get_all_domain_progress(snapshot);

        let total_subjects = completion_by_domain.iter().map(|p| p.total).sum();
        let checked_subjects = completion_by_domain.iter().map(|p| p.checked).sum();

        // Every domain weighs the same regardless of its size.
        let avg_completion = if completion_by_domain.is_empty() {
            0.0
        } else {
            completion_by_domain.iter().map(|p| p.completion).sum::<f64>()
                / completion_by_domain.len() as f64
        };

        let aux = AuxiliaryRecords::load(self.store.as_ref());
        let hours = self
            .estimator
            .estimate(&aux.quizzes, &aux.notes, &aux.resources, &aux.projects);

        let entries = self.log.read_all();
        let last_activity_at = entries.last().map(|e| e.timestamp);

        let mut domain_activity_score: BTreeMap<_, u32> = completion_by_domain
            .iter()
            .map(|p| (p.domain_id, 0))
            .collect();
        for entry in &entries {
            for id in &entry.domain_ids {
                *domain_activity_score.entry(*id).or_insert(0) += 1;
            }
        }

        let data = AggregatedMasteryData {
            completion_by_domain,
            total_subjects,
            checked_subjects,
            avg_completion,
            total_hours_logged: hours.total,
            quiz_count: aux.quizzes.len(),
            note_count: aux.notes.len(),
            resource_count: aux.resources.len(),
            project_count: aux.projects.len(),
            current_streak: self.streaks.current_streak(),
            last_activity_at,
            domain_activity_score,
        };
        debug!(
            avg_completion = data.avg_completion,
            hours = data.total_hours_logged,
            streak = data.current_streak,
            "computed mastery data"
        );
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use codex_core::{ActivityType, CompletionKey, Domain, Point, Subdomain, COMPLETION_MARKER};
    use codex_storage::MemoryStore;
    use crate::catalog::StaticCatalog;
    use crate::clock::FixedClock;

    fn domain(id: u32, points: usize) -> Domain {
        Domain {
            id,
            name: format!("Domain {id}"),
            active: true,
            subdomains: vec![Subdomain {
                title: "All".to_string(),
                points: (0..points).map(|p| Point { text: p.to_string() }).collect(),
            }],
        }
    }

    fn setup(domains: Vec<Domain>) -> (Arc<MemoryStore>, ActivityLog, MasteryAggregator) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(
            FixedClock::at_noon(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).unwrap(),
        );
        let catalog = Arc::new(StaticCatalog::new(domains).unwrap());
        let tracker = ProgressTracker::new(store.clone(), catalog);
        let log = ActivityLog::new(store.clone(), clock.clone());
        let streaks = StreakCalculator::new(log.clone(), clock);
        let aggregator = MasteryAggregator::new(store.clone(), tracker, log.clone(), streaks);
        (store, log, aggregator)
    }

    #[test]
    fn test_average_is_not_size_weighted() {
        let (store, _, aggregator) = setup(vec![domain(1, 2), domain(2, 20)]);
        store.set(&CompletionKey::new(1, 0, 0).to_string(), COMPLETION_MARKER);
        store.set(&CompletionKey::new(1, 0, 1).to_string(), COMPLETION_MARKER);

        let data = aggregator.get_mastery_data(None);
        assert_eq!(data.avg_completion, 50.0);
        assert_eq!(data.total_subjects, 22);
        assert_eq!(data.checked_subjects, 2);
    }

    #[test]
    fn test_empty_catalog() {
        let (_, _, aggregator) = setup(vec![]);
        let data = aggregator.get_mastery_data(None);
        assert_eq!(data.avg_completion, 0.0);
        assert!(data.completion_by_domain.is_empty());
        assert_eq!(data.total_hours_logged, 0.0);
        assert_eq!(data.current_streak, 0);
        assert_eq!(data.last_activity_at, None);
    }

    #[test]
    fn test_hours_from_single_note() {
        let (store, _, aggregator) = setup(vec![domain(1, 1)]);
        store.set(NOTES_KEY, r#"[{"wordCount": 440}]"#);

        let data = aggregator.get_mastery_data(None);
        assert_eq!(data.total_hours_logged, 2.0);
        assert_eq!(data.note_count, 1);
        assert_eq!(aggregator.hours().note_hours, 2.0);
    }

    #[test]
    fn test_corrupt_aux_store_contributes_zero() {
        let (store, _, aggregator) = setup(vec![domain(1, 1)]);
        store.set(NOTES_KEY, r#"[{"wordCount": 440}]"#);
        store.set(QUIZ_RESULTS_KEY, "not json");
        store.set(RESOURCES_KEY, r#"{"progress": 100}"#);
        store.set(PROJECTS_KEY, r#"[{"progress": 100, "difficulty": 1}]"#);

        let data = aggregator.get_mastery_data(None);
        assert_eq!(data.quiz_count, 0);
        assert_eq!(data.resource_count, 0);
        assert_eq!(data.project_count, 1);
        // 2.0 note hours + 2.2 project hours
        assert_eq!(data.total_hours_logged, 4.2);
    }

    #[test]
    fn test_mistyped_fields_keep_their_records() {
        let (store, _, aggregator) = setup(vec![domain(1, 1)]);
        store.set(NOTES_KEY, r#"[{"domain": "3", "wordCount": 440}]"#);
        store.set(QUIZ_RESULTS_KEY, r#"[{"score": 7.5, "total": 10}, {"score": 3, "total": 5}]"#);
        store.set(RESOURCES_KEY, r#"[{"domains": "all", "progress": 100}, 4]"#);
        store.set(PROJECTS_KEY, r#"[{"domains": [1, "x"], "difficulty": "?", "progress": 50}]"#);

        let data = aggregator.get_mastery_data(None);
        assert_eq!(data.note_count, 1);
        assert_eq!(data.quiz_count, 2);
        assert_eq!(data.resource_count, 2);
        assert_eq!(data.project_count, 1);
        // 2.0 note + 0.5 quiz + 0.4 resource + 0.6 project
        assert_eq!(data.total_hours_logged, 3.5);
    }

    #[test]
    fn test_activity_scores_and_streak() {
        let (_, log, aggregator) = setup(vec![domain(1, 1), domain(2, 1), domain(3, 1)]);
        log.append(ActivityType::PointChecked, [1], "a", None);
        log.append(ActivityType::Note, [1, 2], "b", None);
        let last = log.append(ActivityType::Project, [7], "c", None);

        let data = aggregator.get_mastery_data(None);
        assert_eq!(data.domain_activity_score.get(&1), Some(&2));
        assert_eq!(data.domain_activity_score.get(&2), Some(&1));
        assert_eq!(data.domain_activity_score.get(&3), Some(&0));
        assert_eq!(data.domain_activity_score.get(&7), Some(&1));
        assert_eq!(data.current_streak, 1);
        assert_eq!(data.last_activity_at, Some(last.timestamp));
    }

    #[test]
    fn test_shared_snapshot_drives_completion_only() {
        let (store, _, aggregator) = setup(vec![domain(1, 4)]);
        store.set(NOTES_KEY, r#"[{"wordCount": 440}]"#);

        let mut shared = CompletionSnapshot::new();
        shared.insert("codex_d1_s0_p0");
        shared.insert("codex_d1_s0_p3");

        let data = aggregator.get_mastery_data(Some(&shared));
        assert_eq!(data.checked_subjects, 2);
        assert_eq!(data.avg_completion, 50.0);
        assert_eq!(data.total_hours_logged, 2.0);
    }
}
