//! Domain completion tracking.

use std::sync::Arc;
use tracing::debug;
use codex_core::{CompletionKey, CompletionSnapshot, DomainId, DomainProgress, COMPLETION_MARKER};
use codex_storage::KeyStore;
use crate::catalog::DomainCatalog;

/// Computes completion from the catalog and the store.
///
/// Nothing is cached: every call walks the catalog for totals and reads the
/// store (or the supplied override snapshot) for checked state.
#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn KeyStore>,
    catalog: Arc<dyn DomainCatalog>,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new(store: Arc<dyn KeyStore>, catalog: Arc<dyn DomainCatalog>) -> Self {
        Self { store, catalog }
    }

    /// The catalog totals come from.
    pub fn catalog(&self) -> &dyn DomainCatalog {
        self.catalog.as_ref()
    }

    /// Whether a point is checked, answered from `snapshot` when given.
    pub fn is_checked(&self, key: &CompletionKey, snapshot: Option<&CompletionSnapshot>) -> bool {
        match snapshot {
            Some(snapshot) => snapshot.contains(key),
            None => is_marked(self.store.as_ref(), &key.to_string()),
        }
    }

    /// Completion of one domain. Unknown domains report zero of zero.
    pub fn get_domain_progress(
        &self,
        domain_id: DomainId,
        snapshot: Option<&CompletionSnapshot>,
    ) -> DomainProgress {
        let Some(domain) = self.catalog.domain(domain_id) else {
            return DomainProgress::empty(domain_id);
        };

        let mut total = 0;
        let mut checked = 0;
        for key in domain.point_keys() {
            total += 1;
            if self.is_checked(&key, snapshot) {
                checked += 1;
            }
        }

        DomainProgress::new(domain_id, checked, total)
    }

    /// Completion of every active domain, in catalog order.
    pub fn get_all_domain_progress(
        &self,
        snapshot: Option<&CompletionSnapshot>,
    ) -> Vec<DomainProgress> {
        let progress: Vec<DomainProgress> = self
            .catalog
            .active_domains()
            .into_iter()
            .map(|d| self.get_domain_progress(d.id, snapshot))
            .collect();
        debug!(domains = progress.len(), shared = snapshot.is_some(), "computed domain progress");
        progress
    }

    /// Every checked key in the store, across the whole catalog and beyond.
    pub fn get_full_snapshot(&self) -> CompletionSnapshot {
        let store = self.store.as_ref();
        store
            .scan_keys(&CompletionKey::matches)
            .into_iter()
            .filter(|k| is_marked(store, k))
            .collect()
    }
}

/// A point is checked iff its key holds the completion marker.
pub(crate) fn is_marked(store: &dyn KeyStore, key: &str) -> bool {
    store.get(key).as_deref() == Some(COMPLETION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codex_core::{Domain, Point, Subdomain};
    use codex_storage::MemoryStore;
    use crate::catalog::StaticCatalog;

    fn domain(id: DomainId, sizes: &[usize]) -> Domain {
        Domain {
            id,
            name: format!("Domain {id}"),
            active: true,
            subdomains: sizes
                .iter()
                .enumerate()
                .map(|(i, n)| Subdomain {
                    title: format!("Sub {i}"),
                    points: (0..*n).map(|p| Point { text: format!("Point {p}") }).collect(),
                })
                .collect(),
        }
    }

    fn setup(domains: Vec<Domain>) -> (Arc<MemoryStore>, ProgressTracker) {
        let store = Arc::new(MemoryStore::new());
        let catalog = Arc::new(StaticCatalog::new(domains).unwrap());
        let tracker = ProgressTracker::new(store.clone(), catalog);
        (store, tracker)
    }

    #[test]
    fn test_every_checked_count_yields_exact_progress() {
        let d = domain(1, &[3, 0, 4]);
        let keys: Vec<CompletionKey> = d.point_keys().collect();
        let total = keys.len();

        for k in 0..=total {
            let (store, tracker) = setup(vec![d.clone()]);
            for key in keys.iter().take(k) {
                store.set(&key.to_string(), COMPLETION_MARKER);
            }

            let progress = tracker.get_domain_progress(1, None);
            assert_eq!(progress, DomainProgress::new(1, k, total));
            assert_eq!(progress.completion, k as f64 / total as f64 * 100.0);
        }
    }

    #[test]
    fn test_empty_domain_is_zero_percent() {
        let (_, tracker) = setup(vec![domain(5, &[])]);
        let progress = tracker.get_domain_progress(5, None);
        assert_eq!((progress.checked, progress.total, progress.completion), (0, 0, 0.0));
    }

    #[test]
    fn test_unknown_domain_is_zero() {
        let (_, tracker) = setup(vec![domain(1, &[2])]);
        assert_eq!(tracker.get_domain_progress(42, None), DomainProgress::empty(42));
    }

    #[test]
    fn test_non_marker_values_do_not_count() {
        let (store, tracker) = setup(vec![domain(1, &[2])]);
        store.set("codex_d1_s0_p0", "false");
        store.set("codex_d1_s0_p1", "yes");
        assert_eq!(tracker.get_domain_progress(1, None).checked, 0);
        assert!(tracker.get_full_snapshot().is_empty());
    }

    #[test]
    fn test_keys_outside_catalog_are_ignored_by_counts() {
        let (store, tracker) = setup(vec![domain(1, &[1])]);
        store.set("codex_d1_s0_p0", "true");
        store.set("codex_d1_s0_p9", "true");
        let progress = tracker.get_domain_progress(1, None);
        assert_eq!((progress.checked, progress.total), (1, 1));

        // The full snapshot is not limited to the catalog.
        assert_eq!(tracker.get_full_snapshot().len(), 2);
    }

    #[test]
    fn test_snapshot_override_ignores_store() {
        let (store, tracker) = setup(vec![domain(1, &[2]), domain(2, &[2])]);
        store.set("codex_d1_s0_p0", "true");
        store.set("codex_d1_s0_p1", "true");

        let mut shared = CompletionSnapshot::new();
        shared.insert("codex_d2_s0_p1");

        let all = tracker.get_all_domain_progress(Some(&shared));
        assert_eq!(all[0].checked, 0);
        assert_eq!(all[1].checked, 1);

        let live = tracker.get_all_domain_progress(None);
        assert_eq!(live[0].checked, 2);
        assert_eq!(live[1].checked, 0);
    }

    #[test]
    fn test_all_progress_follows_catalog_order_and_skips_inactive() {
        let mut hidden = domain(2, &[1]);
        hidden.active = false;
        let (_, tracker) = setup(vec![domain(9, &[1]), hidden, domain(3, &[1])]);
        let ids: Vec<DomainId> = tracker
            .get_all_domain_progress(None)
            .iter()
            .map(|p| p.domain_id)
            .collect();
        assert_eq!(ids, vec![9, 3]);
    }

    #[test]
    fn test_full_snapshot_only_holds_completion_keys() {
        let (store, tracker) = setup(vec![domain(1, &[2])]);
        store.set("codex_d1_s0_p1", "true");
        store.set("codex_activity_log", "[]");
        store.set("theme", "true");

        let snapshot = tracker.get_full_snapshot();
        assert_eq!(snapshot.iter().collect::<Vec<_>>(), vec!["codex_d1_s0_p1"]);
    }

    #[test]
    fn test_recomputes_after_catalog_change() {
        let store = Arc::new(MemoryStore::new());
        store.set("codex_d1_s0_p0", "true");

        let small = ProgressTracker::new(
            store.clone(),
            Arc::new(StaticCatalog::new(vec![domain(1, &[1])]).unwrap()),
        );
        let large = ProgressTracker::new(
            store,
            Arc::new(StaticCatalog::new(vec![domain(1, &[4])]).unwrap()),
        );
        assert_eq!(small.get_domain_progress(1, None).completion, 100.0);
        assert_eq!(large.get_domain_progress(1, None).completion, 25.0);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use codex_core::{Domain, Point, Subdomain};
    use codex_storage::MemoryStore;
    use proptest::prelude::*;
    use crate::catalog::StaticCatalog;

    // Subdomain sizes plus one checked flag per point.
    fn arb_domain() -> impl Strategy<Value = (Vec<usize>, Vec<bool>)> {
        prop::collection::vec(0usize..8, 0..6).prop_flat_map(|sizes| {
            let total = sizes.iter().sum::<usize>();
            (Just(sizes), prop::collection::vec(any::<bool>(), total))
        })
    }

    proptest! {
        #[test]
        fn prop_progress_counts_checked_points(
            (sizes, flags) in arb_domain(),
            from_snapshot in any::<bool>()
        ) {
            let domain = Domain {
                id: 3,
                name: "Sampled".to_string(),
                active: true,
                subdomains: sizes
                    .iter()
                    .map(|n| Subdomain {
                        title: format!("{n} points"),
                        points: (0..*n).map(|p| Point { text: p.to_string() }).collect(),
                    })
                    .collect(),
            };
            let keys: Vec<CompletionKey> = domain.point_keys().collect();

            let store = Arc::new(MemoryStore::new());
            let catalog = Arc::new(StaticCatalog::new(vec![domain]).unwrap());
            let tracker = ProgressTracker::new(store.clone(), catalog);

            let mut snapshot = CompletionSnapshot::new();
            let mut checked = 0;
            for (key, on) in keys.iter().zip(&flags) {
                if *on {
                    if from_snapshot {
                        snapshot.insert(key.to_string());
                    } else {
                        store.set(&key.to_string(), COMPLETION_MARKER);
                    }
                    checked += 1;
                }
            }

            let progress = tracker.get_domain_progress(3, from_snapshot.then_some(&snapshot));
            prop_assert_eq!(progress.checked, checked);
            prop_assert_eq!(progress.total, keys.len());
            prop_assert!((0.0..=100.0).contains(&progress.completion));
            if keys.is_empty() {
                prop_assert_eq!(progress.completion, 0.0);
            } else {
                prop_assert_eq!(progress.completion, checked as f64 / keys.len() as f64 * 100.0);
            }
            if checked == keys.len() && !keys.is_empty() {
                prop_assert_eq!(progress.completion, 100.0);
            }
        }
    }
}
