//! The engine facade - wires the components over one store.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use codex_core::{
    ActivityLogEntry, ActivityType, AggregatedMasteryData, CompletionKey, CompletionSnapshot,
    DomainId, DomainProgress, Metadata, SharePayload, SubscriptionId, COMPLETION_MARKER,
};
use codex_storage::{KeyStore, Listener};
use crate::activity::{ActivityLog, DEFAULT_ACTIVITY_LOG_CAP};
use crate::catalog::DomainCatalog;
use crate::clock::{Clock, SystemClock};
use crate::mastery::MasteryAggregator;
use crate::share::{ShareCodec, ShareConfig, ShareContext};
use crate::streak::{StreakCalculator, StreakStats};
use crate::tracker::{is_marked, ProgressTracker};
use crate::{ProgressError, Result};

/// Configuration for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Activity entries retained
    pub activity_log_cap: usize,
    /// Share link target
    pub share: ShareConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activity_log_cap: DEFAULT_ACTIVITY_LOG_CAP,
            share: ShareConfig::default(),
        }
    }
}

/// Entry point for callers: progress queries and mutations in one place.
///
/// Queries honour the current `ShareContext`: while viewing a shared
/// snapshot they answer from it and every mutation fails with
/// `ProgressError::ReadOnly`.
pub struct ProgressEngine {
    store: Arc<dyn KeyStore>,
    catalog: Arc<dyn DomainCatalog>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    context: ShareContext,
}

impl ProgressEngine {
    /// Create an engine on the system clock with default configuration.
    pub fn new(store: Arc<dyn KeyStore>, catalog: Arc<dyn DomainCatalog>) -> Self {
        Self {
            store,
            catalog,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
            context: ShareContext::live(),
        }
    }

    /// Set the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the view mode.
    pub fn with_context(mut self, context: ShareContext) -> Self {
        self.context = context;
        self
    }

    /// Current view mode.
    pub fn context(&self) -> &ShareContext {
        &self.context
    }

    /// Whether mutations are disabled.
    pub fn is_read_only(&self) -> bool {
        self.context.is_read_only()
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &dyn DomainCatalog {
        self.catalog.as_ref()
    }

    // === Components ===

    /// Completion tracker over the local store.
    pub fn tracker(&self) -> ProgressTracker {
        ProgressTracker::new(self.store.clone(), self.catalog.clone())
    }

    /// Activity log over the local store.
    pub fn activity_log(&self) -> ActivityLog {
        ActivityLog::new(self.store.clone(), self.clock.clone())
            .with_cap(self.config.activity_log_cap)
    }

    /// Streak calculator over the local activity log.
    pub fn streaks(&self) -> StreakCalculator {
        StreakCalculator::new(self.activity_log(), self.clock.clone())
    }

    /// Mastery aggregator over the local store.
    pub fn mastery(&self) -> MasteryAggregator {
        MasteryAggregator::new(
            self.store.clone(),
            self.tracker(),
            self.activity_log(),
            self.streaks(),
        )
    }

    /// Share codec for the local store.
    pub fn share_codec(&self) -> ShareCodec {
        ShareCodec::new(self.tracker(), self.clock.clone(), self.config.share.clone())
    }

    // === Queries (context aware) ===

    /// Completion of one domain in the current view.
    pub fn domain_progress(&self, domain_id: DomainId) -> DomainProgress {
        self.tracker()
            .get_domain_progress(domain_id, self.context.shared_progress())
    }

    /// Completion of every active domain in the current view.
    pub fn all_domain_progress(&self) -> Vec<DomainProgress> {
        self.tracker()
            .get_all_domain_progress(self.context.shared_progress())
    }

    /// Whether a point is checked in the current view.
    pub fn is_checked(&self, key: &CompletionKey) -> bool {
        self.tracker()
            .is_checked(key, self.context.shared_progress())
    }

    /// Mastery summary in the current view.
    pub fn mastery_data(&self) -> AggregatedMasteryData {
        self.mastery()
            .get_mastery_data(self.context.shared_progress())
    }

    /// Current streak from the local activity log.
    pub fn current_streak(&self) -> u32 {
        self.streaks().current_streak()
    }

    /// All streak figures from the local activity log.
    pub fn streak_stats(&self) -> StreakStats {
        self.streaks().stats()
    }

    /// Every checked key in the local store.
    pub fn full_snapshot(&self) -> CompletionSnapshot {
        self.tracker().get_full_snapshot()
    }

    /// Link sharing the local completion state.
    pub fn share_url(&self) -> String {
        self.share_codec().share_url()
    }

    // === Mutations ===

    /// Check or uncheck a point and log it. Returns false when the point
    /// was already in the requested state.
    pub fn set_point(&self, key: &CompletionKey, checked: bool) -> Result<bool> {
        self.ensure_writable()?;

        let domain = self
            .catalog
            .domain(key.domain_id)
            .filter(|d| d.contains(key))
            .ok_or_else(|| ProgressError::UnknownPoint(key.to_string()))?;

        let raw = key.to_string();
        if is_marked(self.store.as_ref(), &raw) == checked {
            return Ok(false);
        }

        let (kind, verb) = if checked {
            self.store.set(&raw, COMPLETION_MARKER);
            (ActivityType::PointChecked, "Checked")
        } else {
            self.store.remove(&raw);
            (ActivityType::PointUnchecked, "Unchecked")
        };

        let text = domain.point(key).map(|p| p.text.as_str()).unwrap_or_default();
        let mut metadata = Metadata::new();
        metadata.insert("key".to_string(), raw.clone().into());
        self.activity_log().append(
            kind,
            [key.domain_id],
            format!("{verb}: {text}"),
            Some(metadata),
        );

        debug!(key = %raw, checked, "point updated");
        Ok(true)
    }

    /// Flip a point. Returns the new state.
    pub fn toggle_point(&self, key: &CompletionKey) -> Result<bool> {
        let checked = !self.tracker().is_checked(key, None);
        self.set_point(key, checked)?;
        Ok(checked)
    }

    /// Uncheck every point of a domain. Returns how many were cleared.
    pub fn reset_domain(&self, domain_id: DomainId) -> Result<usize> {
        self.ensure_writable()?;

        let domain = self
            .catalog
            .domain(domain_id)
            .ok_or(ProgressError::UnknownDomain(domain_id))?;

        let mut cleared = 0;
        for key in domain.point_keys() {
            let raw = key.to_string();
            if is_marked(self.store.as_ref(), &raw) {
                cleared += 1;
            }
            if self.store.get(&raw).is_some() {
                self.store.remove(&raw);
            }
        }

        if cleared > 0 {
            self.activity_log().append(
                ActivityType::DomainReset,
                [domain_id],
                format!("Reset {}", domain.name),
                None,
            );
        }
        info!(domain = domain_id, cleared, "domain reset");
        Ok(cleared)
    }

    /// Record an action performed by another feature.
    pub fn record_activity(
        &self,
        kind: ActivityType,
        domain_ids: impl IntoIterator<Item = DomainId>,
        message: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Result<ActivityLogEntry> {
        self.ensure_writable()?;
        Ok(self.activity_log().append(kind, domain_ids, message, metadata))
    }

    /// Copy a received snapshot into the local store. Keys the catalog does
    /// not know are skipped. Returns how many points became checked.
    pub fn import_snapshot(&self, payload: &SharePayload) -> Result<usize> {
        self.ensure_writable()?;

        let mut imported = 0;
        let mut domains = BTreeSet::new();
        for raw in payload.checked.iter() {
            let Ok(key) = raw.parse::<CompletionKey>() else {
                continue;
            };
            if !self.catalog.contains(&key) || is_marked(self.store.as_ref(), raw) {
                continue;
            }
            self.store.set(raw, COMPLETION_MARKER);
            domains.insert(key.domain_id);
            imported += 1;
        }

        if imported > 0 {
            self.activity_log().append(
                ActivityType::Import,
                domains,
                format!("Imported {imported} points"),
                None,
            );
        }
        info!(imported, "snapshot imported");
        Ok(imported)
    }

    // === Change notification ===

    /// Register a listener called after every change.
    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Store version; changes whenever derived views may have changed.
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.context.is_read_only() {
            return Err(ProgressError::ReadOnly);
        }
        Ok(())
    }
}
