//! Share links - portable, read-only snapshots of completion state.
//!
//! A payload is serialized to JSON and base64 encoded; the link carries it
//! percent-escaped in the `share` query parameter.

use std::sync::Arc;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;
use codex_core::{CompletionSnapshot, EpochMillis, SharePayload};
use crate::clock::Clock;
use crate::tracker::ProgressTracker;

/// Query parameter carrying an encoded payload.
pub const SHARE_PARAM: &str = "share";

/// Where share links point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Scheme, host and port, without a trailing slash
    pub origin: String,
    /// Application path
    pub path: String,
    /// In-app route opened by the link
    pub route: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5173".to_string(),
            path: "/".to_string(),
            route: "/progress".to_string(),
        }
    }
}

/// Encodes the live completion state and decodes received links.
#[derive(Clone)]
pub struct ShareCodec {
    tracker: ProgressTracker,
    clock: Arc<dyn Clock>,
    config: ShareConfig,
}

impl ShareCodec {
    /// Create a codec.
    pub fn new(tracker: ProgressTracker, clock: Arc<dyn Clock>, config: ShareConfig) -> Self {
        Self {
            tracker,
            clock,
            config,
        }
    }

    /// Snapshot every checked key in the local store and encode it.
    pub fn encode(&self) -> String {
        let payload = SharePayload {
            created_at: self.clock.now_millis(),
            checked: self.tracker.get_full_snapshot(),
        };
        debug!(keys = payload.checked.len(), "encoding share payload");
        Self::encode_payload(&payload)
    }

    /// Encode an arbitrary payload.
    pub fn encode_payload(payload: &SharePayload) -> String {
        // A map of strings always serializes.
        let json = serde_json::to_string(payload).unwrap_or_default();
        STANDARD.encode(json.as_bytes())
    }

    /// Reverse `encode`. Anything malformed yields `None`.
    pub fn decode(text: &str) -> Option<SharePayload> {
        let bytes = STANDARD.decode(text.trim()).ok()?;
        let json = String::from_utf8(bytes).ok()?;
        match serde_json::from_str::<SharePayload>(&json) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(error = %e, "rejecting share payload");
                None
            }
        }
    }

    /// Link that opens the configured route with `encoded` attached.
    pub fn build_share_url(&self, encoded: &str) -> String {
        format!(
            "{}{}#{}?{}={}",
            self.config.origin,
            self.config.path,
            self.config.route,
            SHARE_PARAM,
            urlencoding::encode(encoded)
        )
    }

    /// Encode the live state and wrap it in a link.
    pub fn share_url(&self) -> String {
        self.build_share_url(&self.encode())
    }
}

/// Session-scoped view mode.
///
/// A shared context answers every progress query from the received
/// snapshot and refuses all mutation. It is never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareContext {
    shared: Option<SharePayload>,
}

impl ShareContext {
    /// Normal, writable mode backed by the local store.
    pub fn live() -> Self {
        Self::default()
    }

    /// Read-only mode over `payload`.
    pub fn shared(payload: SharePayload) -> Self {
        Self {
            shared: Some(payload),
        }
    }

    /// Build from a query string (`a=1&share=...`). A missing or malformed
    /// `share` parameter yields the live context.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let encoded = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| *name == SHARE_PARAM)
            .and_then(|(_, value)| urlencoding::decode(value).ok());

        match encoded.and_then(|value| ShareCodec::decode(&value)) {
            Some(payload) => Self::shared(payload),
            None => Self::live(),
        }
    }

    /// Build from a full link. Handles both `path?share=..#route` and
    /// hash routes of the form `path#route?share=..`.
    pub fn from_url(url: &str) -> Self {
        let Some((_, query)) = url.split_once('?') else {
            return Self::live();
        };
        let query = query.split('#').next().unwrap_or_default();
        Self::from_query(query)
    }

    /// Whether mutation is disabled.
    pub fn is_read_only(&self) -> bool {
        self.shared.is_some()
    }

    /// Snapshot every progress query must use instead of the store.
    pub fn shared_progress(&self) -> Option<&CompletionSnapshot> {
        self.shared.as_ref().map(|p| &p.checked)
    }

    /// When the viewed snapshot was taken.
    pub fn shared_at(&self) -> Option<EpochMillis> {
        self.shared.as_ref().map(|p| p.created_at)
    }

    /// The full received payload.
    pub fn payload(&self) -> Option<&SharePayload> {
        self.shared.as_ref()
    }
}
