//! Codex core data models.
//!
//! This crate defines the data structures shared by the storage layer and
//! the progress engine: completion keys, the curriculum catalog, activity
//! entries, derived progress records and the share payload.

#![warn(missing_docs)]

// Core identities
mod id;
mod key;

// Curriculum
mod catalog;

// Activity and derived views
mod activity;
mod progress;
mod records;
mod share;

// Re-exports
pub use id::*;
pub use key::{CompletionKey, KeyParseError, COMPLETION_KEY_PREFIX, COMPLETION_MARKER};

pub use catalog::{Domain, DomainId, Point, Subdomain};

pub use activity::{ActivityLogEntry, ActivityType, Metadata};
pub use progress::{AggregatedMasteryData, CompletionSnapshot, DomainProgress};
pub use records::{NoteRecord, ProjectRecord, QuizResult, ResourceRecord};
pub use share::SharePayload;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// Format used for calendar-day strings (`2024-03-09`).
pub const DAY_FORMAT: &str = "%Y-%m-%d";
