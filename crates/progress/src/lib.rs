//! Progress Aggregation & Streak Engine
//!
//! Domain completion, activity logging, streaks, the mastery summary and
//! share links, all derived on demand from a `KeyStore`.

#![warn(missing_docs)]

pub mod error;
pub mod keys;
pub mod clock;
pub mod catalog;
pub mod tracker;
pub mod activity;
pub mod streak;
pub mod estimator;
pub mod mastery;
pub mod share;
pub mod engine;

pub use error::{ProgressError, Result};
pub use clock::{Clock, FixedClock, SystemClock};
pub use catalog::{DomainCatalog, StaticCatalog};
pub use tracker::ProgressTracker;
pub use activity::{ActivityLog, DEFAULT_ACTIVITY_LOG_CAP};
pub use streak::{StreakCalculator, StreakStats};
pub use estimator::{HoursEstimate, HoursEstimator};
pub use mastery::{AuxiliaryRecords, MasteryAggregator};
pub use share::{ShareCodec, ShareConfig, ShareContext, SHARE_PARAM};
pub use engine::{EngineConfig, ProgressEngine};
