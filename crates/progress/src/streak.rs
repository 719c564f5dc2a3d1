//! Consecutive-day streaks.

use std::collections::BTreeSet;
use std::sync::Arc;
use chrono::NaiveDate;
use crate::activity::ActivityLog;
use crate::clock::Clock;

/// Streak figures derived from the activity log's day index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakStats {
    /// Consecutive active days ending today (or yesterday, see `current_streak`)
    pub current_streak: u32,
    /// Longest run of consecutive active days anywhere in the log
    pub best_streak: u32,
    /// Distinct days with activity
    pub active_days: u32,
}

/// Derives streaks from the activity log.
#[derive(Clone)]
pub struct StreakCalculator {
    log: ActivityLog,
    clock: Arc<dyn Clock>,
}

impl StreakCalculator {
    /// Create a calculator over `log`.
    pub fn new(log: ActivityLog, clock: Arc<dyn Clock>) -> Self {
        Self { log, clock }
    }

    /// Consecutive active days ending today.
    pub fn current_streak(&self) -> u32 {
        current_streak(&self.log.active_days(), self.clock.today())
    }

    /// Longest run anywhere in the retained log.
    pub fn best_streak(&self) -> u32 {
        best_streak(&self.log.active_days())
    }

    /// Distinct active days in the retained log.
    pub fn active_day_count(&self) -> u32 {
        self.log.active_days().len() as u32
    }

    /// All streak figures from a single read of the log.
    pub fn stats(&self) -> StreakStats {
        let days = self.log.active_days();
        StreakStats {
            current_streak: current_streak(&days, self.clock.today()),
            best_streak: best_streak(&days),
            active_days: days.len() as u32,
        }
    }
}

/// Count consecutive days in `days` walking back from `today`.
///
/// If today has no activity yet, the walk may start from yesterday instead.
/// That grace applies once, from today only; any other gap ends the streak.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = Some(today);
    let mut grace_used = false;

    while let Some(day) = cursor {
        if days.contains(&day) {
            streak += 1;
            cursor = day.pred_opt();
            continue;
        }

        if streak == 0 && !grace_used {
            grace_used = true;
            if let Some(yesterday) = today.pred_opt() {
                if days.contains(&yesterday) {
                    streak = 1;
                    cursor = yesterday.pred_opt();
                    continue;
                }
            }
        }
        break;
    }

    streak
}

/// Longest run of consecutive days in `days`.
pub fn best_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }

    best
}
