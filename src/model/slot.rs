// src/model/slot.rs

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Length of one delivery slot.
pub const SLOT_DURATION_MINUTES: i64 = 10;
/// 60 / SLOT_DURATION_MINUTES
pub const SLOTS_PER_HOUR: usize = 6;
/// One day of 10-minute slots.
pub const SLOTS_PER_DAY: usize = 24 * SLOTS_PER_HOUR;

pub fn slot_duration() -> Duration {
    Duration::minutes(SLOT_DURATION_MINUTES)
}

/// One fixed 10-minute interval of the campaign day.
///
/// Slots are plain values: every engine stage returns a new copy rather than
/// editing the caller's sequence. `actual` and `completed` are set exactly once,
/// `planned` may be rewritten until the slot completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub planned: u64,
    pub actual: u64,
    pub completed: bool,
}

impl TimeSlot {
    /// A fresh slot starting `index` slots after `campaign_start`.
    pub fn new(index: usize, campaign_start: NaiveDateTime, planned: u64) -> Self {
        let start = campaign_start + Duration::minutes(SLOT_DURATION_MINUTES * index as i64);
        Self {
            index,
            start,
            end: start + slot_duration(),
            planned,
            actual: 0,
            completed: false,
        }
    }

    /// Copy with a new planned allocation. Completed slots keep their plan.
    pub fn with_planned(self, planned: u64) -> Self {
        if self.completed {
            return self;
        }
        Self { planned, ..self }
    }

    /// Copy marked as delivered. `actual` is capped at the planned amount.
    pub fn completed_with(self, actual: u64) -> Self {
        if self.completed {
            return self;
        }
        Self {
            actual: actual.min(self.planned),
            completed: true,
            ..self
        }
    }

    pub fn has_ended_by(&self, now: NaiveDateTime) -> bool {
        now >= self.end
    }
}

/// Planned budget still ahead plus what has already been delivered.
///
/// Equals the campaign's total budget right after every redistribution.
pub fn budget_accounted(slots: &[TimeSlot]) -> u64 {
    slots
        .iter()
        .map(|slot| if slot.completed { slot.actual } else { slot.planned })
        .sum()
}
