// src/strategy/patterns.rs

//! Customer traffic patterns.
//!
//! A pattern maps a slot to a relative traffic multiplier. Patterns only shape
//! *where* budget goes; they never depend on the budget itself.

use crate::error::PacingError;
use crate::model::slot::{SLOTS_PER_DAY, SLOTS_PER_HOUR};
use crate::strategy::traits::{lookup, CatalogEntry};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPattern {
    /// Flat traffic all day.
    Uniform,
    /// Morning (9-11h) and evening (19-21h) rush.
    PeakHours,
    /// Gaussian bump centred on 9:30.
    MorningPeak,
    /// Gaussian bump centred on 20:00.
    EveningPeak,
    /// Gentle cosine hill between 10h and 22h.
    Weekend,
}

impl TrafficPattern {
    /// Relative traffic for a slot. Always strictly positive.
    ///
    /// `total_slots` and `reference_start` are part of the contract so that
    /// calendar-aware patterns can be added; none of the current ones need them.
    pub fn weight(
        &self,
        slot_index: usize,
        _total_slots: usize,
        _reference_start: NaiveDateTime,
    ) -> f64 {
        let hour = hour_of_day(slot_index);

        match self {
            TrafficPattern::Uniform => 1.0,
            TrafficPattern::PeakHours => match hour {
                9..=11 | 19..=21 => 2.0,
                7..=8 | 12..=18 | 22..=23 => 1.2,
                _ => 0.5,
            },
            TrafficPattern::MorningPeak => {
                if (7..=12).contains(&hour) {
                    1.0 + 2.0 * gaussian(hour as f64, 9.5, 2.0)
                } else {
                    0.3
                }
            }
            TrafficPattern::EveningPeak => {
                if (17..=23).contains(&hour) {
                    1.0 + 2.5 * gaussian(hour as f64, 20.0, 3.0)
                } else {
                    0.4
                }
            }
            TrafficPattern::Weekend => {
                if (10..=22).contains(&hour) {
                    let normalized = (hour as f64 - 10.0) / 12.0;
                    1.0 + 0.5 + 0.5 * (2.0 * PI * normalized + PI).cos()
                } else {
                    0.3
                }
            }
        }
    }

    /// Weights for the first `total_slots` slots of the reference day (2025-01-01).
    pub fn preview(&self, total_slots: usize) -> Vec<f64> {
        let reference = reference_date();
        (0..total_slots)
            .map(|i| self.weight(i, total_slots, reference))
            .collect()
    }

    /// Preview over a full day.
    pub fn day_preview(&self) -> Vec<f64> {
        self.preview(SLOTS_PER_DAY)
    }
}

fn hour_of_day(slot_index: usize) -> usize {
    (slot_index / SLOTS_PER_HOUR) % 24
}

/// Unnormalized bell curve, 1.0 at `center`.
fn gaussian(x: f64, center: f64, variance: f64) -> f64 {
    (-(x - center).powi(2) / (2.0 * variance)).exp()
}

fn reference_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl CatalogEntry for TrafficPattern {
    const ALL: &'static [Self] = &[
        TrafficPattern::Uniform,
        TrafficPattern::PeakHours,
        TrafficPattern::MorningPeak,
        TrafficPattern::EveningPeak,
        TrafficPattern::Weekend,
    ];

    fn tag(&self) -> &'static str {
        match self {
            TrafficPattern::Uniform => "uniform",
            TrafficPattern::PeakHours => "peak_hours",
            TrafficPattern::MorningPeak => "morning_peak",
            TrafficPattern::EveningPeak => "evening_peak",
            TrafficPattern::Weekend => "weekend",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TrafficPattern::Uniform => "Uniform",
            TrafficPattern::PeakHours => "Peak hours",
            TrafficPattern::MorningPeak => "Morning peak",
            TrafficPattern::EveningPeak => "Evening peak",
            TrafficPattern::Weekend => "Weekend",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            TrafficPattern::Uniform => "Same customer traffic in every time slot",
            TrafficPattern::PeakHours => "Traffic concentrated 9-11h and 19-21h",
            TrafficPattern::MorningPeak => "Traffic concentrated in the morning (7-12h)",
            TrafficPattern::EveningPeak => "Traffic concentrated in the evening (17-23h)",
            TrafficPattern::Weekend => "Smooth rise from late morning, easing off towards 22h",
        }
    }
}

impl FromStr for TrafficPattern {
    type Err = PacingError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        lookup(tag).ok_or_else(|| PacingError::UnknownPattern(tag.to_string()))
    }
}

impl fmt::Display for TrafficPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
