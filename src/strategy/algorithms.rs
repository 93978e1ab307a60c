// src/strategy/algorithms.rs

use crate::error::PacingError;
use crate::strategy::patterns::TrafficPattern;
use crate::strategy::traits::{lookup, CatalogEntry};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Strategies for splitting a total impression budget across slots.
///
/// Every variant guarantees `sum(result) == total_budget` and returns exactly
/// `slot_count` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionAlgorithm {
    Equal,
    Weighted,
    PeakHours,
    FrontLoaded,
}

/// Exponent applied to pattern weights by the peak-hours algorithm.
const PEAK_SHARPENING: f64 = 1.5;
/// Decay horizon of front loading, as a fraction of the slot count.
const FRONT_LOAD_DECAY: f64 = 0.3;
/// Per-remaining-slot normalization of front loading.
const FRONT_LOAD_SPREAD: f64 = 0.1;

impl DistributionAlgorithm {
    pub fn distribute(
        &self,
        total_budget: u64,
        slot_count: usize,
        start: NaiveDateTime,
        pattern: TrafficPattern,
    ) -> Vec<u64> {
        if slot_count == 0 {
            return Vec::new();
        }

        match self {
            DistributionAlgorithm::Equal => equal_split(total_budget, slot_count),
            DistributionAlgorithm::Weighted => {
                let weights = pattern_weights(pattern, slot_count, start);
                let mut allocation = proportional_floor(total_budget, &weights);
                let shortfall = total_budget - allocation.iter().sum::<u64>();
                if let Some(last) = allocation.last_mut() {
                    *last += shortfall;
                }
                allocation
            }
            DistributionAlgorithm::PeakHours => {
                let raw = pattern_weights(pattern, slot_count, start);
                let sharpened: Vec<f64> = raw.iter().map(|w| w.powf(PEAK_SHARPENING)).collect();
                let mut allocation = proportional_floor(total_budget, &sharpened);
                let shortfall = total_budget - allocation.iter().sum::<u64>();
                // Shortfall goes to the busiest slot by *raw* weight, first one on ties.
                allocation[argmax(&raw)] += shortfall;
                allocation
            }
            DistributionAlgorithm::FrontLoaded => {
                front_loaded(total_budget, slot_count, start, pattern)
            }
        }
    }
}

/// `base` everywhere, plus one extra for each of the first `total % slots` slots.
///
/// Shared with redistribution, which uses the same integer split.
pub fn equal_split(total: u64, slot_count: usize) -> Vec<u64> {
    if slot_count == 0 {
        return Vec::new();
    }
    let slots = slot_count as u64;
    let base = total / slots;
    let remainder = (total % slots) as usize;

    (0..slot_count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

fn pattern_weights(pattern: TrafficPattern, slot_count: usize, start: NaiveDateTime) -> Vec<f64> {
    (0..slot_count)
        .map(|i| pattern.weight(i, slot_count, start))
        .collect()
}

/// `floor(total * w_i / sum(w))` per slot, never handing out more than `total`.
///
/// Falls back to an equal split when the weights carry no mass.
fn proportional_floor(total: u64, weights: &[f64]) -> Vec<u64> {
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 || !weight_sum.is_finite() {
        log::warn!("Pattern weights sum to {}; using an equal split", weight_sum);
        return equal_split(total, weights.len());
    }

    let mut allocated = 0u64;
    weights
        .iter()
        .map(|w| {
            let share = (total as f64 * w / weight_sum).floor().max(0.0) as u64;
            // float rounding must never push the running sum past the budget
            let share = share.min(total - allocated);
            allocated += share;
            share
        })
        .collect()
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn front_loaded(
    total: u64,
    slot_count: usize,
    start: NaiveDateTime,
    pattern: TrafficPattern,
) -> Vec<u64> {
    let mut remaining = total;
    let mut allocation = Vec::with_capacity(slot_count);

    for i in 0..slot_count {
        let impressions = if i == slot_count - 1 {
            remaining
        } else {
            let decay = (-(i as f64) / (slot_count as f64 * FRONT_LOAD_DECAY)).exp();
            let weight = pattern.weight(i, slot_count, start);
            let ratio = (decay * weight) / ((slot_count - i) as f64 * FRONT_LOAD_SPREAD);
            let raw = (remaining as f64 * ratio).floor();
            if raw <= 0.0 {
                0
            } else {
                (raw as u64).min(remaining)
            }
        };

        allocation.push(impressions);
        remaining -= impressions;
    }

    allocation
}

impl CatalogEntry for DistributionAlgorithm {
    const ALL: &'static [Self] = &[
        DistributionAlgorithm::Equal,
        DistributionAlgorithm::Weighted,
        DistributionAlgorithm::PeakHours,
        DistributionAlgorithm::FrontLoaded,
    ];

    fn tag(&self) -> &'static str {
        match self {
            DistributionAlgorithm::Equal => "equal",
            DistributionAlgorithm::Weighted => "weighted",
            DistributionAlgorithm::PeakHours => "peak_hours",
            DistributionAlgorithm::FrontLoaded => "front_loaded",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DistributionAlgorithm::Equal => "Equal split",
            DistributionAlgorithm::Weighted => "Weighted split",
            DistributionAlgorithm::PeakHours => "Peak concentration",
            DistributionAlgorithm::FrontLoaded => "Front loading",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            DistributionAlgorithm::Equal => "Same number of impressions in every slot",
            DistributionAlgorithm::Weighted => "Impressions proportional to customer traffic",
            DistributionAlgorithm::PeakHours => "Impressions concentrated in the busiest slots",
            DistributionAlgorithm::FrontLoaded => {
                "Impressions concentrated early for fast delivery"
            }
        }
    }
}

impl FromStr for DistributionAlgorithm {
    type Err = PacingError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        lookup(tag).ok_or_else(|| PacingError::UnknownAlgorithm(tag.to_string()))
    }
}

impl fmt::Display for DistributionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
