// src/io/projection.rs

use crate::model::slot::TimeSlot;
use crate::strategy::patterns::TrafficPattern;
use crate::strategy::traits::lookup;
use serde::Serialize;

/// Series handed to a chart renderer, one entry per displayed slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub planned: Vec<u64>,
    pub actual: Vec<u64>,
    /// Customer traffic scaled so the busiest displayed slot is 100.
    pub influx: Vec<f64>,
}

/// Projects the first `max_slots` slots into chart series.
///
/// An absent or unknown `pattern_tag` gives a flat influx of 1.0 rather than an error.
pub fn project(slots: &[TimeSlot], max_slots: usize, pattern_tag: Option<&str>) -> ChartData {
    let shown = &slots[..slots.len().min(max_slots)];

    ChartData {
        labels: shown.iter().map(slot_label).collect(),
        planned: shown.iter().map(|slot| slot.planned).collect(),
        actual: shown.iter().map(|slot| slot.actual).collect(),
        influx: influx_series(shown, pattern_tag),
    }
}

fn slot_label(slot: &TimeSlot) -> String {
    slot.start.format("%b %-d %H:%M").to_string()
}

fn influx_series(shown: &[TimeSlot], pattern_tag: Option<&str>) -> Vec<f64> {
    let Some(pattern) = pattern_tag.and_then(lookup::<TrafficPattern>) else {
        log::debug!("No traffic pattern for {:?}; using a flat influx", pattern_tag);
        return vec![1.0; shown.len()];
    };
    let Some(first) = shown.first() else {
        return Vec::new();
    };

    let weights: Vec<f64> = (0..shown.len())
        .map(|i| pattern.weight(i, shown.len(), first.start))
        .collect();
    let max_weight = weights.iter().copied().fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return vec![0.0; shown.len()];
    }

    weights.iter().map(|w| w / max_weight * 100.0).collect()
}
