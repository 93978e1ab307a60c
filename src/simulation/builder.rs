// src/simulation/builder.rs

use crate::error::{PacingError, Result};
use crate::model::slot::{TimeSlot, SLOTS_PER_DAY};
use crate::strategy::algorithms::DistributionAlgorithm;
use crate::strategy::patterns::TrafficPattern;
use crate::strategy::traits::lookup;
use chrono::NaiveDateTime;

/// Lays out the day's 144 slots with their initial plan.
pub fn build_slots(
    start: NaiveDateTime,
    total_budget: u64,
    algorithm: DistributionAlgorithm,
    pattern: TrafficPattern,
) -> Vec<TimeSlot> {
    let allocation = algorithm.distribute(total_budget, SLOTS_PER_DAY, start, pattern);

    log::debug!(
        "Built {} slots from {} using {} / {} (budget {})",
        SLOTS_PER_DAY,
        start,
        algorithm,
        pattern,
        total_budget
    );

    (0..SLOTS_PER_DAY)
        .map(|i| TimeSlot::new(i, start, allocation.get(i).copied().unwrap_or(0)))
        .collect()
}

/// Resolves both catalog tags first; nothing is built unless both are known.
pub fn resolve_tags(
    algorithm_tag: &str,
    pattern_tag: &str,
) -> Result<(DistributionAlgorithm, TrafficPattern)> {
    match (lookup(algorithm_tag), lookup(pattern_tag)) {
        (Some(algorithm), Some(pattern)) => Ok((algorithm, pattern)),
        _ => {
            log::error!(
                "Cannot build slots: algorithm '{}' or pattern '{}' not found",
                algorithm_tag,
                pattern_tag
            );
            Err(PacingError::UnknownCatalogEntry {
                algorithm: algorithm_tag.to_string(),
                pattern: pattern_tag.to_string(),
            })
        }
    }
}

pub fn build_slots_from_tags(
    start: NaiveDateTime,
    total_budget: u64,
    algorithm_tag: &str,
    pattern_tag: &str,
) -> Result<Vec<TimeSlot>> {
    let (algorithm, pattern) = resolve_tags(algorithm_tag, pattern_tag)?;
    Ok(build_slots(start, total_budget, algorithm, pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::slot::slot_duration;
    use crate::strategy::traits::CatalogEntry;
    use chrono::NaiveDate;

    fn new_year() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn equal_uniform_example() {
        let slots = build_slots_from_tags(new_year(), 1000, "equal", "uniform").unwrap();
        assert_eq!(slots.len(), 144);
        assert_eq!(slots.iter().filter(|s| s.planned == 7).count(), 136);
        assert_eq!(slots.iter().filter(|s| s.planned == 6).count(), 8);
        assert_eq!(slots.iter().map(|s| s.planned).sum::<u64>(), 1000);
        assert!(slots.iter().all(|s| s.actual == 0 && !s.completed));
    }

    #[test]
    fn slots_tile_the_day() {
        for algorithm in DistributionAlgorithm::ALL {
            for pattern in TrafficPattern::ALL {
                let slots = build_slots(new_year(), 1_000_000, *algorithm, *pattern);
                assert_eq!(slots.len(), 144);
                assert_eq!(slots[0].start, new_year());
                for (i, slot) in slots.iter().enumerate() {
                    assert_eq!(slot.index, i);
                    assert_eq!(slot.end - slot.start, slot_duration());
                }
                for pair in slots.windows(2) {
                    assert_eq!(pair[1].start, pair[0].end);
                }
                assert_eq!(slots[143].end, new_year() + chrono::Duration::days(1));
            }
        }
    }

    #[test]
    fn build_is_deterministic() {
        let algorithm = DistributionAlgorithm::FrontLoaded;
        let a = build_slots(new_year(), 5000, algorithm, TrafficPattern::EveningPeak);
        let b = build_slots(new_year(), 5000, algorithm, TrafficPattern::EveningPeak);
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_tags_name_both() {
        let err = build_slots_from_tags(new_year(), 1000, "greedy", "uniform").unwrap_err();
        match err {
            PacingError::UnknownCatalogEntry { algorithm, pattern } => {
                assert_eq!(algorithm, "greedy");
                assert_eq!(pattern, "uniform");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = build_slots_from_tags(new_year(), 1000, "equal", "holiday").unwrap_err();
        assert!(err.to_string().contains("holiday"));
        assert!(err.to_string().contains("equal"));
    }
}
