// src/simulation/delivery.rs

use crate::model::slot::TimeSlot;
use chrono::NaiveDateTime;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Default downward spread of actual delivery: 80-100% of plan.
pub const DEFAULT_VARIATION_FACTOR: f64 = 0.2;

/// Closes every slot that has ended by `now` and records what it delivered.
///
/// Delivery for a closing slot is `floor(planned * (1 - v))` with `v` drawn
/// uniformly from `[0, variation_factor)`, so it never exceeds the plan.
/// Open slots and already-completed slots are returned unchanged.
///
/// `variation_factor` is clamped to `[0, 1]`; NaN counts as no variation.
pub fn advance<R: Rng + ?Sized>(
    slots: &[TimeSlot],
    now: NaiveDateTime,
    variation_factor: f64,
    rng: &mut R,
) -> Vec<TimeSlot> {
    let factor = if variation_factor.is_nan() {
        0.0
    } else {
        variation_factor.clamp(0.0, 1.0)
    };
    let spread = (factor > 0.0).then(|| Uniform::new(0.0, factor));

    slots
        .iter()
        .map(|slot| {
            if slot.completed || !slot.has_ended_by(now) {
                return *slot;
            }

            let variation = spread.as_ref().map_or(0.0, |dist| dist.sample(rng));
            let delivered = (slot.planned as f64 * (1.0 - variation)).floor();
            let actual = if delivered <= 0.0 { 0 } else { delivered as u64 };

            log::trace!(
                "Slot {} closed: planned {}, delivered {}",
                slot.index,
                slot.planned,
                actual.min(slot.planned)
            );
            slot.completed_with(actual)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::builder::build_slots;
    use crate::strategy::algorithms::DistributionAlgorithm;
    use crate::strategy::patterns::TrafficPattern;
    use chrono::{Duration, NaiveDate};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn new_year() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn day(budget: u64) -> Vec<TimeSlot> {
        build_slots(new_year(), budget, DistributionAlgorithm::Equal, TrafficPattern::Uniform)
    }

    #[test]
    fn only_ended_slots_complete() {
        let slots = day(1_000_000);
        let mut rng = StdRng::seed_from_u64(7);
        let now = new_year() + Duration::minutes(35);

        let advanced = advance(&slots, now, DEFAULT_VARIATION_FACTOR, &mut rng);

        assert_eq!(advanced.iter().filter(|s| s.completed).count(), 3);
        assert!(advanced[..3].iter().all(|s| s.completed));
        assert_eq!(&advanced[3..], &slots[3..]);
        // caller's snapshot is untouched
        assert!(slots.iter().all(|s| !s.completed));
    }

    #[test]
    fn slot_closes_exactly_at_its_end() {
        let slots = day(1000);
        let mut rng = StdRng::seed_from_u64(1);
        let advanced = advance(&slots, slots[0].end, DEFAULT_VARIATION_FACTOR, &mut rng);
        assert!(advanced[0].completed);
        assert!(!advanced[1].completed);
    }

    #[test]
    fn delivery_stays_within_bounds() {
        let slots = day(1_000_000);
        let mut rng = StdRng::seed_from_u64(42);
        let end_of_day = new_year() + Duration::days(1);

        let advanced = advance(&slots, end_of_day, DEFAULT_VARIATION_FACTOR, &mut rng);

        for slot in &advanced {
            assert!(slot.completed);
            assert!(slot.actual <= slot.planned);
            // 80% of plan is the floor for a 0.2 spread
            assert!(slot.actual as f64 >= (slot.planned as f64 * 0.8).floor());
        }
    }

    #[test]
    fn zero_draw_delivers_the_plan() {
        let slots = day(1000);
        let mut rng = StepRng::new(0, 0);
        let now = new_year() + Duration::hours(1);
        let advanced = advance(&slots, now, DEFAULT_VARIATION_FACTOR, &mut rng);
        for slot in advanced.iter().filter(|s| s.completed) {
            assert_eq!(slot.actual, slot.planned);
        }
    }

    #[test]
    fn no_variation_skips_the_rng() {
        let slots = day(1000);
        let mut rng = StepRng::new(u64::MAX, 0);
        let advanced = advance(&slots, new_year() + Duration::hours(2), 0.0, &mut rng);
        assert_eq!(advanced.iter().filter(|s| s.completed).count(), 12);
        assert!(advanced.iter().filter(|s| s.completed).all(|s| s.actual == s.planned));
    }

    #[test]
    fn out_of_range_variation_is_clamped() {
        let slots = day(1_000_000);
        let now = new_year() + Duration::hours(1);
        for factor in [f64::INFINITY, 7.5, f64::NAN, -3.0] {
            let advanced = advance(&slots, now, factor, &mut StdRng::seed_from_u64(4));
            let closed: Vec<_> = advanced.iter().filter(|s| s.completed).collect();
            assert_eq!(closed.len(), 6);
            assert!(closed.iter().all(|s| s.actual <= s.planned), "factor {factor}");
        }

        let flat = advance(&slots, now, -3.0, &mut StepRng::new(u64::MAX, 0));
        assert!(flat.iter().filter(|s| s.completed).all(|s| s.actual == s.planned));
    }

    #[test]
    fn completed_slots_are_not_redrawn() {
        let slots = day(1_000_000);
        let mut rng = StdRng::seed_from_u64(3);
        let now = new_year() + Duration::minutes(20);
        let first = advance(&slots, now, DEFAULT_VARIATION_FACTOR, &mut rng);
        let second = advance(&first, now, DEFAULT_VARIATION_FACTOR, &mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn same_seed_same_delivery() {
        let slots = day(1_000_000);
        let now = new_year() + Duration::hours(6);
        let a = advance(&slots, now, 0.5, &mut StdRng::seed_from_u64(11));
        let b = advance(&slots, now, 0.5, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
