// src/simulation/redistribution.rs

use crate::error::{PacingError, Result};
use crate::model::slot::TimeSlot;
use crate::strategy::algorithms::equal_split;

/// Re-plans every open slot so that delivered + planned equals `total_budget` again.
///
/// What is left of the budget after actual delivery is spread over the open
/// slots in index order with the same base-plus-remainder split as the equal
/// algorithm. With no open slots the input comes back unchanged.
///
/// Delivery above the total budget can only come from a broken delivery clamp,
/// so it is reported as `BudgetInvariantViolated` instead of being absorbed.
pub fn redistribute(slots: &[TimeSlot], total_budget: u64) -> Result<Vec<TimeSlot>> {
    let open_count = slots.iter().filter(|slot| !slot.completed).count();
    if open_count == 0 {
        return Ok(slots.to_vec());
    }

    let delivered: u64 = slots
        .iter()
        .filter(|slot| slot.completed)
        .map(|slot| slot.actual)
        .sum();

    let remaining = total_budget.checked_sub(delivered).ok_or_else(|| {
        log::error!(
            "Delivered {} impressions against a budget of {}; slot delivery exceeded plan",
            delivered,
            total_budget
        );
        PacingError::BudgetInvariantViolated {
            total_budget,
            delivered,
        }
    })?;

    log::debug!(
        "Redistributing {} impressions over {} open slots",
        remaining,
        open_count
    );

    let mut plan = equal_split(remaining, open_count).into_iter();
    Ok(slots
        .iter()
        .map(|slot| {
            if slot.completed {
                *slot
            } else {
                slot.with_planned(plan.next().unwrap_or(0))
            }
        })
        .collect())
}
