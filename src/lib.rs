//! Impression pacing simulator.
//!
//! Splits a day's impression budget over 144 ten-minute slots, simulates
//! under-delivery slot by slot and re-plans the remaining slots so the total
//! budget is always accounted for.

pub mod error;
pub mod io;
pub mod logger;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{PacingError, Result};
pub use model::slot::TimeSlot;
pub use simulation::engine::PacingSimulation;
