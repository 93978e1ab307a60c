// src/simulation/config.rs

use crate::error::{PacingError, Result};
use crate::simulation::delivery::DEFAULT_VARIATION_FACTOR;
use chrono::{NaiveDate, NaiveDateTime};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub start: NaiveDateTime,
    pub total_budget: u64,
    pub algorithm: String,
    pub pattern: String,
    /// Maximum fractional shortfall of a slot's delivery, in `[0, 1)`.
    pub variation_factor: f64,
    /// Simulated minutes per tick.
    pub step_minutes: i64,
    /// Wall-clock speed multiplier. Never changes `step_minutes`.
    pub speed: f64,
    pub base_tick_ms: u64,
    /// Fixed seed for reproducible runs; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            total_budget: 1_000_000,
            algorithm: "equal".to_string(),
            pattern: "uniform".to_string(),
            variation_factor: DEFAULT_VARIATION_FACTOR,
            step_minutes: 10,
            speed: 1.0,
            base_tick_ms: 500,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.total_budget == 0 {
            return Err(PacingError::InvalidConfig("total budget must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&self.variation_factor) {
            return Err(PacingError::InvalidConfig(format!(
                "variation factor must be in [0, 1), got {}",
                self.variation_factor
            )));
        }
        if self.step_minutes <= 0 {
            return Err(PacingError::InvalidConfig(format!(
                "step must be a positive number of minutes, got {}",
                self.step_minutes
            )));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(PacingError::InvalidConfig(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        if self.checked_tick_interval().is_none() {
            return Err(PacingError::InvalidConfig(format!(
                "speed {} gives an unrepresentable tick interval",
                self.speed
            )));
        }
        Ok(())
    }

    /// Wall-clock pause between ticks at the configured speed.
    ///
    /// Saturates at `Duration::MAX` for speeds that `validate` would reject.
    pub fn tick_interval(&self) -> Duration {
        self.checked_tick_interval().unwrap_or(Duration::MAX)
    }

    fn checked_tick_interval(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.base_tick_ms as f64 / 1000.0 / self.speed).ok()
    }
}
