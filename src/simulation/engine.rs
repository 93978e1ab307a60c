// src/simulation/engine.rs

use crate::error::Result;
use crate::io::projection::{project, ChartData};
use crate::model::slot::{TimeSlot, SLOTS_PER_DAY, SLOT_DURATION_MINUTES};
use crate::simulation::builder::{build_slots, resolve_tags};
use crate::simulation::config::SimulationConfig;
use crate::simulation::delivery::advance;
use crate::simulation::redistribution::redistribute;
use crate::strategy::algorithms::DistributionAlgorithm;
use crate::strategy::patterns::TrafficPattern;
use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Simulated length of one campaign.
pub const HORIZON_MINUTES: i64 = SLOTS_PER_DAY as i64 * SLOT_DURATION_MINUTES;

// One row per tick, written to CSV by the reporting module.
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub tick: usize,
    pub sim_time: String,
    pub completed_slots: usize,
    pub delivered: u64,
    pub remaining_budget: u64,
    pub efficiency_pct: f64,
}

/// Running totals over completed slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeliveryStats {
    pub completed_slots: usize,
    pub total_slots: usize,
    pub actual_delivered: u64,
    pub planned_for_completed: u64,
    /// actual / planned over completed slots, in percent.
    pub efficiency_pct: f64,
}

impl DeliveryStats {
    pub fn from_slots(slots: &[TimeSlot]) -> Self {
        let (completed_slots, actual_delivered, planned_for_completed) = slots
            .iter()
            .filter(|slot| slot.completed)
            .fold((0, 0u64, 0u64), |(n, actual, planned), slot| {
                (n + 1, actual + slot.actual, planned + slot.planned)
            });

        let efficiency_pct = if planned_for_completed > 0 {
            actual_delivered as f64 / planned_for_completed as f64 * 100.0
        } else {
            0.0
        };

        Self {
            completed_slots,
            total_slots: slots.len(),
            actual_delivered,
            planned_for_completed,
            efficiency_pct,
        }
    }
}

/// The driving loop: one simulated day of delivery and re-planning.
///
/// Each tick moves the clock forward by `step_minutes`, closes the slots that
/// ended, then re-plans the open ones. Ticks never overlap; the slot sequence
/// is replaced wholesale only after both stages succeed.
pub struct PacingSimulation {
    config: SimulationConfig,
    algorithm: DistributionAlgorithm,
    pattern: TrafficPattern,
    rng: StdRng,

    slots: Vec<TimeSlot>,
    elapsed_minutes: i64,
    history: Vec<TickRecord>,
}

impl PacingSimulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let (algorithm, pattern) = resolve_tags(&config.algorithm, &config.pattern)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let slots = build_slots(config.start, config.total_budget, algorithm, pattern);
        log::info!(
            "Campaign of {} impressions starting {} ({} / {})",
            config.total_budget,
            config.start,
            algorithm,
            pattern
        );

        Ok(Self {
            config,
            algorithm,
            pattern,
            rng,
            slots,
            elapsed_minutes: 0,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn algorithm(&self) -> DistributionAlgorithm {
        self.algorithm
    }

    pub fn pattern(&self) -> TrafficPattern {
        self.pattern
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn elapsed_minutes(&self) -> i64 {
        self.elapsed_minutes
    }

    pub fn history(&self) -> &[TickRecord] {
        &self.history
    }

    pub fn current_time(&self) -> NaiveDateTime {
        self.config.start + Duration::minutes(self.elapsed_minutes)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_minutes >= HORIZON_MINUTES
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        self.config.tick_interval()
    }

    /// Advances one tick. Does nothing once the day is over.
    pub fn step(&mut self) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }

        let elapsed = self.elapsed_minutes + self.config.step_minutes;
        let now = self.config.start + Duration::minutes(elapsed);

        let delivered = advance(&self.slots, now, self.config.variation_factor, &mut self.rng);
        let replanned = redistribute(&delivered, self.config.total_budget)?;

        self.slots = replanned;
        self.elapsed_minutes = elapsed;
        self.record_history();

        if self.elapsed_minutes % 60 == 0 {
            let stats = self.stats();
            log::info!(
                "{}: {}/{} slots done, delivered {}, efficiency {:.1}%",
                now.format("%H:%M"),
                stats.completed_slots,
                stats.total_slots,
                stats.actual_delivered,
                stats.efficiency_pct
            );
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        while !self.is_finished() {
            self.step()?;
        }
        log::info!("Simulation finished after {} ticks", self.history.len());
        Ok(())
    }

    /// Back to the initial plan with the current algorithm and pattern.
    pub fn reset(&mut self) {
        self.slots = build_slots(
            self.config.start,
            self.config.total_budget,
            self.algorithm,
            self.pattern,
        );
        self.elapsed_minutes = 0;
        self.history.clear();
        log::debug!("Simulation reset");
    }

    /// Switches algorithm and pattern, then resets.
    ///
    /// Both tags are checked first; on error the running state is kept.
    pub fn reconfigure(&mut self, algorithm_tag: &str, pattern_tag: &str) -> Result<()> {
        let (algorithm, pattern) = resolve_tags(algorithm_tag, pattern_tag)?;
        self.config.algorithm = algorithm_tag.to_string();
        self.config.pattern = pattern_tag.to_string();
        self.algorithm = algorithm;
        self.pattern = pattern;
        self.reset();
        Ok(())
    }

    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats::from_slots(&self.slots)
    }

    pub fn chart_data(&self, max_slots: usize) -> ChartData {
        project(&self.slots, max_slots, Some(&self.config.pattern))
    }

    fn record_history(&mut self) {
        let stats = self.stats();
        self.history.push(TickRecord {
            tick: self.history.len() + 1,
            sim_time: self.current_time().format("%Y-%m-%d %H:%M").to_string(),
            completed_slots: stats.completed_slots,
            delivered: stats.actual_delivered,
            remaining_budget: self.config.total_budget.saturating_sub(stats.actual_delivered),
            efficiency_pct: stats.efficiency_pct,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PacingError;
    use crate::model::slot::budget_accounted;

    fn seeded(algorithm: &str, pattern: &str) -> PacingSimulation {
        PacingSimulation::new(SimulationConfig {
            algorithm: algorithm.to_string(),
            pattern: pattern.to_string(),
            seed: Some(99),
            ..SimulationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn each_tick_closes_one_slot_and_keeps_budget() {
        let mut sim = seeded("weighted", "evening_peak");
        for tick in 1..=30 {
            sim.step().unwrap();
            assert_eq!(sim.stats().completed_slots, tick);
            assert_eq!(budget_accounted(sim.slots()), 1_000_000);
        }
        assert_eq!(sim.elapsed_minutes(), 300);
        assert_eq!(sim.history().len(), 30);
    }

    #[test]
    fn run_stops_after_one_day() {
        let mut sim = seeded("front_loaded", "weekend");
        sim.run().unwrap();

        assert!(sim.is_finished());
        assert_eq!(sim.history().len(), 144);
        assert!(sim.slots().iter().all(|s| s.completed && s.actual <= s.planned));

        let before = sim.slots().to_vec();
        sim.step().unwrap();
        assert_eq!(sim.slots(), before);
        assert_eq!(sim.history().len(), 144);
    }

    #[test]
    fn stats_track_completed_slots() {
        let mut sim = seeded("equal", "uniform");
        assert_eq!(sim.stats().efficiency_pct, 0.0);

        for _ in 0..6 {
            sim.step().unwrap();
        }
        let stats = sim.stats();
        assert_eq!(stats.completed_slots, 6);
        assert_eq!(stats.total_slots, 144);
        assert!(stats.actual_delivered <= stats.planned_for_completed);
        assert!(stats.efficiency_pct > 80.0 && stats.efficiency_pct <= 100.0);

        let last = sim.history().last().unwrap();
        assert_eq!(last.sim_time, "2025-01-01 01:00");
        assert_eq!(last.remaining_budget, 1_000_000 - stats.actual_delivered);
    }

    #[test]
    fn reset_restores_the_initial_plan() {
        let mut sim = seeded("peak_hours", "peak_hours");
        let initial = sim.slots().to_vec();
        for _ in 0..12 {
            sim.step().unwrap();
        }
        sim.reset();
        assert_eq!(sim.slots(), initial);
        assert_eq!(sim.elapsed_minutes(), 0);
        assert!(sim.history().is_empty());
    }

    #[test]
    fn reconfigure_validates_before_switching() {
        let mut sim = seeded("equal", "uniform");
        sim.step().unwrap();

        let err = sim.reconfigure("weighted", "lunchtime").unwrap_err();
        assert!(matches!(err, PacingError::UnknownCatalogEntry { .. }));
        assert_eq!(sim.elapsed_minutes(), 10);
        assert_eq!(sim.pattern(), TrafficPattern::Uniform);

        sim.reconfigure("weighted", "morning_peak").unwrap();
        assert_eq!(sim.algorithm(), DistributionAlgorithm::Weighted);
        assert_eq!(sim.pattern(), TrafficPattern::MorningPeak);
        assert_eq!(sim.elapsed_minutes(), 0);
        assert_eq!(sim.chart_data(144).influx.iter().copied().fold(0.0, f64::max), 100.0);
    }

    #[test]
    fn larger_steps_close_several_slots() {
        let mut sim = PacingSimulation::new(SimulationConfig {
            step_minutes: 30,
            seed: Some(1),
            ..SimulationConfig::default()
        })
        .unwrap();
        sim.step().unwrap();
        assert_eq!(sim.stats().completed_slots, 3);
        sim.run().unwrap();
        assert_eq!(sim.history().len(), 48);
    }

    #[test]
    fn bad_config_is_rejected() {
        let err = PacingSimulation::new(SimulationConfig {
            algorithm: "lottery".to_string(),
            ..SimulationConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, PacingError::UnknownCatalogEntry { .. }));

        let err = PacingSimulation::new(SimulationConfig {
            total_budget: 0,
            ..SimulationConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, PacingError::InvalidConfig(_)));
    }
}
