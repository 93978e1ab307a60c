// src/io/reporting.rs

use crate::error::Result;
use crate::io::projection::ChartData;
use crate::model::slot::TimeSlot;
use crate::simulation::engine::TickRecord;
use serde::Serialize;
use std::path::Path;

/// Flat CSV row for a slot; timestamps as `YYYY-MM-DD HH:MM`.
#[derive(Debug, Serialize)]
struct SlotRow {
    index: usize,
    start: String,
    end: String,
    planned: u64,
    actual: u64,
    completed: bool,
}

impl From<&TimeSlot> for SlotRow {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            index: slot.index,
            start: slot.start.format("%Y-%m-%d %H:%M").to_string(),
            end: slot.end.format("%Y-%m-%d %H:%M").to_string(),
            planned: slot.planned,
            actual: slot.actual,
            completed: slot.completed,
        }
    }
}

/// Writes the slot sequence to a CSV file, one row per slot.
pub fn write_slots_csv(path: &Path, slots: &[TimeSlot]) -> Result<()> {
    write_rows(path, slots.iter().map(SlotRow::from))?;
    log::info!("Exported {} slots to '{}'", slots.len(), path.display());
    Ok(())
}

/// Writes the per-tick history to a CSV file.
pub fn write_history_csv(path: &Path, history: &[TickRecord]) -> Result<()> {
    write_rows(path, history.iter())?;
    log::info!("Exported {} ticks to '{}'", history.len(), path.display());
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    // Flush the buffer to ensure all data is written
    wtr.flush()?;
    Ok(())
}

pub fn chart_json(chart: &ChartData) -> Result<String> {
    Ok(serde_json::to_string_pretty(chart)?)
}
