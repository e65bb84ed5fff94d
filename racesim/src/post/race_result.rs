use crate::core::horse::Horse;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// RacePosition is one row of the final classification.
/// * `position` - Rank, starting at 1
/// * `time` - (ms) Elapsed race time at which the horse crossed the finish line
/// * `distance` - Distance covered by the horse when it was classified
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RacePosition {
    pub horse: Horse,
    pub position: u32,
    pub time: f64,
    pub distance: f64,
}

/// RaceResult contains all race information that is required for post-processing the results.
/// It is created once when the race is finalized.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RaceResult {
    pub winner: Horse,
    pub positions: Vec<RacePosition>,
    pub race_time: f64,
    pub distance: f64,
}

impl RaceResult {
    /// format_positions returns the classification as a small text table.
    pub fn format_positions(&self) -> anyhow::Result<String> {
        let mut tmp_string = String::new();
        writeln!(
            &mut tmp_string,
            "{:>3}, {:<24}, {:>9}, {:>9}",
            "pos", "horse", "time", "distance"
        )?;
        for pos in self.positions.iter() {
            writeln!(
                &mut tmp_string,
                "{:3}, {:<24}, {:8.3}s, {:9.1}",
                pos.position,
                format!("{} (#{})", pos.horse.name, pos.horse.id),
                pos.time / 1000.0,
                pos.distance
            )?;
        }
        Ok(tmp_string)
    }

    /// print_positions prints the resulting classification to the console output.
    pub fn print_positions(&self) {
        println!(
            "RESULT: {}m race won by {} in {:.3}s",
            self.distance,
            self.winner.name,
            self.race_time / 1000.0
        );
        match self.format_positions() {
            Ok(table) => print!("{}", table),
            Err(e) => log::warn!("Could not format race positions: {}", e),
        }
    }
}
