use crate::post::race_result::RaceResult;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// RoundResult links a race result to the round it was raced in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoundResult {
    pub round: u32,
    pub result: RaceResult,
}

/// ResultRecord is one flat row of the CSV export.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResultRecord {
    pub round: u32,
    pub position: u32,
    pub horse_id: u32,
    pub horse_name: String,
    pub time_ms: f64,
    pub distance: f64,
}

/// ResultStore collects the results of all rounds of a game.
#[derive(Debug, Default, Clone)]
pub struct ResultStore {
    pub rounds: Vec<RoundResult>,
}

impl ResultStore {
    pub fn new() -> ResultStore {
        ResultStore::default()
    }

    pub fn push(&mut self, round: u32, result: RaceResult) {
        self.rounds.push(RoundResult { round, result })
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn clear(&mut self) {
        self.rounds.clear()
    }

    /// get_records flattens the stored results into one record per classified horse.
    pub fn get_records(&self) -> Vec<ResultRecord> {
        self.rounds
            .iter()
            .flat_map(|round_result| {
                round_result.result.positions.iter().map(move |pos| ResultRecord {
                    round: round_result.round,
                    position: pos.position,
                    horse_id: pos.horse.id,
                    horse_name: pos.horse.name.to_owned(),
                    time_ms: pos.time,
                    distance: pos.distance,
                })
            })
            .collect()
    }

    /// print_results prints the winner of every round to the console output.
    pub fn print_results(&self) {
        println!("RESULT: Winners");
        println!("round, distance, {:<24}, {:>9}", "winner", "time");
        for round_result in self.rounds.iter() {
            let winner_time = round_result
                .result
                .positions
                .first()
                .map_or(0.0, |pos| pos.time);
            println!(
                "{:5}, {:8.0}, {:<24}, {:8.3}s",
                round_result.round,
                round_result.result.distance,
                round_result.result.winner.name,
                winner_time / 1000.0
            );
        }
    }

    /// write_json writes all round results as a JSON list.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let mut fh = create_file(path)?;
        serde_json::to_writer_pretty(&mut fh, &self.rounds)
            .context(format!("Failed to write results to {}!", path.display()))?;
        fh.flush()?;
        Ok(())
    }

    /// write_csv writes the flat result records.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let fh = create_file(path)?;
        let mut wtr = csv::Writer::from_writer(fh);
        for record in self.get_records() {
            wtr.serialize(record)
                .context(format!("Failed to write results to {}!", path.display()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// write_files writes `<base>.json` and `<base>.csv` and returns both paths.
    pub fn write_files(&self, base_path: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
        let json_path = base_path.with_extension("json");
        let csv_path = base_path.with_extension("csv");
        self.write_json(&json_path)?;
        self.write_csv(&csv_path)?;
        Ok((json_path, csv_path))
    }

    /// read_json loads round results written by write_json.
    pub fn read_json(path: &Path) -> anyhow::Result<ResultStore> {
        let fh = OpenOptions::new()
            .read(true)
            .open(path)
            .context(format!("Failed to open result file {}!", path.display()))?;
        let rounds = serde_json::from_reader(&fh)
            .context(format!("Failed to parse result file {}!", path.display()))?;
        Ok(ResultStore { rounds })
    }
}

fn create_file(path: &Path) -> anyhow::Result<std::fs::File> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .context(format!("Failed to create result file {}!", path.display()))
}
