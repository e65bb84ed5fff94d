use crate::core::race_game::DEFAULT_RACE_DISTANCE;
use crate::core::speed_model::TimingPars;
use anyhow::Context;
use helpers::general::InputValueError;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all game parameters. Every field is optional in the parameter file.
/// * `timing_pars` - Race duration model
/// * `track_distances` - Distance of each round
/// * `tot_no_rounds` - Number of rounds per game
/// * `horses_count` - Number of horses in the roster
/// * `horses_per_race` - Number of horses taking part in each round
/// * `condition_range` - Inclusive range of the generated horse conditions
/// * `default_distance` - Distance of races without a distance
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimPars {
    pub timing_pars: TimingPars,
    pub track_distances: Vec<f64>,
    pub tot_no_rounds: u32,
    pub horses_count: u32,
    pub horses_per_race: u32,
    pub condition_range: [u32; 2],
    pub default_distance: f64,
}

impl Default for SimPars {
    fn default() -> Self {
        SimPars {
            timing_pars: TimingPars::default(),
            track_distances: vec![1200.0, 1400.0, 1600.0, 1800.0, 2000.0, 2200.0],
            tot_no_rounds: 6,
            horses_count: 20,
            horses_per_race: 10,
            condition_range: [1, 100],
            default_distance: DEFAULT_RACE_DISTANCE,
        }
    }
}

impl SimPars {
    /// validate checks the parameters for consistency.
    pub fn validate(&self) -> anyhow::Result<()> {
        let tp = &self.timing_pars;
        if !(tp.base_duration > 0.0 && tp.base_distance > 0.0 && tp.duration_slack > 0.0) {
            return Err(InputValueError).context("Timing parameters must be positive!");
        }
        if self.track_distances.len() < self.tot_no_rounds as usize {
            return Err(InputValueError).context(format!(
                "{} track distances are given for {} rounds!",
                self.track_distances.len(),
                self.tot_no_rounds
            ));
        }
        if self.track_distances.iter().any(|&d| d <= 0.0) || self.default_distance <= 0.0 {
            return Err(InputValueError).context("Race distances must be positive!");
        }
        if self.horses_per_race > self.horses_count {
            return Err(InputValueError).context(format!(
                "Cannot select {} horses per race from a roster of {} horses!",
                self.horses_per_race, self.horses_count
            ));
        }
        if self.condition_range[0] > self.condition_range[1] || self.condition_range[1] > 100 {
            return Err(InputValueError).context(format!(
                "Condition range {:?} must be ordered and within [0, 100]!",
                self.condition_range
            ));
        }
        Ok(())
    }
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the game parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars: SimPars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    pars.validate()?;
    Ok(pars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_pars_are_valid() {
        assert!(SimPars::default().validate().is_ok());
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pars.json");
        let mut fh = std::fs::File::create(&path).unwrap();
        write!(
            fh,
            r#"{{"tot_no_rounds": 2, "track_distances": [1000, 1500], "timing_pars": {{"base_duration": 3000}}}}"#
        )
        .unwrap();

        let pars = read_sim_pars(&path).unwrap();
        assert_eq!(pars.tot_no_rounds, 2);
        assert_eq!(pars.track_distances, vec![1000.0, 1500.0]);
        assert_eq!(pars.timing_pars.base_duration, 3000.0);
        assert_eq!(pars.timing_pars.base_distance, 1200.0);
        assert_eq!(pars.horses_count, 20);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_sim_pars(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open parameter file"));
    }

    #[test]
    fn too_many_horses_per_race_is_rejected() {
        let pars = SimPars {
            horses_per_race: 21,
            ..SimPars::default()
        };
        assert!(pars.validate().is_err());
    }

    #[test]
    fn missing_round_distances_are_rejected() {
        let pars = SimPars {
            tot_no_rounds: 7,
            ..SimPars::default()
        };
        assert!(pars.validate().is_err());
    }

    #[test]
    fn inverted_condition_range_is_rejected() {
        let pars = SimPars {
            condition_range: [80, 20],
            ..SimPars::default()
        };
        assert!(pars.validate().is_err());
    }
}
