use crate::core::horse::Horse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    Pending,
    Active,
    Finished,
}

/// * `round` - Round number (1-based)
/// * `horses` - Participating horses, fixed for the round
/// * `status` - Scheduling status, unset for ad-hoc races
/// * `distance` - Track length, the default distance is used if unset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub round: u32,
    pub horses: Vec<Horse>,
    #[serde(default)]
    pub status: Option<RaceStatus>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl Race {
    pub fn new(round: u32, horses: Vec<Horse>, distance: Option<f64>) -> Race {
        Race {
            round,
            horses,
            status: None,
            distance,
        }
    }

    /// set_status is the only mutation a race undergoes after it was scheduled.
    pub fn set_status(&mut self, status: RaceStatus) {
        self.status = Some(status);
    }

    /// get_distance returns the race distance or the inserted fallback if no distance was set
    /// (or it was set to zero).
    pub fn get_distance(&self, default_distance: f64) -> f64 {
        match self.distance {
            Some(distance) if distance != 0.0 => distance,
            _ => default_distance,
        }
    }
}
