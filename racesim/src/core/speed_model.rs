use crate::core::horse::Horse;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::Deserialize;

pub const BASE_RACE_DURATION: f64 = 5000.0;
pub const BASE_DISTANCE: f64 = 1200.0;
pub const DURATION_SLACK: f64 = 1.2;

const CONDITION_MULT_MIN: f64 = 0.7;
const CONDITION_MULT_SPAN: f64 = 0.3;
const RANDOM_MULT_MIN: f64 = 0.8;
const RANDOM_MULT_MAX: f64 = 1.2;

/// * `base_duration` - (ms) Animation duration of a race over the base distance (w/o slack)
/// * `base_distance` - Distance of the shortest (reference) race
/// * `duration_slack` - Factor applied on top of the scaled duration
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TimingPars {
    pub base_duration: f64,
    pub base_distance: f64,
    pub duration_slack: f64,
}

impl Default for TimingPars {
    fn default() -> Self {
        TimingPars {
            base_duration: BASE_RACE_DURATION,
            base_distance: BASE_DISTANCE,
            duration_slack: DURATION_SLACK,
        }
    }
}

impl TimingPars {
    /// calc_race_duration returns the race duration in ms. The duration grows with the square
    /// root of the distance, i.e. a race twice as long takes sqrt(2) times as long.
    pub fn calc_race_duration(&self, distance: f64) -> f64 {
        let scale_factor = distance / self.base_distance;
        self.base_duration * scale_factor.sqrt() * self.duration_slack
    }
}

/// calc_race_duration returns the race duration in ms for the default timing parameters.
/// Negative distances are a caller error and yield NaN.
pub fn calc_race_duration(distance: f64) -> f64 {
    TimingPars::default().calc_race_duration(distance)
}

/// calc_condition_multiplier maps the condition [0, 100] linearly onto [0.7, 1.0].
pub fn calc_condition_multiplier(condition: u32) -> f64 {
    CONDITION_MULT_MIN + condition as f64 / 100.0 * CONDITION_MULT_SPAN
}

/// calc_horse_speed returns the speed of a horse in distance units per ms. Every call samples a
/// new random multiplier in [0.8, 1.2] from the inserted random number generator. A race
/// duration of zero results in an infinite speed.
pub fn calc_horse_speed<R: Rng + ?Sized>(
    horse: &Horse,
    distance: f64,
    race_duration: f64,
    rng: &mut R,
) -> f64 {
    let base_speed = distance / race_duration;
    let condition_mult = calc_condition_multiplier(horse.condition);
    let random_mult = Uniform::new_inclusive(RANDOM_MULT_MIN, RANDOM_MULT_MAX).sample(rng);

    base_speed * condition_mult * random_mult
}

/// calc_visual_position projects the covered distance onto the track width. The progress is
/// capped at the finish line, a total distance of zero counts as finished. Negative distances
/// are passed through and result in a position before the start line.
pub fn calc_visual_position(actual_distance: f64, total_distance: f64, track_width: f64) -> f64 {
    let progress = if total_distance == 0.0 {
        1.0
    } else {
        (actual_distance / total_distance).min(1.0)
    };
    progress * track_width
}

/// calc_distance_covered returns the distance covered after the elapsed time (ms).
pub fn calc_distance_covered(speed: f64, elapsed_time: f64) -> f64 {
    speed * elapsed_time
}
