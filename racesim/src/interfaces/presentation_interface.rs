use crate::core::race_state::{HorseRaceData, RacePhase};
use crate::post::race_result::RaceResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// parse_hex converts a CSS color string (e.g. #A0522D) into an RGB triple. Unparsable
    /// colors fall back to black.
    pub fn parse_hex(color: &str) -> RgbColor {
        match color.parse::<css_color_parser::Color>() {
            Ok(tmp_color) => RgbColor {
                r: tmp_color.r,
                g: tmp_color.g,
                b: tmp_color.b,
            },
            Err(e) => {
                log::warn!("Could not parse horse color {:?}: {}", color, e);
                RgbColor::default()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorseState {
    pub horse_id: u32,
    pub name: String,
    pub color: RgbColor,
    pub color_name: String,
    pub distance_covered: f64,
    pub visual_position: f64,
    pub finished: bool,
    pub finish_time: f64,
}

impl HorseState {
    pub fn new(data: &HorseRaceData, color: RgbColor) -> HorseState {
        HorseState {
            horse_id: data.horse.id,
            name: data.horse.name.to_owned(),
            color,
            color_name: data.horse.color_name.to_owned(),
            distance_covered: data.distance_covered,
            visual_position: data.visual_position,
            finished: data.finished,
            finish_time: data.finish_time,
        }
    }
}

/// RaceState is the snapshot published to the presentation layer after every computed frame and
/// every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceState {
    pub phase: RacePhase,
    pub round: Option<u32>,
    pub elapsed_time: f64,
    pub horse_states: Vec<HorseState>,

    // final results payload (sent once when race finishes)
    pub final_result: Option<RaceResult>,
}

impl Default for RaceState {
    fn default() -> Self {
        RaceState {
            phase: RacePhase::Idle,
            round: None,
            elapsed_time: 0.0,
            horse_states: Vec::new(),
            final_result: None,
        }
    }
}
