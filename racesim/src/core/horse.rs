use crate::interfaces::color_names::get_color_name;
use serde::{Deserialize, Serialize};

/// * `id` - Unique horse id (starting at 1)
/// * `name` - Display name, e.g. Silver Comet
/// * `color` - Hex color used for presentation, e.g. #A0522D
/// * `color_name` - Closest named CSS color of `color`, e.g. sienna
/// * `condition` - Fitness in the condition range, higher is faster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horse {
    pub id: u32,
    pub name: String,
    pub color: String,
    pub color_name: String,
    pub condition: u32,
}

impl Horse {
    /// new creates a horse, the color name is derived from the hex color.
    pub fn new(id: u32, name: &str, color: &str, condition: u32) -> Horse {
        Horse {
            id,
            name: name.to_owned(),
            color: color.to_owned(),
            color_name: get_color_name(color).to_owned(),
            condition,
        }
    }
}
