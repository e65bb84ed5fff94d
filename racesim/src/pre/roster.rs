use crate::core::horse::Horse;
use anyhow::Context;
use helpers::general::InputValueError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

const NAME_PREFIXES: [&str; 16] = [
    "Silver", "Dark", "Golden", "Wild", "Swift", "Royal", "Midnight", "Thunder", "Lucky", "Crimson",
    "Iron", "Desert", "Northern", "Blue", "Little", "Storm",
];

const NAME_SUFFIXES: [&str; 16] = [
    "Comet", "Arrow", "Spirit", "Dancer", "Runner", "Star", "Blaze", "Shadow", "Dream", "Legend",
    "Whisper", "Flame", "Prince", "Wind", "Fury", "Ranger",
];

/// generate_roster creates horses with unique names and colors and a random condition within the
/// inclusive condition range. Ids start at 1.
pub fn generate_roster<R: Rng + ?Sized>(
    count: u32,
    condition_range: [u32; 2],
    rng: &mut R,
) -> anyhow::Result<Vec<Horse>> {
    let mut names: Vec<String> = NAME_PREFIXES
        .iter()
        .flat_map(|prefix| {
            NAME_SUFFIXES
                .iter()
                .map(move |suffix| format!("{} {}", prefix, suffix))
        })
        .collect();

    if count as usize > names.len() {
        return Err(InputValueError).context(format!(
            "Cannot generate {} unique horse names, at most {} are available!",
            count,
            names.len()
        ));
    }
    if condition_range[0] > condition_range[1] {
        return Err(InputValueError).context(format!(
            "Condition range {:?} is inverted!",
            condition_range
        ));
    }

    names.shuffle(rng);
    let colors = generate_colors(count as usize, rng);

    Ok(names
        .into_iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (name, color))| {
            let condition = rng.gen_range(condition_range[0]..=condition_range[1]);
            Horse::new(i as u32 + 1, &name, &color, condition)
        })
        .collect())
}

/// generate_colors returns unique upper-case #RRGGBB colors.
fn generate_colors<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::with_capacity(count);
    let mut colors = Vec::with_capacity(count);

    while colors.len() < count {
        let rgb: u32 = rng.gen_range(0..=0xFF_FFFF);
        if seen.insert(rgb) {
            colors.push(format!("#{:06X}", rgb));
        }
    }
    colors
}
