use crate::core::horse::Horse;
use crate::core::race::{Race, RaceStatus};
use crate::pre::read_sim_pars::SimPars;
use rand::seq::SliceRandom;
use rand::Rng;

/// select_random_horses returns `count` distinct horses in random order (all if the roster is
/// smaller).
pub fn select_random_horses<R: Rng + ?Sized>(
    roster: &[Horse],
    count: usize,
    rng: &mut R,
) -> Vec<Horse> {
    let mut horses = roster.to_vec();
    horses.shuffle(rng);
    horses.truncate(count);
    horses
}

/// generate_schedule creates one pending race per round. Round i is run over the i-th track
/// distance.
pub fn generate_schedule<R: Rng + ?Sized>(
    roster: &[Horse],
    sim_pars: &SimPars,
    rng: &mut R,
) -> anyhow::Result<Vec<Race>> {
    (1..=sim_pars.tot_no_rounds)
        .map(|round| {
            let horses = select_random_horses(roster, sim_pars.horses_per_race as usize, rng);
            if horses.is_empty() {
                anyhow::bail!("No horses available to select from");
            }

            let mut race = Race::new(
                round,
                horses,
                sim_pars.track_distances.get(round as usize - 1).copied(),
            );
            race.set_status(RaceStatus::Pending);
            Ok(race)
        })
        .collect()
}
