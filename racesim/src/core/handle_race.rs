use crate::core::clock::Clock;
use crate::core::race::{Race, RaceStatus};
use crate::core::race_game::{RaceCompletion, RaceGame};
use crate::interfaces::animation_driver::FrameLoop;
use crate::post::race_result::RaceResult;
use flume::Receiver;
use rand::Rng;

/// Command is sent by an interactive frontend to control the running race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Reset,
    Quit,
}

/// handle_race runs one race on the inserted game until it is finished and returns the result
/// for post-processing. Commands are applied between frames: toggle pauses or resumes, reset
/// restarts the race and quit abandons it (None is returned). Commands queued before the race
/// starts are discarded. The race status is updated along the way.
pub fn handle_race<D: FrameLoop, C: Clock, R: Rng>(
    game: &mut RaceGame<D, C, R>,
    race: &mut Race,
    rx_cmd: Option<&Receiver<Command>>,
) -> anyhow::Result<Option<RaceResult>> {
    if game.is_racing() {
        anyhow::bail!("Round {} cannot start while another race is running!", race.round);
    }

    if let Some(rx_cmd) = rx_cmd {
        let n_stale = rx_cmd.drain().count();
        if n_stale > 0 {
            log::debug!("Discarded {} command(s) sent before round {}", n_stale, race.round);
        }
    }

    race.set_status(RaceStatus::Active);
    let mut completion = start(game, race)?;

    loop {
        // a finished race is final, commands arriving with the last frame are left unapplied
        if let Some(race_result) = completion.try_take() {
            race.set_status(RaceStatus::Finished);
            return Ok(Some(race_result));
        }

        if let Some(rx_cmd) = rx_cmd {
            for cmd in rx_cmd.try_iter() {
                match cmd {
                    Command::Toggle => {
                        // toggling never starts a race here, the round owns the only completion
                        if game.is_racing() {
                            game.toggle_race(race);
                        }
                    }
                    Command::Reset => {
                        game.reset_race();
                        log::info!("Restarting round {}", race.round);
                        completion = start(game, race)?;
                    }
                    Command::Quit => {
                        game.reset_race();
                        race.set_status(RaceStatus::Pending);
                        return Ok(None);
                    }
                }
            }
        }

        match game.driver_mut().next_frame() {
            Some(handle) => game.run_frame(handle),
            None => {
                // no frame left without a result, e.g. a race without horses
                race.set_status(RaceStatus::Pending);
                if completion.is_abandoned() {
                    log::warn!("Round {} was abandoned without a result", race.round);
                }
                return Ok(None);
            }
        }
    }
}

fn start<D: FrameLoop, C: Clock, R: Rng>(
    game: &mut RaceGame<D, C, R>,
    race: &Race,
) -> anyhow::Result<RaceCompletion> {
    game.start_race(race)
        .ok_or_else(|| anyhow::anyhow!("Could not start round {}!", race.round))
}
