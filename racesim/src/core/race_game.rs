use crate::core::clock::Clock;
use crate::core::race::Race;
use crate::core::race_state::{RacePhase, RaceStateManager};
use crate::core::speed_model::{calc_horse_speed, calc_visual_position, TimingPars};
use crate::interfaces::animation_driver::{AnimationDriver, FrameHandle};
use crate::interfaces::presentation_interface::{HorseState, RaceState, RgbColor};
use crate::post::race_result::RaceResult;
use flume::{Receiver, Sender};
use rand::Rng;
use std::cell::Cell;
use std::collections::BTreeMap;

pub const DEFAULT_RACE_DISTANCE: f64 = 1200.0;

/// RaceCompletion settles with the race result once every horse is finished. A completion whose
/// race was reset before it finished is abandoned and never yields a result.
#[derive(Debug)]
pub struct RaceCompletion {
    rx: Receiver<RaceResult>,
    settled: Cell<bool>,
}

impl RaceCompletion {
    fn new(rx: Receiver<RaceResult>) -> RaceCompletion {
        RaceCompletion {
            rx,
            settled: Cell::new(false),
        }
    }

    /// try_take returns the result if the race is finished (only once).
    pub fn try_take(&self) -> Option<RaceResult> {
        let result = self.rx.try_recv().ok();
        if result.is_some() {
            self.settled.set(true);
        }
        result
    }

    pub fn is_settled(&self) -> bool {
        self.settled.get() || !self.rx.is_empty()
    }

    pub fn is_abandoned(&self) -> bool {
        !self.is_settled() && self.rx.is_disconnected()
    }
}

#[derive(Debug)]
pub enum ToggleOutcome {
    Started(Option<RaceCompletion>),
    Resumed,
    Paused,
}

/// ActiveRace holds everything fixed at race start.
#[derive(Debug)]
struct ActiveRace {
    round: u32,
    distance: f64,
    track_width: f64,
    colors: Vec<RgbColor>,
    tx_result: Sender<RaceResult>,
}

/// RaceGame composes the speed model, the race state manager and an animation driver. It owns at
/// most one running race.
#[derive(Debug)]
pub struct RaceGame<D: AnimationDriver, C: Clock, R: Rng> {
    driver: D,
    state: RaceStateManager<C>,
    rng: R,
    timing_pars: TimingPars,
    default_distance: f64,
    active_race: Option<ActiveRace>,
    pending_frame: Option<FrameHandle>,
    subscribers: Vec<Sender<RaceState>>,
}

impl<D: AnimationDriver, C: Clock, R: Rng> RaceGame<D, C, R> {
    pub fn new(
        driver: D,
        clock: C,
        rng: R,
        timing_pars: TimingPars,
        default_distance: f64,
    ) -> RaceGame<D, C, R> {
        RaceGame {
            driver,
            state: RaceStateManager::new(clock),
            rng,
            timing_pars,
            default_distance,
            active_race: None,
            pending_frame: None,
            subscribers: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // PUBLIC OPERATIONS ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// start_race starts the inserted race and schedules the first frame. If a race is already in
    /// progress nothing happens and None is returned, so check is_racing() beforehand if the
    /// difference matters.
    pub fn start_race(&mut self, race: &Race) -> Option<RaceCompletion> {
        if self.state.is_racing() {
            log::warn!("Race already in progress");
            return None;
        }

        let race_distance = race.get_distance(self.default_distance);
        let race_duration = self.timing_pars.calc_race_duration(race_distance);

        let horse_speeds: Vec<f64> = race
            .horses
            .iter()
            .map(|horse| calc_horse_speed(horse, race_distance, race_duration, &mut self.rng))
            .collect();

        self.state.initialize_race(&race.horses, &horse_speeds);

        let (tx_result, rx_result) = flume::bounded(1);
        self.active_race = Some(ActiveRace {
            round: race.round,
            distance: race_distance,
            track_width: self.driver.get_track_width(),
            colors: race
                .horses
                .iter()
                .map(|horse| RgbColor::parse_hex(&horse.color))
                .collect(),
            tx_result,
        });

        log::info!(
            "Starting {}m race (estimated {:.1}s)",
            race_distance,
            race_duration / 1000.0
        );

        self.schedule_frame();
        self.publish();

        Some(RaceCompletion::new(rx_result))
    }

    /// pause_race freezes the race. The positions currently rendered by the presentation layer
    /// are taken over before pausing.
    pub fn pause_race(&mut self) {
        if self.state.is_racing() && !self.state.is_paused() {
            let current_positions = self.driver.capture_positions();
            self.state
                .update_horse_positions_from_external(&current_positions);
            self.state.pause_race();

            log::info!("Race paused");
            self.publish();
        }
    }

    pub fn resume_race(&mut self) {
        if self.state.is_racing() && self.state.is_paused() {
            self.state.resume_race();

            log::info!("Race resumed");
            self.publish();
        }
    }

    /// toggle_race starts the race if none is running, otherwise it pauses or resumes it.
    pub fn toggle_race(&mut self, race: &Race) -> ToggleOutcome {
        if !self.state.is_racing() {
            ToggleOutcome::Started(self.start_race(race))
        } else if self.state.is_paused() {
            self.resume_race();
            ToggleOutcome::Resumed
        } else {
            self.pause_race();
            ToggleOutcome::Paused
        }
    }

    /// reset_race cancels the pending frame and clears the race. A running race is abandoned.
    pub fn reset_race(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.driver.cancel_frame(handle);
        }
        self.active_race = None;
        self.state.reset_race();

        log::info!("Race reset");
        self.publish();
    }

    // ---------------------------------------------------------------------------------------------
    // FRAME LOOP ----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// run_frame performs one update step. The next frame is scheduled before returning as long
    /// as the race is not finished. Frames other than the pending one are ignored.
    pub fn run_frame(&mut self, handle: FrameHandle) {
        if self.pending_frame != Some(handle) {
            log::debug!("Ignoring stale frame {:?}", handle);
            return;
        }
        self.pending_frame = None;

        let (race_distance, track_width) = match &self.active_race {
            Some(active_race) => (active_race.distance, active_race.track_width),
            None => return,
        };

        // keep ticking while paused such that resuming takes effect immediately
        if self.state.is_paused() {
            self.schedule_frame();
            return;
        }

        let elapsed_time = self.state.get_current_elapsed_time();

        // update race progress and collect visual positions and finish line crossings
        let horse_updates: Vec<(usize, u32, f64, bool)> = self
            .state
            .update_race_progress(elapsed_time)
            .iter()
            .enumerate()
            .filter(|(_, horse_data)| !horse_data.finished)
            .map(|(idx, horse_data)| {
                (
                    idx,
                    horse_data.horse.id,
                    calc_visual_position(horse_data.distance_covered, race_distance, track_width),
                    horse_data.distance_covered >= race_distance,
                )
            })
            .collect();

        // horses crossing the line in the same frame are classified in list order
        for (idx, horse_id, visual_position, crossed) in horse_updates {
            self.state
                .update_horse_visual_position(horse_id, visual_position);

            if crossed {
                self.state.finish_horse(idx, elapsed_time);
                let name = &self.state.get_current_race_data()[idx].horse.name;
                log::info!("{} finished! Time: {:.2}s", name, elapsed_time / 1000.0);
            }
        }

        if !self.state.get_all_finished() {
            self.schedule_frame();
            self.publish();
        } else if self.state.get_current_race_data().is_empty() {
            log::warn!("Race without horses cannot be classified, abandoning it");
            self.active_race = None;
            self.state.reset_race();
            self.publish();
        } else {
            self.finish_race(race_distance);
        }
    }

    fn finish_race(&mut self, race_distance: f64) {
        let result = self.state.finalize_race(race_distance);
        log::info!(
            "{} wins the {}m race, race time {:.2}s",
            result.winner.name,
            race_distance,
            result.race_time / 1000.0
        );

        self.publish();
        if let Some(active_race) = self.active_race.take() {
            if active_race.tx_result.send(result).is_err() {
                log::debug!("Race result was not awaited");
            }
        }
    }

    fn schedule_frame(&mut self) {
        self.pending_frame = Some(self.driver.request_frame());
    }

    // ---------------------------------------------------------------------------------------------
    // PRESENTATION --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// subscribe returns a channel receiving a race state snapshot after every computed frame and
    /// every state change.
    pub fn subscribe(&mut self) -> Receiver<RaceState> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn get_race_state(&self) -> RaceState {
        let colors = self.active_race.as_ref().map(|race| &race.colors);
        let phase = self.state.get_phase();

        RaceState {
            phase,
            round: self.active_race.as_ref().map(|race| race.round),
            elapsed_time: match phase {
                RacePhase::Racing | RacePhase::Paused => self.state.get_current_elapsed_time(),
                RacePhase::Finished => self
                    .state
                    .get_race_result()
                    .map_or(0.0, |result| result.race_time),
                RacePhase::Idle => 0.0,
            },
            horse_states: self
                .state
                .get_current_race_data()
                .iter()
                .enumerate()
                .map(|(idx, horse_data)| {
                    let color = colors
                        .and_then(|colors| colors.get(idx).copied())
                        .unwrap_or_default();
                    HorseState::new(horse_data, color)
                })
                .collect(),
            final_result: self.state.get_race_result().cloned(),
        }
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let race_state = self.get_race_state();
        self.subscribers
            .retain(|tx| tx.send(race_state.to_owned()).is_ok());
    }

    // ---------------------------------------------------------------------------------------------
    // GETTERS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn is_racing(&self) -> bool {
        self.state.is_racing()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn race_result(&self) -> Option<&RaceResult> {
        self.state.get_race_result()
    }

    pub fn horse_positions(&self) -> &BTreeMap<u32, f64> {
        self.state.get_horse_positions()
    }

    pub fn default_distance(&self) -> f64 {
        self.default_distance
    }

    pub fn frame_pending(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn state(&self) -> &RaceStateManager<C> {
        &self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
