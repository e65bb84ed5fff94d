use crate::core::clock::Clock;
use crate::core::horse::Horse;
use crate::post::race_result::{RacePosition, RaceResult};
use helpers::general::argsort;
use std::collections::BTreeMap;

/// HorseRaceData is the transient per-horse state of the current race.
/// * `speed` - Distance units per ms
/// * `distance_covered` - Frozen once the horse is finished
/// * `visual_position` - Position projected onto the track width
/// * `finish_time` - (ms) Elapsed race time at the finish, 0 while not finished
#[derive(Debug, Clone, PartialEq)]
pub struct HorseRaceData {
    pub horse: Horse,
    pub speed: f64,
    pub distance_covered: f64,
    pub visual_position: f64,
    pub finished: bool,
    pub finish_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    Idle,
    Racing,
    Paused,
    Finished,
}

/// RaceStateManager owns the race state machine (idle -> racing <-> paused -> finished), the
/// per-horse progress and the elapsed time accounting net of pauses.
#[derive(Debug)]
pub struct RaceStateManager<C: Clock> {
    clock: C,
    is_racing: bool,
    is_paused: bool,
    race_result: Option<RaceResult>,
    horse_positions: BTreeMap<u32, f64>,
    current_race_data: Vec<HorseRaceData>,
    // timing marks (ms)
    race_start_time: f64,
    total_paused_time: f64,
    pause_start_time: f64,
}

impl<C: Clock> RaceStateManager<C> {
    pub fn new(clock: C) -> RaceStateManager<C> {
        RaceStateManager {
            clock,
            is_racing: false,
            is_paused: false,
            race_result: None,
            horse_positions: BTreeMap::new(),
            current_race_data: Vec::new(),
            race_start_time: 0.0,
            total_paused_time: 0.0,
            pause_start_time: 0.0,
        }
    }

    /// initialize_race starts a new race. Horses and speeds correspond by index.
    pub fn initialize_race(&mut self, horses: &[Horse], horse_speeds: &[f64]) {
        if horses.len() != horse_speeds.len() {
            panic!(
                "Number of horse speeds ({}) does not match number of horses ({})!",
                horse_speeds.len(),
                horses.len()
            )
        }

        self.is_racing = true;
        self.is_paused = false;
        self.race_result = None;
        self.total_paused_time = 0.0;
        self.pause_start_time = 0.0;
        self.race_start_time = self.clock.now_ms();

        // horses of a previous race are not tracked anymore
        self.horse_positions.clear();
        for horse in horses.iter() {
            self.horse_positions.insert(horse.id, 0.0);
        }

        self.current_race_data = horses
            .iter()
            .zip(horse_speeds.iter())
            .map(|(horse, &speed)| HorseRaceData {
                horse: horse.to_owned(),
                speed,
                distance_covered: 0.0,
                visual_position: 0.0,
                finished: false,
                finish_time: 0.0,
            })
            .collect();
    }

    /// update_race_progress recalculates the distance of every running horse from the total
    /// elapsed time, so the update frequency does not matter.
    pub fn update_race_progress(&mut self, elapsed_time: f64) -> &[HorseRaceData] {
        for horse_data in self.current_race_data.iter_mut() {
            if !horse_data.finished {
                horse_data.distance_covered = horse_data.speed * elapsed_time;
            }
        }
        &self.current_race_data
    }

    /// finish_horse classifies the horse at the given index. Unknown indices and horses that are
    /// already finished are ignored.
    pub fn finish_horse(&mut self, horse_idx: usize, finish_time: f64) {
        if let Some(horse_data) = self.current_race_data.get_mut(horse_idx) {
            if !horse_data.finished {
                horse_data.finished = true;
                horse_data.finish_time = finish_time;
            }
        }
    }

    /// update_horse_visual_position stores the position by horse id. The position map entry is
    /// written even if the horse does not take part in the current race.
    pub fn update_horse_visual_position(&mut self, horse_id: u32, position: f64) {
        self.horse_positions.insert(horse_id, position);

        if let Some(horse_data) = self
            .current_race_data
            .iter_mut()
            .find(|data| data.horse.id == horse_id)
        {
            horse_data.visual_position = position;
        }
    }

    /// get_all_finished is also true for a race without horses.
    pub fn get_all_finished(&self) -> bool {
        self.current_race_data.iter().all(|data| data.finished)
    }

    /// get_finished_horses returns the finished horses sorted by finish time (ties keep the
    /// order of the horse list).
    pub fn get_finished_horses(&self) -> Vec<&HorseRaceData> {
        let finished: Vec<&HorseRaceData> = self
            .current_race_data
            .iter()
            .filter(|data| data.finished)
            .collect();
        let finish_times: Vec<f64> = finished.iter().map(|data| data.finish_time).collect();

        argsort(&finish_times)
            .into_iter()
            .map(|idx| finished[idx])
            .collect()
    }

    /// finalize_race creates the race result. At least one horse must be finished.
    pub fn finalize_race(&mut self, race_distance: f64) -> RaceResult {
        let race_time = self.get_current_elapsed_time();
        let positions: Vec<RacePosition> = self
            .get_finished_horses()
            .into_iter()
            .enumerate()
            .map(|(idx, data)| RacePosition {
                horse: data.horse.to_owned(),
                position: idx as u32 + 1,
                time: data.finish_time,
                distance: data.distance_covered,
            })
            .collect();

        let winner = match positions.first() {
            Some(pos) => pos.horse.to_owned(),
            None => panic!("Tried to finalize a race without any finished horse!"),
        };

        let result = RaceResult {
            winner,
            positions,
            race_time,
            distance: race_distance,
        };

        self.race_result = Some(result.to_owned());
        self.is_racing = false;
        self.is_paused = false;

        result
    }

    pub fn pause_race(&mut self) {
        if self.is_racing && !self.is_paused {
            self.is_paused = true;
            self.pause_start_time = self.clock.now_ms();
        }
    }

    pub fn resume_race(&mut self) {
        if self.is_racing && self.is_paused {
            self.total_paused_time += self.clock.now_ms() - self.pause_start_time;
            self.is_paused = false;
            self.pause_start_time = 0.0;
        }
    }

    /// update_horse_positions_from_external merges positions observed by the presentation layer
    /// into the position map.
    pub fn update_horse_positions_from_external(&mut self, positions: &BTreeMap<u32, f64>) {
        self.horse_positions
            .extend(positions.iter().map(|(&id, &pos)| (id, pos)));
    }

    /// reset_race clears the race. Known horses stay in the position map at position 0.
    pub fn reset_race(&mut self) {
        self.is_racing = false;
        self.is_paused = false;
        self.race_result = None;
        self.race_start_time = 0.0;
        self.current_race_data.clear();
        self.total_paused_time = 0.0;
        self.pause_start_time = 0.0;

        for pos in self.horse_positions.values_mut() {
            *pos = 0.0;
        }
    }

    /// get_current_elapsed_time returns the race time (ms) without paused intervals. It does not
    /// advance while the race is paused.
    pub fn get_current_elapsed_time(&self) -> f64 {
        let now = if self.is_paused {
            self.pause_start_time
        } else {
            self.clock.now_ms()
        };
        now - self.race_start_time - self.total_paused_time
    }

    // ---------------------------------------------------------------------------------------------
    // GETTERS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn is_racing(&self) -> bool {
        self.is_racing
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn get_race_result(&self) -> Option<&RaceResult> {
        self.race_result.as_ref()
    }

    pub fn get_horse_positions(&self) -> &BTreeMap<u32, f64> {
        &self.horse_positions
    }

    pub fn get_current_race_data(&self) -> &[HorseRaceData] {
        &self.current_race_data
    }

    pub fn get_phase(&self) -> RacePhase {
        match (self.is_racing, self.is_paused, self.race_result.is_some()) {
            (true, true, _) => RacePhase::Paused,
            (true, false, _) => RacePhase::Racing,
            (false, _, true) => RacePhase::Finished,
            (false, _, false) => RacePhase::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use approx::assert_relative_eq;

    const T0: f64 = 10_000.0;

    fn horses(n: u32) -> Vec<Horse> {
        (1..=n)
            .map(|id| Horse::new(id, &format!("Horse {}", id), "#00FF00", 50))
            .collect()
    }

    fn manager() -> (RaceStateManager<ManualClock>, ManualClock) {
        let clock = ManualClock::new(T0);
        (RaceStateManager::new(clock.clone()), clock)
    }

    #[test]
    fn initialize_race_zeroes_everything() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(3), &[0.5, 0.7, 0.6]);

        assert!(rsm.is_racing());
        assert!(!rsm.is_paused());
        assert_eq!(rsm.get_phase(), RacePhase::Racing);
        assert_eq!(rsm.get_current_race_data().len(), 3);
        for data in rsm.get_current_race_data() {
            assert_eq!(data.distance_covered, 0.0);
            assert!(!data.finished);
            assert_eq!(data.finish_time, 0.0);
        }
        assert_eq!(rsm.get_horse_positions().len(), 3);
        assert!(rsm.get_horse_positions().values().all(|&p| p == 0.0));
    }

    #[test]
    #[should_panic]
    fn initialize_race_with_mismatched_speeds_panics() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(3), &[0.5, 0.7]);
    }

    #[test]
    fn initialize_race_prunes_stale_positions() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(3), &[0.5, 0.7, 0.6]);
        rsm.update_horse_visual_position(3, 120.0);

        rsm.initialize_race(&horses(2), &[0.5, 0.7]);
        assert_eq!(rsm.get_horse_positions().len(), 2);
        assert!(!rsm.get_horse_positions().contains_key(&3));
    }

    #[test]
    fn progress_scenario_at_one_second() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(3), &[0.5, 0.7, 0.6]);

        let data = rsm.update_race_progress(1000.0);
        let distances: Vec<f64> = data.iter().map(|d| d.distance_covered).collect();
        assert_relative_eq!(distances[0], 500.0);
        assert_relative_eq!(distances[1], 700.0);
        assert_relative_eq!(distances[2], 600.0);

        // horse 2 is the fastest and reaches 1200 first at about 1714ms
        let t_cross = 1200.0 / 0.7;
        assert_relative_eq!(t_cross, 1714.2857, epsilon = 1e-3);
        let data = rsm.update_race_progress(t_cross);
        assert!(data[1].distance_covered >= 1200.0 - 1e-9);
        assert!(data[0].distance_covered < 1200.0);
        assert!(data[2].distance_covered < 1200.0);
    }

    #[test]
    fn progress_update_is_idempotent() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(3), &[0.5, 0.7, 0.6]);

        let first = rsm.update_race_progress(1234.0).to_vec();
        let second = rsm.update_race_progress(1234.0).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn finished_horses_are_frozen() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(2), &[1.0, 0.5]);
        rsm.update_race_progress(1200.0);
        rsm.finish_horse(0, 1200.0);

        let data = rsm.update_race_progress(2000.0);
        assert_eq!(data[0].distance_covered, 1200.0);
        assert_eq!(data[0].finish_time, 1200.0);
        assert_eq!(data[1].distance_covered, 1000.0);
    }

    #[test]
    fn finish_horse_ignores_unknown_index_and_second_finish() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(2), &[1.0, 0.5]);

        rsm.finish_horse(5, 1000.0);
        assert!(rsm.get_current_race_data().iter().all(|d| !d.finished));

        rsm.finish_horse(1, 1000.0);
        rsm.finish_horse(1, 3000.0);
        assert_eq!(rsm.get_current_race_data()[1].finish_time, 1000.0);
    }

    #[test]
    fn visual_position_updates_by_id() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(2), &[1.0, 0.5]);

        rsm.update_horse_visual_position(2, 150.0);
        assert_eq!(rsm.get_current_race_data()[1].visual_position, 150.0);
        assert_eq!(rsm.get_horse_positions()[&2], 150.0);

        // unknown horse: map entry only
        rsm.update_horse_visual_position(99, 42.0);
        assert_eq!(rsm.get_horse_positions()[&99], 42.0);
        assert!(rsm
            .get_current_race_data()
            .iter()
            .all(|d| d.visual_position != 42.0));
    }

    #[test]
    fn empty_race_counts_as_finished() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&[], &[]);
        assert!(rsm.get_all_finished());
    }

    #[test]
    fn all_finished_only_after_last_horse() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(2), &[1.0, 0.5]);
        rsm.finish_horse(0, 1200.0);
        assert!(!rsm.get_all_finished());
        rsm.finish_horse(1, 2400.0);
        assert!(rsm.get_all_finished());
    }

    #[test]
    fn finalize_ranks_by_finish_time() {
        let (mut rsm, clock) = manager();
        let hs = horses(3);
        rsm.initialize_race(&hs, &[1.0, 1.2, 0.9]);
        rsm.finish_horse(0, 1200.0);
        rsm.finish_horse(1, 1000.0);
        rsm.finish_horse(2, 1300.0);
        clock.advance(1350.0);

        let result = rsm.finalize_race(1200.0);
        let order: Vec<u32> = result.positions.iter().map(|p| p.horse.id).collect();
        let ranks: Vec<u32> = result.positions.iter().map(|p| p.position).collect();
        let times: Vec<f64> = result.positions.iter().map(|p| p.time).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(times, vec![1000.0, 1200.0, 1300.0]);
        assert_eq!(result.winner, hs[1]);
        assert_eq!(result.race_time, 1350.0);
        assert_eq!(result.distance, 1200.0);

        assert!(!rsm.is_racing());
        assert_eq!(rsm.get_phase(), RacePhase::Finished);
        assert_eq!(rsm.get_race_result(), Some(&result));
    }

    #[test]
    fn equal_finish_times_keep_list_order() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(3), &[1.0, 1.0, 1.0]);
        rsm.finish_horse(2, 1000.0);
        rsm.finish_horse(0, 1000.0);
        rsm.finish_horse(1, 900.0);

        let ids: Vec<u32> = rsm
            .get_finished_horses()
            .iter()
            .map(|d| d.horse.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    #[should_panic]
    fn finalize_without_finished_horse_panics() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(2), &[1.0, 0.5]);
        rsm.finalize_race(1200.0);
    }

    #[test]
    fn pause_accounting() {
        let (mut rsm, clock) = manager();
        rsm.initialize_race(&horses(1), &[1.0]);

        clock.set(T0 + 2000.0);
        rsm.pause_race();
        assert_eq!(rsm.get_phase(), RacePhase::Paused);
        clock.set(T0 + 3500.0);
        rsm.resume_race();
        clock.set(T0 + 5000.0);

        assert_eq!(rsm.get_current_elapsed_time(), 3500.0);
    }

    #[test]
    fn elapsed_time_freezes_while_paused() {
        let (mut rsm, clock) = manager();
        rsm.initialize_race(&horses(1), &[1.0]);

        clock.advance(800.0);
        rsm.pause_race();
        let frozen = rsm.get_current_elapsed_time();
        clock.advance(5000.0);
        assert_eq!(rsm.get_current_elapsed_time(), frozen);
        assert_eq!(frozen, 800.0);
    }

    #[test]
    fn elapsed_time_is_monotonic_while_racing() {
        let (mut rsm, clock) = manager();
        rsm.initialize_race(&horses(1), &[1.0]);

        let mut prev = rsm.get_current_elapsed_time();
        for step in [0.0, 16.0, 17.0, 0.5, 100.0] {
            clock.advance(step);
            let cur = rsm.get_current_elapsed_time();
            assert!(cur >= prev);
            prev = cur;
        }
    }

    #[test]
    fn redundant_pause_and_resume_are_ignored() {
        let (mut rsm, clock) = manager();

        // not racing
        rsm.pause_race();
        assert!(!rsm.is_paused());

        rsm.initialize_race(&horses(1), &[1.0]);
        rsm.resume_race();
        assert!(!rsm.is_paused());

        clock.set(T0 + 1000.0);
        rsm.pause_race();
        clock.set(T0 + 1500.0);
        // second pause must not move the pause mark
        rsm.pause_race();
        clock.set(T0 + 2000.0);
        rsm.resume_race();
        rsm.resume_race();

        assert_eq!(rsm.get_current_elapsed_time(), 1000.0);
    }

    #[test]
    fn external_positions_are_merged() {
        let (mut rsm, _) = manager();
        rsm.initialize_race(&horses(3), &[1.0, 1.0, 1.0]);
        rsm.update_horse_visual_position(1, 10.0);

        let mut captured = BTreeMap::new();
        captured.insert(2, 55.5);
        captured.insert(7, 12.0);
        rsm.update_horse_positions_from_external(&captured);

        let positions = rsm.get_horse_positions();
        assert_eq!(positions[&1], 10.0);
        assert_eq!(positions[&2], 55.5);
        assert_eq!(positions[&3], 0.0);
        assert_eq!(positions[&7], 12.0);
    }

    #[test]
    fn reset_zeroes_positions_and_clears_race() {
        let (mut rsm, clock) = manager();
        rsm.initialize_race(&horses(2), &[1.0, 0.5]);
        clock.advance(500.0);
        rsm.pause_race();
        rsm.update_horse_visual_position(1, 99.0);

        rsm.reset_race();
        assert!(!rsm.is_racing());
        assert!(!rsm.is_paused());
        assert_eq!(rsm.get_phase(), RacePhase::Idle);
        assert!(rsm.get_current_race_data().is_empty());
        assert!(rsm.get_race_result().is_none());
        assert_eq!(rsm.get_horse_positions().len(), 2);
        assert!(rsm.get_horse_positions().values().all(|&p| p == 0.0));
    }

    #[test]
    fn reset_then_initialize_matches_fresh_manager() {
        let hs = horses(3);
        let speeds = [0.5, 0.7, 0.6];

        let (mut used, clock) = manager();
        used.initialize_race(&hs, &speeds);
        used.update_race_progress(3000.0);
        used.finish_horse(1, 1714.0);
        clock.advance(400.0);
        used.pause_race();
        used.reset_race();
        used.initialize_race(&hs, &speeds);

        let fresh_clock = ManualClock::new(clock.now_ms());
        let mut fresh = RaceStateManager::new(fresh_clock);
        fresh.initialize_race(&hs, &speeds);

        assert_eq!(used.get_current_race_data(), fresh.get_current_race_data());
        assert_eq!(used.get_horse_positions(), fresh.get_horse_positions());
        assert_eq!(
            used.get_current_elapsed_time(),
            fresh.get_current_elapsed_time()
        );
        assert_eq!(used.get_phase(), fresh.get_phase());
    }
}
