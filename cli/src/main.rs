mod logger;

use clap::Parser;
use racesim::core::clock::{Clock, ManualClock, SystemClock};
use racesim::core::handle_race::{handle_race, Command};
use racesim::core::race::Race;
use racesim::core::race_game::RaceGame;
use racesim::core::race_state::RacePhase;
use racesim::interfaces::animation_driver::{FrameLoop, RealtimeDriver, SteppedDriver};
use racesim::interfaces::presentation_interface::RaceState;
use racesim::post::result_store::ResultStore;
use racesim::pre::read_sim_pars::{read_sim_pars, SimPars};
use racesim::pre::roster::generate_roster;
use racesim::pre::schedule::generate_schedule;
use racesim::pre::sim_opts::SimOpts;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::io::BufRead;
use std::thread;
use std::time::Instant;

/// spawn_stdin_reader forwards single-letter commands typed on stdin to the race loop.
fn spawn_stdin_reader() -> flume::Receiver<Command> {
    let (tx, rx) = flume::unbounded();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let cmd = match line.as_deref().map(str::trim) {
                Ok("p") => Command::Toggle,
                Ok("r") => Command::Reset,
                Ok("q") => Command::Quit,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(cmd).is_err() {
                break;
            }
        }
    });
    rx
}

/// spawn_progress_printer prints the leading horse once per second of race time.
fn spawn_progress_printer(rx_state: flume::Receiver<RaceState>, level: log::Level) {
    thread::spawn(move || {
        let mut t_next_print = 1000.0;
        for race_state in rx_state.iter() {
            // a new race started
            if race_state.elapsed_time + 1000.0 < t_next_print {
                t_next_print = 1000.0;
            }
            if race_state.phase != RacePhase::Racing || race_state.elapsed_time < t_next_print {
                continue;
            }
            if let Some(leader) = race_state.horse_states.iter().max_by(|a, b| {
                a.distance_covered
                    .partial_cmp(&b.distance_covered)
                    .unwrap_or(Ordering::Equal)
            }) {
                log::log!(
                    level,
                    "Racing... Current race time is {:.1}s, leader is {} at {:.0}",
                    race_state.elapsed_time / 1000.0,
                    leader.name,
                    leader.distance_covered
                );
            }
            t_next_print = race_state.elapsed_time + 1000.0;
        }
    });
}

/// run_rounds runs all scheduled races in order and collects their results.
fn run_rounds<D: FrameLoop, C: Clock>(
    mut game: RaceGame<D, C, StdRng>,
    races: &mut [Race],
    rx_cmd: Option<&flume::Receiver<Command>>,
    progress_level: log::Level,
) -> anyhow::Result<ResultStore> {
    spawn_progress_printer(game.subscribe(), progress_level);
    let mut result_store = ResultStore::new();

    for race in races.iter_mut() {
        log::info!(
            "Round {} over {}m with {} horses",
            race.round,
            race.get_distance(game.default_distance()),
            race.horses.len()
        );

        match handle_race(&mut game, race, rx_cmd)? {
            Some(race_result) => {
                race_result.print_positions();
                result_store.push(race.round, race_result);
            }
            None => {
                log::info!("Game stopped in round {}", race.round);
                break;
            }
        }
    }

    Ok(result_store)
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    logger::init(sim_opts.debug)?;

    // show stored results only
    if let Some(results_path) = &sim_opts.results_path {
        let result_store = ResultStore::read_json(results_path)?;
        log::info!(
            "Loaded {} round result(s) from {:?}",
            result_store.rounds.len(),
            results_path
        );
        result_store.print_results();
        for round_result in result_store.rounds.iter() {
            log::info!("Round {}", round_result.round);
            round_result.result.print_positions();
        }
        return Ok(());
    }

    // get game parameters
    let sim_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        log::info!("Reading game parameters from {:?}", parfile_path);
        read_sim_pars(parfile_path)?
    } else {
        SimPars::default()
    };

    if !(1.0..=240.0).contains(&sim_opts.frame_rate) {
        anyhow::bail!(
            "Frame rate must be in the range [1.0, 240.0] Hz, but is {:.1}Hz!",
            sim_opts.frame_rate
        );
    }

    let mut rng = match sim_opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // generate roster and race schedule
    let roster = generate_roster(sim_pars.horses_count, sim_pars.condition_range, &mut rng)?;
    let mut races = generate_schedule(&roster, &sim_pars, &mut rng)?;
    log::info!(
        "Generated {} horses and {} rounds",
        roster.len(),
        races.len()
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();
    let result_store = if sim_opts.live {
        log::info!("Running races in real-time (p = pause/resume, r = restart round, q = quit)");
        let rx_cmd = spawn_stdin_reader();
        let game = RaceGame::new(
            RealtimeDriver::new(sim_opts.frame_rate, sim_opts.track_width),
            SystemClock::new(),
            rng,
            sim_pars.timing_pars,
            sim_pars.default_distance,
        );
        run_rounds(game, &mut races, Some(&rx_cmd), log::Level::Info)?
    } else {
        let clock = ManualClock::new(0.0);
        let game = RaceGame::new(
            SteppedDriver::new(clock.clone(), sim_opts.frame_rate, sim_opts.track_width),
            clock,
            rng,
            sim_pars.timing_pars,
            sim_pars.default_distance,
        );
        run_rounds(game, &mut races, None, log::Level::Debug)?
    };
    log::info!("Execution time: {}ms", t_start.elapsed().as_millis());

    // POST-PROCESSING -----------------------------------------------------------------------------
    result_store.print_results();

    if let Some(output_path) = &sim_opts.output_path {
        match result_store.write_files(output_path) {
            Ok((json_path, csv_path)) => {
                log::info!("Results written to {:?} and {:?}", json_path, csv_path)
            }
            Err(e) => log::warn!("Could not write results: {:#}", e),
        }
    }

    Ok(())
}
