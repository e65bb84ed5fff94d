pub mod read_sim_pars;
pub mod roster;
pub mod schedule;
pub mod sim_opts;
