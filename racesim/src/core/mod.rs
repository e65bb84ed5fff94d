pub mod clock;
pub mod handle_race;
pub mod horse;
pub mod race;
pub mod race_game;
pub mod race_state;
pub mod speed_model;
