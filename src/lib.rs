pub mod config;
pub mod entropy;
pub mod export;
pub mod fake_shots;
pub mod features;
pub mod fox;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod shots;
pub mod stability;

pub use config::{EntropyConfig, FoxInBoxConfig, RunConfig};
pub use fox::add_fox_in_box_flag;
pub use ingest::load_shots;
pub use pipeline::{PlayerRow, TeamRow, compute_player_table, team_summary};
pub use shots::ShotRecord;
pub use stability::rank_players;
