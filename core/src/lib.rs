pub mod ai;
pub mod constants;
pub mod error;
pub mod init;
pub mod items;
pub mod physics;
pub mod prng;
pub mod projection;
pub mod replay;
pub mod session;
pub mod step;
pub mod track;
pub mod types;

pub use constants::*;
pub use error::RaceError;
pub use init::*;
pub use items::{lures, nearest_trailing, roll_item, use_item};
pub use physics::{apply_human_control, update_racer, StepEnv};
pub use prng::*;
pub use projection::*;
pub use replay::*;
pub use session::rank_racers;
pub use step::advance;
pub use track::hill_height;
pub use types::*;
