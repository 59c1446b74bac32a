use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::RaceError;
use crate::init::start_race;
use crate::step::advance;
use crate::types::*;

/// One recorded frame of human input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub dt: f64,
    pub input: ControlInput,
}

/// Everything needed to re-run a race from scratch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayInput {
    pub config: RaceConfig,
    pub character: usize,
    #[serde(default)]
    pub design: CarDesign,
    pub frames: Vec<InputFrame>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutput {
    pub phase: Phase,
    pub race_clock: f64,
    /// Frames consumed before the race ended (or all of them).
    pub frames_run: usize,
    pub finish_order: Vec<RacerId>,
    /// Final place per racer id.
    pub places: Vec<usize>,
    /// SHA-256 hash of the input transcript.
    pub transcript_hash: [u8; 32],
    /// SHA-256 hash of the seed (commitment).
    pub seed_commit: [u8; 32],
}

/// SHA-256 hash of a frame transcript: dt bits then button byte per frame.
pub fn hash_transcript(frames: &[InputFrame]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for frame in frames {
        hasher.update(frame.dt.to_bits().to_le_bytes());
        hasher.update([frame.input.buttons()]);
    }
    hasher.finalize().into()
}

/// SHA-256 commitment of the seed.
pub fn hash_seed(seed: Seed) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.finalize().into()
}

/// Run a fresh session over the recorded frames. Stops early at results.
pub fn replay(input: &ReplayInput) -> Result<ReplayOutput, RaceError> {
    let mut session = start_race(&input.config, input.character, input.design.clone())?;
    let mut frames_run = 0;
    for frame in &input.frames {
        if session.phase == Phase::Results {
            break;
        }
        advance(&mut session, frame.dt, &frame.input);
        frames_run += 1;
    }

    Ok(ReplayOutput {
        phase: session.phase,
        race_clock: session.race_clock,
        frames_run,
        finish_order: session.finish_order.clone(),
        places: session.racers.iter().map(|r| r.place).collect(),
        transcript_hash: hash_transcript(&input.frames),
        seed_commit: hash_seed(input.config.seed),
    })
}
