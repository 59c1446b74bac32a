use serde::{Deserialize, Serialize};

use crate::constants::{CharacterProfile, ROSTER};
use crate::prng::Mulberry32;

// ── Primitives ──────────────────────────────────────────────

/// Index of a racer in the session's racer list.
pub type RacerId = usize;
pub type Seed = u32;

// ── Input ───────────────────────────────────────────────────

/// Button bitmask constants (wire format for the browser bridge).
pub mod button {
    pub const ACCELERATE: u8 = 1;
    pub const LEFT: u8 = 2;
    pub const RIGHT: u8 = 4;
    pub const ITEM: u8 = 8;
}

/// Human control state for one frame. `use_item` is the button level;
/// the session turns it into a press edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlInput {
    pub accelerate: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub use_item: bool,
}

pub const NULL_INPUT: ControlInput = ControlInput {
    accelerate: false,
    steer_left: false,
    steer_right: false,
    use_item: false,
};

impl ControlInput {
    pub fn from_buttons(buttons: u8) -> Self {
        ControlInput {
            accelerate: buttons & button::ACCELERATE != 0,
            steer_left: buttons & button::LEFT != 0,
            steer_right: buttons & button::RIGHT != 0,
            use_item: buttons & button::ITEM != 0,
        }
    }

    pub fn buttons(&self) -> u8 {
        let mut b = 0;
        if self.accelerate {
            b |= button::ACCELERATE;
        }
        if self.steer_left {
            b |= button::LEFT;
        }
        if self.steer_right {
            b |= button::RIGHT;
        }
        if self.use_item {
            b |= button::ITEM;
        }
        b
    }
}

// ── Characters & items ─────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animal {
    Bunny,
    Kitten,
    Duckling,
    Puppy,
    Panda,
    Penguin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Carrot,
    Fish,
    Bone,
    Bread,
    Bamboo,
    Boost,
    /// Dropped peel that spins out the nearest racer behind.
    Banana,
    Star,
}

/// What a call to `use_item` did, for feedback text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "racers")]
pub enum ItemOutcome {
    /// Slot was empty.
    Nothing,
    Boosted,
    SpunOut(RacerId),
    Lured(Vec<RacerId>),
    /// Item consumed but nobody was affected.
    Missed,
}

// ── Car design ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarDesign {
    pub body_color: String,
    pub wheel_color: String,
    pub accent_color: String,
    pub body_style: u8,
    pub eyes: u8,
    pub mouth: u8,
    pub nose: u8,
    pub body_shape: u8,
}

impl Default for CarDesign {
    fn default() -> Self {
        CarDesign {
            body_color: "#FF6B9D".to_string(),
            wheel_color: "#333".to_string(),
            accent_color: "#FFD700".to_string(),
            body_style: 0,
            eyes: 0,
            mouth: 0,
            nose: 0,
            body_shape: 0,
        }
    }
}

// ── Track ───────────────────────────────────────────────────

/// One run of identical segments in a track layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutSection {
    pub segments: usize,
    pub curvature: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub index: usize,
    pub curvature: f64,
    /// Cosmetic hill height, never read by physics.
    pub height_offset: f64,
    pub has_item_box: bool,
}

/// Pending re-enable of a taken item box, in race-clock seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemRespawn {
    pub segment: usize,
    pub at: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub segments: Vec<Segment>,
    pub segment_length: f64,
    pub road_width: f64,
    pub respawns: Vec<ItemRespawn>,
}

// ── Racer ───────────────────────────────────────────────────

/// Per-racer AI parameters, rolled once when the racer is created.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDriver {
    pub throttle_factor: f64,
    pub skill: f64,
    pub lane_target: f64,
    pub lane_change_timer: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum Controller {
    Human,
    Ai(AiDriver),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacerStatus {
    pub spinning: bool,
    pub lured: bool,
    pub boosting: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Racer {
    pub id: RacerId,
    /// Index into the character roster.
    pub character: usize,
    pub controller: Controller,
    pub design: CarDesign,
    pub max_speed: f64,
    pub accel: f64,
    pub handling: f64,
    pub track_position: f64,
    pub lateral_offset: f64,
    pub speed: f64,
    pub steer_input: f64,
    /// Starts at -1 for racers gridded behind the line.
    pub lap: i32,
    pub finished: bool,
    pub finish_time: Option<f64>,
    pub held_item: Option<ItemKind>,
    pub spin_timer: f64,
    pub lured: bool,
    pub lure_timer: f64,
    pub lure_target_offset: f64,
    pub boost_timer: f64,
    pub total_distance: f64,
    pub place: usize,
}

impl Racer {
    pub fn profile(&self) -> &'static CharacterProfile {
        &ROSTER[self.character]
    }

    pub fn is_human(&self) -> bool {
        matches!(self.controller, Controller::Human)
    }

    pub fn status(&self) -> RacerStatus {
        RacerStatus {
            spinning: self.spin_timer > 0.0,
            lured: self.lured,
            boosting: self.boost_timer > 0.0,
        }
    }

    /// Ranking key: whole laps plus distance into the current lap.
    pub fn progress(&self, track_length: f64) -> f64 {
        self.lap as f64 * track_length + self.track_position
    }
}

// ── Session ─────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Countdown,
    Racing,
    Results,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RaceConfig {
    pub seed: Seed,
    pub layout: Vec<LayoutSection>,
    pub lap_goal: i32,
    pub segment_length: f64,
    pub road_width: f64,
    pub countdown_seconds: f64,
    /// Distance between consecutive AI grid slots.
    pub start_stagger: f64,
    pub item_respawn_seconds: f64,
    pub item_box_first_segment: usize,
    pub item_box_min_gap: usize,
    pub item_box_max_gap: usize,
    pub max_frame_dt: f64,
    pub ai_item_chance_per_step: f64,
    pub spin_trap_window: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSession {
    pub config: RaceConfig,
    /// Roster index the human picked.
    pub character: usize,
    pub design: CarDesign,
    pub track: Track,
    pub racers: Vec<Racer>,
    pub phase: Phase,
    pub race_clock: f64,
    pub countdown_remaining: f64,
    /// Racer ids in the order they crossed the finish line.
    pub finish_order: Vec<RacerId>,
    pub human: RacerId,
    pub rng: Mulberry32,
    /// Last frame's item button level, for edge detection.
    pub prev_use_item: bool,
    /// What the human's most recent item press did, until someone takes it.
    #[serde(default)]
    pub last_item_outcome: Option<ItemOutcome>,
    pub frame: u64,
}
