use crate::types::{Animal, ItemKind};

// Rates marked "per call" are applied once per physics step regardless of dt.
// Everything scaled by `dt * 60` is tuned for 60 Hz.

// Frame timing
pub const MAX_FRAME_DT: f64 = 0.05;
pub const REFERENCE_FPS: f64 = 60.0;

// Track
pub const SEGMENT_LENGTH: f64 = 200.0;
pub const ROAD_WIDTH: f64 = 4000.0;
pub const HILL_FREQ_LOW: f64 = 0.02;
pub const HILL_AMP_LOW: f64 = 30.0;
pub const HILL_FREQ_HIGH: f64 = 0.05;
pub const HILL_AMP_HIGH: f64 = 15.0;

// Item boxes
pub const ITEM_BOX_FIRST_SEGMENT: usize = 40;
pub const ITEM_BOX_MIN_GAP: usize = 35;
pub const ITEM_BOX_MAX_GAP: usize = 54;
pub const ITEM_RESPAWN_SECONDS: f64 = 8.0;

// Race rules
pub const LAP_GOAL: i32 = 3;
pub const COUNTDOWN_SECONDS: f64 = 3.99;
pub const START_STAGGER: f64 = 300.0;
pub const AI_GRID_LATERAL_SPREAD: f64 = 0.2;

// Racer stats: max speed = speed * PER_STAT + BASE, accel = accel * SCALE
pub const MAX_SPEED_PER_STAT: f64 = 200.0;
pub const MAX_SPEED_BASE: f64 = 800.0;
pub const ACCEL_SCALE: f64 = 120.0;

// Physics
pub const STEERING_GAIN: f64 = 0.08;
pub const COAST_DECAY_PER_SECOND: f64 = 0.25;
pub const OFF_TRACK_THRESHOLD: f64 = 0.8;
pub const OFF_TRACK_DECAY: f64 = 0.97; // per call
pub const LATERAL_LIMIT: f64 = 1.2;
pub const SPIN_DECAY: f64 = 0.95; // per call
pub const LURE_DECAY: f64 = 0.92; // per call
pub const LURE_EASE: f64 = 0.05; // fraction of the remaining gap per call
pub const BOOST_SPEED_FACTOR: f64 = 1.5;

// Items
pub const BOOST_SECONDS: f64 = 2.0;
pub const SPIN_SECONDS: f64 = 1.5;
pub const LURE_SECONDS: f64 = 2.5;
pub const LURE_TARGET_RANGE: f64 = 0.75;
pub const SPIN_TRAP_WINDOW: f64 = 3000.0;

// AI
pub const AI_THROTTLE_MIN: f64 = 0.9;
pub const AI_THROTTLE_MAX: f64 = 1.0;
pub const AI_SKILL_MIN: f64 = 0.6;
pub const AI_SKILL_MAX: f64 = 0.95;
pub const AI_INITIAL_LANE_RANGE: f64 = 0.25;
pub const AI_LANE_RANGE: f64 = 0.3;
pub const AI_LANE_CHANGE_MIN: f64 = 2.0;
pub const AI_LANE_CHANGE_MAX: f64 = 5.0;
pub const AI_CURVE_BIAS: f64 = 0.3;
pub const AI_STEER_GAIN: f64 = 3.0;
pub const AI_SHARP_CURVE: f64 = 0.5;
pub const AI_CURVE_BRAKE: f64 = 0.003; // per call, times |curvature| * skill
pub const AI_ITEM_CHANCE_PER_STEP: f64 = 0.02;

// Projection (900x600 canvas)
pub const VIEW_WIDTH: f64 = 900.0;
pub const VIEW_HEIGHT: f64 = 600.0;
pub const HORIZON_FRACTION: f64 = 0.38;
pub const VIEW_DISTANCE: f64 = 300.0;
pub const CAMERA_HEIGHT: f64 = 1200.0;
pub const DRAW_DISTANCE: usize = 200;
pub const CURVE_SHIFT: f64 = 0.05;
pub const STRIPE_SEGMENTS: usize = 3;
pub const RUMBLE_FRACTION: f64 = 0.06;
pub const SPRITE_SIZE: f64 = 180.0;
pub const SPRITE_MIN_SIZE: f64 = 3.0;
pub const SPRITE_BEHIND_CULL: f64 = 500.0;

/// Every item an item box can hand out, drawn uniformly.
pub const ITEM_POOL: [ItemKind; 8] = [
    ItemKind::Carrot,
    ItemKind::Fish,
    ItemKind::Bone,
    ItemKind::Bread,
    ItemKind::Bamboo,
    ItemKind::Boost,
    ItemKind::Banana,
    ItemKind::Star,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterProfile {
    pub name: &'static str,
    pub animal: Animal,
    pub tagline: &'static str,
    pub color: &'static str,
    pub dark_color: &'static str,
    pub speed: f64,
    pub accel: f64,
    pub handling: f64,
    pub weakness: ItemKind,
}

impl CharacterProfile {
    pub fn max_speed(&self) -> f64 {
        self.speed * MAX_SPEED_PER_STAT + MAX_SPEED_BASE
    }

    pub fn acceleration(&self) -> f64 {
        self.accel * ACCEL_SCALE
    }
}

pub const ROSTER: [CharacterProfile; 6] = [
    CharacterProfile {
        name: "Bun-Bun",
        animal: Animal::Bunny,
        tagline: "Quick & nimble!",
        color: "#FFB6C1",
        dark_color: "#E8909A",
        speed: 8.0,
        accel: 0.12,
        handling: 0.85,
        weakness: ItemKind::Carrot,
    },
    CharacterProfile {
        name: "Whiskers",
        animal: Animal::Kitten,
        tagline: "Great handling!",
        color: "#FFD89B",
        dark_color: "#E8B86D",
        speed: 7.0,
        accel: 0.10,
        handling: 0.95,
        weakness: ItemKind::Fish,
    },
    CharacterProfile {
        name: "Puddles",
        animal: Animal::Duckling,
        tagline: "Fast acceleration!",
        color: "#FFEB3B",
        dark_color: "#D4C020",
        speed: 6.0,
        accel: 0.15,
        handling: 0.80,
        weakness: ItemKind::Bread,
    },
    CharacterProfile {
        name: "Patches",
        animal: Animal::Puppy,
        tagline: "Top speed!",
        color: "#A0522D",
        dark_color: "#7B3F22",
        speed: 9.0,
        accel: 0.08,
        handling: 0.75,
        weakness: ItemKind::Bone,
    },
    CharacterProfile {
        name: "Bamboo",
        animal: Animal::Panda,
        tagline: "Well balanced!",
        color: "#E0E0E0",
        dark_color: "#333333",
        speed: 7.0,
        accel: 0.09,
        handling: 0.90,
        weakness: ItemKind::Bamboo,
    },
    CharacterProfile {
        name: "Waddles",
        animal: Animal::Penguin,
        tagline: "Ice cold moves!",
        color: "#37474F",
        dark_color: "#1a1a2e",
        speed: 6.0,
        accel: 0.14,
        handling: 0.88,
        weakness: ItemKind::Fish,
    },
];

pub fn character(index: usize) -> Option<&'static CharacterProfile> {
    ROSTER.get(index)
}
