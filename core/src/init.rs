use log::info;

use crate::ai::new_driver;
use crate::constants::*;
use crate::error::RaceError;
use crate::prng::{Mulberry32, RandomSource};
use crate::types::*;

/// The reference circuit: 16 sections, 500 segments.
pub fn default_layout() -> Vec<LayoutSection> {
    [
        (50, 0.0), // start straight
        (30, 0.5), // gentle right
        (20, 0.0),
        (40, -0.8), // left turn
        (30, 0.0),
        (25, 0.6),
        (35, -0.3),
        (40, 0.0), // long straight
        (30, 0.9), // sharp right
        (20, 0.0),
        (35, -0.7),
        (25, 0.4),
        (30, 0.0),
        (40, -0.5),
        (20, 0.3),
        (30, 0.0), // home straight
    ]
    .into_iter()
    .map(|(segments, curvature)| LayoutSection {
        segments,
        curvature,
    })
    .collect()
}

/// Default race config on the reference circuit.
pub fn default_config(seed: Seed) -> RaceConfig {
    RaceConfig {
        seed,
        layout: default_layout(),
        lap_goal: LAP_GOAL,
        segment_length: SEGMENT_LENGTH,
        road_width: ROAD_WIDTH,
        countdown_seconds: COUNTDOWN_SECONDS,
        start_stagger: START_STAGGER,
        item_respawn_seconds: ITEM_RESPAWN_SECONDS,
        item_box_first_segment: ITEM_BOX_FIRST_SEGMENT,
        item_box_min_gap: ITEM_BOX_MIN_GAP,
        item_box_max_gap: ITEM_BOX_MAX_GAP,
        max_frame_dt: MAX_FRAME_DT,
        ai_item_chance_per_step: AI_ITEM_CHANCE_PER_STEP,
        spin_trap_window: SPIN_TRAP_WINDOW,
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        default_config(0)
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.layout.iter().all(|s| s.segments == 0) {
            return Err(RaceError::EmptyLayout);
        }
        if self.lap_goal < 1 {
            return Err(RaceError::InvalidConfig("lap goal must be at least 1"));
        }
        if !(self.segment_length > 0.0) || !(self.road_width > 0.0) {
            return Err(RaceError::InvalidConfig(
                "segment length and road width must be positive",
            ));
        }
        if !(self.max_frame_dt > 0.0 && self.max_frame_dt <= MAX_FRAME_DT) {
            return Err(RaceError::InvalidConfig("max frame dt must be in (0, 0.05]"));
        }
        if self.item_box_min_gap == 0 || self.item_box_min_gap > self.item_box_max_gap {
            return Err(RaceError::InvalidConfig("item box gap range is empty"));
        }
        let total: usize = self.layout.iter().map(|s| s.segments).sum();
        let track_length = total as f64 * self.segment_length;
        if self.start_stagger * (ROSTER.len() - 1) as f64 >= track_length {
            return Err(RaceError::InvalidConfig("start grid is longer than the track"));
        }
        Ok(())
    }
}

/// A racer at rest on the line, stats copied from its profile.
pub fn create_racer(
    id: RacerId,
    character: usize,
    controller: Controller,
    design: CarDesign,
) -> Racer {
    let profile = &ROSTER[character];
    Racer {
        id,
        character,
        controller,
        design,
        max_speed: profile.max_speed(),
        accel: profile.acceleration(),
        handling: profile.handling,
        track_position: 0.0,
        lateral_offset: 0.0,
        speed: 0.0,
        steer_input: 0.0,
        lap: 0,
        finished: false,
        finish_time: None,
        held_item: None,
        spin_timer: 0.0,
        lured: false,
        lure_timer: 0.0,
        lure_target_offset: 0.0,
        boost_timer: 0.0,
        total_distance: 0.0,
        place: id + 1,
    }
}

/// Cosmetic kart for an AI racer: character colors, random trim.
pub fn ai_design<R: RandomSource>(profile: &CharacterProfile, rng: &mut R) -> CarDesign {
    CarDesign {
        body_color: profile.color.to_string(),
        wheel_color: "#333".to_string(),
        accent_color: profile.dark_color.to_string(),
        body_style: rng.index(3) as u8,
        eyes: rng.index(4) as u8,
        mouth: rng.index(4) as u8,
        nose: rng.index(4) as u8,
        body_shape: rng.index(4) as u8,
    }
}

/// Start a race: build the track, grid the human at the line and the
/// other characters behind it in roster order, and enter the countdown.
///
/// AI racer `i` starts `(i + 1) * stagger` behind the line on lap -1, so
/// crossing the line begins its first counted lap.
pub fn start_race(
    config: &RaceConfig,
    character: usize,
    design: CarDesign,
) -> Result<RaceSession, RaceError> {
    if character >= ROSTER.len() {
        return Err(RaceError::UnknownCharacter(character));
    }
    config.validate()?;

    let mut rng = Mulberry32::new(config.seed);
    let track = Track::build(config, &mut rng)?;
    let track_length = track.length();

    let mut racers = vec![create_racer(0, character, Controller::Human, design.clone())];
    for (slot, ai_character) in (0..ROSTER.len()).filter(|&c| c != character).enumerate() {
        let id = racers.len();
        let driver = new_driver(&mut rng);
        let kart = ai_design(&ROSTER[ai_character], &mut rng);
        let mut racer = create_racer(id, ai_character, Controller::Ai(driver), kart);
        let behind = (slot + 1) as f64 * config.start_stagger;
        racer.track_position = track_length - behind;
        racer.total_distance = -behind;
        racer.lap = -1;
        racer.lateral_offset = rng.range(-AI_GRID_LATERAL_SPREAD, AI_GRID_LATERAL_SPREAD);
        racers.push(racer);
    }

    info!(
        "race start: {} as {}, {} racers, {} segments",
        ROSTER[character].name,
        character,
        racers.len(),
        track.total_segments()
    );

    Ok(RaceSession {
        config: config.clone(),
        character,
        design,
        track,
        racers,
        phase: Phase::Countdown,
        race_clock: 0.0,
        countdown_remaining: config.countdown_seconds,
        finish_order: Vec::new(),
        human: 0,
        rng,
        prev_use_item: false,
        last_item_outcome: None,
        frame: 0,
    })
}
