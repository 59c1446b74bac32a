use log::{debug, info};

use crate::ai;
use crate::constants::*;
use crate::items::{roll_item, use_item};
use crate::prng::RandomSource;
use crate::types::*;

/// Shared, mutable surroundings for one racer's physics step.
pub struct StepEnv<'a, R: RandomSource> {
    pub track: &'a mut Track,
    pub rng: &'a mut R,
    pub finish_order: &'a mut Vec<RacerId>,
    pub race_clock: f64,
    pub lap_goal: i32,
    pub item_respawn_seconds: f64,
    pub ai_item_chance: f64,
    pub spin_trap_window: f64,
}

/// Throttle and steering from the human's held buttons.
/// Left is checked first, then right.
pub fn apply_human_control(racer: &mut Racer, input: &ControlInput, dt: f64) {
    if input.accelerate {
        racer.speed += racer.accel * dt * REFERENCE_FPS;
    } else {
        racer.speed *= 1.0 - COAST_DECAY_PER_SECOND * dt;
    }

    racer.steer_input = if input.steer_left {
        -1.0
    } else if input.steer_right {
        1.0
    } else {
        0.0
    };
}

/// Spun out: bleed speed, no control, no movement.
fn spin_out(racer: &mut Racer, dt: f64) {
    racer.spin_timer -= dt;
    racer.speed *= SPIN_DECAY;
}

/// Lured: drift toward the lure, bleed speed, no forward progress.
fn follow_lure(racer: &mut Racer, dt: f64) {
    racer.lure_timer -= dt;
    racer.lateral_offset += (racer.lure_target_offset - racer.lateral_offset) * LURE_EASE;
    racer.lateral_offset = racer.lateral_offset.clamp(-LATERAL_LIMIT, LATERAL_LIMIT);
    racer.speed *= LURE_DECAY;
    if racer.lure_timer <= 0.0 {
        racer.lured = false;
    }
}

/// Boost pins the pre-clamp speed at 1.5x top speed.
fn apply_boost(racer: &mut Racer, dt: f64) {
    if racer.boost_timer > 0.0 {
        racer.boost_timer -= dt;
        racer.speed = racer.max_speed * BOOST_SPEED_FACTOR;
    }
}

/// Move sideways by the steer input; grass past 0.8 costs speed.
fn apply_steering(racer: &mut Racer, dt: f64) {
    racer.lateral_offset +=
        racer.steer_input * racer.handling * STEERING_GAIN * dt * REFERENCE_FPS;

    if racer.lateral_offset.abs() > OFF_TRACK_THRESHOLD {
        racer.speed *= OFF_TRACK_DECAY;
    }
    racer.lateral_offset = racer.lateral_offset.clamp(-LATERAL_LIMIT, LATERAL_LIMIT);
}

/// Advance along the track and handle the lap line.
/// Returns true on the call the racer finishes.
fn advance_along_track(
    racer: &mut Racer,
    dt: f64,
    track_length: f64,
    race_clock: f64,
    lap_goal: i32,
) -> bool {
    let travelled = racer.speed * dt;
    racer.track_position += travelled;
    racer.total_distance += travelled;

    if racer.track_position < track_length {
        return false;
    }
    racer.track_position -= track_length;
    racer.lap += 1;
    info!("racer {} started lap {}/{}", racer.id, racer.lap + 1, lap_goal);

    if racer.lap >= lap_goal {
        racer.finished = true;
        racer.finish_time = Some(race_clock);
        info!("racer {} finished at {:.2}s", racer.id, race_clock);
        return true;
    }
    false
}

/// Advance racer `idx` by `dt` seconds.
///
/// Order of concerns (each of the first three ends the step):
///  1. Finished racers are frozen
///  2. Spin-out: decay timer and speed
///  3. Lure: drift toward the lure target
///  4. Driving: control (human or AI), AI item use, boost, speed clamp,
///     steering + off-track penalty, forward motion + lap line, item pickup
///
/// `input` is only read for the human racer.
pub fn update_racer<R: RandomSource>(
    racers: &mut [Racer],
    idx: RacerId,
    input: &ControlInput,
    dt: f64,
    env: &mut StepEnv<'_, R>,
) {
    {
        let racer = &mut racers[idx];
        if racer.finished {
            return;
        }
        if racer.spin_timer > 0.0 {
            spin_out(racer, dt);
            return;
        }
        if racer.lured {
            follow_lure(racer, dt);
            return;
        }
    }

    let seg_idx = env.track.segment_index_at(racers[idx].track_position);
    let curvature = env.track.segments[seg_idx].curvature;

    let wants_item = match racers[idx].controller {
        Controller::Human => {
            apply_human_control(&mut racers[idx], input, dt);
            false
        }
        Controller::Ai(_) => {
            ai::drive(&mut racers[idx], curvature, dt, env.ai_item_chance, env.rng)
        }
    };
    if wants_item {
        use_item(racers, idx, env.spin_trap_window, env.rng);
    }

    let track_length = env.track.length();
    let racer = &mut racers[idx];
    apply_boost(racer, dt);
    racer.speed = racer.speed.clamp(0.0, racer.max_speed);
    apply_steering(racer, dt);

    if advance_along_track(racer, dt, track_length, env.race_clock, env.lap_goal) {
        env.finish_order.push(racer.id);
    }

    if env.track.segments[seg_idx].has_item_box && racer.held_item.is_none() {
        let item = roll_item(env.rng);
        racer.held_item = Some(item);
        env.track
            .take_item_box(seg_idx, env.race_clock + env.item_respawn_seconds);
        debug!("racer {} picked up {:?} at segment {}", racer.id, item, seg_idx);
    }
}
