use crate::constants::*;
use crate::prng::RandomSource;
use crate::types::*;

/// Roll a fresh set of AI parameters.
pub fn new_driver<R: RandomSource>(rng: &mut R) -> AiDriver {
    AiDriver {
        throttle_factor: rng.range(AI_THROTTLE_MIN, AI_THROTTLE_MAX),
        skill: rng.range(AI_SKILL_MIN, AI_SKILL_MAX),
        lane_target: rng.range(-AI_INITIAL_LANE_RANGE, AI_INITIAL_LANE_RANGE),
        lane_change_timer: 0.0,
    }
}

/// Where the driver wants to sit laterally on a segment with `curvature`.
/// Skilled drivers cut further toward the inside of the bend.
pub fn target_offset(driver: &AiDriver, curvature: f64) -> f64 {
    driver.lane_target - curvature * AI_CURVE_BIAS * driver.skill
}

/// One AI control decision: lane wandering, steering toward the target
/// line, constant throttle, braking for sharp curves.
///
/// Returns true when the driver decides to fire its held item this step.
/// No-op for human racers.
pub fn drive<R: RandomSource>(
    racer: &mut Racer,
    curvature: f64,
    dt: f64,
    item_chance: f64,
    rng: &mut R,
) -> bool {
    let Controller::Ai(driver) = &mut racer.controller else {
        return false;
    };

    driver.lane_change_timer -= dt;
    if driver.lane_change_timer <= 0.0 {
        driver.lane_target = rng.range(-AI_LANE_RANGE, AI_LANE_RANGE);
        driver.lane_change_timer = rng.range(AI_LANE_CHANGE_MIN, AI_LANE_CHANGE_MAX);
    }

    let delta = target_offset(driver, curvature) - racer.lateral_offset;
    racer.steer_input = (delta * AI_STEER_GAIN * driver.skill).clamp(-1.0, 1.0);

    racer.speed += racer.accel * driver.throttle_factor * dt * REFERENCE_FPS;

    if curvature.abs() > AI_SHARP_CURVE {
        racer.speed *= 1.0 - curvature.abs() * AI_CURVE_BRAKE * driver.skill;
    }

    racer.held_item.is_some() && rng.chance(item_chance)
}
