use log::{debug, info};

use crate::constants::MAX_FRAME_DT;
use crate::items::use_item;
use crate::physics::{update_racer, StepEnv};
use crate::session::rank_racers;
use crate::types::*;

/// Advance the session by one frame of `dt` seconds.
///
/// Sub-step order:
///  0. No-op once the race is in results
///  1. Clamp dt to [0, min(max_frame_dt, MAX_FRAME_DT)]
///  2. Edge-detect the item button
///  3. Countdown: tick down; racers stay frozen until it reaches zero,
///     and the frame that reaches zero carries on into the racing step
///  4. Advance race clock
///  5. Re-enable item boxes whose respawn time has come
///  6. Human item use (on the press edge only)
///  7. Physics step for every racer, in id order
///  8. Rank by lap * length + position, assign places
///  9. Results when the human finishes or everyone has
///  10. Advance frame counter
pub fn advance(session: &mut RaceSession, dt: f64, input: &ControlInput) {
    // 0. Results is terminal
    if session.phase == Phase::Results {
        return;
    }

    // 1. Clamp dt; a single step must never cover more than one lap wrap
    let dt = if dt.is_finite() {
        dt.clamp(0.0, session.config.max_frame_dt.min(MAX_FRAME_DT))
    } else {
        0.0
    };

    // 2. Item press edge
    let item_pressed = input.use_item && !session.prev_use_item;
    session.prev_use_item = input.use_item;

    // 3. Countdown
    if session.phase == Phase::Countdown {
        session.countdown_remaining -= dt;
        if session.countdown_remaining > 0.0 {
            session.frame += 1;
            return;
        }
        session.countdown_remaining = 0.0;
        session.phase = Phase::Racing;
        info!("GO! racing from frame {}", session.frame);
    }

    let RaceSession {
        config,
        track,
        racers,
        race_clock,
        finish_order,
        human,
        rng,
        phase,
        last_item_outcome,
        ..
    } = session;
    let human = *human;

    // 4. Race clock
    *race_clock += dt;

    // 5. Item box respawns
    track.tick_respawns(*race_clock);

    // 6. Human item use
    if item_pressed && !racers[human].finished {
        let outcome = use_item(racers, human, config.spin_trap_window, rng);
        debug!("human item use: {:?}", outcome);
        *last_item_outcome = Some(outcome);
    }

    // 7. Physics
    let mut env = StepEnv {
        track,
        rng,
        finish_order,
        race_clock: *race_clock,
        lap_goal: config.lap_goal,
        item_respawn_seconds: config.item_respawn_seconds,
        ai_item_chance: config.ai_item_chance_per_step,
        spin_trap_window: config.spin_trap_window,
    };
    for idx in 0..racers.len() {
        update_racer(racers, idx, input, dt, &mut env);
    }

    // 8. Ranking
    let track_length = env.track.length();
    rank_racers(racers, track_length);

    // 9. Race end
    if racers[human].finished || racers.iter().all(|r| r.finished) {
        *phase = Phase::Results;
        info!(
            "race over at {:.2}s, human placed {}",
            *race_clock, racers[human].place
        );
    }

    // 10. Frame
    session.frame += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::init::{default_config, start_race};

    const GAS: ControlInput = ControlInput {
        accelerate: true,
        steer_left: false,
        steer_right: false,
        use_item: false,
    };

    fn session(seed: Seed) -> RaceSession {
        start_race(&default_config(seed), 0, CarDesign::default()).unwrap()
    }

    fn skip_countdown(s: &mut RaceSession) {
        while s.phase == Phase::Countdown {
            advance(s, 0.05, &NULL_INPUT);
        }
    }

    #[test]
    fn countdown_freezes_racers() {
        let mut s = session(3);
        let before: Vec<f64> = s.racers.iter().map(|r| r.track_position).collect();
        for _ in 0..70 {
            advance(&mut s, 0.05, &GAS);
        }
        // 70 * 0.05 = 3.5 < 3.99
        assert_eq!(s.phase, Phase::Countdown);
        assert_eq!(s.race_clock, 0.0);
        let after: Vec<f64> = s.racers.iter().map(|r| r.track_position).collect();
        assert_eq!(before, after);
        assert!(s.racers.iter().all(|r| r.speed == 0.0));
    }

    #[test]
    fn countdown_ends_into_racing() {
        let mut s = session(3);
        let mut frames = 0;
        while s.phase == Phase::Countdown {
            advance(&mut s, 0.03, &GAS);
            frames += 1;
        }
        // 3.99 / 0.03 = 133, give or take float rounding
        assert!((133..=134).contains(&frames), "took {} frames", frames);
        assert_eq!(s.countdown_remaining, 0.0);
        // The transition frame already runs physics.
        assert!(s.race_clock > 0.0);
        assert!(s.racers[s.human].speed > 0.0);

        for _ in 0..200 {
            advance(&mut s, 0.016, &GAS);
            assert_eq!(s.phase, Phase::Racing);
        }
    }

    #[test]
    fn dt_is_clamped() {
        let mut s = session(4);
        skip_countdown(&mut s);
        let clock = s.race_clock;
        advance(&mut s, 1.0, &GAS);
        assert!((s.race_clock - clock - MAX_FRAME_DT).abs() < 1e-12);
        let clock = s.race_clock;
        advance(&mut s, -0.5, &GAS);
        assert_eq!(s.race_clock, clock);
        advance(&mut s, f64::NAN, &GAS);
        assert_eq!(s.race_clock, clock);
    }

    #[test]
    fn oversized_frame_cap_still_wraps_once() {
        let mut config = default_config(4);
        config.layout = vec![LayoutSection {
            segments: 8,
            curvature: 0.0,
        }];
        let mut s = start_race(&config, 0, CarDesign::default()).unwrap();
        skip_countdown(&mut s);
        // A snapshot or hand-built session can carry any cap.
        s.config.max_frame_dt = 2.0;
        let length = s.track_length();
        let human = s.human;

        for _ in 0..100 {
            s.racers[human].boost_timer = BOOST_SECONDS;
            let clock = s.race_clock;
            advance(&mut s, 2.0, &GAS);
            assert!(s.race_clock - clock <= MAX_FRAME_DT + 1e-12);
            for r in &s.racers {
                assert!(
                    (0.0..length).contains(&r.track_position),
                    "racer {} at {} on a {} track",
                    r.id,
                    r.track_position,
                    length
                );
                if !r.finished {
                    assert!((r.progress(length) - r.total_distance).abs() < 1e-6);
                }
            }
            if s.phase == Phase::Results {
                break;
            }
        }
    }

    #[test]
    fn places_are_a_permutation() {
        let mut s = session(5);
        skip_countdown(&mut s);
        for _ in 0..300 {
            advance(&mut s, 0.016, &GAS);
            let mut places: Vec<usize> = s.racers.iter().map(|r| r.place).collect();
            places.sort();
            assert_eq!(places, (1..=s.racers.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn item_press_is_edge_triggered() {
        let mut s = session(6);
        skip_countdown(&mut s);
        let human = s.human;
        let hold = ControlInput {
            use_item: true,
            ..GAS
        };

        s.racers[human].held_item = Some(ItemKind::Boost);
        advance(&mut s, 0.016, &hold);
        assert_eq!(s.racers[human].held_item, None);
        assert_eq!(s.last_item_outcome.take(), Some(ItemOutcome::Boosted));
        assert!(s.racers[human].boost_timer > 0.0);

        // Still held: a new item must not fire.
        s.racers[human].held_item = Some(ItemKind::Star);
        s.racers[human].boost_timer = 0.0;
        advance(&mut s, 0.016, &hold);
        assert_eq!(s.racers[human].held_item, Some(ItemKind::Star));
        assert_eq!(s.last_item_outcome, None);

        advance(&mut s, 0.016, &GAS);
        advance(&mut s, 0.016, &hold);
        assert_eq!(s.racers[human].held_item, None);
    }

    #[test]
    fn results_when_human_finishes() {
        let mut s = session(8);
        skip_countdown(&mut s);
        let human = s.human;
        let length = s.track.length();
        s.racers[human].lap = s.config.lap_goal - 1;
        s.racers[human].track_position = length - 10.0;
        s.racers[human].speed = s.racers[human].max_speed;
        advance(&mut s, 0.05, &GAS);

        assert_eq!(s.phase, Phase::Results);
        assert!(s.racers[human].finished);
        assert_eq!(s.finish_order, vec![human]);
        assert_eq!(s.racers[human].finish_time, Some(s.race_clock));

        // Frozen from here on.
        let frozen = s.clone();
        for _ in 0..10 {
            advance(&mut s, 0.05, &GAS);
        }
        assert_eq!(s, frozen);
    }

    #[test]
    fn results_when_everyone_finishes() {
        let mut s = session(9);
        skip_countdown(&mut s);
        for r in s.racers.iter_mut() {
            if !r.is_human() {
                r.finished = true;
            }
        }
        advance(&mut s, 0.016, &GAS);
        assert_eq!(s.phase, Phase::Racing);

        s.racers[0].finished = true;
        advance(&mut s, 0.016, &GAS);
        assert_eq!(s.phase, Phase::Results);
    }

    #[test]
    fn taken_box_comes_back_on_race_clock() {
        let mut s = session(10);
        skip_countdown(&mut s);
        for r in s.racers.iter_mut().skip(1) {
            r.finished = true;
        }
        let seg = ITEM_BOX_FIRST_SEGMENT;
        assert!(s.track.segments[seg].has_item_box);
        let at = s.race_clock + ITEM_RESPAWN_SECONDS;
        s.track.take_item_box(seg, at);

        while s.race_clock + 0.05 < at {
            advance(&mut s, 0.05, &NULL_INPUT);
            assert!(!s.track.segments[seg].has_item_box);
        }
        for _ in 0..2 {
            advance(&mut s, 0.05, &NULL_INPUT);
        }
        assert!(s.track.segments[seg].has_item_box);
        assert!(s.track.respawns.is_empty());
    }

    #[test]
    fn same_seed_same_race() {
        let mut a = session(11);
        let mut b = session(11);
        for i in 0..1500 {
            let input = ControlInput::from_buttons(if i % 90 < 60 { 1 | 8 } else { 1 | 2 });
            advance(&mut a, 0.016, &input);
            advance(&mut b, 0.016, &input);
        }
        assert_eq!(a, b);
    }
}
