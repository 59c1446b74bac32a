use log::info;

use crate::constants::{LATERAL_LIMIT, ROSTER};
use crate::error::RaceError;
use crate::init::start_race;
use crate::step::advance;
use crate::types::*;

/// Sort by `lap * track_length + track_position`, leader first, and write
/// 1-based places back onto the racers. Ties keep id order.
pub fn rank_racers(racers: &mut [Racer], track_length: f64) {
    let mut order: Vec<RacerId> = (0..racers.len()).collect();
    order.sort_by(|&a, &b| {
        racers[b]
            .progress(track_length)
            .total_cmp(&racers[a].progress(track_length))
    });
    for (place, idx) in order.into_iter().enumerate() {
        racers[idx].place = place + 1;
    }
}

impl RaceSession {
    pub fn advance(&mut self, dt: f64, input: &ControlInput) {
        advance(self, dt, input);
    }

    pub fn human_racer(&self) -> &Racer {
        &self.racers[self.human]
    }

    /// Panics on an unknown id.
    pub fn racer(&self, id: RacerId) -> &Racer {
        &self.racers[id]
    }

    pub fn track_length(&self) -> f64 {
        self.track.length()
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Results
    }

    /// Racers ordered by current place.
    pub fn standings(&self) -> Vec<&Racer> {
        let mut standings: Vec<&Racer> = self.racers.iter().collect();
        standings.sort_by_key(|r| r.place);
        standings
    }

    /// Check a session that came from outside (a saved snapshot) before
    /// stepping it. Everything `advance` and the accessors index into must
    /// be in range.
    pub fn check(&self) -> Result<(), RaceError> {
        self.config.validate()?;
        if self.character >= ROSTER.len() {
            return Err(RaceError::UnknownCharacter(self.character));
        }
        if self.track.segments.is_empty() {
            return Err(RaceError::EmptyLayout);
        }
        if !(self.track.segment_length > 0.0) {
            return Err(RaceError::CorruptSession("segment length must be positive"));
        }
        let in_order = self
            .track
            .segments
            .iter()
            .enumerate()
            .all(|(i, s)| s.index == i);
        if !in_order {
            return Err(RaceError::CorruptSession("segment indices out of order"));
        }
        let count = self.track.total_segments();
        if self.track.respawns.iter().any(|r| r.segment >= count) {
            return Err(RaceError::CorruptSession("item respawn on a missing segment"));
        }
        if self.human >= self.racers.len() || !self.racers[self.human].is_human() {
            return Err(RaceError::CorruptSession("human racer missing"));
        }

        let length = self.track.length();
        for (i, r) in self.racers.iter().enumerate() {
            if r.id != i {
                return Err(RaceError::CorruptSession("racer ids must match their slots"));
            }
            if r.character >= ROSTER.len() {
                return Err(RaceError::UnknownCharacter(r.character));
            }
            if !(0.0..length).contains(&r.track_position) {
                return Err(RaceError::CorruptSession("racer off the lap"));
            }
            if !(r.lateral_offset.abs() <= LATERAL_LIMIT) {
                return Err(RaceError::CorruptSession("racer off the road"));
            }
            if !(r.speed >= 0.0 && r.speed <= r.max_speed) {
                return Err(RaceError::CorruptSession("racer speed out of range"));
            }
        }
        if self.finish_order.iter().any(|&id| id >= self.racers.len()) {
            return Err(RaceError::CorruptSession("finish order names a missing racer"));
        }
        Ok(())
    }

    /// Start over with the same character and kart on a fresh seed drawn
    /// from this session's RNG.
    pub fn restart(&mut self) -> Result<(), RaceError> {
        let mut config = self.config.clone();
        config.seed = self.rng.next_u32();
        info!("restarting with seed {}", config.seed);
        *self = start_race(&config, self.character, self.design.clone())?;
        Ok(())
    }
}
