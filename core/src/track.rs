use log::debug;

use crate::constants::*;
use crate::error::RaceError;
use crate::prng::RandomSource;
use crate::types::*;

/// Cosmetic hill height for an absolute segment index.
pub fn hill_height(index: usize) -> f64 {
    let i = index as f64;
    (i * HILL_FREQ_LOW).sin() * HILL_AMP_LOW + (i * HILL_FREQ_HIGH).sin() * HILL_AMP_HIGH
}

impl Track {
    /// Flatten a layout into segments. No item boxes are placed.
    pub fn from_layout(
        layout: &[LayoutSection],
        segment_length: f64,
        road_width: f64,
    ) -> Result<Track, RaceError> {
        let mut segments = Vec::new();
        for section in layout {
            for _ in 0..section.segments {
                let index = segments.len();
                segments.push(Segment {
                    index,
                    curvature: section.curvature,
                    height_offset: hill_height(index),
                    has_item_box: false,
                });
            }
        }
        if segments.is_empty() {
            return Err(RaceError::EmptyLayout);
        }
        Ok(Track {
            segments,
            segment_length,
            road_width,
            respawns: Vec::new(),
        })
    }

    /// Build the race track from a config, scattering item boxes with `rng`.
    pub fn build<R: RandomSource>(config: &RaceConfig, rng: &mut R) -> Result<Track, RaceError> {
        let mut track =
            Track::from_layout(&config.layout, config.segment_length, config.road_width)?;
        track.place_item_boxes(
            config.item_box_first_segment,
            config.item_box_min_gap,
            config.item_box_max_gap,
            rng,
        );
        Ok(track)
    }

    /// One box at `first`, then one every `min_gap..=max_gap` segments
    /// until the end of the lap.
    pub fn place_item_boxes<R: RandomSource>(
        &mut self,
        first: usize,
        min_gap: usize,
        max_gap: usize,
        rng: &mut R,
    ) {
        let mut i = first;
        while i < self.segments.len() {
            self.segments[i].has_item_box = true;
            i += rng.int_range(min_gap as i32, max_gap as i32).max(1) as usize;
        }
    }

    pub fn total_segments(&self) -> usize {
        self.segments.len()
    }

    /// Lap length in distance units.
    pub fn length(&self) -> f64 {
        self.segments.len() as f64 * self.segment_length
    }

    /// Wrap any (possibly negative) segment index onto the loop.
    pub fn wrap_index(&self, index: i64) -> usize {
        assert!(!self.segments.is_empty(), "track queried before it was built");
        index.rem_euclid(self.segments.len() as i64) as usize
    }

    pub fn segment_at(&self, index: i64) -> &Segment {
        &self.segments[self.wrap_index(index)]
    }

    /// Index of the segment under a track position.
    pub fn segment_index_at(&self, position: f64) -> usize {
        self.wrap_index((position / self.segment_length).floor() as i64)
    }

    pub fn item_box_count(&self) -> usize {
        self.segments.iter().filter(|s| s.has_item_box).count()
    }

    /// Disable a box and schedule it back on at `respawn_at` (race clock).
    pub fn take_item_box(&mut self, index: usize, respawn_at: f64) {
        self.segments[index].has_item_box = false;
        self.respawns.push(ItemRespawn {
            segment: index,
            at: respawn_at,
        });
    }

    /// Re-enable every box whose respawn time has come.
    pub fn tick_respawns(&mut self, now: f64) {
        let segments = &mut self.segments;
        self.respawns.retain(|r| {
            if now >= r.at {
                segments[r.segment].has_item_box = true;
                debug!("item box at segment {} respawned", r.segment);
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::{default_config, default_layout};
    use crate::prng::Mulberry32;

    fn straight(n: usize) -> Track {
        Track::from_layout(
            &[LayoutSection {
                segments: n,
                curvature: 0.0,
            }],
            SEGMENT_LENGTH,
            ROAD_WIDTH,
        )
        .unwrap()
    }

    #[test]
    fn layout_flattens_in_order() {
        let track = Track::from_layout(
            &[
                LayoutSection {
                    segments: 3,
                    curvature: 0.0,
                },
                LayoutSection {
                    segments: 2,
                    curvature: -0.8,
                },
            ],
            200.0,
            4000.0,
        )
        .unwrap();
        assert_eq!(track.total_segments(), 5);
        assert_eq!(track.length(), 1000.0);
        for (i, seg) in track.segments.iter().enumerate() {
            assert_eq!(seg.index, i);
        }
        assert_eq!(track.segments[2].curvature, 0.0);
        assert_eq!(track.segments[3].curvature, -0.8);
    }

    #[test]
    fn default_circuit_has_500_segments() {
        let track = Track::from_layout(&default_layout(), SEGMENT_LENGTH, ROAD_WIDTH).unwrap();
        assert_eq!(track.total_segments(), 500);
        assert_eq!(track.length(), 100_000.0);
    }

    #[test]
    fn hill_heights_follow_two_sines() {
        let track = straight(100);
        assert_eq!(track.segments[0].height_offset, 0.0);
        let expected = (10.0f64 * 0.02).sin() * 30.0 + (10.0f64 * 0.05).sin() * 15.0;
        assert!((track.segments[10].height_offset - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_layout_rejected() {
        assert_eq!(
            Track::from_layout(&[], SEGMENT_LENGTH, ROAD_WIDTH),
            Err(RaceError::EmptyLayout)
        );
        let zero = [LayoutSection {
            segments: 0,
            curvature: 0.3,
        }];
        assert!(Track::from_layout(&zero, SEGMENT_LENGTH, ROAD_WIDTH).is_err());
    }

    #[test]
    fn segment_lookup_wraps() {
        let track = straight(10);
        assert_eq!(track.segment_at(0).index, 0);
        assert_eq!(track.segment_at(10).index, 0);
        assert_eq!(track.segment_at(23).index, 3);
        assert_eq!(track.segment_at(-1).index, 9);
        assert_eq!(track.segment_index_at(199.9), 0);
        assert_eq!(track.segment_index_at(200.0), 1);
        assert_eq!(track.segment_index_at(2000.0), 0);
    }

    #[test]
    fn item_boxes_spaced_within_bounds() {
        for seed in 0..20 {
            let mut rng = Mulberry32::new(seed);
            let track = Track::build(&default_config(seed), &mut rng).unwrap();
            let boxes: Vec<usize> = track
                .segments
                .iter()
                .filter(|s| s.has_item_box)
                .map(|s| s.index)
                .collect();
            assert!(!boxes.is_empty());
            assert_eq!(boxes[0], ITEM_BOX_FIRST_SEGMENT);
            for pair in boxes.windows(2) {
                let gap = pair[1] - pair[0];
                assert!(
                    (ITEM_BOX_MIN_GAP..=ITEM_BOX_MAX_GAP).contains(&gap),
                    "gap {} out of range",
                    gap
                );
            }
        }
    }

    #[test]
    fn item_boxes_follow_drawn_gaps() {
        struct Fixed(f64);
        impl RandomSource for Fixed {
            fn next_unit(&mut self) -> f64 {
                self.0
            }
        }

        let mut track = straight(200);
        track.place_item_boxes(40, 35, 54, &mut Fixed(0.0));
        let boxes: Vec<usize> = track
            .segments
            .iter()
            .filter(|s| s.has_item_box)
            .map(|s| s.index)
            .collect();
        assert_eq!(boxes, vec![40, 75, 110, 145, 180]);

        let mut track = straight(200);
        track.place_item_boxes(40, 35, 54, &mut Fixed(0.9999));
        let boxes: Vec<usize> = track
            .segments
            .iter()
            .filter(|s| s.has_item_box)
            .map(|s| s.index)
            .collect();
        assert_eq!(boxes, vec![40, 94, 148]);
    }

    #[test]
    fn taken_box_respawns_on_schedule() {
        let mut track = straight(100);
        track.segments[40].has_item_box = true;
        track.take_item_box(40, 10.0 + ITEM_RESPAWN_SECONDS);
        assert!(!track.segments[40].has_item_box);
        assert_eq!(track.respawns.len(), 1);

        track.tick_respawns(17.9);
        assert!(!track.segments[40].has_item_box);

        track.tick_respawns(18.0);
        assert!(track.segments[40].has_item_box);
        assert!(track.respawns.is_empty());
    }
}
