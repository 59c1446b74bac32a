//! Pseudo-3D scanline projection.
//!
//! World space: x is lateral distance from the track centerline, y is height,
//! z is forward distance from the camera. Road curvature is faked by shifting
//! each segment sideways by the accumulated curvature between the camera and
//! the segment, scaled by depth. Nothing here mutates race state.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Horizon line as a fraction of screen height from the top.
    pub horizon_fraction: f64,
    pub view_distance: f64,
}

pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    width: VIEW_WIDTH,
    height: VIEW_HEIGHT,
    horizon_fraction: HORIZON_FRACTION,
    view_distance: VIEW_DISTANCE,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Viewport {
    /// Project a world point. `None` when the point is at or behind the camera.
    pub fn project(
        &self,
        lateral: f64,
        height: f64,
        forward: f64,
        camera_lateral: f64,
        camera_height: f64,
    ) -> Option<ScreenPoint> {
        if forward <= 0.0 || !forward.is_finite() {
            return None;
        }
        let scale = self.view_distance / forward;
        Some(ScreenPoint {
            x: self.width / 2.0 + (lateral - camera_lateral) * scale,
            y: self.height * self.horizon_fraction - (height - camera_height) * scale,
            scale,
        })
    }
}

/// `Viewport::project` on the default 900x600 view.
pub fn project_to_screen(
    lateral: f64,
    height: f64,
    forward: f64,
    camera_lateral: f64,
    camera_height: f64,
) -> Option<ScreenPoint> {
    DEFAULT_VIEWPORT.project(lateral, height, forward, camera_lateral, camera_height)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub position: f64,
    pub lateral: f64,
    pub height: f64,
    pub draw_distance: usize,
}

impl Camera {
    /// Camera riding behind `racer`.
    pub fn chase(racer: &Racer, track: &Track) -> Self {
        Camera {
            position: racer.track_position,
            lateral: racer.lateral_offset * track.road_width * 0.5,
            height: CAMERA_HEIGHT,
            draw_distance: DRAW_DISTANCE,
        }
    }

    fn base_segment(&self, track: &Track) -> i64 {
        (self.position / track.segment_length).floor() as i64
    }
}

/// Sum of curvature shifts over segments `base..=base + n`.
fn curve_shift(track: &Track, base: i64, n: usize) -> f64 {
    (0..=n as i64)
        .map(|c| track.segment_at(base + c).curvature * CURVE_SHIFT)
        .sum()
}

/// Projected left/center/right road edge at one depth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadEdge {
    pub left: ScreenPoint,
    pub center: ScreenPoint,
    pub right: ScreenPoint,
}

/// One trapezoid of road between two depths.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSlice {
    pub segment: usize,
    /// Depth of the far edge.
    pub depth: f64,
    pub far: RoadEdge,
    pub near: RoadEdge,
    /// Alternating color band (every 3 segments).
    pub stripe: bool,
    pub rumble_width: f64,
    pub item_box: bool,
}

fn road_edge(
    viewport: &Viewport,
    camera: &Camera,
    half_width: f64,
    shift: f64,
    height: f64,
    z: f64,
) -> Option<RoadEdge> {
    let at = |x: f64| viewport.project(x + shift * z, height, z, camera.lateral, camera.height);
    Some(RoadEdge {
        left: at(-half_width)?,
        center: at(0.0)?,
        right: at(half_width)?,
    })
}

/// Road slices from the draw distance toward the camera (painter's order).
/// Slices whose near or far edge would sit behind the camera are skipped.
pub fn project_road(viewport: &Viewport, track: &Track, camera: &Camera) -> Vec<RoadSlice> {
    let base = camera.base_segment(track);
    let into_segment = camera.position.rem_euclid(track.segment_length);
    let half_width = track.road_width / 2.0;
    let mut slices = Vec::with_capacity(camera.draw_distance);

    for n in (1..=camera.draw_distance).rev() {
        let z = n as f64 * track.segment_length - into_segment;
        let near_z = z - track.segment_length;
        if z <= 0.0 || near_z <= 0.0 {
            continue;
        }

        let seg = track.segment_at(base + n as i64);
        let next = track.segment_at(base + n as i64 + 1);
        let shift = curve_shift(track, base, n);

        let far = road_edge(viewport, camera, half_width, shift, seg.height_offset, z);
        let near = road_edge(viewport, camera, half_width, shift, next.height_offset, near_z);
        let (Some(far), Some(near)) = (far, near) else {
            continue;
        };

        slices.push(RoadSlice {
            segment: seg.index,
            depth: z,
            far,
            near,
            stripe: (seg.index / STRIPE_SEGMENTS) % 2 == 0,
            rumble_width: (far.right.x - far.left.x) * RUMBLE_FRACTION,
            item_box: seg.has_item_box,
        });
    }
    slices
}

/// A racer's on-screen placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacerSprite {
    pub racer: RacerId,
    /// Forward distance from the camera, after lap wrap.
    pub depth: f64,
    pub point: ScreenPoint,
    /// Sprite size in pixels.
    pub size: f64,
}

/// Signed distance from `from` to `to` on a loop of `length`, in (-L/2, L/2].
pub fn relative_position(from: f64, to: f64, length: f64) -> f64 {
    let mut rel = to - from;
    if rel < -length / 2.0 {
        rel += length;
    }
    if rel > length / 2.0 {
        rel -= length;
    }
    rel
}

/// Sprites for every racer visible from `camera`, sorted far to near.
pub fn project_racers(
    viewport: &Viewport,
    track: &Track,
    racers: &[Racer],
    camera: &Camera,
) -> Vec<RacerSprite> {
    let length = track.length();
    let base = camera.base_segment(track);
    let max_depth = camera.draw_distance as f64 * track.segment_length;

    let mut sprites: Vec<RacerSprite> = racers
        .iter()
        .filter_map(|r| {
            let rel = relative_position(camera.position, r.track_position, length);
            if rel <= -SPRITE_BEHIND_CULL || rel >= max_depth || rel <= 0.0 {
                return None;
            }
            let seg_dist = (rel / track.segment_length).floor() as usize;
            let shift = curve_shift(track, base, seg_dist);
            let world_x = r.lateral_offset * track.road_width * 0.5 + shift * rel;
            let height = track.segments[track.segment_index_at(r.track_position)].height_offset;
            let point = viewport.project(world_x, height, rel, camera.lateral, camera.height)?;
            let size = point.scale * SPRITE_SIZE;
            if size < SPRITE_MIN_SIZE {
                return None;
            }
            Some(RacerSprite {
                racer: r.id,
                depth: rel,
                point,
                size,
            })
        })
        .collect();

    sprites.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    sprites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::create_racer;

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

    fn racer_at(id: RacerId, position: f64, lateral: f64) -> Racer {
        let mut r = create_racer(id, id % ROSTER.len(), Controller::Human, CarDesign::default());
        r.track_position = position;
        r.lateral_offset = lateral;
        r
    }

    #[test]
    fn projection_formula() {
        let p = project_to_screen(100.0, 0.0, 300.0, 0.0, 1200.0).unwrap();
        assert_eq!(p.scale, 1.0);
        assert_eq!(p.x, 450.0 + 100.0);
        assert!((p.y - (600.0 * 0.38 + 1200.0)).abs() < 1e-9);

        let far = project_to_screen(100.0, 0.0, 3000.0, 0.0, 1200.0).unwrap();
        assert!(far.scale < p.scale);
        assert!((far.x - 460.0).abs() < 1e-9);
    }

    #[test]
    fn camera_offset_shifts_screen_x() {
        let centered = project_to_screen(0.0, 0.0, 600.0, 0.0, 1200.0).unwrap();
        let shifted = project_to_screen(0.0, 0.0, 600.0, 1000.0, 1200.0).unwrap();
        assert_eq!(centered.x, 450.0);
        assert_eq!(shifted.x, 450.0 - 500.0);
    }

    #[test]
    fn behind_camera_is_none() {
        assert!(project_to_screen(0.0, 0.0, 0.0, 0.0, 1200.0).is_none());
        assert!(project_to_screen(0.0, 0.0, -10.0, 0.0, 1200.0).is_none());
    }

    #[test]
    fn points_converge_on_horizon() {
        let horizon = VIEW_HEIGHT * HORIZON_FRACTION;
        let near = project_to_screen(0.0, 0.0, 500.0, 0.0, CAMERA_HEIGHT).unwrap();
        let far = project_to_screen(0.0, 0.0, 50_000.0, 0.0, CAMERA_HEIGHT).unwrap();
        assert!(near.y > far.y);
        assert!(far.y > horizon);
        assert!(far.y - horizon < 10.0);
    }

    #[test]
    fn road_slices_far_to_near() {
        let track = straight(500);
        let racer = racer_at(0, 1_050.0, 0.0);
        let camera = Camera::chase(&racer, &track);
        let slices = project_road(&DEFAULT_VIEWPORT, &track, &camera);
        // n = 1 has its near edge behind the camera.
        assert_eq!(slices.len(), DRAW_DISTANCE - 1);
        for pair in slices.windows(2) {
            assert!(pair[0].depth > pair[1].depth);
            assert!(pair[0].far.left.scale < pair[1].far.left.scale);
        }
        let first = &slices[0];
        assert_eq!(first.segment, 5 + DRAW_DISTANCE);
        assert!(first.far.left.x < first.far.center.x && first.far.center.x < first.far.right.x);
    }

    #[test]
    fn straight_road_is_centered() {
        let track = straight(500);
        let camera = Camera::chase(&racer_at(0, 0.0, 0.0), &track);
        for slice in project_road(&DEFAULT_VIEWPORT, &track, &camera) {
            assert!((slice.far.center.x - VIEW_WIDTH / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn curves_bend_the_road() {
        let track = Track::from_layout(
            &[LayoutSection {
                segments: 500,
                curvature: 0.5,
            }],
            SEGMENT_LENGTH,
            ROAD_WIDTH,
        )
        .unwrap();
        let camera = Camera::chase(&racer_at(0, 0.0, 0.0), &track);
        let slices = project_road(&DEFAULT_VIEWPORT, &track, &camera);
        let farthest = slices.first().unwrap();
        let nearest = slices.last().unwrap();
        assert!(farthest.far.center.x > nearest.far.center.x);
    }

    #[test]
    fn item_boxes_flagged_on_slices() {
        let mut track = straight(500);
        track.segments[20].has_item_box = true;
        let camera = Camera::chase(&racer_at(0, 0.0, 0.0), &track);
        let slices = project_road(&DEFAULT_VIEWPORT, &track, &camera);
        let boxed: Vec<usize> = slices.iter().filter(|s| s.item_box).map(|s| s.segment).collect();
        assert_eq!(boxed, vec![20]);
    }

    #[test]
    fn relative_position_wraps() {
        assert_eq!(relative_position(100.0, 600.0, 10_000.0), 500.0);
        assert_eq!(relative_position(9_900.0, 100.0, 10_000.0), 200.0);
        assert_eq!(relative_position(100.0, 9_900.0, 10_000.0), -200.0);
    }

    #[test]
    fn sprites_sorted_far_to_near() {
        let track = straight(500);
        let racers = vec![
            racer_at(0, 1_000.0, 0.0),
            racer_at(1, 1_500.0, 0.3),
            racer_at(2, 9_000.0, -0.3),
            racer_at(3, 4_000.0, 0.0),
            racer_at(4, 900.0, 0.0),       // behind the camera
            racer_at(5, 99_800.0, 0.0),    // behind across the lap line
        ];
        let camera = Camera::chase(&racers[0], &track);
        let sprites = project_racers(&DEFAULT_VIEWPORT, &track, &racers, &camera);
        let order: Vec<RacerId> = sprites.iter().map(|s| s.racer).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(sprites[0].size < sprites[2].size);
        assert!(sprites[2].point.x > VIEW_WIDTH / 2.0);
    }

    #[test]
    fn sprite_across_lap_line_is_visible() {
        let track = straight(500);
        let racers = vec![racer_at(0, 99_900.0, 0.0), racer_at(1, 400.0, 0.0)];
        let camera = Camera::chase(&racers[0], &track);
        let sprites = project_racers(&DEFAULT_VIEWPORT, &track, &racers, &camera);
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].racer, 1);
        assert_eq!(sprites[0].depth, 500.0);
    }

    #[test]
    fn tiny_sprites_culled() {
        let track = straight(500);
        let racers = vec![racer_at(0, 0.0, 0.0), racer_at(1, 39_000.0, 0.0)];
        let camera = Camera::chase(&racers[0], &track);
        // 300 / 39000 * 180 < 3 px
        assert!(project_racers(&DEFAULT_VIEWPORT, &track, &racers, &camera).is_empty());
    }
}
