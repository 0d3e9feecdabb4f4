use macroquad::prelude::*;

use crate::config::{EffectParams, Palette};
use crate::effects::DashEffect;
use crate::helpers::{add_color, lerp_color, scale_color};
use crate::map::{Map, OUT_OF_BOUNDS};
use crate::player::Player;

/// A target within this distance of the player counts as struck by the ray.
pub const HIT_PROXIMITY: f32 = 1.0;

const MIN_PERP_DIST: f32 = 1e-4;
const TARGET_HEIGHT_SCALE: f32 = 0.6;

/// Target newly struck during the current render pass. The list is rebuilt
/// every frame; consumers must read it before the next render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetHit {
    pub x: i32,
    pub y: i32,
    pub points: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct TargetColumn {
    pub x: i32,
    pub y: i32,
    pub dist: f32,
    pub hit: bool,
    pub points: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnHit {
    pub perp_dist: f32,
    /// 0 for an X-side (vertical face) hit, 1 for a Y-side hit.
    pub side: i32,
    /// Cell code of the wall, or 0 when the ray left the grid.
    pub wall_type: i32,
    pub target: Option<TargetColumn>,
}

/// Casts one ray through the grid. `camera_x` is the camera-space column
/// offset in [-1, 1]. Targets along the ray are recorded (first one only)
/// without stopping it; the walk ends at the first wall cell or on leaving
/// the grid, and is step-bounded either way.
pub fn cast_column(player: &Player, map: &Map, camera_x: f32) -> ColumnHit {
    let pos = player.position();
    let ray_dir = player.direction() + player.plane() * camera_x;

    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;

    // A zero ray component never wins the side-distance race, which stands in
    // for "never crosses a boundary on that axis" without dividing by zero.
    let (delta_x, step_x, mut side_dist_x) = if ray_dir.x == 0.0 {
        (f32::INFINITY, 0, f32::INFINITY)
    } else {
        let delta = (1.0 / ray_dir.x).abs();
        if ray_dir.x < 0.0 {
            (delta, -1, (pos.x - map_x as f32) * delta)
        } else {
            (delta, 1, (map_x as f32 + 1.0 - pos.x) * delta)
        }
    };
    let (delta_y, step_y, mut side_dist_y) = if ray_dir.y == 0.0 {
        (f32::INFINITY, 0, f32::INFINITY)
    } else {
        let delta = (1.0 / ray_dir.y).abs();
        if ray_dir.y < 0.0 {
            (delta, -1, (pos.y - map_y as f32) * delta)
        } else {
            (delta, 1, (map_y as f32 + 1.0 - pos.y) * delta)
        }
    };

    let mut side = 0;
    let mut wall_type = 0;
    let mut target: Option<TargetColumn> = None;

    let max_steps = ((map.width() + map.height()) * 2) as usize;
    for _ in 0..max_steps {
        if side_dist_x < side_dist_y {
            side_dist_x += delta_x;
            map_x += step_x;
            side = 0;
        } else {
            side_dist_y += delta_y;
            map_y += step_y;
            side = 1;
        }

        let value = map.value_at(map_x, map_y);
        if value == OUT_OF_BOUNDS {
            break;
        }
        if target.is_none() {
            if let Some(t) = map.target_at(map_x, map_y) {
                let dist = perp_distance(pos, ray_dir, map_x, map_y, step_x, step_y, side);
                target = Some(TargetColumn {
                    x: t.x,
                    y: t.y,
                    dist: dist.max(MIN_PERP_DIST),
                    hit: t.hit,
                    points: t.points,
                });
            }
        }
        if value > 0 {
            wall_type = value;
            break;
        }
    }

    let perp_dist =
        perp_distance(pos, ray_dir, map_x, map_y, step_x, step_y, side).max(MIN_PERP_DIST);

    ColumnHit {
        perp_dist,
        side,
        wall_type,
        target,
    }
}

/// Perpendicular distance from the camera plane to the crossed cell face,
/// which removes the fisheye distortion of measuring along the ray itself.
fn perp_distance(
    pos: Vec2,
    ray_dir: Vec2,
    map_x: i32,
    map_y: i32,
    step_x: i32,
    step_y: i32,
    side: i32,
) -> f32 {
    if side == 0 {
        (map_x as f32 - pos.x + (1 - step_x) as f32 / 2.0) / ray_dir.x
    } else {
        (map_y as f32 - pos.y + (1 - step_y) as f32 / 2.0) / ray_dir.y
    }
}

/// Per-column renderer. Owns the frame buffer, the per-frame hit list, and
/// the monotone effect clock; all three are rewritten or advanced by each
/// `render` call.
pub struct RayCaster {
    frame: Image,
    frame_hits: Vec<TargetHit>,
    elapsed: f32,
    palette: Palette,
    effects: EffectParams,
    dash_fx: DashEffect,
}

impl RayCaster {
    pub fn new(width: u16, height: u16, palette: Palette, effects: EffectParams) -> Self {
        Self {
            frame: Image::gen_image_color(width, height, BLACK),
            frame_hits: Vec::new(),
            elapsed: 0.0,
            palette,
            effects,
            dash_fx: DashEffect::new(width, height),
        }
    }

    pub fn render(&mut self, player: &Player, map: &Map, dt: f32) {
        self.elapsed += dt;
        self.frame_hits.clear();

        let width = self.frame.width() as i32;
        let height = self.frame.height() as i32;

        for y in 0..height {
            let color = if y < height / 2 {
                self.palette.ceiling
            } else {
                self.palette.floor
            };
            for x in 0..width {
                self.frame.set_pixel(x as u32, y as u32, color);
            }
        }

        let dashing = player.is_dashing();
        let pulse = (self.elapsed * self.effects.pulse_speed).sin() * 0.5 + 0.5;

        for x in 0..width {
            let camera_x = 2.0 * x as f32 / width as f32 - 1.0;
            let column = cast_column(player, map, camera_x);

            let line_height = (height as f32 / column.perp_dist) as i32;
            let draw_start = (height / 2 - line_height / 2).max(0);
            let draw_end = (height / 2 + line_height / 2).min(height - 1);

            let mut color = self.palette.wall_color(column.wall_type);
            if column.side == 1 {
                color = scale_color(color, self.palette.side_shade);
            }
            if dashing {
                color = add_color(
                    color,
                    self.effects.wall_tint,
                    self.effects.wall_tint_strength * pulse,
                );
            }
            if column.wall_type > 0 {
                for y in draw_start..=draw_end {
                    self.frame.set_pixel(x as u32, y as u32, color);
                }
            }

            if let Some(t) = column.target {
                if column.wall_type == 0 || t.dist < column.perp_dist {
                    self.draw_target_column(x, height, &t, pulse);
                    if !t.hit
                        && t.dist <= HIT_PROXIMITY
                        && !self
                            .frame_hits
                            .iter()
                            .any(|hit| hit.x == t.x && hit.y == t.y)
                    {
                        self.frame_hits.push(TargetHit {
                            x: t.x,
                            y: t.y,
                            points: t.points,
                        });
                    }
                }
            }
        }

        self.dash_fx
            .render(&mut self.frame, player, &self.effects, dt);
    }

    /// Vertical slice of the target cylinder: pulsing highlight while unhit,
    /// flat muted color once hit.
    fn draw_target_column(&mut self, x: i32, height: i32, t: &TargetColumn, pulse: f32) {
        let slice_height = ((height as f32 / t.dist) * TARGET_HEIGHT_SCALE) as i32;
        let draw_start = (height / 2 - slice_height / 2).max(0);
        let draw_end = (height / 2 + slice_height / 2).min(height - 1);
        let color = if t.hit {
            self.palette.target_hit
        } else {
            lerp_color(self.palette.target_unhit, WHITE, pulse * 0.5)
        };
        for y in draw_start..=draw_end {
            self.frame.set_pixel(x as u32, y as u32, color);
        }
    }

    pub fn frame(&self) -> &Image {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Image {
        &mut self.frame
    }

    pub fn frame_hits(&self) -> &[TargetHit] {
        &self.frame_hits
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EffectParams, Palette};

    fn caster(width: u16, height: u16) -> RayCaster {
        RayCaster::new(width, height, Palette::default(), EffectParams::default())
    }

    #[test]
    fn every_ray_terminates_in_enclosed_grid() {
        let map = Map::new(20, 20);
        let player = Player::new(vec2(10.3, 9.7), vec2(0.6, 0.8).normalize());
        for i in 0..64 {
            let camera_x = 2.0 * i as f32 / 64.0 - 1.0;
            let column = cast_column(&player, &map, camera_x);
            assert!(column.wall_type > 0);
            assert!(column.perp_dist.is_finite());
            assert!(column.perp_dist > 0.0);
        }
    }

    #[test]
    fn center_ray_reports_x_side_wall_at_expected_distance() {
        let map = Map::new(20, 20);
        let player = Player::new(vec2(5.0, 5.0), vec2(1.0, 0.0));
        let column = cast_column(&player, &map, 0.0);
        assert_eq!(column.side, 0);
        // Border wall cells occupy x = 19; its near face is 14 units away.
        assert!((column.perp_dist - 14.0).abs() < 1e-4);
    }

    #[test]
    fn axis_aligned_ray_has_no_nan_from_zero_component() {
        let map = Map::new(20, 20);
        let player = Player::new(vec2(5.5, 5.5), vec2(0.0, 1.0));
        let column = cast_column(&player, &map, 0.0);
        assert_eq!(column.side, 1);
        assert!(column.perp_dist.is_finite());
        assert!(!column.perp_dist.is_nan());
    }

    #[test]
    fn wall_at_unit_distance_fills_column_height() {
        let mut map = Map::new(20, 20);
        map.set_cell(7, 5, crate::map::STANDARD_WALL);
        let player = Player::new(vec2(6.0, 5.5), vec2(1.0, 0.0));

        let column = cast_column(&player, &map, 0.0);
        assert!((column.perp_dist - 1.0).abs() < 1e-4);

        let mut rc = caster(64, 48);
        rc.render(&player, &map, 0.016);
        // Slice height equals the viewport height, so the topmost pixel of
        // the center column is wall-colored.
        let expected = Palette::default().wall_color(crate::map::STANDARD_WALL);
        assert_eq!(rc.frame().get_pixel(32, 0), expected);
        assert_eq!(rc.frame().get_pixel(32, 47), expected);
    }

    #[test]
    fn targets_do_not_block_the_ray() {
        let mut map = Map::new(20, 20);
        map.add_target(10, 5, 10);
        let player = Player::new(vec2(5.0, 5.5), vec2(1.0, 0.0));
        let column = cast_column(&player, &map, 0.0);
        assert!(column.wall_type > 0);
        let target = column.target.expect("target on ray");
        assert_eq!((target.x, target.y), (10, 5));
        assert!(target.dist < column.perp_dist);
    }

    #[test]
    fn nearby_target_is_hit_exactly_once_per_approach() {
        let mut map = Map::new(20, 20);
        map.add_target(8, 3, 10);
        let player = Player::new(vec2(8.5, 4.5), vec2(0.0, -1.0));

        let mut rc = caster(64, 48);
        rc.render(&player, &map, 0.016);
        assert_eq!(rc.frame_hits().len(), 1);
        let hit = rc.frame_hits()[0];
        assert_eq!((hit.x, hit.y, hit.points), (8, 3, 10));

        // Consumer commits the hit; the next frame reports nothing new.
        assert!(map.hit_target(hit.x, hit.y));
        rc.render(&player, &map, 0.016);
        assert!(rc.frame_hits().is_empty());
    }

    #[test]
    fn distant_target_is_rendered_but_not_hit() {
        let mut map = Map::new(20, 20);
        map.add_target(15, 5, 10);
        let player = Player::new(vec2(5.0, 5.5), vec2(1.0, 0.0));
        let mut rc = caster(64, 48);
        rc.render(&player, &map, 0.016);
        assert!(rc.frame_hits().is_empty());
    }

    #[test]
    fn effect_clock_is_monotone_across_renders() {
        let map = Map::new(20, 20);
        let player = Player::new(vec2(5.0, 5.0), vec2(1.0, 0.0));
        let mut rc = caster(32, 24);
        rc.render(&player, &map, 0.016);
        let first = rc.elapsed();
        rc.render(&player, &map, 0.016);
        assert!(rc.elapsed() > first);
    }
}
