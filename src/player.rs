use macroquad::prelude::*;

use crate::helpers::rotate;
use crate::map::Map;

pub const MOVE_SPEED: f32 = 2.5;
pub const ROT_SPEED: f32 = 2.0;
pub const DASH_DISTANCE: f32 = 3.0;
pub const DASH_DURATION: f32 = 0.18;
pub const DASH_COOLDOWN: f32 = 0.75;

// Lookahead on the leading edge of each axis move, and the diagonal probe
// used to push the position out of wall corners.
const COLLISION_BUFFER: f32 = 0.1;
const CORNER_PROBE: f32 = 0.1;
const CORNER_NUDGE: f32 = 0.03;

/// Per-frame movement intents. `dash` must be an edge signal (pressed this
/// frame, not held); holding the key does not re-trigger.
#[derive(Clone, Copy, Default)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub dash: bool,
}

pub struct Player {
    pos: Vec2,
    dir: Vec2,
    plane: Vec2,
    dash_timer: f32,
    dash_cooldown: f32,
    dash_dir: Vec2,
}

impl Player {
    /// `dir` is normalized; the camera plane is set perpendicular to it with
    /// magnitude 0.66 (roughly a 66 degree field of view) and stays rigid
    /// with the heading under rotation.
    pub fn new(pos: Vec2, dir: Vec2) -> Self {
        let dir = dir.normalize_or_zero();
        let dir = if dir == Vec2::ZERO { vec2(1.0, 0.0) } else { dir };
        Self {
            pos,
            dir,
            plane: vec2(-dir.y, dir.x) * 0.66,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            dash_dir: Vec2::ZERO,
        }
    }

    pub fn apply_input(&mut self, input: &InputState, dt: f32, map: &Map) {
        // Rotation is rigid and independent of collision.
        if input.turn_left {
            let angle = ROT_SPEED * dt;
            self.dir = rotate(self.dir, angle);
            self.plane = rotate(self.plane, angle);
        }
        if input.turn_right {
            let angle = -ROT_SPEED * dt;
            self.dir = rotate(self.dir, angle);
            self.plane = rotate(self.plane, angle);
        }

        if input.dash && self.dash_timer <= 0.0 && self.dash_cooldown <= 0.0 {
            self.dash_dir = self.dir;
            self.dash_timer = DASH_DURATION;
        }

        let delta = if self.is_dashing() {
            self.dash_dir * (DASH_DISTANCE / DASH_DURATION) * dt
        } else {
            let mut wish = Vec2::ZERO;
            if input.forward {
                wish += self.dir;
            }
            if input.back {
                wish -= self.dir;
            }
            let strafe = self.plane.normalize_or_zero();
            if input.strafe_right {
                wish += strafe;
            }
            if input.strafe_left {
                wish -= strafe;
            }
            wish * MOVE_SPEED * dt
        };

        let mut blocked = false;

        // Axis-separated collision: a wall on one axis still lets the other
        // axis advance, so the player slides along walls.
        if delta.x != 0.0 {
            let next = self.pos.x + delta.x;
            let lead = next + COLLISION_BUFFER * delta.x.signum();
            if map.is_wall(lead.floor() as i32, self.pos.y.floor() as i32) {
                blocked = true;
            } else {
                self.pos.x = next;
            }
        }
        if delta.y != 0.0 {
            let next = self.pos.y + delta.y;
            let lead = next + COLLISION_BUFFER * delta.y.signum();
            if map.is_wall(self.pos.x.floor() as i32, lead.floor() as i32) {
                blocked = true;
            } else {
                self.pos.y = next;
            }
        }

        // Corner correction: a diagonal neighbor within probe range pushes
        // the position back out along both axes.
        let cell_x = self.pos.x.floor() as i32;
        let cell_y = self.pos.y.floor() as i32;
        for (sx, sy) in [(-1.0f32, -1.0f32), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            let probe_x = (self.pos.x + sx * CORNER_PROBE).floor() as i32;
            let probe_y = (self.pos.y + sy * CORNER_PROBE).floor() as i32;
            if probe_x != cell_x && probe_y != cell_y && map.is_wall(probe_x, probe_y) {
                self.pos.x -= sx * CORNER_NUDGE;
                self.pos.y -= sy * CORNER_NUDGE;
                blocked = true;
            }
        }

        // A blocked dash ends immediately instead of pinning the player
        // against the wall for the rest of the dash window.
        if blocked && self.is_dashing() {
            self.dash_timer = 0.0;
            self.dash_cooldown = DASH_COOLDOWN;
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.dash_timer > 0.0 {
            self.dash_timer = (self.dash_timer - dt).max(0.0);
            if self.dash_timer == 0.0 {
                self.dash_cooldown = DASH_COOLDOWN;
            }
        } else if self.dash_cooldown > 0.0 {
            self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        }
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn direction(&self) -> Vec2 {
        self.dir
    }

    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    pub fn dash_direction(&self) -> Vec2 {
        self.dash_dir
    }

    /// Seconds since the current dash started; zero when not dashing.
    pub fn dash_elapsed(&self) -> f32 {
        if self.is_dashing() {
            DASH_DURATION - self.dash_timer
        } else {
            0.0
        }
    }

    pub fn dash_cooldown_left(&self) -> f32 {
        self.dash_cooldown
    }
}
