use macroquad::prelude::*;

use crate::config::EffectParams;
use crate::helpers::{add_color, get_pixel, lerp_color, put_pixel, scale_color};
use crate::player::{DASH_DURATION, Player};

const FADE_IN_END: f32 = 0.15;
const FADE_OUT_START: f32 = 0.85;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashPhase {
    FadeIn,
    Sweep,
    FadeOut,
}

/// Classifies dash progress `p` in [0, 1] into the overlay phase.
pub fn phase_for(p: f32) -> DashPhase {
    if p < FADE_IN_END {
        DashPhase::FadeIn
    } else if p < FADE_OUT_START {
        DashPhase::Sweep
    } else {
        DashPhase::FadeOut
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepOrientation {
    Horizontal,
    Diagonal,
}

/// Headings near an axis sweep horizontally, headings near a diagonal sweep
/// corner to corner.
pub fn orientation_for(dir: Vec2) -> SweepOrientation {
    if (dir.x.abs() - dir.y.abs()).abs() > 0.4 {
        SweepOrientation::Horizontal
    } else {
        SweepOrientation::Diagonal
    }
}

struct Spark {
    pos: Vec2,
    vel: Vec2,
}

/// Phased dash overlay. All timing state lives here as explicit fields and is
/// advanced once per `render` call; progress itself is read from the player
/// so the overlay can never drift from the dash that drives it.
pub struct DashEffect {
    active: bool,
    orientation: SweepOrientation,
    sparks: Vec<Spark>,
    burst_spawned: bool,
    scratch: Image,
}

impl DashEffect {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            active: false,
            orientation: SweepOrientation::Horizontal,
            sparks: Vec::new(),
            burst_spawned: false,
            scratch: Image::gen_image_color(width, height, BLACK),
        }
    }

    pub fn render(&mut self, frame: &mut Image, player: &Player, params: &EffectParams, dt: f32) {
        if !player.is_dashing() {
            // Re-arm so the next dash restarts the phase machine at p = 0.
            self.active = false;
            self.sparks.clear();
            self.burst_spawned = false;
            return;
        }

        if !self.active {
            self.active = true;
            self.orientation = orientation_for(player.dash_direction());
            self.sparks.clear();
            self.burst_spawned = false;
        }

        let p = (player.dash_elapsed() / DASH_DURATION).clamp(0.0, 1.0);

        self.motion_blur(frame, player, params);

        match phase_for(p) {
            DashPhase::FadeIn => {
                self.vignette(frame, params, p / FADE_IN_END);
            }
            DashPhase::Sweep => {
                self.vignette(frame, params, 1.0);
                let t = (p - FADE_IN_END) / (FADE_OUT_START - FADE_IN_END);
                self.draw_sweep(frame, params, t, 1.0);
            }
            DashPhase::FadeOut => {
                let fade = 1.0 - (p - FADE_OUT_START) / (1.0 - FADE_OUT_START);
                self.vignette(frame, params, fade);
                // Sweep freezes at its end position while it fades.
                self.draw_sweep(frame, params, 1.0, fade);
                if !self.burst_spawned {
                    self.spawn_burst(frame, params);
                    self.burst_spawned = true;
                }
                self.update_sparks(dt);
                self.draw_sparks(frame, params, fade);
            }
        }
    }

    /// One offset sample per pixel along the screen-space dash direction,
    /// blended with fixed weights. Every other row is processed; the skipped
    /// rows read cheap at the upscaled output size.
    fn motion_blur(&mut self, frame: &mut Image, player: &Player, params: &EffectParams) {
        let width = frame.width() as i32;
        let height = frame.height() as i32;

        self.scratch
            .bytes
            .copy_from_slice(&frame.bytes);

        let lateral = player
            .dash_direction()
            .dot(player.plane().normalize_or_zero());
        let mut offset = (lateral * params.blur_offset).round() as i32;
        if offset == 0 {
            // Forward dash: smear horizontally outward from screen center.
            offset = params.blur_offset.round().max(1.0) as i32;
        }

        let weight = params.blur_weight;
        for y in (0..height).step_by(2) {
            for x in 0..width {
                let sample_x = if x < width / 2 { x - offset } else { x + offset };
                if let Some(sample) = get_pixel(&self.scratch, sample_x, y) {
                    let base = frame.get_pixel(x as u32, y as u32);
                    frame.set_pixel(x as u32, y as u32, lerp_color(sample, base, weight));
                }
            }
        }
    }

    /// Edge glow scaled by `intensity` in [0, 1].
    fn vignette(&self, frame: &mut Image, params: &EffectParams, intensity: f32) {
        let width = frame.width() as i32;
        let height = frame.height() as i32;
        let edge = (height / 6).max(8);
        let intensity = intensity.clamp(0.0, 1.0) * 0.35;

        for band in 0..edge {
            let k = (1.0 - band as f32 / edge as f32) * intensity;
            for x in 0..width {
                blend_at(frame, x, band, params.vignette_color, k);
                blend_at(frame, x, height - 1 - band, params.vignette_color, k);
            }
            for y in 0..height {
                blend_at(frame, band, y, params.vignette_color, k);
                blend_at(frame, width - 1 - band, y, params.vignette_color, k);
            }
        }
    }

    /// Slash band at sweep progress `t` in [0, 1]: a bright leading edge with
    /// a short trailing fade, traveling across the sweep axis.
    fn draw_sweep(&self, frame: &mut Image, params: &EffectParams, t: f32, strength: f32) {
        let width = frame.width() as i32;
        let height = frame.height() as i32;
        let span = match self.orientation {
            SweepOrientation::Horizontal => width as f32,
            SweepOrientation::Diagonal => (width + height) as f32 * 0.5,
        };
        let center = t * (span + 2.0 * params.slash_width) - params.slash_width;

        for y in 0..height {
            for x in 0..width {
                let s = match self.orientation {
                    SweepOrientation::Horizontal => x as f32,
                    SweepOrientation::Diagonal => (x + y) as f32 * 0.5,
                };
                let d = center - s;
                if d.abs() <= params.slash_width {
                    let k = 1.0 - d.abs() / params.slash_width;
                    let color = sample_ramp(&params.slash_colors, k);
                    blend_at(frame, x, y, color, (0.4 + 0.6 * k) * strength);
                } else if d > 0.0 && d <= params.trail_length {
                    let k = (1.0 - d / params.trail_length) * 0.4 * strength;
                    blend_at(frame, x, y, params.slash_colors[0], k);
                }
            }
        }
    }

    fn spawn_burst(&mut self, frame: &Image, params: &EffectParams) {
        let width = frame.width() as f32;
        let height = frame.height() as f32;
        for _ in 0..params.burst_particles {
            let pos = match self.orientation {
                SweepOrientation::Horizontal => vec2(
                    macroquad::rand::gen_range(0.0, width),
                    height * 0.5 + macroquad::rand::gen_range(-height * 0.2, height * 0.2),
                ),
                SweepOrientation::Diagonal => {
                    let r = macroquad::rand::gen_range(0.0, 1.0);
                    vec2(
                        r * width + macroquad::rand::gen_range(-20.0, 20.0),
                        r * height + macroquad::rand::gen_range(-20.0, 20.0),
                    )
                }
            };
            let angle = macroquad::rand::gen_range(0.0, std::f32::consts::TAU);
            let speed = macroquad::rand::gen_range(40.0, 220.0);
            self.sparks.push(Spark {
                pos,
                vel: vec2(angle.cos(), angle.sin()) * speed,
            });
        }
    }

    fn update_sparks(&mut self, dt: f32) {
        for spark in self.sparks.iter_mut() {
            spark.pos += spark.vel * dt;
        }
    }

    fn draw_sparks(&self, frame: &mut Image, params: &EffectParams, fade: f32) {
        let color = scale_color(
            params
                .slash_colors
                .last()
                .copied()
                .unwrap_or(WHITE),
            fade,
        );
        for spark in &self.sparks {
            let x = spark.pos.x as i32;
            let y = spark.pos.y as i32;
            for dy in 0..2 {
                for dx in 0..2 {
                    blend_at(frame, x + dx, y + dy, color, fade);
                }
            }
        }
    }
}

fn blend_at(frame: &mut Image, x: i32, y: i32, tint: Color, strength: f32) {
    if let Some(base) = get_pixel(frame, x, y) {
        put_pixel(frame, x, y, add_color(base, tint, strength));
    }
}

/// Samples a color ramp at `k` in [0, 1], interpolating between entries.
fn sample_ramp(colors: &[Color], k: f32) -> Color {
    if colors.len() == 1 {
        return colors[0];
    }
    let scaled = k.clamp(0.0, 1.0) * (colors.len() - 1) as f32;
    let idx = (scaled.floor() as usize).min(colors.len() - 2);
    lerp_color(colors[idx], colors[idx + 1], scaled - idx as f32)
}
