use macroquad::prelude::*;

use crate::helpers::{lerp_color, put_pixel};
use crate::player::Player;

/// Screen-space weapon drawn over the finished frame. Implementations are
/// selected by the `weapon` id in the render config.
pub trait WeaponOverlay {
    fn draw(&self, frame: &mut Image, player: &Player);
}

pub fn overlay_for(id: &str) -> Option<Box<dyn WeaponOverlay>> {
    match id {
        "sword" => Some(Box::new(NeonSword::new())),
        _ => None,
    }
}

/// Hollow-outline sword in the lower right: blade, hilt, and pommel stacked
/// vertically, brightened while a dash is active.
pub struct NeonSword {
    edge_thickness: i32,
    color: Color,
}

impl NeonSword {
    pub fn new() -> Self {
        Self {
            edge_thickness: 3,
            color: Color::from_rgba(0, 255, 255, 255),
        }
    }

    fn hollow_rect(&self, frame: &mut Image, x: i32, y: i32, w: i32, h: i32, color: Color) {
        for i in 0..self.edge_thickness {
            for dx in 0..w {
                put_pixel(frame, x + dx, y + i, color);
                put_pixel(frame, x + dx, y + h - 1 - i, color);
            }
            for dy in 0..h {
                put_pixel(frame, x + i, y + dy, color);
                put_pixel(frame, x + w - 1 - i, y + dy, color);
            }
        }
    }
}

impl WeaponOverlay for NeonSword {
    fn draw(&self, frame: &mut Image, player: &Player) {
        let screen_w = frame.width() as i32;
        let screen_h = frame.height() as i32;

        let sword_w = (screen_w as f32 * 0.3) as i32;
        let sword_h = (screen_h as f32 * 0.2) as i32;
        let x = screen_w - sword_w - 10;
        let y = screen_h - sword_h - 10;

        let blade_h = (sword_h as f32 * 0.7) as i32;
        let hilt_h = (sword_h as f32 * 0.2) as i32;
        let pommel_h = (sword_h as f32 * 0.1) as i32;

        let color = if player.is_dashing() {
            lerp_color(self.color, WHITE, 0.5)
        } else {
            self.color
        };

        let blade_x = x + (sword_w as f32 * 0.4) as i32;
        let blade_w = (sword_w as f32 * 0.2) as i32;
        self.hollow_rect(frame, blade_x, y, blade_w, blade_h, color);

        let hilt_x = x + (sword_w as f32 * 0.3) as i32;
        let hilt_w = (sword_w as f32 * 0.4) as i32;
        self.hollow_rect(frame, hilt_x, y + blade_h, hilt_w, hilt_h, color);

        self.hollow_rect(
            frame,
            blade_x,
            y + blade_h + hilt_h,
            blade_w,
            pommel_h,
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_id_selects_overlay() {
        assert!(overlay_for("sword").is_some());
        assert!(overlay_for("none").is_none());
        assert!(overlay_for("").is_none());
    }

    #[test]
    fn sword_paints_lower_right_quadrant_only() {
        let mut frame = Image::gen_image_color(120, 80, BLACK);
        let player = Player::new(vec2(5.0, 5.0), vec2(1.0, 0.0));
        NeonSword::new().draw(&mut frame, &player);

        let mut touched = false;
        for y in 0..80u32 {
            for x in 0..120u32 {
                if frame.get_pixel(x, y) != BLACK {
                    touched = true;
                    assert!(x >= 60 && y >= 40, "pixel ({x}, {y}) outside quadrant");
                }
            }
        }
        assert!(touched);
    }
}
