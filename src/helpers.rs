use macroquad::prelude::*;

/// Rotates a vector by `angle` radians (counter-clockwise in grid space).
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

pub fn scale_color(c: Color, factor: f32) -> Color {
    Color::new(c.r * factor, c.g * factor, c.b * factor, c.a)
}

/// Additive blend clamped to valid channel range; alpha is kept from `base`.
pub fn add_color(base: Color, tint: Color, strength: f32) -> Color {
    Color::new(
        (base.r + tint.r * strength).min(1.0),
        (base.g + tint.g * strength).min(1.0),
        (base.b + tint.b * strength).min(1.0),
        base.a,
    )
}

/// Bounds-checked pixel write. Effect passes overdraw freely near screen
/// edges, so out-of-range coordinates are silently dropped.
pub fn put_pixel(frame: &mut Image, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= frame.width() as i32 || y >= frame.height() as i32 {
        return;
    }
    frame.set_pixel(x as u32, y as u32, color);
}

pub fn get_pixel(frame: &Image, x: i32, y: i32) -> Option<Color> {
    if x < 0 || y < 0 || x >= frame.width() as i32 || y >= frame.height() as i32 {
        return None;
    }
    Some(frame.get_pixel(x as u32, y as u32))
}
