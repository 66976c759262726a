//! Small conversions shared by the window and widgets

use tiny_skia::Color;

/// Convert a configured `[r, g, b]` triple to an opaque tiny_skia Color
#[inline]
pub fn color_from_rgb(rgb: [u8; 3]) -> Color {
    Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255)
}

/// Overlay-relative position of a screen point, if it falls inside `rect`.
pub fn to_local(rect: crate::platform::WindowRect, x: i32, y: i32) -> Option<(f32, f32)> {
    let lx = x - rect.x;
    let ly = y - rect.y;
    if lx < 0 || ly < 0 || lx >= rect.width as i32 || ly >= rect.height as i32 {
        return None;
    }
    Some((lx as f32, ly as f32))
}
