//! Drawing surface abstraction
//!
//! Widgets draw through `DrawTarget`, implemented by the on-screen
//! `OverlayWindow` and by the offscreen `Canvas` used for layout and tests.

use tiny_skia::Color;

use crate::renderer::Renderer;

/// Primitive drawing operations a widget needs.
pub trait DrawTarget {
    /// Width and line height of `text` at `font_size`.
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32);

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke_width: f32, color: Color);
}

/// Baseline for text whose line box starts at `top`.
pub(crate) fn baseline(top: f32, font_size: f32) -> f32 {
    top + font_size
}

/// Offscreen RGBA surface backed by a `Vec<u8>`.
pub struct Canvas {
    renderer: Renderer,
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            renderer: Renderer::new(),
            buffer: Renderer::create_buffer(width, height),
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.renderer
            .clear(&mut self.buffer, self.width, self.height, color);
    }

    pub fn pixels(&self) -> &[u8] {
        &self.buffer
    }

    /// RGBA at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.buffer
            .get(i..i + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }
}

impl DrawTarget for Canvas {
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.renderer.measure_text(text, font_size)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        self.renderer.draw_text(
            &mut self.buffer,
            self.width,
            self.height,
            text,
            x,
            baseline(y, font_size),
            font_size,
            color,
        );
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.renderer
            .fill_rect(&mut self.buffer, self.width, self.height, x, y, w, h, color);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke_width: f32, color: Color) {
        self.renderer.stroke_rect(
            &mut self.buffer,
            self.width,
            self.height,
            x,
            y,
            w,
            h,
            stroke_width,
            color,
        );
    }
}
