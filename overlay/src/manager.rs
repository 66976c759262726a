//! On-screen overlay window
//!
//! Pairs the platform window with a renderer and exposes it as an
//! `OverlaySurface`.
#![allow(clippy::too_many_arguments)]

use crate::canvas::{DrawTarget, baseline};
use crate::platform::{NativeOverlay, OverlayConfig, OverlayPlatform, PlatformError, WindowRect};
use crate::renderer::Renderer;
use tiny_skia::Color;

/// A managed overlay window with its own renderer
pub struct OverlayWindow {
    platform: NativeOverlay,
    renderer: Renderer,
}

impl OverlayWindow {
    /// Create a new overlay window
    pub fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        let platform = NativeOverlay::new(config)?;
        let renderer = Renderer::new();

        Ok(Self { platform, renderer })
    }
}

/// A presentable surface the render loop clears, draws into and commits
/// once per frame.
pub trait OverlaySurface: DrawTarget {
    /// Current screen rectangle of the overlay
    fn bounds(&self) -> WindowRect;

    /// Move and resize to cover `rect`
    fn set_bounds(&mut self, rect: WindowRect);

    /// Fill the whole surface with `color`
    fn clear(&mut self, color: Color);

    /// Present the current frame
    fn commit(&mut self);

    /// Process pending window events without blocking.
    /// Returns false once the surface has been closed.
    fn poll_events(&mut self) -> bool;
}

impl OverlaySurface for OverlayWindow {
    fn bounds(&self) -> WindowRect {
        WindowRect {
            x: self.platform.x(),
            y: self.platform.y(),
            width: self.platform.width(),
            height: self.platform.height(),
        }
    }

    fn set_bounds(&mut self, rect: WindowRect) {
        self.platform.set_bounds(rect);
    }

    fn clear(&mut self, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        if let Some(buffer) = self.platform.pixel_buffer() {
            self.renderer.clear(buffer, width, height, color);
        }
    }

    fn commit(&mut self) {
        self.platform.commit();
    }

    fn poll_events(&mut self) -> bool {
        self.platform.poll_events()
    }
}

impl DrawTarget for OverlayWindow {
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.renderer.measure_text(text, font_size)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        if let Some(buffer) = self.platform.pixel_buffer() {
            self.renderer.draw_text(
                buffer,
                width,
                height,
                text,
                x,
                baseline(y, font_size),
                font_size,
                color,
            );
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        if let Some(buffer) = self.platform.pixel_buffer() {
            self.renderer
                .fill_rect(buffer, width, height, x, y, w, h, color);
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke_width: f32, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        if let Some(buffer) = self.platform.pixel_buffer() {
            self.renderer
                .stroke_rect(buffer, width, height, x, y, w, h, stroke_width, color);
        }
    }
}
