//! Truckmon Overlay Library
//!
//! Transparent, click-through gauge overlay drawn over the game window.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      hud                            │
//! │        gauge strip layout + hover bounds            │
//! ├─────────────────────────────────────────────────────┤
//! │                    widgets/                         │
//! │               Gauge, LapStrip                       │
//! ├─────────────────────────────────────────────────────┤
//! │             manager          canvas                 │
//! │         OverlayWindow   offscreen Canvas            │
//! │          (both implement DrawTarget)                │
//! ├─────────────────────────────────────────────────────┤
//! │                    renderer                         │
//! │            tiny-skia + cosmic-text                  │
//! ├─────────────────────────────────────────────────────┤
//! │                    platform/                        │
//! │     x11, windows (overlay window + Desktop)         │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod canvas;
pub mod hud;
pub mod manager;
pub mod platform;
pub mod renderer;
pub mod utils;
pub mod widgets;

// Re-export commonly used types
pub use canvas::{Canvas, DrawTarget};
pub use hud::{StripBounds, StripLayout, draw_strip};
pub use manager::{OverlaySurface, OverlayWindow};
pub use platform::{
    Desktop, MonitorInfo, NativeDesktop, NativeOverlay, OverlayConfig, OverlayPlatform,
    PlatformError, WindowRect,
};
pub use renderer::Renderer;
pub use widgets::{Gauge, GaugeStyle, LapStrip};

// Re-export tiny_skia Color for external use
pub use tiny_skia::Color;
