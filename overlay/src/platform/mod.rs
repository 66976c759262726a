//! Platform abstraction for overlay windows
//!
//! `OverlayPlatform` is the window a backend creates and presents pixels into.
//! `Desktop` is the read-only view of other windows the overlay follows.

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(any(target_os = "windows", all(unix, not(target_os = "macos")))))]
compile_error!("truckmon-overlay supports Windows and X11 only");

/// Information about a connected monitor
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    /// Unique identifier for this monitor (platform-specific)
    pub id: String,
    pub name: String,
    /// X position of the monitor in virtual screen space
    pub x: i32,
    /// Y position of the monitor in virtual screen space
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl MonitorInfo {
    pub fn rect(&self) -> WindowRect {
        WindowRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Pick the primary monitor, or the first one.
pub fn primary_of(monitors: &[MonitorInfo]) -> Option<&MonitorInfo> {
    monitors.iter().find(|m| m.is_primary).or(monitors.first())
}

/// Screen rectangle of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowRect {
    /// From edge coordinates as reported by the window manager.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: (right - left).max(0) as u32,
            height: (bottom - top).max(0) as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Configuration for creating an overlay window
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// X position (from left edge of screen)
    pub x: i32,
    /// Y position (from top edge of screen)
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Window title and class name
    pub namespace: String,
    /// Pixels of exactly this RGB value are presented fully transparent
    pub color_key: [u8; 3],
}

impl OverlayConfig {
    pub fn covering(rect: WindowRect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            ..Self::default()
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            namespace: "Truckmon Overlay".to_string(),
            color_key: [0, 0, 0],
        }
    }
}

/// Errors that can occur in platform operations
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to connect to display server
    ConnectionFailed(String),
    /// Required protocol/feature not available
    UnsupportedFeature(String),
    /// Buffer/memory allocation failed
    BufferError(String),
    /// Generic platform error
    Other(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::ConnectionFailed(s) => write!(f, "Connection failed: {}", s),
            PlatformError::UnsupportedFeature(s) => write!(f, "Unsupported feature: {}", s),
            PlatformError::BufferError(s) => write!(f, "Buffer error: {}", s),
            PlatformError::Other(s) => write!(f, "Platform error: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait that all platform backends must implement
pub trait OverlayPlatform: Sized {
    /// Create a new overlay window with the given configuration
    fn new(config: OverlayConfig) -> Result<Self, PlatformError>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn x(&self) -> i32;

    fn y(&self) -> i32;

    /// Update the overlay position
    fn set_position(&mut self, x: i32, y: i32);

    /// Resize the overlay and reallocate its pixel buffer
    fn set_size(&mut self, width: u32, height: u32);

    /// Move and resize in one step
    fn set_bounds(&mut self, rect: WindowRect) {
        if rect.width != self.width() || rect.height != self.height() {
            self.set_size(rect.width, rect.height);
        }
        if rect.x != self.x() || rect.y != self.y() {
            self.set_position(rect.x, rect.y);
        }
    }

    /// Get mutable access to the pixel buffer (RGBA format)
    /// Returns None if buffer is not ready
    fn pixel_buffer(&mut self) -> Option<&mut [u8]>;

    /// Commit the current pixel buffer to the screen, applying the color key
    fn commit(&mut self);

    /// Process pending platform events (non-blocking)
    /// Returns false if the overlay should close
    fn poll_events(&mut self) -> bool;
}

/// Read-only queries about the rest of the desktop.
pub trait Desktop {
    /// Rectangle of the first top-level window whose title exactly equals one of `titles`.
    fn find_window(&self, titles: &[String]) -> Option<WindowRect>;

    /// Title of the window that currently has input focus.
    fn foreground_title(&self) -> Option<String>;

    /// Global cursor position in screen coordinates.
    fn cursor_position(&self) -> Option<(i32, i32)>;

    fn monitors(&self) -> Vec<MonitorInfo>;

    fn primary_monitor(&self) -> Option<MonitorInfo> {
        primary_of(&self.monitors()).cloned()
    }

    /// True when the focused window is one of `titles`.
    fn is_focused(&self, titles: &[String]) -> bool {
        self.foreground_title()
            .is_some_and(|title| titles.iter().any(|t| *t == title))
    }
}

/// Re-export the appropriate platform for the current target
#[cfg(all(unix, not(target_os = "macos")))]
pub use x11::{X11Desktop as NativeDesktop, X11Overlay as NativeOverlay};

#[cfg(target_os = "windows")]
pub use windows::{WindowsDesktop as NativeDesktop, WindowsOverlay as NativeOverlay};

// ─────────────────────────────────────────────────────────────────────────────
// Color Key
// ─────────────────────────────────────────────────────────────────────────────

/// Convert the renderer's RGBA buffer into the BGRA layout both backends
/// present, keying out `key` pixels (alpha 0) and making everything else opaque.
pub fn color_key_to_bgra(src: &[u8], dst: &mut [u8], key: [u8; 3]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        if s[0] == key[0] && s[1] == key[1] && s[2] == key[2] {
            d.copy_from_slice(&[0, 0, 0, 0]);
        } else {
            d[0] = s[2];
            d[1] = s[1];
            d[2] = s[0];
            d[3] = 255;
        }
    }
}
