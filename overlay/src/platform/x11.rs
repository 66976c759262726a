//! X11 platform implementation for overlay windows
//!
//! Uses XCB via x11rb for a transparent, always-on-top overlay window with
//! click-through support, plus EWMH queries for following the game window.
//! Requires a compositor for transparency.

use std::fs::File;
use std::os::fd::AsFd;

use rustix::fs::{MemfdFlags, memfd_create};
use rustix::mm::{MapFlags, ProtFlags, mmap};
use x11rb::atom_manager;
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::shm::{self, ConnectionExt as _};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::{
    Desktop, MonitorInfo, OverlayConfig, OverlayPlatform, PlatformError, WindowRect,
    color_key_to_bgra,
};

// Atoms needed for EWMH hints and window queries
atom_manager! {
    pub AtomCollection: AtomCollectionCookie {
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_STATE,
        _NET_WM_STATE_ABOVE,
        _NET_WM_STATE_SKIP_TASKBAR,
        _NET_WM_STATE_SKIP_PAGER,
        _NET_WM_NAME,
        _NET_CLIENT_LIST,
        _NET_ACTIVE_WINDOW,
        UTF8_STRING,
        ATOM,
    }
}

fn other<E: std::fmt::Display>(e: E) -> PlatformError {
    PlatformError::Other(e.to_string())
}

fn connect() -> Result<(RustConnection, Window, AtomCollection), PlatformError> {
    let (conn, screen_num) =
        x11rb::connect(None).map_err(|e| PlatformError::ConnectionFailed(e.to_string()))?;
    let atoms = AtomCollection::new(&conn)
        .map_err(other)?
        .reply()
        .map_err(other)?;
    let root = conn.setup().roots[screen_num].root;
    Ok((conn, root, atoms))
}

fn query_monitors(conn: &RustConnection, root: Window) -> Vec<MonitorInfo> {
    let Ok(monitors) = conn.randr_get_monitors(root, true) else {
        return Vec::new();
    };
    let Ok(monitors) = monitors.reply() else {
        return Vec::new();
    };

    monitors
        .monitors
        .iter()
        .enumerate()
        .map(|(idx, mon)| {
            let name = conn
                .get_atom_name(mon.name)
                .ok()
                .and_then(|r| r.reply().ok())
                .map(|r| String::from_utf8_lossy(&r.name).to_string())
                .unwrap_or_else(|| format!("Monitor {}", idx + 1));

            MonitorInfo {
                id: name.clone(),
                name,
                x: mon.x as i32,
                y: mon.y as i32,
                width: mon.width as u32,
                height: mon.height as u32,
                is_primary: mon.primary,
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Desktop Queries
// ─────────────────────────────────────────────────────────────────────────────

pub struct X11Desktop {
    conn: RustConnection,
    root: Window,
    atoms: AtomCollection,
}

impl X11Desktop {
    pub fn connect() -> Result<Self, PlatformError> {
        let (conn, root, atoms) = connect()?;
        Ok(Self { conn, root, atoms })
    }

    fn window_property(&self, window: Window, property: Atom, kind: Atom) -> Option<Vec<u8>> {
        let reply = self
            .conn
            .get_property(false, window, property, kind, 0, 1024)
            .ok()?
            .reply()
            .ok()?;
        Some(reply.value)
    }

    fn window_list(&self, window: Window, property: Atom) -> Vec<Window> {
        self.conn
            .get_property(false, window, property, AtomEnum::WINDOW, 0, u32::MAX)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .and_then(|reply| reply.value32().map(|it| it.collect()))
            .unwrap_or_default()
    }

    fn window_title(&self, window: Window) -> Option<String> {
        let utf8 = self
            .window_property(window, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)
            .filter(|v| !v.is_empty());
        let raw = match utf8 {
            Some(v) => v,
            None => self.window_property(window, AtomEnum::WM_NAME.into(), AtomEnum::STRING.into())?,
        };
        Some(String::from_utf8_lossy(&raw).into_owned())
    }

    fn window_rect(&self, window: Window) -> Option<WindowRect> {
        let geometry = self.conn.get_geometry(window).ok()?.reply().ok()?;
        let origin = self
            .conn
            .translate_coordinates(window, self.root, 0, 0)
            .ok()?
            .reply()
            .ok()?;
        Some(WindowRect {
            x: origin.dst_x as i32,
            y: origin.dst_y as i32,
            width: geometry.width as u32,
            height: geometry.height as u32,
        })
    }
}

impl Desktop for X11Desktop {
    fn find_window(&self, titles: &[String]) -> Option<WindowRect> {
        let clients = self.window_list(self.root, self.atoms._NET_CLIENT_LIST);
        let named: Vec<(Window, String)> = clients
            .into_iter()
            .filter_map(|w| self.window_title(w).map(|t| (w, t)))
            .collect();

        titles.iter().find_map(|title| {
            named
                .iter()
                .find(|(_, name)| name == title)
                .and_then(|(window, _)| self.window_rect(*window))
        })
    }

    fn foreground_title(&self) -> Option<String> {
        let active = self
            .window_list(self.root, self.atoms._NET_ACTIVE_WINDOW)
            .into_iter()
            .next()
            .filter(|w| *w != x11rb::NONE)?;
        self.window_title(active)
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        let pointer = self.conn.query_pointer(self.root).ok()?.reply().ok()?;
        Some((pointer.root_x as i32, pointer.root_y as i32))
    }

    fn monitors(&self) -> Vec<MonitorInfo> {
        query_monitors(&self.conn, self.root)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// X11 Overlay Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// SHM buffer for efficient pixel transfer
struct ShmBuffer {
    seg_id: shm::Seg,
    ptr: *mut u8,
    size: usize,
}

pub struct X11Overlay {
    conn: RustConnection,
    window: Window,
    gc: Gcontext,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    depth: u8,
    color_key: [u8; 3],

    // Pixel buffers
    pixel_data: Vec<u8>, // RGBA from renderer
    shm_buffer: ShmBuffer,

    running: bool,
}

impl X11Overlay {
    /// Find a 32-bit ARGB visual for transparency
    fn find_argb_visual(screen: &Screen) -> Option<(Visualid, u8)> {
        for depth in &screen.allowed_depths {
            if depth.depth == 32 {
                for visual in &depth.visuals {
                    if visual.class == VisualClass::TRUE_COLOR {
                        return Some((visual.visual_id, depth.depth));
                    }
                }
            }
        }
        None
    }

    /// Create a shared memory buffer for efficient pixel transfer
    fn create_shm_buffer(
        conn: &RustConnection,
        width: u32,
        height: u32,
    ) -> Result<ShmBuffer, PlatformError> {
        let size = (width.max(1) * height.max(1) * 4) as usize;

        let fd = memfd_create(c"truckmon-x11-buffer", MemfdFlags::CLOEXEC)
            .map_err(|e| PlatformError::BufferError(format!("memfd_create failed: {}", e)))?;

        rustix::fs::ftruncate(&fd, size as u64)
            .map_err(|e| PlatformError::BufferError(format!("ftruncate failed: {}", e)))?;

        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                fd.as_fd(),
                0,
            )
            .map_err(|e| PlatformError::BufferError(format!("mmap failed: {}", e)))?
        };

        let seg_id = conn
            .generate_id()
            .map_err(|e| PlatformError::BufferError(e.to_string()))?;

        // x11rb shm_attach_fd takes ownership of the fd
        let file = File::from(fd);
        conn.shm_attach_fd(seg_id, file, false)
            .map_err(|e| PlatformError::BufferError(format!("shm_attach_fd failed: {}", e)))?;

        Ok(ShmBuffer {
            seg_id,
            ptr: ptr as *mut u8,
            size,
        })
    }

    fn release_shm_buffer(&self) {
        let _ = self.conn.shm_detach(self.shm_buffer.seg_id);
        unsafe {
            rustix::mm::munmap(self.shm_buffer.ptr as *mut _, self.shm_buffer.size).ok();
        }
    }

    /// Recreate SHM buffer after resize
    fn recreate_shm_buffer(&mut self) -> Result<(), PlatformError> {
        self.release_shm_buffer();
        self.shm_buffer = Self::create_shm_buffer(&self.conn, self.width, self.height)?;
        self.pixel_data
            .resize((self.width * self.height * 4) as usize, 0);
        Ok(())
    }

    /// Set EWMH hints for overlay behavior
    fn setup_window_hints(&self, atoms: &AtomCollection, title: &str) -> Result<(), PlatformError> {
        // Window type: dock (stays on top, no decorations)
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                atoms._NET_WM_WINDOW_TYPE,
                atoms.ATOM,
                &[atoms._NET_WM_WINDOW_TYPE_DOCK],
            )
            .map_err(other)?;

        // Window state: above, skip taskbar/pager
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                atoms._NET_WM_STATE,
                atoms.ATOM,
                &[
                    atoms._NET_WM_STATE_ABOVE,
                    atoms._NET_WM_STATE_SKIP_TASKBAR,
                    atoms._NET_WM_STATE_SKIP_PAGER,
                ],
            )
            .map_err(other)?;

        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                atoms._NET_WM_NAME,
                atoms.UTF8_STRING,
                title.as_bytes(),
            )
            .map_err(other)?;

        Ok(())
    }

    /// Empty input region, so clicks pass through to the game
    fn clear_input_shape(&self) {
        let _ = self.conn.shape_rectangles(
            shape::SO::SET,
            shape::SK::INPUT,
            ClipOrdering::UNSORTED,
            self.window,
            0,
            0,
            &[],
        );
        let _ = self.conn.flush();
    }
}

impl OverlayPlatform for X11Overlay {
    fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        let (conn, root, atoms) = connect()?;
        let screen = conn
            .setup()
            .roots
            .iter()
            .find(|s| s.root == root)
            .ok_or_else(|| PlatformError::Other("root screen vanished".into()))?;

        conn.shape_query_version()
            .map_err(|_| PlatformError::UnsupportedFeature("Shape extension".into()))?
            .reply()
            .map_err(|_| PlatformError::UnsupportedFeature("Shape extension".into()))?;

        conn.shm_query_version()
            .map_err(|_| PlatformError::UnsupportedFeature("SHM extension".into()))?
            .reply()
            .map_err(|_| PlatformError::UnsupportedFeature("SHM extension".into()))?;

        let (visual, depth) = Self::find_argb_visual(screen)
            .ok_or_else(|| PlatformError::UnsupportedFeature("32-bit ARGB visual".into()))?;

        let colormap = conn.generate_id().map_err(other)?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, root, visual)
            .map_err(other)?;

        let window = conn.generate_id().map_err(other)?;
        let win_aux = CreateWindowAux::new()
            .background_pixel(0)
            .border_pixel(0)
            .colormap(colormap)
            .event_mask(EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY)
            .override_redirect(1);

        conn.create_window(
            depth,
            window,
            root,
            config.x as i16,
            config.y as i16,
            config.width.max(1) as u16,
            config.height.max(1) as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            visual,
            &win_aux,
        )
        .map_err(other)?;

        let gc = conn.generate_id().map_err(other)?;
        conn.create_gc(gc, window, &CreateGCAux::new())
            .map_err(other)?;

        let shm_buffer = Self::create_shm_buffer(&conn, config.width, config.height)?;

        let overlay = Self {
            conn,
            window,
            gc,
            width: config.width,
            height: config.height,
            x: config.x,
            y: config.y,
            depth,
            color_key: config.color_key,
            pixel_data: vec![0u8; (config.width * config.height * 4) as usize],
            shm_buffer,
            running: true,
        };

        overlay.setup_window_hints(&atoms, &config.namespace)?;
        overlay.clear_input_shape();

        overlay.conn.map_window(window).map_err(other)?;
        overlay.conn.flush().map_err(other)?;

        tracing::debug!(
            x = config.x,
            y = config.y,
            width = config.width,
            height = config.height,
            "X11 overlay window created"
        );
        Ok(overlay)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn x(&self) -> i32 {
        self.x
    }

    fn y(&self) -> i32 {
        self.y
    }

    fn set_position(&mut self, x: i32, y: i32) {
        if x == self.x && y == self.y {
            return;
        }

        self.x = x;
        self.y = y;

        let _ = self
            .conn
            .configure_window(self.window, &ConfigureWindowAux::new().x(x).y(y));
        let _ = self.conn.flush();
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }

        self.width = width;
        self.height = height;

        if let Err(e) = self.recreate_shm_buffer() {
            tracing::error!(error = %e, "Failed to resize X11 shared memory buffer");
            self.running = false;
            return;
        }

        let _ = self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().width(width).height(height),
        );
        let _ = self.conn.flush();
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        let shm_slice =
            unsafe { std::slice::from_raw_parts_mut(self.shm_buffer.ptr, self.shm_buffer.size) };

        color_key_to_bgra(&self.pixel_data, shm_slice, self.color_key);

        let _ = self.conn.shm_put_image(
            self.window,
            self.gc,
            self.width as u16,
            self.height as u16,
            0,
            0,
            self.width as u16,
            self.height as u16,
            0,
            0,
            self.depth,
            ImageFormat::Z_PIXMAP.into(),
            false,
            self.shm_buffer.seg_id,
            0,
        );
        let _ = self.conn.flush();
    }

    fn poll_events(&mut self) -> bool {
        loop {
            match self.conn.poll_for_event() {
                Ok(Some(x11rb::protocol::Event::DestroyNotify(e))) if e.window == self.window => {
                    self.running = false;
                }
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "X11 connection lost");
                    self.running = false;
                    break;
                }
            }
        }
        self.running
    }
}

impl Drop for X11Overlay {
    fn drop(&mut self) {
        self.release_shm_buffer();
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.flush();
    }
}
