//! Windows platform implementation for overlay windows
//!
//! Uses the Win32 API to create a transparent, always-on-top, click-through
//! layered window, and to look up the game window it should cover.

use std::mem;
use std::ptr;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS,
    DeleteDC, EnumDisplayMonitors, GetCurrentObject, GetDC, GetMonitorInfoW, HBITMAP, HDC,
    HMONITOR, MONITORINFOEXW, OBJ_BITMAP, ReleaseDC, SelectObject, SetDIBits,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CS_HREDRAW, CS_VREDRAW, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    FindWindowW, GetCursorPos, GetForegroundWindow, GetWindowRect, GetWindowTextLengthW,
    GetWindowTextW, HTCLIENT, HWND_TOPMOST, IDC_ARROW, LoadCursorW, MSG, PM_REMOVE, PeekMessageW,
    PostQuitMessage, RegisterClassExW, SW_SHOWNOACTIVATE, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
    SetWindowPos, ShowWindow, TranslateMessage, ULW_ALPHA, UpdateLayeredWindow, WM_DESTROY,
    WM_ERASEBKGND, WM_NCHITTEST, WM_QUIT, WNDCLASSEXW, WS_EX_LAYERED, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};
use windows::core::PCWSTR;

use super::{
    Desktop, MonitorInfo, OverlayConfig, OverlayPlatform, PlatformError, WindowRect,
    color_key_to_bgra,
};

const CLASS_NAME: &str = "TruckmonOverlayClass";

// ─────────────────────────────────────────────────────────────────────────────
// Monitor Enumeration
// ─────────────────────────────────────────────────────────────────────────────

/// Callback for EnumDisplayMonitors - collects monitor info into a Vec<MonitorInfo>
unsafe extern "system" fn enum_monitors_callback(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> windows::Win32::Foundation::BOOL {
    unsafe {
        let monitors = &mut *(lparam.0 as *mut Vec<MonitorInfo>);

        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;

        if GetMonitorInfoW(hmonitor, &mut info.monitorInfo).as_bool() {
            let rc = info.monitorInfo.rcMonitor;
            let device_name = from_wide(&info.szDevice);
            let rect = WindowRect::from_edges(rc.left, rc.top, rc.right, rc.bottom);

            monitors.push(MonitorInfo {
                id: device_name.clone(),
                name: device_name,
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                is_primary: info.monitorInfo.dwFlags & 1 != 0,
            });
        }

        windows::Win32::Foundation::BOOL::from(true)
    }
}

pub fn get_all_monitors() -> Vec<MonitorInfo> {
    let mut monitors: Vec<MonitorInfo> = Vec::new();

    unsafe {
        let raw_ptr = &mut monitors as *mut Vec<MonitorInfo>;
        let _ = EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitors_callback),
            LPARAM(raw_ptr as isize),
        );
    }

    tracing::debug!(count = monitors.len(), "Enumerated monitors");
    monitors
}

// ─────────────────────────────────────────────────────────────────────────────
// Desktop Queries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct WindowsDesktop;

impl WindowsDesktop {
    pub fn connect() -> Result<Self, PlatformError> {
        Ok(Self)
    }
}

impl Desktop for WindowsDesktop {
    fn find_window(&self, titles: &[String]) -> Option<WindowRect> {
        titles.iter().find_map(|title| unsafe {
            let name = wide_string(title);
            let hwnd = FindWindowW(PCWSTR::null(), PCWSTR(name.as_ptr())).ok()?;
            if hwnd.is_invalid() {
                return None;
            }
            let mut rect = RECT::default();
            GetWindowRect(hwnd, &mut rect).ok()?;
            Some(WindowRect::from_edges(
                rect.left,
                rect.top,
                rect.right,
                rect.bottom,
            ))
        })
    }

    fn foreground_title(&self) -> Option<String> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.is_invalid() {
                return None;
            }
            let len = GetWindowTextLengthW(hwnd);
            if len <= 0 {
                return None;
            }
            let mut buf = vec![0u16; len as usize + 1];
            let copied = GetWindowTextW(hwnd, &mut buf);
            Some(String::from_utf16_lossy(&buf[..copied.max(0) as usize]))
        }
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        let mut pt = POINT::default();
        unsafe { GetCursorPos(&mut pt).ok()? };
        Some((pt.x, pt.y))
    }

    fn monitors(&self) -> Vec<MonitorInfo> {
        get_all_monitors()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Windows Overlay Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Windows overlay implementation
pub struct WindowsOverlay {
    hwnd: HWND,
    hdc_mem: HDC,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color_key: [u8; 3],
    pixel_data: Vec<u8>,
    bgra_buffer: Vec<u8>, // Pre-allocated buffer for RGBA->BGRA conversion
    running: bool,
}

// NOTE: WindowsOverlay does not implement Send.
// Win32 HWND handles must be used from the thread that created them, so the
// overlay is created and driven on the render loop's thread.

impl WindowsOverlay {
    fn register_class() -> Result<(), PlatformError> {
        unsafe {
            let class_name = wide_string(CLASS_NAME);
            let hinstance = GetModuleHandleW(None)
                .map_err(|e| PlatformError::Other(format!("GetModuleHandleW failed: {}", e)))?;

            let wc = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            let atom = RegisterClassExW(&wc);
            if atom == 0 {
                // ERROR_CLASS_ALREADY_EXISTS is fine
                let err = std::io::Error::last_os_error();
                if err.raw_os_error() != Some(1410) {
                    return Err(PlatformError::Other(format!(
                        "RegisterClassExW failed: {}",
                        err
                    )));
                }
            }
        }
        Ok(())
    }

    fn bitmap_info(&self) -> BITMAPINFO {
        BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: self.width as i32,
                biHeight: -(self.height as i32), // Top-down DIB
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn create_dib_section(&mut self) -> Result<(), PlatformError> {
        unsafe {
            let hdc_screen = GetDC(HWND::default());

            if !self.hdc_mem.is_invalid() {
                let _ = DeleteDC(self.hdc_mem);
            }

            self.hdc_mem = CreateCompatibleDC(hdc_screen);
            if self.hdc_mem.is_invalid() {
                ReleaseDC(HWND::default(), hdc_screen);
                return Err(PlatformError::BufferError(
                    "CreateCompatibleDC failed".to_string(),
                ));
            }

            let bmi = self.bitmap_info();
            let mut bits: *mut std::ffi::c_void = ptr::null_mut();
            let hbitmap = CreateDIBSection(hdc_screen, &bmi, DIB_RGB_COLORS, &mut bits, None, 0)
                .map_err(|e| {
                    PlatformError::BufferError(format!("CreateDIBSection failed: {}", e))
                })?;

            SelectObject(self.hdc_mem, hbitmap);
            ReleaseDC(HWND::default(), hdc_screen);

            let size = (self.width * self.height * 4) as usize;
            self.pixel_data.resize(size, 0);
            self.bgra_buffer.resize(size, 0);
        }
        Ok(())
    }

    fn update_layered_window(&mut self) {
        color_key_to_bgra(&self.pixel_data, &mut self.bgra_buffer, self.color_key);

        unsafe {
            let hdc_screen = GetDC(HWND::default());
            let bmi = self.bitmap_info();

            let hgdiobj = GetCurrentObject(self.hdc_mem, OBJ_BITMAP);
            let hbitmap = HBITMAP(hgdiobj.0);
            SetDIBits(
                self.hdc_mem,
                hbitmap,
                0,
                self.height,
                self.bgra_buffer.as_ptr() as *const _,
                &bmi,
                DIB_RGB_COLORS,
            );

            // Per-pixel alpha; keyed pixels carry alpha 0
            let pt_src = POINT { x: 0, y: 0 };
            let pt_dst = POINT {
                x: self.x,
                y: self.y,
            };
            let size = windows::Win32::Foundation::SIZE {
                cx: self.width as i32,
                cy: self.height as i32,
            };
            let blend = windows::Win32::Graphics::Gdi::BLENDFUNCTION {
                BlendOp: 0, // AC_SRC_OVER
                BlendFlags: 0,
                SourceConstantAlpha: 255,
                AlphaFormat: 1, // AC_SRC_ALPHA
            };

            let _ = UpdateLayeredWindow(
                self.hwnd,
                hdc_screen,
                Some(&pt_dst),
                Some(&size),
                self.hdc_mem,
                Some(&pt_src),
                windows::Win32::Foundation::COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            );

            ReleaseDC(HWND::default(), hdc_screen);
        }
    }
}

impl OverlayPlatform for WindowsOverlay {
    fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        Self::register_class()?;

        let hwnd = unsafe {
            let class_name = wide_string(CLASS_NAME);
            let window_name = wide_string(&config.namespace);
            let hinstance = GetModuleHandleW(None)
                .map_err(|e| PlatformError::Other(format!("GetModuleHandleW failed: {}", e)))?;

            let ex_style = WS_EX_LAYERED
                | WS_EX_TOPMOST
                | WS_EX_TOOLWINDOW
                | WS_EX_TRANSPARENT
                | WS_EX_NOACTIVATE;

            CreateWindowExW(
                ex_style,
                PCWSTR(class_name.as_ptr()),
                PCWSTR(window_name.as_ptr()),
                WS_POPUP,
                config.x,
                config.y,
                config.width as i32,
                config.height as i32,
                None,
                None,
                hinstance,
                None,
            )
            .map_err(|e| PlatformError::Other(format!("CreateWindowExW failed: {}", e)))?
        };

        let mut overlay = Self {
            hwnd,
            hdc_mem: HDC::default(),
            width: config.width,
            height: config.height,
            x: config.x,
            y: config.y,
            color_key: config.color_key,
            pixel_data: vec![0u8; (config.width * config.height * 4) as usize],
            bgra_buffer: vec![0u8; (config.width * config.height * 4) as usize],
            running: true,
        };

        overlay.create_dib_section()?;

        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }
        tracing::debug!(
            hwnd = ?hwnd,
            x = config.x,
            y = config.y,
            width = config.width,
            height = config.height,
            "Win32 overlay window created"
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
        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                x,
                y,
                0,
                0,
                SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;

        if let Err(e) = self.create_dib_section() {
            tracing::error!(error = %e, "Failed to resize overlay bitmap");
            self.running = false;
            return;
        }

        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                0,
                0,
                width as i32,
                height as i32,
                SWP_NOMOVE | SWP_NOACTIVATE,
            );
        }
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        self.update_layered_window();
    }

    fn poll_events(&mut self) -> bool {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    tracing::debug!("Overlay received WM_QUIT");
                    self.running = false;
                    return false;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        self.running
    }
}

impl Drop for WindowsOverlay {
    fn drop(&mut self) {
        unsafe {
            if !self.hdc_mem.is_invalid() {
                let _ = DeleteDC(self.hdc_mem);
            }
            if !self.hwnd.is_invalid() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}

/// Window procedure for overlay windows
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // Click-through is handled by WS_EX_TRANSPARENT
        WM_NCHITTEST => LRESULT(HTCLIENT as isize),
        WM_ERASEBKGND => LRESULT(1),
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Convert a &str to a null-terminated wide string
fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}
