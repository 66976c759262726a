//! Render loop
//!
//! One frame: drain console commands, pump window events, re-sync geometry
//! when due, read the telemetry mailbox, then either draw the gauge strip or
//! present a cleared frame.

use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use truckmon_core::cadence::{frame_budget, remaining_in_frame};
use truckmon_core::{
    AppConfig, Cadence, Dashboard, FrameDecision, FrameInputs, LoopState, TelemetryFeed,
};
use truckmon_overlay::utils::{color_from_rgb, to_local};
use truckmon_overlay::{
    Color, Desktop, OverlayConfig, OverlaySurface, OverlayWindow, StripBounds, StripLayout,
    WindowRect, draw_strip,
};

use crate::console::OverlayCommand;
use crate::error::AppError;

/// Full-HD fallback when neither the game nor a monitor can be found.
const FALLBACK_RECT: WindowRect = WindowRect {
    x: 0,
    y: 0,
    width: 1920,
    height: 1080,
};

/// Game window rectangle, else the primary monitor, else a full-HD default.
pub fn initial_geometry(desktop: &impl Desktop, titles: &[String]) -> WindowRect {
    if let Some(rect) = desktop.find_window(titles).filter(|r| !r.is_empty()) {
        tracing::info!(?rect, "Found game window");
        return rect;
    }
    tracing::debug!(?titles, "Game window not found, covering primary monitor");
    desktop
        .primary_monitor()
        .map(|m| m.rect())
        .filter(|r| !r.is_empty())
        .unwrap_or(FALLBACK_RECT)
}

/// User-facing toggles changed by console commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub visible: bool,
    pub resync_requested: bool,
    pub quit: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            visible: true,
            resync_requested: false,
            quit: false,
        }
    }
}

impl Controls {
    pub fn apply(&mut self, command: OverlayCommand) {
        let was_visible = self.visible;
        match command {
            OverlayCommand::Show => self.visible = true,
            OverlayCommand::Hide => self.visible = false,
            OverlayCommand::Toggle => self.visible = !self.visible,
            OverlayCommand::Resync => self.resync_requested = true,
            OverlayCommand::Quit => self.quit = true,
        }
        if was_visible != self.visible {
            if self.visible {
                tracing::info!("Truckmon is visible");
            } else {
                tracing::info!("Truckmon is hidden! Use `show` or `toggle` to bring it back");
            }
        }
    }
}

pub struct OverlayApp<D: Desktop, W: OverlaySurface = OverlayWindow> {
    config: AppConfig,
    desktop: D,
    window: W,
    feed: watch::Receiver<TelemetryFeed>,
    commands: mpsc::Receiver<OverlayCommand>,
    controls: Controls,
    dashboard: Dashboard,
    layout: StripLayout,
    /// Strip drawn by the most recent drawn frame, for hover detection
    last_strip: StripBounds,
    resync: Cadence,
    key: Color,
    state: LoopState,
}

impl<D: Desktop> OverlayApp<D, OverlayWindow> {
    /// Open the overlay window over the game and build the loop around it.
    pub fn new(
        config: AppConfig,
        desktop: D,
        feed: watch::Receiver<TelemetryFeed>,
        commands: mpsc::Receiver<OverlayCommand>,
    ) -> Result<Self, AppError> {
        let rect = initial_geometry(&desktop, &config.game_titles);
        let window = OverlayWindow::new(OverlayConfig {
            color_key: config.color_key,
            ..OverlayConfig::covering(rect)
        })?;

        Ok(Self::with_window(config, desktop, window, feed, commands))
    }
}

impl<D: Desktop, W: OverlaySurface> OverlayApp<D, W> {
    pub fn with_window(
        config: AppConfig,
        desktop: D,
        window: W,
        feed: watch::Receiver<TelemetryFeed>,
        commands: mpsc::Receiver<OverlayCommand>,
    ) -> Self {
        let rect = window.bounds();
        Self {
            layout: StripLayout::new(&config.layout, rect.width, rect.height),
            dashboard: Dashboard::new(config.lateness),
            resync: Cadence::started_at(
                Duration::from_secs(config.window_resync_secs),
                Instant::now(),
            ),
            key: color_from_rgb(config.color_key),
            config,
            desktop,
            window,
            feed,
            commands,
            controls: Controls::default(),
            last_strip: StripBounds::default(),
            state: LoopState::Running,
        }
    }

    /// Run frames until the window closes, `quit` arrives, or telemetry fails.
    pub fn run(mut self) -> Result<(), AppError> {
        let budget = frame_budget(self.config.frame_rate);
        tracing::info!(
            frame_rate = self.config.frame_rate,
            bounds = ?self.window.bounds(),
            "Overlay running"
        );

        while !self.state.is_exiting() {
            let started = Instant::now();
            self.frame(started)?;
            thread::sleep(remaining_in_frame(started, Instant::now(), budget));
        }

        tracing::info!("Overlay closed");
        Ok(())
    }

    fn frame(&mut self, now: Instant) -> Result<(), AppError> {
        self.drain_commands();
        if self.controls.quit {
            self.state = LoopState::Exiting;
            return Ok(());
        }
        if !self.window.poll_events() {
            tracing::info!("Overlay window closed");
            self.state = LoopState::Exiting;
            return Ok(());
        }

        if std::mem::take(&mut self.controls.resync_requested) {
            self.resync.force();
        }
        if self.resync.ready(now) {
            self.sync_geometry();
        }

        let payload = match &*self.feed.borrow() {
            TelemetryFeed::Failed(reason) => {
                return Err(AppError::TelemetryUnavailable(reason.clone()));
            }
            feed => feed.payload().cloned(),
        };

        let inputs = FrameInputs {
            focused: self.desktop.is_focused(&self.config.game_titles),
            visible: self.controls.visible,
            has_telemetry: payload.is_some(),
            paused: payload.as_ref().is_some_and(|p| p.game.paused),
            hovering: self.is_hovering(),
        };
        let decision = inputs.decide();

        self.window.clear(self.key);
        if let (FrameDecision::Draw, Some(payload)) = (decision, payload) {
            let readouts = self.dashboard.update(&payload);
            self.last_strip = draw_strip(
                &mut self.window,
                &readouts,
                self.dashboard.laps(),
                &self.layout,
            );
        }
        self.window.commit();

        let next = self.state.after(decision);
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Loop state changed");
        }
        self.state = next;
        Ok(())
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            tracing::debug!(?command, "Console command");
            self.controls.apply(command);
        }
    }

    fn is_hovering(&self) -> bool {
        self.desktop
            .cursor_position()
            .and_then(|(x, y)| to_local(self.window.bounds(), x, y))
            .is_some_and(|(x, y)| self.last_strip.contains(x, y))
    }

    fn sync_geometry(&mut self) {
        let Some(rect) = self
            .desktop
            .find_window(&self.config.game_titles)
            .filter(|r| !r.is_empty())
        else {
            tracing::debug!("Game window not found, keeping overlay geometry");
            return;
        };
        if rect == self.window.bounds() {
            return;
        }

        tracing::info!(?rect, "Game window moved, following");
        self.window.set_bounds(rect);
        self.layout = StripLayout::new(&self.config.layout, rect.width, rect.height);
        self.last_strip = StripBounds::default();
    }
}
