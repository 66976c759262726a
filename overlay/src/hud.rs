//! Gauge strip: six gauges left to right near the bottom center, laps below.

use truckmon_core::context::LayoutSettings;
use truckmon_core::{GaugeReadout, LapLog};

use crate::canvas::DrawTarget;
use crate::widgets::{Bounds, Gauge, GaugeStyle, LapStrip};

/// Vertical gap between the gauge row and the lap row.
const LAP_GAP: f32 = 3.0;

/// Resolved placement of the strip inside a window of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripLayout {
    /// Top-left of the first gauge's value text.
    pub origin: (f32, f32),
    pub spacing: f32,
    pub style: GaugeStyle,
    pub show_laps: bool,
}

impl StripLayout {
    pub fn new(settings: &LayoutSettings, width: u32, height: u32) -> Self {
        Self {
            origin: (
                width as f32 / 2.0 + settings.anchor_x_from_center,
                height as f32 - settings.bottom_margin,
            ),
            spacing: settings.spacing,
            style: GaugeStyle {
                font_size: settings.font_size,
                min_width: settings.min_width,
            },
            show_laps: settings.show_laps,
        }
    }

    fn lap_font_size(&self) -> f32 {
        self.style.font_size * 0.5
    }
}

/// Where the last frame's strip was painted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StripBounds {
    pub gauges: Vec<Bounds>,
    pub laps: Option<Bounds>,
}

impl StripBounds {
    /// Union of everything drawn, or `None` for an empty frame.
    pub fn total(&self) -> Option<Bounds> {
        self.gauges
            .iter()
            .chain(self.laps.iter())
            .copied()
            .reduce(|acc, b| acc.union(&b))
    }

    /// True when `(x, y)`, relative to the overlay, lies over the strip.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.total().is_some_and(|b| b.contains(x, y))
    }
}

/// Draw the readouts in order, then the lap log when enabled.
pub fn draw_strip(
    target: &mut impl DrawTarget,
    readouts: &[GaugeReadout],
    laps: &LapLog,
    layout: &StripLayout,
) -> StripBounds {
    let (mut x, y) = layout.origin;
    let mut bounds = StripBounds::default();

    for readout in readouts {
        let gauge = Gauge::from_readout(readout);
        let measured = gauge.layout(target, layout.style);
        let (width, _) = gauge.render(target, x, y, layout.style);
        bounds.gauges.push(measured.bounds_at(x, y));
        x += width + layout.spacing;
    }

    if layout.show_laps {
        let left = bounds.gauges.first().map_or(layout.origin.0, |b| b.x);
        let top = bounds
            .gauges
            .iter()
            .map(Bounds::bottom)
            .fold(y, f32::max)
            + LAP_GAP;
        let (width, height) = LapStrip::new(laps, layout.lap_font_size()).render(target, left, top);
        bounds.laps = Some(Bounds {
            x: left,
            y: top,
            width,
            height,
        });
    }

    bounds
}
