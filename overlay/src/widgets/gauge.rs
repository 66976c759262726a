//! Gauge widget: a bordered value with a caption above and a unit below
//!
//! ```text
//!   speed
//!  ┌──────┐
//!  │  72  │   <- value, optionally filled from the bottom
//!  └──────┘
//!     km/h
//! ```
use tiny_skia::Color;
use truckmon_core::{FillMode, GaugeReadout};

use crate::canvas::DrawTarget;
use crate::widgets::colors;

/// Padding between the value text and the box edge.
const PAD: f32 = 3.0;

/// Caption and unit are drawn at this fraction of the value font size.
const SMALL_SCALE: f32 = 0.5;

/// Axis-aligned rectangle in overlay coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeStyle {
    pub font_size: f32,
    pub min_width: f32,
}

impl Default for GaugeStyle {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            min_width: 50.0,
        }
    }
}

/// How much of the box is painted behind the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeFill {
    Outline,
    /// Fraction of the box height, clamped to `0.0..=1.0`
    Level(f32),
}

/// Measured sizes for one gauge at a given style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeLayout {
    pub value: (f32, f32),
    pub label: (f32, f32),
    pub unit: (f32, f32),
    pub box_width: f32,
    pub box_height: f32,
}

impl GaugeLayout {
    /// Advance used by the strip: box width, and value + label + unit heights.
    pub fn advance(&self) -> (f32, f32) {
        (self.box_width, self.value.1 + self.label.1 + self.unit.1)
    }

    /// Everything the gauge paints when its value text starts at `(x, y)`.
    pub fn bounds_at(&self, x: f32, y: f32) -> Bounds {
        let top = y - 2.0 * PAD - self.label.1;
        let bottom = y + self.value.1 + PAD + self.unit.1;
        Bounds {
            x: x - PAD,
            y: top,
            width: self.box_width.max(self.label.0),
            height: bottom - top,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gauge {
    pub label: String,
    pub value: String,
    pub unit: String,
    pub color: Color,
    pub fill: GaugeFill,
    /// Bar color when it differs from `color`; the value text then keeps `color`
    pub fill_color: Option<Color>,
}

impl Gauge {
    pub fn new(label: impl Into<String>, value: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            unit: String::new(),
            color,
            fill: GaugeFill::Outline,
            fill_color: None,
        }
    }

    /// Gauge for a dashboard readout, colored by its kind.
    pub fn from_readout(readout: &GaugeReadout) -> Self {
        let gauge = Self::new(
            readout.kind.label(),
            readout.value.as_str(),
            colors::for_gauge(readout.kind),
        )
        .with_unit(readout.unit.as_str());

        match readout.fill {
            FillMode::Outline => gauge,
            FillMode::Solid => gauge.with_fill(GaugeFill::Level(1.0)),
            FillMode::Level { ratio, band } => gauge
                .with_fill(GaugeFill::Level(ratio))
                .with_fill_color(colors::for_rpm(band)),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_fill(mut self, fill: GaugeFill) -> Self {
        self.fill = match fill {
            GaugeFill::Level(ratio) => GaugeFill::Level(ratio.clamp(0.0, 1.0)),
            outline => outline,
        };
        self
    }

    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    fn is_filled(&self) -> bool {
        matches!(self.fill, GaugeFill::Level(_))
    }

    fn text_color(&self) -> Color {
        match (self.is_filled(), self.fill_color) {
            (true, None) => colors::near_black(),
            _ => self.color,
        }
    }

    pub fn layout(&self, target: &mut impl DrawTarget, style: GaugeStyle) -> GaugeLayout {
        let small = style.font_size * SMALL_SCALE;
        let value = target.measure_text(&self.value, style.font_size);
        let label = target.measure_text(&self.label, small);
        let unit = target.measure_text(&self.unit, small);

        GaugeLayout {
            value,
            label,
            unit,
            box_width: (value.0 + 2.0 * PAD).max(style.min_width),
            box_height: value.1 + 2.0 * PAD,
        }
    }

    /// Draw with the value text's top-left at `(x, y)`.
    ///
    /// Returns the advance `(width, height)` for laying out the next gauge.
    pub fn render(
        &self,
        target: &mut impl DrawTarget,
        x: f32,
        y: f32,
        style: GaugeStyle,
    ) -> (f32, f32) {
        let layout = self.layout(target, style);
        let small = style.font_size * SMALL_SCALE;
        let box_x = x - PAD;
        let box_y = y - PAD;

        if let GaugeFill::Level(ratio) = self.fill {
            let bar = (ratio * layout.box_height).round();
            if bar > 0.0 {
                target.fill_rect(
                    box_x,
                    box_y + layout.box_height - bar,
                    layout.box_width,
                    bar,
                    self.fill_color.unwrap_or(self.color),
                );
            }
        }
        target.stroke_rect(
            box_x,
            box_y,
            layout.box_width,
            layout.box_height,
            1.0,
            self.color,
        );
        target.draw_text(&self.value, x, y, style.font_size, self.text_color());

        target.draw_text(
            &self.label,
            box_x,
            y - 2.0 * PAD - layout.label.1,
            small,
            self.color,
        );
        if !self.unit.is_empty() {
            target.draw_text(
                &self.unit,
                box_x + layout.box_width - layout.unit.0,
                box_y + layout.box_height,
                small,
                self.color,
            );
        }

        layout.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use truckmon_core::{GaugeKind, RpmBand};

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Text(String, f32, f32, f32),
        Fill(f32, f32, f32, f32),
        Stroke(f32, f32, f32, f32),
    }

    /// Monospace stand-in: every glyph is half the font size wide.
    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
        text_colors: Vec<(String, Color)>,
        fill_colors: Vec<Color>,
    }

    impl DrawTarget for Recorder {
        fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
            (text.chars().count() as f32 * font_size * 0.5, font_size)
        }

        fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
            self.ops.push(Op::Text(text.to_string(), x, y, font_size));
            self.text_colors.push((text.to_string(), color));
        }

        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
            self.ops.push(Op::Fill(x, y, w, h));
            self.fill_colors.push(color);
        }

        fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _: f32, _: Color) {
            self.ops.push(Op::Stroke(x, y, w, h));
        }
    }

    fn style() -> GaugeStyle {
        GaugeStyle {
            font_size: 20.0,
            min_width: 50.0,
        }
    }

    fn color_of(rec: &Recorder, text: &str) -> Color {
        rec.text_colors
            .iter()
            .find(|(t, _)| t == text)
            .map(|(_, c)| *c)
            .unwrap()
    }

    #[test]
    fn box_respects_min_width() {
        let mut rec = Recorder::default();
        let gauge = Gauge::new("limit", "80", colors::speed_limit());
        let (w, h) = gauge.render(&mut rec, 100.0, 200.0, style());

        // "80" measures 20 wide, padded to 26, below the 50 minimum
        assert_eq!(w, 50.0);
        assert_eq!(h, 20.0 + 10.0 + 10.0);
        assert!(rec.ops.contains(&Op::Stroke(97.0, 197.0, 50.0, 26.0)));
        assert!(!rec.ops.iter().any(|op| matches!(op, Op::Fill(..))));
    }

    #[test]
    fn wide_value_grows_box() {
        let mut rec = Recorder::default();
        let gauge = Gauge::new("remaining", "-12:45", colors::job()).with_unit("remaining");
        let layout = gauge.layout(&mut rec, style());

        assert_eq!(layout.box_width, 66.0);
        assert_eq!(layout.advance(), (66.0, 40.0));
    }

    #[test]
    fn caption_above_and_unit_right_aligned_below() {
        let mut rec = Recorder::default();
        Gauge::new("speed", "72", colors::white())
            .with_unit("km/h")
            .render(&mut rec, 100.0, 200.0, style());

        assert!(rec.ops.contains(&Op::Text("speed".into(), 97.0, 184.0, 10.0)));
        // unit is 20 wide, box right edge at 147
        assert!(rec.ops.contains(&Op::Text("km/h".into(), 127.0, 223.0, 10.0)));
    }

    #[test]
    fn level_fill_rounds_bar_height_from_bottom() {
        let mut rec = Recorder::default();
        Gauge::new("speed", "72", colors::white())
            .with_fill(GaugeFill::Level(0.5))
            .with_fill_color(colors::rpm_mid())
            .render(&mut rec, 0.0, 0.0, style());

        // box is 26 tall, half of it is 13
        assert_eq!(rec.ops[0], Op::Fill(-3.0, 10.0, 50.0, 13.0));
        assert_eq!(rec.fill_colors[0], colors::rpm_mid());
        assert_eq!(color_of(&rec, "72"), colors::white());
    }

    #[test]
    fn solid_fill_switches_text_to_near_black() {
        let mut rec = Recorder::default();
        Gauge::new("cruise", "85", colors::cruise())
            .with_fill(GaugeFill::Level(1.0))
            .render(&mut rec, 0.0, 0.0, style());

        assert_eq!(rec.ops[0], Op::Fill(-3.0, -3.0, 50.0, 26.0));
        assert_eq!(rec.fill_colors[0], colors::cruise());
        assert_eq!(color_of(&rec, "85"), colors::near_black());
        assert_eq!(color_of(&rec, "cruise"), colors::cruise());
    }

    #[test]
    fn level_is_clamped() {
        let gauge = Gauge::new("speed", "0", colors::white()).with_fill(GaugeFill::Level(1.8));
        assert_eq!(gauge.fill, GaugeFill::Level(1.0));
    }

    #[test]
    fn speed_readout_maps_band_to_bar_color() {
        let readout = GaugeReadout {
            kind: GaugeKind::Speed,
            value: "72".into(),
            unit: "km/h".into(),
            fill: FillMode::Level {
                ratio: 0.8,
                band: RpmBand::High,
            },
        };
        let gauge = Gauge::from_readout(&readout);

        assert_eq!(gauge.label, "speed");
        assert_eq!(gauge.fill, GaugeFill::Level(0.8));
        assert_eq!(gauge.fill_color, Some(colors::rpm_high()));
        assert_eq!(gauge.text_color(), colors::white());
    }

    #[test]
    fn bounds_cover_caption_and_unit() {
        let mut rec = Recorder::default();
        let gauge = Gauge::new("next stop", "05:30", colors::rest_stop()).with_unit("time");
        let layout = gauge.layout(&mut rec, style());
        let bounds = layout.bounds_at(100.0, 200.0);

        assert_eq!(bounds.y, 184.0);
        assert_eq!(bounds.bottom(), 233.0);
        assert!(bounds.contains(100.0, 200.0));
        assert!(!bounds.contains(96.0, 200.0));
    }

    #[test]
    fn solid_gauge_paints_box_on_canvas() {
        let mut canvas = Canvas::new(120, 80);
        canvas.clear(Color::BLACK);
        Gauge::new("fuel", "", colors::fuel())
            .with_fill(GaugeFill::Level(1.0))
            .render(&mut canvas, 20.0, 30.0, style());

        // box starts at (17, 27) and is at least 6 pixels tall
        assert_eq!(canvas.pixel(40, 29), Some([2, 223, 235, 255]));
        assert_eq!(canvas.pixel(5, 5), Some([0, 0, 0, 255]));
    }
}
