//! Row of recent lap samples, drawn under the gauges
use tiny_skia::Color;
use truckmon_core::{LapLog, Trend};

use crate::canvas::DrawTarget;
use crate::widgets::colors;

/// Gap between two lap entries, in multiples of the font size.
const ENTRY_GAP: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct LapStrip<'a> {
    laps: &'a LapLog,
    font_size: f32,
}

impl<'a> LapStrip<'a> {
    pub fn new(laps: &'a LapLog, font_size: f32) -> Self {
        Self { laps, font_size }
    }

    fn trend_color(trend: Trend) -> Color {
        match trend {
            Trend::Gaining => colors::rpm_low(),
            Trend::Losing => colors::rpm_high(),
            Trend::Start | Trend::Steady => colors::white(),
        }
    }

    /// Draw entries left to right starting at `(x, y)`. Returns the occupied size.
    pub fn render(&self, target: &mut impl DrawTarget, x: f32, y: f32) -> (f32, f32) {
        let gap = self.font_size * ENTRY_GAP;
        let mut cursor = x;
        let mut height: f32 = 0.0;

        for (i, lap) in self.laps.iter().enumerate() {
            if i > 0 {
                cursor += gap;
            }
            let text = format!("{} {}", lap.trend.glyph(), lap.advantage);
            let (w, h) = target.measure_text(&text, self.font_size);
            target.draw_text(&text, cursor, y, self.font_size, Self::trend_color(lap.trend));
            cursor += w;
            height = height.max(h);
        }

        (cursor - x, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[derive(Default)]
    struct Texts(Vec<(String, f32, Color)>);

    impl DrawTarget for Texts {
        fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
            (text.chars().count() as f32 * font_size * 0.5, font_size)
        }

        fn draw_text(&mut self, text: &str, x: f32, _: f32, _: f32, color: Color) {
            self.0.push((text.to_string(), x, color));
        }

        fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: Color) {}

        fn stroke_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Color) {}
    }

    #[test]
    fn fresh_log_shows_start_marker() {
        let laps = LapLog::new();
        let mut out = Texts::default();
        let (w, h) = LapStrip::new(&laps, 10.0).render(&mut out, 0.0, 0.0);

        assert_eq!(out.0.len(), 1);
        assert_eq!(out.0[0].0, "* 00:00");
        assert_eq!((w, h), (35.0, 10.0));
    }

    #[test]
    fn entries_spaced_and_colored_by_trend() {
        let mut laps = LapLog::new();
        laps.record(TimeDelta::minutes(90));
        laps.record(TimeDelta::minutes(80));

        let mut out = Texts::default();
        LapStrip::new(&laps, 10.0).render(&mut out, 100.0, 0.0);

        let texts: Vec<&str> = out.0.iter().map(|(t, _, _)| t.as_str()).collect();
        assert_eq!(texts, ["↗ 01:30", "↘ 01:20"]);
        assert_eq!(out.0[0].2, colors::rpm_low());
        assert_eq!(out.0[1].1, 100.0 + 35.0 + 10.0);
        assert_eq!(out.0[1].2, colors::rpm_high());
    }
}
