use tiny_skia::Color;
use truckmon_core::{GaugeKind, RpmBand};

#[inline]
pub fn transparent() -> Color {
    Color::from_rgba8(0, 0, 0, 0)
}

#[inline]
pub fn white() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

/// Text drawn on a filled gauge. One step above black so the color key leaves it visible.
#[inline]
pub fn near_black() -> Color {
    Color::from_rgba8(1, 1, 1, 255)
}

#[inline]
pub fn speed_limit() -> Color {
    Color::from_rgba8(242, 111, 229, 255)
}

#[inline]
pub fn cruise() -> Color {
    Color::from_rgba8(227, 227, 5, 255)
}

#[inline]
pub fn fuel() -> Color {
    Color::from_rgba8(2, 223, 235, 255)
}

#[inline]
pub fn rest_stop() -> Color {
    Color::from_rgba8(176, 96, 56, 255)
}

#[inline]
pub fn job() -> Color {
    Color::from_rgba8(157, 95, 227, 255)
}

#[inline]
pub fn rpm_low() -> Color {
    Color::from_rgba8(0, 130, 0, 255)
}

#[inline]
pub fn rpm_mid() -> Color {
    Color::from_rgba8(20, 148, 222, 255)
}

#[inline]
pub fn rpm_high() -> Color {
    Color::from_rgba8(191, 4, 4, 255)
}

pub fn for_gauge(kind: GaugeKind) -> Color {
    match kind {
        GaugeKind::Speed => white(),
        GaugeKind::SpeedLimit => speed_limit(),
        GaugeKind::Cruise => cruise(),
        GaugeKind::Fuel => fuel(),
        GaugeKind::RestStop => rest_stop(),
        GaugeKind::Job => job(),
    }
}

pub fn for_rpm(band: RpmBand) -> Color {
    match band {
        RpmBand::Low => rpm_low(),
        RpmBand::Mid => rpm_mid(),
        RpmBand::High => rpm_high(),
    }
}
