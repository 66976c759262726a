//! Widgets for the gauge overlay
//!
//! Each widget draws through a [`DrawTarget`](crate::canvas::DrawTarget).
//!
//! # Available Widgets
//!
//! - [`Gauge`] - Bordered value with label above and unit below
//! - [`LapStrip`] - Row of recent delivery-advantage samples

pub mod colors;
mod gauge;
mod lap_strip;

pub use gauge::{Bounds, Gauge, GaugeFill, GaugeLayout, GaugeStyle};
pub use lap_strip::LapStrip;
