//! Per-frame decision of whether the gauges are drawn.

use std::fmt;

/// Conditions sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInputs {
    /// Foreground window is one of the game titles.
    pub focused: bool,
    /// User visibility toggle.
    pub visible: bool,
    pub has_telemetry: bool,
    pub paused: bool,
    /// Cursor is over the gauge strip drawn last frame.
    pub hovering: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    Unfocused,
    Hidden,
    NoTelemetry,
    Paused,
    Hovering,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Unfocused => "game window not focused",
            SkipReason::Hidden => "hidden by user",
            SkipReason::NoTelemetry => "waiting for telemetry",
            SkipReason::Paused => "game paused",
            SkipReason::Hovering => "cursor over gauges",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDecision {
    Draw,
    Skip(SkipReason),
}

impl FrameInputs {
    /// The first failing condition wins, checked in a fixed order.
    pub fn decide(&self) -> FrameDecision {
        let reason = if !self.focused {
            SkipReason::Unfocused
        } else if !self.visible {
            SkipReason::Hidden
        } else if !self.has_telemetry {
            SkipReason::NoTelemetry
        } else if self.paused {
            SkipReason::Paused
        } else if self.hovering {
            SkipReason::Hovering
        } else {
            return FrameDecision::Draw;
        };
        FrameDecision::Skip(reason)
    }
}

/// Render loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Skipping(SkipReason),
    Exiting,
}

impl LoopState {
    /// State after a frame with `decision`. `Exiting` is terminal.
    pub fn after(self, decision: FrameDecision) -> LoopState {
        match (self, decision) {
            (LoopState::Exiting, _) => LoopState::Exiting,
            (_, FrameDecision::Draw) => LoopState::Running,
            (_, FrameDecision::Skip(reason)) => LoopState::Skipping(reason),
        }
    }

    pub fn is_exiting(self) -> bool {
        self == LoopState::Exiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_clear() -> FrameInputs {
        FrameInputs {
            focused: true,
            visible: true,
            has_telemetry: true,
            paused: false,
            hovering: false,
        }
    }

    #[test]
    fn draws_when_nothing_blocks() {
        assert_eq!(all_clear().decide(), FrameDecision::Draw);
    }

    #[test]
    fn skip_order_is_fixed() {
        let mut inputs = FrameInputs {
            focused: false,
            visible: false,
            has_telemetry: false,
            paused: true,
            hovering: true,
        };
        let expected = [
            SkipReason::Unfocused,
            SkipReason::Hidden,
            SkipReason::NoTelemetry,
            SkipReason::Paused,
            SkipReason::Hovering,
        ];

        for reason in expected {
            assert_eq!(inputs.decide(), FrameDecision::Skip(reason));
            match reason {
                SkipReason::Unfocused => inputs.focused = true,
                SkipReason::Hidden => inputs.visible = true,
                SkipReason::NoTelemetry => inputs.has_telemetry = true,
                SkipReason::Paused => inputs.paused = false,
                SkipReason::Hovering => inputs.hovering = false,
            }
        }
        assert_eq!(inputs.decide(), FrameDecision::Draw);
    }

    #[test]
    fn hover_alone_skips() {
        let inputs = FrameInputs {
            hovering: true,
            ..all_clear()
        };
        assert_eq!(inputs.decide(), FrameDecision::Skip(SkipReason::Hovering));
    }

    #[test]
    fn exiting_is_terminal() {
        let state = LoopState::Exiting.after(FrameDecision::Draw);
        assert!(state.is_exiting());
        assert_eq!(
            LoopState::Running.after(FrameDecision::Skip(SkipReason::Paused)),
            LoopState::Skipping(SkipReason::Paused)
        );
        assert_eq!(
            LoopState::Skipping(SkipReason::Paused).after(FrameDecision::Draw),
            LoopState::Running
        );
    }
}
