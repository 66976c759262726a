use chrono::TimeDelta;

/// Round half to even and print without a decimal point. Never prints `-0`.
pub fn whole(value: f64) -> String {
    let rounded = value.round_ties_even() as i64;
    rounded.to_string()
}

/// Signed `HH:MM` with floor hours, so one minute overdue reads `-1:59`.
pub fn hhmm(delta: TimeDelta) -> String {
    let secs = delta.num_seconds();
    let hours = secs.div_euclid(3600);
    let minutes = secs.rem_euclid(3600) / 60;
    format!("{hours:02}:{minutes:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_rounds_like_bankers() {
        assert_eq!(whole(72.4), "72");
        assert_eq!(whole(72.5), "72");
        assert_eq!(whole(73.5), "74");
        assert_eq!(whole(-0.4), "0");
    }

    #[test]
    fn hhmm_positive() {
        assert_eq!(hhmm(TimeDelta::minutes(6 * 60 + 30)), "06:30");
        assert_eq!(hhmm(TimeDelta::hours(49)), "49:00");
    }

    #[test]
    fn hhmm_negative_uses_floor_hours() {
        assert_eq!(hhmm(TimeDelta::minutes(-1)), "-1:59");
        assert_eq!(hhmm(TimeDelta::minutes(-90)), "-2:30");
    }

    #[test]
    fn hhmm_drops_seconds() {
        assert_eq!(hhmm(TimeDelta::seconds(59)), "00:00");
    }
}
