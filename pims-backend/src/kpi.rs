/// Dashboard statistics derived from the participants, events and participations collections.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub total_participants: usize,
    pub active_members: usize,
    pub total_events: usize,
    /// Percentage, rounded to one decimal place.
    pub average_participation_rate: f64,
}

/// `participations / participants / events * 100`, or `0` if there are no participants or no
/// events.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_participation_rate(participations: usize, participants: usize, events: usize) -> f64 {
    if participants == 0 || events == 0 {
        return 0.0;
    }
    let rate = participations as f64 / participants as f64 / events as f64 * 100.0;
    round_to_tenth(rate)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_of_a_typical_dashboard() {
        assert!((average_participation_rate(5, 10, 2) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rate_is_zero_without_participants_or_events() {
        assert!(average_participation_rate(7, 0, 3) == 0.0);
        assert!(average_participation_rate(7, 3, 0) == 0.0);
        assert!(average_participation_rate(0, 0, 0) == 0.0);
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        assert!((average_participation_rate(1, 3, 1) - 33.3).abs() < 1e-9);
        assert!((average_participation_rate(2, 3, 1) - 66.7).abs() < 1e-9);
        assert!((average_participation_rate(40, 15, 5) - 53.3).abs() < 1e-9);
    }
}
