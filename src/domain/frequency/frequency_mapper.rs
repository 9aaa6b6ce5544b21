//! Control value to interval mapping

use super::FrequencyTier;

/// Interval used when a tier name is not recognised (one hour)
pub const DEFAULT_FREQUENCY_MS: u64 = 3_600_000;

/// Map a 0-100 control value within a tier onto an interval in milliseconds.
///
/// The mapping is linear and inverted: 100 is the fastest setting and lands on
/// the tier minimum, 0 lands on the tier maximum. The result is rounded to a
/// whole second.
pub fn map_to_frequency(control_value: f64, tier: FrequencyTier) -> u64 {
    let (min_secs, max_secs) = tier.range_secs();
    let normalized = if control_value.is_nan() {
        0.5
    } else {
        control_value.clamp(0.0, 100.0) / 100.0
    };

    let span = (max_secs - min_secs) as f64;
    let seconds = min_secs as f64 + span * (1.0 - normalized);

    seconds.round() as u64 * 1000
}

/// Same as [`map_to_frequency`] for a tier given by name.
pub fn map_named_to_frequency(control_value: f64, tier_name: &str) -> u64 {
    match tier_name.parse::<FrequencyTier>() {
        Ok(tier) => map_to_frequency(control_value, tier),
        Err(_) => DEFAULT_FREQUENCY_MS,
    }
}

/// Human-readable cadence, e.g. `every 2h 30m`
pub fn describe_interval(interval_ms: u64) -> String {
    let total_secs = interval_ms / 1000;
    if total_secs == 0 {
        return format!("every {}ms", interval_ms);
    }

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .take(2)
        .map(|(amount, unit)| format!("{}{}", amount, unit))
        .collect();

    format!("every {}", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_tier_boundaries() {
        assert_eq!(map_to_frequency(0.0, FrequencyTier::Seconds), 60_000);
        assert_eq!(map_to_frequency(100.0, FrequencyTier::Seconds), 1_000);
        // 30.5s rounds half away from zero
        assert_eq!(map_to_frequency(50.0, FrequencyTier::Seconds), 31_000);
    }

    #[test]
    fn test_every_tier_spans_its_range() {
        for tier in FrequencyTier::all() {
            let (min, max) = tier.range_secs();
            assert_eq!(map_to_frequency(0.0, tier), max * 1000);
            assert_eq!(map_to_frequency(100.0, tier), min * 1000);
        }
    }

    #[test]
    fn test_higher_value_means_shorter_interval() {
        let slow = map_to_frequency(25.0, FrequencyTier::Hours);
        let fast = map_to_frequency(75.0, FrequencyTier::Hours);
        assert!(fast < slow);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        assert_eq!(map_to_frequency(150.0, FrequencyTier::Minutes), 60_000);
        assert_eq!(map_to_frequency(-10.0, FrequencyTier::Minutes), 3_600_000);
    }

    #[test]
    fn test_unknown_tier_falls_back_to_one_hour() {
        assert_eq!(map_named_to_frequency(80.0, "fortnights"), DEFAULT_FREQUENCY_MS);
        assert_eq!(map_named_to_frequency(100.0, "seconds"), 1_000);
    }

    #[test]
    fn test_describe_interval() {
        assert_eq!(describe_interval(31_000), "every 31s");
        assert_eq!(describe_interval(9_000_000), "every 2h 30m");
        assert_eq!(describe_interval(2_592_000_000), "every 30d");
        assert_eq!(describe_interval(100), "every 100ms");
    }
}
