//! Conversions between wall-clock time and server ticks.

/// Server ticks per second at the nominal tick rate.
pub const TICKS_PER_SECOND: u64 = 20;

/// Milliseconds covered by one tick.
pub const MILLIS_PER_TICK: u64 = 1000 / TICKS_PER_SECOND;

/// Converts milliseconds to whole ticks, rounding down.
#[inline]
#[must_use]
pub const fn ms_to_ticks(ms: u64) -> u64 {
    ms / MILLIS_PER_TICK
}

/// Converts seconds to ticks.
#[inline]
#[must_use]
pub const fn seconds_to_ticks(seconds: u64) -> u64 {
    seconds * TICKS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks_rounds_down() {
        assert_eq!(ms_to_ticks(100), 2);
        assert_eq!(ms_to_ticks(149), 2);
        assert_eq!(ms_to_ticks(49), 0);
        assert_eq!(seconds_to_ticks(3), 60);
    }
}
