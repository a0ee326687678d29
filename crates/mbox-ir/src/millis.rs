//! Millisecond tick arithmetic.
//!
//! The tick counter is a free-running `u32` that wraps roughly every 49.7
//! days. Elapsed time is always a wrapping difference so comparisons stay
//! correct across the wrap.

/// Milliseconds on the 1 ms tick base.
pub type Millis = u32;

/// Milliseconds elapsed from `earlier` to `now`, correct across wraparound.
#[inline]
pub const fn elapsed(now: Millis, earlier: Millis) -> Millis {
    now.wrapping_sub(earlier)
}

/// True once strictly more than `window` ms have passed since `earlier`.
#[inline]
pub const fn has_elapsed(now: Millis, earlier: Millis, window: Millis) -> bool {
    elapsed(now, earlier) > window
}

/// Split a duration into whole minutes and remaining seconds.
pub const fn minutes_seconds(ms: Millis) -> (u32, u32) {
    let secs = ms / 1000;
    (secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_wraparound() {
        assert_eq!(elapsed(10, 5), 5);
        assert_eq!(elapsed(3, u32::MAX - 1), 5);
        assert!(has_elapsed(45, u32::MAX - 10, 50));
        assert!(!has_elapsed(39, u32::MAX - 10, 50));
    }

    #[test]
    fn window_is_exclusive() {
        assert!(!has_elapsed(150, 100, 50));
        assert!(has_elapsed(151, 100, 50));
    }

    #[test]
    fn splits_minutes_and_seconds() {
        assert_eq!(minutes_seconds(0), (0, 0));
        assert_eq!(minutes_seconds(59_999), (0, 59));
        assert_eq!(minutes_seconds(125_400), (2, 5));
    }
}
