//! Mapping from the position counter to a bounded lander depth.

/// Depth in metres relative to the surface (negative is below the surface).
pub type Depth = i32;

/// Result of mapping a counter value onto the depth scale.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DepthReading {
    /// Depth after the floor clamp; never below the initial depth.
    pub depth: Depth,
    /// The counter implied a depth under the floor and must be zeroed.
    pub reset_required: bool,
}

/// Computes `initial + count`, clamped to the floor at `initial`.
///
/// The mapper never touches the position store; callers act on
/// [`DepthReading::reset_required`].
#[must_use]
pub const fn map_depth(initial: Depth, count: i32) -> DepthReading {
    let raw = initial.saturating_add(count);
    if raw < initial {
        DepthReading {
            depth: initial,
            reset_required: true,
        }
    } else {
        DepthReading {
            depth: raw,
            reset_required: false,
        }
    }
}

/// Percentage of the climb from `floor` to `surface` completed at `depth`,
/// clamped to `0..=100`.
#[must_use]
pub fn ascent_progress(floor: Depth, surface: Depth, depth: Depth) -> u8 {
    let span = i64::from(surface) - i64::from(floor);
    if span <= 0 {
        return 100;
    }
    let climbed = (i64::from(depth) - i64::from(floor)).clamp(0, span);
    // `climbed <= span`, so the quotient always fits in 0..=100.
    u8::try_from(climbed * 100 / span).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_above_zero_maps_linearly() {
        assert_eq!(
            map_depth(-60, 25),
            DepthReading {
                depth: -35,
                reset_required: false
            }
        );
    }

    #[test]
    fn counter_below_zero_clamps_to_floor() {
        let reading = map_depth(-60, -5);
        assert_eq!(reading.depth, -60);
        assert!(reading.reset_required);
    }

    #[test]
    fn floor_itself_is_not_a_violation() {
        let reading = map_depth(-60, 0);
        assert_eq!(reading.depth, -60);
        assert!(!reading.reset_required);
    }

    #[test]
    fn extreme_counters_saturate_instead_of_wrapping() {
        assert_eq!(map_depth(i32::MAX - 1, 10).depth, i32::MAX);
        assert!(map_depth(-60, i32::MIN).reset_required);
    }

    #[test]
    fn ascent_progress_tracks_fraction_of_climb() {
        assert_eq!(ascent_progress(-60, 0, -60), 0);
        assert_eq!(ascent_progress(-60, 0, -30), 50);
        assert_eq!(ascent_progress(-60, 0, -15), 75);
        assert_eq!(ascent_progress(-60, 0, 12), 100);
        assert_eq!(ascent_progress(-60, 0, -90), 0);
    }
}
