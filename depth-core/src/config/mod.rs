//! Mission configuration and boot-time validation.
//!
//! All parameters are fixed before the poll loop starts. A configuration that
//! fails [`MissionConfig::validate`] is fatal: the firmware shows `nOPE` and
//! refuses to track depth rather than run with wrong parameters.

use core::fmt;
use core::time::Duration;

use heapless::Vec;

use crate::alerts::{AlertThreshold, MAX_THRESHOLDS};
use crate::depth::Depth;
use crate::feedback::Tone;
use crate::quadrature::Resolution;

pub mod keys;

pub use keys::AccessKeys;

/// Sea-floor depth the lander starts from.
pub const LANDER_INITIAL_DEPTH: Depth = -60;
/// Depth of the surface.
pub const LANDER_SURFACE_DEPTH: Depth = 0;
/// Largest climb allowed between two polls before the alarm sounds.
pub const LANDER_RATE_LIMIT: i32 = 1;
/// Delay between poll loop iterations.
pub const LANDER_POLL_INTERVAL: Duration = Duration::from_millis(200);
/// Number of on/off cycles for blinking alerts.
pub const LANDER_BLINK_COUNT: u8 = 3;
/// Frequency of the climb-rate alarm.
pub const RATE_ALARM_HZ: u16 = 80;

/// Checkpoints at 50 % and 25 % of the initial depth, then the surface.
pub const LANDER_THRESHOLDS: [AlertThreshold; 3] = [
    AlertThreshold::fraction_of(LANDER_INITIAL_DEPTH, 50),
    AlertThreshold::fraction_of(LANDER_INITIAL_DEPTH, 25),
    AlertThreshold::surface(LANDER_SURFACE_DEPTH),
];

/// Reasons a mission configuration is rejected at boot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    NoThresholds,
    TooManyThresholds,
    ThresholdsNotAscending { index: usize },
    ThresholdAtOrBelowFloor { index: usize },
    MissingSurface,
    SurfaceNotLast { index: usize },
    NonPositiveRateLimit,
    ZeroPollInterval,
    InvalidAccessKey { index: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoThresholds => write!(f, "no alert thresholds configured"),
            ConfigError::TooManyThresholds => {
                write!(f, "more than {MAX_THRESHOLDS} alert thresholds configured")
            }
            ConfigError::ThresholdsNotAscending { index } => {
                write!(f, "threshold #{index} is not above the previous threshold")
            }
            ConfigError::ThresholdAtOrBelowFloor { index } => {
                write!(f, "threshold #{index} is not above the initial depth")
            }
            ConfigError::MissingSurface => write!(f, "last threshold must be the surface"),
            ConfigError::SurfaceNotLast { index } => {
                write!(f, "surface threshold #{index} is not the last threshold")
            }
            ConfigError::NonPositiveRateLimit => write!(f, "rate limit must be at least 1"),
            ConfigError::ZeroPollInterval => write!(f, "poll interval must be non-zero"),
            ConfigError::InvalidAccessKey { index } => write!(f, "access key #{index} is invalid"),
        }
    }
}

/// Every compile-time parameter of a mission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MissionConfig {
    pub initial_depth: Depth,
    pub thresholds: Vec<AlertThreshold, MAX_THRESHOLDS>,
    pub rate_limit: i32,
    pub poll_interval: Duration,
    pub blink_count: u8,
    pub alarm: Tone,
    pub resolution: Resolution,
    pub access_keys: AccessKeys,
}

impl MissionConfig {
    /// Creates a validated configuration with lander defaults for everything
    /// except the floor and the thresholds.
    pub fn new(initial_depth: Depth, thresholds: &[AlertThreshold]) -> Result<Self, ConfigError> {
        let thresholds =
            Vec::from_slice(thresholds).map_err(|_| ConfigError::TooManyThresholds)?;
        let config = Self {
            initial_depth,
            thresholds,
            ..Self::lander()
        };
        config.validate()?;
        Ok(config)
    }

    /// The lander ascent mission.
    #[must_use]
    pub fn lander() -> Self {
        Self {
            initial_depth: LANDER_INITIAL_DEPTH,
            thresholds: LANDER_THRESHOLDS.iter().copied().collect(),
            rate_limit: LANDER_RATE_LIMIT,
            poll_interval: LANDER_POLL_INTERVAL,
            blink_count: LANDER_BLINK_COUNT,
            alarm: Tone::new(RATE_ALARM_HZ, LANDER_POLL_INTERVAL),
            resolution: Resolution::Detent,
            access_keys: AccessKeys::LANDER,
        }
    }

    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: i32) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Changes the poll tick; the alarm keeps lasting one tick.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.alarm.duration = poll_interval;
        self
    }

    #[must_use]
    pub fn with_blink_count(mut self, blink_count: u8) -> Self {
        self.blink_count = blink_count;
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_access_keys(mut self, access_keys: AccessKeys) -> Self {
        self.access_keys = access_keys;
        self
    }

    /// The terminal threshold, if the list ends with one.
    #[must_use]
    pub fn surface(&self) -> Option<AlertThreshold> {
        self.thresholds
            .last()
            .copied()
            .filter(AlertThreshold::is_surface)
    }

    /// Checks every invariant the poll loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.access_keys.verify()?;

        if self.thresholds.is_empty() {
            return Err(ConfigError::NoThresholds);
        }

        let last = self.thresholds.len() - 1;
        let mut previous: Option<Depth> = None;
        for (index, threshold) in self.thresholds.iter().enumerate() {
            if threshold.depth <= self.initial_depth {
                return Err(ConfigError::ThresholdAtOrBelowFloor { index });
            }
            if let Some(below) = previous
                && threshold.depth <= below
            {
                return Err(ConfigError::ThresholdsNotAscending { index });
            }
            if threshold.is_surface() && index != last {
                return Err(ConfigError::SurfaceNotLast { index });
            }
            previous = Some(threshold.depth);
        }

        if self.surface().is_none() {
            return Err(ConfigError::MissingSurface);
        }
        if self.rate_limit < 1 {
            return Err(ConfigError::NonPositiveRateLimit);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self::lander()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lander_defaults_are_valid() {
        let config = MissionConfig::lander();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(
            config
                .thresholds
                .iter()
                .map(|threshold| threshold.depth)
                .collect::<Vec<Depth, MAX_THRESHOLDS>>()
                .as_slice(),
            &[-30, -15, 0]
        );
        assert_eq!(config.surface(), Some(AlertThreshold::surface(0)));
    }

    #[test]
    fn rejects_empty_threshold_list() {
        assert_eq!(
            MissionConfig::new(-60, &[]),
            Err(ConfigError::NoThresholds)
        );
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let thresholds = [
            AlertThreshold::checkpoint(-15),
            AlertThreshold::checkpoint(-30),
            AlertThreshold::surface(0),
        ];
        assert_eq!(
            MissionConfig::new(-60, &thresholds),
            Err(ConfigError::ThresholdsNotAscending { index: 1 })
        );
    }

    #[test]
    fn rejects_threshold_on_floor() {
        let thresholds = [AlertThreshold::checkpoint(-60), AlertThreshold::surface(0)];
        assert_eq!(
            MissionConfig::new(-60, &thresholds),
            Err(ConfigError::ThresholdAtOrBelowFloor { index: 0 })
        );
    }

    #[test]
    fn surface_must_terminate_the_list() {
        let early = [AlertThreshold::surface(-10), AlertThreshold::checkpoint(0)];
        assert_eq!(
            MissionConfig::new(-60, &early),
            Err(ConfigError::SurfaceNotLast { index: 0 })
        );

        let missing = [AlertThreshold::checkpoint(-10)];
        assert_eq!(
            MissionConfig::new(-60, &missing),
            Err(ConfigError::MissingSurface)
        );
    }

    #[test]
    fn rejects_too_many_thresholds() {
        let thresholds = [AlertThreshold::checkpoint(-1); MAX_THRESHOLDS + 1];
        assert_eq!(
            MissionConfig::new(-60, &thresholds),
            Err(ConfigError::TooManyThresholds)
        );
    }

    #[test]
    fn rejects_bad_timing_and_rate() {
        let config = MissionConfig::lander().with_rate_limit(0);
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveRateLimit));

        let config = MissionConfig::lander().with_poll_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));
    }

    #[test]
    fn poll_interval_drives_alarm_duration() {
        let config = MissionConfig::lander().with_poll_interval(Duration::from_millis(50));
        assert_eq!(config.alarm.duration, Duration::from_millis(50));
    }

    #[test]
    fn wrong_access_key_is_fatal() {
        let config = MissionConfig::lander().with_access_keys(AccessKeys::new([23, 0, 1688]));
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidAccessKey { index: 1 })
        );
    }
}
