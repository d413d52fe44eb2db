//! Access keys unlocking the depth control system.
//!
//! The three keys come from the lander's decryption stage. Placeholder or
//! mistyped keys keep the controller parked on the `nOPE` screen.

use super::ConfigError;

/// Number of keys the pilot must enter.
pub const KEY_COUNT: usize = 3;

const EXPECTED: [u16; KEY_COUNT] = [23, 353, 1688];

/// Keys as entered in the mission configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccessKeys([u16; KEY_COUNT]);

impl AccessKeys {
    /// The keys recovered for the lander mission.
    pub const LANDER: AccessKeys = AccessKeys(EXPECTED);
    /// Placeholder shipped before the pilot fills the keys in.
    pub const UNSET: AccessKeys = AccessKeys([0; KEY_COUNT]);

    pub const fn new(keys: [u16; KEY_COUNT]) -> Self {
        Self(keys)
    }

    #[must_use]
    pub const fn keys(&self) -> [u16; KEY_COUNT] {
        self.0
    }

    /// Reports the first key that does not match.
    pub fn verify(&self) -> Result<(), ConfigError> {
        match self
            .0
            .iter()
            .zip(EXPECTED.iter())
            .position(|(entered, expected)| entered != expected)
        {
            Some(index) => Err(ConfigError::InvalidAccessKey { index }),
            None => Ok(()),
        }
    }
}

impl Default for AccessKeys {
    fn default() -> Self {
        Self::UNSET
    }
}
