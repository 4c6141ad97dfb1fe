//! The host PIN.
//!
//! A PIN is 4 to 6 ASCII digits. Anything else is rejected as a format
//! error before it is compared, so a typo like `12a4` never costs the host
//! one of their attempts.

use std::fmt;

use quizbuzz_protocol::AuthError;

/// Shortest accepted PIN.
pub const MIN_PIN_LEN: usize = 4;
/// Longest accepted PIN.
pub const MAX_PIN_LEN: usize = 6;

/// Returns `true` if `pin` is 4–6 ASCII digits (`^[0-9]{4,6}$`).
pub fn is_valid_pin_format(pin: &str) -> bool {
    (MIN_PIN_LEN..=MAX_PIN_LEN).contains(&pin.len())
        && pin.bytes().all(|b| b.is_ascii_digit())
}

/// The configured host PIN.
///
/// Wrapped so it never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct HostPin(String);

impl HostPin {
    /// The PIN shipped as default. Deployments must change it.
    pub const DEFAULT: &'static str = "1234";

    /// Validates and wraps a PIN.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidFormat`] unless the PIN is 4–6 digits.
    pub fn new(pin: impl Into<String>) -> Result<Self, AuthError> {
        let pin = pin.into();
        if is_valid_pin_format(&pin) {
            Ok(Self(pin))
        } else {
            Err(AuthError::InvalidFormat)
        }
    }

    /// Compares a candidate against the PIN.
    ///
    /// Every byte is visited regardless of where the first mismatch is.
    pub fn matches(&self, candidate: &str) -> bool {
        let (a, b) = (self.0.as_bytes(), candidate.as_bytes());
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }

    /// `true` while the shipped default is still in use.
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for HostPin {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Debug for HostPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostPin(****)")
    }
}
