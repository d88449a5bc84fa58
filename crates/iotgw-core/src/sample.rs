//! Decoded sample values
//!
//! A decoded sample is an ordered sequence of scalars. Position is
//! load-bearing: the persistence layer binds element N to column N of the
//! target table shape.

use std::fmt;

/// First decoded value that marks a notification as a node's registration
/// echo rather than a measurement. Echoes are discarded before persistence.
pub const REGISTRATION_SENTINEL: f64 = -1.0;

/// One scalar inside a decoded sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    /// Scaled-integer field (`"v"`), already divided down to its real value
    Number(f64),
    /// Boolean field (`"bv"`)
    Bool(bool),
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Number(n) => write!(f, "{}", n),
            SampleValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Whether a decoded sample is a registration echo (sentinel first element).
///
/// The check lives here, at the call site's disposal, so the persistence
/// layer stays a pure mapper that never inspects samples for sentinels.
pub fn is_registration_echo(sample: &[SampleValue]) -> bool {
    matches!(sample.first(), Some(SampleValue::Number(v)) if *v == REGISTRATION_SENTINEL)
}
