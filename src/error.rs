//! Error types for the port expander driver.

use core::fmt;

/// Errors that can occur when talking to the expander or configuring it.
#[derive(Debug, PartialEq, Eq)]
pub enum ExpanderError<E> {
    /// Underlying I2C bus error.
    I2c(E),

    /// Pin index out of range (must be 0-7).
    InvalidPin,

    /// Client mask is empty.
    InvalidMask,

    /// The client table is full.
    CapacityExceeded,

    /// An operation needing configured hardware ran before `init()`.
    NotInitialized,

    /// Client registration on an expander built without interrupt routing.
    NoEventRouting,
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for ExpanderError<E> {
    fn from(error: E) -> Self {
        ExpanderError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for ExpanderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExpanderError::I2c(e) => write!(f, "I2C error: {:?}", e),
            ExpanderError::InvalidPin => write!(f, "Invalid pin index (must be 0-7)"),
            ExpanderError::InvalidMask => write!(f, "Client pin mask must not be empty"),
            ExpanderError::CapacityExceeded => write!(f, "Client table is full"),
            ExpanderError::NotInitialized => write!(f, "Expander not initialized"),
            ExpanderError::NoEventRouting => {
                write!(f, "Synchronous expander does not route events")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for ExpanderError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ExpanderError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            ExpanderError::InvalidPin => defmt::write!(f, "Invalid pin index"),
            ExpanderError::InvalidMask => defmt::write!(f, "Empty client mask"),
            ExpanderError::CapacityExceeded => defmt::write!(f, "Client table full"),
            ExpanderError::NotInitialized => defmt::write!(f, "Not initialized"),
            ExpanderError::NoEventRouting => defmt::write!(f, "No event routing"),
        }
    }
}

/// Client construction with a pin outside 0-7, or with both encoder
/// phases on the same pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidPin;

impl fmt::Display for InvalidPin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid client pin")
    }
}
