//! Expander configuration.
//!
//! [`ExpanderConfig`] is the single place where wiring choices live: the
//! hardware address offset, which port is the input side, and how the INT
//! pin is driven. [`ExpanderConfig::default()`] matches a chip with all
//! address pins grounded, port A as inputs, port B as outputs and the
//! power-on INT pin behaviour (push-pull, active-low).

use crate::interrupt::Edge;
use crate::registers::{IOCON_INTPOL, IOCON_MIRROR, IOCON_ODR};

/// One of the two 8-bit GPIO ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
}

impl Port {
    /// The other port.
    pub fn other(self) -> Port {
        match self {
            Port::A => Port::B,
            Port::B => Port::A,
        }
    }

    /// Resolve an A/B register pair to this port's address, given the
    /// port A address.
    pub(crate) fn register(self, port_a_register: u8) -> u8 {
        match self {
            Port::A => port_a_register,
            Port::B => port_a_register + 1,
        }
    }
}

/// How the chip drives its INT pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptOutput {
    /// OR INTA and INTB together so one controller pin sees both ports.
    pub mirror: bool,
    /// Open-drain output. Needs an external or controller-side pull-up.
    pub open_drain: bool,
    /// Active-high instead of active-low. Ignored when `open_drain` is set.
    pub active_high: bool,
}

impl InterruptOutput {
    /// IOCON bits for this configuration.
    pub(crate) fn iocon(self) -> u8 {
        let mut value = 0;
        if self.mirror {
            value |= IOCON_MIRROR;
        }
        if self.open_drain {
            value |= IOCON_ODR;
        }
        if self.active_high {
            value |= IOCON_INTPOL;
        }
        value
    }

    /// Controller-side edge that marks the start of an interrupt.
    pub fn edge(self) -> Edge {
        if self.active_high && !self.open_drain {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }
}

/// Configuration for a [`PortExpander`](crate::PortExpander).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExpanderConfig {
    /// Hardware address offset (A2..A0). Reduced modulo 8. Default: 0.
    pub address_offset: u8,
    /// Port configured as all inputs with pull-ups; the other port becomes
    /// all outputs. Default: [`Port::A`].
    pub input_port: Port,
    /// Invert the input port's read polarity, so a pulled-up pin shorted
    /// to ground reads as `1`. Default: `false`.
    pub invert_inputs: bool,
    /// INT pin drive mode. Default: push-pull, active-low, not mirrored.
    pub interrupt_output: InterruptOutput,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            address_offset: 0,
            input_port: Port::A,
            invert_inputs: false,
            interrupt_output: InterruptOutput::default(),
        }
    }
}

impl ExpanderConfig {
    /// Port driven as outputs.
    pub fn output_port(&self) -> Port {
        self.input_port.other()
    }
}
