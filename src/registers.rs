//! MCP23017 register map constants.
//!
//! Addresses assume the power-on `IOCON.BANK = 0` layout, where every
//! register exists as an A/B pair on consecutive addresses:
//! `[REG_A, REG_A + 1]`. The [`Port`](crate::Port) helpers pick the right one.

// ---------------------------------------------------------------------------
// Bus addressing
// ---------------------------------------------------------------------------

/// Fixed upper bits of the 7-bit I2C address. The three hardware address
/// pins (A2..A0) select an offset of 0..=7 on top of this.
pub const BASE_ADDRESS: u8 = 0x20;

/// Number of pins on a single port.
pub const PINS_PER_PORT: u8 = 8;

/// Upper bound on registered clients for one expander.
pub const MAX_CLIENTS: usize = 10;

// ---------------------------------------------------------------------------
// Port A registers (port B is always `+ 1`)
// ---------------------------------------------------------------------------

/// I/O direction. `1` = input, `0` = output.
pub const IODIRA: u8 = 0x00;

/// Input polarity. `1` inverts the value read from GPIO.
pub const IPOLA: u8 = 0x02;

/// Interrupt-on-change enable.
pub const GPINTENA: u8 = 0x04;

/// Default compare value, used only when INTCON selects compare mode.
#[allow(dead_code)]
pub const DEFVALA: u8 = 0x06;

/// Interrupt control. `0` = compare against previous value (on-change),
/// `1` = compare against DEFVAL.
pub const INTCONA: u8 = 0x08;

/// Device configuration. With BANK = 0 both addresses alias one register.
pub const IOCONA: u8 = 0x0A;

/// 100k pull-up enable.
pub const GPPUA: u8 = 0x0C;

/// Interrupt flag (read-only). Set bits identify the pin that fired.
pub const INTFA: u8 = 0x0E;

/// Interrupt capture (read-only). Port value latched when the interrupt
/// fired; reading it clears the interrupt condition.
pub const INTCAPA: u8 = 0x10;

/// Port value. Reading clears the interrupt condition.
pub const GPIOA: u8 = 0x12;

/// Output latch.
pub const OLATA: u8 = 0x14;

// ---------------------------------------------------------------------------
// IOCON bits
// ---------------------------------------------------------------------------

/// INTA and INTB are internally OR'd.
pub const IOCON_MIRROR: u8 = 1 << 6;

/// INT pins are open-drain (overrides INTPOL).
pub const IOCON_ODR: u8 = 1 << 2;

/// INT pins are active-high.
pub const IOCON_INTPOL: u8 = 1 << 1;
