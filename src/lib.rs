//! Async interrupt-driven driver for the MCP23017 I2C port expander.
//!
//! One port is wired as inputs and feeds logical devices (buttons, rotary
//! encoders); the other is driven as outputs. Instead of polling the inputs
//! every cycle, the chip's interrupt-on-change output raises a flag, and the
//! foreground loop reads the port only when something moved.
//!
//! # Architecture
//!
//! - **`driver`** (crate-private) - byte-wide register primitives over
//!   [`embedded_hal_async::i2c::I2c`].
//! - **[`PortExpander`]** - direction/latch bookkeeping, pin access,
//!   interrupt arming and [`process()`](PortExpander::process), which turns
//!   one "something changed" edge into per-client events.
//! - **[`DispatchTable`]** - bounded, ordered `(mask, client)` table.
//! - **[`Client`]s** - [`DebouncedInput`] and [`QuadratureDecoder`].
//! - **[`PendingFlag`] / [`InterruptLine`]** - the only state shared with
//!   interrupt context.
//!
//! # Quick start
//!
//! ```ignore
//! use mcp23017_driver::{DebouncedInput, ExpanderConfig, PendingFlag, PortExpander, QuadratureDecoder};
//!
//! static PENDING: PendingFlag = PendingFlag::new();
//!
//! let button = DebouncedInput::new(0)?;
//! let knob = QuadratureDecoder::new(1, 2)?;
//!
//! let mut expander = PortExpander::new(i2c, int_line, &PENDING, ExpanderConfig::default());
//! expander.init().await?;
//! expander.attach(&button)?;
//! expander.attach(&knob)?;
//! expander.start().await?;
//!
//! loop {
//!     expander.process().await?;
//!     let steps = knob.count();
//!     if button.changed() { /* ... */ }
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`** - enable [`defmt::Format`] implementations on public types
//!   and driver logging.

#![no_std]

#[cfg(test)]
extern crate std;

pub use client::{Client, DebouncedInput, Direction, QuadratureDecoder, QuadratureState};
pub use config::{ExpanderConfig, InterruptOutput, Port};
pub use dispatch::{DispatchTable, Registration};
pub use error::{ExpanderError, InvalidPin};
pub use expander::PortExpander;
pub use interrupt::{Edge, InterruptLine, NoInterrupt, PendingFlag};
pub use registers::{BASE_ADDRESS, MAX_CLIENTS};

mod client;
mod config;
mod dispatch;
mod driver;
mod error;
mod expander;
mod interrupt;
mod registers;
