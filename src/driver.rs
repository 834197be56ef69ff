//! Low-level register access for the MCP23017.
//!
//! Byte-wide register reads and writes over I2C. Every primitive is fallible
//! and returns the bus error to the caller; nothing here retries.
//!
//! This module is crate-private. Consumers interact with
//! [`PortExpander`](crate::PortExpander) instead.

use embedded_hal_async::i2c::I2c;

use crate::error::ExpanderError;

/// Low-level register driver.
///
/// Owns the I2C peripheral and the resolved 7-bit device address.
pub(crate) struct RegisterDriver<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> RegisterDriver<I2C>
where
    I2C: I2c,
{
    /// Create a new register driver for an already-resolved address.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// The 7-bit bus address in use.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the I2C peripheral back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    // -----------------------------------------------------------------------
    // Typed read/write helpers
    // -----------------------------------------------------------------------

    /// Read a single register.
    ///
    /// Uses `write_read()` (repeated start): the MCP23017 has no turnaround
    /// delay requirement between the address and data phases.
    pub async fn read_u8(&mut self, register: u8) -> Result<u8, ExpanderError<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .await?;
        Ok(buf[0])
    }

    /// Read two consecutive registers in one sequential transaction.
    ///
    /// Relies on the power-on `IOCON.SEQOP = 0` address auto-increment.
    /// The first register lands in the low byte.
    pub async fn read_u16(&mut self, register: u8) -> Result<u16, ExpanderError<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .await?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Write a single register: `[register, value]` in one transaction.
    pub async fn write_u8(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), ExpanderError<I2C::Error>> {
        self.i2c.write(self.address, &[register, value]).await?;
        Ok(())
    }
}
