//! High-level interface for the MCP23017.
//!
//! [`PortExpander`] wraps the register driver with direction and latch
//! bookkeeping, pin validation, interrupt setup, and the foreground half of
//! the interrupt dispatcher.

use embedded_hal_async::i2c::I2c;

use crate::client::Client;
use crate::config::{ExpanderConfig, Port};
use crate::dispatch::DispatchTable;
use crate::driver::RegisterDriver;
use crate::error::ExpanderError;
use crate::interrupt::{InterruptLine, NoInterrupt, PendingFlag};
use crate::registers::{
    BASE_ADDRESS, GPINTENA, GPIOA, GPPUA, INTCAPA, INTCONA, INTFA, IOCONA, IODIRA, IPOLA, OLATA,
    PINS_PER_PORT,
};

/// How change events reach the expander. Fixed at construction.
enum Mode<'a> {
    /// Plain register access; no clients, no interrupt line.
    Synchronous,
    /// Edges on the INT line raise `pending`; `process()` drains it.
    InterruptDriven(&'a PendingFlag),
}

/// Interrupt-driven MCP23017 driver.
///
/// One port is all inputs with pull-ups and feeds registered
/// [`Client`]s; the other is all outputs driven through a cached latch.
///
/// # Lifecycle
///
/// 1. [`PortExpander::new()`] - no I2C traffic.
/// 2. [`PortExpander::init()`] - programs directions, pull-ups and the
///    INT pin mode.
/// 3. [`PortExpander::register_client()`] for every logical device.
/// 4. [`PortExpander::start()`] - enables interrupt-on-change for the
///    registered pins and attaches the INT handler.
/// 5. Call [`PortExpander::process()`] from the main loop, often enough
///    that the input port never changes twice between calls.
///
/// # Example
///
/// ```no_run
/// use mcp23017_driver::{DebouncedInput, ExpanderConfig, PendingFlag, PortExpander};
///
/// # async fn example<'a>(
/// #     i2c: impl embedded_hal_async::i2c::I2c,
/// #     line: impl mcp23017_driver::InterruptLine<'a>,
/// #     pending: &'a PendingFlag,
/// #     button: &'a DebouncedInput,
/// # ) {
/// let mut expander = PortExpander::new(i2c, line, pending, ExpanderConfig::default());
/// expander.init().await.unwrap();
/// expander.attach(button).unwrap();
/// expander.start().await.unwrap();
///
/// loop {
///     expander.process().await.unwrap();
///     if button.changed() {
///         expander.digital_write(0, button.state()).await.unwrap();
///     }
/// }
/// # }
/// ```
pub struct PortExpander<'a, I2C, L> {
    driver: RegisterDriver<I2C>,
    line: L,
    mode: Mode<'a>,
    config: ExpanderConfig,
    clients: DispatchTable<'a>,
    /// Last value successfully written to the output port's OLAT.
    output_latch: u8,
    /// Input port value as of the last dispatch.
    baseline: u8,
    initialized: bool,
    started: bool,
}

impl<'a, I2C> PortExpander<'a, I2C, NoInterrupt>
where
    I2C: I2c,
{
    /// Create a driver without event routing.
    ///
    /// Pin reads and writes work as usual; [`start()`](Self::start) arms
    /// nothing, [`process()`](Self::process) never touches the bus, and
    /// [`register_client()`](Self::register_client) is rejected.
    pub fn new_synchronous(i2c: I2C, config: ExpanderConfig) -> Self {
        Self::with_mode(i2c, NoInterrupt, Mode::Synchronous, config)
    }
}

impl<'a, I2C, L> PortExpander<'a, I2C, L>
where
    I2C: I2c,
    L: InterruptLine<'a>,
{
    /// Create an interrupt-driven driver.
    ///
    /// # Arguments
    /// * `i2c` - I2C peripheral (takes ownership for exclusive access)
    /// * `line` - controller pin wired to the chip's INT output
    /// * `pending` - flag the INT handler raises; handed to `line` on
    ///   [`start()`](Self::start)
    /// * `config` - address offset and wiring choices
    pub fn new(i2c: I2C, line: L, pending: &'a PendingFlag, config: ExpanderConfig) -> Self {
        Self::with_mode(i2c, line, Mode::InterruptDriven(pending), config)
    }

    fn with_mode(i2c: I2C, line: L, mode: Mode<'a>, config: ExpanderConfig) -> Self {
        let address = BASE_ADDRESS + (config.address_offset % 8);
        Self {
            driver: RegisterDriver::new(i2c, address),
            line,
            mode,
            config,
            clients: DispatchTable::new(),
            output_latch: 0,
            baseline: 0,
            initialized: false,
            started: false,
        }
    }

    /// 7-bit bus address derived from the configured offset.
    pub fn address(&self) -> u8 {
        self.driver.address()
    }

    /// Tear down and hand back the bus and the interrupt line.
    ///
    /// Does not detach the line; call [`stop()`](Self::stop) first if the
    /// handler must not fire afterwards.
    pub fn release(self) -> (I2C, L) {
        (self.driver.release(), self.line)
    }

    fn input_port(&self) -> Port {
        self.config.input_port
    }

    fn output_port(&self) -> Port {
        self.config.output_port()
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Program port directions, pull-ups, input polarity and the INT pin.
    ///
    /// Input port: all inputs, pull-ups on. Output port: all outputs,
    /// latch cleared. The cached latch is reset to match.
    ///
    /// # Errors
    /// * [`ExpanderError::I2c`] on communication failure. The chip may be
    ///   partially configured; calling `init()` again is safe.
    pub async fn init(&mut self) -> Result<(), ExpanderError<I2C::Error>> {
        let input = self.input_port();
        let output = self.output_port();
        let polarity = if self.config.invert_inputs { 0xFF } else { 0x00 };

        self.driver.write_u8(input.register(IODIRA), 0xFF).await?;
        self.driver.write_u8(input.register(GPPUA), 0xFF).await?;
        self.driver.write_u8(input.register(IPOLA), polarity).await?;

        self.driver.write_u8(output.register(IODIRA), 0x00).await?;
        self.driver.write_u8(output.register(OLATA), 0x00).await?;
        self.output_latch = 0;

        // BANK = 0: IOCONA and IOCONB are the same register.
        self.driver
            .write_u8(IOCONA, self.config.interrupt_output.iocon())
            .await?;

        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "MCP23017 @ {=u8:#x} initialised (inputs on {})",
            self.address(),
            input
        );

        Ok(())
    }

    /// Add a client listening on `mask` (input-port bits).
    ///
    /// Registration order matters: a changed bit goes to the first client
    /// whose mask contains it. The new mask takes effect at the next
    /// [`start()`](Self::start). A client added while started is seeded
    /// from the current baseline, so changes to its pins carried by another
    /// client's interrupt are still measured against the real port state.
    ///
    /// # Errors
    /// * [`ExpanderError::InvalidMask`] if `mask` is zero
    /// * [`ExpanderError::CapacityExceeded`] if the table is full
    /// * [`ExpanderError::NoEventRouting`] on a synchronous expander
    pub fn register_client(
        &mut self,
        mask: u8,
        client: &'a dyn Client,
    ) -> Result<(), ExpanderError<I2C::Error>> {
        if let Mode::Synchronous = self.mode {
            return Err(ExpanderError::NoEventRouting);
        }
        self.clients.register(mask, client)?;
        if self.started {
            client.baseline(self.baseline);
        }
        Ok(())
    }

    /// Register a client on its own pin mask.
    pub fn attach(&mut self, client: &'a dyn Client) -> Result<(), ExpanderError<I2C::Error>> {
        self.register_client(client.pin_mask(), client)
    }

    /// Bits [`start()`](Self::start) enables for interrupt-on-change.
    pub fn interrupt_mask(&self) -> u8 {
        self.clients.interrupt_mask()
    }

    /// Arm interrupt-on-change and attach the INT handler.
    ///
    /// Sequence:
    /// 1. INTCON = 0 (compare against previous value, not DEFVAL).
    /// 2. GPINTEN = OR of all registered masks.
    /// 3. Read GPIOA and GPIOB once each to clear a stale interrupt; the
    ///    input port value becomes the dispatch baseline.
    /// 4. Drop any stale pending flag, then attach the handler.
    ///
    /// Attaching last keeps a stale edge from racing the first real read.
    /// Calling `start()` again re-arms with the current client set.
    ///
    /// # Errors
    /// * [`ExpanderError::NotInitialized`] before [`init()`](Self::init)
    /// * [`ExpanderError::I2c`] on communication failure; the handler is
    ///   left detached
    pub async fn start(&mut self) -> Result<(), ExpanderError<I2C::Error>> {
        if !self.initialized {
            return Err(ExpanderError::NotInitialized);
        }
        let Mode::InterruptDriven(pending) = self.mode else {
            return Ok(());
        };

        if self.started {
            self.line.detach();
            self.started = false;
        }

        let input = self.input_port();
        let mask = self.clients.interrupt_mask();

        self.driver.write_u8(input.register(INTCONA), 0x00).await?;
        self.driver.write_u8(input.register(GPINTENA), mask).await?;

        let port_a = self.driver.read_u8(Port::A.register(GPIOA)).await?;
        let port_b = self.driver.read_u8(Port::B.register(GPIOA)).await?;
        self.baseline = match input {
            Port::A => port_a,
            Port::B => port_b,
        };
        self.clients.baseline(self.baseline);

        pending.take();
        self.line
            .attach(self.config.interrupt_output.edge(), pending);
        self.started = true;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Interrupts armed: mask={=u8:#b} baseline={=u8:#b} clients={}",
            mask,
            self.baseline,
            self.clients.len()
        );

        Ok(())
    }

    /// Detach the INT handler and disable interrupt-on-change.
    ///
    /// The handler is detached before the bus write, so it is gone even if
    /// the write fails.
    pub async fn stop(&mut self) -> Result<(), ExpanderError<I2C::Error>> {
        if !self.started {
            return Ok(());
        }
        self.line.detach();
        self.started = false;

        let input = self.input_port();
        self.driver.write_u8(input.register(GPINTENA), 0x00).await
    }

    // -----------------------------------------------------------------------
    // Event dispatch
    // -----------------------------------------------------------------------

    /// Drain the pending flag and route input changes to clients.
    ///
    /// When nothing is pending this returns `Ok(0)` without bus traffic.
    /// Otherwise the input port is read once, XOR'd against the previous
    /// value, and the changed bits are handed out in registration order.
    /// The baseline then moves to the new value whether or not any client
    /// claimed the change.
    ///
    /// If the port changes more than once between calls, the intermediate
    /// states are never seen: only the net difference is dispatched.
    ///
    /// # Returns
    /// The changed-bit mask (zero if nothing was pending or nothing moved).
    ///
    /// # Errors
    /// * [`ExpanderError::I2c`] if the port read fails. The pending flag is
    ///   raised again and the baseline is kept, so the next call retries
    ///   the read and dispatches the missed change.
    pub async fn process(&mut self) -> Result<u8, ExpanderError<I2C::Error>> {
        let Mode::InterruptDriven(pending) = self.mode else {
            return Ok(0);
        };
        if !pending.take() {
            return Ok(0);
        }

        // A failed read leaves INT asserted, so no new edge will raise the flag.
        let state = match self.driver.read_u8(self.input_port().register(GPIOA)).await {
            Ok(state) => state,
            Err(e) => {
                pending.raise();
                return Err(e);
            }
        };
        let changed = state ^ self.baseline;

        let _delivered = self.clients.dispatch(changed, state);
        self.baseline = state;

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "Port {=u8:#b}: changed={=u8:#b} delivered={=u8:#b}",
            state,
            changed,
            _delivered
        );

        Ok(changed)
    }

    // -----------------------------------------------------------------------
    // Pin access
    // -----------------------------------------------------------------------

    /// Set one output-port pin.
    ///
    /// Updates the cached latch and writes the whole byte in one
    /// transaction, so other outputs never glitch. The cache only changes
    /// if the write succeeds.
    ///
    /// # Arguments
    /// * `pin` - output-port pin (0-7)
    /// * `value` - `true` drives the pin high
    ///
    /// # Errors
    /// * [`ExpanderError::InvalidPin`] if `pin >= 8`
    /// * [`ExpanderError::I2c`] on communication failure
    pub async fn digital_write(
        &mut self,
        pin: u8,
        value: bool,
    ) -> Result<(), ExpanderError<I2C::Error>> {
        if pin >= PINS_PER_PORT {
            return Err(ExpanderError::InvalidPin);
        }

        let bit = 1 << pin;
        let latch = if value {
            self.output_latch | bit
        } else {
            self.output_latch & !bit
        };
        self.write_outputs(latch).await
    }

    /// Write all eight output-port pins at once.
    pub async fn write_outputs(&mut self, value: u8) -> Result<(), ExpanderError<I2C::Error>> {
        let register = self.output_port().register(OLATA);
        self.driver.write_u8(register, value).await?;
        self.output_latch = value;
        Ok(())
    }

    /// Cached output latch. No I2C traffic.
    pub fn output_latch(&self) -> u8 {
        self.output_latch
    }

    /// Read one input-port pin.
    ///
    /// Reading GPIO clears the chip's interrupt condition but does not
    /// touch the dispatch baseline or the pending flag.
    ///
    /// # Errors
    /// * [`ExpanderError::InvalidPin`] if `pin >= 8`
    /// * [`ExpanderError::I2c`] on communication failure
    pub async fn digital_read(&mut self, pin: u8) -> Result<bool, ExpanderError<I2C::Error>> {
        if pin >= PINS_PER_PORT {
            return Err(ExpanderError::InvalidPin);
        }
        let value = self.read_port(self.input_port()).await?;
        Ok(value & (1 << pin) != 0)
    }

    /// Read one GPIO register.
    pub async fn read_port(&mut self, port: Port) -> Result<u8, ExpanderError<I2C::Error>> {
        self.driver.read_u8(port.register(GPIOA)).await
    }

    /// Read both ports in one transaction. Port A is the low byte.
    pub async fn read_gpio_ab(&mut self) -> Result<u16, ExpanderError<I2C::Error>> {
        self.driver.read_u16(GPIOA).await
    }

    /// Lowest input-port pin flagged in INTF, if any.
    pub async fn last_interrupt_pin(&mut self) -> Result<Option<u8>, ExpanderError<I2C::Error>> {
        let flags = self
            .driver
            .read_u8(self.input_port().register(INTFA))
            .await?;
        if flags == 0 {
            Ok(None)
        } else {
            Ok(Some(flags.trailing_zeros() as u8))
        }
    }

    /// Level captured in INTCAP for [`last_interrupt_pin()`](Self::last_interrupt_pin).
    ///
    /// Reading INTCAP clears the chip's interrupt condition.
    pub async fn last_interrupt_pin_value(
        &mut self,
    ) -> Result<Option<bool>, ExpanderError<I2C::Error>> {
        let Some(pin) = self.last_interrupt_pin().await? else {
            return Ok(None);
        };
        let captured = self
            .driver
            .read_u8(self.input_port().register(INTCAPA))
            .await?;
        Ok(Some(captured & (1 << pin) != 0))
    }
}
