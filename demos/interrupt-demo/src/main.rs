//! Interrupt-driven expander demo
//!
//! Runs the mcp23017-driver crate on the Raspberry Pi Pico 2. A push button
//! and a rotary encoder sit on the expander's port A; an LED on port B
//! follows the button. The expander's INTA output drives a Pico GPIO, whose
//! falling edge raises the driver's pending flag.
//!
//! # Wiring
//!
//! | Signal       | Pico 2 Pin | Expander pin | Notes                       |
//! |--------------|------------|--------------|-----------------------------|
//! | I2C0 SDA     | GP20       | SDA          |                             |
//! | I2C0 SCL     | GP21       | SCL          |                             |
//! | MCP INTA     | GP19       | INTA         | Active-low, pull-up enabled |
//! | Button       |            | GPA0         | To ground                   |
//! | Encoder A/B  |            | GPA1 / GPA2  | Common to ground            |
//! | LED          |            | GPB0         | Through a resistor          |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp as hal;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use mcp23017_driver::{
    DebouncedInput, Edge, ExpanderConfig, InterruptLine, PendingFlag, PortExpander,
    QuadratureDecoder,
};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

// Wire the I2C0 interrupt to Embassy's handler.
bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Raised by the INT edge task, drained by `PortExpander::process()`.
static PENDING: PendingFlag = PendingFlag::new();

/// Attach/detach requests from the expander to the INT edge task.
static INT_CONTROL: Signal<CriticalSectionRawMutex, Option<(Edge, &'static PendingFlag)>> =
    Signal::new();

static BUTTON: StaticCell<DebouncedInput> = StaticCell::new();
static KNOB: StaticCell<QuadratureDecoder> = StaticCell::new();

type ExpanderI2c = I2c<'static, I2C0, i2c::Async>;

// ---------------------------------------------------------------------------
// Interrupt line
// ---------------------------------------------------------------------------

/// [`InterruptLine`] backed by [`int_task`]: attach and detach are
/// forwarded over [`INT_CONTROL`].
struct EdgeTaskLine {
    control: &'static Signal<CriticalSectionRawMutex, Option<(Edge, &'static PendingFlag)>>,
}

impl InterruptLine<'static> for EdgeTaskLine {
    fn attach(&mut self, edge: Edge, pending: &'static PendingFlag) {
        self.control.signal(Some((edge, pending)));
    }

    fn detach(&mut self) {
        self.control.signal(None);
    }
}

async fn wait_for_edge(pin: &mut Input<'static>, edge: Edge) {
    match edge {
        Edge::Rising => pin.wait_for_rising_edge().await,
        Edge::Falling => pin.wait_for_falling_edge().await,
        Edge::Change => pin.wait_for_any_edge().await,
    }
}

/// Turns INT pin edges into `pending.raise()` while attached.
///
/// The only work done per edge is setting the flag; all I2C traffic stays
/// in the expander task.
#[embassy_executor::task]
async fn int_task(
    mut int_pin: Input<'static>,
    control: &'static Signal<CriticalSectionRawMutex, Option<(Edge, &'static PendingFlag)>>,
) {
    let mut armed = None;

    loop {
        let Some((edge, pending)) = armed else {
            armed = control.wait().await;
            continue;
        };

        match select(wait_for_edge(&mut int_pin, edge), control.wait()).await {
            Either::First(()) => pending.raise(),
            Either::Second(update) => armed = update,
        }
    }
}

// ---------------------------------------------------------------------------
// Expander task
// ---------------------------------------------------------------------------

/// Foreground loop: drain pending changes every millisecond, then act on
/// the client results.
#[embassy_executor::task]
async fn expander_task(
    mut expander: PortExpander<'static, ExpanderI2c, EdgeTaskLine>,
    button: &'static DebouncedInput,
    knob: &'static QuadratureDecoder,
) {
    let mut ticker = Ticker::every(Duration::from_millis(1));
    let mut position: i32 = 0;

    loop {
        ticker.next().await;

        if let Err(e) = expander.process().await {
            error!("Expander read failed: {}", e);
            continue;
        }

        if button.changed() {
            let pressed = button.state();
            info!("Button {}", if pressed { "pressed" } else { "released" });
            if let Err(e) = expander.digital_write(0, pressed).await {
                error!("LED write failed: {}", e);
            }
        }

        let steps = knob.count();
        if steps != 0 {
            position += steps;
            info!("Encoder: {} (position {})", steps, position);
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("interrupt-demo starting");

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );

    // MCP INTA is push-pull active-low by default; the pull-up only
    // matters while the expander is unpowered.
    let int_pin = Input::new(p.PIN_19, Pull::Up);

    // Inputs are switches to ground: invert so "closed" reads as 1 and the
    // encoder detent reads as 00.
    let config = ExpanderConfig {
        invert_inputs: true,
        ..ExpanderConfig::default()
    };
    let line = EdgeTaskLine {
        control: &INT_CONTROL,
    };
    let mut expander = PortExpander::new(i2c, line, &PENDING, config);

    let button: &'static DebouncedInput =
        BUTTON.init(unwrap!(DebouncedInput::new(0).ok(), "button pin"));
    let knob: &'static QuadratureDecoder =
        KNOB.init(unwrap!(QuadratureDecoder::new(1, 2).ok(), "encoder pins"));

    if let Err(e) = expander.init().await {
        error!("Expander init failed: {}", e);
        return;
    }

    unwrap!(expander.attach(button).ok(), "register button");
    unwrap!(expander.attach(knob).ok(), "register encoder");

    // The edge task must be running before start() signals the attach.
    spawner.spawn(int_task(int_pin, &INT_CONTROL)).unwrap();

    if let Err(e) = expander.start().await {
        error!("Expander start failed: {}", e);
        return;
    }

    info!(
        "Expander @ {=u8:#x} armed, mask {=u8:#b}",
        expander.address(),
        expander.interrupt_mask()
    );

    spawner.spawn(expander_task(expander, button, knob)).unwrap();
}
