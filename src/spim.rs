/*!
  # Serial Peripheral Interface Master with EasyDMA (SPIM)

  To construct a bus, hand one of the `SPIM0`, `SPIM1` or `SPIM2` tokens to
  [`Spim::new`] (or call `.spim(config)` on it with the prelude in scope).

  A [`Config`] picks the clock rate, the bit order, the SPI mode and the pins.
  Out of range values never fail: the clock rounds down to the nearest
  supported rate, unknown modes fall back to mode 0 and an all-zero pin
  triple selects the bus defaults from [`gpio::defaults`](crate::gpio::defaults).

  Every transfer is blocking. Buffers of any length are split into EasyDMA
  segments of at most 255 bytes; the read and write sides advance on their
  own, so when they differ in length the tail of the longer one goes out in
  segments where the other direction is idle.

  The chip-select line is not driven by this driver.

  ## Initialisation example

  ```rust,ignore
    let dp = pac::Peripherals::take().unwrap();

    let config = Config::default()
        .frequency(1.MHz())
        .pins(Pins::new(Pin(25), Pin(23), Pin(24)))
        .mode(3);
    let mut spi = Spim::new(dp.SPIM0, config);

    let mut id = [0u8; 4];
    cs.set_low();
    // constants in flash are copied to RAM before EasyDMA sends them
    spi.tx(&[0x9f], &mut id)?;
    cs.set_high();
  ```
*/

use core::hint;
use core::ops::Range;
use core::sync::atomic::{self, Ordering};

use bitflags::bitflags;

use crate::dma::{next_rx, next_tx, slice_in_ram, RxSegment, TxSegment, EASY_DMA_SIZE, SRAM};
use crate::gpio::{self, Pin, Pins};
use crate::pac::spim0::{frequency::FREQUENCY_A, RegisterBlock};
use crate::pac::{SPIM0, SPIM1, SPIM2};
use crate::time::Hertz;

pub use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

mod dma;
mod hal_02;
mod hal_1;
#[cfg(test)]
pub(crate) mod sim;

/// SPIM error
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The END event did not arrive within the configured number of polls
    Timeout,
}

/// Clock rate used when the configuration asks for 0 Hz
pub const DEFAULT_FREQUENCY: Hertz = Hertz::from_raw(4_000_000);

/// Supported SCK rates, as written to the `FREQUENCY` register
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Frequency {
    K125 = 0x0200_0000,
    K250 = 0x0400_0000,
    K500 = 0x0800_0000,
    M1 = 0x1000_0000,
    M2 = 0x2000_0000,
    M4 = 0x4000_0000,
    M8 = 0x8000_0000,
}

impl Frequency {
    /// The fastest rate not above `freq`, or the slowest rate if there is none
    pub fn at_most(freq: Hertz) -> Self {
        match freq.raw() {
            8_000_000.. => Frequency::M8,
            4_000_000.. => Frequency::M4,
            2_000_000.. => Frequency::M2,
            1_000_000.. => Frequency::M1,
            500_000.. => Frequency::K500,
            250_000.. => Frequency::K250,
            _ => Frequency::K125,
        }
    }

    /// Nominal SCK rate
    pub const fn hz(self) -> Hertz {
        Hertz::from_raw(match self {
            Frequency::K125 => 125_000,
            Frequency::K250 => 250_000,
            Frequency::K500 => 500_000,
            Frequency::M1 => 1_000_000,
            Frequency::M2 => 2_000_000,
            Frequency::M4 => 4_000_000,
            Frequency::M8 => 8_000_000,
        })
    }

    /// `FREQUENCY` register value
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

impl From<Frequency> for FREQUENCY_A {
    fn from(f: Frequency) -> Self {
        match f {
            Frequency::K125 => FREQUENCY_A::K125,
            Frequency::K250 => FREQUENCY_A::K250,
            Frequency::K500 => FREQUENCY_A::K500,
            Frequency::M1 => FREQUENCY_A::M1,
            Frequency::M2 => FREQUENCY_A::M2,
            Frequency::M4 => FREQUENCY_A::M4,
            Frequency::M8 => FREQUENCY_A::M8,
        }
    }
}

bitflags! {
    /// `CONFIG` register contents
    pub struct ConfigBits: u32 {
        /// Least significant bit shifted out first
        const ORDER_LSB_FIRST = 1 << 0;
        /// Sample on the trailing clock edge
        const CPHA_TRAILING = 1 << 1;
        /// Clock idles high
        const CPOL_ACTIVE_LOW = 1 << 2;
    }
}

/// Bus configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Requested SCK rate, 0 Hz for [`DEFAULT_FREQUENCY`]
    pub frequency: Hertz,
    pub sck: Pin,
    /// MOSI
    pub sdo: Pin,
    /// MISO
    pub sdi: Pin,
    pub lsb_first: bool,
    /// SPI mode 0-3, anything else is mode 0
    pub mode: u8,
}

impl Config {
    pub fn frequency(mut self, frequency: Hertz) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn pins(mut self, pins: Pins) -> Self {
        self.sck = pins.sck;
        self.sdo = pins.sdo;
        self.sdi = pins.sdi;
        self
    }

    pub fn lsb_first(mut self) -> Self {
        self.lsb_first = true;
        self
    }

    pub fn msb_first(mut self) -> Self {
        self.lsb_first = false;
        self
    }

    pub fn mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the mode from its polarity and phase
    pub fn spi_mode(mut self, mode: Mode) -> Self {
        self.mode = mode_number(mode);
        self
    }

    /// Register values for this configuration on a bus whose default pins
    /// are `default_pins`
    pub fn encode(&self, default_pins: Pins) -> Encoded {
        let requested = if self.frequency.raw() == 0 {
            DEFAULT_FREQUENCY
        } else {
            self.frequency
        };

        let mut config = config_bits(numbered_mode(self.mode));
        if self.lsb_first {
            config |= ConfigBits::ORDER_LSB_FIRST;
        }

        Encoded {
            frequency: Frequency::at_most(requested),
            config,
            pins: Pins::new(self.sck, self.sdo, self.sdi).or(default_pins),
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            frequency: DEFAULT_FREQUENCY,
            sck: Pin::NONE,
            sdo: Pin::NONE,
            sdi: Pin::NONE,
            lsb_first: false,
            mode: 0,
        }
    }
}

impl From<Hertz> for Config {
    fn from(frequency: Hertz) -> Config {
        Config {
            frequency,
            ..Default::default()
        }
    }
}

impl From<Mode> for Config {
    fn from(mode: Mode) -> Config {
        Config::default().spi_mode(mode)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Config {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Config {{ frequency: {=u32} Hz, sck: {}, sdo: {}, sdi: {}, lsb_first: {=bool}, mode: {=u8} }}",
            self.frequency.raw(),
            self.sck,
            self.sdo,
            self.sdi,
            self.lsb_first,
            self.mode,
        )
    }
}

/// Register contents derived from a [`Config`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Encoded {
    pub frequency: Frequency,
    pub config: ConfigBits,
    pub pins: Pins,
}

/// SPI mode `n`, with anything outside 0-3 read as mode 0
pub const fn numbered_mode(n: u8) -> Mode {
    match n {
        1 => MODE_1,
        2 => MODE_2,
        3 => MODE_3,
        _ => MODE_0,
    }
}

/// Conventional number of `mode`
pub fn mode_number(mode: Mode) -> u8 {
    match (mode.polarity, mode.phase) {
        (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => 0,
        (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => 1,
        (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => 2,
        (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => 3,
    }
}

fn config_bits(mode: Mode) -> ConfigBits {
    let mut bits = ConfigBits::empty();
    bits.set(
        ConfigBits::CPOL_ACTIVE_LOW,
        mode.polarity == Polarity::IdleHigh,
    );
    bits.set(
        ConfigBits::CPHA_TRAILING,
        mode.phase == Phase::CaptureOnSecondTransition,
    );
    bits
}

/// Named register access for one SPIM. Every write lands on the hardware
/// in program order.
pub trait Registers {
    fn set_enabled(&self, enabled: bool);
    fn write_frequency(&self, frequency: Frequency);
    fn write_config(&self, config: ConfigBits);
    fn write_psel(&self, pins: Pins);
    fn write_rxd(&self, segment: RxSegment);
    fn write_txd(&self, segment: TxSegment);
    /// Triggers TASKS_START
    fn start(&self);
    /// Triggers TASKS_STOP
    fn stop(&self);
    /// `true` once EVENTS_END is set
    fn is_end(&self) -> bool;
    fn clear_end(&self);
    /// `true` once EVENTS_STOPPED is set
    fn is_stopped(&self) -> bool;
    fn clear_stopped(&self);
}

impl Registers for RegisterBlock {
    #[inline]
    fn set_enabled(&self, enabled: bool) {
        self.enable.write(|w| {
            if enabled {
                w.enable().enabled()
            } else {
                w.enable().disabled()
            }
        });
    }

    #[inline]
    fn write_frequency(&self, frequency: Frequency) {
        self.frequency
            .write(|w| w.frequency().variant(frequency.into()));
    }

    #[inline]
    fn write_config(&self, config: ConfigBits) {
        self.config.write(|w| {
            if config.contains(ConfigBits::ORDER_LSB_FIRST) {
                w.order().lsb_first();
            } else {
                w.order().msb_first();
            }
            if config.contains(ConfigBits::CPHA_TRAILING) {
                w.cpha().trailing();
            } else {
                w.cpha().leading();
            }
            if config.contains(ConfigBits::CPOL_ACTIVE_LOW) {
                w.cpol().active_low();
            } else {
                w.cpol().active_high();
            }
            w
        });
    }

    #[inline]
    fn write_psel(&self, pins: Pins) {
        // NOTE(unsafe) PSEL takes the pin number and the CONNECT bit as given
        self.psel
            .sck
            .write(|w| unsafe { w.bits(pins.sck.psel_bits()) });
        self.psel
            .mosi
            .write(|w| unsafe { w.bits(pins.sdo.psel_bits()) });
        self.psel
            .miso
            .write(|w| unsafe { w.bits(pins.sdi.psel_bits()) });
    }

    #[inline]
    fn write_rxd(&self, segment: RxSegment) {
        // NOTE(unsafe, cast) EasyDMA addresses are 32 bits wide and a
        // segment never exceeds EASY_DMA_SIZE
        self.rxd
            .ptr
            .write(|w| unsafe { w.ptr().bits(segment.ptr as u32) });
        self.rxd
            .maxcnt
            .write(|w| unsafe { w.maxcnt().bits(segment.len as _) });
    }

    #[inline]
    fn write_txd(&self, segment: TxSegment) {
        self.txd
            .ptr
            .write(|w| unsafe { w.ptr().bits(segment.ptr as u32) });
        self.txd
            .maxcnt
            .write(|w| unsafe { w.maxcnt().bits(segment.len as _) });
    }

    #[inline]
    fn start(&self) {
        self.tasks_start.write(|w| unsafe { w.bits(1) });
    }

    #[inline]
    fn stop(&self) {
        self.tasks_stop.write(|w| unsafe { w.bits(1) });
    }

    #[inline]
    fn is_end(&self) -> bool {
        self.events_end.read().bits() != 0
    }

    #[inline]
    fn clear_end(&self) {
        self.events_end.reset();
    }

    #[inline]
    fn is_stopped(&self) -> bool {
        self.events_stopped.read().bits() != 0
    }

    #[inline]
    fn clear_stopped(&self) {
        self.events_stopped.reset();
    }
}

/// A SPIM instance
pub trait Instance {
    type Registers: Registers;

    /// Pins used when a configuration leaves all three unset
    const DEFAULT_PINS: Pins;

    /// Memory EasyDMA can read from
    const DATA_RAM: Range<usize> = SRAM;

    fn registers(&self) -> &Self::Registers;
}

macro_rules! spim {
    ($($SPIMX:ident,)+) => {
        $(
            impl Instance for $SPIMX {
                type Registers = RegisterBlock;
                const DEFAULT_PINS: Pins = gpio::defaults::$SPIMX;

                #[inline(always)]
                fn registers(&self) -> &RegisterBlock {
                    self
                }
            }
        )+
    };
}

spim!(SPIM0, SPIM1, SPIM2,);

pub trait SpimExt: Sized + Instance {
    fn spim(self, config: impl Into<Config>) -> Spim<Self>;
}

impl<SPIM: Instance> SpimExt for SPIM {
    fn spim(self, config: impl Into<Config>) -> Spim<Self> {
        Spim::new(self, config)
    }
}

/// Spins until `done` returns `true`.
///
/// With `limit` set, `done` is polled at most that many times before giving
/// up with [`Error::Timeout`].
pub fn poll_until(mut done: impl FnMut() -> bool, limit: Option<u32>) -> Result<(), Error> {
    match limit {
        None => {
            while !done() {
                hint::spin_loop();
            }
            Ok(())
        }
        Some(limit) => {
            for _ in 0..limit {
                if done() {
                    return Ok(());
                }
                hint::spin_loop();
            }
            Err(Error::Timeout)
        }
    }
}

/// Blocking SPI master
pub struct Spim<SPIM> {
    spim: SPIM,
    timeout: Option<u32>,
}

impl<SPIM: Instance> Spim<SPIM> {
    /// Takes ownership of the instance and programs it with `config`
    pub fn new(spim: SPIM, config: impl Into<Config>) -> Self {
        let mut spim = Spim {
            spim,
            timeout: None,
        };
        spim.configure(config.into());
        spim
    }

    /// Reprograms clock, mode, bit order and pins.
    ///
    /// The peripheral is disabled while the registers are rewritten.
    pub fn configure(&mut self, config: Config) {
        let encoded = config.encode(SPIM::DEFAULT_PINS);
        let regs = self.spim.registers();

        regs.set_enabled(false);
        regs.write_frequency(encoded.frequency);
        regs.write_config(encoded.config);
        regs.write_psel(encoded.pins);
        regs.set_enabled(true);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "spim configured: {}, CONFIG={=u32:#x}, {}",
            encoded.frequency,
            encoded.config.bits(),
            encoded.pins
        );
    }

    /// Bounds the wait for each segment to `polls` reads of the END event.
    /// `None`, the default, waits forever.
    pub fn set_timeout(&mut self, polls: Option<u32>) {
        self.timeout = polls;
    }

    pub fn timeout(&self) -> Option<u32> {
        self.timeout
    }

    /// Sends `word` and returns the byte clocked in at the same time
    pub fn transfer(&mut self, word: u8) -> Result<u8, Error> {
        let mut read = [0u8; 1];
        self.tx(&[word], &mut read)?;
        Ok(read[0])
    }

    /// Full duplex transfer of `write` and `read`.
    ///
    /// Lengths may differ. Once `write` runs out the peripheral clocks out
    /// its over-read character; bytes received past the end of `read` are
    /// dropped. Returns once both buffers are done.
    ///
    /// Parts of `write` outside data RAM are copied to the stack first.
    pub fn tx(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), Error> {
        let mut write = write;
        let mut read = read;
        let mut staged = [0u8; EASY_DMA_SIZE];

        while !read.is_empty() || !write.is_empty() {
            let rx = next_rx(&mut read, EASY_DMA_SIZE);
            let mut chunk = next_tx(&mut write, EASY_DMA_SIZE);
            if !chunk.is_empty() && !slice_in_ram(chunk, &SPIM::DATA_RAM) {
                let staged = &mut staged[..chunk.len()];
                staged.copy_from_slice(chunk);
                chunk = &*staged;
            }
            self.segment(TxSegment::from(chunk), rx)?;
        }

        Ok(())
    }

    /// Exchanges `words` in place
    pub fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Error> {
        // EasyDMA reads and writes RAM independently, stage what goes out
        let mut staged = [0u8; EASY_DMA_SIZE];
        for chunk in words.chunks_mut(EASY_DMA_SIZE) {
            let staged = &mut staged[..chunk.len()];
            staged.copy_from_slice(chunk);
            self.tx(staged, chunk)?;
        }
        Ok(())
    }

    fn segment(&mut self, tx: TxSegment, rx: RxSegment) -> Result<(), Error> {
        let regs = self.spim.registers();

        regs.write_rxd(rx);
        regs.write_txd(tx);

        // buffer contents must be in RAM before EasyDMA picks them up
        atomic::compiler_fence(Ordering::Release);
        regs.start();

        if let Err(e) = poll_until(|| regs.is_end(), self.timeout) {
            // EasyDMA keeps writing to RAM until STOPPED
            regs.stop();
            while !regs.is_stopped() {
                hint::spin_loop();
            }
            regs.clear_end();
            regs.clear_stopped();
            atomic::compiler_fence(Ordering::Acquire);
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "spim segment (tx {=usize}, rx {=usize}) timed out",
                tx.len,
                rx.len
            );
            return Err(e);
        }
        regs.clear_end();

        atomic::compiler_fence(Ordering::Acquire);
        Ok(())
    }

    /// Disables the peripheral and gives the instance back
    pub fn release(self) -> SPIM {
        self.spim.registers().set_enabled(false);
        self.spim
    }
}
