//! # Pin identifiers
//!
//! The SPIM routes its signals to any GPIO through the `PSEL` registers, so a
//! pin is nothing more than the value written there: `0..=31` on port 0 and
//! `32..=47` on port 1 of the larger parts. The value is written unchanged.
//!
//! A bus configured with three [`Pin::NONE`] pins falls back to the board
//! defaults in [`defaults`]. A signal the bus does not need, such as data in
//! on a write-only bus, can be left unrouted with [`Pin::DISCONNECTED`].

/// GPIO pin, as written to a `PSEL` register
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin(pub u32);

impl Pin {
    /// The unset pin. Also P0.00, which is why only the all-zero triple is
    /// treated as "no pins given".
    pub const NONE: Pin = Pin(0);

    /// Signal not routed to any GPIO (`PSEL.CONNECT`)
    pub const DISCONNECTED: Pin = Pin(1 << 31);

    /// Pin `pin` of port `port`
    pub const fn new(port: u8, pin: u8) -> Self {
        Pin(port as u32 * 32 + pin as u32)
    }

    pub const fn port(self) -> u32 {
        self.0 / 32
    }

    pub const fn pin(self) -> u32 {
        self.0 % 32
    }

    pub const fn is_connected(self) -> bool {
        self.0 & Self::DISCONNECTED.0 == 0
    }

    /// `PSEL` register value for this pin
    pub const fn psel_bits(self) -> u32 {
        self.0
    }
}

impl From<u32> for Pin {
    fn from(n: u32) -> Self {
        Pin(n)
    }
}

impl From<u8> for Pin {
    fn from(n: u8) -> Self {
        Pin(n.into())
    }
}

/// Clock, data out and data in pins of one bus
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pins {
    pub sck: Pin,
    /// MOSI
    pub sdo: Pin,
    /// MISO
    pub sdi: Pin,
}

impl Pins {
    pub const fn new(sck: Pin, sdo: Pin, sdi: Pin) -> Self {
        Pins { sck, sdo, sdi }
    }

    /// `true` for the all-zero sentinel triple
    pub const fn is_unset(&self) -> bool {
        self.sck.0 == 0 && self.sdo.0 == 0 && self.sdi.0 == 0
    }

    /// `self`, or `defaults` if `self` is the sentinel triple
    pub const fn or(self, defaults: Pins) -> Pins {
        if self.is_unset() {
            defaults
        } else {
            self
        }
    }
}

/// Default pins per bus, matching the free header pins of the nRF52 DK
/// (PCA10040)
pub mod defaults {
    use super::{Pin, Pins};

    pub const SPIM0: Pins = Pins::new(Pin::new(0, 25), Pin::new(0, 23), Pin::new(0, 24));
    pub const SPIM1: Pins = Pins::new(Pin::new(0, 27), Pin::new(0, 26), Pin::new(0, 2));
    pub const SPIM2: Pins = Pins::new(Pin::new(0, 3), Pin::new(0, 4), Pin::new(0, 28));
}
