//! # SPI master driver for the nRF528xx family of microcontrollers
//!
//! This is a blocking driver for the SPIM peripheral (SPI master with
//! EasyDMA) of the nRF52832 and its relatives, implementing the
//! [`embedded-hal`] SPI traits.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//!
//! # Usage
//!
//! Take the peripherals once, then turn a SPIM token into a bus by giving it
//! a [`spim::Config`]:
//!
//! ```rust,ignore
//! #![no_std]
//! #![no_main]
//!
//! use panic_halt as _;
//!
//! use cortex_m_rt::entry;
//! use nrf528xx_spim::{
//!     gpio::{Pin, Pins},
//!     pac,
//!     prelude::*,
//!     spim::{Config, MODE_0},
//! };
//!
//! #[entry]
//! fn main() -> ! {
//!     let dp = pac::Peripherals::take().unwrap();
//!
//!     let mut spi = dp.SPIM0.spim(
//!         Config::default()
//!             .frequency(8.MHz())
//!             .spi_mode(MODE_0)
//!             .pins(Pins::new(Pin(25), Pin(23), Pin(24))),
//!     );
//!
//!     // Data out wired back to data in echoes every byte
//!     let echo = spi.transfer(0x5a).unwrap();
//!     assert_eq!(echo, 0x5a);
//!
//!     loop {}
//! }
//! ```
//!
//! Transfers of any length are split into segments the EasyDMA engine can
//! take, see the [`spim`] module for the details.

#![cfg_attr(not(test), no_std)]

pub use nrf52832_pac as pac;

pub mod dma;
pub mod gpio;
pub mod prelude;
pub mod spim;
pub mod time;
