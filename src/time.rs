//! Time units
//!
//! Frequencies are [`fugit`] rates. The [`U32Ext`] trait adds `.Hz()`,
//! `.kHz()` and `.MHz()` to `u32`:
//!
//! ```rust
//! use nrf528xx_spim::prelude::*;
//! use nrf528xx_spim::time::Hertz;
//!
//! let a: Hertz = 2.MHz();
//! let b: Hertz = 2_000.kHz();
//! assert_eq!(a, b);
//! ```

pub use fugit::{
    HertzU32 as Hertz, KilohertzU32 as KiloHertz, MegahertzU32 as MegaHertz,
    RateExtU32 as U32Ext,
};
