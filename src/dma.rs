//! # EasyDMA segments
//!
//! The SPIM moves data straight between RAM and the shift register. One
//! transaction is described by a pointer and a byte count per direction, and
//! the count register of the nRF52832 is 8 bits wide, so a buffer longer
//! than [`EASY_DMA_SIZE`] has to be carved into several transactions.
//!
//! The helpers here take the next chunk off the front of a remaining
//! buffer and advance it. The read and write sides are advanced
//! independently of each other.
//!
//! EasyDMA can only reach data RAM. A write buffer placed anywhere else,
//! typically a constant in flash, has to be copied before it goes out.

use core::ops::Range;
use core::ptr;

/// Largest number of bytes one EasyDMA transaction can move per direction
pub const EASY_DMA_SIZE: usize = (1 << 8) - 1;

/// Address range of the data RAM
pub const SRAM: Range<usize> = 0x2000_0000..0x3000_0000;

/// Transmit half of a hardware segment: TXD.PTR and TXD.MAXCNT
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxSegment {
    pub ptr: *const u8,
    pub len: usize,
}

/// Receive half of a hardware segment: RXD.PTR and RXD.MAXCNT
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RxSegment {
    pub ptr: *mut u8,
    pub len: usize,
}

impl TxSegment {
    /// Direction inactive for this segment
    pub const IDLE: Self = TxSegment {
        ptr: ptr::null(),
        len: 0,
    };
}

impl RxSegment {
    /// Direction inactive for this segment
    pub const IDLE: Self = RxSegment {
        ptr: ptr::null_mut(),
        len: 0,
    };
}

impl From<&[u8]> for TxSegment {
    fn from(chunk: &[u8]) -> Self {
        if chunk.is_empty() {
            return TxSegment::IDLE;
        }
        TxSegment {
            ptr: chunk.as_ptr(),
            len: chunk.len(),
        }
    }
}

impl From<&mut [u8]> for RxSegment {
    fn from(chunk: &mut [u8]) -> Self {
        if chunk.is_empty() {
            return RxSegment::IDLE;
        }
        RxSegment {
            ptr: chunk.as_mut_ptr(),
            len: chunk.len(),
        }
    }
}

/// Does `slice` lie entirely within `ram`?
pub fn slice_in_ram(slice: &[u8], ram: &Range<usize>) -> bool {
    let start = slice.as_ptr() as usize;
    match start.checked_add(slice.len()) {
        Some(end) => start >= ram.start && end <= ram.end,
        None => false,
    }
}

/// Takes up to `max` bytes off the front of `remaining`
pub(crate) fn next_tx<'a>(remaining: &mut &'a [u8], max: usize) -> &'a [u8] {
    let current: &'a [u8] = *remaining;
    let (head, tail) = current.split_at(current.len().min(max));
    *remaining = tail;
    head
}

/// Takes up to `max` bytes off the front of `remaining`
pub(crate) fn next_rx<'a>(remaining: &mut &'a mut [u8], max: usize) -> RxSegment {
    let n = remaining.len().min(max);
    let (head, tail) = core::mem::take(remaining).split_at_mut(n);
    *remaining = tail;
    RxSegment::from(head)
}
