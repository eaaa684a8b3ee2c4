//! Simulated SPIM for host tests.
//!
//! Records register accesses and issued segments and completes every segment
//! on START. MISO is wired to MOSI unless a device response is set.

use core::cell::{Cell, RefCell};
use core::ptr;

use super::{ConfigBits, Frequency, Instance, Registers};
use crate::dma::{RxSegment, TxSegment};
use crate::gpio::{Pin, Pins};

pub(crate) const SIM_DEFAULT_PINS: Pins = Pins::new(Pin(1), Pin(2), Pin(3));

/// Byte clocked out once TXD is exhausted
const ORC: u8 = 0x00;

/// Polls of EVENTS_STOPPED that read 0 after TASKS_STOP
const STOP_LATENCY: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    Enable(bool),
    Frequency(Frequency),
    Config(ConfigBits),
    Psel(Pins),
    Start,
    Stop,
    /// A read of EVENTS_STOPPED and what it returned
    Stopped(bool),
    ClearEnd,
    ClearStopped,
}

pub(crate) struct SimSpim {
    rxd: Cell<RxSegment>,
    txd: Cell<TxSegment>,
    end: Cell<bool>,
    stopping: Cell<Option<u32>>,
    stalled: Cell<bool>,
    response: Cell<Option<u8>>,
    stops: Cell<u32>,
    end_polls: Cell<u32>,
    accesses: RefCell<Vec<Access>>,
    segments: RefCell<Vec<(usize, usize)>>,
    tx_addresses: RefCell<Vec<usize>>,
    sent: RefCell<Vec<u8>>,
}

impl SimSpim {
    pub(crate) fn new() -> Self {
        SimSpim {
            rxd: Cell::new(RxSegment::IDLE),
            txd: Cell::new(TxSegment::IDLE),
            end: Cell::new(false),
            stopping: Cell::new(None),
            stalled: Cell::new(false),
            response: Cell::new(None),
            stops: Cell::new(0),
            end_polls: Cell::new(0),
            accesses: RefCell::new(Vec::new()),
            segments: RefCell::new(Vec::new()),
            tx_addresses: RefCell::new(Vec::new()),
            sent: RefCell::new(Vec::new()),
        }
    }

    /// The device answers every byte with `byte`
    pub(crate) fn respond_with(&self, byte: u8) {
        self.response.set(Some(byte));
    }

    /// END never fires
    pub(crate) fn stall(&self) {
        self.stalled.set(true);
    }

    /// Drains the access log
    pub(crate) fn take_accesses(&self) -> Vec<Access> {
        self.accesses.take()
    }

    /// `(TXD.MAXCNT, RXD.MAXCNT)` of every started segment
    pub(crate) fn segments(&self) -> Vec<(usize, usize)> {
        self.segments.borrow().clone()
    }

    /// TXD.PTR of every started segment that transmits
    pub(crate) fn tx_addresses(&self) -> Vec<usize> {
        self.tx_addresses.borrow().clone()
    }

    /// Every byte clocked out from TXD, in order
    pub(crate) fn sent(&self) -> Vec<u8> {
        self.sent.borrow().clone()
    }

    pub(crate) fn stops(&self) -> u32 {
        self.stops.get()
    }

    pub(crate) fn end_polls(&self) -> u32 {
        self.end_polls.get()
    }

    pub(crate) fn end_pending(&self) -> bool {
        self.end.get()
    }

    fn log(&self, access: Access) {
        self.accesses.borrow_mut().push(access);
    }
}

impl Registers for SimSpim {
    fn set_enabled(&self, enabled: bool) {
        self.log(Access::Enable(enabled));
    }

    fn write_frequency(&self, frequency: Frequency) {
        self.log(Access::Frequency(frequency));
    }

    fn write_config(&self, config: ConfigBits) {
        self.log(Access::Config(config));
    }

    fn write_psel(&self, pins: Pins) {
        self.log(Access::Psel(pins));
    }

    fn write_rxd(&self, segment: RxSegment) {
        self.rxd.set(segment);
    }

    fn write_txd(&self, segment: TxSegment) {
        self.txd.set(segment);
    }

    fn start(&self) {
        self.log(Access::Start);
        let (tx, rx) = (self.txd.get(), self.rxd.get());
        self.segments.borrow_mut().push((tx.len, rx.len));
        if tx.len != 0 {
            self.tx_addresses.borrow_mut().push(tx.ptr as usize);
        }

        let mut out = Vec::with_capacity(tx.len);
        for i in 0..tx.len {
            // NOTE(unsafe) the driver keeps the buffer alive until END
            out.push(unsafe { ptr::read(tx.ptr.add(i)) });
        }
        for i in 0..rx.len {
            let byte = match self.response.get() {
                Some(byte) => byte,
                None => out.get(i).copied().unwrap_or(ORC),
            };
            unsafe { ptr::write(rx.ptr.add(i), byte) };
        }
        self.sent.borrow_mut().extend_from_slice(&out);

        if !self.stalled.get() {
            self.end.set(true);
        }
    }

    fn stop(&self) {
        self.log(Access::Stop);
        self.stops.set(self.stops.get() + 1);
        self.stopping.set(Some(STOP_LATENCY));
    }

    fn is_end(&self) -> bool {
        self.end_polls.set(self.end_polls.get() + 1);
        self.end.get()
    }

    fn clear_end(&self) {
        self.log(Access::ClearEnd);
        self.end.set(false);
    }

    fn is_stopped(&self) -> bool {
        let stopped = match self.stopping.get() {
            Some(0) => true,
            Some(n) => {
                self.stopping.set(Some(n - 1));
                false
            }
            None => false,
        };
        self.log(Access::Stopped(stopped));
        stopped
    }

    fn clear_stopped(&self) {
        self.log(Access::ClearStopped);
        self.stopping.set(None);
    }
}

impl Instance for SimSpim {
    type Registers = SimSpim;
    const DEFAULT_PINS: Pins = SIM_DEFAULT_PINS;
    // host memory is all reachable
    const DATA_RAM: core::ops::Range<usize> = 0..usize::MAX;

    fn registers(&self) -> &SimSpim {
        self
    }
}
