use core::slice;

use embedded_dma::{ReadBuffer, WriteBuffer};

use super::{Error, Instance, Spim};

impl<SPIM: Instance> Spim<SPIM> {
    /// Runs [`Spim::tx`] on owned DMA buffers and hands them back.
    ///
    /// On failure the buffers come back alongside the error.
    #[allow(clippy::type_complexity)]
    pub fn dma_transfer<TXB, RXB>(
        &mut self,
        tx: TXB,
        mut rx: RXB,
    ) -> Result<(TXB, RXB), (Error, TXB, RXB)>
    where
        TXB: ReadBuffer<Word = u8>,
        RXB: WriteBuffer<Word = u8>,
    {
        // NOTE(unsafe) We own both buffers and don't touch them until the
        // transfer has returned.
        let (tx_ptr, tx_len) = unsafe { tx.read_buffer() };
        let (rx_ptr, rx_len) = unsafe { rx.write_buffer() };
        let (write, read) = unsafe {
            (
                slice::from_raw_parts(tx_ptr, tx_len),
                slice::from_raw_parts_mut(rx_ptr, rx_len),
            )
        };

        match self.tx(write, read) {
            Ok(()) => Ok((tx, rx)),
            Err(e) => Err((e, tx, rx)),
        }
    }
}
