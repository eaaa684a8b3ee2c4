use super::{Error, Instance, Spim};
pub use embedded_hal::spi::{ErrorKind, ErrorType};

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout => ErrorKind::Other,
        }
    }
}

impl<SPIM: Instance> ErrorType for Spim<SPIM> {
    type Error = Error;
}

mod blocking {
    use super::super::{Instance, Spim};
    use embedded_hal::spi::SpiBus;

    impl<SPIM: Instance> SpiBus<u8> for Spim<SPIM> {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            self.tx(&[], words)
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.tx(words, &mut [])
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            self.tx(write, read)
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            Spim::transfer_in_place(self, words)
        }

        // every transfer has completed by the time it returns
        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::sim::SimSpim;
    use super::super::{Config, Error, Spim};
    use embedded_hal::spi::{Error as _, ErrorKind, SpiBus};

    #[test]
    fn bus_methods_map_to_segments() {
        let mut spi = Spim::new(SimSpim::new(), Config::default());

        let mut read = [0xeeu8; 3];
        SpiBus::read(&mut spi, &mut read).unwrap();
        assert_eq!(read, [0, 0, 0]);

        SpiBus::write(&mut spi, &[1, 2]).unwrap();

        let mut read = [0u8; 4];
        SpiBus::transfer(&mut spi, &mut read, &[9, 8]).unwrap();
        assert_eq!(read, [9, 8, 0, 0]);

        let mut words = [5u8, 6, 7];
        SpiBus::transfer_in_place(&mut spi, &mut words).unwrap();
        assert_eq!(words, [5, 6, 7]);

        SpiBus::flush(&mut spi).unwrap();

        assert_eq!(
            spi.release().segments(),
            [(0, 3), (2, 0), (2, 4), (3, 3)]
        );
    }

    #[test]
    fn timeout_kind() {
        assert_eq!(Error::Timeout.kind(), ErrorKind::Other);
    }
}
