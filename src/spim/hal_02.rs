use super::{Config, Error, Instance, Mode, Phase, Polarity, Spim};

use embedded_hal_02::{blocking::spi as blocking, spi};

fn polarity(p: spi::Polarity) -> Polarity {
    match p {
        spi::Polarity::IdleLow => Polarity::IdleLow,
        spi::Polarity::IdleHigh => Polarity::IdleHigh,
    }
}

fn phase(p: spi::Phase) -> Phase {
    match p {
        spi::Phase::CaptureOnFirstTransition => Phase::CaptureOnFirstTransition,
        spi::Phase::CaptureOnSecondTransition => Phase::CaptureOnSecondTransition,
    }
}

impl From<spi::Mode> for Config {
    fn from(m: spi::Mode) -> Self {
        Config::from(Mode {
            polarity: polarity(m.polarity),
            phase: phase(m.phase),
        })
    }
}

impl<SPIM: Instance> blocking::Transfer<u8> for Spim<SPIM> {
    type Error = Error;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Error> {
        self.transfer_in_place(words)?;
        Ok(words)
    }
}

impl<SPIM: Instance> blocking::Write<u8> for Spim<SPIM> {
    type Error = Error;

    fn write(&mut self, words: &[u8]) -> Result<(), Error> {
        self.tx(words, &mut [])
    }
}

#[cfg(test)]
mod tests {
    use super::super::sim::SimSpim;
    use super::*;

    #[test]
    fn blocking_traits() {
        let mut bus = Spim::new(SimSpim::new(), spi::MODE_3);

        let mut words = [0x10u8, 0x20];
        let echoed = blocking::Transfer::transfer(&mut bus, &mut words).unwrap();
        assert_eq!(echoed, [0x10, 0x20]);

        blocking::Write::write(&mut bus, &[0u8; 256]).unwrap();

        assert_eq!(bus.release().segments(), [(2, 2), (255, 0), (1, 0)]);
    }

    #[test]
    fn hal_02_modes() {
        assert_eq!(Config::from(spi::MODE_0).mode, 0);
        assert_eq!(Config::from(spi::MODE_1).mode, 1);
        assert_eq!(Config::from(spi::MODE_2).mode, 2);
        assert_eq!(Config::from(spi::MODE_3).mode, 3);
    }
}
