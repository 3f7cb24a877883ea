// Licensed under the Apache-2.0 license

//! Blocking SPI controller implementing `embedded_hal::spi::SpiBus`
//! on top of [`SpiPort`].
//!
//! Every word is exchanged with a polled write-then-read of the data
//! register, bounded by the configured retry budget. 16-bit frame
//! configurations are served by the interrupt-driven port directly;
//! the bus trait here is the 8-bit one.

use embedded_hal::spi::SpiBus;

use crate::common::{Logger, NoOpLogger, TransferEvents};
use crate::spi::bus::{Instance, SpiPort};

const DUMMY_FRAME: u8 = 0xFF;

pub struct SpiController<I: Instance, E: TransferEvents, L: Logger = NoOpLogger> {
    pub hardware: SpiPort<I, E>,
    pub logger: L,
}

impl<I: Instance, E: TransferEvents> SpiController<I, E> {
    #[must_use]
    pub fn new(hardware: SpiPort<I, E>) -> Self {
        Self {
            hardware,
            logger: NoOpLogger,
        }
    }
}

impl<I: Instance, E: TransferEvents, L: Logger> SpiController<I, E, L> {
    #[must_use]
    pub fn with_logger(hardware: SpiPort<I, E>, logger: L) -> Self {
        Self { hardware, logger }
    }
}

impl<I: Instance, E: TransferEvents, L: Logger> embedded_hal::spi::ErrorType
    for SpiController<I, E, L>
{
    type Error = crate::spi::common::Error;
}

impl<I: Instance, E: TransferEvents, L: Logger> SpiBus<u8> for SpiController<I, E, L> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.hardware.transfer_frame_polled(DUMMY_FRAME)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            let _ = self.hardware.transfer_frame_polled(word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let out = write.get(i).copied().unwrap_or(DUMMY_FRAME);
            let input = self.hardware.transfer_frame_polled(out)?;
            if let Some(slot) = read.get_mut(i) {
                *slot = input;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.hardware.transfer_frame_polled(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.hardware.flush_polled()
    }
}
