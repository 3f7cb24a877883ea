// Licensed under the Apache-2.0 license

//! Blocking I2C controller implementing the embedded-hal traits on top
//! of [`I2cBus`].
//!
//! The blocking operations run the same register sequences as the
//! interrupt-driven paths but poll synchronously with the configured
//! retry budget, so they never require `'static` buffers. Each
//! operation of a transaction is executed as its own start..stop
//! transfer.

use embedded_hal::i2c::{Operation, SevenBitAddress};

use crate::common::{Logger, NoOpLogger, TransferEvents};
use crate::i2c::bus::{I2cBus, Instance};

pub struct I2cController<I: Instance, E: TransferEvents, L: Logger = NoOpLogger> {
    pub hardware: I2cBus<I, E>,
    pub logger: L,
}

impl<I: Instance, E: TransferEvents> I2cController<I, E> {
    #[must_use]
    pub fn new(hardware: I2cBus<I, E>) -> Self {
        Self {
            hardware,
            logger: NoOpLogger,
        }
    }
}

impl<I: Instance, E: TransferEvents, L: Logger> I2cController<I, E, L> {
    #[must_use]
    pub fn with_logger(hardware: I2cBus<I, E>, logger: L) -> Self {
        Self { hardware, logger }
    }
}

impl<I: Instance, E: TransferEvents, L: Logger> embedded_hal::i2c::ErrorType
    for I2cController<I, E, L>
{
    type Error = crate::i2c::common::Error;
}

impl<I: Instance, E: TransferEvents, L: Logger> embedded_hal::i2c::I2c
    for I2cController<I, E, L>
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::Read(buffer) => self.hardware.read_polled(address, buffer)?,
                Operation::Write(bytes) => self.hardware.write_polled(address, bytes)?,
            }
        }
        Ok(())
    }
}
