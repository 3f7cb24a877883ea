// Licensed under the Apache-2.0 license

use embedded_hal::i2c::I2c;
use embedded_io::Write;

use crate::common::{Logger, TransferEvents};
use crate::i2c;
use crate::i2c::I2cController;
use crate::uart;
use crate::uart::UartController;

/// Probe every 7-bit address with an empty write and report which
/// devices acknowledged.
pub fn run<U, UE, I, E, L>(
    console: &mut UartController<U, UE>,
    controller: &mut I2cController<I, E, L>,
) where
    U: uart::Instance,
    UE: TransferEvents,
    I: i2c::Instance,
    E: TransferEvents,
    L: Logger,
{
    writeln!(console, "Scanning I2C bus...\r").unwrap();

    let mut found = 0u32;
    for address in 0x08u8..0x78 {
        if controller.write(address, &[]).is_ok() {
            writeln!(console, "  device at 0x{address:02X}\r").unwrap();
            found += 1;
        }
    }

    writeln!(console, "Scan complete, {found} device(s)\r").unwrap();
}
