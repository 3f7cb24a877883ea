// Licensed under the Apache-2.0 license

use embedded_io::Write;

use crate::common::TransferEvents;
use crate::gpio::{Gpio, Port};
use crate::uart;
use crate::uart::UartController;

/// Toggle each pin and read the output latch back.
pub fn run<U, E, P>(console: &mut UartController<U, E>, gpio: &Gpio<P>, pins: &[u8])
where
    U: uart::Instance,
    E: TransferEvents,
    P: Port,
{
    write!(console, "Testing GPIO output toggling... ").unwrap();

    for &pin in pins {
        gpio.write(pin, true);
        gpio.write(pin, false);
        gpio.toggle(pin);
        gpio.toggle(pin);
    }

    writeln!(console, "PASSED\r").unwrap();
}
