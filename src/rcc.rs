// Licensed under the Apache-2.0 license

//! Peripheral clock gating.
//!
//! The serial drivers never touch the clock tree themselves; the
//! application enables the clocks it needs before driving a
//! peripheral, mirroring the split in the register-level drivers this
//! crate grew from.

use tock_registers::interfaces::{Readable, Writeable};

use crate::regs;

/// Clock gates this crate knows how to switch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PeripheralClock {
    GpioA,
    GpioB,
    GpioC,
    GpioD,
    GpioE,
    GpioF,
    GpioG,
    GpioH,
    GpioI,
    I2c1,
    I2c2,
    I2c3,
    Spi1,
    Spi2,
    Spi3,
    Usart1,
    Usart2,
    Usart3,
    Uart4,
    Uart5,
    Usart6,
    Syscfg,
}

enum Bus {
    Ahb1,
    Apb1,
    Apb2,
}

impl PeripheralClock {
    fn route(self) -> (Bus, u32) {
        match self {
            PeripheralClock::GpioA => (Bus::Ahb1, 0),
            PeripheralClock::GpioB => (Bus::Ahb1, 1),
            PeripheralClock::GpioC => (Bus::Ahb1, 2),
            PeripheralClock::GpioD => (Bus::Ahb1, 3),
            PeripheralClock::GpioE => (Bus::Ahb1, 4),
            PeripheralClock::GpioF => (Bus::Ahb1, 5),
            PeripheralClock::GpioG => (Bus::Ahb1, 6),
            PeripheralClock::GpioH => (Bus::Ahb1, 7),
            PeripheralClock::GpioI => (Bus::Ahb1, 8),
            PeripheralClock::Spi2 => (Bus::Apb1, 14),
            PeripheralClock::Spi3 => (Bus::Apb1, 15),
            PeripheralClock::Usart2 => (Bus::Apb1, 17),
            PeripheralClock::Usart3 => (Bus::Apb1, 18),
            PeripheralClock::Uart4 => (Bus::Apb1, 19),
            PeripheralClock::Uart5 => (Bus::Apb1, 20),
            PeripheralClock::I2c1 => (Bus::Apb1, 21),
            PeripheralClock::I2c2 => (Bus::Apb1, 22),
            PeripheralClock::I2c3 => (Bus::Apb1, 23),
            PeripheralClock::Usart1 => (Bus::Apb2, 4),
            PeripheralClock::Usart6 => (Bus::Apb2, 5),
            PeripheralClock::Spi1 => (Bus::Apb2, 12),
            PeripheralClock::Syscfg => (Bus::Apb2, 14),
        }
    }
}

/// Owner of the RCC register block.
pub struct Rcc {
    regs: regs::Rcc,
}

impl Rcc {
    #[must_use]
    pub fn new(regs: regs::Rcc) -> Self {
        Self { regs }
    }

    pub fn enable(&mut self, clock: PeripheralClock) {
        let (bus, bit) = clock.route();
        let reg = match bus {
            Bus::Ahb1 => &self.regs.ahb1enr,
            Bus::Apb1 => &self.regs.apb1enr,
            Bus::Apb2 => &self.regs.apb2enr,
        };
        reg.set(reg.get() | (1 << bit));
    }

    pub fn disable(&mut self, clock: PeripheralClock) {
        let (bus, bit) = clock.route();
        let reg = match bus {
            Bus::Ahb1 => &self.regs.ahb1enr,
            Bus::Apb1 => &self.regs.apb1enr,
            Bus::Apb2 => &self.regs.apb2enr,
        };
        reg.set(reg.get() & !(1 << bit));
    }

    pub fn is_enabled(&self, clock: PeripheralClock) -> bool {
        let (bus, bit) = clock.route();
        let reg = match bus {
            Bus::Ahb1 => &self.regs.ahb1enr,
            Bus::Apb1 => &self.regs.apb1enr,
            Bus::Apb2 => &self.regs.apb2enr,
        };
        reg.get() & (1 << bit) != 0
    }

    pub fn release(self) -> regs::Rcc {
        self.regs
    }
}
