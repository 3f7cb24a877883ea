// Licensed under the Apache-2.0 license

//! GPIO port driver and EXTI edge-interrupt wiring.
//!
//! Plain pin I/O for the demo application plus the alternate-function
//! configuration the serial buses need on their pins. The serial
//! drivers never call into this module; only application wiring does.

use core::ops::Deref;

use tock_registers::interfaces::{Readable, Writeable};

use crate::regs;
use crate::regs::gpio::RegisterBlock;

/// One of the nine GPIO ports.
pub trait Port: Deref<Target = RegisterBlock> {}

impl Port for regs::GpioA {}
impl Port for regs::GpioB {}
impl Port for regs::GpioC {}
impl Port for regs::GpioD {}
impl Port for regs::GpioE {}
impl Port for regs::GpioF {}
impl Port for regs::GpioG {}
impl Port for regs::GpioH {}
impl Port for regs::GpioI {}

pub const PINS_PER_PORT: u8 = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Input = 0b00,
    Output = 0b01,
    Alternate = 0b10,
    Analog = 0b11,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputType {
    PushPull = 0,
    OpenDrain = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pull {
    None = 0b00,
    Up = 0b01,
    Down = 0b10,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Speed {
    Low = 0b00,
    Medium = 0b01,
    High = 0b10,
    VeryHigh = 0b11,
}

/// Filled by the application and handed to [`Gpio::configure`].
#[derive(Copy, Clone, Debug)]
pub struct PinConfig {
    pub mode: Mode,
    pub output_type: OutputType,
    pub pull: Pull,
    pub speed: Speed,
    /// Alternate function number, used when `mode` is [`Mode::Alternate`].
    pub alternate: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Input,
            output_type: OutputType::PushPull,
            pull: Pull::None,
            speed: Speed::Low,
            alternate: 0,
        }
    }
}

impl PinConfig {
    #[must_use]
    pub fn output() -> Self {
        Self {
            mode: Mode::Output,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn alternate(af: u8) -> Self {
        Self {
            mode: Mode::Alternate,
            speed: Speed::High,
            alternate: af,
            ..Self::default()
        }
    }
}

/// Driver for one GPIO port.
pub struct Gpio<P: Port> {
    port: P,
}

fn set_field(value: u32, pin: u8, width: u8, field: u32) -> u32 {
    let shift = u32::from(pin) * u32::from(width);
    let mask = (1u32 << width) - 1;
    (value & !(mask << shift)) | ((field & mask) << shift)
}

impl<P: Port> Gpio<P> {
    #[must_use]
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Program mode, output type, pull, speed and alternate function
    /// for one pin. Pins above 15 are ignored.
    pub fn configure(&mut self, pin: u8, config: &PinConfig) {
        if pin >= PINS_PER_PORT {
            return;
        }
        let regs = &*self.port;
        regs.moder
            .set(set_field(regs.moder.get(), pin, 2, config.mode as u32));
        regs.otyper
            .set(set_field(regs.otyper.get(), pin, 1, config.output_type as u32));
        regs.ospeedr
            .set(set_field(regs.ospeedr.get(), pin, 2, config.speed as u32));
        regs.pupdr
            .set(set_field(regs.pupdr.get(), pin, 2, config.pull as u32));
        if config.mode == Mode::Alternate {
            let af = u32::from(config.alternate & 0x0F);
            if pin < 8 {
                regs.afrl.set(set_field(regs.afrl.get(), pin, 4, af));
            } else {
                regs.afrh.set(set_field(regs.afrh.get(), pin - 8, 4, af));
            }
        }
    }

    /// Drive a pin through the atomic set/reset register.
    pub fn write(&self, pin: u8, high: bool) {
        if pin >= PINS_PER_PORT {
            return;
        }
        if high {
            self.port.bsrr.set(1 << pin);
        } else {
            self.port.bsrr.set(1 << (u32::from(pin) + 16));
        }
    }

    #[must_use]
    pub fn read(&self, pin: u8) -> bool {
        self.port.idr.get() & (1 << pin) != 0
    }

    pub fn toggle(&self, pin: u8) {
        let high = self.port.odr.get() & (1 << pin) != 0;
        self.write(pin, !high);
    }

    pub fn release(self) -> P {
        self.port
    }
}

/// Single-pin view implementing the embedded-hal digital traits.
pub struct PinDriver<'a, P: Port> {
    gpio: &'a Gpio<P>,
    pin: u8,
}

impl<'a, P: Port> PinDriver<'a, P> {
    #[must_use]
    pub fn new(gpio: &'a Gpio<P>, pin: u8) -> Self {
        Self { gpio, pin }
    }
}

impl<P: Port> embedded_hal::digital::ErrorType for PinDriver<'_, P> {
    type Error = core::convert::Infallible;
}

impl<P: Port> embedded_hal::digital::OutputPin for PinDriver<'_, P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.gpio.write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.gpio.write(self.pin, true);
        Ok(())
    }
}

impl<P: Port> embedded_hal::digital::StatefulOutputPin for PinDriver<'_, P> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.gpio.port.odr.get() & (1 << self.pin) != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

impl<P: Port> embedded_hal::digital::InputPin for PinDriver<'_, P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.gpio.read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Edge selection for an EXTI line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    RisingFalling,
}

/// Port selector for the SYSCFG EXTI routing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortId {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
    I = 8,
}

/// Owner of the EXTI and SYSCFG blocks, wiring pins to interrupt lines.
pub struct ExtiController {
    exti: regs::Exti,
    syscfg: regs::Syscfg,
}

impl ExtiController {
    #[must_use]
    pub fn new(exti: regs::Exti, syscfg: regs::Syscfg) -> Self {
        Self { exti, syscfg }
    }

    /// Route `port`/`pin` onto EXTI line `pin` and select the trigger
    /// edge. The SYSCFG clock must already be enabled.
    pub fn configure_interrupt(&mut self, port: PortId, pin: u8, edge: Edge) {
        if pin >= PINS_PER_PORT {
            return;
        }
        if let Some(cr) = self.syscfg.exticr.get(usize::from(pin / 4)) {
            let shift = u32::from(pin % 4) * 4;
            let value = (cr.get() & !(0xF << shift)) | ((port as u32) << shift);
            cr.set(value);
        }

        let line = 1u32 << pin;
        match edge {
            Edge::Rising => {
                self.exti.rtsr.set(self.exti.rtsr.get() | line);
                self.exti.ftsr.set(self.exti.ftsr.get() & !line);
            }
            Edge::Falling => {
                self.exti.ftsr.set(self.exti.ftsr.get() | line);
                self.exti.rtsr.set(self.exti.rtsr.get() & !line);
            }
            Edge::RisingFalling => {
                self.exti.rtsr.set(self.exti.rtsr.get() | line);
                self.exti.ftsr.set(self.exti.ftsr.get() | line);
            }
        }
    }

    /// Unmask the EXTI line. NVIC routing is the application's job.
    pub fn enable_interrupt(&mut self, pin: u8) {
        self.exti.imr.set(self.exti.imr.get() | (1 << pin));
    }

    pub fn disable_interrupt(&mut self, pin: u8) {
        self.exti.imr.set(self.exti.imr.get() & !(1 << pin));
    }

    /// Acknowledge a pending edge; the pending register is
    /// write-one-to-clear.
    pub fn clear_interrupt(&mut self, pin: u8) {
        self.exti.pr.set(1 << pin);
    }

    #[must_use]
    pub fn is_pending(&self, pin: u8) -> bool {
        self.exti.pr.get() & (1 << pin) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePort {
        regs: Box<RegisterBlock>,
    }

    impl FakePort {
        fn new() -> Self {
            Self {
                regs: Box::new(unsafe { core::mem::MaybeUninit::zeroed().assume_init() }),
            }
        }
    }

    impl Deref for FakePort {
        type Target = RegisterBlock;

        fn deref(&self) -> &Self::Target {
            &self.regs
        }
    }

    impl Port for FakePort {}

    #[test]
    fn configure_programs_two_bit_fields() {
        let mut gpio = Gpio::new(FakePort::new());
        gpio.configure(
            5,
            &PinConfig {
                mode: Mode::Output,
                output_type: OutputType::OpenDrain,
                pull: Pull::Up,
                speed: Speed::High,
                alternate: 0,
            },
        );

        assert_eq!(gpio.port.moder.get() >> 10 & 0b11, 0b01);
        assert_eq!(gpio.port.otyper.get() >> 5 & 0b1, 0b1);
        assert_eq!(gpio.port.ospeedr.get() >> 10 & 0b11, 0b10);
        assert_eq!(gpio.port.pupdr.get() >> 10 & 0b11, 0b01);
    }

    #[test]
    fn configure_programs_alternate_function() {
        let mut gpio = Gpio::new(FakePort::new());
        gpio.configure(2, &PinConfig::alternate(7));
        gpio.configure(9, &PinConfig::alternate(4));

        assert_eq!(gpio.port.moder.get() >> 4 & 0b11, 0b10);
        assert_eq!(gpio.port.afrl.get() >> 8 & 0xF, 7);
        assert_eq!(gpio.port.afrh.get() >> 4 & 0xF, 4);
    }

    #[test]
    fn configure_ignores_out_of_range_pins() {
        let mut gpio = Gpio::new(FakePort::new());
        gpio.configure(16, &PinConfig::output());
        assert_eq!(gpio.port.moder.get(), 0);
    }
}
