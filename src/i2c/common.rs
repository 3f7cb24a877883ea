// Licensed under the Apache-2.0 license

//! Common types and constants for the I2C driver modules.

use fugit::HertzU32;

/// Target bus clock rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
}

/// Fast-mode SCL duty cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DutyCycle {
    Ratio2to1,
    Ratio16to9,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    SevenBit,
    TenBit,
}

/// Driver lifecycle state, readable by the application to poll
/// transfer progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Not yet initialized.
    Reset,
    /// Idle, a transfer may be started.
    Ready,
    /// Interrupt-driven transmission in progress.
    BusyTx,
    /// Interrupt-driven reception in progress.
    BusyRx,
}

/// Errors reported by the transfer-initiation calls and the blocking
/// controller operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A transfer is already in flight or the driver is uninitialized.
    Busy,
    /// A bounded flag wait expired.
    Timeout,
    /// Address or data byte not acknowledged.
    Nack,
    /// Arbitration lost to another master.
    ArbitrationLoss,
    /// Misplaced start/stop condition on the bus.
    Bus,
    /// Data register overrun/underrun.
    Overrun,
    /// Zero-length interrupt-driven transfers are not supported.
    ZeroLength,
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        match self {
            Error::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Error::ArbitrationLoss => ErrorKind::ArbitrationLoss,
            Error::Bus => ErrorKind::Bus,
            Error::Overrun => ErrorKind::Overrun,
            Error::Busy | Error::Timeout | Error::ZeroLength => ErrorKind::Other,
        }
    }
}

/// One-time peripheral configuration, captured at construction and
/// read-only while transfers run.
pub struct I2cConfig {
    pub speed: I2cSpeed,
    pub duty_cycle: DutyCycle,
    pub own_address: u8,
    pub addressing_mode: AddressingMode,
    pub general_call: bool,
    pub clock_stretching: bool,
    /// APB1 clock feeding the peripheral.
    pub pclk: HertzU32,
    /// Spin budget for every synchronous flag wait.
    pub retries: u32,
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    duty_cycle: DutyCycle,
    own_address: u8,
    addressing_mode: AddressingMode,
    general_call: bool,
    clock_stretching: bool,
    pclk: HertzU32,
    retries: u32,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: I2cSpeed::Standard,
            duty_cycle: DutyCycle::Ratio2to1,
            own_address: 0,
            addressing_mode: AddressingMode::SevenBit,
            general_call: false,
            clock_stretching: true,
            pclk: HertzU32::MHz(16),
            retries: 100_000,
        }
    }

    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn duty_cycle(mut self, duty_cycle: DutyCycle) -> Self {
        self.duty_cycle = duty_cycle;
        self
    }

    #[must_use]
    pub fn own_address(mut self, address: u8) -> Self {
        self.own_address = address;
        self
    }

    #[must_use]
    pub fn addressing_mode(mut self, mode: AddressingMode) -> Self {
        self.addressing_mode = mode;
        self
    }

    #[must_use]
    pub fn general_call(mut self, enabled: bool) -> Self {
        self.general_call = enabled;
        self
    }

    #[must_use]
    pub fn clock_stretching(mut self, enabled: bool) -> Self {
        self.clock_stretching = enabled;
        self
    }

    #[must_use]
    pub fn pclk(mut self, pclk: HertzU32) -> Self {
        self.pclk = pclk;
        self
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn build(self) -> I2cConfig {
        I2cConfig {
            speed: self.speed,
            duty_cycle: self.duty_cycle,
            own_address: self.own_address,
            addressing_mode: self.addressing_mode,
            general_call: self.general_call,
            clock_stretching: self.clock_stretching,
            pclk: self.pclk,
            retries: self.retries,
        }
    }
}
