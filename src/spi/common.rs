// Licensed under the Apache-2.0 license

//! Common types and constants for the SPI driver modules.

use embedded_hal::spi::{Mode, MODE_0};

/// Whether this end generates the clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Master,
    Slave,
}

/// Configured width of one transfer unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataSize {
    Eight,
    Sixteen,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Baud rate control: peripheral clock divided by 2^(n+1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Prescaler {
    Div2 = 0b000,
    Div4 = 0b001,
    Div8 = 0b010,
    Div16 = 0b011,
    Div32 = 0b100,
    Div64 = 0b101,
    Div128 = 0b110,
    Div256 = 0b111,
}

/// Driver lifecycle state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Reset,
    Ready,
    BusyTx,
    BusyRx,
    BusyTxRx,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A transfer is already in flight or the driver is uninitialized.
    Busy,
    /// A bounded flag wait expired.
    Timeout,
    /// Data register overrun.
    Overrun,
    /// NSS pulled low while configured as master.
    ModeFault,
    /// Zero-length transfers are not supported.
    ZeroLength,
    /// 16-bit frames need an even number of buffer bytes.
    UnalignedLength,
    /// Full-duplex buffers must be the same length.
    LengthMismatch,
}

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        use embedded_hal::spi::ErrorKind;
        match self {
            Error::Overrun => ErrorKind::Overrun,
            Error::ModeFault => ErrorKind::ModeFault,
            Error::Busy
            | Error::Timeout
            | Error::ZeroLength
            | Error::UnalignedLength
            | Error::LengthMismatch => ErrorKind::Other,
        }
    }
}

/// One-time peripheral configuration.
pub struct SpiConfig {
    pub role: Role,
    /// Clock polarity and phase.
    pub mode: Mode,
    pub data_size: DataSize,
    pub bit_order: BitOrder,
    pub prescaler: Prescaler,
    /// Software slave management on the NSS pin.
    pub software_nss: bool,
    /// Spin budget for every synchronous flag wait.
    pub retries: u32,
}

pub struct SpiConfigBuilder {
    role: Role,
    mode: Mode,
    data_size: DataSize,
    bit_order: BitOrder,
    prescaler: Prescaler,
    software_nss: bool,
    retries: u32,
}

impl Default for SpiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpiConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            role: Role::Master,
            mode: MODE_0,
            data_size: DataSize::Eight,
            bit_order: BitOrder::MsbFirst,
            prescaler: Prescaler::Div32,
            software_nss: true,
            retries: 100_000,
        }
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn data_size(mut self, data_size: DataSize) -> Self {
        self.data_size = data_size;
        self
    }

    #[must_use]
    pub fn bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    #[must_use]
    pub fn prescaler(mut self, prescaler: Prescaler) -> Self {
        self.prescaler = prescaler;
        self
    }

    #[must_use]
    pub fn software_nss(mut self, enabled: bool) -> Self {
        self.software_nss = enabled;
        self
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn build(self) -> SpiConfig {
        SpiConfig {
            role: self.role,
            mode: self.mode,
            data_size: self.data_size,
            bit_order: self.bit_order,
            prescaler: self.prescaler,
            software_nss: self.software_nss,
            retries: self.retries,
        }
    }
}
