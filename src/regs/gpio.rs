// Licensed under the Apache-2.0 license

//! General-purpose I/O ports (GPIOA..GPIOI), RM0090 ch. 8.
//!
//! Most GPIO registers pack a two-bit field per pin, so the port driver
//! computes shifts itself instead of going through named bitfields.

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

#[repr(C)]
pub struct RegisterBlock {
    /// port mode register, 2 bits per pin
    pub moder: ReadWrite<u32>,
    /// port output type register, 1 bit per pin
    pub otyper: ReadWrite<u32>,
    /// port output speed register, 2 bits per pin
    pub ospeedr: ReadWrite<u32>,
    /// port pull-up/pull-down register, 2 bits per pin
    pub pupdr: ReadWrite<u32>,
    /// port input data register
    pub idr: ReadOnly<u32>,
    /// port output data register
    pub odr: ReadWrite<u32>,
    /// port bit set/reset register
    pub bsrr: WriteOnly<u32>,
    /// port configuration lock register
    pub lckr: ReadWrite<u32>,
    /// alternate function low register, pins 0..7
    pub afrl: ReadWrite<u32>,
    /// alternate function high register, pins 8..15
    pub afrh: ReadWrite<u32>,
}
