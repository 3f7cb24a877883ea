// Licensed under the Apache-2.0 license

//! Reset and clock control, RM0090 ch. 7. Only the registers this
//! crate programs are broken out; the rest are reserved padding.

use tock_registers::registers::ReadWrite;

#[repr(C)]
pub struct RegisterBlock {
    /// clock control register
    pub cr: ReadWrite<u32>,
    /// PLL configuration register
    pub pllcfgr: ReadWrite<u32>,
    /// clock configuration register
    pub cfgr: ReadWrite<u32>,
    /// clock interrupt register
    pub cir: ReadWrite<u32>,
    /// AHB1 peripheral reset register
    pub ahb1rstr: ReadWrite<u32>,
    /// AHB2 peripheral reset register
    pub ahb2rstr: ReadWrite<u32>,
    /// AHB3 peripheral reset register
    pub ahb3rstr: ReadWrite<u32>,
    _reserved0: u32,
    /// APB1 peripheral reset register
    pub apb1rstr: ReadWrite<u32>,
    /// APB2 peripheral reset register
    pub apb2rstr: ReadWrite<u32>,
    _reserved1: [u32; 2],
    /// AHB1 peripheral clock enable register
    pub ahb1enr: ReadWrite<u32>,
    /// AHB2 peripheral clock enable register
    pub ahb2enr: ReadWrite<u32>,
    /// AHB3 peripheral clock enable register
    pub ahb3enr: ReadWrite<u32>,
    _reserved2: u32,
    /// APB1 peripheral clock enable register
    pub apb1enr: ReadWrite<u32>,
    /// APB2 peripheral clock enable register
    pub apb2enr: ReadWrite<u32>,
}
