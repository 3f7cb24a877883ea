// Licensed under the Apache-2.0 license

//! System configuration controller, RM0090 ch. 9. Routes GPIO ports
//! onto EXTI lines; four bits per line in the EXTICR array.

use tock_registers::registers::ReadWrite;

#[repr(C)]
pub struct RegisterBlock {
    /// memory remap register
    pub memrmp: ReadWrite<u32>,
    /// peripheral mode configuration register
    pub pmc: ReadWrite<u32>,
    /// external interrupt configuration registers 1..4
    pub exticr: [ReadWrite<u32>; 4],
    _reserved0: [u32; 2],
    /// compensation cell control register
    pub cmpcr: ReadWrite<u32>,
}
