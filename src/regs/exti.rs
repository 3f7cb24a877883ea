// Licensed under the Apache-2.0 license

//! External interrupt/event controller, RM0090 ch. 12.
//! One bit per EXTI line in every register.

use tock_registers::registers::ReadWrite;

#[repr(C)]
pub struct RegisterBlock {
    /// interrupt mask register
    pub imr: ReadWrite<u32>,
    /// event mask register
    pub emr: ReadWrite<u32>,
    /// rising trigger selection register
    pub rtsr: ReadWrite<u32>,
    /// falling trigger selection register
    pub ftsr: ReadWrite<u32>,
    /// software interrupt event register
    pub swier: ReadWrite<u32>,
    /// pending register, cleared by writing 1
    pub pr: ReadWrite<u32>,
}
