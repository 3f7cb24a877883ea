// Licensed under the Apache-2.0 license

//! I2C bus driver: interrupt-driven master/slave transfer state
//! machines plus a blocking embedded-hal controller on top.

pub mod bus;
pub mod common;
pub mod controller;

pub use bus::{I2cBus, Instance};
pub use common::{AddressingMode, DutyCycle, Error, I2cConfig, I2cConfigBuilder, I2cSpeed, State};
pub use controller::I2cController;
