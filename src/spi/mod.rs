// Licensed under the Apache-2.0 license

//! SPI driver: interrupt-driven full-duplex transfer state machine
//! plus a blocking embedded-hal controller on top.

pub mod bus;
pub mod common;
pub mod controller;

pub use bus::{Instance, SpiPort};
pub use common::{BitOrder, DataSize, Error, Prescaler, Role, SpiConfig, SpiConfigBuilder, State};
pub use controller::SpiController;
