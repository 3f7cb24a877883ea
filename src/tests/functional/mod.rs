// Licensed under the Apache-2.0 license

//! On-target smoke tests, driven from the demo binary over the UART
//! console.

#![allow(clippy::unwrap_used)]

pub mod gpio_test;
pub mod i2c_scan;
