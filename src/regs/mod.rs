// Licensed under the Apache-2.0 license

//! Memory-mapped register blocks for the STM32F407.
//!
//! Every register block is a `#[repr(C)]` struct of `tock-registers`
//! cells at the base address given in RM0090. This module is the only
//! place that aliases hardware memory: the peripheral singleton types
//! below are the sole way to reach a block, and all `unsafe` register
//! access lives behind their `Deref` impls. Drivers operate on
//! `Deref<Target = RegisterBlock>` so tests can substitute a fake block
//! in ordinary memory.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

pub mod exti;
pub mod gpio;
pub mod i2c;
pub mod rcc;
pub mod spi;
pub mod syscfg;
pub mod usart;

static TAKEN: AtomicBool = AtomicBool::new(false);

macro_rules! peripherals {
    ($($Ty:ident: $Block:path = $addr:literal),+ $(,)?) => {
        $(
            /// Singleton handle to the register block of the
            /// like-named peripheral.
            pub struct $Ty {
                _marker: PhantomData<*const ()>,
            }

            impl $Ty {
                pub const PTR: *const $Block = $addr as *const _;
            }

            impl core::ops::Deref for $Ty {
                type Target = $Block;

                fn deref(&self) -> &Self::Target {
                    // Device memory, valid for the whole program.
                    unsafe { &*Self::PTR }
                }
            }

            unsafe impl Send for $Ty {}
        )+

        paste::paste! {
            /// All peripheral singletons known to this crate.
            pub struct Peripherals {
                $(pub [<$Ty:lower>]: $Ty,)+
            }

            impl Peripherals {
                /// Hands out the singletons exactly once.
                pub fn take() -> Option<Self> {
                    TAKEN
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .ok()
                        .map(|_| unsafe { Self::steal() })
                }

                /// Conjures a second set of singletons.
                ///
                /// # Safety
                ///
                /// Aliases every register block. The caller must make sure no
                /// other owner is driving the same peripheral concurrently.
                #[must_use]
                pub unsafe fn steal() -> Self {
                    Self {
                        $([<$Ty:lower>]: $Ty { _marker: PhantomData },)+
                    }
                }
            }
        }
    };
}

peripherals! {
    GpioA: gpio::RegisterBlock = 0x4002_0000,
    GpioB: gpio::RegisterBlock = 0x4002_0400,
    GpioC: gpio::RegisterBlock = 0x4002_0800,
    GpioD: gpio::RegisterBlock = 0x4002_0C00,
    GpioE: gpio::RegisterBlock = 0x4002_1000,
    GpioF: gpio::RegisterBlock = 0x4002_1400,
    GpioG: gpio::RegisterBlock = 0x4002_1800,
    GpioH: gpio::RegisterBlock = 0x4002_1C00,
    GpioI: gpio::RegisterBlock = 0x4002_2000,
    I2c1: i2c::RegisterBlock = 0x4000_5400,
    I2c2: i2c::RegisterBlock = 0x4000_5800,
    I2c3: i2c::RegisterBlock = 0x4000_5C00,
    Spi1: spi::RegisterBlock = 0x4001_3000,
    Spi2: spi::RegisterBlock = 0x4000_3800,
    Spi3: spi::RegisterBlock = 0x4000_3C00,
    Usart1: usart::RegisterBlock = 0x4001_1000,
    Usart2: usart::RegisterBlock = 0x4000_4400,
    Usart3: usart::RegisterBlock = 0x4000_4800,
    Uart4: usart::RegisterBlock = 0x4000_4C00,
    Uart5: usart::RegisterBlock = 0x4000_5000,
    Usart6: usart::RegisterBlock = 0x4001_1400,
    Rcc: rcc::RegisterBlock = 0x4002_3800,
    Exti: exti::RegisterBlock = 0x4001_3C00,
    Syscfg: syscfg::RegisterBlock = 0x4001_3800,
}
