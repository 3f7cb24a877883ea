// Licensed under the Apache-2.0 license

#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use cortex_m::interrupt::Mutex;
use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use embedded_io::Write;
use heapless::Vec;
use panic_halt as _;

use stm32f407_ddk::common::{Direction, ErrorFlags, TransferEvents};
use stm32f407_ddk::gpio::{Edge, ExtiController, Gpio, OutputType, PinConfig, PortId};
use stm32f407_ddk::i2c::{I2cBus, I2cConfigBuilder, I2cController};
use stm32f407_ddk::rcc::{PeripheralClock, Rcc};
use stm32f407_ddk::regs;
use stm32f407_ddk::regs::Peripherals;
use stm32f407_ddk::rt::Interrupt;
use stm32f407_ddk::tests::functional;
use stm32f407_ddk::uart::{Config, UartController};

// Discovery board wiring: user LEDs on PD12..PD15, push button on PA0.
const LED_GREEN: u8 = 12;
const LED_ORANGE: u8 = 13;
const LED_RED: u8 = 14;
const LED_BLUE: u8 = 15;
const BUTTON_PIN: u8 = 0;

static RX_DONE: AtomicBool = AtomicBool::new(false);
static BUTTON_PRESSED: AtomicBool = AtomicBool::new(false);

/// Completion hook for the interrupt-driven console receive: wake the
/// main loop so it can echo and re-arm.
struct EchoEvents;

impl TransferEvents for EchoEvents {
    fn on_complete(&mut self, direction: Direction, _size: usize) {
        if direction == Direction::Receive {
            RX_DONE.store(true, Ordering::SeqCst);
        }
    }

    fn on_error(&mut self, _errors: ErrorFlags) {
        // Re-arm from the main loop even after a line error.
        RX_DONE.store(true, Ordering::SeqCst);
    }
}

type Console = UartController<regs::Usart2, EchoEvents>;

static CONSOLE: Mutex<RefCell<Option<Console>>> = Mutex::new(RefCell::new(None));
static EXTI: Mutex<RefCell<Option<ExtiController>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    let p = unsafe { Peripherals::steal() };
    let mut rcc = Rcc::new(p.rcc);
    for clock in [
        PeripheralClock::GpioA,
        PeripheralClock::GpioB,
        PeripheralClock::GpioD,
        PeripheralClock::Usart2,
        PeripheralClock::I2c1,
        PeripheralClock::Syscfg,
    ] {
        rcc.enable(clock);
    }

    // Console pins PA2/PA3 on AF7, push button input on PA0.
    let mut gpio_a = Gpio::new(p.gpioa);
    gpio_a.configure(2, &PinConfig::alternate(7));
    gpio_a.configure(3, &PinConfig::alternate(7));
    gpio_a.configure(BUTTON_PIN, &PinConfig::default());

    let mut gpio_d = Gpio::new(p.gpiod);
    for led in [LED_GREEN, LED_ORANGE, LED_RED, LED_BLUE] {
        gpio_d.configure(led, &PinConfig::output());
    }

    let mut console = UartController::with_events(p.usart2, Config::default(), EchoEvents);
    console.init();
    let _ = writeln!(console, "\r\nstm32f407-ddk demo\r");

    functional::gpio_test::run(
        &mut console,
        &gpio_d,
        &[LED_GREEN, LED_ORANGE, LED_RED, LED_BLUE],
    );

    // I2C1 on PB6/PB7, open drain, AF4.
    let mut gpio_b = Gpio::new(p.gpiob);
    let i2c_pin = PinConfig {
        output_type: OutputType::OpenDrain,
        ..PinConfig::alternate(4)
    };
    gpio_b.configure(6, &i2c_pin);
    gpio_b.configure(7, &i2c_pin);

    let mut i2c = I2cBus::new(p.i2c1, I2cConfigBuilder::new().build());
    i2c.init();
    let mut i2c_controller = I2cController::new(i2c);
    functional::i2c_scan::run(&mut console, &mut i2c_controller);

    // Push-button edge interrupt on EXTI0.
    let mut exti = ExtiController::new(p.exti, p.syscfg);
    exti.configure_interrupt(PortId::A, BUTTON_PIN, Edge::Falling);
    exti.enable_interrupt(BUTTON_PIN);
    cortex_m::interrupt::free(|cs| EXTI.borrow(cs).replace(Some(exti)));

    // Interrupt-driven console echo, one byte per transfer.
    static mut RX_BYTE: [u8; 1] = [0];
    let rx_byte = unsafe { &mut *core::ptr::addr_of_mut!(RX_BYTE) };
    let _ = console.receive(rx_byte);
    cortex_m::interrupt::free(|cs| CONSOLE.borrow(cs).replace(Some(console)));

    unsafe {
        NVIC::unmask(Interrupt::EXTI0);
        NVIC::unmask(Interrupt::USART2);
    }

    cortex_m::interrupt::free(|cs| {
        if let Some(console) = CONSOLE.borrow(cs).borrow_mut().as_mut() {
            let _ = writeln!(console, "Type a line, press return to echo\r");
        }
    });

    let mut line: Vec<u8, 64> = Vec::new();
    loop {
        cortex_m::asm::wfi();

        if BUTTON_PRESSED.swap(false, Ordering::SeqCst) {
            gpio_d.toggle(LED_BLUE);
            cortex_m::interrupt::free(|cs| {
                if let Some(console) = CONSOLE.borrow(cs).borrow_mut().as_mut() {
                    let _ = writeln!(console, "button\r");
                }
            });
        }

        if RX_DONE.swap(false, Ordering::SeqCst) {
            cortex_m::interrupt::free(|cs| {
                if let Some(console) = CONSOLE.borrow(cs).borrow_mut().as_mut() {
                    if let Some(buf) = console.take_rx_buffer() {
                        let byte = buf.first().copied().unwrap_or(0);
                        if byte == b'\r' {
                            let _ = console.write_all(b"\r\n");
                            let _ = console.write_all(&line);
                            let _ = console.write_all(b"\r\n");
                            line.clear();
                            gpio_d.toggle(LED_GREEN);
                        } else if line.push(byte).is_err() {
                            line.clear();
                        }
                        let _ = console.receive(buf);
                    }
                }
            });
        }
    }
}

#[no_mangle]
extern "C" fn USART2() {
    cortex_m::interrupt::free(|cs| {
        if let Some(console) = CONSOLE.borrow(cs).borrow_mut().as_mut() {
            console.handle_interrupt();
        }
    });
}

#[no_mangle]
extern "C" fn EXTI0() {
    cortex_m::interrupt::free(|cs| {
        if let Some(exti) = EXTI.borrow(cs).borrow_mut().as_mut() {
            exti.clear_interrupt(BUTTON_PIN);
        }
    });
    BUTTON_PRESSED.store(true, Ordering::SeqCst);
}
