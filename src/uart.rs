// Licensed under the Apache-2.0 license

//! Interrupt-driven UART driver with independent TX and RX state
//! machines.
//!
//! Transmission completes in two phases: the buffer-empty interrupt
//! confirms the shift register accepted each byte, and only the
//! transmission-complete interrupt (armed once the count reaches zero)
//! confirms the last byte physically left the line. Reception arms the
//! parity and line-error interrupts alongside the data interrupt;
//! clearing a line error requires the status-then-data register read
//! sequence.
//!
//! Blocking `embedded_io` and single-byte `nb` operations poll the
//! same registers with the configured retry budget and never arm
//! interrupts.

use core::ops::Deref;

use fugit::HertzU32;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::common::{Direction, ErrorFlags, NullEvents, Transfer, TransferEvents};
use crate::regs;
use crate::regs::usart::{RegisterBlock, BRR, CR1, CR2, CR3, SR};

/// One of the U(S)ART peripheral instances.
pub trait Instance: Deref<Target = RegisterBlock> {}

impl Instance for regs::Usart1 {}
impl Instance for regs::Usart2 {}
impl Instance for regs::Usart3 {}
impl Instance for regs::Uart4 {}
impl Instance for regs::Uart5 {}
impl Instance for regs::Usart6 {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WordLength {
    Eight,
    Nine,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopBits {
    One,
    Half,
    Two,
    OneAndHalf,
}

/// Which directions the peripheral drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Transmit,
    Receive,
    TransmitReceive,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Oversampling {
    By16,
    By8,
}

/// Communication parameters, captured at construction.
pub struct Config {
    pub baud_rate: u32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub mode: Mode,
    pub oversampling: Oversampling,
    /// Bus clock feeding the peripheral.
    pub clock: HertzU32,
    /// Spin budget for every synchronous flag wait.
    pub retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            word_length: WordLength::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            mode: Mode::TransmitReceive,
            oversampling: Oversampling::By16,
            clock: HertzU32::MHz(16),
            retries: 100_000,
        }
    }
}

/// Per-direction lifecycle state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Reset,
    Ready,
    BusyTx,
    BusyRx,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A transfer is already in flight or the driver is uninitialized.
    Busy,
    /// A bounded flag wait expired.
    Timeout,
    /// Parity mismatch on a received frame.
    Parity,
    /// Stop bit not found where expected.
    Framing,
    /// Noise detected on a received frame.
    Noise,
    /// Receiver overrun.
    Overrun,
    /// Zero-length interrupt-driven transfers are not supported.
    ZeroLength,
}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind;
        match self {
            Error::Timeout => ErrorKind::TimedOut,
            Error::Parity | Error::Framing | Error::Noise => ErrorKind::InvalidData,
            Error::ZeroLength => ErrorKind::InvalidInput,
            Error::Busy | Error::Overrun => ErrorKind::Other,
        }
    }
}

/// UART driver over one peripheral instance.
pub struct UartController<I: Instance, E: TransferEvents = NullEvents> {
    instance: I,
    config: Config,
    tx: Transfer,
    rx: Transfer,
    tx_state: State,
    rx_state: State,
    errors: ErrorFlags,
    events: E,
}

impl<I: Instance> UartController<I, NullEvents> {
    #[must_use]
    pub fn new(instance: I, config: Config) -> Self {
        Self::with_events(instance, config, NullEvents)
    }
}

impl<I: Instance, E: TransferEvents> UartController<I, E> {
    #[must_use]
    pub fn with_events(instance: I, config: Config, events: E) -> Self {
        Self {
            instance,
            config,
            tx: Transfer::idle(),
            rx: Transfer::idle(),
            tx_state: State::Reset,
            rx_state: State::Reset,
            errors: ErrorFlags::NONE,
            events,
        }
    }

    fn regs(&self) -> &RegisterBlock {
        &self.instance
    }

    /// Program frame format, baud rate and direction enables, then
    /// switch the peripheral on.
    pub fn init(&mut self) {
        let regs = self.regs();
        regs.cr1.modify(CR1::UE::CLEAR);

        match self.config.word_length {
            WordLength::Eight => regs.cr1.modify(CR1::M::EightData),
            WordLength::Nine => regs.cr1.modify(CR1::M::NineData),
        }
        match self.config.parity {
            Parity::None => regs.cr1.modify(CR1::PCE::CLEAR),
            Parity::Even => regs.cr1.modify(CR1::PCE::SET + CR1::PS::Even),
            Parity::Odd => regs.cr1.modify(CR1::PCE::SET + CR1::PS::Odd),
        }
        match self.config.stop_bits {
            StopBits::One => regs.cr2.modify(CR2::STOP::One),
            StopBits::Half => regs.cr2.modify(CR2::STOP::Half),
            StopBits::Two => regs.cr2.modify(CR2::STOP::Two),
            StopBits::OneAndHalf => regs.cr2.modify(CR2::STOP::OneAndHalf),
        }
        match self.config.oversampling {
            Oversampling::By16 => regs.cr1.modify(CR1::OVER8::CLEAR),
            Oversampling::By8 => regs.cr1.modify(CR1::OVER8::SET),
        }
        self.set_baud_rate();

        let regs = self.regs();
        match self.config.mode {
            Mode::Transmit => regs.cr1.modify(CR1::TE::SET + CR1::RE::CLEAR),
            Mode::Receive => regs.cr1.modify(CR1::RE::SET + CR1::TE::CLEAR),
            Mode::TransmitReceive => regs.cr1.modify(CR1::TE::SET + CR1::RE::SET),
        }
        regs.cr1.modify(CR1::UE::SET);

        self.tx_state = State::Ready;
        self.rx_state = State::Ready;
        self.errors = ErrorFlags::NONE;
    }

    fn set_baud_rate(&self) {
        let div = match self.config.oversampling {
            Oversampling::By16 => {
                let clk = self.config.clock.raw() / self.config.baud_rate;
                (clk / 16, clk % 16)
            }
            Oversampling::By8 => {
                let clk = self.config.clock.raw() * 2 / self.config.baud_rate;
                (clk / 16, (clk % 16) >> 1)
            }
        };
        self.regs()
            .brr
            .write(BRR::MANTISSA.val(div.0) + BRR::FRACTION.val(div.1));
    }

    #[must_use]
    pub fn tx_state(&self) -> State {
        self.tx_state
    }

    #[must_use]
    pub fn rx_state(&self) -> State {
        self.rx_state
    }

    #[must_use]
    pub fn error_flags(&self) -> ErrorFlags {
        self.errors
    }

    #[must_use]
    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn take_tx_buffer(&mut self) -> Option<&'static mut [u8]> {
        if self.tx_state == State::Ready {
            self.tx.take_buf()
        } else {
            None
        }
    }

    pub fn take_rx_buffer(&mut self) -> Option<&'static mut [u8]> {
        if self.rx_state == State::Ready {
            self.rx.take_buf()
        } else {
            None
        }
    }

    /// Cancel both directions and force the handle back to ready.
    pub fn abort(&mut self) {
        let regs = self.regs();
        regs.cr1.modify(
            CR1::TXEIE::CLEAR + CR1::TCIE::CLEAR + CR1::RXNEIE::CLEAR + CR1::PEIE::CLEAR,
        );
        regs.cr3.modify(CR3::EIE::CLEAR);
        self.tx_state = State::Ready;
        self.rx_state = State::Ready;
    }

    /// Release the peripheral singleton.
    pub fn release(self) -> I {
        self.instance
    }

    fn wait_until(&self, cond: impl Fn(&RegisterBlock) -> bool) -> Result<(), Error> {
        for _ in 0..self.config.retries {
            if cond(self.regs()) {
                return Ok(());
            }
        }
        Err(Error::Timeout)
    }

    /// Start an interrupt-driven transmission. Each buffer-empty event
    /// moves one byte; completion is signalled only by the
    /// transmission-complete event.
    pub fn transmit(&mut self, buffer: &'static mut [u8]) -> Result<(), Error> {
        if self.tx_state != State::Ready {
            return Err(Error::Busy);
        }
        if buffer.is_empty() {
            return Err(Error::ZeroLength);
        }
        self.errors = ErrorFlags::NONE;
        self.tx = Transfer::new(buffer);
        self.tx_state = State::BusyTx;
        self.regs().cr1.modify(CR1::UE::SET);
        self.regs().cr1.modify(CR1::TXEIE::SET);
        Ok(())
    }

    /// Start an interrupt-driven reception with parity and line-error
    /// detection armed.
    pub fn receive(&mut self, buffer: &'static mut [u8]) -> Result<(), Error> {
        if self.rx_state != State::Ready {
            return Err(Error::Busy);
        }
        if buffer.is_empty() {
            return Err(Error::ZeroLength);
        }
        self.errors = ErrorFlags::NONE;
        self.rx = Transfer::new(buffer);
        self.rx_state = State::BusyRx;
        let regs = self.regs();
        regs.cr1.modify(CR1::UE::SET);
        regs.cr1.modify(CR1::PEIE::SET);
        regs.cr3.modify(CR3::EIE::SET);
        // Drain stale data before arming the data interrupt.
        let _ = regs.dr.get();
        regs.cr1.modify(CR1::RXNEIE::SET);
        Ok(())
    }

    /// Interrupt entry point. Evaluates every applicable flag of this
    /// invocation: line errors first, then data movement, then the
    /// transmit-complete phase.
    pub fn handle_interrupt(&mut self) {
        let sr = self.regs().sr.extract();
        let cr1 = self.regs().cr1.extract();
        let cr3 = self.regs().cr3.extract();
        let before = self.errors;

        if sr.is_set(SR::PE) && cr1.is_set(CR1::PEIE) {
            self.clear_line_error();
            self.errors.insert(ErrorFlags::PARITY);
        }
        if sr.is_set(SR::FE) && cr3.is_set(CR3::EIE) {
            self.clear_line_error();
            self.errors.insert(ErrorFlags::FRAMING);
        }
        if sr.is_set(SR::ORE) && cr3.is_set(CR3::EIE) {
            self.clear_line_error();
            self.errors.insert(ErrorFlags::OVERRUN);
        }
        if sr.is_set(SR::NF) && cr3.is_set(CR3::EIE) {
            self.clear_line_error();
            self.errors.insert(ErrorFlags::NOISE);
        }

        if sr.is_set(SR::RXNE) && cr1.is_set(CR1::RXNEIE) {
            self.handle_rxne();
        }
        if sr.is_set(SR::TXE) && cr1.is_set(CR1::TXEIE) {
            self.handle_txe();
        }
        if sr.is_set(SR::TC) && cr1.is_set(CR1::TCIE) {
            self.handle_tc();
        }

        if self.errors != before {
            // A line error invalidates the frame stream in both
            // directions.
            let regs = self.regs();
            regs.cr1.modify(
                CR1::TXEIE::CLEAR + CR1::TCIE::CLEAR + CR1::RXNEIE::CLEAR + CR1::PEIE::CLEAR,
            );
            regs.cr3.modify(CR3::EIE::CLEAR);
            self.tx_state = State::Ready;
            self.rx_state = State::Ready;
            let errors = self.errors;
            self.events.on_error(errors);
        }
    }

    fn handle_txe(&mut self) {
        if self.tx_state != State::BusyTx {
            return;
        }
        if let Some(byte) = self.tx.next_out(0) {
            self.regs().dr.set(u32::from(byte));
        }
        if !self.tx.in_progress() {
            // The shift register has the last byte; wait for it to
            // leave the line before reporting completion.
            self.regs().cr1.modify(CR1::TXEIE::CLEAR);
            self.regs().cr1.modify(CR1::TCIE::SET);
        }
    }

    fn handle_tc(&mut self) {
        self.regs().cr1.modify(CR1::TCIE::CLEAR);
        self.tx_state = State::Ready;
        let size = self.tx.size();
        self.events.on_complete(Direction::Transmit, size);
    }

    fn handle_rxne(&mut self) {
        if self.rx_state != State::BusyRx {
            return;
        }
        let raw = self.regs().dr.get();
        let byte = match self.config.parity {
            // The MSB of the frame is the parity bit, not data.
            Parity::Even | Parity::Odd => (raw & 0x7F) as u8,
            Parity::None => (raw & 0xFF) as u8,
        };
        self.rx.put_in(byte);
        if !self.rx.in_progress() {
            let regs = self.regs();
            regs.cr1.modify(CR1::RXNEIE::CLEAR + CR1::PEIE::CLEAR);
            regs.cr3.modify(CR3::EIE::CLEAR);
            self.rx_state = State::Ready;
            let size = self.rx.size();
            self.events.on_complete(Direction::Receive, size);
        }
    }

    /// Line errors are acknowledged by reading the status register and
    /// then the data register.
    fn clear_line_error(&self) {
        let _ = self.regs().sr.get();
        let _ = self.regs().dr.get();
    }

    /// Non-blocking single-byte transmit.
    pub fn write_byte(&mut self, byte: u8) -> nb::Result<(), Error> {
        if self.regs().sr.is_set(SR::TXE) {
            self.regs().dr.set(u32::from(byte));
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Non-blocking single-byte receive, surfacing line errors.
    pub fn read_byte(&mut self) -> nb::Result<u8, Error> {
        let sr = self.regs().sr.extract();
        if sr.is_set(SR::PE) {
            self.clear_line_error();
            return Err(nb::Error::Other(Error::Parity));
        }
        if sr.is_set(SR::FE) {
            self.clear_line_error();
            return Err(nb::Error::Other(Error::Framing));
        }
        if sr.is_set(SR::ORE) {
            self.clear_line_error();
            return Err(nb::Error::Other(Error::Overrun));
        }
        if sr.is_set(SR::NF) {
            self.clear_line_error();
            return Err(nb::Error::Other(Error::Noise));
        }
        if sr.is_set(SR::RXNE) {
            Ok(self.regs().dr.get() as u8)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl<I: Instance, E: TransferEvents> embedded_io::ErrorType for UartController<I, E> {
    type Error = Error;
}

impl<I: Instance, E: TransferEvents> embedded_io::Write for UartController<I, E> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.tx_state == State::BusyTx {
            return Err(Error::Busy);
        }
        for &byte in buf {
            self.wait_until(|r| r.sr.is_set(SR::TXE))?;
            self.regs().dr.set(u32::from(byte));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.tx_state == State::BusyTx {
            return Err(Error::Busy);
        }
        self.wait_until(|r| r.sr.is_set(SR::TC))
    }
}

impl<I: Instance, E: TransferEvents> embedded_io::Read for UartController<I, E> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.rx_state == State::BusyRx {
            return Err(Error::Busy);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        self.wait_until(|r| r.sr.is_set(SR::RXNE))?;
        let mut count = 0;
        for slot in buf.iter_mut() {
            if !self.regs().sr.is_set(SR::RXNE) {
                break;
            }
            *slot = self.regs().dr.get() as u8;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeUart {
        regs: Box<RegisterBlock>,
    }

    impl FakeUart {
        fn new() -> Self {
            Self {
                regs: Box::new(unsafe { core::mem::MaybeUninit::zeroed().assume_init() }),
            }
        }
    }

    impl Deref for FakeUart {
        type Target = RegisterBlock;

        fn deref(&self) -> &Self::Target {
            &self.regs
        }
    }

    impl Instance for FakeUart {}

    #[derive(Default)]
    struct Recorder {
        completions: Vec<(Direction, usize)>,
        errors: Vec<ErrorFlags>,
    }

    impl TransferEvents for Recorder {
        fn on_complete(&mut self, direction: Direction, size: usize) {
            self.completions.push((direction, size));
        }

        fn on_error(&mut self, errors: ErrorFlags) {
            self.errors.push(errors);
        }
    }

    fn uart(config: Config) -> UartController<FakeUart, Recorder> {
        let config = Config {
            retries: 16,
            ..config
        };
        let mut uart = UartController::with_events(FakeUart::new(), config, Recorder::default());
        uart.init();
        uart
    }

    fn leak(bytes: &[u8]) -> &'static mut [u8] {
        Box::leak(bytes.to_vec().into_boxed_slice())
    }

    #[test]
    fn init_programs_baud_and_frame() {
        let uart = uart(Config::default());
        assert_eq!(uart.tx_state(), State::Ready);
        assert_eq!(uart.rx_state(), State::Ready);
        // 16 MHz / 115200 = 138 = 8 * 16 + 10
        assert_eq!(uart.instance.brr.read(BRR::MANTISSA), 8);
        assert_eq!(uart.instance.brr.read(BRR::FRACTION), 10);
        assert!(uart.instance.cr1.is_set(CR1::UE));
        assert!(uart.instance.cr1.is_set(CR1::TE));
        assert!(uart.instance.cr1.is_set(CR1::RE));
        assert!(!uart.instance.cr1.is_set(CR1::PCE));
    }

    #[test]
    fn transmit_three_bytes_with_two_phase_completion() {
        let mut uart = uart(Config::default());
        uart.transmit(leak(b"ABC")).unwrap();
        assert_eq!(uart.tx_state(), State::BusyTx);
        assert!(uart.instance.cr1.is_set(CR1::TXEIE));

        uart.instance.sr.modify(SR::TXE::SET);
        for expected in [b'A', b'B', b'C'] {
            uart.handle_interrupt();
            assert_eq!(uart.instance.dr.get() as u8, expected);
        }

        // Count is zero: buffer interrupt swapped for the
        // transmission-complete interrupt, no completion yet.
        assert!(!uart.instance.cr1.is_set(CR1::TXEIE));
        assert!(uart.instance.cr1.is_set(CR1::TCIE));
        assert_eq!(uart.tx_state(), State::BusyTx);
        assert!(uart.events().completions.is_empty());

        uart.instance.sr.modify(SR::TC::SET);
        uart.handle_interrupt();
        assert!(!uart.instance.cr1.is_set(CR1::TCIE));
        assert_eq!(uart.tx_state(), State::Ready);
        assert_eq!(uart.events().completions, vec![(Direction::Transmit, 3)]);
    }

    #[test]
    fn completion_path_is_idempotent() {
        let mut uart = uart(Config::default());
        uart.transmit(leak(b"Z")).unwrap();
        uart.instance.sr.modify(SR::TXE::SET);
        uart.handle_interrupt();
        uart.instance.sr.modify(SR::TC::SET);
        uart.handle_interrupt();
        assert_eq!(uart.events().completions.len(), 1);

        // Stale flags, interrupts disarmed: nothing fires twice.
        uart.handle_interrupt();
        assert_eq!(uart.events().completions.len(), 1);
        assert_eq!(uart.tx_state(), State::Ready);
    }

    #[test]
    fn receive_masks_parity_bit() {
        let mut uart = uart(Config {
            parity: Parity::Even,
            ..Config::default()
        });
        uart.receive(leak(&[0; 2])).unwrap();
        assert!(uart.instance.cr1.is_set(CR1::PEIE));
        assert!(uart.instance.cr3.is_set(CR3::EIE));
        assert!(uart.instance.cr1.is_set(CR1::RXNEIE));

        uart.instance.dr.set(0xC1); // parity bit set on 'A'
        uart.instance.sr.modify(SR::RXNE::SET);
        uart.handle_interrupt();
        uart.instance.dr.set(0x42);
        uart.handle_interrupt();

        assert_eq!(uart.rx_state(), State::Ready);
        assert!(!uart.instance.cr1.is_set(CR1::RXNEIE));
        assert!(!uart.instance.cr1.is_set(CR1::PEIE));
        assert!(!uart.instance.cr3.is_set(CR3::EIE));
        assert_eq!(uart.events().completions, vec![(Direction::Receive, 2)]);
        assert_eq!(uart.take_rx_buffer().unwrap(), &[0x41, 0x42]);
    }

    #[test]
    fn receive_without_parity_keeps_full_byte() {
        let mut uart = uart(Config::default());
        uart.receive(leak(&[0; 1])).unwrap();
        uart.instance.dr.set(0xC1);
        uart.instance.sr.modify(SR::RXNE::SET);
        uart.handle_interrupt();
        assert_eq!(uart.take_rx_buffer().unwrap(), &[0xC1]);
    }

    #[test]
    fn framing_error_stops_both_directions() {
        let mut uart = uart(Config::default());
        uart.receive(leak(&[0; 4])).unwrap();

        uart.instance.sr.modify(SR::FE::SET);
        uart.handle_interrupt();

        assert_eq!(uart.error_flags(), ErrorFlags::FRAMING);
        assert_eq!(uart.rx_state(), State::Ready);
        assert_eq!(uart.tx_state(), State::Ready);
        assert!(!uart.instance.cr1.is_set(CR1::RXNEIE));
        assert!(!uart.instance.cr3.is_set(CR3::EIE));
        assert_eq!(uart.events().errors, vec![ErrorFlags::FRAMING]);

        // Stale flag with the enables cleared: reported exactly once.
        uart.handle_interrupt();
        assert_eq!(uart.events().errors.len(), 1);
    }

    #[test]
    fn overrun_and_noise_accumulate() {
        let mut uart = uart(Config::default());
        uart.receive(leak(&[0; 4])).unwrap();
        uart.instance.sr.modify(SR::ORE::SET + SR::NF::SET);
        uart.handle_interrupt();
        assert_eq!(
            uart.error_flags(),
            ErrorFlags::OVERRUN | ErrorFlags::NOISE
        );
        assert_eq!(uart.events().errors.len(), 1);
    }

    #[test]
    fn reinitiation_while_busy_is_refused() {
        let mut uart = uart(Config::default());
        uart.transmit(leak(b"xy")).unwrap();
        assert_eq!(uart.transmit(leak(b"z")).unwrap_err(), Error::Busy);
        // The receive direction is independent.
        uart.receive(leak(&[0; 1])).unwrap();
    }

    #[test]
    fn blocking_write_polls_txe() {
        use embedded_io::Write;

        let mut uart = uart(Config::default());
        uart.instance.sr.modify(SR::TXE::SET);
        assert_eq!(uart.write(b"hi").unwrap(), 2);
        assert_eq!(uart.instance.dr.get() as u8, b'i');
    }

    #[test]
    fn blocking_write_times_out_without_txe() {
        use embedded_io::Write;

        let mut uart = uart(Config::default());
        assert_eq!(uart.write(b"x").unwrap_err(), Error::Timeout);
    }

    #[test]
    fn nb_read_byte() {
        let mut uart = uart(Config::default());
        assert_eq!(uart.read_byte(), Err(nb::Error::WouldBlock));

        uart.instance.dr.set(0x55);
        uart.instance.sr.modify(SR::RXNE::SET);
        assert_eq!(uart.read_byte(), Ok(0x55));

        uart.instance.sr.modify(SR::FE::SET);
        assert_eq!(uart.read_byte(), Err(nb::Error::Other(Error::Framing)));
    }

    #[test]
    fn abort_forces_ready() {
        let mut uart = uart(Config::default());
        uart.transmit(leak(b"abc")).unwrap();
        uart.receive(leak(&[0; 3])).unwrap();
        uart.abort();
        assert_eq!(uart.tx_state(), State::Ready);
        assert_eq!(uart.rx_state(), State::Ready);
        assert!(!uart.instance.cr1.is_set(CR1::TXEIE));
        assert!(!uart.instance.cr1.is_set(CR1::RXNEIE));
    }
}
