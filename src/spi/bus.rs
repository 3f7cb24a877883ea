// Licensed under the Apache-2.0 license

//! Interrupt-driven SPI transfer state machine.
//!
//! The hardware is full duplex: a master must clock the bus by writing
//! the data register even when only received data matters, and a
//! transmitter always shifts something in. Each direction is therefore
//! tracked by its own transfer; the side the caller did not supply a
//! buffer for runs as a dummy (fixed fill frame out, discards in).
//!
//! Per invocation [`SpiPort::handle_interrupt`] services exactly one
//! flag, receive before transmit, matching the hardware's pace of one
//! frame per buffer event.

use core::ops::Deref;

use embedded_hal::spi::{Phase, Polarity};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::common::{Direction, ErrorFlags, NullEvents, Transfer, TransferEvents};
use crate::regs;
use crate::regs::spi::{RegisterBlock, CR1, CR2, SR};
use crate::spi::common::{BitOrder, DataSize, Error, Role, SpiConfig, State};

/// Frame shifted out while only the receive side carries data.
const DUMMY_FRAME: u8 = 0xFF;

/// One of the SPI peripheral instances.
pub trait Instance: Deref<Target = RegisterBlock> {}

impl Instance for regs::Spi1 {}
impl Instance for regs::Spi2 {}
impl Instance for regs::Spi3 {}

/// SPI transfer state machine over one peripheral instance.
pub struct SpiPort<I: Instance, E: TransferEvents = NullEvents> {
    instance: I,
    config: SpiConfig,
    state: State,
    tx: Transfer,
    rx: Transfer,
    errors: ErrorFlags,
    events: E,
}

impl<I: Instance> SpiPort<I, NullEvents> {
    #[must_use]
    pub fn new(instance: I, config: SpiConfig) -> Self {
        Self::with_events(instance, config, NullEvents)
    }
}

impl<I: Instance, E: TransferEvents> SpiPort<I, E> {
    #[must_use]
    pub fn with_events(instance: I, config: SpiConfig, events: E) -> Self {
        Self {
            instance,
            config,
            state: State::Reset,
            tx: Transfer::idle(),
            rx: Transfer::idle(),
            errors: ErrorFlags::NONE,
            events,
        }
    }

    fn regs(&self) -> &RegisterBlock {
        &self.instance
    }

    /// Program phase/polarity, device mode, frame format and baud
    /// rate. The peripheral itself is enabled when a transfer starts.
    pub fn init(&mut self) {
        let regs = self.regs();
        regs.cr1.modify(CR1::SPE::CLEAR);
        regs.cr1.modify(CR1::BIDIMODE::CLEAR);

        match self.config.mode.phase {
            Phase::CaptureOnFirstTransition => regs.cr1.modify(CR1::CPHA::CLEAR),
            Phase::CaptureOnSecondTransition => regs.cr1.modify(CR1::CPHA::SET),
        }
        match self.config.mode.polarity {
            Polarity::IdleLow => regs.cr1.modify(CR1::CPOL::CLEAR),
            Polarity::IdleHigh => regs.cr1.modify(CR1::CPOL::SET),
        }

        match self.config.role {
            Role::Master => regs.cr1.modify(CR1::MSTR::SET),
            Role::Slave => regs.cr1.modify(CR1::MSTR::CLEAR),
        }

        match self.config.data_size {
            DataSize::Eight => regs.cr1.modify(CR1::DFF::EightBit),
            DataSize::Sixteen => regs.cr1.modify(CR1::DFF::SixteenBit),
        }

        match self.config.bit_order {
            BitOrder::MsbFirst => regs.cr1.modify(CR1::LSBFIRST::CLEAR),
            BitOrder::LsbFirst => regs.cr1.modify(CR1::LSBFIRST::SET),
        }

        if self.config.software_nss {
            regs.cr1.modify(CR1::SSM::SET);
            if self.config.role == Role::Master {
                regs.cr1.modify(CR1::SSI::SET);
            }
        } else {
            regs.cr1.modify(CR1::SSM::CLEAR);
        }

        regs.cr1.modify(CR1::BR.val(self.config.prescaler as u32));

        self.state = State::Ready;
        self.errors = ErrorFlags::NONE;
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
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

    /// Reclaim the receive buffer once the transfer is over.
    pub fn take_rx_buffer(&mut self) -> Option<&'static mut [u8]> {
        if self.state == State::Ready {
            self.rx.take_buf()
        } else {
            None
        }
    }

    /// Reclaim the transmit buffer once the transfer is over.
    pub fn take_tx_buffer(&mut self) -> Option<&'static mut [u8]> {
        if self.state == State::Ready {
            self.tx.take_buf()
        } else {
            None
        }
    }

    /// Cancel whatever is in flight and force the handle back to ready.
    pub fn abort(&mut self) {
        self.disarm();
        self.state = State::Ready;
    }

    /// Release the peripheral singleton.
    pub fn release(self) -> I {
        self.instance
    }

    fn disarm(&self) {
        self.regs()
            .cr2
            .modify(CR2::TXEIE::CLEAR + CR2::RXNEIE::CLEAR + CR2::ERRIE::CLEAR);
    }

    fn enable(&self) {
        self.regs().cr1.modify(CR1::SPE::SET);
    }

    fn wait_until(&self, cond: impl Fn(&RegisterBlock) -> bool) -> Result<(), Error> {
        for _ in 0..self.config.retries {
            if cond(self.regs()) {
                return Ok(());
            }
        }
        Err(Error::Timeout)
    }

    fn check_length(&self, len: usize) -> Result<(), Error> {
        if len == 0 {
            return Err(Error::ZeroLength);
        }
        if self.config.data_size == DataSize::Sixteen && len % 2 != 0 {
            return Err(Error::UnalignedLength);
        }
        Ok(())
    }

    fn guard_ready(&self) -> Result<(), Error> {
        if self.state == State::Ready {
            Ok(())
        } else {
            Err(Error::Busy)
        }
    }

    /// Master transmission: arm the buffer-empty interrupt and feed
    /// one frame per event.
    pub fn master_transmit(&mut self, buffer: &'static mut [u8]) -> Result<(), Error> {
        self.guard_ready()?;
        self.check_length(buffer.len())?;
        self.errors = ErrorFlags::NONE;
        self.tx = Transfer::new(buffer);
        self.rx = Transfer::idle();
        self.state = State::BusyTx;
        self.enable();
        self.regs().cr2.modify(CR2::TXEIE::SET + CR2::ERRIE::SET);
        Ok(())
    }

    /// Master reception: a dummy transmit runs in lock-step to clock
    /// the bus while the receive side drains into the buffer.
    pub fn master_receive(&mut self, buffer: &'static mut [u8]) -> Result<(), Error> {
        self.guard_ready()?;
        self.check_length(buffer.len())?;
        self.errors = ErrorFlags::NONE;
        let len = buffer.len();
        self.rx = Transfer::new(buffer);
        self.tx = Transfer::dummy(len);
        self.state = State::BusyRx;
        self.enable();
        // Flush whatever is stale in the data register before arming.
        let _ = self.regs().dr.get();
        self.regs()
            .cr2
            .modify(CR2::RXNEIE::SET + CR2::TXEIE::SET + CR2::ERRIE::SET);
        Ok(())
    }

    /// Full-duplex master exchange of two equal-length buffers.
    pub fn master_transfer(
        &mut self,
        tx_buffer: &'static mut [u8],
        rx_buffer: &'static mut [u8],
    ) -> Result<(), Error> {
        self.guard_ready()?;
        if tx_buffer.len() != rx_buffer.len() {
            return Err(Error::LengthMismatch);
        }
        self.check_length(tx_buffer.len())?;
        self.errors = ErrorFlags::NONE;
        self.tx = Transfer::new(tx_buffer);
        self.rx = Transfer::new(rx_buffer);
        self.state = State::BusyTxRx;
        self.enable();
        let _ = self.regs().dr.get();
        self.regs()
            .cr2
            .modify(CR2::RXNEIE::SET + CR2::TXEIE::SET + CR2::ERRIE::SET);
        Ok(())
    }

    /// Slave transmission: the master clocks the bus, we keep the
    /// shift register fed and drain the mirrored receive stream.
    pub fn slave_transmit(&mut self, buffer: &'static mut [u8]) -> Result<(), Error> {
        self.guard_ready()?;
        self.check_length(buffer.len())?;
        self.errors = ErrorFlags::NONE;
        let len = buffer.len();
        self.tx = Transfer::new(buffer);
        self.rx = Transfer::dummy(len);
        self.state = State::BusyTx;
        self.enable();
        self.regs()
            .cr2
            .modify(CR2::RXNEIE::SET + CR2::TXEIE::SET + CR2::ERRIE::SET);
        Ok(())
    }

    /// Slave reception: drain one frame per buffer event, no clocks
    /// generated on this side.
    pub fn slave_receive(&mut self, buffer: &'static mut [u8]) -> Result<(), Error> {
        self.guard_ready()?;
        self.check_length(buffer.len())?;
        self.errors = ErrorFlags::NONE;
        self.rx = Transfer::new(buffer);
        self.tx = Transfer::idle();
        self.state = State::BusyRx;
        self.enable();
        self.regs().cr2.modify(CR2::RXNEIE::SET + CR2::ERRIE::SET);
        Ok(())
    }

    /// Interrupt entry point. Exactly one flag is serviced per
    /// invocation; errors preempt data and receive preempts transmit.
    pub fn handle_interrupt(&mut self) {
        let sr = self.regs().sr.extract();

        if self.regs().cr2.is_set(CR2::ERRIE) && (sr.is_set(SR::OVR) || sr.is_set(SR::MODF)) {
            self.handle_error(sr.is_set(SR::OVR), sr.is_set(SR::MODF));
            return;
        }

        if sr.is_set(SR::RXNE) && self.regs().cr2.is_set(CR2::RXNEIE) {
            self.handle_rxne();
            return;
        }

        if sr.is_set(SR::TXE) && self.regs().cr2.is_set(CR2::TXEIE) {
            self.handle_txe();
        }
    }

    fn handle_txe(&mut self) {
        match self.config.data_size {
            DataSize::Eight => {
                if let Some(byte) = self.tx.next_out(DUMMY_FRAME) {
                    self.regs().dr.set(u32::from(byte));
                }
            }
            DataSize::Sixteen => {
                if let Some(frame) = self.tx.next_out_u16(DUMMY_FRAME) {
                    self.regs().dr.set(u32::from(frame));
                }
            }
        }
        if !self.tx.in_progress() {
            self.close_tx();
        }
    }

    fn handle_rxne(&mut self) {
        match self.config.data_size {
            DataSize::Eight => {
                let byte = self.regs().dr.get() as u8;
                self.rx.put_in(byte);
            }
            DataSize::Sixteen => {
                let frame = self.regs().dr.get() as u16;
                self.rx.put_in_u16(frame);
            }
        }
        if !self.rx.in_progress() {
            self.close_rx();
        }
    }

    fn close_tx(&mut self) {
        self.regs().cr2.modify(CR2::TXEIE::CLEAR);
        // A transmit-only master is done here; every other shape waits
        // for the receive side to drain.
        if self.config.role == Role::Master && self.state == State::BusyTx {
            self.state = State::Ready;
            let size = self.tx.size();
            self.events.on_complete(Direction::Transmit, size);
        }
    }

    fn close_rx(&mut self) {
        // The last clock edge must have completed before the receive
        // interrupt is disarmed.
        if self.wait_until(|r| !r.sr.is_set(SR::BSY)).is_err() {
            self.errors.insert(ErrorFlags::TIMEOUT);
        }
        self.regs().cr2.modify(CR2::RXNEIE::CLEAR);

        let (direction, size) = match self.state {
            State::BusyTx => (Direction::Transmit, self.tx.size()),
            _ => (Direction::Receive, self.rx.size()),
        };
        self.state = State::Ready;
        if self.errors.is_empty() {
            self.events.on_complete(direction, size);
        } else {
            let errors = self.errors;
            self.events.on_error(errors);
        }
    }

    fn handle_error(&mut self, overrun: bool, mode_fault: bool) {
        let before = self.errors;
        if overrun {
            // Overrun is acknowledged by reading DR then SR.
            let _ = self.regs().dr.get();
            let _ = self.regs().sr.get();
            self.errors.insert(ErrorFlags::OVERRUN);
        }
        if mode_fault {
            // Mode fault is acknowledged by an SR read and a CR1 write.
            let _ = self.regs().sr.get();
            let cr1 = self.regs().cr1.get();
            self.regs().cr1.set(cr1);
            self.errors.insert(ErrorFlags::MODE_FAULT);
        }
        if self.errors != before {
            self.disarm();
            self.state = State::Ready;
            let errors = self.errors;
            self.events.on_error(errors);
        }
    }

    // Blocking, polled exchange used by the embedded-hal controller.

    pub(crate) fn transfer_frame_polled(&mut self, out: u8) -> Result<u8, Error> {
        self.guard_ready()?;
        self.enable();
        if self.wait_until(|r| r.sr.is_set(SR::TXE)).is_err() {
            self.errors.insert(ErrorFlags::TIMEOUT);
            return Err(Error::Timeout);
        }
        self.regs().dr.set(u32::from(out));
        if self.wait_until(|r| r.sr.is_set(SR::RXNE)).is_err() {
            self.errors.insert(ErrorFlags::TIMEOUT);
            return Err(Error::Timeout);
        }
        Ok(self.regs().dr.get() as u8)
    }

    pub(crate) fn flush_polled(&mut self) -> Result<(), Error> {
        if self.wait_until(|r| r.sr.is_set(SR::TXE)).is_err()
            || self.wait_until(|r| !r.sr.is_set(SR::BSY)).is_err()
        {
            self.errors.insert(ErrorFlags::TIMEOUT);
            return Err(Error::Timeout);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::{Deref, Instance, RegisterBlock, SR};
    use tock_registers::interfaces::ReadWriteable;

    pub(crate) struct FakeSpi {
        pub(crate) regs: Box<RegisterBlock>,
    }

    impl FakeSpi {
        pub(crate) fn new() -> Self {
            Self {
                regs: Box::new(unsafe { core::mem::MaybeUninit::zeroed().assume_init() }),
            }
        }

        /// Fake whose shift register is permanently ready, for the
        /// polled paths.
        pub(crate) fn ready() -> Self {
            let fake = Self::new();
            fake.regs.sr.modify(SR::TXE::SET + SR::RXNE::SET);
            fake
        }
    }

    impl Deref for FakeSpi {
        type Target = RegisterBlock;

        fn deref(&self) -> &Self::Target {
            &self.regs
        }
    }

    impl Instance for FakeSpi {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::bus::tests_support::FakeSpi;
    use crate::spi::common::SpiConfigBuilder;

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

    fn port(builder: SpiConfigBuilder) -> SpiPort<FakeSpi, Recorder> {
        let config = builder.retries(16).build();
        let mut port = SpiPort::with_events(FakeSpi::new(), config, Recorder::default());
        port.init();
        port
    }

    fn leak(bytes: &[u8]) -> &'static mut [u8] {
        Box::leak(bytes.to_vec().into_boxed_slice())
    }

    #[test]
    fn init_programs_master_mode() {
        let port = port(SpiConfigBuilder::new());
        assert_eq!(port.state(), State::Ready);
        assert!(port.instance.cr1.is_set(CR1::MSTR));
        assert!(port.instance.cr1.is_set(CR1::SSM));
        assert!(port.instance.cr1.is_set(CR1::SSI));
        assert!(!port.instance.cr1.is_set(CR1::DFF));
        assert_eq!(port.instance.cr1.read(CR1::BR), 0b100);
        assert!(!port.instance.cr1.is_set(CR1::SPE));
    }

    #[test]
    fn master_transmit_eight_bit_frames() {
        let mut port = port(SpiConfigBuilder::new());
        port.master_transmit(leak(&[1, 2, 3])).unwrap();
        assert_eq!(port.state(), State::BusyTx);
        assert!(port.instance.cr1.is_set(CR1::SPE));
        assert!(port.instance.cr2.is_set(CR2::TXEIE));
        assert!(!port.instance.cr2.is_set(CR2::RXNEIE));

        port.instance.sr.modify(SR::TXE::SET);
        for expected in 1u8..=3 {
            port.handle_interrupt();
            assert_eq!(port.instance.dr.get() as u8, expected);
        }
        assert!(!port.instance.cr2.is_set(CR2::TXEIE));
        assert_eq!(port.state(), State::Ready);
        assert_eq!(port.events().completions, vec![(Direction::Transmit, 3)]);
    }

    #[test]
    fn master_receive_sixteen_bit_lock_step() {
        let mut port = port(SpiConfigBuilder::new().data_size(DataSize::Sixteen));
        port.master_receive(leak(&[0; 4])).unwrap();
        assert_eq!(port.state(), State::BusyRx);
        assert!(port.instance.cr2.is_set(CR2::RXNEIE));
        assert!(port.instance.cr2.is_set(CR2::TXEIE));

        // Dummy TX clocks the first frame out.
        port.instance.sr.modify(SR::TXE::SET);
        port.handle_interrupt();
        assert_eq!(port.instance.dr.get() as u16, 0xFFFF);
        assert_eq!(port.tx.remaining(), 2);
        port.instance.sr.modify(SR::TXE::CLEAR);

        // First frame arrives.
        port.instance.dr.set(0xAABB);
        port.instance.sr.modify(SR::RXNE::SET);
        port.handle_interrupt();
        assert_eq!(port.rx.remaining(), 2);
        port.instance.sr.modify(SR::RXNE::CLEAR);

        // Second dummy, second frame.
        port.instance.sr.modify(SR::TXE::SET);
        port.handle_interrupt();
        port.instance.sr.modify(SR::TXE::CLEAR);
        port.instance.dr.set(0xCCDD);
        port.instance.sr.modify(SR::RXNE::SET);
        port.handle_interrupt();

        // BSY is clear in the fake, so the close completes at once.
        assert_eq!(port.state(), State::Ready);
        assert!(!port.instance.cr2.is_set(CR2::RXNEIE));
        assert_eq!(port.events().completions, vec![(Direction::Receive, 4)]);
        let buf = port.take_rx_buffer().unwrap();
        assert_eq!(buf, &[0xBB, 0xAA, 0xDD, 0xCC]);
    }

    #[test]
    fn receive_takes_priority_over_transmit() {
        let mut port = port(SpiConfigBuilder::new());
        port.master_receive(leak(&[0; 2])).unwrap();

        port.instance.dr.set(0x55);
        port.instance.sr.modify(SR::TXE::SET + SR::RXNE::SET);
        let tx_before = port.tx.remaining();
        port.handle_interrupt();
        // Only the receive side moved in this invocation.
        assert_eq!(port.rx.remaining(), 1);
        assert_eq!(port.tx.remaining(), tx_before);
    }

    #[test]
    fn slave_receive_drains_without_clocking() {
        let mut port = port(SpiConfigBuilder::new().role(Role::Slave));
        port.slave_receive(leak(&[0; 2])).unwrap();
        assert!(port.instance.cr2.is_set(CR2::RXNEIE));
        assert!(!port.instance.cr2.is_set(CR2::TXEIE));

        for byte in [0x12u8, 0x34] {
            port.instance.dr.set(u32::from(byte));
            port.instance.sr.modify(SR::RXNE::SET);
            port.handle_interrupt();
        }
        assert_eq!(port.state(), State::Ready);
        assert_eq!(port.events().completions, vec![(Direction::Receive, 2)]);
        assert_eq!(port.take_rx_buffer().unwrap(), &[0x12, 0x34]);
    }

    #[test]
    fn slave_transmit_completes_when_mirror_drains() {
        let mut port = port(SpiConfigBuilder::new().role(Role::Slave));
        port.slave_transmit(leak(&[0xA1, 0xA2])).unwrap();

        for expected in [0xA1u8, 0xA2] {
            port.instance.sr.modify(SR::TXE::SET);
            port.instance.sr.modify(SR::RXNE::CLEAR);
            port.handle_interrupt();
            assert_eq!(port.instance.dr.get() as u8, expected);
            port.instance.sr.modify(SR::TXE::CLEAR);
            port.instance.sr.modify(SR::RXNE::SET);
            port.handle_interrupt();
        }

        // TX side alone does not finish a slave transfer...
        assert!(!port.instance.cr2.is_set(CR2::TXEIE));
        // ...the mirrored receive stream does, and it reports the
        // transmit direction.
        assert_eq!(port.state(), State::Ready);
        assert_eq!(port.events().completions, vec![(Direction::Transmit, 2)]);
    }

    #[test]
    fn full_duplex_master_transfer() {
        let mut port = port(SpiConfigBuilder::new());
        port.master_transfer(leak(&[0x10, 0x20]), leak(&[0; 2]))
            .unwrap();
        assert_eq!(port.state(), State::BusyTxRx);

        for (out, inp) in [(0x10u8, 0x91u8), (0x20, 0x92)] {
            port.instance.sr.modify(SR::TXE::SET);
            port.instance.sr.modify(SR::RXNE::CLEAR);
            port.handle_interrupt();
            assert_eq!(port.instance.dr.get() as u8, out);
            port.instance.sr.modify(SR::TXE::CLEAR);
            port.instance.dr.set(u32::from(inp));
            port.instance.sr.modify(SR::RXNE::SET);
            port.handle_interrupt();
        }

        assert_eq!(port.state(), State::Ready);
        assert_eq!(port.events().completions, vec![(Direction::Receive, 2)]);
        assert_eq!(port.take_rx_buffer().unwrap(), &[0x91, 0x92]);
    }

    #[test]
    fn overrun_is_decoded_and_reported_once() {
        let mut port = port(SpiConfigBuilder::new());
        port.master_receive(leak(&[0; 2])).unwrap();

        port.instance.sr.modify(SR::OVR::SET);
        port.handle_interrupt();
        assert_eq!(port.error_flags(), ErrorFlags::OVERRUN);
        assert_eq!(port.state(), State::Ready);
        assert!(!port.instance.cr2.is_set(CR2::RXNEIE));
        assert!(!port.instance.cr2.is_set(CR2::TXEIE));
        assert_eq!(port.events().errors, vec![ErrorFlags::OVERRUN]);

        // Disarmed: the stale flag cannot fire the callback again.
        port.handle_interrupt();
        assert_eq!(port.events().errors.len(), 1);
    }

    #[test]
    fn sixteen_bit_rejects_odd_lengths() {
        let mut port = port(SpiConfigBuilder::new().data_size(DataSize::Sixteen));
        let err = port.master_transmit(leak(&[1, 2, 3])).unwrap_err();
        assert_eq!(err, Error::UnalignedLength);
        assert_eq!(port.state(), State::Ready);
    }

    #[test]
    fn reinitiation_while_busy_is_refused() {
        let mut port = port(SpiConfigBuilder::new());
        port.master_transmit(leak(&[1])).unwrap();
        assert_eq!(port.master_transmit(leak(&[2])).unwrap_err(), Error::Busy);
    }

    #[test]
    fn abort_disarms_everything() {
        let mut port = port(SpiConfigBuilder::new());
        port.master_receive(leak(&[0; 8])).unwrap();
        port.abort();
        assert_eq!(port.state(), State::Ready);
        assert!(!port.instance.cr2.is_set(CR2::TXEIE));
        assert!(!port.instance.cr2.is_set(CR2::RXNEIE));
        assert!(!port.instance.cr2.is_set(CR2::ERRIE));
    }
}
