//! Forced-mode conversion of a single quantity: trigger, poll `measuring`, read the result.

use embedded_hal::blocking::delay::DelayMs;
use log::{debug, warn};

use crate::bus::Bus;
use crate::compensation::decode_raw;
use crate::config::{Exhausted, PollPolicy};
use crate::registers::{Mode, Oversampling, Register, STATUS_MEASURING};
use crate::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Quantity {
    Temperature,
    Pressure,
}

impl Quantity {
    fn oversampling_offset(self) -> u8 {
        match self {
            Quantity::Temperature => 5,
            Quantity::Pressure => 2,
        }
    }

    pub fn data_register(self) -> Register {
        match self {
            Quantity::Temperature => Register::TemperatureMsb,
            Quantity::Pressure => Register::PressureMsb,
        }
    }

    /// `ctrl_meas` value starting a forced conversion of this quantity only.
    pub fn control(self, oversampling: Oversampling) -> u8 {
        Mode::Forced as u8 | (oversampling as u8) << self.oversampling_offset()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Triggered,
    Polling { attempt: u8 },
    Complete,
    Failed,
}

pub struct Conversion {
    quantity: Quantity,
    oversampling: Oversampling,
    state: State,
}

impl Conversion {
    pub fn new(quantity: Quantity, oversampling: Oversampling) -> Self {
        Self { quantity, oversampling, state: State::Idle }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn check<T, E>(&mut self, result: Result<T, E>) -> Result<T, Error<E>> {
        result.map_err(|e| {
            self.state = State::Failed;
            Error::Bus(e)
        })
    }

    pub fn trigger<B: Bus>(&mut self, bus: &mut B) -> Result<(), Error<B::Error>> {
        let value = self.quantity.control(self.oversampling);
        let result = bus.write(Register::ControlMeasurement, value);
        self.check(result)?;
        self.state = State::Triggered;
        Ok(())
    }

    /// Waits for `measuring` to clear, sleeping only after a busy status.
    pub fn poll<B, D>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        policy: &PollPolicy,
    ) -> Result<(), Error<B::Error>>
    where
        B: Bus,
        D: DelayMs<u8>,
    {
        for attempt in 0..policy.polls() {
            self.state = State::Polling { attempt };
            let result = bus.read(Register::Status);
            let status = self.check(result)?;
            if status & STATUS_MEASURING == 0 {
                debug!("{:?} conversion ready after {} polls", self.quantity, attempt + 1);
                return Ok(());
            }
            delay.delay_ms(policy.interval_ms);
        }
        match policy.on_exhausted {
            Exhausted::ReadAnyway => {
                warn!("{:?} still measuring after {} ms", self.quantity, policy.budget_ms());
                Ok(())
            }
            Exhausted::Fail => {
                self.state = State::Failed;
                Err(Error::Timeout)
            }
        }
    }

    pub fn read<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Error<B::Error>> {
        let mut bytes = [0u8; 3];
        let result = bus.reads(self.quantity.data_register(), &mut bytes);
        self.check(result)?;
        self.state = State::Complete;
        Ok(decode_raw(&bytes))
    }

    pub fn run<B, D>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        policy: &PollPolicy,
    ) -> Result<u32, Error<B::Error>>
    where
        B: Bus,
        D: DelayMs<u8>,
    {
        self.trigger(bus)?;
        self.poll(bus, delay, policy)?;
        self.read(bus)
    }
}

#[cfg(test)]
mod test {
    use std::io::ErrorKind;
    use std::vec::Vec;

    use embedded_hal::blocking::delay::DelayMs;
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use embedded_hal_mock::MockError;

    use super::{Conversion, Quantity, State};
    use crate::bus::{I2cAddress, I2cBus, I2cError};
    use crate::config::{Exhausted, PollPolicy};
    use crate::registers::Oversampling;
    use crate::Error;

    const ADDR: u8 = 0x76;

    #[derive(Default)]
    struct CountingDelay {
        calls: usize,
        total_ms: u32,
    }

    impl DelayMs<u8> for CountingDelay {
        fn delay_ms(&mut self, ms: u8) {
            self.calls += 1;
            self.total_ms += ms as u32;
        }
    }

    fn status(value: u8) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![0xf3], vec![value])
    }

    #[test]
    fn control_values() {
        assert_eq!(Quantity::Temperature.control(Oversampling::X8), 0x81);
        assert_eq!(Quantity::Pressure.control(Oversampling::X8), 0x11);
        assert_eq!(Quantity::Temperature.control(Oversampling::X1), 0x21);
        assert_eq!(Quantity::Pressure.control(Oversampling::X16), 0x15);
        assert_eq!(Quantity::Pressure.control(Oversampling::Skipped), 0x01);
    }

    #[test]
    fn ready_on_first_poll_does_not_sleep() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xf4, 0x21]),
            status(0xf7),
            I2cTransaction::write_read(ADDR, vec![0xfa], vec![0x7e, 0xed, 0x00]),
        ]);
        let mut bus = I2cBus::new(i2c, I2cAddress::SdoToGnd);
        let mut delay = CountingDelay::default();
        let mut conversion = Conversion::new(Quantity::Temperature, Oversampling::X1);
        assert_eq!(conversion.state(), State::Idle);
        let raw = conversion.run(&mut bus, &mut delay, &PollPolicy::default()).unwrap();
        assert_eq!(raw, 519888);
        assert_eq!(conversion.state(), State::Complete);
        assert_eq!(delay.calls, 0);
        bus.free().done();
    }

    #[test]
    fn sleeps_between_busy_polls() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xf4, 0x15]),
            status(0x08),
            status(0x09),
            status(0x01),
            I2cTransaction::write_read(ADDR, vec![0xf7], vec![0x65, 0x5a, 0xc0]),
        ]);
        let mut bus = I2cBus::new(i2c, I2cAddress::SdoToGnd);
        let mut delay = CountingDelay::default();
        let mut conversion = Conversion::new(Quantity::Pressure, Oversampling::X16);
        let raw = conversion.run(&mut bus, &mut delay, &PollPolicy::default()).unwrap();
        assert_eq!(raw, 415148);
        assert_eq!(delay.calls, 2);
        assert_eq!(delay.total_ms, 10);
        bus.free().done();
    }

    fn persistently_busy(read_data: bool) -> Vec<I2cTransaction> {
        let mut expectations = vec![I2cTransaction::write(ADDR, vec![0xf4, 0x21])];
        expectations.extend((0..30).map(|_| status(0x08)));
        if read_data {
            expectations.push(I2cTransaction::write_read(ADDR, vec![0xfa], vec![0x80, 0x00, 0x00]));
        }
        expectations
    }

    #[test]
    fn exhausted_budget_reads_anyway() {
        let i2c = I2cMock::new(&persistently_busy(true));
        let mut bus = I2cBus::new(i2c, I2cAddress::SdoToGnd);
        let mut delay = CountingDelay::default();
        let mut conversion = Conversion::new(Quantity::Temperature, Oversampling::X1);
        let raw = conversion.run(&mut bus, &mut delay, &PollPolicy::default()).unwrap();
        assert_eq!(raw, 0x80000);
        assert_eq!(delay.calls, 30);
        assert_eq!(delay.total_ms, 150);
        bus.free().done();
    }

    #[test]
    fn exhausted_budget_fails_when_strict() {
        let i2c = I2cMock::new(&persistently_busy(false));
        let mut bus = I2cBus::new(i2c, I2cAddress::SdoToGnd);
        let mut delay = CountingDelay::default();
        let policy = PollPolicy { on_exhausted: Exhausted::Fail, ..PollPolicy::default() };
        let mut conversion = Conversion::new(Quantity::Temperature, Oversampling::X1);
        let result = conversion.run(&mut bus, &mut delay, &policy);
        assert!(matches!(result, Err(Error::Timeout)));
        assert_eq!(conversion.state(), State::Failed);
        assert_eq!(delay.calls, 30);
        bus.free().done();
    }

    #[test]
    fn zero_budget_still_reads_status() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xf4, 0x21]),
            status(0x08),
            I2cTransaction::write(ADDR, vec![0xf4, 0x21]),
            status(0x00),
            I2cTransaction::write_read(ADDR, vec![0xfa], vec![0x7e, 0xed, 0x00]),
        ]);
        let mut bus = I2cBus::new(i2c, I2cAddress::SdoToGnd);
        let mut delay = CountingDelay::default();
        let lenient = PollPolicy { attempts: 0, ..PollPolicy::default() };
        let strict = PollPolicy { on_exhausted: Exhausted::Fail, ..lenient };
        let mut conversion = Conversion::new(Quantity::Temperature, Oversampling::X1);
        let result = conversion.run(&mut bus, &mut delay, &strict);
        assert!(matches!(result, Err(Error::Timeout)));
        assert_eq!(delay.calls, 1);

        let mut conversion = Conversion::new(Quantity::Temperature, Oversampling::X1);
        assert_eq!(conversion.run(&mut bus, &mut delay, &lenient).unwrap(), 519888);
        assert_eq!(delay.calls, 1);
        bus.free().done();
    }

    #[test]
    fn trigger_failure_aborts() {
        let i2c = I2cMock::new(&[I2cTransaction::write(ADDR, vec![0xf4, 0x21])
            .with_error(MockError::Io(ErrorKind::Other))]);
        let mut bus = I2cBus::new(i2c, I2cAddress::SdoToGnd);
        let mut delay = CountingDelay::default();
        let mut conversion = Conversion::new(Quantity::Temperature, Oversampling::X1);
        let result = conversion.run(&mut bus, &mut delay, &PollPolicy::default());
        assert!(matches!(result, Err(Error::Bus(I2cError::WriteError(_)))));
        assert_eq!(conversion.state(), State::Failed);
        bus.free().done();
    }

    #[test]
    fn status_failure_aborts_polling() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0xf4, 0x11]),
            status(0x08),
            status(0x00).with_error(MockError::Io(ErrorKind::Other)),
        ]);
        let mut bus = I2cBus::new(i2c, I2cAddress::SdoToGnd);
        let mut delay = CountingDelay::default();
        let mut conversion = Conversion::new(Quantity::Pressure, Oversampling::X8);
        let result = conversion.run(&mut bus, &mut delay, &PollPolicy::default());
        assert!(matches!(result, Err(Error::Bus(I2cError::ReadError(_)))));
        assert_eq!(conversion.state(), State::Failed);
        assert_eq!(delay.calls, 1);
        bus.free().done();
    }
}
