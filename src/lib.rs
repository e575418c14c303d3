#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

#[macro_use]
pub mod registers;
pub mod bus;
pub mod calibration;
pub mod compensation;
pub mod config;
pub mod measurement;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::spi::{self, Phase, Polarity};
use log::{debug, warn};

use bus::Bus;
use calibration::Calibration;
use compensation::{RawPressure, RawTemperature};
use config::{CalibrationPolicy, Config};
use measurement::{Conversion, Quantity};
use registers::{Accuracy, Register, CALIBRATION_LENGTH, ID, RESET};

pub const DEFAULT_SPI_MODE: spi::Mode =
    spi::Mode { polarity: Polarity::IdleHigh, phase: Phase::CaptureOnSecondTransition };
pub const ALTERNATE_SPI_MODE: spi::Mode =
    spi::Mode { polarity: Polarity::IdleLow, phase: Phase::CaptureOnFirstTransition };

#[derive(Debug, PartialEq)]
pub enum Error<E> {
    Bus(E),
    /// The sensor kept reporting `measuring` for the whole poll budget.
    Timeout,
}

/// A compensated sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Hundredths of a degree Celsius.
    pub temperature: i32,
    /// Pa.
    pub pressure: u32,
}

pub struct BMP280<BUS> {
    bus: BUS,
    config: Config,
    calibration: Option<Calibration>,
}

impl<E, BUS: Bus<Error = E>> BMP280<BUS> {
    pub fn new(bus: BUS) -> Self {
        Self::with_config(bus, Config::default())
    }

    pub fn with_config(bus: BUS, config: Config) -> Self {
        BMP280 { bus, config, calibration: None }
    }

    pub fn free(self) -> BUS {
        self.bus
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks the chip id. A bus failure counts as a mismatch.
    pub fn verify(&mut self) -> bool {
        match self.bus.read(Register::Id) {
            Ok(ID) => true,
            Ok(id) => {
                warn!("unexpected chip id {:#04x}", id);
                false
            }
            Err(_) => {
                warn!("failed to read chip id");
                false
            }
        }
    }

    /// Soft reset. Cached coefficients are dropped since the device reloads them.
    pub fn reset<D: DelayMs<u8>>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        self.calibration = None;
        self.bus.write(Register::Reset, RESET).map_err(Error::Bus)?;
        delay.delay_ms(2u8);
        Ok(())
    }

    /// Reads the coefficient block and caches it for later compensation.
    pub fn read_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let mut bytes = [0u8; CALIBRATION_LENGTH];
        self.bus.reads(Register::Calib0, &mut bytes).map_err(Error::Bus)?;
        let calibration = Calibration::from_bytes(&bytes);
        debug!("calibration {:?}", calibration);
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    fn current_calibration(&mut self) -> Result<Calibration, Error<E>> {
        match (self.config.calibration, self.calibration) {
            (CalibrationPolicy::Cached, Some(calibration)) => Ok(calibration),
            _ => self.read_calibration(),
        }
    }

    fn convert<D>(
        &mut self,
        quantity: Quantity,
        accuracy: Accuracy,
        delay: &mut D,
    ) -> Result<u32, Error<E>>
    where
        D: DelayMs<u8>,
    {
        let mut conversion = Conversion::new(quantity, accuracy.oversampling());
        conversion.run(&mut self.bus, delay, &self.config.poll)
    }

    pub fn read_uncompensated_temperature<D>(
        &mut self,
        accuracy: Accuracy,
        delay: &mut D,
    ) -> Result<RawTemperature, Error<E>>
    where
        D: DelayMs<u8>,
    {
        let adc = self.convert(Quantity::Temperature, accuracy, delay)?;
        Ok(RawTemperature::new(adc))
    }

    pub fn read_uncompensated_pressure<D>(
        &mut self,
        accuracy: Accuracy,
        delay: &mut D,
    ) -> Result<RawPressure, Error<E>>
    where
        D: DelayMs<u8>,
    {
        let adc = self.convert(Quantity::Pressure, accuracy, delay)?;
        Ok(RawPressure::new(adc))
    }

    /// Converts temperature then pressure and compensates both with the same fine temperature.
    pub fn read_measurement<D>(
        &mut self,
        accuracy: Accuracy,
        delay: &mut D,
    ) -> Result<Measurement, Error<E>>
    where
        D: DelayMs<u8>,
    {
        let raw_temperature = self.read_uncompensated_temperature(accuracy, delay)?;
        let raw_pressure = self.read_uncompensated_pressure(accuracy, delay)?;
        debug!("adc_T={} adc_P={}", raw_temperature.value(), raw_pressure.value());
        let calibration = self.current_calibration()?;
        let t_fine = raw_temperature.t_fine(&calibration);
        let measurement = Measurement {
            temperature: t_fine.degree_celsius_x100(),
            pressure: raw_pressure.compensated(t_fine, &calibration),
        };
        debug!("{:?}", measurement);
        Ok(measurement)
    }

    /// Temperature in hundredths of a degree Celsius.
    pub fn read_temperature<D>(
        &mut self,
        accuracy: Accuracy,
        delay: &mut D,
    ) -> Result<i32, Error<E>>
    where
        D: DelayMs<u8>,
    {
        let raw = self.read_uncompensated_temperature(accuracy, delay)?;
        let calibration = self.current_calibration()?;
        Ok(raw.compensated(&calibration))
    }

    pub fn read_pressure_pa<D>(
        &mut self,
        accuracy: Accuracy,
        delay: &mut D,
    ) -> Result<u32, Error<E>>
    where
        D: DelayMs<u8>,
    {
        Ok(self.read_measurement(accuracy, delay)?.pressure)
    }
}
