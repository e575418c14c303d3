use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c;
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

use super::registers::Register;

/// Register level access to the sensor.
///
/// Implementations own the underlying peripheral, so the transport stays acquired for as long
/// as the driver holds it and is handed back through `free`.
pub trait Bus {
    type Error;
    fn write(&mut self, reg: Register, value: u8) -> Result<(), Self::Error>;
    fn read(&mut self, reg: Register) -> Result<u8, Self::Error>;
    fn reads(&mut self, reg: Register, output: &mut [u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, PartialEq)]
pub enum SpiError<WE, TE, OE> {
    WriteError(WE),
    TransferError(TE),
    OutputPinError(OE),
}

pub struct SpiBus<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
}

impl<SPI, CS, D> SpiBus<SPI, CS, D>
where
    SPI: spi::Transfer<u8> + spi::Write<u8>,
    CS: OutputPin,
    D: DelayUs<u8>,
{
    pub fn new(spi: SPI, cs: CS, delay: D) -> Self {
        Self { spi, cs, delay }
    }

    pub fn free(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }
}

impl<WE, TE, OE, SPI, CS, D> SpiBus<SPI, CS, D>
where
    SPI: spi::Transfer<u8, Error = TE> + spi::Write<u8, Error = WE>,
    CS: OutputPin<Error = OE>,
{
    /// Runs `f` with chip select asserted. Chip select is deasserted afterwards whether or not
    /// the transfer succeeded.
    fn selected<T, F>(&mut self, f: F) -> Result<T, SpiError<WE, TE, OE>>
    where
        F: FnOnce(&mut SPI) -> Result<T, SpiError<WE, TE, OE>>,
    {
        self.cs.set_low().map_err(SpiError::OutputPinError)?;
        let result = f(&mut self.spi);
        let deselect = self.cs.set_high().map_err(SpiError::OutputPinError);
        let value = result?;
        deselect?;
        Ok(value)
    }
}

impl<WE, TE, OE, SPI, CS, D> Bus for SpiBus<SPI, CS, D>
where
    SPI: spi::Transfer<u8, Error = TE> + spi::Write<u8, Error = WE>,
    CS: OutputPin<Error = OE>,
    D: DelayUs<u8>,
{
    type Error = SpiError<WE, TE, OE>;

    fn write(&mut self, reg: Register, value: u8) -> Result<(), Self::Error> {
        let bytes = [reg as u8 & 0x7F, value];
        let result = self.selected(|spi| spi.write(&bytes).map_err(SpiError::WriteError));
        self.delay.delay_us(1);
        result
    }

    fn read(&mut self, reg: Register) -> Result<u8, Self::Error> {
        let mut value = [0u8];
        self.reads(reg, &mut value)?;
        Ok(value[0])
    }

    fn reads(&mut self, reg: Register, output: &mut [u8]) -> Result<(), Self::Error> {
        self.selected(|spi| {
            spi.write(&[reg as u8 | 0x80]).map_err(SpiError::WriteError)?;
            spi.transfer(output).map_err(SpiError::TransferError)?;
            Ok(())
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum I2cError<WE, RE> {
    WriteError(WE),
    ReadError(RE),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum I2cAddress {
    SdoToGnd,
    SdoToInterfaceSupplyVoltage,
    Other(u8),
}

impl I2cAddress {
    pub fn value(self) -> u8 {
        match self {
            I2cAddress::SdoToGnd => 0x76,
            I2cAddress::SdoToInterfaceSupplyVoltage => 0x77,
            I2cAddress::Other(addr) => addr,
        }
    }
}

impl From<u8> for I2cAddress {
    fn from(addr: u8) -> Self {
        match addr {
            0x76 => I2cAddress::SdoToGnd,
            0x77 => I2cAddress::SdoToInterfaceSupplyVoltage,
            _ => I2cAddress::Other(addr),
        }
    }
}

pub struct I2cBus<I2C> {
    i2c: I2C,
    addr: I2cAddress,
}

impl<I2C> I2cBus<I2C> {
    pub fn new(i2c: I2C, addr: I2cAddress) -> Self {
        Self { i2c, addr }
    }

    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C, WE, RE> Bus for I2cBus<I2C>
where
    I2C: i2c::WriteRead<Error = RE> + i2c::Write<Error = WE>,
{
    type Error = I2cError<WE, RE>;

    fn write(&mut self, reg: Register, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.addr.value(), &[reg as u8, value]).map_err(I2cError::WriteError)
    }

    fn read(&mut self, reg: Register) -> Result<u8, Self::Error> {
        let mut value = [0u8];
        self.reads(reg, &mut value)?;
        Ok(value[0])
    }

    fn reads(&mut self, reg: Register, output: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.addr.value(), &[reg as u8], output).map_err(I2cError::ReadError)
    }
}
