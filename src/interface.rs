//! Register transport used by the driver, plus the `embedded-hal` I2C adapter.

use crate::registers::{DEFAULT_I2C_ADDRESS, RegisterAddress};

/// Largest burst accepted by [`I2cInterface::write_registers`].
const MAX_BURST: usize = 16;

/// Single- and multi-register access to the device.
///
/// Implementations report failures immediately; the driver never retries.
pub trait RegisterInterface {
    type Error;

    fn write_register(&mut self, address: RegisterAddress, value: u8) -> Result<(), Self::Error>;

    fn read_register(&mut self, address: RegisterAddress) -> Result<u8, Self::Error>;

    /// Read `buf.len()` consecutive registers starting at `address`.
    fn read_registers(&mut self, address: RegisterAddress, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write consecutive registers starting at `address`.
    fn write_registers(&mut self, address: RegisterAddress, data: &[u8]) -> Result<(), Self::Error>;
}

/// I2C errors as seen through [`I2cInterface`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cError<E> {
    I2c(E),
    /// Burst longer than the adapter's transmit buffer.
    BurstTooLong,
}

/// [`RegisterInterface`] over an `embedded-hal` I2C bus.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create an interface at the default device address (0x6B).
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEFAULT_I2C_ADDRESS,
        }
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Return the 7-bit I2C address configured for this instance.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> RegisterInterface for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    type Error = I2cError<I2C::Error>;

    fn write_register(&mut self, address: RegisterAddress, value: u8) -> Result<(), Self::Error> {
        self.write_registers(address, &[value])
    }

    fn read_register(&mut self, address: RegisterAddress) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_registers(address, &mut buf)?;
        Ok(buf[0])
    }

    fn read_registers(&mut self, address: RegisterAddress, buf: &mut [u8]) -> Result<(), Self::Error> {
        let mut prefix = [0u8; 2];
        let prefix = address.to_bytes(&mut prefix);
        self.i2c
            .write_read(self.address, prefix, buf)
            .map_err(I2cError::I2c)
    }

    fn write_registers(&mut self, address: RegisterAddress, data: &[u8]) -> Result<(), Self::Error> {
        let mut prefix = [0u8; 2];
        let prefix = address.to_bytes(&mut prefix);
        let len = prefix.len() + data.len();
        if len > MAX_BURST {
            return Err(I2cError::BurstTooLong);
        }
        let mut buf = [0u8; MAX_BURST];
        buf[..prefix.len()].copy_from_slice(prefix);
        buf[prefix.len()..len].copy_from_slice(data);
        self.i2c.write(self.address, &buf[..len]).map_err(I2cError::I2c)
    }
}
