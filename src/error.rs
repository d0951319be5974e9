//! Error definitions for the nPM1300 driver.

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<BusError> {
    /// Underlying register read or write failed.
    Bus(BusError),
    /// Presence check at initialization did not get an answer from the device.
    DeviceNotPresent,
    /// ADC sample flagged invalid, or thermistor ratio outside (0, 1).
    InvalidMeasurement,
    /// Pin, mode or rail index outside the supported range.
    InvalidParameter,
}

impl<BusError: core::fmt::Debug> core::fmt::Display for Error<BusError> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::DeviceNotPresent => write!(f, "device not present"),
            Error::InvalidMeasurement => write!(f, "invalid measurement"),
            Error::InvalidParameter => write!(f, "parameter out of range"),
        }
    }
}
