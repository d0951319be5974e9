//! nPM1300 Rust Driver
//!
//! Blocking, `no_std` driver for the nPM1300 power-management IC: two buck
//! converters, two LDO/load-switch rails, a battery charger, a 10-bit ADC
//! monitor, five GPIOs and ship/hold control. The register transport is
//! abstracted behind [`interface::RegisterInterface`] so the same controller
//! runs over any bus adapter; [`interface::I2cInterface`] covers
//! `embedded-hal` I2C.
//!
//! ```no_run
//! # use embedded_hal::{delay::DelayNs, i2c::I2c};
//! # fn example<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Result<(), npm1300_rs::Error<npm1300_rs::interface::I2cError<I::Error>>> {
//! use npm1300_rs::{Npm1300, data_types::Rail};
//!
//! let mut pmic = Npm1300::new_i2c(i2c, delay);
//! pmic.begin()?;
//! pmic.set_voltage(Rail::Buck2, 1_800)?;
//! let vbat = pmic.read_vbat_mv()?;
//! # let _ = vbat;
//! # Ok(())
//! # }
//! ```

#![no_std]

#[macro_use]
mod fmt;

pub mod codec;
pub mod config;
pub mod data_types;
pub mod driver;
pub mod error;
pub mod fuel_gauge;
pub mod interface;
pub mod registers;

pub use config::Config;
pub use driver::Npm1300;
pub use error::Error;
pub use fuel_gauge::FuelGauge;
pub use interface::{I2cInterface, RegisterInterface};
pub use registers::{DEFAULT_I2C_ADDRESS, RegisterAddress};
