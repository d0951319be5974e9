//! Configuration applied by [`Npm1300::init`](crate::Npm1300::init).

use crate::data_types::{GpioMode, GpioPinConfig, ShipHoldMode};
use crate::fuel_gauge::{DEFAULT_CAPACITY_MAH, DEFAULT_NTC_BETA};
use crate::registers::GPIO_PIN_COUNT;

/// Setpoint and enable state for one output rail.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RailConfig {
    pub millivolts: u16,
    pub enabled: bool,
}

impl RailConfig {
    pub const fn enabled(millivolts: u16) -> Self {
        Self {
            millivolts,
            enabled: true,
        }
    }

    pub const fn disabled(millivolts: u16) -> Self {
        Self {
            millivolts,
            enabled: false,
        }
    }
}

/// Battery parameters used by the fuel gauge and NTC conversion.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatteryConfig {
    pub capacity_mah: f32,
    pub ntc_beta: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_mah: DEFAULT_CAPACITY_MAH,
            ntc_beta: DEFAULT_NTC_BETA,
        }
    }
}

/// Full device configuration.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub buck1: RailConfig,
    pub buck2: RailConfig,
    pub ldo1: RailConfig,
    pub ldo2: RailConfig,
    pub charge_voltage_mv: u16,
    /// Left at the device default when `None`.
    pub charge_current_ma: Option<u16>,
    pub charger_enabled: bool,
    pub gpio: [Option<GpioPinConfig>; GPIO_PIN_COUNT as usize],
    pub ship_hold: Option<ShipHoldMode>,
    pub battery: BatteryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buck1: RailConfig::enabled(3_300),
            buck2: RailConfig::enabled(3_300),
            ldo1: RailConfig::enabled(3_300),
            ldo2: RailConfig::disabled(3_300),
            charge_voltage_mv: 4_200,
            charge_current_ma: None,
            charger_enabled: true,
            gpio: [Some(GpioPinConfig::new(0, GpioMode::InterruptOut)), None, None, None, None],
            ship_hold: Some(ShipHoldMode::WakeOnShortPress),
            battery: BatteryConfig::default(),
        }
    }
}
