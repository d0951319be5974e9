//! Typed views of nPM1300 settings and readings.

use crate::registers::{
    BUCK_MAX_MV, BUCK_MIN_MV, BUCK_STEP_MV, BuckSwCtrlBits, GPIO_PIN_COUNT, LDO_MAX_MV, LDO_MIN_MV, LDO_STEP_MV,
    RegisterAddress, addr,
};

/// Regulated output rails.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rail {
    Buck1,
    Buck2,
    Ldo1,
    Ldo2,
}

/// Rail classes sharing one setpoint range and step.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RailClass {
    Buck,
    Ldo,
}

/// Valid setpoint range for a rail class.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoltageRange {
    pub min_mv: u16,
    pub max_mv: u16,
    pub step_mv: u16,
}

impl VoltageRange {
    /// Number of register codes covering the range.
    pub const fn steps(&self) -> u8 {
        ((self.max_mv - self.min_mv) / self.step_mv + 1) as u8
    }
}

impl RailClass {
    pub const fn range(self) -> VoltageRange {
        match self {
            RailClass::Buck => VoltageRange {
                min_mv: BUCK_MIN_MV,
                max_mv: BUCK_MAX_MV,
                step_mv: BUCK_STEP_MV,
            },
            RailClass::Ldo => VoltageRange {
                min_mv: LDO_MIN_MV,
                max_mv: LDO_MAX_MV,
                step_mv: LDO_STEP_MV,
            },
        }
    }
}

impl Rail {
    pub const ALL: [Rail; 4] = [Rail::Buck1, Rail::Buck2, Rail::Ldo1, Rail::Ldo2];

    pub const fn class(self) -> RailClass {
        match self {
            Rail::Buck1 | Rail::Buck2 => RailClass::Buck,
            Rail::Ldo1 | Rail::Ldo2 => RailClass::Ldo,
        }
    }

    /// Setpoint register.
    pub const fn vout_register(self) -> RegisterAddress {
        match self {
            Rail::Buck1 => addr::buck::BUCK1_NORM_VOUT,
            Rail::Buck2 => addr::buck::BUCK2_NORM_VOUT,
            Rail::Ldo1 => addr::ldsw::LDSW1_VOUT_SEL,
            Rail::Ldo2 => addr::ldsw::LDSW2_VOUT_SEL,
        }
    }

    pub const fn enable_register(self) -> RegisterAddress {
        match self {
            Rail::Buck1 => addr::buck::BUCK1_ENA_SET,
            Rail::Buck2 => addr::buck::BUCK2_ENA_SET,
            Rail::Ldo1 => addr::ldsw::LDSW1_ENA_SET,
            Rail::Ldo2 => addr::ldsw::LDSW2_ENA_SET,
        }
    }

    pub const fn disable_register(self) -> RegisterAddress {
        match self {
            Rail::Buck1 => addr::buck::BUCK1_ENA_CLR,
            Rail::Buck2 => addr::buck::BUCK2_ENA_CLR,
            Rail::Ldo1 => addr::ldsw::LDSW1_ENA_CLR,
            Rail::Ldo2 => addr::ldsw::LDSW2_ENA_CLR,
        }
    }

    /// Software-override bit that must be set for the register setpoint to
    /// take effect; `None` for rails without a VSET pin.
    pub const fn override_bit(self) -> Option<BuckSwCtrlBits> {
        match self {
            Rail::Buck1 => Some(BuckSwCtrlBits::BUCK1),
            Rail::Buck2 => Some(BuckSwCtrlBits::BUCK2),
            Rail::Ldo1 | Rail::Ldo2 => None,
        }
    }

    /// LDO/load-switch selection register; `None` for bucks.
    pub const fn ldo_select_register(self) -> Option<RegisterAddress> {
        match self {
            Rail::Ldo1 => Some(addr::ldsw::LDSW1_LDO_SEL),
            Rail::Ldo2 => Some(addr::ldsw::LDSW2_LDO_SEL),
            Rail::Buck1 | Rail::Buck2 => None,
        }
    }
}

/// Operating mode of an LDSW rail.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LdswMode {
    LoadSwitch,
    Ldo,
}

/// ADC measurement channels.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdcChannel {
    Vbat,
    Vsys,
    Vbus,
    Ibat,
    /// Battery NTC thermistor.
    Ntc,
    DieTemperature,
}

/// Where a channel is triggered and where its 10-bit result lives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AdcChannelMap {
    pub task: RegisterAddress,
    pub msb: RegisterAddress,
    pub lsb: RegisterAddress,
    /// Position of the channel's 2-bit field inside the shared LSB register.
    pub lsb_shift: u8,
}

impl AdcChannel {
    pub const fn map(self) -> AdcChannelMap {
        use crate::registers::addr::adc;
        let (task, msb, lsb, lsb_shift) = match self {
            AdcChannel::Vbat => (adc::TASK_VBAT, adc::VBAT_MSB, adc::GP0_LSBS, 0),
            AdcChannel::Ntc => (adc::TASK_NTC, adc::NTC_MSB, adc::GP0_LSBS, 2),
            AdcChannel::DieTemperature => (adc::TASK_DIE_TEMP, adc::DIE_TEMP_MSB, adc::GP0_LSBS, 4),
            AdcChannel::Vsys => (adc::TASK_VSYS, adc::VSYS_MSB, adc::GP0_LSBS, 6),
            AdcChannel::Ibat => (adc::TASK_IBAT, adc::IBAT_MSB, adc::GP1_LSBS, 4),
            AdcChannel::Vbus => (adc::TASK_VBUS, adc::VBUS_MSB, adc::GP1_LSBS, 6),
        };
        AdcChannelMap {
            task,
            msb,
            lsb,
            lsb_shift,
        }
    }
}

/// Progress of a single ADC measurement.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MeasurementStage {
    #[default]
    Idle,
    Triggered,
    ReadMsb,
    ReadLsb,
    Decoded,
    Failed,
}

/// Charger state derived from CHARGE_STATUS and ERR_REASON.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChargerState {
    NotCharging,
    Trickle,
    ConstantCurrent,
    ConstantVoltage,
    Full,
    Error,
}

impl ChargerState {
    pub fn is_charging(self) -> bool {
        matches!(
            self,
            ChargerState::Trickle | ChargerState::ConstantCurrent | ChargerState::ConstantVoltage
        )
    }
}

/// GPIO pin function (GPIO_MODE register value 0..=9).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum GpioMode {
    Input = 0,
    InputLogic1 = 1,
    InputLogic0 = 2,
    InputRisingEdge = 3,
    InputFallingEdge = 4,
    InterruptOut = 5,
    ResetOut = 6,
    PowerLossWarningOut = 7,
    OutputLogic1 = 8,
    OutputLogic0 = 9,
}

impl TryFrom<u8> for GpioMode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => GpioMode::Input,
            1 => GpioMode::InputLogic1,
            2 => GpioMode::InputLogic0,
            3 => GpioMode::InputRisingEdge,
            4 => GpioMode::InputFallingEdge,
            5 => GpioMode::InterruptOut,
            6 => GpioMode::ResetOut,
            7 => GpioMode::PowerLossWarningOut,
            8 => GpioMode::OutputLogic1,
            9 => GpioMode::OutputLogic0,
            _ => return Err(()),
        })
    }
}

/// Full configuration of one GPIO pin.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GpioPinConfig {
    /// Pin index, 0..=4.
    pub pin: u8,
    pub mode: GpioMode,
    pub pull_up: bool,
    pub pull_down: bool,
}

impl GpioPinConfig {
    pub const fn new(pin: u8, mode: GpioMode) -> Self {
        Self {
            pin,
            mode,
            pull_up: false,
            pull_down: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.pin < GPIO_PIN_COUNT
    }
}

/// SHPHLD button behaviour.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShipHoldMode {
    Disabled,
    WakeOnShortPress,
    PowerOffOnLongPress,
}

impl ShipHoldMode {
    /// HOLD_CONFIG register value. Placeholder encoding.
    pub const fn bits(self) -> u8 {
        match self {
            ShipHoldMode::Disabled => 0x00,
            ShipHoldMode::WakeOnShortPress => 0x01,
            ShipHoldMode::PowerOffOnLongPress => 0x02,
        }
    }
}

/// Snapshot of the main supply readings.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PowerStatus {
    pub vbat_mv: u16,
    pub vsys_mv: u16,
    pub vbus_present: bool,
    pub charger: ChargerState,
}
