//! Register map and bit-field definitions for the nPM1300.
//!
//! The device uses 16-bit register addresses: a page (functional block base)
//! followed by an offset inside the page. Offsets marked *placeholder* were
//! inconsistent between the driver variants this map consolidates and need
//! confirming against the datasheet before production use.

/// Fixed 7-bit I2C address of the nPM1300.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x6B;

/// Address of a single device register.
///
/// `Paged` is the canonical form for this device; `Flat` exists for parts
/// and adapters that use plain 8-bit register addressing.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RegisterAddress {
    Flat(u8),
    Paged { page: u8, offset: u8 },
}

impl RegisterAddress {
    pub const fn paged(page: u8, offset: u8) -> Self {
        RegisterAddress::Paged { page, offset }
    }

    /// Address `n` registers further inside the same page.
    pub const fn offset_by(self, n: u8) -> Self {
        match self {
            RegisterAddress::Flat(a) => RegisterAddress::Flat(a.wrapping_add(n)),
            RegisterAddress::Paged { page, offset } => RegisterAddress::Paged {
                page,
                offset: offset.wrapping_add(n),
            },
        }
    }

    /// Bytes sent on the bus ahead of the data (MSB first).
    pub fn to_bytes(self, buf: &mut [u8; 2]) -> &[u8] {
        match self {
            RegisterAddress::Flat(a) => {
                buf[0] = a;
                &buf[..1]
            }
            RegisterAddress::Paged { page, offset } => {
                buf[0] = page;
                buf[1] = offset;
                &buf[..2]
            }
        }
    }

    /// Page byte, or `None` for flat addresses.
    pub fn page(self) -> Option<u8> {
        match self {
            RegisterAddress::Flat(_) => None,
            RegisterAddress::Paged { page, .. } => Some(page),
        }
    }
}

/// Functional page bases. Pages never overlap.
pub mod page {
    pub const MAIN: u8 = 0x00;
    pub const SYSREG: u8 = 0x02;
    pub const CHARGER: u8 = 0x03;
    pub const BUCK: u8 = 0x04;
    pub const ADC: u8 = 0x05;
    pub const GPIO: u8 = 0x06;
    pub const LDSW: u8 = 0x08;
    pub const SHIP: u8 = 0x0B;
}

/// Register addresses grouped by page.
pub mod addr {
    use super::RegisterAddress;

    const fn r(page: u8, offset: u8) -> RegisterAddress {
        RegisterAddress::paged(page, offset)
    }

    /// Main block status.
    pub mod main {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        /// Top-level status (bit 7: power good). Placeholder.
        pub const MAIN_STATUS: RegisterAddress = r(page::MAIN, 0x00);
    }

    /// System regulator (VBUS input) registers.
    pub mod sysreg {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        /// VBUS input status (bit 0: VBUS present). Placeholder.
        pub const VBUSIN_STATUS: RegisterAddress = r(page::SYSREG, 0x07);
    }

    /// Buck converter registers.
    pub mod buck {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        pub const BUCK1_ENA_SET: RegisterAddress = r(page::BUCK, 0x00);
        pub const BUCK1_ENA_CLR: RegisterAddress = r(page::BUCK, 0x01);
        pub const BUCK2_ENA_SET: RegisterAddress = r(page::BUCK, 0x02);
        pub const BUCK2_ENA_CLR: RegisterAddress = r(page::BUCK, 0x03);
        /// Normal-mode output voltage select.
        pub const BUCK1_NORM_VOUT: RegisterAddress = r(page::BUCK, 0x08);
        pub const BUCK2_NORM_VOUT: RegisterAddress = r(page::BUCK, 0x0A);
        /// Software override of the VSET pins (see [`BuckSwCtrlBits`](super::super::BuckSwCtrlBits)).
        pub const BUCK_SW_CTRL_SEL: RegisterAddress = r(page::BUCK, 0x0F);
    }

    /// Battery charger registers.
    pub mod charger {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        pub const ENABLE_SET: RegisterAddress = r(page::CHARGER, 0x04);
        pub const ENABLE_CLR: RegisterAddress = r(page::CHARGER, 0x05);
        /// Charge current, upper 8 bits of the 2 mA/step code.
        pub const ISET_MSB: RegisterAddress = r(page::CHARGER, 0x08);
        /// Charge current, bit 0 of the 2 mA/step code.
        pub const ISET_LSB: RegisterAddress = r(page::CHARGER, 0x09);
        /// Termination voltage (band code 0..=13).
        pub const VTERM: RegisterAddress = r(page::CHARGER, 0x0C);
        pub const CHARGE_STATUS: RegisterAddress = r(page::CHARGER, 0x34);
        /// Charger error reason, non-zero when the charger halted on a fault. Placeholder.
        pub const ERR_REASON: RegisterAddress = r(page::CHARGER, 0x36);
    }

    /// ADC task triggers and result registers.
    pub mod adc {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        pub const TASK_VBAT: RegisterAddress = r(page::ADC, 0x00);
        /// Placeholder.
        pub const TASK_NTC: RegisterAddress = r(page::ADC, 0x01);
        /// Placeholder.
        pub const TASK_DIE_TEMP: RegisterAddress = r(page::ADC, 0x02);
        pub const TASK_VSYS: RegisterAddress = r(page::ADC, 0x03);
        pub const TASK_IBAT: RegisterAddress = r(page::ADC, 0x06);
        pub const TASK_VBUS: RegisterAddress = r(page::ADC, 0x07);
        /// IBAT measurement status (direction and validity). Placeholder.
        pub const IBAT_MEAS_STATUS: RegisterAddress = r(page::ADC, 0x10);
        pub const VBAT_MSB: RegisterAddress = r(page::ADC, 0x11);
        /// Placeholder.
        pub const NTC_MSB: RegisterAddress = r(page::ADC, 0x12);
        /// Placeholder.
        pub const DIE_TEMP_MSB: RegisterAddress = r(page::ADC, 0x13);
        pub const VSYS_MSB: RegisterAddress = r(page::ADC, 0x14);
        /// Shared LSBs: VBAT[1:0], NTC[3:2], DIE_TEMP[5:4], VSYS[7:6]. NTC and DIE_TEMP
        /// field positions are placeholders.
        pub const GP0_LSBS: RegisterAddress = r(page::ADC, 0x15);
        /// IBAT result slot. Placeholder.
        pub const IBAT_MSB: RegisterAddress = r(page::ADC, 0x18);
        /// VBUS result slot.
        pub const VBUS_MSB: RegisterAddress = r(page::ADC, 0x19);
        /// Shared LSBs: IBAT[5:4], VBUS[7:6].
        pub const GP1_LSBS: RegisterAddress = r(page::ADC, 0x1A);
    }

    /// GPIO registers. Per-pin registers are consecutive from pin 0.
    pub mod gpio {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        pub const MODE0: RegisterAddress = r(page::GPIO, 0x00);
        pub const PULL_UP_EN0: RegisterAddress = r(page::GPIO, 0x0A);
        pub const PULL_DOWN_EN0: RegisterAddress = r(page::GPIO, 0x0F);
        /// Input levels, bit n = pin n.
        pub const STATUS: RegisterAddress = r(page::GPIO, 0x1E);
    }

    /// LDO / load-switch registers. Placeholder offsets for the whole page.
    pub mod ldsw {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        pub const LDSW1_ENA_SET: RegisterAddress = r(page::LDSW, 0x00);
        pub const LDSW1_ENA_CLR: RegisterAddress = r(page::LDSW, 0x01);
        pub const LDSW2_ENA_SET: RegisterAddress = r(page::LDSW, 0x02);
        pub const LDSW2_ENA_CLR: RegisterAddress = r(page::LDSW, 0x03);
        /// 1 = LDO, 0 = load switch.
        pub const LDSW1_LDO_SEL: RegisterAddress = r(page::LDSW, 0x08);
        pub const LDSW2_LDO_SEL: RegisterAddress = r(page::LDSW, 0x09);
        pub const LDSW1_VOUT_SEL: RegisterAddress = r(page::LDSW, 0x0C);
        pub const LDSW2_VOUT_SEL: RegisterAddress = r(page::LDSW, 0x0D);
    }

    /// Ship/hold button registers. Placeholder offsets.
    pub mod ship {
        use super::r;
        use crate::registers::{RegisterAddress, page};
        pub const TASK_CONFIG_STROBE: RegisterAddress = r(page::SHIP, 0x01);
        pub const TASK_ENTER_SHIP_MODE: RegisterAddress = r(page::SHIP, 0x02);
        pub const HOLD_CONFIG: RegisterAddress = r(page::SHIP, 0x04);
    }
}

/// Value written to any task register to fire it.
pub const TASK_TRIGGER: u8 = 0x01;

/// Buck output range (mV) shared by both bucks.
pub const BUCK_MIN_MV: u16 = 1_000;
pub const BUCK_MAX_MV: u16 = 3_300;
pub const BUCK_STEP_MV: u16 = 100;

/// LDO output range (mV) shared by both LDSW rails.
pub const LDO_MIN_MV: u16 = 1_000;
pub const LDO_MAX_MV: u16 = 3_300;
pub const LDO_STEP_MV: u16 = 100;

/// Charge current limits; the register code has 2 mA resolution.
pub const CHARGE_CURRENT_MIN_MA: u16 = 32;
pub const CHARGE_CURRENT_MAX_MA: u16 = 800;
pub const CHARGE_CURRENT_STEP_MA: u16 = 2;

/// Termination voltage table bounds (mV).
pub const CHARGE_VOLTAGE_MIN_MV: u16 = 3_500;
pub const CHARGE_VOLTAGE_MAX_MV: u16 = 4_450;

/// Highest 10-bit ADC code, also the divisor used for scaling.
pub const ADC_MAX_CODE: u16 = 1023;

/// ADC full-scale values.
pub const VBAT_FULL_SCALE_MV: u32 = 5_000;
pub const VSYS_FULL_SCALE_MV: u32 = 6_375;
pub const VBUS_FULL_SCALE_MV: u32 = 7_500;
/// Discharge current full scale. Placeholder.
pub const IBAT_DISCHARGE_FULL_SCALE_MA: u32 = 1_340;
/// Die temperature reading is linear in the raw code itself.
pub const DIE_TEMP_FULL_SCALE: f32 = 1023.0;

/// GPIO pins available on the device.
pub const GPIO_PIN_COUNT: u8 = 5;

/// Conversion settle time after triggering an ADC task.
pub const ADC_SETTLE_MS: u32 = 1;
/// Settle time between disabling the charger and reprogramming it.
pub const CHARGER_SETTLE_MS: u32 = 10;
/// Power-up wait before the presence check.
pub const STARTUP_DELAY_MS: u32 = 100;

bitflags::bitflags! {
    /// BUCK_SW_CTRL_SEL register bits.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct BuckSwCtrlBits: u8 {
        /// Bit 0: Buck1 voltage taken from register instead of VSET1 pin.
        const BUCK1 = 1 << 0;
        /// Bit 1: Buck2 voltage taken from register instead of VSET2 pin.
        const BUCK2 = 1 << 1;
    }

    /// CHARGE_STATUS register bits.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ChargeStatusBits: u8 {
        const BATTERY_DETECTED = 1 << 0;
        const COMPLETED        = 1 << 1;
        const TRICKLE          = 1 << 2;
        const CONSTANT_CURRENT = 1 << 3;
        const CONSTANT_VOLTAGE = 1 << 4;
        const RECHARGE         = 1 << 5;
        const DIE_TEMP_PAUSED  = 1 << 6;
        const SUPPLEMENT       = 1 << 7;
    }

    /// IBAT_MEAS_STATUS register bits.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct IbatStatusBits: u8 {
        const DISCHARGING = 1 << 2;
        const CHARGING    = 1 << 3;
        /// Sample taken while the charger mode was changing; discard it.
        const INVALID     = 1 << 4;
    }

    /// MAIN_STATUS register bits.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct MainStatusBits: u8 {
        const POWER_GOOD = 1 << 7;
    }

    /// VBUSIN_STATUS register bits.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct VbusStatusBits: u8 {
        const PRESENT = 1 << 0;
    }
}
