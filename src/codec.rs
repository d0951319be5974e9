//! Conversions between physical units and nPM1300 register encodings.
//!
//! Everything here is pure. Inputs outside a register's range are clamped to
//! the nearest bound before encoding; raw values outside the valid code range
//! are clamped before decoding.

use crate::data_types::{ChargerState, RailClass};
use crate::registers::{
    ADC_MAX_CODE, CHARGE_CURRENT_MAX_MA, CHARGE_CURRENT_MIN_MA, CHARGE_CURRENT_STEP_MA, ChargeStatusBits,
    DIE_TEMP_FULL_SCALE, IBAT_DISCHARGE_FULL_SCALE_MA, IbatStatusBits,
};

/// Reference temperature of the thermistor beta model (25 °C).
pub const NTC_T0_KELVIN: f32 = 298.15;
const KELVIN_OFFSET: f32 = 273.15;

/// Lower edge (mV) of charge-voltage codes 1..=13; code 0 covers everything below.
const CHARGE_VOLTAGE_BANDS_MV: [u16; 13] = [
    3_525, 3_575, 3_625, 3_750, 4_025, 4_075, 4_125, 4_175, 4_225, 4_275, 4_325, 4_375, 4_425,
];

/// Nominal termination voltage (mV) selected by each code.
const CHARGE_VOLTAGE_CODES_MV: [u16; 14] = [
    3_500, 3_550, 3_600, 3_650, 4_000, 4_050, 4_100, 4_150, 4_200, 4_250, 4_300, 4_350, 4_400, 4_450,
];

/// Convert a rail setpoint (mV) to its register code: `round((mv - min) / step)`.
pub fn encode_voltage(class: RailClass, mv: u16) -> u8 {
    let range = class.range();
    let mv = mv.clamp(range.min_mv, range.max_mv);
    let code = (mv - range.min_mv + range.step_mv / 2) / range.step_mv;
    (code as u8).min(range.steps() - 1)
}

/// Convert a rail register code back to millivolts.
pub fn decode_voltage(class: RailClass, raw: u8) -> u16 {
    let range = class.range();
    let code = raw.min(range.steps() - 1) as u16;
    range.min_mv + code * range.step_mv
}

/// Split a charge current (mA) into `(ISET_MSB, ISET_LSB)`.
///
/// The device takes a 9-bit code at 2 mA/step: `code = mA / 2`, MSB holds
/// `code >> 1` and LSB holds `code & 1`. Writing `mA / 2` directly into the
/// 8-bit MSB would overflow above 510 mA, and the single-register 32 mA/step
/// layout is not used.
pub fn encode_charge_current(ma: u16) -> (u8, u8) {
    let ma = ma.clamp(CHARGE_CURRENT_MIN_MA, CHARGE_CURRENT_MAX_MA);
    let code = ma / CHARGE_CURRENT_STEP_MA;
    ((code >> 1) as u8, (code & 1) as u8)
}

/// Inverse of [`encode_charge_current`].
pub fn decode_charge_current(msb: u8, lsb: u8) -> u16 {
    let code = ((msb as u16) << 1) | ((lsb as u16) & 1);
    (code * CHARGE_CURRENT_STEP_MA).clamp(CHARGE_CURRENT_MIN_MA, CHARGE_CURRENT_MAX_MA)
}

/// Map a termination voltage (mV) onto the VTERM band code (0..=13).
pub fn encode_charge_voltage(mv: u16) -> u8 {
    CHARGE_VOLTAGE_BANDS_MV.iter().take_while(|&&edge| mv >= edge).count() as u8
}

/// Nominal termination voltage (mV) for a VTERM code.
pub fn decode_charge_voltage(code: u8) -> u16 {
    let idx = (code as usize).min(CHARGE_VOLTAGE_CODES_MV.len() - 1);
    CHARGE_VOLTAGE_CODES_MV[idx]
}

/// Combine an 8-bit MSB result with the channel's 2-bit field from a shared LSB register.
pub fn decode_adc_raw(msb: u8, lsb: u8, lsb_shift: u8) -> u16 {
    ((msb as u16) << 2) | (((lsb as u16) >> lsb_shift) & 0x3)
}

/// Scale a 10-bit code to physical units: `raw * full_scale / 1023`.
pub fn scale_adc(raw10: u16, full_scale: u32) -> u32 {
    let raw = raw10.min(ADC_MAX_CODE) as u32;
    raw * full_scale / ADC_MAX_CODE as u32
}

/// Battery temperature (°C) from the NTC channel using the beta equation.
///
/// Returns `None` when the ratio `raw / 1023` is not strictly inside (0, 1)
/// or the beta constant is not positive.
pub fn ntc_temperature_c(raw10: u16, beta: f32) -> Option<f32> {
    if raw10 == 0 || raw10 >= ADC_MAX_CODE || beta <= 0.0 {
        return None;
    }
    let x = raw10 as f32 / ADC_MAX_CODE as f32;
    let kelvin = 1.0 / (1.0 / NTC_T0_KELVIN + (1.0 / beta) * libm::logf(1.0 / x - 1.0));
    Some(kelvin - KELVIN_OFFSET)
}

/// Die temperature (°C): `394.67 - 0.7926 * (raw / 1023 * full_scale)`.
pub fn die_temperature_c(raw10: u16) -> f32 {
    let raw = raw10.min(ADC_MAX_CODE) as f32;
    394.67 - 0.7926 * (raw / ADC_MAX_CODE as f32 * DIE_TEMP_FULL_SCALE)
}

/// Signed battery current (mA, positive = charging).
///
/// Charging full scale is 1.25 x the programmed charge current. `None` when
/// the status flags the sample invalid.
pub fn battery_current_ma(raw10: u16, status: IbatStatusBits, charge_current_ma: u16) -> Option<i32> {
    if status.contains(IbatStatusBits::INVALID) {
        return None;
    }
    if status.contains(IbatStatusBits::CHARGING) {
        let full_scale = charge_current_ma as u32 * 5 / 4;
        Some(scale_adc(raw10, full_scale) as i32)
    } else if status.contains(IbatStatusBits::DISCHARGING) {
        Some(-(scale_adc(raw10, IBAT_DISCHARGE_FULL_SCALE_MA) as i32))
    } else {
        Some(0)
    }
}

/// Derive the charger state from CHARGE_STATUS and ERR_REASON.
pub fn decode_charger_state(status: ChargeStatusBits, err_reason: u8) -> ChargerState {
    if err_reason != 0 {
        ChargerState::Error
    } else if status.contains(ChargeStatusBits::COMPLETED) {
        ChargerState::Full
    } else if status.contains(ChargeStatusBits::CONSTANT_VOLTAGE) {
        ChargerState::ConstantVoltage
    } else if status.contains(ChargeStatusBits::CONSTANT_CURRENT) {
        ChargerState::ConstantCurrent
    } else if status.contains(ChargeStatusBits::TRICKLE) {
        ChargerState::Trickle
    } else {
        ChargerState::NotCharging
    }
}
