//! Blocking nPM1300 device controller.
//!
//! Owns the register transport, a delay provider and the fuel gauge state.
//! Multi-step sequences (ADC measurements, charge current reprogramming,
//! buck setpoint override) live here; register encodings come from
//! [`crate::codec`].

use embedded_hal::delay::DelayNs;

use crate::codec::{
    battery_current_ma, decode_adc_raw, decode_charge_current, decode_charge_voltage, decode_charger_state,
    decode_voltage, die_temperature_c, encode_charge_current, encode_charge_voltage, encode_voltage,
    ntc_temperature_c, scale_adc,
};
use crate::config::{Config, RailConfig};
use crate::data_types::{
    AdcChannel, ChargerState, GpioMode, GpioPinConfig, LdswMode, MeasurementStage, PowerStatus, Rail,
    ShipHoldMode,
};
use crate::error::Error;
use crate::fuel_gauge::FuelGauge;
use crate::interface::{I2cInterface, RegisterInterface};
use crate::registers::{
    ADC_SETTLE_MS, CHARGE_CURRENT_MIN_MA, CHARGER_SETTLE_MS, ChargeStatusBits, GPIO_PIN_COUNT, IbatStatusBits,
    MainStatusBits, RegisterAddress, STARTUP_DELAY_MS, TASK_TRIGGER, VBAT_FULL_SCALE_MV, VBUS_FULL_SCALE_MV,
    VSYS_FULL_SCALE_MV, VbusStatusBits, addr,
};

/// Battery voltage below which [`Npm1300::is_battery_low`] reports true.
pub const BATTERY_LOW_MV: u16 = 3_300;

/// nPM1300 driver.
pub struct Npm1300<IF, D> {
    iface: IF,
    delay: D,
    gauge: FuelGauge,
    charge_current_ma: u16,
    stage: MeasurementStage,
}

impl<I2C, D> Npm1300<I2cInterface<I2C>, D> {
    /// Create a driver over I2C at the default address (0x6B).
    pub fn new_i2c(i2c: I2C, delay: D) -> Self {
        Self::new(I2cInterface::new(i2c), delay)
    }

    /// Create a driver over I2C at a custom address.
    pub fn with_address(i2c: I2C, address: u8, delay: D) -> Self {
        Self::new(I2cInterface::with_address(i2c, address), delay)
    }
}

impl<IF, D> Npm1300<IF, D> {
    /// Create a driver over any register transport.
    pub fn new(iface: IF, delay: D) -> Self {
        Self {
            iface,
            delay,
            gauge: FuelGauge::default(),
            // Device reset value.
            charge_current_ma: CHARGE_CURRENT_MIN_MA,
            stage: MeasurementStage::Idle,
        }
    }

    /// Release the transport and delay provider.
    pub fn free(self) -> (IF, D) {
        (self.iface, self.delay)
    }

    /// Fuel gauge state.
    pub fn fuel_gauge(&self) -> &FuelGauge {
        &self.gauge
    }

    pub fn fuel_gauge_mut(&mut self) -> &mut FuelGauge {
        &mut self.gauge
    }

    /// Stage reached by the most recent ADC measurement.
    pub fn last_measurement_stage(&self) -> MeasurementStage {
        self.stage
    }

    /// Charge current (mA) last programmed through this driver.
    pub fn charge_current_ma(&self) -> u16 {
        self.charge_current_ma
    }

    /// Best-effort state of charge (%) from the last fuel gauge samples.
    pub fn state_of_charge(&self) -> f32 {
        self.gauge.state_of_charge()
    }

    /// Best-effort state of health (%).
    pub fn state_of_health(&self) -> f32 {
        self.gauge.state_of_health()
    }
}

impl<IF, D> Npm1300<IF, D>
where
    IF: RegisterInterface,
    D: DelayNs,
{
    /// Initialize with [`Config::default`].
    pub fn begin(&mut self) -> Result<(), Error<IF::Error>> {
        self.init(&Config::default())
    }

    /// Verify the device answers, then apply `config`.
    pub fn init(&mut self, config: &Config) -> Result<(), Error<IF::Error>> {
        self.delay.delay_ms(STARTUP_DELAY_MS);
        if !self.is_connected() {
            error!("nPM1300 not responding");
            return Err(Error::DeviceNotPresent);
        }
        self.gauge.configure(config.battery.capacity_mah, config.battery.ntc_beta);

        self.apply_rail(Rail::Buck1, config.buck1)?;
        self.apply_rail(Rail::Buck2, config.buck2)?;
        self.apply_rail(Rail::Ldo1, config.ldo1)?;
        self.apply_rail(Rail::Ldo2, config.ldo2)?;

        self.set_charge_voltage(config.charge_voltage_mv)?;
        match config.charge_current_ma {
            Some(ma) => self.set_charge_current(ma)?,
            // Adopt the current already programmed in the device.
            None => self.charge_current_ma = self.charge_current()?,
        }
        if config.charger_enabled {
            self.enable_charger()?;
        } else {
            self.disable_charger()?;
        }

        for gpio in config.gpio.iter().flatten() {
            self.configure_gpio(gpio)?;
        }
        if let Some(mode) = config.ship_hold {
            self.set_ship_hold_mode(mode)?;
        }
        debug!("nPM1300 configured");
        Ok(())
    }

    /// Presence check: a status register read must succeed.
    pub fn is_connected(&mut self) -> bool {
        self.iface.read_register(addr::charger::CHARGE_STATUS).is_ok()
    }

    fn apply_rail(&mut self, rail: Rail, cfg: RailConfig) -> Result<(), Error<IF::Error>> {
        if rail.ldo_select_register().is_some() {
            self.set_ldsw_mode(rail, LdswMode::Ldo)?;
        }
        self.set_voltage(rail, cfg.millivolts)?;
        if cfg.enabled {
            self.enable_rail(rail)
        } else {
            self.disable_rail(rail)
        }
    }

    /// Write a single register.
    pub fn write_reg(&mut self, reg: RegisterAddress, value: u8) -> Result<(), Error<IF::Error>> {
        self.iface.write_register(reg, value).map_err(Error::Bus)
    }

    /// Read a single register.
    pub fn read_reg(&mut self, reg: RegisterAddress) -> Result<u8, Error<IF::Error>> {
        self.iface.read_register(reg).map_err(Error::Bus)
    }

    /// Update masked bits in a register (read-modify-write).
    pub fn update_reg(&mut self, reg: RegisterAddress, mask: u8, value: u8) -> Result<(), Error<IF::Error>> {
        let cur = self.read_reg(reg)?;
        let new = (cur & !mask) | (value & mask);
        self.write_reg(reg, new)
    }

    /// Write a burst starting at a register.
    pub fn write_regs(&mut self, start_reg: RegisterAddress, data: &[u8]) -> Result<(), Error<IF::Error>> {
        self.iface.write_registers(start_reg, data).map_err(Error::Bus)
    }

    /// Read a burst starting at a register.
    pub fn read_regs(&mut self, start_reg: RegisterAddress, data: &mut [u8]) -> Result<(), Error<IF::Error>> {
        self.iface.read_registers(start_reg, data).map_err(Error::Bus)
    }

    // Rails

    /// Program a rail setpoint (mV, clamped to the rail's range).
    ///
    /// Bucks also get their software-override bit set, otherwise the VSET pin
    /// keeps controlling the output and the new setpoint is ignored.
    pub fn set_voltage(&mut self, rail: Rail, mv: u16) -> Result<(), Error<IF::Error>> {
        let code = encode_voltage(rail.class(), mv);
        self.write_reg(rail.vout_register(), code)?;
        if let Some(bit) = rail.override_bit() {
            self.update_reg(addr::buck::BUCK_SW_CTRL_SEL, bit.bits(), bit.bits())?;
        }
        trace!("{:?} set to code {}", rail, code);
        Ok(())
    }

    /// Read back a rail setpoint (mV).
    pub fn voltage(&mut self, rail: Rail) -> Result<u16, Error<IF::Error>> {
        let code = self.read_reg(rail.vout_register())?;
        Ok(decode_voltage(rail.class(), code))
    }

    /// Fire the rail's enable task.
    pub fn enable_rail(&mut self, rail: Rail) -> Result<(), Error<IF::Error>> {
        self.write_reg(rail.enable_register(), TASK_TRIGGER)
    }

    /// Fire the rail's disable task.
    pub fn disable_rail(&mut self, rail: Rail) -> Result<(), Error<IF::Error>> {
        self.write_reg(rail.disable_register(), TASK_TRIGGER)
    }

    /// Select LDO or load-switch operation. Bucks are rejected.
    pub fn set_ldsw_mode(&mut self, rail: Rail, mode: LdswMode) -> Result<(), Error<IF::Error>> {
        let reg = rail.ldo_select_register().ok_or(Error::InvalidParameter)?;
        let value = match mode {
            LdswMode::LoadSwitch => 0,
            LdswMode::Ldo => 1,
        };
        self.write_reg(reg, value)
    }

    // Status

    /// MAIN_STATUS register, unknown bits retained.
    pub fn main_status(&mut self) -> Result<MainStatusBits, Error<IF::Error>> {
        Ok(MainStatusBits::from_bits_retain(self.read_reg(addr::main::MAIN_STATUS)?))
    }

    /// Power-good flag from MAIN_STATUS.
    pub fn is_power_good(&mut self) -> Result<bool, Error<IF::Error>> {
        Ok(self.main_status()?.contains(MainStatusBits::POWER_GOOD))
    }

    // Charger

    /// Start charging (CHARGER ENABLE_SET task).
    pub fn enable_charger(&mut self) -> Result<(), Error<IF::Error>> {
        self.write_reg(addr::charger::ENABLE_SET, TASK_TRIGGER)
    }

    /// Stop charging (CHARGER ENABLE_CLR task).
    pub fn disable_charger(&mut self) -> Result<(), Error<IF::Error>> {
        self.write_reg(addr::charger::ENABLE_CLR, TASK_TRIGGER)
    }

    /// Reprogram the charge current (mA, clamped to 32..=800).
    ///
    /// The charger is disabled for the duration of the update and re-enabled
    /// afterwards. If a write fails the charger is left disabled.
    pub fn set_charge_current(&mut self, ma: u16) -> Result<(), Error<IF::Error>> {
        let (msb, lsb) = encode_charge_current(ma);
        self.disable_charger()?;
        self.delay.delay_ms(CHARGER_SETTLE_MS);
        self.write_reg(addr::charger::ISET_MSB, msb)?;
        self.write_reg(addr::charger::ISET_LSB, lsb)?;
        self.charge_current_ma = decode_charge_current(msb, lsb);
        debug!("charge current set to {} mA", self.charge_current_ma);
        self.enable_charger()
    }

    /// Read back the programmed charge current (mA).
    pub fn charge_current(&mut self) -> Result<u16, Error<IF::Error>> {
        let msb = self.read_reg(addr::charger::ISET_MSB)?;
        let lsb = self.read_reg(addr::charger::ISET_LSB)?;
        Ok(decode_charge_current(msb, lsb))
    }

    /// Program the termination voltage (mV) using the VTERM band table.
    pub fn set_charge_voltage(&mut self, mv: u16) -> Result<(), Error<IF::Error>> {
        self.write_reg(addr::charger::VTERM, encode_charge_voltage(mv))
    }

    /// Read back the termination voltage (mV).
    pub fn charge_voltage(&mut self) -> Result<u16, Error<IF::Error>> {
        let code = self.read_reg(addr::charger::VTERM)?;
        Ok(decode_charge_voltage(code))
    }

    /// Charger state from CHARGE_STATUS, with faults taking priority.
    pub fn charger_state(&mut self) -> Result<ChargerState, Error<IF::Error>> {
        let status = ChargeStatusBits::from_bits_truncate(self.read_reg(addr::charger::CHARGE_STATUS)?);
        let err_reason = self.read_reg(addr::charger::ERR_REASON)?;
        Ok(decode_charger_state(status, err_reason))
    }

    /// True in trickle, constant-current or constant-voltage phase.
    pub fn is_charging(&mut self) -> Result<bool, Error<IF::Error>> {
        Ok(self.charger_state()?.is_charging())
    }

    /// Charge completed flag.
    pub fn is_battery_full(&mut self) -> Result<bool, Error<IF::Error>> {
        let status = ChargeStatusBits::from_bits_truncate(self.read_reg(addr::charger::CHARGE_STATUS)?);
        Ok(status.contains(ChargeStatusBits::COMPLETED))
    }

    // ADC

    fn measurement_step<T>(
        &mut self,
        next: MeasurementStage,
        op: impl FnOnce(&mut Self) -> Result<T, Error<IF::Error>>,
    ) -> Result<T, Error<IF::Error>> {
        match op(self) {
            Ok(v) => {
                self.stage = next;
                Ok(v)
            }
            Err(e) => {
                warn!("ADC measurement failed entering {:?} (from {:?})", next, self.stage);
                self.stage = MeasurementStage::Failed;
                Err(e)
            }
        }
    }

    /// Trigger a conversion, wait for it, and return the 10-bit result.
    ///
    /// A failed trigger never proceeds to the result reads.
    pub fn measure_raw(&mut self, channel: AdcChannel) -> Result<u16, Error<IF::Error>> {
        let map = channel.map();
        self.stage = MeasurementStage::Idle;
        self.measurement_step(MeasurementStage::Triggered, |s| s.write_reg(map.task, TASK_TRIGGER))?;
        self.delay.delay_ms(ADC_SETTLE_MS);
        let msb = self.measurement_step(MeasurementStage::ReadMsb, |s| s.read_reg(map.msb))?;
        let lsb = self.measurement_step(MeasurementStage::ReadLsb, |s| s.read_reg(map.lsb))?;
        self.stage = MeasurementStage::Decoded;
        Ok(decode_adc_raw(msb, lsb, map.lsb_shift))
    }

    fn measure_mv(&mut self, channel: AdcChannel, full_scale_mv: u32) -> Result<u16, Error<IF::Error>> {
        let raw = self.measure_raw(channel)?;
        Ok(scale_adc(raw, full_scale_mv) as u16)
    }

    /// Battery voltage (mV).
    pub fn read_vbat_mv(&mut self) -> Result<u16, Error<IF::Error>> {
        self.measure_mv(AdcChannel::Vbat, VBAT_FULL_SCALE_MV)
    }

    /// System rail voltage (mV).
    pub fn read_vsys_mv(&mut self) -> Result<u16, Error<IF::Error>> {
        self.measure_mv(AdcChannel::Vsys, VSYS_FULL_SCALE_MV)
    }

    /// USB/VBUS input voltage (mV).
    pub fn read_vbus_mv(&mut self) -> Result<u16, Error<IF::Error>> {
        self.measure_mv(AdcChannel::Vbus, VBUS_FULL_SCALE_MV)
    }

    /// Battery current (mA), positive while charging.
    pub fn read_ibat_ma(&mut self) -> Result<i32, Error<IF::Error>> {
        let raw = self.measure_raw(AdcChannel::Ibat)?;
        let status = self.measurement_step(MeasurementStage::Decoded, |s| {
            s.read_reg(addr::adc::IBAT_MEAS_STATUS)
        })?;
        let status = IbatStatusBits::from_bits_truncate(status);
        battery_current_ma(raw, status, self.charge_current_ma).ok_or(Error::InvalidMeasurement)
    }

    /// Battery temperature (°C) from the NTC, using the configured beta.
    pub fn read_battery_temperature_c(&mut self) -> Result<f32, Error<IF::Error>> {
        let raw = self.measure_raw(AdcChannel::Ntc)?;
        ntc_temperature_c(raw, self.gauge.ntc_beta()).ok_or(Error::InvalidMeasurement)
    }

    /// Die temperature (°C).
    pub fn read_die_temperature_c(&mut self) -> Result<f32, Error<IF::Error>> {
        let raw = self.measure_raw(AdcChannel::DieTemperature)?;
        Ok(die_temperature_c(raw))
    }

    /// VBAT below [`BATTERY_LOW_MV`].
    pub fn is_battery_low(&mut self) -> Result<bool, Error<IF::Error>> {
        Ok(self.read_vbat_mv()? < BATTERY_LOW_MV)
    }

    /// VBUS detected on the input.
    pub fn is_vbus_present(&mut self) -> Result<bool, Error<IF::Error>> {
        let bits = VbusStatusBits::from_bits_truncate(self.read_reg(addr::sysreg::VBUSIN_STATUS)?);
        Ok(bits.contains(VbusStatusBits::PRESENT))
    }

    /// Voltage-only battery level (%).
    pub fn battery_percent(&mut self) -> Result<u8, Error<IF::Error>> {
        let vbat = self.read_vbat_mv()?;
        Ok(FuelGauge::voltage_soc(vbat) as u8)
    }

    /// Sample VBAT, VSYS, VBUS presence and charger state in one call.
    pub fn read_power_status(&mut self) -> Result<PowerStatus, Error<IF::Error>> {
        Ok(PowerStatus {
            vbat_mv: self.read_vbat_mv()?,
            vsys_mv: self.read_vsys_mv()?,
            vbus_present: self.is_vbus_present()?,
            charger: self.charger_state()?,
        })
    }

    // Fuel gauge

    /// Sample VBAT, NTC and IBAT into the gauge, returning the current to integrate.
    /// Failed reads keep the last-known values.
    fn sample_fuel_gauge(&mut self) -> i32 {
        match self.read_vbat_mv() {
            Ok(mv) => self.gauge.record_voltage(mv),
            Err(_) => warn!("fuel gauge: VBAT read failed, keeping last value"),
        }
        match self.read_battery_temperature_c() {
            Ok(t) => self.gauge.record_temperature(t),
            Err(_) => warn!("fuel gauge: NTC read failed, keeping last value"),
        }
        match self.read_ibat_ma() {
            Ok(ma) => ma,
            Err(_) => {
                warn!("fuel gauge: IBAT read failed, reusing last value");
                self.gauge.last_current_ma()
            }
        }
    }

    /// Sample the battery and integrate over `delta_hours`.
    pub fn update_fuel_gauge(&mut self, delta_hours: f32) {
        let current = self.sample_fuel_gauge();
        self.gauge.update(delta_hours, current);
    }

    /// Sample the battery and integrate since the previous timestamped update.
    pub fn update_fuel_gauge_at(&mut self, now_ms: u64) {
        let current = self.sample_fuel_gauge();
        self.gauge.update_at(now_ms, current);
    }

    // GPIO

    fn check_pin(pin: u8) -> Result<(), Error<IF::Error>> {
        if pin < GPIO_PIN_COUNT {
            Ok(())
        } else {
            Err(Error::InvalidParameter)
        }
    }

    /// Set the function of a pin (0..=4).
    pub fn set_gpio_mode(&mut self, pin: u8, mode: GpioMode) -> Result<(), Error<IF::Error>> {
        Self::check_pin(pin)?;
        self.write_reg(addr::gpio::MODE0.offset_by(pin), mode as u8)
    }

    /// Set a GPIO mode from its raw register value (0..=9).
    pub fn set_gpio_mode_raw(&mut self, pin: u8, mode: u8) -> Result<(), Error<IF::Error>> {
        let mode = GpioMode::try_from(mode).map_err(|_| Error::InvalidParameter)?;
        self.set_gpio_mode(pin, mode)
    }

    /// Drive a pin as a logic output.
    pub fn set_gpio_output(&mut self, pin: u8, high: bool) -> Result<(), Error<IF::Error>> {
        let mode = if high { GpioMode::OutputLogic1 } else { GpioMode::OutputLogic0 };
        self.set_gpio_mode(pin, mode)
    }

    /// Input level of a pin.
    pub fn gpio_input(&mut self, pin: u8) -> Result<bool, Error<IF::Error>> {
        Self::check_pin(pin)?;
        let status = self.read_reg(addr::gpio::STATUS)?;
        Ok(status & (1 << pin) != 0)
    }

    /// Enable or disable the pin's pull-up.
    pub fn set_gpio_pull_up(&mut self, pin: u8, enable: bool) -> Result<(), Error<IF::Error>> {
        Self::check_pin(pin)?;
        self.write_reg(addr::gpio::PULL_UP_EN0.offset_by(pin), enable as u8)
    }

    /// Enable or disable the pin's pull-down.
    pub fn set_gpio_pull_down(&mut self, pin: u8, enable: bool) -> Result<(), Error<IF::Error>> {
        Self::check_pin(pin)?;
        self.write_reg(addr::gpio::PULL_DOWN_EN0.offset_by(pin), enable as u8)
    }

    /// Apply mode and pull configuration for one pin.
    pub fn configure_gpio(&mut self, config: &GpioPinConfig) -> Result<(), Error<IF::Error>> {
        if !config.is_valid() {
            return Err(Error::InvalidParameter);
        }
        self.set_gpio_mode(config.pin, config.mode)?;
        self.set_gpio_pull_up(config.pin, config.pull_up)?;
        self.set_gpio_pull_down(config.pin, config.pull_down)
    }

    // Ship / hold

    /// Configure the SHPHLD button and latch the configuration.
    pub fn set_ship_hold_mode(&mut self, mode: ShipHoldMode) -> Result<(), Error<IF::Error>> {
        self.write_reg(addr::ship::HOLD_CONFIG, mode.bits())?;
        self.write_reg(addr::ship::TASK_CONFIG_STROBE, TASK_TRIGGER)
    }

    /// Enter ship mode; the device powers down until woken by SHPHLD or VBUS.
    pub fn enter_ship_mode(&mut self) -> Result<(), Error<IF::Error>> {
        debug!("entering ship mode");
        self.write_reg(addr::ship::TASK_ENTER_SHIP_MODE, TASK_TRIGGER)
    }
}
