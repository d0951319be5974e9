//! Software fuel gauge: coulomb counting blended with a voltage estimate.
//!
//! The nPM1300 has no on-chip gauge, so state of charge is estimated from
//! periodic VBAT/IBAT/NTC samples. Estimates never fail; when samples are
//! missing they fall back to the last recorded values.

/// Cell voltage mapped to 0 % and 100 %.
pub const SOC_EMPTY_MV: u16 = 3_000;
pub const SOC_FULL_MV: u16 = 4_200;
/// Above this temperature the voltage estimate is derated.
pub const DERATING_REFERENCE_C: f32 = 25.0;
/// Fraction of the voltage estimate removed per °C above the reference.
pub const DERATING_PER_C: f32 = 0.01;
/// State-of-health loss (%) per counted cycle.
pub const SOH_FADE_PER_CYCLE: f32 = 0.05;

/// Default cell capacity (mAh).
pub const DEFAULT_CAPACITY_MAH: f32 = 1_000.0;
/// Default NTC beta constant (10 kΩ, B25/85 = 3380).
pub const DEFAULT_NTC_BETA: f32 = 3_380.0;

/// Running estimator state, owned by the driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuelGauge {
    capacity_mah: f32,
    ntc_beta: f32,
    integrated_charge_mah: f32,
    cycle_count: u32,
    last_update_ms: Option<u64>,
    last_vbat_mv: Option<u16>,
    last_temperature_c: Option<f32>,
    last_current_ma: i32,
}

impl Default for FuelGauge {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_MAH, DEFAULT_NTC_BETA)
    }
}

impl FuelGauge {
    pub const fn new(capacity_mah: f32, ntc_beta: f32) -> Self {
        Self {
            capacity_mah,
            ntc_beta,
            integrated_charge_mah: 0.0,
            cycle_count: 0,
            last_update_ms: None,
            last_vbat_mv: None,
            last_temperature_c: None,
            last_current_ma: 0,
        }
    }

    pub fn capacity_mah(&self) -> f32 {
        self.capacity_mah
    }

    pub fn ntc_beta(&self) -> f32 {
        self.ntc_beta
    }

    /// Change the battery parameters, keeping accumulated state.
    pub fn configure(&mut self, capacity_mah: f32, ntc_beta: f32) {
        self.capacity_mah = capacity_mah;
        self.ntc_beta = ntc_beta;
    }

    pub fn integrated_charge_mah(&self) -> f32 {
        self.integrated_charge_mah
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn last_vbat_mv(&self) -> Option<u16> {
        self.last_vbat_mv
    }

    pub fn last_temperature_c(&self) -> Option<f32> {
        self.last_temperature_c
    }

    pub fn last_current_ma(&self) -> i32 {
        self.last_current_ma
    }

    /// Clear accumulated charge, cycles and samples.
    pub fn reset(&mut self) {
        *self = Self::new(self.capacity_mah, self.ntc_beta);
    }

    pub fn record_voltage(&mut self, vbat_mv: u16) {
        self.last_vbat_mv = Some(vbat_mv);
    }

    pub fn record_temperature(&mut self, celsius: f32) {
        self.last_temperature_c = Some(celsius);
    }

    /// Integrate `current_ma` over `delta_hours`.
    ///
    /// Every charging (positive) sample counts as a cycle; this is a crude
    /// proxy rather than true cycle counting.
    pub fn update(&mut self, delta_hours: f32, current_ma: i32) {
        self.integrated_charge_mah += current_ma as f32 * delta_hours;
        if current_ma > 0 {
            self.cycle_count = self.cycle_count.saturating_add(1);
        }
        self.last_current_ma = current_ma;
    }

    /// Timestamped variant of [`update`](Self::update). The first call only
    /// records the timestamp.
    pub fn update_at(&mut self, now_ms: u64, current_ma: i32) {
        if let Some(prev) = self.last_update_ms {
            let delta_hours = now_ms.saturating_sub(prev) as f32 / 3_600_000.0;
            self.update(delta_hours, current_ma);
        } else {
            self.last_current_ma = current_ma;
        }
        self.last_update_ms = Some(now_ms);
    }

    /// Linear voltage estimate over [3.0 V, 4.2 V], in percent.
    pub fn voltage_soc(vbat_mv: u16) -> f32 {
        if vbat_mv >= SOC_FULL_MV {
            100.0
        } else if vbat_mv <= SOC_EMPTY_MV {
            0.0
        } else {
            (vbat_mv - SOC_EMPTY_MV) as f32 * 100.0 / (SOC_FULL_MV - SOC_EMPTY_MV) as f32
        }
    }

    /// State of charge in percent, clamped to [0, 100].
    pub fn state_of_charge(&self) -> f32 {
        let mut soc = self.last_vbat_mv.map(Self::voltage_soc).unwrap_or(0.0);
        if let Some(t) = self.last_temperature_c {
            if t > DERATING_REFERENCE_C {
                let factor = 1.0 - DERATING_PER_C * (t - DERATING_REFERENCE_C);
                soc *= factor.max(0.0);
            }
        }
        if self.capacity_mah > 0.0 {
            soc += self.integrated_charge_mah / self.capacity_mah * 100.0;
        }
        soc.clamp(0.0, 100.0)
    }

    /// State of health in percent: linear fade per counted cycle, floored at 0.
    pub fn state_of_health(&self) -> f32 {
        (100.0 - self.cycle_count as f32 * SOH_FADE_PER_CYCLE).max(0.0)
    }
}
