mod common;

use common::{Event, FakeBusError, fake_driver};
use npm1300_rs::data_types::{LdswMode, MeasurementStage, Rail};
use npm1300_rs::registers::addr;
use npm1300_rs::{Config, Error};

#[test]
fn charge_current_reprogrammed_with_charger_disabled() {
    let (mut driver, fake) = fake_driver();
    driver.enable_charger().unwrap();
    fake.clear_log();

    driver.set_charge_current(100).unwrap();

    assert_eq!(
        fake.log(),
        vec![
            Event::Write(addr::charger::ENABLE_CLR, 1),
            Event::DelayMs(10),
            Event::Write(addr::charger::ISET_MSB, 25),
            Event::Write(addr::charger::ISET_LSB, 0),
            Event::Write(addr::charger::ENABLE_SET, 1),
        ]
    );
    assert_eq!(fake.iset_writes_while_enabled(), 0);
    assert!(fake.charger_enabled());
    assert_eq!(driver.charge_current_ma(), 100);
    assert_eq!(driver.charge_current().unwrap(), 100);
}

#[test]
fn failed_current_write_leaves_charger_disabled() {
    let (mut driver, fake) = fake_driver();
    driver.enable_charger().unwrap();
    fake.fail_writes_to(Some(addr::charger::ISET_LSB));

    assert_eq!(driver.set_charge_current(400), Err(Error::Bus(FakeBusError)));
    assert!(!fake.charger_enabled());
    assert_eq!(fake.iset_writes_while_enabled(), 0);
    // Cached current only changes after a complete update.
    assert_eq!(driver.charge_current_ma(), 32);
}

#[test]
fn default_init_programs_expected_state() {
    let (mut driver, fake) = fake_driver();
    driver.begin().unwrap();

    let log = fake.log();
    assert_eq!(log[0], Event::DelayMs(100));
    assert_eq!(log[1], Event::Read(addr::charger::CHARGE_STATUS));

    assert_eq!(fake.get(addr::buck::BUCK1_NORM_VOUT), 23);
    assert_eq!(fake.get(addr::buck::BUCK2_NORM_VOUT), 23);
    assert_eq!(fake.get(addr::buck::BUCK_SW_CTRL_SEL), 0x03);
    assert_eq!(fake.get(addr::buck::BUCK1_ENA_SET), 1);
    assert_eq!(fake.get(addr::buck::BUCK2_ENA_SET), 1);

    assert_eq!(fake.get(addr::ldsw::LDSW1_LDO_SEL), 1);
    assert_eq!(fake.get(addr::ldsw::LDSW2_LDO_SEL), 1);
    assert_eq!(fake.get(addr::ldsw::LDSW1_VOUT_SEL), 23);
    assert_eq!(fake.get(addr::ldsw::LDSW1_ENA_SET), 1);
    assert_eq!(fake.get(addr::ldsw::LDSW2_ENA_CLR), 1);
    assert_eq!(fake.get(addr::ldsw::LDSW2_ENA_SET), 0);

    assert_eq!(fake.get(addr::charger::VTERM), 8);
    assert!(fake.charger_enabled());
    assert!(
        !fake
            .writes()
            .iter()
            .any(|(reg, _)| *reg == addr::charger::ISET_MSB || *reg == addr::charger::ISET_LSB)
    );

    assert_eq!(fake.get(addr::gpio::MODE0), 5);
    assert_eq!(fake.get(addr::ship::HOLD_CONFIG), 1);
    assert_eq!(fake.get(addr::ship::TASK_CONFIG_STROBE), 1);
}

#[test]
fn init_adopts_programmed_charge_current() {
    let (mut driver, fake) = fake_driver();
    fake.set(addr::charger::ISET_MSB, 100);
    driver.begin().unwrap();
    assert_eq!(driver.charge_current_ma(), 400);

    fake.set(addr::adc::IBAT_MSB, 0xFF);
    fake.set(addr::adc::GP1_LSBS, 0b0011_0000);
    fake.set(addr::adc::IBAT_MEAS_STATUS, 0b0000_1000);
    assert_eq!(driver.read_ibat_ma().unwrap(), 500);
}

#[test]
fn init_with_configured_current_programs_it() {
    let (mut driver, fake) = fake_driver();
    let config = Config {
        charge_current_ma: Some(200),
        ..Config::default()
    };
    driver.init(&config).unwrap();
    assert_eq!(driver.charge_current_ma(), 200);
    assert_eq!(fake.get(addr::charger::ISET_MSB), 50);
    assert_eq!(fake.iset_writes_while_enabled(), 0);
}

#[test]
fn init_on_absent_device_writes_nothing() {
    let (mut driver, fake) = fake_driver();
    fake.fail_reads(true);
    assert_eq!(driver.begin(), Err(Error::DeviceNotPresent));
    assert!(fake.writes().is_empty());
}

#[test]
fn buck_override_preserves_unrelated_bits() {
    let (mut driver, fake) = fake_driver();
    fake.set(addr::buck::BUCK_SW_CTRL_SEL, 0x80);

    driver.set_voltage(Rail::Buck1, 1_800).unwrap();
    assert_eq!(fake.get(addr::buck::BUCK_SW_CTRL_SEL), 0x81);

    driver.set_voltage(Rail::Buck2, 2_500).unwrap();
    assert_eq!(fake.get(addr::buck::BUCK_SW_CTRL_SEL), 0x83);
    assert_eq!(driver.voltage(Rail::Buck2).unwrap(), 2_500);
}

#[test]
fn ldo_setpoint_leaves_override_alone() {
    let (mut driver, fake) = fake_driver();
    driver.set_voltage(Rail::Ldo2, 1_800).unwrap();
    assert_eq!(fake.writes(), vec![(addr::ldsw::LDSW2_VOUT_SEL, 8)]);
}

#[test]
fn ldsw_mode_rejects_bucks() {
    let (mut driver, fake) = fake_driver();
    assert_eq!(driver.set_ldsw_mode(Rail::Buck1, LdswMode::Ldo), Err(Error::InvalidParameter));
    assert!(fake.writes().is_empty());

    driver.set_ldsw_mode(Rail::Ldo1, LdswMode::LoadSwitch).unwrap();
    assert_eq!(fake.writes(), vec![(addr::ldsw::LDSW1_LDO_SEL, 0)]);
}

#[test]
fn measurement_follows_trigger_wait_read_order() {
    let (mut driver, fake) = fake_driver();
    fake.set(addr::adc::VBAT_MSB, 0x80);
    fake.set(addr::adc::GP0_LSBS, 0x00);

    assert_eq!(driver.read_vbat_mv().unwrap(), 2_502);
    assert_eq!(
        fake.log(),
        vec![
            Event::Write(addr::adc::TASK_VBAT, 1),
            Event::DelayMs(1),
            Event::Read(addr::adc::VBAT_MSB),
            Event::Read(addr::adc::GP0_LSBS),
        ]
    );
    assert_eq!(driver.last_measurement_stage(), MeasurementStage::Decoded);
}

#[test]
fn failed_trigger_never_reads_results() {
    let (mut driver, fake) = fake_driver();
    fake.fail_writes_to(Some(addr::adc::TASK_VBAT));

    assert_eq!(driver.read_vbat_mv(), Err(Error::Bus(FakeBusError)));
    assert!(fake.log().iter().all(|e| !matches!(e, Event::Read(_))));
    assert_eq!(driver.last_measurement_stage(), MeasurementStage::Failed);
}

#[test]
fn battery_low_threshold() {
    let (mut driver, fake) = fake_driver();
    // raw 655 -> 3201 mV
    fake.set(addr::adc::VBAT_MSB, 163);
    fake.set(addr::adc::GP0_LSBS, 0x03);
    assert!(driver.is_battery_low().unwrap());

    // raw 737 -> 3602 mV
    fake.set(addr::adc::VBAT_MSB, 184);
    fake.set(addr::adc::GP0_LSBS, 0x01);
    assert!(!driver.is_battery_low().unwrap());
    assert_eq!(driver.battery_percent().unwrap(), 50);
}

#[test]
fn raw_register_access() {
    let (mut driver, fake) = fake_driver();
    let reg = addr::gpio::MODE0;
    driver.write_regs(reg, &[1, 2, 3]).unwrap();
    let mut buf = [0u8; 3];
    driver.read_regs(reg, &mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3]);

    driver.update_reg(reg, 0x0F, 0x0A).unwrap();
    assert_eq!(fake.get(reg), 0x0A);
}
