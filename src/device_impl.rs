use crate::bus::{ReadBuf, Transaction, Transport};
use crate::hw_def::*;
use crate::register::*;
use crate::types::*;

/// A no-hold measurement that has been issued but not fetched yet
#[must_use]
#[derive(Debug)]
pub(crate) struct PendingMeasurement {
    kind: MeasurementKind,
}

// Every operation takes `&mut self` for its whole duration, including settle delays, so two
// exchanges on the same instance can never interleave on the bus.
impl<T, Delay> Si7021<T, Delay>
where
    T: Transport,
{
    /// Create a new, unconfigured Si7021 driver instance
    pub fn new(transport: T, delay: Delay) -> Self {
        Self {
            transport,
            delay,
            config: SensorConfig::default(),
            state: DriverState::Unconfigured,
            checksum_failures: 0,
        }
    }

    /// Initialization progress
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Configuration supplied to the last [`init`](Self::init)
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Number of measurements whose checksum did not match since the driver was created
    pub fn checksum_failures(&self) -> u32 {
        self.checksum_failures
    }

    /// Give back the transport and the delay
    pub fn release(self) -> (T, Delay) {
        (self.transport, self.delay)
    }

    /// Configure the bus, install its driver and look for the sensor.
    ///
    /// Stops at the first failing step and reports it.  May be called again from scratch after
    /// any failure, or to apply a new configuration.
    pub fn init(&mut self, config: SensorConfig) -> Result<(), Error> {
        self.state = DriverState::Unconfigured;
        self.config = config;

        self.transport.configure(&self.config.bus).map_err(|err| {
            warn!("si7021::init(): bus configuration rejected: {:?}", err);
            Error::ConfigError
        })?;
        self.state = DriverState::ParamsConfigured;
        debug!("si7021::init(): bus configured");

        let port = self.config.port;
        self.transport.install(port).map_err(|err| {
            warn!("si7021::init(): bus install failed on port {}: {:?}", port, err);
            Error::InstallError
        })?;
        self.state = DriverState::DriverInstalled;
        debug!("si7021::init(): bus installed on port {}", self.config.port);

        self.check_availability()
    }

    /// Check that the sensor acknowledges its address.  No data is transferred.
    ///
    /// A missing acknowledge leaves the driver in [`DriverState::DriverInstalled`], so every other
    /// operation is rejected until a later check succeeds.
    pub fn check_availability(&mut self) -> Result<(), Error> {
        if !matches!(self.state, DriverState::DriverInstalled | DriverState::Ready) {
            return Err(Error::InvalidState);
        }
        let probe = Transaction::probe(I2C_ADDR)?;
        if let Err(err) = self.execute(&probe) {
            warn!("si7021::check_availability(): no acknowledge: {:?}", err);
            // a sensor that stopped answering must be probed again before it is used
            self.state = DriverState::DriverInstalled;
            return Err(Error::NotFound);
        }
        if self.state != DriverState::Ready {
            debug!("si7021::check_availability(): sensor found, ready");
        }
        self.state = DriverState::Ready;
        Ok(())
    }

    pub(crate) fn ensure_ready(&self) -> Result<(), Error> {
        match self.state {
            DriverState::Ready => Ok(()),
            _ => Err(Error::InvalidState),
        }
    }

    fn execute(&mut self, transaction: &Transaction) -> Result<ReadBuf, Error> {
        trace!(
            "si7021::execute(): {} ops, {} to read",
            transaction.ops().len(),
            transaction.read_len()
        );
        let read_buf = self.transport.execute(transaction, self.config.timeout_ms)?;
        if read_buf.len() != transaction.read_len() {
            warn!(
                "si7021::execute(): expected {} bytes, got {}",
                transaction.read_len(),
                read_buf.len()
            );
            return Err(Error::BusFailure);
        }
        Ok(read_buf)
    }

    pub(crate) fn write_command(&mut self, cmd: Command, payload: &[u8]) -> Result<(), Error> {
        let transaction = Transaction::write(I2C_ADDR, &[cmd.bytes(), payload])?;
        self.execute(&transaction)?;
        Ok(())
    }

    pub(crate) fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let transaction = Transaction::read(I2C_ADDR, N)?;
        let read_buf = self.execute(&transaction)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&read_buf);
        Ok(bytes)
    }

    fn cmd_and_read<const N: usize>(&mut self, cmd: Command) -> Result<[u8; N], Error> {
        self.ensure_ready()?;
        self.write_command(cmd, &[])?;
        self.read_bytes()
    }

    /// Issue a no-hold measurement.  The device releases the bus while it converts.
    pub(crate) fn start_measurement(&mut self, kind: MeasurementKind) -> Result<PendingMeasurement, Error> {
        self.ensure_ready()?;
        self.write_command(kind.command(), &[])?;
        Ok(PendingMeasurement { kind })
    }

    /// Fetch the result of a measurement once its conversion time has passed
    pub(crate) fn finish_measurement(&mut self, pending: PendingMeasurement) -> Result<Datum, Error> {
        let [msb, lsb, crc] = self.read_bytes::<3>()?;
        let raw = self.check_reading(RawReading {
            value: u16::from_be_bytes([msb, lsb]),
            checksum: crc,
        })?;
        Ok(match pending.kind {
            MeasurementKind::Temperature => Datum::Temperature(raw),
            MeasurementKind::RelHumid => Datum::RelHumid(raw),
        })
    }

    fn check_reading(&mut self, reading: RawReading) -> Result<u16, Error> {
        if !reading.is_valid() {
            self.checksum_failures = self.checksum_failures.saturating_add(1);
            warn!(
                "si7021: crc mismatch: value={:#x}, read_crc={:#x}, crc_expect={:#x}",
                reading.value,
                reading.checksum,
                crate::crc8::checksum(reading.value)
            );
            if self.config.crc_policy == CrcPolicy::Strict {
                return Err(Error::ChecksumMismatch);
            }
        }
        Ok(reading.masked())
    }

    /// Read the temperature measured during the last relative humidity measurement.
    ///
    /// No conversion is started, so no settle delay is needed.  The device sends no checksum.
    pub fn read_previous_temperature(&mut self) -> Result<f32, Error> {
        let bytes = self.cmd_and_read::<2>(Command::ReadPreviousTemp)?;
        let raw = u16::from_be_bytes(bytes) & MEASUREMENT_DATA_MASK;
        Ok(checked_centigrade(raw))
    }

    /// Read RH/T user register 1
    pub fn read_user_register(&mut self) -> Result<UserRegister, Error> {
        let [raw] = self.cmd_and_read::<1>(Command::ReadUserReg)?;
        Ok(UserRegister::from_raw(raw))
    }

    /// Write RH/T user register 1
    pub fn write_user_register(&mut self, reg: UserRegister) -> Result<(), Error> {
        self.ensure_ready()?;
        self.write_command(Command::WriteUserReg, &[reg.raw()])
    }

    fn modify_user_register(&mut self, f: impl FnOnce(UserRegister) -> UserRegister) -> Result<(), Error> {
        let current = self.read_user_register()?;
        let updated = f(current);
        trace!("si7021: user register {:#x} -> {:#x}", current.raw(), updated.raw());
        self.write_user_register(updated)
    }

    /// Measurement resolution
    pub fn get_resolution(&mut self) -> Result<Resolution, Error> {
        Ok(self.read_user_register()?.resolution())
    }

    /// Change the measurement resolution, keeping every other user register bit
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error> {
        self.modify_user_register(|reg| reg.with_resolution(resolution))
    }

    /// Whether the on-chip heater is enabled
    pub fn get_heater_status(&mut self) -> Result<bool, Error> {
        Ok(self.read_user_register()?.heater_enabled())
    }

    /// Enable or disable the on-chip heater, keeping every other user register bit
    pub fn set_heater_status(&mut self, enabled: bool) -> Result<(), Error> {
        self.modify_user_register(|reg| reg.with_heater(enabled))
    }

    /// Supply voltage status
    pub fn read_vdd_status(&mut self) -> Result<VddStatus, Error> {
        Ok(self.read_user_register()?.vdd_status())
    }

    /// Heater drive current
    pub fn get_heater_register(&mut self) -> Result<HeaterCurrent, Error> {
        let [raw] = self.cmd_and_read::<1>(Command::ReadHeaterReg)?;
        Ok(HeaterCurrent::from_raw(raw))
    }

    /// Set the heater drive current.  A raw `u8` is masked to its low nibble.
    pub fn set_heater_register(&mut self, current: impl Into<HeaterCurrent>) -> Result<(), Error> {
        self.ensure_ready()?;
        let current = current.into();
        self.write_command(Command::WriteHeaterReg, &[current.raw()])
    }

    /// Read the firmware revision
    pub fn read_firmware_revision(&mut self) -> Result<FirmwareRevision, Error> {
        let [raw] = self.cmd_and_read::<1>(Command::ReadFirmwareRev)?;
        Ok(FirmwareRevision::from(raw))
    }

    /// Read the 64-bit electronic ID.  Either half failing fails the whole read.
    pub fn get_electronic_id(&mut self) -> Result<ElectronicId, Error> {
        let sna = u32::from_be_bytes(self.cmd_and_read::<4>(Command::ReadId1)?);
        let snb = u32::from_be_bytes(self.cmd_and_read::<4>(Command::ReadId2)?);
        Ok(ElectronicId::from_halves(sna, snb))
    }
}

fn checked_centigrade(raw: u16) -> f32 {
    let centigrade = raw_temp_to_centigrade(raw);
    if !is_plausible_centigrade(centigrade) {
        warn!("si7021: temperature {} C outside the operating range", centigrade);
    }
    centigrade
}

fn checked_humidity(raw: u16) -> f32 {
    let percent = raw_rel_humid_to_percent(raw);
    if !is_plausible_humidity(percent) {
        warn!("si7021: relative humidity {} % outside 0..=100", percent);
    }
    percent
}

#[cfg(feature = "blocking")]
impl<T, Delay> Si7021<T, Delay>
where
    T: Transport,
    Delay: embedded_hal::delay::DelayNs,
{
    /// Issue a measurement, wait for the conversion and fetch the result
    pub fn measure(&mut self, kind: MeasurementKind) -> Result<Datum, Error> {
        let pending = self.start_measurement(kind)?;
        embedded_hal::delay::DelayNs::delay_ms(&mut self.delay, self.config.settle_delay_ms);
        self.finish_measurement(pending)
    }

    /// Measure the temperature in degrees centigrade
    pub fn read_temperature(&mut self) -> Result<f32, Error> {
        let raw = self.measure(MeasurementKind::Temperature)?.raw();
        Ok(checked_centigrade(raw))
    }

    /// Measure the relative humidity in percent
    pub fn read_humidity(&mut self) -> Result<f32, Error> {
        let raw = self.measure(MeasurementKind::RelHumid)?.raw();
        Ok(checked_humidity(raw))
    }

    /// Measure relative humidity, then fetch the temperature the device took along with it
    pub fn read_temperature_and_humidity(&mut self) -> Result<TempAndRelHumid, Error> {
        let humidity_percent = self.read_humidity()?;
        let centigrade = self.read_previous_temperature()?;
        Ok(TempAndRelHumid {
            centigrade,
            fahrenheit: centigrade_to_fahrenheit(centigrade),
            humidity_percent,
        })
    }

    /// Software reset.  Waits for the device to come back up before returning.
    pub fn soft_reset(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        self.write_command(Command::SoftReset, &[])?;
        embedded_hal::delay::DelayNs::delay_ms(&mut self.delay, RESET_DELAY_MS);
        Ok(())
    }
}

#[cfg(feature = "async")]
impl<T, Delay> Si7021<T, Delay>
where
    T: Transport,
    Delay: embedded_hal_async::delay::DelayNs,
{
    /// Issue a measurement, yield to the executor during the conversion and fetch the result
    pub async fn measure_async(&mut self, kind: MeasurementKind) -> Result<Datum, Error> {
        let pending = self.start_measurement(kind)?;
        embedded_hal_async::delay::DelayNs::delay_ms(&mut self.delay, self.config.settle_delay_ms).await;
        self.finish_measurement(pending)
    }

    /// Measure the temperature in degrees centigrade
    pub async fn read_temperature_async(&mut self) -> Result<f32, Error> {
        let raw = self.measure_async(MeasurementKind::Temperature).await?.raw();
        Ok(checked_centigrade(raw))
    }

    /// Measure the relative humidity in percent
    pub async fn read_humidity_async(&mut self) -> Result<f32, Error> {
        let raw = self.measure_async(MeasurementKind::RelHumid).await?.raw();
        Ok(checked_humidity(raw))
    }
}

#[cfg(all(test, feature = "blocking"))]
mod tests {
    use super::*;
    use crate::bus::{Frame, TransportError};
    use crate::testing::{FakeSi7021, RecordingDelay};

    use heapless::Vec as HVec;

    type Sensor = Si7021<FakeSi7021, RecordingDelay>;

    fn ready(fake: FakeSi7021) -> Sensor {
        let mut sensor = Si7021::new(fake, RecordingDelay::default());
        sensor.init(SensorConfig::default()).unwrap();
        sensor
    }

    fn write(bytes: &[u8]) -> Frame {
        Frame::Write { address: I2C_ADDR, payload: HVec::from_slice(bytes).unwrap() }
    }

    fn read(len: usize) -> Frame {
        Frame::Read { address: I2C_ADDR, len }
    }

    #[test]
    fn init_walks_all_states() {
        let cfg = SensorConfig::default().with_port(1);
        let mut sensor = Si7021::new(FakeSi7021::default(), RecordingDelay::default());
        assert_eq!(sensor.state(), DriverState::Unconfigured);
        sensor.init(cfg).unwrap();
        assert_eq!(sensor.state(), DriverState::Ready);
        assert_eq!(sensor.config(), &cfg);
        let (fake, _) = sensor.release();
        assert_eq!(fake.configured_with, Some(cfg.bus));
        assert_eq!(fake.installed_on, Some(1));
        assert_eq!(fake.log, [write(&[])]);
    }

    #[test]
    fn init_stops_at_config_failure() {
        let fake = FakeSi7021 { configure_result: Err(TransportError::InvalidArgument), ..Default::default() };
        let mut sensor = Si7021::new(fake, RecordingDelay::default());
        assert_eq!(sensor.init(SensorConfig::default()), Err(Error::ConfigError));
        assert_eq!(sensor.state(), DriverState::Unconfigured);
        let (fake, _) = sensor.release();
        assert_eq!(fake.installed_on, None);
        assert!(fake.log.is_empty());
    }

    #[test]
    fn init_stops_at_install_failure() {
        let fake = FakeSi7021 { install_result: Err(TransportError::Fail), ..Default::default() };
        let mut sensor = Si7021::new(fake, RecordingDelay::default());
        assert_eq!(sensor.init(SensorConfig::default()), Err(Error::InstallError));
        assert_eq!(sensor.state(), DriverState::ParamsConfigured);
        assert!(sensor.release().0.log.is_empty());
    }

    #[test]
    fn missing_sensor_is_not_found_and_not_ready() {
        let fake = FakeSi7021 { present: false, ..Default::default() };
        let mut sensor = Si7021::new(fake, RecordingDelay::default());
        assert_eq!(sensor.init(SensorConfig::default()), Err(Error::NotFound));
        assert_ne!(sensor.state(), DriverState::Ready);
        assert_eq!(sensor.read_temperature(), Err(Error::InvalidState));
        assert_eq!(sensor.get_resolution(), Err(Error::InvalidState));
        // only the probe touched the bus
        assert_eq!(sensor.release().0.log.len(), 1);
    }

    #[test]
    fn operations_before_init_are_rejected() {
        let mut sensor = Si7021::new(FakeSi7021::default(), RecordingDelay::default());
        assert_eq!(sensor.check_availability(), Err(Error::InvalidState));
        assert_eq!(sensor.read_humidity(), Err(Error::InvalidState));
        assert_eq!(sensor.set_heater_status(true), Err(Error::InvalidState));
        assert_eq!(sensor.soft_reset(), Err(Error::InvalidState));
        assert!(sensor.release().0.log.is_empty());
    }

    #[test]
    fn temperature_is_command_settle_read() {
        let mut sensor = ready(FakeSi7021::default());
        let centigrade = sensor.read_temperature().unwrap();
        assert!((centigrade - 24.68).abs() < 0.01, "centigrade={centigrade}");
        assert_eq!(sensor.checksum_failures(), 0);
        let (fake, delay) = sensor.release();
        assert_eq!(fake.log[1..], [write(&[0xF3]), read(3)]);
        assert!(fake.timeouts.iter().all(|t| *t == DEFAULT_TIMEOUT_MS));
        assert_eq!(delay.total_ms(), DEFAULT_SETTLE_DELAY_MS as u64);
    }

    #[test]
    fn humidity_conversion_and_timing_follow_config() {
        let fake = FakeSi7021 { humidity: 0x0000, ..Default::default() };
        let mut sensor = Si7021::new(fake, RecordingDelay::default());
        sensor
            .init(SensorConfig::default().with_settle_delay_ms(20).with_timeout_ms(300))
            .unwrap();
        // out of range values are passed through unclamped
        assert_eq!(sensor.read_humidity(), Ok(-6.0));
        let (fake, delay) = sensor.release();
        assert_eq!(fake.log[1..], [write(&[0xF5]), read(3)]);
        assert!(fake.timeouts.iter().all(|t| *t == 300));
        assert_eq!(delay.total_ms(), 20);
    }

    #[test]
    fn status_bits_are_masked() {
        let fake = FakeSi7021 { temperature: 0x0003, ..Default::default() };
        let mut sensor = ready(fake);
        assert_eq!(sensor.measure(MeasurementKind::Temperature), Ok(Datum::Temperature(0x0000)));
        assert_eq!(sensor.read_temperature(), Ok(-46.85));
    }

    #[test]
    fn checksum_mismatch_is_soft_by_default() {
        let fake = FakeSi7021 { corrupt_checksum: true, ..Default::default() };
        let mut sensor = ready(fake);
        let datum = sensor.measure(MeasurementKind::RelHumid).unwrap();
        assert_eq!(datum, Datum::RelHumid(0x7C80));
        assert_eq!(sensor.checksum_failures(), 1);
    }

    #[test]
    fn checksum_mismatch_is_an_error_in_strict_mode() {
        let fake = FakeSi7021 { corrupt_checksum: true, ..Default::default() };
        let mut sensor = Si7021::new(fake, RecordingDelay::default());
        sensor.init(SensorConfig::default().with_crc_policy(CrcPolicy::Strict)).unwrap();
        assert_eq!(sensor.read_temperature(), Err(Error::ChecksumMismatch));
        assert_eq!(sensor.checksum_failures(), 1);
    }

    #[test]
    fn failed_command_aborts_before_settle_and_read() {
        let mut sensor = ready(FakeSi7021::default().fail_at(1, TransportError::Timeout));
        assert_eq!(sensor.read_temperature(), Err(Error::Timeout));
        let (fake, delay) = sensor.release();
        assert_eq!(fake.log.len(), 2);
        assert_eq!(delay.total_ns, 0);
    }

    #[test]
    fn failed_read_yields_no_partial_data() {
        let mut sensor = ready(FakeSi7021::default().fail_at(2, TransportError::Fail));
        assert_eq!(sensor.read_humidity(), Err(Error::BusFailure));
    }

    #[test]
    fn transport_errors_reach_register_callers() {
        let mut sensor = ready(FakeSi7021::default().fail_at(1, TransportError::InvalidState));
        assert_eq!(sensor.set_heater_register(0x3u8), Err(Error::InvalidState));
        let mut sensor = ready(FakeSi7021::default().fail_at(1, TransportError::InvalidArgument));
        assert_eq!(sensor.soft_reset(), Err(Error::InvalidArgument));
    }

    #[test]
    fn set_resolution_preserves_other_bits() {
        let mut sensor = ready(FakeSi7021 { user_reg: 0x3A, ..Default::default() });
        sensor.set_resolution(Resolution::Rh11Temp11).unwrap();
        assert_eq!(sensor.get_resolution(), Ok(Resolution::Rh11Temp11));
        let reg = sensor.read_user_register().unwrap();
        assert_eq!(reg.raw() & 0x7E, 0x3A & 0x7E);
        let (fake, _) = sensor.release();
        assert_eq!(
            fake.log[1..4],
            [write(&[0xE7]), read(1), write(&[0xE6, 0xBB])]
        );
    }

    #[test]
    fn heater_status_leaves_resolution_alone() {
        let mut sensor = ready(FakeSi7021 { user_reg: 0xBB, ..Default::default() });
        sensor.set_heater_status(true).unwrap();
        assert_eq!(sensor.get_heater_status(), Ok(true));
        assert_eq!(sensor.get_resolution(), Ok(Resolution::Rh11Temp11));
        sensor.set_heater_status(false).unwrap();
        assert_eq!(sensor.get_heater_status(), Ok(false));
        assert_eq!(sensor.release().0.user_reg, 0xBB);
    }

    #[test]
    fn failed_register_read_skips_the_write() {
        let mut sensor = ready(FakeSi7021::default().fail_at(2, TransportError::Fail));
        assert_eq!(sensor.set_resolution(Resolution::Rh8Temp12), Err(Error::BusFailure));
        let fake = sensor.release().0;
        assert_eq!(fake.log.len(), 3);
        assert_eq!(fake.user_reg, USER_REG_RESET_VALUE);
    }

    #[test]
    fn vdd_status_reads_bit_six() {
        let mut sensor = ready(FakeSi7021 { user_reg: 0x7A, ..Default::default() });
        assert_eq!(sensor.read_vdd_status(), Ok(VddStatus::Low));
    }

    #[test]
    fn heater_register_is_masked_to_low_nibble() {
        let mut sensor = ready(FakeSi7021::default());
        sensor.set_heater_register(0xF5u8).unwrap();
        assert_eq!(sensor.get_heater_register(), Ok(HeaterCurrent::from_raw(0x05)));
        sensor.set_heater_register(HeaterCurrent::MAX).unwrap();
        assert_eq!(sensor.get_heater_register(), Ok(HeaterCurrent::MAX));
        let fake = sensor.release().0;
        assert_eq!(fake.log[1], write(&[0x51, 0x05]));
    }

    #[test]
    fn firmware_revision() {
        let mut sensor = ready(FakeSi7021 { firmware: 0xFF, ..Default::default() });
        assert_eq!(sensor.read_firmware_revision(), Ok(FirmwareRevision::V1_0));
        let fake = sensor.release().0;
        assert_eq!(fake.log[1..], [write(&[0x84, 0xB8]), read(1)]);
    }

    #[test]
    fn electronic_id_is_sna_then_snb() {
        let mut sensor = ready(FakeSi7021::default());
        let id = sensor.get_electronic_id().unwrap();
        assert_eq!(id, ElectronicId(0x1122_3344_1566_7788));
        assert_eq!(id.device(), DeviceKind::Si7021);
        let fake = sensor.release().0;
        assert_eq!(
            fake.log[1..],
            [write(&[0xFA, 0x0F]), read(4), write(&[0xFC, 0xC9]), read(4)]
        );
    }

    #[test]
    fn electronic_id_fails_when_second_half_fails() {
        let mut sensor = ready(FakeSi7021::default().fail_at(4, TransportError::Fail));
        assert_eq!(sensor.get_electronic_id(), Err(Error::BusFailure));
    }

    #[test]
    fn previous_temperature_follows_humidity() {
        let mut sensor = ready(FakeSi7021::default());
        let both = sensor.read_temperature_and_humidity().unwrap();
        assert!((both.humidity_percent - 54.79).abs() < 0.01);
        assert!((both.centigrade - 24.68).abs() < 0.01);
        assert!((both.fahrenheit - 76.43).abs() < 0.01);
        let (fake, delay) = sensor.release();
        assert_eq!(fake.log[1..], [write(&[0xF5]), read(3), write(&[0xE0]), read(2)]);
        // one settle only
        assert_eq!(delay.total_ms(), DEFAULT_SETTLE_DELAY_MS as u64);
    }

    #[test]
    fn soft_reset_restores_defaults_and_waits() {
        let mut sensor = ready(FakeSi7021 { user_reg: 0xBF, heater_reg: 0x0A, ..Default::default() });
        sensor.soft_reset().unwrap();
        assert_eq!(sensor.read_user_register(), Ok(UserRegister::default()));
        let (fake, delay) = sensor.release();
        assert_eq!(fake.log[1], write(&[0xFE]));
        assert_eq!(fake.heater_reg, 0x00);
        assert_eq!(delay.total_ms(), RESET_DELAY_MS as u64);
    }

    #[test]
    fn reinit_after_failure_succeeds() {
        let fake = FakeSi7021 { present: false, ..Default::default() };
        let mut sensor = Si7021::new(fake, RecordingDelay::default());
        assert_eq!(sensor.init(SensorConfig::default()), Err(Error::NotFound));
        sensor.transport.present = true;
        assert_eq!(sensor.init(SensorConfig::default()), Ok(()));
        assert_eq!(sensor.state(), DriverState::Ready);
    }

    #[test]
    fn lost_sensor_must_be_found_again_before_use() {
        let mut sensor = ready(FakeSi7021::default());
        sensor.transport.present = false;
        assert_eq!(sensor.check_availability(), Err(Error::NotFound));
        assert_eq!(sensor.state(), DriverState::DriverInstalled);
        assert_eq!(sensor.read_temperature(), Err(Error::InvalidState));
        assert_eq!(sensor.transport.log.len(), 2);

        sensor.transport.present = true;
        assert_eq!(sensor.check_availability(), Ok(()));
        assert_eq!(sensor.state(), DriverState::Ready);
        assert!(sensor.read_temperature().is_ok());
    }

    #[test]
    fn previous_temperature_without_checksum() {
        let fake = FakeSi7021 { previous_temperature: 0x6838, pending: Vec::new(), ..Default::default() };
        let mut sensor = ready(fake);
        let centigrade = sensor.read_previous_temperature().unwrap();
        assert!((centigrade - 24.68).abs() < 0.01, "centigrade={centigrade}");
        let (fake, delay) = sensor.release();
        assert_eq!(fake.log[1..], [write(&[0xE0]), read(2)]);
        assert_eq!(delay.total_ns, 0);
    }

    #[cfg(feature = "async")]
    #[test]
    fn async_front_end_shares_protocol() {
        let mut sensor = ready(FakeSi7021::default());
        let centigrade = futures::executor::block_on(sensor.read_temperature_async()).unwrap();
        assert!((centigrade - 24.68).abs() < 0.01);
        let humidity = futures::executor::block_on(sensor.read_humidity_async()).unwrap();
        assert!((humidity - 54.79).abs() < 0.01);
        let (fake, delay) = sensor.release();
        assert_eq!(fake.log[1..], [write(&[0xF3]), read(3), write(&[0xF5]), read(3)]);
        assert_eq!(delay.total_ms(), 2 * DEFAULT_SETTLE_DELAY_MS as u64);
    }
}
