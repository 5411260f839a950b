//! ENS160 digital metal-oxide multi-gas sensor.
//!
//! The driver keeps the last decoded [`GasReading`] and only refreshes it in
//! [`Ens160::update`]. Accessors such as [`Ens160::aqi`] return that cached
//! value, which is stale until the next successful update.
//!
//! For compensated results, feed a fresh temperature and humidity reading
//! into [`Ens160::set_compensation`] before every update. The driver never
//! re-applies an earlier compensation on its own.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::error::Error;
use crate::types::{
    ens160_fields, CompensationPair, FirmwareVersion, GasReading, Measurement, OperatingMode,
    ValidityFlag,
};

/// ENS160 I2C address with ADDR pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x53;

/// PART_ID register contents of an ENS160.
pub const PART_ID: u16 = 0x0160;

/// Compensation applied at start-up and after every reset.
pub const DEFAULT_TEMPERATURE: f32 = 25.0;
pub const DEFAULT_HUMIDITY: f32 = 50.0;

/// Register map.
mod register {
    pub const PART_ID: u8 = 0x00;
    pub const OPMODE: u8 = 0x10;
    pub const COMMAND: u8 = 0x12;
    pub const TEMP_IN: u8 = 0x13;
    pub const RH_IN: u8 = 0x15;
    /// DEVICE_STATUS, first of the six data registers read in one burst.
    pub const DEVICE_STATUS: u8 = 0x20;
    pub const GPR_READ: u8 = 0x48;
}

mod command {
    pub const GET_APPVER: u8 = 0x0E;
}

/// Timing in milliseconds. Mode settle times live on [`OperatingMode`].
mod timing {
    pub const COMMAND: u32 = 10;
    pub const BUS_RETRY: u32 = 10;
    pub const ERROR_RECOVERY: u32 = 200;
}

const DATA_LEN: usize = 6;
const GPR_LEN: usize = 8;
const MAX_WRITE_LEN: usize = 2;

/// Resets performed by one [`Ens160::update`] call when the device reports
/// [`ValidityFlag::Error`].
const ERROR_RECOVERIES: u8 = 1;

/// An identified and running ENS160.
///
/// Not safe for concurrent use: every operation is an ordered sequence of
/// bus transfers, so callers sharing the bus must serialize access.
pub struct Ens160<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    mode: OperatingMode,
    reading: GasReading,
}

impl<I2C, D, E> Ens160<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Identifies the sensor at [`DEFAULT_ADDRESS`] and brings it into
    /// standard operation with default compensation.
    pub fn new(i2c: I2C, delay: D) -> Result<Self, Error<E>> {
        Self::new_with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn new_with_address(i2c: I2C, delay: D, address: u8) -> Result<Self, Error<E>> {
        let mut sensor = Ens160 {
            i2c,
            delay,
            address,
            mode: OperatingMode::Standard,
            reading: GasReading::WARM_UP,
        };

        let mut part_id = [0u8; 2];
        sensor
            .read_registers(register::PART_ID, &mut part_id)
            .map_err(|e| match e {
                Error::I2c(e) => Error::NoResponse(e),
                other => other,
            })?;
        let part_id = u16::from_le_bytes(part_id);
        if part_id != PART_ID {
            error!("ens160: unexpected part id {:#x}", part_id);
            return Err(Error::UnexpectedPartId(part_id));
        }

        sensor.reset()?;
        debug!("ens160: ready at {:#x}", address);
        Ok(sensor)
    }

    /// Writes the temperature and humidity the sensor should compensate for.
    ///
    /// Inputs are clipped to -40..=85 °C and 0..=100 %RH.
    pub fn set_compensation(
        &mut self,
        temperature_celsius: f32,
        humidity_percent: f32,
    ) -> Result<(), Error<E>> {
        self.write_compensation(CompensationPair::new(temperature_celsius, humidity_percent))
    }

    /// [`set_compensation`](Self::set_compensation) from an AHT21 reading.
    pub fn set_compensation_from(&mut self, measurement: &Measurement) -> Result<(), Error<E>> {
        self.write_compensation(CompensationPair::from(measurement))
    }

    fn write_compensation(&mut self, pair: CompensationPair) -> Result<(), Error<E>> {
        trace!("ens160: compensation temp_in={} rh_in={}", pair.temp_in, pair.rh_in);
        self.write_register(register::TEMP_IN, &pair.temp_in_bytes())?;
        self.write_register(register::RH_IN, &pair.rh_in_bytes())
    }

    /// Fetches new data if the device has any.
    ///
    /// Returns `Ok(false)` without touching the cached reading when no new
    /// data is flagged. Otherwise the status, AQI, TVOC and eCO2 registers
    /// are read in a single burst and cached. A reading flagged
    /// [`ValidityFlag::Error`] triggers one [`reset`](Self::reset) and one
    /// more attempt; if that still reports an error, `Ok(false)` is returned.
    ///
    /// Returns `Ok(true)` only for a [`ValidityFlag::Normal`] reading.
    pub fn update(&mut self) -> Result<bool, Error<E>> {
        let mut recoveries = 0;
        loop {
            let status = self.read_register(register::DEVICE_STATUS)?;
            if status & ens160_fields::NEW_DATA == 0 {
                return Ok(false);
            }

            let mut data = [0u8; DATA_LEN];
            self.read_registers(register::DEVICE_STATUS, &mut data)?;
            self.reading = GasReading::from_burst(&data);

            if self.reading.validity != ValidityFlag::Error {
                return Ok(self.reading.is_valid());
            }
            if recoveries == ERROR_RECOVERIES {
                error!("ens160: error state persists after reset");
                return Ok(false);
            }

            warn!("ens160: device reports error state, resetting");
            recoveries += 1;
            self.reset()?;
            self.delay.delay_ms(timing::ERROR_RECOVERY);
        }
    }

    /// Last reading stored by [`update`](Self::update).
    pub fn reading(&self) -> GasReading {
        self.reading
    }

    /// Cached Air Quality Index (UBA, 1..=5), 0 before the first reading.
    pub fn aqi(&self) -> u8 {
        self.reading.aqi
    }

    /// Cached TVOC [ppb].
    pub fn tvoc(&self) -> u16 {
        self.reading.tvoc_ppb
    }

    /// Cached eCO2 [ppm].
    pub fn eco2(&self) -> u16 {
        self.reading.eco2_ppm
    }

    pub fn validity(&self) -> ValidityFlag {
        self.reading.validity
    }

    pub fn is_warming_up(&self) -> bool {
        self.reading.validity == ValidityFlag::WarmUp
    }

    /// Mode last written to OPMODE.
    pub fn operating_mode(&self) -> OperatingMode {
        self.mode
    }

    /// Resets the device, restores the default compensation and returns to
    /// standard mode. The cached reading goes back to its warm-up default.
    ///
    /// Once the reset has been issued, standard mode is written back even
    /// if restoring the compensation fails.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.set_mode(OperatingMode::Reset)?;
        self.in_idle_mode(|sensor| {
            sensor.set_compensation(DEFAULT_TEMPERATURE, DEFAULT_HUMIDITY)
        })?;
        self.reading = GasReading::WARM_UP;
        Ok(())
    }

    /// Reads the application firmware version.
    ///
    /// The sensor is switched to idle for the command and back to standard
    /// mode afterwards, also when the command fails.
    pub fn get_firmware_version(&mut self) -> Result<FirmwareVersion, Error<E>> {
        self.in_idle_mode(|sensor| {
            sensor.write_register(register::COMMAND, &[command::GET_APPVER])?;
            sensor.delay.delay_ms(timing::COMMAND);
            let gpr = sensor.read_gpr()?;
            Ok(FirmwareVersion {
                major: gpr[4],
                minor: gpr[5],
                release: gpr[6],
            })
        })
    }

    /// Raw resistance of hotplate 1 or 4. The resistance in Ω is
    /// `2^(raw / 2048)`.
    pub fn get_raw_resistance(&mut self, sensor_index: u8) -> Result<u16, Error<E>> {
        let offset = match sensor_index {
            1 => 0,
            4 => 6,
            _ => return Err(Error::InvalidSensorIndex(sensor_index)),
        };
        let gpr = self.read_gpr()?;
        Ok(u16::from_le_bytes([gpr[offset], gpr[offset + 1]]))
    }

    /// Puts the device into its lowest power mode. Use [`wake`](Self::wake)
    /// to resume sensing.
    pub fn deep_sleep(&mut self) -> Result<(), Error<E>> {
        self.set_mode(OperatingMode::DeepSleep)
    }

    pub fn wake(&mut self) -> Result<(), Error<E>> {
        self.set_mode(OperatingMode::Idle)?;
        self.set_mode(OperatingMode::Standard)
    }

    /// Releases the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Runs `op` in idle mode. Standard mode is written back on every exit
    /// path; an error from `op` takes precedence over one from the restore.
    fn in_idle_mode<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, Error<E>>,
    ) -> Result<T, Error<E>> {
        let result = self.set_mode(OperatingMode::Idle).and_then(|()| op(self));
        let restored = self.set_mode(OperatingMode::Standard);
        match (result, restored) {
            (Err(e), restored) => {
                if restored.is_err() {
                    error!("ens160: could not restore standard mode");
                }
                Err(e)
            }
            (Ok(_), Err(e)) => Err(e),
            (Ok(value), Ok(())) => Ok(value),
        }
    }

    fn set_mode(&mut self, mode: OperatingMode) -> Result<(), Error<E>> {
        trace!("ens160: opmode {:#x}", mode as u8);
        self.write_register(register::OPMODE, &[mode as u8])?;
        self.mode = mode;
        self.delay.delay_ms(mode.settle_ms());
        Ok(())
    }

    fn read_gpr(&mut self) -> Result<[u8; GPR_LEN], Error<E>> {
        let mut gpr = [0u8; GPR_LEN];
        self.read_registers(register::GPR_READ, &mut gpr)?;
        Ok(gpr)
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut buffer = [0u8; 1];
        self.read_registers(reg, &mut buffer)?;
        Ok(buffer[0])
    }

    fn read_registers(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), Error<E>> {
        let address = self.address;
        self.retry_once(|i2c| i2c.write_read(address, &[reg], &mut buffer[..]))
    }

    fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<(), Error<E>> {
        debug_assert!(data.len() <= MAX_WRITE_LEN);
        let mut frame = [0u8; 1 + MAX_WRITE_LEN];
        frame[0] = reg;
        frame[1..=data.len()].copy_from_slice(data);
        let frame = &frame[..=data.len()];

        let address = self.address;
        self.retry_once(|i2c| i2c.write(address, frame))
    }

    /// Runs a single bus transfer, repeating it once after a short pause if
    /// it fails.
    fn retry_once<T>(&mut self, mut op: impl FnMut(&mut I2C) -> Result<T, E>) -> Result<T, Error<E>> {
        match op(&mut self.i2c) {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!("ens160: bus error, retrying in {} ms", timing::BUS_RETRY);
                self.delay.delay_ms(timing::BUS_RETRY);
                op(&mut self.i2c).map_err(Error::I2c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Ens160, DEFAULT_ADDRESS};
    use crate::error::{Error, ErrorKind};
    use crate::testing::RecordingDelay;
    use crate::types::{
        AqiRating, FirmwareVersion, GasReading, Measurement, OperatingMode, ValidityFlag,
    };
    use embedded_hal::i2c::ErrorKind as BusErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    fn write(reg: u8, data: &[u8]) -> Transaction {
        let mut bytes = vec![reg];
        bytes.extend_from_slice(data);
        Transaction::write(DEFAULT_ADDRESS, bytes)
    }

    fn read(reg: u8, response: &[u8]) -> Transaction {
        Transaction::write_read(DEFAULT_ADDRESS, vec![reg], response.to_vec())
    }

    fn opmode(mode: u8) -> Transaction {
        write(0x10, &[mode])
    }

    fn reset_sequence() -> Vec<Transaction> {
        vec![
            opmode(0xF0),
            opmode(0x01),
            write(0x13, &[0x89, 0x4A]),
            write(0x15, &[0x00, 0x64]),
            opmode(0x02),
        ]
    }

    fn startup() -> Vec<Transaction> {
        let mut expectations = vec![read(0x00, &[0x60, 0x01])];
        expectations.extend(reset_sequence());
        expectations
    }

    /// Status poll followed by the burst read it announces.
    fn new_data(burst: [u8; 6]) -> Vec<Transaction> {
        vec![read(0x20, &[burst[0]]), read(0x20, &burst)]
    }

    const NORMAL: [u8; 6] = [0x02, 0x02, 0x64, 0x00, 0x58, 0x02];
    const ERROR: [u8; 6] = [0x0E, 0x01, 0x00, 0x00, 0x90, 0x01];

    fn with_expectations(
        expectations: &[Transaction],
    ) -> (Ens160<I2cMock, RecordingDelay>, I2cMock, RecordingDelay) {
        let i2c = I2cMock::new(expectations);
        let delay = RecordingDelay::default();
        let sensor = Ens160::new(i2c.clone(), delay.clone()).unwrap();
        delay.reset();
        (sensor, i2c, delay)
    }

    #[test]
    fn new_identifies_and_starts_sensor() {
        let mut i2c = I2cMock::new(&startup());
        let delay = RecordingDelay::default();

        let sensor = Ens160::new(i2c.clone(), delay.clone()).unwrap();

        // Reset settle first, then idle and standard.
        assert_eq!(delay.calls_ms(), [20, 10, 10]);
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);
        assert_eq!(sensor.reading(), GasReading::WARM_UP);
        assert_eq!(sensor.eco2(), 400);
        assert!(sensor.is_warming_up());

        i2c.done();
    }

    #[test]
    fn new_rejects_foreign_part_id() {
        let mut i2c = I2cMock::new(&[read(0x00, &[0x61, 0x01])]);

        let result = Ens160::new(i2c.clone(), RecordingDelay::default());

        assert!(matches!(result, Err(Error::UnexpectedPartId(0x0161))));
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::InitFailure));

        i2c.done();
    }

    #[test]
    fn new_reports_absent_sensor() {
        let expectations = [
            read(0x00, &[0x00, 0x00]).with_error(BusErrorKind::Other),
            read(0x00, &[0x00, 0x00]).with_error(BusErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let result = Ens160::new(i2c.clone(), RecordingDelay::default());

        assert!(matches!(result, Err(Error::NoResponse(BusErrorKind::Other))));
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::InitFailure));

        i2c.done();
    }

    #[test]
    fn set_compensation_writes_both_registers() {
        let mut expectations = startup();
        expectations.push(write(0x13, &[0x89, 0x4A]));
        expectations.push(write(0x15, &[0x00, 0x64]));
        // Clipped to 85 °C and 100 %RH.
        expectations.push(write(0x13, &22921u16.to_le_bytes()));
        expectations.push(write(0x15, &51200u16.to_le_bytes()));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        sensor.set_compensation(25.0, 50.0).unwrap();
        sensor.set_compensation(90.0, 120.0).unwrap();

        i2c.done();
    }

    #[test]
    fn set_compensation_from_measurement() {
        let mut expectations = startup();
        expectations.push(write(0x13, &[0x89, 0x4A]));
        expectations.push(write(0x15, &[0x00, 0x64]));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        let measurement = Measurement {
            temperature_celsius: 25.0,
            humidity_percent: 50.0,
        };
        sensor.set_compensation_from(&measurement).unwrap();

        i2c.done();
    }

    #[test]
    fn update_without_new_data_keeps_cache() {
        let mut expectations = startup();
        expectations.push(read(0x20, &[0x00]));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        assert!(!sensor.update().unwrap());
        assert_eq!(sensor.reading(), GasReading::WARM_UP);

        i2c.done();
    }

    #[test]
    fn update_caches_normal_reading() {
        let mut expectations = startup();
        expectations.extend(new_data(NORMAL));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        assert!(sensor.update().unwrap());
        assert_eq!(sensor.validity(), ValidityFlag::Normal);
        assert_eq!(sensor.aqi(), 2);
        assert_eq!(sensor.tvoc(), 100);
        assert_eq!(sensor.eco2(), 600);
        assert_eq!(sensor.reading().rating(), Some(AqiRating::Good));

        i2c.done();
    }

    #[test]
    fn update_reports_warm_up_as_not_valid() {
        let mut expectations = startup();
        expectations.extend(new_data([0x06, 0x01, 0x00, 0x00, 0x90, 0x01]));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        assert!(!sensor.update().unwrap());
        assert!(sensor.is_warming_up());

        i2c.done();
    }

    #[test]
    fn update_recovers_from_error_state() {
        let mut expectations = startup();
        expectations.extend(new_data(ERROR));
        expectations.extend(reset_sequence());
        expectations.extend(new_data(NORMAL));
        let (mut sensor, mut i2c, delay) = with_expectations(&expectations);

        assert!(sensor.update().unwrap());
        assert_eq!(sensor.validity(), ValidityFlag::Normal);
        assert_eq!(sensor.tvoc(), 100);
        assert_eq!(delay.calls_ms(), [20, 10, 10, 200]);

        i2c.done();
    }

    #[test]
    fn update_gives_up_after_one_recovery() {
        let mut expectations = startup();
        expectations.extend(new_data(ERROR));
        expectations.extend(reset_sequence());
        expectations.extend(new_data(ERROR));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        assert!(!sensor.update().unwrap());
        assert_eq!(sensor.validity(), ValidityFlag::Error);

        i2c.done();
    }

    #[test]
    fn update_after_recovery_without_new_data() {
        let mut expectations = startup();
        expectations.extend(new_data(ERROR));
        expectations.extend(reset_sequence());
        expectations.push(read(0x20, &[0x00]));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        assert!(!sensor.update().unwrap());
        assert_eq!(sensor.reading(), GasReading::WARM_UP);

        i2c.done();
    }

    #[test]
    fn register_read_retries_once() {
        let mut expectations = startup();
        expectations.push(read(0x20, &[0x00]).with_error(BusErrorKind::Other));
        expectations.push(read(0x20, &[0x00]));
        let (mut sensor, mut i2c, delay) = with_expectations(&expectations);

        assert!(!sensor.update().unwrap());
        assert_eq!(delay.total_ms(), 10);

        i2c.done();
    }

    #[test]
    fn register_read_fails_after_retry() {
        let mut expectations = startup();
        expectations.push(read(0x20, &[0x00]).with_error(BusErrorKind::Other));
        expectations.push(read(0x20, &[0x00]).with_error(BusErrorKind::Other));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        let result = sensor.update();
        assert_eq!(result, Err(Error::I2c(BusErrorKind::Other)));
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::TransportFailure)
        );

        i2c.done();
    }

    #[test]
    fn firmware_version() {
        let mut expectations = startup();
        expectations.push(opmode(0x01));
        expectations.push(write(0x12, &[0x0E]));
        expectations.push(read(0x48, &[0, 0, 0, 0, 5, 4, 6, 0]));
        expectations.push(opmode(0x02));
        let (mut sensor, mut i2c, delay) = with_expectations(&expectations);

        let version = sensor.get_firmware_version().unwrap();

        assert_eq!(
            version,
            FirmwareVersion {
                major: 5,
                minor: 4,
                release: 6
            }
        );
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);
        assert_eq!(delay.total_ms(), 10 + 10 + 10);

        i2c.done();
    }

    #[test]
    fn firmware_version_restores_standard_mode_on_error() {
        let mut expectations = startup();
        expectations.push(opmode(0x01));
        expectations.push(write(0x12, &[0x0E]).with_error(BusErrorKind::Other));
        expectations.push(write(0x12, &[0x0E]).with_error(BusErrorKind::Other));
        expectations.push(opmode(0x02));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        let result = sensor.get_firmware_version();

        assert_eq!(result, Err(Error::I2c(BusErrorKind::Other)));
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);

        i2c.done();
    }

    #[test]
    fn firmware_version_restores_standard_mode_when_idle_fails() {
        let mut expectations = startup();
        expectations.push(opmode(0x01).with_error(BusErrorKind::Other));
        expectations.push(opmode(0x01).with_error(BusErrorKind::Other));
        expectations.push(opmode(0x02));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        assert!(sensor.get_firmware_version().is_err());
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);

        i2c.done();
    }

    #[test]
    fn raw_resistance() {
        let gpr = [0x00, 0x80, 0, 0, 0, 0, 0x34, 0x12];
        let mut expectations = startup();
        expectations.push(read(0x48, &gpr));
        expectations.push(read(0x48, &gpr));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        assert_eq!(sensor.get_raw_resistance(1).unwrap(), 0x8000);
        assert_eq!(sensor.get_raw_resistance(4).unwrap(), 0x1234);

        i2c.done();
    }

    #[test]
    fn raw_resistance_rejects_other_sensors() {
        let (mut sensor, mut i2c, _) = with_expectations(&startup());

        for index in [0, 2, 3, 5] {
            let result = sensor.get_raw_resistance(index);
            assert_eq!(result, Err(Error::InvalidSensorIndex(index)));
            assert_eq!(
                result.err().map(|e| e.kind()),
                Some(ErrorKind::InvalidArgument)
            );
        }

        i2c.done();
    }

    #[test]
    fn reset_clears_cached_reading() {
        let mut expectations = startup();
        expectations.extend(new_data(NORMAL));
        expectations.extend(reset_sequence());
        let (mut sensor, mut i2c, delay) = with_expectations(&expectations);

        sensor.update().unwrap();
        sensor.reset().unwrap();

        assert_eq!(sensor.reading(), GasReading::WARM_UP);
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);
        assert_eq!(delay.calls_ms(), [20, 10, 10]);

        i2c.done();
    }

    #[test]
    fn reset_restores_standard_mode_when_compensation_fails() {
        let mut expectations = startup();
        expectations.push(opmode(0xF0));
        expectations.push(opmode(0x01));
        expectations.push(write(0x13, &[0x89, 0x4A]).with_error(BusErrorKind::Other));
        expectations.push(write(0x13, &[0x89, 0x4A]).with_error(BusErrorKind::Other));
        expectations.push(opmode(0x02));
        let (mut sensor, mut i2c, delay) = with_expectations(&expectations);

        let result = sensor.reset();

        assert_eq!(result, Err(Error::I2c(BusErrorKind::Other)));
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);
        // Reset settle, idle settle, bus retry pause, standard settle.
        assert_eq!(delay.calls_ms(), [20, 10, 10, 10]);

        i2c.done();
    }

    #[test]
    fn update_recovery_restores_standard_mode_when_compensation_fails() {
        let mut expectations = startup();
        expectations.extend(new_data(ERROR));
        expectations.push(opmode(0xF0));
        expectations.push(opmode(0x01));
        expectations.push(write(0x13, &[0x89, 0x4A]));
        expectations.push(write(0x15, &[0x00, 0x64]).with_error(BusErrorKind::Other));
        expectations.push(write(0x15, &[0x00, 0x64]).with_error(BusErrorKind::Other));
        expectations.push(opmode(0x02));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        let result = sensor.update();

        assert_eq!(result, Err(Error::I2c(BusErrorKind::Other)));
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);
        assert_eq!(sensor.validity(), ValidityFlag::Error);

        i2c.done();
    }

    #[test]
    fn deep_sleep_and_wake() {
        let mut expectations = startup();
        expectations.push(opmode(0x00));
        expectations.push(opmode(0x01));
        expectations.push(opmode(0x02));
        let (mut sensor, mut i2c, _) = with_expectations(&expectations);

        sensor.deep_sleep().unwrap();
        assert_eq!(sensor.operating_mode(), OperatingMode::DeepSleep);
        sensor.wake().unwrap();
        assert_eq!(sensor.operating_mode(), OperatingMode::Standard);

        let (_, _) = sensor.release();
        i2c.done();
    }
}
