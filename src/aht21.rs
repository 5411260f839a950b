//! AHT21 temperature and humidity sensor.
//!
//! ```text
//!       power on ─► wait 100 ms ─► SoftReset (0xBA) ─► wait 20 ms
//!                                                         │
//!            ┌────────────────────────────────────────────┘
//!            ▼
//!   CheckStatus (0x71) ─► calibrated? ─ yes ─► ready
//!            ▲                 │
//!            │                 no (at most 3 times, then NotCalibrated)
//!            │                 ▼
//!        wait 10 ms ◄── Initialize (0xBE 0x08 0x00)
//!
//!   TriggerMeasurement (0xAC 0x33 0x00) ─► wait 80 ms
//!            │
//!            ▼
//!   CheckStatus every 5 ms while busy (Timeout after 150 ms)
//!            │
//!            ▼
//!   read 7 bytes ─► CRC over bytes 0..6 ─► decode
//! ```

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::error::Error;
use crate::types::{Measurement, RawFrame, StatusByte};

/// AHT21 I2C address.
pub const DEFAULT_ADDRESS: u8 = 0x38;

/// Measurement attempts made by [`Aht21::read_measurement`].
pub const DEFAULT_RETRIES: u8 = 3;

const CALIBRATION_ATTEMPTS: u8 = 3;

mod command {
    pub const STATUS: [u8; 1] = [0x71];
    pub const SOFT_RESET: [u8; 1] = [0xBA];
    pub const INITIALIZE: [u8; 3] = [0xBE, 0x08, 0x00];
    pub const TRIGGER_MEASUREMENT: [u8; 3] = [0xAC, 0x33, 0x00];
}

/// Timing in milliseconds.
mod timing {
    pub const POWER_UP: u32 = 100;
    pub const SOFT_RESET: u32 = 20;
    pub const INITIALIZE: u32 = 10;
    pub const MEASUREMENT: u32 = 80;
    pub const BUSY_POLL: u32 = 5;
    pub const BUSY_TIMEOUT: u32 = 150;
    pub const RETRY: u32 = 50;
}

/// A calibrated AHT21.
///
/// Only obtainable through [`Aht21::new`], which runs the power-up and
/// calibration sequence; a sensor that fails to calibrate yields no driver.
pub struct Aht21<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D, E> Aht21<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Powers up, resets and calibrates the sensor at [`DEFAULT_ADDRESS`].
    ///
    /// Blocks for at least 120 ms.
    pub fn new(i2c: I2C, delay: D) -> Result<Self, Error<E>> {
        Self::new_with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn new_with_address(i2c: I2C, delay: D, address: u8) -> Result<Self, Error<E>> {
        let mut sensor = Aht21 {
            i2c,
            delay,
            address,
        };

        sensor.delay.delay_ms(timing::POWER_UP);
        sensor.soft_reset()?;
        sensor.calibrate()?;

        debug!("aht21: ready at {:#x}", address);
        Ok(sensor)
    }

    fn calibrate(&mut self) -> Result<(), Error<E>> {
        for attempt in 0..CALIBRATION_ATTEMPTS {
            if self.status()?.is_calibrated() {
                return Ok(());
            }
            trace!("aht21: not calibrated, initialize attempt {}", attempt + 1);
            self.write(&command::INITIALIZE)?;
            self.delay.delay_ms(timing::INITIALIZE);
        }

        error!("aht21: calibration failed");
        Err(Error::NotCalibrated)
    }

    /// Reads the status byte.
    pub fn status(&mut self) -> Result<StatusByte, Error<E>> {
        let mut buffer = [0u8; 1];
        self.write(&command::STATUS)?;
        self.i2c
            .read(self.address, &mut buffer)
            .map_err(Error::I2c)?;
        Ok(StatusByte(buffer[0]))
    }

    /// Sends the soft reset command and waits for it to complete.
    pub fn soft_reset(&mut self) -> Result<(), Error<E>> {
        self.write(&command::SOFT_RESET)?;
        self.delay.delay_ms(timing::SOFT_RESET);
        Ok(())
    }

    /// Triggers a conversion and reads the result, making up to
    /// [`DEFAULT_RETRIES`] attempts.
    pub fn read_measurement(&mut self) -> Result<Measurement, Error<E>> {
        self.read_measurement_with_retries(DEFAULT_RETRIES)
    }

    /// Like [`read_measurement`](Self::read_measurement) with an explicit
    /// attempt budget.
    ///
    /// CRC mismatches and busy timeouts are retried after 50 ms; the last
    /// failure is returned once the budget is spent. Bus errors are returned
    /// immediately. A budget of zero still makes one attempt.
    pub fn read_measurement_with_retries(&mut self, retries: u8) -> Result<Measurement, Error<E>> {
        let attempts = retries.max(1);
        let mut attempt = 1;
        loop {
            match self.measure_once() {
                Ok(frame) => return Ok(frame.measurement()),
                Err(e) if e.is_transient_measurement_failure() && attempt < attempts => {
                    warn!("aht21: measurement attempt {} of {} failed", attempt, attempts);
                    attempt += 1;
                    self.delay.delay_ms(timing::RETRY);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One trigger, wait, poll, read and verify cycle.
    fn measure_once(&mut self) -> Result<RawFrame, Error<E>> {
        self.write(&command::TRIGGER_MEASUREMENT)?;
        self.delay.delay_ms(timing::MEASUREMENT);
        self.wait_until_idle()?;

        let mut frame = RawFrame([0u8; 7]);
        self.i2c
            .read(self.address, &mut frame.0)
            .map_err(Error::I2c)?;

        if !frame.checksum_ok() {
            warn!(
                "aht21: CRC mismatch, computed {:#x}, received {:#x}",
                frame.computed_crc(),
                frame.received_crc()
            );
            return Err(Error::Crc {
                computed: frame.computed_crc(),
                received: frame.received_crc(),
            });
        }
        Ok(frame)
    }

    /// Polls the busy flag. Elapsed time is the sum of the poll delays.
    fn wait_until_idle(&mut self) -> Result<(), Error<E>> {
        let mut waited = 0;
        while self.status()?.is_busy() {
            if waited > timing::BUSY_TIMEOUT {
                warn!("aht21: still busy after {} ms", waited);
                return Err(Error::Timeout);
            }
            self.delay.delay_ms(timing::BUSY_POLL);
            waited += timing::BUSY_POLL;
        }
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
        self.i2c.write(self.address, bytes).map_err(Error::I2c)
    }

    /// Releases the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}
