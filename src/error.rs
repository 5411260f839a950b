/// Errors returned by the AHT21 and ENS160 drivers.
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error<E> {
    /// I2C bus error, after any transparent retry.
    #[cfg_attr(feature = "thiserror", error("I2C bus error"))]
    I2c(E),
    /// The AHT21 did not report both calibration bits after three
    /// initialization attempts.
    #[cfg_attr(feature = "thiserror", error("sensor failed to calibrate"))]
    NotCalibrated,
    /// The device at the ENS160 address answered with a foreign part id.
    #[cfg_attr(feature = "thiserror", error("unexpected part id {0:#06x}"))]
    UnexpectedPartId(u16),
    /// The ENS160 could not be reached while reading its part id.
    #[cfg_attr(feature = "thiserror", error("no response from sensor"))]
    NoResponse(E),
    /// Checksum over a measurement frame did not match.
    #[cfg_attr(
        feature = "thiserror",
        error("CRC mismatch: computed {computed:#04x}, received {received:#04x}")
    )]
    Crc { computed: u8, received: u8 },
    /// The sensor stayed busy longer than the polling bound.
    #[cfg_attr(feature = "thiserror", error("sensor stayed busy"))]
    Timeout,
    /// Only raw resistance sensors 1 and 4 are exposed by the ENS160.
    #[cfg_attr(feature = "thiserror", error("invalid raw sensor index {0}"))]
    InvalidSensorIndex(u8),
}

/// Coarse classification of an [`Error`], independent of the bus error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Construction-time, fatal.
    CalibrationFailure,
    /// Construction-time, fatal: wrong or absent device.
    InitFailure,
    /// Frame failed its checksum.
    CorruptData,
    Timeout,
    TransportFailure,
    InvalidArgument,
}

impl<E> Error<E> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::I2c(_) => ErrorKind::TransportFailure,
            Error::NotCalibrated => ErrorKind::CalibrationFailure,
            Error::UnexpectedPartId(_) | Error::NoResponse(_) => ErrorKind::InitFailure,
            Error::Crc { .. } => ErrorKind::CorruptData,
            Error::Timeout => ErrorKind::Timeout,
            Error::InvalidSensorIndex(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Whether a fresh measurement attempt may succeed where this one failed.
    pub(crate) fn is_transient_measurement_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::CorruptData | ErrorKind::Timeout)
    }
}
