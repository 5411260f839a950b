#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
//! embedded-hal driver for the ENS160 air quality sensor and the AHT21
//! temperature and humidity sensor, as found together on combined breakout
//! boards.
//!
//! Both drivers are blocking and own an [`embedded_hal::i2c::I2c`] bus handle
//! and an [`embedded_hal::delay::DelayNs`] provider. To put both on one
//! physical bus, hand each a device from a bus-sharing adapter such as
//! `embedded-hal-bus`. Neither driver does any locking of its own.
//!
//! The ENS160 measures more accurately when told the ambient temperature and
//! humidity, so read the AHT21 first and pass its result on before each
//! update:
//!
//! ```rust,no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use ens160_aht21::{Aht21, Ens160, Error};
//!
//! fn poll<I2C: I2c, D: DelayNs>(
//!     aht21: &mut Aht21<I2C, D>,
//!     ens160: &mut Ens160<I2C, D>,
//! ) -> Result<Option<(u8, u16, u16)>, Error<I2C::Error>> {
//!     let measurement = aht21.read_measurement()?;
//!     ens160.set_compensation_from(&measurement)?;
//!     if ens160.update()? {
//!         return Ok(Some((ens160.aqi(), ens160.tvoc(), ens160.eco2())));
//!     }
//!     Ok(None)
//! }
//! ```
//!
//! ## Features
//!
//! - `defmt`: log through `defmt` and derive `defmt::Format` on all types.
//! - `log`: log through the `log` crate.
//! - `thiserror`: implement `core::error::Error` for [`Error`].

mod fmt;

pub mod aht21;
pub mod crc;
pub mod ens160;
mod error;
mod types;

#[cfg(test)]
mod testing;

pub use aht21::{Aht21, DEFAULT_ADDRESS as AHT21_ADDRESS};
pub use ens160::{Ens160, DEFAULT_ADDRESS as ENS160_ADDRESS};
pub use error::{Error, ErrorKind};
pub use types::{
    AqiRating, CompensationPair, FirmwareVersion, GasReading, Measurement, OperatingMode,
    RawFrame, StatusByte, ValidityFlag,
};
