use crate::crc;

/// Sub-byte fields of the AHT21 status byte.
pub(crate) mod aht21_status {
    /// Bit 7, set while a conversion is running.
    pub const BUSY: u8 = 0x80;
    /// Bits 3 and 4, both must be set.
    pub const CALIBRATED: u8 = 0x18;
}

/// Sub-byte fields of the ENS160 data registers.
pub(crate) mod ens160_fields {
    /// DEVICE_STATUS bit 1.
    pub const NEW_DATA: u8 = 0x02;
    /// DEVICE_STATUS bits 2..=3.
    pub const VALIDITY_SHIFT: u8 = 2;
    pub const VALIDITY_MASK: u8 = 0x03;
    /// DATA_AQI bits 0..=2.
    pub const AQI_MASK: u8 = 0x07;
}

const RAW_FULL_SCALE: f32 = 1_048_576.0;

/// AHT21 temperature and relative humidity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Temperature [°C]
    pub temperature_celsius: f32,
    /// Relative Humidity [%RH]
    pub humidity_percent: f32,
}

impl Measurement {
    /// Converts the two 20-bit raw fields of a frame into physical units.
    pub fn from_raw(humidity_raw: u32, temperature_raw: u32) -> Self {
        Measurement {
            humidity_percent: humidity_raw as f32 / RAW_FULL_SCALE * 100.0,
            temperature_celsius: temperature_raw as f32 / RAW_FULL_SCALE * 200.0 - 50.0,
        }
    }
}

/// AHT21 status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusByte(pub u8);

impl StatusByte {
    pub fn is_busy(self) -> bool {
        self.0 & aht21_status::BUSY != 0
    }

    /// Both calibration bits set. A single bit is not enough.
    pub fn is_calibrated(self) -> bool {
        self.0 & aht21_status::CALIBRATED == aht21_status::CALIBRATED
    }
}

/// The 7 bytes read back after an AHT21 conversion: status, 5 data bytes
/// holding two packed 20-bit values, CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame(pub [u8; 7]);

impl RawFrame {
    pub fn status(&self) -> StatusByte {
        StatusByte(self.0[0])
    }

    /// Checksum computed over the first six bytes.
    pub fn computed_crc(&self) -> u8 {
        crc::frame_crc(&self.0)
    }

    /// Checksum as transmitted by the sensor.
    pub fn received_crc(&self) -> u8 {
        self.0[6]
    }

    pub fn checksum_ok(&self) -> bool {
        self.computed_crc() == self.received_crc()
    }

    /// Humidity: bytes 1, 2 and the high nibble of byte 3.
    pub fn humidity_raw(&self) -> u32 {
        (u32::from(self.0[1]) << 12) | (u32::from(self.0[2]) << 4) | (u32::from(self.0[3]) >> 4)
    }

    /// Temperature: the low nibble of byte 3, bytes 4 and 5.
    pub fn temperature_raw(&self) -> u32 {
        (u32::from(self.0[3] & 0x0F) << 16) | (u32::from(self.0[4]) << 8) | u32::from(self.0[5])
    }

    pub fn measurement(&self) -> Measurement {
        Measurement::from_raw(self.humidity_raw(), self.temperature_raw())
    }
}

/// ENS160 compensation register values, ready to be written little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompensationPair {
    /// (°C + 273.15) × 64
    pub temp_in: u16,
    /// %RH × 512
    pub rh_in: u16,
}

impl CompensationPair {
    pub const MIN_TEMPERATURE: f32 = -40.0;
    pub const MAX_TEMPERATURE: f32 = 85.0;
    pub const MIN_HUMIDITY: f32 = 0.0;
    pub const MAX_HUMIDITY: f32 = 100.0;

    /// Clips the inputs to the sensor's accepted range, then encodes them.
    /// Fractions are truncated.
    pub fn new(temperature_celsius: f32, humidity_percent: f32) -> Self {
        let temperature = temperature_celsius.clamp(Self::MIN_TEMPERATURE, Self::MAX_TEMPERATURE);
        let humidity = humidity_percent.clamp(Self::MIN_HUMIDITY, Self::MAX_HUMIDITY);
        CompensationPair {
            temp_in: ((temperature + 273.15) * 64.0) as u16,
            rh_in: (humidity * 512.0) as u16,
        }
    }

    pub fn temp_in_bytes(&self) -> [u8; 2] {
        self.temp_in.to_le_bytes()
    }

    pub fn rh_in_bytes(&self) -> [u8; 2] {
        self.rh_in.to_le_bytes()
    }
}

impl From<&Measurement> for CompensationPair {
    fn from(measurement: &Measurement) -> Self {
        CompensationPair::new(measurement.temperature_celsius, measurement.humidity_percent)
    }
}

/// ENS160 validity flag, DEVICE_STATUS bits 2..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ValidityFlag {
    /// Fresh, trustworthy data.
    Normal = 0,
    /// First minutes after power-on.
    WarmUp = 1,
    /// First hour of operation of a new device.
    InitialStartup = 2,
    /// The device needs a reset.
    Error = 3,
}

impl ValidityFlag {
    pub fn from_status(status: u8) -> Self {
        match (status >> ens160_fields::VALIDITY_SHIFT) & ens160_fields::VALIDITY_MASK {
            0 => ValidityFlag::Normal,
            1 => ValidityFlag::WarmUp,
            2 => ValidityFlag::InitialStartup,
            _ => ValidityFlag::Error,
        }
    }
}

/// UBA air quality rating, indexed by the ENS160 AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AqiRating {
    Excellent,
    Good,
    Moderate,
    Poor,
    Unhealthy,
}

impl AqiRating {
    pub fn from_aqi(aqi: u8) -> Option<Self> {
        match aqi {
            1 => Some(AqiRating::Excellent),
            2 => Some(AqiRating::Good),
            3 => Some(AqiRating::Moderate),
            4 => Some(AqiRating::Poor),
            5 => Some(AqiRating::Unhealthy),
            _ => None,
        }
    }
}

/// ENS160 sensor data, as decoded from one burst read of DEVICE_STATUS
/// through DATA_ECO2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GasReading {
    pub validity: ValidityFlag,
    /// Air Quality Index, UBA scale [1..5]
    pub aqi: u8,
    /// Total Volatile Organic Compounds [ppb]
    pub tvoc_ppb: u16,
    /// Equivalent CO2 [ppm]
    pub eco2_ppm: u16,
}

impl GasReading {
    /// Value held before the first successful update and after a reset.
    pub const WARM_UP: GasReading = GasReading {
        validity: ValidityFlag::WarmUp,
        aqi: 0,
        tvoc_ppb: 0,
        eco2_ppm: 400,
    };

    pub fn from_burst(data: &[u8; 6]) -> Self {
        GasReading {
            validity: ValidityFlag::from_status(data[0]),
            aqi: data[1] & ens160_fields::AQI_MASK,
            tvoc_ppb: u16::from_le_bytes([data[2], data[3]]),
            eco2_ppm: u16::from_le_bytes([data[4], data[5]]),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validity == ValidityFlag::Normal
    }

    pub fn rating(&self) -> Option<AqiRating> {
        AqiRating::from_aqi(self.aqi)
    }
}

impl Default for GasReading {
    fn default() -> Self {
        GasReading::WARM_UP
    }
}

/// ENS160 OPMODE register values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingMode {
    DeepSleep = 0x00,
    Idle = 0x01,
    Standard = 0x02,
    Reset = 0xF0,
}

impl OperatingMode {
    /// Time the device needs after entering this mode.
    pub(crate) fn settle_ms(self) -> u32 {
        match self {
            OperatingMode::Reset => 20,
            OperatingMode::DeepSleep | OperatingMode::Idle | OperatingMode::Standard => 10,
        }
    }
}

/// ENS160 application firmware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub release: u8,
}
