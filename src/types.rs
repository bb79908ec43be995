use crate::bus::BusConfig;
use crate::crc8::is_crc_valid;
use crate::hw_def::*;

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// Si7021 device driver
#[derive(Debug)]
pub struct Si7021<T, Delay> {
    pub(crate) transport: T,
    pub(crate) delay: Delay,
    pub(crate) config: SensorConfig,
    pub(crate) state: DriverState,
    pub(crate) checksum_failures: u32,
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Bus parameters were rejected by the transport
    ConfigError,
    /// The transport could not install the bus driver
    InstallError,
    /// The sensor did not acknowledge its address
    NotFound,
    /// Invalid argument or malformed transaction
    InvalidArgument,
    /// Generic bus failure
    BusFailure,
    /// Operation not allowed in the current driver or peripheral state
    InvalidState,
    /// Timed out communicating with the sensor
    Timeout,
    /// A measurement failed its checksum (strict mode only)
    ChecksumMismatch,
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::ConfigError => "bus configuration rejected",
            Error::InstallError => "bus driver install failed",
            Error::NotFound => "sensor not found",
            Error::InvalidArgument => "invalid argument",
            Error::BusFailure => "bus failure",
            Error::InvalidState => "invalid state",
            Error::Timeout => "timed out",
            Error::ChecksumMismatch => "checksum mismatch",
        };
        f.write_str(msg)
    }
}
impl core::error::Error for Error {}

/// What to do when a measurement fails its checksum
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CrcPolicy {
    /// log the mismatch, count it and return the value anyway
    #[default]
    Warn,
    /// fail the read with [`Error::ChecksumMismatch`]
    Strict,
}

/// Driver configuration, supplied to [`Si7021::init`]
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorConfig {
    /// physical bus parameters
    pub bus: BusConfig,
    /// logical bus port
    pub port: u8,
    /// deadline for each bus transaction
    pub timeout_ms: u32,
    /// wait between issuing a measurement and fetching its result
    pub settle_delay_ms: u32,
    /// checksum handling for measurements
    pub crc_policy: CrcPolicy,
}
impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            port: 0,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            crc_policy: CrcPolicy::Warn,
        }
    }
}
impl SensorConfig {
    /// Replace the bus parameters
    pub fn with_bus(self, bus: BusConfig) -> Self {
        Self { bus, ..self }
    }
    /// Replace the logical port
    pub fn with_port(self, port: u8) -> Self {
        Self { port, ..self }
    }
    /// Replace the per-transaction deadline
    pub fn with_timeout_ms(self, timeout_ms: u32) -> Self {
        Self { timeout_ms, ..self }
    }
    /// Replace the measurement settle delay
    pub fn with_settle_delay_ms(self, settle_delay_ms: u32) -> Self {
        Self { settle_delay_ms, ..self }
    }
    /// Replace the checksum policy
    pub fn with_crc_policy(self, crc_policy: CrcPolicy) -> Self {
        Self { crc_policy, ..self }
    }
}

/// Initialization progress of the driver
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriverState {
    /// nothing done yet, or bus configuration failed
    Unconfigured,
    /// bus parameters accepted
    ParamsConfigured,
    /// bus driver installed, sensor not yet seen
    DriverInstalled,
    /// sensor acknowledged, all operations allowed
    Ready,
}

/// The quantity a no-hold measurement converts
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MeasurementKind {
    /// temperature
    Temperature,
    /// relative humidity
    RelHumid,
}
impl MeasurementKind {
    pub(crate) fn command(self) -> Command {
        match self {
            MeasurementKind::Temperature => Command::MeasureTempNoHold,
            MeasurementKind::RelHumid => Command::MeasureRelHumidNoHold,
        }
    }
}

/// A measurement word and its check byte exactly as received
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawReading {
    /// 16-bit word, status bits included
    pub value: u16,
    /// check byte sent after the word
    pub checksum: u8,
}
impl RawReading {
    /// Whether the check byte matches the word
    pub fn is_valid(&self) -> bool {
        is_crc_valid(self.value, self.checksum)
    }
    /// The word with its two status bits cleared
    pub fn masked(&self) -> u16 {
        self.value & MEASUREMENT_DATA_MASK
    }
}

/// Raw (still in u16 format, status bits cleared) measurement from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Datum {
    /// temperature word
    Temperature(u16),
    /// relative humidity word
    RelHumid(u16),
}
impl Datum {
    /// The measurement word
    pub fn raw(&self) -> u16 {
        match self {
            Self::Temperature(raw) | Self::RelHumid(raw) => *raw,
        }
    }
    /// Get temperature in Fahrenheit
    pub fn fahrenheit(&self) -> Option<f32> {
        match self {
            Self::Temperature(raw) => Some(raw_temp_to_fahrenheit(*raw)),
            Self::RelHumid(_) => None,
        }
    }
    /// Get temperature in Centigrade
    pub fn centigrade(&self) -> Option<f32> {
        match self {
            Self::Temperature(raw) => Some(raw_temp_to_centigrade(*raw)),
            Self::RelHumid(_) => None,
        }
    }
    /// Get relative humidity in percent
    pub fn humidity_percent(&self) -> Option<f32> {
        match self {
            Self::Temperature(_) => None,
            Self::RelHumid(raw) => Some(raw_rel_humid_to_percent(*raw)),
        }
    }
}

/// Temp and relative humidity from the device after conversion
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempAndRelHumid {
    /// degrees centigrade
    pub centigrade: f32,
    /// degrees fahrenheit
    pub fahrenheit: f32,
    /// relative humidity in percent
    pub humidity_percent: f32,
}

/// Firmware revision of the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FirmwareRevision {
    /// revision 1.0
    V1_0,
    /// revision 2.0
    V2_0,
    /// Other
    Other(u8),
}
impl From<u8> for FirmwareRevision {
    fn from(raw: u8) -> Self {
        match raw {
            FIRMWARE_REV_1_0 => FirmwareRevision::V1_0,
            FIRMWARE_REV_2_0 => FirmwareRevision::V2_0,
            _ => FirmwareRevision::Other(raw),
        }
    }
}
impl From<FirmwareRevision> for u8 {
    fn from(rev: FirmwareRevision) -> u8 {
        match rev {
            FirmwareRevision::V1_0 => FIRMWARE_REV_1_0,
            FirmwareRevision::V2_0 => FIRMWARE_REV_2_0,
            FirmwareRevision::Other(raw) => raw,
        }
    }
}
impl fmt::Display for FirmwareRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareRevision::V1_0 => write!(f, "1.0 (0x{FIRMWARE_REV_1_0:02X})"),
            FirmwareRevision::V2_0 => write!(f, "2.0 (0x{FIRMWARE_REV_2_0:02X})"),
            FirmwareRevision::Other(raw) => write!(f, "Unknown (0x{raw:02X})"),
        }
    }
}

/// Part identified by the electronic ID
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceKind {
    /// Si7013
    Si7013,
    /// Si7020
    Si7020,
    /// Si7021
    Si7021,
    /// engineering sample
    EngineeringSample,
    /// Other
    Other(u8),
}

/// 64-bit factory identifier: SNA in the upper half, SNB in the lower half
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ElectronicId(pub u64);
impl ElectronicId {
    /// Assemble from the two serial number halves
    pub fn from_halves(sna: u32, snb: u32) -> Self {
        Self((sna as u64) << 32 | snb as u64)
    }
    /// Serial number, first half
    pub fn sna(&self) -> u32 {
        (self.0 >> 32) as u32
    }
    /// Serial number, second half
    pub fn snb(&self) -> u32 {
        self.0 as u32
    }
    /// Part identification from SNB_3
    pub fn device(&self) -> DeviceKind {
        match (self.snb() >> 24) as u8 {
            DEVICE_ID_SI7013 => DeviceKind::Si7013,
            DEVICE_ID_SI7020 => DeviceKind::Si7020,
            DEVICE_ID_SI7021 => DeviceKind::Si7021,
            DEVICE_ID_ENGINEERING_SAMPLE_0 | DEVICE_ID_ENGINEERING_SAMPLE_1 => DeviceKind::EngineeringSample,
            other => DeviceKind::Other(other),
        }
    }
}
impl fmt::Display for ElectronicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}
