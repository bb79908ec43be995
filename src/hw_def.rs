//! Hardware definitions for the Si7021 taken from the Silicon Labs datasheet (Si7021-A20 rev 1.2).

/// 7-bit I²C address of the Si7021.  The device has no address-select pin.
pub const I2C_ADDR: u8 = 0x40;

/// Default deadline for a single bus transaction
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;
/// Default wait between issuing a no-hold measurement and fetching its result.  Covers the
/// worst-case RH + temperature conversion at 12/14-bit resolution.
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 50;
/// Power-up time after a software reset (datasheet table 2, max)
pub const RESET_DELAY_MS: u32 = 15;

/// Status bits occupying the two least-significant bits of every measurement word
pub const MEASUREMENT_STATUS_MASK: u16 = 0x0003;
/// Mask leaving only the measurement portion of a received word
pub const MEASUREMENT_DATA_MASK: u16 = !MEASUREMENT_STATUS_MASK;

/// CRC-8 generator x^8 + x^5 + x^4 + 1 aligned to the top of a 24-bit (word, checksum) row
pub const CRC_DIVISOR_24: u32 = 0x98_8000;
/// Number of data bits covered by the checksum
pub const CRC_DATA_BITS: u32 = 16;

/// User register 1: low resolution bit
pub const USER_REG_FIELD_LSBIT_RES0: u8 = 0;
/// User register 1: on-chip heater enable
pub const USER_REG_FIELD_LSBIT_HEATER_ENABLE: u8 = 2;
/// User register 1: VDD low flag (read only)
pub const USER_REG_FIELD_LSBIT_VDD_LOW: u8 = 6;
/// User register 1: high resolution bit
pub const USER_REG_FIELD_LSBIT_RES1: u8 = 7;
/// Both resolution bits, as they sit in the register
pub const USER_REG_RESOLUTION_MASK: u8 = (1 << USER_REG_FIELD_LSBIT_RES1) | (1 << USER_REG_FIELD_LSBIT_RES0);
/// Value of user register 1 after power-on or software reset
pub const USER_REG_RESET_VALUE: u8 = 0x3A;

/// Heater control register: heater current field position
pub const HEATER_REG_FIELD_LSBIT_CURRENT: u8 = 0;
/// Heater control register: heater current field width.  No other bits are defined.
pub const HEATER_REG_FIELD_WIDTH_CURRENT: u8 = 4;
/// Heater control register: heater current field mask
pub const HEATER_REG_CURRENT_MASK: u8 = ((1 << HEATER_REG_FIELD_WIDTH_CURRENT) - 1) << HEATER_REG_FIELD_LSBIT_CURRENT;

/// Firmware revision 1.0
pub const FIRMWARE_REV_1_0: u8 = 0xFF;
/// Firmware revision 2.0
pub const FIRMWARE_REV_2_0: u8 = 0x20;

/// SNB_3 device identification: Si7013
pub const DEVICE_ID_SI7013: u8 = 0x0D;
/// SNB_3 device identification: Si7020
pub const DEVICE_ID_SI7020: u8 = 0x14;
/// SNB_3 device identification: Si7021
pub const DEVICE_ID_SI7021: u8 = 0x15;
/// SNB_3 device identification: engineering sample
pub const DEVICE_ID_ENGINEERING_SAMPLE_0: u8 = 0x00;
/// SNB_3 device identification: engineering sample
pub const DEVICE_ID_ENGINEERING_SAMPLE_1: u8 = 0xFF;

/// Temperature operating range given in the datasheet
pub const TEMPERATURE_RANGE_CENTIGRADE: core::ops::RangeInclusive<f32> = -40.0..=125.0;
/// Physically meaningful relative humidity
pub const REL_HUMID_RANGE_PERCENT: core::ops::RangeInclusive<f32> = 0.0..=100.0;

/// I²C command set
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// Measure relative humidity, no hold master mode
    MeasureRelHumidNoHold,
    /// Measure temperature, no hold master mode
    MeasureTempNoHold,
    /// Read the temperature measured during the previous RH measurement
    ReadPreviousTemp,
    /// Software reset
    SoftReset,
    /// Write RH/T user register 1
    WriteUserReg,
    /// Read RH/T user register 1
    ReadUserReg,
    /// Write heater control register
    WriteHeaterReg,
    /// Read heater control register
    ReadHeaterReg,
    /// Read electronic ID, first half (SNA)
    ReadId1,
    /// Read electronic ID, second half (SNB)
    ReadId2,
    /// Read firmware revision
    ReadFirmwareRev,
}
impl Command {
    /// The bytes to put on the wire after the address byte
    pub const fn bytes(self) -> &'static [u8] {
        match self {
            Command::MeasureRelHumidNoHold => &[0xF5],
            Command::MeasureTempNoHold => &[0xF3],
            Command::ReadPreviousTemp => &[0xE0],
            Command::SoftReset => &[0xFE],
            Command::WriteUserReg => &[0xE6],
            Command::ReadUserReg => &[0xE7],
            Command::WriteHeaterReg => &[0x51],
            Command::ReadHeaterReg => &[0x11],
            Command::ReadId1 => &[0xFA, 0x0F],
            Command::ReadId2 => &[0xFC, 0xC9],
            Command::ReadFirmwareRev => &[0x84, 0xB8],
        }
    }
}

/// Convert a raw temperature word to degrees centigrade
pub fn raw_temp_to_centigrade(raw: u16) -> f32 {
    (raw as f64 * 175.72 / 65536.0 - 46.85) as f32
}

/// Convert a raw temperature word to degrees fahrenheit
pub fn raw_temp_to_fahrenheit(raw: u16) -> f32 {
    centigrade_to_fahrenheit(raw_temp_to_centigrade(raw))
}

/// Convert a raw relative humidity word to percent
pub fn raw_rel_humid_to_percent(raw: u16) -> f32 {
    (125.0 * raw as f64 / 65536.0 - 6.0) as f32
}

pub(crate) fn centigrade_to_fahrenheit(centigrade: f32) -> f32 {
    centigrade * 9.0 / 5.0 + 32.0
}

/// Whether a temperature lies inside the device's specified operating range
pub fn is_plausible_centigrade(centigrade: f32) -> bool {
    TEMPERATURE_RANGE_CENTIGRADE.contains(&centigrade)
}

/// Whether a relative humidity lies inside 0 %RH..=100 %RH
pub fn is_plausible_humidity(percent: f32) -> bool {
    REL_HUMID_RANGE_PERCENT.contains(&percent)
}
