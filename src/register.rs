//! Bit-field codecs for the user register and the heater control register.
//!
//! These are pure value types.  The driver reads the register, edits it through these types and
//! writes it back, so bits that are not being changed always keep their value.

use crate::hw_def::*;

use core::fmt;

/// Measurement resolution, encoded in bits 7 and 0 of the user register
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Resolution {
    /// 12 bit relative humidity, 14 bit temperature (reset default)
    Rh12Temp14 = 0x00,
    /// 8 bit relative humidity, 12 bit temperature
    Rh8Temp12 = 0x01,
    /// 10 bit relative humidity, 13 bit temperature
    Rh10Temp13 = 0x80,
    /// 11 bit relative humidity, 11 bit temperature
    Rh11Temp11 = 0x81,
}
impl Resolution {
    /// The resolution code as it sits in the user register
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Relative humidity resolution in bits
    pub const fn rel_humid_bits(self) -> u8 {
        match self {
            Resolution::Rh12Temp14 => 12,
            Resolution::Rh8Temp12 => 8,
            Resolution::Rh10Temp13 => 10,
            Resolution::Rh11Temp11 => 11,
        }
    }

    /// Temperature resolution in bits
    pub const fn temp_bits(self) -> u8 {
        match self {
            Resolution::Rh12Temp14 => 14,
            Resolution::Rh8Temp12 => 12,
            Resolution::Rh10Temp13 => 13,
            Resolution::Rh11Temp11 => 11,
        }
    }
}
impl TryFrom<u8> for Resolution {
    type Error = crate::Error;

    /// Only the four exact resolution codes are accepted
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x00 => Ok(Resolution::Rh12Temp14),
            0x01 => Ok(Resolution::Rh8Temp12),
            0x80 => Ok(Resolution::Rh10Temp13),
            0x81 => Ok(Resolution::Rh11Temp11),
            _ => Err(crate::Error::InvalidArgument),
        }
    }
}
impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RH {}-bit / T {}-bit", self.rel_humid_bits(), self.temp_bits())
    }
}

/// Supply voltage health as reported in bit 6 of the user register
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VddStatus {
    /// VDD above 1.9 V
    Ok,
    /// VDD between 1.8 V and 1.9 V
    Low,
}

/// RH/T user register 1
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UserRegister(u8);
impl UserRegister {
    /// Wrap a raw register value
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw register value
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Current resolution
    pub fn resolution(self) -> Resolution {
        match self.0 & USER_REG_RESOLUTION_MASK {
            0x00 => Resolution::Rh12Temp14,
            0x01 => Resolution::Rh8Temp12,
            0x80 => Resolution::Rh10Temp13,
            _ => Resolution::Rh11Temp11,
        }
    }

    /// Replace the two resolution bits, leaving all others untouched
    #[must_use]
    pub const fn with_resolution(self, resolution: Resolution) -> Self {
        Self((self.0 & !USER_REG_RESOLUTION_MASK) | (resolution.code() & USER_REG_RESOLUTION_MASK))
    }

    /// On-chip heater enabled
    pub const fn heater_enabled(self) -> bool {
        self.0 & (1 << USER_REG_FIELD_LSBIT_HEATER_ENABLE) != 0
    }

    /// Set or clear the heater enable bit, leaving all others untouched
    #[must_use]
    pub const fn with_heater(self, enabled: bool) -> Self {
        let bit = 1 << USER_REG_FIELD_LSBIT_HEATER_ENABLE;
        if enabled { Self(self.0 | bit) } else { Self(self.0 & !bit) }
    }

    /// Supply voltage status
    pub const fn vdd_status(self) -> VddStatus {
        if self.0 & (1 << USER_REG_FIELD_LSBIT_VDD_LOW) != 0 { VddStatus::Low } else { VddStatus::Ok }
    }
}
impl Default for UserRegister {
    fn default() -> Self {
        Self(USER_REG_RESET_VALUE)
    }
}
impl fmt::Display for UserRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserRegister {{ 0x{:02x}; {}; ", self.0, self.resolution())?;
        if self.heater_enabled() {
            write!(f, "heater_enabled ")?;
        }
        if self.vdd_status() == VddStatus::Low {
            write!(f, "vdd_low ")?;
        }
        write!(f, "}}")
    }
}

/// Heater drive current setting (heater control register, low nibble)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaterCurrent(u8);
impl HeaterCurrent {
    /// Lowest setting
    pub const MIN: Self = Self(0x0);
    /// Highest setting
    pub const MAX: Self = Self(HEATER_REG_CURRENT_MASK);

    /// Build a setting from a register value.  Bits above the current field are dropped.
    pub const fn from_raw(raw: u8) -> Self {
        Self((raw & HEATER_REG_CURRENT_MASK) >> HEATER_REG_FIELD_LSBIT_CURRENT)
    }

    /// Setting as written to the register
    pub const fn raw(self) -> u8 {
        self.0 << HEATER_REG_FIELD_LSBIT_CURRENT
    }

    /// Typical heater current in milliamps at VDD = 3.3 V (datasheet table 13)
    pub fn typical_milliamps(self) -> f32 {
        3.09 + 6.074 * self.0 as f32
    }
}
impl From<u8> for HeaterCurrent {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}
impl fmt::Display for HeaterCurrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X} (~{:.1} mA)", self.0, self.typical_milliamps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_round_trips_and_preserves_other_bits() {
        let reg = UserRegister::from_raw(0x3A).with_resolution(Resolution::Rh11Temp11);
        assert_eq!(reg.resolution(), Resolution::Rh11Temp11);
        assert_eq!(reg.raw() & USER_REG_RESOLUTION_MASK, 0x81);
        assert_eq!(reg.raw() & 0x7E, 0x3A & 0x7E);

        let back = reg.with_resolution(Resolution::Rh12Temp14);
        assert_eq!(back.raw(), 0x3A);
    }

    #[test]
    fn every_resolution_decodes() {
        for res in [
            Resolution::Rh12Temp14,
            Resolution::Rh8Temp12,
            Resolution::Rh10Temp13,
            Resolution::Rh11Temp11,
        ] {
            assert_eq!(UserRegister::from_raw(0x7E).with_resolution(res).resolution(), res);
            assert_eq!(Resolution::try_from(res.code()), Ok(res));
        }
        assert_eq!(Resolution::try_from(0x02), Err(crate::Error::InvalidArgument));
    }

    #[test]
    fn heater_bit_only() {
        let reg = UserRegister::from_raw(0xBB);
        assert!(!reg.heater_enabled());
        let on = reg.with_heater(true);
        assert!(on.heater_enabled());
        assert_eq!(on.raw(), 0xBF);
        assert_eq!(on.resolution(), Resolution::Rh11Temp11);
        assert_eq!(on.with_heater(false), reg);
    }

    #[test]
    fn vdd_status_is_bit_six() {
        assert_eq!(UserRegister::from_raw(0x3A).vdd_status(), VddStatus::Ok);
        assert_eq!(UserRegister::from_raw(0x7A).vdd_status(), VddStatus::Low);
    }

    #[test]
    fn heater_current_is_masked() {
        assert_eq!(HeaterCurrent::from_raw(0xF3).raw(), 0x03);
        assert_eq!(HeaterCurrent::MAX.raw(), 0x0F);
        assert!((HeaterCurrent::MAX.typical_milliamps() - 94.2).abs() < 0.1);
        assert!((HeaterCurrent::MIN.typical_milliamps() - 3.09).abs() < 0.01);
    }
}
