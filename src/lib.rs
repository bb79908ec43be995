//! This is a platform-agnostic Rust driver for the Si7021 I²C humidity and temperature sensor.
//! Bus access goes through the small [`Transport`] trait; [`HalBus`] implements it for any
//! [`embedded-hal`] I²C bus, and delays come from [`embedded-hal`] or [`embedded-hal-async`].
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! This driver allows you to:
//! - Configure the bus, install it and probe for the sensor ([`Si7021::init`]).
//! - Measure temperature and relative humidity in no-hold master mode.
//! - Read the temperature taken during the last humidity measurement.
//! - Read and change the measurement resolution.
//! - Enable/disable the heater and set its drive current.
//! - Read the VDD status.
//! - Trigger a software reset.
//! - Read the firmware revision.
//! - Read the 64-bit electronic ID.
//! - blocking API support.
//! - async API support for measurements.
//!
//! Every measurement is checked against its CRC-8.  By default a mismatch is logged and counted
//! ([`Si7021::checksum_failures`]) and the value is still returned; [`CrcPolicy::Strict`] turns a
//! mismatch into [`Error::ChecksumMismatch`].
//!
//! ## Features
//!
//! - `async`: Enables the async measurement API.
//! - `blocking`: Enables the blocking measurement API and [`HalBus`].
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//! - `std`: Enables `SharedSi7021`, a mutex-guarded handle for multi-threaded use.
//! - `legacy`: Enables `Legacy`, which reports failures as sentinel values.
//!
//! ## Supported devices: Si7021 (and the register-compatible Si7013 / Si7020)
//!
//! Datasheet:
//!   [Si7021-A20](https://www.silabs.com/documents/public/data-sheets/Si7021-A20.pdf)
//!
//! ## Blocking Example:
//!
//! ```ignore
//! use si7021::{HalBus, Resolution, SensorConfig, Si7021};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal::i2c::I2c instance */;
//! let delay = /* embedded_hal::delay::DelayNs instance */;
//!
//! let mut si7021 = Si7021::new(HalBus::new(i2c), delay);
//! si7021.init(SensorConfig::default()).unwrap();
//!
//! si7021.set_resolution(Resolution::Rh12Temp14).unwrap();
//! println!("{:0.1} °C, {:0.1} %RH",
//!     si7021.read_temperature().unwrap(),
//!     si7021.read_humidity().unwrap());
//! println!("electronic id {}", si7021.get_electronic_id().unwrap());
//! ```
//!
//! ## Async Example:
//!
//! ```ignore
//! let mut si7021 = Si7021::new(HalBus::new(i2c), async_delay);
//! si7021.init(SensorConfig::default()).unwrap();
//! let centigrade = si7021.read_temperature_async().await.unwrap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[macro_use]
mod fmt;

mod bus;
mod crc8;
mod device_impl;
#[cfg(feature = "blocking")]
mod hal_bus;
mod hw_def;
#[cfg(feature = "legacy")]
pub mod legacy;
mod register;
#[cfg(feature = "std")]
mod shared;
#[cfg(all(test, feature = "blocking"))]
mod testing;
mod types;

pub use crate::{bus::*, crc8::*, hw_def::*, register::*, types::*};
#[cfg(feature = "blocking")]
pub use crate::hal_bus::HalBus;
#[cfg(feature = "std")]
pub use crate::shared::SharedSi7021;
