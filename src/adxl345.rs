//! ADXL345 3-axis accelerometer over I2C.
//!
//! Reference part for the pipeline: a 13-bit digital accelerometer whose
//! data registers (`DATAX0..DATAZ1`) hold three little-endian two's-complement
//! words. In full-resolution mode the scale is a constant 3.9 mg/LSB whatever
//! the range, which is why [`SENSITIVITY`] is a single number.
//!
//! Bring-up writes are checked: an unconfigured device would stream zeros and
//! the engine would happily learn them.
//!
//! [`SENSITIVITY`]: crate::config::SENSITIVITY

use core::fmt;

use embedded_hal::i2c::I2c;

use crate::config::SENSITIVITY;
use crate::sensor::{Accelerometer, AxisSample};

/// Default 7-bit address (ALT ADDRESS pin low).
pub const DEFAULT_ADDRESS: u8 = 0x53;

/// Alternate 7-bit address (ALT ADDRESS pin high).
pub const ALT_ADDRESS: u8 = 0x1D;

/// Fixed DEVID register contents.
pub const DEVICE_ID: u8 = 0xE5;

/// Register map subset used by the driver.
pub mod regs {
    /// Device ID (read-only, 0xE5).
    pub const DEVID: u8 = 0x00;
    /// Power-saving features control.
    pub const POWER_CTL: u8 = 0x2D;
    /// Data format control.
    pub const DATA_FORMAT: u8 = 0x31;
    /// First of six data registers.
    pub const DATAX0: u8 = 0x32;
}

/// POWER_CTL: measurement mode.
const POWER_CTL_MEASURE: u8 = 0x08;
/// DATA_FORMAT: full-resolution bit.
const DATA_FORMAT_FULL_RES: u8 = 0x08;

/// Measurement range (DATA_FORMAT bits D1:D0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Range {
    /// ±2 g.
    #[default]
    G2 = 0,
    /// ±4 g.
    G4 = 1,
    /// ±8 g.
    G8 = 2,
    /// ±16 g.
    G16 = 3,
}

/// Contents of the DATA_FORMAT register that the driver controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DataFormat {
    /// Measurement range.
    pub range: Range,
    /// Full resolution: 3.9 mg/LSB at every range. Otherwise 10-bit output.
    pub full_resolution: bool,
}

impl Default for DataFormat {
    /// ±2 g, full resolution (register value 0x08).
    fn default() -> Self {
        Self { range: Range::G2, full_resolution: true }
    }
}

impl DataFormat {
    /// Register encoding.
    pub fn bits(&self) -> u8 {
        let full = if self.full_resolution { DATA_FORMAT_FULL_RES } else { 0 };
        full | self.range as u8
    }

    /// g per LSB for this format.
    ///
    /// In 10-bit mode the scale doubles with each range step.
    pub fn sensitivity(&self) -> f32 {
        if self.full_resolution {
            SENSITIVITY
        } else {
            SENSITIVITY * (1u32 << self.range as u32) as f32
        }
    }
}

/// ADXL345 driver error.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum SensorError<E> {
    /// The bus transaction failed (NACK, timeout, arbitration loss).
    Bus(E),
    /// DEVID did not read back as [`DEVICE_ID`].
    BadDeviceId(u8),
}

impl<E: fmt::Debug> fmt::Display for SensorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Bus(e) => write!(f, "i2c transport error: {:?}", e),
            SensorError::BadDeviceId(id) => {
                write!(f, "unexpected device id 0x{:02X} (want 0x{:02X})", id, DEVICE_ID)
            }
        }
    }
}

/// ADXL345 on an I2C bus.
pub struct Adxl345<I2C> {
    i2c: I2C,
    address: u8,
    format: DataFormat,
}

impl<I2C: I2c> Adxl345<I2C> {
    /// Driver at [`DEFAULT_ADDRESS`] with the reference data format.
    /// No bus traffic until [`verify`](Accelerometer::verify).
    pub fn new(i2c: I2C) -> Self {
        Self::with_format(i2c, DEFAULT_ADDRESS, DataFormat::default())
    }

    /// Driver at an explicit address and data format.
    pub fn with_format(i2c: I2C, address: u8, format: DataFormat) -> Self {
        Self { i2c, address, format }
    }

    /// Configured data format.
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Read DEVID.
    pub fn device_id(&mut self) -> Result<u8, SensorError<I2C::Error>> {
        let mut out = [0u8];
        self.i2c
            .write_read(self.address, &[regs::DEVID], &mut out)
            .map_err(SensorError::Bus)?;
        Ok(out[0])
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, reg: u8, val: u8) -> Result<(), SensorError<I2C::Error>> {
        self.i2c.write(self.address, &[reg, val]).map_err(SensorError::Bus)
    }
}

impl<I2C: I2c> Accelerometer for Adxl345<I2C> {
    type Error = SensorError<I2C::Error>;

    /// Fail unless DEVID reads back as [`DEVICE_ID`].
    fn verify(&mut self) -> Result<(), Self::Error> {
        match self.device_id()? {
            DEVICE_ID => Ok(()),
            other => {
                log::error!("adxl345@0x{:02X}: DEVID 0x{:02X}", self.address, other);
                Err(SensorError::BadDeviceId(other))
            }
        }
    }

    /// Measurement mode, then data format. Either write failing is reported.
    fn configure(&mut self) -> Result<(), Self::Error> {
        self.write_reg(regs::POWER_CTL, POWER_CTL_MEASURE)?;
        self.write_reg(regs::DATA_FORMAT, self.format.bits())?;
        log::debug!(
            "adxl345@0x{:02X}: measuring, DATA_FORMAT=0x{:02X}",
            self.address,
            self.format.bits()
        );
        Ok(())
    }

    fn read(&mut self) -> Result<AxisSample, Self::Error> {
        let mut buf = [0u8; 6];
        self.i2c
            .write_read(self.address, &[regs::DATAX0], &mut buf)
            .map_err(SensorError::Bus)?;
        Ok(AxisSample::from_le_bytes(buf))
    }

    fn sensitivity(&self) -> f32 {
        self.format.sensitivity()
    }
}
