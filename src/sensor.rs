/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Accelerometer samples and the driver-facing trait.
//!
//! - [`AxisSample`]: raw signed counts, one per axis, as read from the device.
//! - [`PhysicalSample`]: the same reading scaled to g.
//! - [`Accelerometer`]: what the acquisition loop needs from a driver.
//!
//! # Invariants
//!
//! - Raw register blocks are decoded little-endian, two's-complement, x/y/z order.
//! - A driver never retries; retry policy belongs to the caller.

use crate::config::SENSITIVITY;

/// One raw accelerometer reading in device counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct AxisSample {
    /// X axis counts.
    pub x: i16,
    /// Y axis counts.
    pub y: i16,
    /// Z axis counts.
    pub z: i16,
}

impl AxisSample {
    /// Construct from explicit axis values.
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Decode a 6-byte little-endian register block (X0 X1 Y0 Y1 Z0 Z1).
    pub fn from_le_bytes(buf: [u8; 6]) -> Self {
        Self {
            x: i16::from_le_bytes([buf[0], buf[1]]),
            y: i16::from_le_bytes([buf[2], buf[3]]),
            z: i16::from_le_bytes([buf[4], buf[5]]),
        }
    }

    /// Scale to physical units: each axis × `sensitivity` (g per LSB).
    pub fn to_physical(self, sensitivity: f32) -> PhysicalSample {
        PhysicalSample {
            x: self.x as f32 * sensitivity,
            y: self.y as f32 * sensitivity,
            z: self.z as f32 * sensitivity,
        }
    }
}

/// Decode a raw data register block. Same as [`AxisSample::from_le_bytes`].
pub fn decode(buf: [u8; 6]) -> AxisSample {
    AxisSample::from_le_bytes(buf)
}

/// One accelerometer reading in g.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct PhysicalSample {
    /// X axis, g.
    pub x: f32,
    /// Y axis, g.
    pub y: f32,
    /// Z axis, g.
    pub z: f32,
}

impl PhysicalSample {
    /// Axis values in window order.
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// A 3-axis accelerometer the acquisition loop can poll.
///
/// `read` issues one bus transaction and reports any transport failure as
/// `Err` without retrying. `verify` then `configure` are called once at
/// bring-up; the defaults do nothing so purely simulated sensors need not
/// implement them.
pub trait Accelerometer {
    /// Transport or device error.
    type Error: core::fmt::Debug;

    /// Confirm the expected part is answering.
    fn verify(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Put the device into measurement mode with its configured data format.
    fn configure(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Read one raw sample.
    fn read(&mut self) -> Result<AxisSample, Self::Error>;

    /// g per LSB at the current data format.
    fn sensitivity(&self) -> f32 {
        SENSITIVITY
    }
}

impl<T: Accelerometer + ?Sized> Accelerometer for &mut T {
    type Error = T::Error;

    fn verify(&mut self) -> Result<(), Self::Error> {
        (**self).verify()
    }

    fn configure(&mut self) -> Result<(), Self::Error> {
        (**self).configure()
    }

    fn read(&mut self) -> Result<AxisSample, Self::Error> {
        (**self).read()
    }

    fn sensitivity(&self) -> f32 {
        (**self).sensitivity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_little_endian_twos_complement() {
        let s = decode([0x00, 0x01, 0xFF, 0xFF, 0x10, 0x00]);
        assert_eq!(s, AxisSample::new(256, -1, 16));
    }

    #[test]
    fn test_decode_extremes() {
        let s = decode([0xFF, 0x7F, 0x00, 0x80, 0x00, 0x00]);
        assert_eq!(s.x, i16::MAX);
        assert_eq!(s.y, i16::MIN);
        assert_eq!(s.z, 0);
    }

    #[test]
    fn test_to_physical_scales_each_axis() {
        let p = AxisSample::new(256, -1, 16).to_physical(SENSITIVITY);
        assert!((p.x - 0.9984).abs() < 1e-5, "x={}", p.x);
        assert!((p.y + 0.0039).abs() < 1e-6, "y={}", p.y);
        assert!((p.z - 0.0624).abs() < 1e-6, "z={}", p.z);
    }

    #[test]
    fn test_one_g_at_rest() {
        // 256 LSB ≈ 1 g at 3.9 mg/LSB
        let p = AxisSample::new(0, 0, 256).to_physical(SENSITIVITY);
        assert!((p.z - 1.0).abs() < 0.01);
        assert_eq!(p.to_array()[2], p.z);
    }

    struct Fixed;

    impl Accelerometer for Fixed {
        type Error = ();
        fn read(&mut self) -> Result<AxisSample, ()> {
            Ok(AxisSample::new(1, 2, 3))
        }
    }

    fn read_via<A: Accelerometer>(mut sensor: A) -> Result<AxisSample, A::Error> {
        sensor.read()
    }

    #[test]
    fn test_trait_defaults() {
        let mut s = Fixed;
        assert_eq!(s.verify(), Ok(()));
        assert_eq!(s.configure(), Ok(()));
        assert!((s.sensitivity() - SENSITIVITY).abs() < f32::EPSILON);
        assert_eq!(read_via(&mut s), Ok(AxisSample::new(1, 2, 3)));
    }
}
