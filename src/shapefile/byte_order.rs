//! Byte-order and sentinel helpers shared by every fixed-size structure.
//!
//! A ".shp" file mixes byte orders: the file code, reserved words, file length
//! and both record-header fields are big-endian; everything else is
//! little-endian. All integer fields are read little-endian and the big-endian
//! ones go through `swap32()`, so the per-field contract stays in one place.
use std::f64;
use byteorder::{ByteOrder, LittleEndian};

/// Stands in for "this file has no such dimension" in the Z/M bounding ranges.
///
/// It's the most negative finite `f64`. Some writers can't round-trip NaN
/// through these fields, so NaN is never written.
pub const NO_DATA: f64 = f64::MIN;

/// Reverses the byte order of a 32-bit word.
#[inline]
pub fn swap32(value: u32) -> u32 {
    (value >> 24) & 0xff
        | (value << 8) & 0xff0000
        | (value >> 8) & 0xff00
        | (value << 24) & 0xff000000
}

/// Maps the in-memory "absent" marker (NaN) to `NO_DATA`.
#[inline]
pub fn to_sentinel(value: f64) -> f64 {
    if value.is_nan() { NO_DATA } else { value }
}

/// Maps `NO_DATA` back to NaN.
#[inline]
pub fn from_sentinel(value: f64) -> f64 {
    if value == NO_DATA { f64::NAN } else { value }
}

pub fn read_be_u32(buf: &[u8]) -> u32 {
    swap32(LittleEndian::read_u32(buf))
}

pub fn write_be_u32(buf: &mut [u8], value: u32) {
    LittleEndian::write_u32(buf, swap32(value))
}

/// Reads a Z/M bound. `None` means the file carries no such dimension.
pub fn read_optional_f64(buf: &[u8]) -> Option<f64> {
    let value = from_sentinel(LittleEndian::read_f64(buf));
    if value.is_nan() { None } else { Some(value) }
}

pub fn write_optional_f64(buf: &mut [u8], value: Option<f64>) {
    LittleEndian::write_f64(buf, to_sentinel(value.unwrap_or(f64::NAN)))
}
