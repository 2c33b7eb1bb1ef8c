use std::fmt;
use byteorder::{ByteOrder, LittleEndian};
use super::error::DecodeError;
use super::header::ShapeType;

const SHAPE_TYPE_LENGTH: usize = 4;
const NULL_LENGTH: usize = SHAPE_TYPE_LENGTH;
const POINT_LENGTH: usize = SHAPE_TYPE_LENGTH + 16;
const POINT_M_LENGTH: usize = SHAPE_TYPE_LENGTH + 24;
const POINT_Z_LENGTH: usize = SHAPE_TYPE_LENGTH + 32;

/// Shape types this crate decodes, and the size of each one's payload
/// (shape-type tag included).
///
/// Supporting another shape type means adding a row here, a `Geometry`
/// variant and a match arm in `decode_geometry()`.
pub const POINT_FAMILY: &'static [(ShapeType, usize)] = &[
    (ShapeType::Null, NULL_LENGTH),
    (ShapeType::Point, POINT_LENGTH),
    (ShapeType::PointM, POINT_M_LENGTH),
    (ShapeType::PointZ, POINT_Z_LENGTH),
];

/// One record's shape.
///
/// PointZ always carries a measure: the format stores Z and M together.
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum Geometry {
    Null,
    Point { x: f64, y: f64 },
    PointM { x: f64, y: f64, m: f64 },
    PointZ { x: f64, y: f64, z: f64, m: f64 },
}

impl Geometry {
    pub fn shape_type(&self) -> ShapeType {
        match *self {
            Geometry::Null => ShapeType::Null,
            Geometry::Point { .. } => ShapeType::Point,
            Geometry::PointM { .. } => ShapeType::PointM,
            Geometry::PointZ { .. } => ShapeType::PointZ,
        }
    }

    /// Number of bytes `encode_geometry()` writes.
    pub fn encoded_len(&self) -> usize {
        match *self {
            Geometry::Null => NULL_LENGTH,
            Geometry::Point { .. } => POINT_LENGTH,
            Geometry::PointM { .. } => POINT_M_LENGTH,
            Geometry::PointZ { .. } => POINT_Z_LENGTH,
        }
    }

    /// `encoded_len()` in 16-bit words, as a record header stores it.
    pub fn content_length(&self) -> u32 {
        (self.encoded_len() / 2) as u32
    }

    /// (x, y), or `None` for a Null shape.
    pub fn xy(&self) -> Option<(f64, f64)> {
        match *self {
            Geometry::Null => None,
            Geometry::Point { x, y } | Geometry::PointM { x, y, .. } | Geometry::PointZ { x, y, .. } => Some((x, y)),
        }
    }

    pub fn z(&self) -> Option<f64> {
        match *self {
            Geometry::PointZ { z, .. } => Some(z),
            _ => None,
        }
    }

    pub fn m(&self) -> Option<f64> {
        match *self {
            Geometry::PointM { m, .. } | Geometry::PointZ { m, .. } => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Geometry::Null => write!(f, "Null"),
            Geometry::Point { x, y } => write!(f, "({},{})", x, y),
            Geometry::PointM { x, y, m } => write!(f, "({},{} m={})", x, y, m),
            Geometry::PointZ { x, y, z, m } => write!(f, "({},{},{} m={})", x, y, z, m),
        }
    }
}

/// Reads the little-endian shape-type tag at the start of a geometry.
pub fn read_shape_type(buf: &[u8]) -> Result<ShapeType, DecodeError> {
    if buf.len() < SHAPE_TYPE_LENGTH {
        return Err(DecodeError::Truncated { needed: SHAPE_TYPE_LENGTH, available: buf.len() });
    }

    let shape_type_u32 = LittleEndian::read_u32(&buf[0..4]);
    ShapeType::from_u32(shape_type_u32).ok_or(DecodeError::UnknownShapeType(shape_type_u32))
}

/// Decodes one record's geometry.
///
/// `expected` is the file header's shape type. Null shapes may appear in any
/// file; any other shape must match `expected`.
///
/// Bytes past the geometry's fixed size are ignored: checking them against
/// the record header is the caller's job.
pub fn decode_geometry(expected: ShapeType, buf: &[u8]) -> Result<Geometry, DecodeError> {
    let shape_type = read_shape_type(buf)?;

    let needed_len = match shape_type.payload_len() {
        Some(len) => len,
        None => { return Err(DecodeError::UnsupportedShapeType(shape_type)); }
    };

    if shape_type != ShapeType::Null && shape_type != expected {
        return Err(DecodeError::ShapeTypeMismatch { expected: expected, found: shape_type });
    }

    if buf.len() < needed_len {
        return Err(DecodeError::Truncated { needed: needed_len, available: buf.len() });
    }

    let f = |offset: usize| LittleEndian::read_f64(&buf[offset .. offset + 8]);

    match shape_type {
        ShapeType::Null => Ok(Geometry::Null),
        ShapeType::Point => Ok(Geometry::Point { x: f(4), y: f(12) }),
        ShapeType::PointM => Ok(Geometry::PointM { x: f(4), y: f(12), m: f(20) }),
        ShapeType::PointZ => Ok(Geometry::PointZ { x: f(4), y: f(12), z: f(20), m: f(28) }),
        other => Err(DecodeError::UnsupportedShapeType(other)),
    }
}

pub fn encode_geometry(geometry: &Geometry) -> Vec<u8> {
    let mut buf = vec![ 0u8; geometry.encoded_len() ];
    LittleEndian::write_u32(&mut buf[0..4], geometry.shape_type().to_u32());

    {
        let mut put = |offset: usize, value: f64| LittleEndian::write_f64(&mut buf[offset .. offset + 8], value);

        match *geometry {
            Geometry::Null => {},
            Geometry::Point { x, y } => { put(4, x); put(12, y); }
            Geometry::PointM { x, y, m } => { put(4, x); put(12, y); put(20, m); }
            Geometry::PointZ { x, y, z, m } => { put(4, x); put(12, y); put(20, z); put(28, m); }
        }
    }

    buf
}
