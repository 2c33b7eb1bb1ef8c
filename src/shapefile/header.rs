/// Reads and writes the 100-byte ".shp" file header, as per
/// https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf
use std::fmt;
use byteorder::{ByteOrder, LittleEndian};
use super::byte_order::{read_be_u32, read_optional_f64, write_be_u32, write_optional_f64};
use super::error::DecodeError;

pub const SHP_HEADER_LENGTH: usize = 100;
pub const SHP_MAGIC_NUMBER: u32 = 9994;
pub const SHP_VERSION: u32 = 1000;

#[derive(Debug,Copy,Clone,PartialEq,Eq,Hash)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    /// Returns `None` if `u` isn't a shape type ESRI defines.
    pub fn from_u32(u: u32) -> Option<ShapeType> {
        match u {
            0  => Some(ShapeType::Null),
            1  => Some(ShapeType::Point),
            3  => Some(ShapeType::PolyLine),
            5  => Some(ShapeType::Polygon),
            8  => Some(ShapeType::MultiPoint),
            11 => Some(ShapeType::PointZ),
            13 => Some(ShapeType::PolyLineZ),
            15 => Some(ShapeType::PolygonZ),
            18 => Some(ShapeType::MultiPointZ),
            21 => Some(ShapeType::PointM),
            23 => Some(ShapeType::PolyLineM),
            25 => Some(ShapeType::PolygonM),
            28 => Some(ShapeType::MultiPointM),
            31 => Some(ShapeType::MultiPatch),
            _ => None,
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
            ShapeType::MultiPatch => 31,
        }
    }

    /// Size of this shape type's geometry payload, tag included.
    ///
    /// Only the point family has a fixed size; other shape types return
    /// `None` and are not decoded.
    pub fn payload_len(self) -> Option<usize> {
        super::geometry::POINT_FAMILY.iter()
            .find(|&&(shape_type, _)| shape_type == self)
            .map(|&(_, len)| len)
    }

    pub fn is_point_family(self) -> bool {
        self.payload_len().is_some()
    }

    pub fn has_z(self) -> bool {
        match self {
            ShapeType::PointZ | ShapeType::PolyLineZ | ShapeType::PolygonZ | ShapeType::MultiPointZ | ShapeType::MultiPatch => true,
            _ => false,
        }
    }

    /// Z shape types carry measures too.
    pub fn has_m(self) -> bool {
        match self {
            ShapeType::PointM | ShapeType::PolyLineM | ShapeType::PolygonM | ShapeType::MultiPointM => true,
            other => other.has_z(),
        }
    }
}

/// (x_min, y_min, x_max, y_max)
#[derive(Debug,Copy,Clone,PartialEq,Default)]
pub struct ShpBoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ShpHeader {
    pub file_code: u32,
    /// Always zero in practice. Kept so a header re-encodes byte-for-byte.
    pub reserved: [u32; 5],
    /// In 16-bit words, header included.
    pub file_length: u32,
    pub version: u32,
    pub shape_type: ShapeType,
    pub bounding_box: ShpBoundingBox,
    pub z_min: Option<f64>,
    pub z_max: Option<f64>,
    pub m_min: Option<f64>,
    pub m_max: Option<f64>,
}

impl ShpHeader {
    /// A header for an empty file of the given shape type.
    pub fn new(shape_type: ShapeType) -> ShpHeader {
        ShpHeader {
            file_code: SHP_MAGIC_NUMBER,
            reserved: [ 0; 5 ],
            file_length: (SHP_HEADER_LENGTH / 2) as u32,
            version: SHP_VERSION,
            shape_type: shape_type,
            bounding_box: ShpBoundingBox::default(),
            z_min: None,
            z_max: None,
            m_min: None,
            m_max: None,
        }
    }

    pub fn file_length_in_bytes(&self) -> usize {
        (self.file_length as usize).saturating_mul(2)
    }
}

impl fmt::Display for ShpHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = &self.bounding_box;
        write!(f, "{:?} file, {} bytes, bbox ({},{})-({},{})", self.shape_type, self.file_length_in_bytes(), b.x_min, b.y_min, b.x_max, b.y_max)
    }
}

/// Decodes the first 100 bytes of a ".shp" file.
///
/// Returns Err if the bytes are too short, the magic number or version is
/// wrong, or the shape type is undefined. Any defined shape type is accepted
/// here: records are what need decoding support.
pub fn decode_header(buf: &[u8]) -> Result<ShpHeader, DecodeError> {
    if buf.len() < SHP_HEADER_LENGTH {
        return Err(DecodeError::Truncated { needed: SHP_HEADER_LENGTH, available: buf.len() });
    }

    let file_code = read_be_u32(&buf[0..4]);
    if file_code != SHP_MAGIC_NUMBER {
        return Err(DecodeError::BadMagic(file_code));
    }

    let mut reserved = [ 0u32; 5 ];
    for (i, word) in reserved.iter_mut().enumerate() {
        *word = read_be_u32(&buf[4 + 4 * i .. 8 + 4 * i]);
    }

    let version = LittleEndian::read_u32(&buf[28..32]);
    if version != SHP_VERSION {
        return Err(DecodeError::BadVersion(version));
    }

    let shape_type_u32 = LittleEndian::read_u32(&buf[32..36]);
    let shape_type = match ShapeType::from_u32(shape_type_u32) {
        Some(shape_type) => shape_type,
        None => { return Err(DecodeError::UnknownShapeType(shape_type_u32)); }
    };

    Ok(ShpHeader {
        file_code: file_code,
        reserved: reserved,
        file_length: read_be_u32(&buf[24..28]),
        version: version,
        shape_type: shape_type,
        bounding_box: ShpBoundingBox {
            x_min: LittleEndian::read_f64(&buf[36..44]),
            y_min: LittleEndian::read_f64(&buf[44..52]),
            x_max: LittleEndian::read_f64(&buf[52..60]),
            y_max: LittleEndian::read_f64(&buf[60..68]),
        },
        z_min: read_optional_f64(&buf[68..76]),
        z_max: read_optional_f64(&buf[76..84]),
        m_min: read_optional_f64(&buf[84..92]),
        m_max: read_optional_f64(&buf[92..100]),
    })
}

pub fn encode_header(header: &ShpHeader) -> [u8; SHP_HEADER_LENGTH] {
    let mut buf = [ 0u8; SHP_HEADER_LENGTH ];

    write_be_u32(&mut buf[0..4], header.file_code);
    for (i, &word) in header.reserved.iter().enumerate() {
        write_be_u32(&mut buf[4 + 4 * i .. 8 + 4 * i], word);
    }
    write_be_u32(&mut buf[24..28], header.file_length);
    LittleEndian::write_u32(&mut buf[28..32], header.version);
    LittleEndian::write_u32(&mut buf[32..36], header.shape_type.to_u32());
    LittleEndian::write_f64(&mut buf[36..44], header.bounding_box.x_min);
    LittleEndian::write_f64(&mut buf[44..52], header.bounding_box.y_min);
    LittleEndian::write_f64(&mut buf[52..60], header.bounding_box.x_max);
    LittleEndian::write_f64(&mut buf[60..68], header.bounding_box.y_max);
    write_optional_f64(&mut buf[68..76], header.z_min);
    write_optional_f64(&mut buf[76..84], header.z_max);
    write_optional_f64(&mut buf[84..92], header.m_min);
    write_optional_f64(&mut buf[92..100], header.m_max);

    buf
}
