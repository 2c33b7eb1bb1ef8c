use std::error;
use std::fmt;
use std::io;
use super::header::ShapeType;

/// Everything that can go wrong while reading a ".shp" stream.
///
/// Each variant is raised where the bad bytes are found; the first one aborts
/// the whole decode.
#[derive(Debug)]
pub enum DecodeError {
    /// The underlying reader failed for a reason other than running out of bytes.
    IOError(io::Error),
    /// The file code isn't 9994: this isn't a shapefile.
    BadMagic(u32),
    /// The header version isn't 1000.
    BadVersion(u32),
    /// Fewer bytes were available than a fixed-size structure needs.
    Truncated { needed: usize, available: usize },
    /// The shape-type tag isn't one ESRI defines.
    UnknownShapeType(u32),
    /// The shape-type tag is defined, but this crate only decodes the point family.
    UnsupportedShapeType(ShapeType),
    /// A record's geometry has a different shape type than the file header.
    ShapeTypeMismatch { expected: ShapeType, found: ShapeType },
    /// A record header's content length disagrees with its geometry's size.
    ContentLengthMismatch { record_number: u32, declared: usize, expected: usize },
    /// Record numbers must count up from 1 with no gaps or duplicates.
    RecordNumberMismatch { expected: u32, found: u32 },
    /// The header's file length disagrees with the bytes actually in the stream.
    FileLengthMismatch { declared: usize, actual: usize },
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            DecodeError::IOError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodeError::IOError(ref err) => err.fmt(f),
            DecodeError::BadMagic(found) => write!(f, "File has wrong magic number: found {}, expected 9994", found),
            DecodeError::BadVersion(found) => write!(f, "File has wrong version: found {}, expected 1000", found),
            DecodeError::Truncated { needed, available } => write!(f, "Unexpected end of data: needed {} bytes, found {}", needed, available),
            DecodeError::UnknownShapeType(tag) => write!(f, "Nonexistent shape type {}", tag),
            DecodeError::UnsupportedShapeType(shape_type) => write!(f, "Unsupported shape type {:?}", shape_type),
            DecodeError::ShapeTypeMismatch { expected, found } => write!(f, "Record has shape type {:?}, but the file header says {:?}", found, expected),
            DecodeError::ContentLengthMismatch { record_number, declared, expected } => {
                write!(f, "Record number {} says it has {} bytes, but its geometry needs {}", record_number, declared, expected)
            }
            DecodeError::RecordNumberMismatch { expected, found } => write!(f, "Found record number {}, expected {}", found, expected),
            DecodeError::FileLengthMismatch { declared, actual } => {
                write!(f, "The Shapefile header suggests the file is {} bytes long, but it is {} bytes long", declared, actual)
            }
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> DecodeError {
        DecodeError::IOError(err)
    }
}
