//! Reads and writes ESRI ".shp" files whose shapes are points.
//!
//! A ".shp" file is a 100-byte header followed by records. Each record is an
//! 8-byte record header and a geometry. This module decodes Null, Point,
//! PointM and PointZ geometries; records of other shape types are either an
//! error or skipped, depending on `DecodeConfig`.
//!
//! There are things ".shp" files _don't_ contain:
//!
//! * The _projection_ isn't specified. Sometimes there's a ".prj" file that
//!   contains that information. This library ignores it and returns `f64`
//!   coordinates.
//! * Attributes live in the ".dbf" file, and the ".shx" index is redundant.
//!   Neither is read.
//!
//! # Examples
//!
//! Decode a whole file from any `io::Read` implementor (works best with
//! `io::BufReader`):
//!
//! ```
//! use std::io;
//! use shpcodec::shapefile::{self, DecodeConfig, Geometry, ShapeFile, ShapeType};
//!
//! # let bytes = shapefile::encode_shapefile(&ShapeFile::from_geometries(ShapeType::Point, vec![
//! #     Geometry::Point { x: 1., y: 2. },
//! # ]).unwrap());
//! let shape_file = shapefile::decode_shapefile(io::Cursor::new(bytes), &DecodeConfig::default()).unwrap();
//!
//! for record in shape_file.records.iter() {
//!     println!("{}: {}", record.header.record_number, record.geometry);
//! }
//! ```
//!
//! Keep going past PolyLines and friends:
//!
//! ```
//! use shpcodec::shapefile::{DecodeConfig, UnsupportedShapeTypePolicy};
//!
//! let config = DecodeConfig::default()
//!     .on_unsupported_shape_type(UnsupportedShapeTypePolicy::SkipRecord);
//! // ... decode_shapefile(r, &config), then look at shape_file.skipped
//! ```

pub mod byte_order;
pub mod error;
pub mod geometry;
pub mod header;
pub mod reader;
pub mod record;
pub mod writer;

pub use self::error::DecodeError;
pub use self::geometry::{decode_geometry, encode_geometry, Geometry};
pub use self::header::{decode_header, encode_header, ShapeType, ShpBoundingBox, ShpHeader};
pub use self::reader::{decode_path, decode_shapefile, open, DecodeConfig, ShpReader, UnsupportedShapeTypePolicy};
pub use self::record::{decode_record_header, encode_record_header, RecordHeader};
pub use self::writer::{encode_shapefile, write_shapefile};

/// A record header and the geometry that follows it.
#[derive(Debug,Clone,PartialEq)]
pub struct ShpRecord {
    pub header: RecordHeader,
    pub geometry: Geometry,
}

/// A record left out by `UnsupportedShapeTypePolicy::SkipRecord`.
#[derive(Debug,Clone,PartialEq)]
pub struct SkippedRecord {
    pub header: RecordHeader,
    pub shape_type: ShapeType,
}

/// A decoded ".shp" file. Records are in file order.
#[derive(Debug,Clone,PartialEq)]
pub struct ShapeFile {
    pub header: ShpHeader,
    pub records: Vec<ShpRecord>,
    pub skipped: Vec<SkippedRecord>,
}
