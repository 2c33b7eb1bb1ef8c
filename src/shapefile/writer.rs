//! Writes point-family ".shp" files.
use std::cmp::Ordering;
use std::io;
use itertools::{Itertools, MinMaxResult};
use super::{ShapeFile, ShpRecord};
use super::error::DecodeError;
use super::geometry::{encode_geometry, Geometry};
use super::header::{encode_header, ShapeType, ShpBoundingBox, ShpHeader, SHP_HEADER_LENGTH};
use super::record::{encode_record_header, RecordHeader, SHP_RECORD_HEADER_LENGTH};

/// (min, max) of some values, or `None` if there are none. NaNs are ignored.
fn min_max<I: Iterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    match values.filter(|v| !v.is_nan()).minmax_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal)) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

/// Bytes `encode_shapefile()` writes for these records, header included.
fn encoded_file_len(records: &[ShpRecord]) -> usize {
    SHP_HEADER_LENGTH + records.iter()
        .map(|r| SHP_RECORD_HEADER_LENGTH + r.geometry.encoded_len())
        .sum::<usize>()
}

impl ShapeFile {
    /// Builds a consistent `ShapeFile` out of geometries, ready to encode.
    ///
    /// Record numbers count from 1, content lengths and the file length match
    /// what `encode_shapefile()` writes, and the bounding box covers every
    /// non-null geometry. Z bounds are only set for PointZ files and M bounds
    /// for PointM and PointZ files.
    ///
    /// Returns Err if `shape_type` isn't Null, Point, PointM or PointZ, or if
    /// a non-null geometry has a different shape type.
    pub fn from_geometries(shape_type: ShapeType, geometries: Vec<Geometry>) -> Result<ShapeFile, DecodeError> {
        if !shape_type.is_point_family() {
            return Err(DecodeError::UnsupportedShapeType(shape_type));
        }

        if let Some(bad) = geometries.iter().find(|g| g.shape_type() != ShapeType::Null && g.shape_type() != shape_type) {
            return Err(DecodeError::ShapeTypeMismatch { expected: shape_type, found: bad.shape_type() });
        }

        let mut header = ShpHeader::new(shape_type);

        let xs = min_max(geometries.iter().filter_map(|g| g.xy()).map(|(x, _)| x));
        let ys = min_max(geometries.iter().filter_map(|g| g.xy()).map(|(_, y)| y));
        if let (Some((x_min, x_max)), Some((y_min, y_max))) = (xs, ys) {
            header.bounding_box = ShpBoundingBox { x_min: x_min, y_min: y_min, x_max: x_max, y_max: y_max };
        }

        if shape_type.has_z() {
            let zs = min_max(geometries.iter().filter_map(|g| g.z()));
            header.z_min = zs.map(|(min, _)| min);
            header.z_max = zs.map(|(_, max)| max);
        }

        if shape_type.has_m() {
            let ms = min_max(geometries.iter().filter_map(|g| g.m()));
            header.m_min = ms.map(|(min, _)| min);
            header.m_max = ms.map(|(_, max)| max);
        }

        let records: Vec<ShpRecord> = geometries.into_iter()
            .enumerate()
            .map(|(i, geometry)| ShpRecord {
                header: RecordHeader {
                    record_number: (i + 1) as u32,
                    content_length: geometry.content_length(),
                },
                geometry: geometry,
            })
            .collect();

        header.file_length = (encoded_file_len(&records) / 2) as u32;

        Ok(ShapeFile {
            header: header,
            records: records,
            skipped: vec![],
        })
    }
}

/// Encodes the header and every record, as stored.
///
/// Skipped records are not written. Use `ShapeFile::from_geometries()` to get
/// a header whose file length matches. The header's file length is written
/// as is; the buffer is sized from the records.
pub fn encode_shapefile(shape_file: &ShapeFile) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_file_len(&shape_file.records));
    buf.extend_from_slice(&encode_header(&shape_file.header));
    for record in shape_file.records.iter() {
        buf.extend_from_slice(&encode_record_header(&record.header));
        buf.extend_from_slice(&encode_geometry(&record.geometry));
    }
    buf
}

/// Writes `encode_shapefile()`'s output, one record at a time.
pub fn write_shapefile<W: io::Write>(shape_file: &ShapeFile, mut w: W) -> io::Result<()> {
    w.write_all(&encode_header(&shape_file.header))?;
    for record in shape_file.records.iter() {
        w.write_all(&encode_record_header(&record.header))?;
        w.write_all(&encode_geometry(&record.geometry))?;
    }
    w.flush()
}
