/// Reads ESRI ".shp" Shapefiles record by record, as per
/// https://www.esri.com/library/whitepapers/pdfs/shapefile.pdf
use std::fmt;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;
use super::{ShapeFile, ShpRecord, SkippedRecord};
use super::error::DecodeError;
use super::geometry::decode_geometry;
use super::header::{decode_header, ShpHeader, SHP_HEADER_LENGTH};
use super::record::{decode_record_header, SHP_RECORD_HEADER_LENGTH};

/// What to do with a record whose shape type is valid but not decodable here
/// (PolyLine, Polygon, MultiPoint, MultiPatch and their Z/M variants).
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum UnsupportedShapeTypePolicy {
    /// Stop and return `DecodeError::UnsupportedShapeType`.
    Abort,
    /// Leave the record out and list it in `ShapeFile::skipped`.
    SkipRecord,
}

/// Tells `ShpReader` how strict to be.
///
/// ```
/// use shpcodec::shapefile::{DecodeConfig, UnsupportedShapeTypePolicy};
///
/// let config = DecodeConfig::default()
///     .on_unsupported_shape_type(UnsupportedShapeTypePolicy::SkipRecord)
///     .check_file_length(false);
/// assert!(config.strict_content_length);
/// ```
#[derive(Debug,Clone)]
pub struct DecodeConfig {
    pub on_unsupported_shape_type: UnsupportedShapeTypePolicy,
    /// Fail with `ContentLengthMismatch` when a record header's content
    /// length isn't exactly its geometry's size. When false, extra bytes are
    /// read and ignored.
    pub strict_content_length: bool,
    /// Fail with `FileLengthMismatch` when the stream's length doesn't match
    /// the file header's.
    pub check_file_length: bool,
}

impl DecodeConfig {
    pub fn new() -> DecodeConfig {
        DecodeConfig {
            on_unsupported_shape_type: UnsupportedShapeTypePolicy::Abort,
            strict_content_length: true,
            check_file_length: true,
        }
    }

    pub fn on_unsupported_shape_type(mut self, policy: UnsupportedShapeTypePolicy) -> DecodeConfig {
        self.on_unsupported_shape_type = policy;
        self
    }

    pub fn strict_content_length(mut self, strict: bool) -> DecodeConfig {
        self.strict_content_length = strict;
        self
    }

    pub fn check_file_length(mut self, check: bool) -> DecodeConfig {
        self.check_file_length = check;
        self
    }
}

impl Default for DecodeConfig {
    fn default() -> DecodeConfig {
        DecodeConfig::new()
    }
}

impl fmt::Display for DecodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[DecodeConfig] on_unsupported_shape_type: {:?}, strict_content_length: {}, check_file_length: {}",
            self.on_unsupported_shape_type,
            self.strict_content_length,
            self.check_file_length
        )
    }
}

#[derive(Debug,Copy,Clone,PartialEq,Eq)]
enum ScanState {
    Records,
    Done,
    Failed,
}

enum Step {
    Record(ShpRecord),
    Skipped,
    End,
}

/// Reads up to `len` bytes. Returns fewer only at end of stream.
///
/// The buffer grows as bytes arrive, so a corrupt length can't make us
/// allocate gigabytes up front.
fn read_window<R: io::Read>(file: &mut R, len: usize) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    file.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Reads an ESRI ".shp" Shapefile, one record at a time.
///
/// The header is read when the reader is built. Each call to `next()` reads a
/// record header and its geometry. After the first error, the iterator
/// returns `None`.
///
/// # Example
///
/// ```
/// use std::io;
/// use shpcodec::shapefile::{encode_shapefile, Geometry, ShapeFile, ShapeType, ShpReader};
///
/// let shape_file = ShapeFile::from_geometries(ShapeType::Point, vec![
///     Geometry::Point { x: 1., y: 2. },
///     Geometry::Null,
/// ]).unwrap();
/// let bytes = encode_shapefile(&shape_file);
///
/// // builder returns Result<ShpReader, DecodeError>
/// let mut shp_reader = ShpReader::new(io::Cursor::new(bytes)).unwrap();
///
/// assert_eq!(140, shp_reader.header.file_length_in_bytes());
///
/// // shp_reader.next(), an Iterator method, returns
/// // Option<Result<ShpRecord, DecodeError>>
/// let record = shp_reader.next().unwrap().unwrap();
/// assert_eq!(1, record.header.record_number);
/// assert_eq!(Geometry::Point { x: 1., y: 2. }, record.geometry);
/// ```
#[derive(Debug)]
pub struct ShpReader<R: io::Read> {
    file: R,
    config: DecodeConfig,
    state: ScanState,
    pub header: ShpHeader,
    pub n_bytes_already_read: usize,
    n_records_already_read: u32,
    skipped: Vec<SkippedRecord>,
}

impl<R: io::Read> ShpReader<R> {
    pub fn new(file: R) -> Result<ShpReader<R>, DecodeError> {
        ShpReader::with_config(file, DecodeConfig::default())
    }

    /// Reads the first 100 bytes of the file.
    ///
    /// Returns Err if they aren't a valid shapefile header.
    pub fn with_config(mut file: R, config: DecodeConfig) -> Result<ShpReader<R>, DecodeError> {
        let buf = read_window(&mut file, SHP_HEADER_LENGTH)?;
        let header = decode_header(&buf)?;
        debug!("Read shapefile header: {}; {}", header, config);

        Ok(ShpReader {
            file: file,
            config: config,
            state: ScanState::Records,
            header: header,
            n_bytes_already_read: SHP_HEADER_LENGTH,
            n_records_already_read: 0,
            skipped: vec![],
        })
    }

    /// Records left out because of `UnsupportedShapeTypePolicy::SkipRecord`.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    fn read_record(&mut self) -> Result<Step, DecodeError> {
        let header_buf = read_window(&mut self.file, SHP_RECORD_HEADER_LENGTH)?;
        if header_buf.is_empty() {
            return Ok(Step::End);
        }
        self.n_bytes_already_read += header_buf.len();

        let record_header = decode_record_header(&header_buf)?;

        let expected_number = self.n_records_already_read + 1;
        if record_header.record_number != expected_number {
            return Err(DecodeError::RecordNumberMismatch { expected: expected_number, found: record_header.record_number });
        }
        self.n_records_already_read = expected_number;

        let declared_len = record_header.content_length_in_bytes();
        let buf = read_window(&mut self.file, declared_len)?;
        self.n_bytes_already_read += buf.len();
        if buf.len() < declared_len {
            return Err(DecodeError::Truncated { needed: declared_len, available: buf.len() });
        }

        let geometry = match decode_geometry(self.header.shape_type, &buf) {
            Ok(geometry) => geometry,
            Err(DecodeError::UnsupportedShapeType(shape_type)) if self.config.on_unsupported_shape_type == UnsupportedShapeTypePolicy::SkipRecord => {
                warn!("Skipping record number {}: unsupported shape type {:?}", record_header.record_number, shape_type);
                self.skipped.push(SkippedRecord { header: record_header, shape_type: shape_type });
                return Ok(Step::Skipped);
            }
            Err(err) => { return Err(err); }
        };

        if self.config.strict_content_length && geometry.encoded_len() != declared_len {
            return Err(DecodeError::ContentLengthMismatch {
                record_number: record_header.record_number,
                declared: declared_len,
                expected: geometry.encoded_len(),
            });
        }

        trace!("Record number {}: {}", record_header.record_number, geometry);
        Ok(Step::Record(ShpRecord { header: record_header, geometry: geometry }))
    }

    fn finish(&self) -> Result<(), DecodeError> {
        debug!("Read {} records ({} skipped), {} bytes", self.n_records_already_read, self.skipped.len(), self.n_bytes_already_read);

        if self.config.check_file_length && self.n_bytes_already_read != self.header.file_length_in_bytes() {
            Err(DecodeError::FileLengthMismatch {
                declared: self.header.file_length_in_bytes(),
                actual: self.n_bytes_already_read,
            })
        } else {
            Ok(())
        }
    }
}

impl<R: io::Read> Iterator for ShpReader<R> {
    type Item = Result<ShpRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.state == ScanState::Records {
            let result = match self.read_record() {
                Ok(Step::Record(record)) => Ok(record),
                Ok(Step::Skipped) => { continue; }
                Ok(Step::End) => {
                    match self.finish() {
                        Ok(()) => {
                            self.state = ScanState::Done;
                            return None;
                        }
                        Err(err) => Err(err),
                    }
                }
                Err(err) => Err(err),
            };

            if result.is_err() {
                self.state = ScanState::Failed;
            }
            return Some(result);
        }

        None
    }
}

/// Reads a whole ".shp" stream.
///
/// All or nothing: on error, the records read so far are dropped.
///
/// # Example
///
/// ```
/// use std::io;
/// use shpcodec::shapefile::{decode_shapefile, encode_shapefile, DecodeConfig, Geometry, ShapeFile, ShapeType};
///
/// let original = ShapeFile::from_geometries(ShapeType::PointM, vec![
///     Geometry::PointM { x: 1., y: 2., m: 3. },
/// ]).unwrap();
///
/// let decoded = decode_shapefile(io::Cursor::new(encode_shapefile(&original)), &DecodeConfig::default()).unwrap();
/// assert_eq!(original, decoded);
/// ```
pub fn decode_shapefile<R: io::Read>(file: R, config: &DecodeConfig) -> Result<ShapeFile, DecodeError> {
    let mut reader = ShpReader::with_config(file, config.clone())?;
    let records = reader.by_ref().collect::<Result<Vec<ShpRecord>, DecodeError>>()?;

    Ok(ShapeFile {
        header: reader.header,
        records: records,
        skipped: reader.skipped,
    })
}

/// Opens a ".shp" file for reading, record by record.
pub fn open(path: &Path, config: &DecodeConfig) -> Result<ShpReader<io::BufReader<fs::File>>, DecodeError> {
    let f = fs::File::open(path)?;
    ShpReader::with_config(io::BufReader::new(f), config.clone())
}

/// Reads a whole ".shp" file. The file is closed before this returns.
pub fn decode_path(path: &Path, config: &DecodeConfig) -> Result<ShapeFile, DecodeError> {
    let f = fs::File::open(path)?;
    decode_shapefile(io::BufReader::new(f), config)
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::io;
    use tempfile;
    use shapefile::error::DecodeError;
    use shapefile::geometry::Geometry;
    use shapefile::header::ShapeType;
    use shapefile::record::RecordHeader;
    use shapefile::writer::encode_shapefile;
    use shapefile::ShapeFile;
    use super::{decode_path, decode_shapefile, open, DecodeConfig, ShpReader, UnsupportedShapeTypePolicy};

    /// A file header followed by (record number, content length, payload)
    /// records. The file length is computed from what follows.
    fn shp_bytes(shape_type: u32, records: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
        let records_len: usize = records.iter().map(|r| 8 + r.2.len()).sum();
        shp_bytes_with_length(shape_type, ((100 + records_len) / 2) as u32, records)
    }

    fn shp_bytes_with_length(shape_type: u32, file_length: u32, records: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
        let mut buf = vec![ 0x00, 0x00, 0x27, 0x0a ];
        buf.extend_from_slice(&[ 0u8; 20 ]);
        buf.extend_from_slice(&file_length.to_be_bytes());
        buf.extend_from_slice(&1000u32.to_le_bytes());
        buf.extend_from_slice(&shape_type.to_le_bytes());
        for &v in &[ 1f64, 2., 1., 2. ] {
            buf.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        for _ in 0..4 {
            buf.extend_from_slice(&f64::MIN.to_bits().to_le_bytes());
        }

        for &(record_number, content_length, ref payload) in records {
            buf.extend_from_slice(&record_number.to_be_bytes());
            buf.extend_from_slice(&content_length.to_be_bytes());
            buf.extend_from_slice(payload);
        }
        buf
    }

    fn point_payload(x: f64, y: f64) -> Vec<u8> {
        let mut buf = 1u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&x.to_bits().to_le_bytes());
        buf.extend_from_slice(&y.to_bits().to_le_bytes());
        buf
    }

    fn polyline_payload() -> Vec<u8> {
        // shape type, bbox, one part, two points
        let mut buf = 3u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&[ 0u8; 32 ]);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&[ 0u8; 32 ]);
        buf
    }

    fn decode(bytes: Vec<u8>, config: &DecodeConfig) -> Result<::shapefile::ShapeFile, DecodeError> {
        decode_shapefile(io::Cursor::new(bytes), config)
    }

    #[test]
    fn one_point() {
        let bytes = shp_bytes(1, &[ (1, 10, point_payload(1., 2.)) ]);
        assert_eq!(128, bytes.len());

        let shape_file = decode(bytes, &DecodeConfig::default()).unwrap();
        assert_eq!(ShapeType::Point, shape_file.header.shape_type);
        assert_eq!(None, shape_file.header.z_min);
        assert_eq!(1, shape_file.records.len());
        assert_eq!(RecordHeader { record_number: 1, content_length: 10 }, shape_file.records[0].header);
        assert_eq!(Geometry::Point { x: 1., y: 2. }, shape_file.records[0].geometry);
        assert!(shape_file.skipped.is_empty());
    }

    #[test]
    fn null_record() {
        let bytes = shp_bytes(1, &[ (1, 2, vec![ 0, 0, 0, 0 ]) ]);
        let shape_file = decode(bytes, &DecodeConfig::default()).unwrap();
        assert_eq!(Geometry::Null, shape_file.records[0].geometry);
    }

    #[test]
    fn no_records() {
        let shape_file = decode(shp_bytes(1, &[]), &DecodeConfig::default()).unwrap();
        assert!(shape_file.records.is_empty());
    }

    #[test]
    fn records_keep_file_order() {
        let bytes = shp_bytes(1, &[
            (1, 10, point_payload(1., 2.)),
            (2, 2, vec![ 0, 0, 0, 0 ]),
            (3, 10, point_payload(3., 4.)),
        ]);
        let shape_file = decode(bytes, &DecodeConfig::default()).unwrap();
        let numbers: Vec<u32> = shape_file.records.iter().map(|r| r.header.record_number).collect();
        assert_eq!(vec![ 1, 2, 3 ], numbers);
        assert_eq!(Geometry::Point { x: 3., y: 4. }, shape_file.records[2].geometry);
    }

    #[test]
    fn unsupported_shape_type_aborts() {
        let bytes = shp_bytes(3, &[ (1, 40, polyline_payload()) ]);
        match decode(bytes, &DecodeConfig::default()) {
            Err(DecodeError::UnsupportedShapeType(ShapeType::PolyLine)) => {},
            other => panic!("expected UnsupportedShapeType, got {:?}", other),
        }
    }

    #[test]
    fn unsupported_shape_type_skips() {
        let bytes = shp_bytes(3, &[
            (1, 40, polyline_payload()),
            (2, 2, vec![ 0, 0, 0, 0 ]),
        ]);
        let config = DecodeConfig::default().on_unsupported_shape_type(UnsupportedShapeTypePolicy::SkipRecord);
        let shape_file = decode(bytes, &config).unwrap();

        assert_eq!(1, shape_file.records.len());
        assert_eq!(2, shape_file.records[0].header.record_number);
        assert_eq!(Geometry::Null, shape_file.records[0].geometry);
        assert_eq!(1, shape_file.skipped.len());
        assert_eq!(1, shape_file.skipped[0].header.record_number);
        assert_eq!(ShapeType::PolyLine, shape_file.skipped[0].shape_type);
    }

    #[test]
    fn unknown_shape_type_aborts_even_when_skipping() {
        let bytes = shp_bytes(1, &[ (1, 2, vec![ 2, 0, 0, 0 ]) ]);
        let config = DecodeConfig::default().on_unsupported_shape_type(UnsupportedShapeTypePolicy::SkipRecord);
        assert!(matches!(decode(bytes, &config), Err(DecodeError::UnknownShapeType(2))));
    }

    #[test]
    fn bad_magic() {
        let mut bytes = shp_bytes(1, &[]);
        bytes[0] = 0xff;
        assert!(matches!(decode(bytes, &DecodeConfig::default()), Err(DecodeError::BadMagic(_))));
    }

    #[test]
    fn truncated_header() {
        let bytes = shp_bytes(1, &[])[..60].to_vec();
        match decode(bytes, &DecodeConfig::default()) {
            Err(DecodeError::Truncated { needed: 100, available: 60 }) => {},
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn truncated_record_header() {
        let mut bytes = shp_bytes(1, &[ (1, 10, point_payload(1., 2.)) ]);
        bytes.extend_from_slice(&[ 0, 0, 0 ]);
        match decode(bytes, &DecodeConfig::default()) {
            Err(DecodeError::Truncated { needed: 8, available: 3 }) => {},
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn truncated_payload() {
        let mut bytes = shp_bytes(1, &[ (1, 10, point_payload(1., 2.)) ]);
        bytes.truncate(120);
        match decode(bytes, &DecodeConfig::default()) {
            Err(DecodeError::Truncated { needed: 20, available: 12 }) => {},
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn huge_content_length_is_truncated() {
        let bytes = shp_bytes(1, &[ (1, 0xffffffff, point_payload(1., 2.)) ]);
        assert!(matches!(decode(bytes, &DecodeConfig::default()), Err(DecodeError::Truncated { available: 20, .. })));
    }

    #[test]
    fn record_number_gap() {
        let bytes = shp_bytes(1, &[
            (1, 10, point_payload(1., 2.)),
            (3, 10, point_payload(3., 4.)),
        ]);
        match decode(bytes, &DecodeConfig::default()) {
            Err(DecodeError::RecordNumberMismatch { expected: 2, found: 3 }) => {},
            other => panic!("expected RecordNumberMismatch, got {:?}", other),
        }
    }

    #[test]
    fn content_length_mismatch() {
        let mut payload = point_payload(1., 2.);
        payload.extend_from_slice(&[ 0, 0, 0, 0 ]);
        let bytes = shp_bytes(1, &[ (1, 12, payload) ]);

        match decode(bytes.clone(), &DecodeConfig::default()) {
            Err(DecodeError::ContentLengthMismatch { record_number: 1, declared: 24, expected: 20 }) => {},
            other => panic!("expected ContentLengthMismatch, got {:?}", other),
        }

        let lenient = DecodeConfig::default().strict_content_length(false);
        let shape_file = decode(bytes, &lenient).unwrap();
        assert_eq!(Geometry::Point { x: 1., y: 2. }, shape_file.records[0].geometry);
    }

    #[test]
    fn file_length_mismatch() {
        let bytes = shp_bytes_with_length(1, 100, &[ (1, 10, point_payload(1., 2.)) ]);
        match decode(bytes.clone(), &DecodeConfig::default()) {
            Err(DecodeError::FileLengthMismatch { declared: 200, actual: 128 }) => {},
            other => panic!("expected FileLengthMismatch, got {:?}", other),
        }

        let lenient = DecodeConfig::default().check_file_length(false);
        assert_eq!(1, decode(bytes, &lenient).unwrap().records.len());
    }

    #[test]
    fn shape_type_mismatch() {
        let bytes = shp_bytes(21, &[ (1, 10, point_payload(1., 2.)) ]);
        assert!(matches!(decode(bytes, &DecodeConfig::default()), Err(DecodeError::ShapeTypeMismatch { .. })));
    }

    #[test]
    fn iterator_stops_after_error() {
        let bytes = shp_bytes(1, &[
            (1, 10, point_payload(1., 2.)),
            (5, 10, point_payload(3., 4.)),
            (3, 10, point_payload(5., 6.)),
        ]);
        let mut reader = ShpReader::new(io::Cursor::new(bytes)).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn reader_lists_skipped_records() {
        let bytes = shp_bytes(3, &[ (1, 40, polyline_payload()) ]);
        let config = DecodeConfig::default().on_unsupported_shape_type(UnsupportedShapeTypePolicy::SkipRecord);
        let mut reader = ShpReader::with_config(io::Cursor::new(bytes), config).unwrap();
        assert!(reader.next().is_none());
        assert_eq!(1, reader.skipped().len());
        assert_eq!(188, reader.n_bytes_already_read);
    }

    struct BrokenReader;

    impl io::Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn io_errors_pass_through() {
        assert!(matches!(decode_shapefile(BrokenReader, &DecodeConfig::default()), Err(DecodeError::IOError(_))));
    }

    #[test]
    fn decode_path_reads_a_file() {
        let shape_file = ShapeFile::from_geometries(ShapeType::PointZ, vec![
            Geometry::PointZ { x: 1., y: 2., z: 3., m: 4. },
            Geometry::Null,
        ]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.shp");
        fs::write(&path, encode_shapefile(&shape_file)).unwrap();

        assert_eq!(shape_file, decode_path(&path, &DecodeConfig::default()).unwrap());

        let mut reader = open(&path, &DecodeConfig::default()).unwrap();
        assert_eq!(ShapeType::PointZ, reader.header.shape_type);
        assert_eq!(Geometry::PointZ { x: 1., y: 2., z: 3., m: 4. }, reader.next().unwrap().unwrap().geometry);
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.shp");
        assert!(matches!(decode_path(&path, &DecodeConfig::default()), Err(DecodeError::IOError(_))));
        assert!(matches!(open(&path, &DecodeConfig::default()), Err(DecodeError::IOError(_))));
    }
}
