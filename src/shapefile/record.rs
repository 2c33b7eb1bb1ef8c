use super::byte_order::{read_be_u32, write_be_u32};
use super::error::DecodeError;

pub const SHP_RECORD_HEADER_LENGTH: usize = 8;

/// The 8 bytes before each geometry.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct RecordHeader {
    /// 1-based position in the file.
    pub record_number: u32,
    /// Size of the geometry that follows, in 16-bit words. It does not count
    /// this header.
    pub content_length: u32,
}

impl RecordHeader {
    /// Saturates where `usize` is too small, so the read comes up short.
    pub fn content_length_in_bytes(&self) -> usize {
        (self.content_length as usize).saturating_mul(2)
    }
}

pub fn decode_record_header(buf: &[u8]) -> Result<RecordHeader, DecodeError> {
    if buf.len() < SHP_RECORD_HEADER_LENGTH {
        return Err(DecodeError::Truncated { needed: SHP_RECORD_HEADER_LENGTH, available: buf.len() });
    }

    Ok(RecordHeader {
        record_number: read_be_u32(&buf[0..4]),
        content_length: read_be_u32(&buf[4..8]),
    })
}

pub fn encode_record_header(header: &RecordHeader) -> [u8; SHP_RECORD_HEADER_LENGTH] {
    let mut buf = [ 0u8; SHP_RECORD_HEADER_LENGTH ];
    write_be_u32(&mut buf[0..4], header.record_number);
    write_be_u32(&mut buf[4..8], header.content_length);
    buf
}
