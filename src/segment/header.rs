use crate::error::{TdmsError, Result};
use crate::raw_data::{RawDataReader, ReadSeek};
use crate::types::TocFlags;

/// TDMS segment lead-in information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Absolute offset of the segment's `TDSm` tag
    pub offset: u64,
    pub toc: TocFlags,
    pub version: u32,
    /// Length of everything after the lead-in, as written
    pub segment_length: u64,
    pub metadata_length: u64,
    pub next_segment_offset: u64,
    pub raw_data_offset: u64,
    /// The segment was not finalized or runs past end of file
    pub incomplete: bool,
}

impl SegmentHeader {
    pub const LEAD_IN_SIZE: usize = 28;
    pub const TDMS_TAG: &'static [u8; 4] = b"TDSm";
    pub const VERSION: u32 = 4713;
    pub const INCOMPLETE_MARKER: u64 = 0xFFFFFFFFFFFFFFFF;

    /// Read the 28-byte lead-in at the reader's position.
    ///
    /// `file_size` bounds the next segment offset: an unfinalized segment
    /// length, or one that points past the end, is clamped to end of file.
    pub fn read<R: ReadSeek>(reader: &mut R, file_size: u64) -> Result<Self> {
        let offset = reader.stream_position()?;

        let tag = RawDataReader::read_bytes4(reader, "segment tag")?;
        if &tag != Self::TDMS_TAG {
            return Err(TdmsError::InvalidTag {
                offset,
                found: String::from_utf8_lossy(&tag).into_owned(),
            });
        }

        let toc = TocFlags::new(RawDataReader::read_u32(reader)?);
        let version = RawDataReader::read_u32(reader)?;
        let segment_length = RawDataReader::read_u64(reader)?;
        let metadata_length = RawDataReader::read_u64(reader)?;

        log::debug!(
            "Segment at {}: toc={} version={} segment_length={} metadata_length={}",
            offset, toc, version, segment_length, metadata_length
        );

        let data_start = offset + Self::LEAD_IN_SIZE as u64;
        let (next_segment_offset, incomplete) = if segment_length == Self::INCOMPLETE_MARKER {
            log::warn!("Segment at {} was not finalized, reading up to end of file", offset);
            (file_size, true)
        } else {
            match data_start.checked_add(segment_length) {
                Some(next) if next <= file_size => (next, false),
                _ => {
                    log::warn!(
                        "Segment at {} declares {} bytes but the file ends at {}, clamping",
                        offset, segment_length, file_size
                    );
                    (file_size, true)
                }
            }
        };

        Ok(SegmentHeader {
            offset,
            toc,
            version,
            segment_length,
            metadata_length,
            next_segment_offset,
            raw_data_offset: data_start.saturating_add(metadata_length),
            incomplete,
        })
    }

    /// Bytes between the start of raw data and the next segment
    pub fn raw_data_span(&self) -> u64 {
        self.next_segment_offset.saturating_sub(self.raw_data_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lead_in(tag: &[u8; 4], toc: u32, segment_length: u64, metadata_length: u64) -> Vec<u8> {
        let mut data = tag.to_vec();
        data.extend_from_slice(&toc.to_le_bytes());
        data.extend_from_slice(&SegmentHeader::VERSION.to_le_bytes());
        data.extend_from_slice(&segment_length.to_le_bytes());
        data.extend_from_slice(&metadata_length.to_le_bytes());
        data
    }

    #[test]
    fn test_segment_header_constants() {
        assert_eq!(SegmentHeader::LEAD_IN_SIZE, 28);
        assert_eq!(SegmentHeader::TDMS_TAG, b"TDSm");
        assert_eq!(SegmentHeader::INCOMPLETE_MARKER, u64::MAX);
    }

    #[test]
    fn test_offsets_are_absolute() {
        let mut data = vec![0u8; 10];
        data.extend(lead_in(b"TDSm", 0x0E, 100, 40));
        data.resize(10 + 28 + 100, 0);
        let mut cursor = Cursor::new(data);
        cursor.set_position(10);

        let header = SegmentHeader::read(&mut cursor, 138).unwrap();
        assert_eq!(cursor.position(), 38);
        assert_eq!(header.offset, 10);
        assert_eq!(header.version, 4713);
        assert_eq!(header.next_segment_offset, 138);
        assert_eq!(header.raw_data_offset, 78);
        assert_eq!(header.raw_data_span(), 60);
        assert!(!header.incomplete);
    }

    #[test]
    fn test_bad_tag() {
        let mut cursor = Cursor::new(lead_in(b"TDSh", 0, 0, 0));
        match SegmentHeader::read(&mut cursor, 28) {
            Err(TdmsError::InvalidTag { offset, found }) => {
                assert_eq!(offset, 0);
                assert_eq!(found, "TDSh");
            }
            other => panic!("expected InvalidTag, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_marker_clamps_to_eof() {
        let mut data = lead_in(b"TDSm", 0x0A, SegmentHeader::INCOMPLETE_MARKER, 20);
        data.resize(90, 0);
        let mut cursor = Cursor::new(data);
        let header = SegmentHeader::read(&mut cursor, 90).unwrap();
        assert_eq!(header.next_segment_offset, 90);
        assert_eq!(header.raw_data_offset, 48);
        assert!(header.incomplete);
    }

    #[test]
    fn test_length_past_eof_is_clamped() {
        let mut data = lead_in(b"TDSm", 0x0A, 1000, 0);
        data.resize(60, 0);
        let mut cursor = Cursor::new(data);
        let header = SegmentHeader::read(&mut cursor, 60).unwrap();
        assert_eq!(header.next_segment_offset, 60);
        assert!(header.incomplete);
    }

    #[test]
    fn test_short_lead_in_is_truncated() {
        let mut cursor = Cursor::new(lead_in(b"TDSm", 0, 0, 0)[..16].to_vec());
        assert!(matches!(
            SegmentHeader::read(&mut cursor, 16),
            Err(TdmsError::Truncated { offset: 12, .. })
        ));
    }
}
