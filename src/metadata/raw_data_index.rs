use crate::error::{TdmsError, Result};
use crate::raw_data::{RawDataReader, ReadSeek};
use crate::types::DataType;
use byteorder::{ByteOrder, LittleEndian};

/// The 4-byte header written in front of every object's raw data index.
///
/// Two byte patterns are control markers; anything else announces an
/// explicit index and is kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDataIndexHeader {
    /// `FF FF FF FF`: the object has no raw data in this segment
    NoData,
    /// `00 00 00 00`: reuse the index the object had before
    MatchesPrevious,
    /// An explicit raw data index follows
    Explicit([u8; 4]),
}

impl RawDataIndexHeader {
    pub const NO_RAW_DATA: [u8; 4] = [0xFF; 4];
    pub const MATCHES_PREVIOUS: [u8; 4] = [0x00; 4];
    pub const DAQMX_FORMAT_CHANGING_SCALER: u32 = 0x00001269;
    pub const DAQMX_DIGITAL_LINE_SCALER: u32 = 0x0000126A;

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        match bytes {
            Self::NO_RAW_DATA => RawDataIndexHeader::NoData,
            Self::MATCHES_PREVIOUS => RawDataIndexHeader::MatchesPrevious,
            other => RawDataIndexHeader::Explicit(other),
        }
    }

    /// Read and classify a header. DAQmx scaler headers are rejected since
    /// their index layout is not decoded.
    pub fn read<R: ReadSeek>(reader: &mut R) -> Result<Self> {
        let offset = reader.stream_position()?;
        let bytes = RawDataReader::read_bytes4(reader, "raw data index header")?;
        let header = Self::from_bytes(bytes);
        if let RawDataIndexHeader::Explicit(raw) = header {
            let value = LittleEndian::read_u32(&raw);
            if value == Self::DAQMX_FORMAT_CHANGING_SCALER || value == Self::DAQMX_DIGITAL_LINE_SCALER {
                return Err(TdmsError::Unsupported(format!(
                    "DAQmx raw data index {:#010x} at offset {}", value, offset
                )));
            }
        }
        Ok(header)
    }

    pub fn has_data(&self) -> bool {
        !matches!(self, RawDataIndexHeader::NoData)
    }
}

/// Raw data index information for one object in one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDataIndex {
    pub data_type: DataType,
    pub array_dimension: u32,
    pub number_of_values: u64,
    /// Bytes of raw data this object contributes to one chunk
    pub raw_data_size: u64,
}

impl Default for RawDataIndex {
    fn default() -> Self {
        RawDataIndex {
            data_type: DataType::Void,
            array_dimension: 0,
            number_of_values: 0,
            raw_data_size: 0,
        }
    }
}

impl RawDataIndex {
    /// Decode the explicit index fields that follow an `Explicit` header.
    ///
    /// Layout: data type (u32), array dimension (u32, must be 1), number of
    /// values (u64), and for strings only the total byte size (u64).
    pub fn read<R: ReadSeek>(reader: &mut R) -> Result<Self> {
        let type_offset = reader.stream_position()?;
        let code = RawDataReader::read_u32(reader)?;
        let data_type = DataType::from_u32(code)
            .ok_or(TdmsError::InvalidDataType { offset: type_offset, code })?;

        let dimension_offset = type_offset + 4;
        let array_dimension = RawDataReader::read_u32(reader)?;
        if array_dimension != 1 {
            return Err(TdmsError::InvalidDimension { offset: dimension_offset, dimension: array_dimension });
        }

        let number_of_values = RawDataReader::read_u64(reader)?;

        let raw_data_size = if data_type == DataType::String {
            RawDataReader::read_u64(reader)?
        } else {
            match data_type.raw_element_size() {
                Some(width) => width
                    .checked_mul(array_dimension as u64)
                    .and_then(|size| size.checked_mul(number_of_values))
                    .ok_or_else(|| TdmsError::SizeOverflow {
                        offset: type_offset,
                        data_type: data_type.name().to_string(),
                        number_of_values,
                    })?,
                None => {
                    log::debug!("No raw size known for {} data at offset {}, sizing as zero", data_type, type_offset);
                    0
                }
            }
        };

        log::trace!(
            "Raw data index: type={} dimension={} values={} size={}",
            data_type, array_dimension, number_of_values, raw_data_size
        );

        Ok(RawDataIndex {
            data_type,
            array_dimension,
            number_of_values,
            raw_data_size,
        })
    }
}

/// An object's raw data header paired with its resolved index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentObject {
    pub header: RawDataIndexHeader,
    pub index: RawDataIndex,
}

impl SegmentObject {
    pub fn new(header: RawDataIndexHeader, index: RawDataIndex) -> Self {
        SegmentObject { header, index }
    }

    pub fn no_data() -> Self {
        SegmentObject::new(RawDataIndexHeader::NoData, RawDataIndex::default())
    }

    pub fn has_data(&self) -> bool {
        self.header.has_data()
    }
}
