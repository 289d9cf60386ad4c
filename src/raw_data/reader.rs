// src/raw_data/reader.rs
use crate::error::{TdmsError, Result};
use crate::types::Timestamp;
use byteorder::{ByteOrder, LittleEndian};
use bytemuck::Pod;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Trait alias for Read + Seek
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Fixed-width scalar that can be bulk-read from little-endian raw data.
///
/// `DATA_TYPES` lists the on-disk types whose bytes are laid out exactly
/// like `Self`.
pub trait ChannelValue: Pod + Default {
    const DATA_TYPES: &'static [crate::types::DataType];

    fn from_le_value(self) -> Self;
}

macro_rules! impl_channel_value {
    ($ty:ty, [$($dt:ident),+], $conv:expr) => {
        impl ChannelValue for $ty {
            const DATA_TYPES: &'static [crate::types::DataType] = &[$(crate::types::DataType::$dt),+];

            #[inline]
            fn from_le_value(self) -> Self {
                let conv: fn($ty) -> $ty = $conv;
                conv(self)
            }
        }
    };
}

impl_channel_value!(i8, [I8], |v| v);
impl_channel_value!(u8, [U8, Boolean], |v| v);
impl_channel_value!(i16, [I16], i16::from_le);
impl_channel_value!(u16, [U16], u16::from_le);
impl_channel_value!(i32, [I32], i32::from_le);
impl_channel_value!(u32, [U32], u32::from_le);
impl_channel_value!(i64, [I64], i64::from_le);
impl_channel_value!(u64, [U64], u64::from_le);
impl_channel_value!(f32, [SingleFloat, SingleFloatWithUnit], |v| f32::from_bits(u32::from_le(v.to_bits())));
impl_channel_value!(f64, [DoubleFloat, DoubleFloatWithUnit], |v| f64::from_bits(u64::from_le(v.to_bits())));

/// Stateless readers for the little-endian primitives TDMS is built from.
///
/// Every read advances the stream by exactly the bytes it consumes. A read
/// that runs off the end of the stream fails with [`TdmsError::Truncated`]
/// carrying the offset the read started at.
pub struct RawDataReader;

impl RawDataReader {
    /// Reposition the stream, returning the new absolute offset.
    ///
    /// `SeekFrom::Start`, `SeekFrom::Current` and `SeekFrom::End` select the
    /// file start, the current position and the end of file as origin.
    pub fn seek<R: Seek>(reader: &mut R, pos: SeekFrom) -> Result<u64> {
        Ok(reader.seek(pos)?)
    }

    fn fill<R: ReadSeek>(reader: &mut R, buf: &mut [u8], context: &'static str) -> Result<()> {
        let offset = reader.stream_position()?;
        reader.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => TdmsError::Truncated { offset, context },
            _ => TdmsError::Io(e),
        })
    }

    /// Read a 4-byte tag or header verbatim
    pub fn read_bytes4<R: ReadSeek>(reader: &mut R, context: &'static str) -> Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        Self::fill(reader, &mut buf, context)?;
        Ok(buf)
    }

    /// Read a single u32 value
    pub fn read_u32<R: ReadSeek>(reader: &mut R) -> Result<u32> {
        let mut buf = [0u8; 4];
        Self::fill(reader, &mut buf, "u32")?;
        Ok(LittleEndian::read_u32(&buf))
    }

    /// Read a single i32 value
    pub fn read_i32<R: ReadSeek>(reader: &mut R) -> Result<i32> {
        let mut buf = [0u8; 4];
        Self::fill(reader, &mut buf, "i32")?;
        Ok(LittleEndian::read_i32(&buf))
    }

    /// Read a single u64 value
    pub fn read_u64<R: ReadSeek>(reader: &mut R) -> Result<u64> {
        let mut buf = [0u8; 8];
        Self::fill(reader, &mut buf, "u64")?;
        Ok(LittleEndian::read_u64(&buf))
    }

    /// Read a single i64 value
    pub fn read_i64<R: ReadSeek>(reader: &mut R) -> Result<i64> {
        let mut buf = [0u8; 8];
        Self::fill(reader, &mut buf, "i64")?;
        Ok(LittleEndian::read_i64(&buf))
    }

    /// Read a single f32 value
    pub fn read_f32<R: ReadSeek>(reader: &mut R) -> Result<f32> {
        let mut buf = [0u8; 4];
        Self::fill(reader, &mut buf, "f32")?;
        Ok(LittleEndian::read_f32(&buf))
    }

    /// Read a single f64 value
    pub fn read_f64<R: ReadSeek>(reader: &mut R) -> Result<f64> {
        let mut buf = [0u8; 8];
        Self::fill(reader, &mut buf, "f64")?;
        Ok(LittleEndian::read_f64(&buf))
    }

    /// Read a length-prefixed string.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub fn read_string<R: ReadSeek>(reader: &mut R) -> Result<String> {
        let length = Self::read_u32(reader)?;
        if length == 0 {
            return Ok(String::new());
        }
        let mut bytes = vec![0u8; length as usize];
        Self::fill(reader, &mut bytes, "string")?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    /// Read a LabVIEW timestamp (16 bytes: u64 fractions then i64 seconds)
    pub fn read_timestamp<R: ReadSeek>(reader: &mut R) -> Result<Timestamp> {
        let mut bytes = [0u8; 16];
        Self::fill(reader, &mut bytes, "timestamp")?;
        Ok(Timestamp::from_bytes_le(&bytes))
    }

    /// Read `count` consecutive values from the current position
    ///
    /// # Example
    ///
    /// ```
    /// use tdms_walk::raw_data::RawDataReader;
    /// use std::io::Cursor;
    ///
    /// let data = vec![1u8, 0, 0, 0, 2, 0, 0, 0];
    /// let mut cursor = Cursor::new(data);
    ///
    /// let values: Vec<i32> = RawDataReader::read_values(&mut cursor, 2).unwrap();
    /// assert_eq!(values, vec![1, 2]);
    /// ```
    pub fn read_values<T: ChannelValue, R: ReadSeek>(reader: &mut R, count: usize) -> Result<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut result = vec![T::default(); count];
        Self::fill(reader, bytemuck::cast_slice_mut(result.as_mut_slice()), "value array")?;
        if cfg!(target_endian = "big") {
            for value in result.iter_mut() {
                *value = value.from_le_value();
            }
        }
        Ok(result)
    }

    /// Seek to `pos` and read `count` consecutive values from there
    pub fn read_values_at<T: ChannelValue, R: ReadSeek>(
        reader: &mut R,
        count: usize,
        pos: SeekFrom,
    ) -> Result<Vec<T>> {
        Self::seek(reader, pos)?;
        Self::read_values(reader, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_u32_one() {
        let mut cursor = Cursor::new(vec![0x01u8, 0, 0, 0]);
        assert_eq!(RawDataReader::read_u32(&mut cursor).unwrap(), 1);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_read_f64_one() {
        let mut cursor = Cursor::new(1.0f64.to_le_bytes().to_vec());
        assert_eq!(RawDataReader::read_f64(&mut cursor).unwrap(), 1.0);
    }

    #[test]
    fn test_read_signed_values() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-2i32).to_le_bytes());
        data.extend_from_slice(&(-3i64).to_le_bytes());
        data.extend_from_slice(&0.5f32.to_le_bytes());
        let mut cursor = Cursor::new(data);
        assert_eq!(RawDataReader::read_i32(&mut cursor).unwrap(), -2);
        assert_eq!(RawDataReader::read_i64(&mut cursor).unwrap(), -3);
        assert_eq!(RawDataReader::read_f32(&mut cursor).unwrap(), 0.5);
    }

    #[test]
    fn test_read_string() {
        let mut data = vec![5u8, 0, 0, 0];
        data.extend_from_slice(b"Hello");
        data.extend_from_slice(&[0, 0, 0, 0]);
        let mut cursor = Cursor::new(data);
        assert_eq!(RawDataReader::read_string(&mut cursor).unwrap(), "Hello");
        assert_eq!(RawDataReader::read_string(&mut cursor).unwrap(), "");
    }

    #[test]
    fn test_read_string_with_invalid_utf8_is_lossy() {
        let data = vec![2u8, 0, 0, 0, 0xff, b'a'];
        let mut cursor = Cursor::new(data);
        assert_eq!(RawDataReader::read_string(&mut cursor).unwrap(), "\u{fffd}a");
    }

    #[test]
    fn test_short_read_reports_offset() {
        let mut cursor = Cursor::new(vec![0u8; 6]);
        RawDataReader::read_u32(&mut cursor).unwrap();
        match RawDataReader::read_u32(&mut cursor) {
            Err(TdmsError::Truncated { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_string_body() {
        let mut cursor = Cursor::new(vec![10u8, 0, 0, 0, b'a', b'b']);
        assert!(matches!(
            RawDataReader::read_string(&mut cursor),
            Err(TdmsError::Truncated { offset: 4, context: "string" })
        ));
    }

    #[test]
    fn test_read_timestamp() {
        let mut data = Vec::new();
        data.extend_from_slice(&(1u64 << 63).to_le_bytes());
        data.extend_from_slice(&3_000_000_000i64.to_le_bytes());
        let mut cursor = Cursor::new(data);
        let ts = RawDataReader::read_timestamp(&mut cursor).unwrap();
        assert_eq!(ts.seconds, 3_000_000_000);
        assert_eq!(ts.fractions, 1u64 << 63);
    }

    #[test]
    fn test_read_values_at_offset() {
        let mut data = vec![0xAAu8; 3];
        for v in [1.5f64, -2.25, 4.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut cursor = Cursor::new(data);
        let values: Vec<f64> = RawDataReader::read_values_at(&mut cursor, 3, SeekFrom::Start(3)).unwrap();
        assert_eq!(values, vec![1.5, -2.25, 4.0]);

        let tail: Vec<f64> = RawDataReader::read_values_at(&mut cursor, 1, SeekFrom::End(-8)).unwrap();
        assert_eq!(tail, vec![4.0]);
    }

    #[test]
    fn test_read_zero_count() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let values: Vec<i32> = RawDataReader::read_values(&mut cursor, 0).unwrap();
        assert!(values.is_empty());
        assert_eq!(cursor.position(), 0);
    }
}
