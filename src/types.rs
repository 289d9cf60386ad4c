// src/types.rs
use byteorder::{ByteOrder, LittleEndian};
use bytemuck::{Pod, Zeroable};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// TDMS data type enumeration
///
/// The same tag space is used for raw channel data and for property values,
/// but the two supported subsets differ. See [`DataType::raw_element_size`]
/// and [`crate::metadata::read_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataType {
    Void = 0,
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    U8 = 5,
    U16 = 6,
    U32 = 7,
    U64 = 8,
    SingleFloat = 9,
    DoubleFloat = 10,
    ExtendedFloat = 11,
    SingleFloatWithUnit = 0x19,
    DoubleFloatWithUnit = 0x1A,
    ExtendedFloatWithUnit = 0x1B,
    String = 0x20,
    Boolean = 0x21,
    TimeStamp = 0x44,
    ComplexSingleFloat = 0x08000c,
    ComplexDoubleFloat = 0x10000d,
    DAQmxRawData = 0xFFFFFFFF,
}

impl DataType {
    pub const F32: DataType = DataType::SingleFloat;
    pub const F64: DataType = DataType::DoubleFloat;

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(DataType::Void),
            1 => Some(DataType::I8),
            2 => Some(DataType::I16),
            3 => Some(DataType::I32),
            4 => Some(DataType::I64),
            5 => Some(DataType::U8),
            6 => Some(DataType::U16),
            7 => Some(DataType::U32),
            8 => Some(DataType::U64),
            9 => Some(DataType::SingleFloat),
            10 => Some(DataType::DoubleFloat),
            11 => Some(DataType::ExtendedFloat),
            0x19 => Some(DataType::SingleFloatWithUnit),
            0x1A => Some(DataType::DoubleFloatWithUnit),
            0x1B => Some(DataType::ExtendedFloatWithUnit),
            0x20 => Some(DataType::String),
            0x21 => Some(DataType::Boolean),
            0x44 => Some(DataType::TimeStamp),
            0x08000c => Some(DataType::ComplexSingleFloat),
            0x10000d => Some(DataType::ComplexDoubleFloat),
            0xFFFFFFFF => Some(DataType::DAQmxRawData),
            _ => None,
        }
    }

    /// Byte width of one raw data value, or None when the type has no fixed
    /// on-disk width this decoder knows how to size.
    ///
    /// Strings, extended precision floats and DAQmx data fall in the latter
    /// group and are sized as zero by the raw data index decoder.
    pub fn raw_element_size(&self) -> Option<u64> {
        match self {
            DataType::I8 | DataType::U8 | DataType::Boolean => Some(1),
            DataType::I16 | DataType::U16 => Some(2),
            DataType::I32 | DataType::U32 | DataType::SingleFloat | DataType::SingleFloatWithUnit => Some(4),
            DataType::I64 | DataType::U64 | DataType::DoubleFloat | DataType::DoubleFloatWithUnit => Some(8),
            DataType::ComplexSingleFloat => Some(8),
            DataType::TimeStamp | DataType::ComplexDoubleFloat => Some(16),
            DataType::Void
            | DataType::ExtendedFloat
            | DataType::ExtendedFloatWithUnit
            | DataType::String
            | DataType::DAQmxRawData => None,
        }
    }

    /// Check if raw values of this type can be widened to `f64`
    pub fn is_numeric(&self) -> bool {
        matches!(self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64 |
            DataType::U8 | DataType::U16 | DataType::U32 | DataType::U64 |
            DataType::SingleFloat | DataType::DoubleFloat |
            DataType::SingleFloatWithUnit | DataType::DoubleFloatWithUnit
        )
    }

    /// Get the name of the data type as a string
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Void => "void",
            DataType::I8 => "i8",
            DataType::I16 => "i16",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::U8 => "u8",
            DataType::U16 => "u16",
            DataType::U32 => "u32",
            DataType::U64 => "u64",
            DataType::SingleFloat => "f32",
            DataType::DoubleFloat => "f64",
            DataType::ExtendedFloat => "f128",
            DataType::SingleFloatWithUnit => "f32_unit",
            DataType::DoubleFloatWithUnit => "f64_unit",
            DataType::ExtendedFloatWithUnit => "f128_unit",
            DataType::String => "string",
            DataType::Boolean => "bool",
            DataType::TimeStamp => "timestamp",
            DataType::ComplexSingleFloat => "complex_f32",
            DataType::ComplexDoubleFloat => "complex_f64",
            DataType::DAQmxRawData => "daqmx_raw",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Table of Contents flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocFlags(u32);

impl TocFlags {
    pub const METADATA: u32 = 1 << 1;
    pub const NEW_OBJ_LIST: u32 = 1 << 2;
    pub const RAW_DATA: u32 = 1 << 3;
    pub const INTERLEAVED: u32 = 1 << 5;
    pub const BIG_ENDIAN: u32 = 1 << 6;
    pub const DAQMX_RAW_DATA: u32 = 1 << 7;

    pub fn new(flags: u32) -> Self {
        TocFlags(flags)
    }

    pub fn empty() -> Self {
        TocFlags(0)
    }

    pub fn has_metadata(&self) -> bool {
        self.0 & Self::METADATA != 0
    }

    pub fn has_new_obj_list(&self) -> bool {
        self.0 & Self::NEW_OBJ_LIST != 0
    }

    pub fn has_raw_data(&self) -> bool {
        self.0 & Self::RAW_DATA != 0
    }

    pub fn is_interleaved(&self) -> bool {
        self.0 & Self::INTERLEAVED != 0
    }

    pub fn is_big_endian(&self) -> bool {
        self.0 & Self::BIG_ENDIAN != 0
    }

    pub fn has_daqmx_data(&self) -> bool {
        self.0 & Self::DAQMX_RAW_DATA != 0
    }

    pub fn raw_value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TocFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.has_metadata(), "metadata"),
            (self.has_new_obj_list(), "new_obj_list"),
            (self.has_raw_data(), "raw_data"),
            (self.is_interleaved(), "interleaved"),
            (self.is_big_endian(), "big_endian"),
            (self.has_daqmx_data(), "daqmx_raw_data"),
        ];
        write!(f, "{:#x} [", self.0)?;
        let mut first = true;
        for (_, name) in names.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        f.write_str("]")
    }
}

/// LabVIEW timestamp (seconds since 1904-01-01 00:00:00 UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Timestamp {
    /// Fractions of a second (units of 2^-64)
    pub fractions: u64,
    /// Seconds since epoch (1904-01-01)
    pub seconds: i64,
}

impl Timestamp {
    pub const EPOCH_OFFSET_SECONDS: i64 = 2_082_844_800; // 1904 to 1970

    pub fn from_bytes_le(bytes: &[u8; 16]) -> Self {
        let fractions = LittleEndian::read_u64(&bytes[0..8]);
        let seconds = LittleEndian::read_i64(&bytes[8..16]);
        Timestamp { seconds, fractions }
    }

    /// An all-zero timestamp is how writers leave a time unset.
    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.fractions == 0
    }

    /// Seconds and nanoseconds relative to the Unix epoch.
    ///
    /// A zero timestamp maps to the Unix epoch itself rather than to 1904.
    /// `None` when the seconds field is too far before 1904 to shift.
    pub fn to_unix(&self) -> Option<(i64, u32)> {
        if self.is_zero() {
            return Some((0, 0));
        }
        let nanos = ((self.fractions as u128 * 1_000_000_000) >> 64) as u32;
        let secs = self.seconds.checked_sub(Self::EPOCH_OFFSET_SECONDS)?;
        Some((secs, nanos))
    }

    pub fn to_date_time(&self) -> Option<DateTime<Utc>> {
        let (secs, nanos) = self.to_unix()?;
        DateTime::from_timestamp(secs, nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_date_time() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => write!(f, "LabVIEW({}s + {}/2^64)", self.seconds, self.fractions),
        }
    }
}

/// Decoded property value.
///
/// Only the property types the metadata decoder accepts have a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    I32(i32),
    U32(u32),
    U64(u64),
    Double(f64),
    String(String),
    Timestamp(Timestamp),
}

impl PropertyValue {
    pub fn data_type(&self) -> DataType {
        match self {
            PropertyValue::I32(_) => DataType::I32,
            PropertyValue::U32(_) => DataType::U32,
            PropertyValue::U64(_) => DataType::U64,
            PropertyValue::Double(_) => DataType::DoubleFloat,
            PropertyValue::String(_) => DataType::String,
            PropertyValue::Timestamp(_) => DataType::TimeStamp,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::I32(v) => write!(f, "{}", v),
            PropertyValue::U32(v) => write!(f, "{}", v),
            PropertyValue::U64(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => f.write_str(&scientific(*v)),
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}

/// Six-digit scientific notation with a signed, at least two-digit
/// exponent (`1.500000e+00`).
fn scientific(value: f64) -> String {
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        // inf and NaN carry no exponent
        None => formatted,
    }
}

/// A property attached to an object in one segment's metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub data_type: DataType,
    /// Absolute file offset where the typed value starts, just after the type tag
    pub value_position: u64,
    pub value: PropertyValue,
}

impl Property {
    /// The value rendered as display text
    pub fn string_value(&self) -> String {
        self.value.to_string()
    }
}
