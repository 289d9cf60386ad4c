use crate::error::{TdmsError, Result};
use crate::raw_data::{RawDataReader, ReadSeek};
use crate::types::{DataType, Property, PropertyValue};

/// Read one property: name, type tag, then the typed value.
///
/// The offset just after the type tag is kept on the returned property so
/// callers can seek back and re-read the value bytes themselves.
pub fn read_property<R: ReadSeek>(reader: &mut R) -> Result<Property> {
    let name = RawDataReader::read_string(reader)?;
    let type_offset = reader.stream_position()?;
    let code = RawDataReader::read_u32(reader)?;
    let value_position = type_offset + 4;

    let unknown = |data_type: String| TdmsError::UnknownPropertyType { offset: type_offset, data_type };
    let data_type = DataType::from_u32(code).ok_or_else(|| unknown(format!("{:#x}", code)))?;

    let value = match data_type {
        DataType::String => PropertyValue::String(RawDataReader::read_string(reader)?),
        DataType::I32 => PropertyValue::I32(RawDataReader::read_i32(reader)?),
        DataType::U32 => PropertyValue::U32(RawDataReader::read_u32(reader)?),
        DataType::U64 => PropertyValue::U64(RawDataReader::read_u64(reader)?),
        DataType::DoubleFloat => PropertyValue::Double(RawDataReader::read_f64(reader)?),
        DataType::TimeStamp => PropertyValue::Timestamp(RawDataReader::read_timestamp(reader)?),
        DataType::Void
        | DataType::I8
        | DataType::I16
        | DataType::I64
        | DataType::U8
        | DataType::U16
        | DataType::SingleFloat
        | DataType::ExtendedFloat
        | DataType::SingleFloatWithUnit
        | DataType::DoubleFloatWithUnit
        | DataType::ExtendedFloatWithUnit
        | DataType::Boolean
        | DataType::ComplexSingleFloat
        | DataType::ComplexDoubleFloat
        | DataType::DAQmxRawData => return Err(unknown(data_type.name().to_string())),
    };

    log::trace!("Property {} ({}) = {}", name, data_type, value);

    Ok(Property {
        name,
        data_type,
        value_position,
        value,
    })
}
