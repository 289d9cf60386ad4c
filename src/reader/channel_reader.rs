// src/reader/channel_reader.rs
use crate::error::{TdmsError, Result};
use crate::raw_data::{ChannelValue, RawDataReader, ReadSeek};
use crate::segment::Segment;
use crate::types::{DataType, Property, Timestamp};
use std::collections::HashMap;
use std::io::SeekFrom;

/// Location of one chunk's worth of a channel's values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentData {
    pub segment_index: usize,
    pub chunk_index: u64,
    pub data_type: DataType,
    pub value_count: u64,
    /// Absolute file offset of the first value
    pub data_offset: u64,
    pub interleaved: bool,
}

/// Interface for reading data from a specific channel
///
/// Built from the decoded segment list; holds no file handle, so the same
/// reader can be used with any stream over the same file.
#[derive(Debug, Clone)]
pub struct ChannelReader {
    path: String,
    segments: Vec<SegmentData>,
    total_values: u64,
}

impl ChannelReader {
    /// Locate every chunk of `path`'s raw data across `segments`.
    pub fn new(path: &str, segments: &[Segment]) -> Result<Self> {
        if !segments.iter().any(|s| s.objects().contains_key(path)) {
            return Err(TdmsError::ChannelNotFound(path.to_string()));
        }

        let mut data = Vec::new();
        let mut total_values = 0u64;
        for segment in segments {
            let Some(obj) = segment.objects().get(path) else { continue };
            if !obj.has_data() || obj.index.number_of_values == 0 {
                continue;
            }
            let Some(offset_in_chunk) = segment.offset_in_chunk(path) else { continue };

            for chunk_index in 0..segment.num_chunks() {
                data.push(SegmentData {
                    segment_index: segment.index,
                    chunk_index,
                    data_type: obj.index.data_type,
                    value_count: obj.index.number_of_values,
                    data_offset: segment.raw_data_offset()
                        + chunk_index * segment.chunks.chunk_size
                        + offset_in_chunk,
                    interleaved: segment.toc().is_interleaved(),
                });
                total_values += obj.index.number_of_values;
            }
        }

        Ok(ChannelReader {
            path: path.to_string(),
            segments: data,
            total_values,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Data type of the most recent segment carrying values
    pub fn data_type(&self) -> Option<DataType> {
        self.segments.last().map(|s| s.data_type)
    }

    /// Get the total number of values across all segments
    pub fn total_values(&self) -> u64 {
        self.total_values
    }

    pub fn chunks(&self) -> &[SegmentData] {
        &self.segments
    }

    /// Read every value of the channel as `T`
    pub fn read_all_data<T: ChannelValue, R: ReadSeek>(&self, reader: &mut R) -> Result<Vec<T>> {
        self.read_matching(reader, |_| true)
    }

    /// Read the channel's values stored in one segment (all of its chunks)
    pub fn read_segment_data<T: ChannelValue, R: ReadSeek>(
        &self,
        reader: &mut R,
        segment_index: usize,
    ) -> Result<Vec<T>> {
        self.read_matching(reader, |s| s.segment_index == segment_index)
    }

    /// Read every value widened to `f64`
    pub fn read_all_f64<R: ReadSeek>(&self, reader: &mut R) -> Result<Vec<f64>> {
        self.read_matching_f64(reader, |_| true)
    }

    /// Read one segment's values widened to `f64`
    pub fn read_segment_f64<R: ReadSeek>(&self, reader: &mut R, segment_index: usize) -> Result<Vec<f64>> {
        self.read_matching_f64(reader, |s| s.segment_index == segment_index)
    }

    fn read_matching<T: ChannelValue, R: ReadSeek>(
        &self,
        reader: &mut R,
        filter: impl Fn(&SegmentData) -> bool,
    ) -> Result<Vec<T>> {
        let mut result = Vec::new();
        for segment_data in self.segments.iter().filter(|s| filter(*s)) {
            if !T::DATA_TYPES.contains(&segment_data.data_type) {
                return Err(TdmsError::TypeMismatch {
                    expected: T::DATA_TYPES[0].name().to_string(),
                    found: segment_data.data_type.name().to_string(),
                });
            }
            result.extend(read_chunk::<T, R>(reader, segment_data)?);
        }
        Ok(result)
    }

    fn read_matching_f64<R: ReadSeek>(
        &self,
        reader: &mut R,
        filter: impl Fn(&SegmentData) -> bool,
    ) -> Result<Vec<f64>> {
        let mut result = Vec::new();
        for segment_data in self.segments.iter().filter(|s| filter(*s)) {
            match segment_data.data_type {
                DataType::I8 => widen::<i8, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::I16 => widen::<i16, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::I32 => widen::<i32, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::I64 => widen::<i64, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::U8 => widen::<u8, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::U16 => widen::<u16, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::U32 => widen::<u32, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::U64 => widen::<u64, R>(reader, segment_data, &mut result, |v| v as f64)?,
                DataType::SingleFloat | DataType::SingleFloatWithUnit => {
                    widen::<f32, R>(reader, segment_data, &mut result, |v| v as f64)?
                }
                DataType::DoubleFloat | DataType::DoubleFloatWithUnit => {
                    widen::<f64, R>(reader, segment_data, &mut result, |v| v)?
                }
                other => {
                    return Err(TdmsError::TypeMismatch {
                        expected: "numeric".to_string(),
                        found: other.name().to_string(),
                    })
                }
            }
        }
        Ok(result)
    }
}

fn read_chunk<T: ChannelValue, R: ReadSeek>(reader: &mut R, segment_data: &SegmentData) -> Result<Vec<T>> {
    if segment_data.interleaved {
        return Err(TdmsError::Unsupported(format!(
            "interleaved raw data in segment {}", segment_data.segment_index
        )));
    }
    let count = usize::try_from(segment_data.value_count).map_err(|_| {
        TdmsError::Unsupported("Channel has more values than can fit in memory".to_string())
    })?;
    RawDataReader::read_values_at(reader, count, SeekFrom::Start(segment_data.data_offset))
}

fn widen<T: ChannelValue, R: ReadSeek>(
    reader: &mut R,
    segment_data: &SegmentData,
    out: &mut Vec<f64>,
    convert: fn(T) -> f64,
) -> Result<()> {
    out.extend(read_chunk::<T, R>(reader, segment_data)?.into_iter().map(convert));
    Ok(())
}

/// Waveform timing attributes of a channel, re-read from the file
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformTiming {
    pub increment: f64,
    pub samples: i32,
    pub start_time: Timestamp,
    pub start_offset: f64,
}

impl WaveformTiming {
    pub const INCREMENT: &'static str = "wf_increment";
    pub const SAMPLES: &'static str = "wf_samples";
    pub const START_TIME: &'static str = "wf_start_time";
    pub const START_OFFSET: &'static str = "wf_start_offset";

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.increment
    }

    /// Read the four `wf_*` properties back from their value positions.
    ///
    /// Returns `Ok(None)` unless all four are present.
    pub fn read<R: ReadSeek>(reader: &mut R, properties: &HashMap<String, Property>) -> Result<Option<Self>> {
        let (Some(increment), Some(samples), Some(start_time), Some(start_offset)) = (
            properties.get(Self::INCREMENT),
            properties.get(Self::SAMPLES),
            properties.get(Self::START_TIME),
            properties.get(Self::START_OFFSET),
        ) else {
            return Ok(None);
        };

        Ok(Some(WaveformTiming {
            increment: reread(reader, increment, DataType::DoubleFloat, RawDataReader::read_f64)?,
            samples: reread(reader, samples, DataType::I32, RawDataReader::read_i32)?,
            start_time: reread(reader, start_time, DataType::TimeStamp, RawDataReader::read_timestamp)?,
            start_offset: reread(reader, start_offset, DataType::DoubleFloat, RawDataReader::read_f64)?,
        }))
    }
}

fn reread<T, R: ReadSeek>(
    reader: &mut R,
    property: &Property,
    expected: DataType,
    read: fn(&mut R) -> Result<T>,
) -> Result<T> {
    if property.data_type != expected {
        return Err(TdmsError::TypeMismatch {
            expected: format!("{} for {}", expected.name(), property.name),
            found: property.data_type.name().to_string(),
        });
    }
    RawDataReader::seek(reader, SeekFrom::Start(property.value_position))?;
    read(reader)
}
