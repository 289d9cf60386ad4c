use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TdmsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid TDMS tag at offset {offset}: expected TDSm, found {found:?}")]
    InvalidTag { offset: u64, found: String },

    #[error("Unexpected end of file at offset {offset} while reading {context}")]
    Truncated { offset: u64, context: &'static str },

    #[error("Invalid raw data type {code:#x} at offset {offset}")]
    InvalidDataType { offset: u64, code: u32 },

    #[error("Property data type unknown at offset {offset}: {data_type}")]
    UnknownPropertyType { offset: u64, data_type: String },

    #[error("Invalid array dimension {dimension} at offset {offset} (only 1 is supported)")]
    InvalidDimension { offset: u64, dimension: u32 },

    #[error("Raw data size of {number_of_values} {data_type} values at offset {offset} does not fit in 64 bits")]
    SizeOverflow { offset: u64, data_type: String, number_of_values: u64 },

    #[error("Raw data index of {path} at offset {offset} matches previous, but the object was never seen before")]
    MatchesPreviousOnUnknownObject { offset: u64, path: String },

    #[error("Segment at offset {offset}: raw data size {raw_data_size} is not a multiple of chunk size {chunk_size}")]
    ChunkMismatch { offset: u64, raw_data_size: u64, chunk_size: u64 },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, TdmsError>;
