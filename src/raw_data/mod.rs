// src/raw_data/mod.rs
//! Primitive readers for TDMS files
//!
//! [`RawDataReader`] decodes the little-endian building blocks every other
//! part of the decoder is made of: fixed-width integers and floats,
//! length-prefixed strings, LabVIEW timestamps and bulk arrays of values.
//!
//! # Examples
//!
//! ```
//! use tdms_walk::raw_data::RawDataReader;
//! use std::io::{Cursor, SeekFrom};
//!
//! let mut data = vec![0u8; 4];
//! data.extend_from_slice(&2.5f64.to_le_bytes());
//! data.extend_from_slice(&(-1.0f64).to_le_bytes());
//! let mut cursor = Cursor::new(data);
//!
//! let values: Vec<f64> = RawDataReader::read_values_at(&mut cursor, 2, SeekFrom::Start(4)).unwrap();
//! assert_eq!(values, vec![2.5, -1.0]);
//! ```

mod reader;

pub use reader::{ChannelValue, RawDataReader, ReadSeek};
