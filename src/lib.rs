// src/lib.rs
//! # tdms-walk
//!
//! A Rust library for decoding the segment structure of TDMS (Technical Data Management Streaming)
//! files, the native file format for National Instruments LabVIEW and other NI software.
//!
//! ## Features
//!
//! - **Segment walking**: Every segment lead-in, table of contents and chunk layout
//! - **Incremental Metadata**: Objects and raw data indexes carried across segments the way writers omit them
//! - **Properties**: Merged per object, last write wins, with the file position of every value
//! - **Raw values**: Typed or `f64`-widened reads of a channel's values across all chunks
//! - **Waveforms**: `wf_*` timing attributes re-read straight from the file
//!
//! ## Quick Start
//!
//! ### Walking segments
//!
//! ```rust,no_run
//! use tdms_walk::*;
//! use std::fs::File;
//!
//! fn main() -> Result<()> {
//!     let mut file = File::open("input.tdms")?;
//!     let decoded = decode(&mut file)?;
//!
//!     for segment in &decoded.segments {
//!         println!("Segment {} at {}: {} chunks", segment.index, segment.position(), segment.num_chunks());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Reading channels
//!
//! ```rust,no_run
//! use tdms_walk::*;
//!
//! fn main() -> Result<()> {
//!     let mut reader = TdmsReader::open("input.tdms")?;
//!
//!     for group in reader.group_paths() {
//!         println!("Group: {}", group);
//!     }
//!
//!     let data: Vec<f64> = reader.read_channel_data("/'Group1'/'Voltage'")?;
//!     println!("Read {} values", data.len());
//!
//!     Ok(())
//! }
//! ```

// Modules
pub mod error;
pub mod types;
pub mod metadata;
pub mod segment;
pub mod raw_data;
pub mod reader;

// Re-export commonly used types at the crate root for convenience
pub use error::{TdmsError, Result};

// Type exports
pub use types::{
    DataType,
    TocFlags,
    Timestamp,
    Property,
    PropertyValue,
};

// Metadata exports
pub use metadata::{
    PropertyMap,
    RawDataIndex,
    RawDataIndexHeader,
    SegmentMetadata,
    SegmentObject,
};

// Segment exports
pub use segment::{
    ChunkLayout,
    Segment,
    SegmentHeader,
};

// Raw data exports
pub use raw_data::{
    ChannelValue,
    RawDataReader,
};

// Reader exports
pub use reader::{
    decode,
    ChannelReader,
    DecodedFile,
    TdmsReader,
    WaveformTiming,
};

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use tdms_walk::prelude::*;
    //! ```

    pub use crate::error::{TdmsError, Result};
    pub use crate::types::{DataType, Property, PropertyValue, Timestamp};
    pub use crate::reader::{decode, TdmsReader};
}

// Version information
/// The TDMS file format version this library decodes
pub const TDMS_VERSION: u32 = 4713;

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(TDMS_VERSION, SegmentHeader::VERSION);
        assert!(!LIBRARY_VERSION.is_empty());
    }

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::I8.raw_element_size(), Some(1));
        assert_eq!(DataType::I16.raw_element_size(), Some(2));
        assert_eq!(DataType::I32.raw_element_size(), Some(4));
        assert_eq!(DataType::I64.raw_element_size(), Some(8));
        assert_eq!(DataType::F64.raw_element_size(), Some(8));
        assert_eq!(DataType::TimeStamp.raw_element_size(), Some(16));
        assert_eq!(DataType::String.raw_element_size(), None);
    }

    #[test]
    fn test_toc_flags() {
        let toc = TocFlags::new(TocFlags::METADATA | TocFlags::RAW_DATA);
        assert!(toc.has_metadata());
        assert!(toc.has_raw_data());
        assert!(!toc.has_new_obj_list());
        assert!(!TocFlags::empty().has_metadata());
    }

    #[test]
    fn test_segment_header_constants() {
        assert_eq!(SegmentHeader::LEAD_IN_SIZE, 28);
        assert_eq!(SegmentHeader::TDMS_TAG, b"TDSm");
        assert_eq!(SegmentHeader::INCOMPLETE_MARKER, 0xFFFFFFFFFFFFFFFF);
    }

    #[test]
    fn test_property_value_types() {
        assert_eq!(PropertyValue::I32(42).data_type(), DataType::I32);
        assert_eq!(PropertyValue::Double(3.5).data_type(), DataType::DoubleFloat);
        assert_eq!(PropertyValue::String("test".to_string()).data_type(), DataType::String);
    }
}
