mod object_path;
mod property;
mod raw_data_index;
mod reconstruct;

pub use object_path::{channel_path, channel_paths, group_path, group_paths, split_path};
pub use property::read_property;
pub use raw_data_index::{RawDataIndex, RawDataIndexHeader, SegmentObject};
pub use reconstruct::{read_metadata, ObjectTable, PropertyMap, SegmentMetadata};
