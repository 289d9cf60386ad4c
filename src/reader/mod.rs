mod channel_reader;
mod sync_reader;
mod walker;

pub use channel_reader::{ChannelReader, SegmentData, WaveformTiming};
pub use sync_reader::TdmsReader;
pub use walker::{decode, merge_properties, DecodedFile};
