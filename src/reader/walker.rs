// src/reader/walker.rs
use crate::error::Result;
use crate::metadata::{ObjectTable, PropertyMap, SegmentMetadata};
use crate::raw_data::{RawDataReader, ReadSeek};
use crate::segment::Segment;
use std::io::SeekFrom;
use std::sync::Arc;

/// Everything [`decode`] recovers from a file
#[derive(Debug, Clone)]
pub struct DecodedFile {
    /// Segments in file order
    pub segments: Vec<Segment>,
    /// Properties of every object, later segments overriding earlier ones
    pub properties: PropertyMap,
}

impl DecodedFile {
    pub fn into_parts(self) -> (Vec<Segment>, PropertyMap) {
        (self.segments, self.properties)
    }
}

/// Walk every segment of a TDMS stream from offset 0.
///
/// Segments are read one after another, each seeded with the metadata of
/// the one before and with every object seen so far. Any format error
/// aborts the walk; nothing partial is returned.
pub fn decode<R: ReadSeek>(reader: &mut R) -> Result<DecodedFile> {
    let file_size = RawDataReader::seek(reader, SeekFrom::End(0))?;

    let mut segments: Vec<Segment> = Vec::new();
    let mut previous = Arc::new(SegmentMetadata::default());
    let mut history = ObjectTable::new();
    let mut position = 0u64;

    loop {
        RawDataReader::seek(reader, SeekFrom::Start(position))?;
        let segment = Segment::read(reader, file_size, segments.len(), &previous, &history)?;

        history = history.merged(&segment.metadata);
        previous = Arc::clone(&segment.metadata);
        position = segment.next_segment_offset();
        segments.push(segment);

        if position >= file_size {
            break;
        }
    }

    let properties = merge_properties(&segments);
    log::debug!(
        "Finished reading {} segments, {} objects, {} objects with properties",
        segments.len(),
        history.len(),
        properties.len()
    );

    Ok(DecodedFile {
        segments,
        properties,
    })
}

/// Fold every segment's properties in file order; the last write of a
/// name on a path wins.
pub fn merge_properties(segments: &[Segment]) -> PropertyMap {
    let mut merged = PropertyMap::new();
    for segment in segments {
        for (path, props) in segment.properties() {
            let entry = merged.entry(path.clone()).or_default();
            for (name, prop) in props {
                entry.insert(name.clone(), prop.clone());
            }
        }
    }
    merged
}
