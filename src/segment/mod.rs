mod chunks;
mod header;

pub use chunks::{calculate_chunks, ChunkLayout};
pub use header::SegmentHeader;

use crate::error::{TdmsError, Result};
use crate::metadata::{read_metadata, ObjectTable, PropertyMap, SegmentMetadata, SegmentObject};
use crate::raw_data::ReadSeek;
use crate::types::TocFlags;
use std::collections::HashMap;
use std::sync::Arc;

/// One decoded segment: lead-in, effective object layout and chunk count.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Position of this segment in the file, counting from zero
    pub index: usize,
    pub header: SegmentHeader,
    pub chunks: ChunkLayout,
    pub metadata: Arc<SegmentMetadata>,
}

impl Segment {
    /// Read the segment starting at the reader's position.
    ///
    /// `previous` is the metadata of the segment before this one (empty for
    /// the first) and `history` every object seen so far.
    pub fn read<R: ReadSeek>(
        reader: &mut R,
        file_size: u64,
        index: usize,
        previous: &Arc<SegmentMetadata>,
        history: &ObjectTable,
    ) -> Result<Self> {
        let header = SegmentHeader::read(reader, file_size)?;

        if header.toc.is_big_endian() {
            return Err(TdmsError::Unsupported(format!(
                "big-endian segment at offset {}", header.offset
            )));
        }

        let metadata = read_metadata(reader, header.toc, previous, history)?;

        if header.toc.has_metadata() {
            let end = reader.stream_position()?;
            if end != header.raw_data_offset {
                log::warn!(
                    "Metadata of segment at {} ended at {} but raw data starts at {}",
                    header.offset, end, header.raw_data_offset
                );
            }
        }

        let chunk_size = metadata.chunk_size().ok_or(TdmsError::ChunkMismatch {
            offset: header.offset,
            raw_data_size: header.raw_data_span(),
            chunk_size: u64::MAX,
        })?;

        let chunks = calculate_chunks(
            header.offset,
            chunk_size,
            header.raw_data_span(),
            header.incomplete,
        )?;

        log::debug!(
            "Segment {} at {}: {} objects, {} chunks of {} bytes",
            index, header.offset, metadata.object_order.len(), chunks.num_chunks, chunks.chunk_size
        );

        Ok(Segment {
            index,
            header,
            chunks,
            metadata,
        })
    }

    pub fn position(&self) -> u64 {
        self.header.offset
    }

    pub fn toc(&self) -> TocFlags {
        self.header.toc
    }

    pub fn next_segment_offset(&self) -> u64 {
        self.header.next_segment_offset
    }

    pub fn raw_data_offset(&self) -> u64 {
        self.header.raw_data_offset
    }

    pub fn num_chunks(&self) -> u64 {
        self.chunks.num_chunks
    }

    pub fn object_order(&self) -> &[String] {
        &self.metadata.object_order
    }

    pub fn objects(&self) -> &HashMap<String, SegmentObject> {
        &self.metadata.objects
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.metadata.properties
    }

    /// Byte offset of `path`'s data within one chunk, or None when the
    /// object carries no data in this segment.
    pub fn offset_in_chunk(&self, path: &str) -> Option<u64> {
        let mut offset = 0;
        for candidate in &self.metadata.object_order {
            let obj = self.metadata.objects.get(candidate)?;
            if !obj.has_data() {
                continue;
            }
            if candidate == path {
                return Some(offset);
            }
            offset += obj.index.raw_data_size;
        }
        None
    }
}
