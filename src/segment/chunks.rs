use crate::error::{TdmsError, Result};

/// How a segment's raw data region divides into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkLayout {
    /// Bytes of one repetition of every data-carrying object
    pub chunk_size: u64,
    pub num_chunks: u64,
    /// Bytes of a trailing partial chunk; only ever non-zero for an
    /// incomplete segment
    pub final_chunk_remainder: u64,
}

/// Work out how many whole chunks fill `raw_data_span` bytes.
///
/// A zero chunk size demands an empty span (writers sometimes set the raw
/// data flag with nothing behind it). Otherwise the span must be an exact
/// multiple of the chunk size, except in an incomplete segment where the
/// leftover bytes are reported as a partial chunk.
pub fn calculate_chunks(
    segment_offset: u64,
    chunk_size: u64,
    raw_data_span: u64,
    incomplete: bool,
) -> Result<ChunkLayout> {
    log::trace!("Chunk size {} over raw data span {}", chunk_size, raw_data_span);

    let mismatch = || TdmsError::ChunkMismatch {
        offset: segment_offset,
        raw_data_size: raw_data_span,
        chunk_size,
    };

    if chunk_size == 0 {
        if raw_data_span != 0 {
            return Err(mismatch());
        }
        return Ok(ChunkLayout::default());
    }

    let num_chunks = raw_data_span / chunk_size;
    let remainder = raw_data_span % chunk_size;
    if remainder != 0 {
        if !incomplete {
            return Err(mismatch());
        }
        log::warn!(
            "Incomplete segment at {} ends with a partial chunk of {} bytes",
            segment_offset, remainder
        );
    }

    Ok(ChunkLayout {
        chunk_size,
        num_chunks,
        final_chunk_remainder: remainder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_multiple() {
        let layout = calculate_chunks(0, 32, 96, false).unwrap();
        assert_eq!(layout.num_chunks, 3);
        assert_eq!(layout.final_chunk_remainder, 0);
    }

    #[test]
    fn test_zero_chunk_size_with_empty_span() {
        assert_eq!(calculate_chunks(0, 0, 0, false).unwrap(), ChunkLayout::default());
    }

    #[test]
    fn test_zero_chunk_size_with_data_is_fatal() {
        assert!(matches!(
            calculate_chunks(100, 0, 8, false),
            Err(TdmsError::ChunkMismatch { offset: 100, raw_data_size: 8, chunk_size: 0 })
        ));
    }

    #[test]
    fn test_non_multiple_is_fatal() {
        assert!(matches!(calculate_chunks(0, 32, 100, false), Err(TdmsError::ChunkMismatch { .. })));
    }

    #[test]
    fn test_incomplete_segment_keeps_whole_chunks() {
        let layout = calculate_chunks(0, 32, 100, true).unwrap();
        assert_eq!(layout.num_chunks, 3);
        assert_eq!(layout.final_chunk_remainder, 4);
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_span(chunk_size in 1u64..4096, chunks in 0u64..1024) {
            let layout = calculate_chunks(0, chunk_size, chunk_size * chunks, false).unwrap();
            prop_assert_eq!(layout.num_chunks * layout.chunk_size, chunk_size * chunks);
        }

        #[test]
        fn prop_remainder_rejected_when_complete(chunk_size in 2u64..4096, chunks in 0u64..1024, extra in 1u64..4096) {
            let extra = extra % chunk_size;
            prop_assume!(extra != 0);
            prop_assert!(calculate_chunks(0, chunk_size, chunk_size * chunks + extra, false).is_err());
        }
    }
}
