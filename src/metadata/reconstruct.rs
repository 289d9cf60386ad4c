//! Rebuilds each segment's object table from its metadata block.
//!
//! A TDMS writer only lists what changed since the previous segment, so a
//! segment's effective objects depend on the segment before it and on every
//! object seen earlier in the file. Each call here takes that history as
//! read-only input and returns a fresh, immutable snapshot.

use crate::error::{TdmsError, Result};
use crate::metadata::property::read_property;
use crate::metadata::raw_data_index::{RawDataIndex, RawDataIndexHeader, SegmentObject};
use crate::raw_data::{RawDataReader, ReadSeek};
use crate::types::{Property, TocFlags};
use std::collections::HashMap;
use std::sync::Arc;

/// Properties keyed by object path, then by property name
pub type PropertyMap = HashMap<String, HashMap<String, Property>>;

/// The object layout and properties in effect for one segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentMetadata {
    /// Object paths in the order their raw data is laid out
    pub object_order: Vec<String>,
    pub objects: HashMap<String, SegmentObject>,
    /// Properties declared in this segment's metadata only
    pub properties: PropertyMap,
}

impl SegmentMetadata {
    /// Bytes in one chunk: the raw sizes of every object carrying data.
    ///
    /// `None` when the sizes add up past `u64::MAX`.
    pub fn chunk_size(&self) -> Option<u64> {
        self.objects
            .values()
            .filter(|obj| obj.has_data())
            .try_fold(0u64, |total, obj| total.checked_add(obj.index.raw_data_size))
    }
}

/// Every object seen so far in the file, with its most recent state.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    objects: HashMap<String, SegmentObject>,
}

impl ObjectTable {
    pub fn new() -> Self {
        ObjectTable::default()
    }

    pub fn get(&self, path: &str) -> Option<&SegmentObject> {
        self.objects.get(path)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Fold a segment's objects in, later states replacing earlier ones.
    pub fn merged(mut self, segment: &SegmentMetadata) -> Self {
        for (path, obj) in &segment.objects {
            self.objects.insert(path.clone(), obj.clone());
        }
        self
    }
}

/// Decode the metadata block at the reader's position.
///
/// `previous` is the metadata in effect for the prior segment and
/// `history` every object seen in any earlier segment. When the ToC says
/// there is no metadata, `previous` is returned as-is (the same `Arc`) and
/// nothing is read.
pub fn read_metadata<R: ReadSeek>(
    reader: &mut R,
    toc: TocFlags,
    previous: &Arc<SegmentMetadata>,
    history: &ObjectTable,
) -> Result<Arc<SegmentMetadata>> {
    if !toc.has_metadata() {
        log::debug!("Reusing previous segment metadata");
        return Ok(Arc::clone(previous));
    }

    let (mut objects, mut object_order) = if toc.has_new_obj_list() || previous.objects.is_empty() {
        (HashMap::new(), Vec::new())
    } else {
        (previous.objects.clone(), previous.object_order.clone())
    };
    let mut properties = PropertyMap::new();

    let object_count = RawDataReader::read_u32(reader)?;
    log::debug!("Reading metadata for {} objects", object_count);

    for _ in 0..object_count {
        let path = RawDataReader::read_string(reader)?;
        let header_offset = reader.stream_position()?;
        let header = RawDataIndexHeader::read(reader)?;
        log::trace!("Object {} raw data index header {:?}", path, header);

        let resolved = if let Some(existing) = objects.get(&path) {
            log::trace!("Updating {} within this segment", path);
            resolve_known(reader, header, existing)?
        } else if let Some(existing) = history.get(&path) {
            log::trace!("Reusing {} from an earlier segment", path);
            let resolved = resolve_known(reader, header, existing)?;
            object_order.push(path.clone());
            resolved
        } else {
            log::trace!("New object {}", path);
            let resolved = match header {
                RawDataIndexHeader::MatchesPrevious => {
                    return Err(TdmsError::MatchesPreviousOnUnknownObject { offset: header_offset, path });
                }
                RawDataIndexHeader::NoData => SegmentObject::no_data(),
                RawDataIndexHeader::Explicit(_) => SegmentObject::new(header, RawDataIndex::read(reader)?),
            };
            object_order.push(path.clone());
            resolved
        };
        objects.insert(path.clone(), resolved);

        let property_count = RawDataReader::read_u32(reader)?;
        for _ in 0..property_count {
            let property = read_property(reader)?;
            properties
                .entry(path.clone())
                .or_default()
                .insert(property.name.clone(), property);
        }
    }

    Ok(Arc::new(SegmentMetadata {
        object_order,
        objects,
        properties,
    }))
}

/// Resolve a header for an object that already has a recorded state.
///
/// Control markers keep the existing index so type and size information
/// survives segments where the object carries no data.
fn resolve_known<R: ReadSeek>(
    reader: &mut R,
    header: RawDataIndexHeader,
    existing: &SegmentObject,
) -> Result<SegmentObject> {
    Ok(match header {
        RawDataIndexHeader::NoData if existing.has_data() => {
            SegmentObject::new(header, existing.index.clone())
        }
        RawDataIndexHeader::MatchesPrevious if !existing.has_data() => {
            SegmentObject::new(header, existing.index.clone())
        }
        RawDataIndexHeader::NoData | RawDataIndexHeader::MatchesPrevious => existing.clone(),
        RawDataIndexHeader::Explicit(_) => SegmentObject::new(header, RawDataIndex::read(reader)?),
    })
}
