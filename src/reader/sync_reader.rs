// src/reader/sync_reader.rs
use crate::error::{TdmsError, Result};
use crate::metadata::{self, PropertyMap};
use crate::raw_data::{ChannelValue, ReadSeek};
use crate::reader::channel_reader::{ChannelReader, WaveformTiming};
use crate::reader::walker::{decode, DecodedFile};
use crate::segment::Segment;
use crate::types::Property;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
#[cfg(feature = "mmap")]
use std::io::Cursor;

/// A decoded TDMS file together with the stream it was read from.
///
/// The stream is owned for the reader's lifetime and closed when the
/// reader is dropped.
pub struct TdmsReader<R: ReadSeek> {
    file: R,
    segments: Vec<Segment>,
    properties: PropertyMap,
}

/// Constructor for standard file I/O
impl TdmsReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::with_capacity(65536, file))
    }
}

/// Constructor for memory-mapped file I/O (requires "mmap" feature)
#[cfg(feature = "mmap")]
impl TdmsReader<Cursor<Mmap>> {
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // Safety: the map is read-only and the file is not modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_reader(Cursor::new(mmap))
    }
}

impl<R: ReadSeek> TdmsReader<R> {
    /// Decode every segment of `file`
    pub fn from_reader(mut file: R) -> Result<Self> {
        let DecodedFile { segments, properties } = decode(&mut file)?;
        Ok(TdmsReader {
            file,
            segments,
            properties,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Merged properties of every object
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn object_properties(&self, path: &str) -> Option<&HashMap<String, Property>> {
        self.properties.get(path)
    }

    pub fn property(&self, path: &str, name: &str) -> Option<&Property> {
        self.properties.get(path).and_then(|props| props.get(name))
    }

    /// Every object path, in the order it was first listed in the file
    pub fn object_paths(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .flat_map(|s| s.object_order().iter())
            .map(String::as_str)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn group_paths(&self) -> Vec<&str> {
        metadata::group_paths(self.object_paths())
    }

    /// Channel paths under the group named `group` (its unquoted name)
    pub fn channel_paths(&self, group: &str) -> Vec<&str> {
        metadata::channel_paths(self.object_paths(), group)
    }

    pub fn channel(&self, path: &str) -> Result<ChannelReader> {
        ChannelReader::new(path, &self.segments)
    }

    /// Read all of a channel's values as `T`
    pub fn read_channel_data<T: ChannelValue>(&mut self, path: &str) -> Result<Vec<T>> {
        let channel = self.channel(path)?;
        channel.read_all_data(&mut self.file)
    }

    /// Read all of a numeric channel's values as `f64`
    pub fn read_channel_f64(&mut self, path: &str) -> Result<Vec<f64>> {
        let channel = self.channel(path)?;
        channel.read_all_f64(&mut self.file)
    }

    /// Read a numeric channel's values from one segment as `f64`
    pub fn read_segment_f64(&mut self, path: &str, segment_index: usize) -> Result<Vec<f64>> {
        let channel = self.channel(path)?;
        channel.read_segment_f64(&mut self.file, segment_index)
    }

    /// Waveform timing of a channel, if it carries all `wf_*` properties
    pub fn waveform_timing(&mut self, path: &str) -> Result<Option<WaveformTiming>> {
        match self.properties.get(path) {
            Some(props) => WaveformTiming::read(&mut self.file, props),
            None if self.segments.iter().any(|s| s.objects().contains_key(path)) => Ok(None),
            None => Err(TdmsError::ChannelNotFound(path.to_string())),
        }
    }

    /// Give back the underlying stream together with the decoded segments
    pub fn into_parts(self) -> (R, Vec<Segment>, PropertyMap) {
        (self.file, self.segments, self.properties)
    }
}
