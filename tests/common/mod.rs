// tests/common/mod.rs
// Byte-level builders for hand-made TDMS files

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;
use tdms_walk::TocFlags;

pub const META: u32 = TocFlags::METADATA;
pub const NEW_OBJ_LIST: u32 = TocFlags::NEW_OBJ_LIST;
pub const RAW_DATA: u32 = TocFlags::RAW_DATA;
pub const INTERLEAVED: u32 = TocFlags::INTERLEAVED;
pub const BIG_ENDIAN: u32 = TocFlags::BIG_ENDIAN;

pub const TYPE_I32: u32 = 0x03;
pub const TYPE_U8: u32 = 0x05;
pub const TYPE_U32: u32 = 0x07;
pub const TYPE_DBL: u32 = 0x0A;
pub const TYPE_STRING: u32 = 0x20;
pub const TYPE_TIMESTAMP: u32 = 0x44;

/// Raw data index written after an object's path
pub enum Index {
    NoData,
    MatchesPrevious,
    Explicit { data_type: u32, count: u64 },
    Strings { count: u64, size: u64 },
    Raw(u32),
}

pub enum Value<'a> {
    Str(&'a str),
    I32(i32),
    U32(u32),
    Double(f64),
    /// Seconds since 1904 and 2^-64 fractions
    Timestamp(i64, u64),
}

fn put_string(buf: &mut Vec<u8>, s: &str) {
    buf.write_u32::<LittleEndian>(s.len() as u32).unwrap();
    buf.write_all(s.as_bytes()).unwrap();
}

/// The metadata block of one segment: object count, then each object.
#[derive(Default)]
pub struct Metadata {
    count: u32,
    body: Vec<u8>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(mut self, path: &str, index: Index, props: &[(&str, Value)]) -> Self {
        self.count += 1;
        let buf = &mut self.body;
        put_string(buf, path);
        match index {
            Index::NoData => buf.write_u32::<LittleEndian>(0xFFFF_FFFF).unwrap(),
            Index::MatchesPrevious => buf.write_u32::<LittleEndian>(0).unwrap(),
            Index::Explicit { data_type, count } => {
                buf.write_u32::<LittleEndian>(20).unwrap();
                buf.write_u32::<LittleEndian>(data_type).unwrap();
                buf.write_u32::<LittleEndian>(1).unwrap();
                buf.write_u64::<LittleEndian>(count).unwrap();
            }
            Index::Strings { count, size } => {
                buf.write_u32::<LittleEndian>(28).unwrap();
                buf.write_u32::<LittleEndian>(TYPE_STRING).unwrap();
                buf.write_u32::<LittleEndian>(1).unwrap();
                buf.write_u64::<LittleEndian>(count).unwrap();
                buf.write_u64::<LittleEndian>(size).unwrap();
            }
            Index::Raw(header) => buf.write_u32::<LittleEndian>(header).unwrap(),
        }
        buf.write_u32::<LittleEndian>(props.len() as u32).unwrap();
        for (name, value) in props {
            put_string(buf, name);
            match value {
                Value::Str(s) => {
                    buf.write_u32::<LittleEndian>(TYPE_STRING).unwrap();
                    put_string(buf, s);
                }
                Value::I32(v) => {
                    buf.write_u32::<LittleEndian>(TYPE_I32).unwrap();
                    buf.write_i32::<LittleEndian>(*v).unwrap();
                }
                Value::U32(v) => {
                    buf.write_u32::<LittleEndian>(TYPE_U32).unwrap();
                    buf.write_u32::<LittleEndian>(*v).unwrap();
                }
                Value::Double(v) => {
                    buf.write_u32::<LittleEndian>(TYPE_DBL).unwrap();
                    buf.write_f64::<LittleEndian>(*v).unwrap();
                }
                Value::Timestamp(seconds, fractions) => {
                    buf.write_u32::<LittleEndian>(TYPE_TIMESTAMP).unwrap();
                    buf.write_u64::<LittleEndian>(*fractions).unwrap();
                    buf.write_i64::<LittleEndian>(*seconds).unwrap();
                }
            }
        }
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.body.len());
        out.write_u32::<LittleEndian>(self.count).unwrap();
        out.extend_from_slice(&self.body);
        out
    }
}

/// Append one finalized segment to `file`
pub fn push_segment(file: &mut Vec<u8>, toc: u32, metadata: Option<&Metadata>, raw: &[u8]) {
    let meta = metadata.map(Metadata::to_bytes).unwrap_or_default();
    write_segment(file, b"TDSm", toc, (meta.len() + raw.len()) as u64, &meta, raw);
}

/// Append a segment whose length was never written back
pub fn push_unfinished_segment(file: &mut Vec<u8>, toc: u32, metadata: Option<&Metadata>, raw: &[u8]) {
    let meta = metadata.map(Metadata::to_bytes).unwrap_or_default();
    write_segment(file, b"TDSm", toc, u64::MAX, &meta, raw);
}

pub fn write_segment(file: &mut Vec<u8>, tag: &[u8; 4], toc: u32, segment_length: u64, meta: &[u8], raw: &[u8]) {
    file.write_all(tag).unwrap();
    file.write_u32::<LittleEndian>(toc).unwrap();
    file.write_u32::<LittleEndian>(4713).unwrap();
    file.write_u64::<LittleEndian>(segment_length).unwrap();
    file.write_u64::<LittleEndian>(meta.len() as u64).unwrap();
    file.write_all(meta).unwrap();
    file.write_all(raw).unwrap();
}

pub fn f64_bytes(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for v in values {
        out.write_f64::<LittleEndian>(*v).unwrap();
    }
    out
}

pub fn i32_bytes(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.write_i32::<LittleEndian>(*v).unwrap();
    }
    out
}

/// Root, one group and two double channels of `count` values each
pub fn two_channel_metadata(count: u64) -> Metadata {
    Metadata::new()
        .object("/", Index::NoData, &[])
        .object("/'Group'", Index::NoData, &[])
        .object("/'Group'/'a'", Index::Explicit { data_type: TYPE_DBL, count }, &[])
        .object("/'Group'/'b'", Index::Explicit { data_type: TYPE_DBL, count }, &[])
}
