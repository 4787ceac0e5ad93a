//! ZIP record layouts (PKWARE APPNOTE 4.3), little-endian throughout.

use chrono::{Datelike, NaiveDateTime, Timelike};

const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x0807_4b50;
const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

const VERSION_NEEDED: u16 = 20;
/// Host system Unix (upper byte), APPNOTE version 2.0 (lower byte).
const VERSION_MADE_BY: u16 = (3 << 8) | 20;
/// Sizes and CRC follow the data; UTF-8 names.
const FLAGS: u16 = (1 << 3) | (1 << 11);
const METHOD_DEFLATE: u16 = 8;
/// Regular file, rw-r--r--.
const EXTERNAL_ATTRIBUTES: u32 = 0o100644 << 16;

pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// Directory entry kept in memory until the archive is closed.
#[derive(Debug, Clone)]
pub struct CentralRecord {
    pub name: String,
    pub crc: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub header_offset: u32,
    pub dos_time: u16,
    pub dos_date: u16,
}

impl CentralRecord {
    pub fn encode(&self, out: &mut Vec<u8>) {
        put_u32(out, CENTRAL_DIRECTORY_SIGNATURE);
        put_u16(out, VERSION_MADE_BY);
        put_u16(out, VERSION_NEEDED);
        put_u16(out, FLAGS);
        put_u16(out, METHOD_DEFLATE);
        put_u16(out, self.dos_time);
        put_u16(out, self.dos_date);
        put_u32(out, self.crc);
        put_u32(out, self.compressed_size);
        put_u32(out, self.uncompressed_size);
        put_u16(out, self.name.len() as u16);
        put_u16(out, 0); // extra field length
        put_u16(out, 0); // comment length
        put_u16(out, 0); // disk number start
        put_u16(out, 0); // internal attributes
        put_u32(out, EXTERNAL_ATTRIBUTES);
        put_u32(out, self.header_offset);
        out.extend_from_slice(self.name.as_bytes());
    }
}

/// Local header with zeroed CRC and sizes; the data descriptor carries them.
pub fn local_header(name: &str, dos_time: u16, dos_date: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(30 + name.len());
    put_u32(&mut out, LOCAL_FILE_HEADER_SIGNATURE);
    put_u16(&mut out, VERSION_NEEDED);
    put_u16(&mut out, FLAGS);
    put_u16(&mut out, METHOD_DEFLATE);
    put_u16(&mut out, dos_time);
    put_u16(&mut out, dos_date);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    put_u16(&mut out, name.len() as u16);
    put_u16(&mut out, 0);
    out.extend_from_slice(name.as_bytes());
    out
}

pub fn data_descriptor(crc: u32, compressed_size: u32, uncompressed_size: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    put_u32(&mut out, DATA_DESCRIPTOR_SIGNATURE);
    put_u32(&mut out, crc);
    put_u32(&mut out, compressed_size);
    put_u32(&mut out, uncompressed_size);
    out
}

pub fn end_of_central_directory(
    out: &mut Vec<u8>,
    entries: u16,
    directory_size: u32,
    directory_offset: u32,
) {
    put_u32(out, END_OF_CENTRAL_DIRECTORY_SIGNATURE);
    put_u16(out, 0); // this disk
    put_u16(out, 0); // disk with directory
    put_u16(out, entries);
    put_u16(out, entries);
    put_u32(out, directory_size);
    put_u32(out, directory_offset);
    put_u16(out, 0); // comment length
}

/// MS-DOS (time, date) pair. Years outside 1980..=2107 are clamped.
pub fn dos_timestamp(at: NaiveDateTime) -> (u16, u16) {
    let year = at.year().clamp(1980, 2107) as u16;
    let date = ((year - 1980) << 9) | ((at.month() as u16) << 5) | at.day() as u16;
    let time = ((at.hour() as u16) << 11) | ((at.minute() as u16) << 5) | (at.second() as u16 / 2);
    (time, date)
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
