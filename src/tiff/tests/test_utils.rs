use std::io::Cursor;
use std::path::Path;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::tiff::constants::{field_types, tags};

/// Creates a test buffer with TIFF header and sample data
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Sample IFD (at offset 8)
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(800).unwrap();    // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(600).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a test buffer with BigTIFF header and sample data
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // BigTIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    // Sample IFD (at offset 16)
    buffer.write_u64::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(1024).unwrap();   // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(768).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

fn put_u16(buffer: &mut Vec<u8>, value: u16, big_endian: bool) {
    if big_endian {
        buffer.write_u16::<BigEndian>(value).unwrap();
    } else {
        buffer.write_u16::<LittleEndian>(value).unwrap();
    }
}

fn put_u32(buffer: &mut Vec<u8>, value: u32, big_endian: bool) {
    if big_endian {
        buffer.write_u32::<BigEndian>(value).unwrap();
    } else {
        buffer.write_u32::<LittleEndian>(value).unwrap();
    }
}

/// Classic TIFF assembled in memory for reader tests
///
/// Blocks are stored exactly as given, so callers encode samples in the
/// file's byte order and apply any compression themselves.
pub struct TestTiff {
    pub big_endian: bool,
    pub entries: Vec<(u16, u16, Vec<u64>)>,
    pub blocks: Vec<Vec<u8>>,
    pub tiled: bool,
}

impl TestTiff {
    pub fn new(big_endian: bool) -> Self {
        TestTiff { big_endian, entries: Vec::new(), blocks: Vec::new(), tiled: false }
    }

    pub fn tag(mut self, tag: u16, field_type: u16, values: &[u64]) -> Self {
        self.entries.push((tag, field_type, values.to_vec()));
        self
    }

    pub fn short(self, tag: u16, values: &[u64]) -> Self {
        self.tag(tag, field_types::SHORT, values)
    }

    pub fn long(self, tag: u16, values: &[u64]) -> Self {
        self.tag(tag, field_types::LONG, values)
    }

    pub fn tiles(mut self, tile_width: u64, tile_length: u64) -> Self {
        self.tiled = true;
        self.long(tags::TILE_WIDTH, &[tile_width]).long(tags::TILE_LENGTH, &[tile_length])
    }

    pub fn block(mut self, data: Vec<u8>) -> Self {
        self.blocks.push(data);
        self
    }

    fn encode_values(&self, field_type: u16, values: &[u64]) -> Vec<u8> {
        let mut data = Vec::new();
        for &value in values {
            match field_type {
                field_types::SHORT => put_u16(&mut data, value as u16, self.big_endian),
                _ => put_u32(&mut data, value as u32, self.big_endian),
            }
        }
        data
    }

    /// Serializes header, blocks, directory and external tag data
    pub fn build(&self) -> Vec<u8> {
        let mut file = Vec::new();
        if self.big_endian {
            file.extend_from_slice(b"MM");
        } else {
            file.extend_from_slice(b"II");
        }
        put_u16(&mut file, 42, self.big_endian);
        put_u32(&mut file, 0, self.big_endian);

        let mut offsets = Vec::new();
        let mut counts = Vec::new();
        for block in &self.blocks {
            offsets.push(file.len() as u64);
            counts.push(block.len() as u64);
            file.extend_from_slice(block);
        }
        if file.len() % 2 == 1 {
            file.push(0);
        }

        let (offset_tag, count_tag) = if self.tiled {
            (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };
        let mut entries = self.entries.clone();
        entries.push((offset_tag, field_types::LONG, offsets));
        entries.push((count_tag, field_types::LONG, counts));
        entries.sort_by_key(|(tag, _, _)| *tag);

        let ifd_offset = file.len();
        let mut external_offset = ifd_offset + 2 + 12 * entries.len() + 4;
        let mut external = Vec::new();

        let header_link = if self.big_endian {
            (ifd_offset as u32).to_be_bytes()
        } else {
            (ifd_offset as u32).to_le_bytes()
        };
        file[4..8].copy_from_slice(&header_link);

        put_u16(&mut file, entries.len() as u16, self.big_endian);
        for (tag, field_type, values) in &entries {
            let data = self.encode_values(*field_type, values);
            put_u16(&mut file, *tag, self.big_endian);
            put_u16(&mut file, *field_type, self.big_endian);
            put_u32(&mut file, values.len() as u32, self.big_endian);
            if data.len() <= 4 {
                let mut inline = data.clone();
                inline.resize(4, 0);
                file.extend_from_slice(&inline);
            } else {
                put_u32(&mut file, external_offset as u32, self.big_endian);
                external_offset += data.len();
                external.extend_from_slice(&data);
            }
        }
        put_u32(&mut file, 0, self.big_endian);
        file.extend_from_slice(&external);
        file
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}
