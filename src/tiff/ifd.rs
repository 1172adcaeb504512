//! Image File Directory (IFD) structures and methods
//!
//! This module implements the core TIFF IFD (Image File Directory) structures
//! that store metadata about images in a TIFF file. IFDs are organized as
//! collections of tag entries, with each tag describing an aspect of the image.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::errors::{RasterError, RasterResult};
use crate::tiff::constants::tags;
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
///
/// An IFD contains metadata about an image, stored as a series of tag entries.
/// Only the first IFD of a file is read as raster data; later ones are
/// overviews or masks.
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Index into `entries` by tag
    tag_map: HashMap<u16, usize>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// Each entry describes one aspect of the image using a tag-value pair.
/// `value_bytes` keeps the value field exactly as stored in the file so that
/// inline arrays (e.g. two SHORTs packed into four bytes) decode correctly in
/// either byte order.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value field decoded as a single offset-sized integer
    pub value_offset: u64,
    /// Raw value field, in file byte order, zero-padded to 8 bytes
    pub value_bytes: [u8; 8],
}

impl IFDEntry {
    /// Creates an entry whose value field is `value_offset` in little-endian order
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            value_bytes: value_offset.to_le_bytes(),
        }
    }

    /// Creates an entry read from a file, keeping the raw value field
    pub fn with_raw_value(tag: u16, field_type: u16, count: u64, value_offset: u64, value_bytes: [u8; 8]) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            value_bytes,
        }
    }

    /// Get the size in bytes for this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        tag_utils::field_type_size(self.field_type).unwrap_or(1)
    }

    /// Total size of the entry's values in bytes
    pub fn data_size(&self) -> RasterResult<u64> {
        (self.get_field_type_size() as u64).checked_mul(self.count).ok_or_else(|| {
            RasterError::GenericError(format!(
                "Tag {} count {} overflows its data size", self.tag, self.count))
        })
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        let tag_name = tag_utils::get_tag_name(self.tag);
        let field_type_name = tag_utils::get_field_type_name(self.field_type);

        let value_display = match self.tag {
            tags::COMPRESSION => format!("{} ({})",
                                         self.value_offset,
                                         tag_utils::get_compression_name(self.value_offset)),
            _ => self.value_offset.to_string()
        };

        format!("Tag: {} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_name, self.field_type, field_type_name, self.count, value_display)
    }
}

impl IFD {
    /// Creates a new IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    ///
    /// A later entry for the same tag replaces the earlier one.
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        match self.tag_map.get(&entry.tag) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.tag_map.insert(entry.tag, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Gets a tag value (value_offset) directly
    ///
    /// Only meaningful for single-valued tags stored inline.
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.get_entry(tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag).map(|&idx| &self.entries[idx])
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries sorted by tag number, as a TIFF directory must be written
    pub fn sorted_entries(&self) -> Vec<IFDEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|entry| entry.tag);
        entries
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "    {}", entry.description())?;
        }
        Ok(())
    }
}
