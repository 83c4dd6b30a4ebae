//! TrueType `cmap` parsing for glyph-index remapping.
//!
//! Subset fonts are addressed by glyph index in the target document, so text
//! runs need the Unicode to glyph mapping of the embedded program.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::error::ConvertError;

const MAX_CODEPOINT: u32 = 0x10_FFFF;
const MAX_GLYPH_ID: u32 = 0xFFFF;

/// Error during TrueType font parsing.
#[derive(Debug)]
pub enum TrueTypeFontError {
    /// No usable Unicode cmap subtable found in font.
    CMapNotFound,
    /// IO error reading font data.
    IoError(std::io::Error),
}

impl From<std::io::Error> for TrueTypeFontError {
    fn from(e: std::io::Error) -> Self {
        TrueTypeFontError::IoError(e)
    }
}

impl From<TrueTypeFontError> for ConvertError {
    fn from(e: TrueTypeFontError) -> Self {
        match e {
            TrueTypeFontError::CMapNotFound => ConvertError::FontParse("no unicode cmap".into()),
            TrueTypeFontError::IoError(io) => ConvertError::FontParse(io.to_string()),
        }
    }
}

/// Unicode code point to glyph index lookup.
#[derive(Debug, Clone, Default)]
pub struct UnicodeCmap {
    char2gid: HashMap<u32, u32>,
}

impl UnicodeCmap {
    /// Parse the Unicode cmap of a TrueType program.
    pub fn parse(data: &[u8]) -> Result<Self, TrueTypeFontError> {
        TrueTypeFont::new(Cursor::new(data))?.unicode_cmap()
    }

    /// Glyph index for a code point, `None` when unmapped or mapped to .notdef.
    pub fn glyph_id(&self, codepoint: u32) -> Option<u32> {
        self.char2gid.get(&codepoint).copied().filter(|&gid| gid != 0)
    }

    pub fn len(&self) -> usize {
        self.char2gid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.char2gid.is_empty()
    }
}

/// Minimal sfnt reader: table directory plus the cmap table.
struct TrueTypeFont<R> {
    reader: R,
    /// Table directory: tag -> (offset, length).
    tables: HashMap<[u8; 4], (u32, u32)>,
}

impl<R: Read + Seek> TrueTypeFont<R> {
    fn new(mut reader: R) -> Result<Self, TrueTypeFontError> {
        // sfnt version, then numTables/searchRange/entrySelector/rangeShift
        let mut font_type = [0u8; 4];
        reader.read_exact(&mut font_type)?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        let ntables = u16::from_be_bytes([header[0], header[1]]) as usize;

        let mut tables = HashMap::new();
        for _ in 0..ntables {
            let mut entry = [0u8; 16];
            if reader.read_exact(&mut entry).is_err() {
                // Truncated directory, keep what was read
                break;
            }
            let tag: [u8; 4] = [entry[0], entry[1], entry[2], entry[3]];
            let offset = u32::from_be_bytes([entry[8], entry[9], entry[10], entry[11]]);
            let length = u32::from_be_bytes([entry[12], entry[13], entry[14], entry[15]]);
            tables.insert(tag, (offset, length));
        }

        Ok(Self { reader, tables })
    }

    fn unicode_cmap(&mut self) -> Result<UnicodeCmap, TrueTypeFontError> {
        let (base_offset, _length) = *self
            .tables
            .get(b"cmap")
            .ok_or(TrueTypeFontError::CMapNotFound)?;
        let base_offset = u64::from(base_offset);
        self.reader.seek(SeekFrom::Start(base_offset))?;

        let mut header = [0u8; 4];
        self.reader.read_exact(&mut header)?;
        let nsubtables = u16::from_be_bytes([header[2], header[3]]) as usize;

        let mut subtables = Vec::with_capacity(nsubtables);
        for _ in 0..nsubtables {
            let mut record = [0u8; 8];
            self.reader.read_exact(&mut record)?;
            let platform_id = u16::from_be_bytes([record[0], record[1]]);
            let encoding_id = u16::from_be_bytes([record[2], record[3]]);
            let offset = u32::from_be_bytes([record[4], record[5], record[6], record[7]]);
            subtables.push((platform_id, encoding_id, offset));
        }

        let mut char2gid = HashMap::new();
        for (platform_id, encoding_id, st_offset) in subtables {
            // Platform 0 = Unicode, platform 3 encodings 1/10 = Windows Unicode BMP/full
            if !(platform_id == 0 || (platform_id == 3 && (encoding_id == 1 || encoding_id == 10)))
            {
                continue;
            }
            self.reader
                .seek(SeekFrom::Start(base_offset + u64::from(st_offset)))?;
            let mut fmt = [0u8; 2];
            self.reader.read_exact(&mut fmt)?;
            match u16::from_be_bytes(fmt) {
                0 => self.parse_format_0(&mut char2gid)?,
                4 => self.parse_format_4(&mut char2gid)?,
                12 => self.parse_format_12(&mut char2gid)?,
                _ => continue,
            }
        }

        if char2gid.is_empty() {
            return Err(TrueTypeFontError::CMapNotFound);
        }
        Ok(UnicodeCmap { char2gid })
    }

    fn read_u16(&mut self) -> Result<u16, TrueTypeFontError> {
        let mut b = [0u8; 2];
        self.reader.read_exact(&mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    fn read_u32(&mut self) -> Result<u32, TrueTypeFontError> {
        let mut b = [0u8; 4];
        self.reader.read_exact(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    fn read_u16_array(&mut self, n: usize) -> Result<Vec<u16>, TrueTypeFontError> {
        (0..n).map(|_| self.read_u16()).collect()
    }

    /// Format 0: byte encoding table.
    fn parse_format_0(&mut self, char2gid: &mut HashMap<u32, u32>) -> Result<(), TrueTypeFontError> {
        // length, language
        self.read_u16()?;
        self.read_u16()?;
        let mut glyph_ids = [0u8; 256];
        self.reader.read_exact(&mut glyph_ids)?;
        for (code, &gid) in glyph_ids.iter().enumerate() {
            char2gid.entry(code as u32).or_insert(u32::from(gid));
        }
        Ok(())
    }

    /// Format 4: segment mapping to delta values.
    fn parse_format_4(&mut self, char2gid: &mut HashMap<u32, u32>) -> Result<(), TrueTypeFontError> {
        // length, language
        self.read_u16()?;
        self.read_u16()?;
        let segcount = (self.read_u16()? / 2) as usize;
        // searchRange, entrySelector, rangeShift
        for _ in 0..3 {
            self.read_u16()?;
        }
        let end_codes = self.read_u16_array(segcount)?;
        // reservedPad
        self.read_u16()?;
        let start_codes = self.read_u16_array(segcount)?;
        let id_deltas = self.read_u16_array(segcount)?;
        let range_pos = self.reader.stream_position()?;
        let id_range_offsets = self.read_u16_array(segcount)?;

        for i in 0..segcount {
            let (sc, ec) = (start_codes[i], end_codes[i]);
            let idd = id_deltas[i] as i16 as i32;
            let idr = id_range_offsets[i];
            if sc > ec {
                continue;
            }
            if idr != 0 {
                let offset_pos = range_pos + (i * 2) as u64 + u64::from(idr);
                self.reader.seek(SeekFrom::Start(offset_pos))?;
                for c in sc..=ec {
                    let raw = match self.read_u16() {
                        Ok(v) => i32::from(v),
                        // glyphIdArray shorter than declared
                        Err(_) => break,
                    };
                    let gid = if raw == 0 { 0 } else { ((raw + idd) & 0xFFFF) as u32 };
                    char2gid.entry(u32::from(c)).or_insert(gid);
                }
            } else {
                for c in sc..=ec {
                    let gid = ((i32::from(c) + idd) & 0xFFFF) as u32;
                    char2gid.entry(u32::from(c)).or_insert(gid);
                }
            }
        }
        Ok(())
    }

    /// Format 12: segmented coverage (full Unicode range).
    fn parse_format_12(&mut self, char2gid: &mut HashMap<u32, u32>) -> Result<(), TrueTypeFontError> {
        // reserved, length, language
        self.read_u16()?;
        self.read_u32()?;
        self.read_u32()?;
        let ngroups = self.read_u32()?;
        for _ in 0..ngroups {
            let start = self.read_u32()?;
            let end = self.read_u32()?.min(MAX_CODEPOINT);
            let start_gid = self.read_u32()?;
            if start > end || start_gid > MAX_GLYPH_ID {
                continue;
            }
            // glyph ids are 16 bit, the group cannot cover more than what is left
            let end = end.min(start + (MAX_GLYPH_ID - start_gid));
            for c in start..=end {
                char2gid.entry(c).or_insert(start_gid + (c - start));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// sfnt with a single cmap table holding one subtable.
    fn font_with_subtable(platform: u16, encoding: u16, sub: &[u8]) -> Vec<u8> {
        let mut cmap = Vec::new();
        cmap.extend_from_slice(&0u16.to_be_bytes());
        cmap.extend_from_slice(&1u16.to_be_bytes());
        cmap.extend_from_slice(&platform.to_be_bytes());
        cmap.extend_from_slice(&encoding.to_be_bytes());
        cmap.extend_from_slice(&12u32.to_be_bytes());
        cmap.extend_from_slice(sub);

        let mut font = Vec::new();
        font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        font.extend_from_slice(&1u16.to_be_bytes());
        font.extend_from_slice(&[0; 6]);
        font.extend_from_slice(b"cmap");
        font.extend_from_slice(&0u32.to_be_bytes());
        font.extend_from_slice(&28u32.to_be_bytes());
        font.extend_from_slice(&(cmap.len() as u32).to_be_bytes());
        font.extend_from_slice(&cmap);
        font
    }

    /// Format 4 subtable mapping 'A'..='C' to glyphs 10..=12.
    fn font_with_format4() -> Vec<u8> {
        let mut sub = Vec::new();
        let segcount: u16 = 2;
        sub.extend_from_slice(&4u16.to_be_bytes());
        sub.extend_from_slice(&0u16.to_be_bytes()); // length (unused)
        sub.extend_from_slice(&0u16.to_be_bytes()); // language
        sub.extend_from_slice(&(segcount * 2).to_be_bytes());
        sub.extend_from_slice(&[0; 6]);
        sub.extend_from_slice(&0x43u16.to_be_bytes());
        sub.extend_from_slice(&0xFFFFu16.to_be_bytes());
        sub.extend_from_slice(&0u16.to_be_bytes()); // reservedPad
        sub.extend_from_slice(&0x41u16.to_be_bytes());
        sub.extend_from_slice(&0xFFFFu16.to_be_bytes());
        sub.extend_from_slice(&((10i16 - 0x41) as u16).to_be_bytes());
        sub.extend_from_slice(&1u16.to_be_bytes());
        sub.extend_from_slice(&0u16.to_be_bytes());
        sub.extend_from_slice(&0u16.to_be_bytes());
        font_with_subtable(3, 1, &sub)
    }

    /// Format 12 subtable from `(start, end, start_gid)` groups.
    fn font_with_format12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut sub = Vec::new();
        sub.extend_from_slice(&12u16.to_be_bytes());
        sub.extend_from_slice(&0u16.to_be_bytes());
        sub.extend_from_slice(&(16 + 12 * groups.len() as u32).to_be_bytes());
        sub.extend_from_slice(&0u32.to_be_bytes());
        sub.extend_from_slice(&(groups.len() as u32).to_be_bytes());
        for &(start, end, gid) in groups {
            sub.extend_from_slice(&start.to_be_bytes());
            sub.extend_from_slice(&end.to_be_bytes());
            sub.extend_from_slice(&gid.to_be_bytes());
        }
        font_with_subtable(3, 10, &sub)
    }

    #[test]
    fn test_format4_lookup() {
        let cmap = UnicodeCmap::parse(&font_with_format4()).unwrap();
        assert_eq!(cmap.glyph_id('A' as u32), Some(10));
        assert_eq!(cmap.glyph_id('C' as u32), Some(12));
        assert_eq!(cmap.glyph_id('D' as u32), None);
    }

    #[test]
    fn test_empty_data_fails() {
        assert!(UnicodeCmap::parse(&[]).is_err());
        assert!(UnicodeCmap::parse(&[0u8; 100]).is_err());
    }

    #[test]
    fn test_format12_lookup() {
        let cmap = UnicodeCmap::parse(&font_with_format12(&[
            (0x41, 0x43, 100),
            (0x1F600, 0x1F601, 200),
        ]))
        .unwrap();
        assert_eq!(cmap.glyph_id('B' as u32), Some(101));
        assert_eq!(cmap.glyph_id(0x1F601), Some(201));
        assert_eq!(cmap.glyph_id('D' as u32), None);
        assert_eq!(cmap.len(), 5);
    }

    #[test]
    fn test_format12_glyph_ids_stop_at_u16() {
        let cmap = UnicodeCmap::parse(&font_with_format12(&[
            (0x41, 0x42, u32::MAX),
            (0x50, 0x60, 0xFFFE),
        ]))
        .unwrap();
        assert_eq!(cmap.glyph_id(0x41), None);
        assert_eq!(cmap.glyph_id(0x50), Some(0xFFFE));
        assert_eq!(cmap.glyph_id(0x51), Some(0xFFFF));
        assert_eq!(cmap.glyph_id(0x52), None);
        assert_eq!(cmap.len(), 2);
    }

    #[test]
    fn test_format12_groups_bounded_to_unicode() {
        let groups: Vec<(u32, u32, u32)> = (0..8u32)
            .map(|i| (i * 0x20_0000, i * 0x20_0000 + 0x10_FFFF, 1))
            .collect();
        let cmap = UnicodeCmap::parse(&font_with_format12(&groups)).unwrap();
        // only the first group starts inside Unicode, and it runs out of glyph ids
        assert_eq!(cmap.len(), 0xFFFF);
        assert_eq!(cmap.glyph_id(0x2_0000), None);
    }
}
