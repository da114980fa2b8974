use std::ops::Range;
use std::{fmt, str};

use log::{debug, warn};

use crate::cursor::LumpCursor;
use crate::error::{LumpError, Result};

const COMPRESSED_BIT: u8 = 0x80;

/// The lumps that follow a map marker, in the order the node builders write
/// them. The discriminant is the offset from the marker, so combining the
/// index of "E1M1" with a `MapLump` finds a specific lump of that map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLump {
    /// Position and angle for all monster, powerup and spawn location
    Things = 1,
    /// An array of lines referencing two vertices (Two vertexes are connected
    /// by one `LineDef`). This is a direct
    /// translation of the lines used in DoomED. Also points to one or two
    /// `SideDef` depending on if this line is a wall or a portal
    LineDefs,
    /// Defines upper, lower, and middle textures. Also defines texture
    /// horizontal and vertical offsets. This is information for a `LineDef`
    SideDefs,
    /// An array of signed short X, Y pairs (`Vertex`). All coordinates in this map
    /// block are indexes into this array
    Vertexes,
    /// Portions of lines cut due to Binary Space Partitioning (see page
    /// 202 in Fabien Sanglard's Game Engine Black Book - DOOM).
    /// Each `SubSectors`'s geometry is defined by the `Segs` which it contains
    Segs,
    /// Set of segments of a `LineDef` representing a convex subspace
    SubSectors,
    /// BSP with segs, nodes and sub-sector leaves
    Nodes,
    /// Area surrounded by lines, with set ceiling and floor textures/heights
    /// with light level
    Sectors,
    /// Sector-to-sector visibility matrix to speed-up line of sight
    /// calculations
    Reject,
    /// 128x128 grid partition of the map LINEDEFS to accelerate collision
    /// detection
    Blockmap,
}

impl MapLump {
    pub const fn name(self) -> &'static str {
        match self {
            MapLump::Things => "THINGS",
            MapLump::LineDefs => "LINEDEFS",
            MapLump::SideDefs => "SIDEDEFS",
            MapLump::Vertexes => "VERTEXES",
            MapLump::Segs => "SEGS",
            MapLump::SubSectors => "SSECTORS",
            MapLump::Nodes => "NODES",
            MapLump::Sectors => "SECTORS",
            MapLump::Reject => "REJECT",
            MapLump::Blockmap => "BLOCKMAP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WadKind {
    /// Game data
    Iwad,
    /// Patch
    Pwad,
}

/// Header which tells us the WAD type and where the data is
///
/// The header structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                              |
/// |------------|--------------|------------------------------------------------------|
/// | 0x00-0x03  | 4 ASCII char | *Must* be an ASCII string (either "IWAD" or "PWAD")  |
/// | 0x04-0x07  | unsigned int | The number entries in the directory                  |
/// | 0x08-0x0b  | unsigned int | Offset in bytes to the directory in the WAD file     |
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadHeader {
    pub kind: WadKind,
    /// The count of "lumps" of data
    pub lump_count: u32,
    /// Offset in bytes that the directory starts at
    pub directory_offset: u32,
}

impl WadHeader {
    pub const SIZE: usize = 12;

    pub fn decode(cursor: &mut LumpCursor<'_>, big_endian: bool) -> Result<Self> {
        let ident = cursor.read_bytes::<4>()?;
        let kind = match &ident {
            b"IWAD" => WadKind::Iwad,
            b"PWAD" => WadKind::Pwad,
            _ => return Err(LumpError::BadIdentification(ident)),
        };
        let (lump_count, directory_offset) = if big_endian {
            (cursor.read_u32_be()?, cursor.read_u32_be()?)
        } else {
            (cursor.read_u32()?, cursor.read_u32()?)
        };

        Ok(WadHeader {
            kind,
            lump_count,
            directory_offset,
        })
    }
}

/// Contains the details for a lump of data: where it starts, the size of it, and the name
///
/// The directory structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                                    |
/// |------------|--------------|------------------------------------------------------------|
/// | 0x00-0x03  | unsigned int | Offset value to the start of the lump data in the WAD file |
/// | 0x04-0x07  | unsigned int | The size of the lump in bytes                              |
/// | 0x08-0x0f  | 8 ASCII char | ASCII holding the name of the lump                         |
///
/// The top bit of the first name byte marks a compressed lump (Jaguar
/// archives). It is cleared before the name is built.
#[derive(Clone, PartialEq, Eq)]
pub struct LumpEntry {
    /// The offset in bytes where the lump data starts
    pub offset: u32,
    /// The size in bytes of the lump referenced
    pub size: u32,
    /// The name bytes exactly as stored
    pub raw_name: [u8; 8],
    /// Upper case name with the compression marker removed
    pub name: String,
    pub compressed: bool,
    /// Byte order the entry was read with
    pub big_endian: bool,
}

impl fmt::Debug for LumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nLumpEntry {{\n  name: {},\n  size: {},\n  offset: {},\n  compressed: {},\n}}",
            &self.name, self.size, self.offset, self.compressed
        )
    }
}

impl LumpEntry {
    pub const SIZE: usize = 4 + 4 + 8;

    pub fn decode(cursor: &mut LumpCursor<'_>, big_endian: bool) -> Result<Self> {
        let (offset, size) = if big_endian {
            (cursor.read_u32_be()?, cursor.read_u32_be()?)
        } else {
            (cursor.read_u32()?, cursor.read_u32()?)
        };
        let raw_name = cursor.read_bytes::<8>()?;
        let compressed = raw_name[0] & COMPRESSED_BIT != 0;

        Ok(LumpEntry {
            offset,
            size,
            raw_name,
            name: lump_name(&raw_name),
            compressed,
            big_endian,
        })
    }

    /// Zero-sized lumps only mark a position, such as a map header or `F_START`
    pub fn is_marker(&self) -> bool {
        self.size == 0
    }

    /// Byte range of the lump within the archive, `None` if it overflows
    pub fn range(&self) -> Option<Range<usize>> {
        let start = self.offset as usize;
        start.checked_add(self.size as usize).map(|end| start..end)
    }
}

/// Names are Latin-1, null padded to 8 bytes, and compared upper case. The
/// terminator is found on the stored bytes, so a bare compression marker in
/// byte 0 becomes a leading NUL rather than an empty name.
fn lump_name(raw: &[u8; 8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let mut bytes = *raw;
    bytes[0] &= !COMPRESSED_BIT;
    bytes[..end]
        .iter()
        .map(|&b| b as char)
        .collect::<String>()
        .to_uppercase()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Header and directory integers are big endian (byte-swapped console
    /// ports). Lump contents are unaffected.
    pub big_endian: bool,
}

/// "Where's All (the) Data": borrows a WAD already in memory, plus an array of
/// directory entries telling us where each data lump starts
pub struct WadArchive<'a> {
    data: &'a [u8],
    header: WadHeader,
    lumps: Vec<LumpEntry>,
}

impl fmt::Debug for WadArchive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nWadArchive {{\n  header: {:?},\n  len: {},\n  lumps: {:?},\n}}",
            self.header,
            self.data.len(),
            self.lumps
        )
    }
}

impl<'a> WadArchive<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        Self::parse_with(data, ArchiveOptions::default())
    }

    pub fn parse_with(data: &'a [u8], options: ArchiveOptions) -> Result<Self> {
        let header = WadHeader::decode(&mut LumpCursor::new(data), options.big_endian)?;

        let count = header.lump_count as usize;
        let mut cursor = LumpCursor::at(data, header.directory_offset as usize);
        let dir_len = count.saturating_mul(LumpEntry::SIZE);
        if dir_len > cursor.remaining() {
            return Err(LumpError::Truncated {
                needed: (header.directory_offset as usize).saturating_add(dir_len),
                available: data.len(),
            });
        }

        let mut lumps = Vec::with_capacity(count);
        for _ in 0..count {
            let entry = LumpEntry::decode(&mut cursor, options.big_endian)?;
            if !entry.range().is_some_and(|r| r.end <= data.len()) {
                warn!(
                    "Lump {} at {} of {} bytes lies outside the archive",
                    entry.name, entry.offset, entry.size
                );
            }
            lumps.push(entry);
        }
        debug!("{:?} with {} lumps", header.kind, lumps.len());

        Ok(WadArchive {
            data,
            header,
            lumps,
        })
    }

    pub fn header(&self) -> &WadHeader {
        &self.header
    }

    pub fn lumps(&self) -> &[LumpEntry] {
        &self.lumps
    }

    pub fn lump(&self, index: usize) -> Option<&LumpEntry> {
        self.lumps.get(index)
    }

    /// Index of the lump with this name. Later lumps override earlier ones of
    /// the same name, so the search runs from the end.
    pub fn find_lump(&self, name: &str) -> Option<usize> {
        self.lumps
            .iter()
            .rposition(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// The bytes of a lump, borrowed from the archive
    pub fn lump_data(&self, index: usize) -> Result<&'a [u8]> {
        let entry = self
            .lumps
            .get(index)
            .ok_or_else(|| LumpError::MissingLump(format!("#{}", index)))?;
        if entry.compressed {
            return Err(LumpError::CompressedLump(entry.name.clone()));
        }
        entry
            .range()
            .and_then(|r| self.data.get(r))
            .ok_or_else(|| LumpError::LumpOutOfBounds {
                name: entry.name.clone(),
                offset: entry.offset,
                size: entry.size,
                archive_len: self.data.len(),
            })
    }

    pub fn lump_by_name(&self, name: &str) -> Result<&'a [u8]> {
        let index = self
            .find_lump(name)
            .ok_or_else(|| LumpError::MissingLump(name.to_owned()))?;
        self.lump_data(index)
    }

    /// Find one of the lumps belonging to a map, checking the lump at the
    /// expected position carries the expected name
    pub fn map_lump(&self, map_name: &str, kind: MapLump) -> Result<&'a [u8]> {
        let missing = || LumpError::MissingLump(format!("{}/{}", map_name, kind.name()));
        let index = self.find_lump(map_name).ok_or_else(missing)? + kind as usize;
        match self.lumps.get(index) {
            Some(entry) if entry.name == kind.name() => self.lump_data(index),
            _ => Err(missing()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::WadBuilder;

    fn entry_bytes(offset: u32, size: u32, name: [u8; 8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&name);
        out
    }

    #[test]
    fn plain_entry() {
        let data = entry_bytes(12, 1234, *b"e1m1\0\0\0\0");
        let entry = LumpEntry::decode(&mut LumpCursor::new(&data), false).unwrap();
        assert_eq!(entry.offset, 12);
        assert_eq!(entry.size, 1234);
        assert_eq!(entry.name, "E1M1");
        assert_eq!(&entry.raw_name, b"e1m1\0\0\0\0");
        assert!(!entry.compressed);
        assert_eq!(entry.range(), Some(12..1246));
    }

    #[test]
    fn compressed_entry() {
        let data = entry_bytes(0, 0, [0xC8, b'e', b'l', b'p', b'1', 0, 0, 0]);
        let entry = LumpEntry::decode(&mut LumpCursor::new(&data), false).unwrap();
        assert!(entry.compressed);
        assert_eq!(entry.name, "HELP1");
        assert_eq!(entry.raw_name[0], 0xC8);
    }

    #[test]
    fn marker_bit_alone_keeps_the_tail() {
        let data = entry_bytes(0, 0, [0x80, b'a', b'b', 0, b'z', 0, 0, 0]);
        let entry = LumpEntry::decode(&mut LumpCursor::new(&data), false).unwrap();
        assert!(entry.compressed);
        assert_eq!(entry.name, "\0AB");
    }

    #[test]
    fn zero_size_is_a_marker() {
        let marker = entry_bytes(64, 0, *b"F_START\0");
        let lump = entry_bytes(64, 4096, *b"FLOOR4_8");
        assert!(LumpEntry::decode(&mut LumpCursor::new(&marker), false)
            .unwrap()
            .is_marker());
        assert!(!LumpEntry::decode(&mut LumpCursor::new(&lump), false)
            .unwrap()
            .is_marker());
    }

    #[test]
    fn full_eight_char_name() {
        let data = entry_bytes(0, 0, *b"VERTEXES");
        let entry = LumpEntry::decode(&mut LumpCursor::new(&data), false).unwrap();
        assert_eq!(entry.name, "VERTEXES");
    }

    #[test]
    fn sizes_are_unsigned() {
        let data = entry_bytes(0xffff_fff0, 0x8000_0000, *b"BIG\0\0\0\0\0");
        let entry = LumpEntry::decode(&mut LumpCursor::new(&data), false).unwrap();
        assert_eq!(entry.offset, 0xffff_fff0);
        assert_eq!(entry.size, 0x8000_0000);
    }

    #[test]
    fn big_endian_entry() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0102_0304u32.to_be_bytes());
        data.extend_from_slice(&0x8000_0010u32.to_be_bytes());
        data.extend_from_slice(b"MAP01\0\0\0");
        let entry = LumpEntry::decode(&mut LumpCursor::new(&data), true).unwrap();
        assert_eq!(entry.offset, 0x0102_0304);
        assert_eq!(entry.size, 0x8000_0010);
        assert!(entry.big_endian);
    }

    #[test]
    fn truncated_entry() {
        let data = entry_bytes(0, 0, *b"SHORT\0\0\0");
        assert!(matches!(
            LumpEntry::decode(&mut LumpCursor::new(&data[..12]), false),
            Err(LumpError::UnexpectedEnd { wanted: 8, .. })
        ));
    }

    #[test]
    fn header_kinds() {
        let mut data = b"PWAD".to_vec();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&64u32.to_le_bytes());
        let header = WadHeader::decode(&mut LumpCursor::new(&data), false).unwrap();
        assert_eq!(header.kind, WadKind::Pwad);
        assert_eq!(header.lump_count, 3);
        assert_eq!(header.directory_offset, 64);

        data[..4].copy_from_slice(b"ZWAD");
        assert!(matches!(
            WadHeader::decode(&mut LumpCursor::new(&data), false),
            Err(LumpError::BadIdentification(id)) if &id == b"ZWAD"
        ));
    }

    #[test]
    fn archive_lookup() {
        let data = WadBuilder::iwad()
            .lump("PLAYPAL", &[1, 2, 3])
            .lump("E1M1", &[])
            .lump("THINGS", &[9; 10])
            .lump("playpal", &[4, 5])
            .build();
        let wad = WadArchive::parse(&data).unwrap();

        assert_eq!(wad.header().kind, WadKind::Iwad);
        assert_eq!(wad.lumps().len(), 4);
        assert_eq!(wad.find_lump("e1m1"), Some(1));
        // last one wins
        assert_eq!(wad.find_lump("PLAYPAL"), Some(3));
        assert_eq!(wad.lump_by_name("PLAYPAL").unwrap(), &[4, 5]);
        assert_eq!(wad.map_lump("E1M1", MapLump::Things).unwrap(), &[9; 10]);
        assert!(matches!(
            wad.map_lump("E1M1", MapLump::LineDefs),
            Err(LumpError::MissingLump(_))
        ));
        assert!(matches!(
            wad.lump_by_name("E1M2"),
            Err(LumpError::MissingLump(_))
        ));
    }

    #[test]
    fn big_endian_archive() {
        let data = WadBuilder::pwad()
            .big_endian()
            .lump("DEMO1", &[7; 6])
            .build();
        assert!(WadArchive::parse(&data).is_err());
        let wad = WadArchive::parse_with(&data, ArchiveOptions { big_endian: true }).unwrap();
        assert_eq!(wad.lump_by_name("DEMO1").unwrap(), &[7; 6]);
    }

    #[test]
    fn directory_past_end() {
        let mut data = WadBuilder::pwad().lump("A", &[0; 4]).build();
        data.truncate(data.len() - 1);
        assert!(matches!(
            WadArchive::parse(&data),
            Err(LumpError::Truncated { .. })
        ));
    }

    #[test]
    fn bad_lump_ranges_are_refused() {
        let mut data = WadBuilder::pwad().lump("A", &[0; 4]).build();
        let dir = data.len() - LumpEntry::SIZE;
        // grow the size field past the archive
        data[dir + 4..dir + 8].copy_from_slice(&0xffffu32.to_le_bytes());
        let wad = WadArchive::parse(&data).unwrap();
        assert!(matches!(
            wad.lump_data(0),
            Err(LumpError::LumpOutOfBounds { size: 0xffff, .. })
        ));
    }

    #[test]
    fn compressed_lumps_are_refused() {
        let mut data = WadBuilder::pwad().lump("TITLE", &[0; 4]).build();
        let dir = data.len() - LumpEntry::SIZE;
        data[dir + 8] |= 0x80;
        let wad = WadArchive::parse(&data).unwrap();
        assert_eq!(wad.lumps()[0].name, "TITLE");
        assert!(matches!(
            wad.lump_by_name("TITLE"),
            Err(LumpError::CompressedLump(_))
        ));
    }
}
