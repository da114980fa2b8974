//! Several archives searched as one. Patch WADs are added on top of the game
//! WAD and anything they carry replaces the lump of the same name below.

use log::{debug, info};

use crate::directory::{LumpEntry, MapLump, WadArchive};
use crate::error::{LumpError, Result};

/// A lump located within a stack: which archive, then which directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LumpRef {
    pub archive: usize,
    pub index: usize,
}

/// Archives in load order. Later archives win every lookup.
#[derive(Debug, Default)]
pub struct WadStack<'a> {
    archives: Vec<WadArchive<'a>>,
}

impl<'a> WadStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, archive: WadArchive<'a>) {
        info!(
            "Added {:?} with {} lumps",
            archive.header().kind,
            archive.lumps().len()
        );
        self.archives.push(archive);
    }

    pub fn archives(&self) -> &[WadArchive<'a>] {
        &self.archives
    }

    /// Total directory entries across all archives
    pub fn lump_count(&self) -> usize {
        self.archives.iter().map(|a| a.lumps().len()).sum()
    }

    pub fn entry(&self, lump: LumpRef) -> Option<&LumpEntry> {
        self.archives.get(lump.archive)?.lump(lump.index)
    }

    /// The newest lump with this name, case-insensitive
    pub fn find_lump(&self, name: &str) -> Option<LumpRef> {
        self.archives
            .iter()
            .enumerate()
            .rev()
            .find_map(|(archive, wad)| {
                wad.find_lump(name).map(|index| LumpRef { archive, index })
            })
    }

    /// Every lump with this name, newest first
    pub fn find_all(&self, name: &str) -> Vec<LumpRef> {
        let mut found = Vec::new();
        for (archive, wad) in self.archives.iter().enumerate().rev() {
            for (index, entry) in wad.lumps().iter().enumerate().rev() {
                if entry.name.eq_ignore_ascii_case(name) {
                    found.push(LumpRef { archive, index });
                }
            }
        }
        debug!("{} copies of {}", found.len(), name);
        found
    }

    pub fn lump_data(&self, lump: LumpRef) -> Result<&'a [u8]> {
        self.archives
            .get(lump.archive)
            .ok_or_else(|| {
                LumpError::MissingLump(format!("#{}:{}", lump.archive, lump.index))
            })?
            .lump_data(lump.index)
    }

    pub fn lump_by_name(&self, name: &str) -> Result<&'a [u8]> {
        let lump = self
            .find_lump(name)
            .ok_or_else(|| LumpError::MissingLump(name.to_owned()))?;
        self.lump_data(lump)
    }

    /// Map lumps always come from the archive holding the newest copy of the
    /// map marker, never mixed across archives
    pub fn map_lump(&self, map_name: &str, kind: MapLump) -> Result<&'a [u8]> {
        let marker = self
            .find_lump(map_name)
            .ok_or_else(|| LumpError::MissingLump(map_name.to_owned()))?;
        self.archives[marker.archive].map_lump(map_name, kind)
    }
}
