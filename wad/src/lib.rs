//! Decoding of WAD archives and the BSP lumps of the maps inside them:
//! vanilla nodes, DeepBSP v4 extended nodes and ZDoom XNOD/ZNOD nodes.
//!
//! Nothing here touches the filesystem. Everything borrows from a byte slice
//! the caller has loaded.
//!
//! The structure of a WAD is this:
//!
//! ```text,ignore
//!                        <───── 32 bits ──────>
//!                        ┌────────────────────┐
//!             ┌──── 0x00 |  ASCII WAD Type    | 0x03
//!             |          | ────────────────── |
//!     Header ─┤     0x04 | # of directories   | 0x07
//!             |          | ────────────────── |
//!             └──── 0x08 | offset to listing ───0x0B ──┐
//!             ┌───────── | ────────────────── |        |
//!             |     0x0C | ┌────────────────┐ |        |
//!             |          | |   Lump Bytes   |<─────┐   |
//!     Lumps ──┤          | |       .        | |    |   |
//!             |          | └────────────────┘ |    |   |
//!             |          |         .          |    |   |
//!             └───────── |         .          |    |   |
//!             ┌───────── | ┌────────────────┐<─────────┘
//!             |          | |   Lump Offset  |──────┘
//!             |          | |----------------| |
//!  Directory ─┤          | |   Lump Size    | |
//!     List    |          | |----------------| |
//!             |          | |   Lump Name    | |
//!             |          | └────────────────┘ |
//!             |          |         .          |
//!             |          |         .          |
//!             |          |         .          |
//!             └───────── └────────────────────┘
//! ```

/// Lumps are read byte by byte through a bounds checked cursor
pub mod cursor;
pub mod error;

/// The WAD header, directory and lookup of lumps by name
pub mod directory;

/// A Lump is a chunk of data that starts at an offset in the WAD, and ends
/// at a location that is `sizeof<record-in-lump> * num-of-entries`
///
/// The lump module contains the vanilla record layouts
pub mod lumps;
/// Widened records written by DeepBSP and ZDoom node builders
pub mod extended;
pub mod signed;
pub mod iterators;
pub mod compat;
pub mod level;
/// PWADs layered over an IWAD
pub mod stack;

#[cfg(test)]
pub(crate) mod test;

pub use crate::compat::{ExtendedNodeType, NodeLumpType, WadExtendedMap};
pub use crate::cursor::{LumpCursor, WadRecord};
pub use crate::directory::{
    ArchiveOptions, LumpEntry, MapLump, WadArchive, WadHeader, WadKind,
};
pub use crate::error::{LumpError, Result};
pub use crate::iterators::RecordIter;
pub use crate::level::{LevelNodes, Node, Seg, SubSector};
pub use crate::lumps::ChildRef;
pub use crate::signed::{DeepNodesV4, LumpStatus, SignedLump, ZNodeSegs};
pub use crate::stack::{LumpRef, WadStack};
