use thiserror::Error;

use crate::compat::ExtendedNodeType;

pub type Result<T> = std::result::Result<T, LumpError>;

/// Everything that can go wrong while pulling records out of a WAD. None of
/// these are fatal: a failed lump simply yields no records and the caller
/// decides whether to try another format or give up on the level.
#[derive(Debug, Error)]
pub enum LumpError {
    /// A primitive read wanted more bytes than the region had left
    #[error("read of {wanted} bytes at offset {offset} overruns region ({remaining} left)")]
    UnexpectedEnd {
        offset: usize,
        wanted: usize,
        remaining: usize,
    },
    /// The lump is too short for its header or for a whole record
    #[error("truncated input: needed {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    #[error("signature mismatch: expected {expected:02x?}, found {found:02x?}")]
    FormatMismatch { expected: [u8; 8], found: [u8; 8] },
    #[error("not a WAD, identification was {0:?}")]
    BadIdentification([u8; 4]),
    #[error("lump {name} ({offset}+{size}) lies outside the archive of {archive_len} bytes")]
    LumpOutOfBounds {
        name: String,
        offset: u32,
        size: u32,
        archive_len: usize,
    },
    #[error("lump {0} is compressed")]
    CompressedLump(String),
    #[error("no lump named {0}")]
    MissingLump(String),
    #[error("{0:?} nodes are not supported")]
    UnsupportedNodes(ExtendedNodeType),
    #[error("could not inflate ZDoom nodes: {0}")]
    Decompress(#[from] std::io::Error),
}
