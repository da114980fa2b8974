//! Lumps that open with an 8-byte signature followed by a packed array of
//! fixed-size records.
//!
//! DeepBSP v4 nodes and ZDoom segs both carry `xNd4\0\0\0\0`, so the signature
//! says "extended layout" and nothing about which lump it is. The caller has
//! to know whether it is holding a NODES or a SEGS lump before picking the
//! decoder.

use log::{debug, warn};

use crate::cursor::{LumpCursor, WadRecord};
use crate::error::{LumpError, Result};
use crate::extended::{WadExtNode, WadSegmentZ};

pub const SIGNATURE_LEN: usize = 8;
pub const DEEPBSP_SIGNATURE: [u8; SIGNATURE_LEN] = *b"xNd4\0\0\0\0";

/// A record type that is stored behind a signature
pub trait SignedRecord: WadRecord {
    const SIGNATURE: [u8; SIGNATURE_LEN];
    /// Used in log output
    const KIND: &'static str;
}

impl SignedRecord for WadExtNode {
    const SIGNATURE: [u8; SIGNATURE_LEN] = DEEPBSP_SIGNATURE;
    const KIND: &'static str = "DeepBSP v4 nodes";
}

impl SignedRecord for WadSegmentZ {
    const SIGNATURE: [u8; SIGNATURE_LEN] = DEEPBSP_SIGNATURE;
    const KIND: &'static str = "ZDoom segs";
}

/// Outcome of unpacking a signed lump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LumpStatus {
    Valid,
    /// Shorter than the signature
    Truncated { available: usize },
    FormatMismatch,
    /// Records decoded fine but this many bytes were left over at the end
    PartialTrailingBytes(usize),
}

impl LumpStatus {
    /// True when the records can be used, trailing garbage or not
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Valid | Self::PartialTrailingBytes(_))
    }
}

/// The decoded contents of a signed lump. Always well formed: when the lump is
/// too short or the signature is wrong there are simply no records.
#[derive(Debug, Clone)]
pub struct SignedLump<R> {
    header: [u8; SIGNATURE_LEN],
    records: Vec<R>,
    status: LumpStatus,
    consumed: usize,
}

pub type DeepNodesV4 = SignedLump<WadExtNode>;
pub type ZNodeSegs = SignedLump<WadSegmentZ>;

impl<R: SignedRecord> SignedLump<R> {
    pub fn unpack(data: &[u8]) -> Self {
        let mut cursor = LumpCursor::new(data);
        let mut lump = Self {
            header: [0; SIGNATURE_LEN],
            records: Vec::new(),
            status: LumpStatus::Valid,
            consumed: 0,
        };

        let Ok(header) = cursor.read_bytes::<SIGNATURE_LEN>() else {
            debug!("{} lump too short for a signature: {} bytes", R::KIND, data.len());
            lump.status = LumpStatus::Truncated {
                available: data.len(),
            };
            return lump;
        };
        lump.header = header;
        lump.consumed = cursor.position();

        if header != R::SIGNATURE {
            debug!("{} signature mismatch: {:02x?}", R::KIND, header);
            lump.status = LumpStatus::FormatMismatch;
            return lump;
        }

        let body = cursor.remaining();
        let count = body / R::SIZE;
        let trailing = body % R::SIZE;

        match cursor.read_records::<R>(count) {
            Ok(records) => lump.records = records,
            Err(e) => {
                // Only reachable if a record decodes more than R::SIZE bytes
                warn!("{}: {}", R::KIND, e);
                lump.status = LumpStatus::Truncated {
                    available: data.len(),
                };
                return lump;
            }
        }
        lump.consumed = cursor.position();

        if trailing != 0 {
            warn!(
                "{}: {} trailing bytes after {} records of {} bytes",
                R::KIND,
                trailing,
                count,
                R::SIZE
            );
            lump.status = LumpStatus::PartialTrailingBytes(trailing);
        }
        debug!("{}: decoded {} records", R::KIND, count);
        lump
    }

    /// As `unpack`, but a short lump or a wrong signature is an error.
    /// Trailing bytes are still only a warning.
    pub fn try_unpack(data: &[u8]) -> Result<Self> {
        let lump = Self::unpack(data);
        match lump.status {
            LumpStatus::Truncated { available } => Err(LumpError::Truncated {
                needed: SIGNATURE_LEN,
                available,
            }),
            LumpStatus::FormatMismatch => Err(LumpError::FormatMismatch {
                expected: R::SIGNATURE,
                found: lump.header,
            }),
            LumpStatus::Valid | LumpStatus::PartialTrailingBytes(_) => Ok(lump),
        }
    }

    /// Whether the signature matched byte for byte
    pub fn format_ok(&self) -> bool {
        self.header == R::SIGNATURE
    }
}

impl<R> SignedLump<R> {
    pub fn header(&self) -> &[u8; SIGNATURE_LEN] {
        &self.header
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn status(&self) -> LumpStatus {
        self.status
    }

    pub fn trailing_bytes(&self) -> usize {
        match self.status {
            LumpStatus::PartialTrailingBytes(n) => n,
            _ => 0,
        }
    }

    /// How far into the lump decoding got
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl DeepNodesV4 {
    pub fn nodes(&self) -> &[WadExtNode] {
        self.records()
    }
}

impl ZNodeSegs {
    pub fn segs(&self) -> &[WadSegmentZ] {
        self.records()
    }
}
