use std::io::{self, Read};

use flate2::read::ZlibDecoder;
use log::{debug, warn};

use crate::cursor::LumpCursor;
use crate::error::{LumpError, Result};
use crate::extended::{WadExtNode, WadGlVertex, WadSegmentZ, WadSubSectorZ};
use crate::signed::DEEPBSP_SIGNATURE;

/// Upper bound for an inflated ZNOD lump
pub const MAX_INFLATED_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedNodeType {
    XNOD,
    XGLN,
    XGL2,
    ZNOD,
    ZGLN,
    ZGL2,
}

impl ExtendedNodeType {
    pub fn is_uncompressed(&self) -> bool {
        matches!(
            self,
            ExtendedNodeType::XGL2 | ExtendedNodeType::XGLN | ExtendedNodeType::XNOD
        )
    }

    pub fn is_gl(&self) -> bool {
        matches!(
            self,
            ExtendedNodeType::XGL2
                | ExtendedNodeType::XGLN
                | ExtendedNodeType::ZGL2
                | ExtendedNodeType::ZGLN
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLumpType {
    /// Original Doom style NODES table, use the standard parser
    Classic,
    /// DeepBSP v4: NODES carries `xNd4\0\0\0\0` then 32-byte nodes, and the
    /// SEGS and SSECTORS lumps switch to their widened layouts
    DeepBspV4,
    /// Extended NODES, typically this means the subsectors and segments tables
    /// are empty as all the data is contained here. You should then check if
    /// the table is compressed (with zlib) or uncompressed, and further check
    /// if GL or GL2 style
    Extended(ExtendedNodeType),
}

impl NodeLumpType {
    /// Look at the start of a NODES lump to see which builder made it
    pub fn detect(lump: &[u8]) -> Self {
        if lump.starts_with(&DEEPBSP_SIGNATURE) {
            return Self::DeepBspV4;
        }
        let kind = match lump.get(..4) {
            Some(b"XNOD") => ExtendedNodeType::XNOD,
            Some(b"XGLN") => ExtendedNodeType::XGLN,
            Some(b"XGL2") => ExtendedNodeType::XGL2,
            Some(b"ZNOD") => ExtendedNodeType::ZNOD,
            Some(b"ZGLN") => ExtendedNodeType::ZGLN,
            Some(b"ZGL2") => ExtendedNodeType::ZGL2,
            _ => return Self::Classic,
        };
        Self::Extended(kind)
    }
}

/// The data in the WAD lump is structured as follows:
///
/// Note: a 16:16 fixed point number is stored in 4 bytes.
///
/// | Field Size   | Type    | Content                                                       |
/// |--------------|---------|---------------------------------------------------------------|
/// | 0x00-0x03    | str     | 4 bytes of UTF 8 making up the lump signature, such as `XNOD` |
/// | 0x04-0x07    | u32     | Number of vertices from the VERTEXES lump                     |
/// | 0x08-0x11    | u32     | The `N` additional vertices that follow from here             |
/// | 8-byte chunk | Vertex  | fixed,fixed Vertex: 16:16 fixed-point (x,y). Repeated `N` times from above |
/// | 4-bytes      | u32     | Subsector count                                               |
/// | 4-byte chunk | u32     | Subsector N: Seg count for this subsector                     |
/// | 4-bytes      | u32     | Segs count                                                    |
/// | 11-byte chunk| Segment | Seg N: New layout: `u32`:Vertex 1, `u32`Vertex 2, `u16`:Line, `u8`:Side |
/// | 4-byte chunk | u32     | Node count                                                    |
/// | 32-byte chunk| Node    | Node N: Same as vanilla except child ref are u32              |
///
/// For `ZNOD` everything after the signature is a zlib stream.
#[derive(Debug, Clone)]
pub struct WadExtendedMap {
    pub node_type: ExtendedNodeType,
    pub num_org_vertices: u32,
    /// Numbered after the VERTEXES lump: seg vertex `v >= num_org_vertices`
    /// means `vertexes[v - num_org_vertices]`
    pub vertexes: Vec<WadGlVertex>,
    /// Seg counts only, the start seg is the running total
    pub subsectors: Vec<WadSubSectorZ>,
    pub segments: Vec<WadSegmentZ>,
    pub nodes: Vec<WadExtNode>,
}

impl WadExtendedMap {
    /// `Ok(None)` if the lump is not a ZDoom extended NODES lump at all
    pub fn parse(lump: &[u8]) -> Result<Option<Self>> {
        let NodeLumpType::Extended(node_type) = NodeLumpType::detect(lump) else {
            return Ok(None);
        };
        if node_type.is_gl() {
            return Err(LumpError::UnsupportedNodes(node_type));
        }

        let body = &lump[4..];
        let map = if node_type.is_uncompressed() {
            Self::parse_body(body, node_type)?
        } else {
            Self::parse_body(&inflate(body)?, node_type)?
        };
        Ok(Some(map))
    }

    fn parse_body(data: &[u8], node_type: ExtendedNodeType) -> Result<Self> {
        let mut cursor = LumpCursor::new(data);

        let num_org_vertices = cursor.read_u32()?;
        let num_new_vertices = cursor.read_u32()? as usize;
        // The vertices are in fixed-point format and will require conversion later
        let vertexes = cursor.read_records::<WadGlVertex>(num_new_vertices)?;

        let num_subs = cursor.read_u32()? as usize;
        let subsectors = cursor.read_records::<WadSubSectorZ>(num_subs)?;

        let num_segs = cursor.read_u32()? as usize;
        let segments = cursor.read_records::<WadSegmentZ>(num_segs)?;

        let num_nodes = cursor.read_u32()? as usize;
        let nodes = cursor.read_records::<WadExtNode>(num_nodes)?;

        if !cursor.is_at_end() {
            warn!(
                "{:?} nodes: {} trailing bytes",
                node_type,
                cursor.remaining()
            );
        }
        debug!(
            "{:?}: {} new vertexes, {} subsectors, {} segs, {} nodes",
            node_type,
            vertexes.len(),
            subsectors.len(),
            segments.len(),
            nodes.len()
        );

        Ok(Self {
            node_type,
            num_org_vertices,
            vertexes,
            subsectors,
            segments,
            nodes,
        })
    }
}

/// Starting buffer for an inflate, never more than the limit allows
fn inflate_hint(compressed_len: usize) -> usize {
    compressed_len.saturating_mul(4).min(MAX_INFLATED_SIZE)
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(inflate_hint(compressed.len()));
    ZlibDecoder::new(compressed)
        .take(MAX_INFLATED_SIZE as u64 + 1)
        .read_to_end(&mut out)?;
    if out.len() > MAX_INFLATED_SIZE {
        return Err(LumpError::Decompress(io::Error::new(
            io::ErrorKind::InvalidData,
            "inflated nodes exceed size limit",
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    use super::*;
    use crate::lumps::ChildRef;
    use crate::test::{classic_node, deepbsp_lump, ext_node, z_seg};

    /// Two subsectors of 2 and 1 segs, one node joining them
    fn xnod_body() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&4u32.to_le_bytes()); // org vertexes
        out.extend_from_slice(&1u32.to_le_bytes()); // new vertexes
        out.extend_from_slice(&(32i32 << 16).to_le_bytes());
        out.extend_from_slice(&(-(16i32 << 16)).to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&3u32.to_le_bytes());
        out.extend_from_slice(&z_seg(0, 1, 0, 0));
        out.extend_from_slice(&z_seg(1, 4, 1, 0));
        out.extend_from_slice(&z_seg(4, 0, 2, 1));
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&ext_node([0, 0, 32, 0], [0x8000_0000, 0x8000_0001]));
        out
    }

    #[test]
    fn detect() {
        assert_eq!(NodeLumpType::detect(&[]), NodeLumpType::Classic);
        assert_eq!(
            NodeLumpType::detect(&classic_node([1, 2, 3, 4], [0, 1])),
            NodeLumpType::Classic
        );
        assert_eq!(
            NodeLumpType::detect(&deepbsp_lump(&[])),
            NodeLumpType::DeepBspV4
        );
        assert_eq!(
            NodeLumpType::detect(b"XNOD...."),
            NodeLumpType::Extended(ExtendedNodeType::XNOD)
        );
        assert_eq!(
            NodeLumpType::detect(b"ZGL2"),
            NodeLumpType::Extended(ExtendedNodeType::ZGL2)
        );
        // Only the full 8-byte DeepBSP signature counts
        assert_eq!(NodeLumpType::detect(b"xNd4"), NodeLumpType::Classic);
    }

    #[test]
    fn extended_nodes_none() {
        let lump = classic_node([1552, -2432, 112, 0], [0x8000, 0x8001]);
        assert!(WadExtendedMap::parse(&lump).unwrap().is_none());
    }

    #[test]
    fn uncompressed() {
        let mut lump = b"XNOD".to_vec();
        lump.extend_from_slice(&xnod_body());
        let map = WadExtendedMap::parse(&lump).unwrap().unwrap();

        assert_eq!(map.node_type, ExtendedNodeType::XNOD);
        assert_eq!(map.num_org_vertices, 4);
        assert_eq!(map.vertexes, vec![WadGlVertex {
            x: 32 << 16,
            y: -16 << 16
        }]);
        assert_eq!(map.subsectors.len(), 2);
        assert_eq!(map.subsectors[0].seg_count, 2);
        assert_eq!(map.segments.len(), 3);
        assert_eq!(map.segments[1].end_vertex, 4);
        assert_eq!(map.segments[2].side, 1);
        assert_eq!(map.nodes.len(), 1);
        assert_eq!(map.nodes[0].child(1), ChildRef::SubSector(1));
    }

    #[test]
    fn compressed() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&xnod_body()).unwrap();
        let mut lump = b"ZNOD".to_vec();
        lump.extend_from_slice(&encoder.finish().unwrap());

        let map = WadExtendedMap::parse(&lump).unwrap().unwrap();
        assert_eq!(map.node_type, ExtendedNodeType::ZNOD);
        assert_eq!(map.segments.len(), 3);
        assert_eq!(map.nodes.len(), 1);
    }

    #[test]
    fn corrupt_zlib() {
        let lump = b"ZNOD\x00\x01\x02\x03garbage";
        assert!(matches!(
            WadExtendedMap::parse(lump),
            Err(LumpError::Decompress(_))
        ));
    }

    #[test]
    fn counts_larger_than_lump() {
        let mut lump = b"XNOD".to_vec();
        lump.extend_from_slice(&0u32.to_le_bytes());
        lump.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            WadExtendedMap::parse(&lump),
            Err(LumpError::Truncated { .. })
        ));
    }

    #[test]
    fn inflate_reservation_is_capped() {
        assert_eq!(inflate_hint(100), 400);
        assert_eq!(inflate_hint(MAX_INFLATED_SIZE / 2), MAX_INFLATED_SIZE);
        assert_eq!(inflate_hint(usize::MAX), MAX_INFLATED_SIZE);
    }

    #[test]
    fn gl_nodes_unsupported() {
        assert!(matches!(
            WadExtendedMap::parse(b"XGLN\0\0\0\0"),
            Err(LumpError::UnsupportedNodes(ExtendedNodeType::XGLN))
        ));
    }
}
