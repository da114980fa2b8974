//! One view of a map's BSP data whatever node builder produced it.
//!
//! The three on-disk families are widened into [`Node`], [`Seg`] and
//! [`SubSector`]. Indexes are passed through as stored: nothing here checks
//! that a child, seg or vertex index is in range, the consumer owns that.

use log::{debug, warn};

use crate::compat::{NodeLumpType, WadExtendedMap};
use crate::cursor::WadRecord;
use crate::directory::{MapLump, WadArchive};
use crate::error::Result;
use crate::extended::{WadExtNode, WadGlVertex, WadSegmentV4, WadSegmentZ, WadSubSectorV4};
use crate::iterators::RecordIter;
use crate::lumps::{ChildRef, WadNode, WadSegment, WadSubSector};
use crate::signed::{DEEPBSP_SIGNATURE, DeepNodesV4, ZNodeSegs};
use crate::stack::WadStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    pub bounding_boxes: [[i16; 4]; 2],
    /// Right (front) then left (back)
    pub children: [ChildRef; 2],
}

impl From<WadNode> for Node {
    fn from(n: WadNode) -> Self {
        Node {
            x: n.x,
            y: n.y,
            dx: n.dx,
            dy: n.dy,
            bounding_boxes: n.bounding_boxes,
            children: [n.child(0), n.child(1)],
        }
    }
}

impl From<WadExtNode> for Node {
    fn from(n: WadExtNode) -> Self {
        Node {
            x: n.x,
            y: n.y,
            dx: n.dx,
            dy: n.dy,
            bounding_boxes: n.bounding_boxes,
            children: [n.child(0), n.child(1)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seg {
    pub start_vertex: u32,
    pub end_vertex: u32,
    /// BAM angle, not stored by ZDoom nodes
    pub angle: Option<u16>,
    pub linedef: u16,
    /// 0 = front/right, 1 = back/left
    pub side: u16,
    /// Distance along the linedef, not stored by ZDoom nodes
    pub offset: Option<u16>,
}

impl From<WadSegment> for Seg {
    fn from(s: WadSegment) -> Self {
        Seg {
            start_vertex: s.start_vertex as u32,
            end_vertex: s.end_vertex as u32,
            angle: Some(s.angle),
            linedef: s.linedef,
            side: s.side,
            offset: Some(s.offset),
        }
    }
}

impl From<WadSegmentV4> for Seg {
    fn from(s: WadSegmentV4) -> Self {
        Seg {
            start_vertex: s.start_vertex,
            end_vertex: s.end_vertex,
            angle: Some(s.angle),
            linedef: s.linedef,
            side: s.side,
            offset: Some(s.offset),
        }
    }
}

impl From<WadSegmentZ> for Seg {
    fn from(s: WadSegmentZ) -> Self {
        Seg {
            start_vertex: s.start_vertex,
            end_vertex: s.end_vertex,
            angle: None,
            linedef: s.linedef,
            side: s.side as u16,
            offset: None,
        }
    }
}

/// Segs `start_seg..start_seg + seg_count` bound this subsector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSector {
    pub seg_count: u32,
    pub start_seg: u32,
}

impl From<WadSubSector> for SubSector {
    fn from(s: WadSubSector) -> Self {
        SubSector {
            seg_count: s.seg_count as u32,
            start_seg: s.start_seg as u32,
        }
    }
}

impl From<WadSubSectorV4> for SubSector {
    fn from(s: WadSubSectorV4) -> Self {
        SubSector {
            seg_count: s.seg_count as u32,
            start_seg: s.start_seg,
        }
    }
}

/// Decoded NODES, SEGS and SSECTORS of one map
#[derive(Debug, Clone)]
pub struct LevelNodes {
    format: NodeLumpType,
    nodes: Vec<Node>,
    segs: Vec<Seg>,
    subsectors: Vec<SubSector>,
    num_org_vertices: Option<u32>,
    extra_vertexes: Vec<WadGlVertex>,
}

impl LevelNodes {
    /// Pick the decoder from the NODES lump and decode all three lumps. ZDoom
    /// extended nodes carry everything in NODES and the other two are ignored.
    pub fn decode(nodes: &[u8], segs: &[u8], ssectors: &[u8]) -> Result<Self> {
        if let Some(map) = WadExtendedMap::parse(nodes)? {
            if !segs.is_empty() || !ssectors.is_empty() {
                debug!("Ignoring SEGS/SSECTORS alongside {:?} nodes", map.node_type);
            }
            return Ok(Self::from_extended(map));
        }

        let format = NodeLumpType::detect(nodes);
        debug!("NODES format {:?}", format);
        let level = match format {
            NodeLumpType::DeepBspV4 => Self {
                format,
                nodes: DeepNodesV4::try_unpack(nodes)?
                    .into_records()
                    .into_iter()
                    .map(Node::from)
                    .collect(),
                segs: deepbsp_segs(segs)?,
                subsectors: read_lump::<WadSubSectorV4, _>("SSECTORS", ssectors),
                num_org_vertices: None,
                extra_vertexes: Vec::new(),
            },
            _ => Self {
                format: NodeLumpType::Classic,
                nodes: read_lump::<WadNode, _>("NODES", nodes),
                segs: read_lump::<WadSegment, _>("SEGS", segs),
                subsectors: read_lump::<WadSubSector, _>("SSECTORS", ssectors),
                num_org_vertices: None,
                extra_vertexes: Vec::new(),
            },
        };
        Ok(level)
    }

    pub fn from_archive(wad: &WadArchive<'_>, map_name: &str) -> Result<Self> {
        Self::decode(
            wad.map_lump(map_name, MapLump::Nodes)?,
            wad.map_lump(map_name, MapLump::Segs)?,
            wad.map_lump(map_name, MapLump::SubSectors)?,
        )
    }

    /// As `from_archive`, taking the map from the newest archive that has it
    pub fn from_stack(stack: &WadStack<'_>, map_name: &str) -> Result<Self> {
        Self::decode(
            stack.map_lump(map_name, MapLump::Nodes)?,
            stack.map_lump(map_name, MapLump::Segs)?,
            stack.map_lump(map_name, MapLump::SubSectors)?,
        )
    }

    fn from_extended(map: WadExtendedMap) -> Self {
        let mut start_seg = 0u32;
        let subsectors = map
            .subsectors
            .iter()
            .map(|s| {
                let ss = SubSector {
                    seg_count: s.seg_count,
                    start_seg,
                };
                start_seg = start_seg.saturating_add(s.seg_count);
                ss
            })
            .collect();
        if start_seg as usize != map.segments.len() {
            warn!(
                "{:?} subsectors claim {} segs, lump has {}",
                map.node_type,
                start_seg,
                map.segments.len()
            );
        }

        Self {
            format: NodeLumpType::Extended(map.node_type),
            nodes: map.nodes.into_iter().map(Node::from).collect(),
            segs: map.segments.into_iter().map(Seg::from).collect(),
            subsectors,
            num_org_vertices: Some(map.num_org_vertices),
            extra_vertexes: map.vertexes,
        }
    }

    pub fn format(&self) -> NodeLumpType {
        self.format
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn segs(&self) -> &[Seg] {
        &self.segs
    }

    pub fn subsectors(&self) -> &[SubSector] {
        &self.subsectors
    }

    /// Where traversal starts. The last node is the root; a map with no nodes
    /// is a single subsector.
    pub fn root(&self) -> ChildRef {
        match self.nodes.len() {
            0 => ChildRef::SubSector(0),
            n => ChildRef::Node(n as u32 - 1),
        }
    }

    /// VERTEXES count the extra vertexes are numbered after, ZDoom nodes only
    pub fn num_org_vertices(&self) -> Option<u32> {
        self.num_org_vertices
    }

    pub fn extra_vertexes(&self) -> &[WadGlVertex] {
        &self.extra_vertexes
    }
}

/// DeepBSP SEGS are normally headerless 16-byte records. A SEGS lump that
/// carries the signature holds 11-byte ZDoom segs instead.
fn deepbsp_segs(lump: &[u8]) -> Result<Vec<Seg>> {
    if lump.starts_with(&DEEPBSP_SIGNATURE) {
        let segs = ZNodeSegs::try_unpack(lump)?;
        return Ok(segs.into_records().into_iter().map(Seg::from).collect());
    }
    Ok(read_lump::<WadSegmentV4, _>("SEGS", lump))
}

fn read_lump<R, T>(name: &str, lump: &[u8]) -> Vec<T>
where
    R: WadRecord,
    T: From<R>,
{
    let iter = RecordIter::<R>::new(lump);
    if iter.trailing_bytes() != 0 {
        warn!(
            "{}: {} trailing bytes after {} records of {} bytes",
            name,
            iter.trailing_bytes(),
            iter.item_count(),
            R::SIZE
        );
    }
    iter.map(T::from).collect()
}
