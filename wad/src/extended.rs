//! Widened records used by DeepBSP v4 and ZDoom extended nodes. These exist
//! because big maps overflow the 16-bit seg, subsector and child indexes of
//! the vanilla layout.

use crate::cursor::{LumpCursor, WadRecord};
use crate::error::Result;
use crate::lumps::ChildRef;

/// Node with 32-bit child references. DeepBSP v4 and (non-GL) ZDoom nodes use
/// the same layout.
///
/// | Field Size | Data Type | Content                                      |
/// |------------|-----------|----------------------------------------------|
/// | 0x00-0x01  |    i16    | Partition line X                             |
/// | 0x02-0x03  |    i16    | Partition line Y                             |
/// | 0x04-0x05  |    i16    | Partition line DX                            |
/// | 0x06-0x07  |    i16    | Partition line DY                            |
/// | 0x08-0x0F  |  4 x i16  | Right box: top, bottom, left, right          |
/// | 0x10-0x17  |  4 x i16  | Left box: top, bottom, left, right           |
/// | 0x18-0x1B  |    u32    | Right child, bit 31 set for a subsector      |
/// | 0x1C-0x1F  |    u32    | Left child, bit 31 set for a subsector       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadExtNode {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    pub bounding_boxes: [[i16; 4]; 2],
    /// Raw child references, use `child()` for the masked value
    pub child_index: [u32; 2],
}

impl WadExtNode {
    pub fn child(&self, side: usize) -> ChildRef {
        ChildRef::from_wide(self.child_index[side])
    }
}

impl WadRecord for WadExtNode {
    const SIZE: usize = 8 + 16 + 8;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadExtNode {
            x: cursor.read_i16()?,
            y: cursor.read_i16()?,
            dx: cursor.read_i16()?,
            dy: cursor.read_i16()?,
            bounding_boxes: [cursor.read_i16_array()?, cursor.read_i16_array()?],
            child_index: cursor.read_u32_array()?,
        })
    }
}

/// DeepBSP v4 seg: the vanilla seg with 32-bit vertex indexes. 16 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSegmentV4 {
    pub start_vertex: u32,
    pub end_vertex: u32,
    pub angle: u16,
    pub linedef: u16,
    pub side: u16,
    pub offset: u16,
}

impl WadRecord for WadSegmentV4 {
    const SIZE: usize = 16;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadSegmentV4 {
            start_vertex: cursor.read_u32()?,
            end_vertex: cursor.read_u32()?,
            angle: cursor.read_u16()?,
            linedef: cursor.read_u16()?,
            side: cursor.read_u16()?,
            offset: cursor.read_u16()?,
        })
    }
}

/// ZDoom seg. There is no angle or offset, both are derived from the vertexes
/// by whoever builds the runtime seg.
///
/// | Field Size | Data Type | Content        |
/// |------------|-----------|----------------|
/// | 0x00-0x03  |    u32    | Start vertex   |
/// | 0x04-0x07  |    u32    | End vertex     |
/// | 0x08-0x09  |    u16    | Linedef        |
/// | 0x0A       |    u8     | Side           |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSegmentZ {
    pub start_vertex: u32,
    pub end_vertex: u32,
    pub linedef: u16,
    pub side: u8,
}

impl WadRecord for WadSegmentZ {
    const SIZE: usize = 11;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadSegmentZ {
            start_vertex: cursor.read_u32()?,
            end_vertex: cursor.read_u32()?,
            linedef: cursor.read_u16()?,
            side: cursor.read_u8()?,
        })
    }
}

/// DeepBSP v4 subsector: 16-bit count, 32-bit first seg. 6 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSubSectorV4 {
    pub seg_count: u16,
    pub start_seg: u32,
}

impl WadRecord for WadSubSectorV4 {
    const SIZE: usize = 6;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadSubSectorV4 {
            seg_count: cursor.read_u16()?,
            start_seg: cursor.read_u32()?,
        })
    }
}

/// ZDoom subsector. Only the count is stored, the first seg is the running
/// total of all counts before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSubSectorZ {
    pub seg_count: u32,
}

impl WadRecord for WadSubSectorZ {
    const SIZE: usize = 4;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadSubSectorZ {
            seg_count: cursor.read_u32()?,
        })
    }
}

pub const FRACBITS: u32 = 16;

/// 16.16 fixed point vertex, as added by GL and ZDoom node builders
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WadGlVertex {
    pub x: i32,
    pub y: i32,
}

impl WadRecord for WadGlVertex {
    const SIZE: usize = 8;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadGlVertex {
            x: cursor.read_i32()?,
            y: cursor.read_i32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lumps::{BOX_BOTTOM, BOX_LEFT};

    #[test]
    fn ext_node_children() {
        let mut data = Vec::new();
        for v in [64i16, -128, 0, 256] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for v in [10i16, 20, 30, 40, 50, 60, 70, 80] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&0x8000_0005u32.to_le_bytes());
        data.extend_from_slice(&0x0000_0005u32.to_le_bytes());
        assert_eq!(data.len(), WadExtNode::SIZE);

        let mut c = LumpCursor::new(&data);
        let node = WadExtNode::decode(&mut c).unwrap();
        assert!(c.is_at_end());
        assert_eq!((node.x, node.y, node.dx, node.dy), (64, -128, 0, 256));
        assert_eq!(node.bounding_boxes[0][BOX_BOTTOM], 20);
        assert_eq!(node.bounding_boxes[1][BOX_LEFT], 70);
        assert_eq!(node.child(0), ChildRef::SubSector(5));
        assert_eq!(node.child(1), ChildRef::Node(5));
    }

    #[test]
    fn seg_v4() {
        let mut data = Vec::new();
        data.extend_from_slice(&70_000u32.to_le_bytes());
        data.extend_from_slice(&70_001u32.to_le_bytes());
        for v in [0x8000u16, 12, 0, 4] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let seg = WadSegmentV4::decode(&mut LumpCursor::new(&data)).unwrap();
        assert_eq!(seg.start_vertex, 70_000);
        assert_eq!(seg.end_vertex, 70_001);
        assert_eq!(seg.angle, 0x8000);
        assert_eq!(seg.linedef, 12);
        assert_eq!(seg.side, 0);
        assert_eq!(seg.offset, 4);
    }

    #[test]
    fn seg_z_is_eleven_bytes() {
        let data = [
            0xff, 0xff, 0xff, 0xff, // v1
            2, 0, 0, 0, // v2
            0x34, 0x12, // linedef
            1,    // side
            0xee, // next record
        ];
        let mut c = LumpCursor::new(&data);
        let seg = WadSegmentZ::decode(&mut c).unwrap();
        assert_eq!(seg.start_vertex, u32::MAX);
        assert_eq!(seg.end_vertex, 2);
        assert_eq!(seg.linedef, 0x1234);
        assert_eq!(seg.side, 1);
        assert_eq!(c.position(), WadSegmentZ::SIZE);
    }

    #[test]
    fn subsectors() {
        let data = [3, 0, 0x10, 0x27, 0, 0, 0xff, 0xff, 0xff, 0xff];
        let mut c = LumpCursor::new(&data);
        let v4 = WadSubSectorV4::decode(&mut c).unwrap();
        assert_eq!(v4.seg_count, 3);
        assert_eq!(v4.start_seg, 10_000);
        let z = WadSubSectorZ::decode(&mut c).unwrap();
        assert_eq!(z.seg_count, u32::MAX);
    }

    #[test]
    fn gl_vertex() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-(3 << FRACBITS) as i32).to_le_bytes());
        data.extend_from_slice(&(1i32 << FRACBITS | 0x8000).to_le_bytes());
        let v = WadGlVertex::decode(&mut LumpCursor::new(&data)).unwrap();
        assert_eq!(v.x, -196_608);
        assert_eq!(v.y, 0x1_8000);
    }
}
