//! Vanilla map records, in the layout id's node builder wrote them.
//!
//! Everything here is 16-bit. The widened DeepBSP and ZDoom records live in
//! [`crate::extended`].

use crate::cursor::{LumpCursor, WadRecord};
use crate::error::Result;

/// Set on a 16-bit child reference when it points at a subsector
pub const IS_SSECTOR_MASK: u16 = 0x8000;
/// Set on a 32-bit child reference when it points at a subsector
pub const IS_SSECTOR_MASK_WIDE: u32 = 0x8000_0000;

/// Index order of the four bounds in a node bounding box
pub const BOX_TOP: usize = 0;
pub const BOX_BOTTOM: usize = 1;
pub const BOX_LEFT: usize = 2;
pub const BOX_RIGHT: usize = 3;

/// A decoded node child: either another node further down the tree or a
/// subsector leaf. The leaf flag has already been stripped from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildRef {
    Node(u32),
    SubSector(u32),
}

impl ChildRef {
    pub const fn from_narrow(raw: u16) -> Self {
        if raw & IS_SSECTOR_MASK != 0 {
            Self::SubSector((raw & !IS_SSECTOR_MASK) as u32)
        } else {
            Self::Node(raw as u32)
        }
    }

    pub const fn from_wide(raw: u32) -> Self {
        if raw & IS_SSECTOR_MASK_WIDE != 0 {
            Self::SubSector(raw & !IS_SSECTOR_MASK_WIDE)
        } else {
            Self::Node(raw)
        }
    }

    pub const fn index(self) -> u32 {
        match self {
            Self::Node(i) | Self::SubSector(i) => i,
        }
    }

    pub const fn is_subsector(self) -> bool {
        matches!(self, Self::SubSector(_))
    }
}

/// A `Vertex` is the basic struct used for any type of coordinate
/// in the map
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type | Content      |
/// |------------|-----------|--------------|
/// |  0x00-0x01 |    i16    | X Coordinate |
/// |  0x02-0x03 |    i16    | Y Coordinate |
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WadVertex {
    pub x: i16,
    pub y: i16,
}

impl WadVertex {
    pub fn new(x: i16, y: i16) -> WadVertex {
        WadVertex { x, y }
    }
}

impl WadRecord for WadVertex {
    const SIZE: usize = 4;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadVertex::new(cursor.read_i16()?, cursor.read_i16()?))
    }
}

/// The Segments (SEGS) are in a sequential order determined by the `SubSector`
/// (SSECTOR), which are part of the NODES recursive tree
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type | Content                              |
/// |------------|-----------|--------------------------------------|
/// |  0x00-0x01 |    u16    | Index to vertex the line starts from |
/// |  0x02-0x03 |    u16    | Index to vertex the line ends with   |
/// |  0x04-0x05 |    u16    | Angle in Binary Angle Measurement (BAMS) |
/// |  0x06-0x07 |    u16    | Index to the linedef this seg travels along|
/// |  0x08-0x09 |    u16    | Direction along line. 0 == SEG is on the right and follows the line, 1 == SEG travels in opposite direction |
/// |  0x0A-0x0B |    u16    | Offset: this is the distance along the linedef this seg starts at |
///
/// Each `Segment` record is 12 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSegment {
    /// The line starts from this point
    pub start_vertex: u16,
    /// The line ends at this point
    pub end_vertex: u16,
    /// Binary Angle Measurement
    pub angle: u16,
    /// The Linedef this segment travels along
    pub linedef: u16,
    /// The `side`, 0 = front/right, 1 = back/left
    pub side: u16,
    /// Offset distance along the linedef (from `start_vertex`) to the start
    /// of this `Segment`
    pub offset: u16,
}

impl WadRecord for WadSegment {
    const SIZE: usize = 12;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadSegment {
            start_vertex: cursor.read_u16()?,
            end_vertex: cursor.read_u16()?,
            angle: cursor.read_u16()?,
            linedef: cursor.read_u16()?,
            side: cursor.read_u16()?,
            offset: cursor.read_u16()?,
        })
    }
}

/// A `SubSector` divides up all the SECTORS into convex polygons. They are then
/// referenced through the NODES resources. There will be (number of nodes) + 1.
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type | Content                            |
/// |------------|-----------|------------------------------------|
/// |  0x00-0x01 |    u16    | How many segments line this sector |
/// |  0x02-0x03 |    u16    | Index to the starting segment      |
///
/// Each `SubSector` record is 4 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSubSector {
    /// How many `Segment`s line this `SubSector`
    pub seg_count: u16,
    /// The `Segment` to start with
    pub start_seg: u16,
}

impl WadRecord for WadSubSector {
    const SIZE: usize = 4;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadSubSector {
            seg_count: cursor.read_u16()?,
            start_seg: cursor.read_u16()?,
        })
    }
}

/// The base node structure as parsed from the WAD records. What is stored in the WAD
/// is the splitting line used for splitting the level/node (starts with the level then
/// consecutive nodes, aiming for an even split if possible), a box which encapsulates
/// the left and right regions of the split, and the index numbers for left and right
/// children of the node; the index is in to the array built from this lump.
///
/// **The last node is the root node**
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type                            | Content                                          |
/// |------------|--------------------------------------|--------------------------------------------------|
/// | 0x00-0x01  | Partition line x coordinate          | X coordinate of the splitter                     |
/// | 0x02-0x03  | Partition line y coordinate          | Y coordinate of the splitter                     |
/// | 0x04-0x05  | Change in x to end of partition line | The amount to move in X to reach end of splitter |
/// | 0x06-0x07  | Change in y to end of partition line | The amount to move in Y to reach end of splitter |
/// | 0x08-0x09  | Right (Front) box top                | First corner of front box (Y coordinate)         |
/// | 0x0A-0x0B  | Right (Front)  box bottom            | Second corner of front box (Y coordinate)        |
/// | 0x0C-0x0D  | Right (Front)  box left              | First corner of front box (X coordinate)         |
/// | 0x0E-0x0F  | Right (Front)  box right             | Second corner of front box (X coordinate)        |
/// | 0x10-0x11  | Left (Back) box top                  | First corner of back box (Y coordinate)          |
/// | 0x12-0x13  | Left (Back)  box bottom              | Second corner of back box (Y coordinate)         |
/// | 0x14-0x15  | Left (Back)  box left                | First corner of back box (X coordinate)          |
/// | 0x16-0x17  | Left (Back)  box right               | Second corner of back box (X coordinate)         |
/// | 0x18-0x19  | Right (Front) child index            | Index of the front child + sub-sector indicator  |
/// | 0x1A-0x1B  | Left (Back)  child index             | Index of the back child + sub-sector indicator   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadNode {
    /// Where the line used for splitting the level starts
    pub x: i16,
    pub y: i16,
    /// Where the line used for splitting the level ends
    pub dx: i16,
    pub dy: i16,
    /// Coordinates of the bounding boxes, indexed with `BOX_TOP` etc
    pub bounding_boxes: [[i16; 4]; 2],
    /// Raw child references, bit 15 marks a subsector. Use `child()` to get
    /// the masked index.
    pub child_index: [u16; 2],
}

impl WadNode {
    pub fn child(&self, side: usize) -> ChildRef {
        ChildRef::from_narrow(self.child_index[side])
    }
}

impl WadRecord for WadNode {
    const SIZE: usize = 8 + 16 + 4;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self> {
        Ok(WadNode {
            x: cursor.read_i16()?,
            y: cursor.read_i16()?,
            dx: cursor.read_i16()?,
            dy: cursor.read_i16()?,
            bounding_boxes: [cursor.read_i16_array()?, cursor.read_i16_array()?],
            child_index: [cursor.read_u16()?, cursor.read_u16()?],
        })
    }
}
