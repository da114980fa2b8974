//! Synthetic WAD and lump builders for tests. No real WAD files are needed.

use crate::signed::DEEPBSP_SIGNATURE;

pub(crate) struct WadBuilder {
    ident: [u8; 4],
    big_endian: bool,
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn iwad() -> Self {
        Self {
            ident: *b"IWAD",
            big_endian: false,
            lumps: Vec::new(),
        }
    }

    pub fn pwad() -> Self {
        Self {
            ident: *b"PWAD",
            ..Self::iwad()
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn lump(mut self, name: &str, data: &[u8]) -> Self {
        self.lumps.push((name.to_owned(), data.to_vec()));
        self
    }

    /// Header, then lump data, then the directory
    pub fn build(&self) -> Vec<u8> {
        let u32_bytes = |v: u32| {
            if self.big_endian {
                v.to_be_bytes()
            } else {
                v.to_le_bytes()
            }
        };

        let mut data = Vec::new();
        let mut dir = Vec::new();
        data.extend_from_slice(&self.ident);
        data.extend_from_slice(&u32_bytes(self.lumps.len() as u32));
        data.extend_from_slice(&[0; 4]);

        for (name, bytes) in &self.lumps {
            dir.extend_from_slice(&u32_bytes(data.len() as u32));
            dir.extend_from_slice(&u32_bytes(bytes.len() as u32));
            let mut raw = [0u8; 8];
            raw[..name.len()].copy_from_slice(name.as_bytes());
            dir.extend_from_slice(&raw);
            data.extend_from_slice(bytes);
        }

        let dir_offset = u32_bytes(data.len() as u32);
        data[8..12].copy_from_slice(&dir_offset);
        data.extend_from_slice(&dir);
        data
    }
}

fn push_i16s(out: &mut Vec<u8>, vals: &[i16]) {
    for v in vals {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

const TEST_BOXES: [i16; 8] = [100, -100, -50, 50, 200, 0, 10, 300];

/// 28-byte vanilla node
pub(crate) fn classic_node(line: [i16; 4], children: [u16; 2]) -> Vec<u8> {
    let mut out = Vec::new();
    push_i16s(&mut out, &line);
    push_i16s(&mut out, &TEST_BOXES);
    for c in children {
        out.extend_from_slice(&c.to_le_bytes());
    }
    out
}

/// 32-byte node with wide children
pub(crate) fn ext_node(line: [i16; 4], children: [u32; 2]) -> Vec<u8> {
    let mut out = Vec::new();
    push_i16s(&mut out, &line);
    push_i16s(&mut out, &TEST_BOXES);
    for c in children {
        out.extend_from_slice(&c.to_le_bytes());
    }
    out
}

/// 11-byte ZDoom seg
pub(crate) fn z_seg(v1: u32, v2: u32, linedef: u16, side: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&v1.to_le_bytes());
    out.extend_from_slice(&v2.to_le_bytes());
    out.extend_from_slice(&linedef.to_le_bytes());
    out.push(side);
    out
}

/// `xNd4\0\0\0\0` followed by the records
pub(crate) fn deepbsp_lump(records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = DEEPBSP_SIGNATURE.to_vec();
    for r in records {
        out.extend_from_slice(r);
    }
    out
}

pub(crate) fn u16s(vals: &[u16]) -> Vec<u8> {
    vals.iter().flat_map(|v| v.to_le_bytes()).collect()
}
