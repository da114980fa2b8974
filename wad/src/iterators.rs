use std::marker::PhantomData;

use log::warn;

use crate::cursor::{LumpCursor, WadRecord};
use crate::directory::{MapLump, WadArchive};
use crate::error::Result;

/// Walks a headerless lump one fixed-size record at a time. The count is
/// fixed up front from the lump length; any tail shorter than a record is
/// skipped and reported by `trailing_bytes`.
pub struct RecordIter<'a, R> {
    cursor: LumpCursor<'a>,
    item_count: usize,
    current: usize,
    trailing: usize,
    _phantom: PhantomData<R>,
}

impl<'a, R: WadRecord> RecordIter<'a, R> {
    pub fn new(data: &'a [u8]) -> Self {
        RecordIter {
            cursor: LumpCursor::new(data),
            item_count: data.len() / R::SIZE,
            current: 0,
            trailing: data.len() % R::SIZE,
            _phantom: Default::default(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn trailing_bytes(&self) -> usize {
        self.trailing
    }
}

impl<R: WadRecord> Iterator for RecordIter<'_, R> {
    type Item = R;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.item_count {
            self.current += 1;
            // Cannot fail, item_count already fits the lump
            return R::decode(&mut self.cursor).ok();
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.item_count - self.current;
        (left, Some(left))
    }
}

impl<R: WadRecord> ExactSizeIterator for RecordIter<'_, R> {}

impl<'a> WadArchive<'a> {
    /// Iterate the records of one lump belonging to a map
    pub fn map_records<R: WadRecord>(
        &self,
        map_name: &str,
        kind: MapLump,
    ) -> Result<RecordIter<'a, R>> {
        let iter = RecordIter::new(self.map_lump(map_name, kind)?);
        if iter.trailing_bytes() != 0 {
            warn!(
                "{} of {} has {} trailing bytes",
                kind.name(),
                map_name,
                iter.trailing_bytes()
            );
        }
        Ok(iter)
    }
}
