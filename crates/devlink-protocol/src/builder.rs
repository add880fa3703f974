//! Checked wrapper over [`flatbuffers::FlatBufferBuilder`]
//!
//! Children are written before the parents that reference them, so the
//! buffer grows from its end towards its start.
//!
//! ```text
//! Builder::new()
//!   create_string / create_vector_of_offsets   (children)
//!   start_table → add_field_* → end_table      (parent table)
//!   finish / finish_size_prefixed              (root offset, optional prefix)
//! ```
//!
//! The underlying builder only debug-asserts call order and panics past
//! 2 GiB. Here an out-of-order call, a foreign offset or an oversized write
//! is an `InvalidArgument` error instead.

use crate::error::{CodecError, CodecResult};
use flatbuffers::{FlatBufferBuilder, ForwardsUOffset, Vector, WIPOffset};
use flatbuffers::{TableUnfinishedWIPOffset, SIZE_UOFFSET, SIZE_VOFFSET};
use std::fmt;

const DEFAULT_CAPACITY: usize = 1024;

/// Largest buffer whose offsets all fit a signed 32-bit delta
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Upper bound on the padding and bookkeeping a single write adds
const WRITE_SLACK: usize = 16;

#[derive(Clone, Copy)]
struct OpenTable {
    start: WIPOffset<TableUnfinishedWIPOffset>,
    num_fields: usize,
}

#[derive(Debug, Clone, Copy)]
struct OpenVector {
    expected: usize,
    pushed: usize,
}

/// Single-writer buffer builder
pub struct Builder<'fbb> {
    fbb: FlatBufferBuilder<'fbb>,
    table: Option<OpenTable>,
    vector: Option<OpenVector>,
    finished: bool,
    size_prefixed: bool,
}

impl Default for Builder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Builder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("used", &self.used_space())
            .field("finished", &self.finished)
            .field("size_prefixed", &self.size_prefixed)
            .finish()
    }
}

impl<'fbb> Builder<'fbb> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fbb: FlatBufferBuilder::with_capacity(capacity.min(MAX_BUFFER_SIZE)),
            table: None,
            vector: None,
            finished: false,
            size_prefixed: false,
        }
    }

    /// Clear all written data, keeping the allocation for reuse
    pub fn reset(&mut self) {
        // The inner builder keeps an open table's field list across reset
        if let Some(table) = self.table.take() {
            self.fbb.end_table(table.start);
        }
        self.fbb.reset();
        self.vector = None;
        self.finished = false;
        self.size_prefixed = false;
    }

    /// Bytes written so far
    #[inline]
    pub fn used_space(&self) -> usize {
        self.fbb.unfinished_data().len()
    }

    /// Vtables written since the last finish; identical vtables are shared
    #[inline]
    pub fn num_written_vtables(&self) -> usize {
        self.fbb.num_written_vtables()
    }

    /// The finished buffer, starting at its size prefix or root offset
    pub fn finished_data(&self) -> CodecResult<&[u8]> {
        if !self.finished {
            return Err(CodecError::InvalidArgument(
                "finished_data called before finish".to_string(),
            ));
        }
        Ok(self.fbb.finished_data())
    }

    /// Whether the finished buffer starts with a 4-byte size prefix
    #[inline]
    pub fn is_size_prefixed(&self) -> bool {
        self.finished && self.size_prefixed
    }

    fn reserve(&self, additional: usize) -> CodecResult<()> {
        self.used_space()
            .checked_add(additional)
            .and_then(|n| n.checked_add(WRITE_SLACK))
            .filter(|&n| n <= MAX_BUFFER_SIZE)
            .map(|_| ())
            .ok_or_else(|| {
                CodecError::InvalidArgument(format!(
                    "buffer would exceed {} bytes",
                    MAX_BUFFER_SIZE
                ))
            })
    }

    fn check_offset<T>(&self, offset: WIPOffset<T>) -> CodecResult<()> {
        let value = offset.value() as usize;
        if value == 0 || value > self.used_space() {
            return Err(CodecError::InvalidArgument(format!(
                "offset {} does not refer to data written by this builder",
                value
            )));
        }
        Ok(())
    }

    fn ensure_idle(&self, op: &str) -> CodecResult<()> {
        if self.finished {
            return Err(CodecError::InvalidArgument(format!(
                "{} called on a finished builder; call reset first",
                op
            )));
        }
        if self.table.is_some() {
            return Err(CodecError::InvalidArgument(format!(
                "{} called while a table is being built",
                op
            )));
        }
        if self.vector.is_some() {
            return Err(CodecError::InvalidArgument(format!(
                "{} called while a vector is being built",
                op
            )));
        }
        Ok(())
    }

    // ── Strings and vectors ─────────────────────────────────────────

    /// Write `[len: u32][utf-8 bytes][NUL]`
    pub fn create_string(&mut self, s: &str) -> CodecResult<WIPOffset<&'fbb str>> {
        self.ensure_idle("create_string")?;
        self.reserve(s.len().saturating_add(SIZE_UOFFSET + 1))?;
        Ok(self.fbb.create_string(s))
    }

    /// Begin a vector of `num_elems` offsets
    pub fn start_vector(&mut self, num_elems: usize) -> CodecResult<()> {
        self.ensure_idle("start_vector")?;
        self.reserve(num_elems.saturating_mul(SIZE_UOFFSET))?;
        self.fbb.start_vector::<WIPOffset<()>>(num_elems);
        self.vector = Some(OpenVector {
            expected: num_elems,
            pushed: 0,
        });
        Ok(())
    }

    /// Push one offset element into the open vector, last element first
    pub fn push_offset<T>(&mut self, offset: WIPOffset<T>) -> CodecResult<()> {
        let Some(mut vector) = self.vector else {
            return Err(CodecError::InvalidArgument(
                "push_offset called outside start_vector/end_vector".to_string(),
            ));
        };
        if vector.pushed == vector.expected {
            return Err(CodecError::InvalidArgument(format!(
                "vector declared {} elements",
                vector.expected
            )));
        }
        self.check_offset(offset)?;
        self.fbb.push(offset);
        vector.pushed += 1;
        self.vector = Some(vector);
        Ok(())
    }

    /// Close the open vector by writing its length
    pub fn end_vector<T>(
        &mut self,
        num_elems: usize,
    ) -> CodecResult<WIPOffset<Vector<'fbb, ForwardsUOffset<T>>>> {
        let vector = self.vector.ok_or_else(|| {
            CodecError::InvalidArgument("end_vector called without start_vector".to_string())
        })?;
        if vector.expected != num_elems || vector.pushed != num_elems {
            return Err(CodecError::InvalidArgument(format!(
                "vector declared {} elements, pushed {}, closed with {}",
                vector.expected, vector.pushed, num_elems
            )));
        }
        self.vector = None;
        Ok(self.fbb.end_vector::<ForwardsUOffset<T>>(num_elems))
    }

    /// Write a vector of offsets in the order given
    pub fn create_vector_of_offsets<T>(
        &mut self,
        items: &[WIPOffset<T>],
    ) -> CodecResult<WIPOffset<Vector<'fbb, ForwardsUOffset<T>>>> {
        self.ensure_idle("create_vector_of_offsets")?;
        for item in items {
            self.check_offset(*item)?;
        }
        self.reserve(items.len().saturating_mul(SIZE_UOFFSET))?;
        Ok(self.fbb.create_vector(items))
    }

    /// Write every string, then a vector referencing them in order
    pub fn create_vector_of_strings<S: AsRef<str>>(
        &mut self,
        items: &[S],
    ) -> CodecResult<WIPOffset<Vector<'fbb, ForwardsUOffset<&'fbb str>>>> {
        let offsets = items
            .iter()
            .map(|s| self.create_string(s.as_ref()))
            .collect::<CodecResult<Vec<_>>>()?;
        self.create_vector_of_offsets(&offsets)
    }

    // ── Tables ──────────────────────────────────────────────────────

    /// Begin a table with `num_fields` declared slots
    pub fn start_table(&mut self, num_fields: usize) -> CodecResult<()> {
        self.ensure_idle("start_table")?;
        if num_fields > (usize::from(u16::MAX) - 2 * SIZE_VOFFSET) / SIZE_VOFFSET {
            return Err(CodecError::InvalidArgument(format!(
                "{} fields do not fit a vtable",
                num_fields
            )));
        }
        self.reserve(0)?;
        let start = self.fbb.start_table();
        self.table = Some(OpenTable { start, num_fields });
        Ok(())
    }

    fn check_slot(&self, voffset: u16, size: usize) -> CodecResult<()> {
        let Some(table) = self.table else {
            return Err(CodecError::InvalidArgument(format!(
                "field {} added outside start_table/end_table",
                voffset
            )));
        };
        if usize::from(voffset) < 2 * SIZE_VOFFSET || voffset % 2 != 0 {
            return Err(CodecError::InvalidArgument(format!(
                "{} is not a valid vtable offset",
                voffset
            )));
        }
        let slot = (usize::from(voffset) - 2 * SIZE_VOFFSET) / SIZE_VOFFSET;
        if slot >= table.num_fields {
            return Err(CodecError::InvalidArgument(format!(
                "slot {} out of range for table with {} fields",
                slot, table.num_fields
            )));
        }
        let inline = self.used_space() - table.start.value() as usize;
        if inline + size + WRITE_SLACK > usize::from(u16::MAX) {
            return Err(CodecError::InvalidArgument(format!(
                "table of {} bytes exceeds the 65535-byte limit",
                inline + size
            )));
        }
        self.reserve(size)
    }

    /// Add a u8 field unless it equals `default`
    pub fn add_field_u8(&mut self, voffset: u16, value: u8, default: u8) -> CodecResult<()> {
        self.check_slot(voffset, 1)?;
        self.fbb.push_slot::<u8>(voffset, value, default);
        Ok(())
    }

    /// Add an i8 field unless it equals `default`
    pub fn add_field_i8(&mut self, voffset: u16, value: i8, default: i8) -> CodecResult<()> {
        self.check_slot(voffset, 1)?;
        self.fbb.push_slot::<i8>(voffset, value, default);
        Ok(())
    }

    /// Add a bool field (one byte, 0 or 1) unless it equals `default`
    pub fn add_field_bool(&mut self, voffset: u16, value: bool, default: bool) -> CodecResult<()> {
        self.check_slot(voffset, 1)?;
        self.fbb.push_slot::<bool>(voffset, value, default);
        Ok(())
    }

    /// Add a reference to a string, vector or table written earlier
    pub fn add_field_offset<T>(&mut self, voffset: u16, offset: WIPOffset<T>) -> CodecResult<()> {
        self.check_slot(voffset, SIZE_UOFFSET)?;
        self.check_offset(offset)?;
        self.fbb.push_slot_always::<WIPOffset<T>>(voffset, offset);
        Ok(())
    }

    /// Close the open table and write (or reuse) its vtable
    pub fn end_table<T>(&mut self) -> CodecResult<WIPOffset<T>> {
        let table = self.table.ok_or_else(|| {
            CodecError::InvalidArgument("end_table called without start_table".to_string())
        })?;
        self.reserve(2 * SIZE_VOFFSET + table.num_fields * SIZE_VOFFSET)?;
        self.table = None;
        let end = self.fbb.end_table(table.start);
        Ok(WIPOffset::new(end.value()))
    }

    // ── Finishing ───────────────────────────────────────────────────

    fn finish_with<T>(&mut self, root: WIPOffset<T>, size_prefixed: bool) -> CodecResult<()> {
        self.ensure_idle("finish")?;
        self.check_offset(root)?;
        self.reserve(2 * SIZE_UOFFSET)?;
        if size_prefixed {
            self.fbb.finish_size_prefixed(root, None);
        } else {
            self.fbb.finish_minimal(root);
        }
        self.finished = true;
        self.size_prefixed = size_prefixed;
        Ok(())
    }

    /// Write the root offset; the buffer is then available via [`Self::finished_data`]
    pub fn finish<T>(&mut self, root: WIPOffset<T>) -> CodecResult<()> {
        self.finish_with(root, false)
    }

    /// Write the root offset preceded by a 4-byte length of the rest
    pub fn finish_size_prefixed<T>(&mut self, root: WIPOffset<T>) -> CodecResult<()> {
        self.finish_with(root, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatbuffers::Table;

    fn root_table(buf: &[u8]) -> Table<'_> {
        unsafe { flatbuffers::root_unchecked::<Table>(buf) }
    }

    #[test]
    fn test_string_layout() {
        let mut b = Builder::with_capacity(8);
        let s = b.create_string("AA:BB").unwrap();
        // 4 length + 5 bytes + NUL, padded to a multiple of 4
        assert_eq!(s.value(), 12);
        assert_eq!(b.used_space(), 12);
    }

    #[test]
    fn test_growth_preserves_data() {
        let mut b = Builder::with_capacity(1);
        let strings: Vec<String> = (0..50).map(|i| format!("network-{}", i)).collect();
        let v = b.create_vector_of_strings(&strings).unwrap();
        b.start_table(1).unwrap();
        b.add_field_offset(4, v).unwrap();
        let root = b.end_table::<()>().unwrap();
        b.finish(root).unwrap();

        let table = root_table(b.finished_data().unwrap());
        let vector = unsafe {
            table
                .get::<ForwardsUOffset<Vector<ForwardsUOffset<&str>>>>(4, None)
                .unwrap()
        };
        assert_eq!(vector.len(), 50);
        assert_eq!(vector.get(49), "network-49");
    }

    #[test]
    fn test_default_values_are_omitted() {
        let mut b = Builder::new();
        b.start_table(3).unwrap();
        b.add_field_bool(4, false, false).unwrap();
        b.add_field_u8(6, 0, 0).unwrap();
        b.add_field_i8(8, 0, 0).unwrap();
        let root = b.end_table::<()>().unwrap();
        b.finish(root).unwrap();

        let vtable = root_table(b.finished_data().unwrap()).vtable();
        assert_eq!(vtable.num_bytes(), 4);
        assert_eq!(vtable.object_inline_num_bytes(), 4);
        for voffset in [4, 6, 8] {
            assert_eq!(vtable.get(voffset), 0);
        }
    }

    #[test]
    fn test_identical_vtables_are_shared() {
        let mut b = Builder::new();
        let mut tables = Vec::new();
        for pin in [3u8, 5] {
            b.start_table(2).unwrap();
            b.add_field_u8(6, pin, 0).unwrap();
            tables.push(b.end_table::<Table>().unwrap());
        }
        assert_eq!(b.num_written_vtables(), 1);

        let v = b.create_vector_of_offsets(&tables).unwrap();
        b.start_table(1).unwrap();
        b.add_field_offset(4, v).unwrap();
        let root = b.end_table::<()>().unwrap();
        assert_eq!(b.num_written_vtables(), 2);
        b.finish(root).unwrap();

        let outer = root_table(b.finished_data().unwrap());
        let inner = unsafe {
            outer
                .get::<ForwardsUOffset<Vector<ForwardsUOffset<Table>>>>(4, None)
                .unwrap()
        };
        assert_eq!(inner.len(), 2);
        assert_eq!(unsafe { inner.get(0).get::<u8>(6, None) }, Some(3));
        assert_eq!(unsafe { inner.get(1).get::<u8>(6, None) }, Some(5));
    }

    #[test]
    fn test_size_prefix_covers_rest_of_buffer() {
        let mut b = Builder::new();
        b.start_table(1).unwrap();
        b.add_field_u8(4, 17, 0).unwrap();
        let root = b.end_table::<()>().unwrap();
        b.finish_size_prefixed(root).unwrap();
        assert!(b.is_size_prefixed());

        let buf = b.finished_data().unwrap();
        let prefix = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(prefix, buf.len() - SIZE_UOFFSET);
        assert_eq!(buf.len() % 4, 0);
    }

    #[test]
    fn test_misuse_is_invalid_argument() {
        let mut b = Builder::new();

        assert!(matches!(
            b.add_field_u8(4, 1, 0),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(matches!(
            b.end_table::<()>(),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(matches!(
            b.end_vector::<&str>(0),
            Err(CodecError::InvalidArgument(_))
        ));

        b.start_table(2).unwrap();
        assert!(matches!(b.start_table(1), Err(CodecError::InvalidArgument(_))));
        assert!(matches!(
            b.create_string("nested"),
            Err(CodecError::InvalidArgument(_))
        ));
        // Slot 2 of a 2-field table, and an odd vtable offset
        assert!(matches!(
            b.add_field_u8(8, 1, 0),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(matches!(
            b.add_field_u8(5, 1, 0),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(matches!(
            b.add_field_offset(6, WIPOffset::<()>::new(4096)),
            Err(CodecError::InvalidArgument(_))
        ));
        let root = b.end_table::<()>().unwrap();

        assert!(matches!(b.finished_data(), Err(CodecError::InvalidArgument(_))));
        b.finish(root).unwrap();
        assert!(matches!(
            b.create_string("late"),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(matches!(b.finish(root), Err(CodecError::InvalidArgument(_))));
    }

    #[test]
    fn test_vector_count_mismatch() {
        let mut b = Builder::new();
        let s = b.create_string("x").unwrap();
        b.start_vector(2).unwrap();
        b.push_offset(s).unwrap();
        assert!(matches!(
            b.end_vector::<&str>(2),
            Err(CodecError::InvalidArgument(_))
        ));
        b.push_offset(s).unwrap();
        assert!(matches!(
            b.push_offset(s),
            Err(CodecError::InvalidArgument(_))
        ));
        b.end_vector::<&str>(2).unwrap();
    }

    #[test]
    fn test_reset_allows_reuse() {
        let mut b = Builder::new();
        b.start_table(1).unwrap();
        b.add_field_u8(4, 1, 0).unwrap();
        let root = b.end_table::<()>().unwrap();
        b.finish(root).unwrap();
        let first = b.finished_data().unwrap().to_vec();

        b.reset();
        assert_eq!(b.used_space(), 0);
        // A table abandoned half way must not leak its fields into the next
        b.start_table(1).unwrap();
        b.add_field_u8(4, 9, 0).unwrap();
        b.reset();

        b.start_table(1).unwrap();
        b.add_field_u8(4, 1, 0).unwrap();
        let root = b.end_table::<()>().unwrap();
        b.finish(root).unwrap();
        assert_eq!(b.finished_data().unwrap(), &first[..]);
    }
}
