//! Typed accessors over a raw 4096-byte page, interpreted as either a leaf
//! or an internal B+-tree node. The on-disk layout is bit-exact: every
//! getter/setter here is a thin offset computation into the backing buffer,
//! never an independent representation that would need re-serializing.

use crate::errors::Error;
use crate::row::ROW_SIZE;

pub const PAGE_SIZE: usize = 4096;

const NODE_TYPE_OFFSET: usize = 0;
const NODE_TYPE_SIZE: usize = 1;
const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + NODE_TYPE_SIZE;
const IS_ROOT_SIZE: usize = 1;
const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
const PARENT_POINTER_SIZE: usize = 4;
pub const COMMON_NODE_HEADER_SIZE: usize =
    NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
const LEAF_NODE_NUM_CELLS_SIZE: usize = 4;
const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE;
const LEAF_NODE_NEXT_LEAF_SIZE: usize = 4;
pub const LEAF_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE + LEAF_NODE_NEXT_LEAF_SIZE;

const LEAF_NODE_KEY_SIZE: usize = 4;
const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

pub const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;
pub const LEAF_NODE_LEFT_SPLIT_COUNT: usize =
    (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_RIGHT_SPLIT_COUNT;

const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
const INTERNAL_NODE_NUM_KEYS_SIZE: usize = 4;
const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize =
    INTERNAL_NODE_NUM_KEYS_OFFSET + INTERNAL_NODE_NUM_KEYS_SIZE;
const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE
    + INTERNAL_NODE_NUM_KEYS_SIZE
    + INTERNAL_NODE_RIGHT_CHILD_SIZE;

const INTERNAL_NODE_CHILD_SIZE: usize = 4;
const INTERNAL_NODE_KEY_SIZE: usize = 4;
const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal,
    Leaf,
}

impl NodeType {
    fn from_byte(b: u8) -> Result<Self, Error> {
        match b {
            0 => Ok(NodeType::Internal),
            1 => Ok(NodeType::Leaf),
            other => Err(Error::Fatal(format!("corrupt node_type byte: {other}"))),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            NodeType::Internal => 0,
            NodeType::Leaf => 1,
        }
    }
}

/// One page-sized buffer, owned by the pager, interpreted in place as a node.
#[derive(Clone)]
pub struct Page(pub [u8; PAGE_SIZE]);

impl Page {
    pub fn zeroed() -> Self {
        Page([0u8; PAGE_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.0
    }

    pub fn node_type(&self) -> Result<NodeType, Error> {
        NodeType::from_byte(self.0[NODE_TYPE_OFFSET])
    }

    pub fn set_node_type(&mut self, t: NodeType) {
        self.0[NODE_TYPE_OFFSET] = t.to_byte();
    }

    pub fn is_root(&self) -> bool {
        self.0[IS_ROOT_OFFSET] != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.0[IS_ROOT_OFFSET] = is_root as u8;
    }

    pub fn parent_pointer(&self) -> u32 {
        read_u32(&self.0, PARENT_POINTER_OFFSET)
    }

    pub fn set_parent_pointer(&mut self, parent: u32) {
        write_u32(&mut self.0, PARENT_POINTER_OFFSET, parent);
    }

    // --- leaf accessors ---

    pub fn leaf_num_cells(&self) -> u32 {
        read_u32(&self.0, LEAF_NODE_NUM_CELLS_OFFSET)
    }

    pub fn set_leaf_num_cells(&mut self, n: u32) {
        write_u32(&mut self.0, LEAF_NODE_NUM_CELLS_OFFSET, n);
    }

    pub fn leaf_next_leaf(&self) -> u32 {
        read_u32(&self.0, LEAF_NODE_NEXT_LEAF_OFFSET)
    }

    pub fn set_leaf_next_leaf(&mut self, page_num: u32) {
        write_u32(&mut self.0, LEAF_NODE_NEXT_LEAF_OFFSET, page_num);
    }

    fn leaf_cell_offset(cell_num: u32) -> usize {
        LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE
    }

    pub fn leaf_key(&self, cell_num: u32) -> u32 {
        read_u32(&self.0, Self::leaf_cell_offset(cell_num))
    }

    pub fn set_leaf_key(&mut self, cell_num: u32, key: u32) {
        write_u32(&mut self.0, Self::leaf_cell_offset(cell_num), key);
    }

    pub fn leaf_value(&self, cell_num: u32) -> &[u8] {
        let offset = Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        &self.0[offset..offset + LEAF_NODE_VALUE_SIZE]
    }

    pub fn set_leaf_value(&mut self, cell_num: u32, row_bytes: &[u8]) {
        debug_assert_eq!(row_bytes.len(), LEAF_NODE_VALUE_SIZE);
        let offset = Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        self.0[offset..offset + LEAF_NODE_VALUE_SIZE].copy_from_slice(row_bytes);
    }

    /// Copies leaf cell `src` onto cell `dst` within the same page.
    pub fn copy_leaf_cell_within(&mut self, src: u32, dst: u32) {
        let (src_off, dst_off) = (Self::leaf_cell_offset(src), Self::leaf_cell_offset(dst));
        let mut tmp = [0u8; LEAF_NODE_CELL_SIZE];
        tmp.copy_from_slice(&self.0[src_off..src_off + LEAF_NODE_CELL_SIZE]);
        self.0[dst_off..dst_off + LEAF_NODE_CELL_SIZE].copy_from_slice(&tmp);
    }

    /// Copies leaf cell `src` of `self` onto cell `dst` of `other`.
    pub fn copy_leaf_cell_to(&self, src: u32, other: &mut Page, dst: u32) {
        let src_off = Self::leaf_cell_offset(src);
        let dst_off = Self::leaf_cell_offset(dst);
        let cell = self.0[src_off..src_off + LEAF_NODE_CELL_SIZE].to_vec();
        other.0[dst_off..dst_off + LEAF_NODE_CELL_SIZE].copy_from_slice(&cell);
    }

    pub fn set_leaf_cell(&mut self, cell_num: u32, key: u32, row_bytes: &[u8]) {
        self.set_leaf_key(cell_num, key);
        self.set_leaf_value(cell_num, row_bytes);
    }

    pub fn initialize_leaf_node(&mut self) {
        self.set_node_type(NodeType::Leaf);
        self.set_is_root(false);
        self.set_leaf_num_cells(0);
        self.set_leaf_next_leaf(0);
    }

    // --- internal accessors ---

    pub fn internal_num_keys(&self) -> u32 {
        read_u32(&self.0, INTERNAL_NODE_NUM_KEYS_OFFSET)
    }

    pub fn set_internal_num_keys(&mut self, n: u32) {
        write_u32(&mut self.0, INTERNAL_NODE_NUM_KEYS_OFFSET, n);
    }

    pub fn internal_right_child(&self) -> u32 {
        read_u32(&self.0, INTERNAL_NODE_RIGHT_CHILD_OFFSET)
    }

    pub fn set_internal_right_child(&mut self, page_num: u32) {
        write_u32(&mut self.0, INTERNAL_NODE_RIGHT_CHILD_OFFSET, page_num);
    }

    fn internal_cell_offset(cell_num: u32) -> usize {
        INTERNAL_NODE_HEADER_SIZE + cell_num as usize * INTERNAL_NODE_CELL_SIZE
    }

    /// Fatal if `i > num_keys`: that would read past the last valid child.
    pub fn internal_child(&self, i: u32) -> Result<u32, Error> {
        let num_keys = self.internal_num_keys();
        if i > num_keys {
            return Err(Error::Fatal(format!(
                "Tried to access child_num {i} > num_keys {num_keys}"
            )));
        }
        if i == num_keys {
            Ok(self.internal_right_child())
        } else {
            Ok(read_u32(&self.0, Self::internal_cell_offset(i)))
        }
    }

    pub fn set_internal_child(&mut self, i: u32, page_num: u32) {
        let num_keys = self.internal_num_keys();
        if i == num_keys {
            self.set_internal_right_child(page_num);
        } else {
            write_u32(&mut self.0, Self::internal_cell_offset(i), page_num);
        }
    }

    pub fn internal_key(&self, i: u32) -> u32 {
        read_u32(
            &self.0,
            Self::internal_cell_offset(i) + INTERNAL_NODE_CHILD_SIZE,
        )
    }

    pub fn set_internal_key(&mut self, i: u32, key: u32) {
        write_u32(
            &mut self.0,
            Self::internal_cell_offset(i) + INTERNAL_NODE_CHILD_SIZE,
            key,
        );
    }

    pub fn initialize_internal_node(&mut self) {
        self.set_node_type(NodeType::Internal);
        self.set_is_root(false);
        self.set_internal_num_keys(0);
    }

    pub fn get_node_max_key(&self) -> Result<u32, Error> {
        match self.node_type()? {
            NodeType::Leaf => {
                let n = self.leaf_num_cells();
                Ok(self.leaf_key(n - 1))
            }
            NodeType::Internal => {
                let n = self.internal_num_keys();
                Ok(self.internal_key(n - 1))
            }
        }
    }
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    #[test]
    fn leaf_round_trips_key_and_value() {
        let mut page = Page::zeroed();
        page.initialize_leaf_node();
        let row = Row::new(7, "alice", "alice@example.com").unwrap();
        page.set_leaf_cell(0, 7, &row.serialize());
        page.set_leaf_num_cells(1);

        assert_eq!(page.leaf_key(0), 7);
        assert_eq!(Row::deserialize(page.leaf_value(0)), row);
        assert_eq!(page.get_node_max_key().unwrap(), 7);
    }

    #[test]
    fn internal_child_reads_right_child_at_num_keys() {
        let mut page = Page::zeroed();
        page.initialize_internal_node();
        page.set_internal_num_keys(1);
        page.set_internal_child(0, 3);
        page.set_internal_key(0, 100);
        page.set_internal_right_child(9);

        assert_eq!(page.internal_child(0).unwrap(), 3);
        assert_eq!(page.internal_child(1).unwrap(), 9);
        assert_eq!(page.get_node_max_key().unwrap(), 100);
    }

    #[test]
    fn internal_child_out_of_bounds_is_fatal() {
        let mut page = Page::zeroed();
        page.initialize_internal_node();
        page.set_internal_num_keys(1);
        assert!(matches!(page.internal_child(2), Err(Error::Fatal(_))));
    }

    #[test]
    fn split_counts_partition_max_plus_one_cells() {
        assert_eq!(
            LEAF_NODE_LEFT_SPLIT_COUNT + LEAF_NODE_RIGHT_SPLIT_COUNT,
            LEAF_NODE_MAX_CELLS + 1
        );
    }
}
