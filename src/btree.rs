//! Search, insert, leaf split, and root creation over pages materialized
//! through the pager. Internal-node splitting is deliberately unimplemented:
//! an insert that would need to propagate a split above the first leaf level
//! is a fatal condition, matching the source this engine is modeled on.

use tracing::info;

use crate::cursor::Cursor;
use crate::errors::Error;
use crate::node::{NodeType, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS, LEAF_NODE_RIGHT_SPLIT_COUNT};
use crate::row::Row;
use crate::table::Table;

pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// Descends from the root to the leaf that does or should contain `key`.
pub fn find(table: &mut Table, key: u32) -> Result<Cursor<'_>, Error> {
    let root_page_num = table.root_page_num;
    let root_type = table.pager.get_page(root_page_num)?.node_type()?;
    match root_type {
        NodeType::Leaf => leaf_node_find(table, root_page_num, key),
        NodeType::Internal => internal_node_find(table, root_page_num, key),
    }
}

fn leaf_node_find(table: &mut Table, page_num: u32, key: u32) -> Result<Cursor<'_>, Error> {
    let page = table.pager.get_page(page_num)?;
    let num_cells = page.leaf_num_cells();

    let mut min_index = 0u32;
    let mut one_past_max = num_cells;
    while one_past_max != min_index {
        let index = min_index + (one_past_max - min_index) / 2;
        if page.leaf_key(index) >= key {
            one_past_max = index;
        } else {
            min_index = index + 1;
        }
    }

    Ok(Cursor {
        table,
        page_num,
        cell_num: min_index,
        end_of_table: false,
    })
}

fn internal_node_find(table: &mut Table, page_num: u32, key: u32) -> Result<Cursor<'_>, Error> {
    let page = table.pager.get_page(page_num)?;
    let num_keys = page.internal_num_keys();

    let mut min_index = 0u32;
    let mut one_past_max = num_keys;
    while one_past_max != min_index {
        let index = min_index + (one_past_max - min_index) / 2;
        if page.internal_key(index) >= key {
            one_past_max = index;
        } else {
            min_index = index + 1;
        }
    }

    let child_num = page.internal_child(min_index)?;
    let child_type = table.pager.get_page(child_num)?.node_type()?;
    match child_type {
        NodeType::Leaf => leaf_node_find(table, child_num, key),
        NodeType::Internal => internal_node_find(table, child_num, key),
    }
}

pub fn insert(table: &mut Table, key: u32, row: &Row) -> Result<InsertOutcome, Error> {
    let mut cursor = find(table, key)?;

    let page = cursor.table.pager.get_page(cursor.page_num)?;
    let num_cells = page.leaf_num_cells();
    if cursor.cell_num < num_cells && page.leaf_key(cursor.cell_num) == key {
        return Ok(InsertOutcome::Duplicate);
    }

    leaf_node_insert(&mut cursor, key, row)?;
    Ok(InsertOutcome::Inserted)
}

fn leaf_node_insert(cursor: &mut Cursor<'_>, key: u32, row: &Row) -> Result<(), Error> {
    let page = cursor.table.pager.get_page(cursor.page_num)?;
    let num_cells = page.leaf_num_cells();

    if (num_cells as usize) < LEAF_NODE_MAX_CELLS {
        for i in (cursor.cell_num..num_cells).rev() {
            page.copy_leaf_cell_within(i, i + 1);
        }
        page.set_leaf_cell(cursor.cell_num, key, &row.serialize());
        page.set_leaf_num_cells(num_cells + 1);
        Ok(())
    } else {
        leaf_node_split_and_insert(cursor, key, row)
    }
}

fn leaf_node_split_and_insert(cursor: &mut Cursor<'_>, key: u32, row: &Row) -> Result<(), Error> {
    let old_page_num = cursor.page_num;
    let new_page_num = cursor.table.pager.get_unused_page_num();

    cursor.table.pager.get_page(new_page_num)?.initialize_leaf_node();

    let left = LEAF_NODE_LEFT_SPLIT_COUNT as u32;
    let right = LEAF_NODE_RIGHT_SPLIT_COUNT as u32;
    let max = LEAF_NODE_MAX_CELLS as u32;

    let is_old_root = {
        let (old_page, new_page) = cursor.table.pager.get_two_pages_mut(old_page_num, new_page_num)?;

        let old_next_leaf = old_page.leaf_next_leaf();
        old_page.set_leaf_next_leaf(new_page_num);
        new_page.set_leaf_next_leaf(old_next_leaf);

        let row_bytes = row.serialize();
        for i in (0..=max).rev() {
            let dest_is_new = i >= left;
            let dest_index = i % left;

            if i == cursor.cell_num {
                if dest_is_new {
                    new_page.set_leaf_cell(dest_index, key, &row_bytes);
                } else {
                    old_page.set_leaf_cell(dest_index, key, &row_bytes);
                }
            } else {
                let src_index = if i > cursor.cell_num { i - 1 } else { i };
                if dest_is_new {
                    old_page.copy_leaf_cell_to(src_index, new_page, dest_index);
                } else {
                    old_page.copy_leaf_cell_within(src_index, dest_index);
                }
            }
        }

        new_page.set_leaf_num_cells(right);
        old_page.set_leaf_num_cells(left);

        old_page.is_root()
    };

    if is_old_root {
        info!(old_page_num, new_page_num, "splitting root leaf, growing tree to height 2");
        create_new_root(cursor.table, new_page_num)
    } else {
        Err(Error::UnimplementedSplit)
    }
}

fn create_new_root(table: &mut Table, right_child_page_num: u32) -> Result<(), Error> {
    let root_page_num = table.root_page_num;
    let left_page_num = table.pager.get_unused_page_num();

    {
        let (root_page, left_page) = table.pager.get_two_pages_mut(root_page_num, left_page_num)?;
        *left_page.as_bytes_mut() = *root_page.as_bytes();
        left_page.set_is_root(false);
    }

    let left_max_key = table.pager.get_page(left_page_num)?.get_node_max_key()?;

    let root_page = table.pager.get_page(root_page_num)?;
    root_page.initialize_internal_node();
    root_page.set_is_root(true);
    root_page.set_internal_num_keys(1);
    root_page.set_internal_child(0, left_page_num);
    root_page.set_internal_key(0, left_max_key);
    root_page.set_internal_right_child(right_child_page_num);
    Ok(())
}
