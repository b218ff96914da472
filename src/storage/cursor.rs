//! Cursor: a `(page_num, cell_num)` position into the leaf level of the
//! tree. Plain data, no borrow of `Table` — callers pass `&mut Table`
//! into every cursor function, which lets a cursor survive across a
//! page split without fighting the borrow checker.
use super::node::{self, NodeType};
use super::row::{Row, ROW_SIZE};
use super::table::Table;
use crate::err;
use crate::errors::Error;

#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

/// A cursor at the start of the table: the root leaf's first cell.
///
/// Only the root leaf is ever visited — there is no sibling-chasing
/// traversal, so a root that has split into an internal node with
/// multiple leaves is not iterated past its first leaf.
pub fn table_start(table: &mut Table) -> Result<Cursor, Error> {
    let mut cursor = table_find(table, 0)?;
    let page = table.pager.get_page(cursor.page_num)?;
    let num_cells = node::leaf_node_num_cells(page);
    cursor.end_of_table = num_cells == 0;
    Ok(cursor)
}

/// Locates `key`, or the position it would be inserted at.
pub fn table_find(table: &mut Table, key: u32) -> Result<Cursor, Error> {
    let root_page_num = table.root_page_num;
    let page = table.pager.get_page(root_page_num)?;
    match node::get_node_type(page)? {
        NodeType::Leaf => leaf_node_find(table, root_page_num, key),
        NodeType::Internal => Err(err!(
            Unsupported,
            "search does not descend into internal nodes"
        )),
    }
}

/// Binary search within a single leaf page for `key`.
pub fn leaf_node_find(table: &mut Table, page_num: u32, key: u32) -> Result<Cursor, Error> {
    let page = table.pager.get_page(page_num)?;
    let num_cells = node::leaf_node_num_cells(page);

    let mut min_index = 0u32;
    let mut one_past_max_index = num_cells;
    while one_past_max_index != min_index {
        let index = (min_index + one_past_max_index) / 2;
        let key_at_index = node::leaf_node_key(page, index as usize);
        if key == key_at_index {
            return Ok(Cursor {
                page_num,
                cell_num: index,
                end_of_table: false,
            });
        }
        if key < key_at_index {
            one_past_max_index = index;
        } else {
            min_index = index + 1;
        }
    }

    Ok(Cursor {
        page_num,
        cell_num: min_index,
        end_of_table: false,
    })
}

/// Deserializes the row at the cursor's current position.
pub fn cursor_value(table: &mut Table, cursor: &Cursor) -> Result<Row, Error> {
    let page = table.pager.get_page(cursor.page_num)?;
    let value = node::leaf_node_value(page, cursor.cell_num as usize);
    debug_assert_eq!(value.len(), ROW_SIZE);
    Ok(Row::deserialize(value))
}

/// Moves the cursor to the next cell in the current leaf, past the end
/// when the leaf is exhausted.
pub fn cursor_advance(table: &mut Table, cursor: &mut Cursor) -> Result<(), Error> {
    let page = table.pager.get_page(cursor.page_num)?;
    cursor.cell_num += 1;
    if cursor.cell_num >= node::leaf_node_num_cells(page) {
        cursor.end_of_table = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::Table;

    #[test]
    fn start_on_empty_table_is_end_of_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = Table::db_open(dir.path().join("test.db")).unwrap();
        let cursor = table_start(&mut table).unwrap();
        assert!(cursor.end_of_table);
    }

    #[test]
    fn find_on_empty_leaf_returns_insertion_point_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = Table::db_open(dir.path().join("test.db")).unwrap();
        let cursor = table_find(&mut table, 5).unwrap();
        assert_eq!(cursor.cell_num, 0);
    }
}
