//! B-tree write path: leaf insertion, splitting a full root leaf, and
//! growing a new root. Splitting a non-root node and searching past the
//! root into internal nodes are left unimplemented — both surface as
//! `Error::Unsupported` rather than silently doing the wrong thing.
use super::cursor::Cursor;
use super::node::{self, NodeType, Page, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS, LEAF_NODE_RIGHT_SPLIT_COUNT, PAGE_SIZE, TABLE_MAX_PAGES};
use super::row::{Row, ROW_SIZE};
use super::table::Table;
use crate::err;
use crate::errors::Error;
use tracing::{debug, trace};

/// Inserts `row` at `cursor`'s position, splitting the leaf first if it
/// is already full.
pub fn leaf_node_insert(table: &mut Table, cursor: &Cursor, key: u32, row: &Row) -> Result<(), Error> {
    let num_cells = {
        let page = table.pager.get_page(cursor.page_num)?;
        node::leaf_node_num_cells(page)
    };

    if num_cells as usize >= LEAF_NODE_MAX_CELLS {
        return leaf_node_split_and_insert(table, cursor, key, row);
    }

    let page = table.pager.get_page(cursor.page_num)?;
    let cell_num = cursor.cell_num as usize;
    shift_cells_right(page, cell_num, num_cells as usize);
    node::set_leaf_node_num_cells(page, num_cells + 1);
    node::set_leaf_node_key(page, cell_num, key);
    let mut row_buf = [0u8; ROW_SIZE];
    row.serialize(&mut row_buf);
    node::leaf_node_value_mut(page, cell_num).copy_from_slice(&row_buf);

    trace!(page_num = cursor.page_num, cell_num, key, "leaf insert");
    Ok(())
}

/// Shifts cells `[from, num_cells)` one slot to the right to open a gap
/// at `from`.
fn shift_cells_right(page: &mut Page, from: usize, num_cells: usize) {
    for i in (from..num_cells).rev() {
        let mut buf = [0u8; node::LEAF_NODE_CELL_SIZE];
        buf.copy_from_slice(node::leaf_node_cell(page, i));
        node::leaf_node_cell_mut(page, i + 1).copy_from_slice(&buf);
    }
}

/// Splits a full leaf into itself (left half) and a freshly allocated
/// sibling (right half), inserting the new cell into whichever half it
/// belongs in. Only defined when the leaf being split is the root.
fn leaf_node_split_and_insert(table: &mut Table, cursor: &Cursor, key: u32, row: &Row) -> Result<(), Error> {
    let old_page_num = cursor.page_num;
    let is_root = {
        let old_page = table.pager.get_page(old_page_num)?;
        node::is_node_root(old_page)
    };
    if !is_root {
        return Err(err!(
            Unsupported,
            "splitting a non-root leaf node is not implemented"
        ));
    }

    let new_page_num = table.pager.unused_page_num();
    if new_page_num as usize > TABLE_MAX_PAGES {
        return Err(Error::TableFull);
    }

    let old_page_copy: Page = *table.pager.get_page(old_page_num)?;
    let old_parent = node::parent_pointer(&old_page_copy);

    let mut row_buf = [0u8; ROW_SIZE];
    row.serialize(&mut row_buf);

    let mut old_buf: Page = [0u8; PAGE_SIZE];
    let mut new_buf: Page = [0u8; PAGE_SIZE];
    node::initialize_leaf_node(&mut old_buf);
    node::initialize_leaf_node(&mut new_buf);
    node::set_parent_pointer(&mut old_buf, old_parent);
    node::set_parent_pointer(&mut new_buf, old_parent);

    let cell_num = cursor.cell_num as usize;
    for i in (0..=LEAF_NODE_MAX_CELLS).rev() {
        let dest_buf: &mut Page = if i >= LEAF_NODE_LEFT_SPLIT_COUNT {
            &mut new_buf
        } else {
            &mut old_buf
        };
        let index_within_page = i % LEAF_NODE_LEFT_SPLIT_COUNT;

        use std::cmp::Ordering;
        match i.cmp(&cell_num) {
            Ordering::Equal => {
                node::set_leaf_node_key(dest_buf, index_within_page, key);
                node::leaf_node_value_mut(dest_buf, index_within_page).copy_from_slice(&row_buf);
            }
            Ordering::Greater => {
                let src_cell = node::leaf_node_cell(&old_page_copy, i - 1);
                let mut buf = [0u8; node::LEAF_NODE_CELL_SIZE];
                buf.copy_from_slice(src_cell);
                node::leaf_node_cell_mut(dest_buf, index_within_page).copy_from_slice(&buf);
            }
            Ordering::Less => {
                let src_cell = node::leaf_node_cell(&old_page_copy, i);
                let mut buf = [0u8; node::LEAF_NODE_CELL_SIZE];
                buf.copy_from_slice(src_cell);
                node::leaf_node_cell_mut(dest_buf, index_within_page).copy_from_slice(&buf);
            }
        }
    }
    node::set_leaf_node_num_cells(&mut old_buf, LEAF_NODE_LEFT_SPLIT_COUNT as u32);
    node::set_leaf_node_num_cells(&mut new_buf, LEAF_NODE_RIGHT_SPLIT_COUNT as u32);

    {
        let new_page = table.pager.get_page(new_page_num)?;
        *new_page = new_buf;
    }
    {
        let old_page = table.pager.get_page(old_page_num)?;
        *old_page = old_buf;
    }

    debug!(old_page_num, new_page_num, cell_num, "split full root leaf");
    create_new_root(table, new_page_num)
}

/// Grows a one-level-deeper tree: the current root's contents move into
/// a new left-child page, and the root is reinitialized as an internal
/// node pointing at that left child and `right_child_page_num`.
fn create_new_root(table: &mut Table, right_child_page_num: u32) -> Result<(), Error> {
    let root_page_num = table.root_page_num;
    let left_child_page_num = table.pager.unused_page_num();
    if left_child_page_num as usize > TABLE_MAX_PAGES {
        return Err(Error::TableFull);
    }

    let root_copy: Page = *table.pager.get_page(root_page_num)?;

    {
        let left_child = table.pager.get_page(left_child_page_num)?;
        *left_child = root_copy;
        node::set_node_root(left_child, false);
        node::set_parent_pointer(left_child, root_page_num);
    }

    {
        let right_child = table.pager.get_page(right_child_page_num)?;
        node::set_parent_pointer(right_child, root_page_num);
    }

    let left_child_max_key = {
        let left_child = table.pager.get_page(left_child_page_num)?;
        node::get_node_max_key(left_child)?
    };

    let root = table.pager.get_page(root_page_num)?;
    node::initialize_internal_node(root);
    node::set_node_root(root, true);
    node::set_internal_node_num_keys(root, 1);
    node::set_internal_node_child(root, 0, left_child_page_num);
    node::set_internal_node_key(root, 0, left_child_max_key);
    node::set_internal_node_right_child(root, right_child_page_num);

    debug!(
        root_page_num,
        left_child_page_num, right_child_page_num, left_child_max_key, "grew new root"
    );
    Ok(())
}

/// Renders the tree for `.btree`, matching the original indentation
/// style: internal nodes show their key list and recurse into each
/// child in order, leaves list their keys with a dash.
pub fn print_tree(table: &mut Table, page_num: u32, indent: usize) -> Result<String, Error> {
    let mut out = String::new();
    let page_type = {
        let page = table.pager.get_page(page_num)?;
        node::get_node_type(page)?
    };
    match page_type {
        NodeType::Leaf => {
            let num_cells = {
                let page = table.pager.get_page(page_num)?;
                node::leaf_node_num_cells(page)
            };
            out.push_str(&"  ".repeat(indent));
            out.push_str(&format!("- leaf (size {})\n", num_cells));
            for i in 0..num_cells {
                let key = {
                    let page = table.pager.get_page(page_num)?;
                    node::leaf_node_key(page, i as usize)
                };
                out.push_str(&"  ".repeat(indent + 1));
                out.push_str(&format!("- {}\n", key));
            }
        }
        NodeType::Internal => {
            let num_keys = {
                let page = table.pager.get_page(page_num)?;
                node::internal_node_num_keys(page)
            };
            out.push_str(&"  ".repeat(indent));
            out.push_str(&format!("- internal (size {})\n", num_keys));
            for i in 0..num_keys {
                let child = {
                    let page = table.pager.get_page(page_num)?;
                    node::internal_node_child(page, i)
                };
                out.push_str(&print_tree(table, child, indent + 1)?);
                let key = {
                    let page = table.pager.get_page(page_num)?;
                    node::internal_node_key(page, i)
                };
                out.push_str(&"  ".repeat(indent + 1));
                out.push_str(&format!("- key {}\n", key));
            }
            let right_child = {
                let page = table.pager.get_page(page_num)?;
                node::internal_node_right_child(page)
            };
            out.push_str(&print_tree(table, right_child, indent + 1)?);
        }
    }
    Ok(out)
}
