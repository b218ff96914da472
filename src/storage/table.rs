//! Table lifecycle: opening/closing the backing file and dispatching
//! `insert`/`select` against the tree rooted at page 0.
use super::btree;
use super::cursor::{self, Cursor};
use super::node::{self, COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS, PAGE_SIZE};
use super::pager::Pager;
use super::row::Row;
use crate::errors::Error;
use std::path::Path;
use tracing::info;

pub struct Table {
    pub pager: Pager,
    pub root_page_num: u32,
}

impl Table {
    /// Opens (or creates) the database file at `path`. A brand new file
    /// gets page 0 initialized as an empty leaf root.
    pub fn db_open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut pager = Pager::open(path)?;
        let root_page_num = 0;
        if pager.num_pages() == 0 {
            let root = pager.get_page(root_page_num)?;
            node::initialize_leaf_node(root);
            node::set_node_root(root, true);
            info!("initialized new empty database");
        }
        Ok(Table { pager, root_page_num })
    }

    /// Flushes every dirty page and closes the underlying file.
    pub fn db_close(&mut self) -> Result<(), Error> {
        self.pager.close()
    }

    /// Inserts `row`, failing with `Error::DuplicateKey` if its id is
    /// already present.
    pub fn execute_insert(&mut self, row: Row) -> Result<(), Error> {
        let key = row.id;
        let cursor = cursor::table_find(self, key)?;

        let existing_cells = {
            let page = self.pager.get_page(cursor.page_num)?;
            node::leaf_node_num_cells(page)
        };
        if cursor.cell_num < existing_cells {
            let page = self.pager.get_page(cursor.page_num)?;
            if node::leaf_node_key(page, cursor.cell_num as usize) == key {
                return Err(Error::DuplicateKey);
            }
        }

        btree::leaf_node_insert(self, &cursor, key, &row)
    }

    /// Returns every row whose id is non-zero, in key order.
    pub fn execute_select(&mut self) -> Result<Vec<Row>, Error> {
        let mut rows = Vec::new();
        let mut cursor: Cursor = cursor::table_start(self)?;
        while !cursor.end_of_table {
            let row = cursor::cursor_value(self, &cursor)?;
            if row.id != 0 {
                rows.push(row);
            }
            cursor::cursor_advance(self, &mut cursor)?;
        }
        Ok(rows)
    }

    /// Renders the `.btree` meta-command's tree dump, rooted at page 0.
    pub fn print_tree(&mut self) -> Result<String, Error> {
        let root_page_num = self.root_page_num;
        btree::print_tree(self, root_page_num, 0)
    }
}

/// Renders the `.constants` meta-command's fixed layout dump.
pub fn print_constants() -> String {
    format!(
        "ROW_SIZE: {}\n\
         COMMON_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_CELL_SIZE: {}\n\
         LEAF_NODE_SPACE_FOR_CELLS: {}\n\
         LEAF_NODE_MAX_CELLS: {}\n",
        super::row::ROW_SIZE,
        COMMON_NODE_HEADER_SIZE,
        LEAF_NODE_HEADER_SIZE,
        LEAF_NODE_CELL_SIZE,
        PAGE_SIZE - LEAF_NODE_HEADER_SIZE,
        LEAF_NODE_MAX_CELLS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_roundtrips_a_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let mut table = Table::db_open(&path).unwrap();
            let row = Row::new(1, "user1", "person1@example.com").unwrap();
            table.execute_insert(row).unwrap();
            table.db_close().unwrap();
        }
        {
            let mut table = Table::db_open(&path).unwrap();
            let rows = table.execute_select().unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].id, 1);
        }
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = Table::db_open(dir.path().join("test.db")).unwrap();
        table
            .execute_insert(Row::new(1, "a", "a@a.com").unwrap())
            .unwrap();
        let err = table
            .execute_insert(Row::new(1, "b", "b@b.com").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey));
    }

    #[test]
    fn select_filters_zero_id_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = Table::db_open(dir.path().join("test.db")).unwrap();
        assert_eq!(table.execute_select().unwrap().len(), 0);
    }

    #[test]
    fn select_returns_rows_in_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = Table::db_open(dir.path().join("test.db")).unwrap();
        for id in [5u32, 1, 3] {
            table
                .execute_insert(Row::new(id, "u", "e@e.com").unwrap())
                .unwrap();
        }
        let rows = table.execute_select().unwrap();
        let ids: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn constants_dump_matches_derived_sizes() {
        let dump = print_constants();
        assert!(dump.contains("ROW_SIZE: 291"));
        assert!(dump.contains("LEAF_NODE_MAX_CELLS: 13"));
    }
}
