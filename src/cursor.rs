//! A logical position into the tree, used for both point lookup and
//! ordered full-scan iteration. Cursors borrow the table for their whole
//! lifetime and are never retained past the operation that created them.

use crate::btree;
use crate::errors::Error;
use crate::table::Table;

pub struct Cursor<'a> {
    pub table: &'a mut Table,
    pub page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub fn table_start(table: &'a mut Table) -> Result<Self, Error> {
        let mut cursor = btree::find(table, 0)?;
        let page = cursor.table.pager.get_page(cursor.page_num)?;
        cursor.end_of_table = page.leaf_num_cells() == 0;
        Ok(cursor)
    }

    pub fn value(&mut self) -> Result<&[u8], Error> {
        let page = self.table.pager.get_page(self.page_num)?;
        Ok(page.leaf_value(self.cell_num))
    }

    pub fn advance(&mut self) -> Result<(), Error> {
        let page = self.table.pager.get_page(self.page_num)?;
        let num_cells = page.leaf_num_cells();
        self.cell_num += 1;

        if self.cell_num >= num_cells {
            let next_leaf = page.leaf_next_leaf();
            if next_leaf == 0 {
                self.end_of_table = true;
            } else {
                self.page_num = next_leaf;
                self.cell_num = 0;
            }
        }
        Ok(())
    }
}
