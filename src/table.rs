use crate::errors::Error;
use crate::node::NodeType;
use crate::pager::Pager;

/// No `Drop` impl: flushing on an unwinding drop would persist a half-finished
/// split (or any other in-progress write) for a fatal error the caller never
/// asked to be durable. Closing is only ever explicit, via `db_close`.
pub struct Table {
    pub root_page_num: u32,
    pub pager: Pager,
}

impl Table {
    pub fn db_open(path: &str) -> Result<Self, Error> {
        let mut pager = Pager::open(path)?;
        let root_page_num = 0;

        if pager.num_pages == 0 {
            let root = pager.get_page(root_page_num)?;
            root.initialize_leaf_node();
            root.set_is_root(true);
        }

        Ok(Table {
            root_page_num,
            pager,
        })
    }

    pub fn db_close(&mut self) -> Result<(), Error> {
        self.pager.close()
    }

    pub fn root_node_type(&mut self) -> Result<NodeType, Error> {
        self.pager.get_page(self.root_page_num)?.node_type()
    }
}
