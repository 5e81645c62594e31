use std::io::{self, BufRead};

use tracing::info;

use crate::console;
use crate::errors::Error;
use crate::node;
use crate::row;
use crate::statement::{self, ExecuteError, Statement};
use crate::table::Table;

pub fn run(path: &str) -> Result<(), Error> {
    let mut table = Table::db_open(path)?;
    info!(path, "REPL started");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        console::prompt();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => return Err(Error::from(e)),
            None => return Err(Error::Fatal("Error reading input: unexpected EOF".to_owned())),
        };

        if line.starts_with('.') {
            match line.as_str() {
                ".exit" => {
                    table.db_close()?;
                    return Ok(());
                }
                ".btree" => {
                    echo!("Tree:");
                    print_tree(&mut table, table.root_page_num, 0)?;
                }
                ".constants" => print_constants(),
                _ => echo!("Unrecognized command '{line}'"),
            }
            continue;
        }

        match statement::prepare_statement(&line) {
            Err(e) => echo!("{e}"),
            Ok(Statement::Insert(row)) => match statement::execute_insert(row, &mut table) {
                Ok(()) => echo!("Executed."),
                Err(ExecuteError::Duplicate) => echo!("Error: Duplicate key."),
                Err(ExecuteError::Fatal(e)) => return Err(e),
            },
            Ok(Statement::Select) => {
                let result = statement::execute_select(&mut table, |row| echo!("{row}"));
                match result {
                    Ok(()) => echo!("Executed."),
                    Err(ExecuteError::Duplicate) => unreachable!("select never duplicates"),
                    Err(ExecuteError::Fatal(e)) => return Err(e),
                }
            }
        }
    }
}

fn print_constants() {
    echo!("Constants:");
    echo!("ROW_SIZE: {}", row::ROW_SIZE);
    echo!("COMMON_NODE_HEADER_SIZE: {}", node::COMMON_NODE_HEADER_SIZE);
    echo!("LEAF_NODE_HEADER_SIZE: {}", node::LEAF_NODE_HEADER_SIZE);
    echo!("LEAF_NODE_CELL_SIZE: {}", node::LEAF_NODE_CELL_SIZE);
    echo!(
        "LEAF_NODE_SPACE_FOR_CELLS: {}",
        node::LEAF_NODE_SPACE_FOR_CELLS
    );
    echo!("LEAF_NODE_MAX_CELLS: {}", node::LEAF_NODE_MAX_CELLS);
}

fn print_tree(table: &mut Table, page_num: u32, indent: usize) -> Result<(), Error> {
    let pad = "  ".repeat(indent);
    let page = table.pager.get_page(page_num)?;

    match page.node_type()? {
        node::NodeType::Leaf => {
            let num_cells = page.leaf_num_cells();
            echo!("{pad}- leaf (size {num_cells})");
            for i in 0..num_cells {
                echo!("{}- key {}", "  ".repeat(indent + 1), page.leaf_key(i));
            }
        }
        node::NodeType::Internal => {
            let num_keys = page.internal_num_keys();
            echo!("{pad}- internal (size {num_keys})");

            let mut children = Vec::with_capacity(num_keys as usize);
            for i in 0..num_keys {
                children.push((page.internal_child(i)?, page.internal_key(i)));
            }
            let right_child = page.internal_right_child();

            for (child_num, key) in children {
                print_tree(table, child_num, indent + 1)?;
                echo!("{}- key {}", "  ".repeat(indent + 1), key);
            }
            print_tree(table, right_child, indent + 1)?;
        }
    }
    Ok(())
}
