//! Tokenizes a REPL line into a prepared statement and executes it against
//! the tree. Kept deliberately dumb: whitespace splitting, no quoting.

use std::fmt;

use crate::btree::{self, InsertOutcome};
use crate::cursor::Cursor;
use crate::errors::Error;
use crate::row::Row;
use crate::table::Table;

pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug)]
pub enum PrepareError {
    Syntax,
    NegativeId,
    StringTooLong,
    Unrecognized(String),
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrepareError::Syntax => write!(f, "Syntax error. Could not parse statement."),
            PrepareError::NegativeId => write!(f, "ID must be positive."),
            PrepareError::StringTooLong => write!(f, "String is too long."),
            PrepareError::Unrecognized(line) => {
                write!(f, "Unrecognized keyword at start of '{line}'")
            }
        }
    }
}

#[derive(Debug)]
pub enum ExecuteError {
    Duplicate,
    Fatal(Error),
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecuteError::Duplicate => write!(f, "Error: Duplicate key."),
            ExecuteError::Fatal(e) => write!(f, "{e}"),
        }
    }
}

impl From<Error> for ExecuteError {
    fn from(err: Error) -> Self {
        ExecuteError::Fatal(err)
    }
}

pub fn prepare_statement(line: &str) -> Result<Statement, PrepareError> {
    if line == "select" {
        return Ok(Statement::Select);
    }

    if line.starts_with("insert") {
        let mut parts = line.split_whitespace();
        parts.next();
        let id_str = parts.next().ok_or(PrepareError::Syntax)?;
        let username = parts.next().ok_or(PrepareError::Syntax)?;
        let email = parts.next().ok_or(PrepareError::Syntax)?;

        let id: i64 = id_str.parse().map_err(|_| PrepareError::Syntax)?;
        if id < 0 {
            return Err(PrepareError::NegativeId);
        }
        let id: u32 = id.try_into().map_err(|_| PrepareError::Syntax)?;

        let row = Row::new(id, username, email).map_err(|_| PrepareError::StringTooLong)?;
        return Ok(Statement::Insert(row));
    }

    Err(PrepareError::Unrecognized(line.to_owned()))
}

pub fn execute_insert(row: Row, table: &mut Table) -> Result<(), ExecuteError> {
    match btree::insert(table, row.id, &row)? {
        InsertOutcome::Inserted => Ok(()),
        InsertOutcome::Duplicate => Err(ExecuteError::Duplicate),
    }
}

pub fn execute_select(
    table: &mut Table,
    mut on_row: impl FnMut(&Row),
) -> Result<(), ExecuteError> {
    let mut cursor = Cursor::table_start(table)?;
    while !cursor.end_of_table {
        let row = Row::deserialize(cursor.value()?);
        on_row(&row);
        cursor.advance()?;
    }
    Ok(())
}
