//! Parsing of one line of user input.

use thiserror::Error;

use crate::error::DbError;
use crate::row::Row;

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Unrecognized,
}

impl MetaCommand {
    fn parse(input: &str) -> Option<MetaCommand> {
        // anything after the command word is ignored
        match input.split_whitespace().next() {
            Some(".exit") => Some(MetaCommand::Exit),
            Some(word) if word.starts_with('.') => Some(MetaCommand::Unrecognized),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
    Refresh,
}

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    Syntax,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("Unrecognized command.")]
    Unrecognized,

    #[error("Error: {0}")]
    InvalidRow(#[from] DbError),
}

impl Statement {
    fn prepare(input: &str) -> Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        match tokens.next() {
            Some("insert") => prepare_insert(tokens),
            Some("select") => Ok(Statement::Select),
            Some("refresh") => Ok(Statement::Refresh),
            _ => Err(PrepareError::Unrecognized),
        }
    }
}

fn prepare_insert<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<Statement, PrepareError> {
    let (Some(id), Some(name), Some(email), None) =
        (args.next(), args.next(), args.next(), args.next())
    else {
        return Err(PrepareError::Syntax);
    };

    let id: i64 = id.parse().map_err(|_| PrepareError::Syntax)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::Syntax)?;

    Ok(Statement::Insert(Row::new(id, name, email)?))
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Meta(MetaCommand),
    Statement(Statement),
}

impl Input {
    pub fn parse(input: &str) -> Result<Input, PrepareError> {
        let input = input.trim();
        if let Some(meta) = MetaCommand::parse(input) {
            Ok(Input::Meta(meta))
        } else {
            Statement::prepare(input).map(Input::Statement)
        }
    }
}
