use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::command::{Input, MetaCommand, Statement};
use crate::error::DbError;
use crate::table::Table;

const PROMPT: &str = "db > ";

/// Read-eval-print loop over any line source and output sink.
pub struct Repl<R, W> {
    input: R,
    output: W,
    buffer: Vec<u8>,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            buffer: Vec::new(),
        }
    }

    /// Runs commands against `table` until `.exit` or end of input.
    ///
    /// Recoverable errors are printed and the loop goes on. Fatal storage
    /// errors are returned to the caller.
    pub fn run(&mut self, table: &mut Table) -> Result<()> {
        loop {
            self.print_prompt()?;
            if !self.read_input()? {
                log::debug!("End of input");
                return Ok(());
            }

            let line = String::from_utf8_lossy(&self.buffer).into_owned();
            let input = match Input::parse(&line) {
                Ok(input) => input,
                Err(e) => {
                    writeln!(self.output, "{e}")?;
                    continue;
                }
            };

            match input {
                Input::Meta(MetaCommand::Exit) => return Ok(()),
                Input::Meta(MetaCommand::Unrecognized) => {
                    writeln!(self.output, "Unrecognized command.")?;
                }
                Input::Statement(statement) => self.execute(table, statement)?,
            }
        }
    }

    fn print_prompt(&mut self) -> Result<()> {
        write!(self.output, "{PROMPT}")?;
        self.output.flush()?;
        Ok(())
    }

    /// Returns false once the input is exhausted. Lines are taken as raw
    /// bytes, invalid UTF-8 simply fails to match any command.
    fn read_input(&mut self) -> Result<bool> {
        self.buffer.clear();
        let n = self
            .input
            .read_until(b'\n', &mut self.buffer)
            .context("Failed to read line")?;
        Ok(n > 0)
    }

    fn execute(&mut self, table: &mut Table, statement: Statement) -> Result<()> {
        match statement {
            Statement::Insert(row) => match table.insert(&row) {
                Ok(()) => writeln!(self.output, "Executed.")?,
                Err(e) => self.report(e)?,
            },
            Statement::Select => {
                for row in table.scan() {
                    match row {
                        Ok(row) => writeln!(self.output, "{row}")?,
                        Err(e) => self.report(e)?,
                    }
                }
                writeln!(self.output, "Executed.")?;
            }
            Statement::Refresh => {
                table.clear();
                writeln!(self.output, "Database cleared.")?;
            }
        }
        Ok(())
    }

    fn report(&mut self, e: DbError) -> Result<()> {
        if e.is_fatal() {
            return Err(e.into());
        }
        writeln!(self.output, "Error: {e}")?;
        Ok(())
    }
}
