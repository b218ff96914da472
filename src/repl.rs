//! The interactive loop: prompts on stdout, reads a line from stdin,
//! dispatches it, and reports the result — plain `Stdin`/`Stdout`, no
//! raw-mode terminal control, so piped input produces byte-exact output.
use crate::command::{self, MetaCommand, Statement};
use crate::errors::Error;
use crate::storage::table::{self, Table};
use std::io::{self, BufRead, Write};
use tracing::{error, info};

/// Runs the REPL against `table` until `.exit` or end of input.
/// Returns `Err` only for a fatal error, at which point the caller
/// should exit the process with a non-zero status.
pub fn run(table: &mut Table, input: impl BufRead, mut output: impl Write) -> Result<(), Error> {
    let mut lines = input.lines();
    loop {
        write!(output, "db > ")?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                info!("end of input, closing database");
                table.db_close()?;
                return Ok(());
            }
        };
        let line = line.trim_end();

        if line.starts_with('.') {
            match command::match_meta_command(line) {
                Some(MetaCommand::Exit) => {
                    table.db_close()?;
                    return Ok(());
                }
                Some(MetaCommand::PrintTree) => {
                    let tree = table.print_tree()?;
                    write!(output, "{tree}")?;
                }
                Some(MetaCommand::PrintConstants) => {
                    write!(output, "{}", table::print_constants())?;
                }
                None => {
                    writeln!(output, "Unrecognized command: {line}")?;
                }
            }
            continue;
        }

        match command::prepare_statement(line) {
            Ok(statement) => match execute(table, statement, &mut output) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "fatal error executing statement");
                    return Err(e);
                }
                Err(e) => writeln!(output, "{e}")?,
            },
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => writeln!(output, "{e}")?,
        }
    }
}

fn execute(table: &mut Table, statement: Statement, mut output: impl Write) -> Result<(), Error> {
    match statement {
        Statement::Insert(row) => {
            table.execute_insert(row)?;
            writeln!(output, "Executed.")?;
            Ok(())
        }
        Statement::Select => {
            for row in table.execute_select()? {
                writeln!(output, "{row}")?;
            }
            writeln!(output, "Executed.")?;
            Ok(())
        }
    }
}
