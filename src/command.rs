//! Statement parsing: turns one line of REPL input into an executable
//! `Statement`, or a `MetaCommand`.
use crate::err;
use crate::errors::Error;
use crate::storage::Row;
use once_cell::sync::Lazy;
use regex::Regex;

static INSERT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^insert (\d+) (\S+) (\S+)$").unwrap());

pub enum Statement {
    Insert(Row),
    Select,
}

pub enum MetaCommand {
    Exit,
    PrintTree,
    PrintConstants,
}

/// Recognizes a leading `.`-prefixed meta-command. Returns `None` for
/// any other input, including unrecognized `.`-commands — the caller
/// reports those itself so it can include the original text.
pub fn match_meta_command(input: &str) -> Option<MetaCommand> {
    match input {
        ".exit" => Some(MetaCommand::Exit),
        ".btree" => Some(MetaCommand::PrintTree),
        ".constants" => Some(MetaCommand::PrintConstants),
        _ => None,
    }
}

/// Parses `insert <id> <username> <email>` or `select`. Validation
/// order matches the contract: unparseable id before oversized strings,
/// string-too-long before building the row.
pub fn prepare_statement(input: &str) -> Result<Statement, Error> {
    if input.starts_with("insert") {
        let captures = INSERT_RE
            .captures(input)
            .ok_or_else(|| err!(Syntax, "Syntax error. Could not parse statement."))?;

        let id: i64 = captures[1]
            .parse()
            .map_err(|_| err!(Syntax, "Syntax error. Could not parse statement."))?;
        if id <= 0 {
            return Err(err!(Validation, "ID must be positive"));
        }

        let username = &captures[2];
        let email = &captures[3];
        let row = Row::new(id as u32, username.to_string(), email.to_string())?;
        Ok(Statement::Insert(row))
    } else if input == "select" {
        Ok(Statement::Select)
    } else {
        Err(err!(
            Syntax,
            "Unrecognized keyword at start of: {}",
            input
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_insert() {
        let stmt = prepare_statement("insert 1 user1 person1@example.com").unwrap();
        match stmt {
            Statement::Insert(row) => {
                assert_eq!(row.id, 1);
                assert_eq!(row.username, "user1");
                assert_eq!(row.email, "person1@example.com");
            }
            _ => panic!("expected Insert"),
        }
    }

    #[test]
    fn parses_select() {
        assert!(matches!(prepare_statement("select").unwrap(), Statement::Select));
    }

    #[test]
    fn rejects_zero_id_as_non_positive() {
        let err = prepare_statement("insert 0 user1 person1@example.com").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn negative_id_is_a_syntax_error_not_validation() {
        // `\d+` never matches a leading `-`, so this fails to parse at
        // all rather than reaching the positivity check.
        let err = prepare_statement("insert -1 user1 person1@example.com").unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn rejects_oversized_strings() {
        let long_email = "a".repeat(300);
        let input = format!("insert 1 user1 {}", long_email);
        let err = prepare_statement(&input).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_unparseable_statement() {
        let err = prepare_statement("insert 1 user1").unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn rejects_unrecognized_keyword() {
        let err = prepare_statement("delete 1").unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn recognizes_meta_commands() {
        assert!(matches!(match_meta_command(".exit"), Some(MetaCommand::Exit)));
        assert!(matches!(match_meta_command(".btree"), Some(MetaCommand::PrintTree)));
        assert!(matches!(
            match_meta_command(".constants"),
            Some(MetaCommand::PrintConstants)
        ));
        assert!(match_meta_command(".bogus").is_none());
        assert!(match_meta_command("select").is_none());
    }
}
