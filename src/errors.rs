//! Crate-wide error type.
//!
//! Errors fall into two dispositions (see `Error::is_fatal`): validation,
//! syntax, duplicate-key and table-full errors are recovered by the REPL
//! loop; everything else leaves the pager or tree in a state no longer
//! safe to keep operating on, and is fatal.
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// OS-level failure from open/seek/read/write/close.
    Io(std::io::Error),
    /// File length is not a whole multiple of `PAGE_SIZE`, or another
    /// on-disk invariant doesn't hold.
    Corruption(String),
    /// A code path the source leaves unimplemented (internal-node search,
    /// non-root splits).
    Unsupported(String),
    /// `unused_page_num()` would exceed `TABLE_MAX_PAGES`.
    TableFull,
    /// Insert collided with an existing key.
    DuplicateKey,
    /// Non-positive id, oversized string, or another statement-level
    /// validation failure.
    Validation(String),
    /// Malformed statement text.
    Syntax(String),
}

impl Error {
    /// Fatal errors report and terminate the REPL with exit code 1.
    /// Everything else is recovered and the loop continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Corruption(_) | Error::Unsupported(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Corruption(msg) => write!(f, "Corruption: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Error::TableFull => write!(f, "Error: Table full."),
            Error::DuplicateKey => write!(f, "Error: Duplicate key."),
            Error::Validation(msg) => write!(f, "{}", msg),
            Error::Syntax(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

/// Builds an `errors::Error::Variant(format!(...))` in one call, the way
/// the storage modules construct errors inline.
#[macro_export]
macro_rules! err {
    ($variant:ident, $($arg:tt)*) => {
        $crate::errors::Error::$variant(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(Error::Corruption("x".into()).is_fatal());
        assert!(Error::Unsupported("x".into()).is_fatal());
        assert!(!Error::TableFull.is_fatal());
        assert!(!Error::DuplicateKey.is_fatal());
        assert!(!Error::Validation("x".into()).is_fatal());
        assert!(!Error::Syntax("x".into()).is_fatal());
    }

    #[test]
    fn display_matches_repl_contract() {
        assert_eq!(Error::TableFull.to_string(), "Error: Table full.");
        assert_eq!(Error::DuplicateKey.to_string(), "Error: Duplicate key.");
    }
}
