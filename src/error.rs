use thiserror::Error;

use crate::parse::ParseError;

/// Unified error type covering policy parsing and I/O.
///
/// Returned by convenience methods like
/// [`RuleSet::from_file()`](crate::RuleSet::from_file).
#[derive(Debug, Error)]
pub enum SecflowError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{records} rules above base priority {base} exceed the 16-bit flow priority space")]
    PriorityOverflow { base: u16, records: usize },
}
