mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::ParsedPolicy;

/// Parse a single clause such as `in:allow tcp,ports=22 10.0.0.0/8`.
///
/// # Errors
///
/// Returns [`ParseError`] if the clause is not valid rule syntax.
pub fn parse_rule(clause: &str) -> Result<crate::Rule, ParseError> {
    use winnow::Parser;
    let clause = clause.trim();
    grammar::clause.parse(clause).map_err(|e| {
        tracing::debug!(clause, "rejected policy clause");
        ParseError::new(clause, e.to_string())
    })
}

/// Parse a `;`-separated policy. Blank clauses are skipped; the first
/// malformed clause aborts the whole parse.
///
/// # Errors
///
/// Returns [`ParseError`] for the first clause that does not parse.
pub fn parse_policy(input: &str) -> Result<ParsedPolicy, ParseError> {
    let rules = input
        .split(';')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .map(parse_rule)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParsedPolicy { rules })
}
