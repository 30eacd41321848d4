use crate::Rule;

/// The result of parsing a policy string: every non-blank clause in source
/// order.
#[derive(Debug)]
pub struct ParsedPolicy {
    pub rules: Vec<Rule>,
}
