use std::fmt;
use std::sync::OnceLock;

use super::match_set::MatchSet;
use super::rule::{Action, Direction, Rule};

/// A rule together with its compiled match clauses.
///
/// Compilation happens on first access to [`matches()`](Self::matches) and
/// the result is kept for the life of the record. The cache is write-once,
/// so concurrent first access from several threads observes the same value.
#[derive(Debug, Clone)]
pub struct RuleRecord {
    rule: Rule,
    matches: OnceLock<MatchSet>,
}

impl RuleRecord {
    #[must_use]
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            matches: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.rule.direction
    }

    #[must_use]
    pub fn action(&self) -> Action {
        self.rule.action
    }

    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.rule.action == Action::Allow
    }

    #[must_use]
    pub fn is_wild_match(&self) -> bool {
        self.rule.is_wild_match()
    }

    #[must_use]
    pub fn matches(&self) -> &MatchSet {
        self.matches.get_or_init(|| crate::compile::compile(&self.rule))
    }

    /// The rendered match strings, one per flow entry.
    #[must_use]
    pub fn match_expressions(&self) -> Vec<String> {
        self.matches().to_strings()
    }
}

impl From<Rule> for RuleRecord {
    fn from(rule: Rule) -> Self {
        Self::new(rule)
    }
}

impl fmt::Display for RuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rule)
    }
}
