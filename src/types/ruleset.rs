use std::fmt;
use std::str::FromStr;

use super::flow::FlowEntry;
use super::record::RuleRecord;
use super::rule::{Direction, Rule};
use crate::parse::ParseError;

/// Builder for constructing a [`RuleSet`] from already-structured rules.
///
/// Rules keep their insertion order within each direction; the first
/// matching rule wins.
///
/// # Example
///
/// ```
/// use secflow::{Action, Direction, Protocol, Rule, RuleSetBuilder};
///
/// let ruleset = RuleSetBuilder::new()
///     .rule(Rule::new(Direction::In, Action::Allow).protocol(Protocol::Tcp).ports([22]))
///     .build();
///
/// assert_eq!(ruleset.in_rules_string(), "in:allow tcp,ports=22; in:deny any");
/// assert_eq!(ruleset.out_rules_string(), "out:allow any");
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    inbound: Vec<RuleRecord>,
    outbound: Vec<RuleRecord>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the sequence for its direction.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.push(rule);
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        for rule in rules {
            self.push(rule);
        }
        self
    }

    fn push(&mut self, rule: Rule) {
        match rule.direction {
            Direction::In => self.inbound.push(RuleRecord::new(rule)),
            Direction::Out => self.outbound.push(RuleRecord::new(rule)),
        }
    }

    /// Finish the set, terminating each direction with a catch-all rule.
    #[must_use]
    pub fn build(mut self) -> RuleSet {
        complete_defaults(Direction::In, &mut self.inbound);
        complete_defaults(Direction::Out, &mut self.outbound);
        RuleSet {
            inbound: self.inbound,
            outbound: self.outbound,
        }
    }
}

/// Guarantee the last record of `records` is a wild match. Inbound traffic
/// that reaches the end is denied, outbound traffic is allowed.
fn complete_defaults(direction: Direction, records: &mut Vec<RuleRecord>) {
    if records.last().is_some_and(RuleRecord::is_wild_match) {
        return;
    }
    let terminal = match direction {
        Direction::In => Rule::deny_all(direction),
        Direction::Out => Rule::allow_all(direction),
    };
    tracing::debug!(%direction, rule = %terminal, "appending default rule");
    records.push(RuleRecord::new(terminal));
}

/// A compiled security policy: one ordered rule sequence per direction, each
/// ending in a wild-match rule. Immutable once built and safe to share
/// across threads.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub(crate) inbound: Vec<RuleRecord>,
    pub(crate) outbound: Vec<RuleRecord>,
}

impl RuleSet {
    #[must_use]
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Parse a `;`-separated policy and build the rule set.
    ///
    /// Construction is all-or-nothing: one malformed clause fails the whole
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for the first clause that does not parse.
    pub fn from_policy(input: &str) -> Result<Self, ParseError> {
        let parsed = crate::parse::parse_policy(input)?;
        Ok(RuleSetBuilder::new().rules(parsed.rules).build())
    }

    /// Read a policy file and build the rule set.
    ///
    /// # Errors
    ///
    /// Returns [`SecflowError`](crate::SecflowError) on I/O or parse failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::SecflowError> {
        let input = std::fs::read_to_string(path)?;
        Ok(Self::from_policy(&input)?)
    }

    #[must_use]
    pub fn inbound(&self) -> &[RuleRecord] {
        &self.inbound
    }

    #[must_use]
    pub fn outbound(&self) -> &[RuleRecord] {
        &self.outbound
    }

    #[must_use]
    pub fn rules(&self, direction: Direction) -> &[RuleRecord] {
        match direction {
            Direction::In => &self.inbound,
            Direction::Out => &self.outbound,
        }
    }

    /// Canonical clauses of one direction joined with `"; "`.
    #[must_use]
    pub fn rules_string(&self, direction: Direction) -> String {
        self.rules(direction)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    #[must_use]
    pub fn in_rules_string(&self) -> String {
        self.rules_string(Direction::In)
    }

    #[must_use]
    pub fn out_rules_string(&self) -> String {
        self.rules_string(Direction::Out)
    }

    /// Flow entries for one direction in evaluation order.
    ///
    /// Record `i` of `n` is given priority `base_priority + (n - i)`, so
    /// priorities strictly decrease along the sequence and the final
    /// catch-all sits at `base_priority + 1`. All clauses of one record share
    /// its priority and action.
    ///
    /// # Errors
    ///
    /// Returns [`SecflowError::PriorityOverflow`](crate::SecflowError::PriorityOverflow)
    /// if `base_priority + n` does not fit in a 16-bit flow priority.
    pub fn flow_entries(
        &self,
        direction: Direction,
        base_priority: u16,
    ) -> Result<Vec<FlowEntry>, crate::SecflowError> {
        let records = self.rules(direction);
        let top = u16::try_from(records.len())
            .ok()
            .and_then(|n| base_priority.checked_add(n))
            .ok_or(crate::SecflowError::PriorityOverflow {
                base: base_priority,
                records: records.len(),
            })?;

        let mut entries = Vec::new();
        for (offset, record) in (0..).zip(records) {
            let priority = top - offset;
            entries.extend(record.matches().clauses().iter().map(|clause| FlowEntry {
                priority,
                action: record.action(),
                matches: clause.to_string(),
            }));
        }
        Ok(entries)
    }
}

impl FromStr for RuleSet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_policy(s)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} inbound, {} outbound)",
            self.inbound.len(),
            self.outbound.len(),
        )
    }
}
