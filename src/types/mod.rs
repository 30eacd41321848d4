mod flow;
mod match_set;
mod record;
mod rule;
mod ruleset;

pub use flow::FlowEntry;
pub use match_set::{MatchExpr, MatchSet};
pub use record::RuleRecord;
pub use rule::{Action, Direction, PortRange, PortRangeError, Protocol, Rule};
pub use ruleset::{RuleSet, RuleSetBuilder};
