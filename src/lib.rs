//! Compile security-group policies into flow-table match expressions.
//!
//! A policy is a `;`-separated list of directional allow/deny clauses:
//!
//! ```
//! use secflow::{Direction, RuleSet};
//!
//! let ruleset = RuleSet::from_policy("in:allow tcp,ports=22 10.0.0.0/8; out:deny udp").unwrap();
//!
//! let ssh = &ruleset.inbound()[0];
//! assert_eq!(ssh.match_expressions(), vec!["ip,nw_src=10.0.0.0/8,tcp,tp_dst=22"]);
//!
//! // Each direction always ends in a catch-all.
//! assert_eq!(ruleset.in_rules_string(), "in:allow tcp,ports=22 10.0.0.0/8; in:deny any");
//! assert_eq!(ruleset.out_rules_string(), "out:deny udp; out:allow any");
//!
//! for entry in ruleset.flow_entries(Direction::In, 1000).unwrap() {
//!     println!("{entry}");
//! }
//! ```

mod compile;
mod error;
pub mod parse;
pub mod port_range;
mod types;

pub use error::SecflowError;
pub use parse::ParseError;
pub use port_range::{decompose, PortBlock};
pub use types::{
    Action, Direction, FlowEntry, MatchExpr, MatchSet, PortRange, PortRangeError, Protocol, Rule,
    RuleRecord, RuleSet, RuleSetBuilder,
};
