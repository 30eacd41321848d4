use std::fmt;

use super::rule::Action;

/// One classifier entry ready for installation: a match string, the action
/// to take on a hit, and its 16-bit flow priority (higher is checked first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEntry {
    pub priority: u16,
    pub action: Action,
    pub matches: String,
}

impl FlowEntry {
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.action == Action::Allow
    }
}

impl fmt::Display for FlowEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "priority={}", self.priority)?;
        if !self.matches.is_empty() {
            write!(f, ",{}", self.matches)?;
        }
        write!(f, " actions={}", self.action)
    }
}
