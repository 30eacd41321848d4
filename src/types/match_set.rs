use std::fmt;

/// An ordered conjunction of classifier predicates (`field=value` or
/// `field=value/mask`). An empty expression matches every packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MatchExpr {
    tokens: Vec<String>,
}

impl MatchExpr {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// A copy of this conjunction with one more predicate appended.
    #[must_use]
    pub(crate) fn and(&self, token: impl Into<String>) -> Self {
        let mut expr = self.clone();
        expr.push(token);
        expr
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for MatchExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(","))
    }
}

/// The compiled form of one rule.
///
/// The classifier only understands conjunctions, so a rule whose meaning is
/// a disjunction compiles to [`MatchSet::AnyOf`]: a packet matches the rule
/// if it matches *any* of the clauses. Every clause is installed as its own
/// flow entry sharing the rule's action and priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSet {
    Single(MatchExpr),
    AnyOf(Vec<MatchExpr>),
}

impl MatchSet {
    /// The clauses to install, in order.
    #[must_use]
    pub fn clauses(&self) -> &[MatchExpr] {
        match self {
            MatchSet::Single(expr) => std::slice::from_ref(expr),
            MatchSet::AnyOf(exprs) => exprs,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses().is_empty()
    }

    #[must_use]
    pub fn is_disjunction(&self) -> bool {
        matches!(self, MatchSet::AnyOf(_))
    }

    /// Rendered match strings, one per flow entry.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.clauses().iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for MatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses().iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "[{clause}]")?;
        }
        Ok(())
    }
}
