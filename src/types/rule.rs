use std::fmt;
use std::str::FromStr;

use ipnet::IpNet;
use thiserror::Error;

use crate::parse::ParseError;

/// Traffic direction relative to the protected endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Action {
    Allow,
    Deny,
}

/// Protocol selector of a rule. `Number` is any other IP protocol, carried
/// through to the match text as its decimal literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Protocol {
    #[default]
    Any,
    Tcp,
    Udp,
    Icmp,
    Number(u8),
}

/// Inclusive destination port interval, `0 < start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPortRange"))]
pub struct PortRange {
    start: u16,
    end: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid port range {start}-{end}: requires 0 < start <= end")]
pub struct PortRangeError {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    /// Returns `None` unless `0 < start <= end`.
    #[must_use]
    pub fn new(start: u16, end: u16) -> Option<Self> {
        (start > 0 && start <= end).then_some(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> u16 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u16 {
        self.end
    }
}

impl TryFrom<(u16, u16)> for PortRange {
    type Error = PortRangeError;

    fn try_from((start, end): (u16, u16)) -> Result<Self, Self::Error> {
        Self::new(start, end).ok_or(PortRangeError { start, end })
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPortRange {
    start: u16,
    end: u16,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPortRange> for PortRange {
    type Error = PortRangeError;

    fn try_from(raw: RawPortRange) -> Result<Self, Self::Error> {
        Self::try_from((raw.start, raw.end))
    }
}

/// One structured security rule, as produced by the clause parser or built
/// by hand.
///
/// # Example
///
/// ```
/// use secflow::{Action, Direction, Protocol, Rule};
///
/// let rule = Rule::new(Direction::In, Action::Allow)
///     .protocol(Protocol::Tcp)
///     .ports([22, 443])
///     .prefix("10.0.0.0/8".parse().unwrap());
/// assert_eq!(rule.to_string(), "in:allow tcp,ports=22,443 10.0.0.0/8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawRule"))]
pub struct Rule {
    pub direction: Direction,
    pub action: Action,
    pub protocol: Protocol,
    /// Always truncated to its network address; set through
    /// [`Rule::prefix`].
    prefix: Option<IpNet>,
    pub ports: Vec<u16>,
    pub port_range: Option<PortRange>,
}

/// Wire form of [`Rule`]; deserialized rules go through the same prefix
/// normalization as the builder.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawRule {
    direction: Direction,
    action: Action,
    #[serde(default)]
    protocol: Protocol,
    #[serde(default)]
    prefix: Option<IpNet>,
    #[serde(default)]
    ports: Vec<u16>,
    #[serde(default)]
    port_range: Option<PortRange>,
}

#[cfg(feature = "serde")]
impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        Self {
            direction: raw.direction,
            action: raw.action,
            protocol: raw.protocol,
            prefix: raw.prefix.map(|net| net.trunc()),
            ports: raw.ports,
            port_range: raw.port_range,
        }
    }
}

impl Rule {
    /// A rule matching all traffic in `direction`.
    #[must_use]
    pub fn new(direction: Direction, action: Action) -> Self {
        Self {
            direction,
            action,
            protocol: Protocol::Any,
            prefix: None,
            ports: Vec::new(),
            port_range: None,
        }
    }

    #[must_use]
    pub fn allow_all(direction: Direction) -> Self {
        Self::new(direction, Action::Allow)
    }

    #[must_use]
    pub fn deny_all(direction: Direction) -> Self {
        Self::new(direction, Action::Deny)
    }

    #[must_use]
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Restrict the remote address. Host bits are cleared.
    #[must_use]
    pub fn prefix(mut self, prefix: IpNet) -> Self {
        self.prefix = Some(prefix.trunc());
        self
    }

    /// The remote address restriction, if any.
    #[must_use]
    pub fn remote_prefix(&self) -> Option<IpNet> {
        self.prefix
    }

    #[must_use]
    pub fn ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports.extend(ports);
        self
    }

    #[must_use]
    pub fn port_range(mut self, range: PortRange) -> Self {
        self.port_range = Some(range);
        self
    }

    /// True when the rule places no restriction on address, protocol or port.
    #[must_use]
    pub fn is_wild_match(&self) -> bool {
        self.prefix.is_none()
            && self.protocol == Protocol::Any
            && self.ports.is_empty()
            && self.port_range.is_none()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Allow => write!(f, "allow"),
            Action::Deny => write!(f, "deny"),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Any => write!(f, "any"),
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Icmp => write!(f, "icmp"),
            Protocol::Number(n) => write!(f, "{n}"),
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Canonical clause text; parses back to an equal `Rule`.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.direction, self.action, self.protocol)?;
        if !self.ports.is_empty() {
            write!(f, ",ports=")?;
            for (i, port) in self.ports.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{port}")?;
            }
        }
        if let Some(range) = &self.port_range {
            write!(f, ",port_range={range}")?;
        }
        if let Some(prefix) = &self.prefix {
            write!(f, " {prefix}")?;
        }
        Ok(())
    }
}

impl FromStr for Rule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_rule(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rule_is_wild() {
        assert!(Rule::allow_all(Direction::Out).is_wild_match());
        assert!(Rule::deny_all(Direction::In).is_wild_match());
    }

    #[test]
    fn any_restriction_breaks_wildness() {
        let base = Rule::allow_all(Direction::In);
        assert!(!base.clone().protocol(Protocol::Udp).is_wild_match());
        assert!(!base.clone().ports([53]).is_wild_match());
        assert!(!base
            .clone()
            .port_range(PortRange::new(1, 2).unwrap())
            .is_wild_match());
        assert!(!base.prefix("0.0.0.0/0".parse().unwrap()).is_wild_match());
    }

    #[test]
    fn port_range_validation() {
        assert!(PortRange::new(0, 10).is_none());
        assert!(PortRange::new(20, 10).is_none());
        assert!(PortRange::new(10, 10).is_some());
        assert!(PortRange::new(1, 65535).is_some());
    }

    #[test]
    fn port_range_try_from_reports_bounds() {
        assert_eq!(
            PortRange::try_from((20, 10)),
            Err(PortRangeError { start: 20, end: 10 })
        );
        assert_eq!(
            PortRangeError { start: 0, end: 5 }.to_string(),
            "invalid port range 0-5: requires 0 < start <= end"
        );
        assert_eq!(PortRange::try_from((8, 9)), Ok(PortRange::new(8, 9).unwrap()));
    }

    #[test]
    fn prefix_is_truncated() {
        let rule = Rule::allow_all(Direction::In).prefix("192.168.1.77/24".parse().unwrap());
        assert_eq!(rule.prefix.unwrap().to_string(), "192.168.1.0/24");
        assert_eq!(rule.remote_prefix(), Some("192.168.1.0/24".parse().unwrap()));
    }

    #[test]
    fn display_canonical_forms() {
        assert_eq!(Rule::deny_all(Direction::In).to_string(), "in:deny any");
        let rule = Rule::new(Direction::Out, Action::Allow)
            .protocol(Protocol::Udp)
            .ports([53])
            .port_range(PortRange::new(1000, 2000).unwrap())
            .prefix("2001:db8::/32".parse().unwrap());
        assert_eq!(
            rule.to_string(),
            "out:allow udp,ports=53,port_range=1000-2000 2001:db8::/32"
        );
        let rule = Rule::new(Direction::In, Action::Deny).protocol(Protocol::Number(47));
        assert_eq!(rule.to_string(), "in:deny 47");
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn rule_round_trips_through_json() {
            let rule = Rule::new(Direction::Out, Action::Deny)
                .protocol(Protocol::Tcp)
                .ports([22])
                .port_range(PortRange::new(1000, 1003).unwrap())
                .prefix("10.0.0.0/8".parse().unwrap());
            let json = serde_json::to_string(&rule).unwrap();
            let back: Rule = serde_json::from_str(&json).unwrap();
            assert_eq!(back, rule);
        }

        #[test]
        fn reversed_port_range_is_rejected() {
            let json = r#"{"direction":"in","action":"allow","protocol":"tcp",
                "port_range":{"start":20,"end":10}}"#;
            let err = serde_json::from_str::<Rule>(json).unwrap_err();
            assert!(err.to_string().contains("invalid port range 20-10"));
        }

        #[test]
        fn zero_port_range_start_is_rejected() {
            let result = serde_json::from_str::<PortRange>(r#"{"start":0,"end":10}"#);
            assert!(result.is_err());
        }

        #[test]
        fn deserialized_prefix_is_truncated() {
            let json = r#"{"direction":"in","action":"allow","prefix":"10.0.0.9/8"}"#;
            let rule: Rule = serde_json::from_str(json).unwrap();
            assert_eq!(rule.remote_prefix(), Some("10.0.0.0/8".parse().unwrap()));
            assert_eq!(rule.protocol, Protocol::Any);
            assert_eq!(rule.to_string(), "in:allow any 10.0.0.0/8");
        }
    }
}
