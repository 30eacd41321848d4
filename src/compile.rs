use ipnet::IpNet;

use crate::port_range::{decompose, PortBlock};
use crate::{Direction, MatchExpr, MatchSet, Protocol, Rule};

const TP_DST: &str = "tp_dst=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    V4,
    V6,
}

/// Address field names for one direction. Inbound rules constrain the
/// packet's source, outbound rules its destination.
struct AddressFields {
    v4: &'static str,
    v6: &'static str,
}

impl AddressFields {
    fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::In => Self {
                v4: "nw_src=",
                v6: "ipv6_src=",
            },
            Direction::Out => Self {
                v4: "nw_dst=",
                v6: "ipv6_dst=",
            },
        }
    }
}

/// Compile one rule into classifier match clauses.
///
/// The base conjunction is `[address predicates] [protocol]`. Anything the
/// rule expresses as a disjunction (per-port alternatives, or a protocol that
/// must be pinned to each address family in turn) becomes one clause per
/// alternative, each the base conjunction plus that alternative.
pub(crate) fn compile(rule: &Rule) -> MatchSet {
    let fields = AddressFields::for_direction(rule.direction);
    let mut base = MatchExpr::new();
    let mut family = None;

    if let Some(prefix) = rule.remote_prefix() {
        family = Some(push_address(&mut base, &fields, &prefix));
    }

    let mut alternatives: Vec<String> = Vec::new();

    match rule.protocol {
        Protocol::Any => {
            if family.is_none() {
                alternatives.extend(["ipv6".to_owned(), "ip".to_owned()]);
            }
        }
        Protocol::Tcp | Protocol::Udp => {
            alternatives.extend(rule.ports.iter().map(|port| format!("{TP_DST}{port}")));
            if let Some(range) = &rule.port_range {
                push_port_blocks(&mut alternatives, decompose(range.start(), range.end()));
            }
            base.push(rule.protocol.to_string());
        }
        Protocol::Icmp => match family {
            Some(Family::V4) => base.push("icmp"),
            Some(Family::V6) => base.push("icmp6"),
            None => alternatives.extend(["icmp".to_owned(), "icmp6".to_owned()]),
        },
        Protocol::Number(_) => base.push(rule.protocol.to_string()),
    }

    tracing::trace!(
        rule = %rule,
        alternatives = alternatives.len(),
        "compiled rule match set"
    );

    if alternatives.is_empty() {
        MatchSet::Single(base)
    } else {
        MatchSet::AnyOf(alternatives.into_iter().map(|alt| base.and(alt)).collect())
    }
}

/// Append one `tp_dst` alternative per block. An unrestricted block covers
/// every port, so nothing after it narrows the match.
fn push_port_blocks(
    alternatives: &mut Vec<String>,
    blocks: impl IntoIterator<Item = PortBlock>,
) {
    for block in blocks {
        if block.is_unrestricted() {
            break;
        }
        alternatives.push(format!("{TP_DST}{block}"));
    }
}

/// Push the family and address predicates for `prefix`, returning the
/// family it pins. A full-length prefix is written as a bare host address.
fn push_address(expr: &mut MatchExpr, fields: &AddressFields, prefix: &IpNet) -> Family {
    let (family, proto, field) = match prefix {
        IpNet::V4(_) => (Family::V4, "ip", fields.v4),
        IpNet::V6(_) => (Family::V6, "ipv6", fields.v6),
    };
    expr.push(proto);
    if prefix.prefix_len() == prefix.max_prefix_len() {
        expr.push(format!("{field}{}", prefix.addr()));
    } else {
        expr.push(format!("{field}{prefix}"));
    }
    family
}
