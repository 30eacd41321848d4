use std::net::IpAddr;

use ipnet::IpNet;
use winnow::ascii::{dec_uint, space0, space1};
use winnow::combinator::{alt, cut_err, eof, opt, peek, preceded, separated, separated_pair};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::{Action, Direction, PortRange, Protocol, Rule};

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

// -- Direction & action -----------------------------------------------------

fn direction(input: &mut &str) -> ModalResult<Direction> {
    alt(("in".value(Direction::In), "out".value(Direction::Out))).parse_next(input)
}

fn action(input: &mut &str) -> ModalResult<Action> {
    alt(("allow".value(Action::Allow), "deny".value(Action::Deny))).parse_next(input)
}

// -- Protocol & ports -------------------------------------------------------

/// A keyword or number must end at whitespace, a port spec, or the clause end.
fn boundary(input: &mut &str) -> ModalResult<()> {
    peek(alt((space1.void(), ",".void(), eof.void()))).parse_next(input)
}

fn protocol(input: &mut &str) -> ModalResult<Protocol> {
    let proto = alt((
        "any".value(Protocol::Any),
        "tcp".value(Protocol::Tcp),
        "udp".value(Protocol::Udp),
        "icmp".value(Protocol::Icmp),
        dec_uint::<_, u8, _>.map(Protocol::Number),
    ))
    .parse_next(input)?;
    boundary.parse_next(input)?;
    Ok(proto)
}

fn port_list(input: &mut &str) -> ModalResult<Vec<u16>> {
    separated(1.., dec_uint::<_, u16, _>, ',')
        .context(expected("port list"))
        .parse_next(input)
}

fn port_range(input: &mut &str) -> ModalResult<PortRange> {
    separated_pair(dec_uint::<_, u16, _>, '-', dec_uint::<_, u16, _>)
        .verify_map(|(start, end)| PortRange::new(start, end))
        .context(expected("port range start-end with 0 < start <= end"))
        .parse_next(input)
}

type ProtocolSpec = (Protocol, Option<Vec<u16>>, Option<PortRange>);

fn protocol_spec(input: &mut &str) -> ModalResult<ProtocolSpec> {
    let proto = protocol.parse_next(input)?;
    let ports = opt(preceded(",ports=", cut_err(port_list))).parse_next(input)?;
    let range = opt(preceded(",port_range=", cut_err(port_range))).parse_next(input)?;
    Ok((proto, ports, range))
}

// -- Address prefix ---------------------------------------------------------

/// A CIDR prefix, or a bare address taken as a single host.
fn parse_prefix(text: &str) -> Option<IpNet> {
    if text.contains('/') {
        return text.parse::<IpNet>().ok().map(|net| net.trunc());
    }
    let addr: IpAddr = text.parse().ok()?;
    let host_len = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    IpNet::new(addr, host_len).ok()
}

fn prefix(input: &mut &str) -> ModalResult<IpNet> {
    take_while(1.., |c: char| {
        c.is_ascii_hexdigit() || matches!(c, '.' | ':' | '/')
    })
    .verify_map(parse_prefix)
    .context(expected("address prefix"))
    .parse_next(input)
}

// -- Clause -----------------------------------------------------------------

/// `<direction>:<action> [protocol[,ports=..][,port_range=..]] [prefix]`
pub fn clause(input: &mut &str) -> ModalResult<Rule> {
    space0.parse_next(input)?;
    let direction = direction
        .context(expected("direction 'in' or 'out'"))
        .parse_next(input)?;
    cut_err(':').parse_next(input)?;
    let action = cut_err(action)
        .context(expected("action 'allow' or 'deny'"))
        .parse_next(input)?;

    let mut rule = Rule::new(direction, action);

    if let Some((proto, ports, range)) = opt(preceded(space1, protocol_spec)).parse_next(input)? {
        rule.protocol = proto;
        rule.ports = ports.unwrap_or_default();
        rule.port_range = range;
    }
    if let Some(net) = opt(preceded(space1, prefix)).parse_next(input)? {
        rule = rule.prefix(net);
    }

    space0.parse_next(input)?;
    Ok(rule)
}
