use secflow::{decompose, Direction, PortBlock, RuleSet, SecflowError};

#[test]
fn widest_port_range_splits_into_sixteen_blocks() {
    // port_range requires start > 0, so build the widest accepted range.
    let ruleset = RuleSet::from_policy("in:allow udp,port_range=1-65535").unwrap();
    let exprs = ruleset.inbound()[0].match_expressions();

    assert_eq!(exprs.len(), 16);
    assert_eq!(exprs[0], "udp,tp_dst=1");
    assert_eq!(exprs[15], "udp,tp_dst=0x8000/0x8000");
}

#[test]
fn decompose_whole_space_is_unrestricted() {
    assert_eq!(decompose(0, 65535), vec![PortBlock { base: 0, mask: 0 }]);
}

#[test]
fn decompose_lower_half_renders_zero_base() {
    let blocks = decompose(0, 32767);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].to_string(), "0/0x8000");
}

#[test]
fn outbound_host_prefix() {
    let ruleset = RuleSet::from_policy("out:deny any 8.8.8.8").unwrap();
    assert_eq!(
        ruleset.outbound()[0].match_expressions(),
        vec!["ip,nw_dst=8.8.8.8"]
    );
}

#[test]
fn outbound_tcp_range_uses_tp_dst() {
    let ruleset = RuleSet::from_policy("out:allow tcp,port_range=6-7 ::/0").unwrap();
    assert_eq!(
        ruleset.outbound()[0].match_expressions(),
        vec!["ipv6,ipv6_dst=::/0,tcp,tp_dst=0x6/0xfffe"]
    );
}

#[test]
fn zero_length_prefix_is_not_wild() {
    let ruleset = RuleSet::from_policy("in:allow any 0.0.0.0/0").unwrap();
    assert!(!ruleset.inbound()[0].is_wild_match());
    assert_eq!(ruleset.inbound().len(), 2);
    assert_eq!(
        ruleset.inbound()[0].match_expressions(),
        vec!["ip,nw_src=0.0.0.0/0"]
    );
}

#[test]
fn ports_on_numeric_protocol_are_ignored() {
    let ruleset = RuleSet::from_policy("in:allow 132,ports=9899").unwrap();
    assert_eq!(ruleset.inbound()[0].match_expressions(), vec!["132"]);
}

#[test]
fn duplicate_ports_are_kept() {
    let ruleset = RuleSet::from_policy("in:allow tcp,ports=80,80").unwrap();
    assert_eq!(
        ruleset.inbound()[0].match_expressions(),
        vec!["tcp,tp_dst=80", "tcp,tp_dst=80"]
    );
}

#[test]
fn many_rules_get_distinct_priorities() {
    let policy: Vec<String> = (1..=50).map(|p| format!("in:allow tcp,ports={p}")).collect();
    let ruleset = RuleSet::from_policy(&policy.join(";")).unwrap();
    let entries = ruleset.flow_entries(Direction::In, 10).unwrap();

    assert_eq!(entries.first().map(|e| e.priority), Some(61));
    assert!(entries.windows(2).all(|w| w[0].priority > w[1].priority));
    assert_eq!(entries.last().map(|e| e.priority), Some(11));
}

#[test]
fn base_priority_overflow_is_an_error() {
    let ruleset = RuleSet::from_policy("in:allow tcp; in:allow udp").unwrap();

    let err = ruleset.flow_entries(Direction::In, u16::MAX - 1).unwrap_err();
    assert!(matches!(
        err,
        SecflowError::PriorityOverflow { base: 65534, records: 3 }
    ));

    let entries = ruleset.flow_entries(Direction::In, u16::MAX - 3).unwrap();
    assert_eq!(entries.first().map(|e| e.priority), Some(u16::MAX));
    assert_eq!(entries.last().map(|e| e.priority), Some(u16::MAX - 2));
}

#[test]
fn priorities_stay_distinct_at_the_top_of_the_range() {
    let policy: Vec<String> = (1..=20).map(|p| format!("out:deny udp,ports={p}")).collect();
    let ruleset = RuleSet::from_policy(&policy.join(";")).unwrap();
    let entries = ruleset.flow_entries(Direction::Out, u16::MAX - 21).unwrap();

    let mut priorities: Vec<u16> = entries.iter().map(|e| e.priority).collect();
    priorities.dedup();
    assert_eq!(priorities.len(), 21);
    assert_eq!(priorities[0], u16::MAX);
}
