use secflow::{Direction, RuleSet};

const DEFAULT_POLICY: &str = "in:allow tcp,ports=22 10.0.0.0/8; \
    in:allow tcp,port_range=8000-8010; \
    in:allow icmp; \
    out:deny udp,ports=53";

fn main() {
    let policy = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_POLICY.to_owned());

    let ruleset = match RuleSet::from_policy(&policy) {
        Ok(ruleset) => ruleset,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    println!("{ruleset}");
    println!("in:  {}", ruleset.in_rules_string());
    println!("out: {}", ruleset.out_rules_string());

    for direction in [Direction::In, Direction::Out] {
        println!("\n# {direction}");
        match ruleset.flow_entries(direction, 1000) {
            Ok(entries) => entries.iter().for_each(|entry| println!("{entry}")),
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        }
    }
}
