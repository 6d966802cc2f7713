use crate::socks4::types::SocksCmd;
use log;
use std::net::Ipv4Addr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternOctet {
    Any,
    Literal(u8),
}

/// One allow rule: a command scope and a wildcardable IPv4 pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    scope: SocksCmd,
    pattern: [PatternOctet; 4],
}

impl FirewallRule {
    /// Parses a rule line of the form `<c|b> <o.o.o.o>` where each `o` is a
    /// literal octet or `*`. Returns [`None`] for anything else; unparsable
    /// lines are skipped by the caller, not fatal.
    fn parse(line: &str) -> Option<FirewallRule> {
        let mut tokens = line.split_whitespace();
        let scope = match tokens.next()? {
            "c" => SocksCmd::CONNECT,
            "b" => SocksCmd::BIND,
            _ => return None,
        };
        let mut octets = tokens.next()?.split('.');
        let mut pattern = [PatternOctet::Any; 4];
        for slot in pattern.iter_mut() {
            *slot = match octets.next()? {
                "*" => PatternOctet::Any,
                literal => PatternOctet::Literal(literal.parse().ok()?),
            };
        }
        if octets.next().is_some() {
            return None;
        }
        Some(FirewallRule { scope, pattern })
    }

    /// Compares octets left to right. A literal must equal the candidate's
    /// octet; the first `*` ends the comparison as a match for the whole rule.
    fn matches(&self, command: SocksCmd, address: Ipv4Addr) -> bool {
        if self.scope != command {
            return false;
        }
        for (slot, octet) in self.pattern.iter().zip(address.octets()) {
            match slot {
                PatternOctet::Any => return true,
                PatternOctet::Literal(literal) if *literal != octet => return false,
                PatternOctet::Literal(_) => {}
            }
        }
        true
    }
}

/// Rule source evaluated per decision. The file is re-read on every call so a
/// rule appended while the proxy runs takes effect immediately; no state is
/// cached between decisions.
pub struct Firewall {
    rules_file: Option<PathBuf>,
}

impl Firewall {
    pub fn new(rules_file: Option<PathBuf>) -> Self {
        Firewall { rules_file }
    }

    /// First matching rule wins; no rule source or no match denies.
    pub fn evaluate(&self, command: SocksCmd, address: Ipv4Addr) -> bool {
        let Some(path) = &self.rules_file else {
            return false;
        };
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!(
                    "Could not read firewall rules from \"{}\": {}",
                    path.display(),
                    e
                );
                return false;
            }
        };
        source
            .lines()
            .filter_map(FirewallRule::parse)
            .any(|rule| rule.matches(command, address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(line: &str) -> FirewallRule {
        FirewallRule::parse(line).unwrap()
    }

    fn rules_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "gate-proxy-firewall-{}-{}.conf",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn literal_octets_must_all_match() {
        let rule = rule("c 10.0.5.9");
        assert!(rule.matches(SocksCmd::CONNECT, Ipv4Addr::new(10, 0, 5, 9)));
        assert!(!rule.matches(SocksCmd::CONNECT, Ipv4Addr::new(10, 0, 5, 10)));
    }

    #[test]
    fn wildcard_stops_comparison_for_remaining_octets() {
        let rule = rule("c 10.0.*.1");
        // the trailing literal is never reached once `*` matches
        assert!(rule.matches(SocksCmd::CONNECT, Ipv4Addr::new(10, 0, 5, 9)));
        assert!(!rule.matches(SocksCmd::CONNECT, Ipv4Addr::new(10, 1, 5, 9)));
    }

    #[test]
    fn scope_must_match_command() {
        let rule = rule("b *.*.*.*");
        assert!(rule.matches(SocksCmd::BIND, Ipv4Addr::new(172, 16, 0, 1)));
        assert!(!rule.matches(SocksCmd::CONNECT, Ipv4Addr::new(172, 16, 0, 1)));
    }

    #[test]
    fn unparsable_lines_are_skipped() {
        assert_eq!(FirewallRule::parse(""), None);
        assert_eq!(FirewallRule::parse("# comment"), None);
        assert_eq!(FirewallRule::parse("x 10.0.0.1"), None);
        assert_eq!(FirewallRule::parse("c 10.0.0"), None);
        assert_eq!(FirewallRule::parse("c 10.0.0.0.0"), None);
        assert_eq!(FirewallRule::parse("c 10.0.0.999"), None);
    }

    #[test]
    fn evaluate_scans_rules_in_file_order() {
        let path = rules_file(
            "ordered",
            "not a rule\n\
             c 10.0.*.*\n\
             b *.*.*.*\n",
        );
        let firewall = Firewall::new(Some(path));
        assert!(firewall.evaluate(SocksCmd::CONNECT, Ipv4Addr::new(10, 0, 5, 9)));
        assert!(!firewall.evaluate(SocksCmd::CONNECT, Ipv4Addr::new(10, 1, 5, 9)));
        assert!(firewall.evaluate(SocksCmd::BIND, Ipv4Addr::new(10, 1, 5, 9)));
    }

    #[test]
    fn no_rule_source_denies_everything() {
        let firewall = Firewall::new(None);
        assert!(!firewall.evaluate(SocksCmd::CONNECT, Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[test]
    fn missing_rule_file_denies_everything() {
        let firewall = Firewall::new(Some(PathBuf::from("/nonexistent/socks.conf")));
        assert!(!firewall.evaluate(SocksCmd::BIND, Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[test]
    fn empty_rule_file_denies_everything() {
        let firewall = Firewall::new(Some(rules_file("empty", "")));
        assert!(!firewall.evaluate(SocksCmd::CONNECT, Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[test]
    fn rules_appended_after_startup_take_effect() {
        let path = rules_file("appended", "");
        let firewall = Firewall::new(Some(path.clone()));
        assert!(!firewall.evaluate(SocksCmd::CONNECT, Ipv4Addr::new(10, 0, 5, 9)));
        std::fs::write(&path, "c 10.0.*.*\n").unwrap();
        assert!(firewall.evaluate(SocksCmd::CONNECT, Ipv4Addr::new(10, 0, 5, 9)));
    }
}
