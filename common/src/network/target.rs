//! # Scan Target Model
//!
//! Defines the possible inputs for a scan or deployment.
//!
//! This module handles parsing and representing targets, which can be:
//! * A single IP address (e.g., `10.0.0.5`, `::1`).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A DNS hostname (e.g., `build-01.corp.example`).
//!
//! Parsing works on a batch: one bad entry never fails the others. Callers get
//! the parsed specs *and* the per-entry errors and decide what is fatal.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use pnet::ipnetwork::IpNetwork;
use serde::Serialize;
use thiserror::Error;

use crate::network::range;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Smallest IPv6 prefix accepted for a CIDR target (at most 65,536 addresses).
pub const MIN_IPV6_PREFIX: u8 = 112;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("no targets provided")]
    NoTargets,
    #[error("empty target value")]
    Empty,
    #[error("invalid target: {0}")]
    Invalid(String),
    #[error("cidr block too large: {0}")]
    TooLarge(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Hostname,
    Ip,
    Cidr,
}

/// The parsed value of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Hostname(String),
    Host(IpAddr),
    /// Always stored with host bits cleared.
    Network(IpNetwork),
}

/// A classified user input, remembering the string it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    original: String,
    target: Target,
}

impl TargetSpec {
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn kind(&self) -> TargetKind {
        match self.target {
            Target::Hostname(_) => TargetKind::Hostname,
            Target::Host(_) => TargetKind::Ip,
            Target::Network(_) => TargetKind::Cidr,
        }
    }

    /// Number of concrete hosts this spec expands to.
    pub fn host_count(&self) -> u128 {
        match &self.target {
            Target::Network(net) => range::network_size(net),
            _ => 1,
        }
    }

    /// Expands the spec into concrete host strings.
    ///
    /// Networks yield every address they contain, network and broadcast
    /// included, in ascending order.
    pub fn hosts(&self) -> Box<dyn Iterator<Item = String> + Send + '_> {
        match &self.target {
            Target::Hostname(name) => Box::new(std::iter::once(name.clone())),
            Target::Host(addr) => Box::new(std::iter::once(addr.to_string())),
            Target::Network(net) => Box::new(range::expand(net).map(|ip| ip.to_string())),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    /// Parses a single string into a `TargetSpec`.
    ///
    /// Tried in order: IP literal, CIDR block, DNS hostname.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }

        let target = if let Some(target) = parse_host(trimmed) {
            target
        } else if let Some(target) = parse_cidr(trimmed)? {
            target
        } else if is_hostname(trimmed) {
            Target::Hostname(trimmed.to_string())
        } else {
            return Err(TargetError::Invalid(trimmed.to_string()));
        };

        Ok(Self {
            original: trimmed.to_string(),
            target,
        })
    }
}

/// Parses a batch of raw inputs.
///
/// Returns every spec that parsed along with one error per rejected entry.
/// An empty batch is always an error.
pub fn parse_inputs<S: AsRef<str>>(values: &[S]) -> (Vec<TargetSpec>, Vec<TargetError>) {
    if values.is_empty() {
        return (Vec::new(), vec![TargetError::NoTargets]);
    }

    let mut specs = Vec::new();
    let mut errors = Vec::new();

    for value in values {
        match value.as_ref().parse::<TargetSpec>() {
            Ok(spec) => specs.push(spec),
            Err(e) => errors.push(e),
        }
    }

    (specs, errors)
}

fn parse_host(s: &str) -> Option<Target> {
    s.parse::<IpAddr>().ok().map(Target::Host)
}

/// Parses CIDR notation like "192.168.1.0/24".
///
/// Returns `Ok(None)` when the input does not look like CIDR at all, so the
/// caller can fall through to hostname validation.
fn parse_cidr(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let Ok(ip) = ip_str.parse::<IpAddr>() else {
        return Ok(None);
    };
    let Ok(prefix) = prefix_str.parse::<u8>() else {
        return Ok(None);
    };
    let Ok(net) = IpNetwork::new(ip, prefix) else {
        return Ok(None);
    };

    if net.is_ipv6() && prefix < MIN_IPV6_PREFIX {
        return Err(TargetError::TooLarge(s.to_string()));
    }

    let network = IpNetwork::new(net.network(), prefix)
        .map_err(|_| TargetError::Invalid(s.to_string()))?;

    Ok(Some(Target::Network(network)))
}

fn is_hostname(value: &str) -> bool {
    if value.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    value.split('.').all(is_label)
}

fn is_label(label: &str) -> bool {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_from_str_full_parsing() {
        assert_eq!(
            "10.0.0.5".parse::<TargetSpec>().unwrap().kind(),
            TargetKind::Ip
        );
        assert_eq!("::1".parse::<TargetSpec>().unwrap().kind(), TargetKind::Ip);
        assert_eq!(
            "10.0.0.0/24".parse::<TargetSpec>().unwrap().kind(),
            TargetKind::Cidr
        );
        assert_eq!(
            "build-01.corp.example".parse::<TargetSpec>().unwrap().kind(),
            TargetKind::Hostname
        );

        assert_eq!("   ".parse::<TargetSpec>(), Err(TargetError::Empty));
        assert_eq!(
            "not a valid hostname!!".parse::<TargetSpec>(),
            Err(TargetError::Invalid("not a valid hostname!!".into()))
        );
        assert!("10.0.0.1/33".parse::<TargetSpec>().is_err());
        assert!("-leading.example".parse::<TargetSpec>().is_err());
        assert!("trailing-.example".parse::<TargetSpec>().is_err());
        assert!("double..dot".parse::<TargetSpec>().is_err());
    }

    #[test]
    fn input_is_trimmed_and_original_kept() {
        let spec: TargetSpec = "  10.0.0.5\t".parse().unwrap();
        assert_eq!(spec.original(), "10.0.0.5");
        assert_eq!(
            spec.target(),
            &Target::Host(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
        );
    }

    #[test]
    fn cidr_drops_host_bits() {
        let spec: TargetSpec = "192.168.1.77/24".parse().unwrap();
        let Target::Network(net) = spec.target() else {
            panic!("expected a network");
        };
        assert_eq!(net.network(), IpAddr::V4(Ipv4Addr::new(192, 168, 1, 0)));
        assert_eq!(net.prefix(), 24);
        assert_eq!(spec.original(), "192.168.1.77/24");
    }

    #[test]
    fn hostname_length_limits() {
        let label_63 = "a".repeat(63);
        let label_64 = "a".repeat(64);
        assert!(is_hostname(&label_63));
        assert!(!is_hostname(&label_64));

        let long_name = vec!["abcdefghi"; 26].join(".");
        assert!(long_name.len() > MAX_HOSTNAME_LEN);
        assert!(!is_hostname(&long_name));
    }

    #[test]
    fn batch_keeps_good_entries_and_reports_bad_ones() {
        let (specs, errors) = parse_inputs(&["10.0.0.5", "not a valid hostname!!", "10.0.0.0/30"]);

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].kind(), TargetKind::Ip);
        assert_eq!(specs[1].kind(), TargetKind::Cidr);
        assert_eq!(specs[1].hosts().count(), 4);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("not a valid hostname!!"));
    }

    #[test]
    fn empty_batch_is_an_error() {
        let empty: [&str; 0] = [];
        let (specs, errors) = parse_inputs(&empty);
        assert!(specs.is_empty());
        assert_eq!(errors, vec![TargetError::NoTargets]);
    }

    #[test]
    fn wide_ipv6_blocks_are_rejected() {
        assert_eq!(
            "fd00::/64".parse::<TargetSpec>(),
            Err(TargetError::TooLarge("fd00::/64".into()))
        );
        let spec: TargetSpec = "fd00::/126".parse().unwrap();
        assert_eq!(spec.host_count(), 4);
    }

    #[test]
    fn ipv6_prefix_limit_is_inclusive() {
        assert_eq!(
            "fd00::/111".parse::<TargetSpec>(),
            Err(TargetError::TooLarge("fd00::/111".into()))
        );
        let spec: TargetSpec = format!("fd00::/{MIN_IPV6_PREFIX}").parse().unwrap();
        assert_eq!(spec.host_count(), 65_536);
    }
}
