use std::net::{IpAddr, Ipv6Addr};

use colored::*;
use deployr_common::os::TargetOs;
use deployr_core::discovery::DiscoveredTarget;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    let first_byte = ipv6_addr.octets()[0];
    if (0x20..=0x3F).contains(&first_byte) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

pub fn ip_to_detail(ip: &IpAddr) -> Detail {
    match ip {
        IpAddr::V4(ipv4_addr) => (
            String::from("IPv4"),
            ipv4_addr.to_string().color(colors::IPV4_ADDR),
        ),
        IpAddr::V6(ipv6_addr) => (
            String::from(ipv6_to_type_str(ipv6_addr)),
            ipv6_addr.to_string().color(colors::IPV6_ADDR),
        ),
    }
}

pub fn os_to_colored(os: TargetOs) -> ColoredString {
    match os {
        TargetOs::Unknown => os.as_str().dimmed(),
        _ => os.as_str().color(colors::PRIMARY).bold(),
    }
}

pub fn ports_to_colored(ports: &[u16]) -> ColoredString {
    if ports.is_empty() {
        return "none".dimmed();
    }
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
        .color(colors::PORT)
}

pub fn score_to_colored(score: u8) -> ColoredString {
    let color = match score {
        80.. => colors::SCORE_HIGH,
        40..80 => colors::SCORE_MEDIUM,
        _ => colors::SCORE_LOW,
    };
    format!("{score}%").color(color).bold()
}

pub fn target_details(target: &DiscoveredTarget) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(ip) = &target.ip {
        details.push(ip_to_detail(ip));
    }
    if target.scan.source != target.scan.host {
        details.push((
            "Source".to_string(),
            target.scan.source.as_str().color(colors::TEXT_DEFAULT),
        ));
    }

    details.push(("OS".to_string(), os_to_colored(target.os)));
    details.push(("Ports".to_string(), ports_to_colored(&target.scan.open_ports)));

    if let Some(error) = &target.scan.error {
        details.push(("Error".to_string(), error.as_str().red()));
    }

    details.push((
        "Score".to_string(),
        score_to_colored(target.assessment.predicted_success),
    ));
    details.push((
        "Channel".to_string(),
        target.assessment.secure_method.normal(),
    ));

    details
}
