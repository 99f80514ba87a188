use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use pnet::ipnetwork::IpNetwork;

/// Number of addresses in `net`, network and broadcast included.
pub fn network_size(net: &IpNetwork) -> u128 {
    match net {
        IpNetwork::V4(v4) => 1u128 << (32 - u32::from(v4.prefix())),
        IpNetwork::V6(v6) => 1u128
            .checked_shl(128 - u32::from(v6.prefix()))
            .unwrap_or(u128::MAX),
    }
}

/// Iterates every address contained in `net` in ascending numeric order.
pub fn expand(net: &IpNetwork) -> Box<dyn Iterator<Item = IpAddr> + Send> {
    match net {
        IpNetwork::V4(v4) => {
            let start: u32 = v4.network().into();
            let end: u32 = v4.broadcast().into();
            Box::new((start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip))))
        }
        IpNetwork::V6(v6) => {
            let start: u128 = v6.network().into();
            let host_bits = 128 - u32::from(v6.prefix());
            let mask = 1u128.checked_shl(host_bits).map_or(u128::MAX, |n| n - 1);
            let end: u128 = start | mask;
            Box::new((start..=end).map(|ip| IpAddr::V6(Ipv6Addr::from(ip))))
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
