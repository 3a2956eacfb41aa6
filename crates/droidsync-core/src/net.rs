//! Scan range validation and local subnet derivation

use std::fmt::{self, Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::SyncError;

/// A validated IPv4 CIDR range, e.g. `192.168.1.0/24`
///
/// Discovery callers must construct one of these before invoking the
/// scanner; the scanner itself never re-validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanRange(String);

impl ScanRange {
    /// Validates `range` as `a.b.c.d/prefix` with a prefix of 0..=32.
    pub fn new(range: impl Into<String>) -> Result<Self, SyncError> {
        let range = range.into();
        let valid = match range.split_once('/') {
            Some((addr, prefix)) => {
                addr.parse::<Ipv4Addr>().is_ok()
                    && prefix.parse::<u8>().map_or(false, |p| p <= 32)
            }
            None => false,
        };
        if valid {
            Ok(Self(range))
        } else {
            Err(SyncError::InvalidScanRange(range))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ScanRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScanRange {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Derives the workstation's /24 subnet from its outbound interface.
///
/// Opens a UDP socket towards a broadcast-ish address to learn which local
/// address the OS would route through; no packet is actually sent. Returns
/// `None` on hosts with no usable IPv4 route.
#[must_use]
pub fn local_subnet() -> Option<ScanRange> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(("10.255.255.255", 1)).ok()?;
    let local = match socket.local_addr().ok()?.ip() {
        IpAddr::V4(addr) => addr,
        IpAddr::V6(_) => return None,
    };
    if local.is_loopback() || local.is_unspecified() {
        return None;
    }
    let o = local.octets();
    ScanRange::new(format!("{}.{}.{}.0/24", o[0], o[1], o[2])).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cidr() {
        assert!(ScanRange::new("192.168.1.0/24").is_ok());
        assert!(ScanRange::new("10.0.0.0/8").is_ok());
        assert!(ScanRange::new("172.16.5.1/32").is_ok());
    }

    #[test]
    fn rejects_malformed_ranges() {
        for bad in ["", "192.168.1.0", "192.168.1.0/33", "not-a-range/24", "192.168.1/24"] {
            let err = ScanRange::new(bad).unwrap_err();
            assert!(matches!(err, SyncError::InvalidScanRange(_)), "{bad}");
        }
    }

    #[test]
    fn from_str_round_trip() {
        let range: ScanRange = "192.168.1.0/24".parse().unwrap();
        assert_eq!(range.to_string(), "192.168.1.0/24");
        assert_eq!(range.as_str(), "192.168.1.0/24");
    }

    #[test]
    fn local_subnet_is_valid_when_present() {
        // May be None on hosts without an IPv4 route; when present it must
        // be a /24 ending in .0.
        if let Some(range) = local_subnet() {
            assert!(range.as_str().ends_with(".0/24"), "{range}");
        }
    }
}
