//! Address obfuscation for the track history
//!
//! Each octet is inverted (`255 - octet`), the four results are read as a
//! big-endian base-256 number and the number is divided by 1000. The
//! transform is deterministic so histories from different runs stay
//! comparable.
//!
//! This is casual anonymization for log files. It is trivially reversible
//! and must not be relied on to hide addresses.

use std::fmt;
use std::net::Ipv4Addr;

/// Obfuscated form of an IPv4 address
///
/// Holds the inverted base-256 value; the divided-by-1000 form is what gets
/// displayed. Displaying through integer arithmetic keeps the output exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObfuscatedAddr(u32);

impl ObfuscatedAddr {
    /// Inverted value before division
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Value divided by 1000
    pub fn value(self) -> f64 {
        f64::from(self.0) / 1000.0
    }
}

impl fmt::Display for ObfuscatedAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

/// Obfuscate an IPv4 address
pub fn obfuscate(addr: Ipv4Addr) -> ObfuscatedAddr {
    let [a, b, c, d] = addr.octets();
    ObfuscatedAddr(u32::from_be_bytes([255 - a, 255 - b, 255 - c, 255 - d]))
}
