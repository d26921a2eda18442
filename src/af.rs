//------------ Family (enum) -------------------------------------------------
//
// A single-bit Patricia tree stores every address in a fixed 16-byte
// buffer regardless of family (see `crate::prefix::Prefix`), so a plain
// tag is all that's needed here to know how many of those bytes -- and
// how many bits of the last one -- are significant.
use std::fmt;

/// The address family of a stored prefix.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// The number of significant bits in an address of this family.
    pub const fn bits(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// The number of significant bytes in an address of this family.
    pub const fn bytes(self) -> usize {
        (self.bits() as usize) / 8
    }

    /// Render the first `self.bytes()` bytes of `addr` the way the
    /// family's textual form normally looks (`a.b.c.d`, `a:b:c::d`).
    pub fn fmt_addr(self, addr: &[u8; 16]) -> String {
        match self {
            Family::V4 => {
                std::net::Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3])
                    .to_string()
            }
            Family::V6 => std::net::Ipv6Addr::from(*addr).to_string(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

impl From<std::net::IpAddr> for Family {
    fn from(addr: std::net::IpAddr) -> Self {
        match addr {
            std::net::IpAddr::V4(_) => Family::V4,
            std::net::IpAddr::V6(_) => Family::V6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_and_bytes_match_family() {
        assert_eq!(Family::V4.bits(), 32);
        assert_eq!(Family::V4.bytes(), 4);
        assert_eq!(Family::V6.bits(), 128);
        assert_eq!(Family::V6.bytes(), 16);
    }

    #[test]
    fn fmt_addr_v4() {
        let mut buf = [0u8; 16];
        buf[..4].copy_from_slice(&[192, 0, 2, 1]);
        assert_eq!(Family::V4.fmt_addr(&buf), "192.0.2.1");
    }
}
