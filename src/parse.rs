//! Textual address parsing: `"addr"` or `"addr/len"` into a [`Prefix`].
//!
//! Mirrors the classic `prefix_pton` contract: accept numeric-only
//! addresses (no hostname resolution), default the length to the family
//! maximum when `/len` is absent, reject an over-length mask, and
//! reject anything malformed.
use std::net::IpAddr;
use std::str::FromStr;

use crate::af::Family;
use crate::error::ParseError;
use crate::prefix::Prefix;

/// Parses `"addr"` or `"addr/len"` into a [`Prefix`].
///
/// `IpAddr::from_str` never performs hostname resolution (it only
/// accepts numeric dotted-quad / colon-hex forms), the same guarantee
/// `getaddrinfo(..., AI_NUMERICHOST, ...)` gives `prefix_pton`.
pub fn parse_prefix(s: &str) -> Result<Prefix, ParseError> {
    let (addr_part, len_part) = match s.split_once('/') {
        Some((a, l)) => (a, Some(l)),
        None => (s, None),
    };

    let addr: IpAddr = addr_part
        .parse()
        .map_err(|_| ParseError::Malformed(s.to_owned()))?;
    let family = Family::from(addr);

    let bitlen = match len_part {
        None => family.bits(),
        Some(l) => {
            let parsed: u32 =
                l.parse().map_err(|_| ParseError::Malformed(s.to_owned()))?;
            if parsed > family.bits() as u32 {
                return Err(ParseError::BitlenOutOfRange {
                    family_max: family.bits(),
                    bitlen: parsed,
                });
            }
            parsed as u8
        }
    };

    Prefix::from_ip(addr, bitlen).map_err(|_| {
        // Prefix::from_ip only fails on an out-of-range bitlen, which
        // we've already checked above against the same family maximum.
        ParseError::BitlenOutOfRange {
            family_max: family.bits(),
            bitlen: bitlen as u32,
        }
    })
}
