use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// A token lifetime in whole seconds
///
/// Signed, because lifetimes are forwarded to the authority without bounds
/// checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Ttl(pub i64);

impl Ttl {
    /// Constructs a lifetime of `secs` seconds
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    /// The lifetime in seconds
    #[inline]
    pub const fn as_secs(self) -> i64 {
        self.0
    }

    /// Whether the lifetime is zero seconds
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Ttl {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Picks the lifetime to request from the authority
///
/// A lifetime supplied by the caller wins over the service default. When
/// neither is present, no lifetime is requested and the authority applies its
/// own default. Values are not bounds-checked here.
#[inline]
pub fn resolve_ttl(requested: Option<Ttl>, service_default: Option<Ttl>) -> Option<Ttl> {
    requested.or(service_default)
}
