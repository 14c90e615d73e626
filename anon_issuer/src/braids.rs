use aliri_braid::braid;
use std::fmt;

/// Formats a secret as `***LABEL***`, or as a truncated prefix when the
/// alternate flag is set. The width, if given, caps the revealed length.
macro_rules! redacted {
    ($ty:ty: $label:literal, $reveal:literal) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if f.alternate() {
                    write!(f, "\"{}\"", Prefix(self.as_str(), f.width().unwrap_or($reveal)))
                } else {
                    f.write_str(concat!("***", $label, "***"))
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if f.alternate() {
                    write!(f, "{}", Prefix(self.as_str(), f.width().unwrap_or(usize::MAX)))
                } else {
                    f.write_str(concat!("***", $label, "***"))
                }
            }
        }
    };
}

struct Prefix<'a>(&'a str, usize);

impl fmt::Display for Prefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Prefix(value, max_chars) = *self;
        if max_chars <= 1 {
            return f.write_str("…");
        }

        let mut boundaries = value.char_indices().map(|(idx, _)| idx);
        match (boundaries.nth(max_chars - 1), boundaries.next()) {
            (Some(cut), Some(_)) => {
                f.write_str(&value[..cut])?;
                f.write_str("…")
            }
            _ => f.write_str(value),
        }
    }
}

/// An access token minted by the authorization authority
#[braid(serde, debug = "owned", display = "owned")]
pub struct AccessToken;

redacted!(AccessTokenRef: "ACCESS TOKEN", 15);

/// A shared secret used to sign requests exchanged between services
#[braid(serde, debug = "owned", display = "owned")]
pub struct SecureKey;

redacted!(SecureKeyRef: "SECURE KEY", 4);

/// The name under which a service registers itself with the routing directory
#[braid(serde)]
pub struct ServiceName;

/// The login presented to the authority when requesting a scoped token
#[braid(serde)]
pub struct Login;
