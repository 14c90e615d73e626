//! Input safety checks for caller-supplied fields

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// The longest value accepted for a caller-supplied field, in bytes
pub const MAX_FIELD_LEN: usize = 4096;

static MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<[a-z!/?]|(?:java|vb)script\s*:|data\s*:\s*text/html|\bon[a-z]+\s*=")
        .expect("markup pattern is a valid regex")
});

/// A caller-supplied field was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The field contains HTML markup, a script URL, or an inline event handler
    #[error("`{field}` contains markup or script content")]
    Markup {
        /// The rejected field
        field: &'static str,
    },
    /// The field contains control characters
    #[error("`{field}` contains control characters")]
    ControlCharacter {
        /// The rejected field
        field: &'static str,
    },
    /// The field is longer than [`MAX_FIELD_LEN`]
    #[error("`{field}` is longer than {max} bytes")]
    TooLong {
        /// The rejected field
        field: &'static str,
        /// The limit that was exceeded
        max: usize,
    },
}

/// Checks the `code` field of an issuance request
pub fn check_code(code: &str) -> Result<(), ValidationError> {
    check_field("code", code)
}

fn check_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.len() > MAX_FIELD_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_FIELD_LEN,
        });
    }

    if value.chars().any(|c| c.is_control() && c != '\t') {
        return Err(ValidationError::ControlCharacter { field });
    }

    if MARKUP.is_match(value) {
        return Err(ValidationError::Markup { field });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_pass() {
        for code in ["", "abc123", "a < b", "x=1&y=2", "mañana\tok", "money=5"] {
            assert_eq!(check_code(code), Ok(()), "{code:?}");
        }
    }

    #[test]
    fn markup_is_rejected() {
        for code in [
            "<script>alert(1)</script>",
            "<IMG SRC=x>",
            "</div>",
            "<!-- hi -->",
            "javascript:alert(1)",
            "JaVaScRiPt :alert(1)",
            "vbscript:msgbox",
            "data:text/html;base64,PHNjcmlwdD4=",
            "x\" onerror=alert(1)",
            "\" ONLOAD = go()",
        ] {
            assert_eq!(
                check_code(code),
                Err(ValidationError::Markup { field: "code" }),
                "{code:?}"
            );
        }
    }

    #[test]
    fn control_characters_are_rejected() {
        assert_eq!(
            check_code("abc\u{0}def"),
            Err(ValidationError::ControlCharacter { field: "code" })
        );
        assert_eq!(
            check_code("line\nbreak"),
            Err(ValidationError::ControlCharacter { field: "code" })
        );
    }

    #[test]
    fn oversized_values_are_rejected() {
        let code = "a".repeat(MAX_FIELD_LEN + 1);

        assert_eq!(
            check_code(&code),
            Err(ValidationError::TooLong {
                field: "code",
                max: MAX_FIELD_LEN
            })
        );
        assert_eq!(check_code(&code[1..]), Ok(()));
    }
}
