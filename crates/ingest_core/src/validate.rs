/// Decides whether a normalized, non-blank line is an acceptable entry.
///
/// Implementations must be pure. Blank lines are filtered before the
/// validator is consulted.
pub trait LineValidator: Send + Sync {
    fn is_valid(&self, normalized: &str) -> bool;
}

impl<F> LineValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, normalized: &str) -> bool {
        self(normalized)
    }
}

/// Default policy: any non-empty string is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptNonEmpty;

impl LineValidator for AcceptNonEmpty {
    fn is_valid(&self, normalized: &str) -> bool {
        !normalized.is_empty()
    }
}

/// Fixed-length, prefixed hex identifiers such as `0x` + 40 hex digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexAddressValidator {
    pub prefix: String,
    pub hex_digits: usize,
}

impl Default for HexAddressValidator {
    fn default() -> Self {
        Self {
            prefix: "0x".to_string(),
            hex_digits: 40,
        }
    }
}

impl LineValidator for HexAddressValidator {
    fn is_valid(&self, normalized: &str) -> bool {
        match normalized.strip_prefix(self.prefix.as_str()) {
            Some(rest) => {
                rest.len() == self.hex_digits && rest.bytes().all(|b| b.is_ascii_hexdigit())
            }
            None => false,
        }
    }
}
