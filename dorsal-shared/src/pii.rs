use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A wrapper for registrant personal data (national id, email, phone) that
/// hides the value in Debug output so it cannot leak through log macros.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Confirmation emails and admin exports need the real value; the
        // masking only targets Debug-formatted log lines.
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Masked(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

/// Keeps only the trailing characters of an identifier for log correlation,
/// e.g. a federation license number logged as "****4821".
pub fn redact_tail(value: &str, keep: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= keep {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - keep), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_debug_output() {
        let dni = Masked("12345678Z".to_string());
        assert_eq!(format!("{:?}", dni), "********");
        assert_eq!(format!("{}", dni), "********");
        assert_eq!(dni.expose(), "12345678Z");
    }

    #[test]
    fn test_masked_serializes_real_value() {
        let email = Masked("runner@example.com".to_string());
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"runner@example.com\"");
    }

    #[test]
    fn test_redact_tail() {
        assert_eq!(redact_tail("CAT-2026-4821", 4), "*********4821");
        assert_eq!(redact_tail("ab", 4), "**");
    }
}
