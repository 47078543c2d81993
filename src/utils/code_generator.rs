//! Short code generation and validation.
//!
//! Generated codes are uniformly random over a fixed alphanumeric alphabet.
//! Uniqueness is not checked here — the store's conditional insert is the
//! only authority, and the caller retries on conflict.

use crate::error::AppError;
use rand::Rng;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Alphabet for generated codes: 62 alphanumeric characters.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated codes. 62^9 candidate codes make collisions against
/// any realistic live set vanishingly rare.
pub const CODE_LENGTH: usize = 9;

/// Attempt budget for generate-and-insert before giving up with
/// [`AppError::CodeGenerationExhausted`]. Independent of code length;
/// repeated exhaustion indicates a systemic problem, not contention.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Codes that would shadow system routes and cannot be claimed by owners.
const RESERVED_CODES: &[&str] = &["links", "tags", "health", "api", "admin"];

/// Shape of acceptable custom codes.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Generates a random code of [`CODE_LENGTH`] characters from [`ALPHABET`].
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Validates an owner-supplied custom short code.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: letters, digits, hyphens, underscores
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved system route
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < 4 || code.len() > 32 {
        return Err(AppError::validation(
            "Custom code must be 4-32 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Err(AppError::validation(
            "Custom code can only contain letters, digits, hyphens, and underscores",
            json!({ "code": code }),
        ));
    }

    if code.starts_with('-') || code.ends_with('-') {
        return Err(AppError::validation(
            "Custom code cannot start or end with a hyphen",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.iter().any(|r| r.eq_ignore_ascii_case(code)) {
        return Err(AppError::validation(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_fixed_length() {
        for _ in 0..100 {
            assert_eq!(generate_code().len(), CODE_LENGTH);
        }
    }

    #[test]
    fn test_generate_code_stays_in_alphabet() {
        let code = generate_code();
        assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let mut codes = HashSet::new();

        for _ in 0..1000 {
            codes.insert(generate_code());
        }

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_validate_accepts_mixed_case_and_digits() {
        assert!(validate_custom_code("Promo2026").is_ok());
        assert!(validate_custom_code("my-link").is_ok());
        assert!(validate_custom_code("my_link_42").is_ok());
        assert!(validate_custom_code("abcd").is_ok());
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!(validate_custom_code("abc").is_err());
        assert!(validate_custom_code(&"x".repeat(33)).is_err());
        assert!(validate_custom_code(&"x".repeat(32)).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_characters() {
        assert!(validate_custom_code("my code").is_err());
        assert!(validate_custom_code("code@123").is_err());
        assert!(validate_custom_code("café-link").is_err());
    }

    #[test]
    fn test_validate_rejects_edge_hyphens() {
        assert!(validate_custom_code("-promo").is_err());
        assert!(validate_custom_code("promo-").is_err());
    }

    #[test]
    fn test_validate_rejects_reserved_codes() {
        for &reserved in RESERVED_CODES {
            assert!(
                validate_custom_code(reserved).is_err(),
                "reserved code '{}' should be invalid",
                reserved
            );
        }
        assert!(validate_custom_code("Links").is_err());
    }

    #[test]
    fn test_validate_empty_string() {
        assert!(validate_custom_code("").is_err());
    }
}
