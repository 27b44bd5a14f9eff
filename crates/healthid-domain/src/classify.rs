//! Clasificación y normalización de los identificadores que acepta el
//! flujo de enlace: número primario, móvil, número de identidad o alias.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Classification of a user-entered id, decided by length and
/// numeric-ness after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdClass {
    #[serde(rename = "aadhaar")]
    Aadhaar,
    #[serde(rename = "mobile")]
    Mobile,
    #[serde(rename = "abha-number")]
    IdentityNumber,
    #[serde(rename = "abha-address")]
    IdentityAddress,
}

/// Strips spaces and dashes. Applied before classification so that ids
/// copied with separators ("1234-5678-9012") classify the same as plain
/// digits.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Keeps only ASCII digits. Mirrors the primary-id input field, which
/// rejects everything else as the user types.
pub fn sanitize_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strips the country-code prefix and inner spaces from a mobile number.
pub fn normalize_mobile(raw: &str) -> String {
    raw.trim()
        .strip_prefix("+91")
        .unwrap_or(raw.trim())
        .chars()
        .filter(|c| *c != ' ')
        .collect()
}

pub fn classify_id(id: &str) -> IdClass {
    let numeric = !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
    match id.len() {
        12 | 16 if numeric => IdClass::Aadhaar,
        10 if numeric => IdClass::Mobile,
        14 if numeric => IdClass::IdentityNumber,
        _ => IdClass::IdentityAddress,
    }
}

/// Primary-id validation for the creation flow: exactly 12 digits, no
/// embedded whitespace. Never reaches the provider when it fails.
pub fn validate_primary_id(id: &str) -> Result<(), DomainError> {
    if id.contains(' ') {
        return Err(DomainError::PrimaryIdWhitespace);
    }
    if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::PrimaryIdLength { expected: 12 });
    }
    Ok(())
}

/// A linked mobile must normalize to exactly 10 digits.
pub fn validate_mobile(raw: &str) -> Result<String, DomainError> {
    let mobile = normalize_mobile(raw);
    if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::InvalidMobile);
    }
    Ok(mobile)
}

pub fn validate_otp(otp: &str) -> Result<(), DomainError> {
    if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::InvalidOtp);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_length_and_numericness() {
        assert_eq!(classify_id("123456789012"), IdClass::Aadhaar);
        assert_eq!(classify_id("1234567890123456"), IdClass::Aadhaar);
        assert_eq!(classify_id("9876543210"), IdClass::Mobile);
        assert_eq!(classify_id("12345678901234"), IdClass::IdentityNumber);
        assert_eq!(classify_id("asha.kumar"), IdClass::IdentityAddress);
        // 12 chars but not numeric falls through to the alias class
        assert_eq!(classify_id("12345678901x"), IdClass::IdentityAddress);
    }

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_id(" 1234-5678 9012 "), "123456789012");
        assert_eq!(normalize_mobile("+91 98765 43210"), "9876543210");
        assert_eq!(normalize_mobile("9876543210"), "9876543210");
        assert_eq!(sanitize_digits("12ab34"), "1234");
    }

    #[test]
    fn primary_id_rules() {
        assert!(validate_primary_id("123456789012").is_ok());
        assert_eq!(
            validate_primary_id("12345678901"),
            Err(DomainError::PrimaryIdLength { expected: 12 })
        );
        assert_eq!(
            validate_primary_id("123456 89012"),
            Err(DomainError::PrimaryIdWhitespace)
        );
    }

    #[test]
    fn mobile_rules() {
        assert_eq!(validate_mobile("+91 98765 43210").unwrap(), "9876543210");
        assert_eq!(validate_mobile("12345"), Err(DomainError::InvalidMobile));
    }

    #[test]
    fn otp_rules() {
        assert!(validate_otp("111111").is_ok());
        assert_eq!(validate_otp("11111"), Err(DomainError::InvalidOtp));
        assert_eq!(validate_otp("11111x"), Err(DomainError::InvalidOtp));
    }
}
