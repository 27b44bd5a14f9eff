//! Client-side format rule for identity addresses. The rule is identical
//! across provider versions, so it is enforced before the enroll call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::DomainError;

/// Which rule an identity address candidate violates.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressRule {
    #[error("must be at least 4 characters long")]
    Length,
    #[error("must not start with a digit or a dot")]
    Start,
    #[error("must not end with a dot")]
    End,
    #[error("may only contain letters, digits, dots and underscores")]
    Charset,
}

/// Validates a candidate identity address:
/// length >= 4, no leading digit or `.`, no trailing `.`, characters
/// restricted to `[0-9a-zA-Z._]`.
pub fn validate_identity_address(address: &str) -> Result<(), DomainError> {
    if address.chars().count() < 4 {
        return Err(DomainError::IdentityAddress(AddressRule::Length));
    }
    if let Some(first) = address.chars().next() {
        if first.is_ascii_digit() || first == '.' {
            return Err(DomainError::IdentityAddress(AddressRule::Start));
        }
    }
    if address.ends_with('.') {
        return Err(DomainError::IdentityAddress(AddressRule::End));
    }
    if !address
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return Err(DomainError::IdentityAddress(AddressRule::Charset));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(address: &str) -> Option<AddressRule> {
        match validate_identity_address(address) {
            Err(DomainError::IdentityAddress(rule)) => Some(rule),
            _ => None,
        }
    }

    #[test]
    fn rejects_short_addresses() {
        assert_eq!(violation("ab"), Some(AddressRule::Length));
    }

    #[test]
    fn rejects_leading_digit_or_dot() {
        assert_eq!(violation("1abc"), Some(AddressRule::Start));
        assert_eq!(violation(".abc"), Some(AddressRule::Start));
    }

    #[test]
    fn rejects_trailing_dot() {
        assert_eq!(violation("abc."), Some(AddressRule::End));
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(violation("abc#d"), Some(AddressRule::Charset));
    }

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(validate_identity_address("abcd").is_ok());
        assert!(validate_identity_address("asha.kumar_01").is_ok());
    }
}
