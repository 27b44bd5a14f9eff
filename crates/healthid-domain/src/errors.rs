//! Errores de validación locales: se reportan inline y nunca llegan al
//! identity provider.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::AddressRule;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    #[error("primary id must be exactly {expected} digits")]
    PrimaryIdLength { expected: usize },
    #[error("primary id must not contain whitespace")]
    PrimaryIdWhitespace,
    #[error("mobile number must be 10 digits")]
    InvalidMobile,
    #[error("otp must be 6 digits")]
    InvalidOtp,
    #[error("enter a valid id")]
    InvalidLoginId,
    #[error("identity address rejected: {0}")]
    IdentityAddress(AddressRule),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("qr payload could not be decoded: {0}")]
    QrDecode(String),
    #[error("qr payload must carry exactly one of identity number / identity address")]
    QrIdentityFields,
}
