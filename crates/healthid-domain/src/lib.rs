//! healthid-domain: identity records, input classification and local
//! validation rules shared by every linking flow.

pub mod address;
pub mod classify;
pub mod errors;
pub mod identity;
pub mod qr;

pub use address::{validate_identity_address, AddressRule};
pub use classify::{
    classify_id, normalize_id, normalize_mobile, sanitize_digits, validate_mobile, validate_otp,
    validate_primary_id, IdClass,
};
pub use errors::DomainError;
pub use identity::{Gender, IdentityRecord};
pub use qr::QrPayload;
