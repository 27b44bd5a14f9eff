//! Schema of the scanned QR payload used by the single-shot linking flow.
//!
//! The provider has shipped two key-name variants for the district and
//! state fields over time; both are accepted here.

use serde::Deserialize;

use crate::errors::DomainError;
use crate::identity::{Gender, IdentityRecord};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QrPayload {
    /// Identity number ("hidn" on the wire).
    #[serde(rename = "hidn", default)]
    pub identity_number: Option<String>,
    /// Identity address, old key name.
    #[serde(rename = "hid", default)]
    pub hid: Option<String>,
    /// Identity address, new key name.
    #[serde(rename = "phr", default)]
    pub phr: Option<String>,
    pub name: String,
    pub gender: Gender,
    #[serde(rename = "dob")]
    pub date_of_birth: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "district_name", default)]
    pub district_name: Option<String>,
    #[serde(rename = "dist name", default)]
    pub dist_name: Option<String>,
    #[serde(rename = "state_name", default)]
    pub state_name: Option<String>,
    #[serde(rename = "state name", default)]
    pub state_name_spaced: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

impl QrPayload {
    /// Decodes a scanned payload. A malformed payload is a recoverable
    /// `QrDecode` error, never a panic.
    pub fn decode(raw: &str) -> Result<Self, DomainError> {
        let payload: QrPayload =
            serde_json::from_str(raw).map_err(|e| DomainError::QrDecode(e.to_string()))?;
        match (&payload.identity_number, payload.identity_address()) {
            (Some(_), None) | (None, Some(_)) => Ok(payload),
            _ => Err(DomainError::QrIdentityFields),
        }
    }

    pub fn identity_address(&self) -> Option<&str> {
        self.hid.as_deref().or(self.phr.as_deref())
    }

    pub fn district(&self) -> Option<&str> {
        self.district_name.as_deref().or(self.dist_name.as_deref())
    }

    pub fn state(&self) -> Option<&str> {
        self.state_name
            .as_deref()
            .or(self.state_name_spaced.as_deref())
    }

    /// Partial identity record submitted as-is to the create call.
    pub fn into_record(self) -> IdentityRecord {
        IdentityRecord {
            primary_id_number: self.identity_number.clone().unwrap_or_default(),
            identity_address: self.identity_address().unwrap_or_default().to_string(),
            name: self.name.clone(),
            gender: self.gender,
            date_of_birth: chrono::NaiveDate::parse_from_str(&self.date_of_birth, "%d-%m-%Y")
                .or_else(|_| {
                    chrono::NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d")
                })
                .ok(),
            mobile: self.mobile.clone().unwrap_or_default(),
            address: self.address.clone(),
            district: self.district().map(str::to_string),
            state: self.state().map(str::to_string),
            ..IdentityRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QR_OLD_KEYS: &str = r#"{
        "hidn": "12345678901234",
        "name": "Asha Kumar",
        "gender": "F",
        "dob": "11-04-1992",
        "address": "12 Lake Road",
        "district_name": "Ernakulam",
        "state_name": "Kerala",
        "mobile": "9876543210"
    }"#;

    const QR_SPACED_KEYS: &str = r#"{
        "phr": "asha.kumar",
        "name": "Asha Kumar",
        "gender": "F",
        "dob": "1992-04-11",
        "dist name": "Ernakulam",
        "state name": "Kerala"
    }"#;

    #[test]
    fn decodes_old_key_variant() {
        let payload = QrPayload::decode(QR_OLD_KEYS).unwrap();
        assert_eq!(payload.district(), Some("Ernakulam"));
        assert_eq!(payload.state(), Some("Kerala"));
        let record = payload.into_record();
        assert_eq!(record.primary_id_number, "12345678901234");
        assert_eq!(
            record.date_of_birth,
            chrono::NaiveDate::from_ymd_opt(1992, 4, 11)
        );
    }

    #[test]
    fn decodes_spaced_key_variant() {
        let payload = QrPayload::decode(QR_SPACED_KEYS).unwrap();
        assert_eq!(payload.district(), Some("Ernakulam"));
        let record = payload.into_record();
        assert_eq!(record.identity_address, "asha.kumar");
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        assert!(matches!(
            QrPayload::decode("not json at all"),
            Err(DomainError::QrDecode(_))
        ));
    }

    #[test]
    fn identity_fields_are_mutually_exclusive() {
        let both = r#"{
            "hidn": "12345678901234",
            "hid": "asha.kumar",
            "name": "Asha",
            "gender": "F",
            "dob": "11-04-1992"
        }"#;
        assert_eq!(QrPayload::decode(both), Err(DomainError::QrIdentityFields));

        let neither = r#"{"name": "Asha", "gender": "F", "dob": "11-04-1992"}"#;
        assert_eq!(
            QrPayload::decode(neither),
            Err(DomainError::QrIdentityFields)
        );
    }
}
