use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Gender as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Other
    }
}

/// Identity record as returned by the identity provider.
///
/// `primary_id_number` is the national identity number used to bootstrap
/// creation; `identity_address` is the human-chosen alias bound to the
/// record. `is_new` distinguishes a freshly enrolled record from one that
/// already existed on the provider side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IdentityRecord {
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub primary_id_number: String,
    #[serde(default)]
    pub identity_address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub is_new: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_serializes_as_single_letter() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"M\"");
        assert_eq!(
            serde_json::from_str::<Gender>("\"O\"").unwrap(),
            Gender::Other
        );
    }

    #[test]
    fn record_deserializes_with_missing_optionals() {
        let record: IdentityRecord =
            serde_json::from_str(r#"{"name": "Asha", "gender": "F", "is_new": true}"#).unwrap();
        assert_eq!(record.name, "Asha");
        assert!(record.is_new);
        assert!(record.date_of_birth.is_none());
    }
}
