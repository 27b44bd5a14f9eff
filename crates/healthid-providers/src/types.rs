//! Request/response shapes of the identity-provider operations,
//! method-agnostic (the transport layer decides how they go on the wire).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use healthid_domain::{Gender, IdClass, IdentityRecord};

/// Which backing verification channel an OTP was issued through. Must
/// match between send and verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtpSystem {
    #[serde(rename = "aadhaar")]
    Aadhaar,
    #[serde(rename = "abdm")]
    Abdm,
}

/// Auth methods this client knows how to drive.
pub const SUPPORTED_AUTH_METHODS: [&str; 2] = ["AADHAAR_OTP", "MOBILE_OTP"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendPrimaryOtpRequest {
    pub primary_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Shared response shape of every OTP-issuing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpSentResponse {
    pub transaction_id: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyPrimaryOtpRequest {
    pub otp: String,
    pub transaction_id: String,
    pub mobile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyPrimaryOtpResponse {
    pub transaction_id: String,
    #[serde(default)]
    pub detail: String,
    pub is_new: bool,
    pub identity: IdentityRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyDemographicsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub primary_id: String,
    pub name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub state_code: String,
    pub district_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// An empty `transaction_id` here means the identity is fully resolved
/// and the flow can jump straight to its terminal step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyDemographicsResponse {
    #[serde(default)]
    pub transaction_id: String,
    pub identity: IdentityRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkMobileRequest {
    pub mobile: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyMobileOtpRequest {
    pub otp: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestAddressesRequest {
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestAddressesResponse {
    pub transaction_id: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollAddressRequest {
    pub address: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollAddressResponse {
    pub transaction_id: String,
    pub identity: IdentityRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckAuthMethodsRequest {
    pub identity_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckAuthMethodsResponse {
    pub auth_methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendLoginOtpRequest {
    pub value: String,
    pub id_type: IdClass,
    pub otp_system: OtpSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyLoginOtpRequest {
    pub id_type: IdClass,
    pub otp: String,
    pub transaction_id: String,
    pub otp_system: OtpSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyLoginOtpResponse {
    pub identity: IdentityRecord,
}

/// Lookup tables for demographic verification. District options depend on
/// the chosen state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub state_code: String,
    pub state_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictEntry {
    pub district_code: String,
    pub district_name: String,
}
