use async_trait::async_trait;

use healthid_domain::IdentityRecord;

use crate::errors::ProviderError;
use crate::types::*;

/// Stable operation names, shared by the mock's call record and the
/// flows' logging.
pub mod ops {
    pub const SEND_PRIMARY_OTP: &str = "send_primary_otp";
    pub const VERIFY_PRIMARY_OTP: &str = "verify_primary_otp";
    pub const VERIFY_DEMOGRAPHICS: &str = "verify_demographics";
    pub const LINK_MOBILE: &str = "link_mobile";
    pub const VERIFY_MOBILE_OTP: &str = "verify_mobile_otp";
    pub const SUGGEST_ADDRESSES: &str = "suggest_addresses";
    pub const ENROLL_ADDRESS: &str = "enroll_address";
    pub const CHECK_AUTH_METHODS: &str = "check_auth_methods";
    pub const SEND_LOGIN_OTP: &str = "send_login_otp";
    pub const VERIFY_LOGIN_OTP: &str = "verify_login_otp";
    pub const CREATE_FROM_QR: &str = "create_from_qr";
    pub const LIST_STATES: &str = "list_states";
    pub const LIST_DISTRICTS: &str = "list_districts";
}

/// Abstract identity provider consumed by the linking flows. All calls
/// are asynchronous and non-blocking; the step machine suspends while a
/// request is in flight but never blocks the caller's event loop.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn send_primary_otp(
        &self,
        req: SendPrimaryOtpRequest,
    ) -> Result<OtpSentResponse, ProviderError>;

    async fn verify_primary_otp(
        &self,
        req: VerifyPrimaryOtpRequest,
    ) -> Result<VerifyPrimaryOtpResponse, ProviderError>;

    async fn verify_demographics(
        &self,
        req: VerifyDemographicsRequest,
    ) -> Result<VerifyDemographicsResponse, ProviderError>;

    async fn link_mobile(&self, req: LinkMobileRequest) -> Result<OtpSentResponse, ProviderError>;

    async fn verify_mobile_otp(
        &self,
        req: VerifyMobileOtpRequest,
    ) -> Result<OtpSentResponse, ProviderError>;

    async fn suggest_addresses(
        &self,
        req: SuggestAddressesRequest,
    ) -> Result<SuggestAddressesResponse, ProviderError>;

    async fn enroll_address(
        &self,
        req: EnrollAddressRequest,
    ) -> Result<EnrollAddressResponse, ProviderError>;

    async fn check_auth_methods(
        &self,
        req: CheckAuthMethodsRequest,
    ) -> Result<CheckAuthMethodsResponse, ProviderError>;

    async fn send_login_otp(
        &self,
        req: SendLoginOtpRequest,
    ) -> Result<OtpSentResponse, ProviderError>;

    async fn verify_login_otp(
        &self,
        req: VerifyLoginOtpRequest,
    ) -> Result<VerifyLoginOtpResponse, ProviderError>;

    /// Submits a partial record decoded from a scanned QR payload.
    async fn create_from_qr(
        &self,
        record: IdentityRecord,
    ) -> Result<IdentityRecord, ProviderError>;

    async fn list_states(&self) -> Result<Vec<StateEntry>, ProviderError>;

    async fn list_districts(&self, state_code: &str)
        -> Result<Vec<DistrictEntry>, ProviderError>;
}
