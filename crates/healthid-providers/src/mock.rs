//! Scriptable in-memory identity provider for tests and demos.
//!
//! Responses are enqueued per operation and consumed in FIFO order; every
//! incoming call is recorded so tests can assert exactly which requests
//! reached the provider (e.g. that an exhausted resend never did).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use healthid_domain::IdentityRecord;

use crate::errors::ProviderError;
use crate::provider::{ops, IdentityProvider};
use crate::types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub request: Value,
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    responses: HashMap<&'static str, VecDeque<Result<Value, ProviderError>>>,
}

#[derive(Default)]
pub struct MockIdentityProvider {
    state: Mutex<MockState>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next successful response for an operation.
    pub fn enqueue_ok<T: Serialize>(&self, operation: &'static str, response: T) {
        let value = serde_json::to_value(response)
            .unwrap_or_else(|e| json!({ "mock_serialize_error": e.to_string() }));
        self.lock()
            .responses
            .entry(operation)
            .or_default()
            .push_back(Ok(value));
    }

    /// Scripts the next failure for an operation.
    pub fn enqueue_err(&self, operation: &'static str, error: ProviderError) {
        self.lock()
            .responses
            .entry(operation)
            .or_default()
            .push_back(Err(error));
    }

    /// Every call that reached the provider, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// How many calls reached the provider for one operation.
    pub fn calls_for(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn last_request(&self, operation: &str) -> Option<Value> {
        self.lock()
            .calls
            .iter()
            .rev()
            .find(|c| c.operation == operation)
            .map(|c| c.request.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        operation: &'static str,
        req: &Req,
    ) -> Result<Resp, ProviderError> {
        let request = serde_json::to_value(req)
            .map_err(|e| ProviderError::Unavailable(format!("request encode: {e}")))?;
        let mut state = self.lock();
        state.calls.push(RecordedCall { operation, request });
        let scripted = state
            .responses
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ProviderError::Unavailable(format!(
                    "no scripted response for {operation}"
                )))
            });
        drop(state);
        scripted.and_then(|value| {
            serde_json::from_value(value)
                .map_err(|e| ProviderError::Unavailable(format!("response decode: {e}")))
        })
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn send_primary_otp(
        &self,
        req: SendPrimaryOtpRequest,
    ) -> Result<OtpSentResponse, ProviderError> {
        self.take(ops::SEND_PRIMARY_OTP, &req)
    }

    async fn verify_primary_otp(
        &self,
        req: VerifyPrimaryOtpRequest,
    ) -> Result<VerifyPrimaryOtpResponse, ProviderError> {
        self.take(ops::VERIFY_PRIMARY_OTP, &req)
    }

    async fn verify_demographics(
        &self,
        req: VerifyDemographicsRequest,
    ) -> Result<VerifyDemographicsResponse, ProviderError> {
        self.take(ops::VERIFY_DEMOGRAPHICS, &req)
    }

    async fn link_mobile(&self, req: LinkMobileRequest) -> Result<OtpSentResponse, ProviderError> {
        self.take(ops::LINK_MOBILE, &req)
    }

    async fn verify_mobile_otp(
        &self,
        req: VerifyMobileOtpRequest,
    ) -> Result<OtpSentResponse, ProviderError> {
        self.take(ops::VERIFY_MOBILE_OTP, &req)
    }

    async fn suggest_addresses(
        &self,
        req: SuggestAddressesRequest,
    ) -> Result<SuggestAddressesResponse, ProviderError> {
        self.take(ops::SUGGEST_ADDRESSES, &req)
    }

    async fn enroll_address(
        &self,
        req: EnrollAddressRequest,
    ) -> Result<EnrollAddressResponse, ProviderError> {
        self.take(ops::ENROLL_ADDRESS, &req)
    }

    async fn check_auth_methods(
        &self,
        req: CheckAuthMethodsRequest,
    ) -> Result<CheckAuthMethodsResponse, ProviderError> {
        self.take(ops::CHECK_AUTH_METHODS, &req)
    }

    async fn send_login_otp(
        &self,
        req: SendLoginOtpRequest,
    ) -> Result<OtpSentResponse, ProviderError> {
        self.take(ops::SEND_LOGIN_OTP, &req)
    }

    async fn verify_login_otp(
        &self,
        req: VerifyLoginOtpRequest,
    ) -> Result<VerifyLoginOtpResponse, ProviderError> {
        self.take(ops::VERIFY_LOGIN_OTP, &req)
    }

    async fn create_from_qr(
        &self,
        record: IdentityRecord,
    ) -> Result<IdentityRecord, ProviderError> {
        self.take(ops::CREATE_FROM_QR, &record)
    }

    async fn list_states(&self) -> Result<Vec<StateEntry>, ProviderError> {
        self.take(ops::LIST_STATES, &json!({}))
    }

    async fn list_districts(
        &self,
        state_code: &str,
    ) -> Result<Vec<DistrictEntry>, ProviderError> {
        self.take(ops::LIST_DISTRICTS, &json!({ "state_code": state_code }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_scripted_responses_in_order() {
        let mock = MockIdentityProvider::new();
        mock.enqueue_ok(
            ops::SEND_PRIMARY_OTP,
            OtpSentResponse {
                transaction_id: "T1".into(),
                detail: "otp sent".into(),
            },
        );
        mock.enqueue_err(
            ops::SEND_PRIMARY_OTP,
            ProviderError::Rejected("rate limited".into()),
        );

        let req = SendPrimaryOtpRequest {
            primary_id: "123456789012".into(),
            transaction_id: None,
        };
        let first = mock.send_primary_otp(req.clone()).await.unwrap();
        assert_eq!(first.transaction_id, "T1");

        let second = mock.send_primary_otp(req).await;
        assert_eq!(
            second,
            Err(ProviderError::Rejected("rate limited".into()))
        );
        assert_eq!(mock.calls_for(ops::SEND_PRIMARY_OTP), 2);
    }

    #[tokio::test]
    async fn unscripted_call_is_recorded_and_fails() {
        let mock = MockIdentityProvider::new();
        let result = mock.list_states().await;
        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
        assert_eq!(mock.calls_for(ops::LIST_STATES), 1);
    }
}
