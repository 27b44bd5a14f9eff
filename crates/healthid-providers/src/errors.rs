use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Any non-success outcome of an identity-provider operation. Flows
/// convert these into user-visible notifications; they never crash a
/// wizard.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderError {
    /// The provider answered and rejected the request.
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
    /// The call never produced a usable answer.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}
