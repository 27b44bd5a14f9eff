use thiserror::Error;

use healthid_core::FlowError;
use healthid_domain::DomainError;
use healthid_providers::ProviderError;

/// Everything that can go wrong while driving a wizard. Validation errors
/// stay on the current step; provider errors additionally surface as
/// notifications; the rest are engine/programming errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("all disclaimers must be accepted before submitting")]
    DisclaimersNotAccepted,
    #[error("beneficiary name is required")]
    MissingBeneficiaryName,
    #[error("demographic verification is not enabled for this facility")]
    DemographicsUnavailable,
    #[error("none of the available auth methods are supported by this client")]
    NoSupportedAuthMethod,
    #[error("auth method '{0}' was not offered for this id")]
    UnsupportedAuthMethod(String),
    #[error("action '{action}' is not valid on step '{step}'")]
    WrongStep {
        action: &'static str,
        step: String,
    },
}
