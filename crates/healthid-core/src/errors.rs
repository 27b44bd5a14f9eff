//! Errores del motor de flujos (simples por ahora).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum FlowError {
    /// Programmer error: `go_to` targeted an id outside the registry.
    #[error("step '{0}' is not registered in this flow")]
    StepNotFound(String),
    #[error("duplicate step id '{0}' in flow definition")]
    DuplicateStepId(String),
    #[error("a flow definition needs at least one step")]
    EmptyFlow,
    #[error("otp resend limit reached")]
    RetryExhausted,
    #[error("missing transaction id for verify/resend call")]
    MissingTransaction,
    #[error("response references a stale transaction id")]
    StaleTransaction,
    #[error("another request is already in flight for this flow")]
    RequestInFlight,
    #[error("flow instance has been closed")]
    FlowClosed,
}
