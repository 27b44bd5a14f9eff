//! Transaction-id threading.
//!
//! The identity provider issues an opaque token on every OTP-issuing call;
//! the matching verify/resend call must carry it unchanged. The thread is
//! the sole source of truth: verify responses that reference a token
//! superseded by a later resend are discarded.

use serde::{Deserialize, Serialize};

use crate::errors::FlowError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionThread {
    current: String,
}

impl TransactionThread {
    pub fn set(&mut self, id: impl Into<String>) {
        self.current = id.into();
    }

    pub fn clear(&mut self) {
        self.current.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn value(&self) -> &str {
        &self.current
    }

    /// The token to thread into a verify/resend request. A verify or
    /// resend without a transaction must not be attempted.
    pub fn require(&self) -> Result<String, FlowError> {
        if self.current.is_empty() {
            Err(FlowError::MissingTransaction)
        } else {
            Ok(self.current.clone())
        }
    }

    /// Guards against the resend/verify race: a response is only applied
    /// when the token it was issued against is still the latest one.
    pub fn ensure_current(&self, issued_against: &str) -> Result<(), FlowError> {
        if self.current == issued_against {
            Ok(())
        } else {
            Err(FlowError::StaleTransaction)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_empty_transaction() {
        let txn = TransactionThread::default();
        assert_eq!(txn.require(), Err(FlowError::MissingTransaction));
    }

    #[test]
    fn stale_token_is_rejected_after_resend() {
        let mut txn = TransactionThread::default();
        txn.set("T1");
        let issued = txn.require().unwrap();
        // A resend lands while the verify is in flight.
        txn.set("T2");
        assert_eq!(txn.ensure_current(&issued), Err(FlowError::StaleTransaction));
        assert!(txn.ensure_current("T2").is_ok());
    }
}
