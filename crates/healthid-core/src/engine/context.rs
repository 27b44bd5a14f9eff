//! `StepContext`: the capability handle injected into step logic.

use std::sync::Arc;

use crate::engine::core::FlowInner;
use crate::engine::StepFlow;
use crate::errors::FlowError;

/// Injected navigation/state capabilities of one step. A fresh context is
/// handed to every enter hook; flow wizards keep one per running instance.
/// All clones observe and mutate the same flow.
pub struct StepContext<M> {
    inner: Arc<FlowInner<M>>,
}

impl<M> Clone for StepContext<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Send + 'static> StepContext<M> {
    pub(crate) fn new(inner: Arc<FlowInner<M>>) -> Self {
        Self { inner }
    }

    fn flow(&self) -> StepFlow<M> {
        StepFlow::from_inner(Arc::clone(&self.inner))
    }

    /// Current memory snapshot (read).
    pub fn snapshot(&self) -> M
    where
        M: Clone,
    {
        self.flow().snapshot()
    }

    /// Merge-update against the latest memory state. Returns `false` when
    /// the flow is closed and the update was dropped.
    pub fn update_memory<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut M),
    {
        self.flow().update_memory(f)
    }

    /// Advance to the step following the current one.
    pub fn next(&self) -> Result<(), FlowError> {
        self.flow().next()
    }

    /// Jump to an arbitrary registered step by id.
    pub fn go_to(&self, step_id: &str) -> Result<(), FlowError> {
        self.flow().go_to(step_id)
    }

    pub fn current_step(&self) -> String {
        self.flow().current_step()
    }
}
