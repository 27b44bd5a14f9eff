//! Core StepFlow implementation.
//!
//! A `StepFlow` is one wizard run: an immutable step registry, a single
//! memory record and a navigation cursor, all behind a cheaply cloneable
//! handle so that in-flight async step logic can keep mutating state from
//! wherever the response lands. Memory mutations always apply against the
//! latest state, never a closed-over snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::engine::StepContext;
use crate::errors::FlowError;
use crate::event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
use crate::step::StepRegistry;

pub(crate) struct FlowState<M> {
    pub memory: M,
    pub cursor: usize,
    pub closed: bool,
    pub completed: bool,
    pub in_flight: bool,
}

pub(crate) struct FlowInner<M> {
    pub flow_id: Uuid,
    pub registry: StepRegistry<M>,
    pub state: Mutex<FlowState<M>>,
    pub events: Mutex<Box<dyn EventStore + Send>>,
}

impl<M> FlowInner<M> {
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, FlowState<M>> {
        // Poison recovery: a panicking test thread must not wedge the flow.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn append_event(&self, kind: FlowEventKind) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.append_kind(self.flow_id, kind);
    }
}

/// One running wizard instance. Clones share the same state; dropping the
/// last clone discards the session (no persistence).
pub struct StepFlow<M> {
    inner: Arc<FlowInner<M>>,
}

impl<M> Clone for StepFlow<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Send + 'static> StepFlow<M> {
    pub(crate) fn from_inner(inner: Arc<FlowInner<M>>) -> Self {
        Self { inner }
    }

    /// Creates a fresh flow seeded with caller-supplied defaults, enters
    /// the first registered step and runs its enter hook.
    pub fn new(registry: StepRegistry<M>, initial: M) -> Result<Self, FlowError> {
        Self::with_event_store(registry, initial, Box::new(InMemoryEventStore::default()))
    }

    pub fn with_event_store(
        registry: StepRegistry<M>,
        initial: M,
        events: Box<dyn EventStore + Send>,
    ) -> Result<Self, FlowError> {
        if registry.is_empty() {
            return Err(FlowError::EmptyFlow);
        }
        let flow = Self {
            inner: Arc::new(FlowInner {
                flow_id: Uuid::new_v4(),
                registry,
                state: Mutex::new(FlowState {
                    memory: initial,
                    cursor: 0,
                    closed: false,
                    completed: false,
                    in_flight: false,
                }),
                events: Mutex::new(events),
            }),
        };
        flow.inner
            .append_event(FlowEventKind::FlowInitialized { step_count: flow.inner.registry.len() });
        flow.enter(0)?;
        Ok(flow)
    }

    pub fn flow_id(&self) -> Uuid {
        self.inner.flow_id
    }

    /// Id of the step the cursor is currently on.
    pub fn current_step(&self) -> String {
        let cursor = self.inner.lock_state().cursor;
        self.inner
            .registry
            .id_at(cursor)
            .unwrap_or_default()
            .to_string()
    }

    /// Snapshot of the flow memory.
    pub fn snapshot(&self) -> M
    where
        M: Clone,
    {
        self.inner.lock_state().memory.clone()
    }

    /// Applies `f` to the latest memory state. Returns `false` without
    /// applying when the flow has been closed, so a late-arriving response
    /// after dismissal is a no-op.
    pub fn update_memory<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut M),
    {
        let mut state = self.inner.lock_state();
        if state.closed {
            debug!(flow_id = %self.inner.flow_id, "dropping memory update on closed flow");
            return false;
        }
        f(&mut state.memory);
        true
    }

    /// Advances to the step immediately following the current one. On the
    /// last step this is a no-op that only logs a warning.
    pub fn next(&self) -> Result<(), FlowError> {
        let target = {
            let state = self.inner.lock_state();
            if state.cursor + 1 >= self.inner.registry.len() {
                warn!(
                    flow_id = %self.inner.flow_id,
                    step = self.inner.registry.id_at(state.cursor).unwrap_or_default(),
                    "next() called on the last step of the flow; ignoring"
                );
                return Ok(());
            }
            state.cursor + 1
        };
        self.enter(target)
    }

    /// Jumps to the step with the given id. An unknown id is a programming
    /// error and fails loudly instead of silently no-oping.
    pub fn go_to(&self, step_id: &str) -> Result<(), FlowError> {
        let target = self
            .inner
            .registry
            .index_of(step_id)
            .ok_or_else(|| FlowError::StepNotFound(step_id.to_string()))?;
        self.enter(target)
    }

    fn enter(&self, index: usize) -> Result<(), FlowError> {
        let step_id = {
            let mut state = self.inner.lock_state();
            state.cursor = index;
            self.inner
                .registry
                .id_at(index)
                .unwrap_or_default()
                .to_string()
        };
        debug!(flow_id = %self.inner.flow_id, step = %step_id, "entering step");
        self.inner.append_event(FlowEventKind::StepEntered {
            step_index: index,
            step_id,
        });
        // The hook runs without holding the state lock: it may navigate
        // again (conditional skip), which re-enters this function.
        if let Some(hook) = self.inner.registry.hook_at(index) {
            let ctx = self.context();
            hook(&ctx)?;
        }
        Ok(())
    }

    /// Marks the flow as successfully finished (the step that invoked the
    /// wizard's success callback).
    pub fn complete(&self) {
        let mut state = self.inner.lock_state();
        if state.completed {
            return;
        }
        state.completed = true;
        drop(state);
        self.inner.append_event(FlowEventKind::FlowCompleted);
    }

    /// Dismisses the wizard. Memory updates from here on are dropped.
    pub fn close(&self) {
        let mut state = self.inner.lock_state();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.inner.append_event(FlowEventKind::FlowClosed);
    }

    pub fn is_completed(&self) -> bool {
        self.inner.lock_state().completed
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock_state().closed
    }

    /// Double-submit protection: at most one provider request per flow at
    /// a time. The guard releases the slot on drop.
    pub fn begin_request(&self) -> Result<RequestGuard<M>, FlowError> {
        let mut state = self.inner.lock_state();
        if state.closed {
            return Err(FlowError::FlowClosed);
        }
        if state.in_flight {
            return Err(FlowError::RequestInFlight);
        }
        state.in_flight = true;
        Ok(RequestGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn context(&self) -> StepContext<M> {
        StepContext::new(Arc::clone(&self.inner))
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        let events = self.inner.events.lock().unwrap_or_else(|e| e.into_inner());
        events.list(self.inner.flow_id)
    }
}

/// RAII guard for an in-flight provider request.
pub struct RequestGuard<M> {
    inner: Arc<FlowInner<M>>,
}

impl<M> Drop for RequestGuard<M> {
    fn drop(&mut self) {
        self.inner.lock_state().in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepDefinition;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Memory {
        transaction_id: String,
        resend_otp_count: u32,
    }

    fn three_steps() -> StepRegistry<Memory> {
        StepRegistry::builder()
            .step(StepDefinition::new("enter-id"))
            .step(StepDefinition::new("verify-id"))
            .step(StepDefinition::new("show-profile"))
            .build()
            .unwrap()
    }

    #[test]
    fn memory_survives_navigation() {
        let flow = StepFlow::new(three_steps(), Memory::default()).unwrap();
        flow.update_memory(|m| m.transaction_id = "T1".into());
        flow.next().unwrap();
        flow.go_to("show-profile").unwrap();
        flow.go_to("enter-id").unwrap();
        assert_eq!(flow.snapshot().transaction_id, "T1");
    }

    #[test]
    fn go_to_unknown_step_fails_loudly() {
        let flow = StepFlow::new(three_steps(), Memory::default()).unwrap();
        assert_eq!(
            flow.go_to("nope"),
            Err(FlowError::StepNotFound("nope".into()))
        );
        // Failure leaves the cursor untouched.
        assert_eq!(flow.current_step(), "enter-id");
    }

    #[test]
    fn next_on_last_step_is_a_noop() {
        let flow = StepFlow::new(three_steps(), Memory::default()).unwrap();
        flow.go_to("show-profile").unwrap();
        flow.next().unwrap();
        assert_eq!(flow.current_step(), "show-profile");
    }

    #[test]
    fn closed_flow_drops_memory_updates() {
        let flow = StepFlow::new(three_steps(), Memory::default()).unwrap();
        flow.close();
        assert!(!flow.update_memory(|m| m.transaction_id = "late".into()));
        // Cannot observe through snapshot either: nothing was applied.
        assert_eq!(flow.snapshot().transaction_id, "");
    }

    #[test]
    fn request_guard_blocks_double_submit() {
        let flow = StepFlow::new(three_steps(), Memory::default()).unwrap();
        let guard = flow.begin_request().unwrap();
        assert_eq!(flow.begin_request().err(), Some(FlowError::RequestInFlight));
        drop(guard);
        assert!(flow.begin_request().is_ok());
    }

    #[test]
    fn enter_hook_can_skip_conditionally() {
        let registry = StepRegistry::builder()
            .step(StepDefinition::new("enter-id"))
            .step(
                StepDefinition::new("verify-id").on_enter(|ctx: &StepContext<Memory>| {
                    // Auto-skip when a transaction is already threaded.
                    if !ctx.snapshot().transaction_id.is_empty() {
                        ctx.go_to("show-profile")?;
                    }
                    Ok(())
                }),
            )
            .step(StepDefinition::new("show-profile"))
            .build()
            .unwrap();

        let flow = StepFlow::new(registry, Memory::default()).unwrap();
        flow.update_memory(|m| m.transaction_id = "T1".into());
        flow.go_to("verify-id").unwrap();
        assert_eq!(flow.current_step(), "show-profile");
    }

    #[test]
    fn event_log_records_transition_order() {
        let flow = StepFlow::new(three_steps(), Memory::default()).unwrap();
        flow.next().unwrap();
        flow.complete();
        let kinds: Vec<_> = flow.events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FlowEventKind::FlowInitialized { step_count: 3 },
                FlowEventKind::StepEntered {
                    step_index: 0,
                    step_id: "enter-id".into()
                },
                FlowEventKind::StepEntered {
                    step_index: 1,
                    step_id: "verify-id".into()
                },
                FlowEventKind::FlowCompleted,
            ]
        );
    }
}
