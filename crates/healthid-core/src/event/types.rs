//! Tipos de evento del flujo y estructura `FlowEvent`.
//!
//! Cada instancia de `StepFlow` emite eventos a un `EventStore`
//! append-only. Los tests los usan para asertar el orden exacto de las
//! transiciones; el enum define el contrato observable del motor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de un `flow_id`: fija la cantidad de steps.
    FlowInitialized { step_count: usize },
    /// The cursor landed on a step, via `next` or `go_to`. Entering the
    /// first step at initialization also emits this.
    StepEntered { step_index: usize, step_id: String },
    /// Terminal: the flow invoked its success path.
    FlowCompleted,
    /// Terminal: the wizard was dismissed; late responses are dropped.
    FlowClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>,
}
