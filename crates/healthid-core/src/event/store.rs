use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{FlowEvent, FlowEventKind};

/// Append-only sink for the transition log of one or more flows. The
/// store assigns `seq` and the timestamp; callers only hand in the kind.
pub trait EventStore {
    fn append_kind(&mut self, flow_id: Uuid, kind: FlowEventKind) -> FlowEvent;
    /// Events of one flow in append order.
    fn list(&self, flow_id: Uuid) -> Vec<FlowEvent>;
}

/// Default store: per-flow vectors, no persistence. Wizard sessions are
/// short-lived, so the log dies with the flow handle.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: HashMap<Uuid, Vec<FlowEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, flow_id: Uuid, kind: FlowEventKind) -> FlowEvent {
        let log = self.events.entry(flow_id).or_default();
        let event = FlowEvent {
            seq: log.len() as u64,
            flow_id,
            kind,
            ts: Utc::now(),
        };
        log.push(event.clone());
        event
    }

    fn list(&self, flow_id: Uuid) -> Vec<FlowEvent> {
        self.events.get(&flow_id).cloned().unwrap_or_default()
    }
}
