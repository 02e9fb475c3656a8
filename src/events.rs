//! Element-scoped publish/subscribe with DOM-style bubbling.
//!
//! Listeners are registered per `(node, event name)`. Dispatching walks from
//! the target up through its ancestors and calls every listener registered
//! along the way, so a listener on `body` hears about every component that
//! finishes loading without knowing which one.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::dom::{Document, NodeId};

/// Fired on a placeholder after its fragment has been inserted.
pub const COMPONENT_LOADED: &str = "component:loaded";

/// An immutable event delivered to listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Event type, e.g. `component:loaded`.
    pub kind: String,
    /// Node the event was dispatched on.
    #[serde(skip)]
    pub target: NodeId,
    /// Payload.
    pub detail: Value,
    /// Whether the event propagates to ancestors.
    pub bubbles: bool,
}

impl Event {
    pub fn new(kind: impl Into<String>, target: NodeId, detail: Value, bubbles: bool) -> Self {
        Self {
            kind: kind.into(),
            target,
            detail,
            bubbles,
        }
    }

    /// Bubbling `component:loaded` event carrying `{ "name": name }`.
    pub fn component_loaded(target: NodeId, name: &str) -> Self {
        Self::new(
            COMPONENT_LOADED,
            target,
            serde_json::json!({ "name": name }),
            true,
        )
    }

    /// Read a string field from the payload.
    pub fn detail_str(&self, field: &str) -> Option<&str> {
        self.detail.get(field).and_then(Value::as_str)
    }
}

/// What a listener receives: the event, the document as it stands at
/// dispatch time, and the node the listener was registered on.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub event: &'a Event,
    pub document: &'a Document,
    pub current_target: NodeId,
}

pub type Listener = Arc<dyn Fn(&Delivery<'_>) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<(NodeId, String), Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind` events reaching `node`.
    pub fn on<F>(&mut self, node: NodeId, kind: &str, listener: F)
    where
        F: Fn(&Delivery<'_>) + Send + Sync + 'static,
    {
        self.listeners
            .entry((node, kind.to_string()))
            .or_default()
            .push(Arc::new(listener));
    }

    /// Number of listeners registered for `kind` on `node`.
    pub fn listener_count(&self, node: NodeId, kind: &str) -> usize {
        self.listeners
            .get(&(node, kind.to_string()))
            .map_or(0, Vec::len)
    }

    /// Deliver `event` to its target and, if it bubbles, to every ancestor.
    ///
    /// Returns how many listener calls were made.
    pub fn dispatch(&self, document: &Document, event: &Event) -> usize {
        let path: Vec<NodeId> = if event.bubbles {
            std::iter::once(event.target)
                .chain(document.ancestors(event.target))
                .collect()
        } else {
            vec![event.target]
        };

        let mut delivered = 0;
        for node in path {
            if let Some(listeners) = self.listeners.get(&(node, event.kind.clone())) {
                let delivery = Delivery {
                    event,
                    document,
                    current_target: node,
                };
                for listener in listeners {
                    listener(&delivery);
                    delivered += 1;
                }
            }
        }

        trace!("Dispatched {} to {} listeners", event.kind, delivered);
        delivered
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("registrations", &self.listeners.len())
            .finish()
    }
}
