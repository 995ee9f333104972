//! Track List Listeners
//!
//! Binds change handlers to track-list-like objects. Lists that support
//! `addEventListener` keep every registered handler; the rest only expose a
//! single `on<event>` slot per event type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Listener identifier
pub type ListenerId = u32;

/// Fired when a track's mode changes
pub const CHANGE: &str = "change";

/// Fired when a track is added after load
pub const ADD_TRACK: &str = "addtrack";

/// Subscription capability of a track list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListenerMode {
    /// `addEventListener` / `removeEventListener`
    #[default]
    EventTarget,
    /// One `on<event>` property per event type
    HandlerSlot,
}

/// Handlers bound to one target
#[derive(Debug, Clone)]
pub enum EventBinding {
    Listeners(Vec<(String, ListenerId)>),
    Slots(HashMap<String, ListenerId>),
}

impl Default for EventBinding {
    fn default() -> Self {
        Self::new(ListenerMode::default())
    }
}

impl EventBinding {
    pub fn new(mode: ListenerMode) -> Self {
        match mode {
            ListenerMode::EventTarget => Self::Listeners(Vec::new()),
            ListenerMode::HandlerSlot => Self::Slots(HashMap::new()),
        }
    }

    pub fn mode(&self) -> ListenerMode {
        match self {
            Self::Listeners(_) => ListenerMode::EventTarget,
            Self::Slots(_) => ListenerMode::HandlerSlot,
        }
    }

    /// Handlers to run for `event_type`, in registration order
    pub fn handlers(&self, event_type: &str) -> Vec<ListenerId> {
        match self {
            Self::Listeners(listeners) => listeners
                .iter()
                .filter(|(ty, _)| ty == event_type)
                .map(|(_, id)| *id)
                .collect(),
            Self::Slots(slots) => slots.get(event_type).copied().into_iter().collect(),
        }
    }

    pub fn is_bound(&self, event_type: &str, id: ListenerId) -> bool {
        self.handlers(event_type).contains(&id)
    }
}

/// Anything that can carry an event binding
pub trait ListenerTarget {
    fn binding(&self) -> &EventBinding;
    fn binding_mut(&mut self) -> &mut EventBinding;
}

/// Bind `id` to `event_type` on `target`.
///
/// Re-adding the same listener is a no-op. Through a handler slot the new
/// handler replaces whatever was there.
pub fn attach(target: &mut dyn ListenerTarget, event_type: &str, id: ListenerId) {
    match target.binding_mut() {
        EventBinding::Listeners(listeners) => {
            if !listeners.iter().any(|(ty, l)| ty == event_type && *l == id) {
                listeners.push((event_type.to_string(), id));
            }
        }
        EventBinding::Slots(slots) => {
            slots.insert(event_type.to_string(), id);
        }
    }
    tracing::debug!("Attached listener {} for '{}'", id, event_type);
}

/// Unbind `id` from `event_type`. A missing target is ignored.
pub fn detach(target: Option<&mut dyn ListenerTarget>, event_type: &str, id: ListenerId) {
    let Some(target) = target else {
        return;
    };
    match target.binding_mut() {
        EventBinding::Listeners(listeners) => {
            listeners.retain(|(ty, l)| !(ty == event_type && *l == id));
        }
        EventBinding::Slots(slots) => {
            slots.remove(event_type);
        }
    }
    tracing::debug!("Detached listener {} from '{}'", id, event_type);
}
