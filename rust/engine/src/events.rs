// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer events and the observer bus that dispatches them.

use serde::Serialize;

use crate::camera::CameraMode;
use crate::model::EntityRef;
use crate::theme::Theme;

/// What caused a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    Click,
    Marquee,
    Keyboard,
    Api,
    /// Entities were dropped because their floor was hidden.
    Visibility,
    Reload,
}

/// Everything the viewer tells the host about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewerEvent {
    Loaded {
        floors: usize,
        entities: usize,
    },
    ThemeChanged {
        theme: Theme,
    },
    /// Hover changes never produce this.
    SelectionChanged {
        selection: Vec<EntityRef>,
        source: ChangeSource,
    },
    /// The user asked to open properties for the current selection.
    FocusProperties {
        selection: Vec<EntityRef>,
    },
    CameraModeChanged {
        mode: CameraMode,
    },
    FloorVisibilityChanged {
        floor_id: String,
        visible: bool,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }
}

type Listener = Box<dyn FnMut(&ViewerEvent)>;

/// Synchronous observer list; listeners run in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ViewerEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &ViewerEvent) {
        tracing::trace!(?event, listeners = self.listeners.len(), "emit");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_emit_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let sink = Rc::clone(&seen);
        let id = bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        bus.emit(&ViewerEvent::ThemeChanged { theme: Theme::Dark });
        assert_eq!(seen.borrow().len(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&ViewerEvent::ThemeChanged { theme: Theme::Light });
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn events_serialize_tagged() {
        let event = ViewerEvent::FloorVisibilityChanged {
            floor_id: "f1".into(),
            visible: false,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"type":"floorVisibilityChanged","floorId":"f1","visible":false}"#
        );
    }
}
