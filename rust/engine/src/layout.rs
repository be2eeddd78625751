// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor stacking and visibility bookkeeping.

use rustc_hash::FxHashMap;

use crate::keys::NodeKey;

/// One floor's place in the stack
#[derive(Debug, Clone, PartialEq)]
pub struct FloorSlot {
    pub id: String,
    /// Elevation of the floor's top surface
    pub base: f64,
    pub height: f64,
    pub visible: bool,
    /// Group node holding every mesh of the floor
    pub node: NodeKey,
}

/// Tracks where each floor sits and whether it is shown.
#[derive(Debug, Default)]
pub struct FloorLayout {
    slots: Vec<FloorSlot>,
    by_id: FxHashMap<String, usize>,
}

impl FloorLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next floor up; its base is the top of the previous one.
    pub fn push(&mut self, id: &str, height: f64, node: NodeKey) -> f64 {
        let base = self.next_base();
        self.by_id.insert(id.to_string(), self.slots.len());
        self.slots.push(FloorSlot {
            id: id.to_string(),
            base,
            height,
            visible: true,
            node,
        });
        base
    }

    /// Elevation the next pushed floor would get
    pub fn next_base(&self) -> f64 {
        self.slots.last().map_or(0.0, |s| s.base + s.height)
    }

    pub fn get(&self, id: &str) -> Option<&FloorSlot> {
        self.by_id.get(id).map(|&i| &self.slots[i])
    }

    pub fn floors(&self) -> &[FloorSlot] {
        &self.slots
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.get(id).is_some_and(|s| s.visible)
    }

    /// Returns the floor's group node when the flag actually changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Option<NodeKey> {
        let &i = self.by_id.get(id)?;
        let slot = &mut self.slots[i];
        if slot.visible == visible {
            return None;
        }
        slot.visible = visible;
        Some(slot.node)
    }

    /// Visibility flags to carry into a rebuilt layout
    pub fn hidden_ids(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| !s.visible)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn reset(&mut self) {
        self.slots.clear();
        self.by_id.clear();
    }
}
