// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::events::ViewerEvent;

/// A key press as delivered by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    /// `KeyboardEvent.key` value, e.g. `"a"`, `"Escape"`, `"Tab"`
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Focus is in an input, textarea or contenteditable element
    pub target_is_text_input: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.target_is_text_input = true;
        self
    }

    pub fn action(&self) -> Option<KeyAction> {
        if self.target_is_text_input {
            return None;
        }
        match self.key.as_str() {
            "a" | "A" if self.ctrl || self.meta => Some(KeyAction::SelectAll),
            "Escape" | "Esc" => Some(KeyAction::Clear),
            "Tab" => Some(KeyAction::Cycle {
                backward: self.shift,
            }),
            "Enter" => Some(KeyAction::FocusProperties),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    SelectAll,
    Clear,
    Cycle { backward: bool },
    FocusProperties,
}

/// Result of [`super::SelectionEngine::handle_key`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyResponse {
    /// The host should suppress the browser default for this key
    pub handled: bool,
    pub event: Option<ViewerEvent>,
}

impl KeyResponse {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled(event: Option<ViewerEvent>) -> Self {
        Self {
            handled: true,
            event,
        }
    }
}

/// Next index when cycling through `len` items from `current`, wrapping.
pub(crate) fn cycle_index(current: Option<usize>, len: usize, backward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (current, backward) {
        (None, false) => 0,
        (None, true) => len - 1,
        (Some(i), false) => (i + 1) % len,
        (Some(i), true) => (i + len - 1) % len,
    })
}
