// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage.
//!
//! Scene nodes and registry entries are addressed by generational
//! `slotmap` keys. Keys are only meaningful within one load; a reload
//! recreates every node and entity.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a node in the scene graph.
    pub struct NodeKey;

    /// Key for a selectable entity in the registry.
    pub struct EntityKey;
}
