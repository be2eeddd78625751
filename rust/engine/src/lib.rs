// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan Viewer Engine
//!
//! Turns a floorplan document into a scene graph, keeps a registry of the
//! entities a user can pick, and interprets pointer and keyboard input into
//! selection changes and camera moves. Rendering and the DOM are reached
//! only through the traits in [`viewer`].
//!
//! Everything runs on one thread: the host calls [`FloorplanViewer::frame`]
//! once per animation frame and forwards input events in between.

pub mod builder;
pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod layout;
pub mod model;
pub mod registry;
pub mod scene;
pub mod selection;
pub mod theme;
pub mod viewer;

pub use builder::{
    BoxWallGenerator, BuildReport, FloorSummary, MeshRegistrar, ScenePipeline, SelectableRegistrar,
    TypeFilterRegistrar, WallGenerator,
};
pub use camera::{CameraDirector, CameraMode};
pub use config::{EngineConfig, MarqueeMode};
pub use error::{Error, Result};
pub use events::{ChangeSource, EventBus, SubscriptionId, ViewerEvent};
pub use keys::{EntityKey, NodeKey};
pub use layout::FloorLayout;
pub use model::{EntityRef, EntityType, Floorplan};
pub use registry::EntityRegistry;
pub use scene::{HighlightLevel, Scene};
pub use selection::{KeyInput, PointerInput, ScreenRect, SelectionEngine};
pub use theme::{Material, Theme};
pub use viewer::{ContainerLookup, FloorplanViewer, HostSurface, RenderFrame, RenderItem, Renderer};
