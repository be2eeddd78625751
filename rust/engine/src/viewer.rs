// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer facade.
//!
//! [`FloorplanViewer`] owns the scene, registry, floor layout, selection
//! and camera for one host container. Hosts drive it with input and a
//! per-frame tick and observe it through [`ViewerEvent`]s; nothing outside
//! this module touches the scene graph directly.

use floorplan_geometry::{Aabb, Matrix4, Mesh, Point3};

use crate::builder::{BuildReport, BuildTarget, ScenePipeline};
use crate::camera::{CameraDirector, CameraMode};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::events::{ChangeSource, EventBus, SubscriptionId, ViewerEvent};
use crate::keys::NodeKey;
use crate::layout::FloorLayout;
use crate::model::{EntityRef, EntityType, Floorplan};
use crate::registry::EntityRegistry;
use crate::scene::{HighlightLevel, Scene};
use crate::selection::{KeyInput, PointerInput, ScreenRect, SelectionContext, SelectionEngine};
use crate::theme::{Material, Rgb, Theme};

/// Finds the host element a viewer attaches to
pub trait ContainerLookup {
    type Surface: HostSurface;

    fn find(&self, container_id: &str) -> Option<Self::Surface>;
}

/// The host element: its size and the marquee overlay drawn over it
pub trait HostSurface {
    /// Size in CSS pixels
    fn size(&self) -> (f64, f64);
    fn show_marquee(&mut self, rect: &ScreenRect);
    fn hide_marquee(&mut self);
}

/// Draws a frame
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame<'_>);
}

/// One mesh node ready to draw, in world coordinates
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub node: NodeKey,
    /// Entity the node belongs to, if any
    pub entity: Option<EntityRef>,
    pub mesh: Mesh,
    pub material: Material,
    pub highlight: Option<HighlightLevel>,
    /// Edge outline color for highlighted nodes
    pub outline: Option<Rgb>,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub view_projection: Matrix4<f64>,
    pub camera_mode: CameraMode,
    pub background: Rgb,
    pub items: &'a [RenderItem],
}

/// Scene state that selection reads while it is being mutated
#[derive(Debug)]
struct World {
    scene: Scene,
    registry: EntityRegistry,
    layout: FloorLayout,
    camera: CameraDirector,
}

impl World {
    fn ctx(&self, viewport: (f64, f64)) -> SelectionContext<'_> {
        SelectionContext {
            scene: &self.scene,
            registry: &self.registry,
            camera: &self.camera,
            viewport,
        }
    }
}

pub struct FloorplanViewer<S: HostSurface> {
    surface: S,
    config: EngineConfig,
    theme: Theme,
    world: World,
    selection: SelectionEngine,
    pipeline: ScenePipeline,
    events: EventBus,
    plan: Option<Floorplan>,
}

impl<S: HostSurface> FloorplanViewer<S> {
    /// Attach to a host container.
    ///
    /// Fails with [`Error::MissingContainer`] before anything is created
    /// when the container does not exist.
    pub fn mount<L>(lookup: &L, container_id: &str, config: EngineConfig) -> Result<Self>
    where
        L: ContainerLookup<Surface = S>,
    {
        let surface = lookup
            .find(container_id)
            .ok_or_else(|| Error::MissingContainer(container_id.to_string()))?;

        let mut camera = CameraDirector::new(&config);
        let (w, h) = surface.size();
        if h > 0.0 {
            camera.set_aspect(w / h);
        }
        tracing::info!(container_id, width = w, height = h, "viewer mounted");

        Ok(Self {
            surface,
            theme: config.theme,
            world: World {
                scene: Scene::new(),
                registry: EntityRegistry::new(),
                layout: FloorLayout::new(),
                camera,
            },
            selection: SelectionEngine::new(&config),
            pipeline: ScenePipeline::new(&config),
            events: EventBus::new(),
            plan: None,
            config,
        })
    }

    /// Replace the scene construction strategies
    pub fn with_pipeline(mut self, pipeline: ScenePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scene(&self) -> &Scene {
        &self.world.scene
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.world.registry
    }

    pub fn layout(&self) -> &FloorLayout {
        &self.world.layout
    }

    pub fn camera(&self) -> &CameraDirector {
        &self.world.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraDirector {
        &mut self.world.camera
    }

    pub fn floorplan(&self) -> Option<&Floorplan> {
        self.plan.as_ref()
    }

    // Events

    pub fn subscribe(&mut self, listener: impl FnMut(&ViewerEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn emit(&mut self, event: Option<ViewerEvent>) {
        if let Some(event) = event {
            self.events.emit(&event);
        }
    }

    // Loading

    pub fn load_json(&mut self, json: &str) -> Result<BuildReport> {
        let plan = Floorplan::from_json(json)?;
        Ok(self.load(plan))
    }

    /// Rebuild everything from `plan`, keeping the selection where the same
    /// entities still exist.
    pub fn load(&mut self, plan: Floorplan) -> BuildReport {
        let first_load = self.plan.is_none();
        let snapshot = self.selection.snapshot(&self.world.registry);
        let report = self.rebuild(&plan);
        self.plan = Some(plan);

        let loaded = ViewerEvent::Loaded {
            floors: report.floors.len(),
            entities: self.world.registry.len(),
        };
        self.events.emit(&loaded);

        let viewport = self.surface.size();
        let event = self.selection.restore(&self.world.ctx(viewport), &snapshot);
        self.emit(event);

        if first_load {
            self.focus_all();
        }
        report
    }

    /// Regenerate scene and registry; hidden floors stay hidden.
    fn rebuild(&mut self, plan: &Floorplan) -> BuildReport {
        let hidden = self.world.layout.hidden_ids();
        self.selection.detach();
        self.world.scene.clear();
        self.world.registry.clear();
        self.world.layout.reset();

        let report = self.pipeline.build(
            plan,
            &self.theme.palette(),
            BuildTarget {
                scene: &mut self.world.scene,
                registry: &mut self.world.registry,
                layout: &mut self.world.layout,
            },
        );

        for id in hidden {
            if let Some(node) = self.world.layout.set_visible(&id, false) {
                self.world.scene.set_visible(node, false);
            }
        }
        report
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;

        // base materials come from the palette, so the scene is regenerated
        if let Some(plan) = self.plan.take() {
            let snapshot = self.selection.snapshot(&self.world.registry);
            self.rebuild(&plan);
            self.plan = Some(plan);
            let viewport = self.surface.size();
            let event = self.selection.restore(&self.world.ctx(viewport), &snapshot);
            self.emit(event);
        }
        self.events.emit(&ViewerEvent::ThemeChanged { theme });
    }

    // Per-frame work

    /// Advance one frame: camera tween, then selection pruning, then render.
    pub fn frame(&mut self, dt: f64, renderer: &mut dyn Renderer) {
        self.world.camera.update(dt);

        let viewport = self.surface.size();
        let event = self.selection.prune(&self.world.ctx(viewport));
        self.emit(event);

        let items = self.visible_meshes();
        let frame = RenderFrame {
            view_projection: self.world.camera.view_projection(),
            camera_mode: self.world.camera.mode(),
            background: self.theme.palette().background,
            items: &items,
        };
        renderer.render(&frame);
    }

    /// Every visible mesh with highlight state applied
    pub fn visible_meshes(&mut self) -> Vec<RenderItem> {
        self.selection
            .apply_highlights(&mut self.world.scene, &self.world.registry);
        let palette = self.theme.palette();
        let world = &self.world;

        world
            .scene
            .visible_mesh_nodes()
            .into_iter()
            .filter_map(|key| {
                let node = world.scene.node(key)?;
                let mesh = world.scene.world_mesh(key)?;
                let entity_key = world.registry.find_selectable_ancestor(&world.scene, key);
                let entity = entity_key.and_then(|k| world.registry.reference(k).cloned());

                let mut material = node.material.unwrap_or_else(|| Material::solid(palette.wall));
                let outline = match node.highlight {
                    Some(HighlightLevel::Primary) => {
                        let own_room = entity.as_ref().is_some_and(|e| e.entity_type == EntityType::Room)
                            && entity_key.and_then(|k| world.registry.get(k)).is_some_and(|e| e.node == key);
                        if own_room {
                            material.emissive = palette.glow;
                        }
                        Some(palette.selection)
                    }
                    Some(HighlightLevel::Secondary) => Some(palette.selection),
                    Some(HighlightLevel::Hover) => Some(palette.hover),
                    None => None,
                };

                Some(RenderItem {
                    node: key,
                    entity,
                    mesh,
                    material,
                    highlight: node.highlight,
                    outline,
                })
            })
            .collect()
    }

    // Selection API

    pub fn selection(&self) -> Vec<EntityRef> {
        self.selection.selection(&self.world.registry)
    }

    pub fn set_selection(&mut self, refs: &[EntityRef]) {
        let viewport = self.surface.size();
        let event = self
            .selection
            .set_selection(&self.world.ctx(viewport), refs, ChangeSource::Api);
        self.emit(event);
    }

    /// Like [`Self::set_selection`], but fails with
    /// [`Error::UnknownEntity`] on the first reference the scene does not
    /// contain, leaving the selection untouched.
    pub fn try_set_selection(&mut self, refs: &[EntityRef]) -> Result<()> {
        if let Some(missing) = refs.iter().find(|r| self.world.registry.resolve(r).is_none()) {
            return Err(Error::UnknownEntity(missing.clone()));
        }
        self.set_selection(refs);
        Ok(())
    }

    pub fn select_all(&mut self) {
        let viewport = self.surface.size();
        let event = self
            .selection
            .select_all(&self.world.ctx(viewport), ChangeSource::Api);
        self.emit(event);
    }

    pub fn clear_selection(&mut self) {
        let viewport = self.surface.size();
        let event = self.selection.clear(&self.world.ctx(viewport), ChangeSource::Api);
        self.emit(event);
    }

    // Floors

    pub fn set_floor_visible(&mut self, floor_id: &str, visible: bool) -> Result<()> {
        if self.world.layout.get(floor_id).is_none() {
            return Err(Error::UnknownFloor(floor_id.to_string()));
        }
        if let Some(node) = self.world.layout.set_visible(floor_id, visible) {
            self.world.scene.set_visible(node, visible);
            self.events.emit(&ViewerEvent::FloorVisibilityChanged {
                floor_id: floor_id.to_string(),
                visible,
            });
        }
        Ok(())
    }

    /// Show `floor_id` and hide every other floor
    pub fn show_only_floor(&mut self, floor_id: &str) -> Result<()> {
        if self.world.layout.get(floor_id).is_none() {
            return Err(Error::UnknownFloor(floor_id.to_string()));
        }
        let ids: Vec<String> = self
            .world
            .layout
            .floors()
            .iter()
            .map(|f| f.id.clone())
            .collect();
        for id in ids {
            let visible = id == floor_id;
            self.set_floor_visible(&id, visible)?;
        }
        Ok(())
    }

    // Camera

    pub fn toggle_camera_mode(&mut self) -> CameraMode {
        let mode = self.world.camera.toggle_mode();
        self.events.emit(&ViewerEvent::CameraModeChanged { mode });
        mode
    }

    /// Frame the selection, or the whole visible scene when nothing is
    /// selected. Returns false when there is nothing to frame.
    pub fn focus_selection(&mut self) -> bool {
        let world = &self.world;
        let boxes: Vec<Aabb> = self
            .selection
            .selected_keys(&world.registry)
            .into_iter()
            .filter_map(|k| world.registry.get(k))
            .map(|e| world.scene.world_bounds(e.node))
            .collect();
        if boxes.is_empty() {
            return self.focus_all();
        }
        let padding = self.config.focus_padding;
        self.world.camera.focus_on_objects(&boxes, padding)
    }

    fn focus_all(&mut self) -> bool {
        let world = &self.world;
        let boxes: Vec<Aabb> = world
            .layout
            .floors()
            .iter()
            .filter(|f| f.visible)
            .map(|f| world.scene.world_bounds(f.node))
            .collect();
        let padding = self.config.focus_padding;
        self.world.camera.focus_on_objects(&boxes, padding)
    }

    /// Screen position of a world point, for label overlays
    pub fn project_to_screen(&self, point: &Point3<f64>) -> Option<(f64, f64)> {
        let ndc = self.world.camera.project_to_ndc(point)?;
        let (w, h) = self.surface.size();
        Some(((ndc.x + 1.0) / 2.0 * w, (1.0 - ndc.y) / 2.0 * h))
    }

    /// The host container changed size
    pub fn resize(&mut self) {
        let (w, h) = self.surface.size();
        if w > 0.0 && h > 0.0 {
            self.world.camera.set_aspect(w / h);
        }
    }

    // Input

    pub fn pointer_down(&mut self, input: PointerInput) {
        self.selection.pointer_down(input);
        self.world.camera.set_orbit_enabled(false);
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let viewport = self.surface.size();
        if let Some(rect) = self.selection.pointer_move(&self.world.ctx(viewport), input) {
            self.surface.show_marquee(&rect);
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        let viewport = self.surface.size();
        let up = self.selection.pointer_up(&self.world.ctx(viewport), input);
        self.world.camera.set_orbit_enabled(true);
        if up.hide_marquee {
            self.surface.hide_marquee();
        }
        self.emit(up.event);
    }

    pub fn pointer_leave(&mut self) {
        self.selection.pointer_leave();
    }

    /// Returns true when the host should suppress the key's default action.
    pub fn key_down(&mut self, input: &KeyInput) -> bool {
        let viewport = self.surface.size();
        let response = self.selection.handle_key(&self.world.ctx(viewport), input);
        self.emit(response.event);
        response.handled
    }

    /// Tear down. Listeners go first so nothing observes the half-cleared
    /// state.
    pub fn dispose(&mut self) {
        self.events.clear();
        self.selection.reset();
        self.world.registry.clear();
        self.world.scene.clear();
        self.world.layout.reset();
        self.surface.hide_marquee();
        self.plan = None;
        tracing::debug!("viewer disposed");
    }
}
