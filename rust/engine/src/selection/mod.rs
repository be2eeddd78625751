// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection engine.
//!
//! Turns pointer and keyboard input into selection changes. The primary
//! set holds what the user picked; the secondary tier is derived from it by
//! expanding every primary entity to its registered descendants. Hover is
//! tracked separately and never produces a selection event.
//!
//! All state is keyed by [`EntityKey`], which is only valid for the current
//! registry generation. [`SelectionEngine::snapshot`] and
//! [`SelectionEngine::restore`] carry a selection across a reload by
//! [`EntityRef`].

mod gesture;
mod keyboard;

pub use gesture::{Gesture, GestureEnd, PointerInput, ScreenRect};
pub use keyboard::{KeyAction, KeyInput, KeyResponse};

use floorplan_geometry::Point2;
use rustc_hash::FxHashSet;

use crate::camera::{screen_to_ndc, CameraDirector};
use crate::config::{EngineConfig, MarqueeMode};
use crate::events::{ChangeSource, ViewerEvent};
use crate::keys::EntityKey;
use crate::model::EntityRef;
use crate::registry::EntityRegistry;
use crate::scene::{HighlightLevel, Scene};

/// Borrowed view of everything selection needs to resolve input
#[derive(Clone, Copy)]
pub struct SelectionContext<'a> {
    pub scene: &'a Scene,
    pub registry: &'a EntityRegistry,
    pub camera: &'a CameraDirector,
    /// Viewport size in CSS pixels
    pub viewport: (f64, f64),
}

impl SelectionContext<'_> {
    /// Registered and visible through its whole ancestor chain
    pub fn is_visible(&self, key: EntityKey) -> bool {
        self.registry
            .get(key)
            .is_some_and(|e| self.scene.is_visible_in_hierarchy(e.node))
    }

    fn to_screen(&self, ndc: Point2<f64>) -> (f64, f64) {
        let (w, h) = self.viewport;
        ((ndc.x + 1.0) / 2.0 * w, (1.0 - ndc.y) / 2.0 * h)
    }

    /// Screen-space bound of an entity's world box, ignoring corners
    /// behind the camera. `None` when nothing is in front.
    pub fn screen_bounds(&self, key: EntityKey) -> Option<ScreenRect> {
        let entity = self.registry.get(key)?;
        let bounds = self.scene.world_bounds(entity.node);
        if bounds.is_empty() {
            return None;
        }

        let mut rect: Option<ScreenRect> = None;
        for corner in bounds.corners() {
            let Some(ndc) = self.camera.project_to_ndc(&corner) else {
                continue;
            };
            let p = self.to_screen(ndc);
            rect = Some(match rect {
                None => ScreenRect::from_corners(p, p),
                Some(r) => ScreenRect {
                    min_x: r.min_x.min(p.0),
                    min_y: r.min_y.min(p.1),
                    max_x: r.max_x.max(p.0),
                    max_y: r.max_y.max(p.1),
                },
            });
        }
        rect
    }
}

/// Result of [`SelectionEngine::pointer_up`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerUp {
    pub event: Option<ViewerEvent>,
    /// A marquee overlay was showing and should be removed
    pub hide_marquee: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionEngine {
    click_threshold: f64,
    marquee_mode: MarqueeMode,
    live_preview: bool,
    hierarchical: bool,
    gesture: Gesture,
    primary: FxHashSet<EntityKey>,
    secondary: FxHashSet<EntityKey>,
    /// Descendants shift-clicked out of the secondary tier; expansion skips
    /// them and their subtrees
    excluded: FxHashSet<EntityKey>,
    hovered: FxHashSet<EntityKey>,
    /// Last entity reached by Tab cycling
    cursor: Option<EntityKey>,
    /// Selection as last reported to listeners
    published: Vec<EntityRef>,
}

impl SelectionEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            click_threshold: config.click_threshold_px.max(0.0),
            marquee_mode: config.marquee_mode,
            live_preview: config.live_marquee_preview,
            hierarchical: config.hierarchical_selection,
            gesture: Gesture::Idle,
            primary: FxHashSet::default(),
            secondary: FxHashSet::default(),
            excluded: FxHashSet::default(),
            hovered: FxHashSet::default(),
            cursor: None,
            published: Vec::new(),
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.gesture.is_pressed()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    pub fn marquee_mode(&self) -> MarqueeMode {
        self.marquee_mode
    }

    pub fn set_marquee_mode(&mut self, mode: MarqueeMode) {
        self.marquee_mode = mode;
    }

    pub fn level(&self, key: EntityKey) -> Option<HighlightLevel> {
        if self.primary.contains(&key) {
            Some(HighlightLevel::Primary)
        } else if self.secondary.contains(&key) {
            Some(HighlightLevel::Secondary)
        } else if self.hovered.contains(&key) {
            Some(HighlightLevel::Hover)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Primary and secondary entities in registration order
    pub fn selected_keys(&self, registry: &EntityRegistry) -> Vec<EntityKey> {
        registry
            .all_entities()
            .iter()
            .copied()
            .filter(|k| self.primary.contains(k) || self.secondary.contains(k))
            .collect()
    }

    pub fn primary_keys(&self, registry: &EntityRegistry) -> Vec<EntityKey> {
        registry
            .all_entities()
            .iter()
            .copied()
            .filter(|k| self.primary.contains(k))
            .collect()
    }

    pub fn hovered_keys(&self, registry: &EntityRegistry) -> Vec<EntityKey> {
        registry
            .all_entities()
            .iter()
            .copied()
            .filter(|k| self.hovered.contains(k))
            .collect()
    }

    /// Current selection (primary and secondary) as stable identifiers
    pub fn selection(&self, registry: &EntityRegistry) -> Vec<EntityRef> {
        self.selected_keys(registry)
            .into_iter()
            .filter_map(|k| registry.reference(k).cloned())
            .collect()
    }

    // Pointer gestures

    pub fn pointer_down(&mut self, input: PointerInput) {
        self.gesture.press(input);
    }

    /// Track the pointer. Returns the marquee rectangle to display while a
    /// drag is in progress.
    pub fn pointer_move(&mut self, ctx: &SelectionContext<'_>, input: PointerInput) -> Option<ScreenRect> {
        if !self.gesture.is_pressed() {
            self.hovered.clear();
            if let Some(key) = self.pick(ctx, input.x, input.y) {
                self.hovered.insert(key);
            }
            return None;
        }

        let rect = self.gesture.drag(input, self.click_threshold)?;
        if self.live_preview {
            self.hovered = self.marquee_matches(ctx, &rect).into_iter().collect();
        }
        Some(rect)
    }

    pub fn pointer_up(&mut self, ctx: &SelectionContext<'_>, input: PointerInput) -> PointerUp {
        let hide_marquee = self.gesture.is_dragging();
        let Some(end) = self.gesture.release(input, self.click_threshold) else {
            return PointerUp::default();
        };

        self.hovered.clear();
        let event = match end {
            GestureEnd::Click { x, y, shift } => self.click(ctx, x, y, shift),
            GestureEnd::Marquee { rect, additive } => self.marquee(ctx, &rect, additive),
        };
        PointerUp { event, hide_marquee }
    }

    /// Pointer left the viewport without a press in progress
    pub fn pointer_leave(&mut self) {
        if !self.gesture.is_pressed() {
            self.hovered.clear();
        }
    }

    /// Nearest visible registered entity under a screen position
    pub fn pick(&self, ctx: &SelectionContext<'_>, x: f64, y: f64) -> Option<EntityKey> {
        let (w, h) = ctx.viewport;
        let ray = ctx.camera.ray_from_screen(screen_to_ndc(x, y, w, h));
        ctx.scene
            .raycast(&ray)
            .iter()
            .filter(|hit| ctx.scene.is_visible_in_hierarchy(hit.node))
            .find_map(|hit| ctx.registry.find_selectable_ancestor(ctx.scene, hit.node))
    }

    pub fn click(&mut self, ctx: &SelectionContext<'_>, x: f64, y: f64, shift: bool) -> Option<ViewerEvent> {
        match (self.pick(ctx, x, y), shift) {
            (Some(key), true) => {
                // a toggled-off entity stays out of the expansion too
                if self.primary.remove(&key) || self.secondary.contains(&key) {
                    self.excluded.insert(key);
                } else {
                    self.excluded.remove(&key);
                    self.primary.insert(key);
                }
            }
            (Some(key), false) => {
                self.replace_primary([key]);
            }
            (None, false) => self.replace_primary([]),
            (None, true) => return None,
        }
        self.publish(ctx, ChangeSource::Click)
    }

    /// Visible entities whose screen bound passes the marquee predicate,
    /// in registration order
    pub fn marquee_matches(&self, ctx: &SelectionContext<'_>, rect: &ScreenRect) -> Vec<EntityKey> {
        ctx.registry
            .all_entities()
            .iter()
            .copied()
            .filter(|&k| ctx.is_visible(k))
            .filter(|&k| {
                ctx.screen_bounds(k).is_some_and(|bounds| match self.marquee_mode {
                    MarqueeMode::Intersection => rect.intersects(&bounds),
                    MarqueeMode::Containment => rect.contains(&bounds),
                })
            })
            .collect()
    }

    pub fn marquee(&mut self, ctx: &SelectionContext<'_>, rect: &ScreenRect, additive: bool) -> Option<ViewerEvent> {
        let matches = self.marquee_matches(ctx, rect);
        tracing::debug!(matches = matches.len(), additive, "marquee");
        if additive {
            for key in &matches {
                self.excluded.remove(key);
            }
            self.primary.extend(matches);
        } else {
            self.replace_primary(matches);
        }
        self.publish(ctx, ChangeSource::Marquee)
    }

    // Programmatic selection

    /// Select every visible entity
    pub fn select_all(&mut self, ctx: &SelectionContext<'_>, source: ChangeSource) -> Option<ViewerEvent> {
        let visible: Vec<EntityKey> = ctx
            .registry
            .all_entities()
            .iter()
            .copied()
            .filter(|&k| ctx.is_visible(k))
            .collect();
        self.replace_primary(visible);
        self.publish(ctx, source)
    }

    pub fn clear(&mut self, ctx: &SelectionContext<'_>, source: ChangeSource) -> Option<ViewerEvent> {
        self.replace_primary([]);
        self.cursor = None;
        self.publish(ctx, source)
    }

    /// Replace the selection. Unknown or hidden entities are ignored.
    pub fn set_selection(
        &mut self,
        ctx: &SelectionContext<'_>,
        refs: &[EntityRef],
        source: ChangeSource,
    ) -> Option<ViewerEvent> {
        let keys = self.resolve_visible(ctx, refs);
        self.replace_primary(keys);
        self.publish(ctx, source)
    }

    /// Drop selected and hovered entities that are no longer visible.
    pub fn prune(&mut self, ctx: &SelectionContext<'_>) -> Option<ViewerEvent> {
        self.hovered.retain(|&k| ctx.is_visible(k));
        let before = self.primary.len();
        self.primary.retain(|&k| ctx.is_visible(k));
        if self.primary.len() != before {
            tracing::debug!(dropped = before - self.primary.len(), "pruned hidden selection");
        }
        self.publish(ctx, ChangeSource::Visibility)
    }

    /// Primary selection as identifiers, for carrying across a reload
    pub fn snapshot(&self, registry: &EntityRegistry) -> Vec<EntityRef> {
        self.primary_keys(registry)
            .into_iter()
            .filter_map(|k| registry.reference(k).cloned())
            .collect()
    }

    /// Drop all key-based state; the registry is about to be rebuilt.
    ///
    /// What listeners last saw is kept so [`Self::restore`] can tell
    /// whether the reload changed anything.
    pub fn detach(&mut self) {
        self.gesture.cancel();
        self.primary.clear();
        self.secondary.clear();
        self.excluded.clear();
        self.hovered.clear();
        self.cursor = None;
    }

    /// Re-resolve a snapshot against the rebuilt registry
    pub fn restore(&mut self, ctx: &SelectionContext<'_>, snapshot: &[EntityRef]) -> Option<ViewerEvent> {
        self.detach();
        self.primary = self.resolve_visible(ctx, snapshot);
        let dropped = snapshot.len().saturating_sub(self.primary.len());
        if dropped > 0 {
            tracing::debug!(dropped, "selection entries missing after reload");
        }
        self.publish(ctx, ChangeSource::Reload)
    }

    /// Forget everything, including what was last published
    pub fn reset(&mut self) {
        self.detach();
        self.published.clear();
    }

    // Keyboard

    pub fn handle_key(&mut self, ctx: &SelectionContext<'_>, input: &KeyInput) -> KeyResponse {
        let Some(action) = input.action() else {
            return KeyResponse::ignored();
        };

        let event = match action {
            KeyAction::SelectAll => self.select_all(ctx, ChangeSource::Keyboard),
            KeyAction::Clear => self.clear(ctx, ChangeSource::Keyboard),
            KeyAction::Cycle { backward } => self.cycle(ctx, backward),
            KeyAction::FocusProperties => {
                let selection = self.selection(ctx.registry);
                (!selection.is_empty()).then_some(ViewerEvent::FocusProperties { selection })
            }
        };
        KeyResponse::handled(event)
    }

    /// Select the next (or previous) visible entity in registration order.
    pub fn cycle(&mut self, ctx: &SelectionContext<'_>, backward: bool) -> Option<ViewerEvent> {
        let candidates: Vec<EntityKey> = ctx
            .registry
            .all_entities()
            .iter()
            .copied()
            .filter(|&k| ctx.is_visible(k))
            .collect();

        let anchor = self
            .cursor
            .filter(|k| self.primary.contains(k))
            .or_else(|| candidates.iter().copied().find(|k| self.primary.contains(k)));
        let current = anchor.and_then(|a| candidates.iter().position(|&k| k == a));
        let next = keyboard::cycle_index(current, candidates.len(), backward)?;

        let key = candidates[next];
        self.cursor = Some(key);
        self.replace_primary([key]);
        self.publish(ctx, ChangeSource::Keyboard)
    }

    // Highlighting

    /// Write highlight levels onto the scene. Unregistered descendants of an
    /// entity (door frames, lift door panels) share its level.
    pub fn apply_highlights(&self, scene: &mut Scene, registry: &EntityRegistry) {
        scene.clear_highlights();
        for &key in registry.all_entities() {
            let Some(level) = self.level(key) else {
                continue;
            };
            let Some(entity) = registry.get(key) else {
                continue;
            };

            let mut stack = vec![entity.node];
            while let Some(node_key) = stack.pop() {
                let Some(node) = scene.node_mut(node_key) else {
                    continue;
                };
                node.highlight = Some(level);
                let children = node.children.clone();
                stack.extend(
                    children
                        .into_iter()
                        .filter(|&c| registry.entity_for_node(c).is_none()),
                );
            }
        }
    }

    /// Non-additive change: new primary set, exclusions forgotten
    fn replace_primary(&mut self, keys: impl IntoIterator<Item = EntityKey>) {
        self.primary.clear();
        self.primary.extend(keys);
        self.excluded.clear();
    }

    fn resolve_visible(&self, ctx: &SelectionContext<'_>, refs: &[EntityRef]) -> FxHashSet<EntityKey> {
        refs.iter()
            .filter_map(|r| ctx.registry.resolve(r))
            .filter(|&k| ctx.is_visible(k))
            .collect()
    }

    /// Rebuild the secondary tier from the primary set
    fn expand(&mut self, ctx: &SelectionContext<'_>) {
        self.secondary.clear();
        if !self.hierarchical {
            return;
        }
        let mut stack: Vec<EntityKey> = self
            .primary
            .iter()
            .flat_map(|&k| ctx.registry.children_of(k).iter().copied())
            .collect();
        while let Some(key) = stack.pop() {
            if self.primary.contains(&key) || self.excluded.contains(&key) || !ctx.is_visible(key) {
                continue;
            }
            if self.secondary.insert(key) {
                stack.extend(ctx.registry.children_of(key).iter().copied());
            }
        }
    }

    /// Recompute the secondary tier and emit an event when the visible
    /// selection differs from the last one reported.
    fn publish(&mut self, ctx: &SelectionContext<'_>, source: ChangeSource) -> Option<ViewerEvent> {
        self.expand(ctx);
        let selection = self.selection(ctx.registry);
        if same_members(&selection, &self.published) {
            return None;
        }
        tracing::debug!(count = selection.len(), ?source, "selection changed");
        self.published = selection.clone();
        Some(ViewerEvent::SelectionChanged { selection, source })
    }
}

fn same_members(a: &[EntityRef], b: &[EntityRef]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let set: FxHashSet<&EntityRef> = b.iter().collect();
    a.iter().all(|r| set.contains(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::NodeKey;
    use crate::model::EntityType;
    use crate::theme::Material;
    use floorplan_geometry::{box_mesh, Aabb, Point3};

    struct Fixture {
        scene: Scene,
        registry: EntityRegistry,
        camera: CameraDirector,
        upper: NodeKey,
        room: EntityKey,
        wall: EntityKey,
        stair: EntityKey,
        upper_room: EntityKey,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = Scene::new();
            let mut registry = EntityRegistry::new();
            let camera = CameraDirector::new(&EngineConfig::default());
            let lower = scene.add_group(scene.root(), "floor f0");
            let upper = scene.add_group(scene.root(), "floor f1");
            let mat = Material::solid([0.5; 3]);
            let cube = |x: f64, z: f64| {
                box_mesh(&Aabb::new(Point3::new(x, 0.0, z), Point3::new(x + 1.0, 1.0, z + 1.0)))
            };

            let room_node = scene.add_mesh(lower, "room r1", cube(-3.0, -0.5), mat);
            let wall_node = scene.add_mesh(room_node, "wall r1:top", cube(-3.0, -3.0), mat);
            let stair_node = scene.add_mesh(lower, "stair s1", cube(-0.5, -0.5), mat);
            let upper_node = scene.add_mesh(upper, "room r2", cube(2.0, -0.5), mat);

            let room = registry.register(room_node, EntityType::Room, "r1", "f0", None);
            let wall = registry.register(wall_node, EntityType::Wall, "r1:top", "f0", Some(room));
            let stair = registry.register(stair_node, EntityType::Stair, "s1", "f0", None);
            let upper_room = registry.register(upper_node, EntityType::Room, "r2", "f1", None);

            Self {
                scene,
                registry,
                camera,
                upper,
                room,
                wall,
                stair,
                upper_room,
            }
        }

        fn ctx(&self) -> SelectionContext<'_> {
            SelectionContext {
                scene: &self.scene,
                registry: &self.registry,
                camera: &self.camera,
                viewport: (800.0, 800.0),
            }
        }

        /// Screen position of the center of an entity's own mesh
        fn screen_of(&self, key: EntityKey) -> (f64, f64) {
            let node = self.registry.get(key).unwrap().node;
            let center = self.scene.world_mesh(node).unwrap().bounds().center();
            let ndc = self.camera.project_to_ndc(&center).unwrap();
            self.ctx().to_screen(ndc)
        }

        fn selected(&self, engine: &SelectionEngine) -> Vec<EntityKey> {
            engine.selected_keys(&self.registry)
        }
    }

    fn engine() -> SelectionEngine {
        SelectionEngine::new(&EngineConfig::default())
    }

    #[test]
    fn click_replaces_and_shift_toggles() {
        let fx = Fixture::new();
        let mut sel = engine();
        let (ax, ay) = fx.screen_of(fx.room);
        let (bx, by) = fx.screen_of(fx.stair);

        assert!(sel.click(&fx.ctx(), ax, ay, false).is_some());
        assert!(sel.click(&fx.ctx(), bx, by, true).is_some());
        let event = sel.click(&fx.ctx(), ax, ay, true);
        assert!(matches!(
            event,
            Some(ViewerEvent::SelectionChanged {
                source: ChangeSource::Click,
                ..
            })
        ));
        assert_eq!(fx.selected(&sel), vec![fx.stair]);
    }

    #[test]
    fn room_expands_to_secondary_walls() {
        let mut fx = Fixture::new();
        let mut sel = engine();
        let (ax, ay) = fx.screen_of(fx.room);
        sel.click(&fx.ctx(), ax, ay, false);

        assert_eq!(fx.selected(&sel), vec![fx.room, fx.wall]);
        assert_eq!(sel.level(fx.room), Some(HighlightLevel::Primary));
        assert_eq!(sel.level(fx.wall), Some(HighlightLevel::Secondary));

        sel.apply_highlights(&mut fx.scene, &fx.registry);
        let wall_node = fx.registry.get(fx.wall).unwrap().node;
        assert_eq!(
            fx.scene.node(wall_node).unwrap().highlight,
            Some(HighlightLevel::Secondary)
        );
    }

    #[test]
    fn shift_click_toggles_a_secondary_wall() {
        let fx = Fixture::new();
        let mut sel = engine();
        let room = fx.registry.reference(fx.room).unwrap().clone();
        sel.set_selection(&fx.ctx(), &[room], ChangeSource::Api);
        assert_eq!(fx.selected(&sel), vec![fx.room, fx.wall]);

        let (wx, wy) = fx.screen_of(fx.wall);
        assert!(sel.click(&fx.ctx(), wx, wy, true).is_some());
        assert_eq!(fx.selected(&sel), vec![fx.room]);
        assert_eq!(sel.level(fx.wall), None);

        assert!(sel.click(&fx.ctx(), wx, wy, true).is_some());
        assert_eq!(fx.selected(&sel), vec![fx.room, fx.wall]);
        assert_eq!(sel.level(fx.wall), Some(HighlightLevel::Primary));
    }

    #[test]
    fn replacing_the_selection_forgets_exclusions() {
        let fx = Fixture::new();
        let mut sel = engine();
        let (ax, ay) = fx.screen_of(fx.room);
        let (wx, wy) = fx.screen_of(fx.wall);

        sel.click(&fx.ctx(), ax, ay, false);
        sel.click(&fx.ctx(), wx, wy, true);
        assert_eq!(fx.selected(&sel), vec![fx.room]);

        sel.click(&fx.ctx(), ax, ay, false);
        assert_eq!(fx.selected(&sel), vec![fx.room, fx.wall]);
    }

    #[test]
    fn empty_click_clears_unless_shift() {
        let fx = Fixture::new();
        let mut sel = engine();
        sel.select_all(&fx.ctx(), ChangeSource::Api);
        assert!(sel.click(&fx.ctx(), 2.0, 2.0, true).is_none());
        assert!(!sel.is_empty());
        assert!(sel.click(&fx.ctx(), 2.0, 2.0, false).is_some());
        assert!(sel.is_empty());
        // already empty: nothing to report
        assert!(sel.click(&fx.ctx(), 2.0, 2.0, false).is_none());
    }

    #[test]
    fn hidden_floor_is_excluded_from_select_all_and_marquee() {
        let mut fx = Fixture::new();
        fx.scene.set_visible(fx.upper, false);
        let mut sel = engine();

        sel.select_all(&fx.ctx(), ChangeSource::Api);
        assert_eq!(sel.selection(&fx.registry).len(), 3);

        sel.clear(&fx.ctx(), ChangeSource::Api);
        let full = ScreenRect::from_corners((0.0, 0.0), (800.0, 800.0));
        sel.marquee(&fx.ctx(), &full, false);
        assert_eq!(sel.selection(&fx.registry).len(), 3);
        assert!(!fx.selected(&sel).contains(&fx.upper_room));
    }

    #[test]
    fn containment_needs_the_whole_box() {
        let fx = Fixture::new();
        let mut sel = engine();
        let (bx, by) = fx.screen_of(fx.stair);
        let small = ScreenRect::from_corners((bx - 2.0, by - 2.0), (bx + 2.0, by + 2.0));

        assert_eq!(sel.marquee_matches(&fx.ctx(), &small), vec![fx.stair]);
        sel.set_marquee_mode(MarqueeMode::Containment);
        assert!(sel.marquee_matches(&fx.ctx(), &small).is_empty());
    }

    #[test]
    fn hiding_a_floor_prunes_once() {
        let mut fx = Fixture::new();
        let mut sel = engine();
        sel.select_all(&fx.ctx(), ChangeSource::Api);
        assert!(sel.prune(&fx.ctx()).is_none());

        fx.scene.set_visible(fx.upper, false);
        match sel.prune(&fx.ctx()) {
            Some(ViewerEvent::SelectionChanged { selection, source }) => {
                assert_eq!(source, ChangeSource::Visibility);
                assert_eq!(selection.len(), 3);
            }
            other => panic!("expected a visibility change, got {other:?}"),
        }
        assert!(sel.prune(&fx.ctx()).is_none());
    }

    #[test]
    fn small_wobble_is_a_click() {
        let fx = Fixture::new();
        let mut sel = engine();
        let (bx, by) = fx.screen_of(fx.stair);

        sel.pointer_down(PointerInput::new(bx, by));
        assert!(sel.is_pressed());
        assert!(sel.pointer_move(&fx.ctx(), PointerInput::new(bx + 3.0, by)).is_none());
        let up = sel.pointer_up(&fx.ctx(), PointerInput::new(bx + 3.0, by + 3.0));
        assert!(!up.hide_marquee);
        assert!(!sel.is_pressed());
        assert_eq!(fx.selected(&sel), vec![fx.stair]);
    }

    #[test]
    fn drag_previews_then_selects() {
        let fx = Fixture::new();
        let mut sel = engine();

        sel.pointer_down(PointerInput::new(0.0, 0.0));
        let rect = sel.pointer_move(&fx.ctx(), PointerInput::new(800.0, 800.0));
        assert!(rect.is_some());
        assert!(sel.is_dragging());
        assert_eq!(sel.hovered_keys(&fx.registry).len(), 4);
        assert!(sel.is_empty());

        let up = sel.pointer_up(&fx.ctx(), PointerInput::new(800.0, 800.0));
        assert!(up.hide_marquee);
        assert!(matches!(
            up.event,
            Some(ViewerEvent::SelectionChanged {
                source: ChangeSource::Marquee,
                ..
            })
        ));
        assert!(sel.hovered_keys(&fx.registry).is_empty());
        assert_eq!(sel.selection(&fx.registry).len(), 4);
    }

    #[test]
    fn idle_move_hovers_without_events() {
        let fx = Fixture::new();
        let mut sel = engine();
        let (bx, by) = fx.screen_of(fx.stair);
        assert!(sel.pointer_move(&fx.ctx(), PointerInput::new(bx, by)).is_none());
        assert_eq!(sel.level(fx.stair), Some(HighlightLevel::Hover));
        sel.pointer_leave();
        assert_eq!(sel.level(fx.stair), None);
    }

    #[test]
    fn tab_cycles_visible_entities_and_wraps() {
        let mut fx = Fixture::new();
        fx.scene.set_visible(fx.upper, false);
        let mut sel = engine();
        let tab = KeyInput::new("Tab");

        let order: Vec<EntityKey> = (0..4)
            .map(|_| {
                assert!(sel.handle_key(&fx.ctx(), &tab).handled);
                sel.primary_keys(&fx.registry)[0]
            })
            .collect();
        assert_eq!(order, vec![fx.room, fx.wall, fx.stair, fx.room]);

        sel.handle_key(&fx.ctx(), &KeyInput::new("Tab").with_shift());
        assert_eq!(sel.primary_keys(&fx.registry), vec![fx.stair]);
    }

    #[test]
    fn escape_enter_and_text_inputs() {
        let fx = Fixture::new();
        let mut sel = engine();

        assert!(sel.handle_key(&fx.ctx(), &KeyInput::new("Enter")).event.is_none());
        let ignored = sel.handle_key(&fx.ctx(), &KeyInput::new("a").with_ctrl().in_text_input());
        assert!(!ignored.handled);
        assert!(sel.is_empty());

        sel.handle_key(&fx.ctx(), &KeyInput::new("a").with_ctrl());
        assert_eq!(sel.selection(&fx.registry).len(), 4);
        let enter = sel.handle_key(&fx.ctx(), &KeyInput::new("Enter"));
        assert!(matches!(enter.event, Some(ViewerEvent::FocusProperties { .. })));

        let esc = sel.handle_key(&fx.ctx(), &KeyInput::new("Escape"));
        assert!(esc.event.is_some());
        assert!(sel.is_empty());
    }

    #[test]
    fn set_selection_skips_unknown_and_hidden() {
        let mut fx = Fixture::new();
        fx.scene.set_visible(fx.upper, false);
        let mut sel = engine();
        let refs = vec![
            EntityRef::new(EntityType::Stair, "s1", "f0"),
            EntityRef::new(EntityType::Room, "r2", "f1"),
            EntityRef::new(EntityType::Lift, "missing", "f0"),
        ];
        sel.set_selection(&fx.ctx(), &refs, ChangeSource::Api);
        assert_eq!(fx.selected(&sel), vec![fx.stair]);
    }

    #[test]
    fn restore_after_rebuild_reports_only_differences() {
        let fx = Fixture::new();
        let mut sel = engine();
        let refs = vec![EntityRef::new(EntityType::Stair, "s1", "f0")];
        sel.set_selection(&fx.ctx(), &refs, ChangeSource::Api);

        let snapshot = sel.snapshot(&fx.registry);
        let rebuilt = Fixture::new();
        assert!(sel.restore(&rebuilt.ctx(), &snapshot).is_none());
        assert_eq!(rebuilt.selected(&sel), vec![rebuilt.stair]);

        let mut gone = Fixture::new();
        gone.registry.clear();
        assert!(matches!(
            sel.restore(&gone.ctx(), &snapshot),
            Some(ViewerEvent::SelectionChanged {
                source: ChangeSource::Reload,
                ..
            })
        ));
    }
}
