// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for the floorplan viewer
//!
//! Structured values cross the boundary as plain JS objects through
//! serde-wasm-bindgen; documents and config go in as JSON strings.

use floorplan_engine::theme::Rgb;
use floorplan_engine::{
    CameraMode, EngineConfig, EntityRef, FloorplanViewer, HighlightLevel, KeyInput, Material,
    PointerInput, RenderFrame, Renderer, SubscriptionId, Theme,
};
use floorplan_geometry::Point3;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::dom::{DomLookup, DomSurface};
use crate::utils::{console_error, js_error};

/// Interactive floorplan viewer bound to a DOM container
#[wasm_bindgen]
pub struct FloorplanViewerHandle {
    inner: FloorplanViewer<DomSurface>,
}

#[wasm_bindgen]
impl FloorplanViewerHandle {
    /// Mount into the element with id `container_id`.
    ///
    /// Throws when the container does not exist or the optional config JSON
    /// is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config_json: Option<String>) -> Result<FloorplanViewerHandle, JsError> {
        let config = match config_json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| JsError::new(&format!("Invalid config JSON: {}", e)))?,
            None => EngineConfig::default(),
        };
        let lookup = DomLookup::from_window().ok_or_else(|| JsError::new("No document available"))?;

        match FloorplanViewer::mount(&lookup, container_id, config) {
            Ok(inner) => Ok(Self { inner }),
            Err(err) => {
                console_error(&err.to_string());
                Err(js_error(err))
            }
        }
    }

    /// Build the scene from a floorplan JSON document.
    ///
    /// Returns the per-floor build report.
    #[wasm_bindgen]
    pub fn load(&mut self, floorplan_json: &str) -> Result<JsValue, JsError> {
        let report = self.inner.load_json(floorplan_json).map_err(js_error)?;
        serde_wasm_bindgen::to_value(&report.floors).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn theme(&self) -> String {
        theme_name(self.inner.theme())
    }

    /// `"light"` or `"dark"`
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&mut self, name: &str) -> Result<(), JsError> {
        let theme: Theme = serde_json::from_value(serde_json::Value::String(name.to_string()))
            .map_err(|_| JsError::new(&format!("Unknown theme: {}", name)))?;
        self.inner.set_theme(theme);
        Ok(())
    }

    // Events

    /// Register `callback(event)`; returns an id for `unsubscribe`.
    ///
    /// Callbacks run in a microtask after the call that raised the event
    /// returns, so they may call back into this handle (`getSelection()`,
    /// `dispose()`) without hitting a recursive borrow.
    #[wasm_bindgen]
    pub fn subscribe(&mut self, callback: js_sys::Function) -> f64 {
        let id = self.inner.subscribe(move |event| {
            let value = match serde_wasm_bindgen::to_value(event) {
                Ok(value) => value,
                Err(err) => {
                    console_error(&err.to_string());
                    return;
                }
            };
            let callback = callback.clone();
            spawn_local(async move {
                if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                    web_sys::console::error_1(&err);
                }
            });
        });
        id.as_u64() as f64
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&mut self, id: f64) -> bool {
        self.inner.unsubscribe(SubscriptionId::from_u64(id as u64))
    }

    // Selection

    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.inner.selection()).map_err(js_error)
    }

    /// Replace the selection with an array of `{entityType, entityId, floorId}`
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, refs: JsValue) -> Result<(), JsError> {
        let refs: Vec<EntityRef> = serde_wasm_bindgen::from_value(refs).map_err(js_error)?;
        self.inner.set_selection(&refs);
        Ok(())
    }

    /// Like `setSelection`, but throws on a reference the scene does not
    /// contain and leaves the selection untouched
    #[wasm_bindgen(js_name = trySetSelection)]
    pub fn try_set_selection(&mut self, refs: JsValue) -> Result<(), JsError> {
        let refs: Vec<EntityRef> = serde_wasm_bindgen::from_value(refs).map_err(js_error)?;
        self.inner.try_set_selection(&refs).map_err(js_error)
    }

    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) {
        self.inner.select_all();
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    // Rendering

    /// Advance one animation frame; `render(frame)` receives the meshes.
    ///
    /// `render` runs synchronously and must not call back into the handle.
    #[wasm_bindgen]
    pub fn frame(&mut self, dt: f64, render: &js_sys::Function) {
        let mut renderer = JsRenderer { callback: render };
        self.inner.frame(dt, &mut renderer);
    }

    #[wasm_bindgen]
    pub fn resize(&mut self) {
        self.inner.resize();
    }

    /// `[x, y]` in container pixels, or undefined when behind the camera
    #[wasm_bindgen(js_name = projectToScreen)]
    pub fn project_to_screen(&self, x: f64, y: f64, z: f64) -> Option<Vec<f64>> {
        self.inner
            .project_to_screen(&Point3::new(x, y, z))
            .map(|(sx, sy)| vec![sx, sy])
    }

    // Input

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool) {
        self.inner.pointer_down(PointerInput::new(x, y).with_shift(shift));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool) {
        self.inner.pointer_move(PointerInput::new(x, y).with_shift(shift));
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, shift: bool) {
        self.inner.pointer_up(PointerInput::new(x, y).with_shift(shift));
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.inner.pointer_leave();
    }

    /// Returns true when the caller should `preventDefault()`
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, ctrl: bool, meta: bool, shift: bool, in_text_input: bool) -> bool {
        let input = KeyInput {
            key: key.to_string(),
            ctrl,
            meta,
            shift,
            target_is_text_input: in_text_input,
        };
        self.inner.key_down(&input)
    }

    // Floors and camera

    /// Array of `{id, base, height, visible}` from bottom to top
    #[wasm_bindgen]
    pub fn floors(&self) -> Result<JsValue, JsError> {
        let floors: Vec<FloorJs<'_>> = self
            .inner
            .layout()
            .floors()
            .iter()
            .map(|f| FloorJs {
                id: &f.id,
                base: f.base,
                height: f.height,
                visible: f.visible,
            })
            .collect();
        serde_wasm_bindgen::to_value(&floors).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setFloorVisible)]
    pub fn set_floor_visible(&mut self, floor_id: &str, visible: bool) -> Result<(), JsError> {
        self.inner.set_floor_visible(floor_id, visible).map_err(js_error)
    }

    #[wasm_bindgen(js_name = showOnlyFloor)]
    pub fn show_only_floor(&mut self, floor_id: &str) -> Result<(), JsError> {
        self.inner.show_only_floor(floor_id).map_err(js_error)
    }

    /// Returns the new mode, `"perspective"` or `"orthographic"`
    #[wasm_bindgen(js_name = toggleCameraMode)]
    pub fn toggle_camera_mode(&mut self) -> String {
        match self.inner.toggle_camera_mode() {
            CameraMode::Perspective => "perspective".to_string(),
            CameraMode::Orthographic => "orthographic".to_string(),
        }
    }

    #[wasm_bindgen(js_name = focusSelection)]
    pub fn focus_selection(&mut self) -> bool {
        self.inner.focus_selection()
    }

    /// Drop listeners, the scene and the marquee overlay
    #[wasm_bindgen]
    pub fn dispose(&mut self) {
        self.inner.dispose();
        self.inner.surface().detach();
    }
}

fn theme_name(theme: Theme) -> String {
    match theme {
        Theme::Light => "light".to_string(),
        Theme::Dark => "dark".to_string(),
    }
}

#[derive(Serialize)]
struct FloorJs<'a> {
    id: &'a str,
    base: f64,
    height: f64,
    visible: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameJs<'a> {
    /// Column-major, ready for WebGL uniforms
    view_projection: Vec<f64>,
    camera_mode: CameraMode,
    background: Rgb,
    items: Vec<ItemJs<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemJs<'a> {
    entity: Option<&'a EntityRef>,
    positions: &'a [f32],
    normals: &'a [f32],
    indices: &'a [u32],
    material: Material,
    highlight: Option<HighlightLevel>,
    outline: Option<Rgb>,
}

/// Hands each frame to a JS callback
struct JsRenderer<'a> {
    callback: &'a js_sys::Function,
}

impl Renderer for JsRenderer<'_> {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        let js = FrameJs {
            view_projection: frame.view_projection.as_slice().to_vec(),
            camera_mode: frame.camera_mode,
            background: frame.background,
            items: frame
                .items
                .iter()
                .map(|item| ItemJs {
                    entity: item.entity.as_ref(),
                    positions: &item.mesh.positions,
                    normals: &item.mesh.normals,
                    indices: &item.mesh.indices,
                    material: item.material,
                    highlight: item.highlight,
                    outline: item.outline,
                })
                .collect(),
        };

        match serde_wasm_bindgen::to_value(&js) {
            Ok(value) => {
                if let Err(err) = self.callback.call1(&JsValue::NULL, &value) {
                    web_sys::console::error_1(&err);
                }
            }
            Err(err) => console_error(&err.to_string()),
        }
    }
}
