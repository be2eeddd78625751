// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan Viewer WebAssembly Bindings
//!
//! JavaScript/TypeScript API for the floorplan viewer built with
//! wasm-bindgen. The host page owns the WebGL context; frames arrive at a JS
//! callback as plain mesh arrays.

use wasm_bindgen::prelude::*;

#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

mod api;
mod dom;
mod utils;

pub use api::FloorplanViewerHandle;
pub use dom::{DomLookup, DomSurface};
pub use utils::set_panic_hook as init_panic_hook;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the version of the viewer
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
