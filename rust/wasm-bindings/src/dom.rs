// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DOM host: container lookup by element id and the marquee overlay

use floorplan_engine::{ContainerLookup, HostSurface, ScreenRect};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

const MARQUEE_CLASS: &str = "floorplan-marquee";

/// Finds viewer containers in the page document
pub struct DomLookup {
    document: Document,
}

impl DomLookup {
    pub fn from_window() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }
}

impl ContainerLookup for DomLookup {
    type Surface = DomSurface;

    fn find(&self, container_id: &str) -> Option<DomSurface> {
        let container: HtmlElement = self
            .document
            .get_element_by_id(container_id)?
            .dyn_into()
            .ok()?;

        let marquee: HtmlElement = self.document.create_element("div").ok()?.dyn_into().ok()?;
        marquee.set_class_name(MARQUEE_CLASS);
        let style = marquee.style();
        for (name, value) in [
            ("position", "absolute"),
            ("pointer-events", "none"),
            ("display", "none"),
            ("border", "1px dashed #2f6fde"),
            ("background", "rgba(47, 111, 222, 0.12)"),
        ] {
            let _ = style.set_property(name, value);
        }
        container.append_child(&marquee).ok()?;

        Some(DomSurface { container, marquee })
    }
}

/// A container element plus the marquee overlay appended to it
pub struct DomSurface {
    container: HtmlElement,
    marquee: HtmlElement,
}

impl DomSurface {
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Remove the overlay from the page
    pub fn detach(&self) {
        self.marquee.remove();
    }
}

impl HostSurface for DomSurface {
    fn size(&self) -> (f64, f64) {
        (
            self.container.client_width() as f64,
            self.container.client_height() as f64,
        )
    }

    fn show_marquee(&mut self, rect: &ScreenRect) {
        let style = self.marquee.style();
        let _ = style.set_property("left", &format!("{}px", rect.min_x));
        let _ = style.set_property("top", &format!("{}px", rect.min_y));
        let _ = style.set_property("width", &format!("{}px", rect.width()));
        let _ = style.set_property("height", &format!("{}px", rect.height()));
        let _ = style.set_property("display", "block");
    }

    fn hide_marquee(&mut self) {
        let _ = self.marquee.style().set_property("display", "none");
    }
}
