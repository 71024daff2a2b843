//! Element ids and measurement for droppables.
//!
//! Measurement goes through `web-sys` and only returns data when running
//! in the browser; other renderers get no geometry and should use
//! `InputMode::Native`.

use crate::block_tree::{ContainerKey, DropId, Droppable, Rect};

pub fn drop_dom_id(id: &DropId) -> String {
    match id {
        DropId::Slot { container, index } => slot_dom_id(container, *index),
        DropId::Group(group) => format!("zone-{group}"),
    }
}

pub fn slot_dom_id(container: &ContainerKey, index: usize) -> String {
    format!("slot-{container}-{index}")
}

#[cfg(target_arch = "wasm32")]
fn element(dom_id: &str) -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(dom_id)
}

#[cfg(target_arch = "wasm32")]
pub fn measure(dom_id: &str) -> Option<Rect> {
    let rect: web_sys::DomRect = element(dom_id)?.get_bounding_client_rect();
    Some(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn measure(_dom_id: &str) -> Option<Rect> {
    None
}

/// Rects for every droppable currently in the document.
pub fn measure_droppables(ids: &[DropId]) -> Vec<Droppable> {
    ids.iter()
        .filter_map(|id| {
            measure(&drop_dom_id(id)).map(|rect| Droppable {
                id: id.clone(),
                rect,
            })
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub fn focus(dom_id: &str) {
    use wasm_bindgen::JsCast;

    if let Some(el) = element(dom_id).and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok()) {
        let _ = el.focus();
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn focus(_dom_id: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_ids_are_distinct_per_droppable() {
        let top = DropId::Slot { container: ContainerKey::TopLevel, index: 2 };
        let child = DropId::Slot { container: ContainerKey::Group("g1".into()), index: 0 };
        assert_eq!(drop_dom_id(&top), "slot-top-level-2");
        assert_eq!(drop_dom_id(&child), "slot-group-g1-0");
        assert_eq!(drop_dom_id(&DropId::Group("g1".into())), "zone-g1");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn nothing_to_measure_outside_the_browser() {
        assert!(measure_droppables(&[DropId::Group("g1".into())]).is_empty());
    }
}
