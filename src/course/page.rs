use dioxus::prelude::*;
use std::collections::HashSet;

use super::field_editor::{FieldEditor, FIELD_EDIT_BUFFER};
use crate::app::Route;
use crate::block_tree::{
    find_block_by_id, from_json, insert_block, new_block, remove_block, to_json, Block, BlockId,
    BlockKind,
};
use crate::editor::{BlockTreeEditor, CourseView, EditorConfig, InputMode};

const DEMO_COURSE: &str = include_str!("demo_course.json");

#[derive(Clone, Debug, PartialEq)]
pub enum EditorMode {
    Editor,
    Preview,
}

#[derive(Clone, Debug)]
pub struct PageState {
    pub mode: EditorMode,
    pub input_mode: InputMode,
    pub selected_id: Option<BlockId>,
    /// Where the next added block goes: `None` is the top level.
    pub add_target: Option<BlockId>,
    pub unlocked_groups: HashSet<BlockId>,
    pub export: Option<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            mode: EditorMode::Editor,
            input_mode: InputMode::Pointer,
            selected_id: None,
            add_target: None,
            unlocked_groups: HashSet::new(),
            export: None,
        }
    }
}

fn demo_course() -> Vec<Block> {
    match from_json(DEMO_COURSE) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!(error = %e, "bundled demo course is invalid");
            Vec::new()
        }
    }
}

/// The canonical course tree. Only the page writes to it.
pub static COURSE: GlobalSignal<Vec<Block>> = Signal::global(demo_course);
pub static PAGE_STATE: GlobalSignal<PageState> = Signal::global(PageState::default);

#[component]
pub fn CoursePage() -> Element {
    let state = PAGE_STATE.read();
    let editor_bg = toggle_background(state.mode == EditorMode::Editor);
    let preview_bg = toggle_background(state.mode == EditorMode::Preview);
    let pointer_bg = toggle_background(state.input_mode == InputMode::Pointer);
    let native_bg = toggle_background(state.input_mode == InputMode::Native);
    let is_preview = state.mode == EditorMode::Preview;
    let editor_key = format!("{:?}", state.input_mode);
    let config = EditorConfig {
        input_mode: state.input_mode,
        ..EditorConfig::default()
    };
    let add_target_label = match &state.add_target {
        None => "top level".to_string(),
        Some(group) => find_block_by_id(&COURSE.read(), group)
            .map(|g| g.title.clone())
            .unwrap_or_else(|| group.to_string()),
    };
    let adding_to_group = state.add_target.is_some();
    let addable: Vec<BlockKind> = BlockKind::ALL
        .into_iter()
        .filter(|k| !(adding_to_group && *k == BlockKind::Group))
        .collect();

    rsx! {
        div {
            class: "course-page",
            style: "display: flex; height: 100vh; font-family: system-ui;",

            div {
                class: "toolbox",
                h2 { style: "margin: 0 0 16px 0; font-size: 18px;", "Course" }

                div {
                    class: "mode-toggle",
                    style: "margin-bottom: 16px; display: flex; gap: 8px;",
                    button {
                        onclick: move |_| set_mode(EditorMode::Editor),
                        style: "background: {editor_bg};",
                        "Editor"
                    }
                    button {
                        onclick: move |_| set_mode(EditorMode::Preview),
                        style: "background: {preview_bg};",
                        "Preview"
                    }
                }

                if !is_preview {
                    div {
                        class: "input-toggle",
                        style: "margin-bottom: 16px; display: flex; gap: 8px;",
                        button {
                            onclick: move |_| set_input_mode(InputMode::Pointer),
                            style: "background: {pointer_bg};",
                            "Pointer drag"
                        }
                        button {
                            onclick: move |_| set_input_mode(InputMode::Native),
                            style: "background: {native_bg};",
                            "Native drag"
                        }
                    }

                    h3 { style: "margin: 0 0 8px 0; font-size: 14px;", "Add to {add_target_label}" }
                    div {
                        class: "block-buttons",
                        style: "display: flex; flex-direction: column; gap: 8px;",
                        for kind in addable {
                            button {
                                onclick: move |_| add_block(kind),
                                "{kind.label()}"
                            }
                        }
                        if adding_to_group {
                            button {
                                onclick: move |_| set_add_target(None),
                                "Back to top level"
                            }
                        }
                    }

                    div { style: "margin-top: 24px;",
                        h3 { style: "margin: 0 0 8px 0; font-size: 14px;", "Instructions" }
                        p { style: "font-size: 12px; color: #666; line-height: 1.4;",
                            "Drag blocks to reorder"
                            br {}
                            "Drop onto a group to move a block in"
                            br {}
                            "Rearrange a group to reorder its contents"
                            br {}
                            "Space lifts a focused block, arrows move it, Escape cancels"
                        }
                    }

                    button {
                        style: "margin-top: 16px;",
                        onclick: move |_| export_course(),
                        "Export JSON"
                    }
                }

                div { style: "margin-top: 16px;",
                    Link { to: Route::StudentPage {}, "Open student view" }
                }
            }

            // Center - block tree
            div {
                class: "canvas-wrapper",
                style: "flex: 1; background: #f0f0f0; overflow-y: auto; position: relative;",

                BlockTreeEditor {
                    key: "{editor_key}",
                    blocks: COURSE(),
                    is_preview_mode: is_preview,
                    unlocked_groups: state.unlocked_groups.clone(),
                    on_toggle_group_lock: move |id| toggle_group_lock(id),
                    on_blocks_change: move |tree| set_course(tree),
                    on_edit: move |block: Block| select_block(block.id),
                    on_delete: move |id| delete_block(id),
                    on_add_block: move |group| set_add_target(group),
                    config,
                }
            }

            // Right sidebar - Properties
            if !is_preview {
                div {
                    class: "properties",
                    PropertiesPanel {}
                }
            }
        }
    }
}

#[component]
fn PropertiesPanel() -> Element {
    let state = PAGE_STATE.read();

    if let Some(json) = &state.export {
        return rsx! {
            div { class: "properties-panel",
                h1 {
                    style: "color:slate;text-align:center; margin: 24px 0 12px 0; font-size: 18px;",
                    "Export"
                }
                pre {
                    style: "font-size: 11px; padding-inline: 12px; white-space: pre-wrap;",
                    "{json}"
                }
                button {
                    onclick: move |_| PAGE_STATE.write().export = None,
                    style: "margin: 12px 0 0 12px; padding: 6px 12px; cursor: pointer;",
                    "Close"
                }
            }
        };
    }

    let Some(selected_id) = state.selected_id.clone() else {
        return rsx! {
            div {
                style: "color: slate; text-align: center; padding: 32px;",
                "Select a block to edit"
            }
        };
    };

    let course = COURSE.read();
    let Some(block) = find_block_by_id(&course, &selected_id) else {
        return rsx! { div { "Block not found" } };
    };
    let type_name = block.kind.label();
    let delete_id = selected_id.clone();

    rsx! {
        div { class: "properties-panel",
            h1 {
                style: "color:slate;text-align:center; margin: 24px 0 12px 0; font-size: 18px;",
                "{type_name} fields"
            }

            FieldEditor { block_id: selected_id.clone() }

            div { style: "margin-top: 24px; padding-inline: 12px",
                button {
                    onclick: move |_| delete_block(delete_id.clone()),
                    style: "width: 100%; padding: 8px; cursor: pointer;
                            background: #f44336; color: white; border: none; border-radius: 4px;",
                    "Delete Block"
                }
            }
        }
    }
}

/// Read-only route for students.
#[component]
pub fn StudentPage() -> Element {
    rsx! {
        div {
            style: "font-family: system-ui; max-width: 800px; margin: 0 auto;",
            div { style: "padding: 16px;",
                Link { to: Route::CoursePage {}, "Back to editor" }
            }
            CourseView { blocks: COURSE() }
        }
    }
}

fn toggle_background(active: bool) -> &'static str {
    if active {
        "var(--color-primary)"
    } else {
        "var(--color-secondary)"
    }
}

fn set_course(tree: Vec<Block>) {
    *COURSE.write() = tree;
}

fn add_block(kind: BlockKind) {
    let target = PAGE_STATE.read().add_target.clone();
    let block = new_block(kind);
    let id = block.id.clone();

    let next = insert_block(&COURSE.read(), target.as_ref(), block);
    match next {
        Ok(tree) => {
            set_course(tree);
            let mut state = PAGE_STATE.write();
            state.selected_id = Some(id);
            state.export = None;
        }
        Err(e) => tracing::warn!(error = %e, "could not add block"),
    }
}

fn select_block(id: BlockId) {
    let mut state = PAGE_STATE.write();
    state.selected_id = Some(id);
    state.export = None;
}

fn delete_block(id: BlockId) {
    let next = remove_block(&COURSE.read(), &id);
    match next {
        Ok(tree) => set_course(tree),
        Err(e) => {
            tracing::warn!(block = %id, error = %e, "could not delete block");
            return;
        }
    }

    FIELD_EDIT_BUFFER.write().remove(&id);
    let mut state = PAGE_STATE.write();
    state.unlocked_groups.remove(&id);
    if state.selected_id.as_ref() == Some(&id) {
        state.selected_id = None;
    }
    if state.add_target.as_ref() == Some(&id) {
        state.add_target = None;
    }
}

fn toggle_group_lock(id: BlockId) {
    let mut state = PAGE_STATE.write();
    if !state.unlocked_groups.remove(&id) {
        state.unlocked_groups.insert(id);
    }
}

fn set_add_target(group: Option<BlockId>) {
    PAGE_STATE.write().add_target = group;
}

fn set_mode(mode: EditorMode) {
    PAGE_STATE.write().mode = mode;
}

fn set_input_mode(input_mode: InputMode) {
    PAGE_STATE.write().input_mode = input_mode;
}

fn export_course() {
    let json = to_json(&COURSE.read());
    match json {
        Ok(json) => PAGE_STATE.write().export = Some(json),
        Err(e) => tracing::warn!(error = %e, "could not export course"),
    }
}
