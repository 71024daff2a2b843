use dioxus::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

use super::page::COURSE;
use crate::block_tree::{find_block_by_id, update_block, Block, BlockId};

// Buffer of unsaved field edits per block (ordered)
pub static FIELD_EDIT_BUFFER: GlobalSignal<HashMap<BlockId, Vec<(String, String)>>> =
    Signal::global(HashMap::new);

const TITLE: &str = "title";
const DESCRIPTION: &str = "description";
const VISIBLE: &str = "isVisible";
const RESERVED: [&str; 5] = ["id", "type", "order", "groupId", "blocks"];

/// Editable key/value view of a block: title, description (groups only),
/// visibility, then the payload fields.
pub fn field_pairs(block: &Block) -> Vec<(String, String)> {
    let mut pairs = vec![(TITLE.to_string(), block.title.clone())];
    if block.is_group() {
        pairs.push((
            DESCRIPTION.to_string(),
            block.description.clone().unwrap_or_default(),
        ));
    }
    pairs.push((VISIBLE.to_string(), block.is_visible().to_string()));
    for (key, value) in &block.payload {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.push((key.clone(), text));
    }
    pairs
}

/// Writes edited pairs back onto a copy of `block`. Structural keys are
/// ignored; values that parse as non-string JSON keep their JSON type.
/// Duplicate keys keep the last value.
pub fn apply_pairs(block: &Block, pairs: &[(String, String)]) -> Block {
    let mut edited = block.clone();
    edited.payload.clear();
    edited.is_visible = None;
    for (key, value) in pairs {
        match key.as_str() {
            "" => {}
            TITLE => edited.title = value.clone(),
            DESCRIPTION => {
                if edited.is_group() {
                    edited.description = Some(value.clone());
                }
            }
            VISIBLE => edited.is_visible = (value.trim() == "false").then_some(false),
            k if RESERVED.contains(&k) => {}
            _ => {
                let parsed = match serde_json::from_str::<Value>(value) {
                    Ok(v) if !v.is_string() => v,
                    _ => Value::String(value.clone()),
                };
                edited.payload.insert(key.clone(), parsed);
            }
        }
    }
    edited
}

fn save_fields(block_id: &BlockId) {
    let pairs = {
        let buf = FIELD_EDIT_BUFFER.read();
        buf.get(block_id).cloned().unwrap_or_default()
    };
    let edited = {
        let course = COURSE.read();
        find_block_by_id(&course, block_id).map(|b| apply_pairs(b, &pairs))
    };
    let Some(edited) = edited else {
        tracing::warn!(block = %block_id, "edited block no longer exists");
        return;
    };
    let next = update_block(&COURSE.read(), edited);
    match next {
        Ok(tree) => *COURSE.write() = tree,
        Err(e) => tracing::warn!(block = %block_id, error = %e, "could not save block fields"),
    }
    // remove buffer entry so next open loads fresh
    FIELD_EDIT_BUFFER.write().remove(block_id);
}

#[component]
pub fn FieldEditor(block_id: BlockId) -> Element {
    let course = COURSE.read();
    let Some(block) = find_block_by_id(&course, &block_id) else {
        return rsx!(div { "Block not found" });
    };

    // Initialize buffer for this block if not present
    {
        let mut buf = FIELD_EDIT_BUFFER.write();
        if !buf.contains_key(&block_id) {
            buf.insert(block_id.clone(), field_pairs(block));
        }
    }

    // Read a snapshot for rendering
    let pairs_snapshot = {
        let buf = FIELD_EDIT_BUFFER.read();
        buf.get(&block_id).cloned().unwrap_or_default()
    };

    let save_id = block_id.clone();
    let cancel_id = block_id.clone();
    let add_id = block_id.clone();

    rsx! {
        div {
            class: "field-editor",
            for (i, (key, value)) in pairs_snapshot.into_iter().enumerate() {
                FieldRow { block_id: block_id.clone(), index: i, key_text: key, value_text: value }
            }

            div { style: "margin-top: 8px; display:flex; gap:8px;",
                button {
                    onclick: move |_| {
                        let mut buf = FIELD_EDIT_BUFFER.write();
                        let vec = buf.entry(add_id.clone()).or_default();
                        let mut new_key = "newField".to_string();
                        let mut counter = 1;
                        while vec.iter().any(|(k, _)| k == &new_key) {
                            new_key = format!("newField{}", counter);
                            counter += 1;
                        }
                        vec.push((new_key, String::new()));
                    },
                    "Add field"
                }

                button {
                    onclick: move |_| save_fields(&save_id),
                    "Save"
                }

                button {
                    onclick: move |_| {
                        // Cancel: reset local edits from the stored block
                        let course = COURSE.read();
                        if let Some(block) = find_block_by_id(&course, &cancel_id) {
                            FIELD_EDIT_BUFFER.write().insert(cancel_id.clone(), field_pairs(block));
                        }
                    },
                    "Cancel"
                }
            }
        }
    }
}

#[component]
fn FieldRow(block_id: BlockId, index: usize, key_text: String, value_text: String) -> Element {
    let key_id = block_id.clone();
    let value_id = block_id.clone();
    let remove_id = block_id;

    rsx! {
        div {
            input {
                value: "{key_text}",
                oninput: move |e| {
                    let mut buf = FIELD_EDIT_BUFFER.write();
                    if let Some(vec) = buf.get_mut(&key_id) {
                        if let Some(pair) = vec.get_mut(index) {
                            pair.0 = e.value();
                        }
                    }
                }
            }
            input {
                value: "{value_text}",
                oninput: move |e| {
                    let mut buf = FIELD_EDIT_BUFFER.write();
                    if let Some(vec) = buf.get_mut(&value_id) {
                        if let Some(pair) = vec.get_mut(index) {
                            pair.1 = e.value();
                        }
                    }
                }
            }
            button {
                onclick: move |_| {
                    let mut buf = FIELD_EDIT_BUFFER.write();
                    if let Some(vec) = buf.get_mut(&remove_id) {
                        if index < vec.len() { vec.remove(index); }
                    }
                },
                "X"
            }
        }
    }
}
