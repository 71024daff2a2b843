use dioxus::prelude::*;

use crate::block_tree::{Block, BlockKind};

/// The tree as students see it: hidden blocks removed, and a hidden group
/// takes its children with it.
pub fn visible_blocks(tree: &[Block]) -> Vec<Block> {
    tree.iter()
        .filter(|b| b.is_visible())
        .map(|b| {
            let mut block = b.clone();
            block.blocks.retain(Block::is_visible);
            block
        })
        .collect()
}

/// Read-only course rendering for students.
#[component]
pub fn CourseView(blocks: ReadOnlySignal<Vec<Block>>) -> Element {
    let visible = visible_blocks(&blocks.read());

    rsx! {
        div {
            class: "course-view",
            style: "width: 100%; background: white; padding: 32px;
                    overflow-y: auto; display: flex; flex-direction: column; gap: 16px;",
            if visible.is_empty() {
                p { style: "color: #666; text-align: center;", "Nothing published yet" }
            }
            for block in visible {
                CourseBlock { key: "{block.id}", block }
            }
        }
    }
}

#[component]
fn CourseBlock(block: Block) -> Element {
    match block.kind {
        BlockKind::Group => {
            let description = block.description.clone().unwrap_or_default();
            rsx! {
                section {
                    style: "border-left: 4px solid {block.kind.color()}; padding-left: 16px;",
                    h2 { style: "margin: 0 0 8px 0; font-size: 20px;", "{block.title}" }
                    if !description.is_empty() {
                        p { style: "color: #666; font-size: 14px;", "{description}" }
                    }
                    for child in block.blocks.iter().cloned() {
                        CourseBlock { key: "{child.id}", block: child }
                    }
                }
            }
        }
        kind => rsx! {
            article {
                style: "padding: 8px 0;",
                h3 { style: "margin: 0; font-size: 16px;", "{block.title}" }
                span { style: "font-size: 11px; color: {kind.color()};", "{kind.label()}" }
            }
        },
    }
}
