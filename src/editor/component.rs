use dioxus::prelude::*;
use std::collections::HashSet;

use super::dom;
use super::gestures::{
    drop_ids, keyboard_stops, release_outside, EditorConfig, InputMode, KeyCommand,
    KeyboardGesture, PointerGesture, PointerStep,
};
use crate::block_tree::tree::container_members;
use crate::block_tree::{
    detect_collisions, find_block_by_id, Block, BlockId, ContainerKey, DragController, DragOutcome,
    DropId, DropPolicy, DropTarget, Point, Rect,
};

/// Drag state shared by every list and card of one editor. Provided as
/// context so highlight styling is derived from it on each render.
#[derive(Clone, Copy)]
struct TreeEditorContext {
    drag: Signal<DragController>,
    pointer: Signal<PointerGesture>,
    keyboard: Signal<KeyboardGesture>,
    config: Signal<EditorConfig>,
    blocks: ReadOnlySignal<Vec<Block>>,
    unlocked_groups: ReadOnlySignal<HashSet<BlockId>>,
    is_preview_mode: ReadOnlySignal<bool>,
    on_blocks_change: EventHandler<Vec<Block>>,
    on_toggle_group_lock: EventHandler<BlockId>,
    on_edit: EventHandler<Block>,
    on_delete: EventHandler<BlockId>,
    on_add_block: EventHandler<Option<BlockId>>,
}

impl TreeEditorContext {
    fn with_policy<R>(&self, f: impl FnOnce(&DropPolicy<'_>) -> R) -> R {
        let unlocked = self.unlocked_groups.read();
        let policy = DropPolicy::new((self.is_preview_mode)(), &unlocked);
        f(&policy)
    }

    fn native(&self) -> bool {
        self.config.peek().input_mode == InputMode::Native
    }

    fn start(&self, block: &BlockId) -> bool {
        let mut drag = self.drag;
        let blocks = self.blocks.read();
        self.with_policy(|policy| drag.write().drag_start(&blocks, block, policy))
    }

    /// Candidates in committed positions (keyboard stops).
    fn hover(&self, candidates: &[DropId]) {
        let mut drag = self.drag;
        self.with_policy(|policy| {
            drag.write().drag_over(candidates, policy);
        });
    }

    /// Candidates numbered as rendered (pointer and native events).
    fn hover_live(&self, candidates: &[DropId]) {
        let mut drag = self.drag;
        self.with_policy(|policy| {
            drag.write().drag_over_live(candidates, policy);
        });
    }

    fn finish(&self) {
        let mut drag = self.drag;
        let outcome = {
            let blocks = self.blocks.read();
            drag.write().drag_end(&blocks)
        };
        self.settle(outcome);
    }

    fn finish_outside(&self) {
        let mut drag = self.drag;
        let outcome = {
            let blocks = self.blocks.read();
            self.with_policy(|policy| release_outside(&mut drag.write(), &blocks, policy))
        };
        self.settle(outcome);
    }

    fn settle(&self, outcome: DragOutcome) {
        self.reset_gestures();
        if let DragOutcome::Committed(next) = outcome {
            self.on_blocks_change.call(next);
        }
    }

    fn cancel(&self) {
        let mut drag = self.drag;
        drag.write().cancel();
        self.reset_gestures();
    }

    fn reset_gestures(&self) {
        let mut pointer = self.pointer;
        let mut keyboard = self.keyboard;
        pointer.set(PointerGesture::Idle);
        keyboard.write().reset();
    }

    fn pointer_moved(&self, at: Point) {
        let config = self.config.peek().clone();
        let mut pointer = self.pointer;
        let step = pointer.write().motion(at, config.activation_distance);
        match step {
            PointerStep::Nothing => {}
            PointerStep::Started(block) => {
                if !self.start(&block) {
                    pointer.set(PointerGesture::Idle);
                }
            }
            PointerStep::Moved { rect, pointer: at } => {
                let ids = drop_ids(self.drag.peek().live_registry());
                let droppables = dom::measure_droppables(&ids);
                let candidates =
                    detect_collisions(&rect, Some(at), &droppables, config.corner_threshold);
                self.hover_live(&candidates);
            }
        }
    }

    fn pointer_released(&self) {
        let mut pointer = self.pointer;
        let was_dragging = pointer.write().release();
        if was_dragging {
            self.finish();
        }
    }

    /// A pointer that leaves the editor never sends its `mouseup` here.
    fn pointer_left(&self) {
        let mut pointer = self.pointer;
        let was_dragging = pointer.write().release();
        if was_dragging {
            self.finish_outside();
        }
    }

    fn lift_with_keyboard(&self, block: &BlockId) {
        if !self.start(block) {
            return;
        }
        let (stops, home) = {
            let drag = self.drag.peek();
            let stops = self.with_policy(|policy| keyboard_stops(&drag, policy));
            let home = drag.session().and_then(|s| {
                drag.registry()
                    .index_of(&s.origin, &s.active)
                    .map(|index| (s.origin.clone(), index))
            });
            (stops, home)
        };
        let Some((origin, index)) = home else {
            self.cancel();
            return;
        };
        let mut keyboard = self.keyboard;
        keyboard.write().begin(stops, &origin, index);
        self.hover(&[DropId::Slot {
            container: origin,
            index,
        }]);
    }

    fn key_command(&self, command: KeyCommand) {
        match command {
            KeyCommand::Toggle => self.finish(),
            KeyCommand::Up | KeyCommand::Down => {
                let mut keyboard = self.keyboard;
                let stop = keyboard.write().step(command).cloned();
                if let Some(stop) = stop {
                    self.hover(&[stop]);
                }
            }
            KeyCommand::Cancel => {
                let home = self.drag.peek().session().and_then(|s| {
                    let index = self.drag.peek().registry().index_of(&s.origin, &s.active)?;
                    Some(dom::slot_dom_id(&s.origin, index))
                });
                self.cancel();
                if let Some(dom_id) = home {
                    dom::focus(&dom_id);
                }
            }
        }
    }

    fn native_hover(&self, e: &DragEvent, target: DropId) {
        if !self.native() {
            return;
        }
        e.prevent_default();
        e.stop_propagation();
        self.hover_live(&[target]);
    }

    fn native_drop(&self, e: &DragEvent, target: DropId) {
        if !self.native() {
            return;
        }
        e.prevent_default();
        e.stop_propagation();
        self.hover_live(&[target]);
        self.finish();
    }
}

/// Keeps a button's keys (Enter, Space) from reaching the card around it.
fn keep_key(e: KeyboardEvent) {
    e.stop_propagation();
}

fn point_of(e: &MouseEvent) -> Point {
    let p = e.client_coordinates();
    Point::new(p.x, p.y)
}

/// The block tree editor.
///
/// `blocks` stays owned by the host; every completed drag reports a whole
/// new tree through `on_blocks_change`.
#[component]
pub fn BlockTreeEditor(
    blocks: ReadOnlySignal<Vec<Block>>,
    is_preview_mode: ReadOnlySignal<bool>,
    unlocked_groups: ReadOnlySignal<HashSet<BlockId>>,
    on_toggle_group_lock: EventHandler<BlockId>,
    on_blocks_change: EventHandler<Vec<Block>>,
    on_edit: EventHandler<Block>,
    on_delete: EventHandler<BlockId>,
    on_add_block: EventHandler<Option<BlockId>>,
    #[props(default)] config: EditorConfig,
) -> Element {
    let drag = use_signal(|| DragController::new(&blocks.peek()));
    let pointer = use_signal(PointerGesture::default);
    let keyboard = use_signal(KeyboardGesture::default);
    let config = use_signal(move || config);
    let ctx = use_context_provider(|| TreeEditorContext {
        drag,
        pointer,
        keyboard,
        config,
        blocks,
        unlocked_groups,
        is_preview_mode,
        on_blocks_change,
        on_toggle_group_lock,
        on_edit,
        on_delete,
        on_add_block,
    });

    // Any new tree from the host rebuilds the registry and drops a stale gesture.
    use_effect(move || {
        let tree = blocks.read();
        let mut drag = drag;
        drag.write().sync_tree(&tree);
    });

    let preview = is_preview_mode();
    let dragging = drag.read().is_dragging();
    let cursor = if dragging { "grabbing" } else { "default" };

    rsx! {
        div {
            class: "block-tree-editor",
            style: "display: flex; flex-direction: column; gap: 8px;
                    padding: 16px; min-height: 100%; box-sizing: border-box; cursor: {cursor};",
            onmousemove: move |e| ctx.pointer_moved(point_of(&e)),
            onmouseup: move |_| ctx.pointer_released(),
            onmouseleave: move |_| ctx.pointer_left(),
            onkeydown: move |e| {
                if !ctx.drag.peek().is_dragging() {
                    return;
                }
                if let Some(command) = KeyCommand::from_key(&e.key().to_string()) {
                    e.prevent_default();
                    ctx.key_command(command);
                }
            },
            ondragover: move |e| {
                if ctx.native() {
                    e.prevent_default();
                    ctx.hover_live(&[]);
                }
            },

            BlockList { container: ContainerKey::TopLevel }

            if !preview {
                button {
                    style: "align-self: flex-start; margin-top: 8px;
                            padding: 6px 12px; cursor: pointer;",
                    onclick: move |_| ctx.on_add_block.call(None),
                    "Add block"
                }
            }
        }
    }
}

#[component]
fn BlockList(container: ContainerKey) -> Element {
    let ctx = use_context::<TreeEditorContext>();
    let blocks = ctx.blocks.read();
    let drag = ctx.drag.read();

    let ids: Vec<BlockId> = match drag.display_order(&container) {
        Some(order) => order.to_vec(),
        None => container_members(&blocks, &container)
            .map(|members| members.iter().map(|b| b.id.clone()).collect())
            .unwrap_or_default(),
    };
    let cards: Vec<Block> = ids
        .iter()
        .filter_map(|id| find_block_by_id(&blocks, id).cloned())
        .collect();
    let len = cards.len();

    rsx! {
        div {
            class: "block-list",
            style: "display: flex; flex-direction: column; gap: 8px;",
            for (index, block) in cards.into_iter().enumerate() {
                BlockCard {
                    key: "{block.id}",
                    block,
                    container: container.clone(),
                    index,
                }
            }
            DropSlot { container: container.clone(), index: len }
        }
    }
}

#[component]
fn BlockCard(block: Block, container: ContainerKey, index: usize) -> Element {
    let ctx = use_context::<TreeEditorContext>();
    let preview = (ctx.is_preview_mode)();
    let native = ctx.config.read().input_mode == InputMode::Native;
    let drag = ctx.drag.read();

    let slot = DropId::Slot {
        container: container.clone(),
        index,
    };
    let dom_id = dom::drop_dom_id(&slot);
    let is_lifted = drag.active_id() == Some(&block.id);
    let is_over = drag.is_over_slot(&container, index);

    let border_color = if is_lifted {
        "#f44336"
    } else if is_over {
        "#9C27B0"
    } else {
        "#333"
    };
    let opacity = if is_lifted { "0.6" } else { "1" };
    let draggable = if native && !preview { "true" } else { "false" };
    let type_name = block.kind.label();
    let type_color = block.kind.color();

    let press_id = block.id.clone();
    let press_dom_id = dom_id.clone();
    let key_id = block.id.clone();
    let native_id = block.id.clone();
    let over_slot = slot.clone();
    let drop_slot = slot.clone();
    let edit_block = block.clone();
    let delete_id = block.id.clone();

    rsx! {
        div {
            id: "{dom_id}",
            class: "block-card",
            tabindex: "0",
            draggable: "{draggable}",
            style: "
                background: white;
                border: 2px solid {border_color};
                border-radius: 8px;
                padding: 12px;
                opacity: {opacity};
                user-select: none;
                box-shadow: 0 2px 8px rgba(0,0,0,0.2);
            ",
            onmousedown: move |e| {
                if preview || native {
                    return;
                }
                e.stop_propagation();
                let at = point_of(&e);
                let rect = dom::measure(&press_dom_id).unwrap_or(Rect::new(at.x, at.y, 0.0, 0.0));
                let mut pointer = ctx.pointer;
                pointer.write().press(press_id.clone(), at, rect);
            },
            onkeydown: move |e| {
                let dragging = ctx.drag.peek().is_dragging();
                if KeyCommand::lifts_card(&e.key().to_string(), preview, dragging) {
                    e.prevent_default();
                    e.stop_propagation();
                    ctx.lift_with_keyboard(&key_id);
                }
            },
            ondragstart: move |e| {
                if native && !preview {
                    e.stop_propagation();
                    ctx.start(&native_id);
                }
            },
            ondragover: move |e| ctx.native_hover(&e, over_slot.clone()),
            ondrop: move |e| ctx.native_drop(&e, drop_slot.clone()),
            ondragend: move |_| {
                if native {
                    ctx.finish_outside();
                }
            },

            div {
                style: "display: flex; align-items: center; gap: 8px;",
                span {
                    style: "font-weight: bold; color: white; font-size: 12px;
                            background: {type_color}; padding: 2px 6px; border-radius: 4px;",
                    "{type_name}"
                }
                span {
                    style: "flex: 1; font-size: 14px;
                            overflow: hidden; text-overflow: ellipsis; white-space: nowrap;",
                    "{block.title}"
                }
                if !block.is_visible() {
                    span { style: "font-size: 11px; color: #999;", "hidden" }
                }
                if !preview {
                    button {
                        style: "padding: 2px 8px; cursor: pointer;",
                        onkeydown: move |e| keep_key(e),
                        onclick: move |_| ctx.on_edit.call(edit_block.clone()),
                        "Edit"
                    }
                    button {
                        style: "padding: 2px 8px; cursor: pointer; background: #f44336;
                                color: white; border: none; border-radius: 4px;",
                        onkeydown: move |e| keep_key(e),
                        onclick: move |_| ctx.on_delete.call(delete_id.clone()),
                        "Delete"
                    }
                }
            }

            if block.is_group() {
                GroupBody { group: block.clone() }
            }
        }
    }
}

#[component]
fn GroupBody(group: Block) -> Element {
    let ctx = use_context::<TreeEditorContext>();
    let preview = (ctx.is_preview_mode)();
    let unlocked = ctx.unlocked_groups.read().contains(&group.id);
    let drag = ctx.drag.read();

    let accepts = ctx.with_policy(|policy| drag.is_valid_drop_target(&group.id, policy));
    let is_over = drag.over() == &DropTarget::Group(group.id.clone());
    let zone = DropId::Group(group.id.clone());
    let zone_id = dom::drop_dom_id(&zone);
    let zone_border = if is_over {
        "#9C27B0"
    } else if accepts {
        "#4CAF50"
    } else {
        "#ccc"
    };
    let zone_background = if is_over { "rgba(156, 39, 176, 0.08)" } else { "transparent" };
    let description = group.description.clone().unwrap_or_default();
    let children = group.blocks.len();

    let toggle_id = group.id.clone();
    let add_id = group.id.clone();
    let over_zone = zone.clone();
    let drop_zone = zone.clone();

    rsx! {
        if !description.is_empty() {
            p { style: "font-size: 12px; color: #666; margin: 8px 0 0 0;", "{description}" }
        }
        if !preview {
            div {
                style: "display: flex; gap: 8px; margin-top: 8px; font-size: 12px;",
                button {
                    style: "padding: 2px 8px; cursor: pointer;",
                    onkeydown: move |e| keep_key(e),
                    onclick: move |_| ctx.on_toggle_group_lock.call(toggle_id.clone()),
                    if unlocked { "Done rearranging" } else { "Rearrange" }
                }
                button {
                    style: "padding: 2px 8px; cursor: pointer;",
                    onkeydown: move |e| keep_key(e),
                    onclick: move |_| ctx.on_add_block.call(Some(add_id.clone())),
                    "Add to group"
                }
                span { style: "color: #666; align-self: center;", "Blocks: {children}" }
            }
        }
        div {
            id: "{zone_id}",
            class: "group-zone",
            style: "margin-top: 8px; padding: 8px; border: 2px dashed {zone_border};
                    border-radius: 8px; background: {zone_background};",
            ondragover: move |e| ctx.native_hover(&e, over_zone.clone()),
            ondrop: move |e| ctx.native_drop(&e, drop_zone.clone()),
            BlockList { container: ContainerKey::Group(group.id.clone()) }
        }
    }
}

/// Trailing slot at the end of a container.
#[component]
fn DropSlot(container: ContainerKey, index: usize) -> Element {
    let ctx = use_context::<TreeEditorContext>();
    let drag = ctx.drag.read();
    let slot = DropId::Slot {
        container: container.clone(),
        index,
    };
    let dom_id = dom::drop_dom_id(&slot);
    let is_over = drag.is_over_slot(&container, index);
    let height = if drag.is_dragging() { "24px" } else { "8px" };
    let border = if is_over { "#9C27B0" } else { "transparent" };
    let over_slot = slot.clone();
    let drop_slot = slot;

    rsx! {
        div {
            id: "{dom_id}",
            class: "drop-slot",
            style: "min-height: {height}; border: 2px dashed {border}; border-radius: 6px;",
            ondragover: move |e| ctx.native_hover(&e, over_slot.clone()),
            ondrop: move |e| ctx.native_drop(&e, drop_slot.clone()),
        }
    }
}
