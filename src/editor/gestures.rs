//! Input adapters: pointer presses and keyboard stepping turned into the
//! drag controller's `{active, candidates}` vocabulary.

use crate::block_tree::collision::is_valid_candidate;
use crate::block_tree::{
    Block, BlockId, ContainerKey, ContainerRegistry, DragController, DragOutcome, DropId,
    DropPolicy, Point, Rect,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Mouse events plus geometric collision detection.
    #[default]
    Pointer,
    /// Browser drag-and-drop events; the element under the cursor is the
    /// only candidate.
    Native,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    /// Pixels the pointer has to travel before a press becomes a drag.
    pub activation_distance: f64,
    /// Largest mean corner distance still counted as a closest-corners hit.
    pub corner_threshold: f64,
    pub input_mode: InputMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            activation_distance: 5.0,
            corner_threshold: 64.0,
            input_mode: InputMode::Pointer,
        }
    }
}

/// Every droppable in display order: each top-level slot, followed for
/// groups by the group zone, its child slots and its trailing slot; then
/// the trailing top-level slot.
pub fn drop_ids(registry: &ContainerRegistry) -> Vec<DropId> {
    let mut ids = Vec::new();
    let top = registry.members(&ContainerKey::TopLevel).unwrap_or_default();
    for (index, member) in top.iter().enumerate() {
        ids.push(DropId::Slot {
            container: ContainerKey::TopLevel,
            index,
        });
        let group = ContainerKey::Group(member.clone());
        if let Some(children) = registry.members(&group) {
            ids.push(DropId::Group(member.clone()));
            for index in 0..=children.len() {
                ids.push(DropId::Slot {
                    container: group.clone(),
                    index,
                });
            }
        }
    }
    ids.push(DropId::Slot {
        container: ContainerKey::TopLevel,
        index: top.len(),
    });
    ids
}

/// Drop positions the keyboard can step through for the current drag.
pub fn keyboard_stops(drag: &DragController, policy: &DropPolicy<'_>) -> Vec<DropId> {
    let Some(session) = drag.session() else {
        return Vec::new();
    };
    let active = session.as_active();
    drop_ids(drag.registry())
        .into_iter()
        .filter(|id| is_valid_candidate(id, &active, policy))
        .collect()
}

/// Ends the drag as released over no target at all: the pointer left the
/// editor, or a native drag finished without a `drop`. A block from a group
/// lands at the top level.
pub fn release_outside(
    drag: &mut DragController,
    tree: &[Block],
    policy: &DropPolicy<'_>,
) -> DragOutcome {
    if !drag.is_dragging() {
        return DragOutcome::Idle;
    }
    drag.drag_over(&[], policy);
    drag.drag_end(tree)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    /// Lift when idle, drop when dragging.
    Toggle,
    Up,
    Down,
    Cancel,
}

impl KeyCommand {
    /// Maps a DOM `KeyboardEvent.key` name.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Enter" => Some(KeyCommand::Toggle),
            "ArrowUp" => Some(KeyCommand::Up),
            "ArrowDown" => Some(KeyCommand::Down),
            "Escape" => Some(KeyCommand::Cancel),
            _ => None,
        }
    }

    /// Whether a key that reached a card picks it up. Buttons inside the
    /// card stop their keys before they get there.
    pub fn lifts_card(key: &str, preview: bool, dragging: bool) -> bool {
        !preview && !dragging && KeyCommand::from_key(key) == Some(KeyCommand::Toggle)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyboardGesture {
    stops: Vec<DropId>,
    cursor: usize,
}

impl KeyboardGesture {
    /// Starts stepping from the block's own slot.
    pub fn begin(&mut self, stops: Vec<DropId>, origin: &ContainerKey, origin_index: usize) {
        let home = DropId::Slot {
            container: origin.clone(),
            index: origin_index,
        };
        self.cursor = stops.iter().position(|s| s == &home).unwrap_or(0);
        self.stops = stops;
    }

    /// Moves the cursor by one stop, clamped at both ends.
    pub fn step(&mut self, command: KeyCommand) -> Option<&DropId> {
        match command {
            KeyCommand::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCommand::Down => {
                if self.cursor + 1 < self.stops.len() {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        self.stops.get(self.cursor)
    }

    pub fn reset(&mut self) {
        self.stops.clear();
        self.cursor = 0;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerPress {
    pub block: BlockId,
    pub start: Point,
    pub origin_rect: Rect,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PointerGesture {
    #[default]
    Idle,
    Pressed(PointerPress),
    Dragging(PointerPress),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PointerStep {
    Nothing,
    /// The press crossed the activation distance.
    Started(BlockId),
    /// The dragged card's rect under the pointer.
    Moved { rect: Rect, pointer: Point },
}

impl PointerGesture {
    pub fn press(&mut self, block: BlockId, start: Point, origin_rect: Rect) {
        *self = PointerGesture::Pressed(PointerPress {
            block,
            start,
            origin_rect,
        });
    }

    pub fn motion(&mut self, at: Point, activation_distance: f64) -> PointerStep {
        match self {
            PointerGesture::Idle => PointerStep::Nothing,
            PointerGesture::Pressed(press) => {
                if press.start.distance(at) < activation_distance {
                    return PointerStep::Nothing;
                }
                let block = press.block.clone();
                *self = PointerGesture::Dragging(press.clone());
                PointerStep::Started(block)
            }
            PointerGesture::Dragging(press) => PointerStep::Moved {
                rect: press.origin_rect.translate(at.x - press.start.x, at.y - press.start.y),
                pointer: at,
            },
        }
    }

    /// Ends the press; true when it had turned into a drag.
    pub fn release(&mut self) -> bool {
        let was_dragging = matches!(self, PointerGesture::Dragging(_));
        *self = PointerGesture::Idle;
        was_dragging
    }
}
