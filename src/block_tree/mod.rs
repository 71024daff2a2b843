//! The course block tree and its drag-and-drop engine.
//!
//! Nothing in here knows about Dioxus or the DOM. The editor shell feeds
//! gestures into [`DragController`] and gets complete trees back.

pub mod block;
pub mod collision;
pub mod drag;
pub mod error;
pub mod moves;
pub mod registry;
pub mod tree;

pub use block::{Block, BlockId, BlockKind};
pub use collision::{
    detect_collisions, resolve_drop_target, ActiveDrag, DropId, DropPolicy, DropTarget, Droppable,
    Point, Rect,
};
pub use drag::{DragController, DragOutcome, DragSession};
pub use error::{MoveRejection, TreeError};
pub use moves::{apply_move, commit, plan_move, Move};
pub use registry::{ContainerKey, ContainerRegistry};
pub use tree::{
    block_count, find_block_by_id, flatten, from_json, insert_block, locate, new_block,
    remove_block, to_json, update_block, validate,
};
