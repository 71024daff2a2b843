//! Error types for the block tree engine.

use super::block::BlockId;
use super::registry::ContainerKey;

/// Structural problems found while loading, saving or editing a tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("invalid course JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("block id '{0}' appears more than once")]
    DuplicateId(BlockId),

    #[error("group '{0}' is nested inside another group")]
    NestedGroup(BlockId),

    #[error("block '{0}' is not a group but has children")]
    ChildrenOnLeaf(BlockId),

    #[error("block '{0}' not found")]
    BlockNotFound(BlockId),

    #[error("group '{0}' not found")]
    GroupNotFound(BlockId),
}

/// Why a move was not applied. None of these are surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    #[error("block '{0}' dropped onto itself")]
    SelfDrop(BlockId),

    #[error("block '{block}' already lives in group '{group}'")]
    SameGroup { block: BlockId, group: BlockId },

    #[error("block already at index {index} in {container}")]
    SameIndex { container: ContainerKey, index: usize },

    #[error("block '{0}' is already at the top level")]
    AlreadyTopLevel(BlockId),

    #[error("no drop target")]
    NoTarget,

    #[error("block '{0}' not found in any container")]
    BlockNotFound(BlockId),

    #[error("group '{0}' not found")]
    GroupNotFound(BlockId),

    #[error("container {0} not found")]
    ContainerNotFound(ContainerKey),

    #[error("group '{0}' cannot be moved into a group")]
    GroupIntoGroup(BlockId),

    #[error("index {index} out of range for {container} (len {len})")]
    IndexOutOfRange {
        container: ContainerKey,
        index: usize,
        len: usize,
    },
}

impl MoveRejection {
    /// Rejections caused by the tree not matching the gesture, as opposed
    /// to ordinary "nothing to do" outcomes.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            MoveRejection::BlockNotFound(_)
                | MoveRejection::GroupNotFound(_)
                | MoveRejection::ContainerNotFound(_)
                | MoveRejection::IndexOutOfRange { .. }
        )
    }
}
