//! Committing a resolved drop into a new tree.
//!
//! Every function here takes the tree by reference and hands back a fresh
//! one. A rejected move leaves the input untouched, so the caller can keep
//! using it as the current state.

use tracing::{debug, warn};

use super::block::{Block, BlockId};
use super::collision::DropTarget;
use super::error::MoveRejection;
use super::registry::ContainerKey;
use super::tree::{container_members, container_members_mut, locate, renumber_container};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Move {
    /// Array move inside one container.
    Reorder {
        container: ContainerKey,
        from: usize,
        to: usize,
    },
    /// Into a group; `index: None` appends.
    ToGroup {
        block: BlockId,
        from: ContainerKey,
        group: BlockId,
        index: Option<usize>,
    },
    /// Out of a group; `index: None` prepends.
    ToTopLevel {
        block: BlockId,
        from: ContainerKey,
        index: Option<usize>,
    },
}

/// Turns a resolved target into a move for `active`, which the gesture
/// recorded as living in `origin`.
///
/// A drag out of a group that ends with no target becomes a move to the
/// top level, so a block released in empty space is never lost.
pub fn plan_move(
    tree: &[Block],
    active: &BlockId,
    origin: &ContainerKey,
    target: &DropTarget,
) -> Result<Move, MoveRejection> {
    match target {
        DropTarget::None => match origin {
            ContainerKey::TopLevel => Err(MoveRejection::NoTarget),
            ContainerKey::Group(_) => Ok(Move::ToTopLevel {
                block: active.clone(),
                from: origin.clone(),
                index: None,
            }),
        },
        DropTarget::Group(group) => {
            if group == active {
                return Err(MoveRejection::SelfDrop(active.clone()));
            }
            if origin.group_id() == Some(group) {
                return Err(MoveRejection::SameGroup {
                    block: active.clone(),
                    group: group.clone(),
                });
            }
            Ok(Move::ToGroup {
                block: active.clone(),
                from: origin.clone(),
                group: group.clone(),
                index: None,
            })
        }
        DropTarget::Slot { container, index } => {
            let (current, from) =
                locate(tree, active).ok_or_else(|| MoveRejection::BlockNotFound(active.clone()))?;
            if &current == container {
                let len = container_members(tree, container).map_or(0, <[Block]>::len);
                let to = (*index).min(len.saturating_sub(1));
                if from == to {
                    return Err(MoveRejection::SameIndex {
                        container: container.clone(),
                        index: from,
                    });
                }
                return Ok(Move::Reorder {
                    container: container.clone(),
                    from,
                    to,
                });
            }
            match container {
                ContainerKey::TopLevel => Ok(Move::ToTopLevel {
                    block: active.clone(),
                    from: origin.clone(),
                    index: Some(*index),
                }),
                ContainerKey::Group(group) => Ok(Move::ToGroup {
                    block: active.clone(),
                    from: origin.clone(),
                    group: group.clone(),
                    index: Some(*index),
                }),
            }
        }
    }
}

/// Takes `block` out of `from`, or out of wherever it actually is when
/// `from` turns out to be stale.
fn take_block(
    tree: &mut Vec<Block>,
    block: &BlockId,
    from: &ContainerKey,
) -> Result<(Block, ContainerKey), MoveRejection> {
    let recorded =
        container_members(tree, from).and_then(|m| m.iter().position(|b| &b.id == block));
    let (source, index) = match recorded {
        Some(index) => (from.clone(), index),
        None => {
            let (actual, index) =
                locate(tree, block).ok_or_else(|| MoveRejection::BlockNotFound(block.clone()))?;
            warn!(
                block = %block,
                container = %from,
                actual = %actual,
                "block missing from its recorded container, moving it from where it is"
            );
            (actual, index)
        }
    };
    let members = container_members_mut(tree, &source)
        .ok_or_else(|| MoveRejection::ContainerNotFound(source.clone()))?;
    Ok((members.remove(index), source))
}

pub fn apply_move(tree: &[Block], mv: &Move) -> Result<Vec<Block>, MoveRejection> {
    match mv {
        Move::Reorder { container, from, to } => {
            let len = container_members(tree, container)
                .ok_or_else(|| MoveRejection::ContainerNotFound(container.clone()))?
                .len();
            for index in [*from, *to] {
                if index >= len {
                    return Err(MoveRejection::IndexOutOfRange {
                        container: container.clone(),
                        index,
                        len,
                    });
                }
            }
            if from == to {
                return Err(MoveRejection::SameIndex {
                    container: container.clone(),
                    index: *from,
                });
            }
            let mut next = tree.to_vec();
            if let Some(members) = container_members_mut(&mut next, container) {
                let block = members.remove(*from);
                members.insert(*to, block);
            }
            renumber_container(&mut next, container);
            Ok(next)
        }

        Move::ToGroup {
            block,
            from,
            group,
            index,
        } => {
            if block == group {
                return Err(MoveRejection::SelfDrop(block.clone()));
            }
            if !tree.iter().any(|b| &b.id == group && b.is_group()) {
                return Err(MoveRejection::GroupNotFound(group.clone()));
            }
            let target = ContainerKey::Group(group.clone());
            let (current, _) =
                locate(tree, block).ok_or_else(|| MoveRejection::BlockNotFound(block.clone()))?;
            if current == target {
                return Err(MoveRejection::SameGroup {
                    block: block.clone(),
                    group: group.clone(),
                });
            }

            let mut next = tree.to_vec();
            let (mut moved, source) = take_block(&mut next, block, from)?;
            if moved.is_group() {
                return Err(MoveRejection::GroupIntoGroup(moved.id));
            }
            moved.group_id = Some(group.clone());
            if let Some(members) = container_members_mut(&mut next, &target) {
                match index {
                    Some(i) => members.insert((*i).min(members.len()), moved),
                    None => members.push(moved),
                }
            }
            renumber_container(&mut next, &source);
            renumber_container(&mut next, &target);
            Ok(next)
        }

        Move::ToTopLevel { block, from, index } => {
            let (current, _) =
                locate(tree, block).ok_or_else(|| MoveRejection::BlockNotFound(block.clone()))?;
            if current == ContainerKey::TopLevel {
                return Err(MoveRejection::AlreadyTopLevel(block.clone()));
            }

            let mut next = tree.to_vec();
            let (mut moved, source) = take_block(&mut next, block, from)?;
            moved.group_id = None;
            let at = index.unwrap_or(0).min(next.len());
            next.insert(at, moved);
            renumber_container(&mut next, &source);
            renumber_container(&mut next, &ContainerKey::TopLevel);
            Ok(next)
        }
    }
}

/// `apply_move` that never fails: rejections are logged and the input tree
/// comes back unchanged.
pub fn commit(tree: &[Block], mv: &Move) -> Vec<Block> {
    match apply_move(tree, mv) {
        Ok(next) => next,
        Err(reason) => {
            log_rejection(&reason);
            tree.to_vec()
        }
    }
}

pub(crate) fn log_rejection(reason: &MoveRejection) {
    if reason.is_desync() {
        warn!(%reason, "move dropped: tree out of sync with gesture");
    } else {
        debug!(%reason, "move skipped");
    }
}
