//! Drag gesture state machine.
//!
//! Input adapters (pointer, keyboard, native HTML5) translate their events
//! into `drag_start`, repeated `drag_over` and a final `drag_end` or
//! `cancel`. Only `drag_end` produces a new tree; everything before that
//! touches the live registry and highlight state alone.

use tracing::debug;

use super::block::{Block, BlockId};
use super::collision::{resolve_drop_target, ActiveDrag, DropId, DropPolicy, DropTarget};
use super::moves::{apply_move, log_rejection, plan_move};
use super::registry::{ContainerKey, ContainerRegistry};
use super::tree::find_block_by_id;

#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub active: BlockId,
    pub origin: ContainerKey,
    pub is_group: bool,
    pub over: DropTarget,
    /// The tree as it was when the gesture began.
    snapshot: Vec<Block>,
}

impl DragSession {
    pub fn as_active(&self) -> ActiveDrag<'_> {
        ActiveDrag {
            id: &self.active,
            origin: &self.origin,
            is_group: self.is_group,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragOutcome {
    /// The drop produced a new tree for the host.
    Committed(Vec<Block>),
    /// The drop resolved to a no-op or was rejected; the tree stays as is.
    Unchanged,
    /// Explicit cancel, or the host tree changed under the gesture.
    Cancelled,
    /// There was no drag in progress.
    Idle,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragController {
    registry: ContainerRegistry,
    live: ContainerRegistry,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(tree: &[Block]) -> Self {
        let registry = ContainerRegistry::rebuild(tree);
        Self {
            live: registry.clone(),
            registry,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn active_id(&self) -> Option<&BlockId> {
        self.session.as_ref().map(|s| &s.active)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn over(&self) -> &DropTarget {
        static NONE: DropTarget = DropTarget::None;
        self.session.as_ref().map_or(&NONE, |s| &s.over)
    }

    /// Committed membership, as of the last rebuild.
    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    /// Committed membership with the in-flight drag applied.
    pub fn live_registry(&self) -> &ContainerRegistry {
        &self.live
    }

    /// Member order to render, including live drag feedback.
    pub fn display_order(&self, key: &ContainerKey) -> Option<&[BlockId]> {
        self.live.members(key)
    }

    /// Called whenever the host hands in a tree. A gesture started against
    /// a different tree is stale and gets dropped.
    pub fn sync_tree(&mut self, tree: &[Block]) {
        if let Some(session) = &self.session {
            if session.snapshot.as_slice() != tree {
                debug!(block = %session.active, "tree changed mid-drag, aborting gesture");
                self.session = None;
            }
        }
        self.registry = ContainerRegistry::rebuild(tree);
        if self.session.is_none() {
            self.live = self.registry.clone();
        }
    }

    /// Starts a drag of `active`. Refused in preview mode, while another
    /// drag is running, or for IDs not in the tree.
    pub fn drag_start(
        &mut self,
        tree: &[Block],
        active: &BlockId,
        policy: &DropPolicy<'_>,
    ) -> bool {
        if policy.preview_mode || self.session.is_some() {
            return false;
        }
        self.registry = ContainerRegistry::rebuild(tree);
        let Some(origin) = self.registry.container_of(active).cloned() else {
            debug!(block = %active, "drag start for unknown block ignored");
            return false;
        };
        let is_group = find_block_by_id(tree, active).is_some_and(Block::is_group);
        self.live = self.registry.clone();
        self.session = Some(DragSession {
            active: active.clone(),
            origin,
            is_group,
            over: DropTarget::None,
            snapshot: tree.to_vec(),
        });
        true
    }

    /// Resolves the current candidates and updates live feedback.
    pub fn drag_over(&mut self, candidates: &[DropId], policy: &DropPolicy<'_>) -> DropTarget {
        let Some(session) = self.session.as_mut() else {
            return DropTarget::None;
        };
        let target = resolve_drop_target(candidates, &session.as_active(), policy);
        if target != session.over {
            self.live = live_preview(&self.registry, session, &target);
            session.over = target.clone();
        }
        target
    }

    /// Like `drag_over`, for candidates numbered by the rendered layout.
    ///
    /// While a block is previewed in another container, the lists on screen
    /// follow the live registry, so slot indices shift. They are mapped back
    /// onto committed positions before resolving.
    pub fn drag_over_live(&mut self, candidates: &[DropId], policy: &DropPolicy<'_>) -> DropTarget {
        let Some(session) = self.session.as_ref() else {
            return DropTarget::None;
        };
        let committed: Vec<DropId> = candidates
            .iter()
            .map(|c| match c {
                DropId::Slot { container, index } => DropId::Slot {
                    container: container.clone(),
                    index: self.committed_index(session, container, *index),
                },
                other => other.clone(),
            })
            .collect();
        self.drag_over(&committed, policy)
    }

    /// Whether the rendered slot `live_index` of `container` is the
    /// current target.
    pub fn is_over_slot(&self, container: &ContainerKey, live_index: usize) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        match &session.over {
            DropTarget::Slot { container: c, index } if c == container => {
                *index == self.committed_index(session, container, live_index)
            }
            _ => false,
        }
    }

    /// A rendered slot sits in front of the live member at its index, so
    /// its committed position is that member's. The previewed block itself
    /// stands for the target it was placed by.
    fn committed_index(
        &self,
        session: &DragSession,
        container: &ContainerKey,
        live_index: usize,
    ) -> usize {
        let committed_len = self.registry.members(container).map_or(0, <[BlockId]>::len);
        let anchor = self.live.members(container).and_then(|m| m.get(live_index));
        match anchor {
            None => committed_len,
            Some(id) if id == &session.active => match &session.over {
                DropTarget::Slot { container: c, index } if c == container => *index,
                _ => self.registry.index_of(container, id).unwrap_or(committed_len),
            },
            Some(id) => self.registry.index_of(container, id).unwrap_or(committed_len),
        }
    }

    /// Commits the last resolved target against `tree`.
    pub fn drag_end(&mut self, tree: &[Block]) -> DragOutcome {
        let Some(session) = self.session.take() else {
            return DragOutcome::Idle;
        };
        if session.snapshot.as_slice() != tree {
            debug!(block = %session.active, "tree changed mid-drag, dropping gesture");
            self.reset(tree);
            return DragOutcome::Cancelled;
        }

        let applied = plan_move(tree, &session.active, &session.origin, &session.over)
            .and_then(|mv| apply_move(tree, &mv));
        match applied {
            Ok(next) => {
                self.reset(&next);
                DragOutcome::Committed(next)
            }
            Err(reason) => {
                log_rejection(&reason);
                self.reset(tree);
                DragOutcome::Unchanged
            }
        }
    }

    pub fn cancel(&mut self) -> DragOutcome {
        match self.session.take() {
            Some(session) => {
                self.reset(&session.snapshot);
                DragOutcome::Cancelled
            }
            None => DragOutcome::Idle,
        }
    }

    /// Whether `group` should be highlighted as accepting the current drag.
    pub fn is_valid_drop_target(&self, group: &BlockId, policy: &DropPolicy<'_>) -> bool {
        match &self.session {
            Some(s) => {
                !s.is_group
                    && &s.active != group
                    && s.origin.group_id() != Some(group)
                    && policy.accepts_group(group)
            }
            None => false,
        }
    }

    fn reset(&mut self, tree: &[Block]) {
        self.registry = ContainerRegistry::rebuild(tree);
        self.live = self.registry.clone();
    }
}

fn live_preview(
    base: &ContainerRegistry,
    session: &DragSession,
    target: &DropTarget,
) -> ContainerRegistry {
    match target {
        DropTarget::None => base.clone(),
        DropTarget::Group(group) => {
            base.transfer(&session.active, &ContainerKey::Group(group.clone()), usize::MAX)
        }
        DropTarget::Slot { container, index } if container == &session.origin => {
            match base.index_of(container, &session.active) {
                Some(from) => {
                    let len = base.members(container).map_or(0, <[BlockId]>::len);
                    base.reorder_within(container, from, (*index).min(len.saturating_sub(1)))
                }
                None => base.clone(),
            }
        }
        DropTarget::Slot { container, index } => base.transfer(&session.active, container, *index),
    }
}
