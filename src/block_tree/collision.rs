//! Drop-target resolution.
//!
//! Geometry first narrows the droppables down to an ordered candidate list,
//! then the lock policy picks exactly one target from it. Gesture adapters
//! that already know what is under the pointer (native HTML5 drag events,
//! keyboard stepping) skip the geometry and hand candidates in directly.

use std::collections::HashSet;

use super::block::BlockId;
use super::registry::ContainerKey;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.left, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

/// Something a block can be dropped on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropId {
    /// Position `index` inside a container; `index == len` is the trailing slot.
    Slot { container: ContainerKey, index: usize },
    /// A group card as a whole.
    Group(BlockId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Droppable {
    pub id: DropId,
    pub rect: Rect,
}

fn mean_corner_distance(a: &[Point; 4], b: &[Point; 4]) -> f64 {
    a.iter().zip(b.iter()).map(|(p, q)| p.distance(*q)).sum::<f64>() / 4.0
}

fn sorted_by<F>(droppables: &[Droppable], mut score: F) -> Vec<DropId>
where
    F: FnMut(&Droppable) -> Option<f64>,
{
    let mut scored: Vec<(f64, &Droppable)> = droppables
        .iter()
        .filter_map(|d| score(d).map(|s| (s, d)))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, d)| d.id.clone()).collect()
}

/// Droppables whose corners sit within `threshold` (mean distance) of the
/// dragged rect's corners, nearest first.
pub fn closest_corners(active: &Rect, droppables: &[Droppable], threshold: f64) -> Vec<DropId> {
    let corners = active.corners();
    sorted_by(droppables, |d| {
        let distance = mean_corner_distance(&corners, &d.rect.corners());
        (distance <= threshold).then_some(distance)
    })
}

/// Overlapping droppables, largest overlap ratio first.
pub fn rect_intersection(active: &Rect, droppables: &[Droppable]) -> Vec<DropId> {
    sorted_by(droppables, |d| {
        let overlap = active.intersection_area(&d.rect);
        if overlap <= 0.0 {
            return None;
        }
        let ratio = overlap / (active.area() + d.rect.area() - overlap);
        Some(-ratio)
    })
}

/// Droppables under the pointer, nearest corners first.
pub fn pointer_within(pointer: Point, droppables: &[Droppable]) -> Vec<DropId> {
    sorted_by(droppables, |d| {
        if !d.rect.contains(pointer) {
            return None;
        }
        let distance = d.rect.corners().iter().map(|c| c.distance(pointer)).sum::<f64>() / 4.0;
        Some(distance)
    })
}

/// Runs the three strategies in order, stopping at the first that yields
/// anything.
pub fn detect_collisions(
    active: &Rect,
    pointer: Option<Point>,
    droppables: &[Droppable],
    corner_threshold: f64,
) -> Vec<DropId> {
    let found = closest_corners(active, droppables, corner_threshold);
    if !found.is_empty() {
        return found;
    }
    let found = rect_intersection(active, droppables);
    if !found.is_empty() {
        return found;
    }
    match pointer {
        Some(p) => pointer_within(p, droppables),
        None => Vec::new(),
    }
}

/// Preview flag plus the set of groups currently in structural edit mode.
///
/// Locked groups (the default) accept incoming blocks; unlocked ones
/// refuse them.
#[derive(Clone, Copy, Debug)]
pub struct DropPolicy<'a> {
    pub preview_mode: bool,
    pub unlocked_groups: &'a HashSet<BlockId>,
}

impl<'a> DropPolicy<'a> {
    pub fn new(preview_mode: bool, unlocked_groups: &'a HashSet<BlockId>) -> Self {
        Self {
            preview_mode,
            unlocked_groups,
        }
    }

    pub fn accepts_group(&self, group: &BlockId) -> bool {
        !self.preview_mode && !self.unlocked_groups.contains(group)
    }
}

/// The block being dragged and where it came from.
#[derive(Clone, Copy, Debug)]
pub struct ActiveDrag<'a> {
    pub id: &'a BlockId,
    pub origin: &'a ContainerKey,
    pub is_group: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DropTarget {
    Slot {
        container: ContainerKey,
        index: usize,
    },
    Group(BlockId),
    #[default]
    None,
}

impl DropTarget {
    pub fn is_none(&self) -> bool {
        matches!(self, DropTarget::None)
    }
}

pub fn is_valid_candidate(
    candidate: &DropId,
    active: &ActiveDrag<'_>,
    policy: &DropPolicy<'_>,
) -> bool {
    if policy.preview_mode {
        return false;
    }
    match candidate {
        DropId::Group(group) => {
            !active.is_group && group != active.id && policy.accepts_group(group)
        }
        DropId::Slot { container, .. } => match container {
            ContainerKey::TopLevel => true,
            ContainerKey::Group(group) => {
                !active.is_group && (container == active.origin || policy.accepts_group(group))
            }
        },
    }
}

/// Picks one target from candidates given in geometric priority order.
///
/// Invalid candidates are skipped. For a non-group block, a group other
/// than its own origin wins over any slot; among several groups the first
/// one wins. The origin group itself only comes back when nothing else is
/// left, which the move engine treats as a no-op.
pub fn resolve_drop_target(
    candidates: &[DropId],
    active: &ActiveDrag<'_>,
    policy: &DropPolicy<'_>,
) -> DropTarget {
    let valid: Vec<&DropId> = candidates
        .iter()
        .filter(|c| {
            let ok = is_valid_candidate(c, active, policy);
            if !ok {
                tracing::debug!(block = %active.id, candidate = ?c, "drop candidate rejected");
            }
            ok
        })
        .collect();

    if !active.is_group {
        let foreign_group = valid.iter().find_map(|c| match c {
            DropId::Group(g) if active.origin.group_id() != Some(g) => Some(g.clone()),
            _ => None,
        });
        if let Some(group) = foreign_group {
            return DropTarget::Group(group);
        }
    }

    let own_group =
        |c: &&&DropId| matches!(c, DropId::Group(g) if active.origin.group_id() == Some(g));
    let chosen = valid
        .iter()
        .find(|c| !own_group(c))
        .or_else(|| valid.first());
    match chosen {
        Some(DropId::Slot { container, index }) => DropTarget::Slot {
            container: container.clone(),
            index: *index,
        },
        Some(DropId::Group(g)) => DropTarget::Group(g.clone()),
        None => DropTarget::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(container: ContainerKey, index: usize) -> DropId {
        DropId::Slot { container, index }
    }

    fn group(id: &str) -> DropId {
        DropId::Group(id.into())
    }

    fn active<'a>(id: &'a BlockId, origin: &'a ContainerKey) -> ActiveDrag<'a> {
        ActiveDrag {
            id,
            origin,
            is_group: false,
        }
    }

    #[test]
    fn rect_geometry() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&b), 25.0);
        assert_eq!(a.intersection_area(&Rect::new(20.0, 0.0, 5.0, 5.0)), 0.0);
        assert!(a.contains(Point::new(10.0, 10.0)));
        assert!(!a.contains(Point::new(10.1, 0.0)));
        assert_eq!(a.translate(3.0, -2.0), Rect::new(3.0, -2.0, 10.0, 10.0));
    }

    #[test]
    fn closest_corners_orders_by_distance_within_threshold() {
        let droppables = vec![
            Droppable {
                id: slot(ContainerKey::TopLevel, 0),
                rect: Rect::new(0.0, 40.0, 100.0, 20.0),
            },
            Droppable {
                id: slot(ContainerKey::TopLevel, 1),
                rect: Rect::new(0.0, 10.0, 100.0, 20.0),
            },
            Droppable {
                id: slot(ContainerKey::TopLevel, 2),
                rect: Rect::new(0.0, 500.0, 100.0, 20.0),
            },
        ];
        let dragged = Rect::new(0.0, 12.0, 100.0, 20.0);
        assert_eq!(
            closest_corners(&dragged, &droppables, 64.0),
            vec![slot(ContainerKey::TopLevel, 1), slot(ContainerKey::TopLevel, 0)]
        );
    }

    #[test]
    fn detection_falls_back_through_strategies() {
        let big = Droppable { id: group("g1"), rect: Rect::new(0.0, 0.0, 400.0, 400.0) };
        let dragged = Rect::new(150.0, 150.0, 50.0, 20.0);

        // Too far from any corners, but overlapping: rect intersection.
        assert_eq!(detect_collisions(&dragged, None, &[big.clone()], 10.0), vec![group("g1")]);

        // No overlap at all: only the pointer can still land inside.
        let far = Rect::new(1000.0, 1000.0, 10.0, 10.0);
        assert_eq!(
            detect_collisions(&far, Some(Point::new(10.0, 10.0)), &[big.clone()], 10.0),
            vec![group("g1")]
        );
        assert!(detect_collisions(&far, None, &[big], 10.0).is_empty());
    }

    #[test]
    fn groups_beat_slots_for_plain_blocks() {
        let unlocked = HashSet::new();
        let policy = DropPolicy::new(false, &unlocked);
        let id = BlockId::new("b3");
        let origin = ContainerKey::TopLevel;
        let target = resolve_drop_target(
            &[slot(ContainerKey::TopLevel, 0), group("g1"), group("g2")],
            &active(&id, &origin),
            &policy,
        );
        assert_eq!(target, DropTarget::Group("g1".into()));
    }

    #[test]
    fn unlocked_group_is_never_chosen() {
        let unlocked: HashSet<BlockId> = ["g1".into()].into_iter().collect();
        let policy = DropPolicy::new(false, &unlocked);
        let id = BlockId::new("b3");
        let origin = ContainerKey::TopLevel;
        let a = active(&id, &origin);

        assert_eq!(resolve_drop_target(&[group("g1")], &a, &policy), DropTarget::None);
        assert_eq!(
            resolve_drop_target(&[group("g1"), slot(ContainerKey::TopLevel, 1)], &a, &policy),
            DropTarget::Slot { container: ContainerKey::TopLevel, index: 1 }
        );
        assert_eq!(
            resolve_drop_target(&[slot(ContainerKey::Group("g1".into()), 0)], &a, &policy),
            DropTarget::None
        );
    }

    #[test]
    fn own_group_does_not_steal_sibling_reorders() {
        let unlocked = HashSet::new();
        let policy = DropPolicy::new(false, &unlocked);
        let id = BlockId::new("b1");
        let origin = ContainerKey::Group("g1".into());
        let target = resolve_drop_target(
            &[group("g1"), slot(ContainerKey::Group("g1".into()), 1)],
            &active(&id, &origin),
            &policy,
        );
        assert_eq!(
            target,
            DropTarget::Slot { container: ContainerKey::Group("g1".into()), index: 1 }
        );
    }

    #[test]
    fn groups_only_land_at_top_level() {
        let unlocked = HashSet::new();
        let policy = DropPolicy::new(false, &unlocked);
        let id = BlockId::new("g2");
        let origin = ContainerKey::TopLevel;
        let a = ActiveDrag { id: &id, origin: &origin, is_group: true };
        let target = resolve_drop_target(
            &[
                group("g1"),
                slot(ContainerKey::Group("g1".into()), 0),
                slot(ContainerKey::TopLevel, 0),
            ],
            &a,
            &policy,
        );
        assert_eq!(target, DropTarget::Slot { container: ContainerKey::TopLevel, index: 0 });
    }

    #[test]
    fn preview_mode_rejects_everything() {
        let unlocked = HashSet::new();
        let policy = DropPolicy::new(true, &unlocked);
        let id = BlockId::new("b3");
        let origin = ContainerKey::TopLevel;
        assert_eq!(
            resolve_drop_target(
                &[group("g1"), slot(ContainerKey::TopLevel, 0)],
                &active(&id, &origin),
                &policy,
            ),
            DropTarget::None
        );
    }
}
