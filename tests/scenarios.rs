//! End-to-end drag gestures through `DragController`, the way the editor
//! shell drives it.

use std::collections::HashSet;

use course_editor::block_tree::{
    detect_collisions, Block, BlockId, BlockKind, ContainerKey, DragController, DragOutcome,
    DropId, DropPolicy, DropTarget, Droppable, Point, Rect,
};

fn text(id: &str) -> Block {
    Block::new(id, BlockKind::Text, id)
}

fn ids(container: &[Block]) -> Vec<&str> {
    container.iter().map(|b| b.id.as_str()).collect()
}

fn orders(container: &[Block]) -> Vec<usize> {
    container.iter().map(|b| b.order).collect()
}

fn drag(
    tree: &[Block],
    unlocked: &HashSet<BlockId>,
    active: &str,
    candidates: &[DropId],
) -> DragOutcome {
    let policy = DropPolicy::new(false, unlocked);
    let mut drag = DragController::new(tree);
    assert!(drag.drag_start(tree, &BlockId::new(active), &policy));
    drag.drag_over(candidates, &policy);
    drag.drag_end(tree)
}

fn committed(outcome: DragOutcome) -> Vec<Block> {
    match outcome {
        DragOutcome::Committed(tree) => tree,
        other => panic!("expected a committed tree, got {other:?}"),
    }
}

fn group_and_loose() -> Vec<Block> {
    vec![Block::group("g1", "g1", vec![text("b1"), text("b2")]), text("b3")]
}

#[test]
fn drop_into_locked_group_appends() {
    let tree = group_and_loose();
    let next = committed(drag(&tree, &HashSet::new(), "b3", &[DropId::Group("g1".into())]));

    assert_eq!(ids(&next), vec!["g1"]);
    let group = &next[0];
    assert_eq!(ids(&group.blocks), vec!["b1", "b2", "b3"]);
    assert_eq!(orders(&group.blocks), vec![0, 1, 2]);
    assert_eq!(group.blocks[2].group_id, Some(BlockId::new("g1")));
}

#[test]
fn unlocked_group_rejects_the_drop() {
    let tree = group_and_loose();
    let unlocked: HashSet<BlockId> = [BlockId::new("g1")].into_iter().collect();
    let policy = DropPolicy::new(false, &unlocked);

    let mut drag = DragController::new(&tree);
    assert!(drag.drag_start(&tree, &"b3".into(), &policy));
    let target = drag.drag_over(&[DropId::Group("g1".into())], &policy);
    assert_eq!(target, DropTarget::None);
    assert!(!drag.is_valid_drop_target(&"g1".into(), &policy));
    assert_eq!(drag.drag_end(&tree), DragOutcome::Unchanged);
}

#[test]
fn release_in_empty_space_promotes_out_of_group() {
    let tree = vec![Block::group("g1", "g1", vec![text("b1")])];
    let next = committed(drag(&tree, &HashSet::new(), "b1", &[]));

    assert_eq!(ids(&next), vec!["b1", "g1"]);
    assert_eq!(orders(&next), vec![0, 1]);
    assert_eq!(next[0].group_id, None);
    assert!(next[1].blocks.is_empty());
}

#[test]
fn reorder_within_top_level() {
    let tree = vec![text("b1"), text("b2"), text("b3")];
    let slot = DropId::Slot {
        container: ContainerKey::TopLevel,
        index: 2,
    };
    let next = committed(drag(&tree, &HashSet::new(), "b1", &[slot]));

    assert_eq!(ids(&next), vec!["b2", "b3", "b1"]);
    assert_eq!(orders(&next), vec![0, 1, 2]);
}

#[test]
fn reorder_inside_a_group_is_not_captured_by_the_group_zone() {
    let tree = group_and_loose();
    let candidates = [
        DropId::Group("g1".into()),
        DropId::Slot {
            container: ContainerKey::Group("g1".into()),
            index: 1,
        },
    ];
    let next = committed(drag(&tree, &HashSet::new(), "b1", &candidates));
    assert_eq!(ids(&next[0].blocks), vec!["b2", "b1"]);
}

#[test]
fn no_op_drops_leave_the_tree_unchanged() {
    let tree = group_and_loose();
    let unlocked = HashSet::new();

    // onto its own position
    let same_slot = DropId::Slot {
        container: ContainerKey::TopLevel,
        index: 1,
    };
    assert_eq!(drag(&tree, &unlocked, "b3", &[same_slot]), DragOutcome::Unchanged);

    // onto the group it already lives in
    assert_eq!(
        drag(&tree, &unlocked, "b2", &[DropId::Group("g1".into())]),
        DragOutcome::Unchanged
    );

    // a group onto itself
    assert_eq!(
        drag(&tree, &unlocked, "g1", &[DropId::Group("g1".into())]),
        DragOutcome::Unchanged
    );

    // a top-level block released nowhere
    assert_eq!(drag(&tree, &unlocked, "b3", &[]), DragOutcome::Unchanged);
}

#[test]
fn groups_never_nest() {
    let tree = vec![
        Block::group("g1", "g1", vec![text("b1")]),
        Block::group("g2", "g2", vec![]),
    ];
    let candidates = [
        DropId::Group("g2".into()),
        DropId::Slot {
            container: ContainerKey::Group("g2".into()),
            index: 0,
        },
    ];
    assert_eq!(drag(&tree, &HashSet::new(), "g1", &candidates), DragOutcome::Unchanged);
}

#[test]
fn preview_mode_refuses_to_start() {
    let tree = group_and_loose();
    let unlocked = HashSet::new();
    let mut drag = DragController::new(&tree);
    assert!(!drag.drag_start(&tree, &"b3".into(), &DropPolicy::new(true, &unlocked)));
    assert_eq!(drag.drag_end(&tree), DragOutcome::Idle);
}

#[test]
fn geometry_drives_the_drop() {
    let tree = group_and_loose();
    let unlocked = HashSet::new();
    let policy = DropPolicy::new(false, &unlocked);

    let droppables = vec![
        Droppable {
            id: DropId::Slot {
                container: ContainerKey::TopLevel,
                index: 0,
            },
            rect: Rect::new(0.0, 0.0, 400.0, 8.0),
        },
        Droppable {
            id: DropId::Group("g1".into()),
            rect: Rect::new(0.0, 8.0, 400.0, 200.0),
        },
        Droppable {
            id: DropId::Slot {
                container: ContainerKey::TopLevel,
                index: 2,
            },
            rect: Rect::new(0.0, 300.0, 400.0, 8.0),
        },
    ];

    // The dragged card hovers over the middle of the group zone.
    let dragged = Rect::new(10.0, 60.0, 380.0, 60.0);
    let pointer = Point::new(200.0, 90.0);
    let candidates = detect_collisions(&dragged, Some(pointer), &droppables, 64.0);

    let mut drag = DragController::new(&tree);
    assert!(drag.drag_start(&tree, &"b3".into(), &policy));
    assert_eq!(drag.drag_over(&candidates, &policy), DropTarget::Group("g1".into()));
    let next = committed(drag.drag_end(&tree));
    assert_eq!(ids(&next[0].blocks), vec!["b1", "b2", "b3"]);
}

#[test]
fn host_edit_mid_drag_aborts_the_gesture() {
    let tree = group_and_loose();
    let unlocked = HashSet::new();
    let policy = DropPolicy::new(false, &unlocked);

    let mut drag = DragController::new(&tree);
    assert!(drag.drag_start(&tree, &"b3".into(), &policy));
    drag.drag_over(&[DropId::Group("g1".into())], &policy);

    let edited = vec![text("b3")];
    drag.sync_tree(&edited);
    assert!(!drag.is_dragging());
    assert_eq!(drag.drag_end(&edited), DragOutcome::Idle);
}
