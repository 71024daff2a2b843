//! Lookups and whole-tree operations over the two-level course forest.
//!
//! The tree is a plain `[Block]`: the top-level sequence, where group blocks
//! carry their children in `blocks`. Nothing here recurses below one level
//! of nesting.

use std::collections::HashSet;

use super::block::{Block, BlockId, BlockKind};
use super::error::TreeError;
use super::registry::ContainerKey;

/// Searches the top level, then the children of each group.
pub fn find_block_by_id<'a>(tree: &'a [Block], id: &BlockId) -> Option<&'a Block> {
    tree.iter().find(|b| &b.id == id).or_else(|| {
        tree.iter()
            .filter(|b| b.is_group())
            .find_map(|g| g.blocks.iter().find(|b| &b.id == id))
    })
}

/// Container and index of `id`, read from tree position.
pub fn locate(tree: &[Block], id: &BlockId) -> Option<(ContainerKey, usize)> {
    if let Some(index) = tree.iter().position(|b| &b.id == id) {
        return Some((ContainerKey::TopLevel, index));
    }
    tree.iter().filter(|b| b.is_group()).find_map(|g| {
        g.blocks
            .iter()
            .position(|b| &b.id == id)
            .map(|index| (ContainerKey::Group(g.id.clone()), index))
    })
}

pub fn container_members<'a>(tree: &'a [Block], key: &ContainerKey) -> Option<&'a [Block]> {
    match key {
        ContainerKey::TopLevel => Some(tree),
        ContainerKey::Group(group_id) => tree
            .iter()
            .find(|b| &b.id == group_id && b.is_group())
            .map(|g| g.blocks.as_slice()),
    }
}

pub(crate) fn container_members_mut<'a>(
    tree: &'a mut Vec<Block>,
    key: &ContainerKey,
) -> Option<&'a mut Vec<Block>> {
    match key {
        ContainerKey::TopLevel => Some(tree),
        ContainerKey::Group(group_id) => tree
            .iter_mut()
            .find(|b| &b.id == group_id && b.is_group())
            .map(|g| &mut g.blocks),
    }
}

/// Depth-first walk: each top-level block followed by its children.
///
/// Finite and restartable; call `flatten` again (or clone the iterator) to
/// walk from the start.
#[derive(Clone, Debug)]
pub struct Flatten<'a> {
    tree: &'a [Block],
    top: usize,
    child: Option<usize>,
}

pub fn flatten(tree: &[Block]) -> Flatten<'_> {
    Flatten {
        tree,
        top: 0,
        child: None,
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<&'a Block> {
        loop {
            let parent = self.tree.get(self.top)?;
            match self.child {
                None => {
                    self.child = Some(0);
                    return Some(parent);
                }
                Some(i) => {
                    if let Some(child) = parent.blocks.get(i) {
                        self.child = Some(i + 1);
                        return Some(child);
                    }
                    self.top += 1;
                    self.child = None;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest: usize = self
            .tree
            .iter()
            .skip(self.top)
            .map(|b| 1 + b.blocks.len())
            .sum();
        (0, Some(rest))
    }
}

pub fn block_count(tree: &[Block]) -> usize {
    flatten(tree).count()
}

/// Checks ID uniqueness, the two-level limit and that only groups have
/// children.
pub fn validate(tree: &[Block]) -> Result<(), TreeError> {
    let mut seen = HashSet::new();
    for block in tree {
        if !block.is_group() && !block.blocks.is_empty() {
            return Err(TreeError::ChildrenOnLeaf(block.id.clone()));
        }
        for child in &block.blocks {
            if child.is_group() {
                return Err(TreeError::NestedGroup(child.id.clone()));
            }
            if !child.blocks.is_empty() {
                return Err(TreeError::ChildrenOnLeaf(child.id.clone()));
            }
        }
    }
    for block in flatten(tree) {
        if !seen.insert(&block.id) {
            return Err(TreeError::DuplicateId(block.id.clone()));
        }
    }
    Ok(())
}

/// Rewrites `order` to match array position.
pub fn renumber(container: &mut [Block]) {
    for (index, block) in container.iter_mut().enumerate() {
        block.order = index;
    }
}

/// Renumbers a group's children and points their `group_id` back at it.
pub fn renumber_group(group: &mut Block) {
    let group_id = group.id.clone();
    for (index, child) in group.blocks.iter_mut().enumerate() {
        child.order = index;
        child.group_id = Some(group_id.clone());
    }
}

pub(crate) fn renumber_container(tree: &mut Vec<Block>, key: &ContainerKey) {
    match key {
        ContainerKey::TopLevel => renumber(tree),
        ContainerKey::Group(group_id) => {
            if let Some(group) = tree.iter_mut().find(|b| &b.id == group_id) {
                renumber_group(group);
            }
        }
    }
}

/// Renumbers every container in the tree.
pub fn renumber_all(tree: &mut [Block]) {
    renumber(tree);
    for group in tree.iter_mut().filter(|b| b.is_group()) {
        renumber_group(group);
    }
}

pub fn new_block(kind: BlockKind) -> Block {
    let title = format!("New {}", kind.label().to_lowercase());
    if kind == BlockKind::Group {
        Block::group(BlockId::generate(), title, Vec::new())
    } else {
        Block::new(BlockId::generate(), kind, title)
    }
}

/// Appends `block` to the top level or to `group`.
pub fn insert_block(
    tree: &[Block],
    group: Option<&BlockId>,
    mut block: Block,
) -> Result<Vec<Block>, TreeError> {
    if find_block_by_id(tree, &block.id).is_some() {
        return Err(TreeError::DuplicateId(block.id));
    }
    let mut next = tree.to_vec();
    match group {
        None => {
            block.group_id = None;
            next.push(block);
            renumber(&mut next);
        }
        Some(group_id) => {
            if block.is_group() {
                return Err(TreeError::NestedGroup(block.id));
            }
            let target = next
                .iter_mut()
                .find(|b| &b.id == group_id && b.is_group())
                .ok_or_else(|| TreeError::GroupNotFound(group_id.clone()))?;
            target.blocks.push(block);
            renumber_group(target);
        }
    }
    Ok(next)
}

/// Replaces the block with the same ID, keeping its position, order and
/// (for groups) its children.
pub fn update_block(tree: &[Block], edited: Block) -> Result<Vec<Block>, TreeError> {
    let (key, index) =
        locate(tree, &edited.id).ok_or_else(|| TreeError::BlockNotFound(edited.id.clone()))?;
    let keeps_children = edited.is_group();
    let mut next = tree.to_vec();
    let container = container_members_mut(&mut next, &key)
        .ok_or_else(|| TreeError::BlockNotFound(edited.id.clone()))?;
    let slot = &mut container[index];
    let children = std::mem::take(&mut slot.blocks);
    let group_id = slot.group_id.take();
    *slot = Block {
        order: index,
        group_id,
        blocks: if keeps_children { children } else { Vec::new() },
        ..edited
    };
    Ok(next)
}

/// Removes a block from whichever container holds it. Removing a group
/// drops its children with it.
pub fn remove_block(tree: &[Block], id: &BlockId) -> Result<Vec<Block>, TreeError> {
    let (key, index) = locate(tree, id).ok_or_else(|| TreeError::BlockNotFound(id.clone()))?;
    let mut next = tree.to_vec();
    if let Some(container) = container_members_mut(&mut next, &key) {
        container.remove(index);
    }
    renumber_container(&mut next, &key);
    Ok(next)
}

/// Parses and validates a saved course, refreshing `order` from position.
pub fn from_json(raw: &str) -> Result<Vec<Block>, TreeError> {
    let mut tree: Vec<Block> = serde_json::from_str(raw)?;
    validate(&tree)?;
    renumber_all(&mut tree);
    Ok(tree)
}

/// Serializes the tree with `order` recomputed from position.
pub fn to_json(tree: &[Block]) -> Result<String, TreeError> {
    validate(tree)?;
    let mut wire = tree.to_vec();
    renumber_all(&mut wire);
    Ok(serde_json::to_string_pretty(&wire)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str) -> Block {
        Block::new(id, BlockKind::Text, id)
    }

    fn sample() -> Vec<Block> {
        vec![
            Block::group("g1", "Week 1", vec![text("b1"), text("b2")]),
            text("b3"),
            Block::group("g2", "Week 2", vec![text("b4")]),
        ]
    }

    #[test]
    fn find_searches_one_level_deep() {
        let tree = sample();
        assert_eq!(find_block_by_id(&tree, &"b3".into()).unwrap().id.as_str(), "b3");
        assert_eq!(find_block_by_id(&tree, &"b4".into()).unwrap().id.as_str(), "b4");
        assert!(find_block_by_id(&tree, &"missing".into()).is_none());
    }

    #[test]
    fn find_does_not_descend_past_one_level() {
        let mut inner = Block::group("g-inner", "inner", vec![text("deep")]);
        inner.group_id = Some("g-outer".into());
        let tree = vec![Block::group("g-outer", "outer", vec![inner])];
        assert!(find_block_by_id(&tree, &"g-inner".into()).is_some());
        assert!(find_block_by_id(&tree, &"deep".into()).is_none());
    }

    #[test]
    fn locate_reports_container_and_index() {
        let tree = sample();
        assert_eq!(locate(&tree, &"b3".into()), Some((ContainerKey::TopLevel, 1)));
        assert_eq!(
            locate(&tree, &"b2".into()),
            Some((ContainerKey::Group("g1".into()), 1))
        );
        assert_eq!(locate(&tree, &"nope".into()), None);
    }

    #[test]
    fn flatten_is_depth_first_and_restartable() {
        let tree = sample();
        let walk = flatten(&tree);
        let ids: Vec<&str> = walk.clone().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "b1", "b2", "b3", "g2", "b4"]);
        let again: Vec<&str> = walk.map(|b| b.id.as_str()).collect();
        assert_eq!(ids, again);
        assert_eq!(block_count(&tree), 6);
        assert_eq!(block_count(&[]), 0);
    }

    #[test]
    fn validate_catches_duplicates_and_nesting() {
        assert!(validate(&sample()).is_ok());

        let dup = vec![text("a"), Block::group("g", "g", vec![text("a")])];
        assert!(matches!(validate(&dup), Err(TreeError::DuplicateId(id)) if id.as_str() == "a"));

        let nested = vec![Block::group("g", "g", vec![Block::group("h", "h", vec![])])];
        assert!(matches!(validate(&nested), Err(TreeError::NestedGroup(_))));

        let mut leaf = text("x");
        leaf.blocks.push(text("y"));
        assert!(matches!(validate(&[leaf]), Err(TreeError::ChildrenOnLeaf(_))));
    }

    #[test]
    fn insert_appends_and_sets_group_id() {
        let tree = sample();
        let next = insert_block(&tree, Some(&"g2".into()), text("b5")).unwrap();
        let g2 = find_block_by_id(&next, &"g2".into()).unwrap();
        assert_eq!(g2.blocks.last().unwrap().id.as_str(), "b5");
        assert_eq!(g2.blocks[1].order, 1);
        assert_eq!(g2.blocks[1].group_id, Some("g2".into()));

        let top = insert_block(&next, None, text("b6")).unwrap();
        assert_eq!(top.last().unwrap().order, 3);
        assert!(top.last().unwrap().group_id.is_none());

        assert!(matches!(
            insert_block(&tree, None, text("b1")),
            Err(TreeError::DuplicateId(_))
        ));
        assert!(matches!(
            insert_block(&tree, Some(&"b3".into()), text("b9")),
            Err(TreeError::GroupNotFound(_))
        ));
    }

    #[test]
    fn update_keeps_position_and_children() {
        let tree = sample();
        let mut edited = Block::group("g1", "Renamed", Vec::new());
        edited.description = Some("about".into());
        let next = update_block(&tree, edited).unwrap();
        assert_eq!(next[0].title, "Renamed");
        assert_eq!(next[0].blocks.len(), 2);

        let retitled = Block::new("b2", BlockKind::Markdown, "md").with_payload("content", "# hi");
        let next = update_block(&next, retitled).unwrap();
        let b2 = &next[0].blocks[1];
        assert_eq!(b2.kind, BlockKind::Markdown);
        assert_eq!(b2.order, 1);
        assert_eq!(b2.payload["content"], "# hi");
    }

    #[test]
    fn remove_renumbers_the_container() {
        let tree = sample();
        let next = remove_block(&tree, &"b1".into()).unwrap();
        assert_eq!(next[0].blocks.len(), 1);
        assert_eq!(next[0].blocks[0].order, 0);

        let next = remove_block(&next, &"g1".into()).unwrap();
        assert_eq!(block_count(&next), 3);
        assert_eq!(next[0].id.as_str(), "b3");
        assert_eq!(next[0].order, 0);
        assert!(matches!(
            remove_block(&next, &"b1".into()),
            Err(TreeError::BlockNotFound(_))
        ));
    }

    #[test]
    fn json_boundary_recomputes_order() {
        let raw = r#"[
            {"id": "b1", "type": "text", "title": "Intro", "order": 7, "content": "hello"},
            {"id": "g1", "type": "group", "title": "W1", "order": 0, "description": "",
             "blocks": [{"id": "b2", "type": "image", "title": "pic", "order": 4, "url": "a.png"}]}
        ]"#;
        let tree = from_json(raw).unwrap();
        assert_eq!(tree[0].order, 0);
        assert_eq!(tree[1].order, 1);
        assert_eq!(tree[1].blocks[0].order, 0);
        assert_eq!(tree[1].blocks[0].group_id, Some("g1".into()));
        assert_eq!(tree[1].blocks[0].payload["url"], "a.png");

        let out = to_json(&tree).unwrap();
        assert_eq!(from_json(&out).unwrap(), tree);

        assert!(matches!(from_json("{"), Err(TreeError::Json(_))));
    }
}
