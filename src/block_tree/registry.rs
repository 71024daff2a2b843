use std::collections::HashMap;
use std::fmt;

use super::block::{Block, BlockId};

const TOP_LEVEL: &str = "top-level";
const GROUP_PREFIX: &str = "group-";

/// A container: the top-level sequence or one group's children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerKey {
    TopLevel,
    Group(BlockId),
}

impl ContainerKey {
    pub fn group_id(&self) -> Option<&BlockId> {
        match self {
            ContainerKey::TopLevel => None,
            ContainerKey::Group(id) => Some(id),
        }
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKey::TopLevel => f.write_str(TOP_LEVEL),
            ContainerKey::Group(id) => write!(f, "{GROUP_PREFIX}{id}"),
        }
    }
}

/// Container key -> ordered member IDs.
///
/// Rebuilt from the tree after every committed change. During a drag it is
/// edited in place for live feedback, but commits never read from it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerRegistry {
    containers: HashMap<ContainerKey, Vec<BlockId>>,
}

impl ContainerRegistry {
    pub fn rebuild(tree: &[Block]) -> Self {
        let mut containers = HashMap::with_capacity(1 + tree.len());
        containers.insert(
            ContainerKey::TopLevel,
            tree.iter().map(|b| b.id.clone()).collect(),
        );
        for group in tree.iter().filter(|b| b.is_group()) {
            containers.insert(
                ContainerKey::Group(group.id.clone()),
                group.blocks.iter().map(|b| b.id.clone()).collect(),
            );
        }
        Self { containers }
    }

    pub fn members(&self, key: &ContainerKey) -> Option<&[BlockId]> {
        self.containers.get(key).map(Vec::as_slice)
    }

    pub fn container_of(&self, id: &BlockId) -> Option<&ContainerKey> {
        self.containers
            .iter()
            .find(|(_, members)| members.contains(id))
            .map(|(key, _)| key)
    }

    pub fn index_of(&self, key: &ContainerKey, id: &BlockId) -> Option<usize> {
        self.members(key)?.iter().position(|m| m == id)
    }

    /// Array move inside one container. Out-of-range indices or an unknown
    /// container leave the registry as it was.
    pub fn reorder_within(&self, key: &ContainerKey, from: usize, to: usize) -> Self {
        let mut next = self.clone();
        if let Some(members) = next.containers.get_mut(key) {
            if from < members.len() && to < members.len() && from != to {
                let id = members.remove(from);
                members.insert(to, id);
            }
        }
        next
    }

    /// Moves `id` from wherever it is into `to` at `index` (clamped).
    /// Unknown IDs or containers leave the registry as it was.
    pub fn transfer(&self, id: &BlockId, to: &ContainerKey, index: usize) -> Self {
        let Some(from) = self.container_of(id).cloned() else {
            return self.clone();
        };
        if !self.containers.contains_key(to) {
            return self.clone();
        }
        let mut next = self.clone();
        if let Some(members) = next.containers.get_mut(&from) {
            members.retain(|m| m != id);
        }
        if let Some(members) = next.containers.get_mut(to) {
            let index = index.min(members.len());
            members.insert(index, id.clone());
        }
        next
    }
}
