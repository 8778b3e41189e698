use crate::{
    pipe::PipeBranch,
    raycast::{CollisionQuery, RayHit, closest},
    types::BranchId,
};
use glam::Vec3;
use std::collections::BTreeMap;

/// Every live branch, keyed by id, together with the parent/child links
/// produced by splits.
///
/// The forest doubles as the scene for collision queries: a ray is tested
/// against the mesh of every branch currently stored here.
#[derive(Debug, Default)]
pub struct PipeForest {
    branches: BTreeMap<BranchId, PipeBranch>,
    next_id: BranchId,
}

impl PipeForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a branch under a fresh id and returns that id.
    pub fn insert(&mut self, mut branch: PipeBranch) -> BranchId {
        let id = self.next_id;
        self.next_id += 1;
        branch.set_id(id);
        self.branches.insert(id, branch);
        id
    }

    /// Stores a split-off child and links it below `parent`.
    pub fn add_child(&mut self, parent: BranchId, child: PipeBranch) -> BranchId {
        let id = self.insert(child);
        if let Some(p) = self.branches.get_mut(&parent) {
            p.set_child(id);
        }
        id
    }

    pub fn get(&self, id: BranchId) -> Option<&PipeBranch> {
        self.branches.get(&id)
    }

    pub fn get_mut(&mut self, id: BranchId) -> Option<&mut PipeBranch> {
        self.branches.get_mut(&id)
    }

    pub fn contains(&self, id: BranchId) -> bool {
        self.branches.contains_key(&id)
    }

    /// Releases a branch and its geometry.
    pub fn remove(&mut self, id: BranchId) -> Option<PipeBranch> {
        self.branches.remove(&id)
    }

    /// Puts back a branch previously taken out with [`PipeForest::remove`],
    /// under its existing id.
    pub fn restore(&mut self, branch: PipeBranch) {
        self.branches.insert(branch.id(), branch);
    }

    pub fn ids(&self) -> Vec<BranchId> {
        self.branches.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipeBranch> {
        self.branches.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PipeBranch> {
        self.branches.values_mut()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Follows child links down to the branch currently carrying growth.
    pub fn newest_descendant(&self, id: BranchId) -> BranchId {
        let mut current = id;
        while let Some(child) = self.get(current).and_then(PipeBranch::child) {
            if !self.contains(child) {
                break;
            }
            current = child;
        }
        current
    }

    /// The chain from the eldest live ancestor down to `id`, inclusive.
    pub fn lineage(&self, id: BranchId) -> Vec<BranchId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(PipeBranch::parent) {
            if !self.contains(parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Every live member of the family containing `id`, eldest first.
    pub fn family_members(&self, id: BranchId) -> Vec<BranchId> {
        let mut members = self.lineage(id);
        let mut current = id;
        while let Some(child) = self.get(current).and_then(PipeBranch::child) {
            if !self.contains(child) {
                break;
            }
            members.push(child);
            current = child;
        }
        members
    }
}

impl CollisionQuery for PipeForest {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.branches.values().fold(None, |best, branch| {
            closest(best, branch.mesh().raycast(origin, direction, max_distance))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::PipeConfig, mesh::Mesh};
    use approx::assert_relative_eq;

    fn branch_at(x: f32) -> PipeBranch {
        PipeBranch::new(
            Mesh::cube(1.0).with_origin(Vec3::new(x, 0.0, 0.0)),
            PipeConfig::default(),
        )
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut forest = PipeForest::new();
        let a = forest.insert(branch_at(0.0));
        let b = forest.insert(branch_at(1.0));

        assert_eq!((a, b), (0, 1));
        assert_eq!(forest.get(b).unwrap().id(), b);
        assert_eq!(forest.len(), 2);

        forest.remove(a);
        let c = forest.insert(branch_at(2.0));
        assert_eq!(c, 2);
    }

    #[test]
    fn child_links_resolve_both_ways() {
        let mut forest = PipeForest::new();
        let root = forest.insert(branch_at(0.0));
        let mid = forest.add_child(root, branch_at(1.0));
        let leaf = forest.add_child(mid, branch_at(2.0));

        // Parents are normally set by the split itself; mimic that here.
        for (child, parent) in [(mid, root), (leaf, mid)] {
            let mut b = forest.remove(child).unwrap();
            b.set_parent(parent);
            forest.restore(b);
        }

        assert_eq!(forest.newest_descendant(root), leaf);
        assert_eq!(forest.newest_descendant(leaf), leaf);
        assert_eq!(forest.lineage(leaf), vec![root, mid, leaf]);
        assert_eq!(forest.lineage(root), vec![root]);

        assert_eq!(forest.family_members(mid), vec![root, mid, leaf]);

        forest.remove(root);
        assert_eq!(forest.lineage(leaf), vec![mid, leaf]);
    }

    #[test]
    fn raycast_returns_closest_branch_hit() {
        let mut forest = PipeForest::new();
        forest.insert(branch_at(10.0));
        let near = forest.insert(branch_at(4.0));

        let start = Vec3::new(0.0, 0.2, 0.1);
        let hit = forest.raycast(start, Vec3::X, 20.0).unwrap();
        assert_relative_eq!(hit.distance, 3.5, epsilon = 1e-5);

        // A branch taken out for its own update is invisible to the query.
        let taken = forest.remove(near).unwrap();
        let hit = forest.raycast(start, Vec3::X, 20.0).unwrap();
        assert_relative_eq!(hit.distance, 9.5, epsilon = 1e-5);
        forest.restore(taken);
        assert!(forest.contains(near));
    }
}
