use crate::types::BranchId;
use glam::Vec3;

/// One segment of the tree skeleton.
///
/// Position and direction never change once the branch exists; `size`,
/// `attractors`, `children`, `grown` and `ring_base` are updated by the
/// growth and meshing passes.
#[derive(Clone, Debug)]
pub struct Branch {
    pub start: Vec3,
    pub end: Vec3,
    /// Unit growth direction.
    pub direction: Vec3,
    pub parent: Option<BranchId>,
    pub children: Vec<BranchId>,
    /// Tube radius at the end of this branch.
    pub size: f32,
    /// Attractor positions assigned during the latest iteration.
    pub attractors: Vec<Vec3>,
    /// Index of this branch's vertex ring in the latest mesh.
    pub ring_base: usize,
    pub distance_from_root: u32,
    /// Set once an iteration completed while this branch was an extremity.
    pub grown: bool,
}

/// Read-only view of a branch for debug drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
    pub direction: Vec3,
}

/// Append-only arena of branches plus the current growth frontier.
#[derive(Clone, Debug)]
pub struct BranchGraph {
    branches: Vec<Branch>,
    extremities: Vec<BranchId>,
}

impl Branch {
    pub fn new_root(start: Vec3, length: f32) -> Self {
        Self {
            start,
            end: start + Vec3::Y * length,
            direction: Vec3::Y,
            parent: None,
            children: Vec::with_capacity(4),
            size: 0.0,
            attractors: Vec::new(),
            ring_base: 0,
            distance_from_root: 0,
            grown: false,
        }
    }

    pub fn new_child(parent_id: BranchId, parent: &Branch, direction: Vec3, length: f32) -> Self {
        Self {
            start: parent.end,
            end: parent.end + direction * length,
            direction,
            parent: Some(parent_id),
            children: Vec::with_capacity(4),
            size: 0.0,
            attractors: Vec::new(),
            ring_base: 0,
            distance_from_root: parent.distance_from_root + 1,
            grown: false,
        }
    }

    /// A childless branch still animating toward its end point.
    #[inline]
    pub fn is_growing_tip(&self) -> bool {
        self.children.is_empty() && !self.grown
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        Segment {
            start: self.start,
            end: self.end,
            direction: self.direction,
        }
    }
}

impl BranchGraph {
    /// The id of the root branch.
    pub const ROOT: BranchId = 0;

    /// Creates a graph with a single vertical root branch, which is also the
    /// only extremity.
    pub fn new(start: Vec3, branch_length: f32) -> Self {
        Self {
            branches: vec![Branch::new_root(start, branch_length)],
            extremities: vec![Self::ROOT],
        }
    }

    /// Appends a child of `parent` growing along `direction`.
    ///
    /// `direction` is expected to be unit length. The frontier is left
    /// untouched; callers decide how extremities are replaced.
    pub fn add_child(&mut self, parent: BranchId, direction: Vec3, length: f32) -> BranchId {
        let id = self.branches.len();
        let child = Branch::new_child(parent, &self.branches[parent], direction, length);
        self.branches.push(child);
        self.branches[parent].children.push(id);
        id
    }

    #[inline]
    pub fn root(&self) -> &Branch {
        &self.branches[Self::ROOT]
    }

    #[inline]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    #[inline]
    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id]
    }

    pub(crate) fn branches_mut(&mut self) -> &mut [Branch] {
        &mut self.branches
    }

    #[inline]
    pub fn extremities(&self) -> &[BranchId] {
        &self.extremities
    }

    pub(crate) fn set_extremities(&mut self, extremities: Vec<BranchId>) {
        self.extremities = extremities;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Start, end and direction of every branch, in creation order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.branches.iter().map(Branch::segment)
    }

    /// Marks every current extremity as grown.
    pub fn mark_extremities_grown(&mut self) {
        for &id in &self.extremities {
            self.branches[id].grown = true;
        }
    }

    /// Recomputes every branch radius bottom-up.
    ///
    /// Children are always created after their parent, so walking the arena
    /// backwards finalizes every child before its parent is visited. Leaves
    /// get `extremity_size`; a parent gets `(sum child.size^p)^(1/p)`.
    pub fn propagate_sizes(&mut self, extremity_size: f32, exponent: f32) {
        for i in (0..self.branches.len()).rev() {
            let size = if self.branches[i].children.is_empty() {
                extremity_size
            } else {
                self.branches[i]
                    .children
                    .iter()
                    .map(|&c| self.branches[c].size.powf(exponent))
                    .sum::<f32>()
                    .powf(exponent.recip())
            };
            self.branches[i].size = size;
        }
    }

    /// Returns the branch whose end point is closest to `pos`, with the
    /// distance to it. Ties keep the earliest branch.
    pub fn nearest_end(&self, pos: Vec3) -> Option<(BranchId, f32)> {
        let mut best = None;
        let mut best_d = f32::MAX;
        for (id, b) in self.branches.iter().enumerate() {
            let d = b.end.distance(pos);
            if d < best_d {
                best_d = d;
                best = Some(id);
            }
        }
        best.map(|id| (id, best_d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn new_graph_has_vertical_root_as_only_extremity() {
        let g = BranchGraph::new(Vec3::new(1.0, 0.0, 2.0), 0.5);
        assert_eq!(g.len(), 1);
        assert_eq!(g.extremities(), &[BranchGraph::ROOT]);

        let root = g.root();
        assert_eq!(root.start, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(root.end, Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(root.direction, Vec3::Y);
        assert!(root.parent.is_none());
        assert!(root.is_growing_tip());
    }

    #[test]
    fn add_child_links_both_ways_and_starts_at_parent_end() {
        let mut g = BranchGraph::new(Vec3::ZERO, 1.0);
        let c = g.add_child(0, Vec3::X, 2.0);

        assert_eq!(c, 1);
        assert_eq!(g.branch(0).children, vec![1]);
        assert_eq!(g.branch(c).parent, Some(0));
        assert_eq!(g.branch(c).start, g.branch(0).end);
        assert_eq!(g.branch(c).end, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(g.branch(c).distance_from_root, 1);
        // Frontier is managed by the caller.
        assert_eq!(g.extremities(), &[0]);
    }

    #[test]
    fn leaf_sizes_use_extremity_constant() {
        let mut g = BranchGraph::new(Vec3::ZERO, 1.0);
        g.propagate_sizes(0.05, 2.0);
        assert_eq!(g.root().size, 0.05);
    }

    #[test]
    fn parent_size_follows_pipe_model() {
        // root -> a -> (b, c); b -> d
        let mut g = BranchGraph::new(Vec3::ZERO, 1.0);
        let a = g.add_child(0, Vec3::Y, 1.0);
        let b = g.add_child(a, Vec3::X, 1.0);
        let c = g.add_child(a, Vec3::Z, 1.0);
        let d = g.add_child(b, Vec3::X, 1.0);

        let p = 2.5;
        g.propagate_sizes(0.1, p);

        assert_eq!(g.branch(d).size, 0.1);
        assert_eq!(g.branch(c).size, 0.1);
        // Single child: same size as the child.
        assert!((g.branch(b).size - 0.1).abs() < EPS);

        let expected_a = (g.branch(b).size.powf(p) + g.branch(c).size.powf(p)).powf(1.0 / p);
        assert!((g.branch(a).size - expected_a).abs() < EPS);
        assert!((g.root().size - expected_a).abs() < EPS);
    }

    #[test]
    fn exponent_two_is_euclidean() {
        let mut g = BranchGraph::new(Vec3::ZERO, 1.0);
        g.add_child(0, Vec3::X, 1.0);
        g.add_child(0, Vec3::Z, 1.0);
        g.propagate_sizes(3.0, 2.0);
        // sqrt(3^2 + 3^2)
        assert!((g.root().size - 18.0_f32.sqrt()).abs() < EPS);
    }

    #[test]
    fn mark_extremities_grown_only_touches_frontier() {
        let mut g = BranchGraph::new(Vec3::ZERO, 1.0);
        let c = g.add_child(0, Vec3::Y, 1.0);
        g.set_extremities(vec![c]);
        g.mark_extremities_grown();
        assert!(g.branch(c).grown);
        assert!(!g.root().grown);
    }

    #[test]
    fn nearest_end_finds_closest_branch_end() {
        let mut g = BranchGraph::new(Vec3::ZERO, 1.0);
        g.add_child(0, Vec3::X, 1.0);
        g.add_child(0, Vec3::NEG_X, 1.0);

        let (id, d) = g.nearest_end(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(id, 0);
        assert_eq!(d, 0.0);

        let (id, _) = g.nearest_end(Vec3::new(0.0, 1.0, 5.0)).unwrap();
        assert_eq!(id, 0);

        let (id, d) = g.nearest_end(Vec3::new(-1.5, 1.0, 0.0)).unwrap();
        assert_eq!(id, 2);
        assert!((d - 0.5).abs() < EPS);
    }

    #[test]
    fn segments_follow_creation_order() {
        let mut g = BranchGraph::new(Vec3::ZERO, 1.0);
        g.add_child(0, Vec3::X, 1.0);
        let segs: Vec<Segment> = g.segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].start, Vec3::Y);
        assert_eq!(segs[1].direction, Vec3::X);
    }
}
