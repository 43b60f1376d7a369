use crate::{attractor::Assignment, types::BranchId};
use glam::Vec3;

/// Scratch buffer that accumulates attraction directions per branch.
///
/// For each `BranchId` it stores the sum of the unit vectors pointing from
/// the branch end toward its assigned attractors, and how many were added.
/// `dir[i]` and `count[i]` belong to branch `i`.
#[derive(Clone, Debug, Default)]
pub struct InfluenceBuffer {
    /// Accumulated unit directions per branch.
    dir: Vec<Vec3>,
    /// Number of contributions per branch.
    count: Vec<u32>,
}

impl InfluenceBuffer {
    /// Creates a zeroed buffer for `len` branches.
    pub fn with_len(len: usize) -> Self {
        Self {
            dir: vec![Vec3::ZERO; len],
            count: vec![0; len],
        }
    }

    /// Resizes the buffer to `len` entries and clears every entry, even if
    /// the length was already correct.
    pub fn ensure_len(&mut self, len: usize) {
        if self.dir.len() != len {
            self.dir.resize(len, Vec3::ZERO);
            self.count.resize(len, 0);
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        self.dir.fill(Vec3::ZERO);
        self.count.fill(0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }

    /// Adds one direction for `id`.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: BranchId, dir: Vec3) {
        self.dir[id] += dir;
        self.count[id] += 1;
    }

    /// Refills the buffer from an assignment: for every branch, the unit
    /// vectors from `ends[id]` to each of its attractors.
    ///
    /// An attractor sitting exactly on a branch end contributes a zero
    /// vector but still counts.
    pub fn accumulate(
        &mut self,
        ends: impl ExactSizeIterator<Item = Vec3>,
        assignment: &Assignment,
    ) {
        self.ensure_len(ends.len());
        for (id, (end, attractors)) in ends.zip(&assignment.per_branch).enumerate() {
            for &a in attractors {
                self.add(id, (a - end).normalize_or_zero());
            }
        }
    }

    /// Mean of the directions added for `id`, or `Vec3::ZERO` if none.
    #[inline]
    pub fn avg_dir(&self, id: BranchId) -> Vec3 {
        let c = self.count[id];
        if c == 0 {
            Vec3::ZERO
        } else {
            self.dir[id] / (c as f32)
        }
    }

    #[inline]
    pub fn is_influenced(&self, id: BranchId) -> bool {
        self.count[id] > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_len_initializes_zeroed_state() {
        let buf = InfluenceBuffer::with_len(5);
        assert_eq!(buf.len(), 5);
        for id in 0..5 {
            assert!(!buf.is_influenced(id));
            assert_eq!(buf.avg_dir(id), Vec3::ZERO);
        }
    }

    #[test]
    fn ensure_len_resizes_and_clears() {
        let mut buf = InfluenceBuffer::with_len(2);
        buf.add(0, Vec3::X);

        buf.ensure_len(2);
        assert!(!buf.is_influenced(0));

        buf.add(1, Vec3::X);
        buf.ensure_len(4);
        assert_eq!(buf.len(), 4);
        assert!((0..4).all(|id| !buf.is_influenced(id)));

        buf.ensure_len(1);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.avg_dir(0), Vec3::ZERO);
    }

    #[test]
    fn add_and_avg_dir_work_as_expected() {
        let mut buf = InfluenceBuffer::with_len(2);
        buf.add(1, Vec3::new(1.0, 0.0, 0.0));
        buf.add(1, Vec3::new(3.0, 0.0, 2.0));

        assert!(buf.is_influenced(1));
        assert_eq!(buf.avg_dir(1), Vec3::new(2.0, 0.0, 1.0));
    }

    #[test]
    fn clear_drops_every_contribution() {
        let mut buf = InfluenceBuffer::with_len(4);
        buf.add(0, Vec3::X);
        buf.add(2, Vec3::Y);

        buf.clear();
        assert_eq!(buf.len(), 4);
        assert!((0..4).all(|id| !buf.is_influenced(id)));
    }

    #[test]
    fn accumulate_uses_unit_vectors_from_branch_end() {
        let ends = [Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)];
        let assignment = Assignment {
            per_branch: vec![
                vec![Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.5)],
                vec![],
            ],
            active: vec![0, 1],
        };

        let mut buf = InfluenceBuffer::default();
        buf.accumulate(ends.into_iter(), &assignment);

        assert_eq!(buf.len(), 2);
        assert_eq!(buf.avg_dir(0), Vec3::new(0.5, 0.0, 0.5));
        assert!(!buf.is_influenced(1));
    }

    #[test]
    fn opposite_attractors_cancel_out() {
        let assignment = Assignment {
            per_branch: vec![vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0)]],
            active: vec![0, 1],
        };
        let mut buf = InfluenceBuffer::default();
        buf.accumulate([Vec3::ZERO].into_iter(), &assignment);

        assert!(buf.is_influenced(0));
        assert_eq!(buf.avg_dir(0), Vec3::ZERO);
    }
}
