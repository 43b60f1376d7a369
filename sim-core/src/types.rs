/// Identifier for a branch in a [`crate::tree::BranchGraph`].
///
/// This is an index into the graph's branch arena. Branches are never
/// removed, so an id stays valid for the lifetime of the graph that
/// produced it.
pub type BranchId = usize;
