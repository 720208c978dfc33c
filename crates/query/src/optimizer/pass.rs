//! Optimizer pass trait.

use crate::model::{ModelId, QueryModelArena};
use strata_core::Result;

/// An optimization pass that rewrites a query model chain in place.
pub trait OptimizerPass {
    /// Optimizes the chain rooted at `root` and returns its new root.
    ///
    /// A pass that finds nothing to rewrite returns `root` unchanged. Errors
    /// are compilation failures and abort the whole compilation.
    fn optimize(&mut self, arena: &mut QueryModelArena, root: ModelId) -> Result<ModelId>;

    /// Returns the name of this pass.
    fn name(&self) -> &'static str {
        "unnamed"
    }
}
