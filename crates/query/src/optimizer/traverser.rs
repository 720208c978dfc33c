//! Query model chain traversal.
//!
//! The traverser walks a chain of nested query models from the outermost
//! stage inward and lets a [`ModelVisitor`] replace each stage. Whatever
//! the visitor returns takes the place of the visited model: it becomes the
//! new root on the first step and is linked into the previous stage's
//! nested slot on every later step.

use crate::model::{ModelId, QueryModelArena};
use strata_core::{Error, Result};

/// Rewrites one stage of a query model chain.
///
/// `next` is the nested model of `curr` as it was before the call, so the
/// visitor may freely change or clear the nested link of `curr`.
///
/// The returned model must be either `curr`, a model from the remainder of
/// the chain, or a new model linked into the remainder. Returning a model
/// that precedes `curr` in the chain corrupts it.
pub trait ModelVisitor {
    /// Returns the model that now occupies the position of `curr`.
    fn visit(
        &mut self,
        arena: &mut QueryModelArena,
        curr: ModelId,
        next: Option<ModelId>,
    ) -> Result<ModelId>;
}

impl<F> ModelVisitor for F
where
    F: FnMut(&mut QueryModelArena, ModelId, Option<ModelId>) -> Result<ModelId>,
{
    fn visit(
        &mut self,
        arena: &mut QueryModelArena,
        curr: ModelId,
        next: Option<ModelId>,
    ) -> Result<ModelId> {
        self(arena, curr, next)
    }
}

/// Walks a query model chain and relinks it around visitor results.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryModelTraverser;

impl QueryModelTraverser {
    pub fn new() -> Self {
        Self
    }

    /// Visits every stage of the chain rooted at `root` and returns the
    /// root of the rewritten chain.
    ///
    /// When the visitor keeps the visited model, the walk continues with the
    /// nested model captured before the visit. When it returns a different
    /// model, the walk continues with that model's nested child.
    ///
    /// Errors raised by the visitor abort the walk and are returned as is.
    pub fn traverse<V>(
        &self,
        arena: &mut QueryModelArena,
        root: ModelId,
        visitor: &mut V,
    ) -> Result<ModelId>
    where
        V: ModelVisitor + ?Sized,
    {
        let mut top = root;
        let mut prev: Option<ModelId> = None;
        let mut curr = Some(root);
        let mut next = arena.nested(root)?;
        let mut steps = 0;

        while let Some(id) = curr {
            // a well-formed chain never has more stages than the arena has models
            steps += 1;
            if steps > arena.len() {
                return Err(Error::chain_cycle(id.index()));
            }

            let replacement = visitor.visit(arena, id, next)?;
            match prev {
                None => top = replacement,
                Some(p) => arena.set_nested(p, Some(replacement))?,
            }
            prev = Some(replacement);

            curr = if replacement == id {
                next
            } else {
                arena.nested(replacement)?
            };
            next = match curr {
                Some(c) => arena.nested(c)?,
                None => None,
            };
        }

        Ok(top)
    }
}
