//! Arena that owns every query model of one compilation.

use super::query_model::QueryModel;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Write;
use strata_core::{Error, Result};

/// Handle to a model stored in a [`QueryModelArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelId(usize);

impl ModelId {
    /// Returns the arena slot of this model.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns the query models of one compilation.
///
/// Models are never removed; a model dropped from a chain simply becomes
/// unreachable from the root. Links are indices, so replacing a model in a
/// chain can never leave a dangling reference.
#[derive(Clone, Debug, Default)]
pub struct QueryModelArena {
    models: Vec<QueryModel>,
}

impl QueryModelArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a model and returns its handle.
    pub fn add(&mut self, model: QueryModel) -> ModelId {
        let id = ModelId(self.models.len());
        self.models.push(model);
        id
    }

    /// Stores `models` as a chain, outermost first, and returns the root.
    ///
    /// The innermost model keeps whatever nested link it already had.
    pub fn link_chain(&mut self, models: Vec<QueryModel>) -> Option<ModelId> {
        let ids: Vec<ModelId> = models.into_iter().map(|m| self.add(m)).collect();
        for pair in ids.windows(2) {
            self.models[pair[0].0].set_nested(Some(pair[1]));
        }
        ids.first().copied()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn contains(&self, id: ModelId) -> bool {
        id.0 < self.models.len()
    }

    pub fn get(&self, id: ModelId) -> Result<&QueryModel> {
        self.models
            .get(id.0)
            .ok_or_else(|| Error::unknown_model(id.0))
    }

    pub fn get_mut(&mut self, id: ModelId) -> Result<&mut QueryModel> {
        self.models
            .get_mut(id.0)
            .ok_or_else(|| Error::unknown_model(id.0))
    }

    /// Returns the nested model of `id`.
    pub fn nested(&self, id: ModelId) -> Result<Option<ModelId>> {
        Ok(self.get(id)?.nested())
    }

    /// Points the nested link of `id` at `nested`.
    pub fn set_nested(&mut self, id: ModelId, nested: Option<ModelId>) -> Result<()> {
        if let Some(target) = nested {
            if !self.contains(target) {
                return Err(Error::unknown_model(target.0));
            }
        }
        self.get_mut(id)?.set_nested(nested);
        Ok(())
    }

    /// Iterates the chain starting at `root`, outermost first.
    ///
    /// Stops at the first unknown id and never yields more items than the
    /// arena holds, so a corrupt chain cannot loop forever. Use
    /// [`validate_chain`](Self::validate_chain) to detect corruption.
    pub fn chain(&self, root: ModelId) -> Chain<'_> {
        Chain {
            arena: self,
            next: Some(root),
            remaining: self.models.len(),
        }
    }

    /// Checks that the chain from `root` is a simple sequence and returns it.
    pub fn validate_chain(&self, root: ModelId) -> Result<Vec<ModelId>> {
        let mut seen = alloc::vec![false; self.models.len()];
        let mut ids = Vec::new();
        let mut curr = Some(root);
        while let Some(id) = curr {
            let model = self.get(id)?;
            if seen[id.0] {
                return Err(Error::chain_cycle(id.0));
            }
            seen[id.0] = true;
            ids.push(id);
            curr = model.nested();
        }
        Ok(ids)
    }

    /// Renders the chain from `root`, one indented line per stage.
    pub fn explain(&self, root: ModelId) -> String {
        let mut out = String::new();
        for (depth, id) in self.chain(root).enumerate() {
            // chain() only yields ids that exist
            if let Ok(model) = self.get(id) {
                let _ = writeln!(out, "{:indent$}{}", "", model, indent = depth * 2);
            }
        }
        out
    }
}

/// Iterator over a chain of nested models.
pub struct Chain<'a> {
    arena: &'a QueryModelArena,
    next: Option<ModelId>,
    remaining: usize,
}

impl Iterator for Chain<'_> {
    type Item = ModelId;

    fn next(&mut self) -> Option<ModelId> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let model = self.arena.models.get(id.0)?;
        self.remaining -= 1;
        self.next = model.nested();
        Some(id)
    }
}
