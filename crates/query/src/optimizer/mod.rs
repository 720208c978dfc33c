//! Query optimizer module.

mod group_by_trivial;
mod pass;
mod traverser;

pub use group_by_trivial::{
    CountLiteralAppearances, GroupByAnalysis, LiteralCounts, LiteralMismatch,
    OneLiteralAndConstants, RewriteGroupByTrivialExpressions,
};
pub use pass::OptimizerPass;
pub use traverser::{ModelVisitor, QueryModelTraverser};

use crate::ast::PostOrderTraversal;
use crate::model::{ModelId, QueryModelArena};
use alloc::boxed::Box;
use alloc::vec::Vec;
use log::{debug, log_enabled, trace, Level};
use strata_core::Result;

/// Configuration for the optimizer.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    /// Whether to run the GROUP BY trivial expression pass (default: true)
    pub rewrite_group_by_trivial_expressions: bool,
    /// Deepest expression tree passes may walk (default: 256)
    pub max_expression_depth: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            rewrite_group_by_trivial_expressions: true,
            max_expression_depth: PostOrderTraversal::DEFAULT_MAX_DEPTH,
        }
    }
}

impl OptimizerConfig {
    /// Enables or disables the GROUP BY trivial expression pass.
    pub fn with_group_by_rewrite(mut self, enable: bool) -> Self {
        self.rewrite_group_by_trivial_expressions = enable;
        self
    }

    /// Sets the maximum expression depth.
    pub fn with_max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }
}

/// Query optimizer that applies optimization passes.
///
/// Each optimizer owns its pass values, so one optimizer serves one
/// compilation at a time and separate compilations never share pass state.
pub struct Optimizer {
    passes: Vec<Box<dyn OptimizerPass>>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    /// Creates a new optimizer with the default passes.
    ///
    /// The default passes are applied in this order:
    /// 1. RewriteGroupByTrivialExpressions - Simplify single-column GROUP BY expressions
    pub fn new() -> Self {
        Self::with_config(OptimizerConfig::default())
    }

    /// Creates an optimizer with the passes enabled by `config`.
    pub fn with_config(config: OptimizerConfig) -> Self {
        let traversal = PostOrderTraversal::with_max_depth(config.max_expression_depth);
        let mut passes: Vec<Box<dyn OptimizerPass>> = Vec::new();
        if config.rewrite_group_by_trivial_expressions {
            passes.push(Box::new(RewriteGroupByTrivialExpressions::with_traversal(
                traversal,
            )));
        }
        Self { passes }
    }

    /// Creates an optimizer with custom passes.
    pub fn with_passes(passes: Vec<Box<dyn OptimizerPass>>) -> Self {
        Self { passes }
    }

    /// Appends a pass.
    pub fn add_pass<P: OptimizerPass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the configured passes, in application order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Optimizes the chain rooted at `root` and returns its new root.
    ///
    /// Stops at the first compilation failure.
    pub fn optimize(&mut self, arena: &mut QueryModelArena, root: ModelId) -> Result<ModelId> {
        let mut root = root;
        for pass in self.passes.iter_mut() {
            debug!("Applying pass '{}'", pass.name());
            root = pass.optimize(arena, root)?;
            if log_enabled!(Level::Trace) {
                trace!("Plan after '{}':\n{}", pass.name(), arena.explain(root));
            }
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExpressionNode;
    use crate::model::QueryModel;
    use strata_core::Error;

    #[test]
    fn test_optimizer_default() {
        let optimizer = Optimizer::new();
        assert_eq!(
            optimizer.pass_names(),
            ["rewrite_group_by_trivial_expressions"]
        );
    }

    #[test]
    fn test_optimizer_config_disables_pass() {
        let config = OptimizerConfig::default().with_group_by_rewrite(false);
        let optimizer = Optimizer::with_config(config);
        assert!(optimizer.pass_names().is_empty());
    }

    #[test]
    fn test_optimizer_config_depth_limit() {
        let config = OptimizerConfig::default().with_max_expression_depth(2);
        let mut optimizer = Optimizer::with_config(config);

        let deep = ExpressionNode::operation(
            "*",
            9,
            ExpressionNode::operation(
                "+",
                5,
                ExpressionNode::literal("a", 4),
                ExpressionNode::constant("1", 6),
            ),
            ExpressionNode::constant("2", 10),
        );
        let mut arena = QueryModelArena::new();
        let root = arena
            .link_chain(alloc::vec![
                QueryModel::select_choose(),
                QueryModel::select_none()
                    .with_group_by(ExpressionNode::literal("a", 20))
                    .with_group_by(deep),
            ])
            .unwrap();

        let err = optimizer.optimize(&mut arena, root).unwrap_err();
        assert!(matches!(err, Error::ExpressionTooDeep { limit: 2, .. }));
    }

    #[test]
    fn test_custom_pass_order() {
        struct DropRoot;

        impl OptimizerPass for DropRoot {
            fn optimize(&mut self, arena: &mut QueryModelArena, root: ModelId) -> Result<ModelId> {
                Ok(arena.nested(root)?.unwrap_or(root))
            }

            fn name(&self) -> &'static str {
                "drop_root"
            }
        }

        let mut arena = QueryModelArena::new();
        let root = arena
            .link_chain(alloc::vec![
                QueryModel::select_choose(),
                QueryModel::select_none().with_table("t"),
            ])
            .unwrap();
        let inner = arena.nested(root).unwrap();

        let mut optimizer = Optimizer::with_passes(Vec::new());
        optimizer.add_pass(DropRoot);
        optimizer.add_pass(RewriteGroupByTrivialExpressions::new());

        assert_eq!(
            optimizer.pass_names(),
            ["drop_root", "rewrite_group_by_trivial_expressions"]
        );
        assert_eq!(optimizer.optimize(&mut arena, root).unwrap(), inner.unwrap());
    }
}
