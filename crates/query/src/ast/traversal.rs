//! Post-order expression tree traversal.
//!
//! Visitors see every node after all of its operands, left to right. A
//! visitor stops the walk early by returning `ControlFlow::Break`; that is
//! an ordinary outcome and is handed back to the caller untouched. Errors
//! are reserved for compilation failures.

use super::expr::{ExpressionNode, ExpressionType};
use alloc::vec::Vec;
use core::ops::ControlFlow;
use strata_core::{Error, Result};

/// Callback invoked once per expression node in post-order.
pub trait ExpressionVisitor {
    /// Value carried out of the walk when the visitor stops it early.
    type Break;

    /// Visits a single node.
    fn visit(&mut self, node: &ExpressionNode) -> Result<ControlFlow<Self::Break>>;
}

/// Iterative post-order walk with a depth limit.
#[derive(Clone, Copy, Debug)]
pub struct PostOrderTraversal {
    max_depth: usize,
}

impl Default for PostOrderTraversal {
    fn default() -> Self {
        Self::new()
    }
}

impl PostOrderTraversal {
    /// Default maximum expression depth.
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Creates a traversal with the default depth limit.
    pub fn new() -> Self {
        Self::with_max_depth(Self::DEFAULT_MAX_DEPTH)
    }

    /// Creates a traversal that rejects trees deeper than `max_depth`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Returns the depth limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Walks `root`, calling `visitor` for every node.
    ///
    /// Returns `Break` as soon as the visitor does; remaining nodes are not
    /// visited.
    pub fn traverse<V>(
        &self,
        root: &ExpressionNode,
        visitor: &mut V,
    ) -> Result<ControlFlow<V::Break>>
    where
        V: ExpressionVisitor + ?Sized,
    {
        // (node, index of the next operand to descend into)
        let mut stack: Vec<(&ExpressionNode, usize)> = alloc::vec![(root, 0)];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let next_arg = top.1;

            if next_arg == 0
                && node.kind() == ExpressionType::Operation
                && node.args().is_empty()
            {
                return Err(Error::malformed_expression(
                    node.position(),
                    alloc::format!("operator '{}' has no operands", node.token()),
                ));
            }

            if next_arg < node.args().len() {
                top.1 += 1;
                let child = &node.args()[next_arg];
                if stack.len() >= self.max_depth {
                    return Err(Error::expression_too_deep(child.position(), self.max_depth));
                }
                stack.push((child, 0));
            } else {
                stack.pop();
                if let ControlFlow::Break(b) = visitor.visit(node)? {
                    return Ok(ControlFlow::Break(b));
                }
            }
        }

        Ok(ControlFlow::Continue(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use strata_core::Position;

    struct Recorder {
        tokens: Vec<String>,
        stop_at: Option<&'static str>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                tokens: Vec::new(),
                stop_at: None,
            }
        }
    }

    impl ExpressionVisitor for Recorder {
        type Break = String;

        fn visit(&mut self, node: &ExpressionNode) -> Result<ControlFlow<String>> {
            self.tokens.push(node.token().to_string());
            if self.stop_at == Some(node.token()) {
                return Ok(ControlFlow::Break(node.token().to_string()));
            }
            Ok(ControlFlow::Continue(()))
        }
    }

    // (a + 1) * abs(b)
    fn sample() -> ExpressionNode {
        ExpressionNode::operation(
            "*",
            6,
            ExpressionNode::operation(
                "+",
                3,
                ExpressionNode::literal("a", 1),
                ExpressionNode::constant("1", 5),
            ),
            ExpressionNode::function("abs", 8, alloc::vec![ExpressionNode::literal("b", 12)]),
        )
    }

    #[test]
    fn test_post_order() {
        let mut recorder = Recorder::new();
        let flow = PostOrderTraversal::new()
            .traverse(&sample(), &mut recorder)
            .unwrap();

        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(recorder.tokens, ["a", "1", "+", "b", "abs", "*"]);
    }

    #[test]
    fn test_break_stops_walk() {
        let mut recorder = Recorder::new();
        recorder.stop_at = Some("+");
        let flow = PostOrderTraversal::new()
            .traverse(&sample(), &mut recorder)
            .unwrap();

        assert_eq!(flow, ControlFlow::Break("+".to_string()));
        assert_eq!(recorder.tokens, ["a", "1", "+"]);
    }

    #[test]
    fn test_single_leaf() {
        let mut recorder = Recorder::new();
        PostOrderTraversal::new()
            .traverse(&ExpressionNode::literal("ts", 0), &mut recorder)
            .unwrap();
        assert_eq!(recorder.tokens, ["ts"]);
    }

    #[test]
    fn test_depth_limit() {
        let mut expr = ExpressionNode::literal("a", 0);
        for i in 0..5 {
            expr = ExpressionNode::unary("-", i, expr);
        }
        assert_eq!(expr.depth(), 6);

        let mut recorder = Recorder::new();
        assert!(PostOrderTraversal::with_max_depth(6)
            .traverse(&expr, &mut recorder)
            .is_ok());

        let mut recorder = Recorder::new();
        let err = PostOrderTraversal::with_max_depth(5)
            .traverse(&expr, &mut recorder)
            .unwrap_err();
        assert!(matches!(err, Error::ExpressionTooDeep { limit: 5, .. }));
        assert!(recorder.tokens.is_empty());
    }

    #[test]
    fn test_operator_without_operands_is_malformed() {
        let broken = ExpressionNode::function(
            "abs",
            0,
            alloc::vec![ExpressionNode::new(
                ExpressionType::Operation,
                "+",
                4,
                alloc::vec![],
            )],
        );
        let mut recorder = Recorder::new();
        let err = PostOrderTraversal::new()
            .traverse(&broken, &mut recorder)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedExpression { .. }));
        assert_eq!(err.position(), Some(Position::new(4)));
    }

    #[test]
    fn test_function_without_arguments() {
        let now = ExpressionNode::function("now", 0, alloc::vec![]);
        let mut recorder = Recorder::new();
        assert!(PostOrderTraversal::new().traverse(&now, &mut recorder).is_ok());
        assert_eq!(recorder.tokens, ["now"]);
    }

    #[test]
    fn test_visitor_error_propagates() {
        struct Failing;

        impl ExpressionVisitor for Failing {
            type Break = ();

            fn visit(&mut self, node: &ExpressionNode) -> Result<ControlFlow<()>> {
                Err(Error::compilation(node.position(), "invalid column"))
            }
        }

        let err = PostOrderTraversal::new()
            .traverse(&sample(), &mut Failing)
            .unwrap_err();
        assert_eq!(err.position(), Some(Position::new(1)));
    }
}
