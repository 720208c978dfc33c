//! AST module for query expressions and their traversal.

mod expr;
mod traversal;

pub use expr::{ExpressionNode, ExpressionType};
pub use traversal::{ExpressionVisitor, PostOrderTraversal};
