//! Strata Query - Query model rewrite engine for the Strata query compiler.
//!
//! This crate provides the plan rewrite stage that runs between parsing and
//! execution planning:
//!
//! - `ast`: Expression AST and its post-order traversal
//! - `model`: Query model chain, one model per nested select stage
//! - `optimizer`: Chain traversal, rewrite passes and the optimizer driver
//!
//! # Example
//!
//! ```rust
//! use strata_query::ast::ExpressionNode;
//! use strata_query::model::{QueryModel, QueryModelArena};
//! use strata_query::optimizer::Optimizer;
//!
//! let mut arena = QueryModelArena::new();
//! let root = arena
//!     .link_chain(vec![
//!         QueryModel::select_choose(),
//!         QueryModel::select_none()
//!             .with_table("trades")
//!             .with_group_by(ExpressionNode::literal("sym", 40)),
//!     ])
//!     .unwrap();
//!
//! let root = Optimizer::new().optimize(&mut arena, root).unwrap();
//! assert_eq!(arena.validate_chain(root).unwrap().len(), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod ast;
pub mod model;
pub mod optimizer;
