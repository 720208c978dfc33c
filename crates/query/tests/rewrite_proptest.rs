//! Property-based tests for chain traversal and the GROUP BY pass.
//!
//! These tests check that traversal keeps query model chains well formed
//! and that the GROUP BY pass only ever swaps an expression for an
//! equivalent one.

use proptest::prelude::*;
use strata_query::ast::ExpressionNode;
use strata_query::model::{ModelId, QueryColumn, QueryModel, QueryModelArena};
use strata_query::optimizer::{QueryModelTraverser, RewriteGroupByTrivialExpressions};

/// Strategy for small arithmetic trees over a handful of columns.
fn expr_strategy() -> impl Strategy<Value = ExpressionNode> {
    let leaf = prop_oneof![
        prop::sample::select(vec!["a", "A", "b"]).prop_map(|t| ExpressionNode::literal(t, 0)),
        prop::sample::select(vec!["1", "2"]).prop_map(|t| ExpressionNode::constant(t, 0)),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        (prop::sample::select(vec!["+", "*"]), inner.clone(), inner)
            .prop_map(|(op, lhs, rhs)| ExpressionNode::operation(op, 0, lhs, rhs))
    })
}

fn build_chain(
    arena: &mut QueryModelArena,
    columns: &[ExpressionNode],
    group_by: &[ExpressionNode],
) -> ModelId {
    let mut outer = QueryModel::select_choose();
    for (i, ast) in columns.iter().enumerate() {
        outer = outer.with_column(QueryColumn::new(format!("column{}", i), ast.clone()));
    }
    let mut inner = QueryModel::select_none().with_table("t");
    for expr in group_by {
        inner = inner.with_group_by(expr.clone());
    }
    arena.link_chain(vec![outer, inner]).unwrap()
}

fn snapshot(arena: &QueryModelArena, root: ModelId) -> Vec<QueryModel> {
    arena
        .validate_chain(root)
        .unwrap()
        .into_iter()
        .map(|id| arena.get(id).unwrap().clone())
        .collect()
}

proptest! {
    /// Property: a visitor that keeps every model leaves the chain as it was.
    #[test]
    fn identity_visitor_preserves_chain(n in 1usize..20) {
        let mut arena = QueryModelArena::new();
        let root = arena
            .link_chain((0..n).map(|_| QueryModel::select_none()).collect())
            .unwrap();
        let before = snapshot(&arena, root);

        let mut keep = |_: &mut QueryModelArena, curr: ModelId, _: Option<ModelId>| {
            Ok::<_, strata_core::Error>(curr)
        };
        let new_root = QueryModelTraverser::new()
            .traverse(&mut arena, root, &mut keep)
            .unwrap();

        prop_assert_eq!(new_root, root);
        prop_assert_eq!(snapshot(&arena, new_root), before);
    }

    /// Property: replacing a model with its nested model unlinks exactly that model.
    #[test]
    fn skipping_a_model_relinks_neighbours(
        (n, skip) in (2usize..12).prop_flat_map(|n| (Just(n), 0..n - 1)),
    ) {
        let mut arena = QueryModelArena::new();
        let root = arena
            .link_chain((0..n).map(|_| QueryModel::select_none()).collect())
            .unwrap();
        let before = arena.validate_chain(root).unwrap();
        let doomed = before[skip];

        let mut skip_one = |_: &mut QueryModelArena, curr: ModelId, next: Option<ModelId>| {
            Ok::<_, strata_core::Error>(match next {
                Some(next) if curr == doomed => next,
                _ => curr,
            })
        };
        let new_root = QueryModelTraverser::new()
            .traverse(&mut arena, root, &mut skip_one)
            .unwrap();

        let mut expected = before.clone();
        expected.remove(skip);
        prop_assert_eq!(arena.validate_chain(new_root).unwrap(), expected);
    }

    /// Property: the pass keeps the chain shape and only swaps in equivalent expressions.
    #[test]
    fn group_by_pass_preserves_semantics(
        columns in prop::collection::vec(expr_strategy(), 0..4),
        group_by in prop::collection::vec(expr_strategy(), 1..5),
    ) {
        let mut arena = QueryModelArena::new();
        let root = build_chain(&mut arena, &columns, &group_by);
        let ids = arena.validate_chain(root).unwrap();

        let mut pass = RewriteGroupByTrivialExpressions::new();
        let new_root = pass.run(&mut arena, root).unwrap();

        prop_assert_eq!(new_root, root);
        prop_assert_eq!(arena.validate_chain(new_root).unwrap(), ids.clone());

        let rewritten = arena.get(ids[1]).unwrap().group_by();
        prop_assert_eq!(rewritten.len(), group_by.len());
        for (before, after) in group_by.iter().zip(rewritten) {
            prop_assert!(before.equivalent(after), "{} became {}", before, after);
        }
    }

    /// Property: a second run of the pass changes nothing.
    #[test]
    fn group_by_pass_is_idempotent(
        columns in prop::collection::vec(expr_strategy(), 0..4),
        group_by in prop::collection::vec(expr_strategy(), 1..5),
    ) {
        let mut arena = QueryModelArena::new();
        let root = build_chain(&mut arena, &columns, &group_by);

        let mut pass = RewriteGroupByTrivialExpressions::new();
        pass.run(&mut arena, root).unwrap();
        let once = snapshot(&arena, root);

        pass.run(&mut arena, root).unwrap();
        prop_assert_eq!(pass.rewrites(), 0);
        prop_assert_eq!(snapshot(&arena, root), once);
    }
}
