//! GROUP BY trivial expression rewrite pass.
//!
//! Looks for a select-choose stage directly wrapping a select-none stage
//! that groups by expressions built from a single column:
//!
//! ```text
//! select-choose a, A + 1 column             select-choose a, A + 1 column
//!        |                          =>             |
//! select-none group by a, a + 1             select-none group by a, A + 1
//! ```
//!
//! A group-by expression qualifies when it holds exactly one literal
//! (compared ignoring case) combined with constants and operators. Lists
//! that are already bare literals (`GROUP BY a, b, c`) are left alone
//! without further analysis.
//!
//! When the literal of a qualifying expression appears more than once in the
//! list and the outer projection computes an equivalent expression, the
//! group-by entry is replaced with the projection's form so later stages
//! can match the two and compute it once. Expressions with no equivalent in
//! the projection are kept as they are. The set of distinct groups and the
//! row order never change.

use crate::ast::{ExpressionNode, ExpressionType, ExpressionVisitor, PostOrderTraversal};
use crate::model::{ModelId, QueryColumn, QueryModelArena};
use crate::optimizer::traverser::{ModelVisitor, QueryModelTraverser};
use crate::optimizer::OptimizerPass;
use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::ops::ControlFlow;
use hashbrown::HashMap;
use log::{debug, trace};
use strata_core::chars::equals_ignore_case;
use strata_core::{Position, Result};

/// Number of appearances of each literal token in a group-by list.
///
/// Keys are the tokens as written, so `a` and `A` are counted separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiteralCounts {
    counts: HashMap<String, usize>,
}

impl LiteralCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more appearance of `token`.
    pub fn increment(&mut self, token: &str) {
        match self.counts.get_mut(token) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(String::from(token), 1);
            }
        }
    }

    /// Appearances of exactly `token`.
    pub fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Appearances of `token` in any letter case.
    pub fn count_ignore_case(&self, token: &str) -> usize {
        self.counts
            .iter()
            .filter(|(key, _)| equals_ignore_case(key, token))
            .map(|(_, count)| *count)
            .sum()
    }

    /// Highest count of any token, 0 when empty.
    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Counts every literal of the visited tree into a shared table.
pub struct CountLiteralAppearances<'a> {
    counts: &'a mut LiteralCounts,
}

impl<'a> CountLiteralAppearances<'a> {
    pub fn new(counts: &'a mut LiteralCounts) -> Self {
        Self { counts }
    }
}

impl ExpressionVisitor for CountLiteralAppearances<'_> {
    type Break = Infallible;

    fn visit(&mut self, node: &ExpressionNode) -> Result<ControlFlow<Infallible>> {
        if node.kind() == ExpressionType::Literal {
            self.counts.increment(node.token());
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Reason an expression is not one literal combined with constants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralMismatch {
    /// A literal other than the first one seen.
    SecondLiteral { position: Position },
    /// A node that is not a literal, a constant or an operation.
    UnsupportedNode {
        position: Position,
        kind: ExpressionType,
    },
}

/// Accepts trees made of one literal plus constants and operations.
///
/// The first literal seen becomes the allowed one. Build a fresh validator
/// for every expression.
#[derive(Clone, Debug, Default)]
pub struct OneLiteralAndConstants {
    allowed_literal: Option<String>,
}

impl OneLiteralAndConstants {
    pub fn new() -> Self {
        Self::default()
    }

    /// The literal accepted so far.
    pub fn allowed_literal(&self) -> Option<&str> {
        self.allowed_literal.as_deref()
    }

    pub fn into_allowed_literal(self) -> Option<String> {
        self.allowed_literal
    }
}

impl ExpressionVisitor for OneLiteralAndConstants {
    type Break = LiteralMismatch;

    fn visit(&mut self, node: &ExpressionNode) -> Result<ControlFlow<LiteralMismatch>> {
        let flow = match node.kind() {
            ExpressionType::Literal => match &self.allowed_literal {
                None => {
                    self.allowed_literal = Some(String::from(node.token()));
                    ControlFlow::Continue(())
                }
                Some(allowed) if equals_ignore_case(allowed, node.token()) => {
                    ControlFlow::Continue(())
                }
                Some(_) => ControlFlow::Break(LiteralMismatch::SecondLiteral {
                    position: node.position(),
                }),
            },
            ExpressionType::Constant | ExpressionType::Operation => ControlFlow::Continue(()),
            kind => ControlFlow::Break(LiteralMismatch::UnsupportedNode {
                position: node.position(),
                kind,
            }),
        };
        Ok(flow)
    }
}

/// Outcome of analysing a group-by list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupByAnalysis {
    /// Every expression is a bare literal.
    AlreadyOptimal,
    /// Some expression failed validation; nothing was counted.
    Mismatch(LiteralMismatch),
    /// Every expression passed validation.
    Candidates {
        /// Literal appearances across the whole list.
        counts: LiteralCounts,
        /// The single literal of each expression, `None` for constant-only ones.
        literals: Vec<Option<String>>,
    },
}

/// Rewrites trivial GROUP BY expressions of select-none stages.
#[derive(Clone, Debug, Default)]
pub struct RewriteGroupByTrivialExpressions {
    traversal: PostOrderTraversal,
    rewrites: usize,
}

impl RewriteGroupByTrivialExpressions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `traversal` to walk group-by expressions.
    pub fn with_traversal(traversal: PostOrderTraversal) -> Self {
        Self {
            traversal,
            rewrites: 0,
        }
    }

    /// Applies the pass to every stage of the chain rooted at `root`.
    pub fn run(&mut self, arena: &mut QueryModelArena, root: ModelId) -> Result<ModelId> {
        self.rewrites = 0;
        QueryModelTraverser::new().traverse(arena, root, self)
    }

    /// Number of group-by expressions rewritten by the last run.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    /// Validates and counts the literals of a group-by list.
    ///
    /// Validation covers the whole list before anything is counted, so a
    /// single failing expression leaves the counts untouched.
    pub fn analyze(&self, group_by: &[ExpressionNode]) -> Result<GroupByAnalysis> {
        if group_by.iter().all(ExpressionNode::is_literal) {
            return Ok(GroupByAnalysis::AlreadyOptimal);
        }

        let mut literals = Vec::with_capacity(group_by.len());
        for expr in group_by {
            let mut validator = OneLiteralAndConstants::new();
            if let ControlFlow::Break(mismatch) = self.traversal.traverse(expr, &mut validator)? {
                return Ok(GroupByAnalysis::Mismatch(mismatch));
            }
            literals.push(validator.into_allowed_literal());
        }

        let mut counts = LiteralCounts::new();
        for expr in group_by {
            let mut counter = CountLiteralAppearances::new(&mut counts);
            if let ControlFlow::Break(never) = self.traversal.traverse(expr, &mut counter)? {
                match never {}
            }
        }

        Ok(GroupByAnalysis::Candidates { counts, literals })
    }

    /// Returns `next` when `curr` wraps it in the shape this pass handles.
    fn match_pattern(
        arena: &QueryModelArena,
        curr: ModelId,
        next: Option<ModelId>,
    ) -> Result<Option<ModelId>> {
        let Some(next) = next else {
            return Ok(None);
        };
        if !arena.get(curr)?.is_select_choose() {
            return Ok(None);
        }
        let inner = arena.get(next)?;
        if inner.is_select_none() && inner.has_group_by() {
            Ok(Some(next))
        } else {
            Ok(None)
        }
    }
}

/// Replaces repeated-literal group-by expressions with their projection form.
fn lift_candidates(
    outer: &[QueryColumn],
    group_by: &mut [ExpressionNode],
    counts: &LiteralCounts,
    literals: &[Option<String>],
) -> usize {
    let mut rewritten = 0;
    for (expr, literal) in group_by.iter_mut().zip(literals) {
        let Some(literal) = literal else {
            continue;
        };
        if counts.count_ignore_case(literal) < 2 {
            continue;
        }
        if outer.iter().any(|column| column.ast().same_text(expr)) {
            continue;
        }
        if let Some(column) = outer.iter().find(|column| column.ast().equivalent(expr)) {
            trace!("group by '{}' now reads '{}'", expr, column.ast());
            *expr = column.ast().clone();
            rewritten += 1;
        }
    }
    rewritten
}

impl ModelVisitor for RewriteGroupByTrivialExpressions {
    fn visit(
        &mut self,
        arena: &mut QueryModelArena,
        curr: ModelId,
        next: Option<ModelId>,
    ) -> Result<ModelId> {
        let Some(inner) = Self::match_pattern(arena, curr, next)? else {
            return Ok(curr);
        };

        let (counts, literals) = match self.analyze(arena.get(inner)?.group_by())? {
            GroupByAnalysis::AlreadyOptimal => {
                trace!("group by of {} is already literals only", inner);
                return Ok(curr);
            }
            GroupByAnalysis::Mismatch(mismatch) => {
                debug!("group by of {} is not trivial: {:?}", inner, mismatch);
                return Ok(curr);
            }
            GroupByAnalysis::Candidates { counts, literals } => (counts, literals),
        };

        let outer = arena.get(curr)?.columns().to_vec();
        let group_by = arena.get_mut(inner)?.group_by_mut();
        let rewritten = lift_candidates(&outer, group_by, &counts, &literals);
        if rewritten > 0 {
            debug!(
                "rewrote {} trivial group by expression(s) of {}",
                rewritten, inner
            );
        }
        self.rewrites += rewritten;

        Ok(curr)
    }
}

impl OptimizerPass for RewriteGroupByTrivialExpressions {
    fn optimize(&mut self, arena: &mut QueryModelArena, root: ModelId) -> Result<ModelId> {
        self.run(arena, root)
    }

    fn name(&self) -> &'static str {
        "rewrite_group_by_trivial_expressions"
    }
}
