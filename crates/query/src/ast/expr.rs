//! Expression AST definitions.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use strata_core::chars::equals_ignore_case;
use strata_core::Position;

/// Expression node type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    /// Reference to a column or a bound name.
    Literal,
    /// Literal value such as `1` or `'abc'`.
    Constant,
    /// Operator application (`+`, `*`, `and`, ...).
    Operation,
    /// Function call.
    Function,
    /// Bind variable (`$1`, `:name`).
    BindVariable,
    /// Sub-query.
    Query,
}

/// Expression AST node.
///
/// The type tag is fixed at construction. Operands are kept in source
/// order: `a - 1` has `args == [a, 1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionNode {
    kind: ExpressionType,
    token: String,
    position: Position,
    args: Vec<ExpressionNode>,
}

impl ExpressionNode {
    pub(crate) fn new(
        kind: ExpressionType,
        token: impl Into<String>,
        position: impl Into<Position>,
        args: Vec<ExpressionNode>,
    ) -> Self {
        Self {
            kind,
            token: token.into(),
            position: position.into(),
            args,
        }
    }

    /// Creates a column reference.
    pub fn literal(token: impl Into<String>, position: impl Into<Position>) -> Self {
        Self::new(ExpressionType::Literal, token, position, Vec::new())
    }

    /// Creates a constant value.
    pub fn constant(token: impl Into<String>, position: impl Into<Position>) -> Self {
        Self::new(ExpressionType::Constant, token, position, Vec::new())
    }

    /// Creates a bind variable.
    pub fn bind_variable(token: impl Into<String>, position: impl Into<Position>) -> Self {
        Self::new(ExpressionType::BindVariable, token, position, Vec::new())
    }

    /// Creates a sub-query placeholder.
    pub fn query(token: impl Into<String>, position: impl Into<Position>) -> Self {
        Self::new(ExpressionType::Query, token, position, Vec::new())
    }

    /// Creates a binary operation.
    pub fn operation(
        op: impl Into<String>,
        position: impl Into<Position>,
        lhs: ExpressionNode,
        rhs: ExpressionNode,
    ) -> Self {
        Self::new(
            ExpressionType::Operation,
            op,
            position,
            alloc::vec![lhs, rhs],
        )
    }

    /// Creates a unary operation.
    pub fn unary(
        op: impl Into<String>,
        position: impl Into<Position>,
        operand: ExpressionNode,
    ) -> Self {
        Self::new(ExpressionType::Operation, op, position, alloc::vec![operand])
    }

    /// Creates a function call.
    pub fn function(
        name: impl Into<String>,
        position: impl Into<Position>,
        args: Vec<ExpressionNode>,
    ) -> Self {
        Self::new(ExpressionType::Function, name, position, args)
    }

    /// Returns the type tag.
    pub fn kind(&self) -> ExpressionType {
        self.kind
    }

    /// Returns the identifier, value text or operator symbol.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the position of this node in the query text.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns the operands in source order.
    pub fn args(&self) -> &[ExpressionNode] {
        &self.args
    }

    /// Returns true if this node is a bare column reference.
    pub fn is_literal(&self) -> bool {
        self.kind == ExpressionType::Literal
    }

    /// Returns true if both trees compute the same value.
    ///
    /// Unlike `==`, identifiers, operators and function names are compared
    /// ignoring case and positions are ignored. Constants must match exactly.
    pub fn equivalent(&self, other: &ExpressionNode) -> bool {
        if self.kind != other.kind || self.args.len() != other.args.len() {
            return false;
        }
        let tokens_match = match self.kind {
            ExpressionType::Constant => self.token == other.token,
            _ => equals_ignore_case(&self.token, &other.token),
        };
        tokens_match
            && self
                .args
                .iter()
                .zip(other.args.iter())
                .all(|(a, b)| a.equivalent(b))
    }

    /// Returns true if both trees are written identically, ignoring positions.
    pub fn same_text(&self, other: &ExpressionNode) -> bool {
        self.kind == other.kind
            && self.token == other.token
            && self.args.len() == other.args.len()
            && self
                .args
                .iter()
                .zip(other.args.iter())
                .all(|(a, b)| a.same_text(b))
    }

    /// Depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.args.iter().map(|a| a.depth()).max().unwrap_or(0)
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ExpressionType::Operation && self.args.len() == 2 {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ExpressionType::Operation => match self.args.as_slice() {
                [operand] => {
                    if self.token.chars().all(|c| c.is_ascii_alphabetic()) {
                        write!(f, "{} ", self.token)?;
                    } else {
                        write!(f, "{}", self.token)?;
                    }
                    operand.fmt_operand(f)
                }
                [lhs, rhs] => {
                    lhs.fmt_operand(f)?;
                    write!(f, " {} ", self.token)?;
                    rhs.fmt_operand(f)
                }
                _ => write!(f, "{}", self.token),
            },
            ExpressionType::Function => {
                write!(f, "{}(", self.token)?;
                for (i, arg) in self.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            ExpressionType::Query => write!(f, "({})", self.token),
            _ => write!(f, "{}", self.token),
        }
    }
}
