//! Query model definitions.

use super::ModelId;
use crate::ast::ExpressionNode;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Kind of a select stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SelectModelType {
    /// No explicit projection, e.g. an aggregate stage.
    #[default]
    None,
    /// Projects existing columns of the nested model.
    Choose,
    /// Computes new columns from the nested model.
    Virtual,
    /// Group-by aggregation.
    GroupBy,
    /// Window function evaluation.
    Window,
    /// Duplicate elimination.
    Distinct,
}

impl SelectModelType {
    /// Returns the name used in plan explanations.
    pub fn name(&self) -> &'static str {
        match self {
            SelectModelType::None => "select-none",
            SelectModelType::Choose => "select-choose",
            SelectModelType::Virtual => "select-virtual",
            SelectModelType::GroupBy => "select-group-by",
            SelectModelType::Window => "select-window",
            SelectModelType::Distinct => "select-distinct",
        }
    }
}

impl fmt::Display for SelectModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A projected column: an expression and the name it is exposed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryColumn {
    alias: String,
    ast: ExpressionNode,
}

impl QueryColumn {
    /// Creates a new column.
    pub fn new(alias: impl Into<String>, ast: ExpressionNode) -> Self {
        Self {
            alias: alias.into(),
            ast,
        }
    }

    /// Creates a column that exposes a literal under its own name.
    pub fn from_literal(ast: ExpressionNode) -> Self {
        Self {
            alias: String::from(ast.token()),
            ast,
        }
    }

    /// Returns the column alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Returns the column expression.
    pub fn ast(&self) -> &ExpressionNode {
        &self.ast
    }
}

impl fmt::Display for QueryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ast.is_literal() && self.ast.token() == self.alias {
            write!(f, "{}", self.ast)
        } else {
            write!(f, "{} {}", self.ast, self.alias)
        }
    }
}

/// One nested stage of a compiled query.
///
/// Models form a singly-linked chain through `nested`, from the outermost
/// stage to the innermost one. The link is an index into the owning
/// [`QueryModelArena`](super::QueryModelArena).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryModel {
    model_type: SelectModelType,
    table_name: Option<String>,
    alias: Option<String>,
    columns: Vec<QueryColumn>,
    group_by: Vec<ExpressionNode>,
    nested: Option<ModelId>,
}

impl QueryModel {
    /// Creates an empty model of the given kind.
    pub fn of_type(model_type: SelectModelType) -> Self {
        Self {
            model_type,
            ..Self::default()
        }
    }

    /// Creates a select-none model.
    pub fn select_none() -> Self {
        Self::of_type(SelectModelType::None)
    }

    /// Creates a select-choose model.
    pub fn select_choose() -> Self {
        Self::of_type(SelectModelType::Choose)
    }

    /// Sets the table this model reads from.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Sets the model alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Appends a projected column.
    pub fn with_column(mut self, column: QueryColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a group-by expression.
    pub fn with_group_by(mut self, expr: ExpressionNode) -> Self {
        self.group_by.push(expr);
        self
    }

    /// Returns the model kind.
    pub fn model_type(&self) -> SelectModelType {
        self.model_type
    }

    pub fn is_select_choose(&self) -> bool {
        self.model_type == SelectModelType::Choose
    }

    pub fn is_select_none(&self) -> bool {
        self.model_type == SelectModelType::None
    }

    /// Returns true if the group-by list is not empty.
    pub fn has_group_by(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn columns(&self) -> &[QueryColumn] {
        &self.columns
    }

    pub fn group_by(&self) -> &[ExpressionNode] {
        &self.group_by
    }

    pub fn group_by_mut(&mut self) -> &mut Vec<ExpressionNode> {
        &mut self.group_by
    }

    /// Returns the next stage inward, if any.
    pub fn nested(&self) -> Option<ModelId> {
        self.nested
    }

    pub(crate) fn set_nested(&mut self, nested: Option<ModelId>) {
        self.nested = nested;
    }
}

impl fmt::Display for QueryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.model_type)?;
        for (i, column) in self.columns.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, column)?;
        }
        if let Some(table) = &self.table_name {
            write!(f, " from {}", table)?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " {}", alias)?;
        }
        for (i, expr) in self.group_by.iter().enumerate() {
            let sep = if i == 0 { " group by " } else { ", " };
            write!(f, "{}{}", sep, expr)?;
        }
        Ok(())
    }
}
