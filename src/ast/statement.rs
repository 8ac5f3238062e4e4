use crate::ast::{
    ColumnReference, Expression, NullPrecedence, Predicate, QueryPart, SortOrder, TableReference,
    Value,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CteMaterialization {
    Materialized,
    NotMaterialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CteSearchKind {
    DepthFirst,
    BreadthFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CteSearchItem {
    pub column: String,
    #[serde(default)]
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub nulls: NullPrecedence,
}

/// `SEARCH DEPTH|BREADTH FIRST BY .. SET ..`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CteSearchClause {
    pub kind: CteSearchKind,
    pub by: Vec<CteSearchItem>,
    pub set_column: String,
}

/// `CYCLE .. SET .. TO .. DEFAULT ..`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CteCycleClause {
    pub columns: Vec<String>,
    pub mark_column: String,
    pub cycle_value: Value,
    pub non_cycle_value: Value,
    #[serde(default)]
    pub path_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CteStatement {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    pub definition: QueryPart,
    #[serde(default)]
    pub materialization: Option<CteMaterialization>,
    #[serde(default)]
    pub search: Option<CteSearchClause>,
    #[serde(default)]
    pub cycle: Option<CteCycleClause>,
}

/// The `WITH` preamble of a statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CteClause {
    pub recursive: bool,
    pub ctes: Vec<CteStatement>,
}

impl CteClause {
    pub fn is_empty(&self) -> bool {
        self.ctes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    #[serde(default)]
    pub with: CteClause,
    pub query: QueryPart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertSource {
    Values(Vec<Vec<Expression>>),
    Select(Box<QueryPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    #[serde(default)]
    pub with: CteClause,
    pub target: TableReference,
    #[serde(default)]
    pub columns: Vec<ColumnReference>,
    pub source: InsertSource,
    #[serde(default)]
    pub returning: Vec<ColumnReference>,
}

/// `col = value` or `(col, col) = row-value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub columns: Vec<ColumnReference>,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    #[serde(default)]
    pub with: CteClause,
    pub target: TableReference,
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub restriction: Option<Predicate>,
    #[serde(default)]
    pub returning: Vec<ColumnReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    #[serde(default)]
    pub with: CteClause,
    pub target: TableReference,
    #[serde(default)]
    pub restriction: Option<Predicate>,
    #[serde(default)]
    pub returning: Vec<ColumnReference>,
}

/// A fully resolved statement tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl Statement {
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "select",
            Statement::Insert(_) => "insert",
            Statement::Update(_) => "update",
            Statement::Delete(_) => "delete",
        }
    }

    pub fn from_json(json: &str) -> crate::error::TranslateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<SelectStatement> for Statement {
    fn from(s: SelectStatement) -> Self {
        Statement::Select(s)
    }
}

impl From<QueryPart> for Statement {
    fn from(query: QueryPart) -> Self {
        Statement::Select(SelectStatement {
            with: CteClause::default(),
            query,
        })
    }
}
