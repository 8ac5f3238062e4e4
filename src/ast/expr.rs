use crate::ast::{
    BinaryOperator, Predicate, QueryPart, SortSpecification, SqlType, UnaryOperator, Value,
};
use crate::error::TranslateResult;
use crate::transpiler::Translation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Reference to a column, optionally qualified by a table alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReference {
    #[serde(default)]
    pub qualifier: Option<String>,
    pub column: String,
}

impl ColumnReference {
    pub fn new(qualifier: Option<&str>, column: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.map(str::to_string),
            column: column.into(),
        }
    }
}

/// Identity of a logical query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParameterId(pub u32);

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A typed placeholder whose value arrives at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JdbcParameter {
    pub id: ParameterId,
    #[serde(default)]
    pub sql_type: SqlType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: Value,
    #[serde(default)]
    pub sql_type: SqlType,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        let sql_type = value.sql_type();
        Self { value, sql_type }
    }

    pub fn typed_null(sql_type: SqlType) -> Self {
        Self {
            value: Value::Null,
            sql_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchedWhen {
    pub predicate: Predicate,
    pub result: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleWhen {
    pub test: Expression,
    pub result: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSearched {
    pub whens: Vec<SearchedWhen>,
    #[serde(default)]
    pub otherwise: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSimple {
    pub operand: Box<Expression>,
    pub whens: Vec<SimpleWhen>,
    #[serde(default)]
    pub otherwise: Option<Box<Expression>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    #[default]
    Scalar,
    Aggregate,
}

/// `OVER (PARTITION BY .. ORDER BY ..)` specification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSpec {
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<SortSpecification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub kind: FunctionKind,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub filter: Option<Box<Predicate>>,
    #[serde(default)]
    pub over: Option<WindowSpec>,
}

impl FunctionCall {
    /// Aggregate call that is not evaluated as a window function.
    pub fn is_plain_aggregate(&self) -> bool {
        self.kind == FunctionKind::Aggregate && self.over.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizationKind {
    Rollup,
    Cube,
}

/// Node that renders itself through the active translation.
///
/// Implementations emit dialect-specific syntax (custom functions, vendor
/// operators) using the public rendering surface of [`Translation`].
pub trait SqlRenderable: fmt::Debug + Send + Sync {
    fn render<'a>(&'a self, translation: &mut Translation<'a>) -> TranslateResult<()>;
}

/// Shared handle to a [`SqlRenderable`] node.
#[derive(Clone)]
pub struct SelfRendering(pub Arc<dyn SqlRenderable>);

impl SelfRendering {
    pub fn new(node: impl SqlRenderable + 'static) -> Self {
        Self(Arc::new(node))
    }
}

impl fmt::Debug for SelfRendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SelfRendering").field(&self.0).finish()
    }
}

impl PartialEq for SelfRendering {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Column(ColumnReference),
    Literal(Literal),
    Parameter(JdbcParameter),
    /// Row value, arity >= 1.
    Tuple(Vec<Expression>),
    SimpleCase(CaseSimple),
    SearchedCase(CaseSearched),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Function(FunctionCall),
    SubQuery(Box<QueryPart>),
    /// `ANY (subquery)` operand of a comparison.
    Any(Box<QueryPart>),
    /// `ALL (subquery)` operand of a comparison.
    Every(Box<QueryPart>),
    /// Zero-based reference into the select list of the current query.
    SelectionRef(usize),
    Star(Option<String>),
    Cast {
        expr: Box<Expression>,
        target: SqlType,
    },
    Collate {
        expr: Box<Expression>,
        collation: String,
    },
    Summarization {
        kind: SummarizationKind,
        groupings: Vec<Expression>,
    },
    #[serde(skip)]
    SelfRendering(SelfRendering),
}

impl Expression {
    /// Expression type when statically known.
    pub fn sql_type(&self) -> SqlType {
        match self {
            Expression::Literal(lit) => lit.sql_type,
            Expression::Parameter(p) => p.sql_type,
            Expression::Cast { target, .. } => *target,
            _ => SqlType::Unknown,
        }
    }

    /// Walk this expression, not descending into sub-queries.
    pub fn any_node(&self, check: &mut impl FnMut(&Expression) -> bool) -> bool {
        if check(self) {
            return true;
        }
        match self {
            Expression::Tuple(items) => items.iter().any(|e| e.any_node(check)),
            Expression::SimpleCase(case) => {
                case.operand.any_node(check)
                    || case
                        .whens
                        .iter()
                        .any(|w| w.test.any_node(check) || w.result.any_node(check))
                    || case.otherwise.as_ref().is_some_and(|e| e.any_node(check))
            }
            Expression::SearchedCase(case) => {
                case.whens
                    .iter()
                    .any(|w| w.predicate.any_expression(check) || w.result.any_node(check))
                    || case.otherwise.as_ref().is_some_and(|e| e.any_node(check))
            }
            Expression::Binary { lhs, rhs, .. } => lhs.any_node(check) || rhs.any_node(check),
            Expression::Unary { operand, .. } => operand.any_node(check),
            Expression::Function(call) => call.arguments.iter().any(|e| e.any_node(check)),
            Expression::Cast { expr, .. } | Expression::Collate { expr, .. } => {
                expr.any_node(check)
            }
            Expression::Summarization { groupings, .. } => {
                groupings.iter().any(|e| e.any_node(check))
            }
            _ => false,
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        self.any_node(&mut |e| matches!(e, Expression::Function(f) if f.is_plain_aggregate()))
    }
}

impl From<ColumnReference> for Expression {
    fn from(c: ColumnReference) -> Self {
        Expression::Column(c)
    }
}

impl From<Literal> for Expression {
    fn from(l: Literal) -> Self {
        Expression::Literal(l)
    }
}

impl From<JdbcParameter> for Expression {
    fn from(p: JdbcParameter) -> Self {
        Expression::Parameter(p)
    }
}
