use crate::ast::{
    Expression, FetchClauseType, FromClause, NullPrecedence, Predicate, SetOperator, SortOrder,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpecification {
    pub expr: Expression,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub nulls: NullPrecedence,
}

impl SortSpecification {
    pub fn asc(expr: Expression) -> Self {
        Self {
            expr,
            order: SortOrder::Asc,
            nulls: NullPrecedence::None,
        }
    }

    pub fn desc(expr: Expression) -> Self {
        Self {
            expr,
            order: SortOrder::Desc,
            nulls: NullPrecedence::None,
        }
    }

    pub fn nulls(mut self, nulls: NullPrecedence) -> Self {
        self.nulls = nulls;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectClause {
    pub distinct: bool,
    pub selections: Vec<Expression>,
}

/// A single `SELECT`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    pub root: bool,
    pub select: SelectClause,
    pub from: FromClause,
    pub restriction: Option<Predicate>,
    pub group_by: Vec<Expression>,
    pub having: Option<Predicate>,
    pub order_by: Vec<SortSpecification>,
    pub offset: Option<Expression>,
    pub fetch: Option<Expression>,
    pub fetch_type: FetchClauseType,
}

impl QuerySpec {
    pub fn has_group_by(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn has_having(&self) -> bool {
        self.having.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Plain aggregate calls in the select list, HAVING, or ORDER BY.
    pub fn has_aggregate_functions(&self) -> bool {
        let mut is_aggregate = |e: &Expression| {
            matches!(e, Expression::Function(f) if f.is_plain_aggregate())
        };
        self.select
            .selections
            .iter()
            .any(Expression::contains_aggregate)
            || self
                .having
                .as_ref()
                .is_some_and(|p| p.any_expression(&mut is_aggregate))
            || self
                .order_by
                .iter()
                .any(|s| s.expr.contains_aggregate())
    }
}

/// Query parts combined by a set operator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryGroup {
    pub root: bool,
    pub set_operator: SetOperator,
    pub parts: Vec<QueryPart>,
    pub order_by: Vec<SortSpecification>,
    pub offset: Option<Expression>,
    pub fetch: Option<Expression>,
    pub fetch_type: FetchClauseType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPart {
    Spec(QuerySpec),
    Group(QueryGroup),
}

impl QueryPart {
    pub fn is_root(&self) -> bool {
        match self {
            QueryPart::Spec(s) => s.root,
            QueryPart::Group(g) => g.root,
        }
    }

    pub fn order_by(&self) -> &[SortSpecification] {
        match self {
            QueryPart::Spec(s) => &s.order_by,
            QueryPart::Group(g) => &g.order_by,
        }
    }

    pub fn offset(&self) -> Option<&Expression> {
        match self {
            QueryPart::Spec(s) => s.offset.as_ref(),
            QueryPart::Group(g) => g.offset.as_ref(),
        }
    }

    pub fn fetch(&self) -> Option<&Expression> {
        match self {
            QueryPart::Spec(s) => s.fetch.as_ref(),
            QueryPart::Group(g) => g.fetch.as_ref(),
        }
    }

    pub fn fetch_type(&self) -> FetchClauseType {
        match self {
            QueryPart::Spec(s) => s.fetch_type,
            QueryPart::Group(g) => g.fetch_type,
        }
    }

    pub fn has_offset_or_fetch(&self) -> bool {
        self.offset().is_some() || self.fetch().is_some()
    }

    /// Left-most query spec, whose select list names the columns.
    pub fn first_query_spec(&self) -> Option<&QuerySpec> {
        match self {
            QueryPart::Spec(s) => Some(s),
            QueryPart::Group(g) => g.parts.first().and_then(QueryPart::first_query_spec),
        }
    }

    pub fn as_query_spec(&self) -> Option<&QuerySpec> {
        match self {
            QueryPart::Spec(s) => Some(s),
            QueryPart::Group(_) => None,
        }
    }
}

impl From<QuerySpec> for QueryPart {
    fn from(spec: QuerySpec) -> Self {
        QueryPart::Spec(spec)
    }
}

impl From<QueryGroup> for QueryPart {
    fn from(group: QueryGroup) -> Self {
        QueryPart::Group(group)
    }
}
