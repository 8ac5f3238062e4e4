//! Ergonomic builder functions for statement trees.
//!
//! # Example
//! ```
//! use qail_translator::ast::builders::*;
//! use qail_translator::ast::*;
//!
//! let query = QuerySpec::new()
//!     .root()
//!     .select(vec![col("e", "id"), col("e", "name")])
//!     .from(table("employee", "e"))
//!     .filter(eq(col("e", "dept"), param(1, SqlType::Varchar)))
//!     .order_by(SortSpecification::asc(col("e", "name")))
//!     .fetch(lit(10));
//! assert!(query.fetch.is_some());
//! ```

use crate::ast::*;

/// Qualified column reference (`alias.column`).
pub fn col(qualifier: &str, column: &str) -> Expression {
    Expression::Column(ColumnReference::new(Some(qualifier), column))
}

/// Unqualified column reference.
pub fn column(column: &str) -> Expression {
    Expression::Column(ColumnReference::new(None, column))
}

pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Literal(Literal::new(value.into()))
}

pub fn null(sql_type: SqlType) -> Expression {
    Expression::Literal(Literal::typed_null(sql_type))
}

pub fn param(id: u32, sql_type: SqlType) -> Expression {
    Expression::Parameter(JdbcParameter {
        id: ParameterId(id),
        sql_type,
    })
}

pub fn tuple(items: Vec<Expression>) -> Expression {
    Expression::Tuple(items)
}

pub fn subquery(part: impl Into<QueryPart>) -> Expression {
    Expression::SubQuery(Box::new(part.into()))
}

pub fn any(part: impl Into<QueryPart>) -> Expression {
    Expression::Any(Box::new(part.into()))
}

pub fn every(part: impl Into<QueryPart>) -> Expression {
    Expression::Every(Box::new(part.into()))
}

pub fn binary(lhs: Expression, op: BinaryOperator, rhs: Expression) -> Expression {
    Expression::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn func(name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::Function(FunctionCall {
        name: name.to_string(),
        arguments,
        kind: FunctionKind::Scalar,
        distinct: false,
        filter: None,
        over: None,
    })
}

pub fn aggregate(name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::Function(FunctionCall {
        name: name.to_string(),
        arguments,
        kind: FunctionKind::Aggregate,
        distinct: false,
        filter: None,
        over: None,
    })
}

pub fn cmp(lhs: Expression, op: ComparisonOperator, rhs: Expression) -> Predicate {
    Predicate::Comparison { lhs, op, rhs }
}

pub fn eq(lhs: Expression, rhs: Expression) -> Predicate {
    cmp(lhs, ComparisonOperator::Equal, rhs)
}

pub fn ne(lhs: Expression, rhs: Expression) -> Predicate {
    cmp(lhs, ComparisonOperator::NotEqual, rhs)
}

pub fn gt(lhs: Expression, rhs: Expression) -> Predicate {
    cmp(lhs, ComparisonOperator::GreaterThan, rhs)
}

pub fn lt(lhs: Expression, rhs: Expression) -> Predicate {
    cmp(lhs, ComparisonOperator::LessThan, rhs)
}

pub fn and(predicates: Vec<Predicate>) -> Predicate {
    Predicate::and(predicates)
}

pub fn or(predicates: Vec<Predicate>) -> Predicate {
    Predicate::or(predicates)
}

pub fn in_list(test: Expression, list: Vec<Expression>) -> Predicate {
    Predicate::InList {
        test,
        list,
        negated: false,
    }
}

pub fn in_subquery(test: Expression, part: impl Into<QueryPart>) -> Predicate {
    Predicate::InSubQuery {
        test,
        query: Box::new(part.into()),
        negated: false,
    }
}

pub fn is_null(expr: Expression) -> Predicate {
    Predicate::Nullness {
        expr,
        negated: false,
    }
}

/// Standard table group over `table alias`.
pub fn table(name: &str, alias: &str) -> StandardTableGroup {
    StandardTableGroup::new(TableReference::named(name, Some(alias)))
}

impl StandardTableGroup {
    pub fn join(mut self, join_type: JoinType, group: impl Into<TableGroup>, on: Predicate) -> Self {
        self.group_joins.push(TableGroupJoin {
            join_type,
            group: group.into(),
            predicate: Some(on),
        });
        self
    }

    pub fn join_reference(mut self, join_type: JoinType, reference: TableReference, on: Predicate) -> Self {
        self.reference_joins.push(TableReferenceJoin {
            join_type,
            reference,
            predicate: Some(on),
        });
        self
    }

    pub fn key_columns(mut self, columns: &[&str]) -> Self {
        self.key_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.real = false;
        self
    }
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn select(mut self, selections: Vec<Expression>) -> Self {
        self.select.selections = selections;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    pub fn from(mut self, group: impl Into<TableGroup>) -> Self {
        self.from.roots.push(group.into());
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.restriction = Some(predicate);
        self
    }

    pub fn group_by(mut self, expressions: Vec<Expression>) -> Self {
        self.group_by = expressions;
        self
    }

    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, spec: SortSpecification) -> Self {
        self.order_by.push(spec);
        self
    }

    pub fn offset(mut self, expr: Expression) -> Self {
        self.offset = Some(expr);
        self
    }

    pub fn fetch(mut self, expr: Expression) -> Self {
        self.fetch = Some(expr);
        self
    }

    pub fn fetch_type(mut self, fetch_type: FetchClauseType) -> Self {
        self.fetch_type = fetch_type;
        self
    }
}

impl QueryGroup {
    pub fn new(set_operator: SetOperator, parts: Vec<QueryPart>) -> Self {
        Self {
            set_operator,
            parts,
            ..Self::default()
        }
    }

    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn order_by(mut self, spec: SortSpecification) -> Self {
        self.order_by.push(spec);
        self
    }

    pub fn offset(mut self, expr: Expression) -> Self {
        self.offset = Some(expr);
        self
    }

    pub fn fetch(mut self, expr: Expression) -> Self {
        self.fetch = Some(expr);
        self
    }

    pub fn fetch_type(mut self, fetch_type: FetchClauseType) -> Self {
        self.fetch_type = fetch_type;
        self
    }
}
