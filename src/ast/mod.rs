//! Resolved, dialect-neutral statement trees.

pub mod builders;
pub mod expr;
pub mod from;
pub mod lock;
pub mod operators;
pub mod predicate;
pub mod query;
pub mod statement;
pub mod values;

pub use self::expr::{
    CaseSearched, CaseSimple, ColumnReference, Expression, FunctionCall, FunctionKind,
    JdbcParameter, Literal, ParameterId, SearchedWhen, SelfRendering, SimpleWhen, SqlRenderable,
    SummarizationKind, WindowSpec,
};
pub use self::from::{
    FromClause, LazyTableGroup, StandardTableGroup, TableGroup, TableGroupJoin, TableReference,
    TableReferenceJoin, VirtualTableGroup,
};
pub use self::lock::{LockMode, LockOptions, LockTimeout};
pub use self::operators::{
    BinaryOperator, ComparisonOperator, FetchClauseType, JoinType, Nature, NullPrecedence,
    SetOperator, SortOrder, UnaryOperator,
};
pub use self::predicate::{FilterParameter, FilterPredicate, Predicate};
pub use self::query::{QueryGroup, QueryPart, QuerySpec, SelectClause, SortSpecification};
pub use self::statement::{
    Assignment, CteClause, CteCycleClause, CteMaterialization, CteSearchClause, CteSearchItem,
    CteSearchKind, CteStatement, DeleteStatement, InsertSource, InsertStatement, SelectStatement,
    Statement, UpdateStatement,
};
pub use self::values::{SqlType, Value};
