//! Translator test modules.
//!
//! Tests are organized by category:
//! - `core`: SELECT, INSERT, UPDATE, DELETE and CTE rendering
//! - `dialects`: placeholder, literal, null ordering and lock hint differences
//! - `tuples`: row value comparisons and their emulations
//! - `pagination`: native, prefix, client-side and window-function paging
//! - `locking`: lock clauses, follow-on locking and their failures
//! - `params`: binder ordering, folding and execution-time binding

mod core;
mod locking;
mod params;
mod tuples;

use crate::ast::builders::*;
use crate::ast::*;
use crate::transpiler::{Dialect, JdbcOperation, QueryOptions, SqlAstTranslator};

/// `SELECT e.id, e.name FROM employee e`, marked as the root.
pub(super) fn employees() -> QuerySpec {
    QuerySpec::new()
        .root()
        .select(vec![col("e", "id"), col("e", "name")])
        .from(table("employee", "e"))
}

pub(super) fn translate(dialect: Dialect, statement: &Statement) -> JdbcOperation {
    SqlAstTranslator::for_dialect(dialect)
        .translate(statement, &QueryOptions::default(), None)
        .unwrap()
}

pub(super) fn sql(dialect: Dialect, part: impl Into<QueryPart>) -> String {
    let statement = Statement::from(part.into());
    translate(dialect, &statement).sql().to_string()
}
