//! # qail-translator
//!
//! > **Resolved trees in, dialect SQL out.**
//!
//! Translates dialect-neutral SQL statement trees into SQL text for a
//! specific database, together with ordered parameter binders, affected
//! tables and client-side pagination metadata.
//!
//! ## Quick Example
//!
//! ```
//! use qail_translator::prelude::*;
//!
//! let query = QuerySpec::new()
//!     .root()
//!     .select(vec![col("e", "id")])
//!     .from(table("employee", "e"))
//!     .filter(eq(col("e", "dept"), param(1, SqlType::Varchar)))
//!     .offset(lit(10))
//!     .fetch(lit(5));
//! let statement = Statement::from(QueryPart::from(query));
//!
//! let sql = statement.to_sql_with_dialect(Dialect::Postgres).unwrap();
//! assert_eq!(sql, "SELECT e.id FROM employee e WHERE e.dept = $1 LIMIT 5 OFFSET 10");
//! ```
//!
//! ## Strategies
//!
//! | Concern            | Native                    | Rewrite                                   |
//! |--------------------|---------------------------|-------------------------------------------|
//! | Tuple comparison   | `(a, b) > (?, ?)`         | lexicographic unrolling                   |
//! | OFFSET/FETCH       | `OFFSET .. FETCH ..`      | `TOP`, `SKIP/FIRST`, `row_number()` wrap  |
//! | Pessimistic lock   | `FOR UPDATE [OF ..]`      | table hints, follow-on locking            |

pub mod ast;
pub mod error;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::error::*;
    pub use crate::transpiler::{
        Capabilities, Dialect, ExecutionContext, JdbcOperation, JdbcSelect, Limit, LockStrategy,
        ParameterBindings, QueryOptions, SqlAstTranslator, ToSql,
    };
}
