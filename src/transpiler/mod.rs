//! SQL translator for resolved statement trees.
//!
//! Renders a dialect-neutral [`Statement`] into SQL text for one database,
//! choosing per node between native syntax and an equivalent rewrite based on
//! the active [`Capabilities`].

pub mod buffer;
pub mod conditions;
pub mod dialect;
pub mod dml;
pub mod expressions;
pub mod from;
pub mod literals;
pub mod locking;
pub mod operation;
pub mod pagination;
pub mod params;
pub mod sql;
pub mod translation;
pub mod tuples;

#[cfg(test)]
mod tests;

use crate::ast::{LockOptions, Statement};
use crate::error::TranslateResult;

pub use buffer::Clause;
pub use dialect::{Capabilities, Dialect};
pub use locking::LockStrategy;
pub use operation::{JdbcOperation, JdbcSelect, OperationParts};
pub use params::{
    AppliedBindings, BindTarget, BindingKey, ExecutionContext, Limit, ParameterBinder,
    ParameterBindings,
};
pub use translation::{RenderingMode, Translation};

/// Per-call options: external pagination and the lock request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub limit: Option<Limit>,
    pub lock_options: LockOptions,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_lock_options(mut self, lock_options: LockOptions) -> Self {
        self.lock_options = lock_options;
        self
    }
}

/// Translates statement trees for one capability set.
///
/// Every call to [`translate`](Self::translate) runs against fresh state, so
/// one translator can be shared across threads and reused freely.
#[derive(Debug, Clone)]
pub struct SqlAstTranslator {
    caps: Capabilities,
}

impl SqlAstTranslator {
    pub fn new(caps: Capabilities) -> Self {
        Self { caps }
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new(dialect.capabilities())
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Render `statement` and collect its binders and execution metadata.
    pub fn translate(
        &self,
        statement: &Statement,
        options: &QueryOptions,
        bindings: Option<&ParameterBindings>,
    ) -> TranslateResult<JdbcOperation> {
        tracing::debug!(
            dialect = %self.caps.name,
            kind = statement.kind(),
            "translating statement"
        );
        let mut translation =
            Translation::new(&self.caps, options.limit, &options.lock_options, bindings);
        let outcome = translation.visit_statement(statement);
        translation.cleanup();
        outcome?;

        let operation = JdbcOperation::from_translation(statement, &mut translation);
        tracing::debug!(
            dialect = %self.caps.name,
            binders = operation.parameter_binders().len(),
            tables = operation.affected_table_names().len(),
            "translated statement"
        );
        Ok(operation)
    }
}

/// Trait for converting statement trees to SQL.
pub trait ToSql {
    /// Convert this statement to SQL using the default dialect.
    fn to_sql(&self) -> TranslateResult<String> {
        self.to_sql_with_dialect(Dialect::default())
    }

    /// Convert this statement to SQL for a specific dialect.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranslateResult<String>;
}

impl ToSql for Statement {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranslateResult<String> {
        let operation =
            SqlAstTranslator::for_dialect(dialect).translate(self, &QueryOptions::default(), None)?;
        Ok(operation.sql().to_string())
    }
}
