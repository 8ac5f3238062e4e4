//! The execution artifact produced by a translation.

use super::locking::LockStrategy;
use super::params::{
    AppliedBindings, BindTarget, ExecutionContext, ParameterBinder, ParameterBindings,
};
use super::translation::Translation;
use crate::ast::{FilterParameter, Statement};
use crate::error::TranslateResult;
use serde::Serialize;
use std::collections::BTreeSet;

/// SQL text plus everything needed to execute it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationParts {
    pub sql: String,
    #[serde(skip)]
    pub parameter_binders: Vec<ParameterBinder>,
    pub affected_table_names: BTreeSet<String>,
    #[serde(skip)]
    pub filter_parameters: Vec<FilterParameter>,
    #[serde(skip)]
    pub applied_bindings: AppliedBindings,
}

/// A translated SELECT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdbcSelect {
    #[serde(flatten)]
    pub parts: OperationParts,
    pub rows_to_skip: Option<u64>,
    pub max_rows: Option<u64>,
    pub lock_strategy: LockStrategy,
    pub offset_parameter: bool,
    pub limit_parameter: bool,
}

impl JdbcSelect {
    /// Rows the driver must skip before returning results.
    pub fn rows_to_skip(&self) -> u64 {
        self.rows_to_skip.unwrap_or(0)
    }

    /// Row cap for the driver, counting skipped rows.
    pub fn max_rows(&self) -> Option<u64> {
        self.max_rows
    }

    pub fn lock_strategy(&self) -> LockStrategy {
        self.lock_strategy
    }

    /// Whether the synthetic first-row parameter was rendered.
    pub fn offset_parameter(&self) -> bool {
        self.offset_parameter
    }

    /// Whether the synthetic max-rows parameter was rendered.
    pub fn limit_parameter(&self) -> bool {
        self.limit_parameter
    }
}

/// A translated statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JdbcOperation {
    Select(JdbcSelect),
    Mutation(OperationParts),
}

impl JdbcOperation {
    pub(crate) fn from_translation(statement: &Statement, translation: &mut Translation<'_>) -> Self {
        let (parameter_binders, affected_table_names, filter_parameters, applied_bindings) =
            std::mem::take(&mut translation.registry).into_parts();
        let parts = OperationParts {
            sql: translation.buffer.take(),
            parameter_binders,
            affected_table_names,
            filter_parameters,
            applied_bindings,
        };
        match statement {
            Statement::Select(_) => JdbcOperation::Select(JdbcSelect {
                parts,
                rows_to_skip: translation.rows_to_skip,
                max_rows: translation.max_rows,
                lock_strategy: translation.lock_strategy,
                offset_parameter: translation.uses_offset_parameter,
                limit_parameter: translation.uses_limit_parameter,
            }),
            _ => JdbcOperation::Mutation(parts),
        }
    }

    pub fn parts(&self) -> &OperationParts {
        match self {
            JdbcOperation::Select(select) => &select.parts,
            JdbcOperation::Mutation(parts) => parts,
        }
    }

    pub fn sql(&self) -> &str {
        &self.parts().sql
    }

    pub fn parameter_binders(&self) -> &[ParameterBinder] {
        &self.parts().parameter_binders
    }

    pub fn affected_table_names(&self) -> &BTreeSet<String> {
        &self.parts().affected_table_names
    }

    pub fn applied_bindings(&self) -> &AppliedBindings {
        &self.parts().applied_bindings
    }

    pub fn filter_parameters(&self) -> &[FilterParameter] {
        &self.parts().filter_parameters
    }

    pub fn as_select(&self) -> Option<&JdbcSelect> {
        match self {
            JdbcOperation::Select(select) => Some(select),
            JdbcOperation::Mutation(_) => None,
        }
    }

    /// Write every binder, in placeholder order, into `target`.
    pub fn bind_all(
        &self,
        target: &mut dyn BindTarget,
        bindings: &ParameterBindings,
        ctx: &ExecutionContext,
    ) -> TranslateResult<()> {
        for (i, binder) in self.parameter_binders().iter().enumerate() {
            binder.bind(target, i + 1, bindings, ctx)?;
        }
        Ok(())
    }
}
