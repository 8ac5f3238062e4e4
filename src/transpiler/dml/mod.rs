//! DML (Data Manipulation Language) SQL generation.
//!
//! One module per statement kind; `select` also holds the query part
//! visitor that every sub-query goes through.

pub mod cte;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

use super::buffer::Clause;
use super::translation::Translation;
use crate::ast::{ColumnReference, Predicate, QueryPart, Statement, TableReference};
use crate::error::{TranslateError, TranslateResult};

/// When a query part is wrapped in parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parens {
    /// Any part but the root.
    Auto,
    Always,
    /// The caller supplies its own parentheses, or none are allowed.
    Never,
    /// Member of a set operation: only when it has its own ORDER BY,
    /// OFFSET/FETCH, or is itself a group.
    GroupMember,
}

impl Parens {
    pub fn applies(self, part: &QueryPart) -> bool {
        match self {
            Parens::Auto => !part.is_root(),
            Parens::Always => true,
            Parens::Never => false,
            Parens::GroupMember => {
                matches!(part, QueryPart::Group(_))
                    || !part.order_by().is_empty()
                    || part.has_offset_or_fetch()
            }
        }
    }
}

impl<'a> Translation<'a> {
    pub(crate) fn visit_statement(&mut self, statement: &'a Statement) -> TranslateResult<()> {
        match statement {
            Statement::Select(select) => {
                self.visit_cte_clause(&select.with)?;
                self.visit_query_part(&select.query, Parens::Auto)
            }
            Statement::Insert(insert) => self.visit_insert(insert),
            Statement::Update(update) => self.visit_update(update),
            Statement::Delete(delete) => self.visit_delete(delete),
        }
    }

    pub(crate) fn visit_where_clause(
        &mut self,
        restriction: Option<&'a Predicate>,
    ) -> TranslateResult<()> {
        match restriction {
            Some(predicate) if !predicate.is_empty() => {
                self.append_sql(" WHERE ");
                self.in_clause(Clause::Where, |t| t.visit_predicate(predicate))
            }
            _ => Ok(()),
        }
    }

    /// Render a mutation target and register it as affected.
    pub(crate) fn visit_dml_target(&mut self, target: &'a TableReference) -> TranslateResult<()> {
        let TableReference::Named { table, alias } = target else {
            return Err(TranslateError::malformed(
                "Mutation target must be a named table",
            ));
        };
        self.append_sql(table);
        self.register_affected_table(table);
        self.dml_target_alias = alias.as_deref();
        Ok(())
    }

    pub(crate) fn visit_returning(&mut self, columns: &'a [ColumnReference]) -> TranslateResult<()> {
        if columns.is_empty() {
            return Ok(());
        }
        if !self.caps.supports_returning {
            return Err(TranslateError::unsupported(format!(
                "{} does not support RETURNING",
                self.caps.name
            )));
        }
        self.append_sql(" RETURNING ");
        self.in_clause(Clause::Returning, |t| {
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    t.append_sql(", ");
                }
                t.visit_column(column);
            }
            Ok(())
        })
    }
}
