//! INSERT SQL generation.

use super::Parens;
use crate::ast::{InsertSource, InsertStatement};
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::buffer::Clause;
use crate::transpiler::translation::Translation;

impl<'a> Translation<'a> {
    /// `INSERT INTO t (cols) VALUES (..), (..)` or `INSERT INTO t (cols) SELECT ..`.
    pub(crate) fn visit_insert(&mut self, insert: &'a InsertStatement) -> TranslateResult<()> {
        self.visit_cte_clause(&insert.with)?;
        self.append_sql("INSERT INTO ");
        self.visit_dml_target(&insert.target)?;
        // Columns of the target table are never qualified
        self.dml_target_alias = None;
        if !insert.columns.is_empty() {
            self.append_sql(" (");
            for (i, column) in insert.columns.iter().enumerate() {
                if i > 0 {
                    self.append_sql(", ");
                }
                self.append_sql(&column.column);
            }
            self.push(')');
        }

        match &insert.source {
            InsertSource::Values(rows) => {
                if rows.is_empty() {
                    return Err(TranslateError::malformed("INSERT without rows"));
                }
                let arity = insert.columns.len();
                if arity > 0 && rows.iter().any(|row| row.len() != arity) {
                    return Err(TranslateError::malformed(format!(
                        "INSERT row does not match the {} target columns",
                        arity
                    )));
                }
                self.append_sql(" VALUES ");
                self.in_clause(Clause::Values, |t| {
                    for (i, row) in rows.iter().enumerate() {
                        if i > 0 {
                            t.append_sql(", ");
                        }
                        t.push('(');
                        t.render_list(row)?;
                        t.push(')');
                    }
                    Ok(())
                })?;
            }
            InsertSource::Select(query) => {
                self.push(' ');
                self.in_clause(Clause::Insert, |t| t.visit_query_part(query, Parens::Never))?;
            }
        }
        self.visit_returning(&insert.returning)
    }
}
