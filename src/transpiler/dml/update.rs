//! UPDATE SQL generation.

use crate::ast::{Assignment, Expression, UpdateStatement};
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::buffer::Clause;
use crate::transpiler::translation::Translation;

impl<'a> Translation<'a> {
    /// `UPDATE t SET a = x, (b, c) = (y, z) WHERE .. RETURNING ..`
    pub(crate) fn visit_update(&mut self, update: &'a UpdateStatement) -> TranslateResult<()> {
        if update.assignments.is_empty() {
            return Err(TranslateError::malformed("UPDATE without assignments"));
        }
        self.visit_cte_clause(&update.with)?;
        self.append_sql("UPDATE ");
        self.visit_dml_target(&update.target)?;
        self.append_sql(" SET ");
        self.in_clause(Clause::Set, |t| {
            for (i, assignment) in update.assignments.iter().enumerate() {
                if i > 0 {
                    t.append_sql(", ");
                }
                t.visit_assignment(assignment)?;
            }
            Ok(())
        })?;
        self.visit_where_clause(update.restriction.as_ref())?;
        self.visit_returning(&update.returning)
    }

    fn visit_assignment(&mut self, assignment: &'a Assignment) -> TranslateResult<()> {
        let columns = assignment.columns.as_slice();
        match columns {
            [] => Err(TranslateError::malformed("Assignment without target columns")),
            [column] => {
                self.visit_column(column);
                self.append_sql(" = ");
                self.visit_expression(&assignment.value)
            }
            _ if self.caps.row_values_in_set => {
                self.push('(');
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        self.append_sql(", ");
                    }
                    self.visit_column(column);
                }
                self.append_sql(") = ");
                match &assignment.value {
                    Expression::Tuple(items) => self.render_row_value(items),
                    value => self.visit_expression(value),
                }
            }
            _ => match &assignment.value {
                Expression::Tuple(items) if items.len() == columns.len() => {
                    tracing::trace!(columns = columns.len(), "expanding row value assignment");
                    for (i, (column, value)) in columns.iter().zip(items).enumerate() {
                        if i > 0 {
                            self.append_sql(", ");
                        }
                        self.visit_column(column);
                        self.append_sql(" = ");
                        self.visit_expression(value)?;
                    }
                    Ok(())
                }
                _ => Err(TranslateError::unsupported(format!(
                    "{} does not support row value assignments from a non-tuple value",
                    self.caps.name
                ))),
            },
        }
    }
}
