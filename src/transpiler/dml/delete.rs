//! DELETE SQL generation.

use crate::ast::DeleteStatement;
use crate::error::TranslateResult;
use crate::transpiler::translation::Translation;

impl<'a> Translation<'a> {
    pub(crate) fn visit_delete(&mut self, delete: &'a DeleteStatement) -> TranslateResult<()> {
        self.visit_cte_clause(&delete.with)?;
        self.append_sql("DELETE FROM ");
        self.visit_dml_target(&delete.target)?;
        self.visit_where_clause(delete.restriction.as_ref())?;
        self.visit_returning(&delete.returning)
    }
}
