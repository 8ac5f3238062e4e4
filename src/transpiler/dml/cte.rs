//! CTE (Common Table Expression) SQL generation.
//!
//! Supports:
//! - Multiple CTEs: `WITH x AS (...), y AS (...) SELECT ...`
//! - Recursive CTEs, with `RECURSIVE` omitted where the database has no such keyword
//! - `[NOT] MATERIALIZED` hints, `SEARCH` and `CYCLE` clauses

use super::Parens;
use crate::ast::{
    CteClause, CteCycleClause, CteMaterialization, CteSearchClause, CteSearchKind, CteStatement,
    NullPrecedence, SortOrder,
};
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::buffer::Clause;
use crate::transpiler::translation::Translation;

impl<'a> Translation<'a> {
    /// `WITH [RECURSIVE] a AS (..), b AS (..) ` ahead of the statement body.
    pub(crate) fn visit_cte_clause(&mut self, with: &'a CteClause) -> TranslateResult<()> {
        if with.is_empty() {
            return Ok(());
        }
        self.append_sql("WITH ");
        if with.recursive && self.caps.supports_recursive_keyword {
            self.append_sql("RECURSIVE ");
        }
        self.in_clause(Clause::With, |t| {
            for (i, cte) in with.ctes.iter().enumerate() {
                if i > 0 {
                    t.append_sql(", ");
                }
                t.visit_cte(cte)?;
            }
            Ok(())
        })?;
        self.push(' ');
        Ok(())
    }

    fn visit_cte(&mut self, cte: &'a CteStatement) -> TranslateResult<()> {
        self.append_sql(&cte.name);
        if !cte.columns.is_empty() {
            self.append_sql(" (");
            self.append_sql(&cte.columns.join(", "));
            self.push(')');
        }
        self.append_sql(" AS ");
        if let Some(materialization) = cte.materialization {
            if self.caps.supports_cte_materialization {
                self.append_sql(match materialization {
                    CteMaterialization::Materialized => "MATERIALIZED ",
                    CteMaterialization::NotMaterialized => "NOT MATERIALIZED ",
                });
            } else {
                tracing::trace!(cte = %cte.name, "dropping unsupported materialization hint");
            }
        }
        self.push('(');
        self.visit_query_part(&cte.definition, Parens::Never)?;
        self.push(')');

        if cte.search.is_some() || cte.cycle.is_some() {
            if !self.caps.supports_cte_search_cycle {
                return Err(TranslateError::unsupported(format!(
                    "{} does not support SEARCH/CYCLE clauses on CTE {}",
                    self.caps.name, cte.name
                )));
            }
            if let Some(search) = &cte.search {
                self.render_cte_search(search);
            }
            if let Some(cycle) = &cte.cycle {
                self.render_cte_cycle(cycle);
            }
        }
        Ok(())
    }

    fn render_cte_search(&mut self, search: &CteSearchClause) {
        self.append_sql(match search.kind {
            CteSearchKind::DepthFirst => " SEARCH DEPTH FIRST BY ",
            CteSearchKind::BreadthFirst => " SEARCH BREADTH FIRST BY ",
        });
        for (i, item) in search.by.iter().enumerate() {
            if i > 0 {
                self.append_sql(", ");
            }
            self.append_sql(&item.column);
            match item.order {
                Some(SortOrder::Asc) => self.append_sql(" ASC"),
                Some(SortOrder::Desc) => self.append_sql(" DESC"),
                None => {}
            }
            match item.nulls {
                NullPrecedence::First => self.append_sql(" NULLS FIRST"),
                NullPrecedence::Last => self.append_sql(" NULLS LAST"),
                NullPrecedence::None => {}
            }
        }
        self.append_sql(" SET ");
        self.append_sql(&search.set_column);
    }

    fn render_cte_cycle(&mut self, cycle: &CteCycleClause) {
        self.append_sql(" CYCLE ");
        self.append_sql(&cycle.columns.join(", "));
        self.append_sql(" SET ");
        self.append_sql(&cycle.mark_column);
        self.append_sql(" TO ");
        self.render_value(&cycle.cycle_value);
        self.append_sql(" DEFAULT ");
        self.render_value(&cycle.non_cycle_value);
        if let Some(path) = &cycle.path_column {
            self.append_sql(" USING ");
            self.append_sql(path);
        }
    }
}
