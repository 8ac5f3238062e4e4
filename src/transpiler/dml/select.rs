//! SELECT rendering for query specs and set-operation groups.

use super::Parens;
use crate::ast::{Expression, QueryGroup, QueryPart, QuerySpec};
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::buffer::Clause;
use crate::transpiler::pagination::PagingPlan;
use crate::transpiler::translation::Translation;

impl<'a> Translation<'a> {
    /// Render any query part: top-level query, sub-query, CTE body or group member.
    pub(crate) fn visit_query_part(
        &mut self,
        part: &'a QueryPart,
        parens: Parens,
    ) -> TranslateResult<()> {
        let depth = self.parts.len();
        let numbering = self.numbering;
        let for_update = self.for_update.take();
        self.numbering = numbering.scoped_to(part, depth);
        let wrap = parens.applies(part);

        let result = self.in_part(part, |t| match part {
            QueryPart::Spec(spec) => t.visit_query_spec(part, spec, wrap),
            QueryPart::Group(group) => t.visit_query_group(part, group, wrap),
        });

        self.numbering = numbering;
        self.for_update = for_update;
        result
    }

    fn visit_query_spec(
        &mut self,
        part: &'a QueryPart,
        spec: &'a QuerySpec,
        wrap: bool,
    ) -> TranslateResult<()> {
        let paging = self.paging(part);
        let plan = self.plan_paging(part, &paging)?;
        match plan {
            PagingPlan::Emulate => return self.emulate_paging(part, paging, wrap),
            PagingPlan::ClientSide | PagingPlan::TopWithClientSkip => {
                self.apply_client_paging(&paging, plan)?
            }
            PagingPlan::Skip | PagingPlan::Native => {}
        }
        let caps = self.caps;
        let numbered = self.numbering.is_target(part);

        if wrap {
            self.push('(');
        }
        self.append_sql("SELECT ");
        self.in_clause(Clause::Select, |t| {
            if spec.select.distinct {
                t.append_sql("DISTINCT ");
            }
            let prefix = (caps.pagination.is_prefix() && plan == PagingPlan::Native)
                || plan == PagingPlan::TopWithClientSkip;
            if prefix {
                t.render_paging_prefix(&paging, plan)?;
            }
            t.visit_selections(&spec.select.selections)?;
            if numbered {
                t.render_numbering_columns(part, None)?;
            }
            Ok(())
        })?;

        self.visit_from_clause(&spec.from)?;
        self.visit_where_clause(spec.restriction.as_ref())?;
        self.visit_group_by(spec)?;
        self.visit_having(spec)?;
        if !numbered {
            self.visit_order_by(part)?;
        }
        if plan == PagingPlan::Native && !caps.pagination.is_prefix() {
            self.render_paging_suffix(part, &paging)?;
        }
        self.visit_for_update(part, spec)?;
        if wrap {
            self.push(')');
        }
        Ok(())
    }

    fn visit_selections(&mut self, selections: &'a [Expression]) -> TranslateResult<()> {
        let select_aliases = self.numbering.select_aliases;
        for (i, selection) in selections.iter().enumerate() {
            if i > 0 {
                self.append_sql(", ");
            }
            self.render_select_expression(selection)?;
            if select_aliases {
                self.append_sql(&format!(" c{}", i));
            }
        }
        Ok(())
    }

    pub(crate) fn visit_group_by(&mut self, spec: &'a QuerySpec) -> TranslateResult<()> {
        if !spec.has_group_by() {
            return Ok(());
        }
        self.append_sql(" GROUP BY ");
        self.in_clause(Clause::GroupBy, |t| t.render_list(&spec.group_by))
    }

    pub(crate) fn visit_having(&mut self, spec: &'a QuerySpec) -> TranslateResult<()> {
        match spec.having.as_ref() {
            Some(having) if spec.has_having() => {
                self.append_sql(" HAVING ");
                self.in_clause(Clause::Having, |t| t.visit_predicate(having))
            }
            _ => Ok(()),
        }
    }

    fn visit_order_by(&mut self, part: &'a QueryPart) -> TranslateResult<()> {
        let order_by = part.order_by();
        if order_by.is_empty() {
            return Ok(());
        }
        self.append_sql(" ORDER BY ");
        self.in_clause(Clause::OrderBy, |t| t.render_sort_specifications(order_by))
    }

    fn visit_query_group(
        &mut self,
        part: &'a QueryPart,
        group: &'a QueryGroup,
        wrap: bool,
    ) -> TranslateResult<()> {
        if group.parts.is_empty() {
            return Err(TranslateError::malformed("Query group without members"));
        }
        let paging = self.paging(part);
        let plan = self.plan_paging(part, &paging)?;
        match plan {
            PagingPlan::Emulate => return self.emulate_paging(part, paging, wrap),
            PagingPlan::ClientSide | PagingPlan::TopWithClientSkip => {
                self.apply_client_paging(&paging, plan)?
            }
            PagingPlan::Skip | PagingPlan::Native => {}
        }

        if wrap {
            self.push('(');
        }
        if self.numbering.is_target(part) {
            // Members project c0..cN; the window columns are added around them
            let alias = self.next_group_alias();
            self.append_sql("SELECT ");
            self.append_sql(&alias);
            self.append_sql(".*");
            self.in_clause(Clause::Select, |t| t.render_numbering_columns(part, Some(&alias)))?;
            self.append_sql(" FROM (");
            self.visit_group_members(group)?;
            self.push(')');
            let caps = self.caps;
            let separator = &caps.table_alias_separator;
            self.append_sql(separator);
            self.append_sql(&alias);
        } else {
            self.visit_group_members(group)?;
            self.visit_order_by(part)?;
            if plan == PagingPlan::Native {
                self.render_paging_suffix(part, &paging)?;
            }
        }
        if wrap {
            self.push(')');
        }
        Ok(())
    }

    fn visit_group_members(&mut self, group: &'a QueryGroup) -> TranslateResult<()> {
        let operator = group.set_operator.sql_text();
        for (i, member) in group.parts.iter().enumerate() {
            if i > 0 {
                self.push(' ');
                self.append_sql(operator);
                self.push(' ');
            }
            self.visit_query_part(member, Parens::GroupMember)?;
        }
        Ok(())
    }
}
