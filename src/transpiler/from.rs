//! FROM clause rendering: table groups, reference joins and nested group joins.

use super::buffer::Clause;
use super::dml::Parens;
use super::translation::Translation;
use crate::ast::{
    FromClause, JoinType, Predicate, StandardTableGroup, TableGroup, TableGroupJoin,
    TableReference,
};
use crate::error::TranslateResult;

impl<'a> Translation<'a> {
    pub(crate) fn visit_from_clause(&mut self, from: &'a FromClause) -> TranslateResult<()> {
        let roots: Vec<&'a StandardTableGroup> =
            from.roots.iter().filter_map(TableGroup::realized).collect();
        if roots.is_empty() {
            let caps = self.caps;
            let dual = &caps.from_dual_for_select_only;
            self.append_sql(dual);
            return Ok(());
        }
        self.append_sql(" FROM ");
        self.in_clause(Clause::From, |t| {
            for (i, root) in roots.into_iter().enumerate() {
                if i > 0 {
                    t.append_sql(", ");
                }
                t.render_table_group(root)?;
                for join in &root.group_joins {
                    t.visit_group_join(join)?;
                }
            }
            Ok(())
        })
    }

    /// Primary reference followed by its same-level reference joins.
    fn render_table_group(&mut self, group: &'a StandardTableGroup) -> TranslateResult<()> {
        self.render_table_reference(&group.primary, group)?;
        for join in &group.reference_joins {
            self.push(' ');
            self.append_sql(join.join_type.sql_text());
            self.push(' ');
            self.render_table_reference(&join.reference, group)?;
            self.render_join_predicate(join.join_type, join.predicate.as_ref())?;
        }
        for space in &group.query_spaces {
            self.register_affected_table(space);
        }
        Ok(())
    }

    fn visit_group_join(&mut self, join: &'a TableGroupJoin) -> TranslateResult<()> {
        if let TableGroup::Virtual(group) = &join.group {
            for nested in &group.group_joins {
                self.visit_group_join(nested)?;
            }
            return Ok(());
        }
        let Some(group) = join.group.realized() else {
            tracing::trace!(
                alias = join.group.source_alias(),
                "skipping unresolved lazy table group"
            );
            return Ok(());
        };

        self.push(' ');
        self.append_sql(join.join_type.sql_text());
        self.push(' ');
        // Reference joins of a joined group bind tighter than the group join
        let nested = !group.reference_joins.is_empty();
        if nested {
            self.push('(');
        }
        self.render_table_group(group)?;
        if nested {
            self.push(')');
        }
        self.render_join_predicate(join.join_type, join.predicate.as_ref())?;
        for nested_join in &group.group_joins {
            self.visit_group_join(nested_join)?;
        }
        Ok(())
    }

    fn render_join_predicate(
        &mut self,
        join_type: JoinType,
        predicate: Option<&'a Predicate>,
    ) -> TranslateResult<()> {
        if join_type == JoinType::Cross {
            return Ok(());
        }
        self.append_sql(" ON ");
        match predicate {
            Some(predicate) if !predicate.is_empty() => {
                self.in_clause(Clause::Where, |t| t.visit_predicate(predicate))
            }
            _ => {
                self.render_constant_predicate(true);
                Ok(())
            }
        }
    }

    fn render_table_reference(
        &mut self,
        reference: &'a TableReference,
        owner: &'a StandardTableGroup,
    ) -> TranslateResult<()> {
        match reference {
            TableReference::Named { table, alias } => {
                self.append_sql(table);
                if let Some(alias) = alias {
                    let caps = self.caps;
                    let separator = &caps.table_alias_separator;
                    self.append_sql(separator);
                    self.append_sql(alias);
                }
                self.register_affected_table(table);
                if owner.real {
                    let source = owner.source_alias.as_deref().or(alias.as_deref());
                    if let Some(mode) = self.effective_lock_mode(source) {
                        self.lock_table_reference(alias.as_deref().unwrap_or(table), mode);
                    }
                }
                Ok(())
            }
            TableReference::Derived { query, alias } => {
                self.visit_query_part(query, Parens::Always)?;
                let caps = self.caps;
                let separator = &caps.table_alias_separator;
                self.append_sql(separator);
                self.append_sql(alias);
                Ok(())
            }
        }
    }
}
