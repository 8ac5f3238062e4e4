//! Predicate rendering.

use super::dml::Parens;
use super::params::ParameterBinder;
use super::translation::Translation;
use crate::ast::{Expression, FilterPredicate, Nature, Predicate};
use crate::error::{TranslateError, TranslateResult};

impl<'a> Translation<'a> {
    pub(crate) fn visit_predicate(&mut self, predicate: &'a Predicate) -> TranslateResult<()> {
        match predicate {
            Predicate::Comparison { lhs, op, rhs } => self.visit_comparison(lhs, *op, rhs),
            Predicate::Between {
                expr,
                lower,
                upper,
                negated,
            } => {
                self.visit_expression(expr)?;
                self.append_sql(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.visit_expression(lower)?;
                self.append_sql(" AND ");
                self.visit_expression(upper)
            }
            Predicate::Like {
                expr,
                pattern,
                escape,
                negated,
                case_sensitive,
            } => self.visit_like(expr, pattern, escape.as_ref(), *negated, *case_sensitive),
            Predicate::InList {
                test,
                list,
                negated,
            } => self.visit_in_list(test, list, *negated),
            Predicate::InSubQuery {
                test,
                query,
                negated,
            } => self.visit_in_subquery(test, query, *negated),
            Predicate::Exists { query, negated } => {
                self.append_sql(if *negated { "NOT EXISTS " } else { "EXISTS " });
                self.visit_query_part(query, Parens::Always)
            }
            Predicate::Nullness { expr, negated } => self.visit_nullness(expr, *negated),
            Predicate::Negated(inner) => {
                if inner.is_empty() {
                    return Ok(());
                }
                self.append_sql("NOT (");
                self.visit_predicate(inner)?;
                self.push(')');
                Ok(())
            }
            Predicate::Junction { nature, predicates } => {
                let mut first = true;
                for member in predicates {
                    self.visit_junction_member(*nature, member, &mut first)?;
                }
                Ok(())
            }
            Predicate::Grouped(inner) => {
                if inner.is_empty() {
                    return Ok(());
                }
                self.push('(');
                self.visit_predicate(inner)?;
                self.push(')');
                Ok(())
            }
            Predicate::Filter(filter) => self.visit_filter_predicate(filter),
            Predicate::SelfRendering(node) => {
                let node: &'a dyn crate::ast::SqlRenderable = &*node.0;
                node.render(self)
            }
        }
    }

    /// Members of a same-nature junction are flattened; empty members are skipped.
    fn visit_junction_member(
        &mut self,
        nature: Nature,
        member: &'a Predicate,
        first: &mut bool,
    ) -> TranslateResult<()> {
        if member.is_empty() {
            return Ok(());
        }
        if let Predicate::Junction {
            nature: inner,
            predicates,
        } = member
        {
            if *inner == nature {
                for nested in predicates {
                    self.visit_junction_member(nature, nested, first)?;
                }
                return Ok(());
            }
        }
        if !*first {
            self.append_sql(nature.separator());
        }
        *first = false;

        let needs_parens = matches!(
            member,
            Predicate::Junction { predicates, .. }
                if predicates.iter().filter(|p| !p.is_empty()).count() > 1
        );
        if needs_parens {
            self.push('(');
        }
        self.visit_predicate(member)?;
        if needs_parens {
            self.push(')');
        }
        Ok(())
    }

    fn visit_like(
        &mut self,
        expr: &'a Expression,
        pattern: &'a Expression,
        escape: Option<&'a Expression>,
        negated: bool,
        case_sensitive: bool,
    ) -> TranslateResult<()> {
        let lowered = !case_sensitive && !self.caps.supports_ilike;
        if lowered {
            tracing::trace!("emulating ILIKE with lower()");
        }
        self.render_lowered(expr, lowered)?;
        if negated {
            self.append_sql(" NOT");
        }
        self.append_sql(if case_sensitive || lowered {
            " LIKE "
        } else {
            " ILIKE "
        });
        self.render_lowered(pattern, lowered)?;
        if let Some(escape) = escape {
            self.append_sql(" ESCAPE ");
            self.visit_expression(escape)?;
        }
        Ok(())
    }

    fn render_lowered(&mut self, expr: &'a Expression, lowered: bool) -> TranslateResult<()> {
        if lowered {
            self.append_sql("lower(");
            self.visit_expression(expr)?;
            self.push(')');
            Ok(())
        } else {
            self.visit_expression(expr)
        }
    }

    fn visit_nullness(&mut self, expr: &'a Expression, negated: bool) -> TranslateResult<()> {
        let keyword = if negated { " IS NOT NULL" } else { " IS NULL" };
        match expr {
            Expression::Tuple(items) if items.len() == 1 => {
                self.visit_expression(&items[0])?;
                self.append_sql(keyword);
            }
            Expression::Tuple(items) if self.caps.row_values => {
                self.render_row_value(items)?;
                self.append_sql(keyword);
            }
            Expression::Tuple(items) => {
                // A row is NULL when every column is, NOT NULL when none is
                self.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.append_sql(" AND ");
                    }
                    self.visit_expression(item)?;
                    self.append_sql(keyword);
                }
                self.push(')');
            }
            other => {
                self.visit_expression(other)?;
                self.append_sql(keyword);
            }
        }
        Ok(())
    }

    /// Copy a filter fragment, renumbering its `?` markers to dialect placeholders.
    fn visit_filter_predicate(&mut self, filter: &'a FilterPredicate) -> TranslateResult<()> {
        let fragment = filter.fragment.as_str();
        let mut parameters = filter.parameters.iter();
        let mut in_quotes = false;
        let mut copied = 0;
        for (i, c) in fragment.char_indices() {
            match c {
                '\'' => in_quotes = !in_quotes,
                '?' if !in_quotes => {
                    self.append_sql(&fragment[copied..i]);
                    let parameter = parameters.next().ok_or_else(|| {
                        TranslateError::malformed("Filter fragment has more markers than parameters")
                    })?;
                    self.registry.add_filter_parameter(parameter.clone());
                    self.append_placeholder(ParameterBinder::Filter(parameter.clone()));
                    copied = i + 1;
                }
                _ => {}
            }
        }
        self.append_sql(&fragment[copied..]);
        if parameters.next().is_some() {
            return Err(TranslateError::malformed(
                "Filter fragment has fewer markers than parameters",
            ));
        }
        Ok(())
    }

    /// `FALSE`/`TRUE` as a predicate, for empty IN lists.
    pub(crate) fn render_constant_predicate(&mut self, value: bool) {
        use super::dialect::BooleanLiteralStyle;
        let text = match (self.caps.boolean_literals, value) {
            (BooleanLiteralStyle::Keywords, true) => "TRUE",
            (BooleanLiteralStyle::Keywords, false) => "FALSE",
            (BooleanLiteralStyle::Numeric, true) => "1=1",
            (BooleanLiteralStyle::Numeric, false) => "1=0",
        };
        self.append_sql(text);
    }
}
