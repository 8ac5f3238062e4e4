//! Comparisons, IN predicates and their row-value emulations.
//!
//! Dialects without row-value support get equivalent single-column logic:
//! equality unrolls per column, ordering unrolls lexicographically, and
//! comparisons against sub-queries become correlated `EXISTS` restrictions.

use super::buffer::Clause;
use super::dialect::{DistinctFromStyle, TupleEmulation};
use super::dml::Parens;
use super::translation::Translation;
use crate::ast::{ComparisonOperator, Expression, QueryPart, QuerySpec};
use crate::error::{TranslateError, TranslateResult};
use std::slice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    Any,
    All,
}

/// Arity-1 tuples compare like their only element.
fn unwrap_single(expr: &Expression) -> &Expression {
    match expr {
        Expression::Tuple(items) if items.len() == 1 => unwrap_single(&items[0]),
        other => other,
    }
}

fn restriction_target(query: &QueryPart) -> TranslateResult<&QuerySpec> {
    match query {
        QueryPart::Spec(spec) if !query.has_offset_or_fetch() => Ok(spec),
        _ => Err(TranslateError::unsupported(
            "Can't emulate tuple comparisons against sub-queries with limit/offset or set operations",
        )),
    }
}

impl<'a> Translation<'a> {
    pub(crate) fn visit_comparison(
        &mut self,
        lhs: &'a Expression,
        op: ComparisonOperator,
        rhs: &'a Expression,
    ) -> TranslateResult<()> {
        let lhs = unwrap_single(lhs);
        let rhs = unwrap_single(rhs);
        match (lhs, rhs) {
            (Expression::Tuple(l), Expression::Tuple(r)) => {
                if l.len() != r.len() {
                    return Err(TranslateError::malformed(format!(
                        "Tuple arity mismatch: {} vs {}",
                        l.len(),
                        r.len()
                    )));
                }
                self.render_tuple_comparison(l, op, r)
            }
            (Expression::Tuple(l), Expression::SubQuery(query)) => {
                self.visit_tuple_subquery_comparison(l, op, query, None)
            }
            (Expression::Tuple(l), Expression::Any(query)) => {
                self.visit_tuple_subquery_comparison(l, op, query, Some(Quantifier::Any))
            }
            (Expression::Tuple(l), Expression::Every(query)) => {
                self.visit_tuple_subquery_comparison(l, op, query, Some(Quantifier::All))
            }
            (Expression::SubQuery(query), Expression::Tuple(r)) => {
                if self.caps.row_values {
                    self.visit_query_part(query, Parens::Always)?;
                    self.render_operator(op);
                    self.render_row_value(r)
                } else {
                    self.render_subquery_restriction(query, false, r, op)
                }
            }
            (Expression::Tuple(_), _) | (_, Expression::Tuple(_)) => Err(
                TranslateError::malformed("Tuple compared with a scalar expression"),
            ),
            _ => self.render_scalar_comparison(lhs, op, rhs),
        }
    }

    fn render_operator(&mut self, op: ComparisonOperator) {
        self.push(' ');
        self.append_sql(op.sql_text());
        self.push(' ');
    }

    fn render_scalar_comparison(
        &mut self,
        lhs: &'a Expression,
        op: ComparisonOperator,
        rhs: &'a Expression,
    ) -> TranslateResult<()> {
        let distinct = match op {
            ComparisonOperator::DistinctFrom => true,
            ComparisonOperator::NotDistinctFrom => false,
            _ => {
                self.visit_expression(lhs)?;
                self.render_operator(op);
                return self.visit_expression(rhs);
            }
        };
        match self.caps.distinct_from {
            DistinctFromStyle::Native => {
                self.visit_expression(lhs)?;
                self.render_operator(op);
                self.visit_expression(rhs)
            }
            DistinctFromStyle::NullSafeEquals => {
                if distinct {
                    self.append_sql("NOT (");
                }
                self.visit_expression(lhs)?;
                self.append_sql(" <=> ");
                self.visit_expression(rhs)?;
                if distinct {
                    self.push(')');
                }
                Ok(())
            }
            DistinctFromStyle::Decode => {
                self.append_sql("decode(");
                self.visit_expression(lhs)?;
                self.append_sql(", ");
                self.visit_expression(rhs)?;
                self.append_sql(if distinct { ", 0, 1) = 1" } else { ", 0, 1) = 0" });
                Ok(())
            }
            DistinctFromStyle::Intersect => {
                self.emulate_distinct_from(slice::from_ref(lhs), slice::from_ref(rhs), distinct)
            }
        }
    }

    fn render_tuple_comparison(
        &mut self,
        lhs: &'a [Expression],
        op: ComparisonOperator,
        rhs: &'a [Expression],
    ) -> TranslateResult<()> {
        let distinct_op = matches!(
            op,
            ComparisonOperator::DistinctFrom | ComparisonOperator::NotDistinctFrom
        );
        if self.caps.row_values && (!distinct_op || self.caps.distinct_from == DistinctFromStyle::Native)
        {
            self.render_row_value(lhs)?;
            self.render_operator(op);
            return self.render_row_value(rhs);
        }
        tracing::trace!(arity = lhs.len(), ?op, "emulating tuple comparison");
        let index_optimized = self.caps.tuple_emulation == TupleEmulation::IndexOptimized;
        self.emulate_tuple_comparison(lhs, op, rhs, index_optimized)
    }

    /// Single-column rendering of `lhs op rhs` for equal-arity rows.
    pub(crate) fn emulate_tuple_comparison(
        &mut self,
        lhs: &'a [Expression],
        op: ComparisonOperator,
        rhs: &'a [Expression],
        index_optimized: bool,
    ) -> TranslateResult<()> {
        use ComparisonOperator::*;
        match op {
            Equal | NotEqual => {
                let separator = if op == Equal { " AND " } else { " OR " };
                let grouped = lhs.len() > 1;
                if grouped {
                    self.push('(');
                }
                for (i, (l, r)) in lhs.iter().zip(rhs).enumerate() {
                    if i > 0 {
                        self.append_sql(separator);
                    }
                    self.render_scalar_comparison(l, op, r)?;
                }
                if grouped {
                    self.push(')');
                }
                Ok(())
            }
            DistinctFrom | NotDistinctFrom => {
                self.emulate_distinct_from(lhs, rhs, op == DistinctFrom)
            }
            _ if lhs.len() == 1 => self.render_scalar_comparison(&lhs[0], op, &rhs[0]),
            _ if index_optimized => {
                // a >= x AND NOT (a = x AND (b, ..) <= (y, ..))
                self.push('(');
                self.render_scalar_comparison(&lhs[0], op.broader(), &rhs[0])?;
                self.append_sql(" AND NOT (");
                self.render_scalar_comparison(&lhs[0], Equal, &rhs[0])?;
                self.append_sql(" AND ");
                self.render_lexicographic_group(&lhs[1..], op.negated(), &rhs[1..])?;
                self.append_sql("))");
                Ok(())
            }
            _ => {
                self.push('(');
                self.render_lexicographic(lhs, op, rhs)?;
                self.push(')');
                Ok(())
            }
        }
    }

    /// `a > x OR a = x AND <rest>`, recursing on the remaining columns.
    fn render_lexicographic(
        &mut self,
        lhs: &'a [Expression],
        op: ComparisonOperator,
        rhs: &'a [Expression],
    ) -> TranslateResult<()> {
        if lhs.len() == 1 {
            return self.render_scalar_comparison(&lhs[0], op, &rhs[0]);
        }
        self.render_scalar_comparison(&lhs[0], op.sharper(), &rhs[0])?;
        self.append_sql(" OR ");
        self.render_scalar_comparison(&lhs[0], ComparisonOperator::Equal, &rhs[0])?;
        self.append_sql(" AND ");
        self.render_lexicographic_group(&lhs[1..], op, &rhs[1..])
    }

    fn render_lexicographic_group(
        &mut self,
        lhs: &'a [Expression],
        op: ComparisonOperator,
        rhs: &'a [Expression],
    ) -> TranslateResult<()> {
        if lhs.len() > 1 {
            self.push('(');
            self.render_lexicographic(lhs, op, rhs)?;
            self.push(')');
            Ok(())
        } else {
            self.render_lexicographic(lhs, op, rhs)
        }
    }

    /// Null-safe row comparison through `INTERSECT`, or a correlated null check.
    fn emulate_distinct_from(
        &mut self,
        lhs: &'a [Expression],
        rhs: &'a [Expression],
        distinct: bool,
    ) -> TranslateResult<()> {
        let from_dual = self.caps.from_dual.clone();
        self.append_sql(if distinct { "NOT EXISTS (" } else { "EXISTS (" });
        if self.caps.supports_intersect {
            self.in_clause(Clause::Select, |t| {
                t.append_sql("SELECT ");
                t.render_list(lhs)?;
                t.append_sql(&from_dual);
                t.append_sql(" INTERSECT SELECT ");
                t.render_list(rhs)?;
                t.append_sql(&from_dual);
                Ok(())
            })?;
        } else {
            self.append_sql("SELECT 1");
            self.append_sql(&from_dual);
            self.append_sql(" WHERE ");
            self.in_clause(Clause::Where, |t| {
                for (i, (l, r)) in lhs.iter().zip(rhs).enumerate() {
                    if i > 0 {
                        t.append_sql(" AND ");
                    }
                    t.push('(');
                    t.visit_expression(l)?;
                    t.append_sql(" = ");
                    t.visit_expression(r)?;
                    t.append_sql(" OR ");
                    t.visit_expression(l)?;
                    t.append_sql(" IS NULL AND ");
                    t.visit_expression(r)?;
                    t.append_sql(" IS NULL)");
                }
                Ok(())
            })?;
        }
        self.push(')');
        Ok(())
    }

    fn visit_tuple_subquery_comparison(
        &mut self,
        lhs: &'a [Expression],
        op: ComparisonOperator,
        query: &'a QueryPart,
        quantifier: Option<Quantifier>,
    ) -> TranslateResult<()> {
        let native = match quantifier {
            None => self.caps.row_values,
            Some(_) => self.caps.row_values_in_quantified_predicates,
        };
        if native {
            self.render_row_value(lhs)?;
            self.render_operator(op);
            match quantifier {
                Some(Quantifier::Any) => self.append_sql("ANY "),
                Some(Quantifier::All) => self.append_sql("ALL "),
                None => {}
            }
            return self.visit_query_part(query, Parens::Always);
        }

        if let Some(q) = quantifier {
            if op.is_ordering() && self.caps.row_values {
                let greater = matches!(
                    op,
                    ComparisonOperator::GreaterThan | ComparisonOperator::GreaterThanOrEqual
                );
                // `> ALL` compares with the largest row, `> ANY` with the smallest
                let descending = greater == (q == Quantifier::All);
                return self.render_extreme_row_comparison(lhs, op, query, descending);
            }
        }

        let all = quantifier == Some(Quantifier::All);
        // Selections become the left operand inside the sub-query
        let selection_op = if all { op.negated() } else { op }.invert();
        self.render_subquery_restriction(query, all, lhs, selection_op)
    }

    /// `(a, b) op (SELECT x, y .. ORDER BY 1, 2 FETCH FIRST 1 ROWS ONLY)`.
    fn render_extreme_row_comparison(
        &mut self,
        lhs: &'a [Expression],
        op: ComparisonOperator,
        query: &'a QueryPart,
        descending: bool,
    ) -> TranslateResult<()> {
        let spec = restriction_target(query)?;
        let (prefix, suffix) = self.fetch_first_row_clauses()?;
        tracing::trace!(descending, "comparing tuple with extreme sub-query row");

        self.render_row_value(lhs)?;
        self.render_operator(op);
        self.push('(');
        self.isolated(|t| {
            t.in_part(query, |t| {
                t.in_clause(Clause::Select, |t| {
                    t.append_sql("SELECT ");
                    t.append_sql(&prefix);
                    t.render_list(&spec.select.selections)
                })?;
                t.visit_from_clause(&spec.from)?;
                t.visit_where_clause(spec.restriction.as_ref())?;
                t.visit_group_by(spec)?;
                t.visit_having(spec)?;
                t.append_sql(" ORDER BY ");
                t.in_clause(Clause::OrderBy, |t| {
                    for (i, selection) in spec.select.selections.iter().enumerate() {
                        if i > 0 {
                            t.append_sql(", ");
                        }
                        if t.caps.supports_ordinal_select_item_reference {
                            t.append_sql(&(i + 1).to_string());
                        } else {
                            t.visit_expression(selection)?;
                        }
                        if descending {
                            t.append_sql(" DESC");
                        }
                    }
                    Ok(())
                })?;
                t.append_sql(&suffix);
                Ok(())
            })
        })?;
        self.push(')');
        Ok(())
    }

    /// `[NOT] EXISTS (SELECT 1 FROM .. WHERE <selections op tuple> AND (<where>))`.
    fn render_subquery_restriction(
        &mut self,
        query: &'a QueryPart,
        negated: bool,
        tuple: &'a [Expression],
        selection_op: ComparisonOperator,
    ) -> TranslateResult<()> {
        let spec = restriction_target(query)?;
        let selections = spec.select.selections.as_slice();
        if selections.len() != tuple.len() {
            return Err(TranslateError::malformed(format!(
                "Sub-query selects {} columns, compared with a tuple of {}",
                selections.len(),
                tuple.len()
            )));
        }
        tracing::trace!(negated, ?selection_op, "emulating tuple sub-query predicate with EXISTS");

        self.append_sql(if negated { "NOT EXISTS (" } else { "EXISTS (" });
        self.isolated(|t| {
            t.in_part(query, |t| {
                t.in_clause(Clause::Select, |t| {
                    t.append_sql("SELECT 1");
                    Ok(())
                })?;
                t.visit_from_clause(&spec.from)?;
                if spec.has_group_by() || spec.has_having() {
                    t.visit_where_clause(spec.restriction.as_ref())?;
                    t.visit_group_by(spec)?;
                    t.append_sql(" HAVING ");
                    t.in_clause(Clause::Having, |t| {
                        t.render_tuple_comparison(selections, selection_op, tuple)?;
                        t.render_and_grouped(spec.having.as_ref())
                    })
                } else {
                    t.append_sql(" WHERE ");
                    t.in_clause(Clause::Where, |t| {
                        t.render_tuple_comparison(selections, selection_op, tuple)?;
                        t.render_and_grouped(spec.restriction.as_ref())
                    })
                }
            })
        })?;
        self.push(')');
        Ok(())
    }

    fn render_and_grouped(
        &mut self,
        predicate: Option<&'a crate::ast::Predicate>,
    ) -> TranslateResult<()> {
        match predicate {
            Some(p) if !p.is_empty() => {
                self.append_sql(" AND (");
                self.visit_predicate(p)?;
                self.push(')');
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn visit_in_list(
        &mut self,
        test: &'a Expression,
        list: &'a [Expression],
        negated: bool,
    ) -> TranslateResult<()> {
        if list.is_empty() {
            self.render_constant_predicate(negated);
            return Ok(());
        }
        let keyword = if negated { " NOT IN (" } else { " IN (" };
        let test = unwrap_single(test);
        let Expression::Tuple(items) = test else {
            self.visit_expression(test)?;
            self.append_sql(keyword);
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    self.append_sql(", ");
                }
                self.visit_expression(unwrap_single(item))?;
            }
            self.push(')');
            return Ok(());
        };

        let rows = list
            .iter()
            .map(|item| match item {
                Expression::Tuple(row) if row.len() == items.len() => Ok(row.as_slice()),
                _ => Err(TranslateError::malformed(
                    "IN list row does not match the arity of its test",
                )),
            })
            .collect::<TranslateResult<Vec<_>>>()?;

        if self.caps.row_values_in_in_list {
            self.render_row_value(items)?;
            self.append_sql(keyword);
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    self.append_sql(", ");
                }
                self.render_row_value(row)?;
            }
            self.push(')');
        } else if self.caps.row_values_in_in_subquery && self.caps.supports_union_all {
            tracing::trace!(rows = rows.len(), "rendering tuple IN list as UNION ALL");
            let from_dual = self.caps.from_dual.clone();
            self.render_row_value(items)?;
            self.append_sql(keyword);
            self.in_clause(Clause::Select, |t| {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        t.append_sql(" UNION ALL ");
                    }
                    t.append_sql("SELECT ");
                    t.render_list(row)?;
                    t.append_sql(&from_dual);
                }
                Ok(())
            })?;
            self.push(')');
        } else {
            tracing::trace!(rows = rows.len(), "unrolling tuple IN list");
            let (op, separator) = if negated {
                (ComparisonOperator::NotEqual, " AND ")
            } else {
                (ComparisonOperator::Equal, " OR ")
            };
            let index_optimized = self.caps.tuple_emulation == TupleEmulation::IndexOptimized;
            let grouped = rows.len() > 1;
            if grouped {
                self.push('(');
            }
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    self.append_sql(separator);
                }
                self.emulate_tuple_comparison(items, op, row, index_optimized)?;
            }
            if grouped {
                self.push(')');
            }
        }
        Ok(())
    }

    pub(crate) fn visit_in_subquery(
        &mut self,
        test: &'a Expression,
        query: &'a QueryPart,
        negated: bool,
    ) -> TranslateResult<()> {
        let keyword = if negated { " NOT IN " } else { " IN " };
        match unwrap_single(test) {
            Expression::Tuple(items) if !self.caps.row_values_in_in_subquery => {
                self.render_subquery_restriction(query, negated, items, ComparisonOperator::Equal)
            }
            Expression::Tuple(items) => {
                self.render_row_value(items)?;
                self.append_sql(keyword);
                self.visit_query_part(query, Parens::Always)
            }
            scalar => {
                self.visit_expression(scalar)?;
                self.append_sql(keyword);
                self.visit_query_part(query, Parens::Always)
            }
        }
    }
}
