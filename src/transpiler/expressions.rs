//! Expression rendering.

use super::buffer::Clause;
use super::dialect::{ConcatStyle, NullOrdering};
use super::params::{BindingKey, ParameterBinder};
use super::translation::{RenderingMode, Translation};
use crate::ast::{
    BinaryOperator, CaseSearched, CaseSimple, ColumnReference, Expression, FunctionCall,
    JdbcParameter, NullPrecedence, SortOrder, SortSpecification, SqlType, SummarizationKind,
    UnaryOperator, Value, WindowSpec,
};
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::dml::Parens;

impl<'a> Translation<'a> {
    pub(crate) fn visit_expression(&mut self, expr: &'a Expression) -> TranslateResult<()> {
        match expr {
            Expression::Column(column) => {
                self.visit_column(column);
                Ok(())
            }
            Expression::Literal(literal) => self.visit_literal(literal),
            Expression::Parameter(parameter) => self.visit_parameter(parameter),
            Expression::Tuple(items) => {
                // Row values are parenthesized only where a predicate expects them
                if self.in_where_clause() {
                    self.render_row_value(items)
                } else {
                    self.render_list(items)
                }
            }
            Expression::SimpleCase(case) => self.visit_simple_case(case, false),
            Expression::SearchedCase(case) => self.visit_searched_case(case, false),
            Expression::Binary { op, lhs, rhs } => self.visit_binary(*op, lhs, rhs),
            Expression::Unary { op, operand } => {
                self.append_sql(match op {
                    UnaryOperator::Plus => "+",
                    UnaryOperator::Minus => "-",
                });
                self.visit_operand(operand)
            }
            Expression::Function(call) => self.visit_function(call),
            Expression::SubQuery(query) => self.visit_query_part(query, Parens::Auto),
            Expression::Any(query) => {
                self.append_sql("ANY ");
                self.visit_query_part(query, Parens::Always)
            }
            Expression::Every(query) => {
                self.append_sql("ALL ");
                self.visit_query_part(query, Parens::Always)
            }
            Expression::SelectionRef(index) => self.visit_selection_ref(*index),
            Expression::Star(qualifier) => {
                if let Some(q) = qualifier {
                    self.append_sql(q);
                    self.push('.');
                }
                self.push('*');
                Ok(())
            }
            Expression::Cast { expr, target } => {
                self.append_sql("CAST(");
                self.visit_expression(expr)?;
                self.append_sql(" AS ");
                let name = self.type_name(*target)?;
                self.append_sql(&name);
                self.push(')');
                Ok(())
            }
            Expression::Collate { expr, collation } => {
                self.visit_operand(expr)?;
                self.append_sql(" COLLATE ");
                self.append_sql(collation);
                Ok(())
            }
            Expression::Summarization { kind, groupings } => {
                self.append_sql(match kind {
                    SummarizationKind::Rollup => "ROLLUP (",
                    SummarizationKind::Cube => "CUBE (",
                });
                self.render_list(groupings)?;
                self.push(')');
                Ok(())
            }
            Expression::SelfRendering(node) => {
                let node: &'a dyn crate::ast::SqlRenderable = &*node.0;
                node.render(self)
            }
        }
    }

    pub(crate) fn visit_column(&mut self, column: &ColumnReference) {
        if let Some(qualifier) = column.qualifier.as_deref() {
            if self.dml_target_alias != Some(qualifier) {
                self.append_sql(qualifier);
                self.push('.');
            }
        }
        self.append_sql(&column.column);
    }

    /// Comma-separated expressions.
    pub(crate) fn render_list(&mut self, items: &'a [Expression]) -> TranslateResult<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.append_sql(", ");
            }
            self.visit_expression(item)?;
        }
        Ok(())
    }

    /// Parenthesized row value `(a, b)`.
    pub(crate) fn render_row_value(&mut self, items: &'a [Expression]) -> TranslateResult<()> {
        self.push('(');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.append_sql(", ");
            }
            // Nested tuples inside a row value never get their own parens
            match item {
                Expression::Tuple(inner) => self.render_list(inner)?,
                other => self.visit_expression(other)?,
            }
        }
        self.push(')');
        Ok(())
    }

    pub(crate) fn type_name(&self, sql_type: SqlType) -> TranslateResult<String> {
        self.caps
            .type_names
            .name(sql_type)
            .map(str::to_string)
            .ok_or_else(|| TranslateError::malformed("CAST to an unknown type"))
    }

    fn visit_parameter(&mut self, parameter: &JdbcParameter) -> TranslateResult<()> {
        match self.mode {
            RenderingMode::InlineParameters => {
                let value = self
                    .bindings
                    .and_then(|b| b.get(parameter.id))
                    .cloned()
                    .ok_or(TranslateError::MissingBinding(parameter.id))?;
                self.record_applied(BindingKey::Parameter(parameter.id), value.clone());
                self.render_value(&value);
            }
            RenderingMode::NoPlainParameter if parameter.sql_type.is_numeric() => {
                self.push('(');
                self.append_placeholder(ParameterBinder::Parameter(*parameter));
                self.append_sql(" + 0)");
            }
            RenderingMode::NoPlainParameter if parameter.sql_type.is_character() => {
                match self.caps.concat {
                    ConcatStyle::Function => {
                        self.append_sql("concat(");
                        self.append_placeholder(ParameterBinder::Parameter(*parameter));
                        self.append_sql(", '')");
                    }
                    style => {
                        self.push('(');
                        self.append_placeholder(ParameterBinder::Parameter(*parameter));
                        self.append_sql(if style == ConcatStyle::Plus {
                            " + '')"
                        } else {
                            " || '')"
                        });
                    }
                }
            }
            RenderingMode::NoPlainParameter => match self.caps.type_names.name(parameter.sql_type) {
                Some(name) => {
                    let name = name.to_string();
                    self.render_cast_parameter(parameter, &name);
                }
                None => self.append_placeholder(ParameterBinder::Parameter(*parameter)),
            },
            RenderingMode::Default => {
                self.append_placeholder(ParameterBinder::Parameter(*parameter));
            }
        }
        Ok(())
    }

    pub(crate) fn render_cast_parameter(&mut self, parameter: &JdbcParameter, type_name: &str) {
        self.append_sql("CAST(");
        self.append_placeholder(ParameterBinder::Parameter(*parameter));
        self.append_sql(" AS ");
        self.append_sql(type_name);
        self.push(')');
    }

    /// Operand of an arithmetic or unary expression; nested arithmetic is parenthesized.
    fn visit_operand(&mut self, expr: &'a Expression) -> TranslateResult<()> {
        if matches!(expr, Expression::Binary { .. }) {
            self.push('(');
            self.visit_expression(expr)?;
            self.push(')');
            Ok(())
        } else {
            self.visit_expression(expr)
        }
    }

    fn visit_binary(
        &mut self,
        op: BinaryOperator,
        lhs: &'a Expression,
        rhs: &'a Expression,
    ) -> TranslateResult<()> {
        if op == BinaryOperator::Concat {
            match self.caps.concat {
                ConcatStyle::Function => {
                    self.append_sql("concat(");
                    self.visit_expression(lhs)?;
                    self.append_sql(", ");
                    self.visit_expression(rhs)?;
                    self.push(')');
                    return Ok(());
                }
                ConcatStyle::Plus => {
                    self.visit_operand(lhs)?;
                    self.append_sql(" + ");
                    return self.visit_operand(rhs);
                }
                ConcatStyle::Operator => {}
            }
        }
        self.visit_operand(lhs)?;
        self.push(' ');
        self.append_sql(op.sql_text());
        self.push(' ');
        self.visit_operand(rhs)
    }

    /// Expression of a select list. Where the dialect cannot type a bare NULL or
    /// parameter there, it is cast, also when it is the result of a CASE.
    pub(crate) fn render_select_expression(&mut self, expr: &'a Expression) -> TranslateResult<()> {
        let caps = self.caps;
        if !caps.cast_select_nulls_and_parameters {
            return self.visit_expression(expr);
        }
        match expr {
            Expression::Literal(literal) if literal.value == Value::Null => {
                match caps.type_names.name(literal.sql_type) {
                    Some(name) => {
                        self.append_sql("CAST(NULL AS ");
                        self.append_sql(name);
                        self.push(')');
                    }
                    None => self.append_sql("NULL"),
                }
                Ok(())
            }
            Expression::Parameter(parameter) => match caps.type_names.name(parameter.sql_type) {
                Some(name) => {
                    self.render_cast_parameter(parameter, name);
                    Ok(())
                }
                None => self.visit_expression(expr),
            },
            Expression::SimpleCase(case) => self.visit_simple_case(case, true),
            Expression::SearchedCase(case) => self.visit_searched_case(case, true),
            other => self.visit_expression(other),
        }
    }

    fn visit_case_result(&mut self, result: &'a Expression, selected: bool) -> TranslateResult<()> {
        if selected {
            self.render_select_expression(result)
        } else {
            self.visit_expression(result)
        }
    }

    fn visit_simple_case(&mut self, case: &'a CaseSimple, selected: bool) -> TranslateResult<()> {
        self.append_sql("CASE ");
        self.visit_expression(&case.operand)?;
        for when in &case.whens {
            self.append_sql(" WHEN ");
            self.visit_expression(&when.test)?;
            self.append_sql(" THEN ");
            self.visit_case_result(&when.result, selected)?;
        }
        if let Some(otherwise) = &case.otherwise {
            self.append_sql(" ELSE ");
            self.visit_case_result(otherwise, selected)?;
        }
        self.append_sql(" END");
        Ok(())
    }

    fn visit_searched_case(&mut self, case: &'a CaseSearched, selected: bool) -> TranslateResult<()> {
        self.append_sql("CASE");
        for when in &case.whens {
            self.append_sql(" WHEN ");
            self.visit_predicate(&when.predicate)?;
            self.append_sql(" THEN ");
            self.visit_case_result(&when.result, selected)?;
        }
        if let Some(otherwise) = &case.otherwise {
            self.append_sql(" ELSE ");
            self.visit_case_result(otherwise, selected)?;
        }
        self.append_sql(" END");
        Ok(())
    }

    fn visit_function(&mut self, call: &'a FunctionCall) -> TranslateResult<()> {
        self.append_sql(&call.name);
        self.push('(');
        if call.distinct {
            self.append_sql("DISTINCT ");
        }
        match call.filter.as_deref() {
            Some(filter) if !self.caps.supports_filter_clause => {
                tracing::trace!(function = %call.name, "emulating FILTER with CASE");
                if matches!(call.arguments.as_slice(), [] | [Expression::Star(None)]) {
                    self.append_sql("CASE WHEN ");
                    self.in_clause(Clause::Filter, |t| t.visit_predicate(filter))?;
                    self.append_sql(" THEN 1 ELSE NULL END");
                } else {
                    for (i, argument) in call.arguments.iter().enumerate() {
                        if i > 0 {
                            self.append_sql(", ");
                        }
                        self.append_sql("CASE WHEN ");
                        self.in_clause(Clause::Filter, |t| t.visit_predicate(filter))?;
                        self.append_sql(" THEN ");
                        self.visit_expression(argument)?;
                        self.append_sql(" ELSE NULL END");
                    }
                }
                self.push(')');
            }
            filter => {
                self.render_list(&call.arguments)?;
                self.push(')');
                if let Some(filter) = filter {
                    self.append_sql(" FILTER (WHERE ");
                    self.in_clause(Clause::Filter, |t| t.visit_predicate(filter))?;
                    self.push(')');
                }
            }
        }
        if let Some(window) = &call.over {
            self.visit_window(window)?;
        }
        Ok(())
    }

    fn visit_window(&mut self, window: &'a WindowSpec) -> TranslateResult<()> {
        self.append_sql(" OVER (");
        self.in_clause(Clause::Over, |t| {
            if !window.partition_by.is_empty() {
                t.append_sql("PARTITION BY ");
                t.in_clause(Clause::Partition, |t| t.render_list(&window.partition_by))?;
                if !window.order_by.is_empty() {
                    t.push(' ');
                }
            }
            if !window.order_by.is_empty() {
                t.append_sql("ORDER BY ");
                t.render_sort_specifications(&window.order_by)?;
            }
            Ok(())
        })?;
        self.push(')');
        Ok(())
    }

    /// Resolve a select-list reference to an ordinal or to the selected expression.
    fn visit_selection_ref(&mut self, index: usize) -> TranslateResult<()> {
        let ordinal_allowed = matches!(
            self.current_clause(),
            Some(Clause::OrderBy) | Some(Clause::GroupBy)
        );
        if ordinal_allowed && self.caps.supports_ordinal_select_item_reference {
            self.append_sql(&(index + 1).to_string());
            return Ok(());
        }
        let selection = self
            .current_part()
            .and_then(|part| part.first_query_spec())
            .and_then(|spec| spec.select.selections.get(index))
            .ok_or_else(|| {
                TranslateError::malformed(format!("Selection reference {} out of range", index))
            })?;
        self.visit_expression(selection)
    }

    pub(crate) fn render_sort_specifications(
        &mut self,
        specs: &'a [SortSpecification],
    ) -> TranslateResult<()> {
        for (i, spec) in specs.iter().enumerate() {
            if i > 0 {
                self.append_sql(", ");
            }
            self.render_sort_key(spec.order, spec.nulls, |t| t.visit_expression(&spec.expr))?;
        }
        Ok(())
    }

    /// One ORDER BY item; `render` emits the sort expression.
    pub(crate) fn render_sort_key(
        &mut self,
        order: SortOrder,
        nulls: NullPrecedence,
        render: impl Fn(&mut Self) -> TranslateResult<()>,
    ) -> TranslateResult<()> {
        let explicit_nulls = nulls != NullPrecedence::None && !self.is_default_null_order(order, nulls);
        if explicit_nulls && !self.caps.supports_null_precedence {
            self.append_sql("CASE WHEN ");
            render(self)?;
            self.append_sql(if nulls == NullPrecedence::First {
                " IS NULL THEN 0 ELSE 1 END, "
            } else {
                " IS NULL THEN 1 ELSE 0 END, "
            });
        }
        render(self)?;
        if order == SortOrder::Desc {
            self.append_sql(" DESC");
        }
        if explicit_nulls && self.caps.supports_null_precedence {
            self.append_sql(if nulls == NullPrecedence::First {
                " NULLS FIRST"
            } else {
                " NULLS LAST"
            });
        }
        Ok(())
    }

    fn is_default_null_order(&self, order: SortOrder, nulls: NullPrecedence) -> bool {
        let nulls_first = match (self.caps.null_ordering, order) {
            (NullOrdering::First, _) => true,
            (NullOrdering::Last, _) => false,
            (NullOrdering::Smallest, SortOrder::Asc) | (NullOrdering::Greatest, SortOrder::Desc) => {
                true
            }
            (NullOrdering::Smallest, SortOrder::Desc) | (NullOrdering::Greatest, SortOrder::Asc) => {
                false
            }
        };
        (nulls == NullPrecedence::First) == nulls_first
    }
}
