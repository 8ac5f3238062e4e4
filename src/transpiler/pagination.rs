//! OFFSET/FETCH planning and rendering.
//!
//! Each query part is paged natively (suffix clauses or TOP-style prefixes),
//! by the driver, or by wrapping it in a query that filters on a
//! `row_number()` column projected by the inner query.

use super::buffer::Clause;
use super::dialect::{LimitOperandStyle, PaginationStyle};
use super::dml::Parens;
use super::params::{BindSource, BindingKey, ParameterBinder};
use super::translation::Translation;
use crate::ast::{
    Expression, FetchClauseType, NullPrecedence, QueryPart, SortOrder, SortSpecification, Value,
};
use crate::error::{TranslateError, TranslateResult};

/// Ranking columns projected by a row-numbered query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WindowColumns {
    pub row_number: bool,
    pub rank: bool,
    pub count: bool,
}

impl WindowColumns {
    fn for_paging(paging: &Paging<'_>) -> Self {
        let ties = paging.fetch_type.with_ties();
        Self {
            row_number: !ties || paging.offset.is_some(),
            rank: ties,
            count: paging.fetch_type.is_percent(),
        }
    }
}

/// The query part currently being row-numbered.
///
/// Group members are rendered one level below the numbered group and only
/// need positional `c{i}` aliases; anything nested deeper starts clean.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RowNumbering<'a> {
    pub target: Option<&'a QueryPart>,
    /// Part-stack depth at which members of a numbered group are visited.
    pub depth: usize,
    pub window: WindowColumns,
    pub select_aliases: bool,
}

impl<'a> RowNumbering<'a> {
    pub(crate) fn is_target(&self, part: &QueryPart) -> bool {
        self.target.is_some_and(|target| std::ptr::eq(target, part))
    }

    /// State seen by `part`, visited at part-stack `depth`.
    pub(crate) fn scoped_to(self, part: &'a QueryPart, depth: usize) -> Self {
        if self.is_target(part) {
            return self;
        }
        let member_of_numbered_group = self.select_aliases
            && depth == self.depth
            && self
                .target
                .is_none_or(|target| matches!(target, QueryPart::Group(_)));
        if member_of_numbered_group {
            let depth = match part {
                QueryPart::Group(_) => depth + 1,
                QueryPart::Spec(_) => depth,
            };
            return Self {
                target: None,
                depth,
                window: WindowColumns::default(),
                select_aliases: true,
            };
        }
        Self::default()
    }
}

/// One operand of a rendered row count.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RowCount<'a> {
    Expr(&'a Expression),
    OffsetParameter,
    LimitParameter,
    Value(i64),
}

impl RowCount<'_> {
    fn constant(&self) -> Option<i64> {
        match self {
            RowCount::Value(n) => Some(*n),
            RowCount::Expr(Expression::Literal(literal)) => literal.value.as_i64(),
            _ => None,
        }
    }

    fn bind_source(&self) -> Option<BindSource> {
        match self {
            RowCount::Expr(Expression::Parameter(p)) => Some(BindSource::Parameter(*p)),
            RowCount::OffsetParameter => Some(BindSource::Offset),
            RowCount::LimitParameter => Some(BindSource::Limit),
            other => other.constant().map(BindSource::Value),
        }
    }
}

/// Offset and fetch that apply to one query part.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Paging<'a> {
    pub offset: Option<RowCount<'a>>,
    pub fetch: Option<RowCount<'a>>,
    pub fetch_type: FetchClauseType,
}

impl Paging<'_> {
    fn is_empty(&self) -> bool {
        self.offset.is_none() && self.fetch.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PagingPlan {
    /// Nothing to page, or paged by an enclosing wrapper.
    Skip,
    Native,
    Emulate,
    /// `TOP (offset + fetch)` with the driver skipping the offset.
    TopWithClientSkip,
    ClientSide,
}

impl<'a> Translation<'a> {
    /// The part's own offset/fetch, or the external limit for a root without any.
    pub(crate) fn paging(&self, part: &'a QueryPart) -> Paging<'a> {
        let own = Paging {
            offset: part.offset().map(RowCount::Expr),
            fetch: part.fetch().map(RowCount::Expr),
            fetch_type: part.fetch_type(),
        };
        if !own.is_empty() || !part.is_root() {
            return own;
        }
        match self.limit {
            Some(limit) => Paging {
                offset: limit.has_first_row().then_some(RowCount::OffsetParameter),
                fetch: limit.max_rows.map(|_| RowCount::LimitParameter),
                fetch_type: FetchClauseType::RowsOnly,
            },
            None => own,
        }
    }

    pub(crate) fn plan_paging(
        &self,
        part: &'a QueryPart,
        paging: &Paging<'a>,
    ) -> TranslateResult<PagingPlan> {
        use PagingPlan::*;
        if paging.is_empty() || self.numbering.is_target(part) {
            return Ok(Skip);
        }
        let caps = self.caps;
        let supported = caps.supports_fetch_type(paging.fetch_type);
        let spec = matches!(part, QueryPart::Spec(_));
        let plan = match caps.pagination {
            PaginationStyle::OffsetFetch
            | PaginationStyle::LimitOffset
            | PaginationStyle::CombinedLimit
            | PaginationStyle::RowsTo => {
                if supported {
                    Native
                } else {
                    Emulate
                }
            }
            PaginationStyle::Top => {
                let client_fallback = spec
                    && part.is_root()
                    && !caps.supports_window_functions
                    && paging.fetch_type == FetchClauseType::RowsOnly;
                if spec && supported && paging.offset.is_none() {
                    Native
                } else if client_fallback && paging.fetch.is_some() {
                    TopWithClientSkip
                } else if client_fallback {
                    ClientSide
                } else {
                    Emulate
                }
            }
            PaginationStyle::TopStartAt | PaginationStyle::SkipFirst | PaginationStyle::FirstSkip => {
                if spec && supported {
                    Native
                } else {
                    Emulate
                }
            }
            PaginationStyle::WindowFunction => Emulate,
            PaginationStyle::None => {
                if part.is_root() {
                    ClientSide
                } else {
                    Emulate
                }
            }
        };
        if plan == Emulate && !caps.supports_window_functions {
            return Err(TranslateError::unsupported(format!(
                "{} can't paginate this query without window functions",
                caps.name
            )));
        }
        tracing::trace!(?plan, style = ?caps.pagination, "planned pagination");
        Ok(plan)
    }

    /// Record what the driver has to skip and cap; the skip is resolved first.
    pub(crate) fn apply_client_paging(
        &mut self,
        paging: &Paging<'a>,
        plan: PagingPlan,
    ) -> TranslateResult<()> {
        let skip = match paging.offset {
            Some(offset) => Some(self.client_row_count(offset)?),
            None => None,
        };
        self.rows_to_skip = skip;
        if plan == PagingPlan::ClientSide {
            if let Some(fetch) = paging.fetch {
                let fetch = self.client_row_count(fetch)?;
                self.max_rows = Some(skip.unwrap_or(0).saturating_add(fetch));
            }
        }
        tracing::trace!(
            rows_to_skip = ?self.rows_to_skip,
            max_rows = ?self.max_rows,
            "paginating on the client"
        );
        Ok(())
    }

    fn client_row_count(&mut self, count: RowCount<'a>) -> TranslateResult<u64> {
        let value = self.interpret_row_count(count)?;
        u64::try_from(value)
            .map_err(|_| TranslateError::malformed(format!("Negative row count {}", value)))
    }

    /// Resolve a row count to a number, recording the bindings it consumed.
    pub(crate) fn interpret_row_count(&mut self, count: RowCount<'a>) -> TranslateResult<i64> {
        if let Some(n) = count.constant() {
            return Ok(n);
        }
        match count {
            RowCount::Expr(Expression::Parameter(parameter)) => {
                let value = self
                    .bindings
                    .and_then(|b| b.get(parameter.id))
                    .cloned()
                    .ok_or(TranslateError::MissingBinding(parameter.id))?;
                let n = value.as_i64().ok_or_else(|| {
                    TranslateError::malformed(format!(
                        "Parameter {} bound to non-integral row count {}",
                        parameter.id, value
                    ))
                })?;
                self.record_applied(BindingKey::Parameter(parameter.id), value);
                Ok(n)
            }
            RowCount::OffsetParameter => {
                let row = self.limit.and_then(|l| l.first_row).unwrap_or(0);
                let n = i64::try_from(row)
                    .map_err(|_| TranslateError::malformed("First row out of range"))?;
                self.record_applied(BindingKey::Offset, Value::Int(n));
                Ok(n)
            }
            RowCount::LimitParameter => {
                let rows = self.limit.and_then(|l| l.max_rows).unwrap_or(0);
                let n = i64::try_from(rows)
                    .map_err(|_| TranslateError::malformed("Max rows out of range"))?;
                self.record_applied(BindingKey::Limit, Value::Int(n));
                Ok(n)
            }
            _ => Err(TranslateError::unsupported(
                "Row count must be a literal or a parameter to be folded",
            )),
        }
    }

    fn render_row_count(&mut self, count: RowCount<'a>) -> TranslateResult<()> {
        match count {
            RowCount::Expr(expr) => self.visit_expression(expr),
            RowCount::OffsetParameter => {
                self.append_placeholder(ParameterBinder::Offset);
                Ok(())
            }
            RowCount::LimitParameter => {
                self.append_placeholder(ParameterBinder::Limit);
                Ok(())
            }
            RowCount::Value(n) => {
                self.append_sql(&n.to_string());
                Ok(())
            }
        }
    }

    /// Sum of row counts, folded or bound according to the dialect.
    pub(crate) fn render_row_count_sum(&mut self, operands: &[RowCount<'a>]) -> TranslateResult<()> {
        let constants: Option<Vec<i64>> = operands.iter().map(RowCount::constant).collect();
        if let Some(constants) = constants {
            let total = constants.iter().fold(0i64, |acc, n| acc.saturating_add(*n));
            self.append_sql(&total.to_string());
            return Ok(());
        }
        match self.caps.limit_operands {
            LimitOperandStyle::Literal => {
                let mut total = 0i64;
                for operand in operands {
                    total = total.saturating_add(self.interpret_row_count(*operand)?);
                }
                self.append_sql(&total.to_string());
                return Ok(());
            }
            LimitOperandStyle::SingleParameter if operands.len() > 1 => {
                let sources: Option<Vec<BindSource>> =
                    operands.iter().map(RowCount::bind_source).collect();
                if let Some(sources) = sources {
                    for source in &sources {
                        match source {
                            BindSource::Offset => self.uses_offset_parameter = true,
                            BindSource::Limit => self.uses_limit_parameter = true,
                            _ => {}
                        }
                    }
                    self.append_placeholder(ParameterBinder::Sum(sources));
                    return Ok(());
                }
            }
            _ => {}
        }
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                self.append_sql(" + ");
            }
            self.render_row_count(*operand)?;
        }
        Ok(())
    }

    /// `TOP`/`FIRST`/`SKIP` items rendered between `SELECT [DISTINCT]` and the select list.
    pub(crate) fn render_paging_prefix(
        &mut self,
        paging: &Paging<'a>,
        plan: PagingPlan,
    ) -> TranslateResult<()> {
        let caps = self.caps;
        match (caps.pagination, plan) {
            (PaginationStyle::Top, PagingPlan::TopWithClientSkip) => {
                let (Some(offset), Some(fetch)) = (paging.offset, paging.fetch) else {
                    return Ok(());
                };
                self.render_top(&[offset, fetch], paging.fetch_type)
            }
            (PaginationStyle::Top, PagingPlan::Native) => match paging.fetch {
                Some(fetch) => self.render_top(&[fetch], paging.fetch_type),
                None => Ok(()),
            },
            (PaginationStyle::TopStartAt, PagingPlan::Native) => {
                match paging.fetch {
                    Some(fetch) => self.render_top_count(&[fetch], paging.fetch_type)?,
                    None => self.append_sql("TOP ALL"),
                }
                if let Some(offset) = paging.offset {
                    self.append_sql(" START AT ");
                    self.render_row_count_sum(&[offset, RowCount::Value(1)])?;
                }
                self.push(' ');
                Ok(())
            }
            (PaginationStyle::SkipFirst, PagingPlan::Native) => {
                self.render_prefix_item("SKIP ", paging.offset)?;
                self.render_prefix_item("FIRST ", paging.fetch)
            }
            (PaginationStyle::FirstSkip, PagingPlan::Native) => {
                self.render_prefix_item("FIRST ", paging.fetch)?;
                self.render_prefix_item("SKIP ", paging.offset)
            }
            _ => Ok(()),
        }
    }

    fn render_top(
        &mut self,
        operands: &[RowCount<'a>],
        fetch_type: FetchClauseType,
    ) -> TranslateResult<()> {
        self.render_top_count(operands, fetch_type)?;
        self.push(' ');
        Ok(())
    }

    fn render_top_count(
        &mut self,
        operands: &[RowCount<'a>],
        fetch_type: FetchClauseType,
    ) -> TranslateResult<()> {
        let parens = self.caps.top_parentheses;
        self.append_sql(if parens { "TOP (" } else { "TOP " });
        self.in_clause(Clause::Fetch, |t| t.render_row_count_sum(operands))?;
        if parens {
            self.push(')');
        }
        if fetch_type.is_percent() {
            self.append_sql(" PERCENT");
        }
        if fetch_type.with_ties() {
            self.append_sql(" WITH TIES");
        }
        Ok(())
    }

    fn render_prefix_item(
        &mut self,
        keyword: &str,
        count: Option<RowCount<'a>>,
    ) -> TranslateResult<()> {
        if let Some(count) = count {
            self.append_sql(keyword);
            self.in_clause(Clause::Fetch, |t| t.render_row_count_sum(&[count]))?;
            self.push(' ');
        }
        Ok(())
    }

    /// OFFSET/FETCH, LIMIT and ROWS clauses rendered after ORDER BY.
    pub(crate) fn render_paging_suffix(
        &mut self,
        part: &'a QueryPart,
        paging: &Paging<'a>,
    ) -> TranslateResult<()> {
        let caps = self.caps;
        match caps.pagination {
            PaginationStyle::OffsetFetch => {
                if caps.offset_fetch_requires_order_by && part.order_by().is_empty() {
                    self.append_sql(" ORDER BY (SELECT 0)");
                }
                let offset = match paging.offset {
                    Some(offset) => Some(offset),
                    None if caps.fetch_requires_offset && paging.fetch.is_some() => {
                        Some(RowCount::Value(0))
                    }
                    None => None,
                };
                if let Some(offset) = offset {
                    self.append_sql(" OFFSET ");
                    self.in_clause(Clause::Offset, |t| t.render_row_count_sum(&[offset]))?;
                    if caps.offset_rows_keyword {
                        self.append_sql(" ROWS");
                    }
                }
                if let Some(fetch) = paging.fetch {
                    self.append_sql(if caps.fetch_next {
                        " FETCH NEXT "
                    } else {
                        " FETCH FIRST "
                    });
                    self.in_clause(Clause::Fetch, |t| t.render_row_count_sum(&[fetch]))?;
                    self.append_sql(match paging.fetch_type {
                        FetchClauseType::RowsOnly => " ROWS ONLY",
                        FetchClauseType::RowsWithTies => " ROWS WITH TIES",
                        FetchClauseType::PercentOnly => " PERCENT ROWS ONLY",
                        FetchClauseType::PercentWithTies => " PERCENT ROWS WITH TIES",
                    });
                }
            }
            PaginationStyle::LimitOffset => {
                self.append_sql(" LIMIT ");
                let fetch = paging.fetch.unwrap_or(RowCount::Value(i64::MAX));
                self.in_clause(Clause::Fetch, |t| t.render_row_count_sum(&[fetch]))?;
                if let Some(offset) = paging.offset {
                    self.append_sql(" OFFSET ");
                    self.in_clause(Clause::Offset, |t| t.render_row_count_sum(&[offset]))?;
                }
            }
            PaginationStyle::CombinedLimit => {
                self.append_sql(" LIMIT ");
                if let Some(offset) = paging.offset {
                    self.in_clause(Clause::Offset, |t| t.render_row_count_sum(&[offset]))?;
                    self.append_sql(", ");
                }
                let fetch = paging.fetch.unwrap_or(RowCount::Value(i64::MAX));
                self.in_clause(Clause::Fetch, |t| t.render_row_count_sum(&[fetch]))?;
            }
            PaginationStyle::RowsTo => {
                self.append_sql(" ROWS ");
                match (paging.offset, paging.fetch) {
                    (Some(offset), fetch) => {
                        self.in_clause(Clause::Offset, |t| {
                            t.render_row_count_sum(&[offset, RowCount::Value(1)])
                        })?;
                        self.append_sql(" TO ");
                        let last = fetch.unwrap_or(RowCount::Value(i64::MAX - 1));
                        self.in_clause(Clause::Fetch, |t| t.render_row_count_sum(&[offset, last]))?;
                    }
                    (None, Some(fetch)) => {
                        self.in_clause(Clause::Fetch, |t| t.render_row_count_sum(&[fetch]))?;
                    }
                    (None, None) => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// `(prefix, suffix)` limiting a query to its first row.
    pub(crate) fn fetch_first_row_clauses(&self) -> TranslateResult<(String, String)> {
        let caps = self.caps;
        let clauses = match caps.pagination {
            PaginationStyle::OffsetFetch if caps.fetch_requires_offset => {
                let rows = if caps.offset_rows_keyword { " ROWS" } else { "" };
                (String::new(), format!(" OFFSET 0{} FETCH NEXT 1 ROWS ONLY", rows))
            }
            PaginationStyle::OffsetFetch => (String::new(), " FETCH FIRST 1 ROWS ONLY".into()),
            PaginationStyle::LimitOffset | PaginationStyle::CombinedLimit => {
                (String::new(), " LIMIT 1".into())
            }
            PaginationStyle::Top if caps.top_parentheses => ("TOP (1) ".into(), String::new()),
            PaginationStyle::Top | PaginationStyle::TopStartAt => ("TOP 1 ".into(), String::new()),
            PaginationStyle::SkipFirst | PaginationStyle::FirstSkip => {
                ("FIRST 1 ".into(), String::new())
            }
            PaginationStyle::RowsTo => (String::new(), " ROWS 1".into()),
            PaginationStyle::WindowFunction | PaginationStyle::None => {
                return Err(TranslateError::unsupported(format!(
                    "{} has no native row limit to compare against an extreme sub-query row",
                    caps.name
                )));
            }
        };
        Ok(clauses)
    }

    /// Wrap `part` in a select filtering on the ranking columns it projects.
    pub(crate) fn emulate_paging(
        &mut self,
        part: &'a QueryPart,
        paging: Paging<'a>,
        parens: bool,
    ) -> TranslateResult<()> {
        let first = part
            .first_query_spec()
            .ok_or_else(|| TranslateError::malformed("Query group without members"))?;
        if first
            .select
            .selections
            .iter()
            .any(|s| matches!(s, Expression::Star(_)))
        {
            return Err(TranslateError::unsupported(
                "Can't emulate OFFSET/FETCH for a query selecting *",
            ));
        }
        let columns = first.select.selections.len();
        let window = WindowColumns::for_paging(&paging);
        tracing::trace!(
            columns,
            ?window,
            group = matches!(part, QueryPart::Group(_)),
            "emulating OFFSET/FETCH with row numbering"
        );

        let alias = self.next_row_alias();
        if parens {
            self.push('(');
        }
        self.append_sql("SELECT ");
        for i in 0..columns {
            if i > 0 {
                self.append_sql(", ");
            }
            self.append_sql(&format!("{}.c{}", alias, i));
        }
        self.append_sql(" FROM (");

        let saved = self.numbering;
        self.numbering = RowNumbering {
            target: Some(part),
            depth: self.parts.len() + 1,
            window,
            select_aliases: true,
        };
        let inner = self.visit_query_part(part, Parens::Never);
        self.numbering = saved;
        inner?;

        self.push(')');
        let separator = self.caps.table_alias_separator.clone();
        self.append_sql(&separator);
        self.append_sql(&alias);
        self.append_sql(" WHERE ");
        self.in_clause(Clause::Where, |t| t.render_numbering_filter(&alias, &paging, window))?;
        if part.is_root() {
            self.append_sql(" ORDER BY ");
            self.append_sql(&alias);
            self.append_sql(if window.row_number { ".rn" } else { ".rnk" });
        }
        if parens {
            self.push(')');
        }
        Ok(())
    }

    /// `rn > offset AND rn <= offset + fetch`, with rank and percent variants.
    fn render_numbering_filter(
        &mut self,
        alias: &str,
        paging: &Paging<'a>,
        window: WindowColumns,
    ) -> TranslateResult<()> {
        if let Some(offset) = paging.offset {
            self.append_sql(&format!("{}.rn > ", alias));
            self.render_row_count_sum(&[offset])?;
        }
        let Some(fetch) = paging.fetch else {
            return Ok(());
        };
        if paging.offset.is_some() {
            self.append_sql(" AND ");
        }
        let column = if window.rank { "rnk" } else { "rn" };
        self.append_sql(&format!("{}.{} <= ", alias, column));
        if paging.fetch_type.is_percent() {
            if let Some(offset) = paging.offset {
                self.render_row_count_sum(&[offset])?;
                self.append_sql(" + ");
            }
            self.append_sql(&format!("ceil({}.cnt * ", alias));
            self.render_row_count_sum(&[fetch])?;
            self.append_sql(" / 100)");
            Ok(())
        } else {
            match paging.offset {
                Some(offset) => self.render_row_count_sum(&[offset, fetch]),
                None => self.render_row_count_sum(&[fetch]),
            }
        }
    }

    /// `, row_number() OVER (..) rn, rank() OVER (..) rnk, count(*) OVER () cnt`.
    pub(crate) fn render_numbering_columns(
        &mut self,
        part: &'a QueryPart,
        group_alias: Option<&str>,
    ) -> TranslateResult<()> {
        let window = self.numbering.window;
        let keys = sort_keys(part, group_alias)?;
        let distinct = part.as_query_spec().is_some_and(|s| s.select.distinct);
        self.in_clause(Clause::Over, |t| {
            if window.row_number {
                t.append_sql(if distinct {
                    ", dense_rank() OVER ("
                } else {
                    ", row_number() OVER ("
                });
                t.render_window_order(&keys)?;
                t.append_sql(") rn");
            }
            if window.rank {
                // DISTINCT rows are ranked densely over every selected column
                if distinct {
                    t.append_sql(", dense_rank() OVER (");
                    t.render_window_order(&keys)?;
                } else {
                    let ordering: Vec<SortKey<'a>> = keys
                        .iter()
                        .filter(|k| !matches!(k, SortKey::Selection(_)))
                        .cloned()
                        .collect();
                    t.append_sql(", rank() OVER (");
                    t.render_window_order(&ordering)?;
                }
                t.append_sql(") rnk");
            }
            if window.count {
                t.append_sql(", count(*) OVER () cnt");
            }
            Ok(())
        })
    }

    fn render_window_order(&mut self, keys: &[SortKey<'a>]) -> TranslateResult<()> {
        if keys.is_empty() {
            if self.caps.offset_fetch_requires_order_by {
                self.append_sql("ORDER BY (SELECT 0)");
            }
            return Ok(());
        }
        self.append_sql("ORDER BY ");
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                self.append_sql(", ");
            }
            match key {
                SortKey::Spec(spec) => {
                    let spec: &'a SortSpecification = spec;
                    self.render_sort_key(spec.order, spec.nulls, |t| t.visit_expression(&spec.expr))?
                }
                SortKey::Selection(expr) => {
                    let expr: &'a Expression = expr;
                    self.render_sort_key(SortOrder::Asc, NullPrecedence::None, |t| {
                        t.visit_expression(expr)
                    })?
                }
                SortKey::Column {
                    qualifier,
                    index,
                    spec,
                } => {
                    let column = format!("{}.c{}", qualifier, index);
                    self.render_sort_key(spec.order, spec.nulls, |t| {
                        t.append_sql(&column);
                        Ok(())
                    })?
                }
            }
        }
        Ok(())
    }
}

/// Ordering key of a numbering window.
#[derive(Debug, Clone)]
enum SortKey<'a> {
    Spec(&'a SortSpecification),
    /// Selected column appended to keep DISTINCT numbering deterministic.
    Selection(&'a Expression),
    /// Column of a wrapped query group, addressed by its positional alias.
    Column {
        qualifier: String,
        index: usize,
        spec: &'a SortSpecification,
    },
}

fn sort_keys<'a>(part: &'a QueryPart, group_alias: Option<&str>) -> TranslateResult<Vec<SortKey<'a>>> {
    match (part, group_alias) {
        (QueryPart::Group(group), Some(qualifier)) => {
            let first = part
                .first_query_spec()
                .ok_or_else(|| TranslateError::malformed("Query group without members"))?;
            group
                .order_by
                .iter()
                .map(|spec| {
                    let index = match &spec.expr {
                        Expression::SelectionRef(i) => Some(*i),
                        expr => first.select.selections.iter().position(|s| s == expr),
                    };
                    index
                        .filter(|i| *i < first.select.selections.len())
                        .map(|index| SortKey::Column {
                            qualifier: qualifier.to_string(),
                            index,
                            spec,
                        })
                        .ok_or_else(|| {
                            TranslateError::malformed(
                                "ORDER BY item of a query group does not match a selection",
                            )
                        })
                })
                .collect()
        }
        (QueryPart::Spec(spec), _) => {
            let mut keys: Vec<SortKey<'a>> = spec.order_by.iter().map(SortKey::Spec).collect();
            if spec.select.distinct {
                for (i, selection) in spec.select.selections.iter().enumerate() {
                    let ordered = spec.order_by.iter().any(|s| match &s.expr {
                        Expression::SelectionRef(index) => *index == i,
                        expr => expr == selection,
                    });
                    if !ordered {
                        keys.push(SortKey::Selection(selection));
                    }
                }
            }
            Ok(keys)
        }
        (QueryPart::Group(_), None) => Err(TranslateError::malformed(
            "Numbered query group rendered without an alias",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{QueryGroup, QuerySpec};

    #[test]
    fn test_numbering_scope_resets_for_nested_parts() {
        let group = QueryPart::Group(QueryGroup {
            parts: vec![QuerySpec::default().into(), QuerySpec::default().into()],
            ..QueryGroup::default()
        });
        let QueryPart::Group(inner) = &group else {
            unreachable!()
        };
        let numbering = RowNumbering {
            target: Some(&group),
            depth: 2,
            window: WindowColumns::default(),
            select_aliases: true,
        };

        assert!(numbering.scoped_to(&group, 1).is_target(&group));

        let member = numbering.scoped_to(&inner.parts[0], 2);
        assert!(member.select_aliases);
        assert!(member.target.is_none());

        let nested = member.scoped_to(&inner.parts[1], 3);
        assert!(!nested.select_aliases);
    }

    #[test]
    fn test_window_columns() {
        let paging = Paging {
            offset: None,
            fetch: Some(RowCount::Value(5)),
            fetch_type: FetchClauseType::PercentWithTies,
        };
        let window = WindowColumns::for_paging(&paging);
        assert!(!window.row_number);
        assert!(window.rank);
        assert!(window.count);
    }
}
