//! Per-call translation state.
//!
//! A [`Translation`] lives for exactly one `translate` call. Every scoped
//! change (clause stack, query part stack, row numbering, lock accumulator,
//! rendering mode) is restored on both the success and the error path.

use super::buffer::{Clause, ClauseStack, SqlBuffer};
use super::dialect::Capabilities;
use super::literals::LiteralFormatter;
use super::locking::{ForUpdateClause, LockStrategy};
use super::pagination::RowNumbering;
use super::params::{BindingKey, Limit, ParameterBinder, ParameterBindings, ParameterRegistry};
use crate::ast::{Expression, LockOptions, Predicate, QueryPart, Value};
use crate::error::TranslateResult;

/// How parameters and literals are emitted by [`Translation::render_with_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    #[default]
    Default,
    /// Bare placeholders are wrapped so the database can infer their type.
    NoPlainParameter,
    /// Parameters are replaced by their bound values.
    InlineParameters,
}

/// Mutable state of one statement translation.
///
/// Self-rendering nodes receive this value and emit SQL through
/// [`append_sql`](Self::append_sql), [`render_expression`](Self::render_expression)
/// and [`render_predicate`](Self::render_predicate).
#[derive(Debug)]
pub struct Translation<'a> {
    pub(crate) caps: &'a Capabilities,
    pub(crate) bindings: Option<&'a ParameterBindings>,
    pub(crate) buffer: SqlBuffer,
    pub(crate) clauses: ClauseStack,
    pub(crate) parts: Vec<&'a QueryPart>,
    pub(crate) registry: ParameterRegistry,
    pub(crate) limit: Option<Limit>,
    /// `None` once follow-on locking was chosen for the root.
    pub(crate) lock_options: Option<LockOptions>,
    pub(crate) for_update: Option<ForUpdateClause>,
    pub(crate) lock_strategy: LockStrategy,
    /// Alias of an UPDATE/DELETE target; columns on it render unqualified.
    pub(crate) dml_target_alias: Option<&'a str>,
    pub(crate) numbering: RowNumbering<'a>,
    pub(crate) mode: RenderingMode,
    pub(crate) uses_offset_parameter: bool,
    pub(crate) uses_limit_parameter: bool,
    /// Rows the driver must skip when SQL cannot.
    pub(crate) rows_to_skip: Option<u64>,
    /// Row cap for the driver, including skipped rows.
    pub(crate) max_rows: Option<u64>,
    row_aliases: usize,
    group_aliases: usize,
    literal_formatter: Option<LiteralFormatter>,
}

impl<'a> Translation<'a> {
    pub(crate) fn new(
        caps: &'a Capabilities,
        limit: Option<Limit>,
        lock_options: &LockOptions,
        bindings: Option<&'a ParameterBindings>,
    ) -> Self {
        Self {
            caps,
            bindings,
            buffer: SqlBuffer::with_capacity(256),
            clauses: ClauseStack::default(),
            parts: Vec::new(),
            registry: ParameterRegistry::default(),
            limit: limit.filter(|l| !l.is_empty()),
            lock_options: Some(lock_options.clone()),
            for_update: None,
            lock_strategy: LockStrategy::None,
            dml_target_alias: None,
            numbering: RowNumbering::default(),
            mode: RenderingMode::Default,
            uses_offset_parameter: false,
            uses_limit_parameter: false,
            rows_to_skip: None,
            max_rows: None,
            row_aliases: 0,
            group_aliases: 0,
            literal_formatter: None,
        }
    }

    // ---- public rendering surface -------------------------------------

    pub fn append_sql(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
    }

    pub fn capabilities(&self) -> &Capabilities {
        self.caps
    }

    pub fn current_clause(&self) -> Option<Clause> {
        self.clauses.current()
    }

    pub fn render_expression(&mut self, expr: &'a Expression) -> TranslateResult<()> {
        self.visit_expression(expr)
    }

    pub fn render_predicate(&mut self, predicate: &'a Predicate) -> TranslateResult<()> {
        self.visit_predicate(predicate)
    }

    /// Render `expr` with a temporary rendering mode.
    pub fn render_with_mode(
        &mut self,
        mode: RenderingMode,
        expr: &'a Expression,
    ) -> TranslateResult<()> {
        let saved = std::mem::replace(&mut self.mode, mode);
        let result = self.visit_expression(expr);
        self.mode = saved;
        result
    }

    // ---- scoped state ------------------------------------------------

    pub(crate) fn push(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Run `f` with `clause` on top of the clause stack.
    pub(crate) fn in_clause<R>(
        &mut self,
        clause: Clause,
        f: impl FnOnce(&mut Self) -> TranslateResult<R>,
    ) -> TranslateResult<R> {
        self.clauses.push(clause);
        let result = f(self);
        self.clauses.pop();
        result
    }

    /// Run `f` with `part` as the current query part.
    pub(crate) fn in_part<R>(
        &mut self,
        part: &'a QueryPart,
        f: impl FnOnce(&mut Self) -> TranslateResult<R>,
    ) -> TranslateResult<R> {
        self.parts.push(part);
        let result = f(self);
        self.parts.pop();
        result
    }

    /// Run `f` with row numbering and the lock accumulator cleared, restoring both afterwards.
    pub(crate) fn isolated<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> TranslateResult<R>,
    ) -> TranslateResult<R> {
        let numbering = std::mem::take(&mut self.numbering);
        let for_update = self.for_update.take();
        let result = f(self);
        self.numbering = numbering;
        self.for_update = for_update;
        result
    }

    pub(crate) fn current_part(&self) -> Option<&'a QueryPart> {
        self.parts.last().copied()
    }

    pub(crate) fn in_where_clause(&self) -> bool {
        self.clauses.current() == Some(Clause::Where)
    }

    // ---- registry ----------------------------------------------------

    /// Register `binder` and emit its placeholder.
    pub(crate) fn append_placeholder(&mut self, binder: ParameterBinder) {
        match binder {
            ParameterBinder::Offset => self.uses_offset_parameter = true,
            ParameterBinder::Limit => self.uses_limit_parameter = true,
            _ => {}
        }
        let position = self.registry.add_binder(binder);
        let placeholder = self.caps.placeholder.render(position);
        self.buffer.push_str(&placeholder);
    }

    pub(crate) fn record_applied(&mut self, key: BindingKey, value: Value) {
        self.registry.record_applied(key, value);
    }

    pub(crate) fn register_affected_table(&mut self, table: &str) {
        self.registry.register_affected_table(table);
    }

    pub(crate) fn literal_formatter(&mut self) -> &LiteralFormatter {
        let caps = self.caps;
        self.literal_formatter
            .get_or_insert_with(|| LiteralFormatter::new(caps))
    }

    pub(crate) fn next_row_alias(&mut self) -> String {
        let alias = format!("r_{}_", self.row_aliases);
        self.row_aliases += 1;
        alias
    }

    pub(crate) fn next_group_alias(&mut self) -> String {
        let alias = format!("grp_{}_", self.group_aliases);
        self.group_aliases += 1;
        alias
    }

    /// Release helpers and clear scoped state; runs after every translation.
    pub(crate) fn cleanup(&mut self) {
        if self.literal_formatter.take().is_some() {
            tracing::trace!("released literal formatter");
        }
        self.clauses.clear();
        self.parts.clear();
        self.numbering = RowNumbering::default();
        self.for_update = None;
        self.dml_target_alias = None;
        self.mode = RenderingMode::Default;
    }
}
