//! Parameter binders, bindings and the per-translation registry.

use crate::ast::{FilterParameter, JdbcParameter, ParameterId, Value};
use crate::error::{TranslateError, TranslateResult};
use serde::{Deserialize, Serialize};
use sqlx::Arguments;
use sqlx::postgres::PgArguments;
use std::collections::{BTreeMap, BTreeSet};

/// Externally supplied pagination for the root query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Limit {
    pub first_row: Option<u64>,
    pub max_rows: Option<u64>,
}

impl Limit {
    pub fn new(first_row: Option<u64>, max_rows: Option<u64>) -> Self {
        Self {
            first_row,
            max_rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.has_first_row() && self.max_rows.is_none()
    }

    /// A first row of zero skips nothing.
    pub fn has_first_row(&self) -> bool {
        self.first_row.is_some_and(|row| row > 0)
    }
}

/// Runtime values for query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBindings {
    values: BTreeMap<ParameterId, Value>,
}

impl ParameterBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, id: ParameterId, value: impl Into<Value>) -> &mut Self {
        self.values.insert(id, value.into());
        self
    }

    pub fn with(mut self, id: u32, value: impl Into<Value>) -> Self {
        self.values.insert(ParameterId(id), value.into());
        self
    }

    pub fn get(&self, id: ParameterId) -> Option<&Value> {
        self.values.get(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Values known only when the statement executes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionContext {
    pub limit: Option<Limit>,
}

impl ExecutionContext {
    pub fn with_limit(limit: Limit) -> Self {
        Self { limit: Some(limit) }
    }
}

/// One operand of a computed row count.
#[derive(Debug, Clone, PartialEq)]
pub enum BindSource {
    Parameter(JdbcParameter),
    Offset,
    Limit,
    Value(i64),
}

/// Writes one placeholder's value at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterBinder {
    Parameter(JdbcParameter),
    /// Literal rendered as a placeholder because it has no SQL form.
    Literal(Value),
    /// Synthetic first-row parameter of an external limit.
    Offset,
    /// Synthetic max-rows parameter of an external limit.
    Limit,
    Filter(FilterParameter),
    /// Sum of several sources bound as a single value.
    Sum(Vec<BindSource>),
}

impl ParameterBinder {
    /// Compute the value this binder writes.
    pub fn resolve(
        &self,
        position: usize,
        bindings: &ParameterBindings,
        ctx: &ExecutionContext,
    ) -> TranslateResult<Value> {
        match self {
            ParameterBinder::Parameter(p) => bindings
                .get(p.id)
                .cloned()
                .ok_or(TranslateError::MissingBinding(p.id)),
            ParameterBinder::Literal(value) => Ok(value.clone()),
            ParameterBinder::Filter(fp) => Ok(fp.value.clone()),
            ParameterBinder::Offset => Ok(Value::Int(offset_of(position, ctx)?)),
            ParameterBinder::Limit => Ok(Value::Int(limit_of(position, ctx)?)),
            ParameterBinder::Sum(sources) => {
                let mut total = 0i64;
                for source in sources {
                    let value = match source {
                        BindSource::Value(v) => *v,
                        BindSource::Offset => offset_of(position, ctx)?,
                        BindSource::Limit => limit_of(position, ctx)?,
                        BindSource::Parameter(p) => bindings
                            .get(p.id)
                            .and_then(Value::as_i64)
                            .ok_or(TranslateError::MissingBinding(p.id))?,
                    };
                    total = total.saturating_add(value);
                }
                Ok(Value::Int(total))
            }
        }
    }

    pub fn bind(
        &self,
        target: &mut dyn BindTarget,
        position: usize,
        bindings: &ParameterBindings,
        ctx: &ExecutionContext,
    ) -> TranslateResult<()> {
        let value = self.resolve(position, bindings, ctx)?;
        target.bind_value(position, &value)
    }
}

fn offset_of(position: usize, ctx: &ExecutionContext) -> TranslateResult<i64> {
    let row = ctx
        .limit
        .and_then(|l| l.first_row)
        .ok_or_else(|| TranslateError::bind(position, "no first row supplied for offset"))?;
    i64::try_from(row).map_err(|_| TranslateError::bind(position, "first row out of range"))
}

fn limit_of(position: usize, ctx: &ExecutionContext) -> TranslateResult<i64> {
    let rows = ctx
        .limit
        .and_then(|l| l.max_rows)
        .ok_or_else(|| TranslateError::bind(position, "no max rows supplied for limit"))?;
    i64::try_from(rows).map_err(|_| TranslateError::bind(position, "max rows out of range"))
}

/// A prepared-statement argument list.
pub trait BindTarget {
    /// Write `value` into the 1-based `position`.
    fn bind_value(&mut self, position: usize, value: &Value) -> TranslateResult<()>;
}

/// Records bound values in order.
impl BindTarget for Vec<Value> {
    fn bind_value(&mut self, position: usize, value: &Value) -> TranslateResult<()> {
        if position != self.len() + 1 {
            return Err(TranslateError::bind(
                position,
                format!("expected position {}", self.len() + 1),
            ));
        }
        self.push(value.clone());
        Ok(())
    }
}

/// Postgres arguments are positional; binders must arrive in order.
impl BindTarget for PgArguments {
    fn bind_value(&mut self, _position: usize, value: &Value) -> TranslateResult<()> {
        match value {
            Value::Null => Arguments::add(self, Option::<String>::None),
            Value::Bool(b) => Arguments::add(self, *b),
            Value::Int(n) => Arguments::add(self, *n),
            Value::Float(f) => Arguments::add(self, *f),
            Value::String(s) => Arguments::add(self, s.clone()),
            Value::Date(d) => Arguments::add(self, *d),
            Value::Time(t) => Arguments::add(self, *t),
            Value::Timestamp(ts) => Arguments::add(self, *ts),
            Value::Uuid(u) => Arguments::add(self, *u),
            Value::Bytes(b) => Arguments::add(self, b.clone()),
        }
        Ok(())
    }
}

/// Key of a binding consumed while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKey {
    Parameter(ParameterId),
    Offset,
    Limit,
}

/// Bindings folded into SQL text; a cached statement is only valid for these values.
pub type AppliedBindings = BTreeMap<BindingKey, Value>;

/// Binders, affected tables and applied bindings of one translation.
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    binders: Vec<ParameterBinder>,
    affected_tables: BTreeSet<String>,
    filter_parameters: Vec<FilterParameter>,
    applied: AppliedBindings,
}

impl ParameterRegistry {
    /// Append a binder and return its 1-based position.
    pub fn add_binder(&mut self, binder: ParameterBinder) -> usize {
        self.binders.push(binder);
        self.binders.len()
    }

    pub fn register_affected_table(&mut self, table: &str) {
        if !self.affected_tables.contains(table) {
            self.affected_tables.insert(table.to_string());
        }
    }

    pub fn add_filter_parameter(&mut self, parameter: FilterParameter) {
        self.filter_parameters.push(parameter);
    }

    pub fn record_applied(&mut self, key: BindingKey, value: Value) {
        self.applied.insert(key, value);
    }

    pub fn binders(&self) -> &[ParameterBinder] {
        &self.binders
    }

    pub fn affected_tables(&self) -> &BTreeSet<String> {
        &self.affected_tables
    }

    pub fn into_parts(
        self,
    ) -> (
        Vec<ParameterBinder>,
        BTreeSet<String>,
        Vec<FilterParameter>,
        AppliedBindings,
    ) {
        (
            self.binders,
            self.affected_tables,
            self.filter_parameters,
            self.applied,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlType;

    fn p(id: u32) -> JdbcParameter {
        JdbcParameter {
            id: ParameterId(id),
            sql_type: SqlType::BigInt,
        }
    }

    #[test]
    fn test_sum_binder_adds_sources() {
        let bindings = ParameterBindings::new().with(1, 5);
        let ctx = ExecutionContext::with_limit(Limit::new(Some(10), Some(20)));
        let binder = ParameterBinder::Sum(vec![
            BindSource::Parameter(p(1)),
            BindSource::Offset,
            BindSource::Value(1),
        ]);
        assert_eq!(binder.resolve(1, &bindings, &ctx).unwrap(), Value::Int(16));
    }

    #[test]
    fn test_missing_binding() {
        let err = ParameterBinder::Parameter(p(7))
            .resolve(1, &ParameterBindings::new(), &ExecutionContext::default())
            .unwrap_err();
        assert!(matches!(err, TranslateError::MissingBinding(ParameterId(7))));
    }

    #[test]
    fn test_vec_target_checks_order() {
        let mut values: Vec<Value> = Vec::new();
        values.bind_value(1, &Value::Int(1)).unwrap();
        assert!(values.bind_value(3, &Value::Int(3)).is_err());
    }

    #[test]
    fn test_pg_arguments_accept_every_value() {
        let mut args = PgArguments::default();
        let values = [
            Value::Null,
            Value::Bool(true),
            Value::Int(1),
            Value::Float(1.5),
            Value::String("x".into()),
            Value::Bytes(vec![1, 2]),
        ];
        for (i, v) in values.iter().enumerate() {
            args.bind_value(i + 1, v).unwrap();
        }
    }

    #[test]
    fn test_limit_first_row_zero_is_empty() {
        assert!(Limit::new(Some(0), None).is_empty());
        assert!(!Limit::new(Some(0), Some(5)).is_empty());
    }
}
