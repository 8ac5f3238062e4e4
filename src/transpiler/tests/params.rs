//! Binder ordering, folded bindings and execution-time binding.

use super::employees;
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::{
    BindingKey, Dialect, ExecutionContext, JdbcOperation, Limit, ParameterBinder,
    ParameterBindings, QueryOptions, RenderingMode, SqlAstTranslator, Translation,
};
use pretty_assertions::assert_eq;

fn run(
    dialect: Dialect,
    part: impl Into<QueryPart>,
    options: &QueryOptions,
    bindings: Option<&ParameterBindings>,
) -> TranslateResult<JdbcOperation> {
    let statement = Statement::from(part.into());
    SqlAstTranslator::for_dialect(dialect).translate(&statement, options, bindings)
}

/// Parameter ids per binder, `None` for synthetic binders.
fn parameter_ids(operation: &JdbcOperation) -> Vec<Option<u32>> {
    operation
        .parameter_binders()
        .iter()
        .map(|binder| match binder {
            ParameterBinder::Parameter(p) => Some(p.id.0),
            _ => None,
        })
        .collect()
}

fn bound(
    operation: &JdbcOperation,
    bindings: &ParameterBindings,
    ctx: &ExecutionContext,
) -> Vec<Value> {
    let mut values: Vec<Value> = Vec::new();
    operation.bind_all(&mut values, bindings, ctx).unwrap();
    values
}

fn paged_by_parameters() -> QuerySpec {
    employees()
        .order_by(SortSpecification::asc(col("e", "id")))
        .offset(param(1, SqlType::BigInt))
        .fetch(param(2, SqlType::BigInt))
}

#[test]
fn test_binders_follow_placeholder_order() {
    let query = employees().filter(gt(
        tuple(vec![col("e", "dept"), col("e", "id")]),
        tuple(vec![param(1, SqlType::Integer), param(2, SqlType::Integer)]),
    ));
    let op = run(Dialect::SqlServer, query, &QueryOptions::default(), None).unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e WHERE (e.dept >= @p1 AND NOT (e.dept = @p2 AND e.id <= @p3))"
    );
    // Emulation repeats a parameter once per placeholder
    assert_eq!(parameter_ids(&op), vec![Some(1), Some(1), Some(2)]);

    let bindings = ParameterBindings::new().with(1, 10).with(2, 7);
    assert_eq!(
        bound(&op, &bindings, &ExecutionContext::default()),
        vec![Value::Int(10), Value::Int(10), Value::Int(7)]
    );
}

#[test]
fn test_missing_binding_at_execution() {
    let query = employees().filter(eq(col("e", "id"), param(3, SqlType::Integer)));
    let op = run(Dialect::Postgres, query, &QueryOptions::default(), None).unwrap();
    let mut values: Vec<Value> = Vec::new();
    let err = op
        .bind_all(&mut values, &ParameterBindings::new(), &ExecutionContext::default())
        .unwrap_err();
    assert!(matches!(err, TranslateError::MissingBinding(ParameterId(3))));
}

#[test]
fn test_external_limit_binds_from_context() {
    let limit = Limit::new(Some(20), Some(10));
    let op = run(
        Dialect::Postgres,
        employees(),
        &QueryOptions::new().with_limit(limit),
        None,
    )
    .unwrap();
    assert_eq!(
        op.parameter_binders(),
        &[ParameterBinder::Limit, ParameterBinder::Offset]
    );
    assert_eq!(
        bound(&op, &ParameterBindings::new(), &ExecutionContext::with_limit(limit)),
        vec![Value::Int(10), Value::Int(20)]
    );

    let mut values: Vec<Value> = Vec::new();
    let err = op
        .bind_all(&mut values, &ParameterBindings::new(), &ExecutionContext::default())
        .unwrap_err();
    assert!(matches!(err, TranslateError::Bind { position: 1, .. }));
}

#[test]
fn test_literal_operands_fold_bindings() {
    let query = employees()
        .order_by(SortSpecification::asc(col("e", "id")))
        .fetch(param(1, SqlType::BigInt));
    let bindings = ParameterBindings::new().with(1, 20);
    let op = run(
        Dialect::Informix,
        query.clone(),
        &QueryOptions::default(),
        Some(&bindings),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT FIRST 20 e.id, e.name FROM employee e ORDER BY e.id"
    );
    assert!(op.parameter_binders().is_empty());
    assert_eq!(
        op.applied_bindings().get(&BindingKey::Parameter(ParameterId(1))),
        Some(&Value::Int(20))
    );

    let err = run(Dialect::Informix, query, &QueryOptions::default(), None).unwrap_err();
    assert!(matches!(err, TranslateError::MissingBinding(ParameterId(1))));
}

#[test]
fn test_single_parameter_sums() {
    let op = run(
        Dialect::Firebird,
        paged_by_parameters(),
        &QueryOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e ORDER BY e.id ROWS ? TO ?"
    );
    assert!(matches!(
        op.parameter_binders(),
        [ParameterBinder::Sum(_), ParameterBinder::Sum(_)]
    ));
    let bindings = ParameterBindings::new().with(1, 10).with(2, 5);
    assert_eq!(
        bound(&op, &bindings, &ExecutionContext::default()),
        vec![Value::Int(11), Value::Int(15)]
    );
}

#[test]
fn test_prefix_paging_binds_fetch_before_offset() {
    let op = run(
        Dialect::SqlAnywhere,
        paged_by_parameters(),
        &QueryOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT TOP ? START AT ? + 1 e.id, e.name FROM employee e ORDER BY e.id"
    );
    assert_eq!(parameter_ids(&op), vec![Some(2), Some(1)]);
}

#[derive(Debug)]
struct Tagged {
    mode: RenderingMode,
    inner: Expression,
}

impl SqlRenderable for Tagged {
    fn render<'a>(&'a self, translation: &mut Translation<'a>) -> TranslateResult<()> {
        translation.append_sql("tag(");
        translation.render_with_mode(self.mode, &self.inner)?;
        translation.append_sql(")");
        Ok(())
    }
}

fn tagged(mode: RenderingMode, inner: Expression) -> QuerySpec {
    QuerySpec::new()
        .root()
        .select(vec![Expression::SelfRendering(SelfRendering::new(Tagged {
            mode,
            inner,
        }))])
        .from(table("employee", "e"))
}

#[test]
fn test_inline_parameters_record_applied_bindings() {
    let bindings = ParameterBindings::new().with(1, 42);
    let op = run(
        Dialect::Postgres,
        tagged(RenderingMode::InlineParameters, param(1, SqlType::Integer)),
        &QueryOptions::default(),
        Some(&bindings),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT tag(42) FROM employee e");
    assert!(op.parameter_binders().is_empty());
    assert_eq!(
        op.applied_bindings().get(&BindingKey::Parameter(ParameterId(1))),
        Some(&Value::Int(42))
    );

    let err = run(
        Dialect::Postgres,
        tagged(RenderingMode::InlineParameters, param(1, SqlType::Integer)),
        &QueryOptions::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::MissingBinding(ParameterId(1))));
}

#[test]
fn test_no_plain_parameter_mode() {
    let op = run(
        Dialect::Postgres,
        tagged(RenderingMode::NoPlainParameter, param(1, SqlType::Integer)),
        &QueryOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT tag(($1 + 0)) FROM employee e");
    assert_eq!(parameter_ids(&op), vec![Some(1)]);
}

#[test]
fn test_filter_fragments_are_renumbered() {
    let filter = Predicate::Filter(FilterPredicate {
        fragment: "e.name = ? AND e.note <> '?'".into(),
        parameters: vec![FilterParameter {
            value: Value::from("bob"),
            sql_type: SqlType::Varchar,
        }],
    });
    let query = employees().filter(and(vec![
        eq(col("e", "id"), param(1, SqlType::Integer)),
        filter,
    ]));
    let op = run(Dialect::Postgres, query, &QueryOptions::default(), None).unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e WHERE e.id = $1 AND e.name = $2 AND e.note <> '?'"
    );
    assert_eq!(op.filter_parameters().len(), 1);

    let bindings = ParameterBindings::new().with(1, 7);
    assert_eq!(
        bound(&op, &bindings, &ExecutionContext::default()),
        vec![Value::Int(7), Value::String("bob".into())]
    );
}

#[test]
fn test_filter_marker_count_must_match() {
    let filter = Predicate::Filter(FilterPredicate {
        fragment: "e.name = 'x'".into(),
        parameters: vec![FilterParameter {
            value: Value::Int(1),
            sql_type: SqlType::Integer,
        }],
    });
    let err = run(
        Dialect::Postgres,
        employees().filter(filter),
        &QueryOptions::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::MalformedTree(_)));
}

#[test]
fn test_literals_without_sql_form_become_binders() {
    let query = employees().filter(eq(col("e", "avatar"), lit(Value::Bytes(vec![1, 2]))));
    let op = run(Dialect::Postgres, query, &QueryOptions::default(), None).unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e WHERE e.avatar = $1");
    assert_eq!(
        op.parameter_binders(),
        &[ParameterBinder::Literal(Value::Bytes(vec![1, 2]))]
    );
}

#[test]
fn test_bind_into_pg_arguments() {
    let query = employees().filter(eq(col("e", "id"), param(1, SqlType::BigInt)));
    let op = run(Dialect::Postgres, query, &QueryOptions::default(), None).unwrap();
    let mut args = sqlx::postgres::PgArguments::default();
    op.bind_all(
        &mut args,
        &ParameterBindings::new().with(1, 5i64),
        &ExecutionContext::default(),
    )
    .unwrap();
}
