//! Row value comparisons, native and emulated.

use super::sql;
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::TranslateError;
use crate::transpiler::{Capabilities, Dialect, QueryOptions, SqlAstTranslator};
use pretty_assertions::assert_eq;

const PREFIX: &str = "SELECT t.a FROM t t WHERE ";

fn where_clause(filter: Predicate) -> QuerySpec {
    QuerySpec::new()
        .root()
        .select(vec![col("t", "a")])
        .from(table("t", "t"))
        .filter(filter)
}

fn row(columns: &[&str]) -> Expression {
    tuple(columns.iter().map(|c| col("t", c)).collect())
}

fn values(values: &[i64]) -> Expression {
    tuple(values.iter().map(|v| lit(*v)).collect())
}

fn restriction(dialect: Dialect, filter: Predicate) -> String {
    let rendered = sql(dialect, where_clause(filter));
    rendered
        .strip_prefix(PREFIX)
        .unwrap_or_else(|| panic!("unexpected SQL: {}", rendered))
        .to_string()
}

fn pairs() -> QuerySpec {
    QuerySpec::new()
        .select(vec![col("u", "x"), col("u", "y")])
        .from(table("u", "u"))
}

#[test]
fn test_native_row_value_comparison() {
    let filter = gt(
        row(&["a", "b"]),
        tuple(vec![param(1, SqlType::Integer), param(2, SqlType::Integer)]),
    );
    assert_eq!(restriction(Dialect::Postgres, filter), "(t.a, t.b) > ($1, $2)");
}

#[test]
fn test_index_optimized_emulation() {
    let cases = [
        (
            ComparisonOperator::GreaterThan,
            "(t.a >= 1 AND NOT (t.a = 1 AND t.b <= 2))",
        ),
        (
            ComparisonOperator::GreaterThanOrEqual,
            "(t.a >= 1 AND NOT (t.a = 1 AND t.b < 2))",
        ),
        (
            ComparisonOperator::LessThan,
            "(t.a <= 1 AND NOT (t.a = 1 AND t.b >= 2))",
        ),
        (
            ComparisonOperator::LessThanOrEqual,
            "(t.a <= 1 AND NOT (t.a = 1 AND t.b > 2))",
        ),
    ];
    for (op, expected) in cases {
        let filter = cmp(row(&["a", "b"]), op, values(&[1, 2]));
        assert_eq!(restriction(Dialect::SqlServer, filter), expected, "{:?}", op);
    }
}

#[test]
fn test_index_optimized_emulation_of_three_columns() {
    let filter = gt(row(&["a", "b", "c"]), values(&[1, 2, 3]));
    assert_eq!(
        restriction(Dialect::SqlServer, filter),
        "(t.a >= 1 AND NOT (t.a = 1 AND (t.b < 2 OR t.b = 2 AND t.c <= 3)))"
    );
}

#[test]
fn test_logical_emulation_of_three_columns() {
    let caps = Capabilities::from_toml_str(
        r#"
        base = "sqlserver"
        tuple_emulation = "logical"
        "#,
    )
    .unwrap();
    let statement = Statement::from(QueryPart::from(where_clause(gt(
        row(&["a", "b", "c"]),
        values(&[1, 2, 3]),
    ))));
    let operation = SqlAstTranslator::new(caps)
        .translate(&statement, &QueryOptions::default(), None)
        .unwrap();
    assert_eq!(
        operation.sql(),
        format!("{}(t.a > 1 OR t.a = 1 AND (t.b > 2 OR t.b = 2 AND t.c > 3))", PREFIX)
    );
}

/// Lexicographic order of `(a, b)` against `(x, y)` checked on a small grid.
#[test]
fn test_emulations_agree_with_lexicographic_order() {
    fn holds(op: ComparisonOperator, l: (i64, i64), r: (i64, i64)) -> bool {
        use ComparisonOperator::*;
        match op {
            Equal => l == r,
            NotEqual => l != r,
            LessThan => l < r,
            LessThanOrEqual => l <= r,
            GreaterThan => l > r,
            GreaterThanOrEqual => l >= r,
            _ => unreachable!(),
        }
    }
    // Scalar pieces compare the second component as 0
    fn index_optimized(op: ComparisonOperator, l: (i64, i64), r: (i64, i64)) -> bool {
        holds(op.broader(), (l.0, 0), (r.0, 0))
            && !(l.0 == r.0 && holds(op.negated(), (l.1, 0), (r.1, 0)))
    }
    fn logical(op: ComparisonOperator, l: (i64, i64), r: (i64, i64)) -> bool {
        holds(op.sharper(), (l.0, 0), (r.0, 0)) || (l.0 == r.0 && holds(op, (l.1, 0), (r.1, 0)))
    }

    let ordering = [
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanOrEqual,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqual,
    ];
    for op in ordering {
        for a in 0..3 {
            for b in 0..3 {
                for x in 0..3 {
                    for y in 0..3 {
                        let expected = holds(op, (a, b), (x, y));
                        assert_eq!(index_optimized(op, (a, b), (x, y)), expected, "{:?}", op);
                        assert_eq!(logical(op, (a, b), (x, y)), expected, "{:?}", op);
                    }
                }
            }
        }
    }
}

#[test]
fn test_equality_unrolls_per_column() {
    assert_eq!(
        restriction(Dialect::SqlServer, eq(row(&["a", "b"]), values(&[1, 2]))),
        "(t.a = 1 AND t.b = 2)"
    );
    assert_eq!(
        restriction(Dialect::SqlServer, ne(row(&["a", "b"]), values(&[1, 2]))),
        "(t.a <> 1 OR t.b <> 2)"
    );
}

#[test]
fn test_single_element_tuples_compare_as_scalars() {
    assert_eq!(
        restriction(Dialect::SqlServer, gt(row(&["a"]), values(&[1]))),
        "t.a > 1"
    );
}

#[test]
fn test_arity_mismatch_is_malformed() {
    let statement = Statement::from(QueryPart::from(where_clause(eq(
        row(&["a", "b"]),
        values(&[1]),
    ))));
    let err = SqlAstTranslator::for_dialect(Dialect::Postgres)
        .translate(&statement, &QueryOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, TranslateError::MalformedTree(_)));
}

#[test]
fn test_in_list_variants() {
    let filter = || {
        in_list(
            row(&["a", "b"]),
            vec![values(&[1, 2]), values(&[3, 4])],
        )
    };
    assert_eq!(
        restriction(Dialect::Oracle, filter()),
        "(t.a, t.b) IN ((1, 2), (3, 4))"
    );
    assert_eq!(
        restriction(Dialect::SqlServer, filter()),
        "((t.a = 1 AND t.b = 2) OR (t.a = 3 AND t.b = 4))"
    );

    let negated = Predicate::InList {
        test: row(&["a", "b"]),
        list: vec![values(&[1, 2]), values(&[3, 4])],
        negated: true,
    };
    assert_eq!(
        restriction(Dialect::SqlServer, negated),
        "((t.a <> 1 OR t.b <> 2) AND (t.a <> 3 OR t.b <> 4))"
    );

    let caps = Capabilities::from_toml_str(
        r#"
        base = "postgres"
        row_values_in_in_list = false
        "#,
    )
    .unwrap();
    let statement = Statement::from(QueryPart::from(where_clause(filter())));
    let operation = SqlAstTranslator::new(caps)
        .translate(&statement, &QueryOptions::default(), None)
        .unwrap();
    assert_eq!(
        operation.sql(),
        format!("{}(t.a, t.b) IN (SELECT 1, 2 UNION ALL SELECT 3, 4)", PREFIX)
    );
}

#[test]
fn test_in_subquery_variants() {
    let filter = || {
        in_subquery(
            row(&["a", "b"]),
            pairs().filter(eq(col("u", "z"), lit(1))),
        )
    };
    assert_eq!(
        restriction(Dialect::Postgres, filter()),
        "(t.a, t.b) IN (SELECT u.x, u.y FROM u u WHERE u.z = 1)"
    );
    assert_eq!(
        restriction(Dialect::SqlServer, filter()),
        "EXISTS (SELECT 1 FROM u u WHERE (u.x = t.a AND u.y = t.b) AND (u.z = 1))"
    );
}

#[test]
fn test_quantified_subquery_comparisons() {
    let filter = || gt(row(&["a", "b"]), every(pairs()));
    assert_eq!(
        restriction(Dialect::Postgres, filter()),
        "(t.a, t.b) > ALL (SELECT u.x, u.y FROM u u)"
    );
    // Row values but no quantified row comparisons: compare with the largest row
    assert_eq!(
        restriction(Dialect::SQLite, filter()),
        "(t.a, t.b) > (SELECT u.x, u.y FROM u u ORDER BY 1 DESC, 2 DESC LIMIT 1)"
    );
    assert_eq!(
        restriction(Dialect::SqlServer, filter()),
        "NOT EXISTS (SELECT 1 FROM u u WHERE (u.x >= t.a AND NOT (u.x = t.a AND u.y < t.b)))"
    );

    let any_row = gt(row(&["a", "b"]), any(pairs()));
    assert_eq!(
        restriction(Dialect::SQLite, any_row),
        "(t.a, t.b) > (SELECT u.x, u.y FROM u u ORDER BY 1, 2 LIMIT 1)"
    );
}

#[test]
fn test_emulation_refuses_limited_or_grouped_subqueries() {
    let limited = in_subquery(row(&["a", "b"]), pairs().fetch(lit(1)));
    let statement = Statement::from(QueryPart::from(where_clause(limited)));
    let err = SqlAstTranslator::for_dialect(Dialect::SqlServer)
        .translate(&statement, &QueryOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, TranslateError::Unsupported(_)));

    let union = QueryGroup::new(SetOperator::Union, vec![pairs().into(), pairs().into()]);
    let statement = Statement::from(QueryPart::from(where_clause(in_subquery(
        row(&["a", "b"]),
        union,
    ))));
    let err = SqlAstTranslator::for_dialect(Dialect::SqlServer)
        .translate(&statement, &QueryOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, TranslateError::Unsupported(_)));
}

#[test]
fn test_row_nullness_without_row_values() {
    assert_eq!(
        restriction(Dialect::SqlServer, is_null(row(&["a", "b"]))),
        "(t.a IS NULL AND t.b IS NULL)"
    );
    assert_eq!(
        restriction(Dialect::Postgres, is_null(row(&["a", "b"]))),
        "(t.a, t.b) IS NULL"
    );
}
