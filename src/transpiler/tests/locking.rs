//! Pessimistic lock clauses, hints and follow-on locking.

use super::employees;
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::{TranslateError, TranslateResult};
use crate::transpiler::{Dialect, JdbcOperation, LockStrategy, QueryOptions, SqlAstTranslator};
use pretty_assertions::assert_eq;

fn locked(
    dialect: Dialect,
    part: impl Into<QueryPart>,
    lock: LockOptions,
) -> TranslateResult<JdbcOperation> {
    let statement = Statement::from(part.into());
    SqlAstTranslator::for_dialect(dialect).translate(
        &statement,
        &QueryOptions::new().with_lock_options(lock),
        None,
    )
}

fn strategy(operation: &JdbcOperation) -> LockStrategy {
    operation.as_select().unwrap().lock_strategy()
}

fn with_department() -> QuerySpec {
    QuerySpec::new()
        .root()
        .select(vec![col("e", "name"), col("d", "name")])
        .from(table("employee", "e").join(
            JoinType::Left,
            table("department", "d"),
            eq(col("e", "dept_id"), col("d", "id")),
        ))
}

#[test]
fn test_for_update_of_table_alias() {
    let op = locked(
        Dialect::Postgres,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e FOR UPDATE OF e");
    assert_eq!(strategy(&op), LockStrategy::Clause);
}

#[test]
fn test_lock_timeouts() {
    let op = locked(
        Dialect::Postgres,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::NoWait),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e FOR UPDATE OF e NOWAIT");

    let op = locked(
        Dialect::Postgres,
        employees(),
        LockOptions::new(LockMode::UpgradeSkipLocked),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e FOR UPDATE OF e SKIP LOCKED"
    );

    // Postgres has no WAIT n; the timeout is dropped
    let op = locked(
        Dialect::Postgres,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::Millis(2000)),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e FOR UPDATE OF e");
}

#[test]
fn test_shared_lock() {
    let op = locked(
        Dialect::Postgres,
        employees(),
        LockOptions::new(LockMode::PessimisticRead),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e FOR SHARE OF e");
}

#[test]
fn test_column_lock_strategy_with_wait() {
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "id"), col("e", "name")])
        .from(table("employee", "e").key_columns(&["id"]));
    let op = locked(
        Dialect::Oracle,
        query,
        LockOptions::new(LockMode::PessimisticWrite).with_timeout(LockTimeout::Millis(3000)),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e FOR UPDATE OF e.id WAIT 3"
    );

    let err = locked(
        Dialect::Oracle,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::MalformedTree(_)));
}

#[test]
fn test_follow_on_locking_for_group_by() {
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "dept")])
        .from(table("employee", "e"))
        .group_by(vec![col("e", "dept")]);
    let op = locked(
        Dialect::Postgres,
        query.clone(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.dept FROM employee e GROUP BY e.dept");
    assert_eq!(strategy(&op), LockStrategy::FollowOn);

    let err = locked(
        Dialect::Postgres,
        query,
        LockOptions::new(LockMode::PessimisticWrite).with_follow_on_locking(false),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TranslateError::LockingNotSupported { clause: "GROUP BY" }
    ));
}

#[test]
fn test_follow_on_locking_for_distinct_and_aggregates() {
    let op = locked(
        Dialect::Postgres,
        employees().distinct(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(strategy(&op), LockStrategy::FollowOn);

    let query = QuerySpec::new()
        .root()
        .select(vec![aggregate("max", vec![col("e", "salary")])])
        .from(table("employee", "e"));
    let err = locked(
        Dialect::Postgres,
        query,
        LockOptions::new(LockMode::PessimisticWrite).with_follow_on_locking(false),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TranslateError::LockingNotSupported {
            clause: "aggregate functions"
        }
    ));
}

#[test]
fn test_forced_follow_on_locking() {
    let op = locked(
        Dialect::Postgres,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite).with_follow_on_locking(true),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e");
    assert_eq!(strategy(&op), LockStrategy::FollowOn);
}

#[test]
fn test_outer_join_locking() {
    let op = locked(
        Dialect::Postgres,
        with_department(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(strategy(&op), LockStrategy::FollowOn);

    // Only the inner side is locked, so FOR UPDATE OF stays valid
    let op = locked(
        Dialect::Postgres,
        with_department(),
        LockOptions::new(LockMode::None).with_alias("e", LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.name, d.name FROM employee e LEFT JOIN department d ON e.dept_id = d.id FOR UPDATE OF e"
    );
    assert_eq!(strategy(&op), LockStrategy::Clause);
}

#[test]
fn test_outer_join_locking_where_supported() {
    let op = locked(
        Dialect::MySQL,
        with_department(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.name, d.name FROM employee e LEFT JOIN department d ON e.dept_id = d.id FOR UPDATE OF e, d"
    );
}

#[test]
fn test_sqlserver_table_hints() {
    let op = locked(
        Dialect::SqlServer,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e WITH (UPDLOCK, ROWLOCK)");
    assert_eq!(strategy(&op), LockStrategy::Clause);

    let op = locked(
        Dialect::SqlServer,
        employees(),
        LockOptions::new(LockMode::PessimisticRead).with_timeout(LockTimeout::NoWait),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e WITH (HOLDLOCK, ROWLOCK, NOWAIT)"
    );

    let op = locked(
        Dialect::SqlServer,
        employees(),
        LockOptions::new(LockMode::UpgradeSkipLocked),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e WITH (UPDLOCK, ROWLOCK, READPAST)"
    );
}

#[test]
fn test_dialect_lock_suffixes() {
    let op = locked(
        Dialect::Db2,
        employees(),
        LockOptions::new(LockMode::UpgradeSkipLocked),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e FOR UPDATE WITH RS SKIP LOCKED DATA"
    );

    let op = locked(
        Dialect::Firebird,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e FOR UPDATE OF e WITH LOCK");
}

#[test]
fn test_dialect_without_lock_clause() {
    let op = locked(
        Dialect::SQLite,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e");
    assert_eq!(strategy(&op), LockStrategy::FollowOn);

    let err = locked(
        Dialect::SQLite,
        employees(),
        LockOptions::new(LockMode::PessimisticWrite).with_follow_on_locking(false),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TranslateError::LockingNotSupported {
            clause: "FOR UPDATE"
        }
    ));

    // A locked subquery has no follow-on fallback
    let departments = QuerySpec::new()
        .select(vec![col("d", "id")])
        .from(table("department", "d"));
    for dialect in [Dialect::SQLite, Dialect::DuckDB] {
        let err = locked(
            dialect,
            employees().filter(in_subquery(col("e", "dept_id"), departments.clone())),
            LockOptions::new(LockMode::None).with_alias("d", LockMode::PessimisticWrite),
        )
        .unwrap_err();
        assert!(matches!(err, TranslateError::Unsupported(_)), "{}", dialect.name());
    }
}

#[test]
fn test_read_lock_needs_no_clause() {
    let op = locked(Dialect::Postgres, employees(), LockOptions::new(LockMode::Read)).unwrap();
    assert_eq!(op.sql(), "SELECT e.id, e.name FROM employee e");
    assert_eq!(strategy(&op), LockStrategy::None);
}

#[test]
fn test_subquery_lock_clause() {
    let departments = || {
        QuerySpec::new()
            .select(vec![col("d", "id")])
            .from(table("department", "d"))
    };
    let lock = || LockOptions::new(LockMode::None).with_alias("d", LockMode::PessimisticWrite);

    let op = locked(
        Dialect::Postgres,
        employees().filter(in_subquery(col("e", "dept_id"), departments())),
        lock(),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT e.id, e.name FROM employee e WHERE e.dept_id IN (SELECT d.id FROM department d FOR UPDATE OF d)"
    );

    let err = locked(
        Dialect::Postgres,
        employees().filter(in_subquery(col("e", "dept_id"), departments().distinct())),
        lock(),
    )
    .unwrap_err();
    assert!(matches!(err, TranslateError::Unsupported(_)));
}

#[test]
fn test_lock_stays_inside_emulated_paging() {
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "id"), col("e", "name")])
        .from(table("employee", "e").key_columns(&["id"]))
        .order_by(SortSpecification::asc(col("e", "id")))
        .fetch(lit(5));
    let op = locked(
        Dialect::Oracle11,
        query,
        LockOptions::new(LockMode::PessimisticWrite),
    )
    .unwrap();
    assert_eq!(
        op.sql(),
        "SELECT r_0_.c0, r_0_.c1 FROM (SELECT e.id c0, e.name c1, row_number() OVER (ORDER BY e.id) rn \
         FROM employee e FOR UPDATE OF e.id) r_0_ WHERE r_0_.rn <= 5 ORDER BY r_0_.rn"
    );
}
