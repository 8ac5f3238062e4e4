//! Core statement rendering (SELECT, INSERT, UPDATE, DELETE, WITH).

use super::{employees, sql, translate};
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::TranslateError;
use crate::transpiler::{Dialect, QueryOptions, SqlAstTranslator, ToSql};
use pretty_assertions::assert_eq;

fn tree_cte() -> CteStatement {
    CteStatement {
        name: "tree".into(),
        columns: vec!["id".into()],
        definition: QuerySpec::new()
            .select(vec![col("n", "id")])
            .from(table("node", "n"))
            .into(),
        materialization: None,
        search: None,
        cycle: None,
    }
}

fn select_from_tree(with: CteClause) -> Statement {
    Statement::Select(SelectStatement {
        with,
        query: QuerySpec::new()
            .root()
            .select(vec![column("id")])
            .from(StandardTableGroup::new(TableReference::named("tree", None)))
            .into(),
    })
}

#[test]
fn test_simple_select() {
    assert_eq!(
        sql(Dialect::Postgres, employees()),
        "SELECT e.id, e.name FROM employee e"
    );
}

#[test]
fn test_select_with_where() {
    let query = employees().filter(eq(col("e", "dept"), param(1, SqlType::Varchar)));
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT e.id, e.name FROM employee e WHERE e.dept = $1"
    );
}

#[test]
fn test_select_distinct_with_order() {
    let query = employees()
        .distinct()
        .order_by(SortSpecification::desc(col("e", "name")))
        .order_by(SortSpecification::asc(col("e", "id")).nulls(NullPrecedence::First));
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT DISTINCT e.id, e.name FROM employee e ORDER BY e.name DESC, e.id NULLS FIRST"
    );
}

#[test]
fn test_select_with_joins() {
    let from = table("employee", "e").join(
        JoinType::Left,
        table("department", "d"),
        eq(col("e", "dept_id"), col("d", "id")),
    );
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "name"), col("d", "name")])
        .from(from);
    let op = translate(Dialect::Postgres, &Statement::from(QueryPart::from(query)));
    assert_eq!(
        op.sql(),
        "SELECT e.name, d.name FROM employee e LEFT JOIN department d ON e.dept_id = d.id"
    );
    let tables: Vec<&str> = op.affected_table_names().iter().map(String::as_str).collect();
    assert_eq!(tables, vec!["department", "employee"]);
}

#[test]
fn test_reference_join_is_parenthesized_inside_group_join() {
    let department = table("department", "d").join_reference(
        JoinType::Inner,
        TableReference::named("location", Some("l")),
        eq(col("d", "location_id"), col("l", "id")),
    );
    let from = table("employee", "e").join(
        JoinType::Left,
        department,
        eq(col("e", "dept_id"), col("d", "id")),
    );
    let query = QuerySpec::new().root().select(vec![col("l", "city")]).from(from);
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT l.city FROM employee e LEFT JOIN (department d JOIN location l ON d.location_id = l.id) ON e.dept_id = d.id"
    );
}

#[test]
fn test_virtual_and_unresolved_lazy_groups() {
    let mut from = table("employee", "e");
    from.group_joins.push(TableGroupJoin {
        join_type: JoinType::Left,
        group: TableGroup::Lazy(LazyTableGroup {
            source_alias: Some("m".into()),
            resolved: None,
        }),
        predicate: Some(eq(col("e", "manager_id"), col("m", "id"))),
    });
    from.group_joins.push(TableGroupJoin {
        join_type: JoinType::Inner,
        group: TableGroup::Virtual(VirtualTableGroup {
            source_alias: Some("v".into()),
            group_joins: vec![TableGroupJoin {
                join_type: JoinType::Inner,
                group: table("department", "d").into(),
                predicate: Some(eq(col("e", "dept_id"), col("d", "id"))),
            }],
        }),
        predicate: None,
    });
    let query = QuerySpec::new().root().select(vec![col("d", "name")]).from(from);
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT d.name FROM employee e JOIN department d ON e.dept_id = d.id"
    );
}

#[test]
fn test_group_by_having() {
    let count = || aggregate("count", vec![Expression::Star(None)]);
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "dept"), count()])
        .from(table("employee", "e"))
        .group_by(vec![Expression::SelectionRef(0)])
        .having(gt(count(), lit(5)));
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT e.dept, count(*) FROM employee e GROUP BY 1 HAVING count(*) > 5"
    );
}

#[test]
fn test_group_by_reference_without_ordinals() {
    let caps = crate::transpiler::Capabilities::from_toml_str(
        r#"
        base = "postgres"
        supports_ordinal_select_item_reference = false
        "#,
    )
    .unwrap();
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "dept"), aggregate("count", vec![Expression::Star(None)])])
        .from(table("employee", "e"))
        .group_by(vec![Expression::SelectionRef(0)])
        .order_by(SortSpecification::asc(Expression::SelectionRef(0)));
    let statement = Statement::from(QueryPart::from(query));
    let operation = SqlAstTranslator::new(caps)
        .translate(&statement, &QueryOptions::default(), None)
        .unwrap();
    assert_eq!(
        operation.sql(),
        "SELECT e.dept, count(*) FROM employee e GROUP BY e.dept ORDER BY e.dept"
    );
}

#[test]
fn test_rollup() {
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "dept"), aggregate("sum", vec![col("e", "salary")])])
        .from(table("employee", "e"))
        .group_by(vec![Expression::Summarization {
            kind: SummarizationKind::Rollup,
            groupings: vec![col("e", "dept")],
        }]);
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT e.dept, sum(e.salary) FROM employee e GROUP BY ROLLUP (e.dept)"
    );
}

#[test]
fn test_exists_and_scalar_subqueries() {
    let projects = QuerySpec::new()
        .select(vec![lit(1)])
        .from(table("project", "p"))
        .filter(eq(col("p", "lead_id"), col("e", "id")));
    let headcount = QuerySpec::new()
        .select(vec![aggregate("count", vec![Expression::Star(None)])])
        .from(table("employee", "x"));
    let query = QuerySpec::new()
        .root()
        .select(vec![col("e", "id"), subquery(headcount)])
        .from(table("employee", "e"))
        .filter(Predicate::Exists {
            query: Box::new(projects.into()),
            negated: false,
        });
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT e.id, (SELECT count(*) FROM employee x) FROM employee e WHERE EXISTS (SELECT 1 FROM project p WHERE p.lead_id = e.id)"
    );
}

#[test]
fn test_union_with_order_by() {
    let contractors = QuerySpec::new()
        .select(vec![col("c", "id"), col("c", "name")])
        .from(table("contractor", "c"));
    let mut members = employees();
    members.root = false;
    let group = QueryGroup::new(SetOperator::UnionAll, vec![members.into(), contractors.into()])
        .root()
        .order_by(SortSpecification::asc(Expression::SelectionRef(1)));
    assert_eq!(
        sql(Dialect::Postgres, group),
        "SELECT e.id, e.name FROM employee e UNION ALL SELECT c.id, c.name FROM contractor c ORDER BY 2"
    );
}

#[test]
fn test_ordered_group_member_is_parenthesized() {
    let mut first = employees().order_by(SortSpecification::asc(col("e", "id"))).fetch(lit(1));
    first.root = false;
    let contractors = QuerySpec::new()
        .select(vec![col("c", "id"), col("c", "name")])
        .from(table("contractor", "c"));
    let group = QueryGroup::new(SetOperator::Union, vec![first.into(), contractors.into()]).root();
    assert_eq!(
        sql(Dialect::Postgres, group),
        "(SELECT e.id, e.name FROM employee e ORDER BY e.id LIMIT 1) UNION SELECT c.id, c.name FROM contractor c"
    );
}

#[test]
fn test_derived_table() {
    let inner = QuerySpec::new()
        .select(vec![col("x", "id")])
        .from(table("employee", "x"));
    let derived = StandardTableGroup::new(TableReference::Derived {
        query: Box::new(inner.into()),
        alias: "d".into(),
    });
    let query = QuerySpec::new().root().select(vec![col("d", "id")]).from(derived);
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT d.id FROM (SELECT x.id FROM employee x) d"
    );
}

#[test]
fn test_select_without_from() {
    let query = QuerySpec::new().root().select(vec![lit(1)]);
    assert_eq!(sql(Dialect::Postgres, query.clone()), "SELECT 1");
    assert_eq!(sql(Dialect::Oracle, query), "SELECT 1 FROM dual");
}

#[test]
fn test_empty_in_list_is_constant() {
    let query = employees().filter(in_list(col("e", "id"), vec![]));
    assert_eq!(
        sql(Dialect::Postgres, query),
        "SELECT e.id, e.name FROM employee e WHERE FALSE"
    );
}

#[test]
fn test_insert_values() {
    let insert = Statement::Insert(InsertStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", None),
        columns: vec![
            ColumnReference::new(None, "name"),
            ColumnReference::new(None, "salary"),
        ],
        source: InsertSource::Values(vec![
            vec![param(1, SqlType::Varchar), param(2, SqlType::Numeric)],
            vec![lit("Ada"), lit(1200)],
        ]),
        returning: vec![ColumnReference::new(None, "id")],
    });
    let op = translate(Dialect::Postgres, &insert);
    assert_eq!(
        op.sql(),
        "INSERT INTO employee (name, salary) VALUES ($1, $2), ('Ada', 1200) RETURNING id"
    );
    assert!(op.as_select().is_none());
    assert!(op.affected_table_names().contains("employee"));
}

#[test]
fn test_insert_select() {
    let insert = Statement::Insert(InsertStatement {
        with: CteClause::default(),
        target: TableReference::named("archive", None),
        columns: vec![
            ColumnReference::new(None, "id"),
            ColumnReference::new(None, "name"),
        ],
        source: InsertSource::Select(Box::new(employees().into())),
        returning: vec![],
    });
    assert_eq!(
        translate(Dialect::Postgres, &insert).sql(),
        "INSERT INTO archive (id, name) SELECT e.id, e.name FROM employee e"
    );
}

#[test]
fn test_insert_row_arity_mismatch() {
    let insert = Statement::Insert(InsertStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", None),
        columns: vec![ColumnReference::new(None, "name")],
        source: InsertSource::Values(vec![vec![lit("Ada"), lit(1)]]),
        returning: vec![],
    });
    let err = insert.to_sql().unwrap_err();
    assert!(matches!(err, TranslateError::MalformedTree(_)));
}

#[test]
fn test_update_renders_target_columns_unqualified() {
    let update = Statement::Update(UpdateStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", Some("e")),
        assignments: vec![Assignment {
            columns: vec![ColumnReference::new(Some("e"), "salary")],
            value: binary(col("e", "salary"), BinaryOperator::Multiply, lit(2)),
        }],
        restriction: Some(eq(col("e", "id"), param(1, SqlType::BigInt))),
        returning: vec![],
    });
    assert_eq!(
        update.to_sql().unwrap(),
        "UPDATE employee SET salary = salary * 2 WHERE id = $1"
    );
}

#[test]
fn test_update_row_value_assignment() {
    let update = Statement::Update(UpdateStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", Some("e")),
        assignments: vec![Assignment {
            columns: vec![
                ColumnReference::new(Some("e"), "name"),
                ColumnReference::new(Some("e"), "salary"),
            ],
            value: tuple(vec![param(1, SqlType::Varchar), param(2, SqlType::Numeric)]),
        }],
        restriction: Some(eq(col("e", "id"), param(3, SqlType::BigInt))),
        returning: vec![],
    });
    assert_eq!(
        update.to_sql_with_dialect(Dialect::Postgres).unwrap(),
        "UPDATE employee SET (name, salary) = ($1, $2) WHERE id = $3"
    );
    assert_eq!(
        update.to_sql_with_dialect(Dialect::SqlServer).unwrap(),
        "UPDATE employee SET name = @p1, salary = @p2 WHERE id = @p3"
    );
}

#[test]
fn test_update_row_value_from_subquery_needs_row_values() {
    let source = QuerySpec::new()
        .select(vec![col("x", "name"), col("x", "salary")])
        .from(table("template", "x"));
    let update = Statement::Update(UpdateStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", None),
        assignments: vec![Assignment {
            columns: vec![
                ColumnReference::new(None, "name"),
                ColumnReference::new(None, "salary"),
            ],
            value: subquery(source),
        }],
        restriction: None,
        returning: vec![],
    });
    assert_eq!(
        update.to_sql_with_dialect(Dialect::Postgres).unwrap(),
        "UPDATE employee SET (name, salary) = (SELECT x.name, x.salary FROM template x)"
    );
    let err = update.to_sql_with_dialect(Dialect::SqlServer).unwrap_err();
    assert!(matches!(err, TranslateError::Unsupported(_)));
}

#[test]
fn test_update_without_assignments_is_malformed() {
    let update = Statement::Update(UpdateStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", None),
        assignments: vec![],
        restriction: None,
        returning: vec![],
    });
    assert!(matches!(
        update.to_sql().unwrap_err(),
        TranslateError::MalformedTree(_)
    ));
}

#[test]
fn test_delete_with_returning() {
    let delete = Statement::Delete(DeleteStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", Some("e")),
        restriction: Some(eq(col("e", "id"), param(1, SqlType::BigInt))),
        returning: vec![ColumnReference::new(Some("e"), "id")],
    });
    assert_eq!(
        delete.to_sql().unwrap(),
        "DELETE FROM employee WHERE id = $1 RETURNING id"
    );
    assert!(matches!(
        delete.to_sql_with_dialect(Dialect::SqlServer).unwrap_err(),
        TranslateError::Unsupported(_)
    ));
}

#[test]
fn test_delete_from_derived_table_is_malformed() {
    let delete = Statement::Delete(DeleteStatement {
        with: CteClause::default(),
        target: TableReference::Derived {
            query: Box::new(employees().into()),
            alias: "d".into(),
        },
        restriction: None,
        returning: vec![],
    });
    assert!(matches!(
        delete.to_sql().unwrap_err(),
        TranslateError::MalformedTree(_)
    ));
}

#[test]
fn test_recursive_cte() {
    let statement = select_from_tree(CteClause {
        recursive: true,
        ctes: vec![tree_cte()],
    });
    assert_eq!(
        statement.to_sql_with_dialect(Dialect::Postgres).unwrap(),
        "WITH RECURSIVE tree (id) AS (SELECT n.id FROM node n) SELECT id FROM tree"
    );
    assert_eq!(
        statement.to_sql_with_dialect(Dialect::SqlServer).unwrap(),
        "WITH tree (id) AS (SELECT n.id FROM node n) SELECT id FROM tree"
    );
}

#[test]
fn test_cte_materialization_search_and_cycle() {
    let mut cte = tree_cte();
    cte.materialization = Some(CteMaterialization::NotMaterialized);
    cte.search = Some(CteSearchClause {
        kind: CteSearchKind::BreadthFirst,
        by: vec![CteSearchItem {
            column: "id".into(),
            order: Some(SortOrder::Desc),
            nulls: NullPrecedence::Last,
        }],
        set_column: "ord".into(),
    });
    cte.cycle = Some(CteCycleClause {
        columns: vec!["id".into()],
        mark_column: "is_cycle".into(),
        cycle_value: Value::Bool(true),
        non_cycle_value: Value::Bool(false),
        path_column: Some("path".into()),
    });
    let statement = select_from_tree(CteClause {
        recursive: true,
        ctes: vec![cte],
    });
    assert_eq!(
        statement.to_sql().unwrap(),
        "WITH RECURSIVE tree (id) AS NOT MATERIALIZED (SELECT n.id FROM node n) \
         SEARCH BREADTH FIRST BY id DESC NULLS LAST SET ord \
         CYCLE id SET is_cycle TO TRUE DEFAULT FALSE USING path \
         SELECT id FROM tree"
    );
    let err = statement.to_sql_with_dialect(Dialect::MySQL).unwrap_err();
    assert!(matches!(err, TranslateError::Unsupported(_)));
}

#[test]
fn test_translation_is_idempotent_and_reusable() {
    let translator = SqlAstTranslator::for_dialect(Dialect::SqlServer);
    let options = QueryOptions::default();
    let query = Statement::from(QueryPart::from(
        employees()
            .filter(gt(
                tuple(vec![col("e", "dept"), col("e", "id")]),
                tuple(vec![param(1, SqlType::Integer), param(2, SqlType::Integer)]),
            ))
            .order_by(SortSpecification::asc(col("e", "id")))
            .offset(lit(10))
            .fetch(lit(5)),
    ));
    let broken = Statement::Delete(DeleteStatement {
        with: CteClause::default(),
        target: TableReference::named("employee", None),
        restriction: None,
        returning: vec![ColumnReference::new(None, "id")],
    });

    let first = translator.translate(&query, &options, None).unwrap();
    assert!(translator.translate(&broken, &options, None).is_err());
    let second = translator.translate(&query, &options, None).unwrap();
    assert_eq!(first.sql(), second.sql());
    assert_eq!(first.parameter_binders(), second.parameter_binders());
}
