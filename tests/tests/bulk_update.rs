use pgbulk::{
    driver::{Capability, Response},
    Error, Expr, Value, Values,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use tests::{fixtures, DbTest, LoggingDriver};

#[tokio::test]
async fn increment_joins_values_list() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    test.log().respond(Ok(Response::count(2)));

    let outcome = test
        .db
        .bulk_update(&table, Values::keyed([(1, [("counter", 10)]), (2, [("counter", 5)])]))
        .combine("counter", "incr")
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 2);
    assert!(outcome.rows().is_none());

    let query = test.log().pop_query();
    assert_eq!(
        query.sql,
        r#"WITH "vals"("key_0__id", "upd__counter") AS (VALUES (CAST($1 AS integer), CAST($2 AS integer)), ($3, $4)) UPDATE "counters" AS "t" SET "counter" = COALESCE("t"."counter", CAST($5 AS integer)) + "vals"."upd__counter" FROM "vals" WHERE "t"."id" = "vals"."key_0__id""#
    );
    assert_eq!(
        query.params,
        [Value::I32(1), Value::I32(10), Value::I32(2), Value::I32(5), Value::I32(0)]
    );
    assert!(query.ret.is_none());
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn records_carry_their_key() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.db
        .bulk_update(
            &table,
            Values::records([
                vec![("id", Expr::from(1)), ("name", Expr::from("a"))],
                vec![("id", Expr::from(2)), ("name", Expr::from("b"))],
            ]),
        )
        .exec()
        .await
        .unwrap();

    let query = test.log().pop_query();
    assert_eq!(
        query.sql,
        r#"WITH "vals"("key_0__id", "upd__name") AS (VALUES (CAST($1 AS integer), CAST($2 AS text)), ($3, $4)) UPDATE "counters" AS "t" SET "name" = "vals"."upd__name" FROM "vals" WHERE "t"."id" = "vals"."key_0__id""#
    );
    assert_eq!(
        query.params,
        [Value::I32(1), Value::from("a"), Value::I32(2), Value::from("b")]
    );
}

#[tokio::test]
async fn filter_narrows_updated_rows() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.db
        .bulk_update(&table, Values::keyed([(1, [("name", "a")])]))
        .filter(Expr::ne(Expr::col("name"), "locked"))
        .exec()
        .await
        .unwrap();

    let query = test.log().pop_query();
    assert_eq!(
        query.sql,
        r#"WITH "vals"("key_0__id", "upd__name") AS (VALUES (CAST($1 AS integer), CAST($2 AS text))) UPDATE "counters" AS "t" SET "name" = "vals"."upd__name" FROM "vals" WHERE "t"."id" = "vals"."key_0__id" AND ("t"."name" != $3)"#
    );
    assert_eq!(query.params[2], Value::from("locked"));
}

#[tokio::test]
async fn filter_on_another_table_is_rejected() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    let err = test
        .db
        .bulk_update(&table, Values::keyed([(1, [("name", "a")])]))
        .filter(Expr::eq(Expr::table_col("accounts", "name"), "a"))
        .exec()
        .await
        .unwrap_err();

    assert!(err.is_invalid_filter());
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn between_operand_is_indexed_from_one() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.db
        .bulk_update(&table, Values::keyed([(Value::from(vec![2, 5]), [("name", "mid")])]))
        .key_fields("counter")
        .key_ops(["between"])
        .exec()
        .await
        .unwrap();

    let query = test.log().pop_query();
    assert!(
        query.sql.ends_with(
            r#"WHERE "t"."counter" BETWEEN "vals"."key_0__counter"[1] AND "vals"."key_0__counter"[2]"#
        ),
        "{}",
        query.sql
    );
    assert_eq!(query.params[0], Value::List(vec![Value::I32(2), Value::I32(5)]));
}

#[tokio::test]
async fn returning_collects_rows_across_batches() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    test.log()
        .respond(Ok(Response::values(vec![vec![Value::I32(1), Value::from("a")]])));
    test.log()
        .respond(Ok(Response::values(vec![vec![Value::I32(2), Value::from("b")]])));

    let outcome = test
        .db
        .bulk_update(&table, Values::keyed([(1, [("name", "a")]), (2, [("name", "b")])]))
        .returning(["id", "name"])
        .batch_size(1)
        .exec()
        .await
        .unwrap();

    let rows = outcome.rows().unwrap();
    assert_eq!(rows.fields(), ["id", "name"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(outcome.count(), 2);
    assert_eq!(
        rows.column("name").unwrap(),
        [&Value::from("a"), &Value::from("b")]
    );

    let query = test.log().pop_query();
    assert!(query.sql.ends_with(r#" RETURNING "t"."id", "t"."name""#));
    assert!(query.ret.is_some());
}

#[tokio::test]
async fn batches_run_in_order_with_a_pause_between() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    let delay = Duration::from_millis(20);

    let start = Instant::now();
    test.db
        .bulk_update(
            &table,
            Values::keyed([(1, [("name", "a")]), (2, [("name", "b")]), (3, [("name", "c")])]),
        )
        .batch_size(2)
        .batch_delay(delay)
        .exec()
        .await
        .unwrap();

    assert!(start.elapsed() >= delay);
    assert_eq!(test.log().statements(), 2);

    let first = test.log().pop_query();
    assert_eq!(first.params[0], Value::I32(1));
    assert_eq!(first.params.len(), 4);

    let second = test.log().pop_query();
    assert_eq!(second.params, [Value::I32(3), Value::from("c")]);
}

#[tokio::test]
async fn batch_size_only_splits_statements() {
    let names = ["a", "b", "c", "d", "e"];
    let expected: Vec<Value> = (1..=5)
        .zip(names)
        .flat_map(|(id, name)| [Value::I32(id), Value::from(name)])
        .collect();

    for (size, statements) in [(1, 5), (5, 1), (15, 1)] {
        let mut test = DbTest::new();
        let table = fixtures::counters();

        test.db
            .bulk_update(
                &table,
                Values::keyed((1..=5).zip(names).map(|(id, name)| (id, [("name", name)]))),
            )
            .batch_size(size)
            .exec()
            .await
            .unwrap();

        assert_eq!(test.log().statements(), statements, "batch_size = {size}");

        let mut params = vec![];
        while !test.log().is_empty() {
            params.extend(test.log().pop_query().params);
        }
        assert_eq!(params, expected, "batch_size = {size}");
    }
}

#[tokio::test]
async fn empty_values_send_nothing() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    let outcome = test
        .db
        .bulk_update(&table, Values::Keyed(vec![]))
        .exec()
        .await
        .unwrap();
    assert_eq!(outcome.count(), 0);

    let outcome = test
        .db
        .bulk_update(&table, Values::Keyed(vec![]))
        .returning("id")
        .exec()
        .await
        .unwrap();
    assert!(outcome.rows().unwrap().is_empty());

    assert!(test.log().is_empty());
}

#[tokio::test]
async fn records_without_fields_count_without_sql() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    let outcome = test
        .db
        .bulk_update(
            &table,
            Values::keyed([(1, Vec::<(&str, i32)>::new()), (2, Vec::new())]),
        )
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 2);
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn invalid_arguments_fail_before_sql() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    let values = || Values::keyed([(1, [("name", "a")])]);

    let err = test
        .db
        .bulk_update(&table, values())
        .using("replica")
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_precondition());

    let err = test
        .db
        .bulk_update(&table, values())
        .batch_size(0)
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let err = test
        .db
        .bulk_update(&table, values())
        .combine("name", "incr")
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_unsupported_field());

    let err = test
        .db
        .bulk_update(&table, values())
        .combine("name", "no_such_function")
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_unknown_name());

    let err = test
        .db
        .bulk_update(&table, values())
        .key_fields("missing")
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert!(test.log().is_empty());
}

#[tokio::test]
async fn returning_requires_capability() {
    let driver = LoggingDriver::scripted().with_capability(Capability {
        returning: false,
        ..Capability::POSTGRESQL
    });
    let mut test = DbTest::with_driver(driver);
    let table = fixtures::counters();

    let err = test
        .db
        .bulk_update(&table, Values::keyed([(1, [("name", "a")])]))
        .returning("id")
        .exec()
        .await
        .unwrap_err();

    assert!(err.is_precondition());
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn driver_errors_propagate() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    test.log()
        .respond(Err(Error::invalid_result("connection reset")));

    let err = test
        .db
        .bulk_update(&table, Values::keyed([(1, [("name", "a")])]))
        .exec()
        .await
        .unwrap_err();

    assert!(err.is_invalid_result());
    assert_eq!(test.log().statements(), 1);
}
