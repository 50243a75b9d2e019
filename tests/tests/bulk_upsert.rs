use pgbulk::{
    driver::{operation::Transaction, Response, ServerVersion},
    Error, Expr, Value, Values,
};
use pretty_assertions::assert_eq;
use tests::{fixtures, DbTest, LoggingDriver};

#[tokio::test]
async fn single_statement_on_conflict() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    test.log().respond(Ok(Response::count(1)));

    let outcome = test
        .db
        .bulk_upsert(&table, Values::keyed([(3, [("name", "c")])]))
        .exec()
        .await
        .unwrap();
    assert_eq!(outcome.count(), 1);

    let query = test.log().pop_query();
    assert_eq!(
        query.sql,
        r#"WITH "vals"("key_0__id", "upd__name") AS (VALUES (CAST($1 AS integer), CAST($2 AS text))) INSERT INTO "counters" ("id", "name") SELECT "vals"."key_0__id", "vals"."upd__name" FROM "vals" ON CONFLICT ("id") DO UPDATE SET ("name") = (SELECT "vals"."upd__name" FROM "vals" WHERE ("vals"."key_0__id") = (EXCLUDED."id"))"#
    );
    assert_eq!(query.params, [Value::I32(3), Value::from("c")]);
    assert!(test.log().transactions().is_empty());
}

#[tokio::test]
async fn skipping_existing_rows_does_nothing_on_conflict() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.db
        .bulk_upsert(&table, Values::keyed([(3, [("name", "c")])]))
        .update(false)
        .returning("id")
        .exec()
        .await
        .unwrap();

    let query = test.log().pop_query();
    assert!(
        query
            .sql
            .ends_with(r#"ON CONFLICT ("id") DO NOTHING RETURNING "counters"."id""#),
        "{}",
        query.sql
    );
}

#[tokio::test]
async fn old_server_falls_back_to_locking() {
    let driver = LoggingDriver::scripted().with_version(ServerVersion::new(9, 4, 26));
    let mut test = DbTest::with_driver(driver);
    let table = fixtures::counters();

    // BEGIN, then the lock finds key 1 already stored
    test.log().respond(Ok(Response::count(0)));
    test.log()
        .respond(Ok(Response::values(vec![vec![Value::I32(1)]])));
    test.log().respond(Ok(Response::count(1)));

    let outcome = test
        .db
        .bulk_upsert(&table, Values::keyed([(1, [("name", "a")]), (2, [("name", "b")])]))
        .exec()
        .await
        .unwrap();
    assert_eq!(outcome.count(), 2);

    assert_eq!(test.log().pop_transaction(), Transaction::Start);

    let select = test.log().pop_query();
    assert_eq!(
        select.sql,
        r#"SELECT "t"."id" FROM "counters" AS "t" WHERE "t"."id" = $1 OR "t"."id" = $2 FOR UPDATE"#
    );
    assert_eq!(select.params, [Value::I32(1), Value::I32(2)]);

    let update = test.log().pop_query();
    assert_eq!(
        update.sql,
        r#"WITH "vals"("key_0__id", "upd__name") AS (VALUES (CAST($1 AS integer), CAST($2 AS text))) UPDATE "counters" AS "t" SET "name" = "vals"."upd__name" FROM "vals" WHERE "t"."id" = "vals"."key_0__id""#
    );
    assert_eq!(update.params, [Value::I32(1), Value::from("a")]);

    let insert = test.log().pop_insert();
    assert_eq!(insert.columns, ["id", "name"]);
    assert_eq!(
        insert.rows,
        [vec![Expr::Value(Value::I32(2)), Expr::Value(Value::from("b"))]]
    );

    assert_eq!(test.log().pop_transaction(), Transaction::Commit);
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn non_unique_key_falls_back_to_locking() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.db
        .bulk_upsert(&table, Values::keyed([("a", [("counter", 5)])]))
        .key_fields("name")
        .key_is_unique(false)
        .exec()
        .await
        .unwrap();

    assert_eq!(
        test.log().transactions(),
        [Transaction::Start, Transaction::Commit]
    );
    assert!(test.log().has_insert());

    // Nothing was locked, so every record is created
    test.log().pop_transaction();
    let select = test.log().pop_query();
    assert_eq!(
        select.sql,
        r#"SELECT "t"."name" FROM "counters" AS "t" WHERE "t"."name" = $1 FOR UPDATE"#
    );
    let insert = test.log().pop_insert();
    assert_eq!(insert.columns, ["name", "counter"]);
    assert_eq!(
        insert.rows,
        [vec![Expr::Value(Value::from("a")), Expr::Value(Value::I32(5))]]
    );
}

#[tokio::test]
async fn no_update_leaves_locked_rows_alone() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.log().respond(Ok(Response::count(0)));
    test.log()
        .respond(Ok(Response::values(vec![vec![Value::I32(1)]])));

    let outcome = test
        .db
        .bulk_upsert(&table, Values::keyed([(1, [("name", "a")])]))
        .key_is_unique(false)
        .update(false)
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 0);
    assert_eq!(test.log().statements(), 1);
    assert!(!test.log().has_insert());
    assert_eq!(
        test.log().transactions(),
        [Transaction::Start, Transaction::Commit]
    );
}

#[tokio::test]
async fn failure_rolls_back() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.log().respond(Ok(Response::count(0)));
    test.log()
        .respond(Err(Error::invalid_result("lock timeout")));

    let err = test
        .db
        .bulk_upsert(&table, Values::keyed([(1, [("name", "a")])]))
        .key_is_unique(false)
        .exec()
        .await
        .unwrap_err();

    assert!(err.is_invalid_result());
    assert_eq!(
        test.log().transactions(),
        [Transaction::Start, Transaction::Rollback]
    );
    assert!(!test.log().has_insert());
}

#[tokio::test]
async fn every_batch_gets_its_own_transaction() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.db
        .bulk_upsert(
            &table,
            Values::keyed([(1, [("name", "a")]), (2, [("name", "b")]), (3, [("name", "c")])]),
        )
        .key_is_unique(false)
        .batch_size(2)
        .exec()
        .await
        .unwrap();

    assert_eq!(
        test.log().transactions(),
        [
            Transaction::Start,
            Transaction::Commit,
            Transaction::Start,
            Transaction::Commit
        ]
    );
}

#[tokio::test]
async fn fallback_returns_rows_of_both_partitions() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.log().respond(Ok(Response::count(0)));
    test.log()
        .respond(Ok(Response::values(vec![vec![Value::I32(1)]])));
    test.log()
        .respond(Ok(Response::values(vec![vec![Value::I32(1)]])));
    test.log()
        .respond(Ok(Response::values(vec![vec![Value::I32(2)]])));

    let outcome = test
        .db
        .bulk_upsert(&table, Values::keyed([(1, [("name", "a")]), (2, [("name", "b")])]))
        .key_is_unique(false)
        .returning("id")
        .exec()
        .await
        .unwrap();

    let ids = outcome.rows().unwrap().column("id").unwrap();
    assert_eq!(ids, [&Value::I32(1), &Value::I32(2)]);

    test.log().pop_transaction();
    test.log().pop_query();
    test.log().pop_query();
    let insert = test.log().pop_insert();
    assert_eq!(insert.returning, Some(vec!["id".to_string()]));
}
