use pgbulk::{driver::Response, Column, Table, Type, Value, Values};
use pretty_assertions::assert_eq;
use tests::{fixtures, DbTest};

#[tokio::test]
async fn inserts_every_record() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    test.log().respond(Ok(Response::count(2)));

    let outcome = test
        .db
        .bulk_create(&table, Values::records([[("name", "a")], [("name", "b")]]))
        .exec()
        .await
        .unwrap();
    assert_eq!(outcome.count(), 2);

    let query = test.log().pop_query();
    assert_eq!(
        query.sql,
        r#"WITH "vals"("upd__name") AS (VALUES (CAST($1 AS text)), ($2)) INSERT INTO "counters" ("name") SELECT "vals"."upd__name" FROM "vals""#
    );
    assert_eq!(query.params, [Value::from("a"), Value::from("b")]);
}

#[tokio::test]
async fn constant_defaults_are_sent_once() {
    let mut test = DbTest::new();
    let table = Table::new("flags")
        .column(Column::new("id", Type::Integer).primary_key().auto_increment())
        .column(Column::new("name", Type::Text).nullable())
        .column(Column::new("flag", Type::Boolean).default(false));

    test.db
        .bulk_create(&table, Values::records([[("name", "a")]]))
        .exec()
        .await
        .unwrap();

    let query = test.log().pop_query();
    assert_eq!(
        query.sql,
        r#"WITH "vals"("upd__name") AS (VALUES (CAST($1 AS text))), "default_vals"("def__flag") AS (VALUES (CAST($2 AS boolean))) INSERT INTO "flags" ("name", "flag") SELECT "vals"."upd__name", "default_vals"."def__flag" FROM "vals" CROSS JOIN "default_vals""#
    );
    assert_eq!(query.params, [Value::from("a"), Value::Bool(false)]);
}

#[tokio::test]
async fn returning_created_ids() {
    let mut test = DbTest::new();
    let table = fixtures::counters();
    test.log().respond(Ok(Response::values(vec![
        vec![Value::I32(7)],
        vec![Value::I32(8)],
    ])));

    let outcome = test
        .db
        .bulk_create(&table, Values::records([[("name", "a")], [("name", "b")]]))
        .returning("id")
        .exec()
        .await
        .unwrap();

    let rows = outcome.into_rows().unwrap();
    assert_eq!(rows.to_json(), serde_json::json!([{"id": 7}, {"id": 8}]));

    let query = test.log().pop_query();
    assert!(query.sql.ends_with(r#" RETURNING "counters"."id""#));
}

#[tokio::test]
async fn batches_split_records() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    test.db
        .bulk_create(
            &table,
            Values::records([[("name", "a")], [("name", "b")], [("name", "c")]]),
        )
        .batch_size(2)
        .exec()
        .await
        .unwrap();

    assert_eq!(test.log().statements(), 2);
    assert_eq!(test.log().pop_query().params.len(), 2);
    assert_eq!(test.log().pop_query().params, [Value::from("c")]);
}

#[tokio::test]
async fn keyed_values_are_rejected() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    let err = test
        .db
        .bulk_create(&table, Values::keyed([(1, [("name", "a")])]))
        .exec()
        .await
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn empty_records_send_nothing() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    let outcome = test
        .db
        .bulk_create(&table, Values::Records(vec![]))
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 0);
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn empty_records_with_returning_give_no_rows() {
    let mut test = DbTest::new();
    let table = fixtures::counters();

    let outcome = test
        .db
        .bulk_create(&table, Values::Records(vec![]))
        .returning(["id", "name"])
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 0);
    let rows = outcome.into_rows().unwrap();
    assert!(rows.is_empty());
    assert_eq!(rows.fields(), ["id", "name"]);
    assert!(test.log().is_empty());
}
