#![cfg(feature = "postgresql")]

use pgbulk::{Column, Expr, Table, Type, Value, ValueRange, Values};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use tests::{fixtures, postgresql::SetupPostgreSQL};
use tokio_postgres::types::ToSql;

type Row = (i32, Option<String>, Option<i32>);

async fn counters(setup: &SetupPostgreSQL, name: &str, rows: &[Row]) -> Table {
    let name = setup.table_name(name);
    setup.execute(&fixtures::counters_ddl(&name)).await.unwrap();

    for (id, label, counter) in rows {
        let params: [&(dyn ToSql + Sync); 3] = [id, label, counter];
        setup
            .client()
            .execute(
                &format!(r#"INSERT INTO "{name}" ("id", "name", "counter") VALUES ($1, $2, $3)"#),
                &params,
            )
            .await
            .unwrap();
    }

    fixtures::counters_named(&name)
}

async fn rows(setup: &SetupPostgreSQL, table: &Table) -> Vec<Row> {
    setup
        .client()
        .query(
            &format!(r#"SELECT "id", "name", "counter" FROM "{}" ORDER BY "id""#, table.name),
            &[],
        )
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.get(0), row.get(1), row.get(2)))
        .collect()
}

fn row(id: i32, name: Option<&str>, counter: Option<i32>) -> Row {
    (id, name.map(str::to_string), counter)
}

#[tokio::test]
async fn increment_existing_rows() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let table = counters(
        &setup,
        "counters",
        &[row(1, Some("a"), Some(1)), row(2, Some("b"), Some(2))],
    )
    .await;

    let outcome = test
        .db
        .bulk_update(&table, Values::keyed([(1, [("counter", 10)])]))
        .combine("counter", "incr")
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 1);
    assert_eq!(
        rows(&setup, &table).await,
        [row(1, Some("a"), Some(11)), row(2, Some("b"), Some(2))]
    );

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn upsert_creates_missing_row() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let table = counters(&setup, "counters", &[row(1, Some("a"), Some(1))]).await;

    let outcome = test
        .db
        .bulk_upsert(&table, Values::keyed([(3, [("name", Expr::from("c")), ("counter", Expr::from(1))])]))
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 1);
    assert_eq!(
        rows(&setup, &table).await,
        [row(1, Some("a"), Some(1)), row(3, Some("c"), Some(1))]
    );

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn locking_upsert_matches_on_conflict() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let mut test = setup.connect().await.unwrap();
    let initial = [row(1, Some("a"), Some(1)), row(2, Some("b"), Some(2))];
    let locking = counters(&setup, "locking", &initial).await;
    let on_conflict = counters(&setup, "on_conflict", &initial).await;

    let values = || {
        Values::keyed([
            (1, [("name", Expr::from("a2")), ("counter", Expr::from(5))]),
            (4, [("name", Expr::from("d")), ("counter", Expr::from(4))]),
        ])
    };

    test.db
        .bulk_upsert(&locking, values())
        .combine("counter", "incr")
        .key_is_unique(false)
        .exec()
        .await
        .unwrap();
    assert!(test.log().has_insert());
    test.log().clear();

    test.db
        .bulk_upsert(&on_conflict, values())
        .combine("counter", "incr")
        .exec()
        .await
        .unwrap();
    assert!(test.log().transactions().is_empty());

    let expected = [
        row(1, Some("a2"), Some(6)),
        row(2, Some("b"), Some(2)),
        row(4, Some("d"), Some(4)),
    ];
    assert_eq!(rows(&setup, &locking).await, expected);
    assert_eq!(rows(&setup, &on_conflict).await, expected);

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn concat_onto_null_text() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let table = counters(&setup, "counters", &[row(1, None, Some(0))]).await;

    test.db
        .bulk_update(&table, Values::keyed([(1, [("name", "x")])]))
        .combine("name", "concat")
        .exec()
        .await
        .unwrap();

    assert_eq!(rows(&setup, &table).await, [row(1, Some("x"), Some(0))]);

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn between_bounds_are_inclusive() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let table = counters(
        &setup,
        "counters",
        &[
            row(1, Some("a"), Some(1)),
            row(2, Some("b"), Some(2)),
            row(3, Some("c"), Some(5)),
            row(4, Some("d"), Some(6)),
        ],
    )
    .await;

    let outcome = test
        .db
        .bulk_update(&table, Values::keyed([(Value::from(vec![2, 5]), [("counter", 100)])]))
        .key_fields("counter")
        .key_ops(["between"])
        .exec()
        .await
        .unwrap();

    assert_eq!(outcome.count(), 2);
    assert_eq!(
        rows(&setup, &table).await,
        [
            row(1, Some("a"), Some(1)),
            row(2, Some("b"), Some(100)),
            row(3, Some("c"), Some(100)),
            row(4, Some("d"), Some(6)),
        ]
    );

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn is_null_key_only_matches_its_own_row() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let initial = [row(1, Some("a"), None), row(2, Some("b"), Some(7))];
    let table = counters(&setup, "counters", &initial).await;

    let update = |key: (i32, bool)| {
        test.db
            .bulk_update(&table, Values::keyed([(key, [("name", "x")])]))
            .key_fields(["id", "counter"])
            .key_ops(["eq", "is_null"])
    };

    let outcome = update((1, false)).exec().await.unwrap();
    assert_eq!(outcome.count(), 0);
    assert_eq!(rows(&setup, &table).await, initial);

    let filter = Expr::ne(Expr::col("name"), "locked");
    let outcome = update((1, false)).filter(filter).exec().await.unwrap();
    assert_eq!(outcome.count(), 0);
    assert_eq!(rows(&setup, &table).await, initial);

    let outcome = update((1, true)).exec().await.unwrap();
    assert_eq!(outcome.count(), 1);
    assert_eq!(
        rows(&setup, &table).await,
        [row(1, Some("x"), None), row(2, Some("b"), Some(7))]
    );

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn malformed_values_send_nothing() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let mut test = setup.connect().await.unwrap();

    let err = Values::from_json(json!(42)).unwrap_err();
    assert!(err.is_configuration());

    let table = counters(&setup, "counters", &[]).await;
    let err = test
        .db
        .bulk_update(&table, Values::keyed([(1, [("counter", "many")])]))
        .exec()
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(test.log().is_empty());

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn repeated_upsert_is_idempotent() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let table = counters(&setup, "counters", &[row(1, Some("a"), Some(1))]).await;

    let values = || {
        Values::keyed([
            (1, [("name", Expr::from("a")), ("counter", Expr::from(3))]),
            (2, [("name", Expr::from("b")), ("counter", Expr::from(4))]),
        ])
    };

    test.db.bulk_upsert(&table, values()).exec().await.unwrap();
    let once = rows(&setup, &table).await;
    test.db.bulk_upsert(&table, values()).exec().await.unwrap();

    assert_eq!(rows(&setup, &table).await, once);
    assert_eq!(
        once,
        [row(1, Some("a"), Some(3)), row(2, Some("b"), Some(4))]
    );

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn repeated_update_is_idempotent() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let table = counters(
        &setup,
        "counters",
        &[row(1, Some("a"), Some(1)), row(2, Some("b"), None)],
    )
    .await;

    let values = || {
        Values::keyed([
            (1, [("name", Expr::from("a2")), ("counter", Expr::from(3))]),
            (2, [("name", Expr::from("b2")), ("counter", Expr::null())]),
        ])
    };

    test.db.bulk_update(&table, values()).exec().await.unwrap();
    let once = rows(&setup, &table).await;
    test.db.bulk_update(&table, values()).exec().await.unwrap();

    assert_eq!(rows(&setup, &table).await, once);
    assert_eq!(once, [row(1, Some("a2"), Some(3)), row(2, Some("b2"), None)]);

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn increment_from_null_per_numeric_type() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let name = setup.table_name("measures");
    setup
        .execute(&format!(
            r#"CREATE TABLE "{name}" (
                "id" integer PRIMARY KEY,
                "small" smallint,
                "big" bigint,
                "single" real,
                "double" double precision,
                "amount" numeric
            )"#
        ))
        .await
        .unwrap();
    setup
        .execute(&format!(r#"INSERT INTO "{name}" ("id") VALUES (1)"#))
        .await
        .unwrap();

    let table = Table::new(&name)
        .column(Column::new("id", Type::Integer).primary_key())
        .column(Column::new("small", Type::SmallInt).nullable())
        .column(Column::new("big", Type::BigInt).nullable())
        .column(Column::new("single", Type::Real).nullable())
        .column(Column::new("double", Type::DoublePrecision).nullable())
        .column(Column::new("amount", Type::Numeric(None)).nullable());

    let fields = ["small", "big", "single", "double", "amount"];
    let mut update = test
        .db
        .bulk_update(&table, Values::keyed([(1, fields.map(|field| (field, 5)))]));
    for field in fields {
        update = update.combine(field, "incr");
    }
    assert_eq!(update.exec().await.unwrap().count(), 1);

    let stored = setup
        .client()
        .query_one(
            &format!(r#"SELECT "small", "big", "single", "double", "amount"::text FROM "{name}""#),
            &[],
        )
        .await
        .unwrap();

    assert_eq!(stored.get::<_, Option<i16>>(0), Some(5));
    assert_eq!(stored.get::<_, Option<i64>>(1), Some(5));
    assert_eq!(stored.get::<_, Option<f32>>(2), Some(5.0));
    assert_eq!(stored.get::<_, Option<f64>>(3), Some(5.0));
    assert_eq!(stored.get::<_, Option<String>>(4).as_deref(), Some("5"));

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn repeated_increment_accumulates() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let table = counters(&setup, "counters", &[row(1, Some("a"), None)]).await;

    for _ in 0..3 {
        test.db
            .bulk_update(&table, Values::keyed([(1, [("counter", 2)])]))
            .combine("counter", "incr")
            .exec()
            .await
            .unwrap();
    }

    assert_eq!(rows(&setup, &table).await, [row(1, Some("a"), Some(6))]);

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn batching_does_not_change_the_result() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let mut test = setup.connect().await.unwrap();
    let initial: Vec<Row> = (1..=5).map(|id| row(id, None, Some(id))).collect();
    let whole = counters(&setup, "whole", &initial).await;

    let values = || Values::keyed((1..=5).map(|id| (id, [("counter", id * 10)])));

    test.db
        .bulk_update(&whole, values())
        .combine("counter", "incr")
        .exec()
        .await
        .unwrap();
    let expected = rows(&setup, &whole).await;

    for (size, statements) in [(1, 5), (5, 1), (15, 1)] {
        let batched = counters(&setup, &format!("batched_{size}"), &initial).await;
        test.log().clear();

        let outcome = test
            .db
            .bulk_update(&batched, values())
            .combine("counter", "incr")
            .batch_size(size)
            .exec()
            .await
            .unwrap();
        assert_eq!(outcome.count(), 5);
        assert_eq!(test.log().statements(), statements);

        assert_eq!(rows(&setup, &batched).await, expected);
    }

    setup.cleanup_my_tables().await.unwrap();
}

#[tokio::test]
async fn documents_round_trip() {
    let setup = SetupPostgreSQL::new().await.unwrap();
    let test = setup.connect().await.unwrap();
    let name = setup.table_name("documents");
    setup.execute(&fixtures::documents_ddl(&name)).await.unwrap();
    let table = fixtures::documents(&name);

    let hstore: BTreeMap<String, Option<String>> =
        [("k".to_string(), Some("v".to_string()))].into();

    let created = test
        .db
        .bulk_create(
            &table,
            Values::records([vec![
                ("name", Expr::from("doc")),
                ("int_field", Expr::from(1)),
                ("array_field", Expr::from(vec![1, 2])),
                ("json_field", Expr::from(json!({"a": 1}))),
                ("hstore_field", Expr::from(Value::from(hstore))),
                ("int_range_field", Expr::from(ValueRange::new(1, 5))),
            ]]),
        )
        .returning(["id", "flag", "created_at"])
        .exec()
        .await
        .unwrap();

    let created = created.into_rows().unwrap();
    let first = created.get(0).unwrap();
    assert_eq!(first.get("flag"), Some(&Value::Bool(false)));
    assert!(matches!(first.get("created_at"), Some(Value::TimestampTz(_))));
    let id = first.get("id").cloned().unwrap();

    let updated = test
        .db
        .bulk_update(
            &table,
            Values::keyed([(
                id,
                vec![
                    ("array_field", Expr::from(vec![2, 3])),
                    ("json_field", Expr::from(json!({"b": 2}))),
                ],
            )]),
        )
        .combine("array_field", "union")
        .combine("json_field", "concat")
        .returning(["json_field", "updated_at"])
        .exec()
        .await
        .unwrap();

    let updated = updated.into_rows().unwrap();
    let row = updated.get(0).unwrap();
    assert_eq!(row.get("json_field"), Some(&Value::Json(json!({"a": 1, "b": 2}))));
    assert!(matches!(row.get("updated_at"), Some(Value::TimestampTz(_))));

    let stored = setup
        .client()
        .query_one(
            &format!(
                r#"SELECT "array_field", "int_range_field"::text, "hstore_field" -> 'k' FROM "{name}""#
            ),
            &[],
        )
        .await
        .unwrap();

    let mut array: Vec<i32> = stored.get(0);
    array.sort_unstable();
    assert_eq!(array, [1, 2, 3]);
    assert_eq!(stored.get::<_, String>(1), "[1,5)");
    assert_eq!(stored.get::<_, Option<String>>(2).as_deref(), Some("v"));

    setup.cleanup_my_tables().await.unwrap();
}
