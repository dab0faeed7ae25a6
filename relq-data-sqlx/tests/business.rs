mod common;

use common::{setup_business, user};
use relq_data::{Filter, Value};

#[tokio::test]
async fn insert_stamps_created_audit_fields() {
    let (business, raw) = setup_business().await;
    let id = business.insert(None, user("alice", 30), "admin").await.unwrap();

    // raw view still carries the audit columns
    let stored = raw
        .get(None, &Filter::new().with("id", id))
        .await
        .unwrap()
        .expect("row");
    assert_eq!(stored.get("created_by"), Some(&Value::Text("admin".into())));
    assert!(matches!(stored.get("created_at"), Some(Value::Timestamp(_))));
    assert_eq!(stored.get("deleted_at"), Some(&Value::Null));
}

#[tokio::test]
async fn reads_strip_audit_columns_and_return_json_safe_values() {
    let (business, _raw) = setup_business().await;
    let id = business.insert(None, user("alice", 30), "admin").await.unwrap();

    let rec = business
        .get(None, &Filter::new().with("id", id), false)
        .await
        .unwrap()
        .expect("row");
    assert!(!rec.contains("created_at"));
    assert!(!rec.contains("updated_at"));
    assert!(!rec.contains("deleted_at"));
    assert_eq!(rec.get("name"), Some(&Value::Text("alice".into())));
}

#[tokio::test]
async fn update_stamps_updated_fields_and_keeps_created_at() {
    let (business, raw) = setup_business().await;
    let id = business.insert(None, user("alice", 30), "admin").await.unwrap();
    let before = raw
        .get(None, &Filter::new().with("id", id))
        .await
        .unwrap()
        .expect("row");

    let affected = business
        .update(
            None,
            &Filter::new().with("id", id),
            relq_data::Record::new().set("age", 31),
            "editor",
            false,
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let after = raw
        .get(None, &Filter::new().with("id", id))
        .await
        .unwrap()
        .expect("row");
    assert_eq!(after.get("age"), Some(&Value::Int(31)));
    assert_eq!(after.get("updated_by"), Some(&Value::Text("editor".into())));
    assert!(matches!(after.get("updated_at"), Some(Value::Timestamp(_))));
    assert_eq!(after.get("created_at"), before.get("created_at"));
    assert_eq!(after.get("created_by"), before.get("created_by"));
}

#[tokio::test]
async fn delete_is_soft_and_hides_rows_from_scoped_reads() {
    let (business, raw) = setup_business().await;
    let id = business.insert(None, user("alice", 30), "admin").await.unwrap();

    let affected = business
        .delete(None, &Filter::new().with("id", id), "admin", false)
        .await
        .unwrap();
    assert_eq!(affected, 1);

    // scoped read no longer sees the row
    let scoped = business
        .get(None, &Filter::new().with("id", id), false)
        .await
        .unwrap();
    assert!(scoped.is_none());

    // unscoped read still does
    let unscoped = business
        .get(None, &Filter::new().with("id", id), true)
        .await
        .unwrap();
    assert!(unscoped.is_some());

    // and the row was never physically removed
    let stored = raw
        .get(None, &Filter::new().with("id", id))
        .await
        .unwrap()
        .expect("row");
    assert!(matches!(stored.get("deleted_at"), Some(Value::Timestamp(_))));
    assert_eq!(stored.get("updated_by"), Some(&Value::Text("admin".into())));
    assert_eq!(raw.count(None, &Filter::new()).await.unwrap(), 1);
}

#[tokio::test]
async fn deleting_twice_matches_nothing_the_second_time() {
    let (business, _raw) = setup_business().await;
    let id = business.insert(None, user("alice", 30), "admin").await.unwrap();

    assert_eq!(
        business
            .delete(None, &Filter::new().with("id", id), "admin", false)
            .await
            .unwrap(),
        1
    );
    // the soft-delete WHERE is itself scoped to live rows
    assert_eq!(
        business
            .delete(None, &Filter::new().with("id", id), "admin", false)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn unscoped_delete_removes_rows_physically() {
    let (business, raw) = setup_business().await;
    let id = business.insert(None, user("alice", 30), "admin").await.unwrap();

    let affected = business
        .delete(None, &Filter::new().with("id", id), "admin", true)
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(raw.count(None, &Filter::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn query_excludes_soft_deleted_rows_from_list_and_total() {
    let (business, _raw) = setup_business().await;
    for (name, age) in [("alice", 30), ("bob", 25), ("carol", 35)] {
        business.insert(None, user(name, age), "admin").await.unwrap();
    }
    business
        .delete(None, &Filter::new().with("name", "bob"), "admin", false)
        .await
        .unwrap();

    let (records, total) = business
        .query(None, &Filter::new(), None, None, false)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.get("name") != Some(&Value::Text("bob".into()))));

    let (_, unscoped_total) = business
        .query(None, &Filter::new(), None, None, true)
        .await
        .unwrap();
    assert_eq!(unscoped_total, 3);
}

#[tokio::test]
async fn first_and_last_are_scoped_too() {
    let (business, _raw) = setup_business().await;
    business.insert(None, user("alice", 30), "admin").await.unwrap();
    business.insert(None, user("bob", 25), "admin").await.unwrap();
    business
        .delete(None, &Filter::new().with("name", "bob"), "admin", false)
        .await
        .unwrap();

    let first = business
        .first(None, &Filter::new(), None, false)
        .await
        .unwrap()
        .expect("row");
    assert_eq!(first.get("name"), Some(&Value::Text("alice".into())));

    let last = business
        .last(None, &Filter::new(), None, false)
        .await
        .unwrap()
        .expect("row");
    assert_eq!(last.get("name"), Some(&Value::Text("alice".into())));
}
