// Integration tests for the namespaced property store

use chrono::{TimeZone, Utc};
use snapvault_core::errors::ExErrorKind;
use snapvault_core::model::{
    Availability, NewSnapshot, Property, PropertyId, PropertyValue, Version,
};
use snapvault_store::Database;

fn db_with_package(mp: &str) -> Database {
    let mut db = Database::open_in_memory().unwrap();
    let version = db.claim_next_version(mp).unwrap();
    db.save_snapshot(&NewSnapshot {
        media_package_id: mp.to_string(),
        series_id: None,
        organization_id: "org-1".to_string(),
        owner: "admin".to_string(),
        package_body: "<mediapackage/>".to_string(),
        elements: vec![],
        archival_date: Utc::now(),
        version,
        availability: Availability::Online,
        storage_id: "store-1".to_string(),
    })
    .unwrap();
    db
}

fn prop(mp: &str, ns: &str, name: &str, value: impl Into<PropertyValue>) -> Property {
    Property::new(PropertyId::new(mp, ns, name), value)
}

fn row_ids(db: &Database, mp: &str) -> Vec<i64> {
    let mut stmt = db
        .connection()
        .prepare("SELECT id FROM property WHERE media_package_id = ?1 ORDER BY id")
        .unwrap();
    stmt.query_map([mp], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<i64>, _>>()
        .unwrap()
}

#[test]
fn test_upsert_keeps_one_row_with_latest_value() {
    let mut db = db_with_package("mp-1");

    assert!(db.save_property(&prop("mp-1", "ns", "title", "first")).unwrap());
    let ids_before = row_ids(&db, "mp-1");
    assert!(db.save_property(&prop("mp-1", "ns", "title", "second")).unwrap());

    assert_eq!(row_ids(&db, "mp-1"), ids_before, "surrogate id preserved");
    let props = db.select_properties("mp-1", "ns").unwrap();
    assert_eq!(props, vec![prop("mp-1", "ns", "title", "second")]);
}

#[test]
fn test_update_can_change_value_type() {
    let mut db = db_with_package("mp-1");

    db.save_property(&prop("mp-1", "ns", "flag", "yes")).unwrap();
    db.save_property(&prop("mp-1", "ns", "flag", false)).unwrap();

    let props = db.select_properties("mp-1", "ns").unwrap();
    assert_eq!(props[0].value, PropertyValue::Boolean(false));
}

#[test]
fn test_unknown_media_package_writes_nothing() {
    let mut db = db_with_package("mp-1");

    assert!(!db.save_property(&prop("mp-unknown", "ns", "title", "x")).unwrap());
    assert!(row_ids(&db, "mp-unknown").is_empty());
    assert!(db.select_properties("mp-unknown", "ns").unwrap().is_empty());
}

#[test]
fn test_claimed_but_unsaved_package_is_unknown() {
    let mut db = Database::open_in_memory().unwrap();
    db.claim_next_version("mp-1").unwrap();

    assert!(!db.save_property(&prop("mp-1", "ns", "title", "x")).unwrap());
}

#[test]
fn test_typed_values_round_trip() {
    let mut db = db_with_package("mp-1");
    let date = Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();

    let saved = vec![
        prop("mp-1", "ns", "a-string", ""),
        prop("mp-1", "ns", "b-date", date),
        prop("mp-1", "ns", "c-long", 0i64),
        prop("mp-1", "ns", "d-false", false),
        prop("mp-1", "ns", "e-version", PropertyValue::version(Version::new(7))),
    ];
    for p in &saved {
        assert!(db.save_property(p).unwrap());
    }

    let loaded = db.select_properties("mp-1", "ns").unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded[3].value.as_bool(), Some(false));
    assert_eq!(loaded[4].value.as_version(), Some(Version::new(7)));
}

#[test]
fn test_select_is_scoped_by_namespace() {
    let mut db = db_with_package("mp-1");
    db.save_property(&prop("mp-1", "ns-a", "k", "a")).unwrap();
    db.save_property(&prop("mp-1", "ns-b", "k", "b")).unwrap();

    let a = db.select_properties("mp-1", "ns-a").unwrap();
    assert_eq!(a, vec![prop("mp-1", "ns-a", "k", "a")]);
}

#[test]
fn test_delete_by_namespace_and_all() {
    let mut db = db_with_package("mp-1");
    for (ns, name) in [("ns-a", "x"), ("ns-a", "y"), ("ns-b", "x")] {
        db.save_property(&prop("mp-1", ns, name, 1i64)).unwrap();
    }

    assert_eq!(db.delete_properties("mp-1", Some("ns-a")).unwrap(), 2);
    assert!(db.select_properties("mp-1", "ns-a").unwrap().is_empty());
    assert_eq!(db.select_properties("mp-1", "ns-b").unwrap().len(), 1);

    assert_eq!(db.delete_properties("mp-1", None).unwrap(), 1);
    assert_eq!(db.delete_properties("mp-1", None).unwrap(), 0);
}

#[test]
fn test_row_without_value_is_data_integrity_error() {
    let mut db = db_with_package("mp-1");
    db.connection()
        .execute(
            "INSERT INTO property (media_package_id, namespace, property_name)
             VALUES ('mp-1', 'ns', 'broken')",
            [],
        )
        .unwrap();

    let err = db.select_properties("mp-1", "ns").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::DataIntegrity);
    assert_eq!(err.op(), Some("select_properties"));
}

#[test]
fn test_blank_name_is_invalid() {
    let mut db = db_with_package("mp-1");
    let err = db.save_property(&prop("mp-1", "ns", " ", "x")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}
