use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use wanderlist_core::{
    BudgetLine, Destination, DestinationId, KeyValueStore, Priority, StorageError, StoragePort,
    TripType,
};
use wanderlist_local::{FileStore, LocalStorage, MemoryStore, DEFAULT_STORAGE_KEY};

fn setup() -> (Arc<MemoryStore>, LocalStorage<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let storage = LocalStorage::new(store.clone());
    (store, storage)
}

fn destination(name: &str) -> Destination {
    let mut d = Destination::new(name, 10.0, 20.0);
    d.country = format!("{} country", name);
    d.budget.flight = BudgetLine::estimated(Decimal::from(500));
    d.budget.food = BudgetLine {
        estimated: Decimal::from(200),
        actual: Some(Decimal::from(260)),
    };
    d
}

#[test]
fn test_save_appends_fresh_ids() {
    let (_, storage) = setup();
    storage.save(&destination("Lima")).unwrap();
    assert_eq!(storage.get_all().unwrap().len(), 1);
    storage.save(&destination("Cusco")).unwrap();
    let all = storage.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Lima");
    assert_eq!(all[1].name, "Cusco");
}

#[test]
fn test_save_replaces_matching_id() {
    let (_, storage) = setup();
    let lima = storage.save(&destination("Lima")).unwrap();
    storage.save(&destination("Cusco")).unwrap();

    let mut edited = lima.clone();
    edited.priority = Priority::BucketList;
    edited.must_see = vec!["Miraflores".to_string()];
    storage.save(&edited).unwrap();

    let all = storage.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, lima.id);
    assert_eq!(all[0].priority, Priority::BucketList);
    assert_eq!(all[0].must_see, vec!["Miraflores"]);
}

#[test]
fn test_save_recomputes_totals_and_stamps_date() {
    let (_, storage) = setup();
    let mut d = destination("Quito");
    d.budget.total = BudgetLine::estimated(Decimal::from(1));
    d.last_updated = time::Date::from_calendar_date(2019, time::Month::June, 1).unwrap();

    let persisted = storage.save(&d).unwrap();
    assert_eq!(persisted.budget.total.estimated, Decimal::from(700));
    assert_eq!(persisted.budget.total.actual, Some(Decimal::from(760)));
    assert_eq!(persisted.last_updated, time::OffsetDateTime::now_utc().date());

    let stored = storage.get_one(d.id).unwrap().unwrap();
    assert_eq!(stored, persisted);
}

#[test]
fn test_get_one_absent_is_none() {
    let (_, storage) = setup();
    storage.save(&destination("Lima")).unwrap();
    assert_eq!(storage.get_one(DestinationId(-1)).unwrap(), None);
}

#[test]
fn test_delete_semantics() {
    let (_, storage) = setup();
    let lima = storage.save(&destination("Lima")).unwrap();
    storage.save(&destination("Cusco")).unwrap();

    assert!(!storage.delete(DestinationId(-1)).unwrap());
    assert_eq!(storage.get_all().unwrap().len(), 2);

    assert!(storage.delete(lima.id).unwrap());
    let all = storage.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Cusco");

    assert!(!storage.delete(lima.id).unwrap());
}

#[test]
fn test_export_import_round_trip() {
    let (_, source) = setup();
    let mut a = destination("Hanoi");
    a.trip_type.extend([TripType::Food, TripType::City]);
    source.save(&a).unwrap();
    source.save(&destination("Hue")).unwrap();
    let exported = source.export_all().unwrap();

    let (_, target) = setup();
    target.save(&destination("Stale")).unwrap();
    let imported = target.import_all(&exported).unwrap();

    assert_eq!(imported, source.get_all().unwrap());
    assert_eq!(target.get_all().unwrap(), source.get_all().unwrap());
}

#[test]
fn test_import_hydrates_partial_records() {
    let (_, storage) = setup();
    let imported = storage
        .import_all(r#"[{"id": 5, "name": "Goa"}, {"name": "Pune", "tripType": ["city"]}]"#)
        .unwrap();

    assert_eq!(imported.len(), 2);
    assert_eq!(imported[0].id, DestinationId(5));
    assert_eq!(imported[0].created_by, "me");
    assert!(imported[1].trip_type.contains(&TripType::City));
    assert_ne!(imported[0].id, imported[1].id);
}

#[test]
fn test_import_rejects_non_array_without_writing() {
    let (store, storage) = setup();
    storage.save(&destination("Lima")).unwrap();
    let before = store.get(DEFAULT_STORAGE_KEY).unwrap();

    let err = storage.import_values(&json!({"id": 1, "name": "Nope"})).unwrap_err();
    assert!(matches!(err, StorageError::Format(_)));
    let err = storage.import_all("not json at all").unwrap_err();
    assert!(matches!(err, StorageError::Format(_)));

    assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), before);
    assert_eq!(storage.get_all().unwrap().len(), 1);
}

#[test]
fn test_import_keeps_ids_unique() {
    let (_, storage) = setup();
    let imported = storage
        .import_all(r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}, {"id": 1, "name": "c"}]"#)
        .unwrap();
    let names: Vec<&str> = imported.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["c", "b"]);
}

#[test]
fn test_migrate_from_legacy_converts_and_is_idempotent() {
    let (store, storage) = setup();
    let canonical = storage.save(&destination("Nairobi")).unwrap();

    let mut document: Vec<serde_json::Value> =
        serde_json::from_str(&store.get(DEFAULT_STORAGE_KEY).unwrap().unwrap()).unwrap();
    document.push(json!({"id": 77, "name": "Zanzibar", "priority": "high", "cost": "medium", "vibe": "beach"}));
    document.push(json!({"id": 78, "name": "Arusha", "priority": "low"}));
    store
        .set(DEFAULT_STORAGE_KEY, &serde_json::to_string(&document).unwrap())
        .unwrap();

    assert_eq!(storage.migrate_from_legacy().unwrap(), 2);
    let once = storage.get_all().unwrap();

    assert_eq!(once.len(), 3);
    assert_eq!(once[0], canonical);
    let zanzibar = storage.get_one(DestinationId(77)).unwrap().unwrap();
    assert_eq!(zanzibar.priority, Priority::BucketList);
    assert!(zanzibar.trip_type.contains(&TripType::Beach));
    assert_eq!(zanzibar.budget.total.estimated, Decimal::from(3000));
    assert_eq!(zanzibar.budget.flight.estimated, Decimal::from(900));
    let arusha = storage.get_one(DestinationId(78)).unwrap().unwrap();
    assert_eq!(arusha.priority, Priority::Someday);

    assert_eq!(storage.migrate_from_legacy().unwrap(), 0);
    assert_eq!(storage.get_all().unwrap(), once);
}

#[test]
fn test_file_backed_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let saved = {
        let storage = LocalStorage::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        storage.save(&destination("Tbilisi")).unwrap()
    };

    let reopened = LocalStorage::new(Arc::new(FileStore::open(dir.path()).unwrap()));
    assert_eq!(reopened.get_one(saved.id).unwrap(), Some(saved));
}

#[test]
fn test_works_through_trait_objects() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let port: Box<dyn StoragePort> = Box::new(LocalStorage::new(store));
    port.save(&destination("Accra")).unwrap();
    assert_eq!(port.get_all().unwrap().len(), 1);
    assert_eq!(port.backend_name(), "local");
}

#[test]
fn test_import_with_budget_near_decimal_limit() {
    let (_, storage) = setup();
    let payload = r#"[{"id": 1, "budget": {
        "flight": {"estimated": 5e28, "actual": 5e28},
        "accommodation": {"estimated": 5e28}
    }}]"#;

    let imported = storage.import_all(payload).unwrap();
    assert_eq!(imported[0].budget.total.estimated, Decimal::MAX);
    assert_eq!(imported[0].budget.total.actual, Some(Decimal::MAX));

    // the stored document stays readable
    let all = storage.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].budget.flight.estimated, imported[0].budget.flight.estimated);
    assert_eq!(all[0].budget.total.estimated, Decimal::MAX);
}

#[test]
fn test_extreme_ids_round_trip_and_leave_creation_working() {
    let (_, storage) = setup();
    let payload = json!([
        {"id": i64::MAX, "name": "Edge"},
        {"id": i64::MIN, "name": "Floor"},
        {"id": 1e19, "name": "Overflowing"}
    ]);
    let imported = storage.import_values(&payload).unwrap();
    assert_eq!(imported[0].id, DestinationId(i64::MAX));
    assert_eq!(imported[1].id, DestinationId(i64::MIN));
    let overflowing = imported[2].id;
    assert!(overflowing.0 > 0 && overflowing.0 < i64::MAX);

    let created = storage.save(&destination("Fresh")).unwrap();
    assert!(created.id > overflowing);
    assert_ne!(created.id, DestinationId(i64::MAX));

    assert_eq!(storage.get_one(DestinationId(i64::MAX)).unwrap().unwrap().name, "Edge");
    assert_eq!(storage.get_one(overflowing).unwrap().unwrap().name, "Overflowing");
    assert_eq!(storage.get_all().unwrap().len(), 4);
}

#[test]
fn test_id_less_stored_records_are_addressable() {
    let (store, storage) = setup();
    store
        .set(DEFAULT_STORAGE_KEY, r#"[{"name": "NoId"}, {"id": 5, "name": "HasId"}]"#)
        .unwrap();

    let first = storage.get_all().unwrap();
    assert_eq!(storage.get_all().unwrap(), first);
    assert_eq!(storage.export_all().unwrap(), serde_json::to_string(&first).unwrap());

    let no_id = first[0].id;
    assert_eq!(storage.get_one(no_id).unwrap().unwrap().name, "NoId");
    assert!(storage.delete(no_id).unwrap());
    let rest = storage.get_all().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, DestinationId(5));
}

#[test]
fn test_concurrent_saves_are_all_persisted() {
    let (_, storage) = setup();
    let storage = Arc::new(storage);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let storage = storage.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    storage.save(&destination(&format!("t{}-{}", t, i))).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = storage.get_all().unwrap();
    assert_eq!(all.len(), 400);
    let mut ids: Vec<DestinationId> = all.iter().map(|d| d.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 400);
}
