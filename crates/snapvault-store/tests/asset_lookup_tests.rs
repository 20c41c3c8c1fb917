// Integration tests for content-addressable asset lookup

use chrono::Utc;
use snapvault_core::model::{
    Availability, Checksum, ElementDescriptor, NewSnapshot, Version,
};
use snapvault_store::Database;

fn save(
    db: &mut Database,
    mp: &str,
    org: &str,
    storage: &str,
    elements: &[(&str, &str)],
) -> Version {
    let version = db.claim_next_version(mp).unwrap();
    db.save_snapshot(&NewSnapshot {
        media_package_id: mp.to_string(),
        series_id: None,
        organization_id: org.to_string(),
        owner: format!("owner-of-{}", mp),
        package_body: "<mediapackage/>".to_string(),
        elements: elements
            .iter()
            .map(|(id, sum)| ElementDescriptor::new(*id, Checksum::parse(sum).unwrap(), 10))
            .collect(),
        archival_date: Utc::now(),
        version,
        availability: Availability::Online,
        storage_id: storage.to_string(),
    })
    .unwrap();
    version
}

#[test]
fn test_checksum_round_trip() {
    let mut db = Database::open_in_memory().unwrap();
    save(&mut db, "mp-1", "org-1", "store-1", &[("track-1", "abc123")]);

    let found = db.find_asset_by_checksum("abc123").unwrap().unwrap();
    assert_eq!(found.asset.element_id, "track-1");
    assert_eq!(found.media_package_id, "mp-1");
    assert_eq!(found.version, Version::FIRST);
    assert_eq!(found.organization_id, "org-1");
    assert_eq!(found.owner, "owner-of-mp-1");
    assert_eq!(found.availability, Availability::Online);

    assert_eq!(db.find_asset_by_checksum("doesnotexist").unwrap(), None);
    assert_eq!(db.find_asset_by_checksum("").unwrap(), None);
    assert_eq!(db.find_asset_by_checksum("ffff").unwrap(), None);
}

#[test]
fn test_checksum_lookup_ignores_case() {
    let mut db = Database::open_in_memory().unwrap();
    save(&mut db, "mp-1", "org-1", "store-1", &[("track-1", "abc123")]);

    assert!(db.find_asset_by_checksum("ABC123").unwrap().is_some());
}

#[test]
fn test_shared_checksum_picks_earliest_asset() {
    let mut db = Database::open_in_memory().unwrap();
    // Unchanged file re-submitted across versions
    save(&mut db, "mp-1", "org-1", "store-1", &[("track-1", "aa11")]);
    save(&mut db, "mp-1", "org-1", "store-1", &[("track-1", "aa11")]);
    save(&mut db, "mp-2", "org-1", "store-1", &[("track-9", "aa11")]);

    for _ in 0..3 {
        let found = db.find_asset_by_checksum("aa11").unwrap().unwrap();
        assert_eq!(found.media_package_id, "mp-1");
        assert_eq!(found.version, Version::FIRST);
    }
}

#[test]
fn test_lookup_scoped_to_store() {
    let mut db = Database::open_in_memory().unwrap();
    save(&mut db, "mp-1", "org-1", "store-1", &[("track-1", "aa11")]);
    save(&mut db, "mp-2", "org-1", "store-2", &[("track-2", "aa11")]);

    let found = db
        .find_asset_by_checksum_and_store("aa11", "store-2")
        .unwrap()
        .unwrap();
    assert_eq!(found.media_package_id, "mp-2");
    assert_eq!(found.asset.storage_id, "store-2");

    assert_eq!(
        db.find_asset_by_checksum_and_store("aa11", "store-3").unwrap(),
        None
    );
}

#[test]
fn test_lookup_scoped_to_store_and_organization() {
    let mut db = Database::open_in_memory().unwrap();
    save(&mut db, "mp-1", "org-1", "store-1", &[("track-1", "aa11")]);
    save(&mut db, "mp-2", "org-2", "store-1", &[("track-2", "aa11")]);

    let found = db
        .find_asset_by_checksum_and_store_and_org("aa11", "store-1", "org-2")
        .unwrap()
        .unwrap();
    assert_eq!(found.media_package_id, "mp-2");

    assert_eq!(
        db.find_asset_by_checksum_and_store_and_org("aa11", "store-2", "org-1")
            .unwrap(),
        None
    );
}

#[test]
fn test_store_scope_follows_relocated_assets() {
    let mut db = Database::open_in_memory().unwrap();
    let version = save(&mut db, "mp-1", "org-1", "store-1", &[("track-1", "aa11")]);

    db.set_storage_location(version, "mp-1", "store-2").unwrap();

    assert_eq!(
        db.find_asset_by_checksum_and_store("aa11", "store-1").unwrap(),
        None
    );
    assert!(db
        .find_asset_by_checksum_and_store("aa11", "store-2")
        .unwrap()
        .is_some());
}
