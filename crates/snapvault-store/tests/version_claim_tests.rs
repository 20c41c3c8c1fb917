// Integration tests for the version claim ledger
// Covers monotonic claims, linearizability under contention, and key independence

use snapvault_core::model::Version;
use snapvault_store::{Database, DialectChoice, StoreConfig};
use std::thread;
use tempfile::TempDir;

fn file_config(dir: &TempDir, dialect: DialectChoice) -> StoreConfig {
    StoreConfig::at_path(dir.path().join("claims.db")).with_dialect(dialect)
}

#[test]
fn test_claims_are_strictly_increasing_from_first() {
    let mut db = Database::open_in_memory().unwrap();

    let claimed: Vec<Version> = (0..5)
        .map(|_| db.claim_next_version("mp-1").unwrap())
        .collect();

    let expected: Vec<Version> = (0..5).map(Version::new).collect();
    assert_eq!(claimed, expected);
    assert_eq!(claimed[0], Version::FIRST);
}

#[test]
fn test_unused_claims_leave_gaps() {
    let mut db = Database::open_in_memory().unwrap();

    // Claim v0 and v1 but never save a snapshot for either
    db.claim_next_version("mp-1").unwrap();
    db.claim_next_version("mp-1").unwrap();

    assert_eq!(db.claim_next_version("mp-1").unwrap(), Version::new(2));
    assert_eq!(db.get_snapshot("mp-1", None).unwrap(), None);
}

#[test]
fn test_keys_are_independent() {
    let mut db = Database::open_in_memory().unwrap();

    assert_eq!(db.claim_next_version("mp-a").unwrap(), Version::new(0));
    assert_eq!(db.claim_next_version("mp-a").unwrap(), Version::new(1));
    assert_eq!(db.claim_next_version("mp-b").unwrap(), Version::new(0));
    assert_eq!(db.claim_next_version("mp-a").unwrap(), Version::new(2));
    assert_eq!(db.claim_next_version("mp-b").unwrap(), Version::new(1));
}

#[test]
fn test_both_dialects_agree() {
    for dialect in [DialectChoice::Returning, DialectChoice::Classic] {
        let config = StoreConfig::default().with_dialect(dialect);
        let mut db = Database::open(&config).unwrap();
        assert_eq!(db.dialect().name(), format!("{:?}", dialect).to_lowercase());

        for expected in 0..3 {
            assert_eq!(
                db.claim_next_version("mp-1").unwrap(),
                Version::new(expected)
            );
        }
        assert_eq!(
            db.last_claimed_version("mp-1").unwrap(),
            Some(Version::new(2))
        );
    }
}

fn assert_concurrent_claims_are_distinct(dialect: DialectChoice) {
    const THREADS: u64 = 8;
    const CLAIMS_PER_THREAD: u64 = 10;

    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, dialect);

    // Prior claim so the run starts from an existing ledger row
    let mut setup = Database::open(&config).unwrap();
    assert_eq!(setup.claim_next_version("mp-shared").unwrap(), Version::FIRST);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| Database::open(&config).unwrap())
        .map(|mut db| {
            thread::spawn(move || {
                (0..CLAIMS_PER_THREAD)
                    .map(|_| db.claim_next_version("mp-shared").unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .map(|v| v.value())
        .collect();
    all.sort_unstable();

    let expected: Vec<u64> = (1..=THREADS * CLAIMS_PER_THREAD).collect();
    assert_eq!(all, expected, "claims must be distinct and contiguous");
    assert_eq!(
        setup.last_claimed_version("mp-shared").unwrap(),
        Some(Version::new(THREADS * CLAIMS_PER_THREAD))
    );
}

#[test]
fn test_concurrent_claims_returning_dialect() {
    assert_concurrent_claims_are_distinct(DialectChoice::Returning);
}

#[test]
fn test_concurrent_claims_classic_dialect() {
    assert_concurrent_claims_are_distinct(DialectChoice::Classic);
}

#[test]
fn test_concurrent_claims_on_different_keys() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir, DialectChoice::Auto);
    Database::open(&config).unwrap();

    let handles: Vec<_> = ["mp-a", "mp-b", "mp-c"]
        .into_iter()
        .map(|mp| (mp, Database::open(&config).unwrap()))
        .map(|(mp, mut db)| {
            thread::spawn(move || {
                (0..5)
                    .map(|_| db.claim_next_version(mp).unwrap().value())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}
