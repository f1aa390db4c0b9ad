//! Where-clause Scenario Tests
//!
//! End-to-end resolution over a small file system catalogue:
//! - Multi-value equality returns records in natural key order
//! - Case-insensitive equality checks the full key, not just the first char
//! - Case-insensitive prefix search
//! - Auxiliary filters combined with descending order

use foldscan::executor::{QueryError, Resolver};
use foldscan::index::{Key, PrimaryKey};
use foldscan::planner::{Predicate, Query};
use foldscan::store::{IndexRef, IndexSpec, MemoryReadTxn, MemoryStore, Record};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

const FILENAMES: [&str; 23] = [
    "",
    "\t ",
    "AA",
    "AAron",
    "APAN JAPAN",
    "APAN japaö",
    "APGALEN",
    "APaLAT",
    "APaÖNSKAN",
    "APalster",
    "Aaron",
    "Apan JapaN",
    "Apan Japaa",
    "Apan Japan",
    "Gösta",
    "apan JA",
    "apan JAPA",
    "apan JAPAA",
    "apan JAPANer",
    "apan JAPAÖ",
    "apan japan",
    "apan japanER",
    "östen",
];

fn populated() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .create_table("folders", vec![IndexSpec::unique("path")])
        .unwrap();
    store
        .create_table(
            "files",
            vec![
                IndexSpec::new("filename"),
                IndexSpec::new("extension"),
                IndexSpec::new("folderId"),
            ],
        )
        .unwrap();

    let folder = |path: &str| store.insert("folders", json!({ "path": path })).unwrap();

    store
        .insert("folders", json!({ "path": "/", "description": "Root folder" }))
        .unwrap();
    folder("/usr");
    folder("/usr/local");
    let bin = folder("/usr/local/bin");
    store.insert("files", json!({ "filename": "Hello", "folderId": bin })).unwrap();
    store
        .insert("files", json!({ "filename": "hello", "extension": ".exe", "folderId": bin }))
        .unwrap();
    let src = folder("/usr/local/src");
    store
        .insert("files", json!({ "filename": "world", "extension": ".js", "folderId": src }))
        .unwrap();
    store
        .insert("files", json!({ "filename": "README", "extension": ".TXT", "folderId": src }))
        .unwrap();
    folder("/usr/local/var");
    folder("/USR/local/VAR");
    folder("/var");
    let var_bin = folder("/var/bin");
    store
        .insert(
            "files",
            json!({ "filename": "hello-there", "extension": ".exe", "folderId": var_bin }),
        )
        .unwrap();

    store
}

/// Adds the `/etc` folder holding the 23 mixed-case filenames.
fn add_etc(store: &MemoryStore) -> PrimaryKey {
    let etc = store
        .insert("folders", json!({ "path": "/etc", "description": "Slasktratten" }))
        .unwrap();
    store
        .insert_all(
            "files",
            FILENAMES
                .iter()
                .map(|name| json!({ "filename": name, "folderId": etc })),
        )
        .unwrap();
    etc
}

fn filenames() -> IndexRef {
    IndexRef::new("files", "filename")
}

fn paths() -> IndexRef {
    IndexRef::new("folders", "path")
}

fn texts(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.key_text().unwrap()).collect()
}

fn full_path(txn: &MemoryReadTxn<'_>, file: &Record) -> String {
    let folder_id = file.field("folderId").and_then(|v| v.as_u64()).unwrap();
    let folder = txn.get("folders", folder_id).unwrap().unwrap();
    format!(
        "{}/{}{}",
        folder["path"].as_str().unwrap(),
        file.value["filename"].as_str().unwrap(),
        file.value
            .get("extension")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    )
}

// =============================================================================
// equalsAnyOf
// =============================================================================

/// Matches come back in code-point order, missing values are ignored.
#[test]
fn test_equals_any_of() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let query = Query::new(
        filenames(),
        Predicate::equals_any_of(["hello", "hello-there", "README", "gösta"]),
    );
    let records = resolver.resolve(&txn, query).unwrap().to_vec().unwrap();

    assert_eq!(texts(&records), vec!["README", "hello", "hello-there"]);
    assert_eq!(full_path(&txn, &records[0]), "/usr/local/src/README.TXT");
    assert_eq!(full_path(&txn, &records[1]), "/usr/local/bin/hello.exe");
    assert_eq!(full_path(&txn, &records[2]), "/var/bin/hello-there.exe");
}

/// Descending reverses the multi-value order.
#[test]
fn test_equals_any_of_descending() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let query = Query::new(
        filenames(),
        Predicate::equals_any_of(["hello", "hello-there", "README"]),
    )
    .desc();
    let records = resolver.resolve(&txn, query).unwrap().to_vec().unwrap();

    assert_eq!(texts(&records), vec!["hello-there", "hello", "README"]);
}

/// An empty value list is rejected before any scan.
#[test]
fn test_equals_any_of_empty_rejected() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let result = resolver.resolve(
        &txn,
        Query::new(filenames(), Predicate::equals_any_of(Vec::<Key>::new())),
    );
    assert!(matches!(result, Err(QueryError::MalformedPredicate(_))));
    assert_eq!(resolver.metrics().snapshot().ranges_scanned, 0);
}

// =============================================================================
// equalsIgnoreCase
// =============================================================================

/// Both case variants of the same name are found.
#[test]
fn test_equals_ignore_case() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let records = resolver
        .resolve(&txn, Query::new(filenames(), Predicate::equals_ignore_case("hello")))
        .unwrap()
        .to_vec()
        .unwrap();

    assert_eq!(texts(&records), vec!["Hello", "hello"]);
}

/// The four case variants among 23 similar names, ascending.
#[test]
fn test_equals_ignore_case_mixed_names() {
    let store = populated();
    add_etc(&store);
    let resolver = Resolver::default();
    let txn = store.read();

    let records = resolver
        .resolve(&txn, Query::new(filenames(), Predicate::equals_ignore_case("apan japan")))
        .unwrap()
        .to_vec()
        .unwrap();

    assert_eq!(
        texts(&records),
        vec!["APAN JAPAN", "Apan JapaN", "Apan Japan", "apan japan"]
    );
}

/// Same query, restricted to the new folder and descending.
#[test]
fn test_equals_ignore_case_mixed_names_descending() {
    let store = populated();
    let etc = add_etc(&store);
    let resolver = Resolver::default();
    let txn = store.read();

    let query = Query::new(filenames(), Predicate::equals_ignore_case("apan japan"))
        .with_filter(move |file| file.field("folderId") == Some(&json!(etc)))
        .desc();
    let records = resolver.resolve(&txn, query).unwrap().to_vec().unwrap();

    assert_eq!(
        texts(&records),
        vec!["apan japan", "Apan Japan", "Apan JapaN", "APAN JAPAN"]
    );
}

/// Keys sharing the first char class but not the full name are filtered out.
#[test]
fn test_equals_ignore_case_first_key_shorter_than_needle() {
    let store = populated();
    store.clear("files").unwrap();
    for name in [
        "Hello-there-",
        "hello-there-",
        "hello-there-everyone",
        "hello-there-everyone-of-you!",
    ] {
        store
            .insert("files", json!({ "filename": name, "folderId": 1 }))
            .unwrap();
    }
    let resolver = Resolver::default();
    let txn = store.read();

    let ascending = resolver
        .resolve(
            &txn,
            Query::new(filenames(), Predicate::equals_ignore_case("hello-there-everyone")),
        )
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(texts(&ascending), vec!["hello-there-everyone"]);

    let descending = resolver
        .resolve(
            &txn,
            Query::new(filenames(), Predicate::equals_ignore_case("hello-there-everyone")).desc(),
        )
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(texts(&descending), vec!["hello-there-everyone"]);
}

/// Empty needle only matches the empty key.
#[test]
fn test_equals_ignore_case_empty_needle() {
    let store = populated();
    add_etc(&store);
    let resolver = Resolver::default();
    let txn = store.read();

    let records = resolver
        .resolve(&txn, Query::new(filenames(), Predicate::equals_ignore_case("")))
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(texts(&records), vec![""]);
}

/// Non-ASCII letters fold with simple case folding.
#[test]
fn test_equals_ignore_case_non_ascii() {
    let store = populated();
    add_etc(&store);
    let resolver = Resolver::default();
    let txn = store.read();

    let records = resolver
        .resolve(&txn, Query::new(filenames(), Predicate::equals_ignore_case("ÖSTEN")))
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(texts(&records), vec!["östen"]);

    let records = resolver
        .resolve(&txn, Query::new(filenames(), Predicate::equals_ignore_case("gösta")))
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(texts(&records), vec!["Gösta"]);
}

// =============================================================================
// anyOfIgnoreCase
// =============================================================================

/// Union of several case-insensitive names in key order.
#[test]
fn test_any_of_ignore_case() {
    let store = populated();
    add_etc(&store);
    let resolver = Resolver::default();
    let txn = store.read();

    let records = resolver
        .resolve(
            &txn,
            Query::new(filenames(), Predicate::any_of_ignore_case(["readme", "AARON", "hello"])),
        )
        .unwrap()
        .to_vec()
        .unwrap();

    assert_eq!(
        texts(&records),
        vec!["AAron", "Aaron", "Hello", "README", "hello"]
    );
}

// =============================================================================
// startsWithIgnoreCase
// =============================================================================

/// Every folder path starts with "/".
#[test]
fn test_starts_with_ignore_case_root() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let count = resolver
        .resolve(&txn, Query::new(paths(), Predicate::starts_with_ignore_case("/")))
        .unwrap()
        .count()
        .unwrap();
    assert_eq!(count, txn.len("folders").unwrap());
    assert_eq!(count, 9);
}

/// Six folders start with "/usr" in any case.
#[test]
fn test_starts_with_ignore_case_usr() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let records = resolver
        .resolve(&txn, Query::new(paths(), Predicate::starts_with_ignore_case("/usr")))
        .unwrap()
        .to_vec()
        .unwrap();

    assert_eq!(
        texts(&records),
        vec![
            "/USR/local/VAR",
            "/usr",
            "/usr/local",
            "/usr/local/bin",
            "/usr/local/src",
            "/usr/local/var",
        ]
    );
}

/// Case-sensitive prefix excludes the upper-case path.
#[test]
fn test_starts_with_case_sensitive() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let count = resolver
        .resolve(&txn, Query::new(paths(), Predicate::starts_with("/usr")))
        .unwrap()
        .count()
        .unwrap();
    assert_eq!(count, 5);
}

// =============================================================================
// Other indexes and result sinks
// =============================================================================

/// Numeric index with a range predicate.
#[test]
fn test_between_on_numeric_index() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    // folders 4 (/usr/local/bin) and 5 (/usr/local/src)
    let records = resolver
        .resolve(
            &txn,
            Query::new(IndexRef::new("files", "folderId"), Predicate::between(4i64, 5i64)),
        )
        .unwrap()
        .to_vec()
        .unwrap();
    let names: Vec<&str> = records
        .iter()
        .map(|r| r.value["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Hello", "hello", "world", "README"]);
}

/// Equality on a secondary index, limited.
#[test]
fn test_extension_index_with_limit() {
    let store = populated();
    let resolver = Resolver::default();
    let txn = store.read();

    let query = Query::new(IndexRef::new("files", "extension"), Predicate::equals(".exe"))
        .with_limit(1);
    let records = resolver.resolve(&txn, query).unwrap().to_vec().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value["filename"], "hello");
}

/// Unique path index rejects a duplicate folder.
#[test]
fn test_unique_path_rejected() {
    let store = populated();
    let err = store
        .insert("folders", json!({ "path": "/usr" }))
        .unwrap_err();
    assert_eq!(err.code().code(), "FOLDSCAN_STORE_CONSTRAINT");
    // a different case is a different key
    assert!(store.insert("folders", json!({ "path": "/Usr" })).is_ok());
}

/// Resolving twice against an unchanged store gives the same sequence.
#[test]
fn test_resolve_is_idempotent() {
    let store = populated();
    add_etc(&store);
    let resolver = Resolver::default();
    let txn = store.read();

    let run = || {
        resolver
            .resolve(&txn, Query::new(filenames(), Predicate::starts_with_ignore_case("ap")))
            .unwrap()
            .primary_keys()
            .unwrap()
    };
    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}

/// `first` stops after one record and reports completion.
#[test]
fn test_first_closes_scan() {
    let store = populated();
    add_etc(&store);
    let resolver = Resolver::default();
    let txn = store.read();

    let first = resolver
        .resolve(&txn, Query::new(filenames(), Predicate::starts_with_ignore_case("a")))
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(first.key_text(), Some("AA"));

    let snapshot = resolver.metrics().snapshot();
    assert_eq!(snapshot.scans_completed, 1);
    assert_eq!(snapshot.scans_cancelled, 0);
    assert_eq!(snapshot.records_returned, 1);
}
