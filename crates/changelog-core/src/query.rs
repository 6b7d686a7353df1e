use tracing::warn;

use crate::glob;
use crate::record::{decode_key, ChangeRecord};
use crate::store::{ChangeStore, StoreError};

/// Scan every stored change and keep those whose FULL raw key matches
/// the glob pattern, case-insensitively.
///
/// The pattern runs against the encoded `module;marker;note` string,
/// not the module field alone. That is part of the query contract:
/// `*` selects everything, `core;*` selects one module, and a pattern
/// like `*;!;*` or `*startup*` filters on the marker or the note text.
///
/// Keys with fewer than two delimiters cannot be decoded; they are
/// skipped with a warning rather than faulting the scan.
pub fn scan(store: &dyn ChangeStore, pattern: &str) -> Result<Vec<ChangeRecord>, StoreError> {
    let matcher = glob::compile(pattern)?;

    let mut records = Vec::new();
    for (raw, timestamp) in store.changes()? {
        if !matcher.is_match(&raw) {
            continue;
        }
        match decode_key(&raw) {
            Some((module, marker, note)) => records.push(ChangeRecord {
                module,
                marker,
                note,
                timestamp,
            }),
            None => warn!(key = %raw, "skipping malformed change key"),
        }
    }
    Ok(records)
}

/// Scan for the feed: exact (non-glob) comparison against the module
/// token only. `None` means no filter — every record passes.
pub fn scan_exact_module(
    store: &dyn ChangeStore,
    module: Option<&str>,
) -> Result<Vec<ChangeRecord>, StoreError> {
    let mut records = Vec::new();
    for (raw, timestamp) in store.changes()? {
        let Some((record_module, marker, note)) = decode_key(&raw) else {
            warn!(key = %raw, "skipping malformed change key");
            continue;
        };
        if let Some(wanted) = module {
            if record_module != wanted {
                continue;
            }
        }
        records.push(ChangeRecord {
            module: record_module,
            marker,
            note,
            timestamp,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_key;
    use crate::sqlite_store::SqliteChangeStore;

    fn seeded() -> SqliteChangeStore {
        let store = SqliteChangeStore::open_in_memory().unwrap();
        store
            .insert_change(&encode_key("core", '!', "Crash on startup"), 100)
            .unwrap();
        store
            .insert_change(&encode_key("core", '+', "Faster boot"), 200)
            .unwrap();
        store
            .insert_change(&encode_key("api", '!', "Wrong status code"), 300)
            .unwrap();
        store
    }

    #[test]
    fn star_matches_everything() {
        let records = scan(&seeded(), "*").unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn pattern_runs_against_the_full_key() {
        let store = seeded();

        // Module prefix.
        let records = scan(&store, "core;*").unwrap();
        assert_eq!(records.len(), 2);

        // Marker, via the second key field.
        let records = scan(&store, "*;!;*").unwrap();
        assert_eq!(records.len(), 2);

        // Note content.
        let records = scan(&store, "*startup*").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].note, "Crash on startup");
    }

    #[test]
    fn extended_patterns_run_against_the_key() {
        let store = seeded();

        let records = scan(&store, "@(core|api)*").unwrap();
        assert_eq!(records.len(), 3);

        let records = scan(&store, "!(core*)").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, "api");

        let records = scan(&store, "+(core;)!*").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].note, "Crash on startup");
    }

    #[test]
    fn decoded_fields_and_timestamp_survive() {
        let records = scan(&seeded(), "api*").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, "api");
        assert_eq!(records[0].marker, '!');
        assert_eq!(records[0].note, "Wrong status code");
        assert_eq!(records[0].timestamp, 300);
    }

    #[test]
    fn malformed_keys_are_skipped() {
        let store = seeded();
        store.insert_change("no-delimiters-here", 999).unwrap();
        let records = scan(&store, "*").unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn exact_module_filter() {
        let records = scan_exact_module(&seeded(), Some("core")).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.module == "core"));

        // Exact means exact: no glob, no case folding.
        let records = scan_exact_module(&seeded(), Some("cor*")).unwrap();
        assert!(records.is_empty());
        let records = scan_exact_module(&seeded(), Some("CORE")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn no_module_means_no_filter() {
        let records = scan_exact_module(&seeded(), None).unwrap();
        assert_eq!(records.len(), 3);
    }
}
