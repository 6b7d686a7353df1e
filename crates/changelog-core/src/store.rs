use crate::record::ModuleRecord;

/// The trait the storage backend implements.
///
/// The backend owns both logical tables: the module catalog and the
/// change records. Change records are keyed by their composite
/// `module;marker;note` string; the stored value is the submission
/// timestamp in seconds since the epoch.
pub trait ChangeStore: Send + Sync {
    /// Insert or overwrite a module catalog entry.
    fn upsert_module(&self, name: &str, description: &str) -> Result<(), StoreError>;

    /// Scan the whole module catalog, in storage-native order.
    fn modules(&self) -> Result<Vec<ModuleRecord>, StoreError>;

    /// Insert a change record under its composite key, with
    /// no-duplicate-key semantics. Returns `true` if the record was
    /// new, `false` if the key already existed (the insert is then a
    /// no-op, never an update).
    fn insert_change(&self, key: &str, timestamp: i64) -> Result<bool, StoreError>;

    /// Scan every stored change as a raw (key, timestamp) pair, in
    /// storage-native order. The result is a growable sequence with no
    /// capacity ceiling.
    fn changes(&self) -> Result<Vec<(String, i64)>, StoreError>;
}

/// Errors from the change store and the query paths above it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid glob pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },
}
