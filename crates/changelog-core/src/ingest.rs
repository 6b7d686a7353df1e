use tracing::{debug, info};

use crate::record::encode_key;
use crate::scope::{set_scope, ModuleScope};
use crate::store::{ChangeStore, StoreError};

/// One parsed line of the ingestion protocol.
///
/// The leading marker byte selects the directive; anything else
/// (including blank lines and lines too short to carry a payload) is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `:name description` — define or overwrite a catalog entry.
    DefineModule { name: &'a str, description: &'a str },
    /// `@pattern` — replace the active module scope.
    SetScope { pattern: &'a str },
    /// `!note` / `+note` — record a change against the active scope.
    AddChange { marker: char, note: &'a str },
    Ignored,
}

/// Parse a single input line into a directive.
///
/// Change lines shorter than two characters (a bare marker) are
/// rejected here, before any store access.
pub fn parse_line(line: &str) -> Directive<'_> {
    let mut chars = line.chars();
    match chars.next() {
        Some(':') => {
            let rest = chars.as_str().trim_start();
            let mut parts = rest.splitn(2, ' ');
            let name = parts.next().unwrap_or("");
            if name.is_empty() {
                return Directive::Ignored;
            }
            Directive::DefineModule {
                name,
                description: parts.next().unwrap_or(""),
            }
        }
        Some('@') => Directive::SetScope {
            pattern: chars.as_str(),
        },
        Some(marker @ ('!' | '+')) => {
            let note = chars.as_str();
            if note.is_empty() {
                return Directive::Ignored;
            }
            Directive::AddChange { marker, note }
        }
        _ => Directive::Ignored,
    }
}

/// Record one change against every module in the active scope.
///
/// Fan-out follows scope insertion order. A key that already exists is
/// left untouched (the insert is idempotent per module/marker/note
/// triple). An empty scope drops the change entirely: no record, no
/// error. Returns how many records were actually new.
pub fn add_change(
    store: &dyn ChangeStore,
    marker: char,
    note: &str,
    scope: &ModuleScope,
    now: i64,
) -> Result<usize, StoreError> {
    if note.is_empty() {
        return Ok(0);
    }
    if scope.is_empty() {
        debug!(note, "change submitted with empty scope, dropped");
        return Ok(0);
    }

    let mut new_records = 0;
    for module in scope.names() {
        let key = encode_key(module, marker, note);
        if store.insert_change(&key, now)? {
            info!(%key, "new record");
            new_records += 1;
        } else {
            debug!(%key, "duplicate change, skipped");
        }
    }
    Ok(new_records)
}

/// Apply one input line, threading the active scope through.
///
/// The scope is a value, not shared state: `@` lines return a freshly
/// resolved scope, every other line passes the current one along.
pub fn apply_line(
    store: &dyn ChangeStore,
    scope: ModuleScope,
    line: &str,
    now: i64,
) -> Result<ModuleScope, StoreError> {
    match parse_line(line) {
        Directive::DefineModule { name, description } => {
            store.upsert_module(name, description)?;
            Ok(scope)
        }
        Directive::SetScope { pattern } => set_scope(store, pattern),
        Directive::AddChange { marker, note } => {
            add_change(store, marker, note, &scope, now)?;
            Ok(scope)
        }
        Directive::Ignored => Ok(scope),
    }
}
