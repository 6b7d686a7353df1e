use serde::{Deserialize, Serialize};

/// Delimiter separating the module, marker, and note fields of a
/// persisted change key.
pub const KEY_DELIMITER: char = ';';

/// A catalog entry mapping a module name to its free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub name: String,
    pub description: String,
}

/// Classification of a change, derived from its marker character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Fix,
    Enhancement,
    Undefined,
}

impl ChangeKind {
    /// Map a marker character to its kind. `!` is a fix, `+` an
    /// enhancement, anything else is undefined.
    pub fn from_marker(marker: char) -> Self {
        match marker {
            '!' => ChangeKind::Fix,
            '+' => ChangeKind::Enhancement,
            _ => ChangeKind::Undefined,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Fix => "Fix",
            ChangeKind::Enhancement => "Enhancement",
            ChangeKind::Undefined => "Undefined",
        }
    }
}

/// One recorded change, decoded from its composite key and stored
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub module: String,
    /// The marker character as persisted. The rendered label comes from
    /// [`ChangeKind::from_marker`], but the raw marker is what keys the
    /// record, so unknown markers survive a round trip.
    pub marker: char,
    pub note: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChangeRecord {
    pub fn kind(&self) -> ChangeKind {
        ChangeKind::from_marker(self.marker)
    }
}

/// Encode the composite identity of a change as `module;marker;note`.
///
/// The note may itself contain the delimiter; decoding only splits on
/// the first two occurrences.
pub fn encode_key(module: &str, marker: char, note: &str) -> String {
    format!("{}{}{}{}{}", module, KEY_DELIMITER, marker, KEY_DELIMITER, note)
}

/// Decode a raw composite key into (module, marker, note).
///
/// Returns `None` for keys with fewer than two delimiters; callers skip
/// such records rather than fault. An empty marker field decodes to a
/// space, which classifies as [`ChangeKind::Undefined`].
pub fn decode_key(raw: &str) -> Option<(String, char, String)> {
    let mut parts = raw.splitn(3, KEY_DELIMITER);
    let module = parts.next()?;
    let marker = parts.next()?;
    let note = parts.next()?;
    Some((
        module.to_string(),
        marker.chars().next().unwrap_or(' '),
        note.to_string(),
    ))
}
