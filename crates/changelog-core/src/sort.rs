use crate::record::ChangeRecord;

/// Order records for rendering: module ascending (bytewise), then most
/// recent first within a module.
///
/// The sort is stable, so records sharing a module and timestamp keep
/// their scan order.
pub fn sort_changes(records: &mut [ChangeRecord]) {
    records.sort_by(|a, b| {
        a.module
            .cmp(&b.module)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
}
