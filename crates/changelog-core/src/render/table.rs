use std::fmt::Write;

use super::{local_date, trim_note, Render};
use crate::record::ChangeRecord;

/// Grouped tabular report: a header line per run of equal module
/// names, then one pipe-delimited `date|type|note` row per record.
///
/// Column alignment is the consumer's concern; this renderer supplies
/// the ordered, structured rows.
#[derive(Debug, Default)]
pub struct TableRenderer;

impl Render for TableRenderer {
    fn render(&self, records: &[ChangeRecord]) -> String {
        let mut out = String::new();
        let mut last_module: Option<&str> = None;

        for record in records {
            if last_module != Some(record.module.as_str()) {
                let _ = writeln!(out, "Changelog Module({})", record.module);
            }

            let _ = writeln!(
                out,
                "{}|{}|{}",
                local_date(record.timestamp),
                record.kind().label(),
                trim_note(&record.note)
            );

            last_module = Some(record.module.as_str());
        }

        out
    }
}
