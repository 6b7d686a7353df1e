use std::fmt::Write;

use super::{local_date, trim_note, Render};
use crate::record::ChangeRecord;

/// DocBook 5.0 `<variablelist>`: the date as each entry's term, the
/// bolded type label and the note as the list item body.
#[derive(Debug, Default)]
pub struct DocbookRenderer;

impl Render for DocbookRenderer {
    fn render(&self, records: &[ChangeRecord]) -> String {
        let mut out = String::new();

        out.push_str(
            "   <variablelist xmlns=\"http://docbook.org/ns/docbook\" version=\"5.0\">\n",
        );

        for record in records {
            out.push_str("      <varlistentry>\n");
            let _ = writeln!(
                out,
                "         <term><emphasis role=\"bold\">{}</emphasis></term>",
                local_date(record.timestamp)
            );
            let _ = writeln!(
                out,
                "         <listitem><para><emphasis role=\"bold\">{}</emphasis> {}.</para></listitem>",
                record.kind().label(),
                trim_note(&record.note)
            );
            out.push_str("      </varlistentry>\n");
        }

        out.push_str("   </variablelist>\n");

        out
    }
}
