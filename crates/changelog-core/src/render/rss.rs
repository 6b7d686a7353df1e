use std::fmt::Write;

use super::{rfc822_date, trim_note, Render};
use crate::record::ChangeRecord;

/// RSS 2.0 feed: one `<item>` per record, titled
/// `{type}: {module} ({date})`, with the same RFC-822 date reused for
/// `pubDate`.
#[derive(Debug, Default)]
pub struct RssRenderer;

impl Render for RssRenderer {
    fn render(&self, records: &[ChangeRecord]) -> String {
        let mut out = String::new();

        out.push_str("<?xml version = \"1.0\" ?>\n");
        out.push_str("<rss version = \"2.0\">\n");
        out.push_str("\t<channel>\n");
        out.push_str("\t\t<title>Changelog RSS</title>\n");
        out.push_str("\t\t<description>Changelog</description>\n");

        for record in records {
            let date = rfc822_date(record.timestamp);
            out.push_str("\t\t<item>\n");
            let _ = writeln!(
                out,
                "\t\t\t<title>{}: {} ({})</title>",
                record.kind().label(),
                record.module,
                date
            );
            let _ = writeln!(
                out,
                "\t\t\t<description>{}</description>",
                trim_note(&record.note)
            );
            let _ = writeln!(out, "\t\t\t<pubDate>{}</pubDate>", date);
            out.push_str("\t\t</item>\n");
        }

        out.push_str("\t</channel>\n");
        out.push_str("</rss>\n");

        out
    }
}
