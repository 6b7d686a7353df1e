//! Renderers for sorted change lists.
//!
//! One capability, three variant implementations: the same sorted
//! record sequence renders as a grouped table, an RSS 2.0 feed, or a
//! DocBook 5.0 variable list. Output structure is kept byte-compatible
//! with the consumers of the original tool.

mod docbook;
mod rss;
mod table;

pub use docbook::DocbookRenderer;
pub use rss::RssRenderer;
pub use table::TableRenderer;

use chrono::{DateTime, Local};

use crate::record::ChangeRecord;

/// Format a sorted record list into one output document.
pub trait Render {
    fn render(&self, records: &[ChangeRecord]) -> String;
}

/// `YYYY-MM-DD` in local time, for the table and DocBook outputs.
pub(crate) fn local_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// RFC-822 date in UTC, used verbatim for both the item title and
/// `pubDate` of the feed.
pub(crate) fn rfc822_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_default()
}

/// Strip exactly one trailing period from a note, altering nothing
/// else.
pub(crate) fn trim_note(note: &str) -> &str {
    note.strip_suffix('.').unwrap_or(note)
}
