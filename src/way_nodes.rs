//! Way-to-node membership table, rendered as a PostgreSQL `COPY ... FROM STDIN` script.

use std::fmt;
use std::io::{self, Write};

use crate::overpass::OverpassDocument;

pub const COPY_TABLE: &str = "osm.osm_raw_way_nodes";
pub const COPY_COLUMNS: [&str; 3] = ["raw_way", "raw_node", "ordinal"];
pub const COPY_TERMINATOR: &str = "\\.";

/// One node reference of a way, with its zero-based position in the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WayNodeRow {
    pub way_id: i64,
    pub node_id: i64,
    pub ordinal: usize,
}

impl fmt::Display for WayNodeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "way/{},node/{},{}", self.way_id, self.node_id, self.ordinal)
    }
}

/// Rows for every way of `document`, ways in document order, references in way order.
/// References are taken as they are; repeated or dangling node ids are kept.
pub fn way_node_rows(document: &OverpassDocument) -> Vec<WayNodeRow> {
    document
        .ways()
        .flat_map(|way| {
            way.nodes
                .iter()
                .enumerate()
                .map(move |(ordinal, &node_id)| WayNodeRow {
                    way_id: way.id,
                    node_id,
                    ordinal,
                })
        })
        .collect()
}

pub fn copy_header() -> String {
    format!(
        "COPY {} ({}) FROM STDIN csv;",
        COPY_TABLE,
        COPY_COLUMNS.join(", ")
    )
}

/// Header line, one CSV line per row, then the `\.` terminator. Every line ends in `\n`.
pub fn write_copy_script<W: Write>(mut writer: W, rows: &[WayNodeRow]) -> io::Result<()> {
    writeln!(writer, "{}", copy_header())?;
    for row in rows {
        writeln!(writer, "{}", row)?;
    }
    writeln!(writer, "{}", COPY_TERMINATOR)?;
    writer.flush()
}
