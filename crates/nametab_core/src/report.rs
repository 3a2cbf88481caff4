//! Framed diagnostic output: a box-drawn dump of every non-empty slot plus
//! an aggregate statistics block, written to any `io::Write`.
//!
//! Two variants share the row renderer: the console dump numbers rows
//! logically (1..n over printed rows), the file report shows the physical
//! slot index and appends the outcome of the last search. File sinks are
//! published atomically, tmp-then-persist.

use crate::consts::{IDENTITY_WIDTH, VALUE_WIDTH};
use crate::errors::Result;
use crate::table::{NameTable, Probe, Slot};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Aggregate slot counts for the statistics block and `report --json`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableStats {
    pub capacity: usize,
    pub occupied: usize,
    pub tombstones: usize,
    pub empty: usize,
    pub load_percent: f64,
}

impl TableStats {
    pub fn collect(table: &NameTable) -> Self {
        let mut occupied = 0;
        let mut tombstones = 0;
        let mut empty = 0;
        for slot in table.slots() {
            match slot {
                Slot::Empty => empty += 1,
                Slot::Occupied(_) => occupied += 1,
                Slot::Tombstone(_) => tombstones += 1,
            }
        }
        Self {
            capacity: table.capacity(),
            occupied,
            tombstones,
            empty,
            load_percent: occupied as f64 * 100.0 / table.capacity() as f64,
        }
    }
}

const COLS: [usize; 6] = [7, 10, 8, IDENTITY_WIDTH, 8, VALUE_WIDTH];

fn frame(left: char, mid: char, right: char) -> String {
    let mut s = String::new();
    s.push(left);
    for (i, w) in COLS.iter().enumerate() {
        if i > 0 {
            s.push(mid);
        }
        for _ in 0..w + 2 {
            s.push('─');
        }
    }
    s.push(right);
    s
}

fn elide(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let cut: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn render_rows<W: Write>(table: &NameTable, w: &mut W, physical_index: bool) -> io::Result<()> {
    writeln!(w, "{}", frame('┌', '┬', '┐'))?;
    writeln!(
        w,
        "│ {:<7} │ {:<10} │ {:<8} │ {:<iw$} │ {:<8} │ {:<vw$} │",
        "Index",
        "Hash",
        "Status",
        "Identity",
        "Id",
        "Value",
        iw = IDENTITY_WIDTH,
        vw = VALUE_WIDTH
    )?;
    writeln!(w, "{}", frame('├', '┼', '┤'))?;
    let mut row = 0usize;
    for (idx, slot) in table.slots().iter().enumerate() {
        let (status, entry) = match slot {
            Slot::Empty => continue,
            Slot::Occupied(e) => ("Occupied", e),
            Slot::Tombstone(e) => ("Deleted", e),
        };
        row += 1;
        let shown = if physical_index { idx } else { row };
        writeln!(
            w,
            "│ {:>7} │ {:>10} │ {:<8} │ {:<iw$} │ {:>8} │ {:<vw$} │",
            shown,
            entry.stored_hash,
            status,
            elide(&entry.identity, IDENTITY_WIDTH),
            entry.id,
            elide(&entry.raw, VALUE_WIDTH),
            iw = IDENTITY_WIDTH,
            vw = VALUE_WIDTH
        )?;
    }
    writeln!(w, "{}", frame('└', '┴', '┘'))
}

fn render_stats<W: Write>(stats: &TableStats, w: &mut W) -> io::Result<()> {
    let rows = [
        ("Total slots", stats.capacity.to_string()),
        ("Occupied", stats.occupied.to_string()),
        ("Deleted", stats.tombstones.to_string()),
        ("Free", stats.empty.to_string()),
        ("Load factor", format!("{:.1}%", stats.load_percent)),
    ];
    writeln!(w, "\nStatistics:")?;
    writeln!(w, "┌──────────────────────┬──────────────┐")?;
    for (i, (label, value)) in rows.iter().enumerate() {
        if i > 0 {
            writeln!(w, "├──────────────────────┼──────────────┤")?;
        }
        writeln!(w, "│ {label:<20} │ {value:>12} │")?;
    }
    writeln!(w, "└──────────────────────┴──────────────┘")
}

/// Console dump: logically numbered rows plus the statistics block.
pub fn render_dump<W: Write>(table: &NameTable, w: &mut W) -> io::Result<()> {
    render_rows(table, w, false)?;
    render_stats(&TableStats::collect(table), w)
}

/// File report: physical slot indexes, statistics, and the outcome of the
/// last search when one was made.
pub fn render_report<W: Write>(
    table: &NameTable,
    w: &mut W,
    probe: Option<&Probe>,
) -> io::Result<()> {
    let now = time::OffsetDateTime::now_utc();
    writeln!(w, "Report generated at {now}")?;
    writeln!(w)?;
    render_rows(table, w, true)?;
    render_stats(&TableStats::collect(table), w)?;
    if let Some(p) = probe {
        writeln!(w, "\nSearch outcome:")?;
        match p.line_number {
            Some(n) => writeln!(w, "Found: line {n}, steps = {}", p.steps)?,
            None => writeln!(w, "Key not found. Steps = {}", p.steps)?,
        }
    }
    Ok(())
}

/// Write the live records to `path`, atomically published.
pub fn save_export(table: &NameTable, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref().to_path_buf();
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix("nametab_out_")
        .tempfile_in(dir)?;
    table.export(tmp.as_file_mut())?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&path)?;
    Ok(path)
}

/// Write the framed report to `path`, atomically published.
pub fn save_report(
    table: &NameTable,
    path: impl AsRef<Path>,
    probe: Option<&Probe>,
) -> Result<PathBuf> {
    let path = path.as_ref().to_path_buf();
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix("nametab_rep_")
        .tempfile_in(dir)?;
    render_report(table, tmp.as_file_mut(), probe)?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> NameTable {
        let mut t = NameTable::with_capacity(10);
        t.insert("Ivanov Artem Petrovich Lada Granta 08:30 1", 1)
            .unwrap();
        t.insert("Popov Vladislav Andreevich Toyota Camry 16:48 2", 2)
            .unwrap();
        t.insert("Smirnov Oleg Ivanovich Ford Focus 12:05 3", 3)
            .unwrap();
        t.remove("Smirnov Oleg Ivanovich Ford Focus 12:05 3").unwrap();
        t
    }

    #[test]
    fn stats_count_every_slot_state() {
        let t = small_table();
        let stats = TableStats::collect(&t);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.occupied, 2);
        assert_eq!(stats.tombstones, 1);
        assert_eq!(stats.empty, 7);
        assert!((stats.load_percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn dump_shows_live_and_deleted_rows() {
        let t = small_table();
        let mut out = Vec::new();
        render_dump(&t, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Occupied"));
        assert!(text.contains("Deleted"));
        assert!(text.contains("Statistics:"));
        assert!(text.contains("Popov Vladislav A..."));
    }

    #[test]
    fn report_appends_search_outcome() {
        let t = small_table();
        let probe = Probe {
            line_number: Some(2),
            steps: 1,
        };
        let mut out = Vec::new();
        render_report(&t, &mut out, Some(&probe)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Found: line 2, steps = 1"));
    }

    #[test]
    fn long_values_are_elided() {
        assert_eq!(elide("short", 20), "short");
        assert_eq!(elide("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn stats_serialize_to_json() {
        let stats = TableStats::collect(&small_table());
        let v = serde_json::to_value(stats).unwrap();
        assert_eq!(v["occupied"], 2);
        assert_eq!(v["tombstones"], 1);
    }

    #[test]
    fn saved_export_is_published_at_the_target_path() {
        let dir = tempfile::tempdir().unwrap();
        let t = small_table();
        let path = save_export(&t, dir.path().join("output.txt")).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Toyota Camry"));
    }
}
