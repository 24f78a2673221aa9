//! Reader for the bulk puzzle snapshot.
//!
//! Row format: `PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl`
//! with space-separated moves and themes. A header line, when present, maps
//! columns by name; otherwise the fixed order above applies. Rows missing an
//! id, a FEN or moves are skipped and counted.

use std::io::{self, BufRead, Lines};

use crate::puzzle::PuzzleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    id: usize,
    fen: usize,
    moves: usize,
    rating: usize,
    themes: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            id: 0,
            fen: 1,
            moves: 2,
            rating: 3,
            themes: 7,
        }
    }
}

impl Columns {
    /// Resolve column positions from a header line. `None` if the line is
    /// not a header.
    pub fn from_header(line: &str) -> Option<Self> {
        let names: Vec<&str> = line.trim_end_matches('\r').split(',').map(str::trim).collect();
        let find = |name: &str| names.iter().position(|n| *n == name);

        Some(Self {
            id: find("PuzzleId")?,
            fen: find("FEN")?,
            moves: find("Moves")?,
            rating: find("Rating")?,
            themes: find("Themes")?,
        })
    }

    /// Parse one data row. `None` for rows that are missing a required field
    /// or carry an unparsable rating.
    pub fn parse_row(&self, line: &str) -> Option<PuzzleRecord> {
        let fields: Vec<&str> = line.trim_end_matches('\r').split(',').collect();
        let field = |i: usize| fields.get(i).map(|s| s.trim()).unwrap_or("");

        let id = field(self.id);
        let fen = field(self.fen);
        let moves: Vec<String> = field(self.moves).split_whitespace().map(String::from).collect();
        if id.is_empty() || fen.is_empty() || moves.is_empty() {
            return None;
        }

        let rating = match field(self.rating) {
            "" => 0,
            r => r.parse::<i64>().ok()?,
        };
        let themes = field(self.themes).split_whitespace().map(String::from).collect();

        PuzzleRecord::new(id, fen, moves, rating, themes).ok()
    }
}

/// Streaming iterator over snapshot records.
pub struct SnapshotReader<R> {
    lines: Lines<R>,
    columns: Option<Columns>,
    scanned: usize,
    limit: usize,
    skipped: usize,
    error: Option<io::Error>,
}

impl<R: BufRead> SnapshotReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            columns: None,
            scanned: 0,
            limit: usize::MAX,
            skipped: 0,
            error: None,
        }
    }

    /// Stop after `limit` non-blank lines, malformed rows included.
    pub fn scan_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Non-blank lines read so far.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Rows dropped as malformed so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// The I/O error that ended iteration early, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<R: BufRead> Iterator for SnapshotReader<R> {
    type Item = PuzzleRecord;

    fn next(&mut self) -> Option<PuzzleRecord> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.error = Some(e);
                    return None;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if self.scanned >= self.limit {
                return None;
            }
            self.scanned += 1;

            let columns = match self.columns {
                Some(columns) => columns,
                None => {
                    if let Some(header) = Columns::from_header(&line) {
                        self.columns = Some(header);
                        continue;
                    }
                    *self.columns.insert(Columns::default())
                }
            };

            match columns.parse_row(&line) {
                Some(record) => return Some(record),
                None => self.skipped += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl,OpeningTags";
    const ROW: &str = "0000D,5rk1/1p3ppp/pq3b2/8/8/1P1Q1N2/P4PPP/3R2K1 w - - 2 27,d3d6 f8d8 d6d8 f6d8,1485,76,94,6535,advantage endgame short,https://lichess.org/F8M8OS71#53,";

    #[test]
    fn test_reader_with_header() {
        let data = format!("{HEADER}\n{ROW}\n");
        let records: Vec<_> = SnapshotReader::new(Cursor::new(data)).collect();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "0000D");
        assert_eq!(r.solution_moves, vec!["d3d6", "f8d8", "d6d8", "f6d8"]);
        assert_eq!(r.rating, 1485);
        assert_eq!(r.themes, vec!["advantage", "endgame", "short"]);
    }

    #[test]
    fn test_reader_without_header_uses_fixed_order() {
        let records: Vec<_> = SnapshotReader::new(Cursor::new(format!("{ROW}\r\n"))).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].themes.len(), 3);
    }

    #[test]
    fn test_reader_skips_malformed_rows() {
        let data = format!(
            "{HEADER}\n,8/8/8/8/8/8/8/8 w - - 0 1,e2e4,1000,0,0,0,fork,\nabc,,e2e4,1000,0,0,0,fork,\nabd,5rk1/1p3ppp/pq3b2/8/8/1P1Q1N2/P4PPP/3R2K1 w - - 2 27,,1000,0,0,0,fork,\nabe,5rk1/1p3ppp/pq3b2/8/8/1P1Q1N2/P4PPP/3R2K1 w - - 2 27,d3d6,high,0,0,0,fork,\n{ROW}\n"
        );
        let mut reader = SnapshotReader::new(Cursor::new(data));
        let records: Vec<_> = reader.by_ref().collect();

        assert_eq!(records.len(), 1);
        assert_eq!(reader.skipped(), 4);
        assert!(reader.take_error().is_none());
    }

    #[test]
    fn test_scan_limit_counts_malformed_rows() {
        let mut data = String::new();
        for i in 0..50 {
            data.push_str(&format!("bad{i},,,,,,,,\n"));
        }
        data.push_str(ROW);
        data.push('\n');

        let mut reader = SnapshotReader::new(Cursor::new(data.clone())).scan_limit(20);
        assert_eq!(reader.by_ref().count(), 0);
        assert_eq!(reader.scanned(), 20);
        assert_eq!(reader.skipped(), 20);

        let records: Vec<_> = SnapshotReader::new(Cursor::new(data)).scan_limit(51).collect();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_header_detection() {
        assert!(Columns::from_header(HEADER).is_some());
        assert!(Columns::from_header(ROW).is_none());
    }
}
