use super::error::InputError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const REPORT_HEADER: [&str; 5] = [
    "PDB_COMPLEX",
    "PDB_COMPLEX_PARTICIPANTS",
    "PDB_SUBCOMPLEX",
    "PDB_SUBCOMPLEX_PARTICIPANTS",
    "PDB_ENTRIES",
];

/// One subcomplex relationship in the flattened report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "PDB_COMPLEX")]
    pub complex_id: String,
    #[serde(rename = "PDB_COMPLEX_PARTICIPANTS")]
    pub complex_participants: String,
    #[serde(rename = "PDB_SUBCOMPLEX")]
    pub subcomplex_id: String,
    #[serde(rename = "PDB_SUBCOMPLEX_PARTICIPANTS")]
    pub subcomplex_participants: String,
    /// Structures supporting the super complex.
    #[serde(rename = "PDB_ENTRIES")]
    pub entries: String,
}

/// Writes the header followed by every row. The header is written even when there are
/// no rows.
pub fn write_report<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(REPORT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_report_to_path<P: AsRef<Path>>(rows: &[ReportRow], path: P) -> Result<(), InputError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| InputError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    write_report(rows, BufWriter::new(file)).map_err(|e| InputError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn row() -> ReportRow {
        ReportRow {
            complex_id: "PDB-CPX-2".to_string(),
            complex_participants: "P1_2,P2_1,P3_1".to_string(),
            subcomplex_id: "PDB-CPX-1".to_string(),
            subcomplex_participants: "P1_2,P2_1".to_string(),
            entries: "1abc,2xyz".to_string(),
        }
    }

    #[test]
    fn report_quotes_comma_joined_lists() {
        let mut buffer = Vec::new();
        write_report(&[row()], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("PDB_COMPLEX,PDB_COMPLEX_PARTICIPANTS,PDB_SUBCOMPLEX,PDB_SUBCOMPLEX_PARTICIPANTS,PDB_ENTRIES")
        );
        assert_eq!(
            lines.next(),
            Some("PDB-CPX-2,\"P1_2,P2_1,P3_1\",PDB-CPX-1,\"P1_2,P2_1\",\"1abc,2xyz\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_report_still_has_header() {
        let mut buffer = Vec::new();
        write_report(&[], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().lines().count(), 1);
    }

    #[test]
    fn report_written_to_path_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report_to_path(&[row()], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let rows: Vec<ReportRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, vec![row()]);
    }
}
