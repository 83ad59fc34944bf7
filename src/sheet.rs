use std::io::Read;
use std::path::Path;

use serde_json::{Number, Value};

use crate::error::Result;
use crate::models::RawRow;

pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let reader = csv::Reader::from_path(path)?;
    collect_rows(reader)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawRow>> {
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let cell = cell.trim();
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            row.insert(header.clone(), cell_value(cell));
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn cell_value(cell: &str) -> Value {
    match cell.parse::<i64>() {
        Ok(n) => Value::Number(Number::from(n)),
        Err(_) => Value::String(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::ingest::ingest;
    use crate::models::{IngestSummary, NameMatch};
    use crate::store::memory::MemoryStore;
    use crate::store::RecordStore;
    use std::io::Write;

    fn read_rows_from(input: &str) -> Result<Vec<RawRow>> {
        collect_rows(csv::Reader::from_reader(input.as_bytes()))
    }

    #[test]
    fn numbers_become_json_numbers_and_blanks_are_dropped() {
        let csv = "slNo, name ,company,batch,status\n1,Ann Lee,,2019,Employed\n";
        let rows = read_rows_from(csv).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get("slNo"), Some(&Value::from(1)));
        assert_eq!(row.get("name"), Some(&Value::from("Ann Lee")));
        assert_eq!(row.get("batch"), Some(&Value::from(2019)));
        assert!(row.get("company").is_none());
    }

    #[test]
    fn blank_lines_produce_no_rows() {
        let csv = "name,batch\nAnn Lee,2019\n,\n";
        let rows = read_rows_from(csv).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,batch,status").unwrap();
        writeln!(file, "Bo Chen,2020,Studying").unwrap();
        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows[0].get("status"), Some(&Value::from("Studying")));
    }

    #[tokio::test]
    async fn float_formatted_batch_cells_import() {
        let store = MemoryStore::new();
        let csv = "name,batch,slNo\nAnn Lee,2019.0,3.0\nBo Chen, 2020 ,4\n";
        let rows = read_rows_from(csv).unwrap();
        let summary = ingest(&store, rows, NameMatch::CaseInsensitive).await.unwrap();
        assert_eq!(summary, IngestSummary { inserted: 2, skipped: 0 });

        let stored = store.find_all_sorted_by_status().await.unwrap();
        let ann = stored.iter().find(|r| r.name == "Ann Lee").unwrap();
        assert_eq!(ann.batch, 2019);
        assert_eq!(ann.sequence_number, Some(3));
    }

    #[tokio::test]
    async fn fractional_batch_cell_is_rejected() {
        let store = MemoryStore::new();
        let rows = read_rows_from("name,batch\nAnn Lee,2019.5\n").unwrap();
        let err = ingest(&store, rows, NameMatch::CaseInsensitive)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { row: 1, field: "batch", .. }));
    }
}
