use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::models::{Record, Sex};

/// INSEE aggregates names below the publication threshold under this label.
const RARE_NAMES_SENTINEL: &str = "_PRENOMS_RARES";
/// Department code for rows whose department is unknown.
const UNKNOWN_DEPARTMENT: &str = "XX";

/// Read the yearly registry from a semicolon- or comma-delimited file.
///
/// Rows are dropped (never surfaced as errors) when:
/// * the year (`annais`) does not parse as an integer,
/// * the name is the rare-names sentinel,
/// * the department is the unknown sentinel,
/// * the sex code is neither 1 nor 2.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        sexe: String,
        preusuel: String,
        annais: String,
        dpt: String,
        nombre: u64,
    }

    let delimiter = sniff_delimiter(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("opening registry file {}", path.display()))?;

    let mut records = Vec::new();
    let mut dropped_years = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;

        if row.preusuel == RARE_NAMES_SENTINEL || row.dpt == UNKNOWN_DEPARTMENT {
            continue;
        }

        // Coerce-to-missing-then-drop: a malformed year loses the row, not the load.
        let Ok(year) = row.annais.parse::<i32>() else {
            dropped_years += 1;
            continue;
        };

        let sex = match row.sexe.as_str() {
            "1" => Sex::Male,
            "2" => Sex::Female,
            other => {
                log::debug!("skipping row with unknown sex code {other:?}");
                continue;
            }
        };

        records.push(Record {
            year,
            name: row.preusuel,
            sex,
            department: row.dpt,
            count: row.nombre,
        });
    }

    if dropped_years > 0 {
        log::info!(
            "dropped {dropped_years} rows with unparseable years from {}",
            path.display()
        );
    }

    Ok(records)
}

fn sniff_delimiter(path: &Path) -> anyhow::Result<u8> {
    let file = File::open(path)
        .with_context(|| format!("opening registry file {}", path.display()))?;
    let mut header = String::new();
    BufReader::new(file)
        .read_line(&mut header)
        .with_context(|| format!("reading header of {}", path.display()))?;
    Ok(if header.contains(';') { b';' } else { b',' })
}

/// Process-lifetime record cache keyed by canonical path. Repeated loads of the
/// same file return the already-parsed records; entries are never evicted.
#[derive(Default)]
pub struct RecordStore {
    cache: HashMap<PathBuf, Arc<Vec<Record>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> anyhow::Result<Arc<Vec<Record>>> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(records) = self.cache.get(&key) {
            return Ok(Arc::clone(records));
        }

        let records = Arc::new(read_records(path)?);
        log::info!("loaded {} records from {}", records.len(), path.display());
        self.cache.insert(key, Arc::clone(&records));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_registry(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn reads_semicolon_delimited_rows() {
        let file = write_registry(
            "sexe;preusuel;annais;dpt;nombre\n\
             1;EMMA;2020;75;10\n\
             2;EMMA;2020;75;90\n",
        );

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "EMMA");
        assert_eq!(records[0].year, 2020);
        assert_eq!(records[0].sex, Sex::Male);
        assert_eq!(records[1].sex, Sex::Female);
        assert_eq!(records[1].count, 90);
    }

    #[test]
    fn reads_comma_delimited_rows() {
        let file = write_registry(
            "sexe,preusuel,annais,dpt,nombre\n\
             2,LOUISE,2019,33,42\n",
        );

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].department, "33");
        assert_eq!(records[0].count, 42);
    }

    #[test]
    fn drops_sentinel_and_malformed_rows() {
        let file = write_registry(
            "sexe;preusuel;annais;dpt;nombre\n\
             1;_PRENOMS_RARES;2020;75;999\n\
             2;EMMA;2020;XX;50\n\
             2;EMMA;XXXX;75;50\n\
             3;EMMA;2020;75;50\n\
             2;EMMA;2020;75;7\n",
        );

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 7);
    }

    #[test]
    fn record_store_returns_cached_records() {
        let file = write_registry(
            "sexe;preusuel;annais;dpt;nombre\n\
             2;EMMA;2020;75;7\n",
        );

        let mut store = RecordStore::new();
        let first = store.load(file.path()).unwrap();
        let second = store.load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }
}
