//! Titanic passenger CSV reader.
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One row of the passenger table as it appears on disk.
///
/// Columns are matched by header name, so their order in the file does not
/// matter. Text columns (`Name`, `Ticket`, `Cabin`) are kept for completeness
/// but never reach the feature matrix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPassenger {
    #[serde(rename = "PassengerId")]
    pub passenger_id: i64,
    /// Absent for unlabeled files.
    #[serde(rename = "Survived", default)]
    pub survived: Option<u8>,
    #[serde(rename = "Pclass")]
    pub pclass: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age", default)]
    pub age: Option<f64>,
    #[serde(rename = "SibSp")]
    pub sibsp: i64,
    #[serde(rename = "Parch")]
    pub parch: i64,
    #[serde(rename = "Ticket", default)]
    pub ticket: Option<String>,
    #[serde(rename = "Fare", default)]
    pub fare: Option<f64>,
    #[serde(rename = "Cabin", default)]
    pub cabin: Option<String>,
    #[serde(rename = "Embarked", default)]
    pub embarked: Option<String>,
}

/// Read a headered passenger CSV (or TSV, by extension) into raw records.
pub fn read_titanic_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawPassenger>> {
    let path = path.as_ref();
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open passenger file: {}", path.display()))?;

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<RawPassenger>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let record = row.with_context(|| {
            format!(
                "Failed to parse row {} of {}",
                idx + 2,
                path.display()
            )
        })?;
        records.push(record);
    }

    log::debug!(
        "Read {} passenger records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_labeled_rows_with_missing_fields() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked"
        )
        .unwrap();
        writeln!(
            file,
            "1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S"
        )
        .unwrap();
        writeln!(file, "2,1,1,\"Cumings, Mrs. John\",female,,1,0,PC 17599,71.2833,C85,").unwrap();

        let rows = read_titanic_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].survived, Some(0));
        assert_eq!(rows[0].cabin, None);
        assert_eq!(rows[1].age, None);
        assert_eq!(rows[1].embarked, None);
        assert_eq!(rows[1].sex, "female");
    }

    #[test]
    fn test_unlabeled_file_has_no_survived() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "PassengerId,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked").unwrap();
        writeln!(file, "892,3,male,34.5,0,0,7.8292,Q").unwrap();

        let rows = read_titanic_csv(file.path()).unwrap();
        assert_eq!(rows[0].survived, None);
        assert_eq!(rows[0].embarked.as_deref(), Some("Q"));
    }

    #[test]
    fn test_bad_numeric_field_reports_row() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "PassengerId,Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked").unwrap();
        writeln!(file, "1,0,3,male,22,one,0,7.25,S").unwrap();

        let err = read_titanic_csv(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("row 2"));
    }
}
