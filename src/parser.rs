// CSV parsing - one denormalized row per taxonomy leaf

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, LoadResult};

/// One row of the source CSV, bound by header name.
///
/// The file carries the full ancestry on every row; normalization into the
/// four levels happens later in the prepare stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyRow {
    #[serde(rename = "Segment")]
    pub segment: i64,

    #[serde(rename = "Segment Name")]
    pub segment_name: String,

    #[serde(rename = "Family")]
    pub family: i64,

    #[serde(rename = "Family Name")]
    pub family_name: String,

    #[serde(rename = "Class")]
    pub class: i64,

    #[serde(rename = "Class Name")]
    pub class_name: String,

    #[serde(rename = "Commodity")]
    pub commodity: i64,

    #[serde(rename = "Commodity Name")]
    pub commodity_name: String,
}

/// Read all taxonomy rows from a CSV file.
///
/// A nonexistent path is treated as "no data" and yields an empty vec.
/// A row that cannot be bound to the expected columns (missing column,
/// non-numeric code) is a fatal [`LoadError::MalformedRow`].
pub fn read_rows(csv_path: &Path) -> LoadResult<Vec<TaxonomyRow>> {
    if !csv_path.exists() {
        debug!(path = %csv_path.display(), "source file missing, loading empty dataset");
        return Ok(Vec::new());
    }

    let mut rdr = csv::Reader::from_path(csv_path)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: TaxonomyRow = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or_default();
            LoadError::MalformedRow {
                line,
                message: e.to_string(),
            }
        })?;
        rows.push(row);
    }

    debug!(rows = rows.len(), path = %csv_path.display(), "parsed source file");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "Segment,Segment Name,Family,Family Name,Class,Class Name,Commodity,Commodity Name";

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_rows_binds_by_header() {
        let file = write_csv(&[
            "10,Food,1010,Cereals,101010,Wheat,10101001,Wheat Seed",
            "10,Food,1010,Cereals,101010,Wheat,10101002,Wheat Flour",
        ]);

        let rows = read_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].segment, 10);
        assert_eq!(rows[0].segment_name, "Food");
        assert_eq!(rows[0].class, 101010);
        assert_eq!(rows[1].commodity, 10101002);
        assert_eq!(rows[1].commodity_name, "Wheat Flour");
    }

    #[test]
    fn test_missing_file_is_empty_dataset() {
        let rows = read_rows(Path::new("/nonexistent/taxonomy.csv")).unwrap();
        assert!(rows.is_empty(), "missing file should load as empty, not error");
    }

    #[test]
    fn test_non_numeric_code_is_fatal() {
        let file = write_csv(&["ten,Food,1010,Cereals,101010,Wheat,10101001,Wheat Seed"]);

        let err = read_rows(file.path()).unwrap_err();
        assert!(
            matches!(err, LoadError::MalformedRow { line: 2, .. }),
            "expected MalformedRow at line 2, got: {err}"
        );
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Segment,Segment Name,Family,Family Name").unwrap();
        writeln!(file, "10,Food,1010,Cereals").unwrap();
        file.flush().unwrap();

        let err = read_rows(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { .. }));
    }

    #[test]
    fn test_quoted_names_with_commas() {
        let file = write_csv(&[
            "10,\"Live Plant, Animal Material\",1010,Live animals,101015,Livestock,10101501,Cats",
        ]);

        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows[0].segment_name, "Live Plant, Animal Material");
    }
}
