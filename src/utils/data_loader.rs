//! CSV loading and saving

use crate::error::{RecalibratorError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Reads a delimited file into a [`DataFrame`], inferring column types.
pub struct DataLoader {
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self { separator: b',' }
    }

    /// Set the field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Load a CSV file with a header row. Row order is preserved and column
    /// types are inferred from every row.
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let parse_opts = CsvParseOptions::default().with_separator(self.separator);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| RecalibratorError::load(path, e))?;

        debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded CSV");
        Ok(df)
    }
}

/// Writes data frames back to disk.
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row and no index column.
    ///
    /// The parent directory must already exist.
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|e| RecalibratorError::write(path, e))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| RecalibratorError::write(path, e))?;

        debug!(path = %path.display(), rows = df.height(), "Saved CSV");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "class_name,class_id,score").unwrap();
        writeln!(file, "car,2,0.91").unwrap();
        writeln!(file, "person,0,0.55").unwrap();
        writeln!(file, "car,2,0.73").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.column("class_name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("class_id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_load_with_separator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("detections.csv");
        std::fs::write(&path, "class_name;class_id;score\ncar;2;0.91\nperson;0;0.55\n").unwrap();

        let df = DataLoader::new().with_separator(b';').load_csv(&path).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = DataLoader::new()
            .load_csv(&dir.path().join("absent.csv"))
            .unwrap_err();
        assert!(matches!(err, RecalibratorError::LoadError { .. }));
    }

    #[test]
    fn test_load_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let err = DataLoader::new().load_csv(file.path()).unwrap_err();
        assert!(matches!(err, RecalibratorError::LoadError { .. }));
    }

    #[test]
    fn test_save_csv_round_trip_keeps_order() {
        let mut df = df!(
            "class_name" => &["b", "a", "c"],
            "score" => &[0.1, 0.2, 0.3]
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        DataSaver::save_csv(&mut df, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("class_name,score\n"));

        let loaded = DataLoader::new().load_csv(&path).unwrap();
        assert_eq!(loaded.shape(), (3, 2));
        let names: Vec<_> = loaded
            .column("class_name")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let mut df = df!("a" => &[1, 2]).unwrap();
        let err = DataSaver::save_csv(&mut df, &dir.path().join("nope").join("out.csv"))
            .unwrap_err();
        assert!(matches!(err, RecalibratorError::WriteError { .. }));
    }
}
