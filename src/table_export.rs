use anyhow::{Context, Result};
use clap::ValueEnum;
use polars::prelude::*;
use pv_aggregator::presentation::{Cell, TableSpec};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

/// Build a typed column: all-int cells become i64, all-numeric f64, anything else text.
fn column_series(name: &str, cells: &[&Cell]) -> Series {
    if cells.iter().all(|c| matches!(c, Cell::Int(_))) {
        let values: Vec<i64> = cells
            .iter()
            .map(|c| match c {
                Cell::Int(v) => *v,
                _ => 0,
            })
            .collect();
        Series::new(name.into(), values)
    } else if cells.iter().all(|c| matches!(c, Cell::Int(_) | Cell::Float(_))) {
        let values: Vec<f64> = cells
            .iter()
            .map(|c| match c {
                Cell::Int(v) => *v as f64,
                Cell::Float(v) => *v,
                Cell::Text(_) => 0.0,
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        Series::new(name.into(), values)
    }
}

pub fn table_to_dataframe(table: &TableSpec) -> Result<DataFrame> {
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Cell> = table.rows.iter().filter_map(|row| row.get(idx)).collect();
            column_series(name, &cells)
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

/// Write a table next to the charts, returning the file path.
pub fn export_table(
    table: &TableSpec,
    dir: &Path,
    name: &str,
    format: TableFormat,
) -> Result<PathBuf> {
    let mut df = table_to_dataframe(table)?;
    let path = dir.join(format!("{}.{}", name, format.extension()));
    let mut file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

    match format {
        TableFormat::Csv => {
            CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        }
        TableFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(&mut df)?;
        }
    }

    log::debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TableSpec {
        TableSpec {
            columns: vec!["Year".to_string(), "January".to_string(), "Month".to_string()],
            rows: vec![
                vec![Cell::Int(2022), Cell::Float(1.5), Cell::Text("January".to_string())],
                vec![Cell::Int(2023), Cell::Int(2), Cell::Text("March".to_string())],
            ],
        }
    }

    #[test]
    fn test_columns_are_typed() {
        let df = table_to_dataframe(&sample_table()).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("Year").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("January").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Month").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_table(&sample_table(), dir.path(), "pivot", TableFormat::Csv).unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("Year,January,Month"));
        assert_eq!(written.lines().count(), 3);
        assert!(written.lines().last().unwrap().starts_with("2023,"));
    }
}
