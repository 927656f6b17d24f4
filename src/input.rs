use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::io::SerReader;
use polars::prelude::{CsvReader, DataFrame, DataType};

use crate::location::Kind;

/// Header names every input CSV must carry; extra columns are
/// ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "streetname",
    "kind",
    "center_lon",
    "center_lat",
    "city_place_node",
    "city_place_city",
];

/// One validated input row. Rows with an empty name or unparseable
/// coordinates never make it out of [`read_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    pub name: String,
    pub kind: Kind,
    pub lon: f64,
    pub lat: f64,
    pub node: String,
    pub city: String,
}

/// Read a CSV file into a DataFrame.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("failed to open CSV {}", path.display()))?;
    let df = CsvReader::new(file)
        .finish()
        .with_context(|| format!("failed to parse CSV {}", path.display()))?;
    Ok(df)
}

/// Fail with the sorted list of missing header names.
pub(crate) fn require_columns(df: &DataFrame, required: &[&str], what: &str) -> Result<()> {
    let present: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
    let mut missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !present.contains(column))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        bail!("missing required {what} columns: {}", missing.join(", "));
    }
    Ok(())
}

/// Per-row string view of a column, trimmed, with nulls as empty
/// strings. Numeric dtypes are coerced the way raw extracts sometimes
/// arrive (an all-numeric name column infers as integer).
pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    let values = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|value| value.unwrap_or("").trim().to_string())
            .collect(),
        _ => {
            let casted = column.cast(&DataType::String)?;
            casted
                .str()?
                .into_iter()
                .map(|value| value.unwrap_or("").trim().to_string())
                .collect()
        }
    };
    Ok(values)
}

/// Per-row float view of a column; unparseable entries come back as
/// `None` and drop the row at the call site.
pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let values = match column.dtype() {
        DataType::Float64 => column.f64()?.into_iter().collect(),
        DataType::String => column
            .str()?
            .into_iter()
            .map(|value| value.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect(),
        _ => column.cast(&DataType::Float64)?.f64()?.into_iter().collect(),
    };
    Ok(values)
}

/// Read and validate the input CSV, yielding surviving rows in file
/// order. A missing required column is fatal; a row with an empty
/// name or non-numeric coordinates is dropped silently.
pub fn read_rows(path: &Path) -> Result<Vec<InputRow>> {
    let df = read_csv(path)?;
    require_columns(&df, &REQUIRED_COLUMNS, "CSV")?;

    let names = string_values(&df, "streetname")?;
    let kinds = string_values(&df, "kind")?;
    let lons = float_values(&df, "center_lon")?;
    let lats = float_values(&df, "center_lat")?;
    let nodes = string_values(&df, "city_place_node")?;
    let cities = string_values(&df, "city_place_city")?;

    let mut rows = Vec::with_capacity(names.len());
    for i in 0..names.len() {
        if names[i].is_empty() {
            continue;
        }
        let (Some(lon), Some(lat)) = (lons[i], lats[i]) else {
            continue;
        };
        rows.push(InputRow {
            name: names[i].clone(),
            kind: Kind::from_tag(&kinds[i]),
            lon,
            lat,
            node: nodes[i].clone(),
            city: cities[i].clone(),
        });
    }
    Ok(rows)
}

/// Pick the sole `*.csv` in `dir`: none or more than one is an error.
pub fn find_default_csv(dir: &Path) -> Result<PathBuf> {
    let mut csvs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("csv")
        })
        .collect();
    csvs.sort();
    match csvs.len() {
        0 => bail!("no .csv files found in {}", dir.display()),
        1 => Ok(csvs.remove(0)),
        _ => bail!(
            "multiple .csv files found in {}; pass --input explicitly",
            dir.display()
        ),
    }
}
